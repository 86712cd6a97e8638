use axum::{extract::State, Json};
use serde_json::json;

use crate::handlers::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let database = match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => "ok",
        Err(e) => {
            tracing::warn!("Health check database ping failed: {e}");
            "unavailable"
        }
    };

    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "database": database,
            "environment": format!("{:?}", state.environment).to_lowercase(),
        }
    }))
}
