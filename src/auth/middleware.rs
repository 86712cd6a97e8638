use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::jwt::{Claims, JwtManager};
use crate::config::RuntimeEnvironment;
use crate::errors::AppError;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<JwtManager>,
    pub environment: RuntimeEnvironment,
}

/// Auth middleware: validates the JWT Bearer token from the Authorization header.
/// In development a request without the header runs as [`Claims::development`].
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let claims = if let Some(token) = auth_header.strip_prefix("Bearer ") {
        match state.jwt.validate_token(token) {
            Ok(claims) => claims,
            Err(_) => return AppError::unauthorized("Invalid or expired token").into_response(),
        }
    } else if auth_header.is_empty() && state.environment.is_development() {
        Claims::development()
    } else {
        return AppError::unauthorized("Missing authorization header").into_response();
    };

    req.extensions_mut().insert(claims);
    next.run(req).await
}

/// Gate for goal and manual-revenue mutations. Skipped in development.
pub fn authorize_finance_mutation(claims: &Claims, environment: RuntimeEnvironment) -> Result<(), AppError> {
    if environment.is_development() || claims.can_manage_finance() {
        return Ok(());
    }
    tracing::warn!(user = %claims.sub, role = %claims.role, "Finance mutation denied");
    Err(AppError::forbidden("Insufficient permissions"))
}
