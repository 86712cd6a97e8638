use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::gateway::GatewayError;

/// Failure half of the `{success, data|error}` envelope.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub success: bool,
    pub code: String,
    pub error: String,
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub body: ApiError,
}

impl AppError {
    fn new(status: StatusCode, code: &str, msg: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiError {
                success: false,
                code: code.into(),
                error: msg.into(),
            },
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg)
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", msg)
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{resource} with id '{id}' not found"),
        )
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "CONFLICT", msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg)
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE", msg)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        match err {
            sqlx::Error::RowNotFound => Self::not_found("Resource", "unknown"),
            sqlx::Error::Database(ref db_err) => {
                if db_err.code().as_deref() == Some("23505") {
                    Self::conflict("Resource already exists")
                } else {
                    Self::internal(db_err.message().to_string())
                }
            }
            _ => Self::internal(err.to_string()),
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        tracing::error!("Payment source error: {err}");
        match err {
            GatewayError::Store { .. } => Self::internal(err.to_string()),
            _ => Self::service_unavailable(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let err = AppError::bad_request("year is required");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let json = serde_json::to_value(&err.body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "year is required");
        assert_eq!(json["code"], "BAD_REQUEST");
    }

    #[test]
    fn test_gateway_errors_map_by_origin() {
        let store = AppError::from(GatewayError::Store {
            source_name: "EXTERNAL".into(),
            message: "pool timed out".into(),
        });
        assert_eq!(store.status, StatusCode::INTERNAL_SERVER_ERROR);

        let upstream = AppError::from(GatewayError::Unauthorized { account: "trato".into() });
        assert_eq!(upstream.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(upstream.body.error, "trato: credentials rejected");
    }
}
