use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::error::LedgerError;

// Error unificado de la API: envuelve la taxonomía del dominio y la traduce
// a HTTP con cuerpo estructurado { code, message, ...contexto }.
pub struct ApiError(pub LedgerError);

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);

        let mut body = json!({
            "status": "error",
            "code": self.0.code(),
            "message": self.0.to_string(),
        });

        if self.0.is_retryable() {
            body["retryable"] = json!(true);
        }

        match &self.0 {
            LedgerError::InsufficientBalance {
                wallet_id,
                requested,
                available,
            } => {
                body["walletId"] = json!(wallet_id);
                body["requested"] = json!(requested);
                body["available"] = json!(available);
            }
            LedgerError::Internal(detail) | LedgerError::ConstraintViolation(detail) => {
                tracing::error!("Unclassified store failure: {}", detail);
                // En producción el detalle interno no cruza la frontera.
                if !cfg!(debug_assertions) {
                    body["message"] = json!("Internal server error");
                }
            }
            _ => {}
        }

        (status, Json(body)).into_response()
    }
}

fn status_for(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::Validation(_) => StatusCode::BAD_REQUEST,
        LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::InsufficientBalance { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        LedgerError::DuplicateTransaction => StatusCode::CONFLICT,
        LedgerError::DeadlockDetected
        | LedgerError::SerializationFailure
        | LedgerError::ConnectionAcquireTimeout => StatusCode::SERVICE_UNAVAILABLE,
        LedgerError::StatementTimeout => StatusCode::GATEWAY_TIMEOUT,
        LedgerError::ConstraintViolation(_) | LedgerError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
