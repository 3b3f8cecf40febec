use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Outcomes of the booking and catalog operations that callers are expected
/// to handle. Everything except `Db` is surfaced to the client verbatim.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("access denied: {0}")]
    Forbidden(String),

    #[error("time slot {0} is not available")]
    SlotUnavailable(Uuid),

    #[error("price mismatch: expected {expected:.2}, current price is {actual:.2}")]
    PriceMismatch { expected: f64, actual: f64 },

    #[error("cannot {action} a booking that is {from}")]
    InvalidTransition {
        action: &'static str,
        from: &'static str,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("internal database error")]
    Db(#[from] sqlx::Error),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        DomainError::NotFound { entity, id }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    /// Stable machine-readable code shared by REST bodies and GraphQL extensions.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::NotFound { .. } => "NOT_FOUND",
            DomainError::Forbidden(_) => "FORBIDDEN",
            DomainError::SlotUnavailable(_) => "SLOT_UNAVAILABLE",
            DomainError::PriceMismatch { .. } => "PRICE_MISMATCH",
            DomainError::InvalidTransition { .. } => "INVALID_TRANSITION",
            DomainError::Validation(_) => "VALIDATION_ERROR",
            DomainError::Db(_) => "INTERNAL",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::SlotUnavailable(_)
            | DomainError::PriceMismatch { .. }
            | DomainError::InvalidTransition { .. } => StatusCode::CONFLICT,
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error")]
    Db(#[from] sqlx::Error),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Domain(e) => (e.status_code(), e.code()),
            AppError::Internal(_) | AppError::Db(_) | AppError::Anyhow(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            // Keep the detail in the logs, not in the response
            match &self {
                AppError::Db(e) | AppError::Domain(DomainError::Db(e)) => {
                    tracing::error!("Database error: {e}")
                }
                other => tracing::error!("{other}"),
            }
        }
        let message = match &self {
            AppError::Db(_) | AppError::Domain(DomainError::Db(_)) => {
                "internal database error".to_string()
            }
            other => other.to_string(),
        };
        (
            status,
            Json(ErrorBody {
                error: message,
                code,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_http_statuses() {
        let id = Uuid::new_v4();
        let cases = [
            (DomainError::not_found("Booking", id), StatusCode::NOT_FOUND),
            (DomainError::Forbidden("nope".into()), StatusCode::FORBIDDEN),
            (DomainError::SlotUnavailable(id), StatusCode::CONFLICT),
            (
                DomainError::PriceMismatch {
                    expected: 44.0,
                    actual: 45.0,
                },
                StatusCode::CONFLICT,
            ),
            (
                DomainError::InvalidTransition {
                    action: "cancel",
                    from: "cancelled",
                },
                StatusCode::CONFLICT,
            ),
            (DomainError::validation("bad"), StatusCode::BAD_REQUEST),
        ];

        for (error, status) in cases {
            assert_eq!(error.status_code(), status, "{error}");
            assert_eq!(AppError::from(error).into_response().status(), status);
        }
    }

    #[test]
    fn db_errors_are_sanitized() {
        let error = AppError::from(DomainError::from(sqlx::Error::RowNotFound));
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            DomainError::from(sqlx::Error::PoolTimedOut).to_string(),
            "internal database error"
        );
    }

    #[test]
    fn transition_message_names_action_and_state() {
        let error = DomainError::InvalidTransition {
            action: "cancel",
            from: "completed",
        };
        assert_eq!(error.to_string(), "cannot cancel a booking that is completed");
        assert_eq!(error.code(), "INVALID_TRANSITION");
    }
}
