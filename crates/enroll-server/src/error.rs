//! API Error Responses
//!
//! Normalizes workflow errors into the `{success: false, message, ...}`
//! envelope. Internal detail (gateway payloads, store errors) is echoed only
//! in development; production clients get the generic message while the full
//! detail goes to the log.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use enroll_core::FieldError;
use enroll_payments::PaymentError;

use crate::config::Environment;

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Error response carrier for every handler
pub struct ApiError {
    status: StatusCode,
    message: String,
    errors: Option<Vec<FieldError>>,
    detail: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            errors: None,
            detail: None,
        }
    }

    /// Map a workflow error, deciding detail exposure by environment
    pub fn from_payment(err: PaymentError, environment: Environment) -> Self {
        let status = match &err {
            PaymentError::Validation(_) => StatusCode::BAD_REQUEST,
            PaymentError::DuplicateEmail(_) => StatusCode::CONFLICT,
            PaymentError::NotFound(_) => StatusCode::NOT_FOUND,
            PaymentError::GatewayUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            PaymentError::Gateway { .. } | PaymentError::Store(_) | PaymentError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %err, "request failed");
        }

        let message = err.user_message().to_owned();
        let (errors, detail) = match err {
            PaymentError::Validation(field_errors) => (Some(field_errors), None),
            other if environment.is_development() => (None, Some(other.to_string())),
            _ => (None, None),
        };

        Self {
            status,
            message,
            errors,
            detail,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            message: self.message,
            errors: self.errors,
            error: self.detail,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_email_maps_to_conflict() {
        let err = ApiError::from_payment(
            PaymentError::DuplicateEmail("ana@example.com".into()),
            Environment::Production,
        );
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert!(err.detail.is_none());
    }

    #[test]
    fn gateway_detail_exposed_only_in_development() {
        let gateway_err = || PaymentError::Gateway {
            status: Some(500),
            detail: "boom".into(),
        };

        let dev = ApiError::from_payment(gateway_err(), Environment::Development);
        assert!(dev.detail.is_some());

        let prod = ApiError::from_payment(gateway_err(), Environment::Production);
        assert!(prod.detail.is_none());
        assert_eq!(prod.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_carries_the_field_list() {
        let err = ApiError::from_payment(
            PaymentError::Validation(vec![FieldError {
                field: "idade",
                message: "Idade deve ser entre 1 e 120 anos",
            }]),
            Environment::Production,
        );
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.errors.as_ref().map(Vec::len), Some(1));
    }
}
