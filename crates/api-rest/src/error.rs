//! Mapping from core errors to HTTP responses.
//!
//! Every error body is `{"message": ...}`. Internal details are logged, not returned.

use api_shared::auth::AuthError;
use api_shared::MessageRes;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use kiosk_core::KioskError;

/// Seconds a client should wait before retrying a retryable failure.
const RETRY_AFTER_SECS: &str = "5";

/// An error response from a REST handler.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    retryable: bool,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<KioskError> for ApiError {
    fn from(err: KioskError) -> Self {
        let (status, message) = match &err {
            KioskError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            KioskError::PatientNotFound(_) => {
                (StatusCode::NOT_FOUND, "Patient not found in queue".into())
            }
            KioskError::QueueEmpty => (StatusCode::NOT_FOUND, "No patients in queue".into()),
            KioskError::DuplicatePatientId(_) => (
                StatusCode::CONFLICT,
                "Patient id is already registered".into(),
            ),
            KioskError::Upstream(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "External API is not responding".into(),
            ),
            KioskError::UpstreamTimeout(_) => (
                StatusCode::GATEWAY_TIMEOUT,
                "External API timed out, please try again".into(),
            ),
            KioskError::UpstreamStatus { status, message } => {
                match StatusCode::from_u16(*status) {
                    Ok(code) if code.is_client_error() => (code, message.clone()),
                    _ => (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "External API is not responding".into(),
                    ),
                }
            }
            KioskError::UpstreamDecode(_) => (
                StatusCode::BAD_GATEWAY,
                "Unexpected response from external API".into(),
            ),
            KioskError::Store(_) | KioskError::StoreEncode(_) | KioskError::StoreDecode(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Local name store unavailable".into(),
            ),
            KioskError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into()),
        };

        if status.is_server_error() {
            tracing::error!("{err}");
        } else {
            tracing::debug!("{err}");
        }

        Self {
            status,
            message,
            retryable: err.is_retryable(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(MessageRes::new(self.message))).into_response();
        if self.retryable {
            response.headers_mut().insert(
                header::RETRY_AFTER,
                HeaderValue::from_static(RETRY_AFTER_SECS),
            );
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_client_errors_keep_status_and_message() {
        let err = ApiError::from(KioskError::UpstreamStatus {
            status: 404,
            message: "Queue is empty".into(),
        });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Queue is empty");
    }

    #[test]
    fn upstream_server_errors_become_unavailable_and_retryable() {
        let err = ApiError::from(KioskError::UpstreamStatus {
            status: 502,
            message: "bad gateway".into(),
        });
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = err.into_response();
        assert_eq!(response.headers()[header::RETRY_AFTER], "5");
    }

    #[test]
    fn timeouts_are_gateway_timeouts() {
        let err = ApiError::from(KioskError::UpstreamTimeout("deadline".into()));
        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
        assert!(err.retryable);
    }

    #[test]
    fn store_failures_are_distinct_from_upstream_failures() {
        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ApiError::from(KioskError::StoreDecode(decode));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Local name store unavailable");
        assert!(!err.retryable);
    }

    #[test]
    fn auth_errors_are_unauthorized() {
        let err = ApiError::from(AuthError::Missing);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }
}
