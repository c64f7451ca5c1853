// ============================================================
// Layer 1 — HTTP Error Envelope
// ============================================================
// Every failed request answers with the same JSON shape:
//
//   { "error": "Invalid Data", "message": "area: must be greater than 0" }
//
// Mapping from the service taxonomy:
//
//   Validation / malformed JSON  → 400 "Invalid Data"
//   ModelNotLoaded               → 503 "Service Unavailable"
//   Preprocessing / ArtifactLoad → 500 "Server Error"
//   panic inside a handler       → 500 "Server Error"
//
// 5xx bodies carry a generic message. The internal error text
// is always logged, and is only echoed to the client in a
// `detail` field when the service runs with debug enabled.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::any::Any;

use crate::domain::error::ServiceError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub error:   String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail:  Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body:   ErrorBody,
}

impl ApiError {
    /// A 400 for input the client can fix
    pub fn invalid(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::error!("Input error: {}", message);
        Self {
            status: StatusCode::BAD_REQUEST,
            body:   ErrorBody {
                error:   "Invalid Data".to_string(),
                message,
                detail:  None,
            },
        }
    }

    /// Map a service failure, echoing internals only when `debug`.
    pub fn from_service(err: ServiceError, debug: bool) -> Self {
        let (status, error, message) = match &err {
            ServiceError::Validation(v) => return Self::invalid(v.to_string()),
            ServiceError::ModelNotLoaded => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service Unavailable",
                "ML model is not loaded",
            ),
            ServiceError::Preprocessing(_) | ServiceError::ArtifactLoad(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server Error",
                "Could not complete prediction",
            ),
        };

        tracing::error!("Prediction failed: {}", err);
        Self {
            status,
            body: ErrorBody {
                error:   error.to_string(),
                message: message.to_string(),
                detail:  debug.then(|| err.to_string()),
            },
        }
    }

    #[cfg(test)]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// Turns a caught handler panic into the generic 500 envelope.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let reason = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Handler panicked: {}", reason);

    let body = ErrorBody {
        error:   "Server Error".to_string(),
        message: "An unexpected error occurred".to_string(),
        detail:  None,
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::{PreprocessingError, ValidationError};

    #[test]
    fn test_validation_maps_to_400() {
        let e = ApiError::from_service(ValidationError::new("area", "must be greater than 0").into(), true);
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        assert_eq!(e.body.message, "area: must be greater than 0");
        assert_eq!(e.body.detail, None);
    }

    #[test]
    fn test_not_loaded_maps_to_503() {
        let e = ApiError::from_service(ServiceError::ModelNotLoaded, false);
        assert_eq!(e.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_panic_payload_becomes_generic_500() {
        let res = handle_panic(Box::new(String::from("index out of bounds")));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_detail_only_in_debug() {
        let err = || ServiceError::Preprocessing(PreprocessingError::MissingEncoder("state".into()));

        let quiet = ApiError::from_service(err(), false);
        assert_eq!(quiet.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(quiet.body.message, "Could not complete prediction");
        assert_eq!(quiet.body.detail, None);
        assert!(!serde_json::to_string(&quiet.body).unwrap().contains("detail"));

        let loud = ApiError::from_service(err(), true);
        assert!(loud.body.detail.unwrap().contains("state"));
    }
}
