//! Uniform response envelope
//!
//! Every endpoint answers with the same JSON shape:
//!
//! ```json
//! {"success": true, "data": {...}, "message": "...", "code": 200, "meta": {...}}
//! ```
//!
//! `data` is `null` on failure and `meta` only appears on paginated listings.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use credo_core::Outcome;
use credo_core::error::UNKNOWN_ERROR_MESSAGE;
use credo_db::{PaginationMeta, PaginationRequest};
use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PaginationMeta>,
}

impl<T> Envelope<T> {
    pub fn new(status: StatusCode, data: Option<T>, message: impl Into<String>) -> Self {
        Self {
            success: status.as_u16() < 400,
            data,
            message: message.into(),
            code: status.as_u16(),
            meta: None,
        }
    }

    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, Some(data), message)
    }

    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, None, message)
    }

    pub fn with_meta(mut self, meta: Option<PaginationMeta>) -> Self {
        self.meta = meta;
        self
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match serde_json::to_vec(&self) {
            Ok(body) => (status, [(header::CONTENT_TYPE, "application/json")], body).into_response(),
            Err(e) => ApiError::unclassified(e).into_response(),
        }
    }
}

/// Wrap failures produced outside any handler in the envelope
///
/// Layers such as the request timeout answer with a bare status and no body;
/// anything at or above 400 without a content type is rewritten.
pub async fn envelope_bare_failures(response: Response) -> Response {
    let status = response.status();
    if status.as_u16() < 400 || response.headers().contains_key(header::CONTENT_TYPE) {
        return response;
    }
    let message = status.canonical_reason().unwrap_or(UNKNOWN_ERROR_MESSAGE);
    Envelope::<()>::failure(status, message).into_response()
}

/// Turn an operation outcome into a response
pub fn respond<T: Serialize>(outcome: Outcome<T>, message: &str) -> Response {
    match outcome {
        Ok(completed) => Envelope::ok(completed.data, message).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Turn a listing outcome into a response carrying pagination metadata
pub fn respond_page<T: Serialize>(
    outcome: Outcome<T>,
    message: &str,
    pagination: &PaginationRequest,
) -> Response {
    match outcome {
        Ok(completed) => {
            let meta = pagination.meta(completed.total.unwrap_or_default());
            Envelope::ok(completed.data, message)
                .with_meta(meta)
                .into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_shape() {
        let envelope = Envelope::ok(json!({"id": 1}), "Get user success");
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({
                "success": true,
                "data": {"id": 1},
                "message": "Get user success",
                "code": 200
            })
        );
    }

    #[test]
    fn test_failure_has_null_data() {
        let envelope = Envelope::<()>::failure(StatusCode::NOT_FOUND, "Data not found");
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({
                "success": false,
                "data": null,
                "message": "Data not found",
                "code": 404
            })
        );
    }

    #[test]
    fn test_meta_is_emitted_only_when_present() {
        let meta = PaginationRequest::new(2, 10).meta(25);
        let envelope = Envelope::ok(vec![1, 2, 3], "Get user success").with_meta(meta);
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["meta"], json!({"total": 25, "page": 2, "per_page": 10}));

        let meta = PaginationRequest::disabled().meta(25);
        let envelope = Envelope::ok(vec![1, 2, 3], "Get user success").with_meta(meta);
        let value = serde_json::to_value(&envelope).unwrap();
        assert!(value.get("meta").is_none());
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let build = || {
            Envelope::ok(json!({"username": "alice", "role": "admin"}), "Get user success")
                .with_meta(PaginationRequest::new(1, 10).meta(1))
        };
        let first = serde_json::to_vec(&build()).unwrap();
        let second = serde_json::to_vec(&build()).unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with(br#"{"success":true,"data":"#));
    }
}
