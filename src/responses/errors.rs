use crate::errors::ServerError;
use crate::responses::json_with_status;
use astra::Response;
use serde_json::json;
use tracing::error;

/// Convert a ServerError into a JSON `{error, message}` response
pub fn error_to_response(err: ServerError) -> Response {
    if let ServerError::Internal(detail) = &err {
        error!(detail = %detail, "internal error");
    }

    let body = json!({
        "error": err.code(),
        "message": err.to_string(),
    });
    json_with_status(err.status(), &body)
}
