use crate::errors::ServerError;
use crate::responses::ResultResp;
use astra::{Body, Response, ResponseBuilder};
use http::StatusCode;
use serde::Serialize;

const FALLBACK_BODY: &str = r#"{"error":"internal","message":"Internal Server Error"}"#;

pub fn json_response<T: Serialize>(value: &T) -> ResultResp {
    let body = serde_json::to_vec(value).map_err(|e| ServerError::Internal(e.to_string()))?;
    build(200, body).map_err(ServerError::Internal)
}

/// Serializes `value` with an explicit status. Any failure degrades to a
/// plain 500 with a fixed body.
pub fn json_with_status<T: Serialize>(status: u16, value: &T) -> Response {
    serde_json::to_vec(value)
        .map_err(|e| e.to_string())
        .and_then(|body| build(status, body))
        .unwrap_or_else(|_| {
            let mut resp = Response::new(Body::from(FALLBACK_BODY.to_string()));
            *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            resp
        })
}

fn build(status: u16, body: Vec<u8>) -> Result<Response, String> {
    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", mime::APPLICATION_JSON.as_ref())
        .body(Body::from(body))
        .map_err(|e| e.to_string())
}
