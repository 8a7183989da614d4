pub mod errors;
pub mod json;

use crate::errors::ServerError;
use astra::Response;

pub type ResultResp = Result<Response, ServerError>;

pub use errors::error_to_response;
pub use json::{json_response, json_with_status};
