//! The API Gateway proxy response shape.
//!
//! API Gateway expects a Lambda proxy integration to answer with a mapping
//! holding a numeric `statusCode`, a string `body` and optionally `headers`:
//!
//! ```
//! use http::StatusCode;
//! use lambda_decorators::response::http_response;
//! use serde_json::json;
//!
//! let res = http_response(StatusCode::BAD_REQUEST, "BAD REQUEST");
//! assert_eq!(json!({ "statusCode": 400, "body": "BAD REQUEST" }), res);
//! ```

use http::StatusCode;
use serde_json::{json, Map, Value};

/// Key holding the HTTP status code of a proxy response.
pub const STATUS_CODE: &str = "statusCode";
/// Key holding the body of a proxy response, or of a proxy request event.
pub const BODY: &str = "body";
/// Key holding the header mapping of a proxy response.
pub const HEADERS: &str = "headers";
/// Key holding the query string parameters of a proxy request event.
pub const QUERY_STRING_PARAMETERS: &str = "queryStringParameters";

/// Builds a proxy response with the given status and body.
pub fn http_response(status: StatusCode, body: impl Into<String>) -> Value {
    json!({
        STATUS_CODE: status.as_u16(),
        BODY: body.into(),
    })
}

/// Builds a proxy response that only carries a status code.
pub fn status_response(status: StatusCode) -> Value {
    json!({ STATUS_CODE: status.as_u16() })
}

/// The canned `400 BAD REQUEST` answer for undecodable requests.
pub fn bad_request() -> Value {
    http_response(StatusCode::BAD_REQUEST, "BAD REQUEST")
}

/// A `500` answer carrying the failure's message as body.
pub fn internal_error(err: &crate::Error) -> Value {
    http_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

/// Removes and returns the status code of a mapping-shaped response.
///
/// Returns `None` when the key is absent or not a valid HTTP status, leaving
/// the mapping untouched in that case.
pub(crate) fn take_status(map: &mut Map<String, Value>) -> Option<StatusCode> {
    let status = map
        .get(STATUS_CODE)
        .and_then(Value::as_u64)
        .and_then(|code| u16::try_from(code).ok())
        .and_then(|code| StatusCode::from_u16(code).ok())?;
    map.remove(STATUS_CODE);
    Some(status)
}
