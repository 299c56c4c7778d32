pub(crate) mod bookflows;
pub(crate) mod books;
pub(crate) mod catalog;
pub(crate) mod files;
pub(crate) mod profile;

use serde_json::Value;

use crate::http_error::{HttpError, HttpResult};

/// Optional string field of a JSON request body.
pub(crate) fn body_str(body: &Value, key: &str) -> HttpResult<Option<String>> {
    match body.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(HttpError::bad_request(format!("`{key}` must be a string"))),
    }
}

/// Required string field of a JSON request body.
pub(crate) fn require_str(body: &Value, key: &str) -> HttpResult<String> {
    body_str(body, key)?.ok_or_else(|| HttpError::bad_request(format!("`{key}` is required")))
}
