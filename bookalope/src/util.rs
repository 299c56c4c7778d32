use reqwest::Response;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::errors::{Error, FALLBACK_ERROR_DESCRIPTION, RequestError, Result};

#[derive(Deserialize)]
struct ErrorEnvelope {
    errors: Vec<ErrorItem>,
}

#[derive(Deserialize)]
struct ErrorItem {
    description: String,
}

/// Convert non-2xx responses into a structured error carrying the server's description.
///
/// If the status is successful (2xx), the original response is returned.
/// Otherwise the body is consumed and decoded as `{"errors": [{"description": ..}]}`;
/// anything else collapses to [`FALLBACK_ERROR_DESCRIPTION`].
pub(crate) async fn check_http_status(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let message = match response.bytes().await {
        Ok(body) => describe_error(&body),
        Err(_) => FALLBACK_ERROR_DESCRIPTION.to_string(),
    };
    tracing::warn!(%status, %message, "Bookalope request failed");

    Err(Error::from(RequestError::Server { status, message }))
}

fn describe_error(body: &[u8]) -> String {
    serde_json::from_slice::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.errors.into_iter().next())
        .map(|item| item.description)
        .unwrap_or_else(|| FALLBACK_ERROR_DESCRIPTION.to_string())
}

/// Take `key` out of a JSON response object, e.g. `{"book": {...}}` → `{...}`.
pub(crate) fn take_field(value: Value, key: &str) -> Result<Value> {
    match value {
        Value::Object(mut map) => map
            .remove(key)
            .ok_or_else(|| Error::malformed(format!("response has no `{key}` field"))),
        _ => Err(Error::malformed(format!(
            "expected a JSON object with a `{key}` field"
        ))),
    }
}

/// Like [`take_field`], for list responses.
pub(crate) fn take_list(value: Value, key: &str) -> Result<Vec<Value>> {
    match take_field(value, key)? {
        Value::Array(items) => Ok(items),
        _ => Err(Error::malformed(format!("`{key}` is not a list"))),
    }
}

/// Like [`take_list`], but a missing or `null` field is an empty list.
pub(crate) fn take_list_or_empty(value: Value, key: &str) -> Result<Vec<Value>> {
    let Value::Object(mut map) = value else {
        return Err(Error::malformed(format!(
            "expected a JSON object with a `{key}` list"
        )));
    };
    match map.remove(key) {
        Some(Value::Array(items)) => Ok(items),
        Some(Value::Null) | None => Ok(Vec::new()),
        Some(_) => Err(Error::malformed(format!("`{key}` is not a list"))),
    }
}

/// Optional string field; non-string values count as absent.
pub(crate) fn opt_str(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn first_error_description_wins() {
        let body = br#"{"errors":[{"description":"first"},{"description":"second"}]}"#;
        assert_eq!(describe_error(body), "first");
    }

    #[test]
    fn unusable_envelopes_fall_back() {
        for body in [
            &b""[..],
            b"{}",
            br#"{"errors":[]}"#,
            br#"{"errors":[{"code":1}]}"#,
            b"Internal Server Error",
        ] {
            assert_eq!(describe_error(body), FALLBACK_ERROR_DESCRIPTION);
        }
    }

    #[test]
    fn take_list_requires_the_key() {
        assert_eq!(take_list(json!({"books": [1]}), "books").unwrap(), [json!(1)]);
        for body in [json!({}), json!({"books": null}), json!({"books": "x"}), json!([])] {
            assert!(matches!(
                take_list(body, "books"),
                Err(Error::MalformedResponse { .. })
            ));
        }
    }

    #[test]
    fn take_list_or_empty_accepts_missing_and_null() {
        assert!(take_list_or_empty(json!({"styles": null}), "styles").unwrap().is_empty());
        assert!(take_list_or_empty(json!({}), "styles").unwrap().is_empty());
        assert!(take_list_or_empty(json!({"styles": "x"}), "styles").is_err());
        assert!(take_list_or_empty(json!([]), "styles").is_err());
    }
}
