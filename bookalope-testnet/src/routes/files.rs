//! Document and image uploads/downloads, and conversion.
use axum::{
    Json,
    extract::{Path, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::Deserialize;
use serde_json::{Value, json};

use super::catalog::{is_export_format, styles_for};
use super::require_str;
use crate::http_error::{HttpError, HttpResult};
use crate::state::{AppState, STEP_CONVERT, StoredFile};

fn attachment(filename: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
            (CONTENT_TYPE, "application/octet-stream".to_string()),
        ],
        bytes,
    )
        .into_response()
}

fn decode_upload(body: &Value) -> HttpResult<StoredFile> {
    Ok(StoredFile {
        filename: require_str(body, "filename")?,
        bytes: STANDARD.decode(require_str(body, "file")?)?,
    })
}

#[derive(Deserialize)]
pub struct ImageQuery {
    name: String,
}

pub async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ImageQuery>,
) -> HttpResult<Response> {
    let store = state.store();
    let flow = store
        .bookflows
        .get(&id)
        .ok_or_else(|| HttpError::not_found("Bookflow"))?;
    let image = flow
        .images
        .get(&query.name)
        .ok_or_else(|| HttpError::not_found("Image"))?;
    Ok(attachment(&image.filename, image.bytes.clone()))
}

pub async fn add_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> HttpResult<Json<Value>> {
    let name = require_str(&body, "name")?;
    let file = decode_upload(&body)?;
    let mut store = state.store();
    let flow = store
        .bookflows
        .get_mut(&id)
        .ok_or_else(|| HttpError::not_found("Bookflow"))?;
    flow.images.insert(name, file);
    Ok(Json(json!({})))
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HttpResult<Response> {
    let store = state.store();
    let flow = store
        .bookflows
        .get(&id)
        .ok_or_else(|| HttpError::not_found("Bookflow"))?;
    let document = flow
        .document
        .as_ref()
        .ok_or_else(|| HttpError::not_found("Document"))?;
    Ok(attachment(&document.filename, document.bytes.clone()))
}

pub async fn set_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> HttpResult<Json<Value>> {
    require_str(&body, "filetype")?;
    let file = decode_upload(&body)?;
    let mut store = state.store();
    let flow = store
        .bookflows
        .get_mut(&id)
        .ok_or_else(|| HttpError::not_found("Bookflow"))?;
    flow.document = Some(file);
    flow.step = STEP_CONVERT.into();
    Ok(Json(json!({})))
}

#[derive(Deserialize)]
pub struct ConvertQuery {
    format: String,
    styling: String,
    version: String,
}

pub async fn convert(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ConvertQuery>,
) -> HttpResult<Response> {
    if !is_export_format(&query.format) {
        return Err(HttpError::bad_request(format!("Unknown format: {}", query.format)));
    }
    if !styles_for(&query.format)
        .iter()
        .any(|(name, ..)| *name == query.styling)
    {
        return Err(HttpError::bad_request(format!(
            "Unknown styling {} for format {}",
            query.styling, query.format
        )));
    }

    let store = state.store();
    let flow = store
        .bookflows
        .get(&id)
        .ok_or_else(|| HttpError::not_found("Bookflow"))?;
    let document = flow
        .document
        .as_ref()
        .ok_or_else(|| HttpError::not_acceptable("Bookflow has no document"))?;

    let bytes = match query.version.as_str() {
        "final" => document.bytes.clone(),
        "test" => shuffle_words(&document.bytes),
        other => return Err(HttpError::bad_request(format!("Unknown version: {other}"))),
    };
    let filename = format!("bookflow-{}.{}", flow.id, query.format);
    Ok(attachment(&filename, bytes))
}

/// Degraded preview rendition: same words, reversed order.
pub(crate) fn shuffle_words(bytes: &[u8]) -> Vec<u8> {
    let text = String::from_utf8_lossy(bytes);
    let mut words: Vec<&str> = text.split_whitespace().collect();
    words.reverse();
    words.join(" ").into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendition_keeps_words_but_not_order() {
        assert_eq!(shuffle_words(b"one two  three\n"), b"three two one");
        assert_eq!(shuffle_words(b""), b"");
    }
}
