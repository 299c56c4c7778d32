use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use super::body_str;
use crate::http_error::{HttpError, HttpResult};
use crate::state::{AppState, METADATA_KEYS};

pub async fn get_bookflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HttpResult<Json<Value>> {
    let store = state.store();
    let flow = store
        .bookflows
        .get(&id)
        .ok_or_else(|| HttpError::not_found("Bookflow"))?;
    Ok(Json(json!({"bookflow": flow.to_json()})))
}

/// Update the name and any metadata key present in the body; `null` clears a key.
pub async fn save_bookflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> HttpResult<Json<Value>> {
    let name = body_str(&body, "name")?;
    let mut updates = Vec::new();
    for key in METADATA_KEYS {
        if body.get(key).is_some() {
            updates.push((key, body_str(&body, key)?));
        }
    }

    let mut store = state.store();
    let flow = store
        .bookflows
        .get_mut(&id)
        .ok_or_else(|| HttpError::not_found("Bookflow"))?;
    if let Some(name) = name {
        flow.name = name;
    }
    for (key, value) in updates {
        match value {
            Some(value) => flow.metadata.insert(key.to_string(), Value::String(value)),
            None => flow.metadata.remove(key),
        };
    }
    Ok(Json(json!({})))
}

pub async fn delete_bookflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HttpResult<StatusCode> {
    if state.store().delete_bookflow(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(HttpError::not_found("Bookflow"))
    }
}
