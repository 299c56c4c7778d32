use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use super::{body_str, require_str};
use crate::http_error::{HttpError, HttpResult};
use crate::state::AppState;

pub async fn list_books(State(state): State<AppState>) -> Json<Value> {
    let store = state.store();
    let books: Vec<Value> = store.books.values().map(|b| store.book_json(b)).collect();
    Json(json!({"books": books}))
}

pub async fn create_book(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> HttpResult<(StatusCode, Json<Value>)> {
    let name = require_str(&body, "name")?;
    let mut store = state.store();
    let id = store.create_book(name);
    tracing::debug!(%id, "Created book");
    let book = store.book_json(&store.books[&id]);
    Ok((StatusCode::CREATED, Json(json!({"book": book}))))
}

pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HttpResult<Json<Value>> {
    let store = state.store();
    let book = store.books.get(&id).ok_or_else(|| HttpError::not_found("Book"))?;
    Ok(Json(json!({"book": store.book_json(book)})))
}

pub async fn save_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> HttpResult<Json<Value>> {
    let name = body_str(&body, "name")?;
    let mut store = state.store();
    let book = store.books.get_mut(&id).ok_or_else(|| HttpError::not_found("Book"))?;
    if let Some(name) = name {
        book.name = name;
    }
    Ok(Json(json!({})))
}

pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HttpResult<StatusCode> {
    if state.store().delete_book(&id) {
        tracing::debug!(%id, "Deleted book");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(HttpError::not_found("Book"))
    }
}

pub async fn list_bookflows(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HttpResult<Json<Value>> {
    let store = state.store();
    let book = store.books.get(&id).ok_or_else(|| HttpError::not_found("Book"))?;
    let flows: Vec<Value> = book
        .bookflows
        .iter()
        .filter_map(|f| store.bookflows.get(f))
        .map(|f| f.to_json())
        .collect();
    Ok(Json(json!({"bookflows": flows})))
}

pub async fn create_bookflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> HttpResult<(StatusCode, Json<Value>)> {
    let name = require_str(&body, "name")?;
    let title = body_str(&body, "title")?;
    let mut store = state.store();
    let flow_id = store
        .create_bookflow(&id, name, title)
        .ok_or_else(|| HttpError::not_found("Book"))?;
    let flow = store.bookflows[&flow_id].to_json();
    Ok((StatusCode::CREATED, Json(json!({"bookflow": flow}))))
}
