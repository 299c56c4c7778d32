use axum::{Json, extract::State};
use serde_json::{Value, json};

use super::body_str;
use crate::http_error::HttpResult;
use crate::state::AppState;

pub async fn get_profile(State(state): State<AppState>) -> Json<Value> {
    let store = state.store();
    Json(json!({"user": {"firstname": store.firstname, "lastname": store.lastname}}))
}

pub async fn save_profile(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> HttpResult<Json<Value>> {
    let firstname = body_str(&body, "firstname")?;
    let lastname = body_str(&body, "lastname")?;

    let mut store = state.store();
    if let Some(firstname) = firstname {
        store.firstname = firstname;
    }
    if let Some(lastname) = lastname {
        store.lastname = lastname;
    }
    Ok(Json(json!({})))
}
