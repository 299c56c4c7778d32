//! HTTP Basic authentication: the token is the username, the password is empty.
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use base64::{Engine, engine::general_purpose::STANDARD};

use crate::http_error::{HttpError, HttpResult};
use crate::state::AppState;

pub(crate) async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> HttpResult<Response> {
    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(basic_username);

    match presented {
        Some(token) if token == *state.token => Ok(next.run(request).await),
        _ => Err(HttpError::unauthorized()),
    }
}

/// Username of a `Basic` authorization header value.
fn basic_username(header: &str) -> Option<String> {
    let encoded = header.strip_prefix("Basic ")?;
    let decoded = String::from_utf8(STANDARD.decode(encoded.trim()).ok()?).ok()?;
    let (user, _password) = decoded.split_once(':')?;
    Some(user.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_username() {
        assert_eq!(
            basic_username("Basic NzliZWZmNzVlZGNiNDQzYjkwMjA0M2NjNTM0NDc2ZGI6").as_deref(),
            Some("79beff75edcb443b902043cc534476db")
        );
        assert_eq!(basic_username("Bearer abc"), None);
        assert_eq!(basic_username("Basic !!!"), None);
    }
}
