//! Server error, rendered as Bookalope's `{"errors": [...]}` envelope.
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub(crate) type HttpResult<T, E = HttpError> = core::result::Result<T, E>;

#[derive(Debug, Clone)]
pub(crate) struct HttpError {
    status: StatusCode,
    description: String,
}

impl HttpError {
    /// Create a new [`HttpError`].
    pub fn new(status: StatusCode, description: impl ToString) -> HttpError {
        Self {
            status,
            description: description.to_string(),
        }
    }

    pub fn not_found(what: &str) -> HttpError {
        Self::new(StatusCode::NOT_FOUND, format!("{what} not found"))
    }

    pub fn bad_request(message: impl ToString) -> HttpError {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> HttpError {
        Self::new(StatusCode::UNAUTHORIZED, "Invalid or missing API token")
    }

    pub fn not_acceptable(message: impl ToString) -> HttpError {
        Self::new(StatusCode::NOT_ACCEPTABLE, message)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> axum::response::Response {
        let body = json!({
            "errors": [{
                "code": self.status.as_u16(),
                "description": self.description,
            }]
        });
        (self.status, Json(body)).into_response()
    }
}

// base64 decoding of uploaded files.
impl From<base64::DecodeError> for HttpError {
    fn from(error: base64::DecodeError) -> Self {
        tracing::debug!(?error);
        Self::bad_request("`file` is not valid base64")
    }
}
