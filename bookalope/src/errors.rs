//! Unified error types for the `bookalope` crate.
//!
//! This module centralizes all failures that can occur while talking to the
//! Bookalope service and provides a single top-level [`Error`] enum plus the
//! convenient [`Result`] alias. Errors from lower layers (`reqwest`, URL
//! parsing) are mapped into structured variants so callers can handle them
//! precisely.

use thiserror::Error;

/// Description used when a failed response carries no usable error envelope.
pub const FALLBACK_ERROR_DESCRIPTION: &str = "Malformed error response from Bookalope";

// --- Build-Time Error ---

/// Errors that can occur while building a [`crate::BookalopeClient`].
#[derive(Debug, Error)]
pub enum BuildError {
    /// Failed to build the HTTP client (reqwest configuration).
    #[error("Failed to build the HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured host is not a valid base URL.
    #[error("Invalid host URL: {0}")]
    Host(#[from] url::ParseError),

    /// The configured token is not a 32 character lowercase hex string.
    /// The source is the [`Error::InvalidToken`] naming the rejected value.
    #[error("Invalid client token")]
    Token(#[source] Box<Error>),
}

// --- The Main Operational Error Enum ---

/// The crate’s top-level error type.
///
/// It groups failures into high-level categories:
/// - [`Error::InvalidToken`] / [`Error::MissingToken`]: raised before any I/O
/// - [`Error::Request`]: HTTP transport or server-side failures
/// - [`Error::MalformedResponse`]: success status, unexpected body
/// - [`Error::Construction`]: unusable input for a resource constructor
/// - [`Error::Parse`]: URL parsing failures
/// - [`Error::Build`]: construction of the client failed
#[derive(Debug, Error)]
pub enum Error {
    /// A token or resource id did not match `^[0-9a-f]{32}$`.
    #[error("Malformed Bookalope token: {value}")]
    InvalidToken {
        /// The rejected value.
        value: String,
    },

    /// A request was attempted before a token was configured.
    #[error("No Bookalope token configured")]
    MissingToken,

    /// HTTP request/response failed (transport or server status).
    #[error("Request failed: {0}")]
    Request(#[from] RequestError),

    /// The server answered with a success status but the body had the wrong shape.
    #[error("Malformed response from Bookalope: {message}")]
    MalformedResponse {
        /// What was expected and not found.
        message: String,
    },

    /// A resource constructor was handed an input it cannot use.
    #[error("Cannot construct resource: {message}")]
    Construction {
        /// Why the input was rejected.
        message: String,
    },

    /// URL parsing failed while preparing a request.
    #[error("Failed to parse URL: {0}")]
    Parse(#[from] url::ParseError),

    /// Building the client failed.
    #[error("Client build failed: {0}")]
    Build(#[from] BuildError),
}

impl Error {
    /// The HTTP status of a server-side failure, if this is one.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Error::Request(RequestError::Server { status, .. }) => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedResponse {
            message: message.into(),
        }
    }

    pub(crate) fn construction(message: impl Into<String>) -> Self {
        Error::Construction {
            message: message.into(),
        }
    }
}

// --- Consolidated Request Error ---

/// Transport and server-side HTTP errors.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Network/protocol failure from reqwest (timeouts, TLS, I/O, etc.).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server returned a non-success status.
    ///
    /// `message` is the first `description` of the `{"errors": [...]}` envelope,
    /// or [`FALLBACK_ERROR_DESCRIPTION`] when the body could not be decoded.
    #[error("Server responded with an error: {status} - {message}")]
    Server {
        /// The HTTP status code returned by the server.
        status: reqwest::StatusCode,
        /// Decoded error description.
        message: String,
    },
}

/// A specialized `Result` type for `bookalope` operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Request(err.into())
    }
}
