//! Server-side resources: books, bookflows and the user profile.
//!
//! Books and bookflows share one construction scheme, selected once through
//! [`Source`]:
//! - [`Source::Create`] issues one `POST` and populates from the response;
//! - [`Source::FetchById`] validates the id, then issues one `GET`;
//! - [`Source::FromPayload`] wraps an already decoded item without any I/O.
//!
//! After construction, local fields change only through `refresh()`; `save()`
//! pushes them and never merges the server's answer back.

use serde_json::{Map, Value};

use crate::errors::{Error, Result};
use crate::identifier::ResourceId;

pub(crate) mod book;
pub(crate) mod bookflow;
pub(crate) mod profile;

/// How a [`crate::Book`] or [`crate::Bookflow`] comes into existence.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// Create a new resource on the server with a placeholder name.
    Create,
    /// Fetch an existing resource by its 32 character hex id.
    FetchById(String),
    /// Wrap an item the server already returned, e.g. while listing a collection.
    FromPayload(Value),
}

impl From<ResourceId> for Source {
    fn from(id: ResourceId) -> Self {
        Source::FetchById(id.as_str().to_owned())
    }
}

impl From<&ResourceId> for Source {
    fn from(id: &ResourceId) -> Self {
        Source::FetchById(id.as_str().to_owned())
    }
}

/// Where a resource object came from, for choosing the error kind on bad shapes.
#[derive(Clone, Copy)]
pub(crate) enum Origin {
    Server,
    Caller,
}

impl Origin {
    fn error(self, message: String) -> Error {
        match self {
            Origin::Server => Error::malformed(message),
            Origin::Caller => Error::construction(message),
        }
    }
}

/// Check the minimal shape every book/bookflow item must have: an object with a valid `id`.
pub(crate) fn resource_object(
    value: Value,
    kind: &str,
    origin: Origin,
) -> Result<(ResourceId, Map<String, Value>)> {
    let Value::Object(map) = value else {
        return Err(origin.error(format!("{kind} payload is not a JSON object")));
    };
    let id = map
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| origin.error(format!("{kind} payload has no string `id`")))?;
    let id = ResourceId::parse(id)
        .map_err(|err| origin.error(format!("{kind} payload has a bad id: {err}")))?;
    Ok((id, map))
}
