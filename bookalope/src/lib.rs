#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]

mod catalog;
mod client;
pub mod errors;
mod identifier;
mod resources;
mod util;

pub mod prelude;

// --- PUBLIC API EXPORTS ---
// Transport
pub use client::transport::Payload;
pub use client::{
    BETA_HOST, BookalopeClient, BookalopeClientBuilder, DEFAULT_API_VERSION, DEFAULT_HOST,
};
// Resources
pub use resources::Source;
pub use resources::book::Book;
pub use resources::bookflow::{Bookflow, BookflowMetadata, COVER_IMAGE_NAME, ConvertVersion};
pub use resources::profile::Profile;
// Catalog
pub use catalog::{Format, Style, correct_export_name};
// Identifiers
pub use identifier::{IDENTIFIER_LEN, ResourceId, Token, is_valid_identifier};

// Errors
pub use errors::{BuildError, Error, Result};

// Re-exports
pub use bytes::Bytes;
pub use reqwest::StatusCode;
