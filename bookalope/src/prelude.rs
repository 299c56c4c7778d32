//! Common imports for quick starts.

// Common
pub use crate::{BuildError, Error, Result};

// Transport
pub use crate::{BookalopeClient, BookalopeClientBuilder, Payload};

// Resources
pub use crate::{Book, Bookflow, BookflowMetadata, ConvertVersion, Profile, Source};

// Catalog
pub use crate::{Format, Style};

// Identifiers
pub use crate::{ResourceId, Token, is_valid_identifier};
