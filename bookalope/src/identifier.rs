//! Validated Bookalope tokens and resource ids.
//!
//! Both are 32 character lowercase hexadecimal strings. Anything that reaches
//! the network as a token or as a path segment goes through
//! [`is_valid_identifier`] first, so malformed values fail before a round trip.

use std::{fmt, str::FromStr};

use crate::errors::Error;

/// Length of every Bookalope token and resource id.
pub const IDENTIFIER_LEN: usize = 32;

/// Returns `true` iff `s` is exactly 32 characters of `[0-9a-f]`.
///
/// ```
/// use bookalope::is_valid_identifier;
/// assert!(is_valid_identifier("79beff75edcb443b902043cc534476db"));
/// assert!(!is_valid_identifier("79BEFF75EDCB443B902043CC534476DB"));
/// assert!(!is_valid_identifier("79beff75"));
/// ```
pub fn is_valid_identifier(s: &str) -> bool {
    s.len() == IDENTIFIER_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

macro_rules! hex32_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Clone, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            /// Validates `value`, failing with [`Error::InvalidToken`] on a malformed string.
            pub fn parse(value: impl AsRef<str>) -> Result<Self, Error> {
                let value = value.as_ref();
                if is_valid_identifier(value) {
                    Ok(Self(value.to_owned()))
                } else {
                    Err(Error::InvalidToken {
                        value: value.to_owned(),
                    })
                }
            }

            /// Borrow the identifier as `&str`.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = Error;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = Error;
            fn try_from(s: &str) -> Result<Self, Self::Error> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = Error;
            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

hex32_id! {
    /// A client authentication token, sent as the HTTP Basic username.
    ///
    /// `Debug` never prints the secret.
    Token
}

hex32_id! {
    /// A server-assigned id of a book or bookflow.
    ResourceId
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(..)")
    }
}

impl fmt::Debug for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResourceId").field(&self.0).finish()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
