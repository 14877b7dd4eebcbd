//! Error types for encoding and decoding tagged documents.
//!
//! Every failure is a local, recoverable condition surfaced to the caller of
//! [`encode`](crate::encode) / [`decode`](crate::decode). Nothing is swallowed:
//! container codecs propagate the first child error unchanged apart from
//! attaching the field name that led to it.
//!
//! ## Error Categories
//!
//! - **Unknown tags**: decode met a tag with no registered codec and no fallback
//! - **Malformed payloads**: the node shape or a field value did not match the codec
//! - **Cyclic structures**: encode reached a shared cell that is still being encoded
//! - **Depth limits**: nesting went past [`CodecOptions::max_depth`](crate::CodecOptions)
//!
//! ## Examples
//!
//! ```rust
//! use tagcodec::{decode, Error, Node, Registry, Style};
//!
//! let registry = Registry::with_builtins();
//! let node = Node::scalar("tag:example.com,2024:widget", "w", Style::Plain);
//!
//! match decode(&node, &registry) {
//!     Err(Error::UnknownTag { tag }) => assert_eq!(tag, "tag:example.com,2024:widget"),
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors raised by the codec family.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Decode saw a tag with no registered codec and no configured fallback.
    #[error("unknown tag `{tag}`")]
    UnknownTag { tag: String },

    /// Node shape or field shape did not match what the codec expects.
    #[error(
        "malformed payload for `{tag}`{}: expected {expected}, found {found}",
        field_suffix(.field)
    )]
    MalformedPayload {
        tag: String,
        field: Option<String>,
        expected: String,
        found: String,
    },

    /// Encode reached a shared value that is already being encoded.
    #[error("cyclic structure detected while encoding {kind}")]
    CyclicStructure { kind: String },

    /// Recursion went past the configured depth limit.
    #[error("nesting depth exceeded the limit of {limit}")]
    DepthExceeded { limit: usize },

    /// Encode found no codec for a value kind.
    #[error("no codec registered for {0}")]
    UnsupportedValue(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

fn field_suffix(field: &Option<String>) -> String {
    field
        .as_ref()
        .map(|name| format!(" (field `{}`)", name))
        .unwrap_or_default()
}

impl Error {
    /// Creates an unknown-tag error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tagcodec::Error;
    ///
    /// let err = Error::unknown_tag("!custom");
    /// assert_eq!(err.to_string(), "unknown tag `!custom`");
    /// ```
    pub fn unknown_tag(tag: &str) -> Self {
        Error::UnknownTag {
            tag: tag.to_string(),
        }
    }

    /// Creates a malformed-payload error carrying the offending tag and a
    /// description of the expected shape.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tagcodec::Error;
    ///
    /// let err = Error::malformed("tag:yaml.org,2002:int", "base-10 integer text", "`abc`");
    /// assert!(err.to_string().contains("expected base-10 integer text"));
    /// ```
    pub fn malformed(tag: &str, expected: &str, found: impl Into<String>) -> Self {
        Error::MalformedPayload {
            tag: tag.to_string(),
            field: None,
            expected: expected.to_string(),
            found: found.into(),
        }
    }

    /// Attaches a field name to a malformed-payload error.
    ///
    /// The innermost field wins: an error that already names a field is
    /// returned unchanged so the report points at the deepest faulty entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tagcodec::Error;
    ///
    /// let err = Error::malformed("tag:yaml.org,2002:int", "integer", "`x`").with_field("age");
    /// assert!(err.to_string().contains("field `age`"));
    /// ```
    #[must_use]
    pub fn with_field(self, name: &str) -> Self {
        match self {
            Error::MalformedPayload {
                tag,
                field: None,
                expected,
                found,
            } => Error::MalformedPayload {
                tag,
                field: Some(name.to_string()),
                expected,
                found,
            },
            other => other,
        }
    }

    /// Creates a cyclic-structure error for the given value kind.
    pub fn cyclic(kind: impl fmt::Display) -> Self {
        Error::CyclicStructure {
            kind: kind.to_string(),
        }
    }

    /// Creates a depth-exceeded error.
    pub fn depth_exceeded(limit: usize) -> Self {
        Error::DepthExceeded { limit }
    }

    /// Creates an error for a value kind with no registered codec.
    pub fn unsupported(kind: impl fmt::Display) -> Self {
        Error::UnsupportedValue(kind.to_string())
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tagcodec::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Returns the tag this error refers to, if any.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        match self {
            Error::UnknownTag { tag } | Error::MalformedPayload { tag, .. } => Some(tag),
            _ => None,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
