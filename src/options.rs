//! Configuration options for encoding and decoding.
//!
//! - [`CodecOptions`]: main configuration struct
//! - [`UnknownTagPolicy`]: what decode does with a tag no codec claims
//!
//! ## Examples
//!
//! ```rust
//! use tagcodec::{CodecOptions, UnknownTagPolicy};
//!
//! let options = CodecOptions::new()
//!     .with_max_depth(32)
//!     .with_unknown_tags(UnknownTagPolicy::GenericObject);
//!
//! assert_eq!(options.max_depth, 32);
//! ```

/// Default limit on structural nesting for both directions.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Decode behavior for a tag with no registered codec.
///
/// - **Error**: fail with [`Error::UnknownTag`](crate::Error::UnknownTag)
/// - **GenericObject**: rebuild mapping payloads as a generic
///   [`Object`](crate::Object) whose class is the tag itself; other shapes still fail
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum UnknownTagPolicy {
    #[default]
    Error,
    GenericObject,
}

/// Configuration for [`Encoder`](crate::Encoder) and [`Decoder`](crate::Decoder).
///
/// # Examples
///
/// ```rust
/// use tagcodec::CodecOptions;
///
/// let options = CodecOptions::default();
/// assert_eq!(options.max_depth, 128);
/// assert!(options.implicit_typing);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodecOptions {
    /// Maximum nesting depth before failing with `DepthExceeded`.
    pub max_depth: usize,
    pub unknown_tags: UnknownTagPolicy,
    /// Resolve untagged plain scalars by their content. When off, they decode as strings.
    pub implicit_typing: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        CodecOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            unknown_tags: UnknownTagPolicy::default(),
            implicit_typing: true,
        }
    }
}

impl CodecOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the nesting limit.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tagcodec::CodecOptions;
    ///
    /// let options = CodecOptions::new().with_max_depth(4);
    /// assert_eq!(options.max_depth, 4);
    /// ```
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_unknown_tags(mut self, policy: UnknownTagPolicy) -> Self {
        self.unknown_tags = policy;
        self
    }

    #[must_use]
    pub fn with_implicit_typing(mut self, enabled: bool) -> Self {
        self.implicit_typing = enabled;
        self
    }
}
