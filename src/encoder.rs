//! Encoder dispatch: native values to tagged nodes.
//!
//! The codec is selected by the runtime kind of the value
//! ([`Value::kind`]). Named composites prefer a codec registered for their
//! specific type name and fall back to the generic codec of their family.
//!
//! Container codecs recurse through [`Encoder::encode`], which enforces the
//! depth limit and detects cycles through [`Shared`](crate::Shared) cells.

use crate::{CodecOptions, Error, Node, Registry, Result, Value};
use std::collections::HashSet;

/// Converts values into document nodes using the codecs of a [`Registry`].
///
/// # Examples
///
/// ```rust
/// use tagcodec::{tag, CodecOptions, Encoder, Registry, Value};
///
/// let registry = Registry::with_builtins();
/// let mut encoder = Encoder::new(&registry, CodecOptions::default());
///
/// let node = encoder.encode(&Value::from(42)).unwrap();
/// assert_eq!(node.tag(), Some(tag::INT));
/// assert_eq!(node.as_scalar(), Some("42"));
/// ```
pub struct Encoder<'r> {
    registry: &'r Registry,
    options: CodecOptions,
    depth: usize,
    in_progress: HashSet<usize>,
}

impl<'r> Encoder<'r> {
    pub fn new(registry: &'r Registry, options: CodecOptions) -> Self {
        Encoder {
            registry,
            options,
            depth: 0,
            in_progress: HashSet::new(),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    #[must_use]
    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Current nesting depth; zero at the top-level value.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Encodes one value, recursing into children through the codecs.
    ///
    /// # Errors
    ///
    /// - [`Error::DepthExceeded`] past `options.max_depth`
    /// - [`Error::CyclicStructure`] when a shared cell contains itself
    /// - [`Error::UnsupportedValue`] when no codec handles the value's kind
    /// - any error raised by the codec itself
    pub fn encode(&mut self, value: &Value) -> Result<Node> {
        if self.depth >= self.options.max_depth {
            return Err(Error::depth_exceeded(self.options.max_depth));
        }
        self.depth += 1;
        let result = self.encode_inner(value);
        self.depth -= 1;
        result
    }

    fn encode_inner(&mut self, value: &Value) -> Result<Node> {
        if let Value::Shared(cell) = value {
            let id = cell.id();
            if !self.in_progress.insert(id) {
                // a cell holding itself directly has no kind of its own
                let kind = match &*cell.read() {
                    Value::Shared(_) => "shared cell".to_string(),
                    inner => inner.kind().to_string(),
                };
                return Err(Error::cyclic(kind));
            }
            let inner = cell.read().clone();
            let result = self.encode_inner(&inner);
            self.in_progress.remove(&id);
            return result;
        }

        let kind = value.kind();
        let codec = self
            .registry
            .codec_for(&kind)
            .ok_or_else(|| Error::unsupported(&kind))?;
        codec.encode(value, self)
    }
}
