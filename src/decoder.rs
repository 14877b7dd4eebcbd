//! Decoder dispatch: tagged nodes to native values.
//!
//! For each node the decoder normalizes the tag (expanding `!!` and `!ruby/`
//! shorthands), resolves untagged nodes implicitly, looks the tag up in the
//! [`Registry`] and hands the node to the codec found there. Container
//! codecs recurse through [`Decoder::decode`].

use crate::{
    resolver, tag, CodecOptions, Error, Fields, Node, Object, Registry, Result, UnknownTagPolicy,
    Value,
};

/// Reconstructs values from document nodes using the codecs of a [`Registry`].
///
/// # Examples
///
/// ```rust
/// use tagcodec::{CodecOptions, Decoder, Node, Registry, Style, Value};
///
/// let registry = Registry::with_builtins();
/// let mut decoder = Decoder::new(&registry, CodecOptions::default());
///
/// let node = Node::scalar("!!float", ".Inf", Style::Plain);
/// assert_eq!(decoder.decode(&node).unwrap(), Value::from(f64::INFINITY));
/// ```
pub struct Decoder<'r> {
    registry: &'r Registry,
    options: CodecOptions,
    depth: usize,
}

impl<'r> Decoder<'r> {
    pub fn new(registry: &'r Registry, options: CodecOptions) -> Self {
        Decoder {
            registry,
            options,
            depth: 0,
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

    /// Decodes one node, recursing into children through the codecs.
    ///
    /// # Errors
    ///
    /// - [`Error::DepthExceeded`] past `options.max_depth`
    /// - [`Error::UnknownTag`] for an unregistered tag, unless the fallback
    ///   policy turns a mapping payload into a generic object
    /// - [`Error::MalformedPayload`] from the codec
    pub fn decode(&mut self, node: &Node) -> Result<Value> {
        if self.depth >= self.options.max_depth {
            return Err(Error::depth_exceeded(self.options.max_depth));
        }
        self.depth += 1;
        let result = self.decode_inner(node);
        self.depth -= 1;
        result
    }

    fn decode_inner(&mut self, node: &Node) -> Result<Value> {
        let tag = match node.tag() {
            Some(explicit) => tag::normalize(explicit).into_owned(),
            None if self.options.implicit_typing => resolver::implicit_tag(node).to_string(),
            None if node.is_scalar() => tag::STR.to_string(),
            None => resolver::implicit_tag(node).to_string(),
        };
        tracing::trace!(tag = %tag, shape = %node.shape(), "resolving tag");

        match self.registry.resolve(&tag) {
            Ok(codec) => codec.decode(&tag, node, self),
            Err(err) => match self.options.unknown_tags {
                UnknownTagPolicy::GenericObject if node.is_mapping() => {
                    tracing::debug!(tag = %tag, "decoding unknown tag as a generic object");
                    let fields = self.decode_fields(&tag, node)?;
                    Ok(Value::Object(Object { class: tag, fields }))
                }
                _ => Err(err),
            },
        }
    }

    /// Decodes the entries of a mapping node into named fields.
    ///
    /// Keys must be scalars; each value is decoded in turn and a failure is
    /// reported with the name of the field that caused it.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedPayload`] naming `tag` when the node is not a mapping
    /// or a key is not a scalar, otherwise the first child error.
    pub fn decode_fields(&mut self, tag: &str, node: &Node) -> Result<Fields> {
        let entries = node
            .as_mapping()
            .ok_or_else(|| Error::malformed(tag, "mapping", node.describe()))?;
        let mut fields = Fields::with_capacity(entries.len());
        for (key, value) in entries {
            let name = key
                .as_scalar()
                .ok_or_else(|| Error::malformed(tag, "scalar field name", key.describe()))?;
            let decoded = self.decode(value).map_err(|e| e.with_field(name))?;
            fields.insert(name.to_string(), decoded);
        }
        Ok(fields)
    }
}
