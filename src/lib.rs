//! # tagcodec
//!
//! A type-tag registry and bidirectional codec between native values and a
//! tagged, YAML-style document model.
//!
//! Every node of a document tree carries a global type tag
//! (`tag:yaml.org,2002:int`, `tag:ruby.yaml.org,2002:range`, ...). Encoding
//! picks a codec by the runtime kind of a [`Value`] and emits a tagged
//! [`Node`]; decoding reads the tag of a node, resolves the codec through a
//! [`Registry`] and rebuilds the value. Rendering nodes to text and parsing
//! text into nodes is left to a separate emitter/parser.
//!
//! ## Quick Start
//!
//! ```rust
//! use tagcodec::{decode, encode, tag, value, Registry};
//!
//! let registry = Registry::with_builtins();
//! let original = value!({ "a": [1, 2.5, null, true] });
//!
//! let node = encode(&original, &registry).unwrap();
//! assert_eq!(node.tag(), Some(tag::MAP));
//!
//! let items = node.get("a").and_then(|n| n.as_sequence()).unwrap();
//! let tags: Vec<_> = items.iter().map(|n| n.tag().unwrap()).collect();
//! assert_eq!(tags, [tag::INT, tag::FLOAT, tag::NULL, tag::BOOL]);
//!
//! assert_eq!(decode(&node, &registry).unwrap(), original);
//! ```
//!
//! ### Rust types
//!
//! Anything implementing serde's traits goes through [`Value`] on the way:
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use tagcodec::{from_node, to_node, Registry};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! let registry = Registry::with_builtins();
//! let node = to_node(&Point { x: 1, y: 2 }, &registry).unwrap();
//! assert_eq!(node.tag(), Some("tag:ruby.yaml.org,2002:struct:Point"));
//!
//! let point: Point = from_node(&node, &registry).unwrap();
//! assert_eq!(point, Point { x: 1, y: 2 });
//! ```
//!
//! ### Custom kinds
//!
//! [`Registry::register_kind`] binds a tag to an encode/decode pair. Binding
//! a tag that already exists replaces the old codec, which is also how
//! built-in behavior is overridden. See the [`registry`] module.
//!
//! ## Errors
//!
//! Encode and decode surface the first failure with its tag and, inside
//! mappings and records, the offending field name. Containers never yield a
//! half-built value.
//!
//! ## Logging
//!
//! Registration overrides and fallback decoding emit `tracing` events at
//! `debug` level, tag resolution at `trace`. No subscriber is installed.

pub mod codecs;
pub mod de;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod macros;
pub mod map;
pub mod node;
pub mod options;
pub mod registry;
pub mod resolver;
pub mod ser;
pub mod tag;
pub mod value;

pub use de::{from_value, ValueDeserializer};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{Error, Result};
pub use map::{Fields, Mapping};
pub use node::{Node, NodeKind, Shape, Style};
pub use options::{CodecOptions, UnknownTagPolicy, DEFAULT_MAX_DEPTH};
pub use registry::{Codec, FnCodec, Initializer, Member, Registry, StructDef};
pub use ser::{to_value, ValueSerializer};
pub use value::{
    ErrorValue, Object, RangeValue, Record, Regexp, RegexpFlags, Shared, Symbol, Value, ValueKind,
};

use serde::{de::DeserializeOwned, Serialize};

/// Encodes a value into a tagged node tree with default options.
///
/// # Errors
///
/// - [`Error::UnsupportedValue`] when no codec is registered for a kind
/// - [`Error::CyclicStructure`] when a [`Shared`] cell contains itself
/// - [`Error::DepthExceeded`] past [`DEFAULT_MAX_DEPTH`] levels of nesting
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode(value: &Value, registry: &Registry) -> Result<Node> {
    encode_with_options(value, registry, &CodecOptions::default())
}

/// Encodes a value into a tagged node tree with custom options.
///
/// # Examples
///
/// ```rust
/// use tagcodec::{encode_with_options, CodecOptions, Error, Registry, Value};
///
/// let registry = Registry::with_builtins();
/// let nested = Value::from(vec![Value::from(vec![Value::from(1)])]);
///
/// let options = CodecOptions::new().with_max_depth(2);
/// let err = encode_with_options(&nested, &registry, &options).unwrap_err();
/// assert!(matches!(err, Error::DepthExceeded { limit: 2 }));
/// ```
///
/// # Errors
///
/// Same as [`encode`], with the configured depth limit.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode_with_options(
    value: &Value,
    registry: &Registry,
    options: &CodecOptions,
) -> Result<Node> {
    Encoder::new(registry, options.clone()).encode(value)
}

/// Decodes a tagged node tree into a value with default options.
///
/// # Errors
///
/// - [`Error::UnknownTag`] when a tag resolves to no codec
/// - [`Error::MalformedPayload`] when a node does not have the shape its codec expects
/// - [`Error::DepthExceeded`] past [`DEFAULT_MAX_DEPTH`] levels of nesting
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode(node: &Node, registry: &Registry) -> Result<Value> {
    decode_with_options(node, registry, &CodecOptions::default())
}

/// Decodes a tagged node tree into a value with custom options.
///
/// # Examples
///
/// ```rust
/// use tagcodec::{
///     decode_with_options, CodecOptions, Node, Registry, Style, UnknownTagPolicy, Value,
/// };
///
/// let registry = Registry::with_builtins();
/// let mut node = Node::mapping("tag:example.com,2024:thing", Style::Plain);
/// node.add_pair(Node::plain("size"), Node::plain("3"));
///
/// let options = CodecOptions::new().with_unknown_tags(UnknownTagPolicy::GenericObject);
/// let Value::Object(thing) = decode_with_options(&node, &registry, &options).unwrap() else {
///     panic!("expected an object");
/// };
/// assert_eq!(thing.class, "tag:example.com,2024:thing");
/// assert_eq!(thing.fields.get("size"), Some(&Value::from(3)));
/// ```
///
/// # Errors
///
/// Same as [`decode`], subject to the configured policy and depth limit.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode_with_options(
    node: &Node,
    registry: &Registry,
    options: &CodecOptions,
) -> Result<Value> {
    Decoder::new(registry, options.clone()).decode(node)
}

/// Serializes any `T: Serialize` straight into a tagged node tree.
///
/// # Errors
///
/// Returns an error if the value cannot be represented as a [`Value`] or if
/// encoding fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_node<T>(value: &T, registry: &Registry) -> Result<Node>
where
    T: ?Sized + Serialize,
{
    encode(&to_value(value)?, registry)
}

/// Deserializes a `T` from a tagged node tree.
///
/// # Errors
///
/// Returns an error if decoding fails or the decoded value does not fit `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_node<T>(node: &Node, registry: &Registry) -> Result<T>
where
    T: DeserializeOwned,
{
    from_value(decode(node, registry)?)
}
