//! The tag registry.
//!
//! A [`Registry`] maps tags to [`Codec`] implementations for decode and value
//! kinds to codecs for encode. It is ordinary state: build one, share it
//! (`Arc<Registry>`) with every encode/decode call, clone it to override
//! bindings in isolation.
//!
//! ## Extension
//!
//! A new value kind is added by registering a codec, either a type that
//! implements [`Codec`] or a pair of closures via [`Registry::register_kind`].
//! Registering a tag that is already bound replaces the previous binding
//! entirely; this is how built-in behavior is overridden.
//!
//! ```rust
//! use tagcodec::{decode, encode, Node, Object, Registry, Style, Value, ValueKind};
//!
//! let registry = Registry::with_builtins();
//! registry.register_kind(
//!     "tag:example.com,2024:point",
//!     ValueKind::Object(Some("Point".into())),
//!     |value, _enc| {
//!         let Value::Object(point) = value else { unreachable!() };
//!         let x = point.fields.get("x").and_then(Value::as_i64).unwrap_or(0);
//!         let y = point.fields.get("y").and_then(Value::as_i64).unwrap_or(0);
//!         Ok(Node::scalar("tag:example.com,2024:point", format!("{},{}", x, y), Style::Plain))
//!     },
//!     |node, _dec| {
//!         let text = node.as_scalar().unwrap_or_default();
//!         let (x, y) = text.split_once(',').unwrap_or(("0", "0"));
//!         Ok(Value::from(
//!             Object::new("Point")
//!                 .with_field("x", x.parse::<i64>().unwrap_or(0))
//!                 .with_field("y", y.parse::<i64>().unwrap_or(0)),
//!         ))
//!     },
//! );
//!
//! let point = Value::from(Object::new("Point").with_field("x", 1).with_field("y", 2));
//! let node = encode(&point, &registry).unwrap();
//! assert_eq!(node.as_scalar(), Some("1,2"));
//! assert_eq!(decode(&node, &registry).unwrap(), point);
//! ```

use crate::{Decoder, Encoder, Error, Fields, Node, Result, Value, ValueKind};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// An encode/decode pair for one value kind.
///
/// `encode` is only called with values whose [`Value::kind`] matches the
/// codec's [`kind`](Codec::kind) (or its generic form). `decode` receives the
/// normalized tag it was resolved under, which for family codecs carries the
/// type name.
pub trait Codec: Send + Sync {
    /// The tag this codec is bound to.
    fn tag(&self) -> &str;

    /// The value kind this codec encodes.
    fn kind(&self) -> ValueKind;

    fn encode(&self, value: &Value, encoder: &mut Encoder<'_>) -> Result<Node>;

    fn decode(&self, tag: &str, node: &Node, decoder: &mut Decoder<'_>) -> Result<Value>;
}

type EncodeFn = dyn Fn(&Value, &mut Encoder<'_>) -> Result<Node> + Send + Sync;
type DecodeFn = dyn Fn(&Node, &mut Decoder<'_>) -> Result<Value> + Send + Sync;

/// A codec assembled from two closures.
pub struct FnCodec {
    tag: String,
    kind: ValueKind,
    encode: Box<EncodeFn>,
    decode: Box<DecodeFn>,
}

impl FnCodec {
    pub fn new<E, D>(tag: impl Into<String>, kind: ValueKind, encode: E, decode: D) -> Self
    where
        E: Fn(&Value, &mut Encoder<'_>) -> Result<Node> + Send + Sync + 'static,
        D: Fn(&Node, &mut Decoder<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        FnCodec {
            tag: tag.into(),
            kind,
            encode: Box::new(encode),
            decode: Box::new(decode),
        }
    }
}

impl Codec for FnCodec {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn kind(&self) -> ValueKind {
        self.kind.clone()
    }

    fn encode(&self, value: &Value, encoder: &mut Encoder<'_>) -> Result<Node> {
        (self.encode)(value, encoder)
    }

    fn decode(&self, _tag: &str, node: &Node, decoder: &mut Decoder<'_>) -> Result<Value> {
        (self.decode)(node, decoder)
    }
}

impl fmt::Debug for FnCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCodec")
            .field("tag", &self.tag)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// One member of a [`StructDef`].
#[derive(Clone, Debug, PartialEq)]
pub struct Member {
    pub name: String,
    /// Value used when the payload omits the member. `None` makes it mandatory.
    pub default: Option<Value>,
}

/// Declared shape of a record type.
///
/// Decoding a record whose name has a definition assigns fields in declared
/// order, fills defaults, and rejects missing mandatory members and members
/// the definition does not name.
///
/// ```rust
/// use tagcodec::{StructDef, Value};
///
/// let def = StructDef::new("Point")
///     .member("x")
///     .member("y")
///     .member_with_default("label", Value::Null);
///
/// assert_eq!(def.members().len(), 3);
/// assert!(def.find("label").and_then(|m| m.default.as_ref()).is_some());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct StructDef {
    name: String,
    members: Vec<Member>,
}

impl StructDef {
    pub fn new(name: impl Into<String>) -> Self {
        StructDef {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Adds a mandatory member.
    #[must_use]
    pub fn member(mut self, name: impl Into<String>) -> Self {
        self.members.push(Member {
            name: name.into(),
            default: None,
        });
        self
    }

    #[must_use]
    pub fn member_with_default(mut self, name: impl Into<String>, default: Value) -> Self {
        self.members.push(Member {
            name: name.into(),
            default: Some(default),
        });
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Builds a value from the whole decoded attribute map of a generic object.
pub type Initializer = dyn Fn(Fields) -> Result<Value> + Send + Sync;

#[derive(Clone, Default)]
struct Tables {
    tags: HashMap<String, Arc<dyn Codec>>,
    families: Vec<(String, Arc<dyn Codec>)>,
    kinds: HashMap<ValueKind, Arc<dyn Codec>>,
    structs: HashMap<String, Arc<StructDef>>,
    initializers: HashMap<String, Arc<Initializer>>,
}

fn same_codec(a: &Arc<dyn Codec>, b: &Arc<dyn Codec>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

/// The tag registry.
///
/// All tables sit behind one `parking_lot::RwLock`. Lookups clone an
/// `Arc<dyn Codec>` out under a short read guard, so codecs never run while
/// the lock is held and may register further codecs themselves.
pub struct Registry {
    tables: RwLock<Tables>,
}

impl Registry {
    /// Creates an empty registry with no codecs at all.
    #[must_use]
    pub fn new() -> Self {
        Registry {
            tables: RwLock::new(Tables::default()),
        }
    }

    /// Creates a registry holding every built-in codec.
    #[must_use]
    pub fn with_builtins() -> Self {
        let registry = Registry::new();
        crate::codecs::register_builtins(&registry);
        registry
    }

    /// Binds a codec to its tag for decode and to its kind for encode.
    ///
    /// A previous codec bound to the same tag is dropped from every table,
    /// including the alias tags and families it was also bound to.
    pub fn register<C: Codec + 'static>(&self, codec: C) {
        self.register_arc(Arc::new(codec));
    }

    pub fn register_arc(&self, codec: Arc<dyn Codec>) {
        let tag = codec.tag().to_string();
        let kind = codec.kind();
        let mut tables = self.tables.write();
        if let Some(previous) = tables.tags.insert(tag.clone(), Arc::clone(&codec)) {
            if !same_codec(&previous, &codec) {
                // decode-only aliases of the old codec go with it
                tables.tags.retain(|t, c| *t == tag || !same_codec(c, &previous));
                tables.kinds.retain(|_, c| !same_codec(c, &previous));
                tables.families.retain(|(_, c)| !same_codec(c, &previous));
            }
            tracing::debug!(tag = %tag, "replaced codec binding");
        }
        tables.kinds.insert(kind, codec);
    }

    /// Registers a value kind from an encode closure and a decode closure.
    pub fn register_kind<E, D>(&self, tag: impl Into<String>, kind: ValueKind, encode: E, decode: D)
    where
        E: Fn(&Value, &mut Encoder<'_>) -> Result<Node> + Send + Sync + 'static,
        D: Fn(&Node, &mut Decoder<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        self.register(FnCodec::new(tag, kind, encode, decode));
    }

    /// Binds an additional tag to a codec for decode only.
    pub fn register_decoder(&self, tag: impl Into<String>, codec: Arc<dyn Codec>) {
        let tag = tag.into();
        if self.tables.write().tags.insert(tag.clone(), codec).is_some() {
            tracing::debug!(tag = %tag, "replaced decoder binding");
        }
    }

    /// Binds every tag starting with `prefix` to a codec for decode.
    ///
    /// Exact tags take precedence; among families the longest prefix wins.
    pub fn register_family(&self, prefix: impl Into<String>, codec: Arc<dyn Codec>) {
        let prefix = prefix.into();
        let mut tables = self.tables.write();
        tables.families.retain(|(p, _)| *p != prefix);
        tables.families.push((prefix, codec));
    }

    /// Declares the members of a record type.
    pub fn define_struct(&self, def: StructDef) {
        let name = def.name().to_string();
        self.tables.write().structs.insert(name, Arc::new(def));
    }

    /// Installs the initializer for generic objects of `class`.
    pub fn register_initializer<F>(&self, class: impl Into<String>, init: F)
    where
        F: Fn(Fields) -> Result<Value> + Send + Sync + 'static,
    {
        self.tables
            .write()
            .initializers
            .insert(class.into(), Arc::new(init));
    }

    /// Resolves a tag to its codec.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTag`] when neither an exact binding nor a
    /// family prefix matches.
    pub fn resolve(&self, tag: &str) -> Result<Arc<dyn Codec>> {
        let tables = self.tables.read();
        if let Some(codec) = tables.tags.get(tag) {
            return Ok(Arc::clone(codec));
        }
        tables
            .families
            .iter()
            .filter(|(prefix, _)| tag.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, codec)| Arc::clone(codec))
            .ok_or_else(|| Error::unknown_tag(tag))
    }

    /// The encoder for a kind: the type-specific binding if any, else the generic one.
    #[must_use]
    pub fn codec_for(&self, kind: &ValueKind) -> Option<Arc<dyn Codec>> {
        let tables = self.tables.read();
        tables
            .kinds
            .get(kind)
            .or_else(|| {
                if kind.is_specialized() {
                    tables.kinds.get(&kind.generic())
                } else {
                    None
                }
            })
            .map(Arc::clone)
    }

    #[must_use]
    pub fn struct_def(&self, name: &str) -> Option<Arc<StructDef>> {
        self.tables.read().structs.get(name).map(Arc::clone)
    }

    #[must_use]
    pub fn initializer(&self, class: &str) -> Option<Arc<Initializer>> {
        self.tables.read().initializers.get(class).map(Arc::clone)
    }

    /// Whether `tag` has an exact binding.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.tables.read().tags.contains_key(tag)
    }

    /// Every exactly bound tag, sorted.
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.tables.read().tags.keys().cloned().collect();
        tags.sort();
        tags
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::with_builtins()
    }
}

impl Clone for Registry {
    /// Copies every table. The copy and the original evolve independently;
    /// codec instances themselves are shared.
    fn clone(&self) -> Self {
        Registry {
            tables: RwLock::new(self.tables.read().clone()),
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tables = self.tables.read();
        f.debug_struct("Registry")
            .field("tags", &tables.tags.len())
            .field("families", &tables.families.len())
            .field("kinds", &tables.kinds.len())
            .field("structs", &tables.structs.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{tag, Style};

    fn constant(tag: &'static str, text: &'static str) -> FnCodec {
        FnCodec::new(
            tag,
            ValueKind::Str,
            move |_, _| Ok(Node::scalar(tag, text, Style::Plain)),
            move |_, _| Ok(Value::from(text)),
        )
    }

    #[test]
    fn test_empty_registry_resolves_nothing() {
        let registry = Registry::new();
        assert_eq!(
            registry.resolve(tag::INT).err(),
            Some(Error::unknown_tag(tag::INT))
        );
        assert!(registry.codec_for(&ValueKind::Int).is_none());
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = Registry::new();
        registry.register(constant("!t", "first"));
        registry.register(constant("!t", "second"));

        let mut decoder = Decoder::new(&registry, Default::default());
        let node = Node::plain("");
        let codec = registry.resolve("!t").unwrap();
        assert_eq!(
            codec.decode("!t", &node, &mut decoder).unwrap(),
            Value::from("second")
        );
        let encoder_codec = registry.codec_for(&ValueKind::Str).unwrap();
        assert!(same_codec(&encoder_codec, &codec));
    }

    #[test]
    fn test_replacing_a_tag_drops_the_old_kind_binding() {
        let registry = Registry::new();
        registry.register(constant("!t", "first"));
        registry.register(FnCodec::new(
            "!t",
            ValueKind::Symbol,
            |_, _| Ok(Node::plain("")),
            |_, _| Ok(Value::Null),
        ));

        assert!(registry.codec_for(&ValueKind::Str).is_none());
        assert!(registry.codec_for(&ValueKind::Symbol).is_some());
    }

    #[test]
    fn test_family_longest_prefix_and_exact_precedence() {
        let registry = Registry::new();
        registry.register_family("!a:", Arc::new(constant("!a", "short")));
        registry.register_family("!a:b:", Arc::new(constant("!ab", "long")));
        registry.register(constant("!a:b:exact", "exact"));

        assert_eq!(registry.resolve("!a:b:c").unwrap().tag(), "!ab");
        assert_eq!(registry.resolve("!a:z").unwrap().tag(), "!a");
        assert_eq!(registry.resolve("!a:b:exact").unwrap().tag(), "!a:b:exact");
        assert!(registry.resolve("!b").is_err());
    }

    #[test]
    fn test_specialized_kind_falls_back_to_generic() {
        let registry = Registry::with_builtins();
        let generic = registry.codec_for(&ValueKind::Object(None)).unwrap();
        let point = registry
            .codec_for(&ValueKind::Object(Some("Point".to_string())))
            .unwrap();
        assert!(same_codec(&generic, &point));
    }

    #[test]
    fn test_clone_is_independent() {
        let registry = Registry::with_builtins();
        let copy = registry.clone();
        copy.register(constant(tag::INT, "shadow"));

        assert_eq!(copy.resolve(tag::INT).unwrap().kind(), ValueKind::Str);
        assert_eq!(registry.resolve(tag::INT).unwrap().kind(), ValueKind::Int);
    }

    #[test]
    fn test_builtin_tags_are_listed() {
        let tags = Registry::with_builtins().tags();
        for expected in [tag::NULL, tag::INT, tag::FLOAT, tag::SYMBOL, tag::RATIONAL] {
            assert!(tags.iter().any(|t| t == expected), "missing {}", expected);
        }
        assert!(tags.windows(2).all(|w| w[0] <= w[1]));
    }
}
