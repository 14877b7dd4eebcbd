//! Built-in codecs, one per value kind.
//!
//! | Module | Kinds |
//! |--------|-------|
//! | [`scalar`] | null, bool, int, float, str, binary, symbol |
//! | [`collection`] | seq, map |
//! | [`numeric`] | rational, complex |
//! | [`composite`] | range, struct, exception, generic object |
//! | [`regexp`] | regexp |
//! | [`timestamp`] | timestamp |
//!
//! [`register_builtins`] installs all of them, including decode-only aliases
//! and the tag families for class-suffixed tags. Every codec here is an
//! ordinary [`Codec`](crate::Codec) and can be replaced by registering
//! another codec under the same tag.

pub mod collection;
pub mod composite;
pub mod numeric;
pub mod regexp;
pub mod scalar;
pub mod timestamp;

use crate::{tag, Codec, Error, Node, Registry, Result, Style};
use std::sync::Arc;

/// Installs every built-in codec into `registry`.
pub fn register_builtins(registry: &Registry) {
    registry.register(scalar::NullCodec);
    registry.register(scalar::BoolCodec);
    registry.register(scalar::IntCodec);
    registry.register(scalar::FloatCodec);
    registry.register(scalar::StrCodec);
    registry.register(scalar::BinaryCodec);
    registry.register(collection::SeqCodec);
    registry.register(collection::MapCodec);
    registry.register(numeric::RationalCodec);
    registry.register(numeric::ComplexCodec);
    registry.register(composite::RangeCodec);
    registry.register(regexp::RegexpCodec);

    registry.register_decoder(tag::TRUE, Arc::new(scalar::BoolLiteralCodec(true)));
    registry.register_decoder(tag::FALSE, Arc::new(scalar::BoolLiteralCodec(false)));

    let symbol: Arc<dyn Codec> = Arc::new(scalar::SymbolCodec);
    registry.register_arc(Arc::clone(&symbol));
    registry.register_decoder(tag::SYM, symbol);

    let timestamp: Arc<dyn Codec> = Arc::new(timestamp::TimestampCodec);
    registry.register_arc(Arc::clone(&timestamp));
    registry.register_decoder(tag::TIMESTAMP_YMD, Arc::clone(&timestamp));
    registry.register_decoder(tag::TIME, timestamp);

    let families: [Arc<dyn Codec>; 3] = [
        Arc::new(composite::StructCodec),
        Arc::new(composite::ExceptionCodec),
        Arc::new(composite::ObjectCodec),
    ];
    for codec in families {
        let prefix = tag::family_prefix(codec.tag());
        registry.register_arc(Arc::clone(&codec));
        registry.register_family(prefix, codec);
    }
}

/// Text of a scalar node, or a malformed-payload error naming `tag`.
pub(crate) fn expect_scalar<'n>(tag: &str, node: &'n Node) -> Result<&'n str> {
    node.as_scalar()
        .ok_or_else(|| Error::malformed(tag, "scalar", node.describe()))
}

pub(crate) fn expect_sequence<'n>(tag: &str, node: &'n Node) -> Result<&'n [Node]> {
    node.as_sequence()
        .ok_or_else(|| Error::malformed(tag, "sequence", node.describe()))
}

pub(crate) fn expect_mapping<'n>(tag: &str, node: &'n Node) -> Result<&'n [(Node, Node)]> {
    node.as_mapping()
        .ok_or_else(|| Error::malformed(tag, "mapping", node.describe()))
}

/// Key node for a named field.
pub(crate) fn field_key(name: &str) -> Node {
    Node::scalar(tag::STR, name, Style::Plain)
}
