//! Regular expressions as `/source/flags` text.
//!
//! The source runs up to the last `/`, so slashes inside the pattern need no
//! escaping. The mapping form `{regexp: source, mods: flags}` is accepted on
//! decode as well.

use super::expect_scalar;
use crate::{
    tag, Codec, Decoder, Encoder, Error, Node, Regexp, RegexpFlags, Result, Style, Value, ValueKind,
};

pub struct RegexpCodec;

impl RegexpCodec {
    fn compile(tag: &str, source: &str, letters: &str) -> Result<Value> {
        let flags = RegexpFlags::from_letters(letters).ok_or_else(|| {
            Error::malformed(tag, "flag letters from `mix`", format!("`{}`", letters))
        })?;
        Regexp::new(source, flags)
            .map(Value::Regexp)
            .map_err(|e| Error::malformed(tag, "valid regular expression", e.to_string()))
    }

    fn decode_mapping(tag: &str, node: &Node, decoder: &mut Decoder<'_>) -> Result<Value> {
        let fields = decoder.decode_fields(tag, node)?;
        let source = match fields.get("regexp") {
            Some(Value::String(source)) => source.as_str(),
            Some(other) => {
                return Err(Error::malformed(tag, "string", other.to_string()).with_field("regexp"))
            }
            None => return Err(Error::malformed(tag, "`regexp` field", node.describe())),
        };
        let letters = match fields.get("mods") {
            None | Some(Value::Null) => "",
            Some(Value::String(mods)) => mods.as_str(),
            Some(other) => {
                return Err(
                    Error::malformed(tag, "flag letters", other.to_string()).with_field("mods")
                );
            }
        };
        Self::compile(tag, source, letters)
    }
}

impl Codec for RegexpCodec {
    fn tag(&self) -> &str {
        tag::REGEXP
    }

    fn kind(&self) -> ValueKind {
        ValueKind::Regexp
    }

    fn encode(&self, value: &Value, _encoder: &mut Encoder<'_>) -> Result<Node> {
        match value {
            Value::Regexp(re) => Ok(Node::scalar(tag::REGEXP, re.to_string(), Style::Plain)),
            other => Err(Error::custom(format!("regexp codec cannot encode {}", other.kind()))),
        }
    }

    fn decode(&self, tag: &str, node: &Node, decoder: &mut Decoder<'_>) -> Result<Value> {
        if node.is_mapping() {
            return Self::decode_mapping(tag, node, decoder);
        }
        let text = expect_scalar(tag, node)?;
        let body = text
            .strip_prefix('/')
            .ok_or_else(|| Error::malformed(tag, "`/source/flags`", node.describe()))?;
        let (source, letters) = body
            .rsplit_once('/')
            .ok_or_else(|| Error::malformed(tag, "`/source/flags`", node.describe()))?;
        Self::compile(tag, source, letters)
    }
}
