//! Scalar codecs: null, booleans, integers, floats, strings, binary, symbols.
//!
//! All of them emit a single scalar node. Floats use the three exact tokens
//! `.Inf`, `-.Inf` and `.NaN` for the non-finite values; everything else is
//! written as shortest round-trip decimal text, so `-0.0` keeps its sign.
//!
//! ```rust
//! use tagcodec::{decode, encode, Registry, Value};
//!
//! let registry = Registry::with_builtins();
//!
//! let node = encode(&Value::from(f64::NEG_INFINITY), &registry).unwrap();
//! assert_eq!(node.as_scalar(), Some("-.Inf"));
//!
//! let back = decode(&node, &registry).unwrap();
//! assert_eq!(back, Value::from(f64::NEG_INFINITY));
//! ```
//!
//! Strings that are mostly control characters (or contain NUL) are not text
//! and go out under the binary tag as base64. Decoding binary payloads gives
//! back a `String` whenever the bytes are valid UTF-8, and `Value::Binary`
//! only otherwise, so a byte buffer that happens to be UTF-8 comes back as a
//! string.

use super::expect_scalar;
use crate::{
    resolver, tag, Codec, Decoder, Encoder, Error, Node, Result, Style, Symbol, Value, ValueKind,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use num_bigint::BigInt;

/// Parses integer text: optional sign, `_` separators, `0x`/`0o`/`0b` prefixes.
#[must_use]
pub fn parse_int(text: &str) -> Option<BigInt> {
    let text = text.trim();
    let (negative, unsigned) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let (radix, digits) = if let Some(rest) = unsigned.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = unsigned.strip_prefix("0o") {
        (8, rest)
    } else if let Some(rest) = unsigned.strip_prefix("0b") {
        (2, rest)
    } else {
        (10, unsigned)
    };
    let digits: String = digits.chars().filter(|&c| c != '_').collect();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    let magnitude = BigInt::parse_bytes(digits.as_bytes(), radix)?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Parses float text: the special tokens, decimal text, or decimal integer text.
///
/// Spellings such as `inf` or `NaN` that are not one of the exact tokens are
/// rejected.
#[must_use]
pub fn parse_float(text: &str) -> Option<f64> {
    let text = text.trim();
    match text {
        ".Inf" | "+.Inf" => return Some(f64::INFINITY),
        "-.Inf" => return Some(f64::NEG_INFINITY),
        ".NaN" => return Some(f64::NAN),
        _ => {}
    }
    let decimal_int = resolver::is_int_text(text) && !text.contains(['x', 'o', 'b']);
    if !decimal_int && !resolver::is_float_text(text) {
        return None;
    }
    let cleaned: String = text.chars().filter(|&c| c != '_').collect();
    cleaned.parse::<f64>().ok()
}

/// Float text as emitted by [`FloatCodec`].
#[must_use]
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        ".NaN".to_string()
    } else if value == f64::INFINITY {
        ".Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-.Inf".to_string()
    } else {
        format!("{:?}", value)
    }
}

/// Whether a string should be emitted as binary rather than text.
#[must_use]
pub fn is_binary_text(text: &str) -> bool {
    if text.contains('\0') {
        return true;
    }
    let total = text.chars().count();
    let control = text
        .chars()
        .filter(|&c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
        .count();
    total > 0 && control * 10 > total * 3
}

/// Presentation style that keeps a string a string when read back untagged.
#[must_use]
pub fn string_style(text: &str) -> Style {
    if text.contains('\n') {
        Style::Literal
    } else if text.is_empty()
        || text.starts_with(':')
        || text.starts_with(char::is_whitespace)
        || text.ends_with(char::is_whitespace)
        || resolver::scalar_tag(text) != tag::STR
    {
        Style::Quoted
    } else {
        Style::Plain
    }
}

fn unexpected(value: &Value, codec: &str) -> Error {
    Error::custom(format!("{} codec cannot encode {}", codec, value.kind()))
}

pub struct NullCodec;

impl Codec for NullCodec {
    fn tag(&self) -> &str {
        tag::NULL
    }

    fn kind(&self) -> ValueKind {
        ValueKind::Null
    }

    fn encode(&self, _value: &Value, _encoder: &mut Encoder<'_>) -> Result<Node> {
        Ok(Node::scalar(tag::NULL, "", Style::Plain))
    }

    fn decode(&self, tag: &str, node: &Node, _decoder: &mut Decoder<'_>) -> Result<Value> {
        match expect_scalar(tag, node)? {
            "" | "~" | "null" => Ok(Value::Null),
            _ => Err(Error::malformed(tag, "`~`, `null` or empty text", node.describe())),
        }
    }
}

pub struct BoolCodec;

impl Codec for BoolCodec {
    fn tag(&self) -> &str {
        tag::BOOL
    }

    fn kind(&self) -> ValueKind {
        ValueKind::Bool
    }

    fn encode(&self, value: &Value, _encoder: &mut Encoder<'_>) -> Result<Node> {
        let b = value.as_bool().ok_or_else(|| unexpected(value, "bool"))?;
        Ok(Node::scalar(tag::BOOL, if b { "true" } else { "false" }, Style::Plain))
    }

    fn decode(&self, tag: &str, node: &Node, _decoder: &mut Decoder<'_>) -> Result<Value> {
        match expect_scalar(tag, node)? {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(Error::malformed(tag, "`true` or `false`", node.describe())),
        }
    }
}

/// Decode-only codec for the tags that fix the boolean in the tag itself.
pub struct BoolLiteralCodec(pub bool);

impl Codec for BoolLiteralCodec {
    fn tag(&self) -> &str {
        if self.0 {
            tag::TRUE
        } else {
            tag::FALSE
        }
    }

    fn kind(&self) -> ValueKind {
        ValueKind::Bool
    }

    fn encode(&self, _value: &Value, _encoder: &mut Encoder<'_>) -> Result<Node> {
        let text = if self.0 { "true" } else { "false" };
        Ok(Node::scalar(self.tag(), text, Style::Plain))
    }

    fn decode(&self, tag: &str, node: &Node, _decoder: &mut Decoder<'_>) -> Result<Value> {
        expect_scalar(tag, node)?;
        Ok(Value::Bool(self.0))
    }
}

pub struct IntCodec;

impl Codec for IntCodec {
    fn tag(&self) -> &str {
        tag::INT
    }

    fn kind(&self) -> ValueKind {
        ValueKind::Int
    }

    fn encode(&self, value: &Value, _encoder: &mut Encoder<'_>) -> Result<Node> {
        let text = match value {
            Value::Int(i) => i.to_string(),
            Value::BigInt(b) => b.to_string(),
            other => return Err(unexpected(other, "int")),
        };
        Ok(Node::scalar(tag::INT, text, Style::Plain))
    }

    fn decode(&self, tag: &str, node: &Node, _decoder: &mut Decoder<'_>) -> Result<Value> {
        let text = expect_scalar(tag, node)?;
        parse_int(text)
            .map(Value::from_bigint)
            .ok_or_else(|| Error::malformed(tag, "integer text", node.describe()))
    }
}

pub struct FloatCodec;

impl Codec for FloatCodec {
    fn tag(&self) -> &str {
        tag::FLOAT
    }

    fn kind(&self) -> ValueKind {
        ValueKind::Float
    }

    fn encode(&self, value: &Value, _encoder: &mut Encoder<'_>) -> Result<Node> {
        match value {
            Value::Float(f) => Ok(Node::scalar(tag::FLOAT, format_float(*f), Style::Plain)),
            other => Err(unexpected(other, "float")),
        }
    }

    fn decode(&self, tag: &str, node: &Node, _decoder: &mut Decoder<'_>) -> Result<Value> {
        let text = expect_scalar(tag, node)?;
        parse_float(text)
            .map(Value::Float)
            .ok_or_else(|| {
                Error::malformed(tag, "decimal text, `.Inf`, `-.Inf` or `.NaN`", node.describe())
            })
    }
}

pub struct StrCodec;

impl Codec for StrCodec {
    fn tag(&self) -> &str {
        tag::STR
    }

    fn kind(&self) -> ValueKind {
        ValueKind::Str
    }

    fn encode(&self, value: &Value, _encoder: &mut Encoder<'_>) -> Result<Node> {
        let text = value.as_str().ok_or_else(|| unexpected(value, "str"))?;
        if is_binary_text(text) {
            return Ok(encode_binary(text.as_bytes()));
        }
        Ok(Node::scalar(tag::STR, text, string_style(text)))
    }

    fn decode(&self, tag: &str, node: &Node, _decoder: &mut Decoder<'_>) -> Result<Value> {
        expect_scalar(tag, node).map(Value::from)
    }
}

fn encode_binary(bytes: &[u8]) -> Node {
    Node::scalar(tag::BINARY, STANDARD.encode(bytes), Style::Literal)
}

/// Base64 byte strings. A payload that is valid UTF-8 decodes to [`Value::String`].
pub struct BinaryCodec;

impl Codec for BinaryCodec {
    fn tag(&self) -> &str {
        tag::BINARY
    }

    fn kind(&self) -> ValueKind {
        ValueKind::Binary
    }

    fn encode(&self, value: &Value, _encoder: &mut Encoder<'_>) -> Result<Node> {
        match value {
            Value::Binary(bytes) => Ok(encode_binary(bytes)),
            other => Err(unexpected(other, "binary")),
        }
    }

    fn decode(&self, tag: &str, node: &Node, _decoder: &mut Decoder<'_>) -> Result<Value> {
        let text = expect_scalar(tag, node)?;
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| Error::malformed(tag, "base64 text", e.to_string()))?;
        Ok(match String::from_utf8(bytes) {
            Ok(text) => Value::String(text),
            Err(err) => Value::Binary(err.into_bytes()),
        })
    }
}

pub struct SymbolCodec;

impl Codec for SymbolCodec {
    fn tag(&self) -> &str {
        tag::SYMBOL
    }

    fn kind(&self) -> ValueKind {
        ValueKind::Symbol
    }

    fn encode(&self, value: &Value, _encoder: &mut Encoder<'_>) -> Result<Node> {
        let symbol = value.as_symbol().ok_or_else(|| unexpected(value, "symbol"))?;
        Ok(Node::scalar(tag::SYMBOL, symbol.inspect(), Style::Plain))
    }

    fn decode(&self, tag: &str, node: &Node, _decoder: &mut Decoder<'_>) -> Result<Value> {
        let text = expect_scalar(tag, node)?;
        let name = text.strip_prefix(':').unwrap_or(text);
        let name = match name.strip_prefix('"').and_then(|n| n.strip_suffix('"')) {
            Some(quoted) => unescape(quoted),
            None if name.is_empty() => {
                return Err(Error::malformed(tag, "symbol name", node.describe()))
            }
            None => name.to_string(),
        };
        Ok(Value::Symbol(Symbol::new(name)))
    }
}

fn unescape(quoted: &str) -> String {
    let mut out = String::with_capacity(quoted.len());
    let mut chars = quoted.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode, encode, Registry};

    fn roundtrip(value: Value) -> Value {
        let registry = Registry::with_builtins();
        let node = encode(&value, &registry).unwrap();
        decode(&node, &registry).unwrap()
    }

    #[test]
    fn test_parse_int_forms() {
        assert_eq!(parse_int("42"), Some(BigInt::from(42)));
        assert_eq!(parse_int("-1_000"), Some(BigInt::from(-1000)));
        assert_eq!(parse_int("0x1f"), Some(BigInt::from(31)));
        assert_eq!(parse_int("0o17"), Some(BigInt::from(15)));
        assert_eq!(parse_int("+0b101"), Some(BigInt::from(5)));
        assert_eq!(parse_int("12abc"), None);
        assert_eq!(parse_int("-"), None);
        assert_eq!(parse_int("--5"), None);
    }

    #[test]
    fn test_parse_float_rejects_words() {
        assert_eq!(parse_float("3.25"), Some(3.25));
        assert_eq!(parse_float("1_000.5"), Some(1000.5));
        assert_eq!(parse_float("7"), Some(7.0));
        assert!(parse_float(".NaN").map_or(false, f64::is_nan));
        assert_eq!(parse_float("inf"), None);
        assert_eq!(parse_float("NaN"), None);
        assert_eq!(parse_float(".nan"), None);
        assert_eq!(parse_float("0x10"), None);
    }

    #[test]
    fn test_float_edge_values() {
        assert_eq!(format_float(f64::INFINITY), ".Inf");
        assert_eq!(format_float(f64::NEG_INFINITY), "-.Inf");
        assert_eq!(format_float(f64::NAN), ".NaN");
        assert_eq!(format_float(1.0), "1.0");

        match roundtrip(Value::Float(-0.0)) {
            Value::Float(f) => assert!(f == 0.0 && f.is_sign_negative()),
            other => panic!("unexpected: {:?}", other),
        }
        match roundtrip(Value::Float(f64::NAN)) {
            Value::Float(f) => assert!(f.is_nan()),
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(roundtrip(Value::Float(1e300)), Value::Float(1e300));
    }

    #[test]
    fn test_int_overflow_becomes_bigint() {
        let registry = Registry::with_builtins();
        let node = Node::scalar(tag::INT, "123456789012345678901234567890", Style::Plain);
        assert!(matches!(decode(&node, &registry).unwrap(), Value::BigInt(_)));

        let bad = Node::scalar(tag::INT, "4x", Style::Plain);
        assert!(matches!(
            decode(&bad, &registry),
            Err(Error::MalformedPayload { .. })
        ));
    }

    #[test]
    fn test_string_styles() {
        assert_eq!(string_style("hello"), Style::Plain);
        assert_eq!(string_style(""), Style::Quoted);
        assert_eq!(string_style("42"), Style::Quoted);
        assert_eq!(string_style("true"), Style::Quoted);
        assert_eq!(string_style(":sym"), Style::Quoted);
        assert_eq!(string_style(" padded"), Style::Quoted);
        assert_eq!(string_style("two\nlines"), Style::Literal);
    }

    #[test]
    fn test_quoted_strings_survive_implicit_typing() {
        for text in ["", "42", "null", "2024-01-01", ":x", "3.5"] {
            assert_eq!(roundtrip(Value::from(text)), Value::from(text), "{:?}", text);
        }
    }

    #[test]
    fn test_control_heavy_strings_go_binary() {
        let text = "\u{1}\u{2}\u{3}ab";
        assert!(is_binary_text(text));
        assert!(is_binary_text("nul\0inside"));
        assert!(!is_binary_text("tab\tand\nnewline"));

        let registry = Registry::with_builtins();
        let node = encode(&Value::from(text), &registry).unwrap();
        assert_eq!(node.tag(), Some(tag::BINARY));
        assert_eq!(node.style(), Style::Literal);
        assert_eq!(decode(&node, &registry).unwrap(), Value::from(text));
    }

    #[test]
    fn test_binary_bytes() {
        let bytes = vec![0xff, 0xfe, 0x00, 0x80];
        assert_eq!(roundtrip(Value::Binary(bytes.clone())), Value::Binary(bytes));

        let registry = Registry::with_builtins();
        let wrapped = Node::scalar(tag::BINARY, "aGVs\nbG8=\n", Style::Literal);
        assert_eq!(decode(&wrapped, &registry).unwrap(), Value::from("hello"));
    }

    #[test]
    fn test_utf8_binary_decodes_as_string() {
        assert_eq!(roundtrip(Value::Binary(b"hello".to_vec())), Value::from("hello"));
        assert_eq!(roundtrip(Value::Binary(Vec::new())), Value::from(""));

        let latin1 = vec![b'c', b'a', b'f', 0xe9];
        assert_eq!(roundtrip(Value::Binary(latin1.clone())), Value::Binary(latin1));
    }

    #[test]
    fn test_symbols() {
        assert_eq!(roundtrip(Value::from(Symbol::new("ok"))), Value::from(Symbol::new("ok")));
        assert_eq!(
            roundtrip(Value::from(Symbol::new("two \"words\""))),
            Value::from(Symbol::new("two \"words\""))
        );

        let registry = Registry::with_builtins();
        let bare = Node::scalar(tag::SYM, "name", Style::Plain);
        assert_eq!(decode(&bare, &registry).unwrap(), Value::from(Symbol::new("name")));
        let empty = Node::scalar(tag::SYMBOL, ":", Style::Plain);
        assert!(decode(&empty, &registry).is_err());
    }

    #[test]
    fn test_bool_and_null_literals() {
        let registry = Registry::with_builtins();
        assert_eq!(roundtrip(Value::Bool(false)), Value::Bool(false));
        assert_eq!(roundtrip(Value::Null), Value::Null);

        let yes = Node::scalar(tag::TRUE, "yes", Style::Plain);
        assert_eq!(decode(&yes, &registry).unwrap(), Value::Bool(true));
        let no = Node::scalar(tag::BOOL, "no", Style::Plain);
        assert!(decode(&no, &registry).is_err());
        let tilde = Node::scalar(tag::NULL, "~", Style::Plain);
        assert_eq!(decode(&tilde, &registry).unwrap(), Value::Null);
    }
}
