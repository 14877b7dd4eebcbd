//! Implicit tag resolution for untagged nodes.
//!
//! Parsers hand over nodes without tags when the document did not spell one
//! out. Sequences and mappings resolve by shape; plain scalars resolve by
//! content; quoted, literal and folded scalars are always strings.
//!
//! A plain scalar only resolves to a typed tag when that type's parser
//! accepts the text, so `0x_` and `2024-13-45` stay strings.
//!
//! ```rust
//! use tagcodec::{resolver, tag, Node, NodeKind, Style};
//!
//! assert_eq!(resolver::implicit_tag(&Node::plain("42")), tag::INT);
//! assert_eq!(resolver::implicit_tag(&Node::plain("-.Inf")), tag::FLOAT);
//! assert_eq!(resolver::implicit_tag(&Node::plain("2024-01-01")), tag::TIMESTAMP);
//! assert_eq!(resolver::implicit_tag(&Node::plain(":ok")), tag::SYMBOL);
//! assert_eq!(
//!     resolver::implicit_tag(&Node::untagged(NodeKind::Scalar("42".into()), Style::Quoted)),
//!     tag::STR
//! );
//! ```

use crate::codecs::{scalar, timestamp};
use crate::{tag, Node, NodeKind, Style};
use once_cell::sync::Lazy;
use regex::Regex;

static INT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-+]?(?:0x[0-9a-fA-F_]+|0o[0-7_]+|0b[01_]+|0|[1-9][0-9_]*)$")
        .expect("Invalid regex")
});

static FLOAT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^[-+]?(?:[0-9][0-9_]*)?\.[0-9_]*(?:[eE][-+]?[0-9]+)?$",
        r"|^[-+]?[0-9][0-9_]*[eE][-+]?[0-9]+$",
    ))
    .expect("Invalid regex")
});

/// The three float tokens that are not decimal text.
pub const SPECIAL_FLOATS: [&str; 3] = [".Inf", "-.Inf", ".NaN"];

/// Tag for an untagged node.
#[must_use]
pub fn implicit_tag(node: &Node) -> &'static str {
    match node.kind() {
        NodeKind::Mapping(_) => tag::MAP,
        NodeKind::Sequence(_) => tag::SEQ,
        NodeKind::Scalar(_) if node.style() != Style::Plain => tag::STR,
        NodeKind::Scalar(text) => scalar_tag(text),
    }
}

/// Tag a plain scalar with the given text resolves to.
#[must_use]
pub fn scalar_tag(text: &str) -> &'static str {
    match text {
        "" | "~" | "null" => tag::NULL,
        "true" | "false" => tag::BOOL,
        _ if SPECIAL_FLOATS.contains(&text) => tag::FLOAT,
        _ if is_int_text(text) && scalar::parse_int(text).is_some() => tag::INT,
        _ if is_float_text(text) && scalar::parse_float(text).is_some() => tag::FLOAT,
        _ if starts_like_date(text) && timestamp::parse_timestamp(text).is_some() => {
            tag::TIMESTAMP
        }
        _ if text.len() > 1 && text.starts_with(':') => tag::SYMBOL,
        _ => tag::STR,
    }
}

/// Cheap guard before a full timestamp parse: a digit or sign, then a digit.
fn starts_like_date(text: &str) -> bool {
    let bytes = text.as_bytes();
    match bytes.first() {
        Some(b'-' | b'+') => bytes.get(1).map_or(false, u8::is_ascii_digit),
        Some(b) => b.is_ascii_digit(),
        None => false,
    }
}

/// Decimal float text: a fraction, an exponent, or both. Excludes a lone `.`.
#[must_use]
pub fn is_float_text(text: &str) -> bool {
    FLOAT_PATTERN.is_match(text) && text.bytes().any(|b| b.is_ascii_digit())
}

/// Integer text in base 10, or base 16/8/2 with a `0x`/`0o`/`0b` prefix.
#[must_use]
pub fn is_int_text(text: &str) -> bool {
    INT_PATTERN.is_match(text)
}
