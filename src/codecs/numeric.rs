//! Rational and complex numbers.
//!
//! Both are emitted as mappings with named parts and both accept a bare
//! scalar text form on decode:
//!
//! | Kind | Mapping fields (emit order) | Scalar forms |
//! |------|-----------------------------|--------------|
//! | rational | `denominator`, `numerator` | `3/4`, `-5` |
//! | complex | `image`, `real` | `1+2i`, `(1-2.5i)`, `3i`, `-i`, `4` |
//!
//! Mapping fields are looked up by name, never by position.
//!
//! ```rust
//! use num_rational::BigRational;
//! use tagcodec::{decode, encode, Registry, Value};
//!
//! let registry = Registry::with_builtins();
//! let three_quarters = Value::from(BigRational::new(3.into(), 4.into()));
//!
//! let node = encode(&three_quarters, &registry).unwrap();
//! assert_eq!(node.get("numerator").and_then(|n| n.as_scalar()), Some("3"));
//! assert_eq!(decode(&node, &registry).unwrap(), three_quarters);
//! ```

use super::scalar::{parse_float, parse_int};
use super::field_key;
use crate::{tag, Codec, Decoder, Encoder, Error, Node, Result, Style, Value, ValueKind};
use num_bigint::BigInt;
use num_complex::Complex64;
use num_rational::BigRational;
use num_traits::{One, Zero};

/// Parses `n/d` or `n`.
#[must_use]
pub fn parse_rational(text: &str) -> Option<BigRational> {
    let (numer, denom) = match text.trim().split_once('/') {
        Some((n, d)) => (parse_int(n)?, parse_int(d)?),
        None => (parse_int(text)?, BigInt::one()),
    };
    if denom.is_zero() {
        return None;
    }
    Some(BigRational::new(numer, denom))
}

/// Parses `a+bi`, `a-bi`, `bi`, `i`, `-i` or `a`, optionally in parentheses.
#[must_use]
pub fn parse_complex(text: &str) -> Option<Complex64> {
    let text = text.trim();
    let text = text
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .unwrap_or(text);

    let Some(body) = text.strip_suffix('i') else {
        return parse_float(text).map(|re| Complex64::new(re, 0.0));
    };
    let split = body
        .char_indices()
        .filter(|&(i, c)| {
            (c == '+' || c == '-') && i > 0 && !matches!(body.as_bytes()[i - 1], b'e' | b'E')
        })
        .map(|(i, _)| i)
        .last();
    let (real, imag) = match split {
        Some(i) => (parse_float(&body[..i])?, &body[i..]),
        None => (0.0, body),
    };
    let imag = match imag {
        "" | "+" => 1.0,
        "-" => -1.0,
        other => parse_float(other)?,
    };
    Some(Complex64::new(real, imag))
}

fn integer_part(value: &Value) -> Option<BigInt> {
    match value {
        Value::String(s) => parse_int(s),
        other => other.as_bigint(),
    }
}

fn float_part(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => parse_float(s),
        other => other.as_f64(),
    }
}

pub struct RationalCodec;

impl Codec for RationalCodec {
    fn tag(&self) -> &str {
        tag::RATIONAL
    }

    fn kind(&self) -> ValueKind {
        ValueKind::Rational
    }

    fn encode(&self, value: &Value, encoder: &mut Encoder<'_>) -> Result<Node> {
        let Value::Rational(ratio) = value else {
            return Err(Error::custom(format!("rational codec cannot encode {}", value.kind())));
        };
        let mut node = Node::mapping(tag::RATIONAL, Style::Plain);
        node.add_pair(
            field_key("denominator"),
            encoder.encode(&Value::from_bigint(ratio.denom().clone()))?,
        );
        node.add_pair(
            field_key("numerator"),
            encoder.encode(&Value::from_bigint(ratio.numer().clone()))?,
        );
        Ok(node)
    }

    fn decode(&self, tag: &str, node: &Node, decoder: &mut Decoder<'_>) -> Result<Value> {
        if let Some(text) = node.as_scalar() {
            return parse_rational(text)
                .map(Value::Rational)
                .ok_or_else(|| Error::malformed(tag, "`n/d` rational text", node.describe()));
        }
        let fields = decoder.decode_fields(tag, node)?;

        let numer = match fields.get("numerator") {
            Some(v) => integer_part(v).ok_or_else(|| {
                Error::malformed(tag, "integer", v.to_string()).with_field("numerator")
            })?,
            None => return Err(Error::malformed(tag, "`numerator` field", node.describe())),
        };
        let denom = match fields.get("denominator") {
            Some(v) => integer_part(v).ok_or_else(|| {
                Error::malformed(tag, "integer", v.to_string()).with_field("denominator")
            })?,
            None => BigInt::one(),
        };
        if denom.is_zero() {
            return Err(Error::malformed(tag, "nonzero integer", "0").with_field("denominator"));
        }
        Ok(Value::Rational(BigRational::new(numer, denom)))
    }
}

pub struct ComplexCodec;

impl Codec for ComplexCodec {
    fn tag(&self) -> &str {
        tag::COMPLEX
    }

    fn kind(&self) -> ValueKind {
        ValueKind::Complex
    }

    fn encode(&self, value: &Value, encoder: &mut Encoder<'_>) -> Result<Node> {
        let Value::Complex(c) = value else {
            return Err(Error::custom(format!("complex codec cannot encode {}", value.kind())));
        };
        let mut node = Node::mapping(tag::COMPLEX, Style::Plain);
        node.add_pair(field_key("image"), encoder.encode(&Value::Float(c.im))?);
        node.add_pair(field_key("real"), encoder.encode(&Value::Float(c.re))?);
        Ok(node)
    }

    fn decode(&self, tag: &str, node: &Node, decoder: &mut Decoder<'_>) -> Result<Value> {
        if let Some(text) = node.as_scalar() {
            return parse_complex(text)
                .map(Value::Complex)
                .ok_or_else(|| Error::malformed(tag, "`a+bi` complex text", node.describe()));
        }
        let fields = decoder.decode_fields(tag, node)?;

        let part = |name: &str| -> Result<f64> {
            match fields.get(name) {
                Some(v) => float_part(v)
                    .ok_or_else(|| Error::malformed(tag, "number", v.to_string()).with_field(name)),
                None => Ok(0.0),
            }
        };
        let re = part("real")?;
        let im = part("image")?;
        Ok(Value::Complex(Complex64::new(re, im)))
    }
}
