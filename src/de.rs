//! Deserialization of Rust data from [`Value`]s.
//!
//! The inverse of [`ser`](crate::ser): records, generic objects, exceptions
//! and ranges present themselves as maps keyed by field name, so any
//! `#[derive(Deserialize)]` struct can be rebuilt from them. Fields are
//! assigned by name; a missing field fails unless the type declares a
//! default with `#[serde(default)]`.
//!
//! Kinds with no serde counterpart are handed over in text form: symbols by
//! name, rationals as `n/d`, regular expressions as `/source/flags`,
//! timestamps as RFC 3339.
//!
//! ## Examples
//!
//! ```rust
//! use serde::Deserialize;
//! use tagcodec::{from_value, Record, Value};
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//!     #[serde(default)]
//!     label: String,
//! }
//!
//! let record = Value::from(Record::new("Point").with_field("y", 2).with_field("x", 1));
//! let point: Point = from_value(record).unwrap();
//! assert_eq!(point, Point { x: 1, y: 2, label: String::new() });
//! ```

use crate::{Error, Fields, Result, Value};
use chrono::SecondsFormat;
use num_traits::ToPrimitive;
use serde::de::{self, DeserializeOwned, IntoDeserializer};
use serde::{forward_to_deserialize_any, Deserializer};

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(vec: Vec<Value>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct MapDeserializer {
    iter: std::vec::IntoIter<(Value, Value)>,
    value: Option<Value>,
}

impl MapDeserializer {
    fn new(entries: Vec<(Value, Value)>) -> Self {
        MapDeserializer {
            iter: entries.into_iter(),
            value: None,
        }
    }

    fn from_fields(fields: Fields) -> Self {
        MapDeserializer::new(
            fields
                .into_iter()
                .map(|(k, v)| (Value::String(k), v))
                .collect(),
        )
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(ValueDeserializer::new(key)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct EnumDeserializer {
    variant: String,
    value: Option<Value>,
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let name: de::value::StringDeserializer<Error> = self.variant.into_deserializer();
        let variant = seed.deserialize(name)?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Option<Value>,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Some(Value::Null) | None => Ok(()),
            Some(other) => Err(Error::custom(format!(
                "expected unit variant, found {}",
                other.kind()
            ))),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("expected newtype variant, found unit variant")),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::Array(arr)) => visitor.visit_seq(SeqDeserializer::new(arr)),
            _ => Err(Error::custom("expected tuple variant")),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(value) => ValueDeserializer::new(value).deserialize_any(visitor),
            None => Err(Error::custom("expected struct variant, found unit variant")),
        }
    }
}

/// Deserializer reading from an owned [`Value`].
pub struct ValueDeserializer {
    value: Value,
}

impl ValueDeserializer {
    #[must_use]
    pub fn new(value: Value) -> Self {
        ValueDeserializer { value }
    }
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Int(i) => visitor.visit_i64(i),
            Value::BigInt(b) => {
                if let Some(u) = b.to_u64() {
                    visitor.visit_u64(u)
                } else if let Some(i) = b.to_i128() {
                    visitor.visit_i128(i)
                } else if let Some(u) = b.to_u128() {
                    visitor.visit_u128(u)
                } else {
                    visitor.visit_string(b.to_string())
                }
            }
            Value::Float(f) => visitor.visit_f64(f),
            Value::String(s) => visitor.visit_string(s),
            Value::Binary(bytes) => visitor.visit_byte_buf(bytes),
            Value::Symbol(sym) => visitor.visit_string(sym.name().to_string()),
            Value::Array(arr) => visitor.visit_seq(SeqDeserializer::new(arr)),
            Value::Map(map) => visitor.visit_map(MapDeserializer::new(map.into_iter().collect())),
            Value::Range(range) => visitor.visit_map(MapDeserializer::new(vec![
                (Value::from("begin"), *range.begin),
                (Value::from("end"), *range.end),
                (Value::from("excl"), Value::Bool(range.exclusive)),
            ])),
            Value::Rational(r) => visitor.visit_string(format!("{}/{}", r.numer(), r.denom())),
            Value::Complex(c) => visitor.visit_map(MapDeserializer::new(vec![
                (Value::from("real"), Value::Float(c.re)),
                (Value::from("image"), Value::Float(c.im)),
            ])),
            Value::Struct(record) => visitor.visit_map(MapDeserializer::from_fields(record.fields)),
            Value::Object(object) => visitor.visit_map(MapDeserializer::from_fields(object.fields)),
            Value::Exception(error) => {
                let mut entries = vec![(Value::from("message"), Value::String(error.message))];
                entries.extend(error.attributes.into_iter().map(|(k, v)| (Value::String(k), v)));
                visitor.visit_map(MapDeserializer::new(entries))
            }
            Value::Regexp(re) => visitor.visit_string(re.to_string()),
            Value::Timestamp(ts) => {
                visitor.visit_string(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Value::Shared(cell) => {
                let inner = cell.read().clone();
                ValueDeserializer::new(inner).deserialize_any(visitor)
            }
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Binary(bytes) => visitor.visit_byte_buf(bytes),
            Value::String(s) => visitor.visit_byte_buf(s.into_bytes()),
            other => ValueDeserializer::new(other).deserialize_any(visitor),
        }
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let (variant, value) = match self.value {
            Value::Symbol(sym) => (sym.name().to_string(), None),
            Value::String(s) => (s, None),
            Value::Map(map) if map.len() == 1 => {
                let mut entries = map.into_iter();
                match entries.next() {
                    Some((Value::String(k), v)) => (k, Some(v)),
                    Some((Value::Symbol(k), v)) => (k.name().to_string(), Some(v)),
                    _ => return Err(Error::custom("enum variant key must be a string")),
                }
            }
            other => {
                return Err(Error::custom(format!(
                    "expected enum variant, found {}",
                    other.kind()
                )))
            }
        };
        visitor.visit_enum(EnumDeserializer { variant, value })
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        unit unit_struct seq tuple tuple_struct map struct identifier ignored_any
    }
}

/// Rebuilds any deserializable type from a [`Value`].
///
/// # Errors
///
/// Returns [`Error::Custom`] when the value does not have the shape `T`
/// expects, including missing fields without a declared default.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T> {
    T::deserialize(ValueDeserializer::new(value))
}
