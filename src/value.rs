//! Native value representation.
//!
//! [`Value`] covers every kind the codec family knows how to tag: primitives,
//! collections, records, numeric extensions and timestamps. Application-defined
//! composites are either records ([`Record`], member order significant) or
//! generic objects ([`Object`], emitted in sorted attribute order).
//!
//! ## Core Types
//!
//! - [`Value`]: the value enum
//! - [`ValueKind`]: the runtime kind used to pick an encoder
//! - [`Symbol`], [`RangeValue`], [`Record`], [`ErrorValue`], [`Regexp`], [`Object`]
//! - [`Shared`]: an aliasable cell, the only way to build self-referential values
//!
//! ## Usage Patterns
//!
//! ```rust
//! use tagcodec::{Value, Symbol, RangeValue};
//!
//! let number = Value::from(42);
//! let text = Value::from("hello");
//! let sym = Value::from(Symbol::new("ok"));
//! let range = Value::from(RangeValue::new(Value::from(1), Value::from(5), true));
//!
//! assert!(number.is_int());
//! assert_eq!(text.as_str(), Some("hello"));
//! assert_eq!(sym.to_string(), ":ok");
//! assert_eq!(range.to_string(), "1...5");
//! ```

use crate::{Fields, Mapping};
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use num_bigint::BigInt;
use num_complex::Complex64;
use num_rational::BigRational;
use num_traits::ToPrimitive;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A dynamically-typed native value.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    /// Integers outside the `i64` range.
    BigInt(BigInt),
    Float(f64),
    String(String),
    /// A byte string that is not text.
    Binary(Vec<u8>),
    Symbol(Symbol),
    Array(Vec<Value>),
    Map(Mapping),
    Range(RangeValue),
    Rational(BigRational),
    Complex(Complex64),
    Struct(Record),
    Exception(ErrorValue),
    Regexp(Regexp),
    Timestamp(DateTime<FixedOffset>),
    Object(Object),
    Shared(Shared),
}

/// The runtime kind of a [`Value`], used as the encoder dispatch key.
///
/// Composite kinds carry the type name when it is known, so a codec
/// registered for `Object(Some("Point"))` is preferred over the generic
/// `Object(None)` codec for values of that class.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Binary,
    Symbol,
    Seq,
    Map,
    Range,
    Rational,
    Complex,
    Struct(Option<String>),
    Exception(Option<String>),
    Regexp,
    Timestamp,
    Object(Option<String>),
}

impl ValueKind {
    /// The kind with any type name stripped.
    #[must_use]
    pub fn generic(&self) -> ValueKind {
        match self {
            ValueKind::Struct(_) => ValueKind::Struct(None),
            ValueKind::Exception(_) => ValueKind::Exception(None),
            ValueKind::Object(_) => ValueKind::Object(None),
            other => other.clone(),
        }
    }

    #[must_use]
    pub fn is_specialized(&self) -> bool {
        matches!(
            self,
            ValueKind::Struct(Some(_)) | ValueKind::Exception(Some(_)) | ValueKind::Object(Some(_))
        )
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (base, class) = match self {
            ValueKind::Null => ("null", None),
            ValueKind::Bool => ("bool", None),
            ValueKind::Int => ("int", None),
            ValueKind::Float => ("float", None),
            ValueKind::Str => ("str", None),
            ValueKind::Binary => ("binary", None),
            ValueKind::Symbol => ("symbol", None),
            ValueKind::Seq => ("seq", None),
            ValueKind::Map => ("map", None),
            ValueKind::Range => ("range", None),
            ValueKind::Rational => ("rational", None),
            ValueKind::Complex => ("complex", None),
            ValueKind::Struct(name) => ("struct", name.as_deref()),
            ValueKind::Exception(name) => ("exception", name.as_deref()),
            ValueKind::Regexp => ("regexp", None),
            ValueKind::Timestamp => ("timestamp", None),
            ValueKind::Object(name) => ("object", name.as_deref()),
        };
        match class {
            Some(class) => write!(f, "{} {}", base, class),
            None => f.write_str(base),
        }
    }
}

/// An interned-style name. Compared and emitted by name, never as free text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Symbol(name.into())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Whether the name can be written after `:` without quoting.
    #[must_use]
    pub fn is_plain(name: &str) -> bool {
        let mut chars = name.chars();
        let first_ok = chars
            .next()
            .map_or(false, |c| c.is_alphabetic() || c == '_');
        if !first_ok {
            return false;
        }
        let body = name.trim_end_matches(['?', '!', '=']);
        let trailing = name.len() - body.len();
        trailing <= 1 && body.chars().all(|c| c.is_alphanumeric() || c == '_')
    }

    /// The marker-prefixed text form: `:name`, or `:"quoted name"` when needed.
    #[must_use]
    pub fn inspect(&self) -> String {
        if Symbol::is_plain(&self.0) {
            format!(":{}", self.0)
        } else {
            let escaped = self.0.replace('\\', "\\\\").replace('"', "\\\"");
            format!(":\"{}\"", escaped)
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inspect())
    }
}

/// An interval between two values, closed or half-open at the end.
#[derive(Clone, Debug, PartialEq, Hash)]
pub struct RangeValue {
    pub begin: Box<Value>,
    pub end: Box<Value>,
    pub exclusive: bool,
}

impl RangeValue {
    pub fn new(begin: Value, end: Value, exclusive: bool) -> Self {
        RangeValue {
            begin: Box::new(begin),
            end: Box::new(end),
            exclusive,
        }
    }

    /// `begin..end`
    pub fn inclusive(begin: Value, end: Value) -> Self {
        RangeValue::new(begin, end, false)
    }

    /// `begin...end`
    pub fn exclusive(begin: Value, end: Value) -> Self {
        RangeValue::new(begin, end, true)
    }
}

/// A record: a named composite whose member order is part of its identity.
#[derive(Clone, Debug, PartialEq, Default, Hash)]
pub struct Record {
    pub name: String,
    pub fields: Fields,
}

impl Record {
    pub fn new(name: impl Into<String>) -> Self {
        Record {
            name: name.into(),
            fields: Fields::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

/// An exception/error value: a class name, a message and extra attributes.
#[derive(Clone, Debug, PartialEq, Default, Hash)]
pub struct ErrorValue {
    pub class: String,
    pub message: String,
    pub attributes: Fields,
}

impl ErrorValue {
    pub fn new(class: impl Into<String>, message: impl Into<String>) -> Self {
        ErrorValue {
            class: class.into(),
            message: message.into(),
            attributes: Fields::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

/// A composite with no dedicated codec: a class name and named attributes.
#[derive(Clone, Debug, PartialEq, Default, Hash)]
pub struct Object {
    pub class: String,
    pub fields: Fields,
}

impl Object {
    pub fn new(class: impl Into<String>) -> Self {
        Object {
            class: class.into(),
            fields: Fields::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

/// Regular-expression options, written as the letters `m`, `i`, `x`.
///
/// `m` lets `.` match newlines, `i` ignores case, `x` ignores pattern
/// whitespace and allows comments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct RegexpFlags {
    pub multiline: bool,
    pub ignore_case: bool,
    pub extended: bool,
}

impl RegexpFlags {
    /// Parses flag letters. Returns `None` on any letter outside `m`, `i`, `x`.
    #[must_use]
    pub fn from_letters(letters: &str) -> Option<Self> {
        let mut flags = RegexpFlags::default();
        for c in letters.chars() {
            match c {
                'm' => flags.multiline = true,
                'i' => flags.ignore_case = true,
                'x' => flags.extended = true,
                _ => return None,
            }
        }
        Some(flags)
    }

    /// Letters in canonical `mix` order.
    #[must_use]
    pub fn letters(&self) -> String {
        let mut out = String::with_capacity(3);
        if self.multiline {
            out.push('m');
        }
        if self.ignore_case {
            out.push('i');
        }
        if self.extended {
            out.push('x');
        }
        out
    }
}

/// A compiled regular expression together with its source and flags.
#[derive(Clone, Debug)]
pub struct Regexp {
    source: String,
    flags: RegexpFlags,
    compiled: regex::Regex,
}

impl Regexp {
    /// Compiles `source` with the given flags.
    ///
    /// # Errors
    ///
    /// Returns the engine's error when the pattern does not compile.
    pub fn new(source: impl Into<String>, flags: RegexpFlags) -> Result<Self, regex::Error> {
        let source = source.into();
        let compiled = regex::RegexBuilder::new(&source)
            .case_insensitive(flags.ignore_case)
            .ignore_whitespace(flags.extended)
            .dot_matches_new_line(flags.multiline)
            .build()?;
        Ok(Regexp {
            source,
            flags,
            compiled,
        })
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub const fn flags(&self) -> RegexpFlags {
        self.flags
    }

    #[must_use]
    pub fn as_regex(&self) -> &regex::Regex {
        &self.compiled
    }

    #[must_use]
    pub fn is_match(&self, haystack: &str) -> bool {
        self.compiled.is_match(haystack)
    }
}

impl PartialEq for Regexp {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.flags == other.flags
    }
}

impl Hash for Regexp {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
        self.flags.hash(state);
    }
}

impl fmt::Display for Regexp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags.letters())
    }
}

/// A shared, mutable cell. Cloning a `Shared` aliases the same cell.
///
/// This is the only way to build a value graph with aliasing or cycles;
/// everything else in [`Value`] is an owned tree.
#[derive(Clone, Default)]
pub struct Shared(Arc<RwLock<Value>>);

impl Shared {
    pub fn new(value: Value) -> Self {
        Shared(Arc::new(RwLock::new(value)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Value> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Value> {
        self.0.write()
    }

    /// Identity of the cell, stable for its lifetime.
    #[must_use]
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Shared) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Shared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shared({:#x})", self.id())
    }
}

impl PartialEq for Shared {
    /// Cells are equal when they alias or hold equal values.
    /// Comparing two distinct cyclic graphs does not terminate.
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.read() == *other.read()
    }
}

impl Hash for Shared {
    /// Hashes the content, matching equality. Hashing a cell that contains
    /// itself does not terminate.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.read().hash(state);
    }
}

fn hash_float<H: Hasher>(f: f64, state: &mut H) {
    // 0.0 == -0.0, so both hash alike; NaN equals nothing and may hash anyhow
    let bits = if f == 0.0 { 0 } else { f.to_bits() };
    state.write_u64(bits);
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(n) => n.hash(state),
            Value::BigInt(n) => n.hash(state),
            Value::Float(f) => hash_float(*f, state),
            Value::String(s) => s.hash(state),
            Value::Binary(bytes) => bytes.hash(state),
            Value::Symbol(sym) => sym.hash(state),
            Value::Array(items) => items.hash(state),
            Value::Map(map) => map.hash(state),
            Value::Range(range) => range.hash(state),
            Value::Rational(r) => r.hash(state),
            Value::Complex(c) => {
                hash_float(c.re, state);
                hash_float(c.im, state);
            }
            Value::Struct(record) => record.hash(state),
            Value::Exception(error) => error.hash(state),
            Value::Regexp(re) => re.hash(state),
            Value::Timestamp(ts) => ts.hash(state),
            Value::Object(object) => object.hash(state),
            Value::Shared(cell) => cell.hash(state),
        }
    }
}

impl Value {
    /// The runtime kind of this value. Shared cells report the kind of their content.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) | Value::BigInt(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::Str,
            Value::Binary(_) => ValueKind::Binary,
            Value::Symbol(_) => ValueKind::Symbol,
            Value::Array(_) => ValueKind::Seq,
            Value::Map(_) => ValueKind::Map,
            Value::Range(_) => ValueKind::Range,
            Value::Rational(_) => ValueKind::Rational,
            Value::Complex(_) => ValueKind::Complex,
            Value::Struct(record) => ValueKind::Struct(named(&record.name)),
            Value::Exception(error) => ValueKind::Exception(named(&error.class)),
            Value::Regexp(_) => ValueKind::Regexp,
            Value::Timestamp(_) => ValueKind::Timestamp,
            Value::Object(object) => ValueKind::Object(named(&object.class)),
            Value::Shared(shared) => shared.read().kind(),
        }
    }

    /// Builds an integer value, using `Int` whenever it fits in an `i64`.
    #[must_use]
    pub fn from_bigint(value: BigInt) -> Self {
        match value.to_i64() {
            Some(i) => Value::Int(i),
            None => Value::BigInt(value),
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_int(&self) -> bool {
        matches!(self, Value::Int(_) | Value::BigInt(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::BigInt(b) => b.to_i64(),
            _ => None,
        }
    }

    /// Any integer as a `BigInt`.
    #[must_use]
    pub fn as_bigint(&self) -> Option<BigInt> {
        match self {
            Value::Int(i) => Some(BigInt::from(*i)),
            Value::BigInt(b) => Some(b.clone()),
            _ => None,
        }
    }

    /// Integers, floats and rationals as an `f64`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::BigInt(b) => b.to_f64(),
            Value::Float(f) => Some(*f),
            Value::Rational(r) => r.to_f64(),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_map(&self) -> Option<&Mapping> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_timestamp(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Value::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }
}

fn named(name: &str) -> Option<String> {
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn write_fields(f: &mut fmt::Formatter<'_>, fields: &Fields) -> fmt::Result {
    for (i, (k, v)) in fields.iter().enumerate() {
        let sep = if i == 0 { " " } else { ", " };
        write!(f, "{}{}={}", sep, k, v)?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::BigInt(b) => write!(f, "{}", b),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Binary(bytes) => write!(f, "<{} bytes>", bytes.len()),
            Value::Symbol(s) => write!(f, "{}", s),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} => {}", k, v)?;
                }
                f.write_str("}")
            }
            Value::Range(r) => {
                let dots = if r.exclusive { "..." } else { ".." };
                write!(f, "{}{}{}", r.begin, dots, r.end)
            }
            Value::Rational(r) => write!(f, "{}/{}", r.numer(), r.denom()),
            Value::Complex(c) => {
                let sign = if c.im.is_sign_negative() { '-' } else { '+' };
                write!(f, "({:?}{}{:?}i)", c.re, sign, c.im.abs())
            }
            Value::Struct(record) => {
                write!(f, "#<struct {}", record.name)?;
                write_fields(f, &record.fields)?;
                f.write_str(">")
            }
            Value::Exception(error) => write!(f, "#<{}: {}>", error.class, error.message),
            Value::Regexp(re) => write!(f, "{}", re),
            Value::Timestamp(ts) => {
                write!(f, "{}", ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Value::Object(object) => {
                write!(f, "#<{}", object.class)?;
                write_fields(f, &object.fields)?;
                f.write_str(">")
            }
            Value::Shared(shared) => write!(f, "{}", *shared.read()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::{SerializeMap, SerializeSeq};

        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::BigInt(b) => serializer.serialize_str(&b.to_string()),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::String(s) => serializer.serialize_str(s),
            Value::Binary(bytes) => serializer.serialize_bytes(bytes),
            Value::Symbol(s) => serializer.serialize_str(s.name()),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(mapping) => {
                let mut map = serializer.serialize_map(Some(mapping.len()))?;
                for (k, v) in mapping {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Range(r) => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("begin", &*r.begin)?;
                map.serialize_entry("end", &*r.end)?;
                map.serialize_entry("excl", &r.exclusive)?;
                map.end()
            }
            Value::Rational(r) => {
                serializer.serialize_str(&format!("{}/{}", r.numer(), r.denom()))
            }
            Value::Complex(c) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("real", &c.re)?;
                map.serialize_entry("image", &c.im)?;
                map.end()
            }
            Value::Struct(Record { fields, .. }) | Value::Object(Object { fields, .. }) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (k, v) in fields {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Exception(error) => {
                let mut map = serializer.serialize_map(Some(error.attributes.len() + 1))?;
                map.serialize_entry("message", &error.message)?;
                for (k, v) in &error.attributes {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Regexp(re) => serializer.serialize_str(&re.to_string()),
            Value::Timestamp(ts) => {
                serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Value::Shared(shared) => shared.read().serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any value")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Value, E> {
                Ok(Value::Int(value))
            }

            fn visit_i128<E>(self, value: i128) -> Result<Value, E> {
                Ok(Value::from_bigint(BigInt::from(value)))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Value, E> {
                Ok(Value::from(value))
            }

            fn visit_u128<E>(self, value: u128) -> Result<Value, E> {
                Ok(Value::from_bigint(BigInt::from(value)))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Value, E> {
                Ok(Value::Float(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Value, E> {
                Ok(Value::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Value, E> {
                Ok(Value::String(value))
            }

            fn visit_bytes<E>(self, value: &[u8]) -> Result<Value, E> {
                Ok(Value::Binary(value.to_vec()))
            }

            fn visit_byte_buf<E>(self, value: Vec<u8>) -> Result<Value, E> {
                Ok(Value::Binary(value))
            }

            fn visit_unit<E>(self) -> Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E>(self) -> Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut items = Vec::new();
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(Value::Array(items))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut mapping = Mapping::new();
                while let Some((key, value)) = map.next_entry::<Value, Value>()? {
                    mapping.insert(key, value);
                }
                Ok(Value::Map(mapping))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl TryFrom<Value> for i64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Int(i) => Ok(i),
            Value::BigInt(ref b) => b
                .to_i64()
                .ok_or_else(|| crate::Error::custom(format!("integer {} does not fit in i64", b))),
            _ => Err(crate::Error::custom(format!(
                "expected integer, found {}",
                value.kind()
            ))),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value.as_f64().ok_or_else(|| {
            crate::Error::custom(format!("expected number, found {}", value.kind()))
        })
    }
}

impl TryFrom<Value> for bool {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            _ => Err(crate::Error::custom(format!(
                "expected bool, found {}",
                value.kind()
            ))),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            _ => Err(crate::Error::custom(format!(
                "expected string, found {}",
                value.kind()
            ))),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i8> for Value {
    fn from(value: i8) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Value::Int(value as i64)
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Value::Int(value as i64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::BigInt(BigInt::from(value)),
        }
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Value::from_bigint(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Binary(value)
    }
}

impl From<Symbol> for Value {
    fn from(value: Symbol) -> Self {
        Value::Symbol(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<Mapping> for Value {
    fn from(value: Mapping) -> Self {
        Value::Map(value)
    }
}

impl From<RangeValue> for Value {
    fn from(value: RangeValue) -> Self {
        Value::Range(value)
    }
}

impl From<BigRational> for Value {
    fn from(value: BigRational) -> Self {
        Value::Rational(value)
    }
}

impl From<Complex64> for Value {
    fn from(value: Complex64) -> Self {
        Value::Complex(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Struct(value)
    }
}

impl From<ErrorValue> for Value {
    fn from(value: ErrorValue) -> Self {
        Value::Exception(value)
    }
}

impl From<Regexp> for Value {
    fn from(value: Regexp) -> Self {
        Value::Regexp(value)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Value::Timestamp(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value.fixed_offset())
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Value::Object(value)
    }
}

impl From<Shared> for Value {
    fn from(value: Shared) -> Self {
        Value::Shared(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(value: &Value) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_equal_values_hash_alike() {
        assert_eq!(hash_of(&Value::Float(0.0)), hash_of(&Value::Float(-0.0)));

        let a = Value::from(Object::new("P").with_field("x", 1).with_field("y", 2));
        let b = Value::from(Object::new("P").with_field("y", 2).with_field("x", 1));
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let utc = DateTime::parse_from_rfc3339("2024-01-01T10:00:00Z").unwrap();
        let local = DateTime::parse_from_rfc3339("2024-01-01T12:00:00+02:00").unwrap();
        assert_eq!(Value::from(utc), Value::from(local));
        assert_eq!(hash_of(&Value::from(utc)), hash_of(&Value::from(local)));

        let cell = Shared::new(Value::from("x"));
        assert_eq!(hash_of(&Value::Shared(cell)), hash_of(&Value::Shared(Shared::new("x".into()))));
    }

    #[test]
    fn test_kind_prefers_type_names() {
        let record = Value::from(Record::new("Point").with_field("x", 1));
        assert_eq!(record.kind(), ValueKind::Struct(Some("Point".to_string())));
        assert_eq!(record.kind().generic(), ValueKind::Struct(None));
        assert!(record.kind().is_specialized());

        let anonymous = Value::from(Object::new(""));
        assert_eq!(anonymous.kind(), ValueKind::Object(None));
    }

    #[test]
    fn test_bigint_normalizes_when_it_fits() {
        assert_eq!(Value::from_bigint(BigInt::from(7)), Value::Int(7));
        let big = BigInt::from(u64::MAX) * 4;
        assert!(matches!(Value::from_bigint(big), Value::BigInt(_)));
        assert!(matches!(Value::from(u64::MAX), Value::BigInt(_)));
    }

    #[test]
    fn test_symbol_inspect() {
        assert_eq!(Symbol::new("name").inspect(), ":name");
        assert_eq!(Symbol::new("empty?").inspect(), ":empty?");
        assert_eq!(Symbol::new("two words").inspect(), ":\"two words\"");
        assert_eq!(Symbol::new("9lives").inspect(), ":\"9lives\"");
    }

    #[test]
    fn test_regexp_flags_letters() {
        let flags = RegexpFlags::from_letters("xi").unwrap();
        assert_eq!(flags.letters(), "ix");
        assert!(RegexpFlags::from_letters("g").is_none());

        let re = Regexp::new("ab+c", flags).unwrap();
        assert!(re.is_match("xABBC"));
        assert_eq!(re.to_string(), "/ab+c/ix");
    }

    #[test]
    fn test_shared_cells_alias() {
        let cell = Shared::new(Value::from(1));
        let alias = cell.clone();
        *alias.write() = Value::from(2);

        assert!(cell.ptr_eq(&alias));
        assert_eq!(*cell.read(), Value::from(2));
        assert_eq!(Value::from(cell.clone()).kind(), ValueKind::Int);
        assert_eq!(Value::Shared(cell), Value::Shared(Shared::new(Value::from(2))));
    }

    #[test]
    fn test_display() {
        let range = Value::from(RangeValue::inclusive(Value::from(1), Value::from(5)));
        assert_eq!(range.to_string(), "1..5");
        assert_eq!(Value::Complex(Complex64::new(1.0, -2.0)).to_string(), "(1.0-2.0i)");
        let record = Value::from(Record::new("Point").with_field("x", 1).with_field("y", 2));
        assert_eq!(record.to_string(), "#<struct Point x=1, y=2>");
    }

    #[test]
    fn test_tryfrom() {
        assert_eq!(i64::try_from(Value::from(42)).unwrap(), 42);
        assert!(i64::try_from(Value::from("x")).is_err());
        assert_eq!(f64::try_from(Value::from(2)).unwrap(), 2.0);
        assert!(bool::try_from(Value::from(true)).unwrap());
        assert_eq!(String::try_from(Value::from("s")).unwrap(), "s");
    }

    #[test]
    fn test_serialize_to_json() {
        let mut map = Mapping::new();
        map.insert(Value::from("a"), Value::from(vec![Value::from(1), Value::Null]));
        let json = serde_json::to_string(&Value::Map(map)).unwrap();
        assert_eq!(json, r#"{"a":[1,null]}"#);
    }

    #[test]
    fn test_deserialize_from_json() {
        let value: Value = serde_json::from_str(r#"{"x": [1, 2.5, "s", true, null]}"#).unwrap();
        let items = value.as_map().and_then(|m| m.get_str("x")).and_then(Value::as_array).unwrap();
        assert_eq!(
            items,
            &vec![
                Value::Int(1),
                Value::Float(2.5),
                Value::from("s"),
                Value::Bool(true),
                Value::Null
            ]
        );
    }
}
