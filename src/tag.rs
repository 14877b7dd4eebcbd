//! Tag namespaces and the tags of every built-in kind.
//!
//! Two namespaces are in use:
//!
//! - language-independent, `tag:yaml.org,2002:`: null, bool, int, float, str,
//!   binary, seq, map, timestamp
//! - ecosystem, `tag:ruby.yaml.org,2002:`: symbol, range, regexp, struct,
//!   exception, object, Rational, Complex, time
//!
//! The ecosystem namespace is kept so documents written by existing emitters
//! of that tag space decode without translation.
//!
//! Records, exceptions and generic objects carry their type name after the
//! base tag: `tag:ruby.yaml.org,2002:struct:Point`. [`with_class`] builds such
//! tags and [`class_of`] splits them again.
//!
//! Shorthands are expanded by [`normalize`]:
//!
//! ```rust
//! use tagcodec::tag;
//!
//! assert_eq!(tag::normalize("!!int"), "tag:yaml.org,2002:int");
//! assert_eq!(tag::normalize("!ruby/object:Point"), "tag:ruby.yaml.org,2002:object:Point");
//! assert_eq!(tag::normalize("tag:yaml.org,2002:str"), "tag:yaml.org,2002:str");
//! ```

use std::borrow::Cow;

pub const YAML_NAMESPACE: &str = "tag:yaml.org,2002:";
pub const RUBY_NAMESPACE: &str = "tag:ruby.yaml.org,2002:";

pub const NULL: &str = "tag:yaml.org,2002:null";
pub const BOOL: &str = "tag:yaml.org,2002:bool";
pub const TRUE: &str = "tag:yaml.org,2002:true";
pub const FALSE: &str = "tag:yaml.org,2002:false";
pub const INT: &str = "tag:yaml.org,2002:int";
pub const FLOAT: &str = "tag:yaml.org,2002:float";
pub const STR: &str = "tag:yaml.org,2002:str";
pub const BINARY: &str = "tag:yaml.org,2002:binary";
pub const SEQ: &str = "tag:yaml.org,2002:seq";
pub const MAP: &str = "tag:yaml.org,2002:map";
pub const TIMESTAMP: &str = "tag:yaml.org,2002:timestamp";
pub const TIMESTAMP_YMD: &str = "tag:yaml.org,2002:timestamp#ymd";

pub const TIME: &str = "tag:ruby.yaml.org,2002:time";
pub const SYMBOL: &str = "tag:ruby.yaml.org,2002:symbol";
pub const SYM: &str = "tag:ruby.yaml.org,2002:sym";
pub const RANGE: &str = "tag:ruby.yaml.org,2002:range";
pub const REGEXP: &str = "tag:ruby.yaml.org,2002:regexp";
pub const STRUCT: &str = "tag:ruby.yaml.org,2002:struct";
pub const EXCEPTION: &str = "tag:ruby.yaml.org,2002:exception";
pub const OBJECT: &str = "tag:ruby.yaml.org,2002:object";
pub const RATIONAL: &str = "tag:ruby.yaml.org,2002:object:Rational";
pub const COMPLEX: &str = "tag:ruby.yaml.org,2002:object:Complex";

/// Expands `!!kind` and `!ruby/kind` shorthands into full tags.
///
/// Any other tag is returned unchanged.
#[must_use]
pub fn normalize(tag: &str) -> Cow<'_, str> {
    if let Some(rest) = tag.strip_prefix("!!") {
        Cow::Owned(format!("{}{}", YAML_NAMESPACE, rest))
    } else if let Some(rest) = tag.strip_prefix("!ruby/") {
        Cow::Owned(format!("{}{}", RUBY_NAMESPACE, rest))
    } else {
        Cow::Borrowed(tag)
    }
}

/// Appends a type name to a family base tag. An empty name yields the base.
///
/// A name that is itself a full tag (as produced by the generic-object
/// fallback for unknown tags) is returned as is.
#[must_use]
pub fn with_class(base: &str, class: &str) -> String {
    if class.is_empty() {
        base.to_string()
    } else if class.starts_with("tag:") || class.starts_with('!') {
        class.to_string()
    } else {
        format!("{}:{}", base, class)
    }
}

/// Splits the type name off a class-suffixed tag.
///
/// Returns `Some("")` for the bare base tag and `None` when `tag` is not in
/// the family at all.
///
/// ```rust
/// use tagcodec::tag;
///
/// assert_eq!(tag::class_of("tag:ruby.yaml.org,2002:struct:Point", tag::STRUCT), Some("Point"));
/// assert_eq!(tag::class_of(tag::STRUCT, tag::STRUCT), Some(""));
/// assert_eq!(tag::class_of(tag::INT, tag::STRUCT), None);
/// ```
#[must_use]
pub fn class_of<'a>(tag: &'a str, base: &str) -> Option<&'a str> {
    let rest = tag.strip_prefix(base)?;
    if rest.is_empty() {
        Some("")
    } else {
        rest.strip_prefix(':')
    }
}

/// The family prefix (`base:`) under which class-suffixed tags are registered.
#[must_use]
pub fn family_prefix(base: &str) -> String {
    format!("{}:", base)
}
