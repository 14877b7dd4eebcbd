//! Composite codecs: ranges, records, exceptions and generic objects.
//!
//! Records, exceptions and generic objects carry their type name in the tag
//! (`…:struct:Point`). Their codecs are registered both under the bare base
//! tag and as a tag family, so any class-suffixed tag reaches them.
//!
//! ## Field order
//!
//! - records: declared member order (insertion order of [`Record::fields`])
//! - exceptions: `message` first, then the other attributes sorted by name
//! - generic objects: attributes sorted by name, recomputed on every encode
//!
//! ```rust
//! use tagcodec::{encode, Object, Registry, Value};
//!
//! let registry = Registry::with_builtins();
//! let object = Value::from(Object::new("Point").with_field("y", 2).with_field("x", 1));
//!
//! let node = encode(&object, &registry).unwrap();
//! assert_eq!(node.tag(), Some("tag:ruby.yaml.org,2002:object:Point"));
//!
//! let names: Vec<_> = node
//!     .as_mapping()
//!     .unwrap()
//!     .iter()
//!     .map(|(k, _)| k.as_scalar().unwrap())
//!     .collect();
//! assert_eq!(names, vec!["x", "y"]);
//! ```

use super::{expect_scalar, field_key};
use crate::{
    tag, Codec, Decoder, Encoder, Error, ErrorValue, Fields, Node, Object, RangeValue, Record,
    Result, Style, Value, ValueKind,
};

fn encode_fields<'v, I>(mut node: Node, fields: I, encoder: &mut Encoder<'_>) -> Result<Node>
where
    I: IntoIterator<Item = (&'v str, &'v Value)>,
{
    for (name, value) in fields {
        let child = encoder.encode(value).map_err(|e| e.with_field(name))?;
        node.add_pair(field_key(name), child);
    }
    Ok(node)
}

pub struct RangeCodec;

impl RangeCodec {
    fn decode_scalar(tag: &str, node: &Node, decoder: &mut Decoder<'_>) -> Result<Value> {
        let text = expect_scalar(tag, node)?;
        let (begin, end, exclusive) = if let Some((b, e)) = text.split_once("...") {
            (b, e, true)
        } else if let Some((b, e)) = text.split_once("..") {
            (b, e, false)
        } else {
            return Err(Error::malformed(tag, "`begin..end` or `begin...end`", node.describe()));
        };
        let begin = Self::endpoint(begin, decoder).map_err(|e| e.with_field("begin"))?;
        let end = Self::endpoint(end, decoder).map_err(|e| e.with_field("end"))?;
        Ok(Value::Range(RangeValue::new(begin, end, exclusive)))
    }

    fn endpoint(text: &str, decoder: &mut Decoder<'_>) -> Result<Value> {
        let text = text.trim();
        match text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
            Some(quoted) => Ok(Value::from(quoted)),
            None => decoder.decode(&Node::plain(text)),
        }
    }
}

impl Codec for RangeCodec {
    fn tag(&self) -> &str {
        tag::RANGE
    }

    fn kind(&self) -> ValueKind {
        ValueKind::Range
    }

    fn encode(&self, value: &Value, encoder: &mut Encoder<'_>) -> Result<Node> {
        let Value::Range(range) = value else {
            return Err(Error::custom(format!("range codec cannot encode {}", value.kind())));
        };
        let exclusive = Value::Bool(range.exclusive);
        encode_fields(
            Node::mapping(tag::RANGE, Style::Plain),
            [
                ("begin", &*range.begin),
                ("end", &*range.end),
                ("excl", &exclusive),
            ],
            encoder,
        )
    }

    fn decode(&self, tag: &str, node: &Node, decoder: &mut Decoder<'_>) -> Result<Value> {
        if node.is_scalar() {
            return Self::decode_scalar(tag, node, decoder);
        }
        let mut fields = decoder.decode_fields(tag, node)?;
        let exclusive = match fields.get("excl") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                return Err(Error::malformed(tag, "boolean", other.to_string()).with_field("excl"))
            }
        };
        let begin = fields.remove("begin").unwrap_or_default();
        let end = fields.remove("end").unwrap_or_default();
        Ok(Value::Range(RangeValue::new(begin, end, exclusive)))
    }
}

pub struct StructCodec;

impl Codec for StructCodec {
    fn tag(&self) -> &str {
        tag::STRUCT
    }

    fn kind(&self) -> ValueKind {
        ValueKind::Struct(None)
    }

    fn encode(&self, value: &Value, encoder: &mut Encoder<'_>) -> Result<Node> {
        let Value::Struct(record) = value else {
            return Err(Error::custom(format!("struct codec cannot encode {}", value.kind())));
        };
        let node = Node::mapping(tag::with_class(tag::STRUCT, &record.name), Style::Plain);
        encode_fields(
            node,
            record.fields.iter().map(|(k, v)| (k.as_str(), v)),
            encoder,
        )
    }

    /// Assigns every member by name. With a registered definition the
    /// record is rebuilt in declared order with defaults filled in; a
    /// missing mandatory member or an undeclared one fails the whole decode.
    fn decode(&self, tag: &str, node: &Node, decoder: &mut Decoder<'_>) -> Result<Value> {
        let name = tag::class_of(tag, tag::STRUCT).unwrap_or_default().to_string();
        let mut payload = decoder.decode_fields(tag, node)?;

        let Some(def) = decoder.registry().struct_def(&name) else {
            return Ok(Value::Struct(Record {
                name,
                fields: payload,
            }));
        };

        if let Some(unknown) = payload.keys().find(|k| def.find(k).is_none()) {
            let expected = format!("member of struct {}", name);
            return Err(Error::malformed(tag, &expected, "undeclared member").with_field(unknown));
        }
        let mut fields = Fields::with_capacity(def.members().len());
        for member in def.members() {
            let value = match (payload.remove(&member.name), &member.default) {
                (Some(value), _) => value,
                (None, Some(default)) => default.clone(),
                (None, None) => {
                    return Err(Error::malformed(tag, "value for mandatory member", "nothing")
                        .with_field(&member.name))
                }
            };
            fields.insert(member.name.clone(), value);
        }
        Ok(Value::Struct(Record { name, fields }))
    }
}

pub struct ExceptionCodec;

impl Codec for ExceptionCodec {
    fn tag(&self) -> &str {
        tag::EXCEPTION
    }

    fn kind(&self) -> ValueKind {
        ValueKind::Exception(None)
    }

    fn encode(&self, value: &Value, encoder: &mut Encoder<'_>) -> Result<Node> {
        let Value::Exception(error) = value else {
            return Err(Error::custom(format!("exception codec cannot encode {}", value.kind())));
        };
        let mut node = Node::mapping(tag::with_class(tag::EXCEPTION, &error.class), Style::Plain);
        node.add_pair(
            field_key("message"),
            encoder.encode(&Value::from(error.message.as_str()))?,
        );
        encode_fields(node, error.attributes.sorted_iter(), encoder)
    }

    fn decode(&self, tag: &str, node: &Node, decoder: &mut Decoder<'_>) -> Result<Value> {
        let class = match tag::class_of(tag, tag::EXCEPTION) {
            Some(class) if !class.is_empty() => class.to_string(),
            _ => "Exception".to_string(),
        };
        let mut attributes = decoder.decode_fields(tag, node)?;
        let message = match attributes.remove("message") {
            None => return Err(Error::malformed(tag, "`message` field", node.describe())),
            Some(Value::Null) => class.clone(),
            Some(Value::String(text)) => text,
            Some(other) => {
                return Err(Error::malformed(tag, "string", other.to_string()).with_field("message"))
            }
        };
        Ok(Value::Exception(ErrorValue {
            class,
            message,
            attributes,
        }))
    }
}

pub struct ObjectCodec;

impl Codec for ObjectCodec {
    fn tag(&self) -> &str {
        tag::OBJECT
    }

    fn kind(&self) -> ValueKind {
        ValueKind::Object(None)
    }

    fn encode(&self, value: &Value, encoder: &mut Encoder<'_>) -> Result<Node> {
        let Value::Object(object) = value else {
            return Err(Error::custom(format!("object codec cannot encode {}", value.kind())));
        };
        let node = Node::mapping(tag::with_class(tag::OBJECT, &object.class), Style::Plain);
        encode_fields(node, object.fields.sorted_iter(), encoder)
    }

    fn decode(&self, tag: &str, node: &Node, decoder: &mut Decoder<'_>) -> Result<Value> {
        let class = tag::class_of(tag, tag::OBJECT).unwrap_or(tag).to_string();
        let fields = decoder.decode_fields(tag, node)?;
        match decoder.registry().initializer(&class) {
            Some(init) => init(fields),
            None => Ok(Value::Object(Object { class, fields })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode, encode, Registry, StructDef};

    #[test]
    fn test_range_roundtrip_both_ends() {
        let registry = Registry::with_builtins();
        for exclusive in [false, true] {
            let value = Value::from(RangeValue::new(Value::from(1), Value::from(5), exclusive));
            let node = encode(&value, &registry).unwrap();
            assert_eq!(
                node.get("excl").and_then(Node::as_scalar),
                Some(if exclusive { "true" } else { "false" })
            );
            assert_eq!(decode(&node, &registry).unwrap(), value);
        }
    }

    #[test]
    fn test_range_scalar_forms() {
        let registry = Registry::with_builtins();
        let cases = [
            ("1..5", Value::from(1), Value::from(5), false),
            ("1...5", Value::from(1), Value::from(5), true),
            ("1.5..2.5", Value::from(1.5), Value::from(2.5), false),
            ("a..z", Value::from("a"), Value::from("z"), false),
            ("\"x y\"...\"z\"", Value::from("x y"), Value::from("z"), true),
        ];
        for (text, begin, end, exclusive) in cases {
            let node = Node::scalar(tag::RANGE, text, Style::Plain);
            assert_eq!(
                decode(&node, &registry).unwrap(),
                Value::from(RangeValue::new(begin, end, exclusive)),
                "{}",
                text
            );
        }
        let bad = Node::scalar(tag::RANGE, "15", Style::Plain);
        assert!(decode(&bad, &registry).is_err());
    }

    #[test]
    fn test_range_missing_excl_is_inclusive() {
        let registry = Registry::with_builtins();
        let mut node = Node::mapping(tag::RANGE, Style::Plain);
        node.add_pair(Node::plain("begin"), Node::plain("1"));
        node.add_pair(Node::plain("end"), Node::plain("3"));
        assert_eq!(
            decode(&node, &registry).unwrap(),
            Value::from(RangeValue::inclusive(Value::from(1), Value::from(3)))
        );
    }

    #[test]
    fn test_struct_keeps_member_order() {
        let registry = Registry::with_builtins();
        let record = Value::from(Record::new("Point").with_field("y", 2).with_field("x", 1));
        let node = encode(&record, &registry).unwrap();
        assert_eq!(node.tag(), Some("tag:ruby.yaml.org,2002:struct:Point"));

        let back = decode(&node, &registry).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_struct_definition_defaults_and_errors() {
        let registry = Registry::with_builtins();
        registry.define_struct(
            StructDef::new("Point")
                .member("x")
                .member("y")
                .member_with_default("label", Value::from("origin")),
        );

        let mut node = Node::mapping("!ruby/struct:Point", Style::Plain);
        node.add_pair(Node::plain("y"), Node::plain("2"));
        node.add_pair(Node::plain("x"), Node::plain("1"));
        let expected = Record::new("Point")
            .with_field("x", 1)
            .with_field("y", 2)
            .with_field("label", "origin");
        assert_eq!(decode(&node, &registry).unwrap(), Value::from(expected));

        let mut missing = Node::mapping("!ruby/struct:Point", Style::Plain);
        missing.add_pair(Node::plain("x"), Node::plain("1"));
        match decode(&missing, &registry) {
            Err(Error::MalformedPayload { field, .. }) => assert_eq!(field.as_deref(), Some("y")),
            other => panic!("unexpected: {:?}", other),
        }

        node.add_pair(Node::plain("z"), Node::plain("3"));
        match decode(&node, &registry) {
            Err(Error::MalformedPayload { field, .. }) => assert_eq!(field.as_deref(), Some("z")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_exception_message_first_then_sorted() {
        let registry = Registry::with_builtins();
        let error = ErrorValue::new("ArgumentError", "bad input")
            .with_attribute("zeta", 1)
            .with_attribute("alpha", 2);
        let node = encode(&Value::from(error.clone()), &registry).unwrap();

        let names: Vec<_> = node
            .as_mapping()
            .unwrap()
            .iter()
            .map(|(k, _)| k.as_scalar().unwrap())
            .collect();
        assert_eq!(names, vec!["message", "alpha", "zeta"]);
        assert_eq!(node.tag(), Some("tag:ruby.yaml.org,2002:exception:ArgumentError"));

        match decode(&node, &registry).unwrap() {
            Value::Exception(back) => {
                assert_eq!(back.class, "ArgumentError");
                assert_eq!(back.message, "bad input");
                assert_eq!(back.attributes.get("zeta"), Some(&Value::from(1)));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_exception_requires_message() {
        let registry = Registry::with_builtins();
        let node = Node::mapping(tag::EXCEPTION, Style::Plain);
        assert!(matches!(
            decode(&node, &registry),
            Err(Error::MalformedPayload { .. })
        ));

        let mut null_message = Node::mapping(tag::EXCEPTION, Style::Plain);
        null_message.add_pair(Node::plain("message"), Node::plain("~"));
        match decode(&null_message, &registry).unwrap() {
            Value::Exception(e) => {
                assert_eq!(e.class, "Exception");
                assert_eq!(e.message, "Exception");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_object_encoding_is_deterministic() {
        let registry = Registry::with_builtins();
        let object = Value::from(
            Object::new("Config")
                .with_field("timeout", 30)
                .with_field("host", "localhost")
                .with_field("retries", 3),
        );
        let first = encode(&object, &registry).unwrap();
        let second = encode(&object, &registry).unwrap();
        assert_eq!(first, second);

        let names: Vec<_> = first
            .as_mapping()
            .unwrap()
            .iter()
            .map(|(k, _)| k.as_scalar().unwrap())
            .collect();
        assert_eq!(names, vec!["host", "retries", "timeout"]);
    }

    #[test]
    fn test_object_initializer_receives_all_fields() {
        let registry = Registry::with_builtins();
        registry.register_initializer("Celsius", |fields: Fields| {
            let degrees = fields
                .get("degrees")
                .and_then(Value::as_f64)
                .ok_or_else(|| Error::custom("degrees missing"))?;
            Ok(Value::Float(degrees))
        });

        let mut node = Node::mapping("!ruby/object:Celsius", Style::Plain);
        node.add_pair(Node::plain("degrees"), Node::plain("21.5"));
        assert_eq!(decode(&node, &registry).unwrap(), Value::Float(21.5));
    }
}
