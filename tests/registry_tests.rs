use std::sync::Arc;
use std::thread;

use tagcodec::{
    decode, decode_with_options, encode, tag, Codec, CodecOptions, Decoder, Encoder, Error,
    FnCodec, Node, Object, Record, Registry, Result, StructDef, Style, UnknownTagPolicy, Value,
    ValueKind,
};

const POINT: &str = "tag:example.com,2024:point";

/// Encodes `Point` objects as `x,y` text.
struct PointCodec;

impl Codec for PointCodec {
    fn tag(&self) -> &str {
        POINT
    }

    fn kind(&self) -> ValueKind {
        ValueKind::Object(Some("Point".to_string()))
    }

    fn encode(&self, value: &Value, _encoder: &mut Encoder<'_>) -> Result<Node> {
        let Value::Object(point) = value else {
            return Err(Error::custom("not a point"));
        };
        let coord = |name: &str| point.fields.get(name).and_then(Value::as_i64).unwrap_or(0);
        Ok(Node::scalar(
            POINT,
            format!("{},{}", coord("x"), coord("y")),
            Style::Plain,
        ))
    }

    fn decode(&self, tag: &str, node: &Node, _decoder: &mut Decoder<'_>) -> Result<Value> {
        let text = node
            .as_scalar()
            .ok_or_else(|| Error::malformed(tag, "scalar", "non-scalar node"))?;
        let (x, y) = text
            .split_once(',')
            .ok_or_else(|| Error::malformed(tag, "`x,y`", text))?;
        let coord = |s: &str| {
            s.trim()
                .parse::<i64>()
                .map_err(|_| Error::malformed(tag, "integer", s))
        };
        Ok(Value::from(
            Object::new("Point")
                .with_field("x", coord(x)?)
                .with_field("y", coord(y)?),
        ))
    }
}

fn point(x: i64, y: i64) -> Value {
    Value::from(Object::new("Point").with_field("x", x).with_field("y", y))
}

#[test]
fn test_custom_codec_roundtrip() {
    let registry = Registry::with_builtins();
    registry.register(PointCodec);

    let node = encode(&point(3, -4), &registry).unwrap();
    assert_eq!(node.tag(), Some(POINT));
    assert_eq!(node.as_scalar(), Some("3,-4"));
    assert_eq!(decode(&node, &registry).unwrap(), point(3, -4));

    // other objects still use the generic codec
    let other = Value::from(Object::new("Line").with_field("len", 2));
    let node = encode(&other, &registry).unwrap();
    assert_eq!(node.tag(), Some("tag:ruby.yaml.org,2002:object:Line"));
}

#[test]
fn test_register_kind_closures() {
    let registry = Registry::with_builtins();
    registry.register_kind(
        "tag:example.com,2024:upper",
        ValueKind::Struct(Some("Shout".to_string())),
        |value, _enc| {
            let Value::Struct(record) = value else {
                return Err(Error::custom("not a shout"));
            };
            let text = record.fields.get("text").and_then(Value::as_str).unwrap_or("");
            Ok(Node::scalar(
                "tag:example.com,2024:upper",
                text.to_uppercase(),
                Style::Plain,
            ))
        },
        |node, _dec| {
            let text = node.as_scalar().unwrap_or_default().to_lowercase();
            Ok(Value::from(Record::new("Shout").with_field("text", text)))
        },
    );

    let value = Value::from(Record::new("Shout").with_field("text", "hey"));
    let node = encode(&value, &registry).unwrap();
    assert_eq!(node.as_scalar(), Some("HEY"));
    assert_eq!(decode(&node, &registry).unwrap(), value);
}

#[test]
fn test_override_builtin_replaces_binding() {
    let registry = Registry::with_builtins();
    registry.register(FnCodec::new(
        tag::INT,
        ValueKind::Int,
        |value, _enc| {
            let n = value.as_i64().unwrap_or_default();
            Ok(Node::scalar(tag::INT, format!("0x{:x}", n), Style::Plain))
        },
        |node, _dec| Ok(Value::from(node.as_scalar().unwrap_or_default().len() as i64)),
    ));

    let node = encode(&Value::from(255), &registry).unwrap();
    assert_eq!(node.as_scalar(), Some("0xff"));
    assert_eq!(decode(&node, &registry).unwrap(), Value::Int(4));

    // the override is local to this registry
    let fresh = Registry::with_builtins();
    assert_eq!(decode(&node, &fresh).unwrap(), Value::Int(255));
}

#[test]
fn test_override_drops_old_aliases() {
    let registry = Registry::with_builtins();
    registry.register(FnCodec::new(
        tag::SYMBOL,
        ValueKind::Symbol,
        |_value, _enc| Ok(Node::scalar(tag::SYMBOL, "overridden", Style::Plain)),
        |_node, _dec| Ok(Value::from("overridden")),
    ));

    let full = Node::scalar(tag::SYMBOL, "a", Style::Plain);
    assert_eq!(decode(&full, &registry).unwrap(), Value::from("overridden"));

    let short = Node::scalar("!ruby/sym", "a", Style::Plain);
    assert!(matches!(
        decode(&short, &registry),
        Err(Error::UnknownTag { .. })
    ));
    assert!(!registry.contains(tag::SYM));

    // aliases of codecs that were not replaced survive
    assert!(registry.contains(tag::TIMESTAMP_YMD));
    assert!(registry.contains(tag::TIME));
}

#[test]
fn test_reregistering_same_codec_keeps_aliases() {
    let registry = Registry::with_builtins();
    let codec = registry.resolve(tag::TIMESTAMP).unwrap();
    registry.register_arc(codec);

    assert!(registry.contains(tag::TIMESTAMP_YMD));
    assert!(registry.contains(tag::TIME));
}

#[test]
fn test_resolve_and_lookup() {
    let registry = Registry::with_builtins();

    assert_eq!(registry.resolve(tag::INT).unwrap().tag(), tag::INT);
    assert_eq!(registry.resolve(tag::SYM).unwrap().tag(), tag::SYMBOL);
    assert!(registry.contains(tag::TIMESTAMP_YMD));

    let family = registry.resolve("tag:ruby.yaml.org,2002:struct:Anything").unwrap();
    assert_eq!(family.tag(), tag::STRUCT);

    assert_eq!(
        registry.resolve("tag:example.com,2024:nothing").err(),
        Some(Error::unknown_tag("tag:example.com,2024:nothing"))
    );

    let tags = registry.tags();
    let mut sorted = tags.clone();
    sorted.sort();
    assert_eq!(tags, sorted);
    assert!(tags.iter().any(|t| t == tag::MAP));
}

#[test]
fn test_empty_registry_knows_nothing() {
    let registry = Registry::new();
    assert!(registry.tags().is_empty());
    assert!(matches!(
        encode(&Value::from(1), &registry),
        Err(Error::UnsupportedValue(_))
    ));
    assert!(matches!(
        decode(&Node::scalar(tag::INT, "1", Style::Plain), &registry),
        Err(Error::UnknownTag { .. })
    ));
}

#[test]
fn test_generic_object_fallback_roundtrips() {
    let registry = Registry::with_builtins();
    let mut node = Node::mapping("tag:example.com,2024:gadget", Style::Plain);
    node.add_pair(Node::plain("id"), Node::plain("7"));
    node.add_pair(Node::plain("name"), Node::plain("sprocket"));

    assert!(matches!(decode(&node, &registry), Err(Error::UnknownTag { .. })));

    let options = CodecOptions::new().with_unknown_tags(UnknownTagPolicy::GenericObject);
    let value = decode_with_options(&node, &registry, &options).unwrap();
    let Value::Object(object) = &value else {
        panic!("expected an object, got {:?}", value);
    };
    assert_eq!(object.class, "tag:example.com,2024:gadget");
    assert_eq!(object.fields.get("name"), Some(&Value::from("sprocket")));

    // the original tag survives re-encoding
    let again = encode(&value, &registry).unwrap();
    assert_eq!(again.tag(), Some("tag:example.com,2024:gadget"));

    // scalars have no generic form
    let scalar = Node::scalar("tag:example.com,2024:gadget", "x", Style::Plain);
    assert!(decode_with_options(&scalar, &registry, &options).is_err());
}

#[test]
fn test_struct_definition_orders_and_defaults() {
    let registry = Registry::with_builtins();
    registry.define_struct(
        StructDef::new("Point")
            .member("x")
            .member("y")
            .member_with_default("z", Value::from(0)),
    );

    let mut node = Node::mapping(tag::with_class(tag::STRUCT, "Point"), Style::Plain);
    node.add_pair(Node::plain("y"), Node::plain("2"));
    node.add_pair(Node::plain("x"), Node::plain("1"));

    let expected = Value::from(
        Record::new("Point")
            .with_field("x", 1)
            .with_field("y", 2)
            .with_field("z", 0),
    );
    let decoded = decode(&node, &registry).unwrap();
    assert_eq!(decoded, expected);

    let Value::Struct(record) = decoded else { unreachable!() };
    let names: Vec<_> = record.fields.keys().map(String::as_str).collect();
    assert_eq!(names, ["x", "y", "z"]);

    let mut missing = Node::mapping(tag::with_class(tag::STRUCT, "Point"), Style::Plain);
    missing.add_pair(Node::plain("x"), Node::plain("1"));
    match decode(&missing, &registry) {
        Err(Error::MalformedPayload { field, .. }) => assert_eq!(field.as_deref(), Some("y")),
        other => panic!("unexpected: {:?}", other),
    }

    let mut unknown = node.clone();
    unknown.add_pair(Node::plain("w"), Node::plain("9"));
    assert!(decode(&unknown, &registry).is_err());
}

#[test]
fn test_object_initializer() {
    let registry = Registry::with_builtins();
    registry.register_initializer("Temperature", |fields| {
        let celsius = fields
            .get("celsius")
            .and_then(Value::as_f64)
            .ok_or_else(|| Error::custom("celsius required"))?;
        Ok(Value::from(
            Object::new("Temperature")
                .with_field("celsius", celsius)
                .with_field("fahrenheit", celsius * 9.0 / 5.0 + 32.0),
        ))
    });

    let mut node = Node::mapping(tag::with_class(tag::OBJECT, "Temperature"), Style::Plain);
    node.add_pair(Node::plain("celsius"), Node::plain("100.0"));

    let value = decode(&node, &registry).unwrap();
    let Value::Object(temp) = value else {
        panic!("expected an object");
    };
    assert_eq!(temp.fields.get("fahrenheit"), Some(&Value::Float(212.0)));

    let empty = Node::mapping(tag::with_class(tag::OBJECT, "Temperature"), Style::Plain);
    assert!(decode(&empty, &registry).is_err());
}

#[test]
fn test_clone_is_isolated() {
    let base = Registry::with_builtins();
    let copy = base.clone();
    copy.register(PointCodec);

    assert!(copy.contains(POINT));
    assert!(!base.contains(POINT));
}

#[test]
fn test_shared_across_threads() {
    let registry = Arc::new(Registry::with_builtins());
    registry.register(PointCodec);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let value = point(i, i * 2);
                let node = encode(&value, &registry).unwrap();
                assert_eq!(decode(&node, &registry).unwrap(), value);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
