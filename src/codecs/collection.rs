//! Sequence and mapping codecs.
//!
//! Children are encoded and decoded one at a time through the dispatcher, in
//! order. A failing child aborts the whole container and the error carries the
//! index or key that led to it; no partially built container is returned.

use super::{expect_mapping, expect_sequence};
use crate::{tag, Codec, Decoder, Encoder, Error, Mapping, Node, Result, Style, Value, ValueKind};

pub struct SeqCodec;

impl Codec for SeqCodec {
    fn tag(&self) -> &str {
        tag::SEQ
    }

    fn kind(&self) -> ValueKind {
        ValueKind::Seq
    }

    fn encode(&self, value: &Value, encoder: &mut Encoder<'_>) -> Result<Node> {
        let items = value
            .as_array()
            .ok_or_else(|| Error::custom(format!("seq codec cannot encode {}", value.kind())))?;
        let mut node = Node::sequence(tag::SEQ, Style::Plain);
        for (index, item) in items.iter().enumerate() {
            let child = encoder
                .encode(item)
                .map_err(|e| e.with_field(&index.to_string()))?;
            node.add(child);
        }
        Ok(node)
    }

    fn decode(&self, tag: &str, node: &Node, decoder: &mut Decoder<'_>) -> Result<Value> {
        let items = expect_sequence(tag, node)?;
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                decoder
                    .decode(item)
                    .map_err(|e| e.with_field(&index.to_string()))
            })
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }
}

pub struct MapCodec;

impl Codec for MapCodec {
    fn tag(&self) -> &str {
        tag::MAP
    }

    fn kind(&self) -> ValueKind {
        ValueKind::Map
    }

    fn encode(&self, value: &Value, encoder: &mut Encoder<'_>) -> Result<Node> {
        let mapping = value
            .as_map()
            .ok_or_else(|| Error::custom(format!("map codec cannot encode {}", value.kind())))?;
        let mut node = Node::mapping(tag::MAP, Style::Plain);
        for (key, val) in mapping {
            let key_node = encoder.encode(key)?;
            let val_node = encoder
                .encode(val)
                .map_err(|e| e.with_field(&key_label(key)))?;
            node.add_pair(key_node, val_node);
        }
        Ok(node)
    }

    fn decode(&self, tag: &str, node: &Node, decoder: &mut Decoder<'_>) -> Result<Value> {
        let entries = expect_mapping(tag, node)?;
        let mut mapping = Mapping::with_capacity(entries.len());
        for (key_node, val_node) in entries {
            let key = decoder.decode(key_node)?;
            let val = decoder
                .decode(val_node)
                .map_err(|e| e.with_field(&key_label(&key)))?;
            mapping.insert(key, val);
        }
        Ok(Value::Map(mapping))
    }
}

fn key_label(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode, encode, Registry, Symbol};

    #[test]
    fn test_mixed_sequence_tags() {
        let registry = Registry::with_builtins();
        let value = Value::from(vec![
            Value::from(1),
            Value::from(2.5),
            Value::Null,
            Value::from(true),
        ]);
        let node = encode(&value, &registry).unwrap();

        let tags: Vec<_> = node.as_sequence().unwrap().iter().map(|n| n.tag()).collect();
        assert_eq!(
            tags,
            vec![Some(tag::INT), Some(tag::FLOAT), Some(tag::NULL), Some(tag::BOOL)]
        );
        assert_eq!(decode(&node, &registry).unwrap(), value);
    }

    #[test]
    fn test_mapping_keeps_order_and_key_kinds() {
        let registry = Registry::with_builtins();
        let mut mapping = Mapping::new();
        mapping.insert(Value::from("z"), Value::from(1));
        mapping.insert(Value::from(Symbol::new("a")), Value::from(2));
        mapping.insert(Value::from(3), Value::from("three"));
        let value = Value::Map(mapping);

        let node = encode(&value, &registry).unwrap();
        let keys: Vec<_> = node
            .as_mapping()
            .unwrap()
            .iter()
            .map(|(k, _)| k.as_scalar().unwrap().to_string())
            .collect();
        assert_eq!(keys, vec!["z", ":a", "3"]);
        assert_eq!(decode(&node, &registry).unwrap(), value);
    }

    #[test]
    fn test_child_failure_names_the_entry() {
        let registry = Registry::with_builtins();
        let mut node = Node::mapping(tag::MAP, Style::Plain);
        node.add_pair(Node::plain("fine"), Node::plain("1"));
        node.add_pair(Node::plain("broken"), Node::scalar(tag::FLOAT, "abc", Style::Plain));

        match decode(&node, &registry) {
            Err(Error::MalformedPayload { tag, field, .. }) => {
                assert_eq!(tag, crate::tag::FLOAT);
                assert_eq!(field.as_deref(), Some("broken"));
            }
            other => panic!("unexpected: {:?}", other),
        }

        let mut seq = Node::sequence(tag::SEQ, Style::Plain);
        seq.add(Node::plain("1"));
        seq.add(Node::scalar(tag::INT, "one", Style::Plain));
        match decode(&seq, &registry) {
            Err(Error::MalformedPayload { field, .. }) => assert_eq!(field.as_deref(), Some("1")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_untagged_collections_resolve_by_shape() {
        let registry = Registry::with_builtins();
        let node = Node::untagged(
            crate::NodeKind::Mapping(vec![(
                Node::plain("a"),
                Node::untagged(
                    crate::NodeKind::Sequence(vec![Node::plain("1"), Node::plain("~")]),
                    Style::Plain,
                ),
            )]),
            Style::Plain,
        );

        let mut expected = Mapping::new();
        expected.insert(Value::from("a"), Value::from(vec![Value::from(1), Value::Null]));
        assert_eq!(decode(&node, &registry).unwrap(), Value::Map(expected));
    }
}
