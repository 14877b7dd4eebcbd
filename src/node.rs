//! The tagged document model.
//!
//! A [`Node`] is a scalar, an ordered sequence, or an ordered mapping, each
//! optionally carrying a tag and a presentation [`Style`]. Codecs build these
//! trees on encode and read them on decode; rendering them to text (and
//! parsing text into them) belongs to the layer around this crate.
//!
//! ## Examples
//!
//! ```rust
//! use tagcodec::{Node, Style};
//!
//! let mut point = Node::mapping("tag:ruby.yaml.org,2002:struct:Point", Style::Plain);
//! point.add_pair(
//!     Node::scalar("tag:yaml.org,2002:str", "x", Style::Plain),
//!     Node::scalar("tag:yaml.org,2002:int", "1", Style::Plain),
//! );
//!
//! assert!(point.is_mapping());
//! assert_eq!(point.get("x").and_then(|n| n.as_scalar()), Some("1"));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Presentation hint for a node. Not semantic: two nodes that differ only in
/// style decode to the same value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    Plain,
    Quoted,
    Literal,
    Folded,
}

/// The structural shape of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    Scalar,
    Sequence,
    Mapping,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Shape::Scalar => "scalar",
            Shape::Sequence => "sequence",
            Shape::Mapping => "mapping",
        })
    }
}

/// Node payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Scalar(String),
    Sequence(Vec<Node>),
    Mapping(Vec<(Node, Node)>),
}

/// A node of the document tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
    #[serde(default)]
    style: Style,
    kind: NodeKind,
}

impl Node {
    /// Creates a tagged scalar node.
    pub fn scalar(tag: impl Into<String>, text: impl Into<String>, style: Style) -> Self {
        Node {
            tag: Some(tag.into()),
            style,
            kind: NodeKind::Scalar(text.into()),
        }
    }

    /// Creates an empty tagged sequence node. Items are appended with [`Node::add`].
    pub fn sequence(tag: impl Into<String>, style: Style) -> Self {
        Node {
            tag: Some(tag.into()),
            style,
            kind: NodeKind::Sequence(Vec::new()),
        }
    }

    /// Creates an empty tagged mapping node. Entries are appended with [`Node::add_pair`].
    pub fn mapping(tag: impl Into<String>, style: Style) -> Self {
        Node {
            tag: Some(tag.into()),
            style,
            kind: NodeKind::Mapping(Vec::new()),
        }
    }

    /// Creates an untagged node, as produced by a parser before resolution.
    pub fn untagged(kind: NodeKind, style: Style) -> Self {
        Node {
            tag: None,
            style,
            kind,
        }
    }

    /// Creates an untagged plain scalar.
    pub fn plain(text: impl Into<String>) -> Self {
        Node::untagged(NodeKind::Scalar(text.into()), Style::Plain)
    }

    /// Appends an item to a sequence node. Has no effect on other shapes.
    pub fn add(&mut self, item: Node) {
        debug_assert!(self.is_sequence(), "add called on a {}", self.shape());
        if let NodeKind::Sequence(items) = &mut self.kind {
            items.push(item);
        }
    }

    /// Appends a key/value entry to a mapping node. Has no effect on other shapes.
    pub fn add_pair(&mut self, key: Node, value: Node) {
        debug_assert!(self.is_mapping(), "add_pair called on a {}", self.shape());
        if let NodeKind::Mapping(entries) = &mut self.kind {
            entries.push((key, value));
        }
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    #[inline]
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    #[inline]
    #[must_use]
    pub const fn style(&self) -> Style {
        self.style
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }

    #[must_use]
    pub const fn shape(&self) -> Shape {
        match self.kind {
            NodeKind::Scalar(_) => Shape::Scalar,
            NodeKind::Sequence(_) => Shape::Sequence,
            NodeKind::Mapping(_) => Shape::Mapping,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(self.kind, NodeKind::Scalar(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_sequence(&self) -> bool {
        matches!(self.kind, NodeKind::Sequence(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_mapping(&self) -> bool {
        matches!(self.kind, NodeKind::Mapping(_))
    }

    /// If the node is a scalar, returns its text.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Scalar(text) => Some(text),
            _ => None,
        }
    }

    /// If the node is a sequence, returns its items.
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Node]> {
        match &self.kind {
            NodeKind::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// If the node is a mapping, returns its entries in document order.
    #[must_use]
    pub fn as_mapping(&self) -> Option<&[(Node, Node)]> {
        match &self.kind {
            NodeKind::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    /// Looks up a mapping entry whose key is a scalar with the given text.
    ///
    /// Returns the first match; `None` for non-mapping nodes.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_mapping()?
            .iter()
            .find(|(k, _)| k.as_scalar() == Some(key))
            .map(|(_, v)| v)
    }

    /// Number of items (sequence), entries (mapping), or zero for scalars.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.kind {
            NodeKind::Scalar(_) => 0,
            NodeKind::Sequence(items) => items.len(),
            NodeKind::Mapping(entries) => entries.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short description used in error reports: the shape plus scalar text.
    pub(crate) fn describe(&self) -> String {
        match &self.kind {
            NodeKind::Scalar(text) if text.chars().count() <= 40 => format!("scalar `{}`", text),
            NodeKind::Scalar(text) => {
                let head: String = text.chars().take(40).collect();
                format!("scalar `{}...`", head)
            }
            NodeKind::Sequence(items) => format!("sequence of {} items", items.len()),
            NodeKind::Mapping(entries) => format!("mapping of {} entries", entries.len()),
        }
    }
}
