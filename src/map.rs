//! Ordered maps used by the value model.
//!
//! - [`Fields`]: named attributes of records, exceptions and generic objects.
//!   A thin wrapper around [`IndexMap`] that keeps insertion order, which for
//!   records is the declared member order.
//! - [`Mapping`]: the mapping kind itself. Keys are arbitrary [`Value`]s,
//!   hashed into an [`IndexMap`] that keeps insertion order.
//!
//! ## Examples
//!
//! ```rust
//! use tagcodec::{Fields, Mapping, Value};
//!
//! let mut fields = Fields::new();
//! fields.insert("name".to_string(), Value::from("Alice"));
//! fields.insert("age".to_string(), Value::from(30));
//! assert_eq!(fields.get("name").and_then(|v| v.as_str()), Some("Alice"));
//!
//! let mut mapping = Mapping::new();
//! mapping.insert(Value::from(1), Value::from("one"));
//! assert_eq!(mapping.get(&Value::from(1)).and_then(|v| v.as_str()), Some("one"));
//! ```

use crate::Value;
use indexmap::{Equivalent, IndexMap};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// An ordered map of attribute names to values.
///
/// # Examples
///
/// ```rust
/// use tagcodec::{Fields, Value};
///
/// let mut fields = Fields::new();
/// fields.insert("y".to_string(), Value::from(2));
/// fields.insert("x".to_string(), Value::from(1));
///
/// // Iteration keeps insertion order
/// let keys: Vec<_> = fields.keys().cloned().collect();
/// assert_eq!(keys, vec!["y", "x"]);
///
/// // Sorted view for deterministic emission
/// assert_eq!(fields.sorted_keys(), vec!["x", "y"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fields(IndexMap<String, Value>);

impl Fields {
    #[must_use]
    pub fn new() -> Self {
        Fields(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Fields(IndexMap::with_capacity(capacity))
    }

    /// Inserts a field. An existing field keeps its position and its old value is returned.
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    /// Removes a field, keeping the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.0.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.0.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Field names sorted lexicographically, computed fresh on every call.
    #[must_use]
    pub fn sorted_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.0.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Entries in name order.
    #[must_use]
    pub fn sorted_iter(&self) -> Vec<(&str, &Value)> {
        let mut entries: Vec<(&str, &Value)> =
            self.0.iter().map(|(k, v)| (k.as_str(), v)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl Hash for Fields {
    /// Hashed in name order, since field equality ignores order.
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for (k, v) in self.sorted_iter() {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl From<HashMap<String, Value>> for Fields {
    fn from(map: HashMap<String, Value>) -> Self {
        Fields(map.into_iter().collect())
    }
}

impl From<Fields> for HashMap<String, Value> {
    fn from(fields: Fields) -> Self {
        fields.0.into_iter().collect()
    }
}

impl IntoIterator for Fields {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for Fields {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Fields(IndexMap::from_iter(iter))
    }
}

/// An insertion-ordered map with arbitrary value keys.
///
/// Entries are indexed by [`Value`]'s `Hash`, so insertion and lookup take
/// constant time on average. Keys compare with `PartialEq`: a NaN key can be
/// stored but never found again, and each NaN insert adds a new entry.
///
/// Equality is order-sensitive: two mappings are equal when they hold equal
/// entries in the same order.
#[derive(Clone, Default)]
pub struct Mapping(IndexMap<Key, Value>);

#[derive(Clone, Debug)]
struct Key(Value);

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

// Reflexive for every key except NaN floats, which only ever miss.
impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl Equivalent<Key> for Value {
    fn equivalent(&self, key: &Key) -> bool {
        *self == key.0
    }
}

impl Mapping {
    #[must_use]
    pub fn new() -> Self {
        Mapping(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Mapping(IndexMap::with_capacity(capacity))
    }

    /// Inserts an entry. An equal key is replaced in place and its old value returned.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        self.0.insert(Key(key), value)
    }

    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.0.get(key)
    }

    /// Looks up an entry whose key is the string `key`.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&Value> {
        self.get(&Value::String(key.to_owned()))
    }

    #[must_use]
    pub fn contains_key(&self, key: &Value) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter(self.0.iter())
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.0.keys().map(|k| &k.0)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.0.values()
    }
}

impl PartialEq for Mapping {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Hash for Mapping {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for (k, v) in self {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl fmt::Debug for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Borrowing iterator over the entries of a [`Mapping`], in insertion order.
pub struct Iter<'a>(indexmap::map::Iter<'a, Key, Value>);

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a Value, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, v)| (&k.0, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(k, v)| (&k.0, v))
    }
}

impl ExactSizeIterator for Iter<'_> {}

/// Owning iterator over the entries of a [`Mapping`], in insertion order.
pub struct IntoIter(indexmap::map::IntoIter<Key, Value>);

impl Iterator for IntoIter {
    type Item = (Value, Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, v)| (k.0, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for IntoIter {}

impl IntoIterator for Mapping {
    type Item = (Value, Value);
    type IntoIter = IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self.0.into_iter())
    }
}

impl<'a> IntoIterator for &'a Mapping {
    type Item = (&'a Value, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<(Value, Value)> for Mapping {
    fn from_iter<T: IntoIterator<Item = (Value, Value)>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let mut mapping = Mapping::with_capacity(iter.size_hint().0);
        for (k, v) in iter {
            mapping.insert(k, v);
        }
        mapping
    }
}

impl From<Fields> for Mapping {
    fn from(fields: Fields) -> Self {
        fields
            .into_iter()
            .map(|(k, v)| (Value::String(k), v))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_remove_keeps_order() {
        let mut fields: Fields = vec![
            ("a".to_string(), Value::from(1)),
            ("b".to_string(), Value::from(2)),
            ("c".to_string(), Value::from(3)),
        ]
        .into_iter()
        .collect();

        assert_eq!(fields.remove("b"), Some(Value::from(2)));
        let keys: Vec<_> = fields.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn test_fields_sorted_iter() {
        let mut fields = Fields::new();
        fields.insert("zeta".to_string(), Value::Null);
        fields.insert("alpha".to_string(), Value::Bool(true));

        let names: Vec<_> = fields.sorted_iter().into_iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_mapping_insert_replaces_equal_key() {
        let mut mapping = Mapping::new();
        assert!(mapping.insert(Value::from("x"), Value::from(1)).is_none());
        assert!(mapping.insert(Value::from(2), Value::from(2)).is_none());
        assert_eq!(
            mapping.insert(Value::from("x"), Value::from(3)),
            Some(Value::from(1))
        );

        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.iter().next().map(|(k, _)| k), Some(&Value::from("x")));
        assert_eq!(mapping.get_str("x"), Some(&Value::from(3)));
    }

    #[test]
    fn test_mapping_keys_of_every_kind() {
        let mut mapping = Mapping::new();
        mapping.insert(Value::Float(-0.0), Value::from("zero"));
        mapping.insert(Value::from(vec![Value::from(1)]), Value::from("seq"));
        mapping.insert(Value::from(crate::Symbol::new("a")), Value::from("sym"));

        assert_eq!(mapping.get(&Value::Float(0.0)), Some(&Value::from("zero")));
        assert_eq!(
            mapping.get(&Value::from(vec![Value::from(1)])),
            Some(&Value::from("seq"))
        );
        assert!(mapping.get_str("a").is_none());
        assert!(mapping.contains_key(&Value::from(crate::Symbol::new("a"))));
    }

    #[test]
    fn test_mapping_nan_key_is_never_found() {
        let mut mapping = Mapping::new();
        mapping.insert(Value::Float(f64::NAN), Value::from(1));
        mapping.insert(Value::Float(f64::NAN), Value::from(2));

        assert_eq!(mapping.len(), 2);
        assert!(mapping.get(&Value::Float(f64::NAN)).is_none());
    }

    #[test]
    fn test_mapping_equality_is_order_sensitive() {
        let ab: Mapping = vec![(Value::from("a"), Value::Null), (Value::from("b"), Value::Null)]
            .into_iter()
            .collect();
        let ba: Mapping = vec![(Value::from("b"), Value::Null), (Value::from("a"), Value::Null)]
            .into_iter()
            .collect();

        assert_ne!(ab, ba);
        assert_eq!(ab, ab.clone());
    }

    #[test]
    fn test_large_mapping_keeps_order() {
        let mapping: Mapping = (0..50_000)
            .map(|i| (Value::from(i), Value::from(i * 2)))
            .collect();

        assert_eq!(mapping.len(), 50_000);
        assert_eq!(mapping.get(&Value::from(49_999)), Some(&Value::from(99_998)));
        assert_eq!(mapping.keys().next(), Some(&Value::from(0)));
        assert_eq!(mapping.keys().last(), Some(&Value::from(49_999)));
    }
}
