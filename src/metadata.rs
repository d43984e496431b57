//! Opaque per-bitmap metadata tags.
//!
//! Tags are key/typed-value pairs; the pixel engine never interprets them.
//! It only stores them, hands them back, and compares them structurally.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

/// A typed metadata tag value.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub enum TagValue {
    /// NUL-free text.
    Ascii(String),
    Byte(Vec<u8>),
    Short(Vec<u16>),
    Long(Vec<u32>),
    /// Numerator/denominator pairs, stored as given.
    Rational(Vec<(u32, u32)>),
    /// Raw bytes with no declared interpretation.
    Undefined(Vec<u8>),
}

/// Ordered tag store attached to a bitmap.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metadata {
    tags: BTreeMap<String, TagValue>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or replace a tag, returning the previous value if any.
    pub fn set(&mut self, key: impl Into<String>, value: TagValue) -> Option<TagValue> {
        self.tags.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.tags.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<TagValue> {
        self.tags.remove(key)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagValue)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn set_get_replace() {
        let mut md = Metadata::new();
        assert!(md.set("Artist", TagValue::Ascii("a".to_string())).is_none());
        let prev = md.set("Artist", TagValue::Ascii("b".to_string()));
        assert_eq!(prev, Some(TagValue::Ascii("a".to_string())));
        assert_eq!(md.get("Artist"), Some(&TagValue::Ascii("b".to_string())));
        assert_eq!(md.len(), 1);
    }

    #[test]
    fn iteration_is_key_ordered() {
        let mut md = Metadata::new();
        md.set("b", TagValue::Byte(alloc::vec![1]));
        md.set("a", TagValue::Byte(alloc::vec![2]));
        let keys: Vec<&str> = md.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["a", "b"]);
    }
}
