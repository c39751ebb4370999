//! Markdown frontmatter: the ordered YAML block at the top of a document.
//!
//! The pipeline over a single document is
//! [`parse`] → [`analyze`] → [`merge`] → [`serialize`]; each stage is a pure
//! function over strings and [`Frontmatter`] values.

mod analyze;
mod merge;
mod parse;
mod serialize;

pub use analyze::{analyze, Analysis};
pub use merge::merge;
pub use parse::{parse, ParsedDocument};
pub use serialize::serialize;

use serde_yaml::{Mapping, Value};

/// Key holding the document title
pub const TITLE_KEY: &str = "title";
/// Key holding the document description
pub const DESCRIPTION_KEY: &str = "description";
/// Line that opens and closes a frontmatter block
pub const DELIMITER: &str = "---";

/// Ordered frontmatter mapping with string keys.
///
/// Insertion order is preserved from parse through merge to serialize, so
/// keys that frontfill does not own are never reordered or dropped.
#[derive(Debug, Clone, Default)]
pub struct Frontmatter {
    fields: Mapping,
}

impl Frontmatter {
    /// Create an empty frontmatter mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the mapping holds no keys
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a value by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Look up a string value by key
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// True when `key` is present with a truthy scalar value.
    ///
    /// Missing keys, `null`, empty strings, `false` and zero all count as
    /// absent.
    pub fn has_value(&self, key: &str) -> bool {
        self.get(key).is_some_and(is_truthy)
    }

    /// Insert or replace a value. Replacing keeps the key's position;
    /// new keys go to the end.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(Value::String(key.to_string()), value.into());
    }

    /// Keys in document order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().filter_map(Value::as_str)
    }

    /// Key/value pairs in document order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields
            .iter()
            .filter_map(|(key, value)| key.as_str().map(|key| (key, value)))
    }

    /// Borrow the underlying YAML mapping
    pub fn as_mapping(&self) -> &Mapping {
        &self.fields
    }
}

/// Equality is order-sensitive: two blocks are equal only if they hold the
/// same pairs in the same order.
impl PartialEq for Frontmatter {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl FromIterator<(String, Value)> for Frontmatter {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut frontmatter = Frontmatter::new();
        for (key, value) in iter {
            frontmatter.insert(&key, value);
        }
        frontmatter
    }
}

/// Truthiness of a frontmatter value.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.trim().is_empty(),
        // title/description must be scalars
        Value::Sequence(_) | Value::Mapping(_) => false,
        Value::Tagged(tagged) => is_truthy(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(pairs: &[(&str, Value)]) -> Frontmatter {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_has_value_treats_missing_null_and_empty_alike() {
        let fm = block(&[
            ("title", Value::Null),
            ("description", Value::String(String::new())),
        ]);
        assert!(!fm.has_value("title"));
        assert!(!fm.has_value("description"));
        assert!(!fm.has_value("author"));
    }

    #[test]
    fn test_has_value_rejects_whitespace_and_collections() {
        let fm = block(&[
            ("title", Value::String("   ".into())),
            ("description", Value::Sequence(vec![Value::from("a")])),
        ]);
        assert!(!fm.has_value("title"));
        assert!(!fm.has_value("description"));
    }

    #[test]
    fn test_has_value_accepts_scalars() {
        let fm = block(&[("title", Value::from("Intro")), ("description", Value::from(7))]);
        assert!(fm.has_value("title"));
        assert!(fm.has_value("description"));
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut fm = block(&[
            ("title", Value::Null),
            ("author", Value::from("A")),
        ]);
        fm.insert("title", "T");
        fm.insert("description", "D");
        assert_eq!(
            fm.keys().collect::<Vec<_>>(),
            vec!["title", "author", "description"]
        );
        assert_eq!(fm.get_str("title"), Some("T"));
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let a = block(&[("a", Value::from(1)), ("b", Value::from(2))]);
        let b = block(&[("b", Value::from(2)), ("a", Value::from(1))]);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }
}
