//! Untyped request field bag.
//!
//! Query strings, form bodies and JSON bodies all land in a [`FieldBag`]. A
//! field only counts as present when it is a non-empty string; any other JSON
//! type (numbers, arrays from repeated keys, objects, null) is treated exactly
//! like an absent field.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldBag(Map<String, Value>);

impl FieldBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from decoded key/value pairs. Repeated keys collapse into an array.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = Map::new();
        for (key, value) in pairs {
            let key = key.into();
            let value = Value::String(value.into());
            match map.get_mut(&key) {
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    map.insert(key, value);
                }
            }
        }
        Self(map)
    }

    /// Build from a JSON document. Anything but an object yields an empty bag.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Overlay `other` onto this bag; keys present in both take `other`'s value.
    pub fn merge(&mut self, other: &FieldBag) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The field as a non-empty string, or `None`.
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn text_owned(&self, key: &str) -> Option<String> {
        self.text(key).map(str::to_string)
    }

    pub fn has_text(&self, key: &str) -> bool {
        self.text(key).is_some()
    }

    /// Strict equality against a string value.
    pub fn is(&self, key: &str, expected: &str) -> bool {
        matches!(self.0.get(key), Some(Value::String(s)) if s == expected)
    }

    /// Render a field for an error description, the way a template literal
    /// would: absent is `undefined`, `null` is `null`, arrays join with `,`.
    pub fn display(&self, key: &str) -> String {
        fn element(value: &Value) -> String {
            match value {
                Value::Null => String::new(),
                other => render(other),
            }
        }
        fn render(value: &Value) -> String {
            match value {
                Value::String(s) => s.clone(),
                Value::Array(items) => items.iter().map(element).collect::<Vec<_>>().join(","),
                other => other.to_string(),
            }
        }
        match self.0.get(key) {
            Some(value) => render(value),
            None => "undefined".to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl From<Map<String, Value>> for FieldBag {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
