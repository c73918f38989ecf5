//! Key-value data sources consumed by the resolver.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Immutable mapping from source key to an untyped value.
///
/// Environment snapshots hold only string values; parsed files may nest
/// mappings arbitrarily. A key mapped to `null` is treated as absent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataSource(Map<String, Value>);

impl DataSource {
    /// Creates an empty data source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a flat, string-valued data source from variable pairs.
    #[must_use]
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        vars.into_iter()
            .map(|(key, value)| (key.into(), Value::String(value.into())))
            .collect()
    }

    /// Returns a copy of this source with `key` set to `value`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Looks up a present value. Missing keys and `null` both yield `None`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|value| !value.is_null())
    }

    /// Returns `true` when `key` is missing or mapped to `null`.
    #[must_use]
    pub fn is_absent(&self, key: &str) -> bool {
        self.get(key).is_none()
    }

    /// Returns the nested mapping stored under `key`, if any.
    #[must_use]
    pub fn slice(&self, key: &str) -> Option<Self> {
        match self.get(key)? {
            Value::Object(map) => Some(Self(map.clone())),
            _ => None,
        }
    }

    /// Iterates over the keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of entries, including `null` ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the source has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the underlying mapping.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for DataSource {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for DataSource {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Renders a raw value for error messages: strings verbatim, anything else as JSON.
#[must_use]
pub fn render_raw(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_and_missing_are_absent() {
        let source = DataSource::new().with("NULL", Value::Null).with("EMPTY", "");

        assert!(source.is_absent("NULL"));
        assert!(source.is_absent("MISSING"));
        assert!(!source.is_absent("EMPTY"));
        assert_eq!(source.get("EMPTY"), Some(&json!("")));
    }

    #[test]
    fn vars_are_string_valued() {
        let source = DataSource::from_vars([("PORT", "8080"), ("NAME", "vc")]);
        assert_eq!(source.get("PORT"), Some(&json!("8080")));
        assert_eq!(source.keys().collect::<Vec<_>>(), vec!["PORT", "NAME"]);
    }

    #[test]
    fn slice_returns_nested_mapping() {
        let source: DataSource = serde_json::from_value(json!({
            "a": { "foo": "bar", "zee": 1 },
            "b": "scalar"
        }))
        .unwrap();

        let nested = source.slice("a").expect("mapping");
        assert_eq!(nested.get("zee"), Some(&json!(1)));
        assert!(source.slice("b").is_none());
        assert!(source.slice("c").is_none());
    }

    #[test]
    fn render_raw_keeps_strings_verbatim() {
        assert_eq!(render_raw(&json!("abc")), "abc");
        assert_eq!(render_raw(&json!(12)), "12");
        assert_eq!(render_raw(&json!({"a": true})), r#"{"a":true}"#);
    }
}
