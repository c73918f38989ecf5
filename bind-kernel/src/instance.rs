//! Immutable results of a bind.

use bind_primitives::{Error, Map, Result, Value};
use serde::de::DeserializeOwned;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A resolved field: a plain value or a nested configuration.
#[derive(Clone, Debug, PartialEq)]
pub enum ResolvedValue {
    /// Scalar or structured value.
    Value(Value),
    /// Nested configuration instance.
    Nested(ResolvedInstance),
}

impl ResolvedValue {
    /// Converts to an untyped value tree.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::Nested(instance) => instance.to_value(),
        }
    }
}

/// Fields resolved for one construction, in registration order.
///
/// Values are written once by the binder and cannot be changed afterwards.
/// Fields that resolved to nothing are omitted.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedInstance {
    type_name: &'static str,
    fields: Vec<(String, ResolvedValue)>,
}

impl ResolvedInstance {
    pub(crate) fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            fields: Vec::new(),
        }
    }

    pub(crate) fn define(&mut self, field: &str, value: ResolvedValue) {
        debug_assert!(self.get(field).is_none(), "field `{field}` defined twice");
        self.fields.push((field.to_owned(), value));
    }

    /// Name of the configuration type this instance was bound for.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns a resolved field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&ResolvedValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Returns a scalar field's value.
    #[must_use]
    pub fn value(&self, field: &str) -> Option<&Value> {
        match self.get(field)? {
            ResolvedValue::Value(value) => Some(value),
            ResolvedValue::Nested(_) => None,
        }
    }

    /// Returns a nested configuration field.
    #[must_use]
    pub fn nested(&self, field: &str) -> Option<&ResolvedInstance> {
        match self.get(field)? {
            ResolvedValue::Nested(instance) => Some(instance),
            ResolvedValue::Value(_) => None,
        }
    }

    /// Iterates over resolved fields in registration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &ResolvedValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of materialized fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if nothing was materialized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Converts to an untyped object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(name, value)| (name.clone(), value.to_value()))
            .collect();
        Value::Object(map)
    }

    /// Deserializes the instance into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Materialize`] when the resolved values do not fit `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.to_value()).map_err(|source| Error::Materialize {
            type_name: std::any::type_name::<T>(),
            source,
        })
    }
}

impl Serialize for ResolvedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Value(value) => value.serialize(serializer),
            Self::Nested(instance) => instance.serialize(serializer),
        }
    }
}

impl Serialize for ResolvedInstance {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Inner {
        foo: String,
        zee: u32,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Outer {
        a: Inner,
        name: Option<String>,
    }

    fn sample() -> ResolvedInstance {
        let mut inner = ResolvedInstance::new("Inner");
        inner.define("foo", ResolvedValue::Value(json!("bar")));
        inner.define("zee", ResolvedValue::Value(json!(1)));

        let mut outer = ResolvedInstance::new("Outer");
        outer.define("a", ResolvedValue::Nested(inner));
        outer
    }

    #[test]
    fn accessors() {
        let outer = sample();
        assert_eq!(outer.len(), 1);
        assert!(outer.value("a").is_none());
        assert_eq!(outer.nested("a").unwrap().value("foo"), Some(&json!("bar")));
        assert!(outer.get("name").is_none());
    }

    #[test]
    fn serializes_as_map() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value, json!({ "a": { "foo": "bar", "zee": 1 } }));
        assert_eq!(sample().to_value(), value);
    }

    #[test]
    fn deserializes_into_typed_struct() {
        let outer: Outer = sample().deserialize().unwrap();
        assert_eq!(
            outer,
            Outer {
                a: Inner {
                    foo: "bar".into(),
                    zee: 1
                },
                name: None
            }
        );
    }

    #[test]
    fn mismatched_type_is_a_materialize_error() {
        let err = sample().deserialize::<Inner>().expect_err("missing fields");
        assert!(matches!(err, Error::Materialize { .. }));
    }
}
