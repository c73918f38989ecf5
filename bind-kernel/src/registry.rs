//! Registry of field descriptors keyed by configuration type.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use bind_primitives::Value;
use serde::Serialize;

use crate::descriptor::{ConfigType, FieldDescriptor};

/// Ordered mapping from field name to descriptor.
///
/// Registering a field name twice replaces the earlier descriptor in place,
/// so a field never appears more than once and keeps its first position.
#[derive(Clone, Debug, Default)]
pub struct FieldSet {
    entries: Vec<(String, FieldDescriptor)>,
}

impl FieldSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `descriptor` under `field`, replacing any previous entry.
    ///
    /// Property descriptors without an explicit name take `field` as their key.
    pub fn register(&mut self, field: impl Into<String>, descriptor: FieldDescriptor) -> &mut Self {
        let field = field.into();
        let descriptor = descriptor.keyed_for(&field);
        match self.entries.iter_mut().find(|(name, _)| *name == field) {
            Some((_, slot)) => *slot = descriptor,
            None => self.entries.push((field, descriptor)),
        }
        self
    }

    /// Returns the descriptor registered for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldDescriptor> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, descriptor)| descriptor)
    }

    /// Iterates over fields in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldDescriptor)> {
        self.entries
            .iter()
            .map(|(name, descriptor)| (name.as_str(), descriptor))
    }

    /// Field names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Number of registered fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no field is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn merge(&mut self, other: &FieldSet) {
        for (field, descriptor) in &other.entries {
            self.register(field.clone(), descriptor.clone());
        }
    }
}

/// One row of generated configuration documentation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldDoc {
    /// Field name on the configuration type.
    pub field: String,
    /// Source key the value is read from.
    pub key: String,
    /// `env` or `prop`.
    pub source: &'static str,
    /// Declared type tag.
    pub field_type: String,
    /// Whether an absent value fails the bind.
    pub required: bool,
    /// Default value, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Description, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Registry that stores field descriptors keyed by configuration type.
///
/// A type's own fields are collected from [`Configuration::describe`] the
/// first time the registry sees it. Lookups merge in the fields of every
/// ancestor.
///
/// [`Configuration::describe`]: crate::Configuration::describe
#[derive(Default)]
pub struct FieldRegistry {
    inner: RwLock<HashMap<TypeId, Arc<FieldSet>>>,
}

impl std::fmt::Debug for FieldRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("FieldRegistry")
            .field("types", &inner.len())
            .finish()
    }
}

impl FieldRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry used by [`Binder::new`](crate::Binder::new).
    #[must_use]
    pub fn global() -> &'static FieldRegistry {
        static GLOBAL: OnceLock<FieldRegistry> = OnceLock::new();
        GLOBAL.get_or_init(FieldRegistry::new)
    }

    /// Registers a descriptor on `ty`, replacing any previous descriptor for
    /// `field`. The type's own `describe` runs first so this call wins.
    pub fn register(&self, ty: ConfigType, field: impl Into<String>, descriptor: FieldDescriptor) {
        let own = self.own(ty);
        let mut updated = (*own).clone();
        updated.register(field, descriptor);

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.insert(ty.id(), Arc::new(updated));
    }

    /// Returns the fields of `ty` merged with those of its ancestors, root
    /// ancestor first. Entries declared closer to `ty` win on name collision.
    #[must_use]
    pub fn lookup(&self, ty: ConfigType) -> FieldSet {
        let mut chain = vec![ty];
        let mut current = ty;
        while let Some(parent) = current.parent() {
            if chain.contains(&parent) {
                break;
            }
            chain.push(parent);
            current = parent;
        }

        let mut merged = FieldSet::new();
        for ancestor in chain.iter().rev() {
            merged.merge(&self.own(*ancestor));
        }
        merged
    }

    /// Returns `true` once `ty` has been described in this registry.
    #[must_use]
    pub fn contains(&self, ty: ConfigType) -> bool {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.contains_key(&ty.id())
    }

    /// Number of described types.
    #[must_use]
    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.len()
    }

    /// Returns `true` if no type has been described yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Documents every field of `ty`, inherited ones included.
    #[must_use]
    pub fn documentation(&self, ty: ConfigType) -> Vec<FieldDoc> {
        self.lookup(ty)
            .iter()
            .map(|(field, descriptor)| FieldDoc {
                field: field.to_owned(),
                key: descriptor.key().unwrap_or(field).to_owned(),
                source: descriptor.kind().as_str(),
                field_type: descriptor.field_type().to_string(),
                required: descriptor.is_required(),
                default: descriptor.default_value().cloned(),
                description: descriptor.description().map(str::to_owned),
            })
            .collect()
    }

    fn own(&self, ty: ConfigType) -> Arc<FieldSet> {
        {
            let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(fields) = inner.get(&ty.id()) {
                return Arc::clone(fields);
            }
        }

        let mut fields = FieldSet::new();
        ty.describe(&mut fields);
        let fields = Arc::new(fields);

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(inner.entry(ty.id()).or_insert(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Configuration;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Base;

    impl Configuration for Base {
        fn describe(fields: &mut FieldSet) {
            fields
                .register("name", FieldDescriptor::env("NAME"))
                .register("port", FieldDescriptor::env("PORT").number());
        }
    }

    #[derive(Deserialize)]
    struct Derived;

    impl Configuration for Derived {
        fn describe(fields: &mut FieldSet) {
            fields
                .register("port", FieldDescriptor::env("DERIVED_PORT").with_default(80))
                .register("debug", FieldDescriptor::env("DEBUG").boolean());
        }

        fn parent() -> Option<ConfigType> {
            Some(ConfigType::of::<Base>())
        }
    }

    #[test]
    fn registering_twice_keeps_one_entry() {
        let mut fields = FieldSet::new();
        fields
            .register("name", FieldDescriptor::env("NAME"))
            .register("other", FieldDescriptor::prop())
            .register("name", FieldDescriptor::env("NAME").with_default("x"));

        assert_eq!(fields.len(), 2);
        assert_eq!(fields.names().collect::<Vec<_>>(), vec!["name", "other"]);
        assert_eq!(fields.get("name").unwrap().default_value(), Some(&json!("x")));
        assert_eq!(fields.get("other").unwrap().key(), Some("other"));
    }

    #[test]
    fn lookup_merges_ancestors_with_subtype_winning() {
        let registry = FieldRegistry::new();
        let fields = registry.lookup(ConfigType::of::<Derived>());

        assert_eq!(
            fields.names().collect::<Vec<_>>(),
            vec!["name", "port", "debug"]
        );
        assert_eq!(fields.get("port").unwrap().key(), Some("DERIVED_PORT"));
        assert!(registry.contains(ConfigType::of::<Base>()));
        assert_eq!(registry.len(), 2);

        // the parent's own view is untouched
        let base = registry.lookup(ConfigType::of::<Base>());
        assert_eq!(base.get("port").unwrap().key(), Some("PORT"));
    }

    #[test]
    fn explicit_registration_overrides_describe() {
        let registry = FieldRegistry::new();
        let ty = ConfigType::of::<Base>();
        registry.register(ty, "name", FieldDescriptor::env("APP_NAME"));
        registry.register(ty, "extra", FieldDescriptor::prop().with_required(false));

        let fields = registry.lookup(ty);
        assert_eq!(fields.names().collect::<Vec<_>>(), vec!["name", "port", "extra"]);
        assert_eq!(fields.get("name").unwrap().key(), Some("APP_NAME"));
    }

    #[test]
    fn documentation_lists_inherited_fields() {
        let registry = FieldRegistry::new();
        let docs = registry.documentation(ConfigType::of::<Derived>());

        assert_eq!(docs.len(), 3);
        assert_eq!(docs[1].key, "DERIVED_PORT");
        assert!(!docs[1].required);
        assert_eq!(docs[1].default, Some(json!(80)));
        assert_eq!(docs[2].field_type, "boolean");
        assert_eq!(docs[0].source, "env");
    }
}
