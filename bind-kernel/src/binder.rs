//! Walks a type's field registry and resolves every field against loaded sources.

use bind_primitives::{DataSource, Error, Result, Value, render_raw};
use bind_source::SourceLoader;
use tracing::{debug, info};

use crate::Configuration;
use crate::descriptor::{ConfigType, FieldType, SourceKind};
use crate::instance::{ResolvedInstance, ResolvedValue};
use crate::options::BindOptions;
use crate::registry::FieldRegistry;
use crate::resolver::{ResolvePolicy, resolve};

/// Data sources for one bind.
///
/// Environment descriptors always read `env`. Property descriptors read
/// `file` when one is configured and `env` otherwise.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BindSources {
    env: DataSource,
    file: Option<DataSource>,
}

impl BindSources {
    /// Sources backed by the environment only.
    #[must_use]
    pub fn env(env: DataSource) -> Self {
        Self { env, file: None }
    }

    /// Sources with a configured file.
    #[must_use]
    pub fn with_file(mut self, file: DataSource) -> Self {
        self.file = Some(file);
        self
    }

    /// The environment snapshot.
    #[must_use]
    pub fn environment(&self) -> &DataSource {
        &self.env
    }

    /// The configured file contents, if any.
    #[must_use]
    pub fn file(&self) -> Option<&DataSource> {
        self.file.as_ref()
    }
}

/// Binds configuration types against data sources.
#[derive(Debug, Clone, Copy)]
pub struct Binder<'r> {
    registry: &'r FieldRegistry,
    options: BindOptions,
    loader_base: Option<&'r std::path::Path>,
}

impl Default for Binder<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Binder<'static> {
    /// A binder over [`FieldRegistry::global`] with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(FieldRegistry::global())
    }
}

impl<'r> Binder<'r> {
    /// A binder over `registry` with default options.
    #[must_use]
    pub fn with_registry(registry: &'r FieldRegistry) -> Self {
        Self {
            registry,
            options: BindOptions::default(),
            loader_base: None,
        }
    }

    /// Replaces the bind options.
    #[must_use]
    pub fn with_options(mut self, options: BindOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolves relative configuration file paths against `base` instead of
    /// the working directory.
    #[must_use]
    pub fn with_base_dir(mut self, base: &'r std::path::Path) -> Self {
        self.loader_base = Some(base);
        self
    }

    /// The registry this binder reads.
    #[must_use]
    pub fn registry(&self) -> &'r FieldRegistry {
        self.registry
    }

    /// The active options.
    #[must_use]
    pub const fn options(&self) -> BindOptions {
        self.options
    }

    /// Binds `ty` using `data` for every field, whatever its source kind.
    ///
    /// # Errors
    ///
    /// Returns the first resolution error in field registration order.
    pub fn bind(&self, ty: ConfigType, data: &DataSource) -> Result<ResolvedInstance> {
        self.bind_sources(ty, &BindSources::env(data.clone()))
    }

    /// Binds `ty` against `sources`.
    ///
    /// # Errors
    ///
    /// Returns the first resolution error in field registration order; no
    /// partially bound instance is returned.
    pub fn bind_sources(&self, ty: ConfigType, sources: &BindSources) -> Result<ResolvedInstance> {
        let env_policy = self.options.env_policy(&sources.env);
        let primary = sources
            .file
            .as_ref()
            .map(|file| (file, self.options.file_policy()));
        self.bind_with(ty, sources, primary, env_policy)
    }

    /// Loads `T`'s source, binds it, and returns the resolved instance.
    ///
    /// Sources are re-read on every call.
    ///
    /// # Errors
    ///
    /// Returns load errors from the source loader or the first resolution error.
    pub fn construct_instance<T: Configuration>(&self) -> Result<ResolvedInstance> {
        let mut loader = SourceLoader::new();
        if let Some(base) = self.loader_base {
            loader = loader.with_base_dir(base);
        }

        let mut sources = BindSources::env(SourceLoader::environment());
        if let Some(source) = T::source() {
            sources = sources.with_file(loader.load_file(&source)?);
        }

        let instance = self.bind_sources(ConfigType::of::<T>(), &sources)?;
        info!(
            config = instance.type_name(),
            fields = instance.len(),
            "configuration bound"
        );
        Ok(instance)
    }

    /// Loads `T`'s source, binds it, and deserializes the result into `T`.
    ///
    /// # Errors
    ///
    /// Returns load and resolution errors, or [`Error::Materialize`] when the
    /// resolved values do not deserialize into `T`.
    pub fn construct<T: Configuration>(&self) -> Result<T> {
        self.construct_instance::<T>()?.deserialize()
    }

    fn bind_with(
        &self,
        ty: ConfigType,
        sources: &BindSources,
        primary: Option<(&DataSource, ResolvePolicy)>,
        env_policy: ResolvePolicy,
    ) -> Result<ResolvedInstance> {
        let fields = self.registry.lookup(ty);
        debug!(config = ty.name(), fields = fields.len(), "binding configuration");

        let mut instance = ResolvedInstance::new(ty.name());
        for (field, descriptor) in fields.iter() {
            let (data, policy) = match (descriptor.kind(), primary) {
                (SourceKind::Prop, Some(primary)) => primary,
                _ => (&sources.env, env_policy),
            };
            let key = descriptor.key().unwrap_or(field);

            let Some(raw) = resolve(data, key, descriptor, policy)? else {
                continue;
            };

            let value = match descriptor.field_type() {
                FieldType::Nested(inner) => {
                    let slice = nested_source(key, raw)?;
                    // nested fields inherit the policy of the section's origin
                    let nested_primary = Some((&slice, policy));
                    let nested = self.bind_with(inner, sources, nested_primary, env_policy)?;
                    ResolvedValue::Nested(nested)
                }
                _ => ResolvedValue::Value(raw),
            };
            instance.define(field, value);
        }
        Ok(instance)
    }
}

fn nested_source(key: &str, raw: Value) -> Result<DataSource> {
    match raw {
        Value::Object(map) => Ok(map.into()),
        other => Err(Error::invalid(
            key,
            render_raw(&other),
            Some("expected a mapping".into()),
        )),
    }
}

/// Convenience for binding `T` against a single data source with the global registry.
///
/// # Errors
///
/// See [`Binder::bind`].
pub fn bind<T: Configuration>(data: &DataSource) -> Result<ResolvedInstance> {
    Binder::new().bind(ConfigType::of::<T>(), data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FieldDescriptor;
    use crate::registry::FieldSet;
    use crate::resolver::ValidationStage;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Inner {
        foo: String,
        zee: i64,
    }

    impl Configuration for Inner {
        fn describe(fields: &mut FieldSet) {
            fields
                .register("foo", FieldDescriptor::prop().string())
                .register("zee", FieldDescriptor::prop().number());
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Outer {
        a: Inner,
        name: Option<String>,
    }

    impl Configuration for Outer {
        fn describe(fields: &mut FieldSet) {
            fields
                .register("a", FieldDescriptor::prop().nested::<Inner>())
                .register("name", FieldDescriptor::env("OUTER_NAME").with_required(false));
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Service {
        name: String,
        port: u16,
        debug: bool,
    }

    impl Configuration for Service {
        fn describe(fields: &mut FieldSet) {
            fields
                .register("name", FieldDescriptor::env("NAME"))
                .register("port", FieldDescriptor::env("PORT").number().with_default(8080))
                .register("debug", FieldDescriptor::env("DEBUG").boolean().with_default(false));
        }
    }

    fn file_data() -> DataSource {
        serde_json::from_value(json!({ "a": { "foo": "bar", "zee": 1 } })).unwrap()
    }

    #[test]
    fn binds_nested_configuration() {
        let registry = FieldRegistry::new();
        let binder = Binder::with_registry(&registry);

        let instance = binder.bind(ConfigType::of::<Outer>(), &file_data()).unwrap();
        assert_eq!(instance.to_value(), json!({ "a": { "foo": "bar", "zee": 1 } }));

        let outer: Outer = instance.deserialize().unwrap();
        assert_eq!(outer.a, Inner { foo: "bar".into(), zee: 1 });
        assert_eq!(outer.name, None);
    }

    #[test]
    fn nested_value_must_be_a_mapping() {
        let registry = FieldRegistry::new();
        let data = DataSource::new().with("a", "flat");

        let err = Binder::with_registry(&registry)
            .bind(ConfigType::of::<Outer>(), &data)
            .expect_err("not a mapping");
        assert_eq!(err.reason(), Some("expected a mapping"));
        assert_eq!(err.key(), Some("a"));
    }

    #[test]
    fn missing_nested_is_required() {
        let registry = FieldRegistry::new();
        let err = Binder::with_registry(&registry)
            .bind(ConfigType::of::<Outer>(), &DataSource::new())
            .expect_err("required");
        assert!(matches!(err, Error::RequiredValue { key } if key == "a"));
    }

    #[test]
    fn env_fields_read_environment_when_file_configured() {
        let registry = FieldRegistry::new();
        let sources = BindSources::env(DataSource::from_vars([("OUTER_NAME", "svc")]))
            .with_file(file_data().with("OUTER_NAME", "from-file"));

        let instance = Binder::with_registry(&registry)
            .bind_sources(ConfigType::of::<Outer>(), &sources)
            .unwrap();
        assert_eq!(instance.value("name"), Some(&json!("svc")));
    }

    #[test]
    fn prop_fields_prefer_configured_file() {
        let registry = FieldRegistry::new();
        let sources = BindSources::env(DataSource::new().with("a", json!({ "foo": "env", "zee": 2 })))
            .with_file(file_data());

        let instance = Binder::with_registry(&registry)
            .bind_sources(ConfigType::of::<Outer>(), &sources)
            .unwrap();
        assert_eq!(instance.nested("a").unwrap().value("foo"), Some(&json!("bar")));
    }

    #[test]
    fn binds_env_with_coercion_and_defaults() {
        let registry = FieldRegistry::new();
        let env = DataSource::from_vars([("NAME", "vc"), ("PORT", "9000")]);

        let service: Service = Binder::with_registry(&registry)
            .bind(ConfigType::of::<Service>(), &env)
            .and_then(|instance| instance.deserialize())
            .unwrap();
        assert_eq!(
            service,
            Service {
                name: "vc".into(),
                port: 9000,
                debug: false
            }
        );
    }

    #[test]
    fn first_error_aborts_bind() {
        let registry = FieldRegistry::new();
        let env = DataSource::from_vars([("PORT", "bar")]);

        let err = Binder::with_registry(&registry)
            .bind(ConfigType::of::<Service>(), &env)
            .expect_err("NAME is missing");
        assert!(matches!(err, Error::RequiredValue { key } if key == "NAME"));
    }

    #[test]
    fn skip_unset_env_applies_to_env_fields_only() {
        let registry = FieldRegistry::new();
        let binder = Binder::with_registry(&registry);

        let env = DataSource::from_vars([("SKIP_UNSET_ENV", "1")]);
        let instance = binder.bind(ConfigType::of::<Service>(), &env).unwrap();
        assert!(instance.get("name").is_none());

        let sources = BindSources::env(env).with_file(DataSource::new());
        let err = binder
            .bind_sources(ConfigType::of::<Outer>(), &sources)
            .expect_err("file fields are never skipped");
        assert!(matches!(err, Error::RequiredValue { .. }));
    }

    #[test]
    fn skip_unset_env_reaches_nested_env_sections() {
        let registry = FieldRegistry::new();
        let env = DataSource::from_vars([("SKIP_UNSET_ENV", "1")]).with("a", json!({ "zee": 3 }));

        let instance = Binder::with_registry(&registry)
            .bind(ConfigType::of::<Outer>(), &env)
            .unwrap();
        let inner = instance.nested("a").unwrap();
        assert!(inner.get("foo").is_none());
        assert_eq!(inner.value("zee"), Some(&json!(3)));
    }

    #[test]
    fn raw_env_validation_reaches_nested_env_sections() {
        #[derive(Deserialize)]
        struct Port;

        impl Configuration for Port {
            fn describe(fields: &mut FieldSet) {
                fields.register(
                    "port",
                    FieldDescriptor::prop().number().with_validator(Value::is_string),
                );
            }
        }

        #[derive(Deserialize)]
        struct Wrapper;

        impl Configuration for Wrapper {
            fn describe(fields: &mut FieldSet) {
                fields.register("server", FieldDescriptor::prop().nested::<Port>());
            }
        }

        let registry = FieldRegistry::new();
        let env = DataSource::new().with("server", json!({ "port": "8080" }));
        let binder = Binder::with_registry(&registry)
            .with_options(BindOptions::new().with_env_validation(ValidationStage::Raw));

        let instance = binder.bind(ConfigType::of::<Wrapper>(), &env).unwrap();
        assert_eq!(
            instance.nested("server").unwrap().value("port"),
            Some(&json!(8080))
        );
    }

    #[test]
    fn registry_not_poisoned_by_failed_bind() {
        let registry = FieldRegistry::new();
        let binder = Binder::with_registry(&registry);

        assert!(binder.bind(ConfigType::of::<Service>(), &DataSource::new()).is_err());
        let instance = binder
            .bind(ConfigType::of::<Service>(), &DataSource::from_vars([("NAME", "ok")]))
            .unwrap();
        assert_eq!(instance.value("name"), Some(&json!("ok")));
        let fields = registry.lookup(ConfigType::of::<Service>());
        assert_eq!(fields.get("name").and_then(FieldDescriptor::key), Some("NAME"));
    }
}
