//! Per-field resolution descriptors.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use bind_primitives::Value;

use crate::Configuration;
use crate::registry::FieldSet;

/// Validator stored on a descriptor. `Err` carries the rejection reason.
pub type Validator = Arc<dyn Fn(&Value) -> Result<bool, String> + Send + Sync>;

/// Transformer stored on a descriptor. `Err` carries the failure reason.
pub type Transformer = Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

/// Identity of a configuration type, usable as a registry key.
#[derive(Clone, Copy)]
pub struct ConfigType {
    id: TypeId,
    name: &'static str,
    describe: fn(&mut FieldSet),
    parent: fn() -> Option<ConfigType>,
}

impl ConfigType {
    /// Returns the identity of `T`.
    #[must_use]
    pub fn of<T: Configuration>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            describe: T::describe,
            parent: T::parent,
        }
    }

    /// Rust type identifier.
    #[must_use]
    pub const fn id(self) -> TypeId {
        self.id
    }

    /// Fully qualified type name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
    }

    /// The configuration type this one inherits fields from.
    #[must_use]
    pub fn parent(self) -> Option<ConfigType> {
        (self.parent)()
    }

    pub(crate) fn describe(self, fields: &mut FieldSet) {
        (self.describe)(fields);
    }
}

impl PartialEq for ConfigType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ConfigType {}

impl fmt::Debug for ConfigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConfigType").field(&self.name).finish()
    }
}

/// Declared type tag driving coercion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FieldType {
    /// No coercion; the raw value passes through.
    #[default]
    Any,
    /// Text; passes through unchanged.
    String,
    /// Numeric coercion.
    Number,
    /// Falsy-string boolean coercion.
    Boolean,
    /// A nested configuration bound recursively.
    Nested(ConfigType),
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::String => f.write_str("string"),
            Self::Number => f.write_str("number"),
            Self::Boolean => f.write_str("boolean"),
            Self::Nested(ty) => write!(f, "nested({})", ty.name()),
        }
    }
}

/// Where a field's value is read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// Always the process environment.
    Env,
    /// The configured file, or the environment when no file is configured.
    Prop,
}

impl SourceKind {
    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Env => "env",
            Self::Prop => "prop",
        }
    }
}

/// Describes how one field is resolved from a data source.
///
/// # Examples
///
/// ```
/// use bind_kernel::FieldDescriptor;
///
/// let port = FieldDescriptor::env("PORT")
///     .number()
///     .with_default(8080)
///     .with_description("HTTP listen port");
/// assert!(!port.is_required());
/// assert_eq!(port.key(), Some("PORT"));
/// ```
#[derive(Clone)]
pub struct FieldDescriptor {
    kind: SourceKind,
    key: Option<String>,
    required: Option<bool>,
    default: Option<Value>,
    validator: Option<Validator>,
    transformer: Option<Transformer>,
    field_type: FieldType,
    description: Option<String>,
}

impl FieldDescriptor {
    fn new(kind: SourceKind, key: Option<String>) -> Self {
        Self {
            kind,
            key,
            required: None,
            default: None,
            validator: None,
            transformer: None,
            field_type: FieldType::Any,
            description: None,
        }
    }

    /// A field read from the environment variable `name`.
    #[must_use]
    pub fn env(name: impl Into<String>) -> Self {
        Self::new(SourceKind::Env, Some(name.into()))
    }

    /// A field read from the configured source, keyed by the field name
    /// unless [`FieldDescriptor::with_name`] overrides it.
    #[must_use]
    pub fn prop() -> Self {
        Self::new(SourceKind::Prop, None)
    }

    /// Overrides the source key.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.key = Some(name.into());
        self
    }

    /// Sets whether an absent value is an error. Ignored when a default is set.
    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    /// Value used when the key is absent.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Adds a validator; returning `false` rejects the value.
    #[must_use]
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(move |value| Ok(validator(value))));
        self
    }

    /// Adds a validator that may fail with a reason.
    #[must_use]
    pub fn with_fallible_validator<F, E>(mut self, validator: F) -> Self
    where
        F: Fn(&Value) -> Result<bool, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        self.validator = Some(Arc::new(move |value| {
            validator(value).map_err(|err| err.to_string())
        }));
        self
    }

    /// Replaces type coercion with a user transform of the raw value.
    #[must_use]
    pub fn with_transform<F, E>(mut self, transform: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        self.transformer = Some(Arc::new(move |value| {
            transform(value).map_err(|err| err.to_string())
        }));
        self
    }

    /// Human-readable description used in generated documentation.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the declared type tag.
    #[must_use]
    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    /// Shorthand for [`FieldType::String`].
    #[must_use]
    pub fn string(self) -> Self {
        self.with_type(FieldType::String)
    }

    /// Shorthand for [`FieldType::Number`].
    #[must_use]
    pub fn number(self) -> Self {
        self.with_type(FieldType::Number)
    }

    /// Shorthand for [`FieldType::Boolean`].
    #[must_use]
    pub fn boolean(self) -> Self {
        self.with_type(FieldType::Boolean)
    }

    /// Declares the field as a nested configuration of type `T`.
    #[must_use]
    pub fn nested<T: Configuration>(self) -> Self {
        self.with_type(FieldType::Nested(ConfigType::of::<T>()))
    }

    /// Fills in the source key from the field name if none was given.
    pub(crate) fn keyed_for(mut self, field: &str) -> Self {
        if self.key.is_none() {
            self.key = Some(field.to_owned());
        }
        self
    }

    /// Where the value is read from.
    #[must_use]
    pub const fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Source key, once known.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Effective required-ness: a default always wins over `required(true)`.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(true) && self.default.is_none()
    }

    /// Default value, if any.
    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Declared type tag.
    #[must_use]
    pub const fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Validator, if any.
    #[must_use]
    pub fn validator(&self) -> Option<&Validator> {
        self.validator.as_ref()
    }

    /// Transformer, if any.
    #[must_use]
    pub fn transformer(&self) -> Option<&Transformer> {
        self.transformer.as_ref()
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("kind", &self.kind)
            .field("key", &self.key)
            .field("required", &self.is_required())
            .field("default", &self.default)
            .field("validator", &self.validator.is_some())
            .field("transformer", &self.transformer.is_some())
            .field("field_type", &self.field_type)
            .field("description", &self.description)
            .finish()
    }
}
