//! The value resolution pipeline: presence, default/required policy,
//! coercion or transform, and validation.

use bind_primitives::{DataSource, Error, Result, Value, render_raw};
use tracing::{debug, warn};

use crate::coerce::{to_boolean, to_number};
use crate::descriptor::{FieldDescriptor, FieldType};

/// When the validator sees the value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ValidationStage {
    /// After transform or coercion.
    #[default]
    Coerced,
    /// On the raw source value, before transform or coercion.
    Raw,
}

/// Knobs applied to a single resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResolvePolicy {
    skip_unset: bool,
    validation: ValidationStage,
}

impl ResolvePolicy {
    /// Creates a policy.
    #[must_use]
    pub const fn new(skip_unset: bool, validation: ValidationStage) -> Self {
        Self {
            skip_unset,
            validation,
        }
    }

    /// Whether absent required values resolve to nothing instead of failing.
    #[must_use]
    pub const fn skip_unset(self) -> bool {
        self.skip_unset
    }

    /// When validation runs.
    #[must_use]
    pub const fn validation(self) -> ValidationStage {
        self.validation
    }
}

/// Resolves `key` from `source` according to `descriptor`.
///
/// Returns `Ok(None)` when the value is absent and neither required nor
/// defaulted.
///
/// # Errors
///
/// - [`Error::RequiredValue`] when the value is absent, required, and has no default.
/// - [`Error::InvalidValue`] when number coercion fails or the validator rejects the value.
/// - [`Error::TransformFailed`] when the transformer fails.
pub fn resolve(
    source: &DataSource,
    key: &str,
    descriptor: &FieldDescriptor,
    policy: ResolvePolicy,
) -> Result<Option<Value>> {
    let Some(raw) = source.get(key) else {
        return resolve_absent(key, descriptor, policy);
    };

    if policy.validation() == ValidationStage::Raw {
        validate(key, raw, raw, descriptor)?;
    }

    let value = if let Some(transform) = descriptor.transformer() {
        transform(raw).map_err(|reason| Error::transform(key, reason))?
    } else {
        coerce(key, raw, descriptor.field_type())?
    };

    if policy.validation() == ValidationStage::Coerced && !value.is_null() {
        validate(key, raw, &value, descriptor)?;
    }

    Ok(Some(value))
}

fn resolve_absent(
    key: &str,
    descriptor: &FieldDescriptor,
    policy: ResolvePolicy,
) -> Result<Option<Value>> {
    if let Some(default) = descriptor.default_value() {
        debug!(key, "value absent; using default");
        return Ok(Some(default.clone()));
    }
    if descriptor.is_required() {
        if policy.skip_unset() {
            warn!(key, "required value unset; skipping");
            return Ok(None);
        }
        return Err(Error::required(key));
    }
    debug!(key, "optional value absent");
    Ok(None)
}

fn coerce(key: &str, raw: &Value, field_type: FieldType) -> Result<Value> {
    match field_type {
        FieldType::Number => to_number(raw).ok_or_else(|| {
            Error::invalid(key, render_raw(raw), Some("invalid number".into()))
        }),
        FieldType::Boolean => Ok(Value::Bool(to_boolean(raw))),
        FieldType::Any | FieldType::String | FieldType::Nested(_) => Ok(raw.clone()),
    }
}

fn validate(key: &str, raw: &Value, value: &Value, descriptor: &FieldDescriptor) -> Result<()> {
    let Some(validator) = descriptor.validator() else {
        return Ok(());
    };
    match validator(value) {
        Ok(true) => Ok(()),
        Ok(false) => Err(Error::invalid(key, render_raw(raw), None)),
        Err(reason) => Err(Error::invalid(key, render_raw(raw), Some(reason))),
    }
}
