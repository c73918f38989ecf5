//! Binder configuration.

use bind_primitives::DataSource;

use crate::coerce::to_boolean;
use crate::resolver::{ResolvePolicy, ValidationStage};

/// Environment variable that suppresses required-value failures for
/// environment-sourced fields.
pub const SKIP_UNSET_ENV: &str = "SKIP_UNSET_ENV";

/// Options controlling how a [`Binder`](crate::Binder) resolves fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindOptions {
    skip_unset: Option<bool>,
    env_validation: ValidationStage,
}

impl BindOptions {
    /// Creates the default options: `SKIP_UNSET_ENV` is consulted and
    /// validation runs on coerced values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces skipping (`Some(true)`) or enforcing (`Some(false)`) unset
    /// required environment values, ignoring `SKIP_UNSET_ENV`. `None`
    /// restores the variable lookup.
    #[must_use]
    pub const fn with_skip_unset(mut self, skip_unset: Option<bool>) -> Self {
        self.skip_unset = skip_unset;
        self
    }

    /// Sets when validators run for environment-sourced fields.
    #[must_use]
    pub const fn with_env_validation(mut self, stage: ValidationStage) -> Self {
        self.env_validation = stage;
        self
    }

    /// Returns the explicit skip-unset override, if any.
    #[must_use]
    pub const fn skip_unset(self) -> Option<bool> {
        self.skip_unset
    }

    /// Returns the validation stage for environment-sourced fields.
    #[must_use]
    pub const fn env_validation(self) -> ValidationStage {
        self.env_validation
    }

    /// Policy for fields read from the environment snapshot `env`.
    #[must_use]
    pub fn env_policy(self, env: &DataSource) -> ResolvePolicy {
        let skip_unset = self
            .skip_unset
            .unwrap_or_else(|| env.get(SKIP_UNSET_ENV).is_some_and(to_boolean));
        ResolvePolicy::new(skip_unset, self.env_validation)
    }

    /// Policy for fields read from a configuration file.
    #[must_use]
    pub fn file_policy(self) -> ResolvePolicy {
        ResolvePolicy::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_unset_follows_environment() {
        let options = BindOptions::new();
        assert!(!options.env_policy(&DataSource::new()).skip_unset());
        assert!(options
            .env_policy(&DataSource::from_vars([(SKIP_UNSET_ENV, "1")]))
            .skip_unset());
        assert!(!options
            .env_policy(&DataSource::from_vars([(SKIP_UNSET_ENV, "false")]))
            .skip_unset());
    }

    #[test]
    fn explicit_override_wins() {
        let env = DataSource::from_vars([(SKIP_UNSET_ENV, "1")]);
        let options = BindOptions::new().with_skip_unset(Some(false));
        assert!(!options.env_policy(&env).skip_unset());

        let options = BindOptions::new().with_skip_unset(Some(true));
        assert!(options.env_policy(&DataSource::new()).skip_unset());
    }

    #[test]
    fn file_policy_never_skips() {
        let options = BindOptions::new()
            .with_skip_unset(Some(true))
            .with_env_validation(ValidationStage::Raw);
        assert_eq!(options.file_policy(), ResolvePolicy::default());
        assert_eq!(
            options.env_policy(&DataSource::new()).validation(),
            ValidationStage::Raw
        );
    }
}
