//! Configuration binding kernel.
//!
//! Configuration types register per-field descriptors through
//! [`Configuration::describe`]. A [`Binder`] walks the descriptors held in a
//! [`FieldRegistry`], resolves each field against the loaded sources, and
//! produces an immutable [`ResolvedInstance`] that can be deserialized into
//! the configuration type.
//!
//! ```
//! use bind_kernel::{Binder, ConfigType, Configuration, FieldDescriptor, FieldRegistry, FieldSet};
//! use bind_primitives::DataSource;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Server {
//!     host: String,
//!     port: u16,
//! }
//!
//! impl Configuration for Server {
//!     fn describe(fields: &mut FieldSet) {
//!         fields
//!             .register("host", FieldDescriptor::env("HOST").with_default("127.0.0.1"))
//!             .register("port", FieldDescriptor::env("PORT").number());
//!     }
//! }
//!
//! let registry = FieldRegistry::new();
//! let env = DataSource::from_vars([("PORT", "8080")]);
//! let server: Server = Binder::with_registry(&registry)
//!     .bind(ConfigType::of::<Server>(), &env)?
//!     .deserialize()?;
//! assert_eq!(server.host, "127.0.0.1");
//! assert_eq!(server.port, 8080);
//! # Ok::<(), bind_primitives::Error>(())
//! ```

#![warn(missing_docs, clippy::pedantic)]

mod binder;
pub mod coerce;
mod descriptor;
mod instance;
mod options;
mod registry;
pub mod resolver;

use bind_source::ConfigSource;
use serde::de::DeserializeOwned;

pub use binder::{BindSources, Binder, bind};
pub use descriptor::{ConfigType, FieldDescriptor, FieldType, SourceKind, Transformer, Validator};
pub use instance::{ResolvedInstance, ResolvedValue};
pub use options::{BindOptions, SKIP_UNSET_ENV};
pub use registry::{FieldDoc, FieldRegistry, FieldSet};
pub use resolver::{ResolvePolicy, ValidationStage, resolve};

/// A type whose fields are bound from configuration sources.
pub trait Configuration: DeserializeOwned + 'static {
    /// Registers the type's field descriptors.
    ///
    /// Runs once per registry, the first time the type is looked up.
    fn describe(fields: &mut FieldSet);

    /// The configuration type whose fields this one inherits.
    fn parent() -> Option<ConfigType> {
        None
    }

    /// File to bind from. `None` binds from the process environment.
    fn source() -> Option<ConfigSource> {
        None
    }
}
