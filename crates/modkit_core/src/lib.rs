//! Capability-addressed module registry.
//! Modules are stored once and found by any capability type they satisfy.

pub mod capability;
pub mod config;
pub mod container;
pub mod error;
pub mod logging;
pub mod module;
pub mod sub_module;

pub use capability::{
    capability_tags, Ancestor, Capability, CapabilitySet, CapabilityTag, Upcast, View,
};
pub use config::{ConfigError, ContainerBuilder, ContainerConfig};
pub use container::available::FactoryId;
pub use container::manifest::{AvailableSummary, ContainerManifest, ModuleSummary};
pub use container::observer::{ContainerEvent, ContainerObserver, LogObserver};
pub use container::{ContainerId, ContainerRef, ModuleContainer, DEFAULT_CONTAINER_KIND};
pub use error::{ModuleError, ModuleResult};
pub use logging::{
    default_log_level, init_console_logging, init_logging, logging_status, LogTarget,
    LoggingError,
};
pub use module::{Module, ModuleType};
pub use sub_module::{ParentBinding, SubModule};

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::Lazy;
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
