//! Container configuration and construction.
//!
//! # Responsibility
//! - Hold the host-supplied settings of one container (name, nesting prefix).
//! - Validate them before a container is built.
//!
//! # Invariants
//! - A built container never carries a blank name or nesting prefix.

use crate::container::observer::{ContainerObserver, LogObserver};
use crate::container::{ModuleContainer, DEFAULT_CONTAINER_KIND};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Deserializable container settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContainerConfig {
    /// Diagnostic name; prefixes every log line of the container.
    pub name: Option<String>,
    /// Namespace for archive entries when the container is nested, usually
    /// ending with `/`.
    pub nesting_prefix: Option<String>,
}

impl ContainerConfig {
    /// Validates declaration-level config invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ConfigError::EmptyName);
            }
        }
        if let Some(prefix) = &self.nesting_prefix {
            if prefix.trim().is_empty() {
                return Err(ConfigError::EmptyNestingPrefix);
            }
            if prefix.starts_with('/') || prefix.contains('\\') {
                return Err(ConfigError::InvalidNestingPrefix(prefix.clone()));
            }
        }
        Ok(())
    }
}

/// Container configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("container kind must not be empty")]
    EmptyKind,
    #[error("container name must not be blank")]
    EmptyName,
    #[error("nesting prefix must not be blank")]
    EmptyNestingPrefix,
    #[error("nesting prefix must be a relative `/`-separated path: {0}")]
    InvalidNestingPrefix(String),
}

/// Builder for [`ModuleContainer`].
pub struct ContainerBuilder {
    kind: &'static str,
    config: ContainerConfig,
    observer: Option<Box<dyn ContainerObserver>>,
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self {
            kind: DEFAULT_CONTAINER_KIND,
            config: ContainerConfig::default(),
            observer: None,
        }
    }
}

impl ContainerBuilder {
    /// Kind label checked by sub-modules before they attach.
    pub fn kind(mut self, kind: &'static str) -> Self {
        self.kind = kind;
        self
    }

    /// Replaces name and nesting prefix with `config`.
    pub fn config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = Some(name.into());
        self
    }

    pub fn nesting_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.nesting_prefix = Some(prefix.into());
        self
    }

    /// Observer receiving container events; defaults to [`LogObserver`].
    pub fn observer(mut self, observer: impl ContainerObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn build(self) -> Result<ModuleContainer, ConfigError> {
        if self.kind.trim().is_empty() {
            return Err(ConfigError::EmptyKind);
        }
        self.config.validate()?;

        let ContainerConfig {
            name,
            nesting_prefix,
        } = self.config;
        Ok(ModuleContainer::from_parts(
            self.kind,
            name.map(|value| value.trim().to_string()),
            nesting_prefix,
            self.observer.unwrap_or_else(|| Box::new(LogObserver)),
        ))
    }
}
