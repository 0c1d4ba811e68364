//! Observation port for container bookkeeping.
//!
//! Containers report every mapping, eviction and lazy load through a
//! [`ContainerObserver`] injected at construction. [`LogObserver`] is the
//! default and writes `event=... module=container` lines through `log`.

use crate::capability::CapabilityTag;
use crate::error::ModuleError;
use log::{debug, warn};

/// One registry state change.
#[derive(Debug)]
pub enum ContainerEvent<'a> {
    /// `module` became the provider of `capability`.
    ModuleMapped {
        capability: CapabilityTag,
        module: &'a str,
    },
    /// A live module left the container. `cause` is the capability whose
    /// registration evicted it, `None` for an explicit removal.
    ModuleRemoved {
        module: &'a str,
        module_type: CapabilityTag,
        cause: Option<CapabilityTag>,
    },
    /// A factory for `module_type` became the pending provider of `capability`.
    AvailableMapped {
        capability: CapabilityTag,
        module_type: CapabilityTag,
    },
    /// A pending factory was dropped because `cause` was (re)registered.
    AvailableRemoved {
        module_type: CapabilityTag,
        cause: CapabilityTag,
    },
    /// A sub-module bound elsewhere was copied for this container.
    SubModuleCopied { module: &'a str },
    LoadStarted { module_type: CapabilityTag },
    /// A factory returned an error; the factory is gone and is not retried.
    LoadFailed {
        module_type: CapabilityTag,
        error: &'a anyhow::Error,
    },
    /// A lazily built module was refused by `add_module` during a lookup.
    LoadRejected {
        capability: CapabilityTag,
        error: &'a ModuleError,
    },
    Cleared { modules: usize, available: usize },
}

/// Receives container events. `container` is the container's label.
pub trait ContainerObserver {
    fn on_event(&self, container: &str, event: &ContainerEvent<'_>);
}

/// Forwards container events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ContainerObserver for LogObserver {
    fn on_event(&self, container: &str, event: &ContainerEvent<'_>) {
        match event {
            ContainerEvent::ModuleMapped { capability, module } => debug!(
                "event=module_mapped module=container container={} capability={} target={}",
                container, capability, module
            ),
            ContainerEvent::ModuleRemoved {
                module,
                module_type,
                cause: Some(cause),
            } => debug!(
                "event=module_evicted module=container container={} target={} type={} assignable_to={}",
                container, module, module_type, cause
            ),
            ContainerEvent::ModuleRemoved {
                module,
                module_type,
                cause: None,
            } => debug!(
                "event=module_removed module=container container={} target={} type={}",
                container, module, module_type
            ),
            ContainerEvent::AvailableMapped {
                capability,
                module_type,
            } => debug!(
                "event=available_mapped module=container container={} capability={} type={}",
                container, capability, module_type
            ),
            ContainerEvent::AvailableRemoved { module_type, cause } => debug!(
                "event=available_evicted module=container container={} type={} assignable_to={}",
                container, module_type, cause
            ),
            ContainerEvent::SubModuleCopied { module } => debug!(
                "event=sub_module_copied module=container container={} target={}",
                container, module
            ),
            ContainerEvent::LoadStarted { module_type } => debug!(
                "event=lazy_load module=container status=start container={} type={}",
                container, module_type
            ),
            ContainerEvent::LoadFailed { module_type, error } => warn!(
                "event=lazy_load module=container status=error container={} type={} error={:#}",
                container, module_type, error
            ),
            ContainerEvent::LoadRejected { capability, error } => warn!(
                "event=lazy_load module=container status=rejected container={} capability={} error={}",
                container, capability, error
            ),
            ContainerEvent::Cleared { modules, available } => debug!(
                "event=modules_cleared module=container container={} modules={} available={}",
                container, modules, available
            ),
        }
    }
}
