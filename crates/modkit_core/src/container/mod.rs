//! Polymorphic module container.
//!
//! # Responsibility
//! - Store heterogeneous modules and hand them back by any capability they
//!   satisfy, not only by their concrete type.
//! - Hold factories for modules that are built on first demand.
//! - Copy sub-modules bound to another container instead of sharing them.
//!
//! # Invariants
//! - For every tag at most one live module and at most one pending factory.
//! - Registering a module evicts every live module and pending factory that
//!   is assignable to any of its tags, not just the single mapping.
//! - A factory is unregistered before it runs and is never retried.
//! - Live modules keep insertion order.
//!
//! Access is single-threaded; the container holds `Rc` handles and no locks.

pub mod available;
mod live;
pub mod manifest;
pub mod observer;

use crate::capability::{Capability, CapabilityTag};
use crate::config::ContainerBuilder;
use crate::error::{ModuleError, ModuleResult};
use crate::module::{self, Module, ModuleType};
use available::{AvailableModules, FactoryId};
use live::LiveModules;
use manifest::{AvailableSummary, ContainerManifest, ModuleSummary};
use observer::{ContainerEvent, ContainerObserver, LogObserver};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use uuid::Uuid;

/// Kind used by containers built without an explicit kind.
pub const DEFAULT_CONTAINER_KIND: &str = "default";

/// Unique identity of one container instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ContainerId(Uuid);

impl ContainerId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Display for ContainerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Copyable reference to a container, as recorded by sub-modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerRef {
    id: ContainerId,
    kind: &'static str,
}

impl ContainerRef {
    pub fn id(&self) -> ContainerId {
        self.id
    }

    /// Kind label sub-modules use to decide whether they can attach.
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

/// Registry of modules addressed by capability.
pub struct ModuleContainer {
    id: ContainerId,
    kind: &'static str,
    name: Option<String>,
    label: String,
    nesting_prefix: Option<String>,
    live: LiveModules,
    available: AvailableModules,
    observer: Box<dyn ContainerObserver>,
}

impl Default for ModuleContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleContainer {
    /// Unnamed container of the default kind, logging through `log`.
    pub fn new() -> Self {
        Self::from_parts(
            DEFAULT_CONTAINER_KIND,
            None,
            None,
            Box::new(LogObserver),
        )
    }

    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::default()
    }

    pub(crate) fn from_parts(
        kind: &'static str,
        name: Option<String>,
        nesting_prefix: Option<String>,
        observer: Box<dyn ContainerObserver>,
    ) -> Self {
        let id = ContainerId::new();
        let label = match &name {
            Some(name) => name.clone(),
            None => format!("{kind}-{}", &id.0.simple().to_string()[..8]),
        };
        Self {
            id,
            kind,
            name,
            label,
            nesting_prefix,
            live: LiveModules::default(),
            available: AvailableModules::new(id),
            observer,
        }
    }

    pub fn id(&self) -> ContainerId {
        self.id
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn container_ref(&self) -> ContainerRef {
        ContainerRef {
            id: self.id,
            kind: self.kind,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Prefix an archive writer applies to this container's entries when the
    /// container is itself nested as a module. `None` unless configured.
    pub fn nesting_prefix(&self) -> Option<&str> {
        self.nesting_prefix.as_deref()
    }

    /// Adds `module`, making it the sole provider of every capability it has.
    ///
    /// Returns the instance actually registered: a sub-module bound to
    /// another container is replaced by a copy bound to this one.
    ///
    /// On error the container is left unchanged.
    ///
    /// # Errors
    /// - `InvalidOperation` when `module` is this container.
    /// - `InvalidOperation` when a sub-module cannot attach to this kind of
    ///   container or refuses its new parent.
    pub fn add_module<M: ModuleType>(&mut self, module: Rc<M>) -> ModuleResult<Rc<M>> {
        if module.as_container() == Some(self.id) {
            return Err(ModuleError::InvalidOperation(format!(
                "cannot add container `{}` to itself",
                self.label
            )));
        }

        let container = self.container_ref();
        let bound = M::bind(Rc::clone(&module), container)?;
        if module::address(&bound) != module::address(&module) {
            self.emit(&ContainerEvent::SubModuleCopied {
                module: bound.name(),
            });
        }

        M::adopt(&bound, container)?;

        let capabilities = M::capability_set();
        for tag in capabilities.tags() {
            self.evict(tag);
        }
        self.live.insert(Rc::clone(&bound));
        for tag in capabilities.tags() {
            self.emit(&ContainerEvent::ModuleMapped {
                capability: tag,
                module: bound.name(),
            });
        }

        self.purge_available(capabilities.module_tag());
        Ok(bound)
    }

    /// Module providing `C`, building it from a pending factory if needed.
    ///
    /// A factory error or a rejected module yields `None`; the factory is
    /// consumed either way.
    ///
    /// # Panics
    /// A panicking factory unwinds through this call. The factory has already
    /// been unregistered by then.
    pub fn get_module<C: Capability + ?Sized>(&mut self) -> Option<Rc<C>> {
        let tag = C::tag();
        if let Some(module) = self.live.view::<C>(tag) {
            return Some(module);
        }

        let factory = self.available.lookup(tag)?;
        match self.load_available_module(factory) {
            Ok(true) => self.live.view::<C>(tag),
            Ok(false) => None,
            Err(error) => {
                self.emit(&ContainerEvent::LoadRejected {
                    capability: tag,
                    error: &error,
                });
                None
            }
        }
    }

    /// Live module providing `C`. Never runs a factory.
    pub fn loaded_module<C: Capability + ?Sized>(&self) -> Option<Rc<C>> {
        self.live.view::<C>(C::tag())
    }

    /// Like [`get_module`](Self::get_module), but absence is an error.
    pub fn require_module<C: Capability + ?Sized>(&mut self) -> ModuleResult<Rc<C>> {
        self.get_module::<C>()
            .ok_or(ModuleError::MissingDependency {
                capability: C::tag().name(),
            })
    }

    /// Whether `C` is provided. May build the module from a factory.
    ///
    /// # Panics
    /// Only when a factory it runs panics; see [`get_module`](Self::get_module).
    pub fn has_module<C: Capability + ?Sized>(&mut self) -> bool {
        self.get_module::<C>().is_some()
    }

    /// Removes `module` (any handle to it) and all of its mappings.
    ///
    /// Returns whether it was live.
    ///
    /// # Errors
    /// - `InternalInvariant` when the module was live but mapped under no tag.
    pub fn remove_module<T: ?Sized>(&mut self, module: &Rc<T>) -> ModuleResult<bool> {
        match self.live.remove(module::address(module))? {
            Some(removed) => {
                self.emit(&ContainerEvent::ModuleRemoved {
                    module: removed.handle.name(),
                    module_type: removed.capabilities.module_tag(),
                    cause: None,
                });
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Removes every live module and pending factory assignable to `C`.
    pub fn remove_module_instances<C: Capability + ?Sized>(&mut self) -> bool {
        self.evict(C::tag())
    }

    /// Removes every pending factory assignable to `C`.
    pub fn remove_available_module_instances<C: Capability + ?Sized>(&mut self) -> bool {
        self.purge_available(C::tag())
    }

    /// Empties live modules and pending factories.
    pub fn clear_modules(&mut self) {
        let modules = self.live.len();
        let available = self.available.len();
        self.live.clear();
        self.available.clear();
        self.emit(&ContainerEvent::Cleared { modules, available });
    }

    /// Registers `factory` to build an `M` on first demand.
    ///
    /// Pending factories overlapping `M`'s capabilities are dropped. Live
    /// modules are left alone and keep precedence over the new factory.
    pub fn add_available_module<M, F>(&mut self, factory: F) -> FactoryId
    where
        M: ModuleType,
        F: FnOnce() -> anyhow::Result<M> + 'static,
    {
        let capabilities = M::capability_set();
        for tag in capabilities.tags() {
            self.purge_available(tag);
        }

        let id = self.available.insert::<M, F>(factory);
        for tag in capabilities.tags() {
            self.emit(&ContainerEvent::AvailableMapped {
                capability: tag,
                module_type: capabilities.module_tag(),
            });
        }
        id
    }

    /// Whether `C` is live or has a pending factory. Never runs a factory.
    pub fn has_available_module<C: Capability + ?Sized>(&self) -> bool {
        let tag = C::tag();
        self.live.contains(tag) || self.available.contains(tag)
    }

    /// Runs the pending factory `id` and registers what it builds.
    ///
    /// The factory is unregistered first, whatever the outcome. Returns
    /// `Ok(false)` when the factory itself failed.
    ///
    /// # Errors
    /// - `InvalidOperation` when `id` is not a pending factory here.
    /// - Any error of [`add_module`](Self::add_module) for the built module.
    pub fn load_available_module(&mut self, id: FactoryId) -> ModuleResult<bool> {
        let pending = self.available.take(id).ok_or_else(|| {
            ModuleError::InvalidOperation(format!(
                "{id} is not registered as an available module"
            ))
        })?;

        self.emit(&ContainerEvent::LoadStarted {
            module_type: pending.capabilities.module_tag(),
        });
        pending.loader.load(self)
    }

    /// Loads every pending factory registered at call time.
    ///
    /// Factories dropped by an earlier load in the same pass are skipped.
    /// Returns the number of modules built.
    pub fn load_all_available_modules(&mut self) -> ModuleResult<usize> {
        let mut loaded = 0;
        for id in self.available.ids() {
            if !self.available.is_registered(id) {
                continue;
            }
            if self.load_available_module(id)? {
                loaded += 1;
            }
        }
        Ok(loaded)
    }

    /// Live modules in insertion order.
    pub fn modules(&self) -> impl ExactSizeIterator<Item = &Rc<dyn Module>> + '_ {
        self.live.iter().map(|module| &module.handle)
    }

    /// Pending factories in registration order.
    pub fn available_modules(&self) -> Vec<AvailableSummary> {
        self.available
            .iter()
            .map(|pending| AvailableSummary {
                id: pending.id,
                module_type: pending.capabilities.module_tag().name().to_string(),
                capabilities: pending.capabilities.names(),
            })
            .collect()
    }

    /// Loads every pending factory, then lists the live modules.
    ///
    /// # Errors
    /// - Any error of [`load_all_available_modules`](Self::load_all_available_modules).
    pub fn modules_loading_available(
        &mut self,
    ) -> ModuleResult<impl ExactSizeIterator<Item = &Rc<dyn Module>> + '_> {
        self.load_all_available_modules()?;
        Ok(self.modules())
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.len() == 0
    }

    /// Snapshot for archive writers.
    pub fn manifest(&self) -> ContainerManifest {
        ContainerManifest {
            name: self.name.clone(),
            nesting_prefix: self.nesting_prefix.clone(),
            modules: self
                .live
                .iter()
                .map(|module| ModuleSummary {
                    name: module.handle.name().to_string(),
                    module_type: module.capabilities.module_tag().name().to_string(),
                    capabilities: module.capabilities.names(),
                })
                .collect(),
            available: self.available_modules(),
        }
    }

    pub(crate) fn emit(&self, event: &ContainerEvent<'_>) {
        self.observer.on_event(&self.label, event);
    }

    fn evict(&mut self, tag: CapabilityTag) -> bool {
        let removed = self.live.remove_instances(tag);
        for module in &removed {
            self.emit(&ContainerEvent::ModuleRemoved {
                module: module.handle.name(),
                module_type: module.capabilities.module_tag(),
                cause: Some(tag),
            });
        }
        let purged = self.purge_available(tag);
        !removed.is_empty() || purged
    }

    fn purge_available(&mut self, tag: CapabilityTag) -> bool {
        let removed = self.available.remove_instances(tag);
        for pending in &removed {
            self.emit(&ContainerEvent::AvailableRemoved {
                module_type: pending.capabilities.module_tag(),
                cause: tag,
            });
        }
        !removed.is_empty()
    }
}

impl std::fmt::Debug for ModuleContainer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleContainer")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("modules", &self.live.len())
            .field("available", &self.available.len())
            .finish()
    }
}
