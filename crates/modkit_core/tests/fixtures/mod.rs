//! Module types shared by the integration tests.
//!
//! Hierarchy:
//! - `dyn ModelRuptureRates` -> `dyn RuptureRates`
//! - `dyn Averageable`, `dyn SlipRates` stand alone
//! - `dyn BranchHelper` is a helper capability

#![allow(dead_code)]

use modkit_core::{
    capability, module_type, ContainerEvent, ContainerId, ContainerObserver, ContainerRef,
    Module, ModuleContainer, ModuleError, ModuleResult, ParentBinding, SubModule,
};
use std::cell::RefCell;
use std::rc::Rc;

pub const SOLUTION_KIND: &str = "solution";

pub trait RuptureRates: Module {
    fn rate(&self, rupture: usize) -> f64;
}

pub trait ModelRuptureRates: RuptureRates {
    fn model(&self) -> &str;
}

pub trait Averageable: Module {}

pub trait SlipRates: Module {
    fn slip_rate(&self, section: usize) -> f64;
}

pub trait BranchHelper: Module {}

capability!(dyn RuptureRates: dyn Module);
capability!(dyn ModelRuptureRates: dyn RuptureRates);
capability!(dyn Averageable);
capability!(dyn SlipRates);
capability!(helper dyn BranchHelper);

/// Same rate for every rupture; a model-backed, averageable rates module.
#[derive(Debug)]
pub struct UniformRates {
    pub name: String,
    pub rate: f64,
}

impl UniformRates {
    pub fn new(name: &str, rate: f64) -> Self {
        Self {
            name: name.to_string(),
            rate,
        }
    }
}

impl Module for UniformRates {
    fn name(&self) -> &str {
        &self.name
    }
}

impl RuptureRates for UniformRates {
    fn rate(&self, _rupture: usize) -> f64 {
        self.rate
    }
}

impl ModelRuptureRates for UniformRates {
    fn model(&self) -> &str {
        "uniform"
    }
}

impl Averageable for UniformRates {}

module_type!(UniformRates: dyn ModelRuptureRates, dyn Averageable);

/// Explicit per-rupture rates; provides only `dyn RuptureRates`.
#[derive(Debug)]
pub struct PlainRates {
    pub rates: Vec<f64>,
}

impl Module for PlainRates {
    fn name(&self) -> &str {
        "plain rates"
    }
}

impl RuptureRates for PlainRates {
    fn rate(&self, rupture: usize) -> f64 {
        self.rates.get(rupture).copied().unwrap_or(0.0)
    }
}

module_type!(PlainRates: dyn RuptureRates);

/// Per-section slip rates.
#[derive(Debug)]
pub struct SectionSlips {
    pub slips: Vec<f64>,
}

impl Module for SectionSlips {
    fn name(&self) -> &str {
        "section slips"
    }
}

impl SlipRates for SectionSlips {
    fn slip_rate(&self, section: usize) -> f64 {
        self.slips.get(section).copied().unwrap_or(0.0)
    }
}

module_type!(SectionSlips: dyn SlipRates);

/// Provides both rupture and slip rates.
#[derive(Debug)]
pub struct CombinedModel;

impl Module for CombinedModel {
    fn name(&self) -> &str {
        "combined model"
    }
}

impl RuptureRates for CombinedModel {
    fn rate(&self, _rupture: usize) -> f64 {
        1.0
    }
}

impl SlipRates for CombinedModel {
    fn slip_rate(&self, _section: usize) -> f64 {
        2.0
    }
}

module_type!(CombinedModel: dyn RuptureRates, dyn SlipRates);

/// Extends only a helper capability.
#[derive(Debug)]
pub struct HelperBacked;

impl Module for HelperBacked {
    fn name(&self) -> &str {
        "helper backed"
    }
}

impl BranchHelper for HelperBacked {}

module_type!(HelperBacked: dyn BranchHelper);

/// Slip rates bound to the solution container that owns them.
#[derive(Debug)]
pub struct BranchSlips {
    pub slips: Vec<f64>,
    parent: ParentBinding,
}

impl BranchSlips {
    pub fn new(slips: Vec<f64>) -> Self {
        Self {
            slips,
            parent: ParentBinding::new(),
        }
    }
}

impl Module for BranchSlips {
    fn name(&self) -> &str {
        "branch slips"
    }
}

impl SlipRates for BranchSlips {
    fn slip_rate(&self, section: usize) -> f64 {
        self.slips.get(section).copied().unwrap_or(0.0)
    }
}

impl SubModule for BranchSlips {
    fn parent(&self) -> Option<ContainerRef> {
        self.parent.get()
    }

    fn set_parent(&self, parent: ContainerRef) -> ModuleResult<()> {
        self.parent.set(parent)
    }

    fn copy(&self, new_parent: ContainerRef) -> ModuleResult<Self> {
        Ok(Self {
            slips: self.slips.clone(),
            parent: ParentBinding::bound_to(new_parent),
        })
    }

    fn is_applicable(&self, container: ContainerRef) -> bool {
        container.kind() == SOLUTION_KIND
    }
}

module_type!(sub_module BranchSlips: dyn SlipRates);

/// Sub-module that refuses every parent.
#[derive(Debug)]
pub struct DetachedSlips;

impl Module for DetachedSlips {
    fn name(&self) -> &str {
        "detached slips"
    }
}

impl SlipRates for DetachedSlips {
    fn slip_rate(&self, _section: usize) -> f64 {
        0.0
    }
}

impl SubModule for DetachedSlips {
    fn parent(&self) -> Option<ContainerRef> {
        None
    }

    fn set_parent(&self, parent: ContainerRef) -> ModuleResult<()> {
        Err(ModuleError::InvalidOperation(format!(
            "detached slips cannot join container {}",
            parent.id()
        )))
    }

    fn copy(&self, _new_parent: ContainerRef) -> ModuleResult<Self> {
        Ok(Self)
    }
}

module_type!(sub_module DetachedSlips: dyn SlipRates);

/// A module that is itself a container (by id).
#[derive(Debug)]
pub struct NestedSolution {
    pub id: ContainerId,
}

impl Module for NestedSolution {
    fn name(&self) -> &str {
        "nested solution"
    }

    fn as_container(&self) -> Option<ContainerId> {
        Some(self.id)
    }
}

module_type!(NestedSolution);

/// Observer that records a short label per event.
#[derive(Clone, Default)]
pub struct RecordingObserver {
    events: Rc<RefCell<Vec<String>>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    pub fn count(&self, label: &str) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|event| event.as_str() == label)
            .count()
    }
}

impl ContainerObserver for RecordingObserver {
    fn on_event(&self, _container: &str, event: &ContainerEvent<'_>) {
        let label = match event {
            ContainerEvent::ModuleMapped { .. } => "mapped",
            ContainerEvent::ModuleRemoved { cause: Some(_), .. } => "evicted",
            ContainerEvent::ModuleRemoved { cause: None, .. } => "removed",
            ContainerEvent::AvailableMapped { .. } => "available_mapped",
            ContainerEvent::AvailableRemoved { .. } => "available_evicted",
            ContainerEvent::SubModuleCopied { .. } => "copied",
            ContainerEvent::LoadStarted { .. } => "load_started",
            ContainerEvent::LoadFailed { .. } => "load_failed",
            ContainerEvent::LoadRejected { .. } => "load_rejected",
            ContainerEvent::Cleared { .. } => "cleared",
        };
        self.events.borrow_mut().push(label.to_string());
    }
}

pub fn recorded_container(kind: &'static str) -> (ModuleContainer, RecordingObserver) {
    let observer = RecordingObserver::default();
    let container = ModuleContainer::builder()
        .kind(kind)
        .observer(observer.clone())
        .build()
        .expect("valid container config");
    (container, observer)
}

pub fn solution_container() -> ModuleContainer {
    ModuleContainer::builder()
        .kind(SOLUTION_KIND)
        .build()
        .expect("valid container config")
}
