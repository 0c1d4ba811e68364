//! Command-line demo of the module container.
//!
//! # Responsibility
//! - Register eager and lazy modules, override one by capability, and print
//!   the resulting manifest as JSON.
//! - Keep output deterministic apart from container ids.
//!
//! Usage: `modkit_cli [log-level]`

use anyhow::Context;
use log::info;
use modkit_core::{
    capability, default_log_level, init_console_logging, module_type, Module, ModuleContainer,
};
use std::rc::Rc;

trait RateModel: Module {
    fn annual_rate(&self) -> f64;
}

trait SectionTable: Module {
    fn section_count(&self) -> usize;
}

capability!(dyn RateModel: dyn Module);
capability!(dyn SectionTable: dyn Module);

struct ConstantRate(f64);

impl Module for ConstantRate {
    fn name(&self) -> &str {
        "constant rate"
    }
}

impl RateModel for ConstantRate {
    fn annual_rate(&self) -> f64 {
        self.0
    }
}

module_type!(ConstantRate: dyn RateModel);

struct ScaledRate {
    base: f64,
    scale: f64,
}

impl Module for ScaledRate {
    fn name(&self) -> &str {
        "scaled rate"
    }
}

impl RateModel for ScaledRate {
    fn annual_rate(&self) -> f64 {
        self.base * self.scale
    }
}

module_type!(ScaledRate: dyn RateModel);

struct FaultSections(Vec<&'static str>);

impl Module for FaultSections {
    fn name(&self) -> &str {
        "fault sections"
    }
}

impl SectionTable for FaultSections {
    fn section_count(&self) -> usize {
        self.0.len()
    }
}

module_type!(FaultSections: dyn SectionTable);

fn main() -> anyhow::Result<()> {
    let level = std::env::args()
        .nth(1)
        .unwrap_or_else(|| default_log_level().to_string());
    init_console_logging(&level).context("failed to start logging")?;
    info!("event=cli_start module=cli status=ok");
    println!("modkit_core version={}", modkit_core::core_version());

    let mut container = ModuleContainer::builder()
        .name("demo solution")
        .nesting_prefix("solution/")
        .build()
        .context("invalid container config")?;

    container.add_module(Rc::new(ConstantRate(0.02)))?;
    container.add_available_module(|| {
        Ok(FaultSections(vec!["San Andreas (Mojave)", "Garlock (West)"]))
    });

    // Replaces the constant rate under `dyn RateModel`.
    container.add_module(Rc::new(ScaledRate {
        base: 0.02,
        scale: 1.5,
    }))?;

    let rate = container.require_module::<dyn RateModel>()?;
    println!("rate model `{}` annual_rate={}", rate.name(), rate.annual_rate());

    println!("pending before load: {}", container.available_modules().len());
    let sections = container.require_module::<dyn SectionTable>()?;
    println!("sections loaded: {}", sections.section_count());

    let manifest = container.manifest();
    println!(
        "{}",
        serde_json::to_string_pretty(&manifest).context("failed to encode manifest")?
    );
    println!("manifest entry: {}", manifest.entry_name("modules.json"));
    Ok(())
}
