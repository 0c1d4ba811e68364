//! Serializable snapshot of a container for archive writers.

use crate::container::available::FactoryId;
use serde::Serialize;

/// One live module, as an archive writer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleSummary {
    pub name: String,
    pub module_type: String,
    pub capabilities: Vec<String>,
}

/// One pending factory, not yet loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailableSummary {
    pub id: FactoryId,
    pub module_type: String,
    pub capabilities: Vec<String>,
}

/// Container contents in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerManifest {
    pub name: Option<String>,
    pub nesting_prefix: Option<String>,
    pub modules: Vec<ModuleSummary>,
    pub available: Vec<AvailableSummary>,
}

impl ContainerManifest {
    /// Archive entry name for `file_name`, namespaced by the nesting prefix.
    pub fn entry_name(&self, file_name: &str) -> String {
        match &self.nesting_prefix {
            Some(prefix) => format!("{prefix}{file_name}"),
            None => file_name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ContainerManifest;

    fn manifest(prefix: Option<&str>) -> ContainerManifest {
        ContainerManifest {
            name: None,
            nesting_prefix: prefix.map(str::to_string),
            modules: vec![],
            available: vec![],
        }
    }

    #[test]
    fn entry_name_applies_nesting_prefix() {
        assert_eq!(
            manifest(Some("solution/")).entry_name("rates.csv"),
            "solution/rates.csv"
        );
        assert_eq!(manifest(None).entry_name("rates.csv"), "rates.csv");
    }
}
