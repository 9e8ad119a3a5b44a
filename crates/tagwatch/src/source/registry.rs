//! Data-source factory registry for configuration.

use std::collections::BTreeSet;
use std::collections::HashMap;

use smol_str::SmolStr;

use crate::error::ClientError;

use super::{DataSource, LoopbackSource, SimulatedSource};

/// Name-keyed factory for the built-in data-source drivers.
pub struct SourceRegistry {
    entries: HashMap<SmolStr, SourceRegistryEntry>,
}

/// A driver instance built from configuration.
pub struct SourceSpec {
    pub name: SmolStr,
    pub source: Box<dyn DataSource>,
}

type SourceCreate = fn(&toml::Value) -> Result<Box<dyn DataSource>, ClientError>;

#[derive(Clone)]
struct SourceRegistryEntry {
    canonical: SmolStr,
    create: SourceCreate,
}

impl SourceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registry with the built-in drivers and their aliases.
    #[must_use]
    pub fn default_registry() -> Self {
        let mut registry = Self::new();
        registry.register("simulated", create_simulated);
        registry.register_alias("sim", "simulated");
        registry.register_alias("demo", "simulated");
        registry.register("loopback", create_loopback);
        registry.register_alias("echo", "loopback");
        registry
    }

    pub fn register(&mut self, name: impl Into<SmolStr>, create: SourceCreate) {
        let canonical = normalize_name(name.into());
        let entry = SourceRegistryEntry {
            canonical: canonical.clone(),
            create,
        };
        self.entries.insert(canonical, entry);
    }

    pub fn register_alias(&mut self, alias: impl Into<SmolStr>, target: &str) {
        let alias = normalize_name(alias.into());
        let target = normalize_name(SmolStr::new(target));
        if let Some(entry) = self.entries.get(&target).cloned() {
            self.entries.insert(alias, entry);
        }
    }

    /// Build a driver by name; `none` yields no driver.
    pub fn build(
        &self,
        driver: &str,
        params: &toml::Value,
    ) -> Result<Option<SourceSpec>, ClientError> {
        if is_none_driver(driver) {
            return Ok(None);
        }
        let entry = self
            .entries
            .get(&normalize_name(SmolStr::new(driver)))
            .cloned()
            .ok_or_else(|| {
                ClientError::InvalidConfig(format!("unsupported source.driver '{driver}'").into())
            })?;
        let source = (entry.create)(params)?;
        Ok(Some(SourceSpec {
            name: entry.canonical,
            source,
        }))
    }

    /// Canonical built-in driver names (stable sorted).
    #[must_use]
    pub fn canonical_source_names(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        for entry in self.entries.values() {
            names.insert(entry.canonical.to_string());
        }
        names.into_iter().collect()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_name(name: SmolStr) -> SmolStr {
    SmolStr::new(name.as_str().trim().to_ascii_lowercase())
}

fn is_none_driver(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case("none")
}

fn create_simulated(_params: &toml::Value) -> Result<Box<dyn DataSource>, ClientError> {
    Ok(Box::new(SimulatedSource::new()))
}

fn create_loopback(_params: &toml::Value) -> Result<Box<dyn DataSource>, ClientError> {
    Ok(Box::new(LoopbackSource::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_params() -> toml::Value {
        toml::Value::Table(toml::map::Map::new())
    }

    #[test]
    fn canonical_source_names_are_sorted_unique() {
        let registry = SourceRegistry::default_registry();
        assert_eq!(
            registry.canonical_source_names(),
            vec!["loopback".to_string(), "simulated".to_string()]
        );
    }

    #[test]
    fn alias_resolves_to_canonical_driver_name() {
        let registry = SourceRegistry::default_registry();
        let spec = registry
            .build("sim", &empty_params())
            .expect("build simulated alias")
            .expect("driver spec");
        assert_eq!(spec.name.as_str(), "simulated");
    }

    #[test]
    fn none_driver_builds_nothing() {
        let registry = SourceRegistry::default_registry();
        assert!(registry
            .build("none", &empty_params())
            .expect("none short-circuit")
            .is_none());
    }

    #[test]
    fn unknown_driver_is_a_config_error() {
        let registry = SourceRegistry::default_registry();
        assert!(registry.build("opc-direct", &empty_params()).is_err());
    }
}
