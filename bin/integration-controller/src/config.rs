//! Operator configuration loaded from an optional YAML file and the environment

use anyhow::{Context, Result};
use integration_core::registry::builtin;
use integration_core::RegistryType;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Environment variable naming the YAML configuration file
pub const CONFIG_PATH_ENV: &str = "OPERATOR_CONFIG";

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct OperatorConfig {
    /// Name of the managed Ingress, one per namespace
    pub ingress_name: String,
    /// Host every integration is exposed on
    pub ingress_host: String,
    /// Ingress class set when the managed Ingress is created
    pub ingress_class: Option<String>,
    /// Registry type used to resolve build configuration
    pub registry_type: RegistryType,
    /// Repository images are pushed to
    pub repository: String,
    /// Seconds between periodic reconciliations
    pub requeue_seconds: u64,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            ingress_name: "integration-operator-ingress".to_string(),
            ingress_host: "integration.local".to_string(),
            ingress_class: None,
            registry_type: builtin::DOCKER_HUB,
            repository: String::new(),
            requeue_seconds: 300,
        }
    }
}

impl OperatorConfig {
    /// Load from `OPERATOR_CONFIG` if set, then apply environment overrides
    pub fn load() -> Result<Self> {
        let base = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read operator config from {}", path.display()))?;
        let config = Self::from_yaml(&contents)
            .with_context(|| format!("Failed to parse operator config {}", path.display()))?;
        info!("Operator configuration loaded from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Override fields with values returned by `lookup` for their env vars
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(name) = lookup("OPERATOR_INGRESS_NAME") {
            self.ingress_name = name;
        }
        if let Some(host) = lookup("OPERATOR_INGRESS_HOST") {
            self.ingress_host = host;
        }
        if let Some(class) = lookup("OPERATOR_INGRESS_CLASS") {
            self.ingress_class = Some(class);
        }
        if let Some(registry_type) = lookup("OPERATOR_REGISTRY_TYPE") {
            self.registry_type = RegistryType::from(registry_type);
        }
        if let Some(repository) = lookup("OPERATOR_REPOSITORY") {
            self.repository = repository;
        }
        if let Some(seconds) = lookup("OPERATOR_REQUEUE_SECONDS") {
            self.requeue_seconds = seconds
                .parse()
                .with_context(|| format!("Invalid OPERATOR_REQUEUE_SECONDS: {}", seconds))?;
        }
        Ok(self)
    }
}
