//! Registry configuration strategies keyed by registry type
//!
//! A [`ConfigRegistry`] is filled once at startup and then shared read-only.
//! Each request carries its own [`RegistrySelection`], so concurrent
//! reconciliations never see one another's repository or image.

pub mod builtin;

use crate::{CoreError, Result};
use k8s_openapi::api::core::v1::{Volume, VolumeMount};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Key selecting a registry configuration strategy
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistryType(Cow<'static, str>);

impl RegistryType {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegistryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegistryType {
    fn from(name: &str) -> Self {
        Self(Cow::Owned(name.to_string()))
    }
}

impl From<String> for RegistryType {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

/// Build and push settings for one registry
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegistryConfig {
    pub registry_type: RegistryType,
    /// Arguments passed to the image builder
    pub args: Vec<String>,
    pub volume_mounts: Vec<VolumeMount>,
    pub volumes: Vec<Volume>,
}

impl Default for RegistryType {
    fn default() -> Self {
        builtin::DOCKER_HUB
    }
}

/// Produces the configuration for a repository and image
pub trait ConfigFactory: Send + Sync {
    fn create(&self, repository: &str, image: &str) -> RegistryConfig;
}

impl<F> ConfigFactory for F
where
    F: Fn(&str, &str) -> RegistryConfig + Send + Sync,
{
    fn create(&self, repository: &str, image: &str) -> RegistryConfig {
        (self)(repository, image)
    }
}

/// Registry type, repository and image chosen for a single request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistrySelection {
    pub registry_type: RegistryType,
    pub repository: String,
    pub image: String,
}

impl RegistrySelection {
    pub fn new(
        registry_type: impl Into<RegistryType>,
        repository: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            registry_type: registry_type.into(),
            repository: repository.into(),
            image: image.into(),
        }
    }
}

/// ConfigRegistry maps registry types to configuration factories
pub struct ConfigRegistry {
    factories: HashMap<RegistryType, Arc<dyn ConfigFactory>>,
}

impl ConfigRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry holding every built-in strategy
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        builtin::register_all(&mut registry);
        registry
    }

    /// Bind `factory` to `registry_type`.
    ///
    /// The first registration for a type wins. A later one is logged and
    /// returned as [`CoreError::AlreadyRegistered`]; the bound factory is
    /// kept.
    pub fn register(
        &mut self,
        registry_type: impl Into<RegistryType>,
        factory: impl ConfigFactory + 'static,
    ) -> Result<()> {
        let registry_type = registry_type.into();

        if registry_type.as_str().is_empty() {
            return Err(CoreError::InvalidConfiguration(
                "registry type must not be empty".to_string(),
            ));
        }
        if self.factories.contains_key(&registry_type) {
            warn!("Duplicate registry type: {}", registry_type);
            return Err(CoreError::AlreadyRegistered(registry_type));
        }

        debug!("Registered registry type: {}", registry_type);
        self.factories.insert(registry_type, Arc::new(factory));
        Ok(())
    }

    /// Produce the configuration for `selection`
    pub fn resolve(&self, selection: &RegistrySelection) -> Result<RegistryConfig> {
        let factory = self
            .factories
            .get(&selection.registry_type)
            .ok_or_else(|| CoreError::ConfigNotFound(selection.registry_type.clone()))?;

        debug!(
            "Resolving {} configuration for {}/{}",
            selection.registry_type, selection.repository, selection.image
        );
        Ok(factory.create(&selection.repository, &selection.image))
    }

    pub fn contains(&self, registry_type: &RegistryType) -> bool {
        self.factories.contains_key(registry_type)
    }

    /// Registered types, sorted
    pub fn registered_types(&self) -> Vec<RegistryType> {
        let mut types: Vec<RegistryType> = self.factories.keys().cloned().collect();
        types.sort();
        types
    }
}

impl Default for ConfigRegistry {
    fn default() -> Self {
        Self::new()
    }
}
