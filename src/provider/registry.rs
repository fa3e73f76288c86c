//! Name-keyed store of providers

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info};
use parking_lot::RwLock;

use super::{CoreProvider, Provider, ProviderError, ResourceDefinition};
use crate::model::{Element, Params, ProviderKind};

struct Registered {
    provider: Arc<dyn Provider>,
    origin: ProviderKind,
}

/// Thread-safe provider registry.
///
/// Registrations take the write lock; lookups, validation and generation
/// only take the read lock, and the lock is released before a provider is
/// called.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: RwLock<HashMap<String, Registered>>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.list())
            .finish()
    }
}

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with every provider compiled into the crate
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        // A fresh registry cannot already hold `core`
        let _ = registry.register_builtin(Arc::new(CoreProvider::new()));
        registry
    }

    /// Register a provider supplied by a library consumer
    pub fn register(&self, provider: Arc<dyn Provider>) -> Result<(), ProviderError> {
        self.insert(provider, ProviderKind::Registry)
    }

    /// Register a provider that ships with the crate
    pub fn register_builtin(&self, provider: Arc<dyn Provider>) -> Result<(), ProviderError> {
        self.insert(provider, ProviderKind::Builtin)
    }

    fn insert(&self, provider: Arc<dyn Provider>, origin: ProviderKind) -> Result<(), ProviderError> {
        let name = provider.name().to_string();
        if name.is_empty() {
            return Err(ProviderError::EmptyName);
        }

        let mut providers = self.providers.write();
        if providers.contains_key(&name) {
            return Err(ProviderError::AlreadyRegistered { provider: name });
        }

        info!(provider = name.as_str(), version = provider.version(), origin:? = origin; "Registered provider");
        providers.insert(name, Registered { provider, origin });
        Ok(())
    }

    /// Look up a provider by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.read().get(name).map(|r| Arc::clone(&r.provider))
    }

    /// Look up a provider registered with the given origin
    pub fn get_with_origin(&self, name: &str, origin: ProviderKind) -> Option<Arc<dyn Provider>> {
        self.providers
            .read()
            .get(name)
            .filter(|r| r.origin == origin)
            .map(|r| Arc::clone(&r.provider))
    }

    fn require(&self, name: &str) -> Result<Arc<dyn Provider>, ProviderError> {
        self.get(name).ok_or_else(|| ProviderError::NotRegistered {
            provider: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.read().contains_key(name)
    }

    /// Registered provider names, sorted
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn unregister(&self, name: &str) -> Result<(), ProviderError> {
        match self.providers.write().remove(name) {
            Some(_) => {
                debug!(provider = name; "Unregistered provider");
                Ok(())
            }
            None => Err(ProviderError::NotRegistered {
                provider: name.to_string(),
            }),
        }
    }

    /// Every resource of every provider, keyed `provider-resourceType`
    pub fn resource_types(&self) -> HashMap<String, ResourceDefinition> {
        let providers: Vec<Arc<dyn Provider>> = self
            .providers
            .read()
            .values()
            .map(|r| Arc::clone(&r.provider))
            .collect();

        providers
            .iter()
            .flat_map(|provider| {
                provider.resources().into_iter().map(move |resource| {
                    (
                        format!("{}-{}", provider.name(), resource.resource_type),
                        resource,
                    )
                })
            })
            .collect()
    }

    pub fn resources_of(&self, provider: &str) -> Result<Vec<ResourceDefinition>, ProviderError> {
        Ok(self.require(provider)?.resources())
    }

    pub fn validate_resource(
        &self,
        provider: &str,
        resource_type: &str,
        params: &Params,
    ) -> Result<(), ProviderError> {
        self.require(provider)?.validate(resource_type, params)
    }

    pub fn generate_template(
        &self,
        provider: &str,
        resource_type: &str,
        params: &Params,
    ) -> Result<Element, ProviderError> {
        self.require(provider)?.generate_template(resource_type, params)
    }
}
