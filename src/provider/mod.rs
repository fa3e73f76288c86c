//! Pluggable resource generators
//!
//! A [`Provider`] turns a resource type plus a parameter map into a fully
//! populated [`Element`]. Documents reference resources as
//! `provider-resourceType` (`core-shape`, `aws-vpc`); providers are looked up
//! by name in a [`ProviderRegistry`].

mod builtin;
mod registry;

use serde::Serialize;
use thiserror::Error;

use crate::model::{Element, Params, Value};

pub use builtin::CoreProvider;
pub use registry::ProviderRegistry;

/// Errors raised by providers and the registry
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// A parameter failed a declared constraint
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("provider {provider}: unsupported resource type: {resource_type}")]
    UnsupportedResource {
        provider: String,
        resource_type: String,
    },

    #[error("provider {provider}: schema not found for resource type: {resource_type}")]
    SchemaNotFound {
        provider: String,
        resource_type: String,
    },

    /// No provider could be resolved for a resource reference
    #[error("provider {provider} not found for resource '{reference}'")]
    NotFound { provider: String, reference: String },

    #[error("provider {provider} is not registered")]
    NotRegistered { provider: String },

    #[error("invalid resource reference '{reference}', expected 'provider-resource'")]
    InvalidReference { reference: String },

    #[error("provider name cannot be empty")]
    EmptyName,

    #[error("provider {provider} is already registered")]
    AlreadyRegistered { provider: String },

    #[error("provider {provider}: failed to generate {resource_type}: {message}")]
    Generation {
        provider: String,
        resource_type: String,
        message: String,
    },
}

impl ProviderError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Metadata describing one resource type a provider can generate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceDefinition {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: String,
    pub description: String,
    /// compute, network, basic, container, ...
    pub category: String,
    /// JSON-schema-like description of the accepted parameters
    pub schema: Value,
    pub examples: Vec<ResourceExample>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceExample {
    pub name: String,
    pub description: String,
    pub config: Params,
}

/// A named source of generated elements.
///
/// Implementations must be usable from several threads at once; the
/// registry hands out shared references.
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    /// Semantic version of the provider
    fn version(&self) -> &str;

    fn resources(&self) -> Vec<ResourceDefinition>;

    /// Check `params` against the resource's constraints
    fn validate(&self, resource_type: &str, params: &Params) -> Result<(), ProviderError>;

    /// Produce the element for a resource. Implementations validate first.
    fn generate_template(
        &self,
        resource_type: &str,
        params: &Params,
    ) -> Result<Element, ProviderError>;

    /// Parameter schema of a resource type
    fn schema(&self, resource_type: &str) -> Result<Value, ProviderError> {
        self.resources()
            .into_iter()
            .find(|r| r.resource_type == resource_type)
            .map(|r| r.schema)
            .ok_or_else(|| ProviderError::SchemaNotFound {
                provider: self.name().to_string(),
                resource_type: resource_type.to_string(),
            })
    }
}

/// Resource type tokens recognised when splitting a reference.
///
/// A provider name may itself contain hyphens (`custom-core-shape`); the
/// right-most token found here is taken as the resource type. This list is
/// fixed and can misattribute a provider whose name ends in one of these
/// words.
pub const KNOWN_RESOURCE_TYPES: &[&str] = &[
    "text",
    "shape",
    "group",
    "swimlane",
    "connector",
    "vpc",
    "organization",
];

/// Split `provider-resourceType` into its two halves.
///
/// Scans from the right for a known resource type; without one, the last
/// token is the type and everything before it the provider. Tokens after a
/// matched type are dropped.
pub fn split_resource_reference(reference: &str) -> Result<(String, String), ProviderError> {
    let invalid = || ProviderError::InvalidReference {
        reference: reference.to_string(),
    };

    let parts: Vec<&str> = reference.split('-').collect();
    if parts.len() < 2 {
        return Err(invalid());
    }

    let split_at = (1..parts.len())
        .rev()
        .find(|&i| KNOWN_RESOURCE_TYPES.contains(&parts[i]))
        .unwrap_or(parts.len() - 1);

    let provider = parts[..split_at].join("-");
    let resource_type = parts[split_at].to_string();
    if provider.is_empty() || resource_type.is_empty() {
        return Err(invalid());
    }

    Ok((provider, resource_type))
}
