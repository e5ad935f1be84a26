//! Provider registry and configuration.
//!
//! [`Provider`] knows every resource and data source type the crate exposes
//! and their schemas. [`Provider::configure`] turns a [`ProviderConfig`] into
//! a [`ConfiguredProvider`], which hands out adapters sharing one API client.
//!
//! # Example Usage
//!
//! ```rust
//! use pingdirectory_provider::Provider;
//!
//! let provider = Provider::new();
//! assert!(provider
//!     .resource_type_names()
//!     .contains(&"pingdirectory_default_consent_service"));
//! assert!(provider.schema("pingdirectory_key_pair").is_ok());
//! ```

use crate::client::{ConfigApi, HttpConfigClient, InMemoryConfigApi};
use crate::config::{ProductVersion, ProviderConfig};
use crate::error::{ProviderError, ProviderResult};
use crate::resource::{ConfigResource, DataSourceAdapter, ResourceAdapter, ResourceMode};
use crate::resources::{
    ConjurAuthenticationMethod, ConsentDefinition, ConsentDefinitionLocalization, ConsentService,
    KeyPair, TrustedCertificate,
};
use crate::schema::Schema;
use log::info;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Whether a registered type is a resource or a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Resource(ResourceMode),
    DataSource,
}

#[derive(Debug, Clone)]
pub struct RegisteredType {
    pub type_name: String,
    pub kind: TypeKind,
    pub schema: Schema,
}

/// Registry of every type the provider exposes.
#[derive(Debug, Clone)]
pub struct Provider {
    types: BTreeMap<String, RegisteredType>,
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider {
    pub fn new() -> Self {
        let mut provider = Self {
            types: BTreeMap::new(),
        };
        provider.register::<ConjurAuthenticationMethod>();
        provider.register::<ConsentDefinition>();
        provider.register::<ConsentDefinitionLocalization>();
        provider.register::<ConsentService>();
        provider.register::<KeyPair>();
        provider.register::<TrustedCertificate>();
        provider
    }

    fn register<R: ConfigResource>(&mut self) {
        let mut modes = vec![ResourceMode::Default];
        if R::SUPPORTS_MANAGED {
            modes.push(ResourceMode::Managed);
        }
        for mode in modes {
            self.insert(R::type_name(mode), TypeKind::Resource(mode), R::schema(mode));
        }
        self.insert(
            R::type_name(ResourceMode::Managed),
            TypeKind::DataSource,
            R::schema(ResourceMode::Managed).for_data_source(R::IMPORT_ID_ATTRIBUTES),
        );
    }

    fn insert(&mut self, type_name: String, kind: TypeKind, schema: Schema) {
        // Resources and data sources share names, so key by both
        let key = Self::key(&type_name, kind);
        self.types.insert(
            key,
            RegisteredType {
                type_name,
                kind,
                schema,
            },
        );
    }

    fn key(type_name: &str, kind: TypeKind) -> String {
        match kind {
            TypeKind::Resource(_) => format!("resource:{}", type_name),
            TypeKind::DataSource => format!("data:{}", type_name),
        }
    }

    pub fn resource_type_names(&self) -> Vec<&str> {
        self.types
            .values()
            .filter(|t| matches!(t.kind, TypeKind::Resource(_)))
            .map(|t| t.type_name.as_str())
            .collect()
    }

    pub fn data_source_type_names(&self) -> Vec<&str> {
        self.types
            .values()
            .filter(|t| t.kind == TypeKind::DataSource)
            .map(|t| t.type_name.as_str())
            .collect()
    }

    /// Schema of a resource type.
    pub fn schema(&self, type_name: &str) -> ProviderResult<&Schema> {
        self.types
            .get(&format!("resource:{}", type_name))
            .map(|t| &t.schema)
            .ok_or_else(|| ProviderError::UnknownTypeName(type_name.to_string()))
    }

    /// Schema of a data source type.
    pub fn data_source_schema(&self, type_name: &str) -> ProviderResult<&Schema> {
        self.types
            .get(&Self::key(type_name, TypeKind::DataSource))
            .map(|t| &t.schema)
            .ok_or_else(|| ProviderError::UnknownTypeName(type_name.to_string()))
    }

    /// Connect to the server described by `config`.
    pub fn configure(
        &self,
        config: ProviderConfig,
    ) -> ProviderResult<ConfiguredProvider<HttpConfigClient>> {
        info!(
            "Configuring PingDirectory provider for {} (product version {})",
            config.https_host, config.product_version
        );
        let client = HttpConfigClient::new(&config)?;
        Ok(ConfiguredProvider::with_api(client).with_product_version(config.product_version))
    }

    /// Connect using the `PINGDIRECTORY_PROVIDER_*` environment variables.
    pub fn configure_from_env(&self) -> ProviderResult<ConfiguredProvider<HttpConfigClient>> {
        self.configure_with_lookup(|key| std::env::var(key).ok())
    }

    fn configure_with_lookup<F>(
        &self,
        lookup: F,
    ) -> ProviderResult<ConfiguredProvider<HttpConfigClient>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = ProviderConfig::builder().build_with_lookup(lookup)?;
        self.configure(config)
    }

    /// In-memory configuration server aware of every registered type.
    pub fn in_memory_api() -> InMemoryConfigApi {
        InMemoryConfigApi::new()
            .with_collection(
                ConjurAuthenticationMethod::COLLECTION,
                &ConjurAuthenticationMethod::schema(ResourceMode::Managed),
            )
            .with_collection(
                ConsentDefinition::COLLECTION,
                &ConsentDefinition::schema(ResourceMode::Managed),
            )
            .with_collection(
                ConsentDefinitionLocalization::COLLECTION,
                &ConsentDefinitionLocalization::schema(ResourceMode::Managed),
            )
            .with_collection(
                ConsentService::COLLECTION,
                &ConsentService::schema(ResourceMode::Default),
            )
            .with_collection(KeyPair::COLLECTION, &KeyPair::schema(ResourceMode::Managed))
            .with_collection(
                TrustedCertificate::COLLECTION,
                &TrustedCertificate::schema(ResourceMode::Managed),
            )
    }
}

/// Adapters bound to one configuration API backend.
pub struct ConfiguredProvider<A: ConfigApi> {
    api: Arc<A>,
    product_version: Option<ProductVersion>,
}

impl<A: ConfigApi> Clone for ConfiguredProvider<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            product_version: self.product_version,
        }
    }
}

impl<A: ConfigApi> ConfiguredProvider<A> {
    pub fn with_api(api: A) -> Self {
        Self {
            api: Arc::new(api),
            product_version: None,
        }
    }

    pub fn with_product_version(mut self, version: ProductVersion) -> Self {
        self.product_version = Some(version);
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Adapter for the `pingdirectory_<kind>` resource.
    pub fn resource<R: ConfigResource>(&self) -> ResourceAdapter<R, A> {
        self.adapter(ResourceMode::Managed)
    }

    /// Adapter for the `pingdirectory_default_<kind>` resource.
    pub fn default_resource<R: ConfigResource>(&self) -> ResourceAdapter<R, A> {
        self.adapter(ResourceMode::Default)
    }

    pub fn data_source<R: ConfigResource>(&self) -> DataSourceAdapter<R, A> {
        DataSourceAdapter::new(Arc::clone(&self.api))
    }

    fn adapter<R: ConfigResource>(&self, mode: ResourceMode) -> ResourceAdapter<R, A> {
        let adapter = ResourceAdapter::new(Arc::clone(&self.api), mode);
        match self.product_version {
            Some(version) => adapter.with_product_version(version),
            None => adapter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn test_registered_type_names() {
        let provider = Provider::new();
        let resources = provider.resource_type_names();
        assert_eq!(resources.len(), 11);
        assert!(resources.contains(&"pingdirectory_key_pair"));
        assert!(resources.contains(&"pingdirectory_default_key_pair"));
        assert!(!resources.contains(&"pingdirectory_consent_service"));

        let data_sources = provider.data_source_type_names();
        assert_eq!(data_sources.len(), 6);
        assert!(data_sources.contains(&"pingdirectory_consent_service"));
    }

    #[test]
    fn test_unknown_type_name() {
        let provider = Provider::new();
        let error = provider.schema("pingdirectory_widget").unwrap_err();
        assert!(matches!(
            error,
            ProviderError::UnknownTypeName(name) if name == "pingdirectory_widget"
        ));
        assert!(provider.data_source_schema("pingdirectory_trusted_certificate").is_ok());
    }

    #[test]
    fn test_configure_builds_http_client() {
        let config = ProviderConfig::builder()
            .https_host("https://localhost:1443")
            .username("cn=administrator")
            .password("2FederateM0re")
            .product_version("9.3.0.0")
            .build_with_lookup(|_| None)
            .unwrap();
        let configured = Provider::new().configure(config).unwrap();
        assert_eq!(configured.api().base_url(), "https://localhost:1443/config/v1");

        let adapter = configured.default_resource::<KeyPair>();
        assert_eq!(adapter.type_name(), "pingdirectory_default_key_pair");
    }

    #[test]
    fn test_configure_reports_missing_settings() {
        let error = Provider::new()
            .configure_with_lookup(|key| {
                (key == "PINGDIRECTORY_PROVIDER_HTTPS_HOST")
                    .then(|| "https://localhost:1443".to_string())
            })
            .err()
            .unwrap();
        assert!(matches!(
            error,
            ProviderError::Config(ConfigError::MissingSetting { setting: "username", .. })
        ));
    }
}
