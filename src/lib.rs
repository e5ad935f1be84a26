//! PingDirectory configuration resources for Terraform.
//!
//! Maps PingDirectory configuration API objects onto Terraform-style
//! resources and data sources: schemas with defaults and plan modifiers,
//! plan/state diffs turned into PATCH operations, response mapping with the
//! server's null/empty string equivalence, and CRUD orchestration that
//! reports failures as diagnostics.
//!
//! # Core Components
//!
//! - [`Provider`] - Registry of resource and data source types
//! - [`ResourceAdapter`] - Create/read/update/delete/import for one type
//! - [`ConfigApi`] - Configuration API backend, over HTTPS or in memory
//! - [`operations`] - Plan/state diff into PATCH operations
//!
//! # Quick Start
//!
//! ```rust
//! use pingdirectory_provider::{ConfiguredProvider, Diagnostics, Provider};
//! use pingdirectory_provider::resources::{TrustedCertificate, TrustedCertificateModel};
//! use pingdirectory_provider::values::TfString;
//!
//! # async fn example() {
//! let provider = ConfiguredProvider::with_api(Provider::in_memory_api());
//! let adapter = provider.resource::<TrustedCertificate>();
//!
//! let config = TrustedCertificateModel {
//!     name: TfString::known("ca"),
//!     certificate: TfString::known("-----BEGIN CERTIFICATE-----"),
//!     ..Default::default()
//! };
//! let mut diags = Diagnostics::new();
//! let planned = adapter.plan(config, None, &mut diags).unwrap();
//! let state = adapter.create(&planned.planned, &mut diags).await.unwrap();
//! assert_eq!(state.id, TfString::known("ca"));
//! # }
//! ```

pub mod client;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod operations;
pub mod provider;
pub mod resource;
pub mod resources;
pub mod schema;
pub mod values;

// Re-export commonly used types for convenience
pub use client::{ConfigApi, HttpConfigClient, InMemoryConfigApi, ObjectPath};
pub use config::{ProductVersion, ProviderConfig};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{ApiError, ApiResult, ConfigError, ConfigResult, ProviderError, ProviderResult};
pub use operations::{Operation, OperationType, UpdateRequest};
pub use provider::{ConfiguredProvider, Provider};
pub use resource::{
    ConfigResource, DataSourceAdapter, Lifecycle, ReadOutcome, ResourceAdapter, ResourceInstance,
    ResourceMode,
};
pub use schema::{Attribute, Model, Schema};
pub use values::{TfBool, TfInt64, TfString, TfStringSet, TfValue};
