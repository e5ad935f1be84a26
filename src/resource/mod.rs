//! Resource and data source adapters.
//!
//! Every configuration object type implements [`ConfigResource`]: its schema,
//! where its objects live, how a plan becomes an add request, how a response
//! becomes state, and how a plan/state pair becomes PATCH operations. The
//! generic [`ResourceAdapter`] and [`DataSourceAdapter`] sequence those steps
//! against a [`ConfigApi`](crate::client::ConfigApi) backend and report
//! failures as diagnostics.
//!
//! # Resource modes
//!
//! A type can be exposed in two ways:
//!
//! * [`ResourceMode::Managed`] - Terraform creates and deletes the object.
//! * [`ResourceMode::Default`] - the object is a server built-in; Terraform
//!   adopts it on create, patches it on update and merely forgets it on delete.

pub mod adapter;
pub mod data_source;
pub mod instance;
pub mod mapper;

pub use adapter::{PlannedChange, ReadOutcome, ResourceAdapter};
pub use data_source::DataSourceAdapter;
pub use instance::{Lifecycle, ResourceInstance};

use crate::client::ObjectPath;
use crate::config::ProductVersion;
use crate::operations::Operation;
use crate::schema::{Model, Schema};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Prefix shared by every resource and data source type name.
pub const TYPE_NAME_PREFIX: &str = "pingdirectory";

/// How a resource type relates to the server object's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceMode {
    /// Created and deleted by Terraform
    Managed,
    /// Server built-in that is adopted and edited, never created or deleted
    Default,
}

/// One configuration object type.
///
/// Implementations are unit structs; all behavior lives in associated
/// functions so adapters can be generic over the type.
pub trait ConfigResource: Send + Sync + 'static {
    /// Plan/state model
    type Model: Model;
    /// Decoded configuration API response
    type Response: DeserializeOwned + Send;

    /// Type name suffix, e.g. `key_pair`
    const TYPE_NAME: &'static str;
    /// Human readable name used in diagnostics, e.g. `Key Pair`
    const DISPLAY_NAME: &'static str;
    /// Innermost configuration API collection, e.g. `key-pairs`
    const COLLECTION: &'static str;
    /// Attributes filled from the `/`-separated segments of an import ID.
    /// Empty for singletons, which accept any ID.
    const IMPORT_ID_ATTRIBUTES: &'static [&'static str];
    /// Whether a `Managed` resource exists for this type
    const SUPPORTS_MANAGED: bool = true;
    /// Oldest product version that has this object type
    const MINIMUM_VERSION: Option<ProductVersion> = None;

    fn schema(mode: ResourceMode) -> Schema;

    /// Location of the object described by a plan or state.
    fn object_path(model: &Self::Model) -> ObjectPath;

    /// Build the add request body from a plan.
    ///
    /// Types without a `Managed` resource never build one.
    fn add_request(plan: &Self::Model) -> Result<Value, serde_json::Error> {
        let _ = plan;
        Err(serde::ser::Error::custom(format!(
            "{} objects cannot be created",
            Self::DISPLAY_NAME
        )))
    }

    /// Copy a response into `state`.
    ///
    /// `expected` is the plan (or prior state) the response is reconciled
    /// against; it decides between null and `""` for absent strings.
    fn read_response(
        response: &Self::Response,
        state: &mut Self::Model,
        expected: Option<&Self::Model>,
    );

    /// Diff plan against state into PATCH operations, in declaration order.
    fn create_operations(plan: &Self::Model, state: &Self::Model) -> Vec<Operation>;

    /// Full Terraform type name for a mode.
    fn type_name(mode: ResourceMode) -> String {
        match mode {
            ResourceMode::Managed => format!("{}_{}", TYPE_NAME_PREFIX, Self::TYPE_NAME),
            ResourceMode::Default => format!("{}_default_{}", TYPE_NAME_PREFIX, Self::TYPE_NAME),
        }
    }

    /// Import ID format shown in diagnostics, e.g. `consent_definition_name/locale`.
    fn import_id_format() -> String {
        if Self::IMPORT_ID_ATTRIBUTES.is_empty() {
            "[any string]".to_string()
        } else {
            Self::IMPORT_ID_ATTRIBUTES.join("/")
        }
    }
}
