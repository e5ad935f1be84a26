//! Configuration object types exposed as resources and data sources.
//!
//! Each module declares one type: its plan/state model, the wire structs of
//! the configuration API, and a unit struct implementing
//! [`ConfigResource`](crate::resource::ConfigResource).

pub mod conjur_authentication_method;
pub mod consent_definition;
pub mod consent_definition_localization;
pub mod consent_service;
pub mod key_pair;
pub mod trusted_certificate;

pub use conjur_authentication_method::{ConjurAuthenticationMethod, ConjurAuthenticationMethodModel};
pub use consent_definition::{ConsentDefinition, ConsentDefinitionModel};
pub use consent_definition_localization::{
    ConsentDefinitionLocalization, ConsentDefinitionLocalizationModel,
};
pub use consent_service::{ConsentService, ConsentServiceModel};
pub use key_pair::{KeyPair, KeyPairModel};
pub use trusted_certificate::{TrustedCertificate, TrustedCertificateModel};

use crate::resource::ResourceMode;
use crate::schema::{Attribute, PlanModifier};
use crate::values::{TfString, TfStringSet, is_non_empty_string};

/// Prefix of the configuration object schema URNs.
pub const CONFIG_SCHEMA_PREFIX: &str = "urn:pingidentity:schemas:configuration:2.0:";

pub(crate) fn schema_urn(object_type: &str) -> String {
    format!("{}{}", CONFIG_SCHEMA_PREFIX, object_type)
}

pub(crate) fn id_attribute() -> Attribute {
    Attribute::string("id")
        .computed()
        .plan_modifier(PlanModifier::UseStateForUnknown)
        .description("The ID of this resource.")
}

/// Name attribute identifying an object within its collection.
pub(crate) fn name_attribute(name: &'static str, description: &'static str) -> Attribute {
    Attribute::string(name)
        .required()
        .plan_modifier(PlanModifier::RequiresReplace)
        .description(description)
}

/// Presence of a configurable attribute in the given mode.
///
/// Default resources adopt an object that already holds values, so every
/// attribute there is optional and keeps the server's value when unset.
pub(crate) fn configurable(attribute: Attribute, mode: ResourceMode, required: bool) -> Attribute {
    match (mode, required) {
        (ResourceMode::Default, _) => attribute.optional_computed(),
        (ResourceMode::Managed, true) => attribute.required(),
        (ResourceMode::Managed, false) => attribute.optional(),
    }
}

/// Planned string for a request body; null, unknown and `""` are omitted.
pub(crate) fn request_string(value: &TfString) -> Option<String> {
    is_non_empty_string(value).then(|| value.value_str().to_string())
}

/// Planned set for a request body; empty sets are omitted.
pub(crate) fn request_set(value: &TfStringSet) -> Option<Vec<String>> {
    let elements = value.elements();
    (!elements.is_empty()).then(|| elements.into_iter().collect())
}
