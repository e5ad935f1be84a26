//! Trusted Certificate.

use crate::client::ObjectPath;
use crate::operations::{Operation, add_string_operation_if_necessary};
use crate::resource::mapper::string_or_null;
use crate::resource::{ConfigResource, ResourceMode};
use crate::resources::{configurable, id_attribute, name_attribute, schema_urn};
use crate::schema::{Attribute, Schema};
use crate::values::{TfString, TfStringSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrustedCertificateModel {
    pub id: TfString,
    pub name: TfString,
    pub certificate: TfString,
    pub last_updated: TfString,
    pub notifications: TfStringSet,
    pub required_actions: TfStringSet,
}

crate::impl_model!(TrustedCertificateModel {
    "id" => id: String,
    "name" => name: String,
    "certificate" => certificate: String,
    "last_updated" => last_updated: String,
    "notifications" => notifications: StringSet,
    "required_actions" => required_actions: StringSet,
});

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTrustedCertificateRequest {
    pub certificate_name: String,
    pub schemas: Vec<String>,
    pub certificate: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrustedCertificateResponse {
    pub id: String,
    #[serde(default)]
    pub certificate: Option<String>,
}

pub struct TrustedCertificate;

impl ConfigResource for TrustedCertificate {
    type Model = TrustedCertificateModel;
    type Response = TrustedCertificateResponse;

    const TYPE_NAME: &'static str = "trusted_certificate";
    const DISPLAY_NAME: &'static str = "Trusted Certificate";
    const COLLECTION: &'static str = "trusted-certificates";
    const IMPORT_ID_ATTRIBUTES: &'static [&'static str] = &["name"];

    fn schema(mode: ResourceMode) -> Schema {
        Schema::new("Manages a Trusted Certificate.")
            .attribute(id_attribute())
            .attribute(name_attribute("name", "Name of this config object."))
            .attribute(configurable(
                Attribute::string("certificate")
                    .wire("certificate")
                    .description("The PEM-encoded X.509v3 certificate."),
                mode,
                true,
            ))
            .with_bookkeeping()
    }

    fn object_path(model: &Self::Model) -> ObjectPath {
        ObjectPath::new(Self::COLLECTION, model.name.value_str())
    }

    fn add_request(plan: &Self::Model) -> Result<Value, serde_json::Error> {
        serde_json::to_value(AddTrustedCertificateRequest {
            certificate_name: plan.name.value_str().to_string(),
            schemas: vec![schema_urn("trusted-certificate")],
            certificate: plan.certificate.value_str().to_string(),
        })
    }

    fn read_response(
        response: &Self::Response,
        state: &mut Self::Model,
        expected: Option<&Self::Model>,
    ) {
        state.id = TfString::known(response.id.as_str());
        state.name = TfString::known(response.id.as_str());
        state.certificate = string_or_null(
            response.certificate.as_deref(),
            expected.map(|e| &e.certificate),
        );
    }

    fn create_operations(plan: &Self::Model, state: &Self::Model) -> Vec<Operation> {
        let mut ops = Vec::new();
        add_string_operation_if_necessary(
            &mut ops,
            &plan.certificate,
            &state.certificate,
            "certificate",
        );
        ops
    }
}
