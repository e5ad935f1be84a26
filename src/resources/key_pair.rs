//! Key Pair: a private key and its certificate chain.
//!
//! The server generates a self-signed certificate when no private key and
//! chain are supplied. Changing the algorithm or subject requires a new key,
//! so both force replacement.

use crate::client::ObjectPath;
use crate::operations::{Operation, add_string_operation_if_necessary};
use crate::resource::mapper::string_or_null;
use crate::resource::{ConfigResource, ResourceMode};
use crate::resources::{configurable, id_attribute, name_attribute, request_string, schema_urn};
use crate::schema::{Attribute, DefaultValue, PlanModifier, Schema, Validator};
use crate::values::{TfString, TfStringSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const KEY_ALGORITHMS: &[&str] = &[
    "RSA_2048",
    "RSA_3072",
    "RSA_4096",
    "EC_256",
    "EC_384",
    "EC_521",
];

pub const DEFAULT_KEY_ALGORITHM: &str = "RSA_2048";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyPairModel {
    pub id: TfString,
    pub name: TfString,
    pub key_algorithm: TfString,
    pub self_signed_certificate_validity: TfString,
    pub subject_dn: TfString,
    pub certificate_chain: TfString,
    pub private_key: TfString,
    pub last_updated: TfString,
    pub notifications: TfStringSet,
    pub required_actions: TfStringSet,
}

crate::impl_model!(KeyPairModel {
    "id" => id: String,
    "name" => name: String,
    "key_algorithm" => key_algorithm: String,
    "self_signed_certificate_validity" => self_signed_certificate_validity: String,
    "subject_dn" => subject_dn: String,
    "certificate_chain" => certificate_chain: String,
    "private_key" => private_key: String,
    "last_updated" => last_updated: String,
    "notifications" => notifications: StringSet,
    "required_actions" => required_actions: StringSet,
});

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddKeyPairRequest {
    pub pair_name: String,
    pub schemas: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_algorithm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_signed_certificate_validity: Option<String>,
    #[serde(rename = "subjectDN", skip_serializing_if = "Option::is_none")]
    pub subject_dn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_chain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPairResponse {
    pub id: String,
    #[serde(default)]
    pub key_algorithm: Option<String>,
    #[serde(default)]
    pub self_signed_certificate_validity: Option<String>,
    #[serde(default, rename = "subjectDN")]
    pub subject_dn: Option<String>,
    #[serde(default)]
    pub certificate_chain: Option<String>,
}

pub struct KeyPair;

impl ConfigResource for KeyPair {
    type Model = KeyPairModel;
    type Response = KeyPairResponse;

    const TYPE_NAME: &'static str = "key_pair";
    const DISPLAY_NAME: &'static str = "Key Pair";
    const COLLECTION: &'static str = "key-pairs";
    const IMPORT_ID_ATTRIBUTES: &'static [&'static str] = &["name"];

    fn schema(mode: ResourceMode) -> Schema {
        let mut key_algorithm = configurable(
            Attribute::string("key_algorithm")
                .wire("keyAlgorithm")
                .validator(Validator::OneOf(KEY_ALGORITHMS))
                .plan_modifier(PlanModifier::RequiresReplace)
                .description("The algorithm name and the length in bits of the key, e.g. RSA_2048."),
            mode,
            false,
        );
        if mode == ResourceMode::Managed {
            key_algorithm =
                key_algorithm.default_value(DefaultValue::String(DEFAULT_KEY_ALGORITHM));
        }

        Schema::new("Manages a Key Pair.")
            .attribute(id_attribute())
            .attribute(name_attribute("name", "Name of this config object."))
            .attribute(key_algorithm)
            .attribute(configurable(
                Attribute::string("self_signed_certificate_validity")
                    .wire("selfSignedCertificateValidity")
                    .description("The validity period for a self-signed certificate, e.g. \"365 d\"."),
                mode,
                false,
            ))
            .attribute(configurable(
                Attribute::string("subject_dn")
                    .wire("subjectDN")
                    .plan_modifier(PlanModifier::RequiresReplace)
                    .description("The DN that should be used as the subject for the self-signed certificate and certificate signing request."),
                mode,
                false,
            ))
            .attribute(
                Attribute::string("certificate_chain")
                    .wire("certificateChain")
                    .optional_computed()
                    .plan_modifier(PlanModifier::UseStateForUnknown)
                    .description("The PEM-encoded X.509 certificate chain."),
            )
            .attribute(configurable(
                Attribute::string("private_key")
                    .wire("privateKey")
                    .sensitive()
                    .not_returned_by_api()
                    .description("The base64-encoded private key that is encrypted using the preferred encryption settings definition."),
                mode,
                false,
            ))
            .with_bookkeeping()
    }

    fn object_path(model: &Self::Model) -> ObjectPath {
        ObjectPath::new(Self::COLLECTION, model.name.value_str())
    }

    fn add_request(plan: &Self::Model) -> Result<Value, serde_json::Error> {
        serde_json::to_value(AddKeyPairRequest {
            pair_name: plan.name.value_str().to_string(),
            schemas: vec![schema_urn("key-pair")],
            key_algorithm: request_string(&plan.key_algorithm),
            self_signed_certificate_validity: request_string(
                &plan.self_signed_certificate_validity,
            ),
            subject_dn: request_string(&plan.subject_dn),
            certificate_chain: request_string(&plan.certificate_chain),
            private_key: request_string(&plan.private_key),
        })
    }

    fn read_response(
        response: &Self::Response,
        state: &mut Self::Model,
        expected: Option<&Self::Model>,
    ) {
        state.id = TfString::known(response.id.as_str());
        state.name = TfString::known(response.id.as_str());
        state.key_algorithm = string_or_null(
            response.key_algorithm.as_deref(),
            expected.map(|e| &e.key_algorithm),
        );
        state.self_signed_certificate_validity = string_or_null(
            response.self_signed_certificate_validity.as_deref(),
            expected.map(|e| &e.self_signed_certificate_validity),
        );
        state.subject_dn = string_or_null(
            response.subject_dn.as_deref(),
            expected.map(|e| &e.subject_dn),
        );
        state.certificate_chain = string_or_null(
            response.certificate_chain.as_deref(),
            expected.map(|e| &e.certificate_chain),
        );
    }

    fn create_operations(plan: &Self::Model, state: &Self::Model) -> Vec<Operation> {
        let mut ops = Vec::new();
        add_string_operation_if_necessary(
            &mut ops,
            &plan.key_algorithm,
            &state.key_algorithm,
            "keyAlgorithm",
        );
        add_string_operation_if_necessary(
            &mut ops,
            &plan.self_signed_certificate_validity,
            &state.self_signed_certificate_validity,
            "selfSignedCertificateValidity",
        );
        add_string_operation_if_necessary(
            &mut ops,
            &plan.subject_dn,
            &state.subject_dn,
            "subjectDN",
        );
        add_string_operation_if_necessary(
            &mut ops,
            &plan.certificate_chain,
            &state.certificate_chain,
            "certificateChain",
        );
        add_string_operation_if_necessary(
            &mut ops,
            &plan.private_key,
            &state.private_key,
            "privateKey",
        );
        ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::schema::Model;

    fn config() -> KeyPairModel {
        KeyPairModel {
            name: TfString::known("server-cert"),
            subject_dn: TfString::known("cn=server"),
            ..Default::default()
        }
    }

    #[test]
    fn test_plan_applies_default_algorithm() {
        let schema = KeyPair::schema(ResourceMode::Managed);
        let mut plan = config();
        schema.modify_plan(&mut plan, None);
        assert_eq!(plan.key_algorithm, TfString::known(DEFAULT_KEY_ALGORITHM));
        assert!(plan.certificate_chain.is_unknown());
        assert!(plan.id.is_unknown());
    }

    #[test]
    fn test_default_resource_has_no_algorithm_default() {
        let schema = KeyPair::schema(ResourceMode::Default);
        let mut plan = config();
        schema.modify_plan(&mut plan, None);
        assert!(plan.key_algorithm.is_unknown());
    }

    #[test]
    fn test_unsupported_algorithm_rejected() {
        let schema = KeyPair::schema(ResourceMode::Managed);
        let mut diags = Diagnostics::new();
        let mut plan = config();
        plan.set_attribute(
            "key_algorithm",
            crate::schema::AttrValue::String(TfString::known("DSA_1024")),
        );
        schema.validate(&plan, &mut diags);
        assert!(diags.has_error());
        assert_eq!(
            diags.errors().next().map(|d| d.summary.as_str()),
            Some("Invalid Attribute Value Match")
        );
    }

    #[test]
    fn test_algorithm_change_requires_replace() {
        let schema = KeyPair::schema(ResourceMode::Managed);
        let state = KeyPairModel {
            key_algorithm: TfString::known("RSA_2048"),
            certificate_chain: TfString::known("-----BEGIN CERTIFICATE-----"),
            ..config()
        };
        let mut plan = KeyPairModel {
            key_algorithm: TfString::known("EC_256"),
            ..config()
        };
        let modification = schema.modify_plan(&mut plan, Some(&state));
        assert_eq!(modification.requires_replace, vec!["key_algorithm"]);
        assert_eq!(plan.certificate_chain, state.certificate_chain);
    }

    #[test]
    fn test_add_request_wire_names() {
        let plan = KeyPairModel {
            key_algorithm: TfString::known("EC_256"),
            self_signed_certificate_validity: TfString::known("365 d"),
            ..config()
        };
        let body = KeyPair::add_request(&plan).unwrap();
        assert_eq!(body["pairName"], "server-cert");
        assert_eq!(body["keyAlgorithm"], "EC_256");
        assert_eq!(body["selfSignedCertificateValidity"], "365 d");
        assert_eq!(body["subjectDN"], "cn=server");
        assert!(body.get("privateKey").is_none());
    }
}
