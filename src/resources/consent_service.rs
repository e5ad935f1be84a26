//! Consent Service.
//!
//! A server-wide singleton: it always exists, has no name and can only be
//! adopted through `pingdirectory_default_consent_service`.

use crate::client::ObjectPath;
use crate::operations::{
    Operation, add_bool_operation_if_necessary, add_int64_operation_if_necessary,
    add_string_operation_if_necessary, add_string_set_operations_if_necessary,
};
use crate::resource::mapper::{bool_or_null, int64_or_null, string_or_null, string_set};
use crate::resource::{ConfigResource, ResourceMode};
use crate::resources::id_attribute;
use crate::schema::{Attribute, Schema, Validator};
use crate::values::{TfBool, TfInt64, TfString, TfStringSet};
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsentServiceModel {
    pub id: TfString,
    pub enabled: TfBool,
    pub base_dn: TfString,
    pub bind_dn: TfString,
    pub search_size_limit: TfInt64,
    pub consent_record_identity_mapper: TfStringSet,
    pub service_account_dn: TfStringSet,
    pub unprivileged_consent_scope: TfString,
    pub privileged_consent_scope: TfString,
    pub audience: TfString,
    pub last_updated: TfString,
    pub notifications: TfStringSet,
    pub required_actions: TfStringSet,
}

crate::impl_model!(ConsentServiceModel {
    "id" => id: String,
    "enabled" => enabled: Bool,
    "base_dn" => base_dn: String,
    "bind_dn" => bind_dn: String,
    "search_size_limit" => search_size_limit: Int64,
    "consent_record_identity_mapper" => consent_record_identity_mapper: StringSet,
    "service_account_dn" => service_account_dn: StringSet,
    "unprivileged_consent_scope" => unprivileged_consent_scope: String,
    "privileged_consent_scope" => privileged_consent_scope: String,
    "audience" => audience: String,
    "last_updated" => last_updated: String,
    "notifications" => notifications: StringSet,
    "required_actions" => required_actions: StringSet,
});

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentServiceResponse {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default, rename = "baseDN")]
    pub base_dn: Option<String>,
    #[serde(default, rename = "bindDN")]
    pub bind_dn: Option<String>,
    #[serde(default)]
    pub search_size_limit: Option<i64>,
    #[serde(default)]
    pub consent_record_identity_mapper: Option<Vec<String>>,
    #[serde(default, rename = "serviceAccountDN")]
    pub service_account_dn: Option<Vec<String>>,
    #[serde(default)]
    pub unprivileged_consent_scope: Option<String>,
    #[serde(default)]
    pub privileged_consent_scope: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
}

pub struct ConsentService;

impl ConfigResource for ConsentService {
    type Model = ConsentServiceModel;
    type Response = ConsentServiceResponse;

    const TYPE_NAME: &'static str = "consent_service";
    const DISPLAY_NAME: &'static str = "Consent Service";
    const COLLECTION: &'static str = "consent-service";
    const IMPORT_ID_ATTRIBUTES: &'static [&'static str] = &[];
    const SUPPORTS_MANAGED: bool = false;

    fn schema(_mode: ResourceMode) -> Schema {
        Schema::new("Manages a Consent Service.")
            .attribute(id_attribute())
            .attribute(
                Attribute::bool("enabled")
                    .wire("enabled")
                    .optional_computed()
                    .description("Indicates whether the Consent Service is enabled."),
            )
            .attribute(
                Attribute::string("base_dn")
                    .wire("baseDN")
                    .optional_computed()
                    .description("The base DN under which consent records are stored."),
            )
            .attribute(
                Attribute::string("bind_dn")
                    .wire("bindDN")
                    .optional_computed()
                    .description("The DN of an internal service account used by the Consent Service to make internal LDAP requests."),
            )
            .attribute(
                Attribute::int64("search_size_limit")
                    .wire("searchSizeLimit")
                    .optional_computed()
                    .validator(Validator::Int64Between(0, i64::from(i32::MAX)))
                    .description("The maximum number of consent resources that may be returned from a search request."),
            )
            .attribute(
                Attribute::string_set("consent_record_identity_mapper")
                    .wire("consentRecordIdentityMapper")
                    .optional_computed()
                    .description("Identity mappers that map consent record subject and actor values to DNs."),
            )
            .attribute(
                Attribute::string_set("service_account_dn")
                    .wire("serviceAccountDN")
                    .optional_computed()
                    .description("The set of account DNs that the Consent Service will consider to be privileged."),
            )
            .attribute(
                Attribute::string("unprivileged_consent_scope")
                    .wire("unprivilegedConsentScope")
                    .optional_computed()
                    .description("The name of a scope that must be present in an access token accepted by the Consent Service for unprivileged clients."),
            )
            .attribute(
                Attribute::string("privileged_consent_scope")
                    .wire("privilegedConsentScope")
                    .optional_computed()
                    .description("The name of a scope that must be present in an access token accepted by the Consent Service if the client is to be considered privileged."),
            )
            .attribute(
                Attribute::string("audience")
                    .wire("audience")
                    .optional_computed()
                    .description("A string or URI that identifies the Consent Service in the context of OAuth2 authorization."),
            )
            .with_bookkeeping()
    }

    fn object_path(_model: &Self::Model) -> ObjectPath {
        ObjectPath::singleton(Self::COLLECTION)
    }

    fn read_response(
        response: &Self::Response,
        state: &mut Self::Model,
        expected: Option<&Self::Model>,
    ) {
        state.id = TfString::known(Self::COLLECTION);
        state.enabled = bool_or_null(response.enabled);
        state.base_dn = string_or_null(response.base_dn.as_deref(), expected.map(|e| &e.base_dn));
        state.bind_dn = string_or_null(response.bind_dn.as_deref(), expected.map(|e| &e.bind_dn));
        state.search_size_limit = int64_or_null(response.search_size_limit);
        state.consent_record_identity_mapper =
            string_set(response.consent_record_identity_mapper.as_deref());
        state.service_account_dn = string_set(response.service_account_dn.as_deref());
        state.unprivileged_consent_scope = string_or_null(
            response.unprivileged_consent_scope.as_deref(),
            expected.map(|e| &e.unprivileged_consent_scope),
        );
        state.privileged_consent_scope = string_or_null(
            response.privileged_consent_scope.as_deref(),
            expected.map(|e| &e.privileged_consent_scope),
        );
        state.audience = string_or_null(
            response.audience.as_deref(),
            expected.map(|e| &e.audience),
        );
    }

    fn create_operations(plan: &Self::Model, state: &Self::Model) -> Vec<Operation> {
        let mut ops = Vec::new();
        add_bool_operation_if_necessary(&mut ops, &plan.enabled, &state.enabled, "enabled");
        add_string_operation_if_necessary(&mut ops, &plan.base_dn, &state.base_dn, "baseDN");
        add_string_operation_if_necessary(&mut ops, &plan.bind_dn, &state.bind_dn, "bindDN");
        add_int64_operation_if_necessary(
            &mut ops,
            &plan.search_size_limit,
            &state.search_size_limit,
            "searchSizeLimit",
        );
        add_string_set_operations_if_necessary(
            &mut ops,
            &plan.consent_record_identity_mapper,
            &state.consent_record_identity_mapper,
            "consentRecordIdentityMapper",
        );
        add_string_set_operations_if_necessary(
            &mut ops,
            &plan.service_account_dn,
            &state.service_account_dn,
            "serviceAccountDN",
        );
        add_string_operation_if_necessary(
            &mut ops,
            &plan.unprivileged_consent_scope,
            &state.unprivileged_consent_scope,
            "unprivilegedConsentScope",
        );
        add_string_operation_if_necessary(
            &mut ops,
            &plan.privileged_consent_scope,
            &state.privileged_consent_scope,
            "privilegedConsentScope",
        );
        add_string_operation_if_necessary(&mut ops, &plan.audience, &state.audience, "audience");
        ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cannot_build_add_request() {
        let error = ConsentService::add_request(&ConsentServiceModel::default()).unwrap_err();
        assert!(error.to_string().contains("Consent Service objects cannot be created"));
    }

    #[test]
    fn test_any_import_id_accepted() {
        assert!(ConsentService::IMPORT_ID_ATTRIBUTES.is_empty());
        assert_eq!(ConsentService::import_id_format(), "[any string]");
        assert_eq!(
            ConsentService::object_path(&ConsentServiceModel::default()).to_string(),
            "consent-service"
        );
    }

    #[test]
    fn test_scalar_operations_are_stringified() {
        let state = ConsentServiceModel {
            enabled: TfBool::known(false),
            search_size_limit: TfInt64::known(100),
            ..Default::default()
        };
        let plan = ConsentServiceModel {
            enabled: TfBool::known(true),
            search_size_limit: TfInt64::known(500),
            ..Default::default()
        };
        let ops = ConsentService::create_operations(&plan, &state);
        assert_eq!(
            ops,
            vec![
                Operation::replace("enabled", "true"),
                Operation::replace("searchSizeLimit", "500"),
            ]
        );
    }

    #[test]
    fn test_read_response_wire_names() {
        let response: ConsentServiceResponse = serde_json::from_value(json!({
            "enabled": true,
            "baseDN": "ou=consents,dc=example,dc=com",
            "searchSizeLimit": 100,
            "serviceAccountDN": ["cn=consent admin"]
        }))
        .unwrap();
        let mut state = ConsentServiceModel::default();
        ConsentService::read_response(&response, &mut state, None);
        assert_eq!(state.id, TfString::known("consent-service"));
        assert_eq!(state.enabled, TfBool::known(true));
        assert_eq!(state.base_dn, TfString::known("ou=consents,dc=example,dc=com"));
        assert_eq!(state.bind_dn, TfString::Null);
        assert_eq!(state.search_size_limit, TfInt64::known(100));
        assert_eq!(state.service_account_dn, TfStringSet::from_values(["cn=consent admin"]));
        assert_eq!(
            state.consent_record_identity_mapper,
            TfStringSet::from_values(Vec::<String>::new())
        );
    }
}
