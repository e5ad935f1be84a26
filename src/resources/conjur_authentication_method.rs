//! Conjur Authentication Method.
//!
//! Credentials the server uses to authenticate to a CyberArk Conjur
//! instance. The password and API key are write-only.

use crate::client::ObjectPath;
use crate::config::ProductVersion;
use crate::operations::{Operation, add_string_operation_if_necessary};
use crate::resource::mapper::string_or_null;
use crate::resource::{ConfigResource, ResourceMode};
use crate::resources::{configurable, id_attribute, name_attribute, request_string, schema_urn};
use crate::schema::{Attribute, Schema};
use crate::values::{TfString, TfStringSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConjurAuthenticationMethodModel {
    pub id: TfString,
    pub name: TfString,
    pub username: TfString,
    pub password: TfString,
    pub api_key: TfString,
    pub description: TfString,
    pub last_updated: TfString,
    pub notifications: TfStringSet,
    pub required_actions: TfStringSet,
}

crate::impl_model!(ConjurAuthenticationMethodModel {
    "id" => id: String,
    "name" => name: String,
    "username" => username: String,
    "password" => password: String,
    "api_key" => api_key: String,
    "description" => description: String,
    "last_updated" => last_updated: String,
    "notifications" => notifications: StringSet,
    "required_actions" => required_actions: StringSet,
});

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddConjurAuthenticationMethodRequest {
    pub method_name: String,
    pub schemas: Vec<String>,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConjurAuthenticationMethodResponse {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

pub struct ConjurAuthenticationMethod;

impl ConfigResource for ConjurAuthenticationMethod {
    type Model = ConjurAuthenticationMethodModel;
    type Response = ConjurAuthenticationMethodResponse;

    const TYPE_NAME: &'static str = "conjur_authentication_method";
    const DISPLAY_NAME: &'static str = "Conjur Authentication Method";
    const COLLECTION: &'static str = "conjur-authentication-methods";
    const IMPORT_ID_ATTRIBUTES: &'static [&'static str] = &["name"];
    const MINIMUM_VERSION: Option<ProductVersion> = Some(ProductVersion::new(9, 2, 0, 0));

    fn schema(mode: ResourceMode) -> Schema {
        Schema::new("Manages a Conjur Authentication Method.")
            .attribute(id_attribute())
            .attribute(name_attribute("name", "Name of this config object."))
            .attribute(configurable(
                Attribute::string("username")
                    .wire("username")
                    .description("The username for the user to authenticate."),
                mode,
                true,
            ))
            .attribute(configurable(
                Attribute::string("password")
                    .wire("password")
                    .sensitive()
                    .not_returned_by_api()
                    .description("The password for the user to authenticate."),
                mode,
                false,
            ))
            .attribute(configurable(
                Attribute::string("api_key")
                    .wire("apiKey")
                    .sensitive()
                    .not_returned_by_api()
                    .description("The API key for the user to authenticate."),
                mode,
                false,
            ))
            .attribute(configurable(
                Attribute::string("description")
                    .wire("description")
                    .description("A description for this Conjur Authentication Method"),
                mode,
                false,
            ))
            .with_bookkeeping()
    }

    fn object_path(model: &Self::Model) -> ObjectPath {
        ObjectPath::new(Self::COLLECTION, model.name.value_str())
    }

    fn add_request(plan: &Self::Model) -> Result<Value, serde_json::Error> {
        let request = AddConjurAuthenticationMethodRequest {
            method_name: plan.name.value_str().to_string(),
            schemas: vec![schema_urn("conjur-authentication-method")],
            username: plan.username.value_str().to_string(),
            password: request_string(&plan.password),
            api_key: request_string(&plan.api_key),
            description: request_string(&plan.description),
        };
        serde_json::to_value(request)
    }

    fn read_response(
        response: &Self::Response,
        state: &mut Self::Model,
        expected: Option<&Self::Model>,
    ) {
        state.id = TfString::known(response.id.as_str());
        state.name = TfString::known(response.id.as_str());
        state.username = string_or_null(
            response.username.as_deref(),
            expected.map(|e| &e.username),
        );
        state.description = string_or_null(
            response.description.as_deref(),
            expected.map(|e| &e.description),
        );
    }

    fn create_operations(plan: &Self::Model, state: &Self::Model) -> Vec<Operation> {
        let mut ops = Vec::new();
        add_string_operation_if_necessary(&mut ops, &plan.username, &state.username, "username");
        add_string_operation_if_necessary(&mut ops, &plan.password, &state.password, "password");
        add_string_operation_if_necessary(&mut ops, &plan.api_key, &state.api_key, "apiKey");
        add_string_operation_if_necessary(
            &mut ops,
            &plan.description,
            &state.description,
            "description",
        );
        ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::OperationType;
    use serde_json::json;

    fn plan() -> ConjurAuthenticationMethodModel {
        ConjurAuthenticationMethodModel {
            name: TfString::known("conjur"),
            username: TfString::known("host/pingdirectory"),
            api_key: TfString::known("api-key"),
            ..Default::default()
        }
    }

    #[test]
    fn test_add_request_omits_unset_secrets() {
        let body = ConjurAuthenticationMethod::add_request(&plan()).unwrap();
        assert_eq!(
            body,
            json!({
                "methodName": "conjur",
                "schemas": ["urn:pingidentity:schemas:configuration:2.0:conjur-authentication-method"],
                "username": "host/pingdirectory",
                "apiKey": "api-key"
            })
        );
    }

    #[test]
    fn test_secret_change_is_patched() {
        let state = plan();
        let mut planned = plan();
        planned.api_key = TfString::known("rotated");
        let ops = ConjurAuthenticationMethod::create_operations(&planned, &state);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].op, OperationType::Replace);
        assert_eq!(ops[0].path, "apiKey");
    }

    #[test]
    fn test_read_response_keeps_null_description() {
        let response: ConjurAuthenticationMethodResponse = serde_json::from_value(json!({
            "id": "conjur",
            "username": "host/pingdirectory"
        }))
        .unwrap();
        let mut state = plan();
        ConjurAuthenticationMethod::read_response(&response, &mut state, Some(&plan()));
        assert_eq!(state.id, TfString::known("conjur"));
        assert_eq!(state.description, TfString::Null);
        assert_eq!(state.api_key, TfString::known("api-key"));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(
            ConjurAuthenticationMethod::type_name(ResourceMode::Managed),
            "pingdirectory_conjur_authentication_method"
        );
        assert_eq!(
            ConjurAuthenticationMethod::type_name(ResourceMode::Default),
            "pingdirectory_default_conjur_authentication_method"
        );
    }
}
