//! Consent Definition: a purpose users can grant consent for.

use crate::client::ObjectPath;
use crate::operations::{
    Operation, add_string_operation_if_necessary, add_string_set_operations_if_necessary,
};
use crate::resource::mapper::{string_or_null, string_set};
use crate::resource::{ConfigResource, ResourceMode};
use crate::resources::{
    configurable, id_attribute, name_attribute, request_set, request_string, schema_urn,
};
use crate::schema::{Attribute, Schema};
use crate::values::{TfString, TfStringSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsentDefinitionModel {
    pub id: TfString,
    pub unique_id: TfString,
    pub display_name: TfString,
    pub parameter: TfStringSet,
    pub description: TfString,
    pub last_updated: TfString,
    pub notifications: TfStringSet,
    pub required_actions: TfStringSet,
}

crate::impl_model!(ConsentDefinitionModel {
    "id" => id: String,
    "unique_id" => unique_id: String,
    "display_name" => display_name: String,
    "parameter" => parameter: StringSet,
    "description" => description: String,
    "last_updated" => last_updated: String,
    "notifications" => notifications: StringSet,
    "required_actions" => required_actions: StringSet,
});

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddConsentDefinitionRequest {
    #[serde(rename = "uniqueID")]
    pub unique_id: String,
    pub schemas: Vec<String>,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentDefinitionResponse {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub parameter: Option<Vec<String>>,
    #[serde(default)]
    pub description: Option<String>,
}

pub struct ConsentDefinition;

impl ConfigResource for ConsentDefinition {
    type Model = ConsentDefinitionModel;
    type Response = ConsentDefinitionResponse;

    const TYPE_NAME: &'static str = "consent_definition";
    const DISPLAY_NAME: &'static str = "Consent Definition";
    const COLLECTION: &'static str = "consent-definitions";
    const IMPORT_ID_ATTRIBUTES: &'static [&'static str] = &["unique_id"];

    fn schema(mode: ResourceMode) -> Schema {
        Schema::new("Manages a Consent Definition.")
            .attribute(id_attribute())
            .attribute(name_attribute(
                "unique_id",
                "A version-independent unique identifier for this Consent Definition.",
            ))
            .attribute(configurable(
                Attribute::string("display_name")
                    .wire("displayName")
                    .description("A human-readable display name for this Consent Definition."),
                mode,
                true,
            ))
            .attribute(configurable(
                Attribute::string_set("parameter")
                    .wire("parameter")
                    .description("Optional parameters for this Consent Definition."),
                mode,
                false,
            ))
            .attribute(configurable(
                Attribute::string("description")
                    .wire("description")
                    .description("A description for this Consent Definition"),
                mode,
                false,
            ))
            .with_bookkeeping()
    }

    fn object_path(model: &Self::Model) -> ObjectPath {
        ObjectPath::new(Self::COLLECTION, model.unique_id.value_str())
    }

    fn add_request(plan: &Self::Model) -> Result<Value, serde_json::Error> {
        serde_json::to_value(AddConsentDefinitionRequest {
            unique_id: plan.unique_id.value_str().to_string(),
            schemas: vec![schema_urn("consent-definition")],
            display_name: plan.display_name.value_str().to_string(),
            parameter: request_set(&plan.parameter),
            description: request_string(&plan.description),
        })
    }

    fn read_response(
        response: &Self::Response,
        state: &mut Self::Model,
        expected: Option<&Self::Model>,
    ) {
        state.id = TfString::known(response.id.as_str());
        state.unique_id = TfString::known(response.id.as_str());
        state.display_name = string_or_null(
            response.display_name.as_deref(),
            expected.map(|e| &e.display_name),
        );
        state.parameter = string_set(response.parameter.as_deref());
        state.description = string_or_null(
            response.description.as_deref(),
            expected.map(|e| &e.description),
        );
    }

    fn create_operations(plan: &Self::Model, state: &Self::Model) -> Vec<Operation> {
        let mut ops = Vec::new();
        add_string_operation_if_necessary(
            &mut ops,
            &plan.display_name,
            &state.display_name,
            "displayName",
        );
        add_string_set_operations_if_necessary(
            &mut ops,
            &plan.parameter,
            &state.parameter,
            "parameter",
        );
        add_string_operation_if_necessary(
            &mut ops,
            &plan.description,
            &state.description,
            "description",
        );
        ops
    }
}
