//! Consent Definition Localization.
//!
//! Localized text for one version of a Consent Definition. Localizations are
//! nested under their definition and named by locale, so they are imported
//! as `consent_definition_name/locale`.

use crate::client::ObjectPath;
use crate::operations::{Operation, add_string_operation_if_necessary};
use crate::resource::mapper::string_or_null;
use crate::resource::{ConfigResource, ResourceMode};
use crate::resources::consent_definition::ConsentDefinition;
use crate::resources::{configurable, id_attribute, name_attribute, request_string, schema_urn};
use crate::schema::{Attribute, Schema, Validator};
use crate::values::{TfString, TfStringSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsentDefinitionLocalizationModel {
    pub id: TfString,
    pub consent_definition_name: TfString,
    pub locale: TfString,
    pub version: TfString,
    pub title_text: TfString,
    pub data_text: TfString,
    pub purpose_text: TfString,
    pub last_updated: TfString,
    pub notifications: TfStringSet,
    pub required_actions: TfStringSet,
}

crate::impl_model!(ConsentDefinitionLocalizationModel {
    "id" => id: String,
    "consent_definition_name" => consent_definition_name: String,
    "locale" => locale: String,
    "version" => version: String,
    "title_text" => title_text: String,
    "data_text" => data_text: String,
    "purpose_text" => purpose_text: String,
    "last_updated" => last_updated: String,
    "notifications" => notifications: StringSet,
    "required_actions" => required_actions: StringSet,
});

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddConsentDefinitionLocalizationRequest {
    pub locale: String,
    pub schemas: Vec<String>,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_text: Option<String>,
    pub data_text: String,
    pub purpose_text: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentDefinitionLocalizationResponse {
    pub id: String,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub title_text: Option<String>,
    #[serde(default)]
    pub data_text: Option<String>,
    #[serde(default)]
    pub purpose_text: Option<String>,
}

pub struct ConsentDefinitionLocalization;

impl ConfigResource for ConsentDefinitionLocalization {
    type Model = ConsentDefinitionLocalizationModel;
    type Response = ConsentDefinitionLocalizationResponse;

    const TYPE_NAME: &'static str = "consent_definition_localization";
    const DISPLAY_NAME: &'static str = "Consent Definition Localization";
    const COLLECTION: &'static str = "consent-definition-localizations";
    const IMPORT_ID_ATTRIBUTES: &'static [&'static str] = &["consent_definition_name", "locale"];

    fn schema(mode: ResourceMode) -> Schema {
        Schema::new("Manages a Consent Definition Localization.")
            .attribute(id_attribute())
            .attribute(name_attribute(
                "consent_definition_name",
                "Name of the parent Consent Definition",
            ))
            .attribute(name_attribute(
                "locale",
                "The locale of this Consent Definition Localization.",
            ))
            .attribute(configurable(
                Attribute::string("version")
                    .wire("version")
                    .validator(Validator::LengthAtLeast(1))
                    .description("The version of this Consent Definition Localization, using the format MAJOR.MINOR."),
                mode,
                true,
            ))
            .attribute(configurable(
                Attribute::string("title_text")
                    .wire("titleText")
                    .description("Localized text that may be used to provide a title or summary for a consent request or a granted consent."),
                mode,
                false,
            ))
            .attribute(configurable(
                Attribute::string("data_text")
                    .wire("dataText")
                    .description("Localized text describing the data to be shared."),
                mode,
                true,
            ))
            .attribute(configurable(
                Attribute::string("purpose_text")
                    .wire("purposeText")
                    .description("Localized text describing how the data is to be used."),
                mode,
                true,
            ))
            .with_bookkeeping()
    }

    fn object_path(model: &Self::Model) -> ObjectPath {
        let parent = ObjectPath::new(
            ConsentDefinition::COLLECTION,
            model.consent_definition_name.value_str(),
        );
        ObjectPath::child(&parent, Self::COLLECTION, model.locale.value_str())
    }

    fn add_request(plan: &Self::Model) -> Result<Value, serde_json::Error> {
        serde_json::to_value(AddConsentDefinitionLocalizationRequest {
            locale: plan.locale.value_str().to_string(),
            schemas: vec![schema_urn("consent-definition-localization")],
            version: plan.version.value_str().to_string(),
            title_text: request_string(&plan.title_text),
            data_text: plan.data_text.value_str().to_string(),
            purpose_text: plan.purpose_text.value_str().to_string(),
        })
    }

    fn read_response(
        response: &Self::Response,
        state: &mut Self::Model,
        expected: Option<&Self::Model>,
    ) {
        state.id = TfString::known(response.id.as_str());
        state.locale = TfString::known(response.locale.as_deref().unwrap_or(response.id.as_str()));
        state.version = string_or_null(response.version.as_deref(), expected.map(|e| &e.version));
        state.title_text = string_or_null(
            response.title_text.as_deref(),
            expected.map(|e| &e.title_text),
        );
        state.data_text = string_or_null(
            response.data_text.as_deref(),
            expected.map(|e| &e.data_text),
        );
        state.purpose_text = string_or_null(
            response.purpose_text.as_deref(),
            expected.map(|e| &e.purpose_text),
        );
    }

    fn create_operations(plan: &Self::Model, state: &Self::Model) -> Vec<Operation> {
        let mut ops = Vec::new();
        add_string_operation_if_necessary(&mut ops, &plan.version, &state.version, "version");
        add_string_operation_if_necessary(
            &mut ops,
            &plan.title_text,
            &state.title_text,
            "titleText",
        );
        add_string_operation_if_necessary(&mut ops, &plan.data_text, &state.data_text, "dataText");
        add_string_operation_if_necessary(
            &mut ops,
            &plan.purpose_text,
            &state.purpose_text,
            "purposeText",
        );
        ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> ConsentDefinitionLocalizationModel {
        ConsentDefinitionLocalizationModel {
            consent_definition_name: TfString::known("marketing"),
            locale: TfString::known("en-US"),
            version: TfString::known("1.0"),
            data_text: TfString::known("Email address"),
            purpose_text: TfString::known("Newsletters"),
            ..Default::default()
        }
    }

    #[test]
    fn test_object_path_is_nested_under_definition() {
        assert_eq!(
            ConsentDefinitionLocalization::object_path(&model()).to_string(),
            "consent-definitions/marketing/consent-definition-localizations/en-US"
        );
    }

    #[test]
    fn test_import_id_format() {
        assert_eq!(
            ConsentDefinitionLocalization::import_id_format(),
            "consent_definition_name/locale"
        );
    }

    #[test]
    fn test_title_removed_when_cleared() {
        let state = ConsentDefinitionLocalizationModel {
            title_text: TfString::known("Marketing"),
            ..model()
        };
        let ops = ConsentDefinitionLocalization::create_operations(&model(), &state);
        assert_eq!(ops, vec![Operation::remove("titleText")]);
    }

    #[test]
    fn test_read_response_keeps_parent_name() {
        let response: ConsentDefinitionLocalizationResponse = serde_json::from_value(serde_json::json!({
            "id": "en-US",
            "locale": "en-US",
            "version": "1.1",
            "dataText": "Email address",
            "purposeText": "Newsletters"
        }))
        .unwrap();
        let mut state = model();
        ConsentDefinitionLocalization::read_response(&response, &mut state, Some(&model()));
        assert_eq!(state.consent_definition_name, TfString::known("marketing"));
        assert_eq!(state.version, TfString::known("1.1"));
        assert_eq!(state.title_text, TfString::Null);
    }
}
