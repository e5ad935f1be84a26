//! Response-to-state reconciliation helpers.
//!
//! The configuration API omits attributes that are unset and normalizes empty
//! strings away. These helpers decide how such absences land in state so that
//! a plan applied and read back does not show spurious drift.

use crate::client::ConfigMessages;
use crate::schema::{AttrValue, AttributeType, Model, Schema};
use crate::values::{
    TfBool, TfInt64, TfString, TfStringSet, TfValue, is_non_empty_string, string_type_or_nil,
};
use chrono::Utc;
use log::warn;
use serde_json::Value;

/// Map an optional response string.
///
/// A returned value is used as-is. An absent value is `""` when a non-empty
/// value was expected and null when the expectation was empty, null or
/// unknown.
pub fn string_or_null(value: Option<&str>, expected: Option<&TfString>) -> TfString {
    string_type_or_nil(value, expected.is_some_and(is_non_empty_string))
}

pub fn bool_or_null(value: Option<bool>) -> TfBool {
    TfValue::from_option(value)
}

pub fn int64_or_null(value: Option<i64>) -> TfInt64 {
    TfValue::from_option(value)
}

/// Sets are always known after a read; an absent set is empty.
pub fn string_set(values: Option<&[String]>) -> TfStringSet {
    TfStringSet::from_values(values.unwrap_or_default().iter().cloned())
}

/// Resolve computed strings that are still unknown after apply to `""`.
pub fn populate_all_computed_string_attributes<M: Model>(schema: &Schema, model: &mut M) {
    for attribute in schema.attributes.iter().filter(|a| a.is_computed()) {
        if attribute.attribute_type != AttributeType::String {
            continue;
        }
        if let Some(AttrValue::String(TfValue::Unknown)) = model.attribute(attribute.name) {
            model.set_attribute(attribute.name, AttrValue::String(TfString::known("")));
        }
    }
}

/// Resolve every remaining unknown after apply.
///
/// Strings follow [`populate_all_computed_string_attributes`]; sets become
/// empty and other scalars null.
pub fn resolve_unknown_values<M: Model>(schema: &Schema, model: &mut M) {
    populate_all_computed_string_attributes(schema, model);
    for attribute in &schema.attributes {
        let Some(value) = model.attribute(attribute.name) else {
            continue;
        };
        if !value.is_unknown() {
            continue;
        }
        let resolved = match attribute.attribute_type {
            AttributeType::StringSet => AttrValue::StringSet(
                TfStringSet::from_values(Vec::<String>::new()),
            ),
            other => AttrValue::null(other),
        };
        model.set_attribute(attribute.name, resolved);
    }
}

/// Carry attributes the API never returns from the plan into state.
pub fn set_state_values_not_returned_by_api<M: Model>(schema: &Schema, plan: &M, state: &mut M) {
    for attribute in schema.attributes.iter().filter(|a| a.not_returned) {
        if let Some(value) = plan.attribute(attribute.name) {
            state.set_attribute(attribute.name, value);
        }
    }
}

/// Fill unknown planned values from the prior state.
pub fn fill_unknowns_from_state<M: Model>(schema: &Schema, plan: &mut M, state: &M) {
    for attribute in &schema.attributes {
        let unknown = plan.attribute(attribute.name).is_some_and(|v| v.is_unknown());
        if unknown {
            if let Some(value) = state.attribute(attribute.name) {
                plan.set_attribute(attribute.name, value);
            }
        }
    }
}

/// Record response notifications and required actions in state.
///
/// Both are logged as warnings; an absent message block clears them.
pub fn read_messages<M: Model>(response: &Value, state: &mut M) {
    let messages = ConfigMessages::from_response(response).unwrap_or_default();
    for notification in &messages.notifications {
        warn!("Configuration API notification: {}", notification);
    }
    for action in &messages.required_actions {
        warn!("Configuration API required action: {}", action);
    }

    state.set_attribute(
        "notifications",
        AttrValue::StringSet(TfStringSet::from_values(messages.notifications)),
    );
    state.set_attribute(
        "required_actions",
        AttrValue::StringSet(TfStringSet::from_values(
            messages.required_actions.iter().map(ToString::to_string),
        )),
    );
}

/// Stamp `last_updated` with the current time.
pub fn set_last_updated<M: Model>(state: &mut M) {
    let now = Utc::now().format("%A, %d-%b-%y %H:%M:%S UTC").to_string();
    state.set_attribute("last_updated", AttrValue::String(TfString::known(now)));
}
