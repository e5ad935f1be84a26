//! Resource schema declarations.
//!
//! A [`Schema`] describes every attribute of a resource or data source: its
//! Terraform name, the configuration API wire name, its type, whether it is
//! required/optional/computed, defaults, plan modifiers and validators.
//!
//! Schemas are also used generically: validation, plan modification, and the
//! post-apply reconciliation helpers walk a schema and read or write model
//! attributes through the [`Model`] trait.

use crate::diagnostics::Diagnostics;
use crate::values::{TfBool, TfInt64, TfString, TfStringSet, TfValue};
use std::fmt;

/// Attribute data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    String,
    Bool,
    Int64,
    StringSet,
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Int64 => "int64",
            Self::StringSet => "set of string",
        };
        f.write_str(name)
    }
}

/// A type-erased attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    String(TfString),
    Bool(TfBool),
    Int64(TfInt64),
    StringSet(TfStringSet),
}

impl AttrValue {
    pub fn attribute_type(&self) -> AttributeType {
        match self {
            Self::String(_) => AttributeType::String,
            Self::Bool(_) => AttributeType::Bool,
            Self::Int64(_) => AttributeType::Int64,
            Self::StringSet(_) => AttributeType::StringSet,
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Self::String(v) => v.is_null(),
            Self::Bool(v) => v.is_null(),
            Self::Int64(v) => v.is_null(),
            Self::StringSet(v) => v.is_null(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        match self {
            Self::String(v) => v.is_unknown(),
            Self::Bool(v) => v.is_unknown(),
            Self::Int64(v) => v.is_unknown(),
            Self::StringSet(v) => v.is_unknown(),
        }
    }

    /// A null value of the given type.
    pub fn null(attribute_type: AttributeType) -> Self {
        match attribute_type {
            AttributeType::String => Self::String(TfValue::Null),
            AttributeType::Bool => Self::Bool(TfValue::Null),
            AttributeType::Int64 => Self::Int64(TfValue::Null),
            AttributeType::StringSet => Self::StringSet(TfValue::Null),
        }
    }

    /// An unknown value of the given type.
    pub fn unknown(attribute_type: AttributeType) -> Self {
        match attribute_type {
            AttributeType::String => Self::String(TfValue::Unknown),
            AttributeType::Bool => Self::Bool(TfValue::Unknown),
            AttributeType::Int64 => Self::Int64(TfValue::Unknown),
            AttributeType::StringSet => Self::StringSet(TfValue::Unknown),
        }
    }
}

/// Plan and state models expose their attributes by Terraform name.
///
/// Implemented with [`impl_model!`](crate::impl_model) for every resource
/// model; the generic adapter code never touches model fields directly.
pub trait Model: Clone + Default + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// Current value of an attribute, `None` if the model has no such attribute.
    fn attribute(&self, name: &str) -> Option<AttrValue>;

    /// Overwrite an attribute. Returns `false` when the name is unknown or the
    /// value has the wrong type.
    fn set_attribute(&mut self, name: &str, value: AttrValue) -> bool;
}

/// Generate [`Model`] accessors for a plan/state struct.
///
/// ```rust,ignore
/// impl_model!(TrustedCertificateModel {
///     "id" => id: String,
///     "certificate" => certificate: String,
///     "notifications" => notifications: StringSet,
/// });
/// ```
#[macro_export]
macro_rules! impl_model {
    ($model:ty { $($name:literal => $field:ident : $variant:ident),* $(,)? }) => {
        impl $crate::schema::Model for $model {
            fn attribute(&self, name: &str) -> Option<$crate::schema::AttrValue> {
                match name {
                    $($name => Some($crate::schema::AttrValue::$variant(self.$field.clone())),)*
                    _ => None,
                }
            }

            fn set_attribute(&mut self, name: &str, value: $crate::schema::AttrValue) -> bool {
                match (name, value) {
                    $(($name, $crate::schema::AttrValue::$variant(v)) => {
                        self.$field = v;
                        true
                    })*
                    _ => false,
                }
            }
        }
    };
}

/// Plan modifiers supported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanModifier {
    /// Changing the attribute destroys and recreates the object.
    RequiresReplace,
    /// An unknown planned value takes the prior state value.
    UseStateForUnknown,
}

/// Configuration-time validators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validator {
    /// The string must be one of the listed values.
    OneOf(&'static [&'static str]),
    /// The string must have at least this many characters.
    LengthAtLeast(usize),
    /// The integer must lie in the inclusive range.
    Int64Between(i64, i64),
}

/// Default applied to a null optional attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    String(&'static str),
    Bool(bool),
    Int64(i64),
    StringSet(&'static [&'static str]),
}

impl DefaultValue {
    fn to_value(&self) -> AttrValue {
        match self {
            Self::String(s) => AttrValue::String(TfValue::known(*s)),
            Self::Bool(b) => AttrValue::Bool(TfValue::Known(*b)),
            Self::Int64(i) => AttrValue::Int64(TfValue::Known(*i)),
            Self::StringSet(values) => {
                AttrValue::StringSet(TfStringSet::from_values(values.iter().copied()))
            }
        }
    }
}

/// How an attribute participates in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
    /// Optional in configuration, filled in by the server when unset.
    OptionalComputed,
    /// Never configured; always set by the provider or server.
    Computed,
}

/// Definition of a single attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: &'static str,
    /// Configuration API attribute name, `None` for provider bookkeeping
    pub wire_name: Option<&'static str>,
    pub attribute_type: AttributeType,
    pub presence: Presence,
    pub sensitive: bool,
    /// The API never echoes this attribute back (passwords, private keys)
    pub not_returned: bool,
    pub description: &'static str,
    pub default: Option<DefaultValue>,
    pub plan_modifiers: Vec<PlanModifier>,
    pub validators: Vec<Validator>,
}

impl Attribute {
    fn new(name: &'static str, attribute_type: AttributeType) -> Self {
        Self {
            name,
            wire_name: None,
            attribute_type,
            presence: Presence::Optional,
            sensitive: false,
            not_returned: false,
            description: "",
            default: None,
            plan_modifiers: Vec::new(),
            validators: Vec::new(),
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, AttributeType::String)
    }

    pub fn bool(name: &'static str) -> Self {
        Self::new(name, AttributeType::Bool)
    }

    pub fn int64(name: &'static str) -> Self {
        Self::new(name, AttributeType::Int64)
    }

    pub fn string_set(name: &'static str) -> Self {
        Self::new(name, AttributeType::StringSet)
    }

    pub fn wire(mut self, wire_name: &'static str) -> Self {
        self.wire_name = Some(wire_name);
        self
    }

    pub fn required(mut self) -> Self {
        self.presence = Presence::Required;
        self
    }

    pub fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self
    }

    pub fn optional_computed(mut self) -> Self {
        self.presence = Presence::OptionalComputed;
        self
    }

    pub fn computed(mut self) -> Self {
        self.presence = Presence::Computed;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn not_returned_by_api(mut self) -> Self {
        self.not_returned = true;
        self
    }

    pub fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Attach a default. Attributes with defaults are optional and computed.
    pub fn default_value(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self.presence = Presence::OptionalComputed;
        self
    }

    pub fn plan_modifier(mut self, modifier: PlanModifier) -> Self {
        self.plan_modifiers.push(modifier);
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn is_computed(&self) -> bool {
        matches!(self.presence, Presence::Computed | Presence::OptionalComputed)
    }

    pub fn has_modifier(&self, modifier: PlanModifier) -> bool {
        self.plan_modifiers.contains(&modifier)
    }

    fn validate(&self, value: &AttrValue, diags: &mut Diagnostics) {
        if value.is_unknown() {
            return;
        }
        if value.is_null() {
            if self.presence == Presence::Required {
                diags.add_attribute_error(
                    self.name,
                    "Missing required argument",
                    format!(
                        "The argument \"{}\" is required, but no definition was found.",
                        self.name
                    ),
                );
            }
            return;
        }
        if self.presence == Presence::Computed {
            diags.add_attribute_error(
                self.name,
                "Invalid Configuration for Read-Only Attribute",
                format!("Cannot set value for the computed attribute \"{}\".", self.name),
            );
            return;
        }

        for validator in &self.validators {
            match (validator, value) {
                (Validator::OneOf(allowed), AttrValue::String(TfValue::Known(s))) => {
                    if !allowed.contains(&s.as_str()) {
                        diags.add_attribute_error(
                            self.name,
                            "Invalid Attribute Value Match",
                            format!(
                                "Attribute {} value must be one of: {:?}, got: \"{}\"",
                                self.name,
                                allowed,
                                s
                            ),
                        );
                    }
                }
                (Validator::LengthAtLeast(min), AttrValue::String(TfValue::Known(s))) => {
                    if s.chars().count() < *min {
                        diags.add_attribute_error(
                            self.name,
                            "Invalid Attribute Value Length",
                            format!(
                                "Attribute {} string length must be at least {}, got: {}",
                                self.name,
                                min,
                                s.chars().count()
                            ),
                        );
                    }
                }
                (Validator::Int64Between(min, max), AttrValue::Int64(TfValue::Known(i))) => {
                    if i < min || i > max {
                        diags.add_attribute_error(
                            self.name,
                            "Invalid Attribute Value",
                            format!(
                                "Attribute {} value must be between {} and {}, got: {}",
                                self.name,
                                min,
                                max,
                                i
                            ),
                        );
                    }
                }
                _ => {}
            }
        }
    }
}

/// Outcome of plan modification.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlanModification {
    /// Attributes whose change forces replacement of the object
    pub requires_replace: Vec<&'static str>,
}

/// Complete schema of a resource or data source.
#[derive(Debug, Clone)]
pub struct Schema {
    pub description: String,
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            attributes: Vec::new(),
        }
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Append the bookkeeping attributes shared by every resource.
    pub fn with_bookkeeping(self) -> Self {
        self.attribute(
            Attribute::string("last_updated")
                .computed()
                .description("Timestamp of the last Terraform update of this object."),
        )
        .attribute(
            Attribute::string_set("notifications")
                .computed()
                .description("Notifications returned by the configuration API."),
        )
        .attribute(
            Attribute::string_set("required_actions")
                .computed()
                .description("Required actions returned by the configuration API."),
        )
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Attributes mapped to configuration API fields.
    pub fn wire_attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().filter(|a| a.wire_name.is_some())
    }

    /// Validate configuration before any network call.
    pub fn validate<M: Model>(&self, config: &M, diags: &mut Diagnostics) {
        for attribute in &self.attributes {
            if let Some(value) = config.attribute(attribute.name) {
                attribute.validate(&value, diags);
            }
        }
    }

    /// Turn a validated configuration into a plan.
    ///
    /// Null optional attributes take their defaults, null computed attributes
    /// become unknown, `UseStateForUnknown` copies prior state into unknowns,
    /// and changed `RequiresReplace` attributes are reported. A replaced
    /// object starts without prior state, so nothing is copied from it.
    pub fn modify_plan<M: Model>(&self, plan: &mut M, prior_state: Option<&M>) -> PlanModification {
        let mut modification = PlanModification::default();
        // (name, value without prior state, value with prior state)
        let mut planned = Vec::with_capacity(self.attributes.len());

        for attribute in &self.attributes {
            let Some(mut value) = plan.attribute(attribute.name) else {
                continue;
            };

            if value.is_null() {
                if let Some(default) = &attribute.default {
                    value = default.to_value();
                } else if attribute.is_computed() {
                    value = AttrValue::unknown(attribute.attribute_type);
                }
            }

            let fresh = value.clone();
            if let Some(state) = prior_state.and_then(|s| s.attribute(attribute.name)) {
                if value.is_unknown() && attribute.has_modifier(PlanModifier::UseStateForUnknown) {
                    value = state.clone();
                }
                if attribute.has_modifier(PlanModifier::RequiresReplace)
                    && !value.is_unknown()
                    && value != state
                {
                    modification.requires_replace.push(attribute.name);
                }
            }
            planned.push((attribute.name, fresh, value));
        }

        let replacing = !modification.requires_replace.is_empty();
        for (name, fresh, value) in planned {
            plan.set_attribute(name, if replacing { fresh } else { value });
        }

        modification
    }

    /// Derive the schema of the matching data source.
    ///
    /// Lookup keys become required, everything else computed; defaults,
    /// modifiers, validators and attributes the API never returns are dropped.
    pub fn for_data_source(&self, lookup_keys: &[&str]) -> Schema {
        let attributes = self
            .attributes
            .iter()
            .filter(|a| !a.not_returned && a.name != "last_updated")
            .map(|a| {
                let mut attribute = a.clone();
                attribute.default = None;
                attribute.plan_modifiers.clear();
                attribute.validators.clear();
                attribute.presence = if lookup_keys.contains(&a.name) {
                    Presence::Required
                } else {
                    Presence::Computed
                };
                attribute
            })
            .collect();
        Schema {
            description: format!(
                "Describes a {}",
                self.description.trim_start_matches("Manages a ")
            ),
            attributes,
        }
    }
}
