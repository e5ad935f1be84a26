//! Plan/state diff into configuration API PATCH operations.
//!
//! An update is sent to the server as an ordered list of operations:
//!
//! ```json
//! {"operations": [
//!   {"op": "replace", "path": "description", "value": "updated"},
//!   {"op": "add", "path": "parameter", "values": ["purpose=marketing"]},
//!   {"op": "remove", "path": "subjectDN"}
//! ]}
//! ```
//!
//! Each `add_*_operation_if_necessary` helper compares one planned attribute
//! with its prior state and appends at most one operation (at most two for
//! sets). Resources call them in attribute declaration order, so the
//! resulting list is in declaration order as well.
//!
//! # Rules
//!
//! - An unknown plan value never produces an operation; the server keeps
//!   whatever it computed.
//! - Strings compare with null and `""` treated as equal.
//! - A scalar planned as null (or `""`) while the state holds a value is
//!   removed rather than replaced with an empty value.
//! - Sets compare by membership: new elements are added, dropped elements
//!   are removed.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::values::{TfBool, TfInt64, TfString, TfStringSet, TfValue, strings_equivalent};

/// PATCH operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Add,
    Replace,
    Remove,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Add => "add",
            Self::Replace => "replace",
            Self::Remove => "remove",
        };
        f.write_str(name)
    }
}

/// A single PATCH-style instruction for the configuration API.
///
/// Scalar values travel as strings (`"true"`, `"42"`); the server converts
/// them using its own schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub op: OperationType,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

impl Operation {
    pub fn new(op: OperationType, path: impl Into<String>) -> Self {
        Self {
            op,
            path: path.into(),
            value: None,
            values: Vec::new(),
        }
    }

    pub fn replace(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(OperationType::Replace, path).with_value(value)
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Self::new(OperationType::Remove, path)
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }
}

/// Body of a PATCH request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub operations: Vec<Operation>,
}

impl UpdateRequest {
    pub fn new(operations: Vec<Operation>) -> Self {
        Self { operations }
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Append a string operation when the planned value differs from state.
pub fn add_string_operation_if_necessary(
    ops: &mut Vec<Operation>,
    plan: &TfString,
    state: &TfString,
    path: &str,
) {
    if plan.is_unknown() || strings_equivalent(plan, state) {
        return;
    }
    match plan {
        TfValue::Known(value) if !value.is_empty() => {
            ops.push(Operation::replace(path, value.as_str()));
        }
        _ => ops.push(Operation::remove(path)),
    }
}

/// Append a boolean operation when the planned value differs from state.
pub fn add_bool_operation_if_necessary(
    ops: &mut Vec<Operation>,
    plan: &TfBool,
    state: &TfBool,
    path: &str,
) {
    add_scalar_operation(ops, plan, state, path);
}

/// Append an integer operation when the planned value differs from state.
pub fn add_int64_operation_if_necessary(
    ops: &mut Vec<Operation>,
    plan: &TfInt64,
    state: &TfInt64,
    path: &str,
) {
    add_scalar_operation(ops, plan, state, path);
}

fn add_scalar_operation<T>(
    ops: &mut Vec<Operation>,
    plan: &TfValue<T>,
    state: &TfValue<T>,
    path: &str,
) where
    T: PartialEq + ToString,
{
    if plan.is_unknown() || plan == state {
        return;
    }
    match plan {
        TfValue::Known(value) => ops.push(Operation::replace(path, value.to_string())),
        _ => ops.push(Operation::remove(path)),
    }
}

/// Append set operations for elements added to or dropped from a set.
///
/// Emits at most one `add` (listing every new element) followed by at most
/// one `remove` (listing every dropped element). Null and empty sets are
/// equal.
pub fn add_string_set_operations_if_necessary(
    ops: &mut Vec<Operation>,
    plan: &TfStringSet,
    state: &TfStringSet,
    path: &str,
) {
    if plan.is_unknown() {
        return;
    }
    let planned = plan.elements();
    let current = state.elements();

    let added: Vec<&String> = planned.difference(&current).collect();
    if !added.is_empty() {
        ops.push(
            Operation::new(OperationType::Add, path).with_values(added.into_iter().cloned()),
        );
    }

    let removed: Vec<&String> = current.difference(&planned).collect();
    if !removed.is_empty() {
        ops.push(
            Operation::new(OperationType::Remove, path).with_values(removed.into_iter().cloned()),
        );
    }
}
