//! Terraform attribute values.
//!
//! Every attribute in a plan or state is tri-state: it may be null (not set),
//! unknown (to be computed by the server during apply), or known. The
//! configuration API treats an empty string and an absent value as the same
//! thing, so the string helpers here fold those together.

use std::collections::BTreeSet;

/// A nullable, possibly-unknown Terraform value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TfValue<T> {
    Null,
    Unknown,
    Known(T),
}

pub type TfString = TfValue<String>;
pub type TfBool = TfValue<bool>;
pub type TfInt64 = TfValue<i64>;
pub type TfStringSet = TfValue<BTreeSet<String>>;

impl<T> Default for TfValue<T> {
    fn default() -> Self {
        Self::Null
    }
}

impl<T> TfValue<T> {
    pub fn known(value: impl Into<T>) -> Self {
        Self::Known(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    pub fn as_known(&self) -> Option<&T> {
        match self {
            Self::Known(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_known(self) -> Option<T> {
        match self {
            Self::Known(value) => Some(value),
            _ => None,
        }
    }

    /// `Some` becomes known, `None` becomes null.
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Known)
    }
}

impl TfString {
    /// The string value, with null and unknown read as `""`.
    pub fn value_str(&self) -> &str {
        self.as_known().map(String::as_str).unwrap_or("")
    }
}

impl TfStringSet {
    /// Build a known set from any iterator of strings.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Known(values.into_iter().map(Into::into).collect())
    }

    /// Known set elements; null and unknown read as empty.
    pub fn elements(&self) -> BTreeSet<String> {
        self.as_known().cloned().unwrap_or_default()
    }
}

/// Known and not `""`.
pub fn is_non_empty_string(value: &TfString) -> bool {
    matches!(value, TfValue::Known(s) if !s.is_empty())
}

/// Map an optional API string to state.
///
/// A returned value is used as-is. An absent value becomes `""` when
/// `use_empty_string_for_nil` is set and null otherwise.
pub fn string_type_or_nil(value: Option<&str>, use_empty_string_for_nil: bool) -> TfString {
    match value {
        Some(s) => TfValue::Known(s.to_string()),
        None if use_empty_string_for_nil => TfValue::Known(String::new()),
        None => TfValue::Null,
    }
}

/// Equality under the server's null/empty equivalence.
pub fn strings_equivalent(a: &TfString, b: &TfString) -> bool {
    match (a, b) {
        (TfValue::Unknown, TfValue::Unknown) => true,
        (TfValue::Unknown, _) | (_, TfValue::Unknown) => false,
        _ => a.value_str() == b.value_str(),
    }
}
