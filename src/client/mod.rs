//! Configuration API access.
//!
//! [`ConfigApi`] is the seam between the resource layer and the server. Two
//! backends implement it:
//!
//! - [`HttpConfigClient`] talks HTTPS to a PingDirectory server.
//! - [`InMemoryConfigApi`] keeps configuration objects in process, applying
//!   PATCH operations the way the server does. It backs the test suite and
//!   dry runs.
//!
//! Objects are addressed by [`ObjectPath`]: a collection path plus the
//! object's name, e.g. `consent-definitions/marketing/consent-definition-localizations/en-US`.

pub mod http;
pub mod in_memory;

pub use http::HttpConfigClient;
pub use in_memory::{InMemoryConfigApi, RecordedRequest};

use crate::error::ApiResult;
use crate::operations::UpdateRequest;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::future::Future;

/// Schema URN of the message block attached to configuration API responses.
pub const MESSAGES_SCHEMA: &str = "urn:pingidentity:schemas:configuration:messages:2.0";

/// Location of a configuration object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectPath {
    collection: Vec<String>,
    name: Option<String>,
}

impl ObjectPath {
    /// An object in a top-level collection.
    pub fn new(collection: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            collection: vec![collection.into()],
            name: Some(name.into()),
        }
    }

    /// A singleton object that has no name (e.g. `consent-service`).
    pub fn singleton(collection: impl Into<String>) -> Self {
        Self {
            collection: vec![collection.into()],
            name: None,
        }
    }

    /// An object in a collection nested under `parent`.
    pub fn child(
        parent: &ObjectPath,
        collection: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let mut segments = parent.segments();
        segments.push(collection.into());
        Self {
            collection: segments,
            name: Some(name.into()),
        }
    }

    /// Name of the object, `None` for singletons.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Innermost collection name, used to look up server-side schemas.
    pub fn collection_name(&self) -> &str {
        self.collection.last().map(String::as_str).unwrap_or("")
    }

    /// URL path segments of the enclosing collection.
    pub fn collection_segments(&self) -> &[String] {
        &self.collection
    }

    /// URL path segments of the object itself.
    pub fn segments(&self) -> Vec<String> {
        let mut segments = self.collection.clone();
        if let Some(name) = &self.name {
            segments.push(name.clone());
        }
        segments
    }

    /// Collection path joined with `/`.
    pub fn collection_key(&self) -> String {
        self.collection.join("/")
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments().join("/"))
    }
}

/// An action the server says must be taken for a change to take effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    #[serde(rename = "type")]
    pub action_type: String,
    pub synopsis: String,
}

impl fmt::Display for RequiredAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.property {
            Some(property) => write!(f, "{} ({}): {}", self.action_type, property, self.synopsis),
            None => write!(f, "{}: {}", self.action_type, self.synopsis),
        }
    }
}

/// Messages block returned alongside configuration objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMessages {
    #[serde(default)]
    pub notifications: Vec<String>,
    #[serde(default)]
    pub required_actions: Vec<RequiredAction>,
}

impl ConfigMessages {
    /// Extract the messages block from a raw response, if present.
    pub fn from_response(response: &Value) -> Option<Self> {
        response
            .get(MESSAGES_SCHEMA)
            .and_then(|messages| serde_json::from_value(messages.clone()).ok())
    }
}

/// Access to PingDirectory configuration objects.
///
/// Implementations report every failure as-is; nothing is retried.
pub trait ConfigApi: Send + Sync {
    /// Create an object (POST to its collection) and return the server's view of it.
    fn add(&self, path: &ObjectPath, body: Value) -> impl Future<Output = ApiResult<Value>> + Send;

    /// Fetch an object.
    fn get(&self, path: &ObjectPath) -> impl Future<Output = ApiResult<Value>> + Send;

    /// Apply PATCH operations and return the updated object.
    fn update(
        &self,
        path: &ObjectPath,
        request: &UpdateRequest,
    ) -> impl Future<Output = ApiResult<Value>> + Send;

    /// Delete an object.
    fn delete(&self, path: &ObjectPath) -> impl Future<Output = ApiResult<()>> + Send;
}
