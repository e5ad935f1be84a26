//! In-memory configuration API.
//!
//! Stores configuration objects as JSON and applies PATCH operations with the
//! server's semantics. Each collection can be registered with the resource
//! [`Schema`] so that stringified operation values are converted back to
//! their wire types and attributes the real server never returns (passwords,
//! private keys) are withheld from responses.
//!
//! Every request is recorded, which lets tests assert on the exact traffic an
//! operation produced.
//!
//! # Example Usage
//!
//! ```rust
//! use pingdirectory_provider::client::{ConfigApi, InMemoryConfigApi, ObjectPath};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = InMemoryConfigApi::new();
//! let path = ObjectPath::new("trusted-certificates", "ca");
//! api.add(&path, json!({"certificate": "-----BEGIN CERTIFICATE-----"})).await?;
//!
//! let object = api.get(&path).await?;
//! assert_eq!(object["id"], "ca");
//! # Ok(())
//! # }
//! ```

use crate::client::{ConfigApi, ObjectPath};
use crate::error::{ApiError, ApiResult};
use crate::operations::{Operation, OperationType, UpdateRequest};
use crate::schema::{AttributeType, Schema};
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

const ERROR_SCHEMA: &str = "urn:ietf:params:scim:api:messages:2.0:Error";

/// A request received by the in-memory server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub path: String,
}

/// Server-side view of one collection's attributes.
#[derive(Debug, Clone, Default)]
struct CollectionSchema {
    kinds: HashMap<String, AttributeType>,
    hidden: HashSet<String>,
}

impl CollectionSchema {
    fn from_schema(schema: &Schema) -> Self {
        let mut collection = Self::default();
        for attribute in schema.wire_attributes() {
            let Some(wire_name) = attribute.wire_name else {
                continue;
            };
            collection
                .kinds
                .insert(wire_name.to_string(), attribute.attribute_type);
            if attribute.not_returned {
                collection.hidden.insert(wire_name.to_string());
            }
        }
        collection
    }

    fn kind(&self, path: &str) -> AttributeType {
        self.kinds.get(path).copied().unwrap_or(AttributeType::String)
    }
}

/// Thread-safe in-memory implementation of [`ConfigApi`].
#[derive(Clone, Default)]
pub struct InMemoryConfigApi {
    // Structure: collection key -> object name -> object ("" for singletons)
    objects: Arc<RwLock<HashMap<String, BTreeMap<String, Value>>>>,
    collections: Arc<HashMap<String, CollectionSchema>>,
    requests: Arc<RwLock<Vec<RecordedRequest>>>,
}

impl InMemoryConfigApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the schema used for objects in `collection`.
    pub fn with_collection(mut self, collection: &str, schema: &Schema) -> Self {
        Arc::make_mut(&mut self.collections)
            .insert(collection.to_string(), CollectionSchema::from_schema(schema));
        self
    }

    /// Store an object directly, bypassing request recording.
    ///
    /// Used to model server built-ins that "default" resources adopt.
    pub async fn seed(&self, path: &ObjectPath, object: Value) {
        let mut objects = self.objects.write().await;
        let stored = Self::with_id(path, object);
        objects
            .entry(path.collection_key())
            .or_default()
            .insert(Self::object_key(path), stored);
    }

    /// Raw stored object, including attributes withheld from responses.
    pub async fn object(&self, path: &ObjectPath) -> Option<Value> {
        let objects = self.objects.read().await;
        objects
            .get(&path.collection_key())
            .and_then(|collection| collection.get(&Self::object_key(path)))
            .cloned()
    }

    /// All requests received so far, in order.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.read().await.clone()
    }

    pub async fn clear_requests(&self) {
        self.requests.write().await.clear();
    }

    async fn record(&self, method: &'static str, path: String) {
        self.requests.write().await.push(RecordedRequest { method, path });
    }

    fn object_key(path: &ObjectPath) -> String {
        path.name().unwrap_or_default().to_string()
    }

    /// Collection key and name of the object a nested collection belongs to.
    fn parent(path: &ObjectPath) -> Option<(String, String)> {
        let segments = path.collection_segments();
        if segments.len() < 3 {
            return None;
        }
        let parent_name = segments[segments.len() - 2].clone();
        Some((segments[..segments.len() - 2].join("/"), parent_name))
    }

    fn with_id(path: &ObjectPath, mut object: Value) -> Value {
        if let (Some(name), Some(map)) = (path.name(), object.as_object_mut()) {
            map.entry("id").or_insert_with(|| Value::String(name.to_string()));
        }
        object
    }

    fn visible(&self, path: &ObjectPath, object: &Value) -> Value {
        let mut visible = object.clone();
        if let (Some(schema), Some(map)) = (
            self.collections.get(path.collection_name()),
            visible.as_object_mut(),
        ) {
            map.retain(|key, _| !schema.hidden.contains(key));
        }
        visible
    }

    fn error(status: u16, detail: String) -> ApiError {
        let body = json!({
            "schemas": [ERROR_SCHEMA],
            "status": status.to_string(),
            "detail": detail,
        });
        ApiError::http(status, body.to_string())
    }

    fn not_found(path: &ObjectPath) -> ApiError {
        Self::error(404, format!("Configuration object '{}' does not exist", path))
    }

    fn apply_operation(
        object: &mut Map<String, Value>,
        operation: &Operation,
        schema: Option<&CollectionSchema>,
    ) -> Result<(), String> {
        let path = operation.path.as_str();
        if path.is_empty() {
            return Err("Operation path must not be empty".to_string());
        }
        if matches!(path, "id" | "schemas") {
            return Err(format!("Cannot modify readonly attribute: {}", path));
        }

        let kind = schema.map_or(AttributeType::String, |s| s.kind(path));
        match (operation.op, kind) {
            (OperationType::Remove, AttributeType::StringSet) if !operation.values.is_empty() => {
                let now_empty = match object.get_mut(path).and_then(Value::as_array_mut) {
                    Some(existing) => {
                        existing.retain(|v| {
                            !v.as_str()
                                .is_some_and(|s| operation.values.iter().any(|r| r == s))
                        });
                        existing.is_empty()
                    }
                    None => false,
                };
                if now_empty {
                    object.remove(path);
                }
            }
            (OperationType::Remove, _) => {
                object.remove(path);
            }
            (OperationType::Add, AttributeType::StringSet) => {
                let entry = object
                    .entry(path.to_string())
                    .or_insert_with(|| Value::Array(Vec::new()));
                let Some(existing) = entry.as_array_mut() else {
                    return Err(format!("Attribute '{}' is not multi-valued", path));
                };
                for value in Self::operation_values(operation) {
                    if !existing.iter().any(|v| v.as_str() == Some(value.as_str())) {
                        existing.push(Value::String(value));
                    }
                }
            }
            (OperationType::Replace, AttributeType::StringSet) => {
                let values = Self::operation_values(operation)
                    .into_iter()
                    .map(Value::String)
                    .collect();
                object.insert(path.to_string(), Value::Array(values));
            }
            (OperationType::Add | OperationType::Replace, _) => {
                let raw = operation
                    .value
                    .as_deref()
                    .ok_or_else(|| {
                        format!("{} operation on '{}' requires a value", operation.op, path)
                    })?;
                object.insert(path.to_string(), Self::convert(path, raw, kind)?);
            }
        }
        Ok(())
    }

    fn operation_values(operation: &Operation) -> Vec<String> {
        if operation.values.is_empty() {
            operation.value.iter().cloned().collect()
        } else {
            operation.values.clone()
        }
    }

    fn convert(path: &str, raw: &str, kind: AttributeType) -> Result<Value, String> {
        match kind {
            AttributeType::Bool => raw
                .parse::<bool>()
                .map(Value::Bool)
                .map_err(|_| format!("Value '{}' for '{}' is not a boolean", raw, path)),
            AttributeType::Int64 => raw
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| format!("Value '{}' for '{}' is not an integer", raw, path)),
            AttributeType::String => Ok(Value::String(raw.to_string())),
            AttributeType::StringSet => Ok(Value::Array(vec![Value::String(raw.to_string())])),
        }
    }
}

impl ConfigApi for InMemoryConfigApi {
    async fn add(&self, path: &ObjectPath, body: Value) -> ApiResult<Value> {
        self.record("POST", path.collection_key()).await;
        if !body.is_object() {
            return Err(Self::error(400, "Request body must be a JSON object".to_string()));
        }

        let mut objects = self.objects.write().await;
        if let Some((parent_key, parent_name)) = Self::parent(path) {
            let parent_exists = objects
                .get(&parent_key)
                .is_some_and(|collection| collection.contains_key(&parent_name));
            if !parent_exists {
                return Err(Self::error(
                    404,
                    format!(
                        "Parent configuration object '{}/{}' does not exist",
                        parent_key,
                        parent_name
                    ),
                ));
            }
        }
        let collection = objects.entry(path.collection_key()).or_default();
        let key = Self::object_key(path);
        if collection.contains_key(&key) {
            return Err(Self::error(
                409,
                format!("Configuration object '{}' already exists", path),
            ));
        }

        let stored = Self::with_id(path, body);
        let response = self.visible(path, &stored);
        collection.insert(key, stored);
        Ok(response)
    }

    async fn get(&self, path: &ObjectPath) -> ApiResult<Value> {
        self.record("GET", path.to_string()).await;
        let objects = self.objects.read().await;
        objects
            .get(&path.collection_key())
            .and_then(|collection| collection.get(&Self::object_key(path)))
            .map(|object| self.visible(path, object))
            .ok_or_else(|| Self::not_found(path))
    }

    async fn update(&self, path: &ObjectPath, request: &UpdateRequest) -> ApiResult<Value> {
        self.record("PATCH", path.to_string()).await;
        let mut objects = self.objects.write().await;
        let object = objects
            .get_mut(&path.collection_key())
            .and_then(|collection| collection.get_mut(&Self::object_key(path)))
            .ok_or_else(|| Self::not_found(path))?;

        // Apply to a copy so a failing operation leaves the object untouched
        let mut updated = object
            .as_object()
            .cloned()
            .ok_or_else(|| {
                Self::error(500, format!("Stored object '{}' is not a JSON object", path))
            })?;
        let schema = self.collections.get(path.collection_name());
        for operation in &request.operations {
            Self::apply_operation(&mut updated, operation, schema)
                .map_err(|detail| Self::error(400, detail))?;
        }

        *object = Value::Object(updated);
        Ok(self.visible(path, object))
    }

    async fn delete(&self, path: &ObjectPath) -> ApiResult<()> {
        self.record("DELETE", path.to_string()).await;
        let mut objects = self.objects.write().await;
        let removed = objects
            .get_mut(&path.collection_key())
            .and_then(|collection| collection.remove(&Self::object_key(path)));
        if removed.is_none() {
            return Err(Self::not_found(path));
        }

        // Nested collections go with their parent
        let children = format!("{}/", path);
        objects.retain(|key, _| !key.starts_with(&children));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Attribute;

    fn api() -> InMemoryConfigApi {
        let schema = Schema::new("Manages a Test Object")
            .attribute(Attribute::string("description").wire("description"))
            .attribute(Attribute::bool("enabled").wire("enabled"))
            .attribute(Attribute::int64("search_size_limit").wire("searchSizeLimit"))
            .attribute(Attribute::string_set("parameter").wire("parameter"))
            .attribute(Attribute::string("password").wire("password").not_returned_by_api());
        InMemoryConfigApi::new().with_collection("test-objects", &schema)
    }

    #[tokio::test]
    async fn test_add_get_delete() {
        let api = api();
        let path = ObjectPath::new("test-objects", "one");

        let created = api
            .add(&path, json!({"description": "first", "password": "secret"}))
            .await
            .unwrap();
        assert_eq!(created["id"], "one");
        assert!(created.get("password").is_none());
        assert_eq!(api.object(&path).await.unwrap()["password"], "secret");

        let duplicate = api.add(&path, json!({})).await.unwrap_err();
        assert_eq!(duplicate.status(), Some(409));

        api.delete(&path).await.unwrap();
        assert!(api.get(&path).await.unwrap_err().is_not_found());
        assert!(api.delete(&path).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_patch_converts_wire_types() {
        let api = api();
        let path = ObjectPath::new("test-objects", "one");
        api.seed(&path, json!({"parameter": ["a", "b"], "description": "x"}))
            .await;

        let request = UpdateRequest::new(vec![
            Operation::replace("enabled", "true"),
            Operation::replace("searchSizeLimit", "250"),
            Operation::new(OperationType::Add, "parameter").with_values(["c"]),
            Operation::new(OperationType::Remove, "parameter").with_values(["a"]),
            Operation::remove("description"),
        ]);
        let updated = api.update(&path, &request).await.unwrap();

        assert_eq!(updated["enabled"], json!(true));
        assert_eq!(updated["searchSizeLimit"], json!(250));
        assert_eq!(updated["parameter"], json!(["b", "c"]));
        assert!(updated.get("description").is_none());
    }

    #[tokio::test]
    async fn test_failed_patch_leaves_object_untouched() {
        let api = api();
        let path = ObjectPath::new("test-objects", "one");
        api.seed(&path, json!({"description": "x"})).await;

        let request = UpdateRequest::new(vec![
            Operation::replace("description", "changed"),
            Operation::replace("enabled", "maybe"),
        ]);
        let error = api.update(&path, &request).await.unwrap_err();
        assert_eq!(error.status(), Some(400));
        assert!(error.body().unwrap().contains("not a boolean"));
        assert_eq!(api.object(&path).await.unwrap()["description"], "x");

        let readonly = UpdateRequest::new(vec![Operation::replace("id", "other")]);
        assert_eq!(api.update(&path, &readonly).await.unwrap_err().status(), Some(400));
    }

    #[tokio::test]
    async fn test_requests_are_recorded() {
        let api = api();
        let path = ObjectPath::new("test-objects", "one");
        api.seed(&path, json!({})).await;
        let _ = api.get(&path).await;
        let _ = api.get(&ObjectPath::new("test-objects", "missing")).await;

        let requests = api.requests().await;
        assert_eq!(
            requests,
            vec![
                RecordedRequest { method: "GET", path: "test-objects/one".to_string() },
                RecordedRequest { method: "GET", path: "test-objects/missing".to_string() },
            ]
        );
        api.clear_requests().await;
        assert!(api.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_nested_add_requires_parent() {
        let api = InMemoryConfigApi::new();
        let parent = ObjectPath::new("consent-definitions", "marketing");
        let child = ObjectPath::child(&parent, "consent-definition-localizations", "en-US");

        let error = api.add(&child, json!({"version": "1.0"})).await.unwrap_err();
        assert!(error.is_not_found());

        api.seed(&parent, json!({"displayName": "Marketing"})).await;
        let created = api.add(&child, json!({"version": "1.0"})).await.unwrap();
        assert_eq!(created["id"], "en-US");
        assert_eq!(
            api.requests().await.last().map(|r| r.path.clone()),
            Some("consent-definitions/marketing/consent-definition-localizations".to_string())
        );
    }

    #[tokio::test]
    async fn test_delete_removes_nested_objects() {
        let api = InMemoryConfigApi::new();
        let parent = ObjectPath::new("consent-definitions", "marketing");
        let child = ObjectPath::child(&parent, "consent-definition-localizations", "en-US");
        let sibling = ObjectPath::new("consent-definitions", "marketing-eu");
        api.seed(&parent, json!({})).await;
        api.seed(&sibling, json!({})).await;
        api.seed(&child, json!({"version": "1.0"})).await;
        api.seed(
            &ObjectPath::child(&sibling, "consent-definition-localizations", "de-DE"),
            json!({"version": "1.0"}),
        )
        .await;

        api.delete(&parent).await.unwrap();
        api.seed(&parent, json!({})).await;

        assert!(api.get(&child).await.unwrap_err().is_not_found());
        assert!(
            api.get(&ObjectPath::child(&sibling, "consent-definition-localizations", "de-DE"))
                .await
                .is_ok()
        );
    }
}
