//! CRUD orchestration for configuration object resources.
//!
//! [`ResourceAdapter`] sequences schema validation, request building, the
//! configuration API call and response mapping for one [`ConfigResource`]
//! type. Failures never panic or return a Rust error: they are recorded in
//! the caller's [`Diagnostics`] and the method returns `None`.
//!
//! Every API failure is reported once, verbatim, and never retried.

use crate::client::{ConfigApi, ObjectPath};
use crate::config::ProductVersion;
use crate::diagnostics::{Diagnostics, report_http_error};
use crate::operations::UpdateRequest;
use crate::resource::mapper::{
    fill_unknowns_from_state, read_messages, resolve_unknown_values, set_last_updated,
    set_state_values_not_returned_by_api,
};
use crate::resource::{ConfigResource, ResourceMode};
use crate::schema::{AttrValue, Model, Schema};
use crate::values::TfString;
use log::{debug, info, trace, warn};
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

/// A validated, modified plan ready to apply.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedChange<M> {
    pub planned: M,
    /// Attributes whose change forces the object to be recreated
    pub requires_replace: Vec<&'static str>,
}

impl<M> PlannedChange<M> {
    pub fn requires_replace(&self) -> bool {
        !self.requires_replace.is_empty()
    }
}

/// Result of refreshing state from the server.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome<M> {
    /// The object exists; this is its current state.
    Present(M),
    /// The object was deleted outside Terraform and has been dropped from state.
    Removed,
}

/// Resource adapter for one configuration object type.
pub struct ResourceAdapter<R: ConfigResource, A: ConfigApi> {
    api: Arc<A>,
    mode: ResourceMode,
    product_version: Option<ProductVersion>,
    _resource: PhantomData<fn() -> R>,
}

impl<R: ConfigResource, A: ConfigApi> Clone for ResourceAdapter<R, A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            mode: self.mode,
            product_version: self.product_version,
            _resource: PhantomData,
        }
    }
}

impl<R: ConfigResource, A: ConfigApi> ResourceAdapter<R, A> {
    pub fn new(api: Arc<A>, mode: ResourceMode) -> Self {
        Self {
            api,
            mode,
            product_version: None,
            _resource: PhantomData,
        }
    }

    /// Check planned objects against the server's product version.
    pub fn with_product_version(mut self, version: ProductVersion) -> Self {
        self.product_version = Some(version);
        self
    }

    pub fn mode(&self) -> ResourceMode {
        self.mode
    }

    pub fn type_name(&self) -> String {
        R::type_name(self.mode)
    }

    pub fn schema(&self) -> Schema {
        R::schema(self.mode)
    }

    fn check_version(&self, diags: &mut Diagnostics) -> bool {
        if let (Some(minimum), Some(actual)) = (R::MINIMUM_VERSION, self.product_version) {
            if actual < minimum {
                diags.add_error(
                    "Unsupported resource for product version",
                    format!(
                        "The {} resource requires PingDirectory {} or later, but the provider is configured for {}",
                        self.type_name(),
                        minimum,
                        actual
                    ),
                );
                return false;
            }
        }
        true
    }

    /// Validate a configuration and turn it into a plan.
    ///
    /// Nothing is sent to the server. `prior_state` is the current state for
    /// an existing object and `None` for one about to be created.
    pub fn plan(
        &self,
        config: R::Model,
        prior_state: Option<&R::Model>,
        diags: &mut Diagnostics,
    ) -> Option<PlannedChange<R::Model>> {
        if self.mode == ResourceMode::Managed && !R::SUPPORTS_MANAGED {
            diags.add_error(
                "Unsupported resource mode",
                format!(
                    "{} objects are server built-ins; use {} instead",
                    R::DISPLAY_NAME,
                    R::type_name(ResourceMode::Default)
                ),
            );
            return None;
        }
        if !self.check_version(diags) {
            return None;
        }

        let schema = self.schema();
        schema.validate(&config, diags);
        if diags.has_error() {
            return None;
        }

        let mut planned = config;
        let modification = schema.modify_plan(&mut planned, prior_state);
        Some(PlannedChange {
            planned,
            requires_replace: modification.requires_replace,
        })
    }

    /// Create the object described by `plan`.
    ///
    /// Default resources are adopted instead: the existing object is read and
    /// the plan is applied to it as an update.
    pub async fn create(&self, plan: &R::Model, diags: &mut Diagnostics) -> Option<R::Model> {
        let path = R::object_path(plan);
        let request_id = Uuid::new_v4();
        info!(
            "Creating {} '{}' (request: '{}')",
            R::DISPLAY_NAME,
            path,
            request_id
        );

        let mut state = match self.mode {
            ResourceMode::Managed => self.add(&path, plan, diags).await?,
            ResourceMode::Default => self.adopt(&path, plan, diags).await?,
        };

        let schema = self.schema();
        set_state_values_not_returned_by_api(&schema, plan, &mut state);
        resolve_unknown_values(&schema, &mut state);
        set_last_updated(&mut state);
        Some(state)
    }

    async fn add(
        &self,
        path: &ObjectPath,
        plan: &R::Model,
        diags: &mut Diagnostics,
    ) -> Option<R::Model> {
        let summary = format!("An error occurred while creating the {}", R::DISPLAY_NAME);
        let body = match R::add_request(plan) {
            Ok(body) => body,
            Err(e) => {
                diags.add_error(&summary, format!("Failed to build add request: {}", e));
                return None;
            }
        };
        log_request("Add request", &body);

        let response = match self.api.add(path, body).await {
            Ok(response) => response,
            Err(e) => {
                report_http_error(diags, &summary, &e);
                return None;
            }
        };

        let mut state = plan.clone();
        self.apply_response(&response, &mut state, Some(plan), &summary, diags)?;
        Some(state)
    }

    async fn adopt(
        &self,
        path: &ObjectPath,
        plan: &R::Model,
        diags: &mut Diagnostics,
    ) -> Option<R::Model> {
        let read_summary = format!("An error occurred while getting the {}", R::DISPLAY_NAME);
        let existing = match self.api.get(path).await {
            Ok(existing) => existing,
            Err(e) => {
                report_http_error(diags, &read_summary, &e);
                return None;
            }
        };

        // Diff against what the server holds, not the plan, so attributes the
        // API never returns are still sent
        let mut current = R::Model::default();
        self.apply_response(&existing, &mut current, Some(plan), &read_summary, diags)?;

        let operations = R::create_operations(plan, &current);
        if operations.is_empty() {
            debug!("Default {} '{}' already matches the plan", R::DISPLAY_NAME, path);
            let mut state = plan.clone();
            self.apply_response(&existing, &mut state, Some(plan), &read_summary, diags)?;
            return Some(state);
        }

        let summary = format!("An error occurred while updating the {}", R::DISPLAY_NAME);
        let request = UpdateRequest::new(operations);
        log_request("Update request", &request);
        let response = match self.api.update(path, &request).await {
            Ok(response) => response,
            Err(e) => {
                report_http_error(diags, &summary, &e);
                return None;
            }
        };

        let mut state = plan.clone();
        self.apply_response(&response, &mut state, Some(plan), &summary, diags)?;
        Some(state)
    }

    /// Refresh `state` from the server.
    ///
    /// A managed object that no longer exists is reported as
    /// [`ReadOutcome::Removed`]; a missing default object is an error since
    /// server built-ins are expected to always exist.
    pub async fn read(
        &self,
        state: &R::Model,
        diags: &mut Diagnostics,
    ) -> Option<ReadOutcome<R::Model>> {
        let path = R::object_path(state);
        let summary = format!("An error occurred while getting the {}", R::DISPLAY_NAME);

        let response = match self.api.get(&path).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() && self.mode == ResourceMode::Managed => {
                warn!(
                    "{} '{}' not found on the server, removing it from state",
                    R::DISPLAY_NAME,
                    path
                );
                diags.add_warning(
                    format!("{} not found", R::DISPLAY_NAME),
                    format!(
                        "The {} '{}' no longer exists on the server. It has been removed from state.",
                        R::DISPLAY_NAME,
                        path
                    ),
                );
                return Some(ReadOutcome::Removed);
            }
            Err(e) => {
                report_http_error(diags, &summary, &e);
                return None;
            }
        };

        let mut refreshed = state.clone();
        self.apply_response(&response, &mut refreshed, Some(state), &summary, diags)?;
        Some(ReadOutcome::Present(refreshed))
    }

    /// Apply the difference between `plan` and `state`.
    ///
    /// When nothing changed no request is sent.
    pub async fn update(
        &self,
        plan: &R::Model,
        state: &R::Model,
        diags: &mut Diagnostics,
    ) -> Option<R::Model> {
        let path = R::object_path(plan);
        let schema = self.schema();
        let mut updated = plan.clone();

        let operations = R::create_operations(plan, state);
        if operations.is_empty() {
            warn!(
                "No configuration API operations created for update of {} '{}'",
                R::DISPLAY_NAME,
                path
            );
            fill_unknowns_from_state(&schema, &mut updated, state);
            resolve_unknown_values(&schema, &mut updated);
            return Some(updated);
        }

        let request_id = Uuid::new_v4();
        info!(
            "Updating {} '{}' with {} operations (request: '{}')",
            R::DISPLAY_NAME,
            path,
            operations.len(),
            request_id
        );
        let summary = format!("An error occurred while updating the {}", R::DISPLAY_NAME);
        let request = UpdateRequest::new(operations);
        log_request("Update request", &request);

        let response = match self.api.update(&path, &request).await {
            Ok(response) => response,
            Err(e) => {
                report_http_error(diags, &summary, &e);
                return None;
            }
        };

        self.apply_response(&response, &mut updated, Some(plan), &summary, diags)?;
        set_state_values_not_returned_by_api(&schema, plan, &mut updated);
        resolve_unknown_values(&schema, &mut updated);
        set_last_updated(&mut updated);
        Some(updated)
    }

    /// Delete the object. Default resources are only forgotten.
    pub async fn delete(&self, state: &R::Model, diags: &mut Diagnostics) {
        let path = R::object_path(state);
        if self.mode == ResourceMode::Default {
            debug!(
                "{} '{}' is a server built-in; removing it from state without deleting it",
                R::DISPLAY_NAME,
                path
            );
            return;
        }

        info!("Deleting {} '{}'", R::DISPLAY_NAME, path);
        match self.api.delete(&path).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!("{} '{}' was already deleted", R::DISPLAY_NAME, path);
            }
            Err(e) => report_http_error(
                diags,
                &format!("An error occurred while deleting the {}", R::DISPLAY_NAME),
                &e,
            ),
        }
    }

    /// Seed a state model from an import ID.
    ///
    /// The caller follows up with [`read`](Self::read) to fill in the rest.
    pub fn import_state(&self, id: &str, diags: &mut Diagnostics) -> Option<R::Model> {
        let mut model = R::Model::default();
        let attributes = R::IMPORT_ID_ATTRIBUTES;

        if attributes.is_empty() {
            model.set_attribute("id", AttrValue::String(TfString::known(id)));
            return Some(model);
        }

        let segments: Vec<&str> = id.split('/').collect();
        if segments.len() != attributes.len() || segments.iter().any(|s| s.is_empty()) {
            diags.add_error(
                "Unexpected Import Identifier",
                format!(
                    "Expected import identifier with format: {}. Got: {}",
                    R::import_id_format(),
                    id
                ),
            );
            return None;
        }

        for (attribute, segment) in attributes.iter().zip(&segments) {
            model.set_attribute(attribute, AttrValue::String(TfString::known(*segment)));
        }
        if let Some(name) = segments.last() {
            model.set_attribute("id", AttrValue::String(TfString::known(*name)));
        }
        Some(model)
    }

    fn apply_response(
        &self,
        response: &Value,
        state: &mut R::Model,
        expected: Option<&R::Model>,
        summary: &str,
        diags: &mut Diagnostics,
    ) -> Option<()> {
        trace!("{} response: {}", R::DISPLAY_NAME, response);
        let decoded: R::Response = match serde_json::from_value(response.clone()) {
            Ok(decoded) => decoded,
            Err(e) => {
                diags.add_error(
                    summary,
                    format!("Failed to decode the {} response: {}", R::DISPLAY_NAME, e),
                );
                return None;
            }
        };
        R::read_response(&decoded, state, expected);
        read_messages(response, state);
        Some(())
    }
}

/// Debug-log a request body. Serialization failures are ignored.
fn log_request<T: Serialize>(label: &str, body: &T) {
    if let Ok(json) = serde_json::to_string_pretty(body) {
        debug!("{}: {}", label, json);
    }
}
