//! Lifecycle of a single resource instance.
//!
//! [`ResourceInstance`] holds one object's state and drives the adapter the
//! way Terraform does across `plan`, `apply`, `refresh`, `destroy` and
//! `import`, including destroy-then-create replacement.

use crate::client::ConfigApi;
use crate::diagnostics::Diagnostics;
use crate::resource::{ConfigResource, PlannedChange, ReadOutcome, ResourceAdapter};
use log::{debug, info};

/// Lifecycle position of a resource instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// No state and no plan yet
    Unknown,
    /// A plan is waiting to be applied
    Planned,
    Created,
    Read,
    Updated,
    /// Removed from state, either destroyed or gone from the server
    Deleted,
}

pub struct ResourceInstance<'a, R: ConfigResource, A: ConfigApi> {
    adapter: &'a ResourceAdapter<R, A>,
    lifecycle: Lifecycle,
    before_plan: Lifecycle,
    state: Option<R::Model>,
    pending: Option<PlannedChange<R::Model>>,
}

impl<'a, R: ConfigResource, A: ConfigApi> ResourceInstance<'a, R, A> {
    pub fn new(adapter: &'a ResourceAdapter<R, A>) -> Self {
        Self {
            adapter,
            lifecycle: Lifecycle::Unknown,
            before_plan: Lifecycle::Unknown,
            state: None,
            pending: None,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn state(&self) -> Option<&R::Model> {
        self.state.as_ref()
    }

    pub fn pending(&self) -> Option<&PlannedChange<R::Model>> {
        self.pending.as_ref()
    }

    /// Plan `config` against the current state.
    pub fn plan(&mut self, config: R::Model, diags: &mut Diagnostics) -> bool {
        let Some(change) = self.adapter.plan(config, self.state.as_ref(), diags) else {
            return false;
        };
        if change.requires_replace() {
            info!(
                "{} must be replaced, changed: {}",
                self.adapter.type_name(),
                change.requires_replace.join(", ")
            );
        }
        if self.lifecycle != Lifecycle::Planned {
            self.before_plan = self.lifecycle;
        }
        self.pending = Some(change);
        self.lifecycle = Lifecycle::Planned;
        true
    }

    /// Apply the pending plan.
    ///
    /// Without state the object is created. A plan that changes a
    /// replace-only attribute deletes and recreates it; anything else is
    /// an update. On failure the state is kept and the plan discarded.
    pub async fn apply(&mut self, diags: &mut Diagnostics) -> bool {
        let Some(change) = self.pending.take() else {
            diags.add_error("No plan to apply", "Plan the resource before applying it.");
            return false;
        };

        let (result, lifecycle) = match self.state.take() {
            None => (
                self.adapter.create(&change.planned, diags).await,
                Lifecycle::Created,
            ),
            Some(state) if change.requires_replace() => {
                self.adapter.delete(&state, diags).await;
                if diags.has_error() {
                    self.state = Some(state);
                    self.lifecycle = self.before_plan;
                    return false;
                }
                (
                    self.adapter.create(&change.planned, diags).await,
                    Lifecycle::Created,
                )
            }
            Some(state) => {
                let result = self.adapter.update(&change.planned, &state, diags).await;
                if result.is_none() {
                    self.state = Some(state);
                }
                (result, Lifecycle::Updated)
            }
        };

        match result {
            Some(new_state) => {
                self.state = Some(new_state);
                self.lifecycle = lifecycle;
                true
            }
            None => {
                self.lifecycle = if self.state.is_some() {
                    self.before_plan
                } else {
                    Lifecycle::Unknown
                };
                false
            }
        }
    }

    /// Refresh state from the server.
    pub async fn refresh(&mut self, diags: &mut Diagnostics) -> bool {
        let Some(state) = self.state.as_ref() else {
            diags.add_error(
                "No state to refresh",
                "The resource has not been created or imported.",
            );
            return false;
        };
        match self.adapter.read(state, diags).await {
            Some(ReadOutcome::Present(refreshed)) => {
                self.state = Some(refreshed);
                self.lifecycle = Lifecycle::Read;
                true
            }
            Some(ReadOutcome::Removed) => {
                self.state = None;
                self.pending = None;
                self.lifecycle = Lifecycle::Deleted;
                true
            }
            None => false,
        }
    }

    /// Destroy the object and drop it from state.
    pub async fn destroy(&mut self, diags: &mut Diagnostics) -> bool {
        let Some(state) = self.state.as_ref() else {
            debug!("{} has no state, nothing to destroy", self.adapter.type_name());
            return true;
        };
        self.adapter.delete(state, diags).await;
        if diags.has_error() {
            return false;
        }
        self.state = None;
        self.pending = None;
        self.lifecycle = Lifecycle::Deleted;
        true
    }

    /// Import an existing object by ID and read it into state.
    pub async fn import(&mut self, id: &str, diags: &mut Diagnostics) -> bool {
        if self.state.is_some() {
            diags.add_error(
                "Resource already managed",
                format!(
                    "{} already has state; it cannot be imported again.",
                    self.adapter.type_name()
                ),
            );
            return false;
        }
        let Some(seed) = self.adapter.import_state(id, diags) else {
            return false;
        };
        match self.adapter.read(&seed, diags).await {
            Some(ReadOutcome::Present(state)) => {
                self.state = Some(state);
                self.lifecycle = Lifecycle::Read;
                true
            }
            Some(ReadOutcome::Removed) => {
                diags.add_error(
                    "Cannot import non-existent remote object",
                    format!("No {} exists with import ID \"{}\".", R::DISPLAY_NAME, id),
                );
                false
            }
            None => false,
        }
    }
}
