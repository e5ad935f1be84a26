//! Read-only data sources.

use crate::client::ConfigApi;
use crate::diagnostics::{Diagnostics, report_http_error};
use crate::resource::mapper::resolve_unknown_values;
use crate::resource::{ConfigResource, ResourceMode};
use crate::schema::{AttrValue, Model, Schema};
use crate::values::is_non_empty_string;
use log::{info, trace};
use std::marker::PhantomData;
use std::sync::Arc;

/// Data source looking up one existing configuration object.
///
/// The lookup keys are the resource's import ID attributes. A missing object
/// is always an error.
pub struct DataSourceAdapter<R: ConfigResource, A: ConfigApi> {
    api: Arc<A>,
    _resource: PhantomData<fn() -> R>,
}

impl<R: ConfigResource, A: ConfigApi> Clone for DataSourceAdapter<R, A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            _resource: PhantomData,
        }
    }
}

impl<R: ConfigResource, A: ConfigApi> DataSourceAdapter<R, A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            _resource: PhantomData,
        }
    }

    pub fn type_name(&self) -> String {
        R::type_name(ResourceMode::Managed)
    }

    pub fn schema(&self) -> Schema {
        R::schema(ResourceMode::Managed).for_data_source(R::IMPORT_ID_ATTRIBUTES)
    }

    pub async fn read(&self, config: &R::Model, diags: &mut Diagnostics) -> Option<R::Model> {
        for key in R::IMPORT_ID_ATTRIBUTES {
            let present = matches!(
                config.attribute(key),
                Some(AttrValue::String(ref v)) if is_non_empty_string(v)
            );
            if !present {
                diags.add_attribute_error(
                    *key,
                    "Missing required argument",
                    format!(
                        "The argument \"{}\" is required to look up a {}.",
                        key,
                        R::DISPLAY_NAME
                    ),
                );
            }
        }
        if diags.has_error() {
            return None;
        }

        let path = R::object_path(config);
        info!("Reading {} data source '{}'", R::DISPLAY_NAME, path);
        let summary = format!("An error occurred while getting the {}", R::DISPLAY_NAME);
        let response = match self.api.get(&path).await {
            Ok(response) => response,
            Err(e) => {
                report_http_error(diags, &summary, &e);
                return None;
            }
        };
        trace!("{} response: {}", R::DISPLAY_NAME, response);

        let decoded: R::Response = match serde_json::from_value(response) {
            Ok(decoded) => decoded,
            Err(e) => {
                diags.add_error(
                    &summary,
                    format!("Failed to decode the {} response: {}", R::DISPLAY_NAME, e),
                );
                return None;
            }
        };

        let mut state = config.clone();
        R::read_response(&decoded, &mut state, None);
        resolve_unknown_values(&self.schema(), &mut state);
        Some(state)
    }
}
