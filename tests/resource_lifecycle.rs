//! CRUD lifecycle of managed resources against the in-memory server.

mod common;

use common::*;
use pingdirectory_provider::client::{ConfigApi, ObjectPath, RecordedRequest};
use pingdirectory_provider::resources::{
    ConjurAuthenticationMethod, ConsentDefinition, ConsentDefinitionLocalization, KeyPair,
    TrustedCertificate, TrustedCertificateModel,
};
use pingdirectory_provider::values::{TfString, TfStringSet};
use pingdirectory_provider::{
    Diagnostics, Lifecycle, Operation, ProductVersion, ReadOutcome, ResourceInstance, Severity,
    UpdateRequest,
};
use serde_json::json;

fn request(method: &'static str, path: &str) -> RecordedRequest {
    RecordedRequest {
        method,
        path: path.to_string(),
    }
}

#[tokio::test]
async fn test_create_then_read_round_trips() {
    let provider = in_memory_provider();
    let adapter = provider.resource::<TrustedCertificate>();
    let mut diags = Diagnostics::new();

    let planned = adapter
        .plan(trusted_certificate("ca"), None, &mut diags)
        .unwrap();
    let state = adapter.create(&planned.planned, &mut diags).await.unwrap();
    assert_no_errors(&diags);

    assert_eq!(state.id, TfString::known("ca"));
    assert_eq!(state.name, TfString::known("ca"));
    assert_eq!(state.certificate, TfString::known(TEST_CERTIFICATE));
    assert!(state.last_updated.value_str().ends_with("UTC"));
    assert_eq!(state.notifications, TfStringSet::from_values(Vec::<String>::new()));

    let refreshed = adapter.read(&state, &mut diags).await.unwrap();
    assert_eq!(refreshed, ReadOutcome::Present(state));
    assert_eq!(
        provider.api().requests().await,
        vec![
            request("POST", "trusted-certificates"),
            request("GET", "trusted-certificates/ca"),
        ]
    );
}

#[tokio::test]
async fn test_unchanged_update_sends_no_requests() {
    let provider = in_memory_provider();
    let adapter = provider.resource::<TrustedCertificate>();
    let mut diags = Diagnostics::new();

    let planned = adapter
        .plan(trusted_certificate("ca"), None, &mut diags)
        .unwrap();
    let state = adapter.create(&planned.planned, &mut diags).await.unwrap();
    provider.api().clear_requests().await;

    let replanned = adapter
        .plan(trusted_certificate("ca"), Some(&state), &mut diags)
        .unwrap();
    assert!(!replanned.requires_replace());
    let updated = adapter
        .update(&replanned.planned, &state, &mut diags)
        .await
        .unwrap();

    assert_no_errors(&diags);
    assert_eq!(updated, state);
    assert!(provider.api().requests().await.is_empty());
}

#[tokio::test]
async fn test_description_update_is_patched() {
    let provider = in_memory_provider();
    let adapter = provider.resource::<ConsentDefinition>();
    let mut diags = Diagnostics::new();

    let planned = adapter
        .plan(consent_definition("marketing"), None, &mut diags)
        .unwrap();
    let state = adapter.create(&planned.planned, &mut diags).await.unwrap();
    assert_eq!(state.description, TfString::Null);
    provider.api().clear_requests().await;

    let mut config = consent_definition("marketing");
    config.description = TfString::known("x");
    config.parameter = TfStringSet::from_values(["channel=sms"]);
    let replanned = adapter.plan(config, Some(&state), &mut diags).unwrap();
    let updated = adapter
        .update(&replanned.planned, &state, &mut diags)
        .await
        .unwrap();
    assert_no_errors(&diags);

    assert_eq!(updated.description, TfString::known("x"));
    assert_eq!(updated.parameter, TfStringSet::from_values(["channel=sms"]));
    assert_eq!(
        provider.api().requests().await,
        vec![request("PATCH", "consent-definitions/marketing")]
    );

    let stored = provider
        .api()
        .object(&ObjectPath::new("consent-definitions", "marketing"))
        .await
        .unwrap();
    assert_eq!(stored["description"], "x");
    assert_eq!(stored["parameter"], json!(["channel=sms"]));
}

#[tokio::test]
async fn test_clearing_an_attribute_removes_it() {
    let provider = in_memory_provider();
    let adapter = provider.resource::<ConsentDefinition>();
    let mut diags = Diagnostics::new();

    let mut config = consent_definition("marketing");
    config.description = TfString::known("Marketing emails");
    let planned = adapter.plan(config, None, &mut diags).unwrap();
    let state = adapter.create(&planned.planned, &mut diags).await.unwrap();

    let replanned = adapter
        .plan(consent_definition("marketing"), Some(&state), &mut diags)
        .unwrap();
    let updated = adapter
        .update(&replanned.planned, &state, &mut diags)
        .await
        .unwrap();
    assert_no_errors(&diags);

    assert_eq!(updated.description, TfString::Null);
    let stored = provider
        .api()
        .object(&ObjectPath::new("consent-definitions", "marketing"))
        .await
        .unwrap();
    assert!(stored.get("description").is_none());
}

#[tokio::test]
async fn test_secrets_are_kept_from_plan() {
    let provider = in_memory_provider();
    let adapter = provider.resource::<ConjurAuthenticationMethod>();
    let mut diags = Diagnostics::new();
    let path = ObjectPath::new("conjur-authentication-methods", "conjur");

    let planned = adapter.plan(conjur_method("conjur"), None, &mut diags).unwrap();
    let state = adapter.create(&planned.planned, &mut diags).await.unwrap();
    assert_no_errors(&diags);
    assert_eq!(state.password, TfString::known("conjur-secret"));
    assert!(provider.api().get(&path).await.unwrap().get("password").is_none());

    let Some(ReadOutcome::Present(refreshed)) = adapter.read(&state, &mut diags).await else {
        panic!("expected the method to exist");
    };
    assert_eq!(refreshed.password, TfString::known("conjur-secret"));

    let mut config = conjur_method("conjur");
    config.password = TfString::known("rotated");
    let replanned = adapter.plan(config, Some(&refreshed), &mut diags).unwrap();
    let updated = adapter
        .update(&replanned.planned, &refreshed, &mut diags)
        .await
        .unwrap();
    assert_no_errors(&diags);
    assert_eq!(updated.password, TfString::known("rotated"));
    assert_eq!(provider.api().object(&path).await.unwrap()["password"], "rotated");
}

#[tokio::test]
async fn test_validation_errors_stop_before_network() {
    let provider = in_memory_provider();
    let adapter = provider.resource::<TrustedCertificate>();
    let mut diags = Diagnostics::new();

    let config = TrustedCertificateModel {
        name: TfString::known("ca"),
        ..Default::default()
    };
    assert!(adapter.plan(config, None, &mut diags).is_none());

    let error = diags.errors().next().unwrap();
    assert_eq!(error.summary, "Missing required argument");
    assert_eq!(error.attribute.as_deref(), Some("certificate"));
    assert!(provider.api().requests().await.is_empty());
}

#[tokio::test]
async fn test_minimum_product_version_enforced() {
    let provider = in_memory_provider().with_product_version(ProductVersion::new(9, 1, 0, 0));
    let adapter = provider.resource::<ConjurAuthenticationMethod>();
    let mut diags = Diagnostics::new();

    assert!(adapter.plan(conjur_method("conjur"), None, &mut diags).is_none());
    assert_eq!(
        diags.errors().next().map(|d| d.summary.as_str()),
        Some("Unsupported resource for product version")
    );

    let supported = in_memory_provider().with_product_version(ProductVersion::new(9, 3, 0, 0));
    let mut diags = Diagnostics::new();
    assert!(supported
        .resource::<ConjurAuthenticationMethod>()
        .plan(conjur_method("conjur"), None, &mut diags)
        .is_some());
}

#[tokio::test]
async fn test_http_errors_include_response_body() {
    let provider = in_memory_provider();
    provider
        .api()
        .seed(
            &ObjectPath::new("trusted-certificates", "ca"),
            json!({"certificate": TEST_CERTIFICATE}),
        )
        .await;
    let adapter = provider.resource::<TrustedCertificate>();
    let mut diags = Diagnostics::new();

    let planned = adapter
        .plan(trusted_certificate("ca"), None, &mut diags)
        .unwrap();
    assert!(adapter.create(&planned.planned, &mut diags).await.is_none());

    let error = diags.errors().next().unwrap();
    assert_eq!(error.summary, "An error occurred while creating the Trusted Certificate");
    assert!(error.detail.starts_with("409 Conflict"));
    assert!(error.detail.contains("already exists"));
    // One attempt only
    assert_eq!(provider.api().requests().await.len(), 1);
}

#[tokio::test]
async fn test_read_of_deleted_object_removes_it() {
    let provider = in_memory_provider();
    let adapter = provider.resource::<TrustedCertificate>();
    let mut diags = Diagnostics::new();

    let planned = adapter
        .plan(trusted_certificate("ca"), None, &mut diags)
        .unwrap();
    let state = adapter.create(&planned.planned, &mut diags).await.unwrap();
    provider
        .api()
        .delete(&ObjectPath::new("trusted-certificates", "ca"))
        .await
        .unwrap();

    let outcome = adapter.read(&state, &mut diags).await;
    assert_eq!(outcome, Some(ReadOutcome::Removed));
    assert!(!diags.has_error());
    assert_eq!(diags.warnings().count(), 1);
}

#[tokio::test]
async fn test_delete_tolerates_missing_object() {
    let provider = in_memory_provider();
    let adapter = provider.resource::<TrustedCertificate>();
    let mut diags = Diagnostics::new();

    let planned = adapter
        .plan(trusted_certificate("ca"), None, &mut diags)
        .unwrap();
    let state = adapter.create(&planned.planned, &mut diags).await.unwrap();

    adapter.delete(&state, &mut diags).await;
    adapter.delete(&state, &mut diags).await;
    assert!(diags.is_empty());
    assert!(provider
        .api()
        .object(&ObjectPath::new("trusted-certificates", "ca"))
        .await
        .is_none());
}

#[tokio::test]
async fn test_nested_resource_requires_parent() {
    let provider = in_memory_provider();
    let localizations = provider.resource::<ConsentDefinitionLocalization>();
    let mut diags = Diagnostics::new();

    let planned = localizations
        .plan(localization("marketing", "en-US"), None, &mut diags)
        .unwrap();
    assert!(localizations.create(&planned.planned, &mut diags).await.is_none());
    assert!(diags.errors().next().unwrap().detail.starts_with("404 Not Found"));

    let definitions = provider.resource::<ConsentDefinition>();
    let mut diags = Diagnostics::new();
    let parent = definitions
        .plan(consent_definition("marketing"), None, &mut diags)
        .unwrap();
    definitions.create(&parent.planned, &mut diags).await.unwrap();

    let state = localizations.create(&planned.planned, &mut diags).await.unwrap();
    assert_no_errors(&diags);
    assert_eq!(state.id, TfString::known("en-US"));
    assert_eq!(state.consent_definition_name, TfString::known("marketing"));
    assert_eq!(state.title_text, TfString::Null);
}

#[tokio::test]
async fn test_instance_lifecycle() {
    let provider = in_memory_provider();
    let adapter = provider.resource::<ConsentDefinition>();
    let mut instance = ResourceInstance::new(&adapter);
    let mut diags = Diagnostics::new();
    assert_eq!(instance.lifecycle(), Lifecycle::Unknown);

    assert!(instance.plan(consent_definition("marketing"), &mut diags));
    assert_eq!(instance.lifecycle(), Lifecycle::Planned);
    assert!(instance.apply(&mut diags).await);
    assert_eq!(instance.lifecycle(), Lifecycle::Created);

    assert!(instance.refresh(&mut diags).await);
    assert_eq!(instance.lifecycle(), Lifecycle::Read);

    let mut config = consent_definition("marketing");
    config.display_name = TfString::known("Marketing Emails");
    assert!(instance.plan(config, &mut diags));
    assert!(instance.apply(&mut diags).await);
    assert_eq!(instance.lifecycle(), Lifecycle::Updated);
    assert_eq!(
        instance.state().map(|s| s.display_name.clone()),
        Some(TfString::known("Marketing Emails"))
    );

    assert!(instance.destroy(&mut diags).await);
    assert_eq!(instance.lifecycle(), Lifecycle::Deleted);
    assert!(instance.state().is_none());
    assert_no_errors(&diags);
}

#[tokio::test]
async fn test_instance_drops_state_deleted_out_of_band() {
    let provider = in_memory_provider();
    let adapter = provider.resource::<TrustedCertificate>();
    let mut instance = ResourceInstance::new(&adapter);
    let mut diags = Diagnostics::new();

    assert!(instance.plan(trusted_certificate("ca"), &mut diags));
    assert!(instance.apply(&mut diags).await);
    provider
        .api()
        .delete(&ObjectPath::new("trusted-certificates", "ca"))
        .await
        .unwrap();

    assert!(instance.refresh(&mut diags).await);
    assert_eq!(instance.lifecycle(), Lifecycle::Deleted);
    assert!(instance.state().is_none());
    assert!(diags.iter().all(|d| d.severity == Severity::Warning));
}

#[tokio::test]
async fn test_replace_only_change_recreates_key_pair() {
    let provider = in_memory_provider();
    let adapter = provider.resource::<KeyPair>();
    let mut instance = ResourceInstance::new(&adapter);
    let mut diags = Diagnostics::new();

    assert!(instance.plan(key_pair("server-cert"), &mut diags));
    assert!(instance.apply(&mut diags).await);
    assert_eq!(
        instance.state().map(|s| s.key_algorithm.clone()),
        Some(TfString::known("RSA_2048"))
    );
    provider.api().clear_requests().await;

    let mut config = key_pair("server-cert");
    config.key_algorithm = TfString::known("EC_256");
    assert!(instance.plan(config, &mut diags));
    assert_eq!(
        instance.pending().map(|p| p.requires_replace.clone()),
        Some(vec!["key_algorithm"])
    );
    assert!(instance.apply(&mut diags).await);
    assert_no_errors(&diags);

    assert_eq!(instance.lifecycle(), Lifecycle::Created);
    assert_eq!(
        provider.api().requests().await,
        vec![
            request("DELETE", "key-pairs/server-cert"),
            request("POST", "key-pairs"),
        ]
    );
    let stored = provider
        .api()
        .object(&ObjectPath::new("key-pairs", "server-cert"))
        .await
        .unwrap();
    assert_eq!(stored["keyAlgorithm"], "EC_256");
}

#[tokio::test]
async fn test_replacement_does_not_reuse_old_certificate_chain() {
    let provider = in_memory_provider();
    let adapter = provider.resource::<KeyPair>();
    let mut instance = ResourceInstance::new(&adapter);
    let mut diags = Diagnostics::new();
    let path = ObjectPath::new("key-pairs", "server-cert");

    assert!(instance.plan(key_pair("server-cert"), &mut diags));
    assert!(instance.apply(&mut diags).await);
    provider
        .api()
        .update(
            &path,
            &UpdateRequest::new(vec![Operation::replace("certificateChain", "OLD-RSA-CHAIN")]),
        )
        .await
        .unwrap();
    assert!(instance.refresh(&mut diags).await);
    assert_eq!(
        instance.state().map(|s| s.certificate_chain.clone()),
        Some(TfString::known("OLD-RSA-CHAIN"))
    );

    let mut config = key_pair("server-cert");
    config.key_algorithm = TfString::known("EC_256");
    assert!(instance.plan(config, &mut diags));
    assert_eq!(
        instance.pending().map(|p| p.planned.certificate_chain.clone()),
        Some(TfString::Unknown)
    );
    assert!(instance.apply(&mut diags).await);
    assert_no_errors(&diags);

    let stored = provider.api().object(&path).await.unwrap();
    assert_eq!(stored["keyAlgorithm"], "EC_256");
    assert!(stored.get("certificateChain").is_none());
    assert_eq!(
        instance.state().map(|s| s.certificate_chain.clone()),
        Some(TfString::Null)
    );
}

#[tokio::test]
async fn test_failed_apply_keeps_state() {
    let provider = in_memory_provider();
    let adapter = provider.resource::<TrustedCertificate>();
    let mut instance = ResourceInstance::new(&adapter);
    let mut diags = Diagnostics::new();

    assert!(instance.plan(trusted_certificate("ca"), &mut diags));
    assert!(instance.apply(&mut diags).await);
    let before = instance.state().cloned();
    provider
        .api()
        .delete(&ObjectPath::new("trusted-certificates", "ca"))
        .await
        .unwrap();

    let mut config = trusted_certificate("ca");
    config.certificate = TfString::known("-----BEGIN CERTIFICATE-----\nrotated");
    assert!(instance.plan(config, &mut diags));
    assert!(!instance.apply(&mut diags).await);

    assert!(diags.has_error());
    assert_eq!(instance.state().cloned(), before);
    assert_eq!(instance.lifecycle(), Lifecycle::Created);
}
