//! Shared fixtures for integration tests.
//!
//! Every test runs against a fresh in-memory configuration server that knows
//! the schema of each registered collection.

#![allow(dead_code)]

use pingdirectory_provider::client::InMemoryConfigApi;
use pingdirectory_provider::resources::{
    ConjurAuthenticationMethodModel, ConsentDefinitionLocalizationModel, ConsentDefinitionModel,
    KeyPairModel, TrustedCertificateModel,
};
use pingdirectory_provider::values::{TfString, TfStringSet};
use pingdirectory_provider::{ConfiguredProvider, Diagnostics, Provider};

pub const TEST_CERTIFICATE: &str = "-----BEGIN CERTIFICATE-----\nMIIBszCCAVmgAwIBAgIUTest\n-----END CERTIFICATE-----";

/// Route crate logs to the test output. Safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn in_memory_provider() -> ConfiguredProvider<InMemoryConfigApi> {
    init_logging();
    ConfiguredProvider::with_api(Provider::in_memory_api())
}

/// Panic with every diagnostic when an operation reported errors.
pub fn assert_no_errors(diags: &Diagnostics) {
    assert!(
        !diags.has_error(),
        "unexpected diagnostics: {:?}",
        diags.iter().map(ToString::to_string).collect::<Vec<_>>()
    );
}

pub fn trusted_certificate(name: &str) -> TrustedCertificateModel {
    TrustedCertificateModel {
        name: TfString::known(name),
        certificate: TfString::known(TEST_CERTIFICATE),
        ..Default::default()
    }
}

pub fn consent_definition(unique_id: &str) -> ConsentDefinitionModel {
    ConsentDefinitionModel {
        unique_id: TfString::known(unique_id),
        display_name: TfString::known("Marketing"),
        parameter: TfStringSet::from_values(["channel=email"]),
        ..Default::default()
    }
}

pub fn localization(definition: &str, locale: &str) -> ConsentDefinitionLocalizationModel {
    ConsentDefinitionLocalizationModel {
        consent_definition_name: TfString::known(definition),
        locale: TfString::known(locale),
        version: TfString::known("1.0"),
        data_text: TfString::known("Email address"),
        purpose_text: TfString::known("Newsletters"),
        ..Default::default()
    }
}

pub fn conjur_method(name: &str) -> ConjurAuthenticationMethodModel {
    ConjurAuthenticationMethodModel {
        name: TfString::known(name),
        username: TfString::known("host/pingdirectory"),
        password: TfString::known("conjur-secret"),
        ..Default::default()
    }
}

pub fn key_pair(name: &str) -> KeyPairModel {
    KeyPairModel {
        name: TfString::known(name),
        subject_dn: TfString::known("cn=server,o=example"),
        ..Default::default()
    }
}
