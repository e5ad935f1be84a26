//! Provider configuration.
//!
//! Connection settings for the PingDirectory configuration API. Values may be
//! set explicitly through [`ProviderConfigBuilder`] or picked up from the
//! environment; explicit values win.
//!
//! | Setting | Environment variable |
//! |---|---|
//! | `https_host` | `PINGDIRECTORY_PROVIDER_HTTPS_HOST` |
//! | `username` | `PINGDIRECTORY_PROVIDER_USERNAME` |
//! | `password` | `PINGDIRECTORY_PROVIDER_PASSWORD` |
//! | `insecure_trust_all_tls` | `PINGDIRECTORY_PROVIDER_INSECURE_TRUST_ALL_TLS` |
//! | `product_version` | `PINGDIRECTORY_PROVIDER_PRODUCT_VERSION` |

use crate::error::{ConfigError, ConfigResult};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const HTTPS_HOST_ENV: &str = "PINGDIRECTORY_PROVIDER_HTTPS_HOST";
pub const USERNAME_ENV: &str = "PINGDIRECTORY_PROVIDER_USERNAME";
pub const PASSWORD_ENV: &str = "PINGDIRECTORY_PROVIDER_PASSWORD";
pub const INSECURE_TRUST_ALL_TLS_ENV: &str = "PINGDIRECTORY_PROVIDER_INSECURE_TRUST_ALL_TLS";
pub const PRODUCT_VERSION_ENV: &str = "PINGDIRECTORY_PROVIDER_PRODUCT_VERSION";

/// PingDirectory product version, `major.minor.patch.build`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProductVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub build: u32,
}

impl ProductVersion {
    pub const fn new(major: u32, minor: u32, patch: u32, build: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            build,
        }
    }

    pub fn is_supported(&self) -> bool {
        SUPPORTED_VERSIONS.contains(self)
    }
}

/// Versions the provider has been verified against.
pub const SUPPORTED_VERSIONS: &[ProductVersion] = &[
    ProductVersion::new(9, 1, 0, 0),
    ProductVersion::new(9, 1, 0, 1),
    ProductVersion::new(9, 1, 0, 2),
    ProductVersion::new(9, 2, 0, 0),
    ProductVersion::new(9, 2, 0, 1),
    ProductVersion::new(9, 3, 0, 0),
    ProductVersion::new(10, 0, 0, 0),
];

impl Ord for ProductVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch, self.build).cmp(&(
            other.major,
            other.minor,
            other.patch,
            other.build,
        ))
    }
}

impl PartialOrd for ProductVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ProductVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.major, self.minor, self.patch, self.build)
    }
}

impl FromStr for ProductVersion {
    type Err = ConfigError;

    /// Accepts two to four dot-separated components; missing ones are zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if !(2..=4).contains(&parts.len()) {
            return Err(ConfigError::invalid(
                "product_version",
                format!("'{}' must have the form major.minor[.patch[.build]]", s),
            ));
        }

        let mut numbers = [0u32; 4];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| {
                ConfigError::invalid(
                    "product_version",
                    format!("'{}' contains a non-numeric component '{}'", s, part),
                )
            })?;
        }

        Ok(Self::new(numbers[0], numbers[1], numbers[2], numbers[3]))
    }
}

/// Validated provider configuration.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Base URL of the server, e.g. `https://localhost:1443`
    pub https_host: String,
    pub username: String,
    pub password: String,
    /// Skip TLS certificate verification
    pub insecure_trust_all_tls: bool,
    pub product_version: ProductVersion,
    /// Per-request timeout; `None` keeps the HTTP client default
    pub request_timeout: Option<Duration>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("https_host", &self.https_host)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("insecure_trust_all_tls", &self.insecure_trust_all_tls)
            .field("product_version", &self.product_version)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ProviderConfig {
    pub fn builder() -> ProviderConfigBuilder {
        ProviderConfigBuilder::default()
    }

    /// Build the configuration from environment variables only.
    pub fn from_env() -> ConfigResult<Self> {
        Self::builder().build()
    }
}

/// Builder for [`ProviderConfig`].
#[derive(Debug, Clone, Default)]
pub struct ProviderConfigBuilder {
    https_host: Option<String>,
    username: Option<String>,
    password: Option<String>,
    insecure_trust_all_tls: Option<bool>,
    product_version: Option<String>,
    request_timeout: Option<Duration>,
}

impl ProviderConfigBuilder {
    pub fn https_host(mut self, https_host: impl Into<String>) -> Self {
        self.https_host = Some(https_host.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn insecure_trust_all_tls(mut self, insecure: bool) -> Self {
        self.insecure_trust_all_tls = Some(insecure);
        self
    }

    pub fn product_version(mut self, version: impl Into<String>) -> Self {
        self.product_version = Some(version.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Build using the process environment for unset values.
    pub fn build(self) -> ConfigResult<ProviderConfig> {
        self.build_with_lookup(|key| std::env::var(key).ok())
    }

    /// Build using `lookup` to resolve unset values.
    pub fn build_with_lookup<F>(self, lookup: F) -> ConfigResult<ProviderConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let resolve = |explicit: Option<String>, setting: &'static str, env_var: &'static str| {
            explicit
                .or_else(|| lookup(env_var))
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingSetting { setting, env_var })
        };

        let https_host = resolve(self.https_host, "https_host", HTTPS_HOST_ENV)?;
        if !https_host.starts_with("https://") {
            return Err(ConfigError::invalid(
                "https_host",
                format!("'{}' must start with https://", https_host),
            ));
        }

        let username = resolve(self.username, "username", USERNAME_ENV)?;
        let password = resolve(self.password, "password", PASSWORD_ENV)?;

        let insecure_trust_all_tls = match self.insecure_trust_all_tls {
            Some(value) => value,
            None => match lookup(INSECURE_TRUST_ALL_TLS_ENV) {
                Some(raw) => raw.trim().parse::<bool>().map_err(|_| {
                    ConfigError::invalid(
                        "insecure_trust_all_tls",
                        format!("'{}' is not a boolean", raw),
                    )
                })?,
                None => false,
            },
        };

        let raw_version = resolve(self.product_version, "product_version", PRODUCT_VERSION_ENV)?;
        let product_version: ProductVersion = raw_version.parse()?;
        if !product_version.is_supported() {
            return Err(ConfigError::UnsupportedVersion {
                version: raw_version,
                supported: SUPPORTED_VERSIONS.iter().map(ToString::to_string).collect(),
            });
        }

        Ok(ProviderConfig {
            https_host: https_host.trim_end_matches('/').to_string(),
            username,
            password,
            insecure_trust_all_tls,
            product_version,
            request_timeout: self.request_timeout,
        })
    }
}
