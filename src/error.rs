//! Error types for provider operations.
//!
//! Each layer owns its error enum: the configuration API client reports
//! [`ApiError`], provider configuration reports [`ConfigError`], and the
//! resource layer wraps both in [`ProviderError`]. Terraform-facing failures
//! are additionally collected as [`Diagnostics`](crate::diagnostics::Diagnostics).

/// Errors returned by a configuration API backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("{status} {reason}")]
    Http {
        status: u16,
        reason: String,
        body: String,
    },

    /// The request never produced a response (connection, TLS, timeout).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A response body could not be decoded.
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request could not be built.
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },
}

impl ApiError {
    /// Build an HTTP status error.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            reason: reason_phrase(status).to_string(),
            body: body.into(),
        }
    }

    /// Build an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// HTTP status of the failure, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server reported that the object does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Raw response body attached to an HTTP failure.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Http { body, .. } => Some(body),
            _ => None,
        }
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unexpected Status",
    }
}

/// Errors raised while building the provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required setting was neither configured nor found in the environment
    #[error("Missing required provider setting '{setting}' (environment variable {env_var})")]
    MissingSetting {
        setting: &'static str,
        env_var: &'static str,
    },

    /// A setting has an unusable value
    #[error("Invalid value for provider setting '{setting}': {message}")]
    InvalidSetting {
        setting: &'static str,
        message: String,
    },

    /// The product version is well-formed but not supported
    #[error("Unsupported PingDirectory product version '{version}', supported versions: {supported:?}")]
    UnsupportedVersion {
        version: String,
        supported: Vec<String>,
    },
}

impl ConfigError {
    /// Create an invalid setting error
    pub fn invalid(setting: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidSetting {
            setting,
            message: message.into(),
        }
    }
}

/// Main error type for provider operations outside the diagnostics flow.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Configuration API failure
    #[error("Configuration API error: {0}")]
    Api(#[from] ApiError),

    /// Provider configuration failure
    #[error("Provider configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A resource or data source type name that the provider does not register
    #[error("Unknown type name: {0}")]
    UnknownTypeName(String),
}

pub type ApiResult<T> = Result<T, ApiError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_keeps_body() {
        let error = ApiError::http(409, r#"{"detail":"entry already exists"}"#);
        assert_eq!(error.to_string(), "409 Conflict");
        assert_eq!(error.body(), Some(r#"{"detail":"entry already exists"}"#));
    }

    #[test]
    fn test_not_found_detection() {
        assert!(ApiError::http(404, "").is_not_found());
        assert!(!ApiError::http(400, "").is_not_found());
        assert!(!ApiError::invalid_request("bad path").is_not_found());
    }

    #[test]
    fn test_error_chain() {
        let provider_error = ProviderError::from(ApiError::http(500, "boom"));
        assert!(provider_error.to_string().contains("Configuration API error"));
        assert!(provider_error.to_string().contains("500 Internal Server Error"));
    }
}
