//! Error handling for the key selector.
//!
//! Every fallible operation returns [`AppError`]. Errors that reach the
//! operations HTTP surface are rendered as RFC 7807 problem details.

pub mod types;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

/// Standard error response format following RFC 7807 Problem Details
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// A URI reference that identifies the problem type
    #[serde(rename = "type")]
    pub error_type: String,

    /// A short, human-readable summary of the problem type
    pub title: String,

    /// The HTTP status code
    pub status: u16,

    /// A human-readable explanation specific to this occurrence
    pub detail: String,

    /// A URI reference that identifies the specific occurrence
    pub instance: String,

    /// Request ID for tracing
    pub request_id: Option<String>,
}

#[derive(Error, Debug)]
pub enum AppError {
    // Configuration errors
    /// None of the credential environment variables is set.
    #[error("No OpenRouter API keys configured")]
    NoCredentialsConfigured,

    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String, line: Option<usize> },

    // Provider and network errors
    /// A live status check failed. Recovered locally by the selector.
    #[error("Key status check failed for '{label}': {message}")]
    ProviderCheck { label: String, message: String },

    #[error("HTTP client error: {message}")]
    HttpClient { message: String, status_code: Option<u16> },

    #[error("Not found: {0}")]
    NotFound(String),

    // System errors
    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("IO operation failed: {operation} - {message}")]
    Io { operation: String, message: String },
}

impl AppError {
    /// Create a new configuration validation error
    pub fn config_validation(message: impl Into<String>, field: Option<impl Into<String>>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
            field: field.map(Into::into),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ConfigParse { .. } | Self::Serialization { .. } => StatusCode::BAD_REQUEST,

            Self::NotFound(_) | Self::ConfigNotFound { .. } => StatusCode::NOT_FOUND,

            Self::ConfigValidation { .. } | Self::Internal { .. } | Self::Io { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            Self::HttpClient { .. } | Self::ProviderCheck { .. } => StatusCode::BAD_GATEWAY,

            // The outward feature is unavailable until keys are configured.
            Self::NoCredentialsConfigured => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get the error type URI for RFC 7807 compliance
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::NoCredentialsConfigured
            | Self::ConfigValidation { .. }
            | Self::ConfigNotFound { .. }
            | Self::ConfigParse { .. } => "https://openrouter-key-selector.dev/errors/configuration",
            Self::ProviderCheck { .. } | Self::HttpClient { .. } => {
                "https://openrouter-key-selector.dev/errors/provider"
            }
            Self::NotFound(_) => "https://openrouter-key-selector.dev/errors/not-found",
            _ => "https://openrouter-key-selector.dev/errors/internal",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::NoCredentialsConfigured
            | Self::ConfigValidation { .. }
            | Self::ConfigNotFound { .. }
            | Self::ConfigParse { .. } => "Configuration Error",
            Self::ProviderCheck { .. } | Self::HttpClient { .. } => "Provider Error",
            Self::NotFound(_) => "Not Found",
            _ => "Internal Server Error",
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self, request_id: Option<&str>) {
        let request_id = request_id.unwrap_or("unknown");

        if self.status_code().is_server_error() {
            error!(
                error = %self,
                request_id = request_id,
                error_type = self.error_type(),
                "Application error occurred"
            );
        } else {
            warn!(
                error = %self,
                request_id = request_id,
                error_type = self.error_type(),
                "Client error occurred"
            );
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();

        self.log(Some(&request_id));

        let status = self.status_code();
        let error_response = ErrorResponse {
            error_type: self.error_type().to_string(),
            title: self.title().to_string(),
            status: status.as_u16(),
            detail: self.to_string(),
            instance: format!("/errors/{}", request_id),
            request_id: Some(request_id),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_is_service_unavailable() {
        let err = AppError::NoCredentialsConfigured;
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.title(), "Configuration Error");
        assert!(err.error_type().ends_with("/configuration"));
    }

    #[test]
    fn test_provider_check_maps_to_bad_gateway() {
        let err = AppError::ProviderCheck {
            label: "openrouter-one".to_string(),
            message: "HTTP 500".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            err.to_string(),
            "Key status check failed for 'openrouter-one': HTTP 500"
        );
    }

    #[test]
    fn test_config_validation_constructor_keeps_field() {
        match AppError::config_validation("bad port", Some("server.port")) {
            AppError::ConfigValidation { message, field } => {
                assert_eq!(message, "bad port");
                assert_eq!(field.as_deref(), Some("server.port"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
