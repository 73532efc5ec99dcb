//! Error type definitions and conversions

use super::AppError;

// Implement From traits for common error types
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            operation: "io_operation".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::ConfigParse {
            message: format!("Failed to parse config file: {err}"),
            line: err.location().map(|loc| loc.line()),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let status_code = err.status().map(|s| s.as_u16());
        Self::HttpClient {
            message: err.to_string(),
            status_code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_error_keeps_line() {
        let err = serde_yaml::from_str::<crate::config::AppConfig>("server:\n  port: [1\n")
            .map_err(AppError::from)
            .unwrap_err();
        match err {
            AppError::ConfigParse { message, line } => {
                assert!(message.starts_with("Failed to parse config file"));
                assert!(line.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
