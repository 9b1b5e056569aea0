// src/error.rs

//! Unified error handling for the listing engine.

use std::fmt;

use thiserror::Error;

/// Result type alias for listing operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Transport failure before a response arrived (includes timeouts)
    #[error("Connection error for {url}: {message}")]
    Connection { url: String, message: String },

    /// A response arrived with a non-success status
    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// The response body was not valid JSON
    #[error("Invalid JSON from {url}: {message}")]
    Parse { url: String, message: String },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be built
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a connection error.
    pub fn connection(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Connection {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create an HTTP status error.
    pub fn http_status(status: u16, url: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            url: url.into(),
        }
    }

    /// Create a JSON body parse error.
    pub fn parse(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Parse {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// The URL the failing fetch targeted, when known.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Connection { url, .. } | Self::HttpStatus { url, .. } | Self::Parse { url, .. } => {
                Some(url)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_errors_carry_url() {
        let err = AppError::http_status(404, "https://example.com/data/materials.json");
        assert_eq!(err.url(), Some("https://example.com/data/materials.json"));
        assert_eq!(
            err.to_string(),
            "HTTP 404 for https://example.com/data/materials.json"
        );
    }

    #[test]
    fn test_ambient_errors_have_no_url() {
        assert!(AppError::config("missing").url().is_none());
    }
}
