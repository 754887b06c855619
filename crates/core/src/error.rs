//! Error types for quickwp-core
//!
//! REST calls never return these: their outcome is a [`crate::RequestResult`].
//! This type covers everything around them (loading configuration, building
//! HTTP clients, staging upload files).

use thiserror::Error;

/// Result type alias for quickwp-core
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for quickwp-core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid configuration format
    #[error("Invalid configuration format: {0}")]
    InvalidConfig(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] toml::de::Error),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Timeout
    #[error("Operation timed out")]
    Timeout,
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else if err.is_connect() {
            Error::Network(err.to_string())
        } else if err.is_builder() || err.is_request() {
            Error::HttpClient(err.to_string())
        } else {
            Error::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::Config("posts_endpoint missing".to_string()).to_string(),
            "Configuration error: posts_endpoint missing"
        );
        assert_eq!(Error::Timeout.to_string(), "Operation timed out");
    }

    #[test]
    fn test_invalid_toml_is_deserialization_error() {
        let err: Error = toml::from_str::<toml::Table>("posts_endpoint = ").unwrap_err().into();
        assert!(matches!(err, Error::Deserialization(_)));
        assert!(err.to_string().starts_with("Deserialization error:"));
    }

    fn kind(err: &Error) -> &'static str {
        match err {
            Error::Config(_) | Error::InvalidConfig(_) | Error::InvalidInput(_) => "config",
            Error::Network(_) | Error::HttpClient(_) | Error::Timeout => "network",
            Error::Io(_) => "io",
            Error::Serialization(_) | Error::Deserialization(_) => "toml",
        }
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(kind(&Error::InvalidConfig("x".to_string())), "config");
        assert_eq!(kind(&Error::Timeout), "network");
        assert_eq!(kind(&Error::Io(std::io::Error::other("x"))), "io");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
