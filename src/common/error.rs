//! Error types for the ztf CLI
//!
//! Remote failures are typed here so the HTTP client can report exactly what
//! went wrong, but the case fetcher collapses all of them except
//! [`Error::LoginFailed`] into an empty result.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the ztf CLI
#[derive(Error, Debug)]
pub enum Error {
    // === Remote Errors ===
    #[error("Failed to establish a session with {0}")]
    Session(String),

    #[error("Failed to log in to the test-management server. Check url/account/password in the config file")]
    LoginFailed,

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Could not decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Server returned an HTML page instead of JSON for {0}")]
    HtmlResponse(String),

    #[error("Server reported status '{status}' for {url}")]
    RemoteStatus { url: String, status: String },

    // === Script Errors ===
    #[error("No case id found in script '{0}'")]
    MissingCaseId(String),

    #[error("Invalid script '{path}': {reason}")]
    InvalidScript { path: String, reason: String },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    #[error("Failed to write file '{path}': {error}")]
    FileWrite { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a transport error for a request URL
    pub fn transport(url: &str, message: impl ToString) -> Self {
        Self::Transport {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a decode error for a request URL
    pub fn decode(url: &str, message: impl ToString) -> Self {
        Self::Decode {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    /// Create an invalid script error
    pub fn invalid_script(path: &str, reason: &str) -> Self {
        Self::InvalidScript {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a file read error from an IO error
    pub fn file_read(path: &std::path::Path, error: io::Error) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Create a file write error from an IO error
    pub fn file_write(path: &std::path::Path, error: io::Error) -> Self {
        Self::FileWrite {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_message() {
        let e = Error::transport("http://host/x", "connection refused");
        assert_eq!(
            e.to_string(),
            "Request to http://host/x failed: connection refused"
        );
    }
}
