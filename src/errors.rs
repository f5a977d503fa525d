//! Error types for arte-cli
//!
//! Every transfer operation reports one of five error kinds: the server is
//! unreachable, the local input is unusable, the byte stream broke, the
//! server's response violated the protocol, or the server answered with an
//! error payload. Configuration and terminal errors live beside them and are
//! folded into [`AppError`] for the command layer.

use std::path::PathBuf;

use thiserror::Error;

use crate::app::models::RemotePayload;

/// Invalid local input, detected before any network call
#[derive(Error, Debug)]
pub enum InputError {
    /// Path does not exist
    #[error("The path '{}' does not exist", .path.display())]
    NotFound { path: PathBuf },

    /// Path exists but is not a regular file
    #[error("The path '{}' must be a file", .path.display())]
    NotAFile { path: PathBuf },

    /// File does not start with a zip signature
    #[error("The file '{}' must be a zip", .path.display())]
    NotAnArchive { path: PathBuf },

    /// File could not be inspected
    #[error("Cannot read '{}'", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Base URL cannot be used to build endpoints
    #[error("Invalid server URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Metadata argument is neither `key=value` nor a JSON object
    #[error("Invalid metadata '{value}': {reason}")]
    InvalidMetadata { value: String, reason: String },
}

/// Byte stream failures
#[derive(Error, Debug)]
pub enum TransferError {
    /// Stream ended before the announced length was received
    #[error("Connection reset (received {received} of {} bytes)", describe_size(.expected))]
    ConnectionReset { received: u64, expected: Option<u64> },

    /// Transport-level request failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Response larger than the configured ceiling
    #[error("Response exceeds the maximum allowed size of {limit} bytes ({size} bytes)")]
    SizeLimitExceeded { limit: u64, size: u64 },

    /// Local file I/O failed while streaming
    #[error("File I/O error during transfer")]
    Io(#[from] std::io::Error),

    /// Completed download could not be moved into place
    #[error("Could not move downloaded file to {}", .destination.display())]
    Persist {
        destination: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn describe_size(size: &Option<u64>) -> String {
    size.map_or_else(|| "unknown".to_string(), |s| s.to_string())
}

/// Responses that break the protocol contract
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Required response header absent
    #[error("Response is missing the {name} header")]
    MissingHeader { name: &'static str },

    /// Content-Disposition carries no usable filename
    #[error("Malformed Content-Disposition header: {value}")]
    MalformedContentDisposition { value: String },

    /// Server-chosen filename would escape the destination directory
    #[error("Refusing unsafe filename from server: {filename:?}")]
    UnsafeFilename { filename: String },

    /// Successful response body could not be decoded
    #[error("Unexpected response body: {reason}")]
    InvalidBody { reason: String },
}

/// Non-success answer from the service
#[derive(Error, Debug)]
#[error("Server responded with HTTP {status}: {}", .payload.message())]
pub struct RemoteError {
    pub status: u16,
    pub payload: RemotePayload,
}

/// Errors produced by the transfer engine
#[derive(Error, Debug)]
pub enum ArtifactError {
    /// Server could not be reached
    #[error("Cannot connect to {url}")]
    Connectivity {
        url: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error(transparent)]
    InvalidInput(#[from] InputError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Coarse classification of [`ArtifactError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connectivity,
    InvalidInput,
    Transfer,
    Protocol,
    Remote,
}

impl ArtifactError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ArtifactError::Connectivity { .. } => ErrorKind::Connectivity,
            ArtifactError::InvalidInput(_) => ErrorKind::InvalidInput,
            ArtifactError::Transfer(_) => ErrorKind::Transfer,
            ArtifactError::Protocol(_) => ErrorKind::Protocol,
            ArtifactError::Remote(_) => ErrorKind::Remote,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Connectivity => "connectivity",
            ErrorKind::InvalidInput => "input",
            ErrorKind::Transfer => "transfer",
            ErrorKind::Protocol => "protocol",
            ErrorKind::Remote => "remote",
        }
    }
}

impl From<std::io::Error> for ArtifactError {
    fn from(error: std::io::Error) -> Self {
        ArtifactError::Transfer(TransferError::Io(error))
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Explicitly requested configuration file not found
    #[error("Configuration file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// Configuration file unreadable
    #[error("Failed to read config file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration format
    #[error("Invalid configuration format: {0}")]
    InvalidFormat(#[from] toml::de::Error),

    /// HTTP client could not be built from the configuration
    #[error("Failed to build HTTP client")]
    HttpClient(#[from] reqwest::Error),
}

/// Progress reporting errors
#[derive(Error, Debug)]
pub enum ProgressError {
    /// Invalid indicatif template
    #[error("Progress template error: {0}")]
    Template(#[from] indicatif::style::TemplateError),
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Progress(#[from] ProgressError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("{message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Artifact(e) => e.category(),
            AppError::Config(_) => "config",
            AppError::Progress(_) => "progress",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

impl From<InputError> for AppError {
    fn from(error: InputError) -> Self {
        AppError::Artifact(error.into())
    }
}

impl From<RemoteError> for AppError {
    fn from(error: RemoteError) -> Self {
        AppError::Artifact(error.into())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Transfer engine result type alias
pub type ArtifactResult<T> = std::result::Result<T, ArtifactError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Progress result type alias
pub type ProgressResult<T> = std::result::Result<T, ProgressError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_reset_message() {
        let error = TransferError::ConnectionReset {
            received: 500,
            expected: Some(2048),
        };
        let message = error.to_string();
        assert!(message.starts_with("Connection reset"));
        assert!(message.contains("500 of 2048"));

        let unknown = TransferError::ConnectionReset {
            received: 10,
            expected: None,
        };
        assert!(unknown.to_string().contains("10 of unknown"));
    }

    #[test]
    fn test_error_kinds() {
        let error: ArtifactError = InputError::NotAFile {
            path: PathBuf::from("dir"),
        }
        .into();
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
        assert_eq!(error.category(), "input");
        assert_eq!(error.to_string(), "The path 'dir' must be a file");

        let app_error = AppError::from(error);
        assert_eq!(app_error.category(), "input");
    }

    #[test]
    fn test_remote_error_uses_payload_message() {
        let error = RemoteError {
            status: 409,
            payload: RemotePayload::Json(serde_json::json!({ "message": "Version exists" })),
        };
        assert_eq!(
            error.to_string(),
            "Server responded with HTTP 409: Version exists"
        );
    }
}
