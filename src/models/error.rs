//! Error types for the website backend tooling.
//!
//! Handler failures travel as `lambda_runtime::Diagnostic`, the envelope the
//! Lambda runtime itself reports. Everything around the handler (configuration,
//! response translation in the bridge, asset deployment) uses [`AppError`].

use std::fmt;

/// Custom error type for the application.
#[derive(Debug)]
pub enum AppError {
    /// Invalid or unreadable configuration
    Config(String),
    /// No handler registered under the requested name
    HandlerNotFound(String),
    /// A handler response that cannot be expressed as an HTTP response
    InvalidResponse(String),
    /// Filesystem error while reading or writing assets
    Io(String),
    /// Uploading an asset to the hosting target failed
    Upload(String),
    /// Generic error for other cases
    Generic(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::HandlerNotFound(name) => write!(f, "Handler not found: {name}"),
            Self::InvalidResponse(msg) => write!(f, "Invalid handler response: {msg}"),
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::Upload(msg) => write!(f, "Upload failed: {msg}"),
            Self::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        // {:#} keeps the context chain
        Self::Generic(format!("{error:#}"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<walkdir::Error> for AppError {
    fn from(error: walkdir::Error) -> Self {
        Self::Io(error.to_string())
    }
}
