//! Error types and handling for Galvani
//!
//! This module defines the error types used throughout the application,
//! providing consistent error handling and reporting.

use thiserror::Error;

/// Result type alias for Galvani operations
pub type Result<T> = std::result::Result<T, GalvaniError>;

/// Main error type for Galvani
#[derive(Debug, Error)]
pub enum GalvaniError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Backend API errors (handshake, log, session endpoints)
    #[error("Backend error: {message}")]
    Backend { message: String },

    /// Backend API errors carrying an HTTP status
    #[error("Backend error: status {status}: {message}")]
    BackendStatus { status: u16, message: String },

    /// Realtime channel errors
    #[error("Channel error: {message}")]
    Channel { message: String },

    /// Vehicle gateway errors
    #[error("Gateway error: {message}")]
    Gateway { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Second connection attempt while the dock slot is occupied
    #[error("Dock is already occupied by another vehicle")]
    SlotOccupied,

    /// Session lifecycle errors
    #[error("Session error: {message}")]
    Session { message: String },

    /// Timeout errors
    #[error("Timeout error: {message}")]
    Timeout { message: String },

    /// Generic errors with context
    #[error("Error: {message}")]
    Generic { message: String },
}

impl GalvaniError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        GalvaniError::Config {
            message: message.into(),
        }
    }

    /// Create a new backend error
    pub fn backend<S: Into<String>>(message: S) -> Self {
        GalvaniError::Backend {
            message: message.into(),
        }
    }

    /// Create a backend error carrying the HTTP status
    pub fn backend_status<S: Into<String>>(status: u16, message: S) -> Self {
        GalvaniError::BackendStatus {
            status,
            message: message.into(),
        }
    }

    /// Create a new channel error
    pub fn channel<S: Into<String>>(message: S) -> Self {
        GalvaniError::Channel {
            message: message.into(),
        }
    }

    /// Create a new gateway error
    pub fn gateway<S: Into<String>>(message: S) -> Self {
        GalvaniError::Gateway {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        GalvaniError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        GalvaniError::Io {
            message: message.into(),
        }
    }

    /// Create a new session error
    pub fn session<S: Into<String>>(message: S) -> Self {
        GalvaniError::Session {
            message: message.into(),
        }
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        GalvaniError::Timeout {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        GalvaniError::Generic {
            message: message.into(),
        }
    }

    /// HTTP status carried by this error, if any
    pub fn http_status(&self) -> Option<u16> {
        match self {
            GalvaniError::BackendStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GalvaniError {
    fn from(err: std::io::Error) -> Self {
        GalvaniError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for GalvaniError {
    fn from(err: serde_yaml::Error) -> Self {
        GalvaniError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for GalvaniError {
    fn from(err: serde_json::Error) -> Self {
        GalvaniError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for GalvaniError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => GalvaniError::backend_status(status.as_u16(), err.to_string()),
            None => GalvaniError::backend(err.to_string()),
        }
    }
}
