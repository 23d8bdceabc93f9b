//! Unified error system for the permission framework
//!
//! Every crate in the workspace reports failures through [`DpfError`]. Narrow,
//! concern-specific enums (for example [`InvalidInteraction`]) convert into it
//! so callers can use `?` across crate boundaries.

use crate::interaction::InvalidInteraction;
use serde::{Deserialize, Serialize};

/// Unified error type for all permission framework operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum DpfError {
    /// Invalid input or configuration
    #[error("Invalid: {message}")]
    Invalid {
        /// Error message describing the invalid input
        message: String,
    },

    /// Resource not found
    #[error("Not found: {message}")]
    NotFound {
        /// Error message describing what was not found
        message: String,
    },

    /// Stored state violates its own invariants
    #[error("Corrupt: {message}")]
    Corrupt {
        /// Error message describing the violated invariant
        message: String,
    },

    /// External collaborator could not be reached
    #[error("Unavailable: {message}")]
    Unavailable {
        /// Error message describing the outage
        message: String,
    },

    /// External collaborator did not answer in time
    #[error("Timed out: {message}")]
    Timeout {
        /// Error message describing the elapsed operation
        message: String,
    },

    /// Configuration could not be loaded or is inconsistent
    #[error("Config error: {message}")]
    Config {
        /// Error message describing the configuration problem
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message describing the serialization failure
        message: String,
    },
}

impl DpfError {
    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a corruption error
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }

    /// Create an unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

/// Standard Result type for permission framework operations
pub type Result<T> = std::result::Result<T, DpfError>;

impl From<InvalidInteraction> for DpfError {
    fn from(err: InvalidInteraction) -> Self {
        Self::invalid(err.to_string())
    }
}

impl From<serde_json::Error> for DpfError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<toml::de::Error> for DpfError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(err.to_string())
    }
}

impl From<std::io::Error> for DpfError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::not_found(err.to_string()),
            std::io::ErrorKind::TimedOut => Self::timeout(err.to_string()),
            _ => Self::unavailable(err.to_string()),
        }
    }
}
