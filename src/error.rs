//! Error types for geomatrix
//!
//! All modules use `GeoMatrixResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for geomatrix operations
pub type GeoMatrixResult<T> = Result<T, GeoMatrixError>;

/// All errors that can occur in geomatrix
#[derive(Error, Debug)]
pub enum GeoMatrixError {
    // Credential errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Service credentials not set. Export {email_env} and {password_env}")]
    MissingCredentials {
        email_env: String,
        password_env: String,
    },

    // Lookup errors
    #[error("No coordinates found for '{0}'")]
    NotFound(String),

    #[error("Route call {from} -> {to} failed: {reason}")]
    CallFailed {
        from: String,
        to: String,
        reason: String,
    },

    #[error("HTTP error: {0}")]
    Http(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Store errors
    #[error("Failed to encode matrix snapshot: {0}")]
    Snapshot(String),

    // Planning errors
    #[error("Invalid time window [{start}, {end}): {reason}")]
    TimeWindow { start: i64, end: i64, reason: String },

    #[error("Route solver failed: {0}")]
    Solver(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl GeoMatrixError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a failed route call error
    pub fn call_failed(
        from: impl std::fmt::Display,
        to: impl std::fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        Self::CallFailed {
            from: from.to_string(),
            to: to.to_string(),
            reason: reason.into(),
        }
    }

    /// Fatal errors abort a whole run; everything else degrades to a
    /// missing data point or a dropped location.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Authentication(_) | Self::MissingCredentials { .. }
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Authentication(_) => {
                Some("Check the service credentials, then run: geomatrix token --refresh")
            }
            Self::MissingCredentials { .. } => {
                Some("Set the credential variables named in [credentials] of config.toml")
            }
            Self::ConfigInvalid { .. } => Some("Run: geomatrix config show"),
            _ => None,
        }
    }
}

impl From<ureq::Error> for GeoMatrixError {
    fn from(err: ureq::Error) -> Self {
        Self::Http(err.to_string())
    }
}
