//! Access token persistence

use crate::error::{GeoMatrixError, GeoMatrixResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Persisted access token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthToken {
    /// The token value sent as the Authorization header
    pub value: String,

    /// When this process (or an earlier one) obtained the token
    pub issued_at: DateTime<Utc>,

    /// Expiry reported by the token endpoint
    pub expires_at: DateTime<Utc>,
}

impl AuthToken {
    pub fn new(value: String, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value,
            issued_at,
            expires_at,
        }
    }

    /// Age at `now`
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.issued_at
    }

    /// Usable at `now`: younger than `max_age` and not within a minute of expiry
    pub fn is_fresh(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        self.age(now) < max_age && now < self.expires_at - Duration::seconds(60)
    }
}

/// Single-file token store
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted token. An unreadable file counts as no token.
    pub fn load(&self) -> Option<AuthToken> {
        if !self.path.exists() {
            return None;
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Error reading token file {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(token) => Some(token),
            Err(e) => {
                warn!("Ignoring malformed token file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Overwrite the persisted token
    pub fn save(&self, token: &AuthToken) -> GeoMatrixResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| GeoMatrixError::io("creating token directory", e))?;
        }

        let content = serde_json::to_string_pretty(token)?;
        fs::write(&self.path, content).map_err(|e| {
            GeoMatrixError::io(format!("writing token file {}", self.path.display()), e)
        })?;

        // Set restrictive permissions on the token file
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            fs::set_permissions(&self.path, perms)
                .map_err(|e| GeoMatrixError::io("setting token file permissions", e))?;
        }

        debug!("Stored token valid until {}", token.expires_at);
        Ok(())
    }

    /// Remove the persisted token
    pub fn clear(&self) -> GeoMatrixResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| {
                GeoMatrixError::io(format!("removing token file {}", self.path.display()), e)
            })?;
        }
        Ok(())
    }
}
