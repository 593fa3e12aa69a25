//! Access token management for the routing service
//!
//! A persisted token is reused while it is younger than the configured
//! staleness threshold; otherwise a new one is requested and written back.

pub mod store;

pub use store::{AuthToken, TokenStore};

use crate::config::schema::CredentialsConfig;
use crate::error::{GeoMatrixError, GeoMatrixResult};
use crate::service::GeoService;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Account credentials for the token endpoint
#[derive(Clone)]
pub struct AccountCredentials {
    pub email: String,
    pub password: String,
}

impl AccountCredentials {
    /// Read credentials from the environment variables named in config
    pub fn from_env(config: &CredentialsConfig) -> GeoMatrixResult<Self> {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        match (read(&config.email_env), read(&config.password_env)) {
            (Some(email), Some(password)) => Ok(Self { email, password }),
            _ => Err(GeoMatrixError::MissingCredentials {
                email_env: config.email_env.clone(),
                password_env: config.password_env.clone(),
            }),
        }
    }
}

impl std::fmt::Debug for AccountCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountCredentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Obtains and refreshes the access token
pub struct CredentialManager {
    service: Arc<dyn GeoService>,
    store: TokenStore,
    account: GeoMatrixResult<AccountCredentials>,
    max_age: Duration,
    current: Mutex<Option<AuthToken>>,
}

impl CredentialManager {
    /// Create a manager. Missing credentials only fail once a refresh is needed.
    pub fn new(
        service: Arc<dyn GeoService>,
        store: TokenStore,
        account: GeoMatrixResult<AccountCredentials>,
        config: &CredentialsConfig,
    ) -> Self {
        Self {
            service,
            store,
            account,
            max_age: Duration::days(config.token_max_age_days as i64),
            current: Mutex::new(None),
        }
    }

    /// Return a usable token, refreshing if the persisted one is stale
    pub fn get_token(&self) -> GeoMatrixResult<String> {
        self.get_token_at(Utc::now())
    }

    fn get_token_at(&self, now: DateTime<Utc>) -> GeoMatrixResult<String> {
        let mut current = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(token) = current.as_ref().filter(|t| t.is_fresh(now, self.max_age)) {
            return Ok(token.value.clone());
        }

        if let Some(token) = self.store.load().filter(|t| t.is_fresh(now, self.max_age)) {
            debug!("Using persisted token issued {}", token.issued_at);
            let value = token.value.clone();
            *current = Some(token);
            return Ok(value);
        }

        let token = self.request(now)?;
        let value = token.value.clone();
        *current = Some(token);
        Ok(value)
    }

    /// Request a new token regardless of the persisted one
    pub fn refresh(&self) -> GeoMatrixResult<AuthToken> {
        let token = self.request(Utc::now())?;
        *self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(token.clone());
        Ok(token)
    }

    /// Persisted token, if any, without refreshing
    pub fn peek(&self) -> Option<AuthToken> {
        self.store.load()
    }

    /// Whether a token would be reused at `now` without a refresh
    pub fn has_fresh_token(&self) -> bool {
        self.peek()
            .is_some_and(|t| t.is_fresh(Utc::now(), self.max_age))
    }

    fn request(&self, now: DateTime<Utc>) -> GeoMatrixResult<AuthToken> {
        let account = match &self.account {
            Ok(account) => account,
            Err(GeoMatrixError::MissingCredentials {
                email_env,
                password_env,
            }) => {
                return Err(GeoMatrixError::MissingCredentials {
                    email_env: email_env.clone(),
                    password_env: password_env.clone(),
                })
            }
            Err(e) => return Err(GeoMatrixError::Authentication(e.to_string())),
        };

        let response = self
            .service
            .request_token(&account.email, &account.password)
            .map_err(|e| match e {
                GeoMatrixError::Authentication(_) => e,
                other => GeoMatrixError::Authentication(other.to_string()),
            })?;

        if response.access_token.trim().is_empty() {
            return Err(GeoMatrixError::Authentication(
                "token endpoint returned an empty token".to_string(),
            ));
        }

        let expires_at = DateTime::from_timestamp(response.expiry_timestamp, 0)
            .unwrap_or(now + self.max_age);
        let token = AuthToken::new(response.access_token, now, expires_at);
        if let Err(e) = self.store.save(&token) {
            warn!("Token not persisted, keeping it for this run only: {}", e);
        }

        info!("Obtained new access token valid until {}", token.expires_at);
        Ok(token)
    }
}
