//! Component construction from configuration
//!
//! Every component receives its collaborators explicitly; this is the one
//! place that decides which service, clock and files they share.

use crate::config::{Config, ConfigManager};
use crate::credentials::{AccountCredentials, CredentialManager, TokenStore};
use crate::error::GeoMatrixResult;
use crate::geocode::{GeoCache, GeoLookupClient};
use crate::matrix::{BuildOptions, MatrixBuilder, MatrixStore};
use crate::quota::QuotaGovernor;
use crate::routing::PairwiseCostClient;
use crate::service::{GeoService, OneMapClient};
use std::path::PathBuf;
use std::sync::Arc;

/// Files under the store directory
#[derive(Debug, Clone)]
pub struct StorePaths {
    pub directory: PathBuf,
    pub token: PathBuf,
    pub geocode: PathBuf,
    pub matrix: PathBuf,
}

impl StorePaths {
    pub fn from_config(config: &Config) -> Self {
        let directory = ConfigManager::store_dir(config);
        Self {
            token: directory.join(&config.store.token_file),
            geocode: directory.join(&config.store.geocode_file),
            matrix: directory.join(&config.store.matrix_file),
            directory,
        }
    }
}

/// Wired components sharing one service and one quota governor
pub struct Components {
    pub paths: StorePaths,
    pub credentials: Arc<CredentialManager>,
    pub geocoder: GeoLookupClient,
    pub builder: MatrixBuilder,
}

impl Components {
    /// Wire components against the configured HTTP service
    pub fn from_config(config: &Config, options: BuildOptions) -> GeoMatrixResult<Self> {
        let service: Arc<dyn GeoService> = Arc::new(OneMapClient::new(&config.service));
        Self::with_service(config, service, options)
    }

    /// Wire components against any service implementation
    pub fn with_service(
        config: &Config,
        service: Arc<dyn GeoService>,
        options: BuildOptions,
    ) -> GeoMatrixResult<Self> {
        ConfigManager::ensure_store_dir(config)?;
        let paths = StorePaths::from_config(config);

        // geocoding and routing draw from the same quota
        let governor = Arc::new(QuotaGovernor::from_config(&config.quota));

        let credentials = Arc::new(CredentialManager::new(
            service.clone(),
            TokenStore::new(paths.token.clone()),
            AccountCredentials::from_env(&config.credentials),
            &config.credentials,
        ));

        let geocoder = GeoLookupClient::new(
            service.clone(),
            governor.clone(),
            GeoCache::open(paths.geocode.clone()),
        );

        let costs = PairwiseCostClient::new(
            service,
            governor,
            credentials.clone(),
            config.quota.call_delay(),
        );
        let builder = MatrixBuilder::new(MatrixStore::new(paths.matrix.clone()), costs, options);

        Ok(Self {
            paths,
            credentials,
            geocoder,
            builder,
        })
    }
}
