//! Configuration for geomatrix
//!
//! One TOML file, every section optional. A missing file means all
//! defaults; a present but malformed file is an error naming the path.
//!
//! The config file and the cache files live apart: the file defaults to the
//! platform config dir, the caches (token, geocode map, matrix snapshot) to
//! the platform local-data dir unless `[store] directory` says otherwise.

pub mod schema;

pub use schema::Config;

use crate::error::{GeoMatrixError, GeoMatrixResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const APP_DIR: &str = "geomatrix";
const CONFIG_FILE: &str = "config.toml";

/// Reads and writes the config file at a fixed path
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Manager for `<config dir>/geomatrix/config.toml`
    pub fn new() -> Self {
        Self::with_path(Self::default_config_path())
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    pub fn default_config_path() -> PathBuf {
        platform_dir(dirs::config_dir()).join(CONFIG_FILE)
    }

    /// `<local data dir>/geomatrix`, used when `[store] directory` is unset
    pub fn default_store_dir() -> PathBuf {
        platform_dir(dirs::data_local_dir())
    }

    /// Directory holding the token, geocode and matrix files for `config`
    pub fn store_dir(config: &Config) -> PathBuf {
        config.store.dir_or(Self::default_store_dir())
    }

    /// Create the store directory if needed and return it
    pub fn ensure_store_dir(config: &Config) -> GeoMatrixResult<PathBuf> {
        let dir = Self::store_dir(config);
        fs::create_dir_all(&dir).map_err(|e| {
            GeoMatrixError::io(format!("creating store directory {}", dir.display()), e)
        })?;
        Ok(dir)
    }

    /// Parse the managed file; absent means `Config::default()`
    pub fn load(&self) -> GeoMatrixResult<Config> {
        match fs::read_to_string(&self.config_path) {
            Ok(content) => parse(&self.config_path, &content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", self.config_path.display());
                Ok(Config::default())
            }
            Err(e) => Err(GeoMatrixError::io(
                format!("reading config {}", self.config_path.display()),
                e,
            )),
        }
    }

    /// Parse an arbitrary file; absence is an error here
    pub fn load_from_file(&self, path: &Path) -> GeoMatrixResult<Config> {
        let content = fs::read_to_string(path)
            .map_err(|e| GeoMatrixError::io(format!("reading config {}", path.display()), e))?;
        parse(path, &content)
    }

    /// Write `config` as pretty TOML, creating parent directories
    pub fn save(&self, config: &Config) -> GeoMatrixResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| GeoMatrixError::ConfigDirCreate {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        fs::write(&self.config_path, toml::to_string_pretty(config)?).map_err(|e| {
            GeoMatrixError::io(format!("writing config {}", self.config_path.display()), e)
        })?;

        info!("Wrote config to {}", self.config_path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

fn platform_dir(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR)
}

fn parse(path: &Path, content: &str) -> GeoMatrixResult<Config> {
    toml::from_str(content).map_err(|e| GeoMatrixError::ConfigInvalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
