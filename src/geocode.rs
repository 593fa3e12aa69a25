//! Identifier -> coordinate lookup with a persistent cache
//!
//! Lookups hit the on-disk cache first. A miss costs one quota-gated search
//! call; a hit is stored and written back immediately. "Not found" results
//! are never cached, so an unresolved identifier is queried again next time.

use crate::error::{GeoMatrixError, GeoMatrixResult};
use crate::geo::Coordinate;
use crate::quota::QuotaGovernor;
use crate::service::GeoService;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A resolved identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoEntry {
    pub coordinate: Coordinate,

    /// Formatted address reported by the service
    #[serde(default)]
    pub address: String,
}

/// Append-only identifier -> coordinate map persisted as JSON
pub struct GeoCache {
    path: PathBuf,
    entries: BTreeMap<String, GeoEntry>,
}

impl GeoCache {
    /// Open the cache at `path`; a missing or unreadable file starts empty
    pub fn open(path: PathBuf) -> Self {
        let entries = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Ignoring unreadable geocode cache {}: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        debug!("Loaded {} geocode entries", entries.len());
        Self { path, entries }
    }

    pub fn get(&self, id: &str) -> Option<&GeoEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record an entry and persist the whole map
    pub fn insert(&mut self, id: &str, entry: GeoEntry) -> GeoMatrixResult<()> {
        self.entries.insert(id.to_string(), entry);
        self.persist()
    }

    /// Forget every entry and delete the file
    pub fn clear(&mut self) -> GeoMatrixResult<()> {
        self.entries.clear();
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| {
                GeoMatrixError::io(format!("removing geocode cache {}", self.path.display()), e)
            })?;
        }
        Ok(())
    }

    fn persist(&self) -> GeoMatrixResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| GeoMatrixError::io("creating geocode cache directory", e))?;
        }
        let content = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, content).map_err(|e| {
            GeoMatrixError::io(format!("writing geocode cache {}", self.path.display()), e)
        })
    }
}

/// Resolves identifiers such as postal codes to coordinates
pub struct GeoLookupClient {
    service: Arc<dyn GeoService>,
    governor: Arc<QuotaGovernor>,
    cache: GeoCache,
}

impl GeoLookupClient {
    pub fn new(service: Arc<dyn GeoService>, governor: Arc<QuotaGovernor>, cache: GeoCache) -> Self {
        Self {
            service,
            governor,
            cache,
        }
    }

    /// Resolve an identifier to its coordinate
    pub fn resolve(&mut self, id: &str) -> GeoMatrixResult<Coordinate> {
        self.lookup(id).map(|entry| entry.coordinate)
    }

    /// Formatted address for an identifier
    pub fn address(&mut self, id: &str) -> GeoMatrixResult<String> {
        self.lookup(id).map(|entry| entry.address)
    }

    /// Full cache entry for an identifier, querying the service on a miss
    pub fn lookup(&mut self, id: &str) -> GeoMatrixResult<GeoEntry> {
        let id = id.trim();
        if id.is_empty() {
            return Err(GeoMatrixError::NotFound(id.to_string()));
        }
        if let Some(entry) = self.cache.get(id) {
            return Ok(entry.clone());
        }

        self.governor.allow_call();
        let response = self.service.search(id)?;

        let entry = response
            .results
            .first()
            .filter(|_| response.found > 0)
            .and_then(|result| {
                result.coordinate().map(|coordinate| GeoEntry {
                    coordinate,
                    address: result.address.clone(),
                })
            });

        match entry {
            Some(entry) => {
                info!("Resolved '{}' to {}", id, entry.coordinate);
                self.cache.insert(id, entry.clone())?;
                Ok(entry)
            }
            None => {
                warn!("No coordinates found for '{}'", id);
                Err(GeoMatrixError::NotFound(id.to_string()))
            }
        }
    }

    pub fn cache(&self) -> &GeoCache {
        &self.cache
    }
}
