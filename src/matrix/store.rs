//! On-disk matrix snapshot: bincode inside gzip
//!
//! Any read failure (missing file, truncated write, format change) is
//! reported as "no snapshot" and the caller starts from empty.

use super::snapshot::CacheSnapshot;
use crate::error::{GeoMatrixError, GeoMatrixResult};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Bumped whenever the encoded layout changes
const FORMAT_VERSION: u32 = 1;

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    snapshot: CacheSnapshot,
}

/// Borrowing twin of [`Envelope`]; encodes identically
#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    snapshot: &'a CacheSnapshot,
}

/// Owner of the persisted snapshot file
pub struct MatrixStore {
    path: PathBuf,
}

impl MatrixStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot, `None` when absent or unreadable
    pub fn load(&self) -> Option<CacheSnapshot> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(_) => {
                debug!("No matrix snapshot at {}", self.path.display());
                return None;
            }
        };

        let decoder = GzDecoder::new(BufReader::new(file));
        let envelope: Envelope = match bincode::deserialize_from(decoder) {
            Ok(env) => env,
            Err(e) => {
                warn!(
                    "Matrix snapshot {} is unreadable, starting empty: {}",
                    self.path.display(),
                    e
                );
                return None;
            }
        };

        if envelope.version != FORMAT_VERSION {
            warn!(
                "Matrix snapshot format v{} is not v{}, starting empty",
                envelope.version, FORMAT_VERSION
            );
            return None;
        }

        let mut snapshot = envelope.snapshot;
        if !snapshot.reindex() {
            warn!("Matrix snapshot {} is inconsistent, starting empty", self.path.display());
            return None;
        }

        debug!("Loaded matrix snapshot with {} locations", snapshot.len());
        Some(snapshot)
    }

    /// Overwrite the snapshot file
    pub fn save(&self, snapshot: &CacheSnapshot) -> GeoMatrixResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| GeoMatrixError::io("creating matrix store directory", e))?;
        }

        let file = File::create(&self.path).map_err(|e| {
            GeoMatrixError::io(format!("creating snapshot {}", self.path.display()), e)
        })?;

        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        let envelope = EnvelopeRef {
            version: FORMAT_VERSION,
            snapshot,
        };
        bincode::serialize_into(&mut encoder, &envelope)
            .map_err(|e| GeoMatrixError::Snapshot(e.to_string()))?;

        let mut writer = encoder
            .finish()
            .map_err(|e| GeoMatrixError::io("finishing snapshot compression", e))?;
        writer
            .flush()
            .map_err(|e| GeoMatrixError::io("flushing snapshot", e))?;

        info!(
            "Saved matrix snapshot with {} locations to {}",
            snapshot.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Delete the snapshot file
    pub fn clear(&self) -> GeoMatrixResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| {
                GeoMatrixError::io(format!("removing snapshot {}", self.path.display()), e)
            })?;
        }
        Ok(())
    }
}
