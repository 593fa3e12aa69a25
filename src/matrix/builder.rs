//! Incremental matrix builder
//!
//! Given a requested coordinate list, loads the snapshot, routes only the
//! pairs that involve coordinates the snapshot has never seen, persists the
//! expanded snapshot and gathers the matrices in the caller's order.
//!
//! For `k` new coordinates against `n` cached ones this issues `k*n` calls
//! (new against existing) plus `k*(k-1)/2` (new against new). Each result is
//! written to both transposed cells.

use super::snapshot::{CacheSnapshot, TravelMatrices};
use super::store::MatrixStore;
use crate::error::{GeoMatrixError, GeoMatrixResult};
use crate::geo::Coordinate;
use crate::routing::PairwiseCostClient;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, warn};

/// Build options
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Re-issue calls for requested pairs still pending from an earlier failure
    pub retry_pending: bool,

    /// Draw a progress bar on stderr
    pub progress: bool,
}

/// What a `get_matrices` call did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    /// Coordinates appended to the snapshot
    pub new_locations: usize,
    /// Routing calls issued
    pub calls: usize,
    /// Calls that failed in transport (cells left pending)
    pub failed: usize,
    /// Pairs the service reported as unroutable
    pub unreachable: usize,
    /// Pending pairs in the returned matrices
    pub pending: usize,
}

/// Sole writer of the matrix snapshot
pub struct MatrixBuilder {
    store: MatrixStore,
    costs: PairwiseCostClient,
    options: BuildOptions,
}

impl MatrixBuilder {
    pub fn new(store: MatrixStore, costs: PairwiseCostClient, options: BuildOptions) -> Self {
        Self {
            store,
            costs,
            options,
        }
    }

    /// Duration and distance matrices for `requested`, in its order
    pub fn get_matrices(
        &mut self,
        requested: &[Coordinate],
    ) -> GeoMatrixResult<(TravelMatrices, BuildReport)> {
        let mut snapshot = self.store.load().unwrap_or_default();
        let mut report = BuildReport::default();

        // first-appearance order keeps index assignment reproducible
        let mut seen = HashSet::new();
        let delta: Vec<Coordinate> = requested
            .iter()
            .filter(|c| !snapshot.contains(c) && seen.insert(**c))
            .copied()
            .collect();

        let mut work = Vec::new();
        if !delta.is_empty() {
            let old_size = snapshot.len();
            let added = snapshot.append(&delta);
            report.new_locations = added.len();
            info!(
                "Calculating routes for {} new locations against {} cached",
                added.len(),
                old_size
            );

            for n in added.clone() {
                work.extend((0..old_size).map(|e| (n, e)));
            }
            for i in added.clone() {
                work.extend((i + 1..added.end).map(|j| (i, j)));
            }
        }

        if self.options.retry_pending {
            let retry = Self::pending_among(&snapshot, requested, &work);
            if !retry.is_empty() {
                info!("Retrying {} pending pairs", retry.len());
                work.extend(retry);
            }
        }

        if !work.is_empty() {
            self.run(&mut snapshot, &work, &mut report)?;
            self.store.save(&snapshot)?;
        }

        let matrices = snapshot.gather(requested).ok_or_else(|| {
            GeoMatrixError::Internal("requested coordinate missing after expansion".to_string())
        })?;
        report.pending = matrices.pending_pairs();

        if report.failed > 0 {
            warn!(
                "{} of {} route calls failed; their cells stay pending",
                report.failed, report.calls
            );
        }
        Ok((matrices, report))
    }

    /// Pending pairs among `requested` that are not already scheduled
    fn pending_among(
        snapshot: &CacheSnapshot,
        requested: &[Coordinate],
        scheduled: &[(usize, usize)],
    ) -> Vec<(usize, usize)> {
        let scheduled: HashSet<(usize, usize)> = scheduled
            .iter()
            .map(|&(a, b)| (a.min(b), a.max(b)))
            .collect();

        let mut indices: Vec<usize> = requested
            .iter()
            .filter_map(|c| snapshot.index_of(c))
            .collect();
        indices.sort_unstable();
        indices.dedup();

        let mut pairs = Vec::new();
        for (pos, &i) in indices.iter().enumerate() {
            for &j in &indices[pos + 1..] {
                if snapshot.is_pending(i, j) && !scheduled.contains(&(i, j)) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    fn run(
        &self,
        snapshot: &mut CacheSnapshot,
        work: &[(usize, usize)],
        report: &mut BuildReport,
    ) -> GeoMatrixResult<()> {
        let bar = self.progress_bar(work.len() as u64);

        for &(i, j) in work {
            let from = snapshot.locations()[i];
            let to = snapshot.locations()[j];

            // only a failed route call leaves the pair pending; anything
            // else (token, store) aborts before the snapshot is saved
            match self.costs.cost(from, to) {
                Ok(leg) => {
                    report.calls += 1;
                    if !leg.duration.is_known() {
                        report.unreachable += 1;
                    }
                    snapshot.set_pair(i, j, leg.duration, leg.distance);
                }
                Err(e @ GeoMatrixError::CallFailed { .. }) => {
                    report.calls += 1;
                    report.failed += 1;
                    warn!("Error calculating route: {}", e);
                }
                Err(e) => {
                    bar.abandon();
                    return Err(e);
                }
            }
            bar.inc(1);
        }

        bar.finish_and_clear();
        Ok(())
    }

    fn progress_bar(&self, total: u64) -> ProgressBar {
        if !self.options.progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("  {spinner:.cyan} Routing  {bar:30.cyan/dim} {pos}/{len}  eta {eta:.dim}")
        {
            bar.set_style(style.progress_chars("━╸─"));
        }
        bar
    }

    pub fn store(&self) -> &MatrixStore {
        &self.store
    }
}
