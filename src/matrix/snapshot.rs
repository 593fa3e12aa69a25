//! The persisted (locations, duration, distance) unit

use super::cost::{Cost, CostMatrix};
use crate::geo::Coordinate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Range;

/// Every travel cost computed so far
///
/// Position in `locations` is the row/column in both matrices. Locations are
/// only ever appended, so an assigned index never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSnapshot {
    locations: Vec<Coordinate>,
    duration: CostMatrix,
    distance: CostMatrix,
    #[serde(skip)]
    index: HashMap<Coordinate, usize>,
}

impl CacheSnapshot {
    pub fn empty() -> Self {
        Self {
            locations: Vec::new(),
            duration: CostMatrix::new(0),
            distance: CostMatrix::new(0),
            index: HashMap::new(),
        }
    }

    /// Assemble a snapshot, `None` if the parts are inconsistent
    pub fn from_parts(
        locations: Vec<Coordinate>,
        duration: CostMatrix,
        distance: CostMatrix,
    ) -> Option<Self> {
        let mut snapshot = Self {
            locations,
            duration,
            distance,
            index: HashMap::new(),
        };
        snapshot.reindex().then_some(snapshot)
    }

    /// Rebuild the lookup index and check invariants after deserializing
    pub(crate) fn reindex(&mut self) -> bool {
        let n = self.locations.len();
        if self.duration.size() != n
            || self.distance.size() != n
            || !self.duration.is_well_formed()
            || !self.distance.is_well_formed()
        {
            return false;
        }

        self.index = self
            .locations
            .iter()
            .enumerate()
            .map(|(i, c)| (*c, i))
            .collect();
        self.index.len() == n
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn locations(&self) -> &[Coordinate] {
        &self.locations
    }

    pub fn duration(&self) -> &CostMatrix {
        &self.duration
    }

    pub fn distance(&self) -> &CostMatrix {
        &self.distance
    }

    pub fn index_of(&self, coordinate: &Coordinate) -> Option<usize> {
        self.index.get(coordinate).copied()
    }

    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        self.index.contains_key(coordinate)
    }

    /// Append coordinates not yet present, in the given order, growing both
    /// matrices. Returns the index range assigned to the new entries.
    pub fn append(&mut self, coordinates: &[Coordinate]) -> Range<usize> {
        let start = self.locations.len();
        for c in coordinates {
            if !self.index.contains_key(c) {
                self.index.insert(*c, self.locations.len());
                self.locations.push(*c);
            }
        }
        let end = self.locations.len();
        self.duration.grow(end);
        self.distance.grow(end);
        start..end
    }

    /// Record a measured pair in both matrices, mirrored
    pub fn set_pair(&mut self, i: usize, j: usize, duration: Cost, distance: Cost) {
        self.duration.set_symmetric(i, j, duration);
        self.distance.set_symmetric(i, j, distance);
    }

    /// Whether either matrix is still missing the pair
    pub fn is_pending(&self, i: usize, j: usize) -> bool {
        self.duration.get(i, j).is_pending() || self.distance.get(i, j).is_pending()
    }

    /// Upper-triangle pairs missing from either matrix
    pub fn pending_pairs(&self) -> usize {
        count_pending(&self.duration, &self.distance)
    }

    /// Matrices for `requested` in caller order, including repeats.
    /// `None` if any coordinate is not cached.
    pub fn gather(&self, requested: &[Coordinate]) -> Option<TravelMatrices> {
        let indices = requested
            .iter()
            .map(|c| self.index_of(c))
            .collect::<Option<Vec<_>>>()?;

        Some(TravelMatrices::new(
            requested.to_vec(),
            self.duration.gather(&indices),
            self.distance.gather(&indices),
        ))
    }
}

impl Default for CacheSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Duration and distance matrices ordered like the caller's request
#[derive(Debug, Clone, PartialEq)]
pub struct TravelMatrices {
    locations: Vec<Coordinate>,
    pub duration: CostMatrix,
    pub distance: CostMatrix,
}

impl TravelMatrices {
    fn new(locations: Vec<Coordinate>, duration: CostMatrix, distance: CostMatrix) -> Self {
        Self {
            locations,
            duration,
            distance,
        }
    }

    pub fn locations(&self) -> &[Coordinate] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Row/column of the first occurrence of `coordinate`
    pub fn index_of(&self, coordinate: &Coordinate) -> Option<usize> {
        self.locations.iter().position(|c| c == coordinate)
    }

    /// Matrix for the requested metric
    pub fn select(&self, kind: MatrixKind) -> &CostMatrix {
        match kind {
            MatrixKind::Duration => &self.duration,
            MatrixKind::Distance => &self.distance,
        }
    }

    /// Upper-triangle pairs missing from either matrix
    pub fn pending_pairs(&self) -> usize {
        count_pending(&self.duration, &self.distance)
    }
}

/// Upper-triangle pairs pending in either of two same-sized matrices
fn count_pending(duration: &CostMatrix, distance: &CostMatrix) -> usize {
    let n = duration.size();
    (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .filter(|&(i, j)| duration.get(i, j).is_pending() || distance.get(i, j).is_pending())
        .count()
}

/// Which matrix feeds the solver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MatrixKind {
    #[default]
    Duration,
    Distance,
}

impl std::fmt::Display for MatrixKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Duration => write!(f, "duration"),
            Self::Distance => write!(f, "distance"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lat: f64) -> Coordinate {
        Coordinate::new(lat, 103.8)
    }

    #[test]
    fn append_assigns_stable_indices() {
        let mut snap = CacheSnapshot::empty();
        assert_eq!(snap.append(&[c(1.0), c(2.0)]), 0..2);
        assert_eq!(snap.append(&[c(2.0), c(3.0)]), 2..3);

        assert_eq!(snap.index_of(&c(1.0)), Some(0));
        assert_eq!(snap.index_of(&c(2.0)), Some(1));
        assert_eq!(snap.index_of(&c(3.0)), Some(2));
        assert_eq!(snap.duration().size(), 3);
    }

    #[test]
    fn gather_follows_request_order() {
        let mut snap = CacheSnapshot::empty();
        snap.append(&[c(1.0), c(2.0), c(3.0)]);
        snap.set_pair(0, 2, Cost::Known(13.0), Cost::Known(130.0));

        let m = snap.gather(&[c(3.0), c(1.0)]).unwrap();
        assert_eq!(m.duration.get(0, 1), Cost::Known(13.0));
        assert_eq!(m.distance.get(1, 0), Cost::Known(130.0));
        assert_eq!(m.index_of(&c(1.0)), Some(1));
    }

    #[test]
    fn gather_missing_is_none() {
        let snap = CacheSnapshot::empty();
        assert!(snap.gather(&[c(1.0)]).is_none());
    }

    #[test]
    fn from_parts_rejects_mismatch() {
        assert!(CacheSnapshot::from_parts(vec![c(1.0)], CostMatrix::new(2), CostMatrix::new(1))
            .is_none());
        assert!(CacheSnapshot::from_parts(
            vec![c(1.0), c(1.0)],
            CostMatrix::new(2),
            CostMatrix::new(2)
        )
        .is_none());
        assert!(CacheSnapshot::from_parts(vec![c(1.0)], CostMatrix::new(1), CostMatrix::new(1))
            .is_some());
    }

    #[test]
    fn pending_pairs_counts_either_matrix() {
        let mut snap = CacheSnapshot::empty();
        snap.append(&[c(1.0), c(2.0), c(3.0)]);
        snap.set_pair(0, 1, Cost::Known(1.0), Cost::Known(1.0));
        snap.set_pair(0, 2, Cost::Unreachable, Cost::Unreachable);

        let m = snap.gather(&[c(1.0), c(2.0), c(3.0)]).unwrap();
        assert_eq!(m.pending_pairs(), 1);
        assert_eq!(snap.pending_pairs(), 1);

        // distance alone missing still counts
        snap.set_pair(1, 2, Cost::Known(3.0), Cost::Pending);
        assert_eq!(snap.pending_pairs(), 1);
        snap.set_pair(1, 2, Cost::Known(3.0), Cost::Known(30.0));
        assert_eq!(snap.pending_pairs(), 0);
    }

    #[test]
    fn select_picks_metric() {
        let mut snap = CacheSnapshot::empty();
        snap.append(&[c(1.0), c(2.0)]);
        snap.set_pair(0, 1, Cost::Known(5.0), Cost::Known(50.0));
        let m = snap.gather(&[c(1.0), c(2.0)]).unwrap();

        assert_eq!(m.select(MatrixKind::Duration).get(0, 1), Cost::Known(5.0));
        assert_eq!(m.select(MatrixKind::Distance).get(0, 1), Cost::Known(50.0));
    }
}
