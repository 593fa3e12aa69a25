//! Coordinate identity
//!
//! A coordinate is the solver-facing identity of a location. Two coordinates
//! name the same location iff both components are numerically equal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A (latitude, longitude) pair
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Bit patterns used for equality and hashing; `-0.0` folds into `0.0`
    /// so equal numbers always hash alike.
    fn key(&self) -> (u64, u64) {
        fn bits(v: f64) -> u64 {
            if v == 0.0 {
                0.0f64.to_bits()
            } else {
                v.to_bits()
            }
        }
        (bits(self.latitude), bits(self.longitude))
    }

    /// `lat,lon` as expected by the routing call
    pub fn query_param(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Coordinate {}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(c: Coordinate) -> Self {
        (c.latitude, c.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn equal_values_are_same_location() {
        let a = Coordinate::new(1.319728, 103.8421);
        let b = Coordinate::new(1.319728, 103.8421);
        assert_eq!(a, b);

        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn nearby_values_are_distinct() {
        let a = Coordinate::new(1.319728, 103.8421);
        let b = Coordinate::new(1.3197281, 103.8421);
        assert_ne!(a, b);
    }

    #[test]
    fn signed_zero_is_one_location() {
        let a = Coordinate::new(0.0, 103.0);
        let b = Coordinate::new(-0.0, 103.0);
        assert_eq!(a, b);

        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn serializes_as_pair() {
        let c = Coordinate::new(1.5, 103.25);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "[1.5,103.25]");

        let parsed: Coordinate = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, c);
    }

    #[test]
    fn query_param_format() {
        assert_eq!(Coordinate::new(1.5, 103.25).query_param(), "1.5,103.25");
    }
}
