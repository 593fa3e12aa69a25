//! Solver-facing problem and solution types
//!
//! The vehicle-routing solver itself is an external capability. These types
//! are the interface it consumes and produces.

use crate::error::{GeoMatrixError, GeoMatrixResult};
use serde::{Deserialize, Serialize};

/// `[start, end)` in seconds from the start of the planning day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    pub fn new(start: i64, end: i64) -> GeoMatrixResult<Self> {
        let invalid = |reason: &str| GeoMatrixError::TimeWindow {
            start,
            end,
            reason: reason.to_string(),
        };

        if start < 0 {
            return Err(invalid("start time cannot be negative"));
        }
        if end <= start {
            return Err(invalid("end time must be greater than start time"));
        }
        Ok(Self { start, end })
    }

    pub fn length(&self) -> i64 {
        self.end - self.start
    }
}

/// A vehicle in the solver input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: u64,
    /// Matrix index of the start location
    pub start: usize,
    /// Matrix index of the end location
    pub end: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_window: Option<TimeWindow>,
}

/// A location that must be visited
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: u64,
    /// Matrix index of the job location
    pub location: usize,
}

/// Complete solver input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    /// Square cost matrix (seconds or meters)
    pub matrix: Vec<Vec<u64>>,
    pub vehicles: Vec<Vehicle>,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Start,
    Job,
    End,
}

/// One stop on a solved route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(rename = "type")]
    pub kind: StepKind,
    /// Job id for `Job` steps
    #[serde(default)]
    pub job: Option<u64>,
    pub location: usize,
    pub arrival: u64,
    #[serde(default)]
    pub service: u64,
    #[serde(default)]
    pub waiting_time: u64,
    /// Cumulative travel duration at this step
    pub duration: u64,
}

/// Ordered steps for one vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolvedRoute {
    pub vehicle: u64,
    pub steps: Vec<Step>,
}

/// Solver output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub routes: Vec<SolvedRoute>,
    /// Job ids the solver could not place
    #[serde(default)]
    pub unassigned: Vec<u64>,
}

/// External vehicle-routing solver
pub trait RouteSolver {
    fn solve(&self, problem: &Problem) -> GeoMatrixResult<Solution>;
}
