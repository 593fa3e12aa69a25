//! Route planning on top of the matrix cache
//!
//! Resolves stop identifiers, fetches matrices for depot + stops, keeps only
//! stops with complete cost data, hands the problem to a [`RouteSolver`] and
//! maps the answer back onto stops. Every degraded outcome (unresolvable
//! identifier, missing cost data, unplaced job) is reported, not fatal.

pub mod problem;

pub use problem::{
    Job, Problem, RouteSolver, Solution, SolvedRoute, Step, StepKind, TimeWindow, Vehicle,
};

use crate::error::GeoMatrixResult;
use crate::geo::Coordinate;
use crate::geocode::GeoLookupClient;
use crate::matrix::{BuildReport, CostMatrix, MatrixBuilder, MatrixKind, TravelMatrices};
use serde::Serialize;
use tracing::{info, warn};

/// A location to visit, identified by a geocodable identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stop {
    pub id: u64,
    pub identifier: String,
}

impl Stop {
    pub fn new(id: u64, identifier: impl Into<String>) -> Self {
        Self {
            id,
            identifier: identifier.into(),
        }
    }
}

/// Vehicle definition before matrix indices are known
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetVehicle {
    pub id: u64,
    pub time_window: Option<TimeWindow>,
}

/// `count` vehicles numbered from 1, sharing an optional time window
pub fn uniform_fleet(count: u64, time_window: Option<TimeWindow>) -> Vec<FleetVehicle> {
    (1..=count)
        .map(|id| FleetVehicle { id, time_window })
        .collect()
}

/// A stop on a planned route
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Visit {
    pub stop: Stop,
    pub coordinate: Coordinate,
    pub arrival: u64,
    pub service: u64,
    pub waiting_time: u64,
}

/// One vehicle's planned route, depot excluded from `visits`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedRoute {
    pub vehicle: u64,
    pub visits: Vec<Visit>,
    /// Cumulative travel duration reported by the solver
    pub total_duration: u64,
    /// Distance along depot -> visits -> depot, when every leg is known
    pub total_distance: Option<f64>,
}

/// Outcome of a planning run
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlanReport {
    pub routes: Vec<PlannedRoute>,
    /// Stops the solver did not place
    pub unassigned: Vec<Stop>,
    /// Stops whose identifier could not be resolved, with the reason
    pub dropped: Vec<(Stop, String)>,
    /// Stops left out because some travel cost is unknown
    pub excluded: Vec<Stop>,
    pub build: BuildReport,
}

/// Planning orchestration; every dependency is passed in
pub struct RoutePlanner<'a> {
    geocoder: &'a mut GeoLookupClient,
    builder: &'a mut MatrixBuilder,
    solver: &'a dyn RouteSolver,
}

impl<'a> RoutePlanner<'a> {
    pub fn new(
        geocoder: &'a mut GeoLookupClient,
        builder: &'a mut MatrixBuilder,
        solver: &'a dyn RouteSolver,
    ) -> Self {
        Self {
            geocoder,
            builder,
            solver,
        }
    }

    /// Plan routes from `depot` over `stops` with `fleet`, optimizing `kind`
    pub fn plan(
        &mut self,
        depot: &str,
        stops: &[Stop],
        fleet: &[FleetVehicle],
        kind: MatrixKind,
    ) -> GeoMatrixResult<PlanReport> {
        let depot_coordinate = self.geocoder.resolve(depot)?;
        let mut report = PlanReport::default();

        let mut resolved = Vec::with_capacity(stops.len());
        for stop in stops {
            match self.geocoder.resolve(&stop.identifier) {
                Ok(coordinate) => resolved.push((stop.clone(), coordinate)),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!("Dropping stop {} ({}): {}", stop.id, stop.identifier, e);
                    report.dropped.push((stop.clone(), e.to_string()));
                }
            }
        }

        let coordinates: Vec<Coordinate> = std::iter::once(depot_coordinate)
            .chain(resolved.iter().map(|(_, c)| *c))
            .collect();
        let (matrices, build) = self.builder.get_matrices(&coordinates)?;
        report.build = build;

        // position 0 is the depot; positions 1.. follow `resolved`
        let retained = retain_complete(matrices.select(kind));
        for position in 1..coordinates.len() {
            if !retained.contains(&position) {
                let stop = resolved[position - 1].0.clone();
                warn!("Excluding stop {} ({}): missing travel cost", stop.id, stop.identifier);
                report.excluded.push(stop);
            }
        }

        if retained.len() <= 1 {
            info!("No stops left to route");
            return Ok(report);
        }

        let problem = build_problem(&matrices, kind, &retained, fleet);
        let solution = self.solver.solve(&problem)?;

        let mut assigned = std::collections::HashSet::new();
        for route in &solution.routes {
            let mut steps = route.steps.clone();
            steps.sort_by_key(|s| s.arrival);

            let mut visits = Vec::new();
            for step in steps.iter().filter(|s| s.kind == StepKind::Job) {
                let entry = step.job.and_then(|job| {
                    let position = *retained.get(job as usize)?;
                    resolved.get(position.checked_sub(1)?)
                });
                let Some((stop, coordinate)) = entry else {
                    warn!("Solver returned unknown job {:?}", step.job);
                    continue;
                };
                assigned.insert(stop.id);
                visits.push(Visit {
                    stop: stop.clone(),
                    coordinate: *coordinate,
                    arrival: step.arrival,
                    service: step.service,
                    waiting_time: step.waiting_time,
                });
            }

            let total_duration = steps.iter().map(|s| s.duration).max().unwrap_or(0);
            let path: Vec<usize> = steps.iter().map(|s| s.location).collect();
            report.routes.push(PlannedRoute {
                vehicle: route.vehicle,
                visits,
                total_duration,
                total_distance: path_length(&matrices.distance, &path, &retained),
            });
        }

        report.unassigned = resolved
            .iter()
            .enumerate()
            .filter(|(i, _)| retained.contains(&(i + 1)))
            .map(|(_, (stop, _))| stop)
            .filter(|stop| !assigned.contains(&stop.id))
            .cloned()
            .collect();

        info!(
            "Planned {} routes; {} unassigned, {} dropped, {} excluded",
            report.routes.len(),
            report.unassigned.len(),
            report.dropped.len(),
            report.excluded.len()
        );
        Ok(report)
    }
}

/// Positions to keep so that every pair among them has a known cost.
///
/// Greedily drops the stop with the most missing cells (ties go to the later
/// stop) until none are missing. Position 0, the depot, is always kept.
pub fn retain_complete(matrix: &CostMatrix) -> Vec<usize> {
    let mut retained: Vec<usize> = (0..matrix.size()).collect();

    loop {
        let worst = retained
            .iter()
            .filter(|&&i| i != 0)
            .map(|&i| {
                let missing = retained
                    .iter()
                    .filter(|&&j| !matrix.get(i, j).is_known())
                    .count();
                (missing, i)
            })
            .filter(|(missing, _)| *missing > 0)
            .max();

        match worst {
            Some((_, i)) => retained.retain(|&p| p != i),
            None => return retained,
        }
    }
}

/// Solver input over `retained` positions; the depot becomes index 0 and
/// job ids are the 1-based matrix indices of the stops.
pub fn build_problem(
    matrices: &TravelMatrices,
    kind: MatrixKind,
    retained: &[usize],
    fleet: &[FleetVehicle],
) -> Problem {
    let sub = matrices.select(kind).gather(retained);
    let matrix = sub
        .rows()
        .map(|row| {
            row.iter()
                .map(|c| c.value().map(|v| v.max(0.0).round() as u64).unwrap_or(u64::MAX))
                .collect()
        })
        .collect();

    Problem {
        matrix,
        vehicles: fleet
            .iter()
            .map(|v| Vehicle {
                id: v.id,
                start: 0,
                end: 0,
                time_window: v.time_window,
            })
            .collect(),
        jobs: (1..retained.len())
            .map(|index| Job {
                id: index as u64,
                location: index,
            })
            .collect(),
    }
}

/// Sum of distances along solver `path` (indices into the retained list)
fn path_length(distance: &CostMatrix, path: &[usize], retained: &[usize]) -> Option<f64> {
    path.windows(2)
        .map(|leg| {
            let from = *retained.get(leg[0])?;
            let to = *retained.get(leg[1])?;
            distance.get(from, to).value()
        })
        .sum()
}
