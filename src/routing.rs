//! One billed routing call per coordinate pair

use crate::credentials::CredentialManager;
use crate::error::{GeoMatrixError, GeoMatrixResult};
use crate::geo::Coordinate;
use crate::matrix::Cost;
use crate::quota::QuotaGovernor;
use crate::service::GeoService;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Duration and distance for one pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegCost {
    pub duration: Cost,
    pub distance: Cost,
}

impl LegCost {
    pub fn known(duration: f64, distance: f64) -> Self {
        Self {
            duration: Cost::Known(duration),
            distance: Cost::Known(distance),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            duration: Cost::Unreachable,
            distance: Cost::Unreachable,
        }
    }
}

/// Quota-gated, authenticated routing calls
pub struct PairwiseCostClient {
    service: Arc<dyn GeoService>,
    governor: Arc<QuotaGovernor>,
    credentials: Arc<CredentialManager>,
    call_delay: Duration,
}

impl PairwiseCostClient {
    pub fn new(
        service: Arc<dyn GeoService>,
        governor: Arc<QuotaGovernor>,
        credentials: Arc<CredentialManager>,
        call_delay: Duration,
    ) -> Self {
        Self {
            service,
            governor,
            credentials,
            call_delay,
        }
    }

    /// Route `from` -> `to` once.
    ///
    /// A non-zero service status is a definitive `Unreachable`; a transport
    /// failure is `CallFailed` and is not retried. Token failures propagate
    /// unchanged so callers can abort.
    pub fn cost(&self, from: Coordinate, to: Coordinate) -> GeoMatrixResult<LegCost> {
        let token = self.credentials.get_token()?;

        self.governor.allow_call();
        let result = self.service.route(from, to, &token);
        self.governor.pause(self.call_delay);

        let response = result.map_err(|e| GeoMatrixError::call_failed(from, to, e.to_string()))?;

        if !response.is_success() {
            debug!("No route {} -> {} (status {})", from, to, response.status);
            return Ok(LegCost::unreachable());
        }

        match response.route_summary {
            Some(summary) => Ok(LegCost::known(summary.total_time, summary.total_distance)),
            None => Err(GeoMatrixError::call_failed(
                from,
                to,
                "success status without a route summary",
            )),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::client;
    use super::*;
    use crate::quota::test_clock::ManualClock;
    use crate::service::fake::FakeService;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn a() -> Coordinate {
        Coordinate::new(1.319728, 103.8421)
    }

    fn b() -> Coordinate {
        Coordinate::new(1.299728905, 103.8421581)
    }

    #[test]
    fn success_yields_known_costs() {
        let temp = TempDir::new().unwrap();
        let svc = Arc::new(FakeService::new());
        let costs = client(svc.clone(), temp.path(), Arc::new(ManualClock::new()));

        let leg = costs.cost(a(), b()).unwrap();
        let (d, m) = FakeService::expected(a(), b());
        assert_eq!(leg, LegCost::known(d, m));
        assert_eq!(svc.routes(), 1);
    }

    #[test]
    fn non_zero_status_is_unreachable() {
        let temp = TempDir::new().unwrap();
        let svc = Arc::new(FakeService {
            unroutable: HashSet::from([(a(), b())]),
            ..FakeService::default()
        });
        let costs = client(svc, temp.path(), Arc::new(ManualClock::new()));

        assert_eq!(costs.cost(b(), a()).unwrap(), LegCost::unreachable());
    }

    #[test]
    fn transport_failure_is_call_failed() {
        let temp = TempDir::new().unwrap();
        let svc = Arc::new(FakeService::new());
        svc.break_pair(a(), b());
        let costs = client(svc.clone(), temp.path(), Arc::new(ManualClock::new()));

        let err = costs.cost(a(), b()).unwrap_err();
        assert!(matches!(err, GeoMatrixError::CallFailed { .. }));
        assert!(!err.is_fatal());
        assert_eq!(svc.routes(), 1);
    }

    #[test]
    fn every_call_is_spaced() {
        let temp = TempDir::new().unwrap();
        let svc = Arc::new(FakeService::new());
        let clock = Arc::new(ManualClock::new());
        let costs = client(svc, temp.path(), clock.clone());

        costs.cost(a(), b()).unwrap();
        costs.cost(b(), a()).unwrap();
        assert_eq!(clock.slept(), Duration::from_secs(1));
    }

    #[test]
    fn auth_failure_is_fatal_and_skips_call() {
        let temp = TempDir::new().unwrap();
        let svc = Arc::new(FakeService {
            reject_credentials: true,
            ..FakeService::default()
        });
        let costs = client(svc.clone(), temp.path(), Arc::new(ManualClock::new()));

        let err = costs.cost(a(), b()).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(svc.routes(), 0);
    }
}
