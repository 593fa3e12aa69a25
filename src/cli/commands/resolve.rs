//! Resolve command - identifiers to coordinates

use crate::cli::args::{OutputFormat, ResolveArgs};
use crate::cli::factory::Components;
use crate::config::Config;
use crate::error::GeoMatrixResult;
use crate::geocode::GeoLookupClient;
use crate::matrix::BuildOptions;
use crate::ui::{self, UiContext};
use console::style;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct Resolution {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Execute the resolve command
pub fn execute(args: ResolveArgs, config: &Config) -> GeoMatrixResult<()> {
    let ctx = UiContext::detect();
    let mut components = Components::from_config(config, BuildOptions::default())?;

    let resolutions = resolve_all(&mut components.geocoder, &args.ids)?;

    match args.format {
        OutputFormat::Table => print_table(&resolutions),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&resolutions)?),
    }

    let missing = resolutions.iter().filter(|r| r.error.is_some()).count();
    if missing > 0 && args.format == OutputFormat::Table {
        ui::step_warn(
            &ctx,
            &format!("{} of {} identifiers not resolved", missing, resolutions.len()),
        );
    }
    Ok(())
}

/// Resolve each identifier; only fatal errors abort
pub(crate) fn resolve_all(
    geocoder: &mut GeoLookupClient,
    ids: &[String],
) -> GeoMatrixResult<Vec<Resolution>> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        let resolution = match geocoder.lookup(id) {
            Ok(entry) => Resolution {
                id: id.clone(),
                latitude: Some(entry.coordinate.latitude),
                longitude: Some(entry.coordinate.longitude),
                address: Some(entry.address),
                error: None,
            },
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => Resolution {
                id: id.clone(),
                latitude: None,
                longitude: None,
                address: None,
                error: Some(e.to_string()),
            },
        };
        out.push(resolution);
    }
    Ok(out)
}

fn print_table(resolutions: &[Resolution]) {
    println!(
        "{:<12} {:<12} {:<12} {}",
        "ID", "LATITUDE", "LONGITUDE", "ADDRESS"
    );
    println!("{}", "-".repeat(72));

    for r in resolutions {
        match (r.latitude, r.longitude) {
            (Some(lat), Some(lon)) => println!(
                "{:<12} {:<12.6} {:<12.6} {}",
                r.id,
                lat,
                lon,
                r.address.as_deref().unwrap_or_default()
            ),
            _ => println!(
                "{:<12} {}",
                r.id,
                style(r.error.as_deref().unwrap_or("not found")).yellow()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::GeoCache;
    use crate::quota::test_clock::ManualClock;
    use crate::quota::QuotaGovernor;
    use crate::service::fake::FakeService;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn unresolved_ids_are_reported_not_fatal() {
        let temp = TempDir::new().unwrap();
        let service = Arc::new(FakeService::new().with_place("338729", 1.3, 103.85));
        let governor = Arc::new(QuotaGovernor::new(
            150,
            Duration::from_secs(60),
            Arc::new(ManualClock::new()),
        ));
        let mut geocoder = GeoLookupClient::new(
            service,
            governor,
            GeoCache::open(temp.path().join("geocode.json")),
        );

        let ids = vec!["338729".to_string(), "000000".to_string()];
        let out = resolve_all(&mut geocoder, &ids).unwrap();

        assert_eq!(out[0].latitude, Some(1.3));
        assert_eq!(out[0].address.as_deref(), Some("338729 TEST STREET"));
        assert!(out[1].error.as_deref().unwrap().contains("000000"));

        let json = serde_json::to_value(&out).unwrap();
        assert!(json[1].get("latitude").is_none());
    }
}
