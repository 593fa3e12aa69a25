//! External geocoding/routing service abstraction
//!
//! Provides a trait for the three remote calls the caches depend on, so the
//! components can run against the real HTTP API or a test double.

pub mod onemap;

pub use onemap::OneMapClient;

use crate::error::GeoMatrixResult;
use crate::geo::Coordinate;
use serde::{Deserialize, Deserializer, Serialize};

/// Abstract geocoding/routing service
///
/// Every method is one billed round trip. Callers are responsible for
/// passing through the quota governor first.
pub trait GeoService: Send + Sync {
    /// Look up an identifier (postal code, address fragment)
    fn search(&self, query: &str) -> GeoMatrixResult<SearchResponse>;

    /// Route between two coordinates with an access token
    fn route(&self, start: Coordinate, end: Coordinate, token: &str)
        -> GeoMatrixResult<RouteResponse>;

    /// Exchange account credentials for an access token
    fn request_token(&self, email: &str, password: &str) -> GeoMatrixResult<TokenResponse>;
}

/// Geocoding search response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Number of matches
    pub found: u32,

    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// A single geocoding match; the service returns numbers as strings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "LATITUDE")]
    pub latitude: String,

    #[serde(rename = "LONGITUDE")]
    pub longitude: String,

    #[serde(rename = "ADDRESS", default)]
    pub address: String,
}

impl SearchResult {
    /// Parse the coordinate, `None` if either component is malformed
    pub fn coordinate(&self) -> Option<Coordinate> {
        let lat = self.latitude.trim().parse::<f64>().ok()?;
        let lon = self.longitude.trim().parse::<f64>().ok()?;
        Some(Coordinate::new(lat, lon))
    }
}

/// Routing response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteResponse {
    /// 0 on success, anything else means no route for this pair
    pub status: i64,

    #[serde(default)]
    pub route_summary: Option<RouteSummary>,

    /// Encoded path geometry, only used by map rendering
    #[serde(default)]
    pub route_geometry: Option<String>,
}

impl RouteResponse {
    pub fn is_success(&self) -> bool {
        self.status == 0
    }
}

/// Totals for a routed pair
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RouteSummary {
    /// Seconds
    pub total_time: f64,

    /// Meters
    pub total_distance: f64,
}

/// Token endpoint response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    /// Unix seconds; the service sends it as a string
    #[serde(deserialize_with = "string_or_int")]
    pub expiry_timestamp: i64,
}

fn string_or_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Str(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(v) => Ok(v),
        Raw::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_response_parses() {
        let json = r#"{
            "found": 1,
            "totalNumPages": 1,
            "pageNum": 1,
            "results": [{
                "SEARCHVAL": "BLK 183",
                "LATITUDE": "1.3236092349281756",
                "LONGITUDE": "103.63496008940602",
                "ADDRESS": "183 JURONG WEST SINGAPORE 641183"
            }]
        }"#;
        let resp: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.found, 1);
        let coord = resp.results[0].coordinate().unwrap();
        assert_eq!(coord, Coordinate::new(1.3236092349281756, 103.63496008940602));
        assert!(resp.results[0].address.contains("641183"));
    }

    #[test]
    fn empty_search_has_no_results() {
        let resp: SearchResponse = serde_json::from_str(r#"{"found": 0}"#).unwrap();
        assert_eq!(resp.found, 0);
        assert!(resp.results.is_empty());
    }

    #[test]
    fn malformed_coordinate_is_none() {
        let result = SearchResult {
            latitude: "NIL".to_string(),
            longitude: "103.8".to_string(),
            address: String::new(),
        };
        assert!(result.coordinate().is_none());
    }

    #[test]
    fn route_response_parses() {
        let json = r#"{
            "status": 0,
            "route_geometry": "abc",
            "route_summary": {"total_time": 612, "total_distance": 4021.5}
        }"#;
        let resp: RouteResponse = serde_json::from_str(json).unwrap();
        assert!(resp.is_success());
        let summary = resp.route_summary.unwrap();
        assert_eq!(summary.total_time, 612.0);
        assert_eq!(summary.total_distance, 4021.5);
    }

    #[test]
    fn failed_route_has_no_summary() {
        let resp: RouteResponse = serde_json::from_str(r#"{"status": 207}"#).unwrap();
        assert!(!resp.is_success());
        assert!(resp.route_summary.is_none());
    }

    #[test]
    fn token_expiry_accepts_string_or_number() {
        let a: TokenResponse =
            serde_json::from_str(r#"{"access_token": "t", "expiry_timestamp": "1700000000"}"#)
                .unwrap();
        let b: TokenResponse =
            serde_json::from_str(r#"{"access_token": "t", "expiry_timestamp": 1700000000}"#)
                .unwrap();
        assert_eq!(a.expiry_timestamp, 1_700_000_000);
        assert_eq!(b.expiry_timestamp, 1_700_000_000);
    }
}
