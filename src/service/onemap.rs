//! Blocking HTTP implementation of [`GeoService`]

use super::{GeoService, RouteResponse, SearchResponse, TokenResponse};
use crate::config::schema::ServiceConfig;
use crate::error::{GeoMatrixError, GeoMatrixResult};
use crate::geo::Coordinate;
use serde::Serialize;
use tracing::debug;
use ureq::Agent;

const SEARCH_PATH: &str = "/api/common/elastic/search";
const ROUTE_PATH: &str = "/api/public/routingsvc/route";
const TOKEN_PATH: &str = "/api/auth/post/getToken";

/// OneMap API client
pub struct OneMapClient {
    agent: Agent,
    base_url: String,
    route_type: String,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    email: &'a str,
    password: &'a str,
}

impl OneMapClient {
    /// Create a client with the configured base URL and timeout
    pub fn new(config: &ServiceConfig) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(config.request_timeout()))
            .build()
            .into();

        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            route_type: config.route_type.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl GeoService for OneMapClient {
    fn search(&self, query: &str) -> GeoMatrixResult<SearchResponse> {
        debug!("Searching for '{}'", query);

        let mut response = self
            .agent
            .get(&self.url(SEARCH_PATH))
            .query("searchVal", query)
            .query("returnGeom", "Y")
            .query("getAddrDetails", "Y")
            .query("pageNum", "1")
            .call()?;

        Ok(response.body_mut().read_json::<SearchResponse>()?)
    }

    fn route(
        &self,
        start: Coordinate,
        end: Coordinate,
        token: &str,
    ) -> GeoMatrixResult<RouteResponse> {
        debug!("Routing {} -> {}", start, end);

        let mut response = self
            .agent
            .get(&self.url(ROUTE_PATH))
            .query("start", start.query_param())
            .query("end", end.query_param())
            .query("routeType", &self.route_type)
            .header("Authorization", token)
            .call()?;

        Ok(response.body_mut().read_json::<RouteResponse>()?)
    }

    fn request_token(&self, email: &str, password: &str) -> GeoMatrixResult<TokenResponse> {
        debug!("Requesting access token");

        let mut response = self
            .agent
            .post(&self.url(TOKEN_PATH))
            .send_json(&TokenRequest { email, password })
            .map_err(|e| GeoMatrixError::Authentication(e.to_string()))?;

        response
            .body_mut()
            .read_json::<TokenResponse>()
            .map_err(|e| GeoMatrixError::Authentication(format!("unreadable token response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config = ServiceConfig {
            base_url: "https://example.test/".to_string(),
            ..ServiceConfig::default()
        };
        let client = OneMapClient::new(&config);
        assert_eq!(
            client.url(ROUTE_PATH),
            "https://example.test/api/public/routingsvc/route"
        );
    }
}
