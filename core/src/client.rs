//! Stateless HTTP request builder and response parser for GeoPlanet v1.
//!
//! # Design
//! `GeoPlanetClient` holds only a `base_url` and the application id and
//! carries no mutable state between calls. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`. The caller executes the actual HTTP
//! round-trip, keeping the core deterministic and free of I/O dependencies.
//!
//! Parsing always inspects the status before the body: a 404 with a
//! perfectly good XML body is still an error.

use std::collections::HashMap;

use crate::error::GeoPlanetError;
use crate::http::{HttpRequest, HttpResponse};
use crate::mapper;
use crate::query::{self, Relation};
use crate::types::Place;

/// Root of the public GeoPlanet v1 API.
pub const DEFAULT_BASE_URL: &str = "http://where.yahooapis.com/v1";

/// Language requested for place names.
pub const LANGUAGE: &str = "en-US";

/// Representation requested for every resource.
const SELECT: &str = "long";

/// Synchronous, stateless client for the GeoPlanet API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone)]
pub struct GeoPlanetClient {
    base_url: String,
    app_id: String,
}

impl GeoPlanetClient {
    pub fn new(app_id: &str) -> Self {
        Self::with_base_url(app_id, DEFAULT_BASE_URL)
    }

    /// Point the client at another deployment of the v1 API, e.g. a mock
    /// server. `base_url` should include the `/v1` prefix.
    pub fn with_base_url(app_id: &str, base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id: app_id.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// GET request for `path` (relative to the base URL, no leading slash).
    pub fn request(&self, path: &str) -> HttpRequest {
        HttpRequest {
            url: format!(
                "{}/{path}?select={SELECT}&appid={}",
                self.base_url,
                query::encode(&self.app_id)
            ),
            headers: vec![
                ("accept".to_string(), "application/xml".to_string()),
                ("accept-language".to_string(), LANGUAGE.to_string()),
            ],
        }
    }

    pub fn build_places(&self, text: &str, place_type: Option<&str>, count: u32) -> HttpRequest {
        self.request(&query::places_path(text, place_type, count))
    }

    pub fn build_place(&self, woeid: &str) -> HttpRequest {
        self.request(&query::place_path(woeid))
    }

    /// Request for any relation of `woeid`. The type filter is ignored for
    /// relations that do not accept one, and `count` is ignored for
    /// `Relation::Parent`.
    pub fn build_relation(
        &self,
        woeid: &str,
        relation: Relation,
        place_type: Option<&str>,
        count: u32,
    ) -> HttpRequest {
        self.request(&query::relation_path(woeid, relation, place_type, count))
    }

    pub fn build_parent(&self, woeid: &str) -> HttpRequest {
        self.build_relation(woeid, Relation::Parent, None, 0)
    }

    pub fn build_ancestors(&self, woeid: &str, count: u32) -> HttpRequest {
        self.build_relation(woeid, Relation::Ancestors, None, count)
    }

    pub fn build_belongtos(&self, woeid: &str, place_type: Option<&str>, count: u32) -> HttpRequest {
        self.build_relation(woeid, Relation::Belongtos, place_type, count)
    }

    pub fn build_neighbors(&self, woeid: &str, count: u32) -> HttpRequest {
        self.build_relation(woeid, Relation::Neighbors, None, count)
    }

    pub fn build_siblings(&self, woeid: &str, count: u32) -> HttpRequest {
        self.build_relation(woeid, Relation::Siblings, None, count)
    }

    pub fn build_children(&self, woeid: &str, place_type: Option<&str>, count: u32) -> HttpRequest {
        self.build_relation(woeid, Relation::Children, place_type, count)
    }

    pub fn build_place_types(&self) -> HttpRequest {
        self.request(&query::place_types_path())
    }

    pub fn build_place_type(&self, code: u32) -> HttpRequest {
        self.request(&query::place_type_path(code))
    }

    /// Parse a place collection (`places`, `ancestors`, `children`, ...).
    pub fn parse_places(&self, response: HttpResponse) -> Result<Vec<Place>, GeoPlanetError> {
        check_status(&response)?;
        mapper::parse_places(&response.body)
    }

    /// Parse a single place (`place/{woeid}`, `parent`).
    pub fn parse_place(&self, response: HttpResponse) -> Result<Place, GeoPlanetError> {
        check_status(&response)?;
        mapper::parse_place(&response.body)
    }

    pub fn parse_place_types(
        &self,
        response: HttpResponse,
    ) -> Result<HashMap<u32, String>, GeoPlanetError> {
        check_status(&response)?;
        mapper::parse_place_types(&response.body)
    }

    /// Parse a single place type into its name.
    pub fn parse_place_type(&self, response: HttpResponse) -> Result<String, GeoPlanetError> {
        check_status(&response)?;
        mapper::parse_place_type(&response.body).map(|place_type| place_type.name)
    }
}

/// Map non-success status codes to the appropriate `GeoPlanetError` variant.
fn check_status(response: &HttpResponse) -> Result<(), GeoPlanetError> {
    match GeoPlanetError::from_status(response.status, &response.body) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
