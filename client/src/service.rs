//! The GeoPlanet service client.
//!
//! Every operation is the same three steps: build the request with
//! `GeoPlanetClient`, execute it once on the transport, parse the response
//! with `GeoPlanetClient`. Errors come back as soon as they are detected;
//! nothing is retried or cached.

use std::collections::HashMap;

use geoplanet_core::{GeoPlanetClient, GeoPlanetError, HttpRequest, HttpResponse, Place};
use tracing::debug;

use crate::transport::{Transport, UreqTransport};

/// Blocking client for the GeoPlanet v1 API.
///
/// Holds only immutable configuration and the transport, so a shared
/// reference can be used from several threads when the transport allows it
/// (`UreqTransport` does).
#[derive(Clone)]
pub struct GeoPlanet<T = UreqTransport> {
    client: GeoPlanetClient,
    transport: T,
}

impl GeoPlanet<UreqTransport> {
    /// Client for the public API using the given application id.
    pub fn new(app_id: &str) -> Self {
        Self::with_transport(GeoPlanetClient::new(app_id), UreqTransport::new())
    }

    /// Client for another deployment of the API. `base_url` includes `/v1`.
    pub fn with_base_url(app_id: &str, base_url: &str) -> Self {
        Self::with_transport(
            GeoPlanetClient::with_base_url(app_id, base_url),
            UreqTransport::new(),
        )
    }
}

impl<T: Transport> GeoPlanet<T> {
    pub fn with_transport(client: GeoPlanetClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &GeoPlanetClient {
        &self.client
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, GeoPlanetError> {
        // The query string carries the appid; keep it out of the logs.
        let resource = request.url.split('?').next().unwrap_or_default();
        debug!(resource, "GeoPlanet request");
        let response = self.transport.execute(&request)?;
        debug!(resource, status = response.status, bytes = response.body.len(), "GeoPlanet response");
        Ok(response)
    }

    /// Places whose name matches `query`, optionally restricted to a place
    /// type (name or code). `count` 0 leaves the page size to the service.
    pub fn get_places(
        &self,
        query: &str,
        place_type: Option<&str>,
        count: u32,
    ) -> Result<Vec<Place>, GeoPlanetError> {
        let response = self.send(self.client.build_places(query, place_type, count))?;
        self.client.parse_places(response)
    }

    pub fn get_place(&self, woeid: &str) -> Result<Place, GeoPlanetError> {
        let response = self.send(self.client.build_place(woeid))?;
        self.client.parse_place(response)
    }

    pub fn get_parent(&self, woeid: &str) -> Result<Place, GeoPlanetError> {
        let response = self.send(self.client.build_parent(woeid))?;
        self.client.parse_place(response)
    }

    /// The parent hierarchy of a place, nearest first.
    pub fn get_ancestors(&self, woeid: &str, count: u32) -> Result<Vec<Place>, GeoPlanetError> {
        let response = self.send(self.client.build_ancestors(woeid, count))?;
        self.client.parse_places(response)
    }

    /// Places that have `woeid` as a child or descendant.
    pub fn get_belongtos(
        &self,
        woeid: &str,
        place_type: Option<&str>,
        count: u32,
    ) -> Result<Vec<Place>, GeoPlanetError> {
        let response = self.send(self.client.build_belongtos(woeid, place_type, count))?;
        self.client.parse_places(response)
    }

    pub fn get_neighbors(&self, woeid: &str, count: u32) -> Result<Vec<Place>, GeoPlanetError> {
        let response = self.send(self.client.build_neighbors(woeid, count))?;
        self.client.parse_places(response)
    }

    pub fn get_siblings(&self, woeid: &str, count: u32) -> Result<Vec<Place>, GeoPlanetError> {
        let response = self.send(self.client.build_siblings(woeid, count))?;
        self.client.parse_places(response)
    }

    pub fn get_children(
        &self,
        woeid: &str,
        place_type: Option<&str>,
        count: u32,
    ) -> Result<Vec<Place>, GeoPlanetError> {
        let response = self.send(self.client.build_children(woeid, place_type, count))?;
        self.client.parse_places(response)
    }

    /// Every place type the service knows, keyed by code.
    pub fn get_place_types(&self) -> Result<HashMap<u32, String>, GeoPlanetError> {
        let response = self.send(self.client.build_place_types())?;
        self.client.parse_place_types(response)
    }

    /// Name of the place type with the given code.
    pub fn get_place_type(&self, code: u32) -> Result<String, GeoPlanetError> {
        let response = self.send(self.client.build_place_type(code))?;
        self.client.parse_place_type(response)
    }
}
