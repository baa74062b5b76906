//! Synchronous client core for the Yahoo! GeoPlanet place lookup API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, which keeps the core deterministic and testable.
//!
//! # Design
//! - `GeoPlanetClient` is stateless: it holds only the base URL and the
//!   application id.
//! - Each operation is split into `build_*` (produces the request) and
//!   `parse_*` (consumes the response), so the I/O boundary is explicit.
//! - `query` writes the service's path expressions, `mapper` turns XML
//!   bodies into `Place` and `PlaceType` records with empty-string
//!   defaults.

pub mod client;
pub mod error;
pub mod http;
pub mod mapper;
pub mod query;
pub mod types;

pub use client::{GeoPlanetClient, DEFAULT_BASE_URL, LANGUAGE};
pub use error::{ErrorKind, GeoPlanetError};
pub use http::{HttpRequest, HttpResponse};
pub use query::Relation;
pub use types::{BoundingBox, Coordinates, Place, PlaceType};
