//! Blocking client for the Yahoo! GeoPlanet place lookup API.
//!
//! # Overview
//! `GeoPlanet` wraps the sans-IO `geoplanet-core` client with a transport
//! and exposes one method per API resource. Each call is a single GET with
//! a 5 second connect timeout, redirects followed.
//!
//! ```no_run
//! let geo = geoplanet::GeoPlanet::new("my-app-id");
//! for place in geo.get_places("Sunnyvale", Some("Town"), 0)? {
//!     println!("{} {} ({}, {})", place.woeid, place.name, place.centroid.lat, place.centroid.lng);
//! }
//! # Ok::<(), geoplanet::GeoPlanetError>(())
//! ```

pub mod service;
pub mod transport;

pub use geoplanet_core::{
    BoundingBox, Coordinates, ErrorKind, GeoPlanetClient, GeoPlanetError, HttpRequest,
    HttpResponse, Place, PlaceType, Relation,
};
pub use service::GeoPlanet;
pub use transport::{Transport, UreqTransport, CONNECT_TIMEOUT, MAX_REDIRECTS};
