//! Error types for the GeoPlanet client.
//!
//! # Design
//! Each status the service documents gets its own variant, and every
//! variant that came from a response keeps the raw body so callers can log
//! what the service actually said. Statuses the service does not document
//! land in `UnexpectedStatus` instead of being parsed as XML.

use thiserror::Error;

/// Marker the service puts in a 404 body when the route matched but the
/// resource (usually a WOEID) does not exist.
const RESOURCE_MISSING_MARKER: &str = "Could not find the resource";

/// Errors returned by `GeoPlanetClient` parse methods and by transports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeoPlanetError {
    /// A 2xx body was empty or not well-formed XML. Bodies that were not
    /// UTF-8 arrive here with U+FFFD in place of the bad bytes.
    #[error("could not parse XML: {reason}")]
    BadXml { reason: String, body: String },

    /// HTTP 400, almost always a missing or invalid appid.
    #[error("a valid appid parameter is required for this resource")]
    BadRequest { body: String },

    /// HTTP 404 for a URI the service has no route for.
    #[error("URI has no match in the display map")]
    NotFound { body: String },

    /// HTTP 404 for a route that matched but whose resource does not exist.
    #[error("could not find the requested resource")]
    ResourceMissing { body: String },

    /// HTTP 406.
    #[error("requested representation not available for this resource")]
    NotAcceptable { body: String },

    /// Any non-2xx status other than 400, 404 and 406.
    #[error("unexpected HTTP status {status}")]
    UnexpectedStatus { status: u16, body: String },

    /// The request never produced a status line (DNS, connect timeout,
    /// TLS, refused connection).
    #[error("transport error: {0}")]
    Transport(String),
}

/// The kind of a `GeoPlanetError`, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadXml,
    BadRequest,
    NotFound,
    ResourceMissing,
    NotAcceptable,
    UnexpectedStatus,
    Transport,
}

impl ErrorKind {
    /// Stable numeric code. The first five match the codes historically
    /// used by GeoPlanet client libraries.
    pub fn code(self) -> u8 {
        match self {
            ErrorKind::BadXml => 1,
            ErrorKind::BadRequest => 2,
            ErrorKind::NotFound => 3,
            ErrorKind::ResourceMissing => 4,
            ErrorKind::NotAcceptable => 5,
            ErrorKind::UnexpectedStatus => 6,
            ErrorKind::Transport => 7,
        }
    }
}

impl GeoPlanetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GeoPlanetError::BadXml { .. } => ErrorKind::BadXml,
            GeoPlanetError::BadRequest { .. } => ErrorKind::BadRequest,
            GeoPlanetError::NotFound { .. } => ErrorKind::NotFound,
            GeoPlanetError::ResourceMissing { .. } => ErrorKind::ResourceMissing,
            GeoPlanetError::NotAcceptable { .. } => ErrorKind::NotAcceptable,
            GeoPlanetError::UnexpectedStatus { .. } => ErrorKind::UnexpectedStatus,
            GeoPlanetError::Transport(_) => ErrorKind::Transport,
        }
    }

    /// Raw response body, or `""` for transport errors.
    pub fn body(&self) -> &str {
        match self {
            GeoPlanetError::BadXml { body, .. }
            | GeoPlanetError::BadRequest { body }
            | GeoPlanetError::NotFound { body }
            | GeoPlanetError::ResourceMissing { body }
            | GeoPlanetError::NotAcceptable { body }
            | GeoPlanetError::UnexpectedStatus { body, .. } => body,
            GeoPlanetError::Transport(_) => "",
        }
    }

    /// Map a non-2xx response to its error. Returns `None` for 2xx.
    pub(crate) fn from_status(status: u16, body: &str) -> Option<Self> {
        let body = body.to_string();
        let err = match status {
            200..=299 => return None,
            400 => GeoPlanetError::BadRequest { body },
            404 if body.contains(RESOURCE_MISSING_MARKER) => {
                GeoPlanetError::ResourceMissing { body }
            }
            404 => GeoPlanetError::NotFound { body },
            406 => GeoPlanetError::NotAcceptable { body },
            status => GeoPlanetError::UnexpectedStatus { status, body },
        };
        Some(err)
    }
}
