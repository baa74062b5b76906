//! Records produced from GeoPlanet responses.
//!
//! # Design
//! Every scalar is kept as the string the service sent, coordinates
//! included, so no precision or formatting is lost. Fields the service
//! leaves out are empty strings rather than `Option`s. Serde keys follow
//! the wire names (`placeTypeName`, `boundingBox`, ...) and missing keys
//! read back as empty strings, mirroring the XML mapping.

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair as sent by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coordinates {
    pub lat: String,
    pub lng: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoundingBox {
    pub south_west: Coordinates,
    pub north_east: Coordinates,
}

/// The long representation of a single place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Place {
    pub woeid: String,
    pub place_type_name: String,
    pub name: String,
    pub country: String,
    pub admin1: String,
    pub admin2: String,
    pub admin3: String,
    pub locality1: String,
    pub locality2: String,
    pub postal: String,
    pub centroid: Coordinates,
    pub bounding_box: BoundingBox,
}

/// A place type code and its name, e.g. `7` / `Town`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceType {
    pub code: u32,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_serializes_with_wire_names() {
        let place = Place {
            woeid: "615702".to_string(),
            place_type_name: "Town".to_string(),
            ..Place::default()
        };
        let json = serde_json::to_value(&place).unwrap();
        assert_eq!(json["woeid"], "615702");
        assert_eq!(json["placeTypeName"], "Town");
        assert_eq!(json["boundingBox"]["southWest"]["lat"], "");
    }

    #[test]
    fn missing_json_keys_default_to_empty() {
        let place: Place = serde_json::from_str(r#"{"woeid":"1","centroid":{"lat":"0"}}"#).unwrap();
        assert_eq!(place.woeid, "1");
        assert_eq!(place.admin1, "");
        assert_eq!(place.centroid.lat, "0");
        assert_eq!(place.centroid.lng, "");
    }
}
