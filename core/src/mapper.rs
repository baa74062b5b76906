//! XML to record mapping for GeoPlanet response bodies.
//!
//! # Design
//! Bodies are read once with a streaming `quick_xml::Reader` into a small
//! element tree, which also enforces well-formedness (one root, balanced
//! tags, no stray text). Records are then picked out of the tree by
//! element name:
//! - a scalar field is the text of the first direct child with that name;
//!   missing children read as `""`, since not every place has every
//!   administrative level populated
//! - collections take every direct child with the item name, in document
//!   order, whatever sits between them
//! - text is the element's own text and CDATA, unescaped and untrimmed;
//!   text inside nested children is not included
//!
//! Unknown elements and attributes (`areaRank`, `yahoo:uri`, ...) are
//! ignored.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::GeoPlanetError;
use crate::types::{BoundingBox, Coordinates, Place, PlaceType};

#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Result<Self, String> {
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| e.to_string())?;
            let value = attr.unescape_value().map_err(|e| e.to_string())?;
            attributes.push((
                String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                value.into_owned(),
            ));
        }
        Ok(Element {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            attributes,
            ..Element::default()
        })
    }

    /// First direct child called `name`.
    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    fn find(&self, path: &[&str]) -> Option<&Element> {
        path.iter().try_fold(self, |node, name| node.child(name))
    }

    fn text_at(&self, path: &[&str]) -> String {
        self.find(path).map(|node| node.text.clone()).unwrap_or_default()
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

fn coordinates(point: Option<&Element>) -> Coordinates {
    point
        .map(|point| Coordinates {
            lat: point.text_at(&["latitude"]),
            lng: point.text_at(&["longitude"]),
        })
        .unwrap_or_default()
}

fn place(node: &Element) -> Place {
    Place {
        woeid: node.text_at(&["woeid"]),
        place_type_name: node.text_at(&["placeTypeName"]),
        name: node.text_at(&["name"]),
        country: node.text_at(&["country"]),
        admin1: node.text_at(&["admin1"]),
        admin2: node.text_at(&["admin2"]),
        admin3: node.text_at(&["admin3"]),
        locality1: node.text_at(&["locality1"]),
        locality2: node.text_at(&["locality2"]),
        postal: node.text_at(&["postal"]),
        centroid: coordinates(node.child("centroid")),
        bounding_box: BoundingBox {
            south_west: coordinates(node.find(&["boundingBox", "southWest"])),
            north_east: coordinates(node.find(&["boundingBox", "northEast"])),
        },
    }
}

fn place_type(node: &Element) -> PlaceType {
    let name = node.child("placeTypeName");
    PlaceType {
        // A missing or non-numeric code reads as 0.
        code: name
            .and_then(|name| name.attribute("code"))
            .and_then(|code| code.trim().parse().ok())
            .unwrap_or(0),
        name: name.map(|name| name.text.clone()).unwrap_or_default(),
    }
}

/// Map a single-place body; the root element is the place.
pub fn parse_place(body: &str) -> Result<Place, GeoPlanetError> {
    Ok(place(&parse_document(body)?))
}

/// Map a collection body; every `place` child of the root, in document order.
pub fn parse_places(body: &str) -> Result<Vec<Place>, GeoPlanetError> {
    let root = parse_document(body)?;
    Ok(root.children_named("place").map(place).collect())
}

/// Map a `placeTypes` body into records, in document order.
pub fn parse_place_type_list(body: &str) -> Result<Vec<PlaceType>, GeoPlanetError> {
    let root = parse_document(body)?;
    Ok(root.children_named("placeType").map(place_type).collect())
}

/// Map a `placeTypes` body into a code → name table. A code seen twice keeps
/// the later name.
pub fn parse_place_types(body: &str) -> Result<HashMap<u32, String>, GeoPlanetError> {
    Ok(parse_place_type_list(body)?
        .into_iter()
        .map(|place_type| (place_type.code, place_type.name))
        .collect())
}

/// Map a single `placeType` body; the root element is the place type.
pub fn parse_place_type(body: &str) -> Result<PlaceType, GeoPlanetError> {
    Ok(place_type(&parse_document(body)?))
}

fn parse_document(body: &str) -> Result<Element, GeoPlanetError> {
    build_tree(body).map_err(|reason| GeoPlanetError::BadXml {
        reason,
        body: body.to_string(),
    })
}

/// Read the whole body into a tree, accepting exactly one root element with
/// balanced, matching tags and no stray text around it.
fn build_tree(body: &str) -> Result<Element, String> {
    let mut reader = Reader::from_str(body);
    let mut open: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("at byte {}: {e}", reader.buffer_position()))?;
        match event {
            Event::Start(start) => {
                if open.is_empty() && root.is_some() {
                    return Err("more than one root element".to_string());
                }
                open.push(Element::open(&start)?);
            }
            Event::Empty(start) => attach(&mut open, &mut root, Element::open(&start)?)?,
            Event::End(_) => {
                let element = open
                    .pop()
                    .ok_or_else(|| "end tag without a matching start tag".to_string())?;
                attach(&mut open, &mut root, element)?;
            }
            Event::Text(text) => match open.last_mut() {
                Some(parent) => parent
                    .text
                    .push_str(&text.unescape().map_err(|e| e.to_string())?),
                None if text.iter().all(u8::is_ascii_whitespace) => {}
                None => return Err("text outside the root element".to_string()),
            },
            Event::CData(cdata) => match open.last_mut() {
                Some(parent) => parent.text.push_str(&String::from_utf8_lossy(&cdata)),
                None => return Err("CDATA outside the root element".to_string()),
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if !open.is_empty() {
        return Err("unexpected end of document inside an element".to_string());
    }
    root.ok_or_else(|| "no root element".to_string())
}

fn attach(
    open: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), String> {
    match open.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_some() => return Err("more than one root element".to_string()),
        None => *root = Some(element),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUNNYVALE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<place xmlns="http://where.yahooapis.com/v1/schema.rng" xmlns:yahoo="http://www.yahooapis.com/v1/base.rng" yahoo:uri="http://where.yahooapis.com/v1/place/2502265" xml:lang="en-US">
  <woeid>2502265</woeid>
  <placeTypeName code="7">Town</placeTypeName>
  <name>Sunnyvale</name>
  <country type="Country" code="US">United States</country>
  <admin1 type="State" code="US-CA">California</admin1>
  <admin2 type="County" code="">Santa Clara</admin2>
  <admin3>Silicon Valley</admin3>
  <locality1 type="Town">Sunnyvale</locality1>
  <locality2 type="Suburb">Lakewood</locality2>
  <postal type="Zip Code">94086</postal>
  <centroid>
    <latitude>37.371609</latitude>
    <longitude>-122.038254</longitude>
  </centroid>
  <boundingBox>
    <southWest>
      <latitude>37.332298</latitude>
      <longitude>-122.065659</longitude>
    </southWest>
    <northEast>
      <latitude>37.45206</latitude>
      <longitude>-121.982407</longitude>
    </northEast>
  </boundingBox>
  <areaRank>4</areaRank>
  <popRank>0</popRank>
</place>"#;

    #[test]
    fn maps_every_populated_field() {
        let place = parse_place(SUNNYVALE).unwrap();
        assert_eq!(place.woeid, "2502265");
        assert_eq!(place.place_type_name, "Town");
        assert_eq!(place.name, "Sunnyvale");
        assert_eq!(place.country, "United States");
        assert_eq!(place.admin1, "California");
        assert_eq!(place.admin2, "Santa Clara");
        assert_eq!(place.admin3, "Silicon Valley");
        assert_eq!(place.locality1, "Sunnyvale");
        assert_eq!(place.locality2, "Lakewood");
        assert_eq!(place.postal, "94086");
        assert_eq!(
            place.centroid,
            Coordinates {
                lat: "37.371609".to_string(),
                lng: "-122.038254".to_string(),
            }
        );
        assert_eq!(place.bounding_box.south_west.lat, "37.332298");
        assert_eq!(place.bounding_box.south_west.lng, "-122.065659");
        assert_eq!(place.bounding_box.north_east.lat, "37.45206");
        assert_eq!(place.bounding_box.north_east.lng, "-121.982407");
    }

    #[test]
    fn missing_and_empty_children_become_empty_strings() {
        let body = "<place><woeid>1</woeid><name>Earth</name><admin3/></place>";
        let place = parse_place(body).unwrap();
        assert_eq!(place.woeid, "1");
        assert_eq!(place.name, "Earth");
        assert_eq!(place.admin2, "");
        assert_eq!(place.admin3, "");
        assert_eq!(place.centroid, Coordinates::default());
        assert_eq!(place.bounding_box, BoundingBox::default());
    }

    #[test]
    fn coordinates_keep_source_formatting() {
        let body = "<place><centroid><latitude>48.856930</latitude>\
                    <longitude>2.3410</longitude></centroid></place>";
        let place = parse_place(body).unwrap();
        assert_eq!(place.centroid.lat, "48.856930");
        assert_eq!(place.centroid.lng, "2.3410");
    }

    #[test]
    fn collection_preserves_document_order() {
        let body = r#"<places yahoo:start="0" yahoo:count="3" yahoo:total="3">
            <place><woeid>1</woeid><name>A</name></place>
            <place><woeid>2</woeid><name>B</name></place>
            <place><woeid>3</woeid><name>C</name></place>
        </places>"#;
        let names: Vec<String> = parse_places(body).unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[test]
    fn empty_collection_is_empty() {
        assert!(parse_places(r#"<places yahoo:count="0"/>"#).unwrap().is_empty());
        assert!(parse_places("<places></places>").unwrap().is_empty());
    }

    #[test]
    fn place_types_fold_into_table() {
        let body = r#"<placeTypes>
            <placeType><placeTypeName code="1">Historical Town</placeTypeName></placeType>
            <placeType><placeTypeName code="2">Building</placeTypeName></placeType>
        </placeTypes>"#;
        let types = parse_place_types(body).unwrap();
        assert_eq!(types.len(), 2);
        assert_eq!(types[&1], "Historical Town");
        assert_eq!(types[&2], "Building");
    }

    #[test]
    fn duplicate_place_type_code_keeps_last() {
        let body = r#"<placeTypes>
            <placeType><placeTypeName code="7">Town</placeTypeName></placeType>
            <placeType><placeTypeName code="7">City</placeTypeName></placeType>
        </placeTypes>"#;
        let types = parse_place_types(body).unwrap();
        assert_eq!(types.len(), 1);
        assert_eq!(types[&7], "City");
    }

    #[test]
    fn place_type_list_keeps_order_and_defaults_code() {
        let body = r#"<placeTypes>
            <placeType><placeTypeName code="12">Country</placeTypeName></placeType>
            <placeType><placeTypeName>Unnamed</placeTypeName></placeType>
        </placeTypes>"#;
        let list = parse_place_type_list(body).unwrap();
        assert_eq!(
            list,
            vec![
                PlaceType { code: 12, name: "Country".to_string() },
                PlaceType { code: 0, name: "Unnamed".to_string() },
            ]
        );
    }

    #[test]
    fn single_place_type() {
        let body = r#"<placeType yahoo:uri="http://where.yahooapis.com/v1/placetype/7">
            <placeTypeName code="7">Town</placeTypeName>
            <placeTypeDescription>A populated settlement</placeTypeDescription>
        </placeType>"#;
        let place_type = parse_place_type(body).unwrap();
        assert_eq!(place_type, PlaceType { code: 7, name: "Town".to_string() });
    }

    #[test]
    fn entities_are_unescaped() {
        let place = parse_place("<place><name>Trinidad &amp; Tobago</name></place>").unwrap();
        assert_eq!(place.name, "Trinidad & Tobago");
    }

    #[test]
    fn malformed_bodies_are_bad_xml_with_raw_body() {
        for body in [
            "",
            "   ",
            "not xml at all",
            "<place><woeid>1</place>",
            "<place><woeid>1</woeid>",
            "<place/><place/>",
            "<place/>trailing",
        ] {
            match parse_place(body) {
                Err(GeoPlanetError::BadXml { body: raw, .. }) => assert_eq!(raw, body),
                other => panic!("{body:?}: expected BadXml, got {other:?}"),
            }
        }
    }

    #[test]
    fn prolog_and_comments_are_allowed_around_the_root() {
        let body = "<?xml version=\"1.0\"?>\n<!-- generated -->\n<places/>\n";
        assert!(parse_places(body).unwrap().is_empty());
    }

    #[test]
    fn collection_skips_elements_between_places() {
        let body = "<places><place><name>A</name></place><note/>\
                    <place><name>B</name></place></places>";
        let names: Vec<String> = parse_places(body).unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["A", "B"]);

        let body = r#"<placeTypes><placeType><placeTypeName code="7">Town</placeTypeName></placeType>
            <comment>x</comment>
            <placeType><placeTypeName code="9">County</placeTypeName></placeType></placeTypes>"#;
        assert_eq!(parse_place_type_list(body).unwrap().len(), 2);
    }

    #[test]
    fn repeated_child_keeps_the_first() {
        let body = "<place><name>A</name><name>B</name>\
                    <centroid><latitude>1</latitude><latitude>2</latitude></centroid></place>";
        let place = parse_place(body).unwrap();
        assert_eq!(place.name, "A");
        assert_eq!(place.centroid.lat, "1");
    }

    #[test]
    fn mixed_content_keeps_only_direct_text() {
        let place = parse_place("<place><name>A<x>skipped</x>B</name></place>").unwrap();
        assert_eq!(place.name, "AB");

        let place = parse_place("<place><name><![CDATA[R&D]]> Park</name></place>").unwrap();
        assert_eq!(place.name, "R&D Park");
    }

    #[test]
    fn text_is_not_trimmed() {
        let place =
            parse_place("<place><name>  Santa Clara  </name><admin1>\n</admin1></place>").unwrap();
        assert_eq!(place.name, "  Santa Clara  ");
        assert_eq!(place.admin1, "\n");
    }

    #[test]
    fn root_of_a_single_place_is_not_searched_for_nested_places() {
        let body = "<place><woeid>1</woeid><place><woeid>2</woeid></place></place>";
        assert_eq!(parse_place(body).unwrap().woeid, "1");
    }
}
