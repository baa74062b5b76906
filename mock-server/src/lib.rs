//! A stand-in for the GeoPlanet v1 API over a small fixed gazetteer.
//!
//! Serves the same resources, path expressions and XML shapes as the real
//! service, including its error behavior: 400 without an appid, 406 when
//! the client refuses XML, and two kinds of 404 (unknown route versus
//! unknown WOEID or place type code).

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;

#[derive(Clone, Debug)]
pub struct FixturePlace {
    pub woeid: u64,
    pub parent: Option<u64>,
    pub place_type: &'static str,
    pub code: u32,
    pub name: &'static str,
    pub country: &'static str,
    pub admin1: &'static str,
    pub admin2: &'static str,
    pub postal: &'static str,
    pub centroid: (&'static str, &'static str),
    pub south_west: (&'static str, &'static str),
    pub north_east: (&'static str, &'static str),
    pub neighbors: &'static [u64],
}

#[derive(Clone, Debug)]
pub struct FixturePlaceType {
    pub code: u32,
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug)]
pub struct Gazetteer {
    pub places: Vec<FixturePlace>,
    pub place_types: Vec<FixturePlaceType>,
}

pub type Db = Arc<Gazetteer>;

pub const EARTH: u64 = 1;
pub const UNITED_STATES: u64 = 23424977;
pub const FRANCE: u64 = 23424819;
pub const CALIFORNIA: u64 = 2347563;
pub const NEVADA: u64 = 2347587;
pub const TEXAS: u64 = 2347602;
pub const SANTA_CLARA_COUNTY: u64 = 12587712;
pub const SUNNYVALE: u64 = 2502265;
pub const SANTA_CLARA: u64 = 2488042;
pub const PARIS: u64 = 615702;
pub const PARIS_TEXAS: u64 = 2517032;

impl Gazetteer {
    pub fn sample() -> Self {
        let place = |woeid: u64,
                     parent: Option<u64>,
                     (place_type, code): (&'static str, u32),
                     name: &'static str| FixturePlace {
            woeid,
            parent,
            place_type,
            code,
            name,
            country: "",
            admin1: "",
            admin2: "",
            postal: "",
            centroid: ("", ""),
            south_west: ("", ""),
            north_east: ("", ""),
            neighbors: &[],
        };
        let town = ("Town", 7);
        let state = ("State", 8);
        let country = ("Country", 12);

        let places = vec![
            place(EARTH, None, ("Supername", 19), "Earth"),
            FixturePlace {
                country: "United States",
                centroid: ("48.890652", "-116.982178"),
                south_west: ("18.91172", "167.276413"),
                north_east: ("71.441055", "-66.94632"),
                ..place(UNITED_STATES, Some(EARTH), country, "United States")
            },
            FixturePlace {
                country: "France",
                centroid: ("46.71067", "1.71819"),
                south_west: ("41.33374", "-5.14209"),
                north_east: ("51.089062", "9.55932"),
                ..place(FRANCE, Some(EARTH), country, "France")
            },
            FixturePlace {
                country: "United States",
                admin1: "California",
                centroid: ("37.271881", "-119.270233"),
                south_west: ("32.534161", "-124.409561"),
                north_east: ("42.009521", "-114.131203"),
                neighbors: &[NEVADA],
                ..place(CALIFORNIA, Some(UNITED_STATES), state, "California")
            },
            FixturePlace {
                country: "United States",
                admin1: "Nevada",
                centroid: ("39.49361", "-117.071121"),
                neighbors: &[CALIFORNIA],
                ..place(NEVADA, Some(UNITED_STATES), state, "Nevada")
            },
            FixturePlace {
                country: "United States",
                admin1: "Texas",
                centroid: ("31.168409", "-100.076851"),
                ..place(TEXAS, Some(UNITED_STATES), state, "Texas")
            },
            FixturePlace {
                country: "United States",
                admin1: "California",
                admin2: "Santa Clara",
                centroid: ("37.232498", "-121.696663"),
                ..place(SANTA_CLARA_COUNTY, Some(CALIFORNIA), ("County", 9), "Santa Clara")
            },
            FixturePlace {
                country: "United States",
                admin1: "California",
                admin2: "Santa Clara",
                postal: "94086",
                centroid: ("37.371609", "-122.038254"),
                south_west: ("37.332298", "-122.065659"),
                north_east: ("37.45206", "-121.982407"),
                neighbors: &[SANTA_CLARA],
                ..place(SUNNYVALE, Some(SANTA_CLARA_COUNTY), town, "Sunnyvale")
            },
            FixturePlace {
                country: "United States",
                admin1: "California",
                admin2: "Santa Clara",
                postal: "95050",
                centroid: ("37.35411", "-121.955238"),
                neighbors: &[SUNNYVALE],
                ..place(SANTA_CLARA, Some(SANTA_CLARA_COUNTY), town, "Santa Clara")
            },
            FixturePlace {
                country: "France",
                admin1: "Ile-de-France",
                admin2: "Paris",
                centroid: ("48.856930", "2.341200"),
                south_west: ("48.815262", "2.22458"),
                north_east: ("48.902149", "2.46976"),
                ..place(PARIS, Some(FRANCE), town, "Paris")
            },
            FixturePlace {
                country: "United States",
                admin1: "Texas",
                admin2: "Lamar",
                centroid: ("33.660938", "-95.555183"),
                ..place(PARIS_TEXAS, Some(TEXAS), town, "Paris")
            },
        ];

        let place_types = [
            (7, "Town", "One of the major populated places within a country."),
            (8, "State", "One of the primary administrative areas within a country."),
            (9, "County", "One of the secondary administrative areas within a country."),
            (12, "Country", "One of the countries and dependent territories defined by ISO 3166-1."),
            (19, "Supername", "A place that refers to a region consisting of multiple countries."),
            (22, "Suburb", "One of the subdivisions within a town."),
        ]
        .into_iter()
        .map(|(code, name, description)| FixturePlaceType { code, name, description })
        .collect();

        Self { places, place_types }
    }

    pub fn place(&self, woeid: u64) -> Option<&FixturePlace> {
        self.places.iter().find(|p| p.woeid == woeid)
    }

    fn search(&self, text: &str) -> Vec<&FixturePlace> {
        let text = text.to_lowercase();
        self.places
            .iter()
            .filter(|p| p.name.to_lowercase().starts_with(&text))
            .collect()
    }

    fn ancestors(&self, place: &FixturePlace) -> Vec<&FixturePlace> {
        let mut chain = Vec::new();
        let mut next = place.parent;
        while let Some(p) = next.and_then(|woeid| self.place(woeid)) {
            chain.push(p);
            next = p.parent;
        }
        chain
    }

    fn children(&self, woeid: u64) -> Vec<&FixturePlace> {
        self.places.iter().filter(|p| p.parent == Some(woeid)).collect()
    }

    fn siblings(&self, place: &FixturePlace) -> Vec<&FixturePlace> {
        match place.parent {
            Some(parent) => self
                .children(parent)
                .into_iter()
                .filter(|p| p.woeid != place.woeid)
                .collect(),
            None => Vec::new(),
        }
    }

    fn neighbors(&self, place: &FixturePlace) -> Vec<&FixturePlace> {
        place.neighbors.iter().filter_map(|&woeid| self.place(woeid)).collect()
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(Gazetteer::sample());
    Router::new()
        .route("/v1/{*resource}", get(resource))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Why a resource could not be served.
#[derive(Debug, PartialEq, Eq)]
enum Miss {
    NoRoute,
    Unknown(String),
}

async fn resource(
    State(db): State<Db>,
    Path(resource): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if params.get("appid").map_or(true, |id| id.is_empty()) {
        return error(StatusCode::BAD_REQUEST, "Please provide a valid appid");
    }
    if !accepts_xml(&headers) {
        return error(
            StatusCode::NOT_ACCEPTABLE,
            "Requested representation not available for this resource",
        );
    }
    match route(&db, &resource) {
        Ok(xml) => (StatusCode::OK, [(header::CONTENT_TYPE, "application/xml")], xml).into_response(),
        Err(Miss::NoRoute) => error(StatusCode::NOT_FOUND, "URI has no match in the display map"),
        Err(Miss::Unknown(id)) => {
            error(StatusCode::NOT_FOUND, &format!("Could not find the resource {id}"))
        }
    }
}

fn accepts_xml(headers: &HeaderMap) -> bool {
    match headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()) {
        Some(accept) => accept.contains("xml") || accept.contains("*/*"),
        None => true,
    }
}

fn error(status: StatusCode, description: &str) -> Response {
    let body = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <yahoo:error xmlns:yahoo=\"http://yahooapis.com/v1/base.rng\" xml:lang=\"en-US\">\
         <description>{description}</description></yahoo:error>"
    );
    (status, [(header::CONTENT_TYPE, "application/xml")], body).into_response()
}

fn route(db: &Gazetteer, resource: &str) -> Result<String, Miss> {
    if let Some(expression) = resource.strip_prefix("places") {
        let (expression, count) = split_count(expression);
        let (text, place_type) = parse_search(expression).ok_or(Miss::NoRoute)?;
        let found = filter_type(db.search(&text), place_type.as_deref());
        return Ok(places_xml(&found, count));
    }
    if resource == "placetypes" {
        return Ok(place_types_xml(&db.place_types));
    }
    if let Some(code) = resource.strip_prefix("placetype/") {
        let code: u32 = code.parse().map_err(|_| Miss::NoRoute)?;
        let place_type = db
            .place_types
            .iter()
            .find(|t| t.code == code)
            .ok_or_else(|| Miss::Unknown(code.to_string()))?;
        return Ok(format!("{XML_DECL}{}", place_type_xml(place_type)));
    }
    if let Some(rest) = resource.strip_prefix("place/") {
        let (woeid, relation) = match rest.split_once('/') {
            Some((woeid, relation)) => (woeid, Some(relation)),
            None => (rest, None),
        };
        let woeid: u64 = woeid.parse().map_err(|_| Miss::NoRoute)?;
        let place = db.place(woeid).ok_or_else(|| Miss::Unknown(woeid.to_string()))?;
        return match relation {
            None => Ok(format!("{XML_DECL}{}", place_xml(place))),
            Some(relation) => relation_xml(db, place, relation),
        };
    }
    Err(Miss::NoRoute)
}

fn relation_xml(db: &Gazetteer, place: &FixturePlace, relation: &str) -> Result<String, Miss> {
    if relation == "parent" {
        let parent = place
            .parent
            .and_then(|woeid| db.place(woeid))
            .ok_or_else(|| Miss::Unknown(place.woeid.to_string()))?;
        return Ok(format!("{XML_DECL}{}", place_xml(parent)));
    }

    let (relation, count) = split_count(relation);
    let (segment, place_type) = match relation.split_once(".type(") {
        Some((segment, filter)) => (segment, Some(filter.strip_suffix(')').ok_or(Miss::NoRoute)?)),
        None => (relation, None),
    };
    let found = match segment {
        "ancestors" => db.ancestors(place),
        "belongtos" => filter_type(db.ancestors(place), place_type),
        "neighbors" => db.neighbors(place),
        "siblings" => db.siblings(place),
        "children" => filter_type(db.children(place.woeid), place_type),
        _ => return Err(Miss::NoRoute),
    };
    if place_type.is_some() && !matches!(segment, "belongtos" | "children") {
        return Err(Miss::NoRoute);
    }
    Ok(places_xml(&found, count))
}

/// Split a trailing `;count=N` matrix parameter. A missing or unparseable
/// count reads as 0, which means "all".
fn split_count(expression: &str) -> (&str, usize) {
    match expression.split_once(";count=") {
        Some((expression, count)) => (expression, count.parse().unwrap_or(0)),
        None => (expression, 0),
    }
}

/// `.q(text)` or `$and(.q(text),.type(type))`.
fn parse_search(expression: &str) -> Option<(String, Option<String>)> {
    if let Some(inner) = expression.strip_prefix("$and(").and_then(|s| s.strip_suffix(')')) {
        let (q, place_type) = inner.split_once(",.type(")?;
        let text = q.strip_prefix(".q(")?.strip_suffix(')')?;
        let place_type = place_type.strip_suffix(')')?;
        return Some((text.to_string(), Some(place_type.to_string())));
    }
    let text = expression.strip_prefix(".q(")?.strip_suffix(')')?;
    Some((text.to_string(), None))
}

/// Keep places whose type name or code matches the filter.
fn filter_type<'a>(places: Vec<&'a FixturePlace>, place_type: Option<&str>) -> Vec<&'a FixturePlace> {
    match place_type {
        Some(filter) => places
            .into_iter()
            .filter(|p| p.place_type.eq_ignore_ascii_case(filter) || p.code.to_string() == filter)
            .collect(),
        None => places,
    }
}

const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

fn places_xml(places: &[&FixturePlace], count: usize) -> String {
    let shown: Vec<&&FixturePlace> = match count {
        0 => places.iter().collect(),
        n => places.iter().take(n).collect(),
    };
    let mut xml = format!(
        "{XML_DECL}<places xmlns=\"http://where.yahooapis.com/v1/schema.rng\" \
         xmlns:yahoo=\"http://www.yahooapis.com/v1/base.rng\" \
         yahoo:start=\"0\" yahoo:count=\"{}\" yahoo:total=\"{}\">",
        shown.len(),
        places.len()
    );
    for place in shown {
        xml.push_str(&place_xml(place));
    }
    xml.push_str("</places>");
    xml
}

fn place_xml(p: &FixturePlace) -> String {
    let optional = |tag: &str, value: &str| {
        if value.is_empty() {
            format!("<{tag}/>")
        } else {
            format!("<{tag}>{value}</{tag}>")
        }
    };
    let locality1 = if p.place_type == "Town" { p.name } else { "" };
    format!(
        "<place yahoo:uri=\"http://where.yahooapis.com/v1/place/{woeid}\" xml:lang=\"en-US\">\
         <woeid>{woeid}</woeid>\
         <placeTypeName code=\"{code}\">{place_type}</placeTypeName>\
         <name>{name}</name>\
         {country}{admin1}{admin2}<admin3/>{locality1}<locality2/>{postal}\
         <centroid><latitude>{clat}</latitude><longitude>{clng}</longitude></centroid>\
         <boundingBox>\
         <southWest><latitude>{swlat}</latitude><longitude>{swlng}</longitude></southWest>\
         <northEast><latitude>{nelat}</latitude><longitude>{nelng}</longitude></northEast>\
         </boundingBox>\
         <areaRank>1</areaRank><popRank>0</popRank>\
         </place>",
        woeid = p.woeid,
        code = p.code,
        place_type = p.place_type,
        name = p.name,
        country = optional("country", p.country),
        admin1 = optional("admin1", p.admin1),
        admin2 = optional("admin2", p.admin2),
        locality1 = optional("locality1", locality1),
        postal = optional("postal", p.postal),
        clat = p.centroid.0,
        clng = p.centroid.1,
        swlat = p.south_west.0,
        swlng = p.south_west.1,
        nelat = p.north_east.0,
        nelng = p.north_east.1,
    )
}

fn place_type_xml(t: &FixturePlaceType) -> String {
    format!(
        "<placeType yahoo:uri=\"http://where.yahooapis.com/v1/placetype/{code}\" xml:lang=\"en-US\">\
         <placeTypeName code=\"{code}\">{name}</placeTypeName>\
         <placeTypeDescription>{description}</placeTypeDescription>\
         </placeType>",
        code = t.code,
        name = t.name,
        description = t.description,
    )
}

fn place_types_xml(types: &[FixturePlaceType]) -> String {
    let mut xml = format!(
        "{XML_DECL}<placeTypes xmlns=\"http://where.yahooapis.com/v1/schema.rng\" \
         xmlns:yahoo=\"http://www.yahooapis.com/v1/base.rng\" \
         yahoo:start=\"0\" yahoo:count=\"{n}\" yahoo:total=\"{n}\">",
        n = types.len()
    );
    for t in types {
        xml.push_str(&place_type_xml(t));
    }
    xml.push_str("</placeTypes>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_expressions() {
        assert_eq!(parse_search(".q(Paris)"), Some(("Paris".to_string(), None)));
        assert_eq!(
            parse_search("$and(.q(Santa Clara),.type(Town))"),
            Some(("Santa Clara".to_string(), Some("Town".to_string())))
        );
        assert_eq!(parse_search(".q(Paris"), None);
        assert_eq!(parse_search("Paris"), None);
    }

    #[test]
    fn count_matrix_parameter() {
        assert_eq!(split_count(".q(Paris);count=3"), (".q(Paris)", 3));
        assert_eq!(split_count(".q(Paris)"), (".q(Paris)", 0));
        assert_eq!(split_count("children;count=x"), ("children", 0));
    }

    #[test]
    fn ancestors_walk_to_earth() {
        let db = Gazetteer::sample();
        let sunnyvale = db.place(SUNNYVALE).unwrap();
        let chain: Vec<u64> = db.ancestors(sunnyvale).iter().map(|p| p.woeid).collect();
        assert_eq!(chain, vec![SANTA_CLARA_COUNTY, CALIFORNIA, UNITED_STATES, EARTH]);
    }

    #[test]
    fn siblings_exclude_self() {
        let db = Gazetteer::sample();
        let california = db.place(CALIFORNIA).unwrap();
        let siblings: Vec<u64> = db.siblings(california).iter().map(|p| p.woeid).collect();
        assert_eq!(siblings, vec![NEVADA, TEXAS]);
    }

    #[test]
    fn type_filter_accepts_name_or_code() {
        let db = Gazetteer::sample();
        let by_name = filter_type(db.search("Paris"), Some("town"));
        let by_code = filter_type(db.search("Paris"), Some("7"));
        assert_eq!(by_name.len(), 2);
        assert_eq!(by_code.len(), 2);
    }

    #[test]
    fn unknown_routes_and_resources() {
        let db = Gazetteer::sample();
        assert_eq!(route(&db, "nowhere"), Err(Miss::NoRoute));
        assert_eq!(route(&db, "place/abc"), Err(Miss::NoRoute));
        assert_eq!(route(&db, "place/42"), Err(Miss::Unknown("42".to_string())));
        assert_eq!(route(&db, "place/1/parent"), Err(Miss::Unknown("1".to_string())));
        assert_eq!(route(&db, "place/1/cousins;count=0"), Err(Miss::NoRoute));
        assert_eq!(route(&db, "placetype/999"), Err(Miss::Unknown("999".to_string())));
    }
}
