//! Resource paths and query expressions for the GeoPlanet v1 API.
//!
//! The service filters collections with a small expression syntax written
//! into the path itself: `.q(text)` for a name search, `.type(name)` for a
//! place type filter, `$and(a,b)` to combine two filters, and matrix
//! parameters such as `;count=10` after the expression.
//!
//! Nothing here validates its inputs. WOEIDs are inserted verbatim and
//! `count` is passed through as-is: `0` is sent literally and means "use
//! the service default".

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything except ASCII alphanumerics and `-`, `_`, `.` is escaped, so
/// the expression delimiters `(`, `)`, `,`, `;`, `$` in user text can never
/// be confused with the expression syntax.
const EXPRESSION_VALUE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Percent-encode a value for use inside a query expression or query string.
pub fn encode(value: &str) -> String {
    utf8_percent_encode(value, EXPRESSION_VALUE).to_string()
}

/// A collection or resource hanging off a single place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Parent,
    Ancestors,
    Belongtos,
    Neighbors,
    Siblings,
    Children,
}

impl Relation {
    pub fn segment(self) -> &'static str {
        match self {
            Relation::Parent => "parent",
            Relation::Ancestors => "ancestors",
            Relation::Belongtos => "belongtos",
            Relation::Neighbors => "neighbors",
            Relation::Siblings => "siblings",
            Relation::Children => "children",
        }
    }

    /// Whether the service accepts a `.type(...)` filter on this relation.
    pub fn accepts_type_filter(self) -> bool {
        matches!(self, Relation::Children | Relation::Belongtos)
    }

    /// `parent` is a single resource; everything else is a collection and
    /// takes a `count`.
    pub fn is_collection(self) -> bool {
        !matches!(self, Relation::Parent)
    }
}

/// Query expression for the `places` search collection, e.g.
/// `.q(Paris);count=0` or `$and(.q(Paris),.type(Town));count=10`.
pub fn places_query(text: &str, place_type: Option<&str>, count: u32) -> String {
    let q = format!(".q({})", encode(text));
    let expression = match place_type {
        Some(place_type) => format!("$and({q},.type({}))", encode(place_type)),
        None => q,
    };
    format!("{expression};count={count}")
}

pub fn places_path(text: &str, place_type: Option<&str>, count: u32) -> String {
    format!("places{}", places_query(text, place_type, count))
}

pub fn place_path(woeid: &str) -> String {
    format!("place/{woeid}")
}

/// Path for a relation of `woeid`. A type filter is only written for
/// relations that accept one and is silently dropped otherwise.
pub fn relation_path(
    woeid: &str,
    relation: Relation,
    place_type: Option<&str>,
    count: u32,
) -> String {
    let mut path = format!("place/{woeid}/{}", relation.segment());
    if let Some(place_type) = place_type.filter(|_| relation.accepts_type_filter()) {
        path.push_str(&format!(".type({})", encode(place_type)));
    }
    if relation.is_collection() {
        path.push_str(&format!(";count={count}"));
    }
    path
}

pub fn place_types_path() -> String {
    "placetypes".to_string()
}

pub fn place_type_path(code: u32) -> String {
    format!("placetype/{code}")
}
