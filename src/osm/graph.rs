//! Graph types for a parsed Overpass extract.

use std::collections::HashMap;

/// Open key/value tag mapping carried by every OSM element.
pub type Tags = HashMap<String, String>;

/// Type of OSM object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsmType {
    Node,
    Way,
    Relation,
}

impl std::fmt::Display for OsmType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OsmType::Node => write!(f, "node"),
            OsmType::Way => write!(f, "way"),
            OsmType::Relation => write!(f, "relation"),
        }
    }
}

/// A point element.
#[derive(Debug, Clone)]
pub struct OsmNode {
    pub id: i64,
    pub lon: f64,
    pub lat: f64,
    pub tags: Tags,
}

/// A linear or area element referencing its member nodes by id.
#[derive(Debug, Clone, Default)]
pub struct OsmWay {
    pub id: i64,
    pub node_refs: Vec<i64>,
    pub tags: Tags,
}

/// One relation member: (type, ref, role).
#[derive(Debug, Clone)]
pub struct OsmMember {
    pub member_type: OsmType,
    pub member_ref: i64,
    pub role: String,
}

/// A grouping element (e.g. an administrative boundary).
#[derive(Debug, Clone, Default)]
pub struct OsmRelation {
    pub id: i64,
    pub members: Vec<OsmMember>,
    pub tags: Tags,
}

/// An immutable in-memory parse of one downloaded dataset.
///
/// Element order follows document order, which the resolver relies on
/// for its first-match rules.
#[derive(Debug, Clone, Default)]
pub struct GeoGraph {
    pub nodes: Vec<OsmNode>,
    pub ways: Vec<OsmWay>,
    pub relations: Vec<OsmRelation>,
}

impl GeoGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.ways.is_empty() && self.relations.is_empty()
    }
}
