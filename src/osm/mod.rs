//! In-memory OSM graph and Overpass XML parsing.

mod graph;
mod xml;

pub use graph::{GeoGraph, OsmMember, OsmNode, OsmRelation, OsmType, OsmWay, Tags};
pub use xml::parse_osm;
