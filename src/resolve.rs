//! Entity resolution: map a subdistrict name to a point entity and/or
//! an administrative boundary inside a graph.
//!
//! Matching is layered: fuzzy (substring) matches steer the corrected
//! coordinate, but a node id is only accepted outright on an exact
//! name-family match or a capital tag. Boundary relations are adopted
//! on the first fuzzy match and replaced by the first exact match,
//! which also stops the scan.

use std::collections::HashMap;

use tracing::warn;

use crate::models::{BOUNDARY_NONE, NODE_NONE, NODE_WEAK};
use crate::osm::{parse_osm, GeoGraph, OsmMember, OsmNode, OsmType, Tags};
use crate::overpass::{admin_search_query, OverpassClient};

/// Name keys consulted for substring matching.
const FUZZY_NAME_KEYS: [&str; 5] = ["name", "official_name", "alt_name", "old_name", "short_name"];

/// Name keys consulted for equality matching, including `:zh` variants.
const EXACT_NAME_KEYS: [&str; 10] = [
    "name",
    "name:zh",
    "official_name",
    "official_name:zh",
    "alt_name",
    "alt_name:zh",
    "old_name",
    "old_name:zh",
    "short_name",
    "short_name:zh",
];

/// True if any fuzzy name key contains `query` as a substring.
pub fn fuzzy_name_match(query: &str, tags: &Tags) -> bool {
    FUZZY_NAME_KEYS
        .iter()
        .any(|k| tags.get(*k).is_some_and(|v| v.contains(query)))
}

/// True if any exact name key equals `query`.
pub fn exact_name_match(query: &str, tags: &Tags) -> bool {
    EXACT_NAME_KEYS
        .iter()
        .any(|k| tags.get(*k).is_some_and(|v| v == query))
}

/// A named node tagged as an administrative place, capital, or
/// government office.
fn is_place_candidate(tags: &Tags) -> bool {
    tags.contains_key("capital")
        || tags.contains_key("place")
        || tags.contains_key("place:CN")
        || tags.get("amenity").is_some_and(|v| v == "townhall")
        || tags.get("office").is_some_and(|v| v == "government")
}

/// Resolution outcome. Sentinels: node_id -1 = no point match,
/// -2 = boundary-anchored candidate that failed the exactness check;
/// boundary_id -1 = no boundary matched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub node_id: i64,
    pub boundary_id: i64,
    pub lon: Option<f64>,
    pub lat: Option<f64>,
}

impl Resolution {
    pub fn not_found() -> Self {
        Self {
            node_id: NODE_NONE,
            boundary_id: BOUNDARY_NONE,
            lon: None,
            lat: None,
        }
    }

    /// The corrected coordinate, if resolution moved off the input one.
    pub fn corrected_coordinate(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        match (self.lon, self.lat) {
            (Some(rlon), Some(rlat)) if rlon != lon || rlat != lat => Some((rlon, rlat)),
            _ => None,
        }
    }
}

/// Resolve against an already-downloaded local graph.
pub fn resolve_local(last_segment: &str, graph: &GeoGraph) -> Resolution {
    let mut res = Resolution::not_found();

    // Pass 1: place-candidate nodes. The first fuzzy match steers the
    // corrected coordinate; the id itself needs a capital tag or an
    // exact match.
    let mut candidates: HashMap<i64, &OsmNode> = HashMap::new();
    for node in &graph.nodes {
        if !node.tags.contains_key("name") || !is_place_candidate(&node.tags) {
            continue;
        }
        candidates.insert(node.id, node);
        if res.node_id < 0 && fuzzy_name_match(last_segment, &node.tags) {
            res.lon = Some(node.lon);
            res.lat = Some(node.lat);
            if node.tags.contains_key("place")
                && (node.tags.contains_key("capital")
                    || exact_name_match(last_segment, &node.tags))
            {
                res.node_id = node.id;
            }
        }
    }

    // Pass 2: boundary relations. First fuzzy match is adopted; an
    // exact match replaces it and ends the scan.
    for relation in &graph.relations {
        if !relation.tags.contains_key("name") {
            continue;
        }
        let boundary = relation.tags.get("boundary").map(String::as_str);
        if !matches!(boundary, Some("administrative") | Some("historic")) {
            continue;
        }
        if !fuzzy_name_match(last_segment, &relation.tags) {
            continue;
        }
        let relation_exact = exact_name_match(last_segment, &relation.tags);
        if res.boundary_id == BOUNDARY_NONE || relation_exact {
            res.boundary_id = relation.id;
            inspect_members(last_segment, relation_exact, &relation.members, &candidates, &mut res);
        }
        if relation_exact {
            break;
        }
    }

    res
}

/// Walk a boundary's label/admin_centre members: any collected place
/// candidate downgrades the node to the weak sentinel and adopts its
/// coordinate; the member's real id is only restored on an exactness
/// confirmation, which ends the walk.
fn inspect_members(
    last_segment: &str,
    relation_exact: bool,
    members: &[OsmMember],
    candidates: &HashMap<i64, &OsmNode>,
    res: &mut Resolution,
) {
    for member in members {
        if member.member_type != OsmType::Node {
            continue;
        }
        if member.role != "label" && member.role != "admin_centre" {
            continue;
        }
        let Some(node) = candidates.get(&member.member_ref) else {
            continue;
        };
        res.node_id = NODE_WEAK;
        res.lon = Some(node.lon);
        res.lat = Some(node.lat);
        if node.tags.contains_key("place")
            && fuzzy_name_match(last_segment, &node.tags)
            && (node.tags.contains_key("capital") || relation_exact)
        {
            res.node_id = node.id;
            break;
        }
    }
}

/// Resolve with a targeted remote query when no local graph is cached.
///
/// Takes whatever the service ranks first: first node becomes the
/// point entity and coordinate, first relation the boundary. Offline
/// or unreachable resolves to the not-found sentinels.
pub async fn resolve_remote(
    client: &OverpassClient,
    last_segment: &str,
    lon: f64,
    lat: f64,
    offline: bool,
    timeout_s: u64,
) -> Resolution {
    if offline {
        return Resolution::not_found();
    }

    let query = admin_search_query(last_segment, lon, lat, timeout_s);
    let raw = match client.post_query(&query).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Remote resolution failed for {:?}: {}", last_segment, e);
            return Resolution::not_found();
        }
    };
    let graph = match parse_osm(&raw) {
        Ok(graph) => graph,
        Err(e) => {
            warn!("Remote resolution parse failed for {:?}: {}", last_segment, e);
            return Resolution::not_found();
        }
    };

    let mut res = Resolution::not_found();
    if let Some(node) = graph.nodes.first() {
        res.node_id = node.id;
        res.lon = Some(node.lon);
        res.lat = Some(node.lat);
    }
    if let Some(relation) = graph.relations.first() {
        res.boundary_id = relation.id;
    }
    res
}
