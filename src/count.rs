//! Tag-predicate feature counting over a graph.
//!
//! Counts are accumulated into an explicit [`FeatureCounts`] record;
//! nothing is shared across invocations, so identical graphs always
//! yield identical counts.

use std::collections::HashSet;

use crate::osm::{GeoGraph, Tags};

/// Minor road classes tracked as a distinct-type set, not a count.
const MINOR_ROAD_TYPES: [&str; 9] = [
    "residential",
    "unclassified",
    "service",
    "track",
    "cycleway",
    "pedestrian",
    "footway",
    "path",
    "steps",
];

/// Typed feature totals for one graph (one place at one radius).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureCounts {
    // Road buckets
    pub trunk: u32,
    pub primary: u32,
    pub secondary: u32,
    pub tertiary: u32,
    /// residential and unclassified, merged.
    pub res_uncl: u32,
    pub bus_stop: u32,
    pub parking: u32,
    pub fuel: u32,

    // Amenity buckets
    pub gov: u32,
    pub health: u32,
    pub school: u32,
    pub police: u32,
    pub post: u32,
    pub bank: u32,
    pub shop: u32,

    // Set cardinalities
    pub places_total: u32,
    pub buildings_total: u32,
    pub road_types: u32,
    pub landuse_types: u32,
}

fn tag_is(tags: &Tags, key: &str, value: &str) -> bool {
    tags.get(key).is_some_and(|v| v == value)
}

fn is_gov(tags: &Tags) -> bool {
    tag_is(tags, "amenity", "townhall") || tag_is(tags, "office", "government")
}

fn is_health(tags: &Tags) -> bool {
    tags.get("amenity")
        .is_some_and(|v| v == "hospital" || v == "clinic")
}

fn is_school(tags: &Tags) -> bool {
    tag_is(tags, "amenity", "school") || tag_is(tags, "education", "school")
}

fn is_shop(tags: &Tags) -> bool {
    tags.contains_key("shop")
        || tags.contains_key("cuisine")
        || tags
            .get("tourism")
            .is_some_and(|v| v == "hotel" || v == "apartment")
}

fn is_bus_stop(tags: &Tags) -> bool {
    tags.contains_key("bus")
        || tag_is(tags, "highway", "bus_stop")
        || tags.contains_key("public_transport")
}

/// Count typed features across the graph's ways and nodes.
pub fn count_features(graph: &GeoGraph) -> FeatureCounts {
    let mut c = FeatureCounts::default();
    let mut places: HashSet<i64> = HashSet::new();
    let mut buildings: HashSet<i64> = HashSet::new();
    let mut road_types: HashSet<&str> = HashSet::new();
    let mut landuse_types: HashSet<String> = HashSet::new();

    for way in &graph.ways {
        let tags = &way.tags;
        if let Some(h) = tags.get("highway") {
            match h.as_str() {
                "trunk" => c.trunk += 1,
                "primary" => c.primary += 1,
                "secondary" => c.secondary += 1,
                "tertiary" => c.tertiary += 1,
                "residential" | "unclassified" => c.res_uncl += 1,
                "bus_stop" => c.bus_stop += 1,
                _ => {}
            }
            if MINOR_ROAD_TYPES.contains(&h.as_str()) {
                road_types.insert(h.as_str());
            }
        }
        if tags.contains_key("building") || tags.contains_key("man_made") {
            buildings.insert(way.id);
        }
        if is_gov(tags) {
            c.gov += 1;
        }
        if is_health(tags) {
            c.health += 1;
        }
        if is_school(tags) {
            c.school += 1;
        }
        if tag_is(tags, "amenity", "police") {
            c.police += 1;
        }
        if tag_is(tags, "amenity", "post_office") {
            c.post += 1;
        }
        if tag_is(tags, "amenity", "bank") {
            c.bank += 1;
        }
        if is_shop(tags) {
            c.shop += 1;
        }
        if is_bus_stop(tags) {
            c.bus_stop += 1;
        }
        if tag_is(tags, "amenity", "parking") {
            c.parking += 1;
        }
        if tag_is(tags, "amenity", "fuel") {
            c.fuel += 1;
        }
        if let Some(v) = tags.get("landuse") {
            landuse_types.insert(v.clone());
        }
        for key in ["leisure", "tourism", "waterway"] {
            if tags.contains_key(key) {
                landuse_types.insert(key.to_string());
            }
        }
    }

    for node in &graph.nodes {
        let tags = &node.tags;
        if tags.contains_key("place") && tags.contains_key("name") {
            places.insert(node.id);
        }
        if is_gov(tags) {
            c.gov += 1;
        }
        if is_health(tags) {
            c.health += 1;
        }
        if is_school(tags) {
            // School nodes land in the police bucket; kept as-is for
            // output compatibility, see DESIGN.md.
            c.police += 1;
        }
        if tag_is(tags, "amenity", "police") {
            c.police += 1;
        }
        if tag_is(tags, "amenity", "post_office") {
            c.post += 1;
        }
        if tag_is(tags, "amenity", "bank") {
            c.bank += 1;
        }
        if is_shop(tags) {
            c.shop += 1;
        }
        if is_bus_stop(tags) {
            c.bus_stop += 1;
        }
        if tag_is(tags, "amenity", "fuel") {
            c.fuel += 1;
        }
        if tag_is(tags, "amenity", "parking") {
            c.parking += 1;
        }
        if tags.contains_key("man_made") {
            buildings.insert(node.id);
        }
        for key in ["leisure", "tourism", "waterway"] {
            if tags.contains_key(key) {
                landuse_types.insert(key.to_string());
            }
        }
    }

    c.places_total = places.len() as u32;
    c.buildings_total = buildings.len() as u32;
    c.road_types = road_types.len() as u32;
    c.landuse_types = landuse_types.len() as u32;
    c
}
