//! Laurel - OSM completeness scoring for administrative places
//!
//! Resolves four-level administrative addresses against OpenStreetMap,
//! counts typed features around each place at two radii, and turns the
//! counts into a bounded completeness score.
//!
//! Processing is strictly sequential: one Overpass request at a time,
//! with a cool-down after every network fetch. The filesystem cache is
//! not safe for concurrent writers to the same key; run one pipeline
//! per cache directory.

pub mod acquire;
pub mod cache;
pub mod config;
pub mod count;
pub mod geocode;
pub mod models;
pub mod osm;
pub mod overpass;
pub mod pipeline;
pub mod resolve;
pub mod score;

pub use models::{Address, PlaceRow};
pub use osm::{GeoGraph, OsmType};
