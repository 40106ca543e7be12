//! Per-place output record.

use serde::Serialize;

use crate::count::FeatureCounts;

/// Sentinel: no point entity was resolved.
pub const NODE_NONE: i64 = -1;
/// Sentinel: a boundary-anchored candidate was found but failed the
/// exactness check.
pub const NODE_WEAK: i64 = -2;
/// Sentinel: no boundary relation matched.
pub const BOUNDARY_NONE: i64 = -1;

/// One output row per processed place.
///
/// Field order is the CSV column order. Count fields default to zero
/// so a place whose acquisition failed for one radius still exports a
/// complete row.
#[derive(Debug, Clone, Serialize)]
pub struct PlaceRow {
    pub addr_1: String,
    pub addr_2: String,
    pub addr_3: String,
    pub addr_4: String,
    pub lon: f64,
    pub lat: f64,

    pub road_trunk_3km: u32,
    pub road_primary_3km: u32,
    pub road_secondary_3km: u32,
    pub road_tertiary_3km: u32,
    pub road_res_uncl_3km: u32,
    pub road_bus_stop_3km: u32,
    pub road_parking_3km: u32,
    pub road_fuel_3km: u32,
    pub amenity_gov_3km: u32,
    pub amenity_health_3km: u32,
    pub amenity_school_3km: u32,
    pub amenity_police_3km: u32,
    pub amenity_post_3km: u32,
    pub amenity_bank_3km: u32,
    pub amenity_shop_3km: u32,
    pub places_total_3km: u32,
    pub buildings_total_3km: u32,
    pub road_types_3km: u32,
    pub landuse_types_3km: u32,

    pub road_trunk_1km: u32,
    pub road_primary_1km: u32,
    pub road_secondary_1km: u32,
    pub road_tertiary_1km: u32,
    pub road_res_uncl_1km: u32,
    pub road_bus_stop_1km: u32,
    pub road_parking_1km: u32,
    pub road_fuel_1km: u32,
    pub amenity_gov_1km: u32,
    pub amenity_health_1km: u32,
    pub amenity_school_1km: u32,
    pub amenity_police_1km: u32,
    pub amenity_post_1km: u32,
    pub amenity_bank_1km: u32,
    pub amenity_shop_1km: u32,
    pub places_total_1km: u32,
    pub buildings_total_1km: u32,
    pub road_types_1km: u32,
    pub landuse_types_1km: u32,

    /// Resolved node id, or a sentinel (-1 none, -2 weak).
    pub node: i64,
    /// Resolved boundary relation id, or -1.
    pub boundary: i64,

    /// Composite key: city + district.
    pub u_addr_3: String,
    /// Composite key: city + district + subdistrict.
    pub u_addr_4: String,

    pub score_1: f64,
    pub score_2: f64,
    pub score_3: f64,
    pub score_4: f64,
    pub score: f64,

    pub u_addr_3_avg_score: f64,
    pub u_addr_4_avg_score: f64,
    pub addr_2_avg_score: f64,
    pub addr_1_avg_score: f64,
}

impl PlaceRow {
    pub fn new(segments: &[String; 4], lon: f64, lat: f64) -> Self {
        Self {
            addr_1: segments[0].clone(),
            addr_2: segments[1].clone(),
            addr_3: segments[2].clone(),
            addr_4: segments[3].clone(),
            lon,
            lat,
            road_trunk_3km: 0,
            road_primary_3km: 0,
            road_secondary_3km: 0,
            road_tertiary_3km: 0,
            road_res_uncl_3km: 0,
            road_bus_stop_3km: 0,
            road_parking_3km: 0,
            road_fuel_3km: 0,
            amenity_gov_3km: 0,
            amenity_health_3km: 0,
            amenity_school_3km: 0,
            amenity_police_3km: 0,
            amenity_post_3km: 0,
            amenity_bank_3km: 0,
            amenity_shop_3km: 0,
            places_total_3km: 0,
            buildings_total_3km: 0,
            road_types_3km: 0,
            landuse_types_3km: 0,
            road_trunk_1km: 0,
            road_primary_1km: 0,
            road_secondary_1km: 0,
            road_tertiary_1km: 0,
            road_res_uncl_1km: 0,
            road_bus_stop_1km: 0,
            road_parking_1km: 0,
            road_fuel_1km: 0,
            amenity_gov_1km: 0,
            amenity_health_1km: 0,
            amenity_school_1km: 0,
            amenity_police_1km: 0,
            amenity_post_1km: 0,
            amenity_bank_1km: 0,
            amenity_shop_1km: 0,
            places_total_1km: 0,
            buildings_total_1km: 0,
            road_types_1km: 0,
            landuse_types_1km: 0,
            node: NODE_NONE,
            boundary: BOUNDARY_NONE,
            u_addr_3: format!("{}{}", segments[1], segments[2]),
            u_addr_4: format!("{}{}{}", segments[1], segments[2], segments[3]),
            score_1: 0.0,
            score_2: 0.0,
            score_3: 0.0,
            score_4: 0.0,
            score: 0.0,
            u_addr_3_avg_score: 0.0,
            u_addr_4_avg_score: 0.0,
            addr_2_avg_score: 0.0,
            addr_1_avg_score: 0.0,
        }
    }

    /// Merge one radius' feature counts into the row.
    pub fn set_counts(&mut self, radius_km: u32, c: &FeatureCounts) {
        match radius_km {
            3 => {
                self.road_trunk_3km = c.trunk;
                self.road_primary_3km = c.primary;
                self.road_secondary_3km = c.secondary;
                self.road_tertiary_3km = c.tertiary;
                self.road_res_uncl_3km = c.res_uncl;
                self.road_bus_stop_3km = c.bus_stop;
                self.road_parking_3km = c.parking;
                self.road_fuel_3km = c.fuel;
                self.amenity_gov_3km = c.gov;
                self.amenity_health_3km = c.health;
                self.amenity_school_3km = c.school;
                self.amenity_police_3km = c.police;
                self.amenity_post_3km = c.post;
                self.amenity_bank_3km = c.bank;
                self.amenity_shop_3km = c.shop;
                self.places_total_3km = c.places_total;
                self.buildings_total_3km = c.buildings_total;
                self.road_types_3km = c.road_types;
                self.landuse_types_3km = c.landuse_types;
            }
            1 => {
                self.road_trunk_1km = c.trunk;
                self.road_primary_1km = c.primary;
                self.road_secondary_1km = c.secondary;
                self.road_tertiary_1km = c.tertiary;
                self.road_res_uncl_1km = c.res_uncl;
                self.road_bus_stop_1km = c.bus_stop;
                self.road_parking_1km = c.parking;
                self.road_fuel_1km = c.fuel;
                self.amenity_gov_1km = c.gov;
                self.amenity_health_1km = c.health;
                self.amenity_school_1km = c.school;
                self.amenity_police_1km = c.police;
                self.amenity_post_1km = c.post;
                self.amenity_bank_1km = c.bank;
                self.amenity_shop_1km = c.shop;
                self.places_total_1km = c.places_total;
                self.buildings_total_1km = c.buildings_total;
                self.road_types_1km = c.road_types;
                self.landuse_types_1km = c.landuse_types;
            }
            other => unreachable!("unsupported radius {other} km"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_keys() {
        let segs = ["P", "C", "D", "S"].map(String::from);
        let row = PlaceRow::new(&segs, 117.30, 31.86);
        assert_eq!(row.u_addr_3, "CD");
        assert_eq!(row.u_addr_4, "CDS");
        assert_eq!(row.node, NODE_NONE);
        assert_eq!(row.boundary, BOUNDARY_NONE);
    }

    #[test]
    fn test_set_counts_targets_the_right_radius() {
        let segs = ["P", "C", "D", "S"].map(String::from);
        let mut row = PlaceRow::new(&segs, 0.0, 0.0);
        let counts = FeatureCounts {
            primary: 2,
            school: 1,
            ..FeatureCounts::default()
        };
        row.set_counts(1, &counts);
        assert_eq!(row.road_primary_1km, 2);
        assert_eq!(row.amenity_school_1km, 1);
        assert_eq!(row.road_primary_3km, 0);
    }
}
