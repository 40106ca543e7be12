//! Completeness scoring: four capped sub-scores summing to at most 100.
//!
//! The cap order matters and is part of the contract. In the road
//! sub-score the density term is capped at 20 together with the class
//! terms before the presence bonuses and the road-type term are added,
//! then the whole band is capped at 30. Inputs near a boundary get a
//! different result than a single final cap would give; keep the order.

use crate::models::{PlaceRow, NODE_NONE};

fn cap(x: f64, m: f64) -> f64 {
    x.min(m)
}

/// Compute the four sub-scores for a finished row.
///
/// `[existence (20), roads (30), amenities (30), land use & buildings (20)]`
pub fn compute_scores(row: &PlaceRow) -> [f64; 4] {
    let mut s = [0.0f64; 4];

    // Existence (20)
    if row.node > 0 {
        s[0] += 7.0;
    }
    if row.boundary > 0 {
        s[0] += 8.0;
        if row.node == NODE_NONE {
            s[0] += 7.0;
        }
    }
    s[0] += cap(row.places_total_3km as f64, 5.0);
    s[0] = cap(s[0], 20.0);

    // Roads (30)
    if row.road_trunk_3km + row.road_primary_3km + row.road_secondary_3km > 0 {
        s[1] += 5.0;
    }
    s[1] += cap(row.road_tertiary_3km as f64, 5.0);
    s[1] += row.road_res_uncl_1km as f64 * 0.3 + row.road_res_uncl_3km as f64 * 0.2;
    s[1] = cap(s[1], 20.0);

    if row.road_bus_stop_3km > 0 {
        s[1] += 2.0;
    }
    if row.road_parking_3km > 0 {
        s[1] += 2.0;
    }
    if row.road_fuel_3km > 0 {
        s[1] += 2.0;
    }
    s[1] += cap(row.road_types_3km as f64, 4.0);
    s[1] = cap(s[1], 30.0);

    // Amenities (30)
    if row.amenity_gov_3km > 0 {
        s[2] += 5.0;
    }
    if row.amenity_health_1km > 0 {
        s[2] += 5.0;
    }
    if row.amenity_school_1km > 0 {
        s[2] += 5.0;
    }
    if row.amenity_police_1km > 0 {
        s[2] += 5.0;
    }
    if row.amenity_post_1km > 0 {
        s[2] += 2.0;
    }
    if row.amenity_bank_1km > 0 {
        s[2] += 2.0;
    }
    s[2] += cap(row.amenity_shop_1km as f64, 6.0);
    s[2] = cap(s[2], 30.0);

    // Land use & buildings (20)
    s[3] += cap(
        (row.buildings_total_1km + row.buildings_total_3km) as f64 * 0.1,
        12.0,
    );
    s[3] += cap(row.landuse_types_3km as f64, 8.0);
    s[3] = cap(s[3], 20.0);

    s
}
