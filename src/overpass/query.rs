//! Overpass QL query builders.

/// Fixed search radius for remote place/boundary resolution.
pub const ADMIN_SEARCH_RADIUS_M: u32 = 15_000;

/// All elements within `radius_m` of the center, plus a recursion pass
/// so relation members referenced from the result are resolvable.
pub fn around_query(lon: f64, lat: f64, radius_m: u32, timeout_s: u64) -> String {
    format!(
        r#"[out:xml][timeout:{timeout_s}];
(
  node(around:{radius_m},{lat},{lon});
  way(around:{radius_m},{lat},{lon});
  relation(around:{radius_m},{lat},{lon});
);
out body;
>;
out skel qt;
"#
    )
}

/// Targeted search for capital/place nodes and administrative or
/// historic boundary relations whose name family matches `name`.
///
/// Mirrors the layered name-family match of local resolution: one
/// union branch per (element kind, name key) pair within a fixed 15 km
/// radius. The caller takes the first node and first relation of the
/// response as resolved.
pub fn admin_search_query(name: &str, lon: f64, lat: f64, timeout_s: u64) -> String {
    let r = ADMIN_SEARCH_RADIUS_M;
    let mut branches = String::new();
    for key in ["name", "alt_name", "official_name", "short_name"] {
        branches.push_str(&format!(
            "  node(around:{r},{lat},{lon})[\"capital\"][\"place\"][\"{key}\"~\"{name}\"];\n"
        ));
    }
    // Renamed places keep their place tag but rarely a capital tag.
    branches.push_str(&format!(
        "  node(around:{r},{lat},{lon})[\"place\"][\"old_name\"~\"{name}\"];\n"
    ));
    for boundary in ["administrative", "historic"] {
        for key in ["name", "alt_name", "official_name", "old_name", "short_name"] {
            branches.push_str(&format!(
                "  relation(around:{r},{lat},{lon})[\"boundary\"=\"{boundary}\"][\"{key}\"~\"{name}\"];\n"
            ));
        }
    }
    format!("[out:xml][timeout:{timeout_s}];\n(\n{branches});\nout body;\n")
}
