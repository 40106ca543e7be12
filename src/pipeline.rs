//! Pipeline orchestrator: place list in, scored CSV + summary out.

use std::collections::HashMap;
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::acquire::Acquirer;
use crate::cache::{place_key, CacheKey, CacheStore};
use crate::config::Config;
use crate::count::count_features;
use crate::geocode::ForwardGeocoder;
use crate::models::{parse_lonlat, parse_place_line, Address, ParsedLine, PlaceRow};
use crate::overpass::OverpassClient;
use crate::resolve::{resolve_local, resolve_remote};
use crate::score::compute_scores;

/// Radii processed per place, largest first.
const RADII_KM: [u32; 2] = [3, 1];

/// Run the whole pipeline over a place-list file.
///
/// Failures inside one place's processing degrade that place's row or
/// skip it; only an empty result set aborts the run.
pub async fn run<G: ForwardGeocoder>(
    input: &Path,
    output: &Path,
    config: &Config,
    cache: &dyn CacheStore,
    geocoder: &G,
) -> Result<()> {
    let client = OverpassClient::new(
        &config.overpass_url,
        &config.user_agent,
        config.timeout_s,
        config.max_retries,
    )?;
    let acquirer = Acquirer::new(&client, cache, config);

    let content = fs::read_to_string(input)
        .with_context(|| format!("Failed to read place list {}", input.display()))?;
    let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();

    let pb = ProgressBar::new(lines.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("#>-"),
    );

    let mut rows: Vec<PlaceRow> = Vec::new();
    for line in lines {
        if let Some(row) = process_place(line, config, cache, &client, &acquirer, geocoder).await {
            rows.push(row);
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if rows.is_empty() {
        bail!("No valid records!");
    }

    attach_scores(&mut rows);
    attach_aggregates(&mut rows);
    write_csv(output, &rows)?;
    print_summary(&rows);

    Ok(())
}

/// Process one input line into a row. Returns None for skipped lines.
async fn process_place<G: ForwardGeocoder>(
    line: &str,
    config: &Config,
    cache: &dyn CacheStore,
    client: &OverpassClient,
    acquirer: &Acquirer<'_>,
    geocoder: &G,
) -> Option<PlaceRow> {
    let mut addr = match parse_place_line(line) {
        Ok(ParsedLine::WithCoordinate(addr)) => addr,
        Ok(ParsedLine::NeedsGeocoding(segments)) => {
            let full_name = segments.join(" ");
            let geo = match geocoder.geocode(&full_name) {
                Ok(geo) => geo,
                Err(e) => {
                    warn!("Geocoding failed for {:?}: {}; skipped", full_name, e);
                    return None;
                }
            };
            if !geo.contains(',') {
                warn!("No geocoding result for {:?}; skipped", full_name);
                return None;
            }
            match parse_lonlat(&geo) {
                Ok((lon, lat)) => Address { segments, lon, lat },
                Err(e) => {
                    warn!("Bad geocoder output for {:?}: {}; skipped", full_name, e);
                    return None;
                }
            }
        }
        Ok(ParsedLine::Skip) => return None,
        Err(e) => {
            warn!("Skipping malformed line {:?}: {}", line, e);
            return None;
        }
    };

    let key = place_key(&addr.segments);
    let mut row = PlaceRow::new(&addr.segments, addr.lon, addr.lat);

    // Local resolution only when a 3 km dataset is already cached;
    // otherwise the resolver issues its own targeted query.
    let key_3km = CacheKey::new(key.clone(), 3);
    let local_graph = if cache.contains(&key_3km) {
        match acquirer
            .acquire(addr.lon, addr.lat, 3000, &key_3km, false)
            .await
        {
            Ok(graph) => Some(graph),
            Err(e) => {
                warn!("Ignoring unreadable cached dataset for {:?}: {}", key, e);
                None
            }
        }
    } else {
        None
    };

    let resolution = match &local_graph {
        Some(graph) => resolve_local(addr.last_segment(), graph),
        None => {
            resolve_remote(
                client,
                addr.last_segment(),
                addr.lon,
                addr.lat,
                config.offline,
                60.min(config.timeout_s),
            )
            .await
        }
    };

    // A corrected coordinate invalidates the cached graphs, which were
    // centered on the stale point.
    let mut force_refresh = false;
    if let Some((nlon, nlat)) = resolution.corrected_coordinate(addr.lon, addr.lat) {
        addr.lon = nlon;
        addr.lat = nlat;
        row.lon = nlon;
        row.lat = nlat;
        force_refresh = true;
    }

    info!("Processing: {} {} {}", addr.full_name(), addr.lon, addr.lat);

    for radius_km in RADII_KM {
        let radius_key = CacheKey::new(key.clone(), radius_km);
        match acquirer
            .acquire(addr.lon, addr.lat, radius_km * 1000, &radius_key, force_refresh)
            .await
        {
            Ok(graph) => {
                let counts = count_features(&graph);
                row.set_counts(radius_km, &counts);
            }
            Err(e) => {
                warn!(
                    "Acquisition failed for {:?} at {} km: {}",
                    addr.full_name(),
                    radius_km,
                    e
                );
                break;
            }
        }
    }

    row.node = resolution.node_id;
    row.boundary = resolution.boundary_id;
    Some(row)
}

fn attach_scores(rows: &mut [PlaceRow]) {
    for row in rows.iter_mut() {
        let s = compute_scores(row);
        row.score_1 = s[0];
        row.score_2 = s[1];
        row.score_3 = s[2];
        row.score_4 = s[3];
        row.score = s.iter().sum();
    }
}

/// Mean total score per group key.
fn mean_by<F>(rows: &[PlaceRow], key: F) -> HashMap<String, f64>
where
    F: Fn(&PlaceRow) -> &str,
{
    let mut sums: HashMap<String, (f64, u32)> = HashMap::new();
    for row in rows {
        let entry = sums.entry(key(row).to_string()).or_insert((0.0, 0));
        entry.0 += row.score;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(k, (sum, n))| (k, sum / n as f64))
        .collect()
}

fn attach_aggregates(rows: &mut [PlaceRow]) {
    let by_u3 = mean_by(rows, |r| r.u_addr_3.as_str());
    let by_u4 = mean_by(rows, |r| r.u_addr_4.as_str());
    let by_city = mean_by(rows, |r| r.addr_2.as_str());
    let by_province = mean_by(rows, |r| r.addr_1.as_str());

    for row in rows.iter_mut() {
        row.u_addr_3_avg_score = by_u3[&row.u_addr_3];
        row.u_addr_4_avg_score = by_u4[&row.u_addr_4];
        row.addr_2_avg_score = by_city[&row.addr_2];
        row.addr_1_avg_score = by_province[&row.addr_1];
    }
}

/// Export all rows as CSV, UTF-8 with BOM.
fn write_csv(output: &Path, rows: &[PlaceRow]) -> Result<()> {
    let mut file = File::create(output)
        .with_context(|| format!("Failed to create output file {}", output.display()))?;
    file.write_all("\u{feff}".as_bytes())?;
    let mut writer = csv::Writer::from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!("Wrote {} rows to {}", rows.len(), output.display());
    Ok(())
}

/// Mean score per district composite key, highest first; ties keep key
/// order so repeated runs print the same table.
fn district_ranking(rows: &[PlaceRow]) -> Vec<(String, f64)> {
    let mut ranking: Vec<(String, f64)> = mean_by(rows, |r| r.u_addr_3.as_str()).into_iter().collect();
    ranking.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.0.cmp(&b.0)));
    ranking
}

fn print_summary(rows: &[PlaceRow]) {
    let ranking = district_ranking(rows);

    println!("\nTop 10 districts by average score:");
    for (key, avg) in ranking.iter().take(10) {
        println!("  {key}  {avg:.2}");
    }

    println!("\nBottom 10 districts by average score:");
    let start = ranking.len().saturating_sub(10);
    for (key, avg) in &ranking[start..] {
        println!("  {key}  {avg:.2}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::geocode::UnconfiguredGeocoder;

    fn offline_config() -> Config {
        Config {
            offline: true,
            cooldown_s: 0,
            ..Config::default()
        }
    }

    fn row_with_score(segments: [&str; 4], score: f64) -> PlaceRow {
        let segs = segments.map(String::from);
        let mut row = PlaceRow::new(&segs, 0.0, 0.0);
        row.score = score;
        row
    }

    #[test]
    fn test_mean_by_groups() {
        let rows = vec![
            row_with_score(["P", "C", "D1", "S1"], 10.0),
            row_with_score(["P", "C", "D1", "S2"], 20.0),
            row_with_score(["P", "C", "D2", "S3"], 40.0),
        ];
        let means = mean_by(&rows, |r| r.u_addr_3.as_str());
        assert_eq!(means["CD1"], 15.0);
        assert_eq!(means["CD2"], 40.0);
    }

    #[test]
    fn test_attach_aggregates_fills_all_levels() {
        let mut rows = vec![
            row_with_score(["P", "C", "D1", "S1"], 10.0),
            row_with_score(["P", "C", "D2", "S2"], 30.0),
        ];
        attach_aggregates(&mut rows);
        assert_eq!(rows[0].u_addr_3_avg_score, 10.0);
        assert_eq!(rows[0].u_addr_4_avg_score, 10.0);
        assert_eq!(rows[0].addr_2_avg_score, 20.0);
        assert_eq!(rows[0].addr_1_avg_score, 20.0);
    }

    #[test]
    fn test_district_ranking_sorted_descending() {
        let rows = vec![
            row_with_score(["P", "C", "D1", "S1"], 10.0),
            row_with_score(["P", "C", "D2", "S2"], 30.0),
            row_with_score(["P", "C", "D3", "S3"], 20.0),
        ];
        let ranking = district_ranking(&rows);
        let keys: Vec<&str> = ranking.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["CD2", "CD3", "CD1"]);
    }

    #[tokio::test]
    async fn test_zero_valid_lines_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("places.txt");
        std::fs::write(&input, "one two\nthree\n\n").unwrap();
        let output = dir.path().join("out.csv");

        let config = offline_config();
        let cache = MemoryCache::new();
        let result = run(&input, &output, &config, &cache, &UnconfiguredGeocoder).await;
        assert!(result.is_err());
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_offline_run_from_seeded_cache() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("places.txt");
        std::fs::write(&input, "anhui hefei yaohai mingguang 117.30 31.86\n").unwrap();
        let output = dir.path().join("out.csv");

        let config = offline_config();
        let cache = MemoryCache::new();
        let key = place_key(&["anhui", "hefei", "yaohai", "mingguang"].map(String::from));
        let xml_3km = r#"<osm>
            <node id="7" lon="117.30" lat="31.86"><tag k="place" v="town"/><tag k="name" v="mingguang"/></node>
            <node id="8" lon="117.31" lat="31.87"><tag k="amenity" v="school"/></node>
            <way id="21"><tag k="highway" v="primary"/></way>
        </osm>"#;
        let xml_1km = r#"<osm>
            <way id="22"><tag k="highway" v="residential"/></way>
            <node id="9" lon="117.30" lat="31.86"><tag k="amenity" v="bank"/></node>
        </osm>"#;
        cache.write(&CacheKey::new(key.clone(), 3), xml_3km).unwrap();
        cache.write(&CacheKey::new(key.clone(), 1), xml_1km).unwrap();

        run(&input, &output, &config, &cache, &UnconfiguredGeocoder)
            .await
            .unwrap();

        let exported = std::fs::read_to_string(&output).unwrap();
        assert!(exported.starts_with('\u{feff}'));
        let mut reader = csv::Reader::from_reader(exported.trim_start_matches('\u{feff}').as_bytes());
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 1);

        let headers = {
            let mut r = csv::Reader::from_reader(exported.trim_start_matches('\u{feff}').as_bytes());
            r.headers().unwrap().clone()
        };
        let get = |name: &str| {
            let idx = headers.iter().position(|h| h == name).unwrap();
            records[0].get(idx).unwrap().to_string()
        };

        // Exact place node resolved; counts per radius; score bounded.
        assert_eq!(get("node"), "7");
        assert_eq!(get("road_primary_3km"), "1");
        assert_eq!(get("road_res_uncl_1km"), "1");
        assert_eq!(get("amenity_bank_1km"), "1");
        // The 3 km school node lands in the police bucket.
        assert_eq!(get("amenity_police_3km"), "1");
        assert_eq!(get("amenity_school_3km"), "0");
        let total: f64 = get("score").parse().unwrap();
        assert!(total > 0.0 && total <= 100.0);
    }

    #[tokio::test]
    async fn test_geocoder_miss_skips_four_token_line() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("places.txt");
        std::fs::write(&input, "A B C D\n").unwrap();
        let output = dir.path().join("out.csv");

        let config = offline_config();
        let cache = MemoryCache::new();
        let result = run(&input, &output, &config, &cache, &UnconfiguredGeocoder).await;
        assert!(result.is_err(), "no surviving rows must be fatal");
    }
}
