//! Place-list line parsing.
//!
//! Each input line is either 4 whitespace-separated name segments
//! (province, city, district, subdistrict) or those 4 plus an explicit
//! `lon lat` pair. Any other token count is skipped.

use anyhow::{Context, Result};

/// A four-level administrative address with its working coordinate
/// (longitude, latitude in degrees, WGS84).
#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    pub segments: [String; 4],
    pub lon: f64,
    pub lat: f64,
}

impl Address {
    /// Full space-joined name, used for geocoding and cache keys.
    pub fn full_name(&self) -> String {
        self.segments.join(" ")
    }

    /// The subdistrict segment the resolver matches against.
    pub fn last_segment(&self) -> &str {
        &self.segments[3]
    }
}

/// Outcome of parsing one place-list line.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    /// 6 tokens: the trailing pair is an explicit coordinate.
    WithCoordinate(Address),
    /// 4 tokens: the coordinate must come from the forward geocoder.
    NeedsGeocoding([String; 4]),
    /// Wrong token count, or a header line; skipped silently.
    Skip,
}

/// Parse one line of the place list.
///
/// A malformed coordinate is an error (the caller logs and skips the
/// place); a wrong token count is not.
pub fn parse_place_line(line: &str) -> Result<ParsedLine> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 4 && tokens.len() != 6 {
        return Ok(ParsedLine::Skip);
    }
    // Column-header lines exported from spreadsheets start with "addr_1".
    if tokens[0].contains("addr_1") {
        return Ok(ParsedLine::Skip);
    }

    let segments = [
        tokens[0].to_string(),
        tokens[1].to_string(),
        tokens[2].to_string(),
        tokens[3].to_string(),
    ];

    if tokens.len() == 4 {
        return Ok(ParsedLine::NeedsGeocoding(segments));
    }

    let lon: f64 = tokens[4]
        .parse()
        .with_context(|| format!("bad longitude {:?}", tokens[4]))?;
    let lat: f64 = tokens[5]
        .parse()
        .with_context(|| format!("bad latitude {:?}", tokens[5]))?;

    Ok(ParsedLine::WithCoordinate(Address { segments, lon, lat }))
}

/// Parse a geocoder response of the form "lon,lat".
pub fn parse_lonlat(geo: &str) -> Result<(f64, f64)> {
    let (lon, lat) = geo
        .split_once(',')
        .with_context(|| format!("geocoder returned {:?}", geo))?;
    Ok((
        lon.trim().parse().context("bad geocoded longitude")?,
        lat.trim().parse().context("bad geocoded latitude")?,
    ))
}
