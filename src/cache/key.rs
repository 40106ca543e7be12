//! Filesystem-safe cache keys for place names.
//!
//! The original tooling romanized names before using them as file
//! names. Proper transliteration is an external concern; here a
//! segment that is already safe ASCII is kept (capitalized), anything
//! else is keyed by its xxh64 digest, which is stable across runs.

use xxhash_rust::xxh64::xxh64;

fn segment_key(segment: &str) -> String {
    if !segment.is_empty() && segment.chars().all(|c| c.is_ascii_alphanumeric()) {
        let mut chars = segment.chars();
        match chars.next() {
            Some(first) => first.to_ascii_uppercase().to_string() + &chars.as_str().to_lowercase(),
            None => String::new(),
        }
    } else {
        format!("{:016x}", xxh64(segment.as_bytes(), 0))
    }
}

/// Derive the cache key for a full 4-segment place name.
pub fn place_key(segments: &[String; 4]) -> String {
    segments
        .iter()
        .map(|s| segment_key(s))
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_segments_stay_readable() {
        let segs = ["anhui", "hefei", "yaohai", "mingguang"].map(String::from);
        assert_eq!(place_key(&segs), "Anhui_Hefei_Yaohai_Mingguang");
    }

    #[test]
    fn test_non_ascii_segments_hash_deterministically() {
        let segs = ["安徽省", "合肥市", "瑶海区", "明光路街道"].map(String::from);
        let a = place_key(&segs);
        let b = place_key(&segs);
        assert_eq!(a, b);
        // 4 hex segments joined by underscores, no raw non-ASCII left.
        assert!(a.is_ascii());
        assert_eq!(a.split('_').count(), 4);
    }

    #[test]
    fn test_mixed_content_hashes() {
        assert!(segment_key("a b").chars().all(|c| c.is_ascii_hexdigit()));
    }
}
