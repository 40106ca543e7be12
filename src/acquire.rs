//! Geo-dataset acquisition: cache-first Overpass downloads.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use crate::cache::{CacheKey, CacheStore};
use crate::config::Config;
use crate::osm::{parse_osm, GeoGraph};
use crate::overpass::{around_query, OverpassClient};

/// Fetches, caches and parses one dataset per (place, radius).
pub struct Acquirer<'a> {
    client: &'a OverpassClient,
    cache: &'a dyn CacheStore,
    offline: bool,
    timeout_s: u64,
    cooldown: Duration,
}

impl<'a> Acquirer<'a> {
    pub fn new(client: &'a OverpassClient, cache: &'a dyn CacheStore, config: &Config) -> Self {
        Self {
            client,
            cache,
            offline: config.offline,
            timeout_s: config.timeout_s,
            cooldown: Duration::from_secs(config.cooldown_s),
        }
    }

    /// Obtain the graph for `radius_m` meters around the center.
    ///
    /// A cache hit (unless `force_refresh`) involves no network
    /// activity and no cool-down. A fresh download is persisted before
    /// parsing, then followed by the configured cool-down.
    pub async fn acquire(
        &self,
        lon: f64,
        lat: f64,
        radius_m: u32,
        key: &CacheKey,
        force_refresh: bool,
    ) -> Result<GeoGraph> {
        if self.cache.contains(key) && !force_refresh {
            debug!("Cache hit for {}", key.file_name());
            let raw = self.cache.read(key)?;
            return parse_osm(&raw)
                .with_context(|| format!("Failed to parse cached dataset {}", key.file_name()));
        }

        if self.offline {
            bail!("offline mode: no cached dataset for {}", key.file_name());
        }

        info!("Downloading OSM ({} m) for {}", radius_m, key.file_name());
        let query = around_query(lon, lat, radius_m, self.timeout_s);
        let raw = self
            .client
            .post_query(&query)
            .await
            .with_context(|| format!("Overpass fetch failed for {}", key.file_name()))?;

        self.cache.write(key, &raw)?;
        tokio::time::sleep(self.cooldown).await;

        parse_osm(&raw)
            .with_context(|| format!("Failed to parse downloaded dataset {}", key.file_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;

    fn test_config() -> Config {
        Config {
            offline: true,
            cooldown_s: 0,
            ..Config::default()
        }
    }

    fn test_client(config: &Config) -> OverpassClient {
        OverpassClient::new(
            &config.overpass_url,
            &config.user_agent,
            config.timeout_s,
            config.max_retries,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_cache_hit_needs_no_network() {
        let config = test_config();
        let client = test_client(&config);
        let cache = MemoryCache::new();
        let key = CacheKey::new("P", 3);
        cache
            .write(&key, r#"<osm><node id="1" lon="1.0" lat="2.0"/></osm>"#)
            .unwrap();

        let acquirer = Acquirer::new(&client, &cache, &config);
        let graph = acquirer.acquire(1.0, 2.0, 3000, &key, false).await.unwrap();
        assert_eq!(graph.nodes.len(), 1);
    }

    #[tokio::test]
    async fn test_offline_miss_fails() {
        let config = test_config();
        let client = test_client(&config);
        let cache = MemoryCache::new();
        let key = CacheKey::new("P", 3);

        let acquirer = Acquirer::new(&client, &cache, &config);
        assert!(acquirer.acquire(1.0, 2.0, 3000, &key, false).await.is_err());
    }

    #[tokio::test]
    async fn test_force_refresh_ignores_cache_entry() {
        let config = test_config();
        let client = test_client(&config);
        let cache = MemoryCache::new();
        let key = CacheKey::new("P", 3);
        cache.write(&key, "<osm/>").unwrap();

        // Forced refresh must go to the network; offline makes that an error.
        let acquirer = Acquirer::new(&client, &cache, &config);
        assert!(acquirer.acquire(1.0, 2.0, 3000, &key, true).await.is_err());
    }
}
