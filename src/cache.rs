use std::time::{Duration, Instant};

use crate::config::Config;

/// Identity of a set of loaded modules: each module name with its source.
/// Editing the configuration changes the key and so forces a reload.
pub type SourceKey = Vec<(String, Option<String>)>;

pub fn source_key(config: &Config) -> SourceKey {
    config
        .modules
        .iter()
        .map(|m| (m.name.clone(), m.source_url()))
        .collect()
}

struct Entry<K, V> {
    key: K,
    value: V,
    fetched_at: Instant,
}

/// Single-entry cache with a fixed time-to-live.
///
/// Callers pass `now` explicitly so expiry is decided by the caller's clock.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entry: Option<Entry<K, V>>,
}

impl<K: PartialEq, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    /// True when there is nothing cached or the cached value is at least `ttl` old.
    pub fn is_expired(&self, now: Instant) -> bool {
        match &self.entry {
            Some(entry) => now.saturating_duration_since(entry.fetched_at) >= self.ttl,
            None => true,
        }
    }

    pub fn get(&self, key: &K, now: Instant) -> Option<V> {
        if self.is_expired(now) {
            return None;
        }
        self.entry
            .as_ref()
            .filter(|entry| entry.key == *key)
            .map(|entry| entry.value.clone())
    }

    pub fn insert(&mut self, key: K, value: V, now: Instant) {
        self.entry = Some(Entry {
            key,
            value,
            fetched_at: now,
        });
    }

    pub fn fetched_at(&self) -> Option<Instant> {
        self.entry.as_ref().map(|entry| entry.fetched_at)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cache_is_expired() {
        let cache: TtlCache<u8, u8> = TtlCache::new(Duration::from_secs(600));
        assert!(cache.is_expired(Instant::now()));
        assert_eq!(cache.get(&1, Instant::now()), None);
    }

    #[test]
    fn serves_fresh_entries_until_ttl() {
        let start = Instant::now();
        let mut cache = TtlCache::new(Duration::from_secs(600));
        cache.insert("sources", 7, start);

        assert_eq!(cache.get(&"sources", start + Duration::from_secs(599)), Some(7));
        assert!(!cache.is_expired(start + Duration::from_secs(599)));
        assert!(cache.is_expired(start + Duration::from_secs(600)));
        assert_eq!(cache.get(&"sources", start + Duration::from_secs(601)), None);
        assert_eq!(cache.fetched_at(), Some(start));
    }

    #[test]
    fn different_key_misses() {
        let now = Instant::now();
        let mut cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("a", 1, now);
        assert_eq!(cache.get(&"b", now), None);

        cache.invalidate();
        assert_eq!(cache.get(&"a", now), None);
    }

    #[test]
    fn source_key_tracks_module_sources() {
        let mut config = Config::default();
        let before = source_key(&config);
        config.modules[3].source = Some("new-sheet".into());
        assert_ne!(before, source_key(&config));
    }
}
