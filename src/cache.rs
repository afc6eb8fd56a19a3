//! # Document Result Cache
//!
//! Re-uploading the same scan is the common case in a consultation workflow,
//! so OCR output is cached against a fingerprint of the document bytes. The
//! cache is TTL-bounded and capacity-bounded, evicting the oldest entry when
//! full.

use parking_lot::RwLock;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60); // 1 hour
pub const DEFAULT_MAX_ENTRIES: usize = 128;

/// Fingerprint of a document's raw bytes, used as the cache key.
pub fn document_fingerprint(document: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    document.hash(&mut hasher);
    hasher.finish()
}

#[derive(Debug, Clone)]
struct CacheEntry {
    text: String,
    inserted_at: Instant,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Cache hit/miss counters.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Thread-safe fingerprint-keyed cache of OCR'd document text.
pub struct DocumentCache {
    entries: RwLock<HashMap<u64, CacheEntry>>,
    stats: RwLock<CacheStats>,
    ttl: Duration,
    max_entries: usize,
}

impl Default for DocumentCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_MAX_ENTRIES)
    }
}

impl DocumentCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stats: RwLock::new(CacheStats::default()),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Look up cached OCR text for a document fingerprint.
    pub fn get(&self, fingerprint: u64) -> Option<String> {
        let entries = self.entries.read();
        let mut stats = self.stats.write();
        match entries.get(&fingerprint) {
            Some(entry) if !entry.is_expired() => {
                stats.hits += 1;
                debug!("Cache hit for document {:016x}", fingerprint);
                Some(entry.text.clone())
            }
            _ => {
                stats.misses += 1;
                None
            }
        }
    }

    /// Store OCR text for a document fingerprint, evicting the oldest entry
    /// when the cache is full.
    pub fn insert(&self, fingerprint: u64, text: String) {
        let mut entries = self.entries.write();

        entries.retain(|_, entry| !entry.is_expired());
        if entries.len() >= self.max_entries && !entries.contains_key(&fingerprint) {
            if let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(key, _)| *key)
            {
                entries.remove(&oldest);
                debug!("Evicted oldest cache entry {:016x}", oldest);
            }
        }

        let now = Instant::now();
        entries.insert(
            fingerprint,
            CacheEntry {
                text,
                inserted_at: now,
                expires_at: now + self.ttl,
            },
        );
        self.stats.write().entries = entries.len();
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.read().clone();
        stats.entries = self.entries.read().len();
        stats
    }

    pub fn clear(&self) {
        self.entries.write().clear();
        *self.stats.write() = CacheStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable() {
        let bytes = b"scanned prescription bytes";
        assert_eq!(document_fingerprint(bytes), document_fingerprint(bytes));
        assert_ne!(
            document_fingerprint(bytes),
            document_fingerprint(b"different document")
        );
    }

    #[test]
    fn test_insert_and_get() {
        let cache = DocumentCache::default();
        let key = document_fingerprint(b"doc");
        assert!(cache.get(key).is_none());
        cache.insert(key, "처방전 텍스트".to_string());
        assert_eq!(cache.get(key).as_deref(), Some("처방전 텍스트"));
    }

    #[test]
    fn test_expired_entries_miss() {
        let cache = DocumentCache::new(Duration::from_millis(0), 16);
        let key = document_fingerprint(b"doc");
        cache.insert(key, "text".to_string());
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get(key).is_none());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let cache = DocumentCache::new(Duration::from_secs(60), 2);
        cache.insert(1, "a".to_string());
        std::thread::sleep(Duration::from_millis(2));
        cache.insert(2, "b".to_string());
        std::thread::sleep(Duration::from_millis(2));
        cache.insert(3, "c".to_string());
        assert!(cache.get(1).is_none());
        assert!(cache.get(2).is_some());
        assert!(cache.get(3).is_some());
    }

    #[test]
    fn test_stats_track_hits_and_misses() {
        let cache = DocumentCache::default();
        let key = document_fingerprint(b"doc");
        cache.get(key);
        cache.insert(key, "text".to_string());
        cache.get(key);
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }
}
