// Persistent geocode cache backed by DashMap, snapshotted as JSON
use crate::domain::error::LivmapError;
use crate::domain::model::GeocodeResult;
use dashmap::DashMap;
use std::collections::BTreeMap;

/// Address-keyed memoization store for geocode results.
///
/// Keys are normalized addresses. The cache is a cross-session memoization
/// log: it is never pruned, and a key is resolved by the provider at most
/// once per cache lifetime. Only fully-formed positive results are inserted;
/// not-found and failed lookups stay out so a later run can retry them.
pub struct GeocodeCache {
    map: DashMap<String, GeocodeResult>,
}

/// Outcome of loading a snapshot: the entries kept plus how many were
/// malformed and skipped.
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: usize,
}

impl GeocodeCache {
    pub fn new() -> Self {
        Self {
            map: DashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<GeocodeResult> {
        self.map.get(key).map(|entry| entry.value().clone())
    }

    pub fn insert(&self, key: String, value: GeocodeResult) {
        self.map.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Build a cache from a JSON snapshot string.
    ///
    /// A snapshot that is not a JSON object at the top level is an error.
    /// Individual malformed entries are skipped and counted; one bad entry
    /// never fails the whole load.
    pub fn load(snapshot: &str) -> Result<(Self, LoadReport), LivmapError> {
        let cache = Self::new();
        let report = cache.merge(snapshot)?;
        Ok((cache, report))
    }

    /// Merge a JSON snapshot into this cache.
    ///
    /// Adds or overwrites keys from the snapshot; existing keys not named by
    /// the snapshot are kept untouched.
    pub fn merge(&self, snapshot: &str) -> Result<LoadReport, LivmapError> {
        let entries: serde_json::Map<String, serde_json::Value> = serde_json::from_str(snapshot)
            .map_err(|e| LivmapError::Snapshot(format!("snapshot is not a JSON object: {e}")))?;

        let mut report = LoadReport {
            loaded: 0,
            skipped: 0,
        };
        for (addr, value) in entries {
            match serde_json::from_value::<GeocodeResult>(value) {
                Ok(result) => {
                    self.map.insert(addr, result);
                    report.loaded += 1;
                }
                Err(e) => {
                    tracing::warn!(address = %addr, error = %e, "skipping malformed cache entry");
                    report.skipped += 1;
                }
            }
        }
        Ok(report)
    }

    /// Snapshot every entry currently held. Key order carries no meaning;
    /// a sorted map just keeps exported files diff-friendly.
    pub fn export(&self) -> BTreeMap<String, GeocodeResult> {
        self.map
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Serialize the cache to the stable snapshot format.
    pub fn to_json(&self) -> Result<String, LivmapError> {
        Ok(serde_json::to_string_pretty(&self.export())?)
    }
}

impl Default for GeocodeCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paris() -> GeocodeResult {
        GeocodeResult {
            latitude: Some(48.8566),
            longitude: Some(2.3522),
            city: "Paris".to_string(),
            postal_code: "75001".to_string(),
        }
    }

    #[test]
    fn get_after_insert_returns_the_same_result() {
        let cache = GeocodeCache::new();
        cache.insert("10 Rue A".to_string(), paris());
        assert_eq!(cache.get("10 Rue A"), Some(paris()));
        assert_eq!(cache.get("11 Rue A"), None);
    }

    #[test]
    fn insert_overwrites() {
        let cache = GeocodeCache::new();
        cache.insert("10 Rue A".to_string(), GeocodeResult::not_found());
        cache.insert("10 Rue A".to_string(), paris());
        assert_eq!(cache.get("10 Rue A"), Some(paris()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn snapshot_round_trip_is_idempotent() {
        let cache = GeocodeCache::new();
        cache.insert("10 Rue A".to_string(), paris());
        cache.insert(
            "1 Main St".to_string(),
            GeocodeResult {
                latitude: Some(1.0),
                longitude: Some(2.0),
                city: "X".to_string(),
                postal_code: "00000".to_string(),
            },
        );

        let json = cache.to_json().unwrap();
        let (reloaded, report) = GeocodeCache::load(&json).unwrap();
        assert_eq!(report.loaded, 2);
        assert_eq!(report.skipped, 0);
        assert_eq!(reloaded.export(), cache.export());

        // A second round trip changes nothing
        let json2 = reloaded.to_json().unwrap();
        assert_eq!(json, json2);
    }

    #[test]
    fn load_accepts_null_string_fields() {
        let snapshot = r#"{
            "1 Main St": {"latitude": 1.0, "longitude": 2.0, "ville": null, "code_postal": null}
        }"#;
        let (cache, report) = GeocodeCache::load(snapshot).unwrap();
        assert_eq!(report.loaded, 1);
        let r = cache.get("1 Main St").unwrap();
        assert!(r.is_found());
        assert_eq!(r.city, "");
        assert_eq!(r.postal_code, "");
    }

    #[test]
    fn malformed_entry_is_skipped_not_fatal() {
        let snapshot = r#"{
            "good": {"latitude": 1.0, "longitude": 2.0, "ville": "X", "code_postal": "0"},
            "bad": ["not", "an", "object"]
        }"#;
        let (cache, report) = GeocodeCache::load(snapshot).unwrap();
        assert_eq!(report.loaded, 1);
        assert_eq!(report.skipped, 1);
        assert!(cache.get("good").is_some());
        assert!(cache.get("bad").is_none());
    }

    #[test]
    fn entry_with_missing_fields_defaults_to_partially_empty() {
        let snapshot = r#"{"sparse": {"latitude": 1.0}}"#;
        let (cache, _) = GeocodeCache::load(snapshot).unwrap();
        let r = cache.get("sparse").unwrap();
        assert_eq!(r.latitude, Some(1.0));
        assert_eq!(r.longitude, None);
        assert_eq!(r.city, "");
    }

    #[test]
    fn top_level_garbage_is_an_error() {
        assert!(GeocodeCache::load("[1, 2, 3]").is_err());
        assert!(GeocodeCache::load("not json").is_err());
    }

    #[test]
    fn merge_adds_without_deleting() {
        let cache = GeocodeCache::new();
        cache.insert("kept".to_string(), paris());
        let report = cache
            .merge(r#"{"added": {"latitude": 3.0, "longitude": 4.0, "ville": "", "code_postal": ""}}"#)
            .unwrap();
        assert_eq!(report.loaded, 1);
        assert_eq!(cache.len(), 2);
        assert!(cache.get("kept").is_some());
        assert!(cache.get("added").is_some());
    }
}
