// Record enrichment pipeline
// Runs the location resolver over every record of a dataset exactly once,
// memoized by the dataset's content fingerprint. This is the expensive step
// (gazetteer substring scans per record) and the only one worth caching.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::gazetteer::Coordinate;
use crate::record::{Dataset, InventoryRecord};
use crate::resolver::LocationResolver;

// ============================================================================
// ENRICHED RECORD
// ============================================================================

/// An inventory record with its role fields resolved and the derived
/// location attributes attached.
///
/// Core role fields are lifted out of the column map for direct access; all
/// remaining source columns ride along in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    /// Stable row index from the source file.
    pub index: usize,

    /// Holder cell exactly as it appears in the source.
    pub holder_raw: String,

    pub model: Option<String>,
    pub color: Option<String>,
    pub status: Option<String>,
    pub target: Option<String>,

    /// Source columns not covered by a role.
    #[serde(default)]
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, String>,

    // ------------------------------------------------------------------
    // Derived attributes: a pure function of holder_normalized
    // ------------------------------------------------------------------
    pub holder_normalized: String,
    pub coordinate: Coordinate,
    pub region: String,
    pub city: String,
}

impl EnrichedRecord {
    pub fn model_display(&self) -> &str {
        self.model.as_deref().unwrap_or("-")
    }

    pub fn color_display(&self) -> &str {
        self.color.as_deref().unwrap_or("-")
    }

    pub fn status_display(&self) -> &str {
        self.status.as_deref().unwrap_or("-")
    }

    pub fn target_display(&self) -> &str {
        self.target.as_deref().unwrap_or("-")
    }
}

// ============================================================================
// ENRICHMENT CACHE
// ============================================================================

/// Fingerprint-keyed memoization of enriched datasets.
///
/// Re-enriching an unchanged dataset returns the cached snapshot; the cache
/// is invalidated explicitly when a dataset is replaced or the dashboard is
/// reset. Snapshots are shared as `Arc` so result sets can reference them
/// without copies.
#[derive(Debug)]
pub struct EnrichmentCache {
    resolver: LocationResolver,
    entries: HashMap<String, Arc<Vec<EnrichedRecord>>>,
}

impl EnrichmentCache {
    pub fn new(resolver: LocationResolver) -> Self {
        EnrichmentCache {
            resolver,
            entries: HashMap::new(),
        }
    }

    /// Enrich a dataset, reusing the cached snapshot when its fingerprint
    /// is already known.
    pub fn enrich(&mut self, dataset: &Dataset) -> Arc<Vec<EnrichedRecord>> {
        if let Some(cached) = self.entries.get(&dataset.fingerprint) {
            return Arc::clone(cached);
        }

        let enriched = Arc::new(enrich_records(&self.resolver, dataset));
        self.entries
            .insert(dataset.fingerprint.clone(), Arc::clone(&enriched));
        enriched
    }

    /// Drop the cached snapshot for one fingerprint.
    pub fn invalidate(&mut self, fingerprint: &str) {
        self.entries.remove(fingerprint);
    }

    /// Drop every cached snapshot. Idempotent.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EnrichmentCache {
    fn default() -> Self {
        EnrichmentCache::new(LocationResolver::default())
    }
}

/// One uncached enrichment pass.
fn enrich_records(resolver: &LocationResolver, dataset: &Dataset) -> Vec<EnrichedRecord> {
    dataset
        .records
        .iter()
        .map(|record| enrich_one(resolver, dataset, record))
        .collect()
}

fn enrich_one(
    resolver: &LocationResolver,
    dataset: &Dataset,
    record: &InventoryRecord,
) -> EnrichedRecord {
    let columns = &dataset.columns;
    let role_value =
        |col: &Option<String>| col.as_deref().and_then(|c| record.get(c)).map(str::to_string);

    // A row without a holder cell still resolves, via the default paths
    let holder_raw = role_value(&columns.holder).unwrap_or_default();
    let resolved = resolver.resolve(&holder_raw);

    let role_columns: Vec<&str> = [
        &columns.holder,
        &columns.model,
        &columns.color,
        &columns.status,
        &columns.target,
    ]
    .iter()
    .filter_map(|c| c.as_deref())
    .collect();

    let extra = record
        .fields
        .iter()
        .filter(|(name, _)| !role_columns.contains(&name.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    EnrichedRecord {
        index: record.index,
        holder_raw,
        model: role_value(&columns.model),
        color: role_value(&columns.color),
        status: role_value(&columns.status),
        target: role_value(&columns.target),
        extra,
        holder_normalized: resolved.holder_normalized,
        coordinate: resolved.coordinate,
        region: resolved.region,
        city: resolved.city,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ColumnMapConfig;

    fn sample_dataset() -> Dataset {
        let headers = vec![
            "모델명".to_string(),
            "색상".to_string(),
            "재고상태".to_string(),
            "보유처".to_string(),
            "비고".to_string(),
        ];
        let rows = vec![
            vec!["SM-F766N0", "블랙", "신품", "12A-강남점", "메모"],
            vec!["SM-F766N0", "블루", "신품", "55B-강남점", ""],
            vec!["SM-S937N0", "화이트", "중고", "Office-HQ(반추)", ""],
            vec!["SM-S937N0", "블랙", "신품", "", ""],
        ]
        .into_iter()
        .map(|r| r.into_iter().map(String::from).collect())
        .collect();

        Dataset::from_rows("sample.csv", headers, rows, &ColumnMapConfig::default())
    }

    #[test]
    fn test_enrichment_attaches_derived_fields() {
        let mut cache = EnrichmentCache::default();
        let ds = sample_dataset();
        let enriched = cache.enrich(&ds);

        assert_eq!(enriched.len(), 4);

        let first = &enriched[0];
        assert_eq!(first.holder_raw, "12A-강남점");
        assert_eq!(first.holder_normalized, "강남점");
        assert_eq!(first.region, "동남");
        assert_eq!(first.city, "강남");
        assert_eq!(first.model.as_deref(), Some("SM-F766N0"));
        assert_eq!(first.extra.get("비고").map(String::as_str), Some("메모"));
    }

    #[test]
    fn test_same_normalized_holder_shares_coordinate() {
        let mut cache = EnrichmentCache::default();
        let ds = sample_dataset();
        let enriched = cache.enrich(&ds);

        // Coordinate is a pure function of the normalized holder
        assert_eq!(enriched[0].coordinate, enriched[1].coordinate);
        assert_ne!(enriched[0].coordinate, enriched[2].coordinate);
    }

    #[test]
    fn test_cache_returns_same_snapshot_for_unchanged_dataset() {
        let mut cache = EnrichmentCache::default();
        let ds = sample_dataset();

        let first = cache.enrich(&ds);
        let second = cache.enrich(&ds);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_reenrichment_after_invalidate_is_field_identical() {
        let mut cache = EnrichmentCache::default();
        let ds = sample_dataset();

        let first = cache.enrich(&ds);
        cache.invalidate(&ds.fingerprint);
        assert!(cache.is_empty());

        let second = cache.enrich(&ds);
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
    }

    #[test]
    fn test_missing_holder_degrades_to_defaults() {
        let mut cache = EnrichmentCache::default();
        let ds = sample_dataset();
        let enriched = cache.enrich(&ds);

        let blank = &enriched[3];
        assert_eq!(blank.holder_normalized, "");
        assert_eq!(blank.region, crate::gazetteer::REGION_OTHER);
        assert_eq!(blank.city, crate::gazetteer::CITY_UNCLASSIFIED);
        assert_eq!(blank.coordinate, crate::gazetteer::DEFAULT_CENTER);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut cache = EnrichmentCache::default();
        let ds = sample_dataset();
        let _ = cache.enrich(&ds);

        cache.clear();
        cache.clear();
        assert!(cache.is_empty());
    }
}
