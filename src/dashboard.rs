// Dashboard facade
// The surface the hosting shell talks to: load a dataset, run queries,
// reset. Single-threaded by design; each call runs to completion. A
// concurrent host must wrap this in a lock or swap immutable snapshots so a
// query can never observe a half-replaced dataset.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::enrich::{EnrichedRecord, EnrichmentCache};
use crate::query::{query, FilterSpec, QueryError, QueryResult};
use crate::record::{load_csv_with, ColumnMapConfig, Dataset};
use crate::resolver::LocationResolver;

pub struct Dashboard {
    cache: EnrichmentCache,
    column_config: ColumnMapConfig,
    current: Option<Dataset>,
}

impl Dashboard {
    pub fn new() -> Self {
        Dashboard::with_resolver(LocationResolver::default())
    }

    /// Build a dashboard around a specific resolver (custom gazetteer
    /// version or jitter radius).
    pub fn with_resolver(resolver: LocationResolver) -> Self {
        Dashboard {
            cache: EnrichmentCache::new(resolver),
            column_config: ColumnMapConfig::default(),
            current: None,
        }
    }

    pub fn set_column_config(&mut self, config: ColumnMapConfig) {
        self.column_config = config;
    }

    /// Load a CSV file as the current dataset, replacing any previous one.
    /// The previous dataset's cache entry is invalidated.
    pub fn load_csv(&mut self, path: &Path) -> Result<&Dataset> {
        let dataset = load_csv_with(path, &self.column_config)?;
        Ok(self.replace_dataset(dataset))
    }

    /// Install an already-built dataset as current.
    pub fn replace_dataset(&mut self, dataset: Dataset) -> &Dataset {
        if let Some(old) = self.current.take() {
            if old.fingerprint != dataset.fingerprint {
                self.cache.invalidate(&old.fingerprint);
            }
        }
        self.current.insert(dataset)
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.current.as_ref()
    }

    /// Enriched records of the current dataset, memoized per fingerprint.
    pub fn enriched(&mut self) -> Result<Arc<Vec<EnrichedRecord>>, QueryError> {
        match &self.current {
            Some(dataset) => Ok(self.cache.enrich(dataset)),
            None => Err(QueryError::SourceDataUnavailable),
        }
    }

    /// Run one filter query against the current dataset.
    pub fn query(&mut self, spec: &FilterSpec) -> Result<QueryResult, QueryError> {
        let records = self.enriched()?;
        query(&records, spec)
    }

    /// Clear all cached and derived state. Idempotent; the next query
    /// reports `SourceDataUnavailable` until a dataset is loaded again.
    pub fn reset(&mut self) {
        self.current = None;
        self.cache.clear();
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Dashboard::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Selection;

    fn sample_dataset(holder: &str) -> Dataset {
        let headers = vec!["모델명".to_string(), "보유처".to_string()];
        let rows = vec![vec!["SM-F766N0".to_string(), holder.to_string()]];
        Dataset::from_rows("sample.csv", headers, rows, &ColumnMapConfig::default())
    }

    fn model_spec() -> FilterSpec {
        FilterSpec {
            models: Selection::specific(["SM-F766N0"]),
            ..FilterSpec::default()
        }
    }

    #[test]
    fn test_query_without_dataset_reports_no_data() {
        let mut dash = Dashboard::new();
        assert_eq!(
            dash.query(&model_spec()),
            Err(QueryError::SourceDataUnavailable)
        );
    }

    #[test]
    fn test_load_then_query() {
        let mut dash = Dashboard::new();
        dash.replace_dataset(sample_dataset("12A-강남점"));

        let result = dash.query(&model_spec()).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.list_view[0].holder_normalized, "강남점");
    }

    #[test]
    fn test_replace_dataset_invalidates_old_entry() {
        let mut dash = Dashboard::new();
        dash.replace_dataset(sample_dataset("강남점"));
        let _ = dash.enriched().unwrap();

        dash.replace_dataset(sample_dataset("동탄모바일"));
        let enriched = dash.enriched().unwrap();
        assert_eq!(enriched[0].holder_normalized, "동탄모바일");
    }

    #[test]
    fn test_reset_is_idempotent_and_clears_state() {
        let mut dash = Dashboard::new();
        dash.replace_dataset(sample_dataset("강남점"));
        let _ = dash.enriched().unwrap();

        dash.reset();
        dash.reset();

        assert!(dash.dataset().is_none());
        assert_eq!(
            dash.query(&model_spec()),
            Err(QueryError::SourceDataUnavailable)
        );
    }
}
