// Source records and dataset loading
// The external tabular reader delivers rows of named string fields; this
// module loads them from CSV, detects which columns play which role, and
// stamps the dataset with a content fingerprint for the enrichment cache.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

// ============================================================================
// INVENTORY RECORD
// ============================================================================

/// One source row: named string fields, identified by its original row
/// position. Immutable once read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    /// Stable zero-based row index in the source file.
    pub index: usize,

    /// Column name -> cell value, as delivered by the reader.
    pub fields: HashMap<String, String>,
}

impl InventoryRecord {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }
}

// ============================================================================
// COLUMN MAP
// ============================================================================

/// Knobs for fuzzy column detection.
///
/// The source revisions disagreed on the status/date keyword lists and on
/// the fixed ship-date column position; those differences are configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMapConfig {
    /// Header substrings that mark the status column.
    pub status_keywords: Vec<String>,

    /// Header substrings that mark the ship-date/target column.
    pub target_keywords: Vec<String>,

    /// Fixed column index preferred for the target column...
    pub target_fixed_index: usize,

    /// ...when the sheet has at least this many columns.
    pub target_min_columns: usize,
}

impl Default for ColumnMapConfig {
    fn default() -> Self {
        ColumnMapConfig {
            status_keywords: vec!["재고".into(), "상태".into(), "등급".into()],
            target_keywords: vec!["출고".into(), "날짜".into()],
            target_fixed_index: 13,
            target_min_columns: 14,
        }
    }
}

/// Role -> actual column name, detected from the header row.
///
/// Detection is substring-based: any header containing "보유처" is the
/// holder column, and so on. Headers are cleaned of the "▼" sort adornment
/// and trimmed before matching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnMap {
    pub holder: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub status: Option<String>,
    pub target: Option<String>,
}

fn clean_header(header: &str) -> String {
    header.replace('▼', "").trim().to_string()
}

impl ColumnMap {
    /// Detect column roles from the raw header row.
    pub fn detect(headers: &[String], config: &ColumnMapConfig) -> Self {
        let mut map = ColumnMap::default();

        for header in headers {
            let cleaned = clean_header(header);

            if map.holder.is_none() && cleaned.contains("보유처") {
                map.holder = Some(header.clone());
            } else if map.model.is_none() && cleaned.contains("모델명") {
                map.model = Some(header.clone());
            } else if map.color.is_none() && cleaned.contains("색상") {
                map.color = Some(header.clone());
            } else if map.status.is_none()
                && config.status_keywords.iter().any(|k| cleaned.contains(k.as_str()))
            {
                map.status = Some(header.clone());
            }
        }

        // Model falls back to the first column
        if map.model.is_none() {
            map.model = headers.first().cloned();
        }

        // Ship-date column: fixed position on wide sheets, keyword search
        // otherwise
        if headers.len() >= config.target_min_columns {
            map.target = headers.get(config.target_fixed_index).cloned();
        }
        if map.target.is_none() {
            map.target = headers
                .iter()
                .find(|h| {
                    let cleaned = clean_header(h);
                    config.target_keywords.iter().any(|k| cleaned.contains(k.as_str()))
                })
                .cloned();
        }

        map
    }
}

// ============================================================================
// DATASET
// ============================================================================

/// A loaded source file: its rows, detected columns and provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    /// Display name of the source file.
    pub source_file: String,

    /// SHA-256 over the file content; memoization key for enrichment.
    pub fingerprint: String,

    /// When this dataset was loaded.
    pub loaded_at: DateTime<Utc>,

    /// Detected column roles.
    pub columns: ColumnMap,

    pub records: Vec<InventoryRecord>,
}

impl Dataset {
    /// Build a dataset from in-memory rows; the fingerprint is derived from
    /// the row content so unchanged data keys the same cache entry.
    pub fn from_rows(
        source_file: &str,
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
        config: &ColumnMapConfig,
    ) -> Self {
        let mut hasher = Sha256::new();
        for h in &headers {
            hasher.update(h.as_bytes());
            hasher.update([0]);
        }
        for row in &rows {
            for cell in row {
                hasher.update(cell.as_bytes());
                hasher.update([0]);
            }
        }
        let fingerprint = format!("{:x}", hasher.finalize());

        let columns = ColumnMap::detect(&headers, config);
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| InventoryRecord {
                index,
                fields: headers.iter().cloned().zip(row).collect(),
            })
            .collect();

        Dataset {
            source_file: source_file.to_string(),
            fingerprint,
            loaded_at: Utc::now(),
            columns,
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Load a dataset from a CSV file with the default column config.
pub fn load_csv(csv_path: &Path) -> Result<Dataset> {
    load_csv_with(csv_path, &ColumnMapConfig::default())
}

/// Load a dataset from a CSV file.
///
/// All cells are kept as strings; rows shorter than the header are padded
/// with empty fields rather than rejected (malformed rows degrade, they do
/// not fail).
pub fn load_csv_with(csv_path: &Path, config: &ColumnMapConfig) -> Result<Dataset> {
    let bytes = fs::read(csv_path)
        .with_context(|| format!("Failed to read CSV file: {:?}", csv_path))?;

    let fingerprint = format!("{:x}", Sha256::digest(&bytes));

    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes.as_slice());

    let headers: Vec<String> = rdr
        .headers()
        .context("Failed to read CSV header row")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut records = Vec::new();
    for (index, result) in rdr.records().enumerate() {
        let row = result.with_context(|| format!("Failed to read CSV row {}", index + 1))?;

        let mut fields = HashMap::with_capacity(headers.len());
        for (i, header) in headers.iter().enumerate() {
            fields.insert(header.clone(), row.get(i).unwrap_or("").to_string());
        }

        records.push(InventoryRecord { index, fields });
    }

    let columns = ColumnMap::detect(&headers, config);

    Ok(Dataset {
        source_file: csv_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| csv_path.display().to_string()),
        fingerprint,
        loaded_at: Utc::now(),
        columns,
        records,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_detect_roles_by_keyword() {
        let h = headers(&["모델명", "색상", "재고상태", "보유처 ▼", "비고"]);
        let map = ColumnMap::detect(&h, &ColumnMapConfig::default());

        assert_eq!(map.model.as_deref(), Some("모델명"));
        assert_eq!(map.color.as_deref(), Some("색상"));
        assert_eq!(map.status.as_deref(), Some("재고상태"));
        assert_eq!(map.holder.as_deref(), Some("보유처 ▼"));
    }

    #[test]
    fn test_model_falls_back_to_first_column() {
        let h = headers(&["기기", "색상", "보유처"]);
        let map = ColumnMap::detect(&h, &ColumnMapConfig::default());

        assert_eq!(map.model.as_deref(), Some("기기"));
    }

    #[test]
    fn test_target_fixed_index_on_wide_sheets() {
        let names: Vec<String> = (0..14).map(|i| format!("col{}", i)).collect();
        let map = ColumnMap::detect(&names, &ColumnMapConfig::default());

        assert_eq!(map.target.as_deref(), Some("col13"));
    }

    #[test]
    fn test_target_keyword_search_on_narrow_sheets() {
        let h = headers(&["모델명", "색상", "출고일", "보유처"]);
        let map = ColumnMap::detect(&h, &ColumnMapConfig::default());

        assert_eq!(map.target.as_deref(), Some("출고일"));
    }

    #[test]
    fn test_from_rows_fingerprint_tracks_content() {
        let config = ColumnMapConfig::default();
        let h = headers(&["모델명", "보유처"]);
        let rows = vec![vec!["SM-1".to_string(), "강남점".to_string()]];

        let a = Dataset::from_rows("a.csv", h.clone(), rows.clone(), &config);
        let b = Dataset::from_rows("b.csv", h.clone(), rows, &config);
        let c = Dataset::from_rows(
            "c.csv",
            h,
            vec![vec!["SM-2".to_string(), "강남점".to_string()]],
            &config,
        );

        // Same content, same fingerprint; changed content, new fingerprint
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_ne!(a.fingerprint, c.fingerprint);
    }

    #[test]
    fn test_record_field_access() {
        let config = ColumnMapConfig::default();
        let ds = Dataset::from_rows(
            "x.csv",
            headers(&["모델명", "보유처"]),
            vec![vec!["SM-1".to_string(), "12A-강남점".to_string()]],
            &config,
        );

        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].index, 0);
        assert_eq!(ds.records[0].get("보유처"), Some("12A-강남점"));
        assert_eq!(ds.records[0].get("없는열"), None);
    }
}
