// Marker clustering and styling
// Groups map-eligible records by exact coordinate and owner, aggregates
// each group for its popup, and decides the marker's visual state. This is
// the renderer's input contract; no HTML is produced here.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::enrich::EnrichedRecord;
use crate::gazetteer::Coordinate;
use crate::normalize::is_office;

// ============================================================================
// DEVICE COLOR PALETTE
// ============================================================================

/// Map a device color name to a `(background, foreground)` hex pair for
/// marker rendering. Korean and English names are accepted; unknown colors
/// fall back to the map default blue.
pub fn device_color_hex(color: &str) -> (&'static str, &'static str) {
    let c = color.to_lowercase();

    if c.contains("블랙") || c.contains("black") {
        ("#000000", "#FFFFFF")
    } else if c.contains("화이트") || c.contains("white") || c.contains("실버") {
        ("#FFFFFF", "#000000")
    } else if c.contains("그레이") || c.contains("티타늄") {
        ("#808080", "#000000")
    } else if c.contains("블루") {
        ("#0000FF", "#FFFFFF")
    } else if c.contains("핑크") {
        ("#FFC0CB", "#000000")
    } else if c.contains("그린") {
        ("#008000", "#FFFFFF")
    } else if c.contains("골드") || c.contains("옐로우") {
        ("#FFD700", "#000000")
    } else if c.contains("퍼플") {
        ("#800080", "#FFFFFF")
    } else if c.contains("레드") {
        ("#FF0000", "#FFFFFF")
    } else {
        ("#3388ff", "#000000")
    }
}

// ============================================================================
// MARKER STYLE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerIcon {
    /// Regular holder marker.
    Device,

    /// The office gets the star treatment.
    OfficeStar,
}

/// Visual state of one marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub background: String,
    pub foreground: String,
    pub icon: MarkerIcon,
}

// ============================================================================
// MARKER GROUP
// ============================================================================

/// One popup table row: one device unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub model: String,
    pub color: String,
    pub status: String,
    pub target: String,
    pub qty: u32,
}

/// All records sharing one exact coordinate and owner: one map marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerGroup {
    pub coordinate: Coordinate,

    /// Normalized holder name; grouping by coordinate alone would already
    /// separate owners (the coordinate is a function of the name), the
    /// owner is part of the key to make that explicit.
    pub owner: String,

    pub region: String,
    pub is_office: bool,

    /// Distinct device colors present, in first-seen order.
    pub unique_colors: Vec<String>,

    /// Per-unit rows for the popup table.
    pub rows: Vec<SummaryRow>,
}

impl MarkerGroup {
    /// Popup header, e.g. "동남 - 강남점".
    pub fn popup_title(&self) -> String {
        format!("{} - {}", self.region, self.owner)
    }

    /// Unit count shown as the popup total.
    pub fn total(&self) -> usize {
        self.rows.len()
    }

    /// Marker visual state: single-color groups carry the device color,
    /// mixed groups the fixed purple, office groups the yellow star.
    pub fn style(&self) -> MarkerStyle {
        if self.is_office {
            return MarkerStyle {
                background: "rgba(255, 255, 0, 0.9)".to_string(),
                foreground: "red".to_string(),
                icon: MarkerIcon::OfficeStar,
            };
        }

        if self.unique_colors.len() == 1 {
            let (hex, _) = device_color_hex(&self.unique_colors[0]);
            // White devices need a dark chip to stay visible
            let (background, foreground) = if hex.eq_ignore_ascii_case("#FFFFFF") {
                ("rgba(0,0,0,0.4)".to_string(), "white".to_string())
            } else {
                ("rgba(255,255,255,0.8)".to_string(), hex.to_string())
            };
            return MarkerStyle {
                background,
                foreground,
                icon: MarkerIcon::Device,
            };
        }

        MarkerStyle {
            background: "rgba(128,0,128,0.8)".to_string(),
            foreground: "white".to_string(),
            icon: MarkerIcon::Device,
        }
    }
}

/// Group map-view records into markers by exact coordinate equality and
/// owner. Groups come back ordered by coordinate then owner, so marker
/// output is deterministic.
pub fn group_markers(records: &[EnrichedRecord]) -> Vec<MarkerGroup> {
    let mut groups: HashMap<(u64, u64, &str), MarkerGroup> = HashMap::new();

    for record in records {
        let (lat_bits, lon_bits) = record.coordinate.grouping_key();
        let key = (lat_bits, lon_bits, record.holder_normalized.as_str());

        let group = groups.entry(key).or_insert_with(|| MarkerGroup {
            coordinate: record.coordinate,
            owner: record.holder_normalized.clone(),
            region: record.region.clone(),
            is_office: is_office(&record.holder_normalized),
            unique_colors: Vec::new(),
            rows: Vec::new(),
        });

        let color = record.color_display().to_string();
        if !group.unique_colors.contains(&color) {
            group.unique_colors.push(color);
        }

        group.rows.push(SummaryRow {
            model: record.model_display().to_string(),
            color: record.color_display().to_string(),
            status: record.status_display().to_string(),
            target: record.target_display().to_string(),
            qty: 1,
        });
    }

    let mut markers: Vec<MarkerGroup> = groups.into_values().collect();
    markers.sort_by(|a, b| {
        a.coordinate
            .lat
            .total_cmp(&b.coordinate.lat)
            .then(a.coordinate.lon.total_cmp(&b.coordinate.lon))
            .then(a.owner.cmp(&b.owner))
    });
    markers
}

// ============================================================================
// MAP BOUNDS
// ============================================================================

/// Bounding box over the map view, for the renderer's fit-bounds call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl MapBounds {
    /// Bounds of a record set; `None` when there is nothing to show.
    pub fn from_records(records: &[EnrichedRecord]) -> Option<Self> {
        let first = records.first()?;
        let mut bounds = MapBounds {
            min_lat: first.coordinate.lat,
            max_lat: first.coordinate.lat,
            min_lon: first.coordinate.lon,
            max_lon: first.coordinate.lon,
        };

        for record in &records[1..] {
            bounds.min_lat = bounds.min_lat.min(record.coordinate.lat);
            bounds.max_lat = bounds.max_lat.max(record.coordinate.lat);
            bounds.min_lon = bounds.min_lon.min(record.coordinate.lon);
            bounds.max_lon = bounds.max_lon.max(record.coordinate.lon);
        }

        Some(bounds)
    }

    /// Midpoint for the initial map center.
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::EnrichmentCache;
    use crate::record::{ColumnMapConfig, Dataset};

    fn enriched_fixture() -> Vec<EnrichedRecord> {
        let headers = vec![
            "모델명".to_string(),
            "색상".to_string(),
            "보유처".to_string(),
        ];
        let rows = vec![
            vec!["SM-F766N0", "블랙", "12A-강남점"],
            vec!["SM-F766N0", "블루", "34B-강남점"],
            vec!["SM-S937N0", "화이트", "동탄모바일"],
            vec!["SM-S937N0", "블랙", "반추정보통신"],
        ]
        .into_iter()
        .map(|r| r.into_iter().map(String::from).collect())
        .collect();

        let ds = Dataset::from_rows("fixture.csv", headers, rows, &ColumnMapConfig::default());
        EnrichmentCache::default().enrich(&ds).as_ref().clone()
    }

    #[test]
    fn test_grouping_by_exact_coordinate_and_owner() {
        let records = enriched_fixture();
        let markers = group_markers(&records);

        // 강남점 rows collapse into one marker; 동탄 and office stand alone
        assert_eq!(markers.len(), 3);

        let gangnam = markers.iter().find(|m| m.owner == "강남점").unwrap();
        assert_eq!(gangnam.total(), 2);
        assert_eq!(gangnam.unique_colors, vec!["블랙", "블루"]);
        assert_eq!(gangnam.region, "동남");
    }

    #[test]
    fn test_popup_rows_and_title() {
        let records = enriched_fixture();
        let markers = group_markers(&records);

        let dongtan = markers.iter().find(|m| m.owner == "동탄모바일").unwrap();
        assert_eq!(dongtan.popup_title(), "남부 - 동탄모바일");
        assert_eq!(dongtan.rows.len(), 1);
        assert_eq!(dongtan.rows[0].model, "SM-S937N0");
        assert_eq!(dongtan.rows[0].qty, 1);
        // No target column in the fixture; rows degrade to the dash
        assert_eq!(dongtan.rows[0].target, "-");
    }

    #[test]
    fn test_mixed_color_marker_style() {
        let records = enriched_fixture();
        let markers = group_markers(&records);

        let gangnam = markers.iter().find(|m| m.owner == "강남점").unwrap();
        let style = gangnam.style();
        assert_eq!(style.background, "rgba(128,0,128,0.8)");
        assert_eq!(style.icon, MarkerIcon::Device);
    }

    #[test]
    fn test_single_color_marker_styles() {
        let records = enriched_fixture();
        let markers = group_markers(&records);

        // White device: dark chip with white glyph
        let dongtan = markers.iter().find(|m| m.owner == "동탄모바일").unwrap();
        let style = dongtan.style();
        assert_eq!(style.background, "rgba(0,0,0,0.4)");
        assert_eq!(style.foreground, "white");
    }

    #[test]
    fn test_office_marker_style() {
        let records = enriched_fixture();
        let markers = group_markers(&records);

        let office = markers.iter().find(|m| m.is_office).unwrap();
        assert_eq!(office.owner, "반추정보통신");
        assert_eq!(office.style().icon, MarkerIcon::OfficeStar);
    }

    #[test]
    fn test_device_color_palette() {
        assert_eq!(device_color_hex("제트블랙").0, "#000000");
        assert_eq!(device_color_hex("크림 화이트").0, "#FFFFFF");
        assert_eq!(device_color_hex("티타늄 그레이").0, "#808080");
        assert_eq!(device_color_hex("아이스블루").0, "#0000FF");
        assert_eq!(device_color_hex("무광").0, "#3388ff");
    }

    #[test]
    fn test_map_bounds() {
        let records = enriched_fixture();
        let bounds = MapBounds::from_records(&records).unwrap();

        assert!(bounds.min_lat <= bounds.max_lat);
        assert!(bounds.min_lon <= bounds.max_lon);

        let center = bounds.center();
        assert!(center.lat >= bounds.min_lat && center.lat <= bounds.max_lat);
        assert!(center.lon >= bounds.min_lon && center.lon <= bounds.max_lon);

        assert_eq!(MapBounds::from_records(&[]), None);
    }
}
