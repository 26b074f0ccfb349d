// Inventory Atlas - Core Library
// Ingests device-inventory records, geocodes free-text holder names and
// answers filter queries for the list/map renderers.

pub mod record;
pub mod normalize;
pub mod gazetteer;
pub mod jitter;
pub mod resolver;
pub mod enrich;
pub mod query;
pub mod cluster;
pub mod dashboard;

// Re-export commonly used types
pub use record::{
    load_csv, load_csv_with,
    ColumnMap, ColumnMapConfig, Dataset, InventoryRecord,
};
pub use normalize::{
    is_office, normalize_holder,
    OFFICE_CANONICAL, OFFICE_MARKER,
};
pub use gazetteer::{
    Coordinate, Gazetteer, PlaceEntry, RegionRule,
    CITY_UNCLASSIFIED, DEFAULT_CENTER, REGION_OTHER,
};
pub use jitter::{holder_seed, jitter, JitterConfig};
pub use resolver::{LocationResolver, Resolved};
pub use enrich::{EnrichedRecord, EnrichmentCache};
pub use query::{
    query, FilterSpec, ModelGroups, QueryError, QueryResult, Selection,
    OFFICE_REGION, WHOLESALE_PREFIX,
};
pub use cluster::{
    device_color_hex, group_markers, MapBounds, MarkerGroup, MarkerIcon,
    MarkerStyle, SummaryRow,
};
pub use dashboard::Dashboard;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
