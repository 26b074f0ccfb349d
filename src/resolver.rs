// Location resolver
// Chains the normalizer, gazetteer and jitter engine into one pass over a
// raw holder string.

use serde::{Deserialize, Serialize};

use crate::gazetteer::{Coordinate, Gazetteer, CITY_UNCLASSIFIED, DEFAULT_CENTER, REGION_OTHER};
use crate::jitter::{jitter, JitterConfig};
use crate::normalize::normalize_holder;

/// Everything derived from one holder string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolved {
    pub coordinate: Coordinate,
    pub region: String,
    pub city: String,
    pub holder_normalized: String,
}

/// Resolves raw holder text to a jittered coordinate, region bucket and
/// city label. Total: missing or unmatched input degrades to defaults,
/// never fails.
#[derive(Debug, Clone)]
pub struct LocationResolver {
    gazetteer: Gazetteer,
    jitter: JitterConfig,
}

impl LocationResolver {
    pub fn new(gazetteer: Gazetteer, jitter: JitterConfig) -> Self {
        LocationResolver { gazetteer, jitter }
    }

    pub fn gazetteer(&self) -> &Gazetteer {
        &self.gazetteer
    }

    /// Resolve one raw holder string.
    pub fn resolve(&self, raw_holder: &str) -> Resolved {
        let holder_normalized = normalize_holder(raw_holder);

        // Empty holders anchor at the city center without dispersion
        if holder_normalized.is_empty() {
            return Resolved {
                coordinate: DEFAULT_CENTER,
                region: REGION_OTHER.to_string(),
                city: CITY_UNCLASSIFIED.to_string(),
                holder_normalized,
            };
        }

        let base = self.gazetteer.lookup_base_coordinate(&holder_normalized);
        let coordinate = jitter(self.jitter, &holder_normalized, base);
        let region = self.gazetteer.lookup_region(&holder_normalized);
        let city = self.gazetteer.lookup_city(&holder_normalized);

        Resolved {
            coordinate,
            region,
            city,
            holder_normalized,
        }
    }
}

impl Default for LocationResolver {
    fn default() -> Self {
        LocationResolver::new(Gazetteer::builtin(), JitterConfig::default())
    }
}

// ============================================================================
// TESTS
// ============================================================================
