// Deterministic jitter engine
// Disperses markers that share one gazetteer base coordinate. The offset is
// a pure function of the normalized holder name, so repeated runs put every
// marker back on the same pixel and grouping by exact coordinate stays
// meaningful across reloads.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::gazetteer::Coordinate;
use crate::normalize::is_office;

// ============================================================================
// CONFIG
// ============================================================================

/// Jitter magnitude, fixed per deployment.
///
/// The source revisions varied between ±0.003° and ±0.015°; the radius is
/// configuration, not a code path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct JitterConfig {
    /// Symmetric offset range in degrees, applied independently to latitude
    /// and longitude.
    pub radius_deg: f64,
}

impl JitterConfig {
    pub fn new(radius_deg: f64) -> Self {
        JitterConfig { radius_deg }
    }
}

impl Default for JitterConfig {
    fn default() -> Self {
        JitterConfig { radius_deg: 0.003 }
    }
}

// ============================================================================
// JITTER
// ============================================================================

/// Derive the RNG seed for a holder name.
///
/// SHA-256 keeps distinct holder names from colliding at inventory
/// cardinality; the first 8 digest bytes become the seed.
pub fn holder_seed(holder_normalized: &str) -> u64 {
    let digest = Sha256::digest(holder_normalized.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

/// Offset a base coordinate deterministically for one holder.
///
/// Office holders are returned unchanged: the office is a single physical
/// point and its marker must sit exactly on it. Everyone else gets two
/// uniform draws in `±radius_deg`, latitude first.
pub fn jitter(config: JitterConfig, holder_normalized: &str, base: Coordinate) -> Coordinate {
    if is_office(holder_normalized) {
        return base;
    }

    let r = config.radius_deg;
    let mut rng = StdRng::seed_from_u64(holder_seed(holder_normalized));
    let lat_offset: f64 = rng.random_range(-r..=r);
    let lon_offset: f64 = rng.random_range(-r..=r);

    Coordinate::new(base.lat + lat_offset, base.lon + lon_offset)
}

// ============================================================================
// TESTS
// ============================================================================
