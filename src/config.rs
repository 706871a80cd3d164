use crate::error::{DigitizeError, DigitizeResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Device units per millimetre (1 unit = 0.1 mm).
pub const MM_TO_DST: f64 = 10.0;

/// Needles on the target machine.
pub const TOTAL_NEEDLES: usize = 10;
/// Needles kept loaded for the frame/border run.
pub const FRAME_RESERVED_NEEDLES: usize = 2;
/// Needles left for artwork colors.
pub const PET_MAX_NEEDLES: usize = TOTAL_NEEDLES - FRAME_RESERVED_NEEDLES;

const CONFIG_HASH_VERSION: u8 = 1;

/// Generation parameters, all in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigitizeConfig {
    pub fill_density_mm: f64,
    pub satin_density_mm: f64,
    pub pull_comp_mm: f64,
    pub max_stitch_mm: f64,
    pub max_jump_mm: f64,
}

impl Default for DigitizeConfig {
    fn default() -> Self {
        Self {
            fill_density_mm: 0.42,
            satin_density_mm: 0.38,
            pull_comp_mm: 0.25,
            max_stitch_mm: 4.0,
            max_jump_mm: 6.0,
        }
    }
}

impl DigitizeConfig {
    pub fn validate(&self) -> DigitizeResult<()> {
        for (name, value) in self.fields() {
            if !value.is_finite() || value <= 0.0 {
                return Err(DigitizeError::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Maximum single stitch length in device units.
    pub fn max_stitch_dst(&self) -> f64 {
        mm_to_dst(self.max_stitch_mm) as f64
    }

    /// SHA-256 over every field in name order, hex encoded.
    pub fn config_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update([CONFIG_HASH_VERSION]);
        for (name, value) in self.fields() {
            hasher.update(name.as_bytes());
            hasher.update(value.to_le_bytes());
        }
        format!("{:x}", hasher.finalize())
    }

    // Sorted by name; the hash depends on this order.
    fn fields(&self) -> [(&'static str, f64); 5] {
        [
            ("fill_density_mm", self.fill_density_mm),
            ("max_jump_mm", self.max_jump_mm),
            ("max_stitch_mm", self.max_stitch_mm),
            ("pull_comp_mm", self.pull_comp_mm),
            ("satin_density_mm", self.satin_density_mm),
        ]
    }
}

/// Millimetres to whole device units, never below one unit.
///
/// Halves round to even so 0.25 mm becomes 2 units, not 3.
pub fn mm_to_dst(mm: f64) -> i64 {
    ((mm * MM_TO_DST).round_ties_even() as i64).max(1)
}
