use crate::config::{DigitizeConfig, FRAME_RESERVED_NEEDLES, PET_MAX_NEEDLES, TOTAL_NEEDLES};
use crate::pattern::{CommandKind, Pattern};
use serde::{Deserialize, Serialize};

/// Quality summary of a generated pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaMetrics {
    /// Every command-log entry, of any kind.
    pub stitch_count: usize,
    pub jump_count: usize,
    pub trim_count: usize,
    /// Thread-list length.
    pub color_changes: usize,
    pub valid: bool,
    pub pet_max_needles: usize,
    pub frame_reserved_needles: usize,
    pub total_needles: usize,
    pub config_hash: String,
    /// Caller-supplied provenance hash, echoed back untouched.
    pub canonical_hash: String,
}

impl QaMetrics {
    pub fn from_pattern(pattern: &Pattern, config: &DigitizeConfig, canonical_hash: &str) -> Self {
        let color_changes = pattern.threads().len();
        Self {
            stitch_count: pattern.stitches().len(),
            jump_count: pattern.count(CommandKind::Jump),
            trim_count: pattern.count(CommandKind::Trim),
            color_changes,
            valid: color_changes <= PET_MAX_NEEDLES,
            pet_max_needles: PET_MAX_NEEDLES,
            frame_reserved_needles: FRAME_RESERVED_NEEDLES,
            total_needles: TOTAL_NEEDLES,
            config_hash: config.config_hash(),
            canonical_hash: canonical_hash.to_string(),
        }
    }
}
