//! Machine-file encoding.
//!
//! Native encoders are plugged in through [`StitchEncoder`]. When none is
//! available the pattern is written as a deterministic JSON fallback that
//! keeps the head of the command log.

use crate::error::{DigitizeError, DigitizeResult};
use crate::pattern::Pattern;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Entries kept in the fallback artifact.
pub const FALLBACK_STITCH_LIMIT: usize = 5000;
pub const FALLBACK_FORMAT: &str = "DST_FALLBACK";

pub trait StitchEncoder: Send + Sync {
    /// Format tag reported in metrics.
    fn format(&self) -> &str;

    fn is_available(&self) -> bool;

    fn encode(&self, pattern: &Pattern) -> DigitizeResult<Vec<u8>>;
}

/// Placeholder for a machine encoder that is not installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct MissingEncoder;

impl StitchEncoder for MissingEncoder {
    fn format(&self) -> &str {
        "DST"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn encode(&self, _pattern: &Pattern) -> DigitizeResult<Vec<u8>> {
        Err(DigitizeError::Encode(
            "no native DST encoder is installed".to_string(),
        ))
    }
}

/// Compact JSON stand-in for a DST file, identical across runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackDstEncoder;

// Keys in sorted order so the output is byte-stable.
#[derive(Serialize)]
struct FallbackPayload<'a> {
    format: &'a str,
    stitch_count: usize,
    stitches: Vec<(f64, f64, u8)>,
    thread_count: usize,
}

impl StitchEncoder for FallbackDstEncoder {
    fn format(&self) -> &str {
        FALLBACK_FORMAT
    }

    fn is_available(&self) -> bool {
        true
    }

    fn encode(&self, pattern: &Pattern) -> DigitizeResult<Vec<u8>> {
        let payload = FallbackPayload {
            format: FALLBACK_FORMAT,
            stitch_count: pattern.stitches().len(),
            stitches: pattern
                .stitches()
                .iter()
                .take(FALLBACK_STITCH_LIMIT)
                .map(|c| (round2(c.x), round2(c.y), c.kind.code()))
                .collect(),
            thread_count: pattern.threads().len(),
        };
        serde_json::to_vec(&payload).map_err(|err| DigitizeError::Encode(err.to_string()))
    }
}

/// Which encoder produced the machine file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOutcome {
    pub format: String,
    pub native: bool,
    pub bytes_written: usize,
}

/// Encode with `native` when it is available, otherwise with the fallback,
/// and write the result to `path`.
pub fn write_dst(
    pattern: &Pattern,
    native: &dyn StitchEncoder,
    path: &Path,
) -> DigitizeResult<EncodeOutcome> {
    let (encoder, is_native): (&dyn StitchEncoder, bool) = if native.is_available() {
        (native, true)
    } else {
        log::info!(
            "Native {} encoder unavailable, writing {}",
            native.format(),
            FALLBACK_FORMAT
        );
        (&FallbackDstEncoder, false)
    };

    let bytes = encoder.encode(pattern)?;
    write_artifact(path, &bytes)?;
    Ok(EncodeOutcome {
        format: encoder.format().to_string(),
        native: is_native,
        bytes_written: bytes.len(),
    })
}

pub(crate) fn write_artifact(path: &Path, contents: &[u8]) -> DigitizeResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| DigitizeError::io(parent, err))?;
    }
    fs::write(path, contents).map_err(|err| DigitizeError::io(path, err))
}

// Ties go to even: 0.125 -> 0.12.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
