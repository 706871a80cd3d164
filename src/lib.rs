//! Magpie digitizer.
//!
//! Turns a vector region manifest into an embroidery stitch program for a
//! 10-needle machine with 2 needles held back for the frame, then writes the
//! machine file, an SVG stitch preview and direction-map debug artifacts.

pub mod assembler;
pub mod config;
pub mod encoder;
pub mod error;
pub mod geometry;
pub mod manifest;
pub mod metrics;
pub mod needles;
pub mod pattern;
pub mod pipeline;
pub mod preview;
pub mod synthesis;

pub use assembler::{build_pattern, synthesize_region};
pub use config::{
    mm_to_dst, DigitizeConfig, FRAME_RESERVED_NEEDLES, PET_MAX_NEEDLES, TOTAL_NEEDLES,
};
pub use encoder::{write_dst, FallbackDstEncoder, MissingEncoder, StitchEncoder};
pub use error::{DigitizeError, DigitizeResult};
pub use manifest::{Manifest, Region, RegionKind, StitchStyle};
pub use metrics::QaMetrics;
pub use needles::{enforce_needle_capacity, NeedleAllocation};
pub use pattern::{CommandKind, Pattern, StitchCommand, StitchRun, Thread};
pub use pipeline::{
    digitize_regions, generate_dst_from_manifest, Collaborators, DigitizeReport, DigitizeRequest,
};
pub use preview::{
    default_rasterizer, render_direction_map_json, render_stitch_preview_svg, DirectionRasterizer,
    NoRasterizer,
};
