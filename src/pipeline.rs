use crate::assembler::build_pattern;
use crate::config::DigitizeConfig;
use crate::encoder::{write_artifact, write_dst, MissingEncoder, StitchEncoder};
use crate::error::DigitizeResult;
use crate::manifest::{validate_regions, Manifest, Region};
use crate::metrics::QaMetrics;
use crate::pattern::Pattern;
use crate::preview::{
    default_rasterizer, render_direction_map_json, render_stitch_preview_svg, DirectionRasterizer,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Where one digitize run reads from and writes to.
#[derive(Debug, Clone)]
pub struct DigitizeRequest {
    pub manifest: PathBuf,
    pub dst: PathBuf,
    pub preview_svg: PathBuf,
    pub direction_json: PathBuf,
    pub direction_png: Option<PathBuf>,
    pub canonical_hash: String,
    pub config: DigitizeConfig,
}

/// Optional backends the pipeline can hand work to.
pub struct Collaborators {
    pub encoder: Box<dyn StitchEncoder>,
    pub rasterizer: Box<dyn DirectionRasterizer>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            encoder: Box::new(MissingEncoder),
            rasterizer: default_rasterizer(),
        }
    }
}

/// Metrics plus the artifacts and backends a run ended up using.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitizeReport {
    #[serde(flatten)]
    pub metrics: QaMetrics,
    pub dst_format: String,
    pub native_encoder_available: bool,
    pub preview_svg: String,
    pub debug_direction_json: String,
    pub debug_direction_png: Option<String>,
    pub raster_available: bool,
}

/// Generate the stitch program for already-loaded regions.
///
/// Only structural problems fail; degenerate regions and needle overflow are
/// resolved inside the pattern.
pub fn digitize_regions(regions: &[Region], config: &DigitizeConfig) -> DigitizeResult<Pattern> {
    config.validate()?;
    validate_regions(regions)?;
    Ok(build_pattern(regions, config))
}

/// Load a manifest, generate its pattern and write every artifact.
pub fn generate_dst_from_manifest(
    request: &DigitizeRequest,
    collaborators: &Collaborators,
) -> DigitizeResult<DigitizeReport> {
    let t_total = Instant::now();
    log::info!("Digitizing manifest: {}", request.manifest.display());

    let manifest = Manifest::from_path(&request.manifest)?;
    let pattern = digitize_regions(&manifest.regions, &request.config)?;

    log::info!(
        "Pattern generated: {} regions, {} commands, {} threads",
        manifest.regions.len(),
        pattern.stitches().len(),
        pattern.threads().len()
    );

    let encoded = write_dst(&pattern, collaborators.encoder.as_ref(), &request.dst)?;

    let svg = render_stitch_preview_svg(&pattern, manifest.width, manifest.height);
    write_artifact(&request.preview_svg, svg.as_bytes())?;

    let direction_json = render_direction_map_json(&manifest.regions)?;
    write_artifact(&request.direction_json, direction_json.as_bytes())?;

    let raster_available = collaborators.rasterizer.is_available();
    let mut direction_png = None;
    if let Some(png_path) = &request.direction_png {
        if raster_available {
            match collaborators.rasterizer.render(
                &manifest.regions,
                manifest.width,
                manifest.height,
                png_path,
            ) {
                Ok(true) => direction_png = Some(display_path(png_path)),
                Ok(false) => log::info!("Direction map PNG skipped: rasterizer wrote nothing"),
                Err(err) => log::warn!("Direction map PNG skipped: {err}"),
            }
        } else {
            log::info!("Direction map PNG skipped: no raster backend");
        }
    }

    let metrics = QaMetrics::from_pattern(&pattern, &request.config, &request.canonical_hash);
    if !metrics.valid {
        log::warn!(
            "Pattern uses {} colors, above the {} needle budget",
            metrics.color_changes,
            metrics.pet_max_needles
        );
    }

    log::info!(
        "Digitize finished: {} stitches, {} colors, {} via {}, {}ms",
        metrics.stitch_count,
        metrics.color_changes,
        display_path(&request.dst),
        encoded.format,
        t_total.elapsed().as_millis()
    );

    Ok(DigitizeReport {
        metrics,
        dst_format: encoded.format,
        native_encoder_available: encoded.native,
        preview_svg: display_path(&request.preview_svg),
        debug_direction_json: display_path(&request.direction_json),
        debug_direction_png: direction_png,
        raster_available,
    })
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
