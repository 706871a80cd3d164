//! Debug artifacts: stitch-path SVG, direction summary JSON and an optional
//! raster direction map. None of these feed back into generation.

use crate::error::{DigitizeError, DigitizeResult};
use crate::manifest::Region;
use crate::pattern::{CommandKind, Pattern};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

/// Longest polyline written to the SVG preview.
pub const PREVIEW_POINT_LIMIT: usize = 12_000;

/// Stitch path as a single polyline over a warm fabric background.
pub fn render_stitch_preview_svg(pattern: &Pattern, width: u32, height: u32) -> String {
    let points = pattern
        .stitches()
        .iter()
        .filter(|c| c.kind == CommandKind::Stitch)
        .take(PREVIEW_POINT_LIMIT)
        .map(|c| format!("{},{}", c.x as i64, c.y as i64))
        .collect::<Vec<_>>()
        .join(" ");

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns='http://www.w3.org/2000/svg' width='{}' height='{}' viewBox='0 0 {} {}'>",
        width, height, width, height
    ));
    svg.push_str("<rect width='100%' height='100%' fill='#fef7ed'/>");
    svg.push_str(&format!(
        "<polyline fill='none' stroke='#2f2f2f' stroke-width='1' points='{}'/>",
        points
    ));
    svg.push_str("</svg>");
    svg
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DirectionVector<'a> {
    id: &'a Value,
    region_type: &'a str,
    angle_deg: Option<f64>,
    color_hex: &'a str,
}

#[derive(Serialize)]
struct DirectionMap<'a> {
    direction_vectors: Vec<DirectionVector<'a>>,
}

/// Per-region fill direction summary, pretty printed.
pub fn render_direction_map_json(regions: &[Region]) -> DigitizeResult<String> {
    let map = DirectionMap {
        direction_vectors: regions
            .iter()
            .map(|r| DirectionVector {
                id: &r.id,
                region_type: r.region_type.as_str(),
                angle_deg: r.angle_deg,
                color_hex: &r.color_hex,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&map).map_err(|err| DigitizeError::Render(err.to_string()))
}

/// Raster direction-map backend.
pub trait DirectionRasterizer: Send + Sync {
    fn is_available(&self) -> bool;

    /// Draw the map to `path`. `Ok(false)` means nothing was written.
    fn render(
        &self,
        regions: &[Region],
        width: u32,
        height: u32,
        path: &Path,
    ) -> DigitizeResult<bool>;
}

/// Stand-in used when no raster backend is compiled in.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRasterizer;

impl DirectionRasterizer for NoRasterizer {
    fn is_available(&self) -> bool {
        false
    }

    fn render(
        &self,
        _regions: &[Region],
        _width: u32,
        _height: u32,
        _path: &Path,
    ) -> DigitizeResult<bool> {
        Ok(false)
    }
}

/// The best rasterizer this build offers.
pub fn default_rasterizer() -> Box<dyn DirectionRasterizer> {
    #[cfg(feature = "raster")]
    {
        Box::new(PngDirectionRasterizer::default())
    }
    #[cfg(not(feature = "raster"))]
    {
        Box::new(NoRasterizer)
    }
}

#[cfg(feature = "raster")]
pub use raster::PngDirectionRasterizer;

#[cfg(feature = "raster")]
mod raster {
    use super::DirectionRasterizer;
    use crate::encoder::write_artifact;
    use crate::error::{DigitizeError, DigitizeResult};
    use crate::manifest::Region;
    use crate::synthesis::MIN_SCAN_VERTICES;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use imageproc::drawing::draw_line_segment_mut;
    use std::io::Cursor;
    use std::path::Path;

    /// Short strokes on a grid over each region's bounds, pointing along
    /// its fill angle.
    #[derive(Debug, Clone)]
    pub struct PngDirectionRasterizer {
        pub grid: usize,
        pub stroke_len: f64,
        pub background: [u8; 3],
        pub ink: [u8; 3],
    }

    impl Default for PngDirectionRasterizer {
        fn default() -> Self {
            Self {
                grid: 16,
                stroke_len: 8.0,
                background: [0xf3, 0xf4, 0xf6],
                ink: [0x11, 0x18, 0x27],
            }
        }
    }

    impl PngDirectionRasterizer {
        pub fn draw(&self, regions: &[Region], width: u32, height: u32) -> RgbImage {
            let mut canvas = RgbImage::from_pixel(width, height, Rgb(self.background));
            let grid = self.grid.max(1);
            for region in regions {
                if region.points.len() < MIN_SCAN_VERTICES {
                    continue;
                }
                let Some(bounds) = region.bounds() else {
                    continue;
                };
                let theta = region.angle_deg.unwrap_or_default().to_radians();
                let (vx, vy) = (theta.cos() * self.stroke_len, theta.sin() * self.stroke_len);

                for y in (bounds.min_y as i64..bounds.max_y as i64).step_by(grid) {
                    for x in (bounds.min_x as i64..bounds.max_x as i64).step_by(grid) {
                        let (x, y) = (x as f64, y as f64);
                        draw_line_segment_mut(
                            &mut canvas,
                            (x as f32, y as f32),
                            ((x + vx) as f32, (y + vy) as f32),
                            Rgb(self.ink),
                        );
                    }
                }
            }
            canvas
        }
    }

    impl DirectionRasterizer for PngDirectionRasterizer {
        fn is_available(&self) -> bool {
            true
        }

        fn render(
            &self,
            regions: &[Region],
            width: u32,
            height: u32,
            path: &Path,
        ) -> DigitizeResult<bool> {
            if width == 0 || height == 0 {
                return Err(DigitizeError::Render(format!(
                    "direction map needs a non-empty canvas, got {width}x{height}"
                )));
            }
            let canvas = self.draw(regions, width, height);
            let mut bytes = Cursor::new(Vec::new());
            DynamicImage::ImageRgb8(canvas)
                .write_to(&mut bytes, ImageFormat::Png)
                .map_err(|err| DigitizeError::Render(err.to_string()))?;
            write_artifact(path, bytes.get_ref())?;
            Ok(true)
        }
    }
}
