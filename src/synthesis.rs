//! Per-region stitch synthesizers.
//!
//! Each function appends to the `StitchRun` it is given and touches nothing
//! else. Fill and satin scan the polygon's bounding box only.

use crate::config::mm_to_dst;
use crate::geometry::{segmented_stitch, BoundingBox, Point};
use crate::manifest::RegionKind;
use crate::pattern::{CommandKind, StitchRun};

/// Polygons with fewer vertices are too small to scan.
pub const MIN_SCAN_VERTICES: usize = 4;

/// Length of the per-row drift stitch along the fill angle, in device units.
pub const FILL_DRIFT: f64 = 1.2;

/// Satin rows per region height.
pub const SATIN_ROW_TARGET: f64 = 20.0;

/// Lock stitch at the start of a region: stitch, nudge right, come back.
pub fn tie_in(run: &mut StitchRun, at: Point) {
    run.stitch_to(at);
    run.stitch_by(1.0, 0.0);
    run.stitch_by(-1.0, 0.0);
}

pub fn tie_off(run: &mut StitchRun) {
    run.command(CommandKind::Trim);
}

/// Light stabilizing pass along the outline; fine features get every
/// second vertex only.
pub fn underlay(
    run: &mut StitchRun,
    polygon: &[Point],
    kind: &RegionKind,
    max_stitch_mm: f64,
) {
    let Some(&first) = polygon.first() else {
        return;
    };
    let max_stitch = mm_to_dst(max_stitch_mm) as f64;
    run.stitch_to(first);

    let step = if *kind == RegionKind::Feature { 2 } else { 1 };
    let mut prev = first;
    for &p in polygon.iter().step_by(step) {
        segmented_stitch(run, prev, p, max_stitch);
        prev = p;
    }
}

/// Boustrophedon rows across the bounding box.
///
/// The rows stay horizontal. The angle only adds a small drift stitch after
/// each row.
pub fn fill(
    run: &mut StitchRun,
    polygon: &[Point],
    angle_deg: f64,
    density_mm: f64,
    max_stitch_mm: f64,
) {
    if polygon.len() < MIN_SCAN_VERTICES {
        return;
    }
    let Some(bounds) = BoundingBox::of(polygon) else {
        return;
    };

    let spacing = mm_to_dst(density_mm);
    let max_stitch = mm_to_dst(max_stitch_mm) as f64;
    let theta = angle_deg.to_radians();
    let (drift_x, drift_y) = (theta.cos() * FILL_DRIFT, theta.sin() * FILL_DRIFT);

    let rows = ((bounds.height() / spacing.max(1) as f64) as i64).max(1);
    for i in 0..=rows {
        let y = bounds.min_y + (i * spacing) as f64;
        let left = Point::new(bounds.min_x, y);
        let right = Point::new(bounds.max_x, y);
        if i % 2 == 0 {
            segmented_stitch(run, left, right, max_stitch);
        } else {
            segmented_stitch(run, right, left, max_stitch);
        }
        run.stitch_by(drift_x, drift_y);
    }
}

/// Left-to-right rows at a fixed resolution, widened by pull compensation
/// on both sides.
pub fn satin(run: &mut StitchRun, polygon: &[Point], pull_comp_mm: f64, max_stitch_mm: f64) {
    if polygon.len() < MIN_SCAN_VERTICES {
        return;
    }
    let Some(bounds) = BoundingBox::of(polygon) else {
        return;
    };

    let pull = mm_to_dst(pull_comp_mm) as f64;
    let max_stitch = mm_to_dst(max_stitch_mm) as f64;
    let step = ((bounds.height() / SATIN_ROW_TARGET) as i64).max(2);

    let mut y = bounds.min_y as i64;
    let last = bounds.max_y as i64;
    while y <= last {
        segmented_stitch(
            run,
            Point::new(bounds.min_x - pull, y as f64),
            Point::new(bounds.max_x + pull, y as f64),
            max_stitch,
        );
        y += step;
    }
}
