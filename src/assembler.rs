use crate::config::DigitizeConfig;
use crate::manifest::{Region, StitchStyle};
use crate::needles::enforce_needle_capacity;
use crate::pattern::{CommandKind, Pattern, StitchRun, Thread};
use crate::synthesis::{fill, satin, tie_in, tie_off, underlay};
use rayon::prelude::*;
use std::time::Instant;

/// Relative hop after each region, separating it from the next.
pub const REGION_SEPARATION_JUMP: (f64, f64) = (2.0, 2.0);

/// Build the full stitch program for `regions` in manifest order.
///
/// Colors are first fitted to the needle budget. Region geometry is
/// synthesized in parallel (every region run opens with an absolute stitch,
/// so runs do not depend on each other) and then stitched together in order
/// with the color bookkeeping.
pub fn build_pattern(regions: &[Region], config: &DigitizeConfig) -> Pattern {
    let timing_enabled = digitize_timing_enabled();
    let t_total = Instant::now();

    let allocation = enforce_needle_capacity(regions);

    let t_synth = Instant::now();
    let region_runs: Vec<StitchRun> = allocation
        .regions
        .par_iter()
        .map(|region| synthesize_region(region, config))
        .collect();
    let synth_ms = t_synth.elapsed().as_millis();

    let mut program = StitchRun::new();
    let mut threads = Vec::<Thread>::new();
    let mut current_color: Option<&str> = None;

    for (region, run) in allocation.regions.iter().zip(region_runs) {
        let color = region.color_hex.as_str();
        if current_color != Some(color) {
            if current_color.is_some() {
                program.command(CommandKind::ColorChange);
            }
            current_color = Some(color);
            if !threads.iter().any(|t| t.hex == color) {
                threads.push(Thread::from_hex(color));
            }
        }
        program.append(run);
    }
    program.command(CommandKind::End);

    let pattern = Pattern::new(program.into_commands(), threads);
    if timing_enabled {
        log::debug!(
            "Digitize timing regions={} commands={} synth={}ms total={}ms",
            regions.len(),
            pattern.stitches().len(),
            synth_ms,
            t_total.elapsed().as_millis()
        );
    }
    pattern
}

/// All commands one region contributes; empty for a region without points.
pub fn synthesize_region(region: &Region, config: &DigitizeConfig) -> StitchRun {
    let mut run = StitchRun::new();
    let polygon = region.polygon();
    let Some(&start) = polygon.first() else {
        return run;
    };

    tie_in(&mut run, start);
    underlay(
        &mut run,
        &polygon,
        &region.region_type,
        config.max_stitch_mm,
    );
    match region.stitch_style() {
        StitchStyle::Fill => fill(
            &mut run,
            &polygon,
            region.angle_deg.unwrap_or_default(),
            config.fill_density_mm,
            config.max_stitch_mm,
        ),
        StitchStyle::Satin => satin(
            &mut run,
            &polygon,
            config.pull_comp_mm,
            config.max_stitch_mm,
        ),
    }
    tie_off(&mut run);
    let (dx, dy) = REGION_SEPARATION_JUMP;
    run.jump_by(dx, dy);
    run
}

fn digitize_timing_enabled() -> bool {
    matches!(
        std::env::var("MAGPIE_DIGITIZE_DEBUG_TIMING").as_deref(),
        Ok("1") | Ok("true") | Ok("TRUE") | Ok("yes") | Ok("YES")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PET_MAX_NEEDLES;
    use crate::geometry::Point;
    use crate::manifest::RegionKind;
    use serde_json::Value;

    fn region(id: &str, color: &str, kind: RegionKind, rect: [f64; 4]) -> Region {
        let [x0, y0, x1, y1] = rect;
        Region {
            id: Value::from(id),
            color_hex: color.to_string(),
            region_type: kind,
            angle_deg: Some(25.0),
            points: vec![[x0, y0], [x1, y0], [x1, y1], [x0, y1]],
        }
    }

    fn empty_region(id: &str, color: &str) -> Region {
        Region {
            id: Value::from(id),
            color_hex: color.to_string(),
            region_type: RegionKind::Fill,
            angle_deg: Some(0.0),
            points: Vec::new(),
        }
    }

    fn kinds(pattern: &Pattern) -> Vec<CommandKind> {
        pattern.stitches().iter().map(|c| c.kind).collect()
    }

    #[test]
    fn pattern_ends_with_a_single_end_command() {
        let regions = vec![
            region("a", "#111111", RegionKind::Feature, [50.0, 50.0, 70.0, 70.0]),
            region("b", "#8a6a53", RegionKind::Fill, [20.0, 20.0, 220.0, 220.0]),
        ];
        let pattern = build_pattern(&regions, &DigitizeConfig::default());
        let kinds = kinds(&pattern);
        assert_eq!(kinds.last(), Some(&CommandKind::End));
        assert_eq!(kinds.iter().filter(|k| **k == CommandKind::End).count(), 1);
    }

    #[test]
    fn empty_manifest_is_just_end() {
        let pattern = build_pattern(&[], &DigitizeConfig::default());
        assert_eq!(kinds(&pattern), vec![CommandKind::End]);
        assert!(pattern.threads().is_empty());
        assert_eq!(pattern.stitches()[0].point(), Point::new(0.0, 0.0));
    }

    #[test]
    fn region_run_shape() {
        let config = DigitizeConfig::default();
        let run = synthesize_region(
            &region("eye", "#111111", RegionKind::Feature, [50.0, 50.0, 70.0, 70.0]),
            &config,
        );
        let kinds: Vec<CommandKind> = run.commands().iter().map(|c| c.kind).collect();
        // tie-in 3 + underlay 3 + satin 11 rows + trim + jump.
        assert_eq!(kinds.len(), 3 + 3 + 11 + 2);
        assert_eq!(kinds[kinds.len() - 2], CommandKind::Trim);
        assert_eq!(kinds[kinds.len() - 1], CommandKind::Jump);
        let jump = run.commands()[kinds.len() - 1];
        let trim = run.commands()[kinds.len() - 2];
        assert_eq!(jump.x - trim.x, 2.0);
        assert_eq!(jump.y - trim.y, 2.0);
    }

    #[test]
    fn color_changes_precede_new_colors_only() {
        let regions = vec![
            region("a", "#111111", RegionKind::Feature, [0.0, 0.0, 10.0, 10.0]),
            region("b", "#111111", RegionKind::Outline, [0.0, 0.0, 10.0, 10.0]),
            region("c", "#222222", RegionKind::Feature, [0.0, 0.0, 10.0, 10.0]),
        ];
        let pattern = build_pattern(&regions, &DigitizeConfig::default());
        assert_eq!(pattern.count(CommandKind::ColorChange), 1);
        assert_eq!(pattern.count(CommandKind::Trim), 3);
        assert_eq!(pattern.count(CommandKind::Jump), 3);
        let hexes: Vec<&str> = pattern.threads().iter().map(|t| t.hex.as_str()).collect();
        assert_eq!(hexes, vec!["#111111", "#222222"]);

        // The color change sits right after region b's separation jump.
        let stitches = pattern.stitches();
        let change = stitches
            .iter()
            .position(|c| c.kind == CommandKind::ColorChange)
            .expect("color change");
        assert_eq!(stitches[change - 1].kind, CommandKind::Jump);
        assert_eq!(stitches[change].point(), stitches[change - 1].point());
    }

    #[test]
    fn interleaved_colors_list_each_thread_once() {
        let regions = vec![
            region("a", "#111111", RegionKind::Feature, [0.0, 0.0, 10.0, 10.0]),
            region("b", "#222222", RegionKind::Feature, [0.0, 0.0, 10.0, 10.0]),
            region("c", "#111111", RegionKind::Feature, [0.0, 0.0, 10.0, 10.0]),
        ];
        let pattern = build_pattern(&regions, &DigitizeConfig::default());
        assert_eq!(pattern.count(CommandKind::ColorChange), 2);
        let hexes: Vec<&str> = pattern.threads().iter().map(|t| t.hex.as_str()).collect();
        assert_eq!(hexes, vec!["#111111", "#222222"]);
    }

    #[test]
    fn empty_region_still_drives_color_bookkeeping() {
        let regions = vec![
            region("a", "#111111", RegionKind::Feature, [0.0, 0.0, 10.0, 10.0]),
            empty_region("ghost", "#999999"),
            region("c", "#111111", RegionKind::Feature, [0.0, 0.0, 10.0, 10.0]),
        ];
        let pattern = build_pattern(&regions, &DigitizeConfig::default());
        assert_eq!(pattern.count(CommandKind::ColorChange), 2);
        assert_eq!(pattern.count(CommandKind::Trim), 2);
        assert_eq!(pattern.count(CommandKind::Jump), 2);
        let hexes: Vec<&str> = pattern.threads().iter().map(|t| t.hex.as_str()).collect();
        assert_eq!(hexes, vec!["#111111", "#999999"]);

        let stitches = pattern.stitches();
        let changes: Vec<usize> = stitches
            .iter()
            .enumerate()
            .filter(|(_, c)| c.kind == CommandKind::ColorChange)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(changes[1], changes[0] + 1);
    }

    #[test]
    fn regions_appear_in_manifest_order() {
        let regions = vec![
            region("a", "#000001", RegionKind::Fill, [100.0, 100.0, 110.0, 110.0]),
            region("b", "#000002", RegionKind::Feature, [300.0, 300.0, 310.0, 310.0]),
            region("c", "#000001", RegionKind::Outline, [500.0, 500.0, 510.0, 510.0]),
        ];
        let pattern = build_pattern(&regions, &DigitizeConfig::default());
        let starts: Vec<Point> = pattern
            .stitches()
            .windows(4)
            .filter(|w| {
                w.iter().all(|c| c.kind == CommandKind::Stitch)
                    && w[1].x - w[0].x == 1.0
                    && w[2].point() == w[0].point()
            })
            .map(|w| w[0].point())
            .collect();
        assert_eq!(
            starts,
            vec![
                Point::new(100.0, 100.0),
                Point::new(300.0, 300.0),
                Point::new(500.0, 500.0)
            ]
        );
    }

    #[test]
    fn overflow_never_exceeds_needle_budget() {
        let regions: Vec<Region> = (0..20)
            .map(|i| {
                let offset = i as f64 * 15.0;
                region(
                    &format!("r{i}"),
                    &format!("#{:06x}", 0x100000 + i * 4099),
                    if i % 2 == 0 {
                        RegionKind::Feature
                    } else {
                        RegionKind::Fill
                    },
                    [offset, offset, offset + 12.0, offset + 12.0],
                )
            })
            .collect();
        let pattern = build_pattern(&regions, &DigitizeConfig::default());
        assert!(pattern.threads().len() <= PET_MAX_NEEDLES);
        assert_eq!(pattern.count(CommandKind::Trim), 20);
    }

    #[test]
    fn output_is_deterministic() {
        let regions: Vec<Region> = (0..12)
            .map(|i| {
                let offset = i as f64 * 7.5;
                region(
                    &format!("r{i}"),
                    &format!("#{:02x}{:02x}00", i * 20, 255 - i * 20),
                    RegionKind::Fill,
                    [offset, 0.0, offset + 90.0, 60.0 + offset],
                )
            })
            .collect();
        let config = DigitizeConfig::default();
        let first = build_pattern(&regions, &config);
        let second = build_pattern(&regions, &config);
        assert_eq!(first, second);
    }
}
