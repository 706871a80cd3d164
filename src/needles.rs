//! Needle budget enforcement.
//!
//! When a design uses more thread colors than the machine has free needles,
//! the least important colors are folded into the most important one.

use crate::config::PET_MAX_NEEDLES;
use crate::manifest::Region;
use std::cmp::Reverse;
use std::collections::HashMap;

/// Region kind dominates; bounding-box area only orders regions of one kind.
const KIND_SCORE_SCALE: i64 = 100_000;

#[derive(Debug, Clone, PartialEq)]
pub struct NeedleAllocation {
    /// Regions in manifest order, recolored where needed.
    pub regions: Vec<Region>,
    /// Colors that keep a needle, highest ranked first. Empty when no
    /// reduction was necessary.
    pub kept: Vec<String>,
    /// Color that absorbs every dropped color.
    pub fallback: Option<String>,
    /// Dropped colors in first-seen order.
    pub remapped: Vec<String>,
}

impl NeedleAllocation {
    pub fn was_reduced(&self) -> bool {
        !self.remapped.is_empty()
    }
}

/// Limit `regions` to the artwork needle budget.
pub fn enforce_needle_capacity(regions: &[Region]) -> NeedleAllocation {
    enforce_capacity(regions, PET_MAX_NEEDLES)
}

/// Limit `regions` to `capacity` distinct colors (at least one).
pub fn enforce_capacity(regions: &[Region], capacity: usize) -> NeedleAllocation {
    let capacity = capacity.max(1);
    let groups = group_by_color(regions);
    if groups.len() <= capacity {
        return NeedleAllocation {
            regions: regions.to_vec(),
            kept: Vec::new(),
            fallback: None,
            remapped: Vec::new(),
        };
    }

    let mut ranked = groups;
    // Stable sort: equal scores keep first-seen order.
    ranked.sort_by_key(|group| Reverse(group.score));

    let kept: Vec<String> = ranked[..capacity]
        .iter()
        .map(|group| group.color.clone())
        .collect();
    let fallback = kept[0].clone();

    let mut remapped: Vec<(usize, String)> = ranked[capacity..]
        .iter()
        .map(|group| (group.first_seen, group.color.clone()))
        .collect();
    remapped.sort_by_key(|(first_seen, _)| *first_seen);
    let remapped: Vec<String> = remapped.into_iter().map(|(_, color)| color).collect();

    let merged = regions
        .iter()
        .map(|region| {
            if kept.contains(&region.color_hex) {
                region.clone()
            } else {
                region.recolored(&fallback)
            }
        })
        .collect();

    log::info!(
        "Needle budget exceeded: {} colors for {} needles, folding {:?} into {}",
        kept.len() + remapped.len(),
        capacity,
        remapped,
        fallback
    );

    NeedleAllocation {
        regions: merged,
        kept,
        fallback: Some(fallback),
        remapped,
    }
}

/// Importance of one region when competing for a needle.
pub fn importance(region: &Region) -> i64 {
    let weight = region.region_type.importance_weight();
    match region.bounds() {
        Some(bounds) => (weight * KIND_SCORE_SCALE).saturating_add(bounds.area() as i64),
        None => weight,
    }
}

#[derive(Debug)]
struct ColorGroup {
    color: String,
    first_seen: usize,
    score: i64,
}

fn group_by_color(regions: &[Region]) -> Vec<ColorGroup> {
    let mut index_by_color: HashMap<&str, usize> = HashMap::new();
    let mut groups = Vec::<ColorGroup>::new();
    for region in regions {
        let score = importance(region);
        if let Some(&idx) = index_by_color.get(region.color_hex.as_str()) {
            let group = &mut groups[idx];
            group.score = group.score.max(score);
            continue;
        }
        index_by_color.insert(region.color_hex.as_str(), groups.len());
        groups.push(ColorGroup {
            color: region.color_hex.clone(),
            first_seen: groups.len(),
            score,
        });
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::RegionKind;
    use serde_json::Value;
    use std::collections::HashSet;

    fn region(id: &str, color: &str, kind: RegionKind, size: f64) -> Region {
        let points = if size > 0.0 {
            vec![[0.0, 0.0], [size, 0.0], [size, size], [0.0, size]]
        } else {
            Vec::new()
        };
        Region {
            id: Value::from(id),
            color_hex: color.to_string(),
            region_type: kind,
            angle_deg: Some(0.0),
            points,
        }
    }

    fn distinct_colors(regions: &[Region]) -> usize {
        regions
            .iter()
            .map(|r| r.color_hex.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    #[test]
    fn importance_prefers_kind_over_area() {
        let small_feature = region("a", "#000000", RegionKind::Feature, 2.0);
        let huge_fill = region("b", "#111111", RegionKind::Fill, 300.0);
        assert_eq!(importance(&small_feature), 300_004);
        assert_eq!(importance(&huge_fill), 190_000);
        assert_eq!(
            importance(&region("c", "#222222", RegionKind::Outline, 0.0)),
            2
        );
    }

    #[test]
    fn importance_saturates_on_huge_bounds() {
        let giant = region("g", "#333333", RegionKind::Feature, 1e12);
        assert_eq!(importance(&giant), i64::MAX);
    }

    #[test]
    fn under_budget_is_untouched() {
        let regions: Vec<Region> = (0..8)
            .map(|i| region(&format!("r{i}"), &format!("#00000{i}"), RegionKind::Fill, 10.0))
            .collect();
        let allocation = enforce_needle_capacity(&regions);
        assert_eq!(allocation.regions, regions);
        assert!(!allocation.was_reduced());
        assert_eq!(allocation.fallback, None);
    }

    #[test]
    fn overflow_folds_low_ranked_colors_into_the_top_color() {
        let mut regions: Vec<Region> = (0..8)
            .map(|i| {
                region(
                    &format!("feature-{i}"),
                    &format!("#0000{i}0"),
                    RegionKind::Feature,
                    100.0 + i as f64,
                )
            })
            .collect();
        regions.insert(3, region("speck-a", "#ff0000", RegionKind::Fill, 1.0));
        regions.push(region("speck-b", "#00ff00", RegionKind::Fill, 1.0));

        let allocation = enforce_needle_capacity(&regions);
        assert_eq!(allocation.remapped, vec!["#ff0000", "#00ff00"]);
        // Largest feature square wins the fallback slot.
        assert_eq!(allocation.fallback.as_deref(), Some("#000070"));
        assert_eq!(allocation.kept.len(), PET_MAX_NEEDLES);
        assert_eq!(distinct_colors(&allocation.regions), PET_MAX_NEEDLES);

        let ids: Vec<&Value> = allocation.regions.iter().map(|r| &r.id).collect();
        let original_ids: Vec<&Value> = regions.iter().map(|r| &r.id).collect();
        assert_eq!(ids, original_ids);
        assert_eq!(allocation.regions[3].color_hex, "#000070");
        assert_eq!(allocation.regions[3].points, regions[3].points);
        assert_eq!(allocation.regions[9].color_hex, "#000070");
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let regions: Vec<Region> = (0..10)
            .map(|i| region(&format!("r{i}"), &format!("#c{i}"), RegionKind::Outline, 5.0))
            .collect();
        let allocation = enforce_needle_capacity(&regions);
        assert_eq!(allocation.fallback.as_deref(), Some("#c0"));
        assert_eq!(allocation.remapped, vec!["#c8", "#c9"]);
    }

    #[test]
    fn capacity_holds_for_many_colors() {
        let kinds = [RegionKind::Feature, RegionKind::Outline, RegionKind::Fill];
        let regions: Vec<Region> = (0..40)
            .map(|i| {
                region(
                    &format!("r{i}"),
                    &format!("#{:06x}", i * 997),
                    kinds[i % 3].clone(),
                    (i % 7) as f64 * 3.0,
                )
            })
            .collect();
        let allocation = enforce_needle_capacity(&regions);
        assert!(distinct_colors(&allocation.regions) <= PET_MAX_NEEDLES);
        assert_eq!(allocation.regions.len(), regions.len());
    }

    #[test]
    fn single_needle_collapses_everything() {
        let regions = vec![
            region("a", "#aaaaaa", RegionKind::Fill, 50.0),
            region("b", "#bbbbbb", RegionKind::Feature, 2.0),
            region("c", "#cccccc", RegionKind::Outline, 0.0),
        ];
        let allocation = enforce_capacity(&regions, 0);
        assert_eq!(allocation.kept, vec!["#bbbbbb"]);
        assert!(allocation
            .regions
            .iter()
            .all(|r| r.color_hex == "#bbbbbb"));
    }
}
