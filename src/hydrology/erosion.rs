//! Flow-direction erosion with sediment transport and mudslide smoothing.
//!
//! The model is approximate and not mass-conserving: eroded material that
//! reaches deep water is dropped, and mudslides only ever lower cells.

use std::f32::consts::FRAC_1_SQRT_2;

use crate::config::ErosionParams;
use crate::heightmap::is_land;
use crate::hydrology::CellFlow;
use crate::tilemap::{is_diagonal, reverse_dir, Tilemap, DIR_NONE};

/// Chains stop once they drop this far below the sea threshold
pub const DEEP_WATER_MARGIN: f32 = 0.01;

/// Statistics from erosion simulation
#[derive(Debug, Default, Clone)]
pub struct ErosionStats {
    /// Total material eroded (in height units)
    pub total_eroded: f64,
    /// Total material deposited in pits
    pub total_deposited: f64,
    /// Total material removed by mudslides
    pub total_slumped: f64,
    /// Total downhill steps walked by sediment chains
    pub steps_taken: u64,
    /// Number of outer passes run
    pub iterations: usize,
    /// Maximum erosion at any single step
    pub max_erosion: f32,
    /// Maximum deposition at any single pit
    pub max_deposition: f32,
}

fn direction_weight(dir: usize) -> f32 {
    if is_diagonal(dir) { FRAC_1_SQRT_2 } else { 1.0 }
}

/// Compute `flow_dir`, `rising_dir` and `slope` for every cell.
/// Border cells get no flow. `river_id` is left untouched.
pub fn compute_flow_field(elevation: &Tilemap<f32>, flow: &mut Tilemap<CellFlow>) {
    let width = elevation.width;
    let height = elevation.height;

    for y in 0..height {
        for x in 0..width {
            let cell = flow.get_mut(x, y);
            cell.flow_dir = DIR_NONE as u8;
            cell.rising_dir = DIR_NONE as u8;
            cell.slope = 0.0;
        }
    }
    if width < 3 || height < 3 {
        return;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let h = *elevation.get(x, y);
            let mut min_dir = DIR_NONE;
            let mut min_h = h;
            let mut max_dir = DIR_NONE;
            let mut max_h = h;

            for (dir, nx, ny) in elevation.neighbors_8(x, y) {
                let nh = *elevation.get(nx, ny);
                if nh < min_h {
                    min_h = nh;
                    min_dir = dir;
                }
                if nh > max_h {
                    max_h = nh;
                    max_dir = dir;
                }
            }

            let cell = flow.get_mut(x, y);
            cell.flow_dir = min_dir as u8;
            cell.rising_dir = max_dir as u8;
            cell.slope = (h - min_h) * direction_weight(min_dir);
        }
    }
}

/// Index of the cell one step from `idx` in direction `dir`.
fn step_index(map: &Tilemap<f32>, idx: usize, dir: usize) -> Option<usize> {
    let (x, y) = map.coords(idx);
    map.neighbor(x, y, dir).map(|(nx, ny)| map.index(nx, ny))
}

/// Walk downhill from every cell, eroding land and dropping sediment in pits.
///
/// `ceiling` holds, per cell, the highest elevation among the cell and its
/// neighbors when the flow field was computed; deposits never exceed it.
fn transport_sediment(
    elevation: &mut Tilemap<f32>,
    precipitation: &Tilemap<f32>,
    flow: &Tilemap<CellFlow>,
    ceiling: &[f32],
    sea_threshold: f32,
    erosion_factor: f32,
    stats: &mut ErosionStats,
) {
    let n = elevation.len();
    let stop_below = sea_threshold - DEEP_WATER_MARGIN;

    for start in 0..n {
        let mut cur = start;
        let mut prev_dir = DIR_NONE;
        let mut sediment = 0.0f32;

        // Chains follow the flow field downhill, so they are bounded by the cell count
        for _ in 0..n {
            let h = elevation.as_slice()[cur];
            if h < stop_below {
                break;
            }

            let cell = &flow.as_slice()[cur];
            let dir = cell.flow_dir as usize;
            let is_pit = dir == DIR_NONE || (prev_dir != DIR_NONE && dir == reverse_dir(prev_dir));
            if is_pit {
                let raised = (h + sediment).min(ceiling[cur]).min(1.0);
                if raised > h {
                    let deposited = raised - h;
                    elevation.as_mut_slice()[cur] = raised;
                    stats.total_deposited += deposited as f64;
                    stats.max_deposition = stats.max_deposition.max(deposited);
                }
                break;
            }

            if is_land(h, sea_threshold) {
                let amount = precipitation.as_slice()[cur] * erosion_factor * cell.slope;
                let lowered = (h - amount).max(sea_threshold);
                let eroded = h - lowered;
                elevation.as_mut_slice()[cur] = lowered;
                sediment += eroded;
                stats.total_eroded += eroded as f64;
                stats.max_erosion = stats.max_erosion.max(eroded);
            }

            let Some(next) = step_index(elevation, cur, dir) else {
                break;
            };
            stats.steps_taken += 1;
            prev_dir = dir;
            cur = next;
        }
    }
}

/// Slide material from cells in the erodible band toward their lower neighbors.
/// Deltas are gathered first and applied together.
fn mudslide(elevation: &mut Tilemap<f32>, sea_threshold: f32, params: &ErosionParams, stats: &mut ErosionStats) {
    let width = elevation.width;
    let height = elevation.height;
    if width < 3 || height < 3 {
        return;
    }

    let low = sea_threshold - DEEP_WATER_MARGIN;
    let high = params.max_erodible_altitude;
    let band = high - low;
    if band <= 0.0 {
        return;
    }

    let mut deltas = vec![0.0f32; elevation.len()];
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let h = *elevation.get(x, y);
            if h <= low || h >= high {
                continue;
            }

            // Weighted mean of the drops toward lower neighbors only
            let mut pull = 0.0;
            let mut weight = 0.0;
            for (dir, nx, ny) in elevation.neighbors_8(x, y) {
                let nh = *elevation.get(nx, ny);
                if nh < h {
                    let w = direction_weight(dir);
                    pull += w * (nh - h);
                    weight += w;
                }
            }
            if weight == 0.0 {
                continue;
            }

            let strength = params.mudslide_coefficient * ((high - h) / band).clamp(0.0, 1.0);
            deltas[elevation.index(x, y)] = strength * pull / weight;
        }
    }

    for (h, delta) in elevation.as_mut_slice().iter_mut().zip(deltas) {
        if delta != 0.0 {
            let slid = (*h + delta).clamp(0.0, 1.0);
            stats.total_slumped += (*h - slid) as f64;
            *h = slid;
        }
    }
}

/// Highest elevation among each cell and its neighbors.
fn neighborhood_ceiling(elevation: &Tilemap<f32>) -> Vec<f32> {
    elevation
        .iter()
        .map(|(x, y, &h)| {
            elevation
                .neighbors_8(x, y)
                .into_iter()
                .map(|(_, nx, ny)| *elevation.get(nx, ny))
                .fold(h, f32::max)
        })
        .collect()
}

/// Run one outer erosion pass: flow field, sediment transport, mudslides.
pub fn erosion_pass(
    elevation: &mut Tilemap<f32>,
    precipitation: &Tilemap<f32>,
    flow: &mut Tilemap<CellFlow>,
    sea_threshold: f32,
    params: &ErosionParams,
    stats: &mut ErosionStats,
) {
    compute_flow_field(elevation, flow);
    let ceiling = neighborhood_ceiling(elevation);
    transport_sediment(
        elevation,
        precipitation,
        flow,
        &ceiling,
        sea_threshold,
        params.erosion_factor,
        stats,
    );
    mudslide(elevation, sea_threshold, params, stats);
    stats.iterations += 1;
}

/// Run all erosion passes over the elevation grid.
pub fn simulate_erosion(
    elevation: &mut Tilemap<f32>,
    precipitation: &Tilemap<f32>,
    flow: &mut Tilemap<CellFlow>,
    sea_threshold: f32,
    params: &ErosionParams,
) -> ErosionStats {
    let mut stats = ErosionStats::default();
    for _ in 0..params.passes {
        erosion_pass(elevation, precipitation, flow, sea_threshold, params, &mut stats);
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tilemap::DIR_OFFSETS;

    const SEA: f32 = 0.12;

    fn slope_map(size: usize) -> Tilemap<f32> {
        // Rises toward the south
        let mut map = Tilemap::new_with(size, size, 0.0f32);
        for (_, y, h) in map.iter_mut() {
            *h = 0.15 + y as f32 * 0.02;
        }
        map
    }

    fn bumpy_map(width: usize, height: usize) -> Tilemap<f32> {
        let mut map = Tilemap::new_with(width, height, 0.0f32);
        for (x, y, h) in map.iter_mut() {
            let v = 0.45
                + 0.3 * (x as f32 * 0.37).sin() * (y as f32 * 0.23).cos()
                + 0.1 * (x as f32 * 1.1 + y as f32 * 0.7).sin();
            *h = v.clamp(0.0, 1.0);
        }
        map
    }

    #[test]
    fn test_flow_direction_slope() {
        let elevation = slope_map(8);
        let mut flow: Tilemap<CellFlow> = Tilemap::new(8, 8);
        compute_flow_field(&elevation, &mut flow);

        for y in 1..7 {
            for x in 1..7 {
                let cell = flow.get(x, y);
                let (_, dy) = DIR_OFFSETS[cell.flow_dir as usize];
                assert_eq!(dy, -1, "expected northward flow at ({}, {})", x, y);
                let (_, ry) = DIR_OFFSETS[cell.rising_dir as usize];
                assert_eq!(ry, 1, "expected southward rise at ({}, {})", x, y);
                assert!(cell.slope > 0.0);
            }
        }
        // Borders carry no flow
        assert_eq!(flow.get(0, 3).flow_dir, DIR_NONE as u8);
        assert_eq!(flow.get(7, 7).slope, 0.0);
    }

    #[test]
    fn test_diagonal_slope_scaled() {
        let mut elevation = Tilemap::new_with(3, 3, 0.5f32);
        elevation.set(0, 0, 0.1);
        let mut flow: Tilemap<CellFlow> = Tilemap::new(3, 3);
        compute_flow_field(&elevation, &mut flow);
        let cell = flow.get(1, 1);
        assert_eq!(cell.flow_dir, 8, "NW neighbor is lowest");
        assert!((cell.slope - 0.4 * FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn test_pit_keeps_no_flow() {
        let mut elevation = Tilemap::new_with(5, 5, 0.5f32);
        elevation.set(2, 2, 0.2);
        let mut flow: Tilemap<CellFlow> = Tilemap::new(5, 5);
        compute_flow_field(&elevation, &mut flow);
        assert_eq!(flow.get(2, 2).flow_dir, DIR_NONE as u8);
        assert_eq!(flow.get(2, 1).flow_dir, 5, "neighbor drains south into the pit");
    }

    #[test]
    fn test_erosion_stays_in_bounds() {
        let mut elevation = bumpy_map(40, 30);
        let precipitation = Tilemap::new_with(40, 30, 1.0f32);
        let mut flow: Tilemap<CellFlow> = Tilemap::new(40, 30);
        let params = ErosionParams { erosion_factor: 0.05, ..Default::default() };

        let stats = simulate_erosion(&mut elevation, &precipitation, &mut flow, SEA, &params);
        assert_eq!(stats.iterations, params.passes);
        assert!(stats.total_eroded > 0.0);
        for &h in elevation.as_slice() {
            assert!((0.0..=1.0).contains(&h), "elevation {} out of range", h);
        }
    }

    #[test]
    fn test_erosion_never_lowers_land_below_sea() {
        let before = bumpy_map(32, 32);
        let mut elevation = before.clone();
        let precipitation = Tilemap::new_with(32, 32, 1.0f32);
        let mut flow: Tilemap<CellFlow> = Tilemap::new(32, 32);
        let params = ErosionParams {
            erosion_factor: 1.0,
            mudslide_coefficient: 0.0,
            ..Default::default()
        };
        simulate_erosion(&mut elevation, &precipitation, &mut flow, SEA, &params);
        for i in 0..before.len() {
            if before.as_slice()[i] >= SEA {
                assert!(elevation.as_slice()[i] >= SEA, "cell {} eroded below sea", i);
            }
        }
    }

    #[test]
    fn test_rise_bounded_by_neighbor_delta() {
        let mut elevation = bumpy_map(36, 28);
        let precipitation = Tilemap::new_with(36, 28, 0.8f32);
        let mut flow: Tilemap<CellFlow> = Tilemap::new(36, 28);
        let params = ErosionParams { erosion_factor: 0.2, ..Default::default() };
        let mut stats = ErosionStats::default();

        for _ in 0..3 {
            let before = elevation.clone();
            let bound: Vec<f32> = neighborhood_ceiling(&before)
                .iter()
                .zip(before.as_slice())
                .map(|(c, h)| c - h)
                .collect();
            erosion_pass(&mut elevation, &precipitation, &mut flow, SEA, &params, &mut stats);
            for i in 0..before.len() {
                let rise = elevation.as_slice()[i] - before.as_slice()[i];
                assert!(rise <= bound[i] + 1e-6, "cell {} rose {} > bound {}", i, rise, bound[i]);
            }
        }
        assert!(stats.total_deposited > 0.0, "pits should collect sediment");
    }

    #[test]
    fn test_mudslide_only_in_band() {
        let mut elevation = Tilemap::new_with(5, 5, 0.3f32);
        elevation.set(2, 2, 0.5);
        elevation.set(1, 1, 0.9);
        let params = ErosionParams::default();
        let mut stats = ErosionStats::default();
        mudslide(&mut elevation, SEA, &params, &mut stats);

        assert!(*elevation.get(2, 2) < 0.5, "band cell slides toward lower neighbors");
        assert_eq!(*elevation.get(1, 1), 0.9, "cell above the band is untouched");
        assert_eq!(*elevation.get(0, 0), 0.3, "border untouched");
        assert!(stats.total_slumped > 0.0);
    }

    #[test]
    fn test_mudslide_averages_lower_neighbors_only() {
        let mut elevation = Tilemap::new_with(3, 3, 0.4f32);
        elevation.set(1, 0, 0.3);
        let params = ErosionParams {
            mudslide_coefficient: 1.0,
            max_erodible_altitude: 10.0,
            ..Default::default()
        };
        let mut stats = ErosionStats::default();
        mudslide(&mut elevation, SEA, &params, &mut stats);

        let strength = (10.0 - 0.4) / (10.0 - (SEA - DEEP_WATER_MARGIN));
        let expected = 0.4 - 0.1 * strength;
        let got = *elevation.get(1, 1);
        assert!(
            (got - expected).abs() < 1e-5,
            "center slid to {}, expected {}",
            got,
            expected
        );
        assert_eq!(*elevation.get(1, 0), 0.3, "lower neighbor untouched");

        // Two lower neighbors at different depths average their drops
        let mut elevation = Tilemap::new_with(3, 3, 0.4f32);
        elevation.set(1, 0, 0.3);
        elevation.set(1, 2, 0.2);
        let mut stats = ErosionStats::default();
        mudslide(&mut elevation, SEA, &params, &mut stats);
        let expected = 0.4 - 0.15 * strength;
        assert!((*elevation.get(1, 1) - expected).abs() < 1e-5);
    }

    #[test]
    fn test_dry_map_does_not_erode() {
        let before = bumpy_map(20, 20);
        let mut elevation = before.clone();
        let precipitation = Tilemap::new_with(20, 20, 0.0f32);
        let mut flow: Tilemap<CellFlow> = Tilemap::new(20, 20);
        let params = ErosionParams { mudslide_coefficient: 0.0, ..Default::default() };
        let stats = simulate_erosion(&mut elevation, &precipitation, &mut flow, SEA, &params);
        assert_eq!(stats.total_eroded, 0.0);
        assert_eq!(elevation, before);
    }
}
