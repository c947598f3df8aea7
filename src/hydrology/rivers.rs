//! River network growth
//!
//! Each river system starts from a shallow coastal cell and grows a tree of
//! short raster walks toward random targets inland. Claimed cells get the
//! river id and maximum precipitation. A walk that touches another river is
//! treated as a confluence and abandoned.

use tracing::debug;

use crate::config::RiverParams;
use crate::heightmap::is_land;
use crate::hydrology::CellFlow;
use crate::rng::RandomSource;
use crate::tilemap::Tilemap;

/// Coastal seed band depth below the sea threshold
pub const COASTAL_BAND: f32 = 0.02;

/// Precipitation forced onto river cells
pub const RIVER_PRECIPITATION: f32 = 1.0;

/// Result of growing one river system
#[derive(Debug, Default, Clone)]
pub struct RiverSystem {
    /// River id written into claimed cells
    pub id: u16,
    /// Cell index of the coastal source
    pub source: usize,
    /// Tree nodes as cell indices; the first entry is the source
    pub nodes: Vec<usize>,
    /// Number of cells claimed by this system
    pub claimed: usize,
    /// Walks stopped by meeting another river
    pub joins: usize,
}

/// Totals over all river systems
#[derive(Debug, Default, Clone)]
pub struct RiverStats {
    pub systems: usize,
    pub cells: usize,
    pub joins: usize,
}

/// How a walk toward a target ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkEnd {
    /// Step budget used up or target reached
    Exhausted,
    /// Next cell is not land
    ReachedSea,
    /// Next cell belongs to another river
    Joined,
    /// Next cell already belongs to this river
    Looped,
}

/// Find a cell in the coastal band, scanning row-major from `start` with wrap-around.
pub fn find_coastal_seed(elevation: &Tilemap<f32>, sea_threshold: f32, start: usize) -> Option<usize> {
    let n = elevation.len();
    let cells = elevation.as_slice();
    (0..n)
        .map(|offset| (start + offset) % n)
        .find(|&idx| {
            let h = cells[idx];
            h >= sea_threshold - COASTAL_BAND && !is_land(h, sea_threshold)
        })
}

/// Index of the node nearest to `(tx, ty)` by squared distance; earlier nodes win ties.
pub fn nearest_node(nodes: &[usize], width: usize, tx: usize, ty: usize) -> Option<usize> {
    let mut best: Option<(usize, i64)> = None;
    for (i, &node) in nodes.iter().enumerate() {
        let dx = (node % width) as i64 - tx as i64;
        let dy = (node / width) as i64 - ty as i64;
        let d2 = dx * dx + dy * dy;
        if best.map_or(true, |(_, best_d2)| d2 < best_d2) {
            best = Some((i, d2));
        }
    }
    best.map(|(i, _)| i)
}

/// One raster step from `(x, y)` toward `(tx, ty)`.
fn step_toward(x: usize, y: usize, tx: usize, ty: usize) -> (usize, usize) {
    let dx = tx as i64 - x as i64;
    let dy = ty as i64 - y as i64;
    // Move diagonally only while the minor axis is at least half the major one
    let sx = if 2 * dx.abs() >= dy.abs() { dx.signum() } else { 0 };
    let sy = if 2 * dy.abs() >= dx.abs() { dy.signum() } else { 0 };
    ((x as i64 + sx) as usize, (y as i64 + sy) as usize)
}

/// Walk up to `budget` steps from `start` toward the target, claiming land.
/// Returns the last claimed cell (if any) and how the walk ended.
#[allow(clippy::too_many_arguments)]
fn walk_toward(
    elevation: &Tilemap<f32>,
    precipitation: &mut Tilemap<f32>,
    flow: &mut Tilemap<CellFlow>,
    sea_threshold: f32,
    river_id: u16,
    start: usize,
    target: (usize, usize),
    budget: usize,
) -> (Option<usize>, usize, WalkEnd) {
    let width = elevation.width;
    let (mut x, mut y) = (start % width, start / width);
    let mut last_claimed = None;
    let mut claimed = 0;

    for _ in 0..budget {
        if (x, y) == target {
            break;
        }
        let (nx, ny) = step_toward(x, y, target.0, target.1);
        if !is_land(*elevation.get(nx, ny), sea_threshold) {
            return (last_claimed, claimed, WalkEnd::ReachedSea);
        }
        let owner = flow.get(nx, ny).river_id;
        if owner == river_id {
            return (last_claimed, claimed, WalkEnd::Looped);
        }
        if owner != 0 {
            return (last_claimed, claimed, WalkEnd::Joined);
        }

        flow.get_mut(nx, ny).river_id = river_id;
        precipitation.set(nx, ny, RIVER_PRECIPITATION);
        last_claimed = Some(elevation.index(nx, ny));
        claimed += 1;
        x = nx;
        y = ny;
    }

    (last_claimed, claimed, WalkEnd::Exhausted)
}

/// Grow one river system with id `river_id`. Returns `None` if no coastal seed exists.
pub fn grow_river<R: RandomSource>(
    elevation: &Tilemap<f32>,
    precipitation: &mut Tilemap<f32>,
    flow: &mut Tilemap<CellFlow>,
    sea_threshold: f32,
    params: &RiverParams,
    river_id: u16,
    rng: &mut R,
) -> Option<RiverSystem> {
    let width = elevation.width;
    let height = elevation.height;

    let start = rng.uniform_usize(0, elevation.len());
    let source = find_coastal_seed(elevation, sea_threshold, start)?;
    let (sx, sy) = (source % width, source / width);

    let mut system = RiverSystem {
        id: river_id,
        source,
        nodes: vec![source],
        ..Default::default()
    };

    let x_lo = sx.saturating_sub(params.reach);
    let x_hi = (sx + params.reach + 1).min(width);
    let y_lo = sy.saturating_sub(params.reach);
    let y_hi = (sy + params.reach + 1).min(height);

    let target_count = rng.uniform_usize(params.min_targets, params.max_targets + 1);
    let targets: Vec<(usize, usize)> = (0..target_count)
        .map(|_| (rng.uniform_usize(x_lo, x_hi), rng.uniform_usize(y_lo, y_hi)))
        .collect();

    for (tx, ty) in targets {
        let Some(node) = nearest_node(&system.nodes, width, tx, ty) else {
            continue;
        };
        let (last, claimed, end) = walk_toward(
            elevation,
            precipitation,
            flow,
            sea_threshold,
            river_id,
            system.nodes[node],
            (tx, ty),
            params.step_budget,
        );
        system.claimed += claimed;
        if end == WalkEnd::Joined {
            system.joins += 1;
            continue;
        }
        if let Some(cell) = last {
            system.nodes.push(cell);
        }
    }

    Some(system)
}

/// Number of river systems to grow: one per `cells_per_river_system` cells,
/// at least one, and no more than river ids can tell apart.
pub fn river_invocations(cell_count: usize, cells_per_river_system: usize) -> usize {
    let wanted = cell_count / cells_per_river_system.max(1);
    let invocations = wanted.clamp(1, u16::MAX as usize);
    if invocations < wanted {
        debug!(
            "River systems capped at {} ({} requested)",
            invocations, wanted
        );
    }
    invocations
}

/// Grow all river systems for the map. One system per `cells_per_river_system` cells.
pub fn build_river_network<R: RandomSource>(
    elevation: &Tilemap<f32>,
    precipitation: &mut Tilemap<f32>,
    flow: &mut Tilemap<CellFlow>,
    sea_threshold: f32,
    params: &RiverParams,
    rng: &mut R,
) -> (Vec<RiverSystem>, RiverStats) {
    let invocations = river_invocations(elevation.len(), params.cells_per_river_system);

    let mut systems = Vec::new();
    let mut stats = RiverStats::default();
    for i in 0..invocations {
        let id = (i + 1) as u16;
        if let Some(system) =
            grow_river(elevation, precipitation, flow, sea_threshold, params, id, rng)
        {
            stats.systems += 1;
            stats.cells += system.claimed;
            stats.joins += system.joins;
            systems.push(system);
        }
    }
    (systems, stats)
}
