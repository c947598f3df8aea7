//! Elevation builder
//!
//! Produces the base elevation grid:
//! 1. Additive hill stamps at random points
//! 2. Fractal noise over the normalized hills
//! 3. Land-mass leveling so a fixed fraction of cells lies above the sea threshold
//! 4. Cubic reshaping of land (wide plains, sharp peaks)

use crate::noise_source::NoiseSource;
use crate::rng::RandomSource;
use crate::tilemap::Tilemap;

/// Number of buckets in the land-mass elevation histogram
pub const HISTOGRAM_BUCKETS: usize = 256;

/// Whether an elevation counts as land. A cell exactly at the threshold is sea.
pub fn is_land(elevation: f32, sea_threshold: f32) -> bool {
    elevation > sea_threshold
}

/// Smallest elevation that counts as land.
fn lowest_land(sea_threshold: f32) -> f32 {
    f32::from_bits(sea_threshold.to_bits() + 1)
}

// =============================================================================
// HILLS
// =============================================================================

/// Additively stamp one radial bump centered on `(cx, cy)`.
/// Peak `height` at the center, decaying smoothly to 0 at `radius`.
pub fn stamp_hill(grid: &mut Tilemap<f32>, cx: f32, cy: f32, radius: f32, height: f32) {
    if radius <= 0.0 {
        return;
    }
    let x_min = (cx - radius).floor().max(0.0) as usize;
    let y_min = (cy - radius).floor().max(0.0) as usize;
    let x_max = ((cx + radius).ceil().max(0.0) as usize).min(grid.width - 1);
    let y_max = ((cy + radius).ceil().max(0.0) as usize).min(grid.height - 1);

    for y in y_min..=y_max {
        for x in x_min..=x_max {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let t = (dx * dx + dy * dy) / (radius * radius);
            if t < 1.0 {
                let falloff = 1.0 - t;
                *grid.get_mut(x, y) += height * falloff * falloff;
            }
        }
    }
}

/// Stamp `count` hills at uniformly random points with radii in
/// `[base_radius * (1 - variance), base_radius * (1 + variance)]`.
pub fn add_hills<R: RandomSource>(
    grid: &mut Tilemap<f32>,
    rng: &mut R,
    count: usize,
    base_radius: f32,
    radius_variance: f32,
    height_delta: f32,
) {
    let min_radius = base_radius * (1.0 - radius_variance);
    let max_radius = base_radius * (1.0 + radius_variance);
    for _ in 0..count {
        let cx = rng.uniform_usize(0, grid.width) as f32;
        let cy = rng.uniform_usize(0, grid.height) as f32;
        let radius = rng.uniform_f32(min_radius, max_radius);
        stamp_hill(grid, cx, cy, radius, height_delta);
    }
}

// =============================================================================
// FRACTAL NOISE
// =============================================================================

/// Add fbm noise (`frequency` cycles across the grid width) and renormalize to [0, 1].
pub fn apply_fractal_noise(
    grid: &mut Tilemap<f32>,
    noise: &NoiseSource,
    octaves: u32,
    frequency: f64,
    amplitude: f32,
) {
    // Same scale on both axes so features stay round on non-square maps
    let scale = frequency / grid.width as f64;
    for (x, y, h) in grid.iter_mut() {
        let n = noise.fbm([x as f64 * scale, y as f64 * scale], octaves);
        *h += amplitude * n;
    }
    grid.normalize();
}

// =============================================================================
// LAND MASS
// =============================================================================

fn bucket_of(h: f32) -> usize {
    ((h.clamp(0.0, 1.0) * HISTOGRAM_BUCKETS as f32) as usize).min(HISTOGRAM_BUCKETS - 1)
}

/// Remap elevations so `target_fraction` of the cells end at or above `sea_threshold`.
///
/// The histogram locates the bucket holding the natural water level; the exact
/// level is then the ranked value inside that bucket. Returns that level.
pub fn set_land_mass(grid: &mut Tilemap<f32>, target_fraction: f32, sea_threshold: f32) -> f32 {
    let n = grid.len();
    if n == 0 {
        return 0.0;
    }

    let mut histogram = [0usize; HISTOGRAM_BUCKETS];
    for &h in grid.as_slice() {
        histogram[bucket_of(h)] += 1;
    }

    // Number of cells that must end up under water
    let water_cells = (((1.0 - target_fraction) as f64) * n as f64).round() as usize;
    let water_cells = water_cells.min(n - 1);

    let mut below = 0usize;
    let mut bucket = HISTOGRAM_BUCKETS - 1;
    for (i, &count) in histogram.iter().enumerate() {
        if below + count > water_cells {
            bucket = i;
            break;
        }
        below += count;
    }

    let mut in_bucket: Vec<f32> = grid
        .as_slice()
        .iter()
        .copied()
        .filter(|&h| bucket_of(h) == bucket)
        .collect();
    let rank = (water_cells - below).min(in_bucket.len().saturating_sub(1));
    let water_level = if in_bucket.is_empty() {
        bucket as f32 / HISTOGRAM_BUCKETS as f32
    } else {
        *in_bucket.select_nth_unstable_by(rank, f32::total_cmp).1
    };

    let (_, max_h) = grid.min_max();
    let land_range = max_h - water_level;
    // Water lands strictly below the threshold and land strictly above it
    let below_sea = f32::from_bits(sea_threshold.to_bits() - 1);
    let above_sea = lowest_land(sea_threshold);

    for h in grid.as_mut_slice() {
        *h = if *h < water_level {
            (*h / water_level * sea_threshold).clamp(0.0, below_sea)
        } else if land_range > f32::EPSILON {
            (sea_threshold + (*h - water_level) / land_range * (1.0 - sea_threshold))
                .clamp(above_sea, 1.0)
        } else {
            above_sea
        };
    }

    water_level
}

/// Flatten plains and sharpen peaks with a cubic curve over land.
pub fn shape_land(grid: &mut Tilemap<f32>, sea_threshold: f32) {
    let land_span = 1.0 - sea_threshold;
    let above_sea = lowest_land(sea_threshold);
    for h in grid.as_mut_slice() {
        if is_land(*h, sea_threshold) {
            let t = (*h - sea_threshold) / land_span;
            // Low plains flatten toward the shore but stay land
            *h = (sea_threshold + t * t * t * land_span).clamp(above_sea, 1.0);
        }
    }
}

/// Fraction of cells that are land (see [`is_land`]).
pub fn land_fraction(grid: &Tilemap<f32>, sea_threshold: f32) -> f32 {
    if grid.is_empty() {
        return 0.0;
    }
    let land = grid.as_slice().iter().filter(|&&h| is_land(h, sea_threshold)).count();
    land as f32 / grid.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_single_hill_profile() {
        let mut grid = Tilemap::new_with(41, 41, 0.0f32);
        stamp_hill(&mut grid, 20.0, 20.0, 10.0, 0.3);

        assert!((*grid.get(20, 20) - 0.3).abs() < 1e-6, "peak should equal height");
        // Strictly decreasing from the center out to the radius
        for d in 1..10 {
            let inner = *grid.get(20 + d - 1, 20);
            let outer = *grid.get(20 + d, 20);
            assert!(outer < inner, "profile not decreasing at distance {}", d);
            assert!(outer > 0.0, "profile should be positive inside radius at {}", d);
        }
        // Zero at and beyond the radius
        for d in 10..=20 {
            assert_eq!(*grid.get(20 + d, 20), 0.0, "non-zero at distance {}", d);
            assert_eq!(*grid.get(20, 20 - d), 0.0, "non-zero at distance {}", d);
        }
        assert_eq!(*grid.get(28, 28), 0.0, "diagonal beyond radius must be zero");
    }

    #[test]
    fn test_hill_near_edge_is_clipped() {
        let mut grid = Tilemap::new_with(8, 8, 0.0f32);
        stamp_hill(&mut grid, 0.0, 0.0, 5.0, 1.0);
        assert_eq!(*grid.get(0, 0), 1.0);
        assert_eq!(*grid.get(7, 7), 0.0);
    }

    #[test]
    fn test_add_hills_is_additive() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut grid = Tilemap::new_with(32, 32, 0.0f32);
        add_hills(&mut grid, &mut rng, 20, 6.0, 0.5, 0.3);
        assert!(grid.as_slice().iter().all(|&h| h >= 0.0));
        assert!(grid.as_slice().iter().any(|&h| h > 0.0));
    }

    fn noisy_grid(seed: u64, width: usize, height: usize) -> Tilemap<f32> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut grid = Tilemap::new_with(width, height, 0.0f32);
        add_hills(&mut grid, &mut rng, 8, 12.0, 0.5, 0.3);
        grid.normalize();
        let noise = NoiseSource::new(rng.noise_seed());
        apply_fractal_noise(&mut grid, &noise, 5, 4.0, 0.6);
        grid
    }

    #[test]
    fn test_fractal_noise_normalizes() {
        let grid = noisy_grid(11, 48, 32);
        let (min_h, max_h) = grid.min_max();
        assert_eq!(min_h, 0.0);
        assert_eq!(max_h, 1.0);
    }

    #[test]
    fn test_land_mass_scenario_64() {
        let grid = noisy_grid(42, 64, 64);
        let mut leveled = grid.clone();
        set_land_mass(&mut leveled, 0.6, 0.12);
        let fraction = land_fraction(&leveled, 0.12);
        assert!(
            (fraction - 0.6).abs() <= 1.0 / 4096.0 + 1e-6,
            "land fraction {} not within one cell of 0.6",
            fraction
        );
    }

    #[test]
    fn test_land_mass_across_seeds_and_targets() {
        for seed in 0..6u64 {
            for &target in &[0.1f32, 0.3, 0.5, 0.75, 0.9] {
                let mut grid = noisy_grid(seed, 40, 30);
                set_land_mass(&mut grid, target, 0.12);
                let fraction = land_fraction(&grid, 0.12);
                let epsilon = 1.0 / grid.len() as f32 + 1e-6;
                assert!(
                    (fraction - target).abs() <= epsilon,
                    "seed {} target {} got {}",
                    seed,
                    target,
                    fraction
                );
                let (min_h, max_h) = grid.min_max();
                assert!(min_h >= 0.0 && max_h <= 1.0);
                assert!((max_h - 1.0).abs() < 1e-6, "global max should map to 1");
            }
        }
    }

    #[test]
    fn test_land_mass_preserves_order() {
        let original = noisy_grid(3, 24, 24);
        let mut leveled = original.clone();
        set_land_mass(&mut leveled, 0.4, 0.12);
        for i in 0..original.len() {
            for j in 0..original.len() {
                if original.as_slice()[i] < original.as_slice()[j] {
                    assert!(leveled.as_slice()[i] <= leveled.as_slice()[j]);
                }
            }
        }
    }

    #[test]
    fn test_leveled_cells_avoid_the_threshold() {
        let sea = 0.12;
        assert!(!is_land(sea, sea), "the threshold itself is sea");
        assert!(is_land(lowest_land(sea), sea));

        let mut grid = noisy_grid(42, 64, 64);
        set_land_mass(&mut grid, 0.6, sea);
        shape_land(&mut grid, sea);
        let on_threshold = grid.as_slice().iter().filter(|&&h| h == sea).count();
        assert_eq!(on_threshold, 0, "no cell may sit exactly on the threshold");
        // Counting cells at or above the threshold agrees with is_land
        let at_or_above = grid.as_slice().iter().filter(|&&h| h >= sea).count();
        assert_eq!(at_or_above as f32 / grid.len() as f32, land_fraction(&grid, sea));
    }

    #[test]
    fn test_shape_land_curve() {
        let sea = 0.12;
        let mut grid = Tilemap::new_with(4, 1, 0.0f32);
        grid.set(0, 0, 0.05);
        grid.set(1, 0, sea);
        grid.set(2, 0, 0.56);
        grid.set(3, 0, 1.0);
        shape_land(&mut grid, sea);

        assert_eq!(*grid.get(0, 0), 0.05, "water untouched");
        assert_eq!(*grid.get(1, 0), sea);
        let expected = sea + 0.5f32.powi(3) * (1.0 - sea);
        assert!((*grid.get(2, 0) - expected).abs() < 1e-6);
        assert!((*grid.get(3, 0) - 1.0).abs() < 1e-6, "peak stays at 1");
    }
}
