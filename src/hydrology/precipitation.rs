//! Prevailing-wind precipitation
//!
//! Moisture is carried across the map along both grid axes in both
//! directions. Air picks up water over the sea and drops it on rising land,
//! more on steeper slopes. The summed field gets a latitude band term and a
//! cheap blur before normalization.

use std::f32::consts::PI;

use crate::config::PrecipitationParams;
use crate::heightmap::is_land;
use crate::noise_source::NoiseSource;
use crate::tilemap::Tilemap;

/// Octaves for the per-line initial moisture noise
const LINE_NOISE_OCTAVES: u32 = 3;

/// Spacing between neighboring lines in noise space
const LINE_NOISE_SCALE: f64 = 0.05;

/// Octaves for the latitude perturbation field
const LATITUDE_NOISE_OCTAVES: u32 = 3;

/// Cycles of the latitude perturbation across the grid width
const LATITUDE_NOISE_FREQUENCY: f64 = 3.0;

/// Block size of the downsample/upsample blur
const DOWNSAMPLE_FACTOR: usize = 8;

/// Passes of the separable [1, 2, 1] blur
const BLUR_PASSES: usize = 4;

/// Direction of one wind sweep
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sweep {
    /// West to east along rows
    East,
    /// East to west along rows
    West,
    /// North to south along columns
    South,
    /// South to north along columns
    North,
}

impl Sweep {
    pub const ALL: [Sweep; 4] = [Sweep::East, Sweep::West, Sweep::South, Sweep::North];

    fn noise_lane(self) -> f64 {
        match self {
            Sweep::East => 0.0,
            Sweep::West => 17.3,
            Sweep::South => 34.6,
            Sweep::North => 51.9,
        }
    }
}

/// Row latitude in [-1, 1]: -1 at the top edge, 0 at the equator, 1 at the bottom.
pub fn row_latitude(y: usize, height: usize) -> f32 {
    2.0 * (y as f32 + 0.5) / height as f32 - 1.0
}

/// Cell coordinates along one line of a sweep, in wind order.
fn line_cells(sweep: Sweep, line: usize, width: usize, height: usize) -> Vec<(usize, usize)> {
    match sweep {
        Sweep::East => (0..width).map(|x| (x, line)).collect(),
        Sweep::West => (0..width).rev().map(|x| (x, line)).collect(),
        Sweep::South => (0..height).map(|y| (line, y)).collect(),
        Sweep::North => (0..height).rev().map(|y| (line, y)).collect(),
    }
}

/// Carry moisture along one line, depositing on rising land.
fn sweep_line(
    cells: &[(usize, usize)],
    elevation: &Tilemap<f32>,
    sea_threshold: f32,
    params: &PrecipitationParams,
    initial_water: f32,
    precipitation: &mut Tilemap<f32>,
) {
    let mut water = initial_water;
    for (i, &(x, y)) in cells.iter().enumerate() {
        let h = *elevation.get(x, y);
        if !is_land(h, sea_threshold) {
            water += params.ocean_replenish;
            continue;
        }

        // Last cell of the line has no downwind neighbor; use the upwind one
        let slope = match cells.get(i + 1) {
            Some(&(nx, ny)) => *elevation.get(nx, ny) - h,
            None if i > 0 => {
                let (px, py) = cells[i - 1];
                h - *elevation.get(px, py)
            }
            None => 0.0,
        };

        if slope >= 0.0 {
            let deposit = water * (params.base_rate + slope * params.slope_coefficient);
            *precipitation.get_mut(x, y) += deposit;
            water = (water - deposit).max(0.0);
        }
    }
}

/// Run the four wind sweeps and return the raw accumulated deposits.
pub fn wind_sweeps(
    elevation: &Tilemap<f32>,
    sea_threshold: f32,
    params: &PrecipitationParams,
    line_noise: &NoiseSource,
) -> Tilemap<f32> {
    let width = elevation.width;
    let height = elevation.height;
    let mut precipitation = Tilemap::new_with(width, height, 0.0f32);

    for sweep in Sweep::ALL {
        let lines = match sweep {
            Sweep::East | Sweep::West => height,
            Sweep::South | Sweep::North => width,
        };
        for line in 0..lines {
            let n = line_noise.fbm(
                [line as f64 * LINE_NOISE_SCALE, sweep.noise_lane()],
                LINE_NOISE_OCTAVES,
            );
            let cells = line_cells(sweep, line, width, height);
            sweep_line(&cells, elevation, sea_threshold, params, 1.0 + n, &mut precipitation);
        }
    }

    precipitation
}

/// Latitude band term: wet equator, dry subtropics, wet mid-latitudes, dry poles.
pub fn latitude_bias(latitude: f32) -> f32 {
    0.5 + 0.5 * (3.0 * PI * latitude).cos()
}

fn add_latitude_bias(
    precipitation: &mut Tilemap<f32>,
    params: &PrecipitationParams,
    latitude_noise: &NoiseSource,
) {
    let height = precipitation.height;
    let scale = LATITUDE_NOISE_FREQUENCY / precipitation.width as f64;
    for (x, y, p) in precipitation.iter_mut() {
        let jitter = latitude_noise.fbm([x as f64 * scale, y as f64 * scale], LATITUDE_NOISE_OCTAVES);
        let latitude = row_latitude(y, height) + params.latitude_jitter * jitter;
        *p += params.latitude_weight * latitude_bias(latitude);
    }
}

// =============================================================================
// BLUR
// =============================================================================

/// Average `factor`-sized blocks, then bilinearly sample back to full size.
fn downsample_upsample(field: &Tilemap<f32>, factor: usize) -> Tilemap<f32> {
    let width = field.width;
    let height = field.height;
    let small_w = width.div_ceil(factor);
    let small_h = height.div_ceil(factor);

    let mut small = Tilemap::new_with(small_w, small_h, 0.0f32);
    for sy in 0..small_h {
        for sx in 0..small_w {
            let mut sum = 0.0;
            let mut count = 0;
            for y in (sy * factor)..((sy + 1) * factor).min(height) {
                for x in (sx * factor)..((sx + 1) * factor).min(width) {
                    sum += *field.get(x, y);
                    count += 1;
                }
            }
            small.set(sx, sy, sum / count as f32);
        }
    }

    let mut result = Tilemap::new_with(width, height, 0.0f32);
    let inv = 1.0 / factor as f32;
    for (x, y, v) in result.iter_mut() {
        // Block centers sit at (i + 0.5) * factor in full resolution
        let fx = (x as f32 + 0.5) * inv - 0.5;
        let fy = (y as f32 + 0.5) * inv - 0.5;
        *v = small.sample_bilinear(fx, fy);
    }
    result
}

/// One pass of a separable [1, 2, 1] / 4 blur with clamped edges.
fn blur_pass(field: &mut Tilemap<f32>) {
    let width = field.width;
    let height = field.height;

    let mut horizontal = field.clone();
    for y in 0..height {
        for x in 0..width {
            let left = *field.get(x.saturating_sub(1), y);
            let right = *field.get((x + 1).min(width - 1), y);
            horizontal.set(x, y, 0.25 * left + 0.5 * *field.get(x, y) + 0.25 * right);
        }
    }

    for y in 0..height {
        for x in 0..width {
            let up = *horizontal.get(x, y.saturating_sub(1));
            let down = *horizontal.get(x, (y + 1).min(height - 1));
            field.set(x, y, 0.25 * up + 0.5 * *horizontal.get(x, y) + 0.25 * down);
        }
    }
}

// =============================================================================
// SIMULATOR
// =============================================================================

/// Compute the normalized precipitation field ([0, 1]) for an elevation grid.
pub fn simulate_precipitation(
    elevation: &Tilemap<f32>,
    sea_threshold: f32,
    params: &PrecipitationParams,
    line_noise: &NoiseSource,
    latitude_noise: &NoiseSource,
) -> Tilemap<f32> {
    let mut precipitation = wind_sweeps(elevation, sea_threshold, params, line_noise);

    let (_, max_p) = precipitation.min_max();
    if max_p > 0.0 {
        for p in precipitation.as_mut_slice() {
            *p /= max_p;
        }
    }

    add_latitude_bias(&mut precipitation, params, latitude_noise);

    let mut precipitation = downsample_upsample(&precipitation, DOWNSAMPLE_FACTOR);
    for _ in 0..BLUR_PASSES {
        blur_pass(&mut precipitation);
    }
    precipitation.normalize();
    precipitation
}
