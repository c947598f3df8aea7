//! Temperature from latitude and altitude

use std::f32::consts::PI;

use crate::hydrology::precipitation::row_latitude;
use crate::tilemap::Tilemap;

// =============================================================================
// CLIMATE PARAMETERS
// =============================================================================

/// Sea-level temperature at the poles (Celsius)
pub const POLE_TEMP: f32 = -30.0;

/// Sea-level temperature span from pole to equator (Celsius)
pub const EQUATOR_SPAN: f32 = 60.0;

/// Temperature change per unit of normalized height offset (Celsius)
pub const ALTITUDE_LAPSE: f32 = 35.0;

/// Sea-level temperature at a latitude in [-1, 1] (0 = equator).
pub fn base_temperature(latitude: f32) -> f32 {
    let s = (PI * (latitude + 0.5)).sin();
    let warmth = (0.5 * (1.0 + s.powi(5))).max(0.0);
    POLE_TEMP + EQUATOR_SPAN * warmth.sqrt()
}

/// Height relative to the sea threshold, normalized separately above and below:
/// 1 at the highest land, 0 at sea level, -1 at the deepest water.
pub fn normalized_height_offset(elevation: f32, sea_threshold: f32) -> f32 {
    if elevation >= sea_threshold {
        (elevation - sea_threshold) / (1.0 - sea_threshold)
    } else {
        (elevation - sea_threshold) / sea_threshold
    }
}

/// Temperature at a cell from its latitude and elevation.
pub fn temperature(latitude: f32, elevation: f32, sea_threshold: f32) -> f32 {
    base_temperature(latitude) - ALTITUDE_LAPSE * normalized_height_offset(elevation, sea_threshold)
}

/// Generate the temperature map (Celsius).
pub fn generate_temperature(elevation: &Tilemap<f32>, sea_threshold: f32) -> Tilemap<f32> {
    let height = elevation.height;
    let mut temperature_map = Tilemap::new_with(elevation.width, height, 0.0f32);
    for y in 0..height {
        let latitude = row_latitude(y, height);
        for x in 0..elevation.width {
            let t = temperature(latitude, *elevation.get(x, y), sea_threshold);
            temperature_map.set(x, y, t);
        }
    }
    temperature_map
}
