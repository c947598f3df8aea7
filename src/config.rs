//! World generation configuration
//!
//! All tunable constants live here and are handed to the generator once at
//! construction. Generation stages only read them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::WorldError;

// =============================================================================
// STAGE PARAMETERS
// =============================================================================

/// Hill stamping parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HillParams {
    /// One hill is stamped per this many grid cells
    pub cells_per_hill: usize,
    /// Mean hill radius in cells
    pub base_radius: f32,
    /// Relative radius variance (0.5 = radius in [0.5r, 1.5r])
    pub radius_variance: f32,
    /// Peak height added by each hill
    pub height: f32,
}

impl Default for HillParams {
    fn default() -> Self {
        Self {
            cells_per_hill: 512,
            base_radius: 24.0,
            radius_variance: 0.5,
            height: 0.3,
        }
    }
}

/// Fractal noise applied over the stamped hills
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    /// Number of fbm octaves
    pub octaves: u32,
    /// Cycles across the grid width
    pub frequency: f64,
    /// Noise amplitude relative to the normalized hill field
    pub amplitude: f32,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            octaves: 5,
            frequency: 4.0,
            amplitude: 0.6,
        }
    }
}

/// Prevailing-wind precipitation parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecipitationParams {
    /// Moisture picked up per water cell crossed
    pub ocean_replenish: f32,
    /// Fraction of carried moisture dropped on any rising land cell
    pub base_rate: f32,
    /// Extra fraction dropped per unit of upslope height delta
    pub slope_coefficient: f32,
    /// Weight of the latitude band term
    pub latitude_weight: f32,
    /// Latitude perturbation amplitude from the secondary noise field
    pub latitude_jitter: f32,
}

impl Default for PrecipitationParams {
    fn default() -> Self {
        Self {
            ocean_replenish: 0.02,
            base_rate: 0.01,
            slope_coefficient: 4.0,
            latitude_weight: 0.5,
            latitude_jitter: 0.1,
        }
    }
}

/// River network growth parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiverParams {
    /// One river system is grown per this many grid cells
    pub cells_per_river_system: usize,
    /// Minimum number of growth targets per system
    pub min_targets: usize,
    /// Maximum number of growth targets per system (inclusive)
    pub max_targets: usize,
    /// Half-extent of the target box around the source, in cells
    pub reach: usize,
    /// Raster steps walked toward each target
    pub step_budget: usize,
}

impl Default for RiverParams {
    fn default() -> Self {
        Self {
            cells_per_river_system: 4096,
            min_targets: 50,
            max_targets: 200,
            reach: 40,
            step_budget: 3,
        }
    }
}

/// Flow-direction erosion parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErosionParams {
    /// Outer erosion passes
    pub passes: usize,
    /// Height removed per unit of precipitation times slope
    pub erosion_factor: f32,
    /// Cells at or above this altitude are not smoothed by mudslides
    pub max_erodible_altitude: f32,
    /// Mudslide strength at the bottom of the band
    pub mudslide_coefficient: f32,
}

impl Default for ErosionParams {
    fn default() -> Self {
        Self {
            passes: 5,
            erosion_factor: 0.002,
            max_erodible_altitude: 0.6,
            mudslide_coefficient: 0.25,
        }
    }
}

/// Cloud overlay parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudParams {
    /// Columns scrolled per second
    pub speed: f32,
    /// Noise cycles across the grid width
    pub frequency: f64,
    /// fbm octaves
    pub octaves: u32,
}

impl Default for CloudParams {
    fn default() -> Self {
        Self {
            speed: 2.0,
            frequency: 6.0,
            octaves: 4,
        }
    }
}

// =============================================================================
// WORLD CONFIGURATION
// =============================================================================

/// Complete world generation configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Grid width in cells
    pub width: usize,
    /// Grid height in cells
    pub height: usize,
    /// Elevation at or below which a cell is water
    pub sea_threshold: f32,
    /// Fraction of cells that end above the sea threshold
    pub target_land_fraction: f32,
    /// Vertical exaggeration used for surface normals
    pub normal_height_scale: f32,
    pub hills: HillParams,
    pub noise: NoiseParams,
    pub precipitation: PrecipitationParams,
    pub rivers: RiverParams,
    pub erosion: ErosionParams,
    pub clouds: CloudParams,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 256,
            sea_threshold: 0.12,
            target_land_fraction: 0.4,
            normal_height_scale: 40.0,
            hills: HillParams::default(),
            noise: NoiseParams::default(),
            precipitation: PrecipitationParams::default(),
            rivers: RiverParams::default(),
            erosion: ErosionParams::default(),
            clouds: CloudParams::default(),
        }
    }
}

impl WorldConfig {
    /// Config with the given dimensions and defaults elsewhere.
    pub fn with_size(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, WorldError> {
        let contents = std::fs::read_to_string(path)?;
        let config: WorldConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every precondition generation relies on.
    pub fn validate(&self) -> Result<(), WorldError> {
        if self.width == 0 || self.height == 0 {
            return Err(WorldError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        // Negated comparisons also reject NaN
        if !(self.target_land_fraction > 0.0 && self.target_land_fraction < 1.0) {
            return Err(WorldError::InvalidLandFraction(self.target_land_fraction));
        }
        if !(self.sea_threshold > 0.0 && self.sea_threshold < 1.0) {
            return Err(WorldError::InvalidSeaThreshold(self.sea_threshold));
        }
        if self.rivers.min_targets > self.rivers.max_targets {
            return Err(WorldError::InvalidRiverTargets {
                min: self.rivers.min_targets,
                max: self.rivers.max_targets,
            });
        }
        Ok(())
    }

    /// Total number of grid cells
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }
}
