//! Biome classification from temperature and precipitation.
//!
//! Temperature falls into one of five climate bands and precipitation into
//! one of five humidity quintiles; a fixed table maps each pair to a biome.

use serde::{Deserialize, Serialize};

use crate::tilemap::Tilemap;

/// Biome types based on temperature and humidity
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Biome {
    // Cold biomes
    #[default]
    Tundra,
    ColdDesert,
    BorealForest,

    // Temperate biomes
    Grassland,
    Shrubland,
    TemperateForest,
    TemperateRainforest,

    // Warm biomes
    HotDesert,
    Savanna,
    TropicalForest,
    TropicalRainforest,
}

impl Biome {
    pub fn all() -> &'static [Self] {
        &[
            Self::Tundra,
            Self::ColdDesert,
            Self::BorealForest,
            Self::Grassland,
            Self::Shrubland,
            Self::TemperateForest,
            Self::TemperateRainforest,
            Self::HotDesert,
            Self::Savanna,
            Self::TropicalForest,
            Self::TropicalRainforest,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Tundra => "Tundra",
            Self::ColdDesert => "Cold Desert",
            Self::BorealForest => "Boreal Forest",
            Self::Grassland => "Grassland",
            Self::Shrubland => "Shrubland",
            Self::TemperateForest => "Temperate Forest",
            Self::TemperateRainforest => "Temperate Rainforest",
            Self::HotDesert => "Hot Desert",
            Self::Savanna => "Savanna",
            Self::TropicalForest => "Tropical Forest",
            Self::TropicalRainforest => "Tropical Rainforest",
        }
    }
}

impl std::fmt::Display for Biome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// CLASSIFICATION TABLE
// =============================================================================

/// Upper temperature bounds (Celsius, inclusive) of the first four climate bands.
/// Anything warmer is band 4.
pub const CLIMATE_BAND_LIMITS: [f32; 4] = [-5.0, 5.0, 15.0, 20.0];

/// Number of humidity quintiles
pub const HUMIDITY_LEVELS: usize = 5;

use Biome::*;

/// Biome lookup indexed by `[climate band][humidity quintile]`, coldest and driest first.
pub const BIOME_TABLE: [[Biome; HUMIDITY_LEVELS]; 5] = [
    [ColdDesert, Tundra, Tundra, Tundra, Tundra],
    [ColdDesert, Tundra, Grassland, BorealForest, BorealForest],
    [Grassland, Grassland, Shrubland, TemperateForest, TemperateRainforest],
    [HotDesert, Grassland, Shrubland, TemperateForest, TemperateRainforest],
    [HotDesert, HotDesert, Savanna, TropicalForest, TropicalRainforest],
];

/// Climate band (0 = polar .. 4 = hot) for a temperature in Celsius.
pub fn climate_band(temperature: f32) -> usize {
    CLIMATE_BAND_LIMITS
        .iter()
        .position(|&limit| temperature <= limit)
        .unwrap_or(CLIMATE_BAND_LIMITS.len())
}

/// Humidity quintile (0 = driest .. 4 = wettest) for a precipitation in [0, 1].
pub fn humidity_quintile(precipitation: f32) -> usize {
    let q = (precipitation * HUMIDITY_LEVELS as f32).floor();
    if q.is_nan() || q < 0.0 {
        0
    } else {
        (q as usize).min(HUMIDITY_LEVELS - 1)
    }
}

/// Classify one cell.
pub fn classify(temperature: f32, precipitation: f32) -> Biome {
    BIOME_TABLE[climate_band(temperature)][humidity_quintile(precipitation)]
}

/// Generate the biome map from temperature and precipitation maps.
pub fn generate_biomes(temperature: &Tilemap<f32>, precipitation: &Tilemap<f32>) -> Tilemap<Biome> {
    let mut biomes = Tilemap::new(temperature.width, temperature.height);
    for (x, y, biome) in biomes.iter_mut() {
        *biome = classify(*temperature.get(x, y), *precipitation.get(x, y));
    }
    biomes
}

/// Count of cells per biome, in [`Biome::all`] order, skipping empty entries.
pub fn biome_histogram(biomes: &Tilemap<Biome>) -> Vec<(Biome, usize)> {
    Biome::all()
        .iter()
        .map(|&b| (b, biomes.as_slice().iter().filter(|&&c| c == b).count()))
        .filter(|&(_, count)| count > 0)
        .collect()
}
