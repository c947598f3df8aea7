//! JSON export of a generated world
//!
//! Grids are flattened row-major (`index = y * width + x`).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::biomes::Biome;
use crate::error::WorldError;
use crate::world::{GenerationStats, WorldGenerator};

/// Serializable copy of every terrain grid plus the generation summary.
#[derive(Debug, Serialize)]
pub struct WorldSnapshot {
    pub width: usize,
    pub height: usize,
    pub seed: Option<u64>,
    pub sea_threshold: f32,
    pub elevation: Vec<f32>,
    pub pre_erosion: Vec<f32>,
    /// Unitless, in [0, 1]
    pub precipitation: Vec<f32>,
    /// Celsius
    pub temperature: Vec<f32>,
    pub biomes: Vec<Biome>,
    /// River id per cell, 0 for none
    pub rivers: Vec<u16>,
    pub stats: Option<GenerationStats>,
}

impl WorldSnapshot {
    pub fn from_world(world: &WorldGenerator) -> Self {
        let terrain = world.terrain();
        let stats = world.stats().cloned();
        Self {
            width: terrain.width(),
            height: terrain.height(),
            seed: stats.as_ref().map(|s| s.seed),
            sea_threshold: terrain.sea_threshold,
            elevation: terrain.elevation.as_slice().to_vec(),
            pre_erosion: terrain.pre_erosion.as_slice().to_vec(),
            precipitation: terrain.precipitation.as_slice().to_vec(),
            temperature: terrain.temperature.as_slice().to_vec(),
            biomes: terrain.biomes.as_slice().to_vec(),
            rivers: terrain.flow.as_slice().iter().map(|c| c.river_id).collect(),
            stats,
        }
    }
}

/// Write the world as JSON to `path`.
pub fn export_world_json(world: &WorldGenerator, path: impl AsRef<Path>) -> Result<(), WorldError> {
    let path = path.as_ref();
    let snapshot = WorldSnapshot::from_world(world);
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, &snapshot)?;
    writer.flush()?;
    info!("Exported world to {}", path.display());
    Ok(())
}
