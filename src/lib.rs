//! Terrain generation library
//!
//! Builds a planet-style world on a rectangular grid: elevation from hills
//! and fractal noise, wind-driven precipitation, river systems, erosion,
//! temperature and biomes, plus a scrolling cloud overlay.

pub mod biomes;
pub mod climate;
pub mod clouds;
pub mod config;
pub mod error;
pub mod export;
pub mod heightmap;
pub mod hydrology;
pub mod noise_source;
pub mod rng;
pub mod scale;
pub mod tilemap;
pub mod world;

pub use biomes::Biome;
pub use config::WorldConfig;
pub use error::WorldError;
pub use rng::RandomSource;
pub use world::{GenerationStats, TerrainGrids, WorldGenerator};
