//! World generator
//!
//! Owns every grid and sequences the generation stages once per `generate`
//! call. After generation the terrain grids are frozen and exposed through
//! read-only queries; only the cloud layer keeps changing.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::biomes::{self, Biome};
use crate::climate;
use crate::clouds::CloudLayer;
use crate::config::WorldConfig;
use crate::error::WorldError;
use crate::heightmap;
use crate::hydrology::{self, CellFlow, RiverSystem};
use crate::noise_source::NoiseSource;
use crate::rng::RandomSource;
use crate::scale;
use crate::tilemap::Tilemap;

/// Horizontal distance used for surface normal differences, in cells
const NORMAL_SAMPLE_DISTANCE: f32 = 1.0;

/// All terrain grids of one generated world.
#[derive(Clone, Debug)]
pub struct TerrainGrids {
    /// Elevation in [0, 1], after erosion
    pub elevation: Tilemap<f32>,
    /// Elevation right after fractal noise, before leveling and erosion
    pub pre_erosion: Tilemap<f32>,
    /// Unitless precipitation in [0, 1]
    pub precipitation: Tilemap<f32>,
    /// Temperature (Celsius)
    pub temperature: Tilemap<f32>,
    /// Biome classification
    pub biomes: Tilemap<Biome>,
    /// Flow directions, slopes and river ids
    pub flow: Tilemap<CellFlow>,
    /// River systems grown during generation
    pub rivers: Vec<RiverSystem>,
    /// Sea threshold the grids were generated with
    pub sea_threshold: f32,
}

impl TerrainGrids {
    /// Zeroed grids of the given size.
    pub fn empty(width: usize, height: usize, sea_threshold: f32) -> Self {
        Self {
            elevation: Tilemap::new_with(width, height, 0.0),
            pre_erosion: Tilemap::new_with(width, height, 0.0),
            precipitation: Tilemap::new_with(width, height, 0.0),
            temperature: Tilemap::new_with(width, height, 0.0),
            biomes: Tilemap::new(width, height),
            flow: Tilemap::new(width, height),
            rivers: Vec::new(),
            sea_threshold,
        }
    }

    pub fn width(&self) -> usize {
        self.elevation.width
    }

    pub fn height(&self) -> usize {
        self.elevation.height
    }

    pub fn elevation_at(&self, x: usize, y: usize) -> f32 {
        *self.elevation.get(x, y)
    }

    /// Bilinear elevation at fractional coordinates (clamped to the grid).
    pub fn interpolated_elevation_at(&self, fx: f32, fy: f32) -> f32 {
        self.elevation.sample_bilinear(fx, fy)
    }

    /// Temperature in Celsius.
    pub fn temperature_at(&self, x: usize, y: usize) -> f32 {
        *self.temperature.get(x, y)
    }

    /// Precipitation in millimetres per year.
    pub fn precipitation_at(&self, x: usize, y: usize) -> f32 {
        scale::precipitation_mm_per_year(self.raw_precipitation_at(x, y))
    }

    /// Unitless precipitation in [0, 1].
    pub fn raw_precipitation_at(&self, x: usize, y: usize) -> f32 {
        *self.precipitation.get(x, y)
    }

    pub fn biome_at(&self, x: usize, y: usize) -> Biome {
        *self.biomes.get(x, y)
    }

    /// River id at a cell, 0 if no river.
    pub fn river_at(&self, x: usize, y: usize) -> u16 {
        self.flow.get(x, y).river_id
    }

    pub fn is_sea(&self, fx: f32, fy: f32) -> bool {
        !heightmap::is_land(self.interpolated_elevation_at(fx, fy), self.sea_threshold)
    }

    /// Unit surface normal from the pre-erosion elevation, `z` pointing up.
    pub fn surface_normal_at(&self, fx: f32, fy: f32, height_scale: f32) -> (f32, f32, f32) {
        let d = NORMAL_SAMPLE_DISTANCE;
        let grid = &self.pre_erosion;
        let gx = (grid.sample_bilinear(fx + d, fy) - grid.sample_bilinear(fx - d, fy)) / (2.0 * d);
        let gy = (grid.sample_bilinear(fx, fy + d) - grid.sample_bilinear(fx, fy - d)) / (2.0 * d);
        let nx = -gx * height_scale;
        let ny = -gy * height_scale;
        let len = (nx * nx + ny * ny + 1.0).sqrt();
        (nx / len, ny / len, 1.0 / len)
    }

    /// Fraction of cells that are land.
    pub fn land_fraction(&self) -> f32 {
        heightmap::land_fraction(&self.elevation, self.sea_threshold)
    }

    /// Gather everything known about one cell.
    pub fn tile_info(&self, x: usize, y: usize) -> TileInfo {
        TileInfo {
            x,
            y,
            elevation: self.elevation_at(x, y),
            temperature: self.temperature_at(x, y),
            precipitation: self.precipitation_at(x, y),
            biome: self.biome_at(x, y),
            river_id: self.river_at(x, y),
            is_sea: !heightmap::is_land(self.elevation_at(x, y), self.sea_threshold),
        }
    }
}

/// Information about a single tile
#[derive(Clone, Debug, Serialize)]
pub struct TileInfo {
    pub x: usize,
    pub y: usize,
    pub elevation: f32,
    pub temperature: f32,
    /// Millimetres per year
    pub precipitation: f32,
    pub biome: Biome,
    pub river_id: u16,
    pub is_sea: bool,
}

impl TileInfo {
    /// Format temperature as string
    pub fn temperature_str(&self) -> String {
        format!("{:.1}°C", self.temperature)
    }

    /// Format precipitation as string
    pub fn precipitation_str(&self) -> String {
        let desc = if self.precipitation < 250.0 {
            "arid"
        } else if self.precipitation < 500.0 {
            "dry"
        } else if self.precipitation < 1000.0 {
            "moderate"
        } else if self.precipitation < 2000.0 {
            "wet"
        } else {
            "saturated"
        };
        format!("{:.0} mm/yr ({})", self.precipitation, desc)
    }

    /// Format surface type as string
    pub fn surface_str(&self) -> String {
        if self.is_sea {
            "Sea".to_string()
        } else if self.river_id != 0 {
            format!("River #{}", self.river_id)
        } else {
            "Land".to_string()
        }
    }
}

/// Summary of one `generate` run
#[derive(Clone, Debug, Default, Serialize)]
pub struct GenerationStats {
    pub seed: u64,
    /// Raw elevation that became the sea threshold during leveling
    pub natural_water_level: f32,
    /// Land fraction right after leveling
    pub leveled_land_fraction: f32,
    /// Land fraction after erosion
    pub final_land_fraction: f32,
    pub river_systems: usize,
    pub river_cells: usize,
    pub river_joins: usize,
    pub total_eroded: f64,
    pub total_deposited: f64,
    pub min_temperature: f32,
    pub max_temperature: f32,
    pub biome_counts: Vec<(Biome, usize)>,
}

/// Owns the configuration, the terrain grids and the cloud layer.
pub struct WorldGenerator {
    config: WorldConfig,
    terrain: TerrainGrids,
    clouds: CloudLayer,
    stats: Option<GenerationStats>,
}

impl WorldGenerator {
    /// Validate `config` and allocate zeroed grids.
    pub fn new(config: WorldConfig) -> Result<Self, WorldError> {
        config.validate()?;
        let terrain = TerrainGrids::empty(config.width, config.height, config.sea_threshold);
        let clouds = CloudLayer::new(config.width, config.height, config.clouds.clone(), 0);
        Ok(Self {
            config,
            terrain,
            clouds,
            stats: None,
        })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn terrain(&self) -> &TerrainGrids {
        &self.terrain
    }

    /// Statistics of the last `generate` run, if any.
    pub fn stats(&self) -> Option<&GenerationStats> {
        self.stats.as_ref()
    }

    /// Generate a world from `seed` with the built-in ChaCha generator.
    pub fn generate(&mut self, seed: u64) -> &GenerationStats {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.generate_with_rng(seed, &mut rng)
    }

    /// Generate a world drawing every random value from `rng`.
    /// `seed` is only recorded in the statistics.
    pub fn generate_with_rng<R: RandomSource>(&mut self, seed: u64, rng: &mut R) -> &GenerationStats {
        let config = &self.config;
        let width = config.width;
        let height = config.height;
        let sea = config.sea_threshold;

        info!("Generating world with seed {} ({}x{})", seed, width, height);

        // Noise seeds are drawn first so the stage order below stays fixed
        let elevation_noise = NoiseSource::new(rng.noise_seed());
        let line_noise = NoiseSource::new(rng.noise_seed());
        let latitude_noise = NoiseSource::new(rng.noise_seed());
        let cloud_seed = rng.noise_seed();

        let mut terrain = TerrainGrids::empty(width, height, sea);

        // Elevation
        info!("Building elevation...");
        let hill_count = (config.cell_count() / config.hills.cells_per_hill.max(1)).max(1);
        heightmap::add_hills(
            &mut terrain.elevation,
            rng,
            hill_count,
            config.hills.base_radius,
            config.hills.radius_variance,
            config.hills.height,
        );
        terrain.elevation.normalize();
        heightmap::apply_fractal_noise(
            &mut terrain.elevation,
            &elevation_noise,
            config.noise.octaves,
            config.noise.frequency,
            config.noise.amplitude,
        );
        terrain.pre_erosion = terrain.elevation.clone();

        let natural_water_level =
            heightmap::set_land_mass(&mut terrain.elevation, config.target_land_fraction, sea);
        let leveled_land_fraction = heightmap::land_fraction(&terrain.elevation, sea);
        heightmap::shape_land(&mut terrain.elevation, sea);
        debug!(
            "  {} hills, water level {:.3}, land {:.1}%",
            hill_count,
            natural_water_level,
            leveled_land_fraction * 100.0
        );

        // Hydrology
        info!("Simulating precipitation...");
        terrain.precipitation = hydrology::simulate_precipitation(
            &terrain.elevation,
            sea,
            &config.precipitation,
            &line_noise,
            &latitude_noise,
        );

        info!("Growing river network...");
        let (rivers, river_stats) = hydrology::build_river_network(
            &terrain.elevation,
            &mut terrain.precipitation,
            &mut terrain.flow,
            sea,
            &config.rivers,
            rng,
        );
        terrain.rivers = rivers;
        debug!(
            "  {} systems, {} cells, {} joins",
            river_stats.systems, river_stats.cells, river_stats.joins
        );

        info!("Simulating erosion...");
        let erosion_stats = hydrology::simulate_erosion(
            &mut terrain.elevation,
            &terrain.precipitation,
            &mut terrain.flow,
            sea,
            &config.erosion,
        );
        debug!(
            "  eroded {:.2}, deposited {:.2}, slumped {:.2} over {} steps",
            erosion_stats.total_eroded,
            erosion_stats.total_deposited,
            erosion_stats.total_slumped,
            erosion_stats.steps_taken
        );

        // Climate
        info!("Classifying climate...");
        terrain.temperature = climate::generate_temperature(&terrain.elevation, sea);
        terrain.biomes = biomes::generate_biomes(&terrain.temperature, &terrain.precipitation);

        let (min_temperature, max_temperature) = terrain.temperature.min_max();
        let stats = GenerationStats {
            seed,
            natural_water_level,
            leveled_land_fraction,
            final_land_fraction: terrain.land_fraction(),
            river_systems: river_stats.systems,
            river_cells: river_stats.cells,
            river_joins: river_stats.joins,
            total_eroded: erosion_stats.total_eroded,
            total_deposited: erosion_stats.total_deposited,
            min_temperature,
            max_temperature,
            biome_counts: biomes::biome_histogram(&terrain.biomes),
        };
        info!(
            "World ready: {:.1}% land, {} rivers, {:.1}°C to {:.1}°C",
            stats.final_land_fraction * 100.0,
            stats.river_systems,
            stats.min_temperature,
            stats.max_temperature
        );

        self.clouds = CloudLayer::new(width, height, config.clouds.clone(), cloud_seed);
        self.terrain = terrain;
        self.stats.insert(stats)
    }

    /// Advance the cloud overlay by `dt` seconds.
    pub fn update_clouds(&mut self, dt: f32) -> usize {
        self.clouds.update(dt)
    }

    /// Mutable cloud layer alongside read-only terrain, for per-frame updates
    /// while terrain queries are borrowed.
    pub fn split_clouds(&mut self) -> (&mut CloudLayer, &TerrainGrids) {
        (&mut self.clouds, &self.terrain)
    }

    pub fn clouds(&self) -> &CloudLayer {
        &self.clouds
    }

    // Query surface, delegated to the frozen grids

    pub fn elevation_at(&self, x: usize, y: usize) -> f32 {
        self.terrain.elevation_at(x, y)
    }

    pub fn interpolated_elevation_at(&self, fx: f32, fy: f32) -> f32 {
        self.terrain.interpolated_elevation_at(fx, fy)
    }

    pub fn temperature_at(&self, x: usize, y: usize) -> f32 {
        self.terrain.temperature_at(x, y)
    }

    pub fn precipitation_at(&self, x: usize, y: usize) -> f32 {
        self.terrain.precipitation_at(x, y)
    }

    pub fn biome_at(&self, x: usize, y: usize) -> Biome {
        self.terrain.biome_at(x, y)
    }

    pub fn river_at(&self, x: usize, y: usize) -> u16 {
        self.terrain.river_at(x, y)
    }

    pub fn is_sea(&self, fx: f32, fy: f32) -> bool {
        self.terrain.is_sea(fx, fy)
    }

    pub fn surface_normal_at(&self, fx: f32, fy: f32) -> (f32, f32, f32) {
        self.terrain.surface_normal_at(fx, fy, self.config.normal_height_scale)
    }

    pub fn cloud_at(&self, x: usize, y: usize) -> f32 {
        self.clouds.cloud_at(x, y)
    }
}
