use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use terrain_generator::config::WorldConfig;
use terrain_generator::error::WorldError;
use terrain_generator::export;
use terrain_generator::world::WorldGenerator;

/// Seconds per cloud frame
const CLOUD_FRAME_DT: f32 = 1.0 / 30.0;

#[derive(Parser, Debug)]
#[command(name = "terrain_generator")]
#[command(about = "Generate procedural terrain with rivers, erosion, climate and biomes")]
struct Args {
    /// Width of the grid in cells
    #[arg(short = 'W', long)]
    width: Option<usize>,

    /// Height of the grid in cells
    #[arg(short = 'H', long)]
    height: Option<usize>,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Target land fraction in (0, 1)
    #[arg(short, long)]
    land: Option<f32>,

    /// JSON config file; command line values override it
    #[arg(short, long)]
    config: Option<String>,

    /// Export the generated world as JSON (e.g., "world.json")
    #[arg(short, long)]
    export: Option<String>,

    /// Number of cloud frames to simulate after generation
    #[arg(long, default_value = "0")]
    cloud_frames: usize,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn build_config(args: &Args) -> Result<WorldConfig, WorldError> {
    let mut config = match &args.config {
        Some(path) => WorldConfig::from_json_file(path)?,
        None => WorldConfig::default(),
    };
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(land) = args.land {
        config.target_land_fraction = land;
    }
    Ok(config)
}

fn run(args: &Args) -> Result<(), WorldError> {
    let config = build_config(args)?;
    let mut world = WorldGenerator::new(config)?;

    let seed = args.seed.unwrap_or_else(rand::random);
    println!("Generating world with seed: {}", seed);
    let stats = world.generate(seed).clone();

    println!("Map size: {}x{}", world.config().width, world.config().height);
    println!(
        "Land: {:.1}% after leveling, {:.1}% after erosion (water level {:.3})",
        stats.leveled_land_fraction * 100.0,
        stats.final_land_fraction * 100.0,
        stats.natural_water_level
    );
    println!(
        "Rivers: {} systems, {} cells, {} joins",
        stats.river_systems, stats.river_cells, stats.river_joins
    );
    println!("Erosion complete:");
    println!("  Total eroded: {:.3} units", stats.total_eroded);
    println!("  Total deposited: {:.3} units", stats.total_deposited);
    println!(
        "Temperature range: {:.1}°C to {:.1}°C",
        stats.min_temperature, stats.max_temperature
    );

    let total = world.config().cell_count() as f64;
    println!("Biomes:");
    for (biome, count) in &stats.biome_counts {
        println!("  {:<22} {:>6.2}%", biome.name(), 100.0 * *count as f64 / total);
    }

    let (cx, cy) = (world.config().width / 2, world.config().height / 2);
    let tile = world.terrain().tile_info(cx, cy);
    println!(
        "Center tile ({}, {}): {} | {} | {} | {} | elevation {:.3}",
        cx,
        cy,
        tile.biome,
        tile.surface_str(),
        tile.temperature_str(),
        tile.precipitation_str(),
        tile.elevation
    );

    if args.cloud_frames > 0 {
        let mut scrolled = 0;
        for _ in 0..args.cloud_frames {
            scrolled += world.update_clouds(CLOUD_FRAME_DT);
        }
        let cover = world.clouds().cover().as_slice();
        let mean = cover.iter().map(|&c| c as f64).sum::<f64>() / cover.len().max(1) as f64;
        println!(
            "Clouds: {} frames, {} columns scrolled, mean cover {:.2}",
            args.cloud_frames, scrolled, mean
        );
    }

    if let Some(path) = &args.export {
        export::export_world_json(&world, path)?;
        println!("Exported world to {}", path);
    }

    Ok(())
}
