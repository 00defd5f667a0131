use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use image::{GrayImage, RgbaImage};
use terrain_shade_core::{generate, GenerationConfig, HeightMode, Palette, ShadowPolicy, TerrainMaps};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Headless terrain generator that writes the shaded map to a PNG
#[derive(Parser, Debug)]
#[command(name = "terrain-shade-demo")]
#[command(about = "Procedural terrain generation and shading demo", long_about = None)]
struct Args {
    /// TOML configuration file; command-line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Map side length in cells
    #[arg(short, long)]
    size: Option<usize>,

    /// Noise seed
    #[arg(long)]
    seed: Option<u32>,

    /// Pick a random seed (overrides --seed)
    #[arg(long)]
    random_seed: bool,

    /// Number of bands processed in parallel
    #[arg(short, long)]
    bands: Option<usize>,

    /// Sun elevation in degrees
    #[arg(long)]
    sun_angle: Option<f64>,

    /// Rescale heights to [-1, 1]
    #[arg(short, long)]
    normalize: bool,

    /// Raymarch every cell instead of skipping cells that rise into the light
    #[arg(short, long)]
    exhaustive: bool,

    /// Fade low, poorly lit cells into sky blue
    #[arg(short, long)]
    fog: bool,

    /// White relief palette showing only lighting and shadow
    #[arg(short, long)]
    relief: bool,

    /// Output PNG for the shaded map
    #[arg(short, long, default_value = "terrain.png")]
    output: PathBuf,

    /// Optional grayscale PNG of the shadow field
    #[arg(long)]
    shadow_map: Option<PathBuf>,
}

impl Args {
    fn build_config(&self) -> Result<GenerationConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => GenerationConfig::load_from_file(path)?,
            None => GenerationConfig {
                map_size: 1024,
                ..GenerationConfig::default()
            },
        };

        if let Some(size) = self.size {
            config.map_size = size;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.random_seed {
            config.seed = rand::random();
        }
        if let Some(bands) = self.bands {
            config.bands = bands;
        }
        if let Some(angle) = self.sun_angle {
            config.sun_angle_degrees = angle;
        }
        if self.normalize {
            config.height_mode = HeightMode::Normalized;
        }
        if self.exhaustive {
            config.shadow.policy = ShadowPolicy::Exhaustive;
        }
        if self.fog {
            config.shading.fog = true;
            config.shadow.trace_light_rays = true;
        }
        if self.relief {
            config.shading.palette = Palette::Relief;
        }

        config.validate()?;
        Ok(config)
    }
}

fn report(maps: &TerrainMaps) {
    let stats = &maps.stats;
    let cells = (stats.size * stats.size) as f64;

    println!("\n=== Band Timings ===");
    for band in &stats.bands {
        println!(
            "Band {:>2}: rows {:>5}..{:<5} height {:>8.2} ms, shade {:>8.2} ms",
            band.band,
            band.first_row,
            band.first_row + band.rows,
            band.height_ms,
            band.shade_ms
        );
    }
    if let Some(slowest) = stats.slowest_band() {
        println!("Slowest band: {} ({:.2} ms)", slowest.band, slowest.total_ms());
    }

    println!("\n=== Terrain ===");
    println!(
        "Heights: {:.3} to {:.3}",
        stats.height_range.min, stats.height_range.max
    );
    println!(
        "Water: {:.1}%, shadowed: {:.1}%, penumbra: {:.1}%",
        stats.water_cells as f64 / cells * 100.0,
        stats.shadowed_cells as f64 / cells * 100.0,
        stats.penumbra_cells as f64 / cells * 100.0
    );
    println!("Total: {:.2} ms", stats.total_ms);
}

fn write_png(maps: &TerrainMaps, args: &Args) -> Result<(), Box<dyn Error>> {
    let side = u32::try_from(maps.size())?;

    let pixels: Vec<u8> = maps
        .colors
        .as_slice()
        .iter()
        .flat_map(|c| c.to_rgba8())
        .collect();
    let image = RgbaImage::from_raw(side, side, pixels).ok_or("color buffer does not match map size")?;
    image.save(&args.output)?;
    info!("Wrote {}", args.output.display());

    if let Some(path) = &args.shadow_map {
        let shadow: Vec<u8> = maps
            .shadows
            .as_slice()
            .iter()
            .map(|s| ((1.0 - s) * 255.0).round() as u8)
            .collect();
        let image = GrayImage::from_raw(side, side, shadow).ok_or("shadow field does not match map size")?;
        image.save(path)?;
        info!("Wrote {}", path.display());
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = args.build_config()?;

    println!("=== Terrain Shading Demo ===\n");
    println!(
        "Map: {}x{} cells, seed {}, {:?} noise, {} octaves",
        config.map_size, config.map_size, config.seed, config.noise, config.octaves
    );
    println!(
        "Sun: {:.1} deg, bands: {}, shadows: {:?}",
        config.sun_angle_degrees, config.bands, config.shadow.policy
    );

    let maps = generate(&config)?;
    report(&maps);
    write_png(&maps, &args)?;

    Ok(())
}
