//! Worldsketch - Entry Point
//!
//! Loads a painted biome map, optionally grows a new one with WFC, runs the
//! map pipeline and saves the results with PNG previews.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;

use worldsketch::data;
use worldsketch::render::export_previews;
use worldsketch::save::{default_dir, MapStore};
use worldsketch::session::{LogProgress, MapSession, WfcSession};
use worldsketch::world::generation::random::scramble_seed;
use worldsketch::world::generation::{
    GenerationParams, NoiseLayer, NoiseVariable, StructureVariable, TunnelClass, TunnelVariable,
};
use worldsketch::world::{BiomeGrid, BiomePalette};

#[derive(Parser, Debug)]
#[command(name = "worldsketch")]
#[command(about = "Generate 2D tile worlds from painted biome maps")]
struct Args {
    /// Painted biome map (PNG) or a saved `<name>.biomes.json` record
    input: Option<PathBuf>,

    /// Generation parameters (RON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Biome palette (RON)
    #[arg(short, long)]
    palette: Option<PathBuf>,

    /// Synthesize a new WIDTHxHEIGHT coarse map with WFC before generating
    #[arg(long, value_name = "WIDTHxHEIGHT")]
    wfc: Option<String>,

    /// Seed for the WFC solver
    #[arg(long)]
    wfc_seed: Option<i64>,

    /// Reseed every layer, tunnel class and the structure pass from one value
    #[arg(short, long)]
    seed: Option<i64>,

    /// Number of back-to-back runs; seeds evolve between runs
    #[arg(short, long, default_value = "1")]
    runs: usize,

    /// Name for saved records and previews
    #[arg(short, long, default_value = "world")]
    name: String,

    /// Output directory (defaults to the user data directory)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Skip writing PNG previews
    #[arg(long)]
    no_previews: bool,

    /// Write the default parameters and palette into this directory and exit
    #[arg(long, value_name = "DIR")]
    export_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Starting Worldsketch v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    if let Some(dir) = &args.export_config {
        data::export_default_params(&dir.join("params.ron"))?;
        data::export_default_palette(&dir.join("palette.ron"))?;
        return Ok(());
    }

    let Some(input) = &args.input else {
        bail!("no input biome map given (see --help)");
    };

    let mut params = match &args.config {
        Some(path) => data::load_params(path),
        None => GenerationParams::default(),
    };
    if let Some(seed) = args.seed {
        reseed(&mut params, seed)?;
    }
    let palette = match &args.palette {
        Some(path) => data::load_palette(path)?,
        None => BiomePalette::default(),
    };

    let store = MapStore::new(args.out.clone().unwrap_or_else(default_dir));
    let mut coarse = load_input(input, &palette)?;

    if let Some(size) = &args.wfc {
        let (width, height) = parse_size(size)?;
        let session = match args.wfc_seed {
            Some(seed) => WfcSession::new(seed),
            None => WfcSession::default(),
        };
        let output = session
            .run(&coarse, width, height, &mut LogProgress)
            .context("WFC session was already running")?;
        if let Some(ruleset) = session.ruleset() {
            store.save_ruleset(&args.name, &ruleset)?;
        }
        log::info!("WFC produced {}x{} map ({} fallback cells)", width, height, output.fallbacks);
        coarse = output.grid;
        store.save_biomes(&format!("{}_wfc", args.name), &coarse)?;
    }

    let session = MapSession::new(params);
    for run in 0..args.runs.max(1) {
        let name = if args.runs > 1 {
            format!("{}_{}", args.name, run)
        } else {
            args.name.clone()
        };
        let output = session
            .run(&coarse, &mut LogProgress)
            .context("map session was already running")?;

        store.save_biomes(&name, &output.tiles.biomes)?;
        store.save_tiles(&name, &output.tiles)?;
        store.save_layers(&name, &output.layers)?;
        if !args.no_previews {
            export_previews(&store.dir().join("previews"), &name, &output, &palette)?;
        }
        log::info!(
            "{}: {}x{} tiles, {} treasure pockets, {} crystal clusters",
            name,
            output.tiles.width(),
            output.tiles.height(),
            output.structures.treasures,
            output.structures.crystal_clusters
        );
    }

    log::info!("Worldsketch finished");
    Ok(())
}

/// Read a PNG through the palette, or a saved biome record
fn load_input(path: &Path, palette: &BiomePalette) -> Result<BiomeGrid> {
    let file_name = path
        .file_name()
        .and_then(|f| f.to_str())
        .context("input path has no file name")?;

    if let Some(name) = file_name.strip_suffix(".biomes.json") {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        return MapStore::new(dir)
            .load_biomes(name)
            .with_context(|| format!("could not load biome record {:?}", path));
    }
    Ok(palette.import_png(path)?)
}

/// Parse `WIDTHxHEIGHT`
fn parse_size(text: &str) -> Result<(usize, usize)> {
    let Some((w, h)) = text.split_once(['x', 'X']) else {
        bail!("expected WIDTHxHEIGHT, got {:?}", text);
    };
    let (w, h): (usize, usize) = (w.trim().parse()?, h.trim().parse()?);
    if w == 0 || h == 0 {
        bail!("WFC output size must be non-zero, got {}x{}", w, h);
    }
    Ok((w, h))
}

/// Derive every seed from one value through the per-slot scramble factors
fn reseed(params: &mut GenerationParams, seed: i64) -> Result<()> {
    for layer in NoiseLayer::ALL {
        params.set_noise(layer, NoiseVariable::Seed, scramble_seed(seed, layer.seed_factor()))?;
    }
    for class in TunnelClass::ALL {
        params.set_tunnel(class, TunnelVariable::Seed, scramble_seed(seed, class.seed_factor()))?;
    }
    params.set_structure(StructureVariable::Seed, seed)?;
    Ok(())
}
