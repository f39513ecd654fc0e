use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, LevelFilter};
use ppu_tiles::{
    background::{BackgroundConfig, DEFAULT_BACKGROUND_NAME, DEFAULT_MAX_TILES},
    layout::{RESERVED_TILES, TILE_TABLE_LEN},
    manifest::{self, AssetSpec, Manifest},
    palette::QuantizeConfig,
    preview,
    sprite::DEFAULT_SPRITE_NAME,
    Asset,
};

/// Convert PNG art into palette indexed PPU466 tiles emitted as C++ structs
#[derive(Parser, Debug)]
#[command(name = "ppu-tiles", version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Seed for palette clustering
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Also write the log to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert every asset listed in a JSON manifest into one header
    Build {
        manifest: PathBuf,

        /// Header to write, overrides the manifest
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write palette previews of every asset here
        #[arg(long)]
        preview_dir: Option<PathBuf>,
    },
    /// Convert a single sprite, keeping every tile
    Sprite {
        input: PathBuf,

        #[arg(short, long, default_value = DEFAULT_SPRITE_NAME)]
        name: String,

        /// Header to write, stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long)]
        preview_dir: Option<PathBuf>,
    },
    /// Convert a single background, coarsening it to fit the tile budget
    Background {
        input: PathBuf,

        #[arg(short, long, default_value = DEFAULT_BACKGROUND_NAME)]
        name: String,

        /// Most unique tiles the background may use
        #[arg(short, long, default_value_t = DEFAULT_MAX_TILES)]
        max_tiles: usize,

        /// Keep tile columns left to right in the map instead of mirrored
        #[arg(long)]
        no_flip_x: bool,

        /// Header to write, stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long)]
        preview_dir: Option<PathBuf>,
    },
}

fn init_logging(args: &Args) -> Result<()> {
    use simplelog::*;

    let level = if args.verbose {
        LevelFilter::Debug
    } else if args.quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ));
    if let Some(path) = &args.log_file {
        let file = fs::File::create(path)
            .with_context(|| format!("creating log file {}", path.display()))?;
        loggers.push(WriteLogger::new(level, Config::default(), file));
    }
    CombinedLogger::init(loggers).context("installing logger")?;
    return Ok(());
}

fn write_header(header: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, header).with_context(|| format!("writing {}", path.display()))?;
            info!("wrote {}", path.display());
        }
        None => io::stdout().write_all(header.as_bytes())?,
    }
    return Ok(());
}

fn write_previews(dir: Option<&Path>, assets: &[Asset]) -> Result<()> {
    if let Some(dir) = dir {
        for asset in assets {
            preview::write_preview(dir, asset)
                .with_context(|| format!("writing preview of {}", asset.name()))?;
        }
    }
    return Ok(());
}

fn run_single(
    spec: AssetSpec,
    quantize: &QuantizeConfig,
    output: Option<&Path>,
    preview_dir: Option<&Path>,
) -> Result<()> {
    let build = manifest::build(std::slice::from_ref(&spec), quantize)
        .with_context(|| format!("converting {}", spec.path().display()))?;
    write_previews(preview_dir, &build.assets)?;
    return write_header(&build.header, output);
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;
    let mut quantize = QuantizeConfig::default();
    if let Some(seed) = args.seed {
        quantize.seed = seed;
    }

    match args.command {
        Command::Build {
            manifest,
            output,
            preview_dir,
        } => {
            let manifest = Manifest::load(&manifest)
                .with_context(|| format!("loading manifest {}", manifest.display()))?;
            let mut quantize = manifest.quantize_config();
            if let Some(seed) = args.seed {
                quantize.seed = seed;
            }
            let build = manifest::build(&manifest.assets, &quantize)?;
            info!(
                "{} of {} tile table entries used",
                build.table.used(),
                TILE_TABLE_LEN - RESERVED_TILES
            );
            write_previews(preview_dir.as_deref(), &build.assets)?;
            let output = output.unwrap_or(manifest.output);
            write_header(&build.header, Some(&output))?;
        }
        Command::Sprite {
            input,
            name,
            output,
            preview_dir,
        } => {
            let spec = AssetSpec::Sprite {
                path: input,
                struct_name: name,
            };
            run_single(spec, &quantize, output.as_deref(), preview_dir.as_deref())?;
        }
        Command::Background {
            input,
            name,
            max_tiles,
            no_flip_x,
            output,
            preview_dir,
        } => {
            BackgroundConfig::default()
                .with_max_tiles(max_tiles)
                .validate()?;
            let spec = AssetSpec::Background {
                path: input,
                struct_name: name,
                max_tiles: Some(max_tiles),
                flip_x: Some(!no_flip_x),
            };
            run_single(spec, &quantize, output.as_deref(), preview_dir.as_deref())?;
        }
    }
    return Ok(());
}
