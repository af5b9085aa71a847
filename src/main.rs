use std::error::Error;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hex_worldgen::ascii::{self, AsciiMode};
use hex_worldgen::codec;
use hex_worldgen::config::GeneratorConfig;
use hex_worldgen::generation;
use hex_worldgen::noise_field::WrapMode;
use hex_worldgen::persistence::{FileMapStore, MapStore};
use hex_worldgen::service::MapService;

#[derive(Parser, Debug)]
#[command(name = "hex_worldgen")]
#[command(about = "Generate seeded hexagonal terrain maps")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a new map
    Generate {
        /// Width of the map in cells
        #[arg(short = 'W', long)]
        width: Option<u32>,

        /// Height of the map in cells
        #[arg(short = 'H', long)]
        height: Option<u32>,

        /// Seed string (uses a random seed if not specified)
        #[arg(short, long)]
        seed: Option<String>,

        /// JSON generator config; flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Sample a flat plane instead of the seam-free torus
        #[arg(long)]
        plane: bool,

        /// Write the encoded map buffer to this file
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Persist the map to this JSON store, replacing any previous map
        #[arg(long)]
        store: Option<PathBuf>,

        /// Print an ASCII preview
        #[arg(long)]
        ascii: bool,

        /// Preview heights instead of biomes
        #[arg(long)]
        heights: bool,
    },

    /// Decode an encoded map buffer and summarize it
    Inspect {
        /// Encoded map file
        path: PathBuf,

        /// Print an ASCII preview
        #[arg(long)]
        ascii: bool,
    },

    /// Load a stored map and summarize it
    Show {
        /// JSON map store
        #[arg(long)]
        store: PathBuf,

        /// Print an ASCII preview
        #[arg(long)]
        ascii: bool,
    },

    /// Write the stored map's encoded buffer to a file or stdout
    Export {
        /// JSON map store
        #[arg(long)]
        store: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Generate {
            width,
            height,
            seed,
            config,
            plane,
            out,
            store,
            ascii,
            heights,
        } => {
            let mut generator_config = match config {
                Some(path) => GeneratorConfig::from_file(&path)?,
                None => GeneratorConfig::default(),
            };
            if let Some(width) = width {
                generator_config.width = width;
            }
            if let Some(height) = height {
                generator_config.height = height;
            }
            if plane {
                generator_config.wrap = WrapMode::Plane;
            }
            let seed = seed.unwrap_or_else(|| rand::random::<u64>().to_string());

            println!("Generating map with seed: {}", seed);
            println!("Map size: {}x{}", generator_config.width, generator_config.height);

            let generated = generation::generate_map_detailed(&seed, &generator_config)?;
            let report = &generated.report;
            println!("Raw height range: {:.4} to {:.4}", report.raw_min, report.raw_max);
            if report.flat {
                println!("Height field is flat; all cells use the midpoint height");
            }
            println!("Height pass: {:?}, classification pass: {:?}", report.height_pass, report.classify_pass);
            println!("Biomes: {}", report.histogram);

            if let Some(path) = out {
                let bytes = codec::encode(&generated.artifact);
                fs::write(&path, &bytes)?;
                println!("Wrote {} bytes to {}", bytes.len(), path.display());
            }

            if let Some(path) = store {
                let store = FileMapStore::new(path);
                store.save(&generated.artifact)?;
                println!("Saved map to {}", store.path().display());
            }

            if ascii {
                let mode = if heights { AsciiMode::Height } else { AsciiMode::Biome };
                println!("\n{} view:", mode.name());
                print!("{}", ascii::render_ascii_map(&generated.artifact, Some(&generated.heights), mode));
                if mode == AsciiMode::Biome {
                    print!("{}", ascii::biome_legend());
                }
            }
        }

        Command::Inspect { path, ascii } => {
            let bytes = fs::read(&path)?;
            let decoded = codec::decode(&bytes)?;
            let artifact = decoded.into_artifact(String::new());
            println!("{}: {} map, {} bytes", path.display(), artifact.dimensions(), bytes.len());
            println!("Biomes: {}", artifact.biome_histogram());
            if ascii {
                print!("{}", ascii::render_ascii_map(&artifact, None, AsciiMode::Biome));
            }
        }

        Command::Show { store, ascii } => {
            let service = MapService::new(FileMapStore::new(&store));
            let artifact = service.load()?;
            println!("Seed: {}", artifact.seed());
            println!("Map size: {}", artifact.dimensions());
            println!("Biomes: {}", artifact.biome_histogram());
            if ascii {
                print!("{}", ascii::render_ascii_map(&artifact, None, AsciiMode::Biome));
            }
        }

        Command::Export { store, out } => {
            let service = MapService::new(FileMapStore::new(&store));
            service.load()?;
            let encoded = service.encoded_map()?;
            match out {
                Some(path) => {
                    fs::write(&path, &encoded.bytes)?;
                    eprintln!("Wrote {} bytes ({}) to {}", encoded.bytes.len(), encoded.content_type, path.display());
                }
                None => std::io::stdout().write_all(&encoded.bytes)?,
            }
        }
    }

    Ok(())
}
