//! Moondream Station CLI - release selection and installation checks.
//!
//! Exit codes: `0` success, `1` integrity failure or unknown model
//! revision, `2` usage error (bad arguments, unreadable configuration,
//! missing or malformed expected checksum document).

use anyhow::Context;
use clap::Parser;
use station_core::{HashAlgorithm, Manifest, Station, StationConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const EXIT_INVALID: u8 = 1;
const EXIT_USAGE: u8 = 2;

#[derive(Parser)]
#[command(name = "station")]
#[command(about = "Moondream Station - manifest resolution and installation integrity")]
#[command(version)]
struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug diagnostics on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Generate a checksum document for a directory
    Generate {
        /// Directory to index
        dir: PathBuf,

        /// Write the document here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Additional directory names to skip, on top of the configured set
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        ignore_dirs: Option<Vec<String>>,

        /// Additional file names to skip, on top of the configured set
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        ignore_files: Option<Vec<String>>,

        /// Additional file name suffixes to skip, on top of the configured set
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        ignore_extensions: Option<Vec<String>>,

        /// Hash algorithm: md5 or sha256
        #[arg(long)]
        algorithm: Option<HashAlgorithm>,
    },
    /// Verify a directory against a checksum document
    Verify {
        /// Installed directory
        dir: PathBuf,

        /// Expected checksum document
        expected_json: PathBuf,
    },
    /// Show the latest model and inference client
    Latest {
        /// Manifest URL or local path
        #[arg(long)]
        manifest: Option<String>,

        /// Where a downloaded manifest is cached
        #[arg(long)]
        cache: Option<PathBuf>,
    },
    /// Look a model up by revision
    Model {
        revision: String,

        /// Manifest URL or local path
        #[arg(long)]
        manifest: Option<String>,
    },
    /// Show manifest contents
    Manifest {
        /// Manifest URL or local path
        #[arg(long)]
        manifest: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(EXIT_USAGE)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<StationConfig> {
    match path {
        Some(path) => {
            debug!("Using configuration {}", path.display());
            StationConfig::from_file(path)
                .with_context(|| format!("loading configuration {}", path.display()))
        }
        None => Ok(StationConfig::default()),
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate {
            dir,
            output,
            ignore_dirs,
            ignore_files,
            ignore_extensions,
            algorithm,
        } => {
            if let Some(dirs) = ignore_dirs {
                config.integrity.ignore_dirs.extend(dirs);
            }
            if let Some(files) = ignore_files {
                config.integrity.ignore_files.extend(files);
            }
            if let Some(extensions) = ignore_extensions {
                config.integrity.ignore_extensions.extend(extensions);
            }
            if let Some(algorithm) = algorithm {
                config.integrity.algorithm = algorithm;
            }
            cmd_generate(config, &dir, output.as_deref())
        }
        Commands::Verify { dir, expected_json } => cmd_verify(config, &dir, &expected_json),
        Commands::Latest { manifest, cache } => {
            if let Some(cache) = cache {
                config.manifest.cache_path = cache;
            }
            cmd_latest(with_manifest(config, manifest))
        }
        Commands::Model { revision, manifest } => {
            cmd_model(with_manifest(config, manifest), &revision)
        }
        Commands::Manifest { manifest } => cmd_manifest(with_manifest(config, manifest)),
    }
}

fn with_manifest(mut config: StationConfig, manifest: Option<String>) -> StationConfig {
    if let Some(location) = manifest {
        config.manifest.url = location;
    }
    config
}

fn cmd_generate(config: StationConfig, dir: &Path, output: Option<&Path>) -> anyhow::Result<ExitCode> {
    let station = Station::offline(config);

    match output {
        Some(output) => {
            let index = station.write_checksums(dir, output)?;
            eprintln!("Wrote {} checksums to {}", index.len(), output.display());
        }
        None => {
            let index = station.generate_checksums(dir)?;
            println!("{}", serde_json::to_string_pretty(&index)?);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_verify(config: StationConfig, dir: &Path, expected_json: &Path) -> anyhow::Result<ExitCode> {
    let station = Station::offline(config);
    let result = station.validate_installation(dir, expected_json);

    if let Some(error) = &result.error {
        eprintln!("error: {error}");
        return Ok(ExitCode::from(EXIT_USAGE));
    }

    println!("{}", result.summary());
    if result.valid {
        return Ok(ExitCode::SUCCESS);
    }

    for path in &result.missing {
        println!("missing: {path}");
    }
    for path in &result.mismatched {
        println!("mismatched: {path}");
    }
    Ok(ExitCode::from(EXIT_INVALID))
}

fn open_manifest(config: StationConfig) -> anyhow::Result<Station> {
    let mut station = Station::new(config)?;
    let location = station.config().manifest.url.clone();
    station
        .refresh_manifest()
        .with_context(|| format!("loading manifest from {location}"))?;
    Ok(station)
}

fn cmd_latest(config: StationConfig) -> anyhow::Result<ExitCode> {
    let station = open_manifest(config)?;

    match station.latest_model() {
        Some((revision, model)) => println!("model: {} ({})", model.model_name(), revision),
        None => println!("model: none"),
    }
    match station.latest_inference_client() {
        Some(client) => println!("inference_client: {}", client.version),
        None => println!("inference_client: none"),
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_model(config: StationConfig, revision: &str) -> anyhow::Result<ExitCode> {
    let station = open_manifest(config)?;

    match station.get_model(revision) {
        Some(found) => {
            println!("model_name: {}", found.model_name);
            println!("revision: {}", found.revision);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("Model revision not found: {revision}");
            Ok(ExitCode::from(EXIT_INVALID))
        }
    }
}

fn cmd_manifest(config: StationConfig) -> anyhow::Result<ExitCode> {
    let station = open_manifest(config)?;
    print_manifest(station.manifest());
    Ok(ExitCode::SUCCESS)
}

fn print_manifest(manifest: &Manifest) {
    println!("version: {}", manifest.version());
    println!("date: {}", manifest.date());

    println!("models:");
    for (family, revisions) in manifest.models() {
        let keys: Vec<&str> = revisions.keys().map(String::as_str).collect();
        println!("  {}: {}", family, keys.join(", "));
    }

    println!("inference_clients:");
    for version in manifest.inference_clients().keys() {
        println!("  {version}");
    }

    if !manifest.notes().is_empty() {
        println!("notes:");
        for note in manifest.notes() {
            println!("  - {note}");
        }
    }
}
