//! Snowball CLI - Command-line interface
//!
//! Usage:
//!   snowball run --config <file> --seeds <file> --sentences <file>
//!   snowball check-config --config <file> [--seeds <file>]

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use snowball_bootstrap::{Bootstrap, BootstrapReport};
use snowball_core::{LoggingConfig, SeedFile, SnowballConfig};
use snowball_extractor::{ArtifactCache, Corpus, InstanceStore, Tokenizer};

#[derive(Parser)]
#[command(name = "snowball")]
#[command(about = "Bootstrapped relation extraction from tagged sentences")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bootstrap and write the extracted relationships
    Run {
        /// Parameter file (.toml, or key=value)
        #[arg(long)]
        config: PathBuf,

        /// Seed file with e1:/e2: type lines and e1;e2 pairs
        #[arg(long)]
        seeds: PathBuf,

        /// Tagged sentences, one per line
        #[arg(long)]
        sentences: PathBuf,

        /// Directory for relationships.txt, patterns.txt and report.json
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Directory for the tf-idf model and instance cache
        #[arg(long, default_value = ".snowball-cache")]
        cache_dir: PathBuf,

        /// Always rebuild the model and instances
        #[arg(long)]
        no_cache: bool,
    },
    /// Parse and validate configuration without running
    CheckConfig {
        #[arg(long)]
        config: PathBuf,

        #[arg(long)]
        seeds: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            seeds,
            sentences,
            output_dir,
            cache_dir,
            no_cache,
        } => {
            let config = load_config(&config)?;
            init_logging(&config.logging);

            let seed_file = SeedFile::from_file(&seeds)
                .with_context(|| format!("loading seeds from {}", seeds.display()))?;
            tracing::info!(
                schema = %seed_file.schema,
                seeds = seed_file.seeds.len(),
                "Loaded seeds"
            );

            let corpus = Corpus::from_file(&sentences)?;
            let cache = (!no_cache).then(|| ArtifactCache::new(cache_dir));
            let store = InstanceStore::load_or_build(
                &corpus,
                &seed_file.schema,
                &config.extraction,
                &Tokenizer::new(),
                cache.as_ref(),
            )?;

            let outcome = Bootstrap::new(config.bootstrap.clone(), store, seed_file.seeds)?
                .run()
                .context("bootstrap aborted")?;

            let report = BootstrapReport::from_outcome(&outcome);
            report.write_to_dir(&output_dir)?;

            println!(
                "{} relationships, {} patterns, {} seeds after {} iterations",
                report.relationships.len(),
                report.patterns.len(),
                report.seeds.len(),
                report.iterations.len()
            );
            println!("Reports written to {}", output_dir.display());
        }
        Commands::CheckConfig { config, seeds } => {
            let config = load_config(&config)?;
            init_logging(&config.logging);

            print!("{}", toml::to_string_pretty(&config)?);

            if let Some(seeds) = seeds {
                let seed_file = SeedFile::from_file(&seeds)
                    .with_context(|| format!("loading seeds from {}", seeds.display()))?;
                println!();
                println!("# relation: {}", seed_file.schema);
                for seed in &seed_file.seeds {
                    println!("# seed: {}", seed);
                }
            }
        }
    }

    Ok(())
}

/// Load the configuration; warnings raised while parsing go to stderr
/// before the configured subscriber exists.
fn load_config(path: &Path) -> anyhow::Result<SnowballConfig> {
    let bootstrap_subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::with_default(bootstrap_subscriber, || SnowballConfig::load(path))
        .with_context(|| format!("loading config from {}", path.display()))
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}
