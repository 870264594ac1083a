//! Headless skirmish prediction runner.
//!
//! Evaluates engagement scenarios without a game client. Reports go to
//! stdout as JSON, logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Evaluate one scenario
//! cargo run -p skirmish_headless -- run --scenario scenarios/choke_assault.ron
//!
//! # Evaluate every scenario in a directory
//! cargo run -p skirmish_headless -- batch --input scenarios --output results/batch.json
//!
//! # List unit types, optionally from another catalog file
//! cargo run -p skirmish_headless -- catalog --catalog my_units.ron
//! ```
//!
//! Set `RUST_LOG=skirmish_core=trace` to see every unit action.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skirmish_core::data::UnitCatalog;
use skirmish_headless::{evaluate, load_catalog, run_batch, BatchConfig, Scenario};

#[derive(Parser)]
#[command(name = "skirmish_headless")]
#[command(about = "Headless combat outcome predictor for scenario files")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Unit catalog RON file (defaults to the built-in catalog)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a single scenario
    Run {
        /// Scenario file to load (built-in example when omitted)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Evaluate every scenario in a directory
    Batch {
        /// Directory of `.ron` scenario files
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for the batch results
        #[arg(short, long, default_value = "results/batch.json")]
        output: PathBuf,

        /// Maximum parallel predictions (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: usize,
    },

    /// List the unit types in the catalog
    Catalog,
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr, stdout is for reports
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let catalog = match load_catalog(cli.catalog.as_deref()) {
        Ok(catalog) => catalog,
        Err(e) => fatal(&format!("Cannot load unit catalog: {e}")),
    };
    tracing::debug!(unit_types = catalog.len(), "Catalog loaded");

    match cli.command {
        Commands::Run { scenario, output } => cmd_run(&catalog, scenario.as_deref(), output.as_deref()),
        Commands::Batch {
            input,
            output,
            parallel,
        } => cmd_batch(&catalog, &input, &output, parallel),
        Commands::Catalog => cmd_catalog(&catalog),
    }
}

fn fatal(message: &str) -> ! {
    tracing::error!("{message}");
    eprintln!("FATAL: {message}");
    std::process::exit(1);
}

/// Evaluate a single scenario
fn cmd_run(catalog: &UnitCatalog, scenario: Option<&Path>, output: Option<&Path>) {
    let scenario = match scenario {
        Some(path) => Scenario::load(path).unwrap_or_else(|e| fatal(&e.to_string())),
        None => Scenario::default(),
    };
    tracing::info!(scenario = %scenario.name, units = scenario.units.len(), "Evaluating scenario");

    let report = evaluate(&scenario, catalog).unwrap_or_else(|e| fatal(&e.to_string()));
    let json = report
        .to_json()
        .unwrap_or_else(|e| fatal(&format!("Cannot encode report: {e}")));

    match output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, json) {
                fatal(&format!("Cannot write '{}': {e}", path.display()));
            }
            tracing::info!(path = %path.display(), "Report written");
        }
        None => println!("{json}"),
    }
}

/// Evaluate a directory of scenarios
fn cmd_batch(catalog: &UnitCatalog, input: &Path, output: &Path, parallel: usize) {
    let config = match BatchConfig::from_dir(input) {
        Ok(config) => config.with_parallel(parallel),
        Err(e) => fatal(&format!("Cannot read scenario directory '{}': {e}", input.display())),
    };
    if config.scenarios.is_empty() {
        fatal(&format!("No .ron scenarios in '{}'", input.display()));
    }

    let results = run_batch(&config, catalog);
    if let Err(e) = results.save(output) {
        fatal(&format!("Failed to save results: {e}"));
    }

    let summary = results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Scenarios evaluated: {}", summary.total);
    eprintln!("  attack:        {}", summary.attack);
    eprintln!("  no result:     {}", summary.no_result);
    eprintln!("  do not attack: {}", summary.do_not_attack);
    if !results.errors.is_empty() {
        eprintln!("Failed: {}", results.errors.len());
        for error in &results.errors {
            eprintln!("  {}: {}", error.path.display(), error.message);
        }
    }
    eprintln!("Results: {}", output.display());
}

/// Print the catalog as a table
fn cmd_catalog(catalog: &UnitCatalog) {
    println!(
        "{:<4} {:<32} {:<8} {:>6} {:>6} {:>6}  {}",
        "id", "name", "race", "hp", "shield", "score", "archetype"
    );
    for unit_type in catalog.iter() {
        let data = &unit_type.data;
        println!(
            "{:<4} {:<32} {:<8} {:>6} {:>6} {:>6}  {:?}",
            unit_type.id.as_u16(),
            data.name,
            data.race.display_name(),
            data.hit_points,
            data.shields,
            data.score(),
            unit_type.archetype,
        );
    }
}
