//! mutant CLI: classify DNA grids, inspect statistics, run the service
//!
//! Commands:
//!   mutant check <rows...>  classify one grid (cached in the store)
//!   mutant stats            print verdict counts and ratio
//!   mutant serve            start the JSON-lines TCP service
//!   mutant demo             classify a batch of random grids

use clap::{Parser, Subcommand};
use mutant_core::dna::{scan, Direction};
use mutant_core::{Classifier, Grid, Outcome, ServiceConfig, StoreConfig};
use mutant_core::network::Server;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "mutant", version, about = "Mutant DNA detector")]
struct Cli {
    #[arg(long, global = true, help = "Journal file holding classification records")]
    store: Option<PathBuf>,
    #[arg(long, global = true, conflicts_with = "store", help = "Keep records in memory only")]
    memory: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify a grid given as one argument per row
    Check {
        rows: Vec<String>,
        #[arg(long, help = "List every run of four found in the grid")]
        explain: bool,
    },
    /// Print statistics over all classified grids
    Stats,
    /// Run the network service until Ctrl+C
    Serve {
        #[arg(long, help = "Address to listen on (overrides MUTANT_LISTEN)")]
        listen: Option<String>,
    },
    /// Classify random grids and print the resulting statistics
    Demo {
        #[arg(long, default_value_t = 6)]
        size: usize,
        #[arg(long, default_value_t = 100)]
        count: usize,
        #[arg(long, help = "Seed for reproducible grids")]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    let mut config = ServiceConfig::from_env();
    if cli.memory {
        config.store = StoreConfig::Memory;
    } else if let Some(path) = cli.store {
        config.store = StoreConfig::Journal { path };
    }

    match cli.command {
        Commands::Check { rows, explain } => cmd_check(&config, &rows, explain),
        Commands::Stats => cmd_stats(&config),
        Commands::Serve { listen } => {
            if let Some(listen) = listen {
                config.listen = listen;
            }
            cmd_serve(&config).await
        }
        Commands::Demo { size, count, seed } => cmd_demo(&config, size, count, seed),
    }
}

/// Open the configured store and build a classifier on it
fn load_classifier(config: &ServiceConfig) -> Result<Classifier, Box<dyn Error>> {
    let store = config.open_store()?;
    Ok(Classifier::new(store)?)
}

fn direction_label(direction: Direction) -> &'static str {
    match direction {
        Direction::Horizontal => "horizontal",
        Direction::Vertical => "vertical",
        Direction::DiagonalDown => "diagonal down",
        Direction::DiagonalUp => "diagonal up",
    }
}

fn cmd_check(config: &ServiceConfig, rows: &[String], explain: bool) -> Result<(), Box<dyn Error>> {
    let classifier = load_classifier(config)?;
    let raw: Vec<Option<&str>> = rows.iter().map(|r| Some(r.as_str())).collect();
    let outcome = classifier.analyze(&raw)?;

    match &outcome {
        Outcome::Mutant => println!("\n  MUTANT (status {})", outcome.status()),
        Outcome::NonMutant => println!("\n  NON_MUTANT (status {})", outcome.status()),
        Outcome::Invalid(e) => println!("\n  INVALID_INPUT (status {}): {}", outcome.status(), e),
    }

    if explain {
        if let Ok(grid) = Grid::parse(rows) {
            println!("  Fingerprint: {}", classifier.fingerprint(&grid));
            let runs = scan(&grid, None);
            println!("  Runs found: {}", runs.len());
            for run in runs {
                println!(
                    "    {} x4 {} starting at row {}, col {}",
                    run.base,
                    direction_label(run.direction),
                    run.row,
                    run.col
                );
            }
        }
    }
    Ok(())
}

fn cmd_stats(config: &ServiceConfig) -> Result<(), Box<dyn Error>> {
    let classifier = load_classifier(config)?;
    let stats = classifier.stats()?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

async fn cmd_serve(config: &ServiceConfig) -> Result<(), Box<dyn Error>> {
    let classifier = Arc::new(load_classifier(config)?);
    let server = Server::bind(&config.listen, classifier).await?;

    println!("\n  Mutant detector listening on {}", server.local_addr()?);
    println!("  Press Ctrl+C to stop.\n");

    server
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for Ctrl+C: {}", e);
            }
        })
        .await?;

    println!("\n  Goodbye!");
    Ok(())
}

fn cmd_demo(
    config: &ServiceConfig,
    size: usize,
    count: usize,
    seed: Option<u64>,
) -> Result<(), Box<dyn Error>> {
    let classifier = load_classifier(config)?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    println!("\n  Classifying {} random {}x{} grids...", count, size, size);
    println!("  {}", "-".repeat(50));
    let mut mutants = 0;
    for _ in 0..count {
        let grid = Grid::random(size, &mut rng);
        if classifier.classify(&grid)? {
            mutants += 1;
        }
    }
    println!("  Mutant verdicts this run: {}/{}", mutants, count);

    let stats = classifier.stats()?;
    println!("\n  Statistics");
    println!("  {}", "=".repeat(40));
    println!("  Mutant DNA:  {}", stats.count_mutant_dna);
    println!("  Human DNA:   {}", stats.count_human_dna);
    println!("  Ratio:       {:.4}", stats.ratio);
    Ok(())
}
