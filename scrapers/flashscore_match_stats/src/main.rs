use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use flashscore_match_stats::{
    config::{ScraperConfig, TrainingConfig},
    league::League,
    links,
    pipeline::{self, LeaguePaths},
    training::TrainingReport,
};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Collect match links from a league's season listings
    Links {
        #[arg(short, long)]
        league: String,
        /// First season, by starting year
        #[arg(long)]
        from: i32,
        /// Last season, by starting year
        #[arg(long)]
        to: i32,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Extract scores and statistics for every collected link
    Extract {
        #[arg(short, long)]
        league: String,
        /// Link table to read instead of the league's links.csv
        #[arg(long)]
        links: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Number of browser workers
        #[arg(short, long)]
        workers: Option<usize>,
        /// Only process the first N links (for testing)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Concatenate raw tables into one
    Merge {
        #[arg(short, long, num_args = 1.., required = true)]
        inputs: Vec<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Drop unused statistics and incomplete rows
    Clean {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Convert a cleaned table into model features plus outcome
    Prepare {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Train the outcome classifier on a model-ready table
    Train {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        epochs: Option<usize>,
    },
    /// Run every stage for one league
    Run {
        #[arg(short, long)]
        league: String,
        #[arg(long)]
        from: i32,
        #[arg(long)]
        to: i32,
        #[arg(short, long)]
        workers: Option<usize>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(short, long)]
        epochs: Option<usize>,
    },
}

fn training_config(epochs: Option<usize>) -> TrainingConfig {
    let mut config = TrainingConfig::default();
    if let Some(epochs) = epochs {
        config.epochs = epochs;
    }
    config
}

fn log_report(report: &TrainingReport) {
    info!(
        "Trained on {} rows, tested on {}: best accuracy {:.4} at epoch {}",
        report.train_rows, report.test_rows, report.best_accuracy, report.best_epoch
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = ScraperConfig::from_env();

    match cli.command {
        Commands::Links { league, from, to, output } => {
            if from > to {
                bail!("--from {} is after --to {}", from, to);
            }
            let league = League::find(&league)?;
            let output = output.unwrap_or_else(|| LeaguePaths::new(&config, league.key).links);
            let links = pipeline::collect_links(league, from, to, &config).await?;
            links::write_links(&output, &links)?;
        }
        Commands::Extract { league, links: links_path, output, workers, limit } => {
            let league = League::find(&league)?;
            let paths = LeaguePaths::new(&config, league.key);
            let links = links::read_links(links_path.as_deref().unwrap_or(paths.links.as_path()))?;
            let links = pipeline::processing_order(links, limit);

            let (records, summary) =
                pipeline::extract_records(links, workers.unwrap_or(config.workers), &config).await?;
            let output = output.unwrap_or(paths.raw);
            pipeline::write_raw(&records, &summary, &output, &output.with_extension("summary.json"))?;
        }
        Commands::Merge { inputs, output } => {
            pipeline::merge_files(&inputs, &output)?;
        }
        Commands::Clean { input, output } => {
            pipeline::clean_file(&input, &output)?;
        }
        Commands::Prepare { input, output } => {
            pipeline::prepare_file(&input, &output)?;
        }
        Commands::Train { input, epochs } => {
            let report = pipeline::train_file(&input, &training_config(epochs))?;
            log_report(&report);
        }
        Commands::Run { league, from, to, workers, limit, epochs } => {
            if from > to {
                bail!("--from {} is after --to {}", from, to);
            }
            let league = League::find(&league)?;
            let paths = LeaguePaths::new(&config, league.key);

            let links = pipeline::collect_links(league, from, to, &config).await?;
            links::write_links(&paths.links, &links)?;

            let links = pipeline::processing_order(links, limit);
            let (records, summary) =
                pipeline::extract_records(links, workers.unwrap_or(config.workers), &config).await?;
            pipeline::write_raw(&records, &summary, &paths.raw, &paths.summary)?;

            pipeline::clean_file(&paths.raw, &paths.cleaned)?;
            pipeline::prepare_file(&paths.cleaned, &paths.model_ready)?;
            let report = pipeline::train_file(&paths.model_ready, &training_config(epochs))?;
            log_report(&report);
        }
    }

    Ok(())
}
