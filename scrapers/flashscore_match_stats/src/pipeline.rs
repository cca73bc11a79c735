//! Stage orchestration shared by the CLI subcommands.

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{error, info};

use crate::{
    browser::{ChromeSession, PageDriver},
    cleaning,
    config::{ScraperConfig, TrainingConfig},
    league::League,
    links,
    match_detail::MatchDetailScraper,
    metrics::{ExtractionMetrics, ExtractionSummary},
    table,
    training::{self, TrainingReport},
    types::{MatchRecord, SeasonLink},
    worker_pool,
};

pub const LINKS_FILE: &str = "links.csv";
pub const RAW_FILE: &str = "raw_matches.csv";
pub const SUMMARY_FILE: &str = "raw_matches.summary.json";
pub const CLEANED_FILE: &str = "cleaned.csv";
pub const MODEL_READY_FILE: &str = "model_ready.csv";

/// Per-league export locations under the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaguePaths {
    pub links: PathBuf,
    pub raw: PathBuf,
    pub summary: PathBuf,
    pub cleaned: PathBuf,
    pub model_ready: PathBuf,
}

impl LeaguePaths {
    pub fn new(config: &ScraperConfig, league: &str) -> Self {
        let dir = config.league_dir(league);
        Self {
            links: dir.join(LINKS_FILE),
            raw: dir.join(RAW_FILE),
            summary: dir.join(SUMMARY_FILE),
            cleaned: dir.join(CLEANED_FILE),
            model_ready: dir.join(MODEL_READY_FILE),
        }
    }
}

/// Crawls the league's listing pages for `from..=to` with one browser.
pub async fn collect_links(league: &League, from: i32, to: i32, config: &ScraperConfig) -> Result<Vec<SeasonLink>> {
    let mut session = ChromeSession::launch(&config.browser)
        .await
        .context("Failed to launch browser for link collection")?;

    let links = links::crawl_seasons(&mut session, league, from, to, config).await;

    if let Err(e) = session.close().await {
        error!("Failed to close browser: {}", e);
    }
    info!("Collected {} links for {} ({}..={})", links.len(), league.key, from, to);
    Ok(links)
}

/// Oldest listing entry first, optionally truncated.
pub fn processing_order(mut links: Vec<SeasonLink>, limit: Option<usize>) -> Vec<SeasonLink> {
    links.reverse();
    if let Some(limit) = limit {
        links.truncate(limit);
    }
    links
}

/// Extracts every link with a pool of Chrome sessions.
pub async fn extract_records(
    links: Vec<SeasonLink>,
    workers: usize,
    config: &ScraperConfig,
) -> Result<(Vec<MatchRecord>, ExtractionSummary)> {
    let metrics = ExtractionMetrics::new();
    let scraper = Arc::new(MatchDetailScraper::new(config, metrics.clone()));
    let settings = config.browser.clone();

    let records = worker_pool::extract_matches(links, workers, scraper, move |worker| {
        let settings = settings.clone();
        async move {
            info!("Worker {} launching browser", worker);
            ChromeSession::launch(&settings).await
        }
    })
    .await?;

    metrics.finish();
    Ok((records, metrics.summary()))
}

/// Writes the raw table and its extraction summary.
pub fn write_raw(records: &[MatchRecord], summary: &ExtractionSummary, table_path: &Path, summary_path: &Path) -> Result<()> {
    let mut frame = table::from_match_records(records).context("Failed to build raw table")?;
    table::write_csv(&mut frame, table_path).with_context(|| format!("Failed to write {}", table_path.display()))?;
    info!(
        "Wrote {} records with {} columns to {}",
        frame.height(),
        frame.width(),
        table_path.display()
    );

    summary
        .write_json(summary_path)
        .with_context(|| format!("Failed to write {}", summary_path.display()))?;
    info!(
        "Extraction summary: {} processed, {} page failures, {} missing scores, {} missing stats, {} missing halftimes",
        summary.matches_processed,
        summary.page_failures,
        summary.missing_scores,
        summary.missing_stats,
        summary.missing_halftimes
    );
    Ok(())
}

fn read_table(path: &Path) -> Result<DataFrame> {
    table::read_csv(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn write_table(frame: &mut DataFrame, path: &Path) -> Result<()> {
    table::write_csv(frame, path).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {} rows to {}", frame.height(), path.display());
    Ok(())
}

/// Row-wise outer union of several raw tables.
pub fn merge_files(inputs: &[PathBuf], output: &Path) -> Result<DataFrame> {
    let frames = inputs.iter().map(|p| read_table(p)).collect::<Result<Vec<_>>>()?;
    let mut merged = table::concat(frames).context("Failed to merge raw tables")?;
    write_table(&mut merged, output)?;
    Ok(merged)
}

pub fn clean_file(input: &Path, output: &Path) -> Result<DataFrame> {
    let mut cleaned = cleaning::clean(read_table(input)?).with_context(|| format!("Failed to clean {}", input.display()))?;
    write_table(&mut cleaned, output)?;
    Ok(cleaned)
}

pub fn prepare_file(input: &Path, output: &Path) -> Result<DataFrame> {
    let mut ready = cleaning::model_ready(read_table(input)?)
        .with_context(|| format!("{} lacks model feature columns", input.display()))?;
    write_table(&mut ready, output)?;
    Ok(ready)
}

pub fn train_file(input: &Path, config: &TrainingConfig) -> Result<TrainingReport> {
    let frame = read_table(input)?;
    let report = training::train_classifier(&frame, config)
        .with_context(|| format!("Training on {} failed", input.display()))?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(n: usize) -> SeasonLink {
        SeasonLink::new("2024-2025", format!("https://www.flashscore.fr/match/{n}/"))
    }

    #[test]
    fn test_processing_order_reverses_then_limits() {
        let ordered = processing_order(vec![link(1), link(2), link(3)], Some(2));
        assert_eq!(ordered, vec![link(3), link(2)]);
        assert_eq!(processing_order(vec![link(1), link(2)], None), vec![link(2), link(1)]);
    }

    #[test]
    fn test_league_paths() {
        let paths = LeaguePaths::new(&ScraperConfig::default(), "serie-a");
        assert_eq!(paths.links, PathBuf::from("data/serie-a/links.csv"));
        assert_eq!(paths.summary, PathBuf::from("data/serie-a/raw_matches.summary.json"));
        assert_eq!(paths.model_ready, PathBuf::from("data/serie-a/model_ready.csv"));
    }
}
