use anyhow::{Context, Result};
use scraper::Html;
use std::path::Path;
use tracing::{info, warn};

use crate::{
    browser::PageDriver,
    config::{ScraperConfig, SiteConfig},
    error::ExtractError,
    league::{season_label, League},
    pagination::expand_results,
    types::SeasonLink,
    utils,
};

/// Every anchor inside every match block of a rendered listing page.
///
/// Anchors are not filtered by purpose and duplicates are kept.
pub fn collect_links(html: &str, season: &str, site: &SiteConfig) -> Result<Vec<SeasonLink>, ExtractError> {
    let document = Html::parse_document(html);
    let block_selector = utils::selector(&site.match_block_selector)?;
    let anchor_selector = utils::selector("a")?;

    let mut links = Vec::new();
    for block in document.select(&block_selector) {
        for anchor in block.select(&anchor_selector) {
            let href = match anchor.value().attr("href") {
                Some(href) if !href.trim().is_empty() => href.trim(),
                _ => continue,
            };
            links.push(SeasonLink::new(season, utils::absolute_url(&site.base_url, href)));
        }
    }

    Ok(links)
}

/// Loads one season's listing, expands it fully and collects its links.
pub async fn crawl_season<D: PageDriver + ?Sized>(
    driver: &mut D,
    league: &League,
    year: i32,
    config: &ScraperConfig,
) -> Result<Vec<SeasonLink>, ExtractError> {
    let season = season_label(year);
    let url = league.season_url(&config.site.base_url, year, config.latest_season);
    info!("Loading season {} ({})", season, url);

    driver.goto(&url).await?;
    tokio::time::sleep(config.delays.page_load()).await;

    let clicks = expand_results(driver, config).await;
    let html = driver.content().await?;
    let links = collect_links(&html, &season, &config.site)?;
    info!("Season {}: {} links after {} 'show more' clicks", season, links.len(), clicks);

    Ok(links)
}

/// Crawls `from..=to` in order. A season that fails to load contributes nothing.
pub async fn crawl_seasons<D: PageDriver + ?Sized>(
    driver: &mut D,
    league: &League,
    from: i32,
    to: i32,
    config: &ScraperConfig,
) -> Vec<SeasonLink> {
    let mut all_links = Vec::new();
    for year in from..=to {
        match crawl_season(driver, league, year, config).await {
            Ok(links) => all_links.extend(links),
            Err(e) => warn!("Skipping season {}: {}", season_label(year), e),
        }
    }
    all_links
}

pub fn write_links(path: &Path, links: &[SeasonLink]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for link in links {
        wtr.serialize(link)?;
    }
    // An empty crawl still gets a header
    if links.is_empty() {
        wtr.write_record(["season", "href"])?;
    }
    wtr.flush()?;
    info!("Wrote {} links to {}", links.len(), path.display());
    Ok(())
}

pub fn read_links(path: &Path) -> Result<Vec<SeasonLink>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open link table {}", path.display()))?;
    let mut links = Vec::new();
    for result in rdr.deserialize() {
        let link: SeasonLink = result.with_context(|| format!("Malformed row in {}", path.display()))?;
        links.push(link);
    }
    Ok(links)
}
