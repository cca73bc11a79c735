use scraper::Html;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::{
    browser::PageDriver,
    config::{ScraperConfig, SiteConfig},
    error::ExtractError,
    metrics::ExtractionMetrics,
    types::{MatchRecord, SeasonLink, StatLine},
    utils,
};

/// Full-time score from the statistics view: spans 0 and 2 of the score wrapper.
pub fn parse_score(html: &str, site: &SiteConfig) -> Result<(String, String), ExtractError> {
    let document = Html::parse_document(html);
    let wrapper_selector = utils::selector(&site.score_wrapper_selector)?;
    let span_selector = utils::selector("span")?;

    let wrapper = document
        .select(&wrapper_selector)
        .next()
        .ok_or_else(|| ExtractError::NotFound {
            selector: site.score_wrapper_selector.clone(),
        })?;

    let spans: Vec<String> = wrapper.select(&span_selector).map(|s| utils::element_text(&s)).collect();
    if spans.len() < 3 {
        return Err(ExtractError::TooFew {
            selector: format!("{} span", site.score_wrapper_selector),
            expected: 3,
            found: spans.len(),
        });
    }

    Ok((spans[0].clone(), spans[2].clone()))
}

/// Statistic rows keyed by normalized category.
///
/// Rows without the three home/category/away cells are skipped. Errors only
/// when the page has no statistic rows at all.
pub fn parse_statistics(html: &str, site: &SiteConfig) -> Result<BTreeMap<String, StatLine>, ExtractError> {
    let document = Html::parse_document(html);
    let row_selector = utils::selector(&site.stat_row_selector)?;
    let cell_selector = utils::selector(&site.stat_cell_selector)?;

    let mut stats = BTreeMap::new();
    let mut rows = 0;
    for row in document.select(&row_selector) {
        rows += 1;
        let cells: Vec<String> = row.select(&cell_selector).map(|c| utils::element_text(&c)).collect();
        if cells.len() < 3 {
            debug!("Skipping statistic row with {} cells", cells.len());
            continue;
        }
        stats.insert(
            utils::normalize_category(&cells[1]),
            StatLine {
                home: cells[0].clone(),
                away: cells[2].clone(),
            },
        );
    }

    if rows == 0 {
        return Err(ExtractError::NotFound {
            selector: site.stat_row_selector.clone(),
        });
    }
    Ok(stats)
}

/// Halftime score from the overline labels of the base match page.
///
/// The second label normally carries the score. When it is the first-half
/// heading instead and a third label exists, the third one is used. This
/// follows the layouts observed so far, nothing guarantees it.
pub fn parse_halftime(html: &str, site: &SiteConfig) -> Result<(String, String), ExtractError> {
    let document = Html::parse_document(html);
    let overline_selector = utils::selector(&site.overline_selector)?;

    let labels: Vec<String> = document
        .select(&overline_selector)
        .map(|el| utils::element_text(&el))
        .collect();
    if labels.len() < 2 {
        return Err(ExtractError::TooFew {
            selector: site.overline_selector.clone(),
            expected: 2,
            found: labels.len(),
        });
    }

    let marker = site.first_half_marker.to_lowercase();
    let mut candidate = &labels[1];
    if candidate.to_lowercase().contains(&marker) && labels.len() > 2 {
        candidate = &labels[2];
    }

    utils::split_score(candidate).ok_or_else(|| ExtractError::Unparseable(candidate.clone()))
}

pub struct MatchDetailScraper {
    config: ScraperConfig,
    metrics: ExtractionMetrics,
}

impl MatchDetailScraper {
    pub fn new(config: &ScraperConfig, metrics: ExtractionMetrics) -> Self {
        Self {
            config: config.clone(),
            metrics,
        }
    }

    async fn snapshot<D: PageDriver + ?Sized>(&self, driver: &mut D) -> Result<String, ExtractError> {
        tokio::time::sleep(self.config.delays.render()).await;
        Ok(driver.content().await?)
    }

    /// Best-effort record for one link; never fails.
    pub async fn extract<D: PageDriver + ?Sized>(&self, driver: &mut D, link: &SeasonLink) -> MatchRecord {
        let site = &self.config.site;
        let mut record = MatchRecord::empty(link);

        let stats_url = format!("{}{}", link.href, site.stats_path);
        match driver.goto(&stats_url).await {
            Ok(()) => {
                let score = match self.snapshot(driver).await {
                    Ok(html) => parse_score(&html, site),
                    Err(e) => Err(e),
                };
                match score {
                    Ok((home, away)) => {
                        record.score_home = Some(home);
                        record.score_away = Some(away);
                    }
                    Err(e) => {
                        warn!("Score not found for {}: {}", link.href, e);
                        self.metrics.record_missing_score();
                    }
                }

                let stats = match self.snapshot(driver).await {
                    Ok(html) => parse_statistics(&html, site),
                    Err(e) => Err(e),
                };
                match stats {
                    Ok(stats) => record.stats = stats,
                    Err(e) => {
                        warn!("Statistics table not found for {}: {}", link.href, e);
                        self.metrics.record_missing_stats();
                    }
                }
            }
            Err(e) => {
                warn!("Could not load statistics page {}: {}", stats_url, e);
                self.metrics.record_page_failure();
                self.metrics.record_missing_score();
                self.metrics.record_missing_stats();
            }
        }

        let halftime = match driver.goto(&link.href).await {
            Ok(()) => match self.snapshot(driver).await {
                Ok(html) => parse_halftime(&html, site),
                Err(e) => Err(e),
            },
            Err(e) => {
                self.metrics.record_page_failure();
                Err(e.into())
            }
        };
        match halftime {
            Ok((home, away)) => {
                record.halftime_home = Some(home);
                record.halftime_away = Some(away);
            }
            Err(e) => {
                warn!("Halftime score not found for {}: {}", link.href, e);
                self.metrics.record_missing_halftime();
            }
        }

        self.metrics.record_processed();
        record
    }
}
