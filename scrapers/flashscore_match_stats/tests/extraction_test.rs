mod common;

use common::*;
use flashscore_match_stats::{
    error::BrowserError,
    league::League,
    links::crawl_season,
    match_detail::MatchDetailScraper,
    metrics::ExtractionMetrics,
    types::{SeasonLink, StatLine},
    worker_pool::extract_matches,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn scraper() -> (MatchDetailScraper, ExtractionMetrics) {
    let metrics = ExtractionMetrics::new();
    (MatchDetailScraper::new(&test_config(), metrics.clone()), metrics)
}

fn link(href: &str) -> SeasonLink {
    SeasonLink::new("2023-2024", href)
}

#[tokio::test]
async fn test_crawl_season_expands_and_collects() {
    let config = test_config();
    let league = League::find("ligue-1").unwrap();
    let url = league.season_url(&config.site.base_url, 2023, config.latest_season);
    let mut driver = ScriptedDriver::new().with_page(url.clone(), LISTING_PAGE);
    driver.show_more = 2;

    let links = crawl_season(&mut driver, league, 2023, &config).await.unwrap();

    assert_eq!(driver.visited(), vec![url]);
    assert_eq!(driver.show_more, 0);
    assert_eq!(
        links,
        vec![
            link("https://www.flashscore.fr/match/KbS1suSm/#/resume-du-match"),
            link("https://www.flashscore.fr/match/xQ9bUbgl/#/resume-du-match"),
            link("https://www.flashscore.fr/match/8WqhJX5o/#/resume-du-match"),
        ]
    );
}

#[tokio::test]
async fn test_crawl_season_unreachable_listing() {
    let config = test_config();
    let league = League::find("ligue-1").unwrap();
    let mut driver = ScriptedDriver::new();

    assert!(crawl_season(&mut driver, league, 2019, &config).await.is_err());
}

#[tokio::test]
async fn test_extract_complete_match() {
    let (scraper, metrics) = scraper();
    let mut driver = ScriptedDriver::new().with_match(MATCH_URL, STATS_PAGE, MATCH_PAGE);

    let record = scraper.extract(&mut driver, &link(MATCH_URL)).await;

    assert_eq!(driver.visited(), vec![stats_url(MATCH_URL), MATCH_URL.to_string()]);
    assert_eq!(record.season, "2023-2024");
    assert_eq!(record.href, MATCH_URL);
    assert_eq!(record.score_home.as_deref(), Some("2"));
    assert_eq!(record.score_away.as_deref(), Some("1"));
    assert_eq!(record.halftime_home.as_deref(), Some("1"));
    assert_eq!(record.halftime_away.as_deref(), Some("0"));
    assert_eq!(record.stats.len(), 14);
    assert_eq!(
        record.stats.get("Possession_de_balle"),
        Some(&StatLine { home: "47%".to_string(), away: "53%".to_string() })
    );
    assert_eq!(
        record.stats.get("Passes"),
        Some(&StatLine { home: "81% (372/459)".to_string(), away: "85% (441/519)".to_string() })
    );
    assert!(record.stats.contains_key("Buts_attendus_(xG)"));

    let summary = metrics.summary();
    assert_eq!(summary.matches_processed, 1);
    assert_eq!(summary.page_failures, 0);
    assert_eq!(summary.missing_scores + summary.missing_stats + summary.missing_halftimes, 0);
}

#[tokio::test]
async fn test_missing_stats_page_keeps_halftime() {
    let (scraper, metrics) = scraper();
    let mut driver = ScriptedDriver::new().with_page(MATCH_URL, MATCH_PAGE);

    let record = scraper.extract(&mut driver, &link(MATCH_URL)).await;

    assert_eq!(record.score_home, None);
    assert_eq!(record.score_away, None);
    assert!(record.stats.is_empty());
    assert_eq!(record.halftime_home.as_deref(), Some("1"));
    assert_eq!(record.halftime_away.as_deref(), Some("0"));

    let summary = metrics.summary();
    assert_eq!(summary.page_failures, 1);
    assert_eq!(summary.missing_scores, 1);
    assert_eq!(summary.missing_stats, 1);
    assert_eq!(summary.missing_halftimes, 0);
}

#[tokio::test]
async fn test_missing_base_page_keeps_statistics() {
    let (scraper, metrics) = scraper();
    let mut driver = ScriptedDriver::new().with_page(stats_url(MATCH_URL), STATS_PAGE);

    let record = scraper.extract(&mut driver, &link(MATCH_URL)).await;

    assert_eq!(record.score_home.as_deref(), Some("2"));
    assert_eq!(record.stats.len(), 14);
    assert_eq!(record.halftime_home, None);
    assert_eq!(record.halftime_away, None);
    assert_eq!(metrics.summary().missing_halftimes, 1);
}

#[tokio::test]
async fn test_statistics_block_absent() {
    let (scraper, metrics) = scraper();
    let empty_stats = r#"<div class="detailScore__wrapper"><span>0</span><span>-</span><span>0</span></div>"#;
    let mut driver = ScriptedDriver::new().with_match(MATCH_URL, empty_stats, MATCH_PAGE_HALFTIME_LABEL);

    let record = scraper.extract(&mut driver, &link(MATCH_URL)).await;

    assert_eq!(record.score_home.as_deref(), Some("0"));
    assert_eq!(record.score_away.as_deref(), Some("0"));
    assert!(record.stats.is_empty());
    assert_eq!(record.halftime_home.as_deref(), Some("0"));
    assert_eq!(record.halftime_away.as_deref(), Some("1"));
    assert_eq!(metrics.summary().missing_stats, 1);
}

#[tokio::test]
async fn test_worker_pool_preserves_input_order() {
    let hrefs: Vec<String> = (0..6)
        .map(|i| format!("https://www.flashscore.fr/match/M{i}/#/resume-du-match"))
        .collect();
    let mut template = ScriptedDriver::new();
    for href in &hrefs {
        template = template.with_match(href, STATS_PAGE, MATCH_PAGE);
    }
    let closed = Arc::clone(&template.closed);

    let metrics = ExtractionMetrics::new();
    let scraper = Arc::new(MatchDetailScraper::new(&test_config(), metrics.clone()));
    let links: Vec<SeasonLink> = hrefs.iter().map(|h| link(h)).collect();

    let records = extract_matches(links, 3, scraper, move |_worker| {
        let driver = template.clone();
        async move { Ok::<_, BrowserError>(driver) }
    })
    .await
    .unwrap();

    assert_eq!(records.iter().map(|r| r.href.clone()).collect::<Vec<_>>(), hrefs);
    assert!(records.iter().all(|r| r.score_home.as_deref() == Some("2")));
    assert_eq!(metrics.summary().matches_processed, 6);
    assert_eq!(*closed.lock().unwrap(), 3);
}

#[tokio::test]
async fn test_worker_pool_session_failure() {
    let metrics = ExtractionMetrics::new();
    let scraper = Arc::new(MatchDetailScraper::new(&test_config(), metrics));

    let result = extract_matches(vec![link(MATCH_URL)], 2, scraper, |_worker| async {
        Err::<ScriptedDriver, _>(BrowserError::Launch("chrome not found".to_string()))
    })
    .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_worker_pool_without_links() {
    let metrics = ExtractionMetrics::new();
    let scraper = Arc::new(MatchDetailScraper::new(&test_config(), metrics));

    let records = extract_matches(Vec::new(), 4, scraper, |_worker| async {
        Ok::<_, BrowserError>(ScriptedDriver::new())
    })
    .await
    .unwrap();

    assert!(records.is_empty());
}
