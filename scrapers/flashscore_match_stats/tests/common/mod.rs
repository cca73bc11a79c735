#![allow(dead_code)]

use async_trait::async_trait;
use flashscore_match_stats::{
    browser::PageDriver,
    config::{Delays, ScraperConfig},
    error::BrowserError,
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

pub const LISTING_PAGE: &str = include_str!("../fixtures/listing_page.html");
pub const STATS_PAGE: &str = include_str!("../fixtures/stats_page.html");
pub const MATCH_PAGE: &str = include_str!("../fixtures/match_page.html");
pub const MATCH_PAGE_HALFTIME_LABEL: &str = include_str!("../fixtures/match_page_halftime_label.html");

pub const MATCH_URL: &str = "https://www.flashscore.fr/match/KbS1suSm/#/resume-du-match";

pub fn stats_url(href: &str) -> String {
    format!("{}/statistiques-du-match/1", href)
}

pub fn test_config() -> ScraperConfig {
    ScraperConfig {
        delays: Delays::none(),
        ..ScraperConfig::default()
    }
}

/// Serves canned pages by URL; unknown URLs fail to load.
#[derive(Clone, Default)]
pub struct ScriptedDriver {
    pages: HashMap<String, String>,
    current: Option<String>,
    /// "Show more" clicks left before the control disappears.
    pub show_more: usize,
    pub visited: Arc<Mutex<Vec<String>>>,
    pub closed: Arc<Mutex<usize>>,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, html: &str) -> Self {
        self.pages.insert(url.into(), html.to_string());
        self
    }

    /// Stats and base page of one match.
    pub fn with_match(self, href: &str, stats: &str, base: &str) -> Self {
        self.with_page(stats_url(href), stats).with_page(href, base)
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageDriver for ScriptedDriver {
    async fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
        self.visited.lock().unwrap().push(url.to_string());
        if self.pages.contains_key(url) {
            self.current = Some(url.to_string());
            Ok(())
        } else {
            self.current = None;
            Err(BrowserError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            })
        }
    }

    async fn wait_for_clickable(&mut self, selector: &str, timeout: Duration) -> Result<(), BrowserError> {
        if self.show_more > 0 {
            Ok(())
        } else {
            Err(BrowserError::Timeout {
                selector: selector.to_string(),
                timeout,
            })
        }
    }

    async fn scroll_into_view(&mut self, _selector: &str) -> Result<(), BrowserError> {
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> Result<(), BrowserError> {
        if self.show_more == 0 {
            return Err(BrowserError::ElementNotFound {
                selector: selector.to_string(),
            });
        }
        self.show_more -= 1;
        Ok(())
    }

    async fn content(&mut self) -> Result<String, BrowserError> {
        self.current
            .as_ref()
            .and_then(|url| self.pages.get(url))
            .cloned()
            .ok_or_else(|| BrowserError::ElementNotFound {
                selector: "html".to_string(),
            })
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        *self.closed.lock().unwrap() += 1;
        Ok(())
    }
}
