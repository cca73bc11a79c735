use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf, time::Duration};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BrowserSettings {
    pub chrome_executable: Option<String>,
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            chrome_executable: None,
            headless: true,
            window_width: 1920,
            window_height: 1080,
        }
    }
}

/// Fixed waits inserted after navigations and clicks so the page can render.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Delays {
    pub page_load_ms: u64,
    pub click_ms: u64,
    pub render_ms: u64,
    pub pagination_timeout_secs: u64,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            page_load_ms: 3000,
            click_ms: 1000,
            render_ms: 1000,
            pagination_timeout_secs: 5,
        }
    }
}

impl Delays {
    /// All waits zeroed, used when driving scripted pages.
    pub fn none() -> Self {
        Self {
            page_load_ms: 0,
            click_ms: 0,
            render_ms: 0,
            pagination_timeout_secs: 0,
        }
    }

    pub fn page_load(&self) -> Duration {
        Duration::from_millis(self.page_load_ms)
    }

    pub fn click(&self) -> Duration {
        Duration::from_millis(self.click_ms)
    }

    pub fn render(&self) -> Duration {
        Duration::from_millis(self.render_ms)
    }

    pub fn pagination_timeout(&self) -> Duration {
        Duration::from_secs(self.pagination_timeout_secs)
    }
}

/// Selectors and text markers of the results site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteConfig {
    pub base_url: String,
    pub show_more_selector: String,
    pub match_block_selector: String,
    pub score_wrapper_selector: String,
    pub stat_row_selector: String,
    pub stat_cell_selector: String,
    pub overline_selector: String,
    pub stats_path: String,
    pub first_half_marker: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.flashscore.fr".to_string(),
            show_more_selector: "a.event__more.event__more--static".to_string(),
            match_block_selector: "div.event__match".to_string(),
            score_wrapper_selector: "div.detailScore__wrapper".to_string(),
            stat_row_selector: r#"div[data-testid="wcl-statistics"]"#.to_string(),
            stat_cell_selector: r#"[data-testid="wcl-scores-simpleText-01"]"#.to_string(),
            overline_selector: r#"[data-testid^="wcl-scores-overline"]"#.to_string(),
            stats_path: "/statistiques-du-match/1".to_string(),
            first_half_marker: "mi-temps".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScraperConfig {
    pub browser: BrowserSettings,
    pub delays: Delays,
    pub site: SiteConfig,
    pub workers: usize,
    /// Season that is served from the league's base path, without a year suffix.
    pub latest_season: i32,
    pub output_dir: PathBuf,
}

impl ScraperConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = env::var("CHROME_EXECUTABLE") {
            config.browser.chrome_executable = Some(path);
        }
        if let Some(headless) = parse_var::<bool>("BROWSER_HEADLESS") {
            config.browser.headless = headless;
        }
        if let Some(workers) = parse_var::<usize>("SCRAPER_WORKERS") {
            if workers > 0 {
                config.workers = workers;
            }
        }
        if let Some(ms) = parse_var::<u64>("PAGE_LOAD_DELAY_MS") {
            config.delays.page_load_ms = ms;
        }
        if let Some(ms) = parse_var::<u64>("CLICK_DELAY_MS") {
            config.delays.click_ms = ms;
        }
        if let Some(ms) = parse_var::<u64>("RENDER_DELAY_MS") {
            config.delays.render_ms = ms;
        }
        if let Some(secs) = parse_var::<u64>("PAGINATION_TIMEOUT_SECS") {
            config.delays.pagination_timeout_secs = secs;
        }
        if let Some(year) = parse_var::<i32>("LATEST_SEASON") {
            config.latest_season = year;
        }
        if let Ok(dir) = env::var("OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Ok(base_url) = env::var("SITE_BASE_URL") {
            config.site.base_url = base_url.trim_end_matches('/').to_string();
        }

        config
    }

    /// Directory holding every export for one league.
    pub fn league_dir(&self, league: &str) -> PathBuf {
        self.output_dir.join(league)
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            browser: BrowserSettings::default(),
            delays: Delays::default(),
            site: SiteConfig::default(),
            workers: 4,
            latest_season: 2024,
            output_dir: PathBuf::from("data"),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse::<T>().ok())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingConfig {
    pub hidden_dim: usize,
    pub dropout: f64,
    pub learning_rate: f64,
    pub weight_decay: f32,
    pub epochs: usize,
    pub batch_size: usize,
    pub test_ratio: f64,
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            hidden_dim: 32,
            dropout: 0.5,
            learning_rate: 1e-4,
            weight_decay: 1e-4,
            epochs: 150,
            batch_size: 16,
            test_ratio: 0.2,
            seed: 42,
        }
    }
}
