//! Browser automation seam.
//!
//! Crawling code talks to a [`PageDriver`]; the Chrome implementation drives a
//! real browser over CDP with chromiumoxide, tests plug in scripted pages.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::{config::BrowserSettings, error::BrowserError};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[async_trait]
pub trait PageDriver: Send {
    async fn goto(&mut self, url: &str) -> Result<(), BrowserError>;

    /// Polls until an element matching `selector` can receive a click.
    async fn wait_for_clickable(&mut self, selector: &str, timeout: Duration) -> Result<(), BrowserError>;

    async fn scroll_into_view(&mut self, selector: &str) -> Result<(), BrowserError>;

    async fn click(&mut self, selector: &str) -> Result<(), BrowserError>;

    /// Snapshot of the currently rendered DOM.
    async fn content(&mut self) -> Result<String, BrowserError>;

    async fn close(&mut self) -> Result<(), BrowserError> {
        Ok(())
    }
}

/// One Chrome instance with a single tab.
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handle: tokio::task::JoinHandle<()>,
}

impl ChromeSession {
    pub async fn launch(settings: &BrowserSettings) -> Result<Self, BrowserError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(settings.window_width, settings.window_height)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-extensions")
            .arg("--mute-audio");
        if let Some(path) = &settings.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        if !settings.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(BrowserError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        // The CDP handler must be polled for the browser to make progress
        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler error: {}", e);
                }
            }
        });

        let page = browser.new_page("about:blank").await?;
        Ok(Self { browser, page, handle })
    }
}

#[async_trait]
impl PageDriver for ChromeSession {
    async fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
        self.page
            .goto(url)
            .await
            .map(|_| ())
            .map_err(|e| BrowserError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    async fn wait_for_clickable(&mut self, selector: &str, timeout: Duration) -> Result<(), BrowserError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Ok(element) = self.page.find_element(selector).await {
                if element.clickable_point().await.is_ok() {
                    return Ok(());
                }
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::Timeout {
                    selector: selector.to_string(),
                    timeout,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn scroll_into_view(&mut self, selector: &str) -> Result<(), BrowserError> {
        let element = self.page.find_element(selector).await.map_err(|_| BrowserError::ElementNotFound {
            selector: selector.to_string(),
        })?;
        element.scroll_into_view().await?;
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> Result<(), BrowserError> {
        let element = self.page.find_element(selector).await.map_err(|_| BrowserError::ElementNotFound {
            selector: selector.to_string(),
        })?;
        element.click().await?;
        Ok(())
    }

    async fn content(&mut self) -> Result<String, BrowserError> {
        Ok(self.page.content().await?)
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        if let Err(e) = self.browser.close().await {
            warn!("Browser did not close cleanly: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            debug!("Browser process wait failed: {}", e);
        }
        self.handle.abort();
        Ok(())
    }
}
