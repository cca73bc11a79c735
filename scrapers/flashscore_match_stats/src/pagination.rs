use tracing::{debug, info};

use crate::{browser::PageDriver, config::ScraperConfig};

/// Clicks the "show more" control until it can no longer be found.
///
/// Any lookup, scroll or click failure ends pagination; it is not retried.
/// Returns the number of successful activations. The accumulated entries stay
/// in the page DOM.
pub async fn expand_results<D: PageDriver + ?Sized>(driver: &mut D, config: &ScraperConfig) -> usize {
    let selector = config.site.show_more_selector.as_str();
    let mut clicks = 0;

    loop {
        if let Err(e) = driver
            .wait_for_clickable(selector, config.delays.pagination_timeout())
            .await
        {
            info!("No more 'show more' control after {} clicks ({})", clicks, e);
            break;
        }

        if let Err(e) = driver.scroll_into_view(selector).await {
            info!("Stopping pagination, control could not be scrolled to: {}", e);
            break;
        }
        tokio::time::sleep(config.delays.click()).await;

        if let Err(e) = driver.click(selector).await {
            info!("Stopping pagination, control could not be clicked: {}", e);
            break;
        }
        tokio::time::sleep(config.delays.click()).await;

        clicks += 1;
        debug!("Clicked 'show more' {} time(s)", clicks);
    }

    clicks
}
