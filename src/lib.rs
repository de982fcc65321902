pub mod browser;
pub mod categories;
pub mod config;
pub mod output;
pub mod results;
pub mod scrapers;
pub mod text;

// Re-export commonly used types for convenience
pub use browser::{Browser, BrowserError, BrowserKind, SessionOptions};
pub use config::HarvestConfig;
pub use results::OutputRecord;
pub use scrapers::{Aggregator, HarvestReport};

use browser::WebDriverBrowser;

/// Opens a WebDriver session and runs the whole harvest on it.
///
/// Fails only when no session could be opened; failures during the run are
/// reported in `HarvestReport::failure` next to the rows collected so far.
pub async fn harvest(
    config: &HarvestConfig,
    options: &SessionOptions,
    limit: usize,
    categories: &[String],
) -> Result<HarvestReport, BrowserError> {
    ::log::info!(
        "Starting harvest of {} categories from {}",
        categories.len(),
        config.base_url
    );

    let browser = WebDriverBrowser::connect(options).await?;
    let report = Aggregator::new(config)
        .with_limit(limit)
        .run(browser, categories)
        .await;
    Ok(report)
}
