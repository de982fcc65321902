use crate::browser::{Browser, BrowserError, Locator, Lookup};
use crate::scrapers::navigator;
use crate::text;
use std::time::Duration;

/// Pulls a short lead paragraph from an article page
#[derive(Debug, Clone)]
pub struct SummaryFetcher {
    wait: Duration,
    selectors: Vec<String>,
    max_chars: usize,
}

impl SummaryFetcher {
    /// Create a fetcher trying `selectors` in order
    pub fn new(wait: Duration, selectors: Vec<String>, max_chars: usize) -> Self {
        Self {
            wait,
            selectors,
            max_chars,
        }
    }

    /// Loads `url` and returns the first line of the first non-empty match
    /// among the selectors, cut to `max_chars` characters.
    ///
    /// `None` when the page cannot be loaded or no selector yields text.
    pub async fn fetch<B: Browser>(
        &self,
        browser: &mut B,
        url: &str,
    ) -> Result<Option<String>, BrowserError> {
        match navigator::open(browser, url, self.wait).await {
            Ok(()) => {}
            Err(e) if e.is_session_lost() => return Err(e),
            Err(e) => {
                ::log::warn!("Could not load article {}: {}", url, e);
                return Ok(None);
            }
        }

        for selector in &self.selectors {
            let element = match browser.find_first(Locator::Css(selector)).await {
                Lookup::Found(element) => element,
                Lookup::NotFound => continue,
                Lookup::Error(e) if e.is_session_lost() => return Err(e),
                Lookup::Error(e) => {
                    ::log::debug!("Selector `{}` failed on {}: {}", selector, url, e);
                    continue;
                }
            };

            let Some(content) = browser.text(&element).await.or_skip()? else {
                continue;
            };
            if let Some(snippet) = text::snippet(&content, self.max_chars) {
                return Ok(Some(snippet));
            }
        }

        ::log::debug!("No summary text found on {}", url);
        Ok(None)
    }
}
