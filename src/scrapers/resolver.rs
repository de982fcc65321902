use crate::browser::{Browser, BrowserError, Locator, elements_or_empty};
use crate::categories::is_url;
use crate::results::ResolvedCategory;
use crate::scrapers::navigator;
use crate::text;
use std::time::Duration;

/// Maps category labels to category page URLs using the site's home page
#[derive(Debug, Clone)]
pub struct CategoryResolver {
    base_url: String,
    wait: Duration,
}

impl CategoryResolver {
    /// Create a resolver that scans `base_url`, waiting up to `wait` for it to render
    pub fn new(base_url: impl Into<String>, wait: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            wait,
        }
    }

    /// Resolves a label or passes a URL through untouched.
    ///
    /// Every call reloads the home page; nothing is cached between categories.
    /// The error case is reserved for a lost session.
    pub async fn resolve<B: Browser>(
        &self,
        browser: &mut B,
        label: &str,
    ) -> Result<ResolvedCategory, BrowserError> {
        if is_url(label) {
            return Ok(ResolvedCategory {
                label: label.to_string(),
                url: Some(label.to_string()),
            });
        }

        let url = match navigator::open(browser, &self.base_url, self.wait).await {
            Ok(()) => find_link_by_text(browser, label).await?,
            Err(e) if e.is_session_lost() => return Err(e),
            Err(e) => {
                ::log::warn!("Could not load home page {}: {}", self.base_url, e);
                None
            }
        };

        Ok(ResolvedCategory {
            label: label.to_string(),
            url,
        })
    }
}

/// Scans the current page's links in document order and returns the href of
/// the first one whose text contains `label`, ignoring case.
pub async fn find_link_by_text<B: Browser>(
    browser: &mut B,
    label: &str,
) -> Result<Option<String>, BrowserError> {
    let needle = label.trim();
    let anchors = elements_or_empty(browser.find_all(Locator::Tag("a")).await)?;

    for anchor in &anchors {
        let Some(link_text) = browser.text(anchor).await.or_skip()? else {
            continue;
        };
        let link_text = link_text.trim();
        if link_text.is_empty() || !text::contains_ignore_case(link_text, needle) {
            continue;
        }
        if let Some(href) = browser.href(anchor).await.or_skip()? {
            ::log::debug!("Category '{}' matched link '{}' -> {}", label, link_text, href);
            return Ok(Some(href));
        }
    }

    Ok(None)
}
