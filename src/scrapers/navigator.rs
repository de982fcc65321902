use crate::browser::{Browser, BrowserError, Locator};
use std::time::Duration;

/// Readiness signal: the document has a body
const READY: Locator<'static> = Locator::Tag("body");

/// Loads `url` and waits up to `wait` for the page to start rendering.
///
/// Only navigation itself can fail. A readiness timeout, or any other error
/// while waiting, is logged and the caller proceeds with whatever rendered.
pub async fn open<B: Browser>(
    browser: &mut B,
    url: &str,
    wait: Duration,
) -> Result<(), BrowserError> {
    browser.goto(url).await?;

    match browser.wait_for(READY, wait).await {
        Ok(()) => {}
        Err(e) if e.is_session_lost() => return Err(e),
        Err(BrowserError::Timeout(..)) => {
            ::log::debug!("Page {} not ready after {:?}, proceeding anyway", url, wait);
        }
        Err(e) => {
            ::log::debug!("Readiness check failed on {}: {}", url, e);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::FixtureBrowser;

    #[tokio::test]
    async fn test_missing_body_is_not_fatal() {
        // html5ever always synthesizes a body, so use a frameset document
        let mut browser = FixtureBrowser::new().with_page(
            "https://site.example/frames",
            "<html><frameset><frame src=\"a.html\"></frameset></html>",
        );
        let result = open(&mut browser, "https://site.example/frames", Duration::from_millis(1)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_navigation_failure_propagates() {
        let mut browser = FixtureBrowser::new();
        let result = open(&mut browser, "https://site.example/nowhere", Duration::from_secs(1)).await;
        assert!(matches!(result, Err(BrowserError::Navigation { .. })));
    }
}
