use crate::browser::{Browser, BrowserError, Locator, Lookup};
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder};
use serde_json::{Map, Value, json};
use std::time::Duration;

/// Browsers we know how to ask a WebDriver server for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserKind {
    Chrome,
    Firefox,
}

/// Settings for opening a WebDriver session
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub kind: BrowserKind,
    pub headless: bool,
    pub webdriver_url: String,
    pub page_load_timeout: Duration,
}

/// Builds the capabilities map sent with the new-session request
pub fn capabilities(kind: BrowserKind, headless: bool) -> Map<String, Value> {
    let mut caps = Map::new();
    match kind {
        BrowserKind::Chrome => {
            let mut args = Vec::new();
            if headless {
                args.push("--headless=new");
                args.push("--disable-gpu");
            }
            args.push("--no-sandbox");
            args.push("--disable-dev-shm-usage");
            caps.insert("browserName".to_string(), json!("chrome"));
            caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        }
        BrowserKind::Firefox => {
            let args: Vec<&str> = if headless { vec!["-headless"] } else { Vec::new() };
            caps.insert("browserName".to_string(), json!("firefox"));
            caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
        }
    }
    caps
}

/// Default driver endpoints tried when the configured one refuses us
fn fallback_urls(kind: BrowserKind) -> &'static [&'static str] {
    match kind {
        BrowserKind::Chrome => &["http://localhost:9515", "http://127.0.0.1:4444"],
        BrowserKind::Firefox => &["http://127.0.0.1:4444"],
    }
}

/// A live session on a WebDriver server (chromedriver, geckodriver, selenium)
pub struct WebDriverBrowser {
    client: Client,
    closed: bool,
}

impl WebDriverBrowser {
    /// Opens a session, trying the configured URL first and then the driver defaults.
    pub async fn connect(options: &SessionOptions) -> Result<Self, BrowserError> {
        let caps = capabilities(options.kind, options.headless);

        let mut last_error = String::new();
        let mut candidates = vec![options.webdriver_url.as_str()];
        candidates.extend(
            fallback_urls(options.kind)
                .iter()
                .copied()
                .filter(|url| *url != options.webdriver_url),
        );

        for (attempt, url) in candidates.iter().enumerate() {
            if attempt > 0 {
                ::log::info!("Trying fallback WebDriver URL: {}", url);
            }
            match ClientBuilder::native()
                .capabilities(caps.clone())
                .connect(url)
                .await
            {
                Ok(client) => {
                    ::log::debug!("Connected to WebDriver at {}", url);
                    let browser = Self {
                        client,
                        closed: false,
                    };
                    browser.set_page_load_timeout(options.page_load_timeout).await;
                    return Ok(browser);
                }
                Err(e) => {
                    // Only the configured endpoint is worth reporting loudly
                    if attempt == 0 {
                        ::log::error!("Failed to connect to WebDriver at {}: {}", url, e);
                    }
                    last_error = e.to_string();
                }
            }
        }

        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        Err(BrowserError::Connect {
            url: options.webdriver_url.clone(),
            message: last_error,
        })
    }

    async fn set_page_load_timeout(&self, timeout: Duration) {
        let timeouts = TimeoutConfiguration::new(None, Some(timeout), None);
        if let Err(e) = self.client.update_timeouts(timeouts).await {
            ::log::warn!("Could not set page load timeout: {}", e);
        }
    }

    fn ensure_open(&self) -> Result<(), BrowserError> {
        if self.closed {
            return Err(BrowserError::SessionLost(
                "session already closed".to_string(),
            ));
        }
        Ok(())
    }
}

/// Maps a fantoccini command error onto our taxonomy
fn classify(error: CmdError, context: &str) -> BrowserError {
    if error.is_no_such_element() {
        return BrowserError::NoSuchElement(context.to_string());
    }
    if error.is_stale_element_reference() {
        return BrowserError::StaleElement;
    }
    let message = error.to_string();
    if matches!(error, CmdError::Lost(_)) || error.is_invalid_session_id() {
        return BrowserError::SessionLost(message);
    }
    // Some drivers only say so in the message text
    if message.contains("Unable to find session") || message.contains("invalid session id") {
        BrowserError::SessionLost(message)
    } else if message.contains("stale element") {
        BrowserError::StaleElement
    } else {
        BrowserError::Protocol(message)
    }
}

fn to_fantoccini(locator: Locator<'_>) -> fantoccini::Locator<'_> {
    fantoccini::Locator::Css(locator.as_css())
}

#[async_trait]
impl Browser for WebDriverBrowser {
    type Element = Element;

    async fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
        self.ensure_open()?;
        self.client.goto(url).await.map_err(|e| match classify(e, url) {
            lost @ BrowserError::SessionLost(_) => lost,
            other => BrowserError::Navigation {
                url: url.to_string(),
                message: other.to_string(),
            },
        })
    }

    async fn wait_for(
        &mut self,
        locator: Locator<'_>,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        self.ensure_open()?;
        match self
            .client
            .wait()
            .at_most(timeout)
            .for_element(to_fantoccini(locator))
            .await
        {
            Ok(_) => Ok(()),
            Err(CmdError::WaitTimeout) => Err(BrowserError::Timeout(timeout, locator.to_string())),
            Err(e) => Err(classify(e, &locator.to_string())),
        }
    }

    async fn find_all(&mut self, locator: Locator<'_>) -> Result<Vec<Element>, BrowserError> {
        self.ensure_open()?;
        self.client
            .find_all(to_fantoccini(locator))
            .await
            .map_err(|e| classify(e, &locator.to_string()))
    }

    async fn find_first(&mut self, locator: Locator<'_>) -> Lookup<Element> {
        if let Err(e) = self.ensure_open() {
            return Lookup::Error(e);
        }
        Lookup::from_result(
            self.client
                .find(to_fantoccini(locator))
                .await
                .map_err(|e| classify(e, &locator.to_string())),
        )
    }

    async fn find_in(&mut self, scope: &Element, locator: Locator<'_>) -> Lookup<Element> {
        if let Err(e) = self.ensure_open() {
            return Lookup::Error(e);
        }
        Lookup::from_result(
            scope
                .find(to_fantoccini(locator))
                .await
                .map_err(|e| classify(e, &locator.to_string())),
        )
    }

    async fn text(&mut self, element: &Element) -> Lookup<String> {
        if let Err(e) = self.ensure_open() {
            return Lookup::Error(e);
        }
        Lookup::from_result(element.text().await.map_err(|e| classify(e, "element text")))
    }

    async fn href(&mut self, element: &Element) -> Lookup<String> {
        if let Err(e) = self.ensure_open() {
            return Lookup::Error(e);
        }
        // The property, unlike the attribute, is already resolved against the page URL
        match element.prop("href").await {
            Ok(Some(href)) if !href.trim().is_empty() => Lookup::Found(href),
            Ok(_) => Lookup::NotFound,
            Err(e) => Lookup::Error(classify(e, "href")),
        }
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.ensure_open()?;
        self.closed = true;
        self.client
            .clone()
            .close()
            .await
            .map_err(|e| classify(e, "closing session"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chrome_headless_capabilities() {
        let caps = capabilities(BrowserKind::Chrome, true);
        assert_eq!(caps["browserName"], "chrome");
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(args.contains(&json!("--headless=new")));
        assert!(args.contains(&json!("--no-sandbox")));
    }

    #[test]
    fn test_chrome_headed_capabilities() {
        let caps = capabilities(BrowserKind::Chrome, false);
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(!args.contains(&json!("--headless=new")));
        assert!(args.contains(&json!("--disable-dev-shm-usage")));
    }

    #[test]
    fn test_firefox_capabilities() {
        let caps = capabilities(BrowserKind::Firefox, true);
        assert_eq!(caps["browserName"], "firefox");
        assert_eq!(caps["moz:firefoxOptions"]["args"], json!(["-headless"]));

        let caps = capabilities(BrowserKind::Firefox, false);
        assert_eq!(caps["moz:firefoxOptions"]["args"], json!([]));
    }

    #[test]
    fn test_dropped_connection_is_a_lost_session() {
        let error = CmdError::Lost(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ));
        let classified = classify(error, "https://news.example/");
        assert!(classified.is_session_lost());
    }

    #[test]
    fn test_status_codes_classify_without_message_text() {
        use fantoccini::error::{ErrorStatus, WebDriver};

        let error = CmdError::Standard(WebDriver::new(ErrorStatus::InvalidSessionId, "gone"));
        assert!(classify(error, "element text").is_session_lost());

        let error = CmdError::Standard(WebDriver::new(
            ErrorStatus::StaleElementReference,
            "detached",
        ));
        assert!(matches!(
            classify(error, "element text"),
            BrowserError::StaleElement
        ));
    }

    #[test]
    fn test_other_errors_stay_protocol_errors() {
        let error = CmdError::NotJson("<html>".to_string());
        assert!(matches!(
            classify(error, "element text"),
            BrowserError::Protocol(_)
        ));
    }

    #[test]
    fn test_fallbacks_do_not_repeat_per_kind() {
        assert!(fallback_urls(BrowserKind::Chrome).contains(&"http://localhost:9515"));
        assert!(!fallback_urls(BrowserKind::Firefox).contains(&"http://localhost:9515"));
    }
}
