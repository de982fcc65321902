pub mod fixture;
pub mod webdriver;

pub use fixture::FixtureBrowser;
pub use webdriver::{BrowserKind, SessionOptions, WebDriverBrowser};

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// How an element is located on the current page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator<'a> {
    /// Element tag name, e.g. `body` or `a`
    Tag(&'a str),
    /// CSS selector
    Css(&'a str),
}

impl<'a> Locator<'a> {
    /// CSS form of the locator. A bare tag name is already a valid type selector.
    pub fn as_css(&self) -> &'a str {
        match self {
            Locator::Tag(tag) => tag,
            Locator::Css(selector) => selector,
        }
    }
}

impl fmt::Display for Locator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Tag(tag) => write!(f, "<{}>", tag),
            Locator::Css(selector) => write!(f, "`{}`", selector),
        }
    }
}

/// Failures reported by a browser session
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("failed to open a browser session at {url}: {message}")]
    Connect { url: String, message: String },

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("timed out after {0:?} waiting for {1}")]
    Timeout(Duration, String),

    #[error("no element matches {0}")]
    NoSuchElement(String),

    #[error("element is no longer attached to the page")]
    StaleElement,

    #[error("browser session lost: {0}")]
    SessionLost(String),

    #[error("webdriver error: {0}")]
    Protocol(String),
}

impl BrowserError {
    /// A lost session cannot serve any further request, so it ends the run.
    pub fn is_session_lost(&self) -> bool {
        matches!(self, BrowserError::SessionLost(_))
    }
}

/// Outcome of a single DOM read
#[derive(Debug)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    Error(BrowserError),
}

impl<T> Lookup<T> {
    /// Folds a driver result, turning a missing element into `NotFound`.
    pub fn from_result(result: Result<T, BrowserError>) -> Self {
        match result {
            Ok(value) => Lookup::Found(value),
            Err(BrowserError::NoSuchElement(_)) => Lookup::NotFound,
            Err(e) => Lookup::Error(e),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            _ => None,
        }
    }

    /// Collapses the lookup for scan loops: anything but a lost session
    /// becomes `None` so the caller skips the element and moves on.
    pub fn or_skip(self) -> Result<Option<T>, BrowserError> {
        match self {
            Lookup::Found(value) => Ok(Some(value)),
            Lookup::NotFound => Ok(None),
            Lookup::Error(e) if e.is_session_lost() => Err(e),
            Lookup::Error(e) => {
                ::log::debug!("Skipping element after read failure: {}", e);
                Ok(None)
            }
        }
    }
}

/// Minimal browser automation surface used by the scrapers.
///
/// Every call is awaited in sequence on a single session; nothing here is
/// shared between tasks.
#[async_trait]
pub trait Browser: Send {
    /// Handle to an element of the page that was current when it was found
    type Element: Clone + Send + Sync;

    /// Navigate to `url`, bounded by the session's page-load timeout
    async fn goto(&mut self, url: &str) -> Result<(), BrowserError>;

    /// Wait until an element matching `locator` is present, at most `timeout`
    async fn wait_for(&mut self, locator: Locator<'_>, timeout: Duration)
    -> Result<(), BrowserError>;

    /// All matching elements in document order
    async fn find_all(&mut self, locator: Locator<'_>) -> Result<Vec<Self::Element>, BrowserError>;

    /// First matching element in document order
    async fn find_first(&mut self, locator: Locator<'_>) -> Lookup<Self::Element>;

    /// First matching descendant of `scope`
    async fn find_in(&mut self, scope: &Self::Element, locator: Locator<'_>)
    -> Lookup<Self::Element>;

    /// Visible text of the element
    async fn text(&mut self, element: &Self::Element) -> Lookup<String>;

    /// Absolute link target of the element. Missing or empty hrefs are `NotFound`.
    async fn href(&mut self, element: &Self::Element) -> Lookup<String>;

    /// End the session. Any call after this fails with `SessionLost`.
    async fn close(&mut self) -> Result<(), BrowserError>;
}

/// Treats a failed `find_all` as an empty page unless the session is gone.
pub fn elements_or_empty<T>(result: Result<Vec<T>, BrowserError>) -> Result<Vec<T>, BrowserError> {
    match result {
        Ok(elements) => Ok(elements),
        Err(e) if e.is_session_lost() => Err(e),
        Err(e) => {
            ::log::debug!("Element scan failed, treating page as empty: {}", e);
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_from_result() {
        let found = Lookup::from_result(Ok::<_, BrowserError>(3));
        assert!(found.is_found());

        let missing: Lookup<i32> =
            Lookup::from_result(Err(BrowserError::NoSuchElement("p".to_string())));
        assert!(matches!(missing, Lookup::NotFound));

        let stale: Lookup<i32> = Lookup::from_result(Err(BrowserError::StaleElement));
        assert!(matches!(stale, Lookup::Error(BrowserError::StaleElement)));
    }

    #[test]
    fn test_or_skip_only_propagates_lost_session() {
        assert_eq!(Lookup::Found("x").or_skip().unwrap(), Some("x"));
        assert_eq!(Lookup::<&str>::NotFound.or_skip().unwrap(), None);
        assert_eq!(
            Lookup::<&str>::Error(BrowserError::StaleElement)
                .or_skip()
                .unwrap(),
            None
        );

        let lost = Lookup::<&str>::Error(BrowserError::SessionLost("gone".to_string())).or_skip();
        assert!(matches!(lost, Err(BrowserError::SessionLost(_))));
    }

    #[test]
    fn test_elements_or_empty() {
        let empty =
            elements_or_empty::<u8>(Err(BrowserError::Protocol("bad".to_string()))).unwrap();
        assert!(empty.is_empty());
        assert!(elements_or_empty::<u8>(Err(BrowserError::SessionLost("x".into()))).is_err());
    }

    #[test]
    fn test_locator_css() {
        assert_eq!(Locator::Tag("body").as_css(), "body");
        assert_eq!(Locator::Css("main p").as_css(), "main p");
        assert_eq!(Locator::Tag("a").to_string(), "<a>");
    }
}
