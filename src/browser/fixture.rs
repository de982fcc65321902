//! In-memory browser serving synthetic HTML pages.
//!
//! Pages are keyed by exact URL and parsed with `scraper` on every query, so
//! element handles are just positions in document order. Navigating away
//! bumps a generation counter and makes older handles stale, mirroring what a
//! real WebDriver session does.

use crate::browser::{Browser, BrowserError, Locator, Lookup};
use crate::text;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// Elements that start a new rendered line
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "div", "footer", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "li", "main", "nav", "p", "section", "tr",
];

/// Record of what a fixture session did, readable after the browser is moved away
#[derive(Debug, Clone, Default)]
pub struct FixtureJournal {
    inner: Arc<Mutex<JournalState>>,
}

#[derive(Debug, Default)]
struct JournalState {
    visits: Vec<String>,
    closed: bool,
}

impl FixtureJournal {
    /// URLs passed to `goto`, in order
    pub fn visits(&self) -> Vec<String> {
        self.state(|s| s.visits.clone())
    }

    pub fn is_closed(&self) -> bool {
        self.state(|s| s.closed)
    }

    fn state<R>(&self, f: impl FnOnce(&mut JournalState) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        f(&mut guard)
    }
}

/// Handle to an element of a fixture page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixtureElement {
    generation: u64,
    ordinal: usize,
}

struct CurrentPage {
    url: String,
    html: String,
}

/// Browser backed by a fixed set of HTML documents
#[derive(Default)]
pub struct FixtureBrowser {
    pages: HashMap<String, String>,
    broken: HashSet<String>,
    session_killers: HashSet<String>,
    failing: HashMap<String, Vec<String>>,
    current: Option<CurrentPage>,
    generation: u64,
    lost: bool,
    closed: bool,
    journal: FixtureJournal,
}

impl FixtureBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` when `url` is visited
    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Fail navigation to `url` with a network-style error
    pub fn with_broken_page(mut self, url: &str) -> Self {
        self.broken.insert(url.to_string());
        self
    }

    /// Drop the whole session when `url` is visited
    pub fn with_session_loss_at(mut self, url: &str) -> Self {
        self.session_killers.insert(url.to_string());
        self
    }

    /// Make reads of elements matching `selector` on `url` fail as stale
    pub fn with_failing_element(mut self, url: &str, selector: &str) -> Self {
        self.failing
            .entry(url.to_string())
            .or_default()
            .push(selector.to_string());
        self
    }

    pub fn journal(&self) -> FixtureJournal {
        self.journal.clone()
    }

    fn check_session(&self) -> Result<(), BrowserError> {
        if self.closed {
            Err(BrowserError::SessionLost(
                "session already closed".to_string(),
            ))
        } else if self.lost {
            Err(BrowserError::SessionLost("session terminated".to_string()))
        } else {
            Ok(())
        }
    }

    fn page(&self) -> Result<&CurrentPage, BrowserError> {
        self.check_session()?;
        self.current
            .as_ref()
            .ok_or_else(|| BrowserError::Protocol("no page loaded".to_string()))
    }

    fn locate<'d>(&self, doc: &'d Html, element: &FixtureElement) -> Result<ElementRef<'d>, BrowserError> {
        if element.generation != self.generation {
            return Err(BrowserError::StaleElement);
        }
        elements(doc)
            .nth(element.ordinal)
            .ok_or(BrowserError::StaleElement)
    }

    fn select(
        &self,
        scope: Option<&FixtureElement>,
        locator: Locator<'_>,
    ) -> Result<Vec<FixtureElement>, BrowserError> {
        let page = self.page()?;
        let selector = Selector::parse(locator.as_css()).map_err(|e| {
            BrowserError::Protocol(format!("invalid selector {}: {:?}", locator, e))
        })?;
        let doc = Html::parse_document(&page.html);

        let matches: Vec<ElementRef<'_>> = match scope {
            None => doc.select(&selector).collect(),
            Some(element) => self.locate(&doc, element)?.select(&selector).collect(),
        };

        Ok(matches
            .into_iter()
            .filter_map(|m| elements(&doc).position(|e| e.id() == m.id()))
            .map(|ordinal| FixtureElement {
                generation: self.generation,
                ordinal,
            })
            .collect())
    }

    fn fails(&self, element: &FixtureElement) -> bool {
        let Some(selectors) = self.current.as_ref().and_then(|p| self.failing.get(&p.url)) else {
            return false;
        };
        selectors.iter().any(|css| {
            self.select(None, Locator::Css(css))
                .is_ok_and(|found| found.contains(element))
        })
    }

    fn first(&self, scope: Option<&FixtureElement>, locator: Locator<'_>) -> Lookup<FixtureElement> {
        match self.select(scope, locator) {
            Ok(found) => match found.into_iter().next() {
                Some(element) => Lookup::Found(element),
                None => Lookup::NotFound,
            },
            Err(e) => Lookup::Error(e),
        }
    }

    fn read<R>(
        &self,
        element: &FixtureElement,
        read: impl FnOnce(&CurrentPage, ElementRef<'_>) -> Option<R>,
    ) -> Lookup<R> {
        let page = match self.page() {
            Ok(page) => page,
            Err(e) => return Lookup::Error(e),
        };
        let doc = Html::parse_document(&page.html);
        match self.locate(&doc, element) {
            Ok(found) => match read(page, found) {
                Some(value) => Lookup::Found(value),
                None => Lookup::NotFound,
            },
            Err(e) => Lookup::Error(e),
        }
    }
}

fn elements(doc: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    doc.root_element().descendants().filter_map(ElementRef::wrap)
}

/// Text with line breaks where a browser would render them
fn raw_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    for node in element.descendants() {
        match node.value() {
            Node::Text(t) => raw.push_str(t),
            Node::Element(e) if e.name() == "br" || BLOCK_TAGS.contains(&e.name()) => {
                raw.push('\n')
            }
            _ => {}
        }
    }
    raw
}

#[async_trait]
impl Browser for FixtureBrowser {
    type Element = FixtureElement;

    async fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
        self.check_session()?;
        self.journal.state(|s| s.visits.push(url.to_string()));

        if self.session_killers.contains(url) {
            self.lost = true;
            return Err(BrowserError::SessionLost(format!(
                "driver went away while loading {}",
                url
            )));
        }
        if self.broken.contains(url) {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                message: "connection reset".to_string(),
            });
        }

        match self.pages.get(url) {
            Some(html) => {
                self.current = Some(CurrentPage {
                    url: url.to_string(),
                    html: html.clone(),
                });
                self.generation += 1;
                Ok(())
            }
            None => Err(BrowserError::Navigation {
                url: url.to_string(),
                message: "no fixture page for this URL".to_string(),
            }),
        }
    }

    async fn wait_for(
        &mut self,
        locator: Locator<'_>,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        if self.select(None, locator)?.is_empty() {
            return Err(BrowserError::Timeout(timeout, locator.to_string()));
        }
        Ok(())
    }

    async fn find_all(&mut self, locator: Locator<'_>) -> Result<Vec<FixtureElement>, BrowserError> {
        self.select(None, locator)
    }

    async fn find_first(&mut self, locator: Locator<'_>) -> Lookup<FixtureElement> {
        self.first(None, locator)
    }

    async fn find_in(
        &mut self,
        scope: &FixtureElement,
        locator: Locator<'_>,
    ) -> Lookup<FixtureElement> {
        if self.fails(scope) {
            return Lookup::Error(BrowserError::StaleElement);
        }
        self.first(Some(scope), locator)
    }

    async fn text(&mut self, element: &FixtureElement) -> Lookup<String> {
        if self.fails(element) {
            return Lookup::Error(BrowserError::StaleElement);
        }
        self.read(element, |_, found| Some(text::rendered_text(&raw_text(found))))
    }

    async fn href(&mut self, element: &FixtureElement) -> Lookup<String> {
        if self.fails(element) {
            return Lookup::Error(BrowserError::StaleElement);
        }
        self.read(element, |page, found| {
            let href = found.value().attr("href")?.trim();
            if href.is_empty() {
                return None;
            }
            let resolved = Url::parse(&page.url)
                .and_then(|base| base.join(href))
                .map(|u| u.to_string())
                .unwrap_or_else(|_| href.to_string());
            Some(resolved)
        })
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        if self.closed {
            return Err(BrowserError::SessionLost(
                "session already closed".to_string(),
            ));
        }
        self.closed = true;
        self.journal.state(|s| s.closed = true);
        if self.lost {
            return Err(BrowserError::SessionLost("session terminated".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <nav><a href="/sobre">Sobre</a></nav>
        <main>
            <p>First   paragraph<br>continues here</p>
            <a href="https://other.example/x">External</a>
            <a href="">Empty</a>
        </main>
    </body></html>"#;

    fn browser() -> FixtureBrowser {
        FixtureBrowser::new().with_page("https://site.example/home", PAGE)
    }

    #[tokio::test]
    async fn test_find_and_read() {
        let mut browser = browser();
        browser.goto("https://site.example/home").await.unwrap();

        let links = browser.find_all(Locator::Tag("a")).await.unwrap();
        assert_eq!(links.len(), 3);

        let text = browser.text(&links[0]).await.found().unwrap();
        assert_eq!(text, "Sobre");
        let href = browser.href(&links[0]).await.found().unwrap();
        assert_eq!(href, "https://site.example/sobre");

        let href = browser.href(&links[1]).await.found().unwrap();
        assert_eq!(href, "https://other.example/x");
        assert!(matches!(browser.href(&links[2]).await, Lookup::NotFound));

        let p = browser.find_first(Locator::Css("main p")).await.found().unwrap();
        let text = browser.text(&p).await.found().unwrap();
        assert_eq!(text, "First paragraph\ncontinues here");
    }

    #[tokio::test]
    async fn test_scoped_find() {
        let mut browser = browser();
        browser.goto("https://site.example/home").await.unwrap();

        let nav = browser.find_first(Locator::Tag("nav")).await.found().unwrap();
        let link = browser.find_in(&nav, Locator::Css("a[href]")).await.found().unwrap();
        assert_eq!(browser.text(&link).await.found().unwrap(), "Sobre");
        assert!(matches!(
            browser.find_in(&nav, Locator::Tag("p")).await,
            Lookup::NotFound
        ));
    }

    #[tokio::test]
    async fn test_elements_go_stale_after_navigation() {
        let mut browser = browser();
        browser.goto("https://site.example/home").await.unwrap();
        let link = browser.find_first(Locator::Tag("a")).await.found().unwrap();

        browser.goto("https://site.example/home").await.unwrap();
        assert!(matches!(
            browser.text(&link).await,
            Lookup::Error(BrowserError::StaleElement)
        ));
    }

    #[tokio::test]
    async fn test_failing_elements_only_on_their_page() {
        let mut browser = browser()
            .with_page("https://site.example/other", PAGE)
            .with_failing_element("https://site.example/home", "nav a");

        browser.goto("https://site.example/home").await.unwrap();
        let links = browser.find_all(Locator::Tag("a")).await.unwrap();
        assert!(matches!(
            browser.text(&links[0]).await,
            Lookup::Error(BrowserError::StaleElement)
        ));
        assert!(matches!(
            browser.href(&links[0]).await,
            Lookup::Error(BrowserError::StaleElement)
        ));
        assert_eq!(browser.text(&links[1]).await.found().unwrap(), "External");

        let nav = browser.find_first(Locator::Tag("nav")).await.found().unwrap();
        assert!(browser.find_in(&nav, Locator::Tag("a")).await.is_found());

        browser.goto("https://site.example/other").await.unwrap();
        let links = browser.find_all(Locator::Tag("a")).await.unwrap();
        assert_eq!(browser.text(&links[0]).await.found().unwrap(), "Sobre");
    }

    #[tokio::test]
    async fn test_navigation_failures() {
        let mut browser = browser()
            .with_broken_page("https://site.example/broken")
            .with_session_loss_at("https://site.example/fatal");

        assert!(matches!(
            browser.goto("https://site.example/missing").await,
            Err(BrowserError::Navigation { .. })
        ));
        assert!(matches!(
            browser.goto("https://site.example/broken").await,
            Err(BrowserError::Navigation { .. })
        ));
        assert!(matches!(
            browser.goto("https://site.example/fatal").await,
            Err(BrowserError::SessionLost(_))
        ));
        assert!(browser.goto("https://site.example/home").await.is_err());
    }

    #[tokio::test]
    async fn test_wait_for_and_close() {
        let mut browser = browser();
        let journal = browser.journal();
        browser.goto("https://site.example/home").await.unwrap();

        let wait = Duration::from_secs(1);
        assert!(browser.wait_for(Locator::Tag("body"), wait).await.is_ok());
        assert!(matches!(
            browser.wait_for(Locator::Tag("article"), wait).await,
            Err(BrowserError::Timeout(..))
        ));

        browser.close().await.unwrap();
        assert!(journal.is_closed());
        assert_eq!(journal.visits(), vec!["https://site.example/home"]);
        assert!(browser.goto("https://site.example/home").await.is_err());
        assert!(browser.close().await.is_err());
    }
}
