use crate::browser::{Browser, BrowserError, Locator, Lookup, elements_or_empty};
use crate::results::{Article, ArticleCandidate};
use crate::scrapers::navigator;
use crate::scrapers::summary::SummaryFetcher;
use std::collections::HashSet;
use std::time::Duration;

const HEADINGS: Locator<'static> = Locator::Css("h1, h2, h3");

/// Strategies for spotting article links, from most to least structured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// First link inside each `<article>` container
    ArticleContainers,
    /// Links inside `<main>` that wrap a heading
    HeadingLinks,
    /// Any link with long visible text
    LongTextLinks,
}

impl Tier {
    /// Default order of the fallback chain
    pub const CHAIN: [Tier; 3] = [Tier::ArticleContainers, Tier::HeadingLinks, Tier::LongTextLinks];
}

/// Finds article candidates on a category page and turns them into articles
#[derive(Debug, Clone)]
pub struct ArticleExtractor {
    wait: Duration,
    min_link_text_len: usize,
    chain: Vec<Tier>,
}

impl ArticleExtractor {
    /// Create an extractor using the default tier chain
    pub fn new(wait: Duration, min_link_text_len: usize) -> Self {
        Self {
            wait,
            min_link_text_len,
            chain: Tier::CHAIN.to_vec(),
        }
    }

    /// Replace the tier order
    pub fn with_chain(mut self, chain: Vec<Tier>) -> Self {
        self.chain = chain;
        self
    }

    /// Loads `category_url` and returns up to `limit` articles with summaries.
    ///
    /// A page that fails to load yields no articles. Summaries are fetched in
    /// candidate order and fetching stops once `limit` articles exist.
    pub async fn extract<B: Browser>(
        &self,
        browser: &mut B,
        summaries: &SummaryFetcher,
        category_url: &str,
        limit: usize,
    ) -> Result<Vec<Article>, BrowserError> {
        match navigator::open(browser, category_url, self.wait).await {
            Ok(()) => {}
            Err(e) if e.is_session_lost() => return Err(e),
            Err(e) => {
                ::log::warn!("Could not load category page {}: {}", category_url, e);
                return Ok(Vec::new());
            }
        }

        let candidates = match self.first_non_empty(browser).await? {
            Some((tier, found)) => {
                ::log::debug!(
                    "{:?} produced {} candidates on {}",
                    tier,
                    found.len(),
                    category_url
                );
                dedup_candidates(found)
            }
            None => {
                ::log::info!("No article candidates found on {}", category_url);
                Vec::new()
            }
        };

        let mut articles = Vec::new();
        for candidate in candidates {
            if articles.len() >= limit {
                break;
            }
            let summary = summaries.fetch(browser, &candidate.url).await?;
            articles.push(Article {
                title: candidate.display_title().to_string(),
                summary,
                url: candidate.url,
            });
        }

        Ok(articles)
    }

    /// Runs the tiers in order on the current page and returns the first
    /// non-empty result. Later tiers are never consulted once one succeeds.
    pub async fn first_non_empty<B: Browser>(
        &self,
        browser: &mut B,
    ) -> Result<Option<(Tier, Vec<ArticleCandidate>)>, BrowserError> {
        for &tier in &self.chain {
            let found = self.run_tier(browser, tier).await?;
            if !found.is_empty() {
                return Ok(Some((tier, found)));
            }
            ::log::debug!("{:?} found nothing, falling back", tier);
        }
        Ok(None)
    }

    /// Candidates produced by a single tier on the current page
    pub async fn run_tier<B: Browser>(
        &self,
        browser: &mut B,
        tier: Tier,
    ) -> Result<Vec<ArticleCandidate>, BrowserError> {
        match tier {
            Tier::ArticleContainers => article_containers(browser).await,
            Tier::HeadingLinks => heading_links(browser).await,
            Tier::LongTextLinks => long_text_links(browser, self.min_link_text_len).await,
        }
    }
}

/// Drops candidates without a URL and repeats of an earlier URL
pub fn dedup_candidates(candidates: Vec<ArticleCandidate>) -> Vec<ArticleCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| !c.url.is_empty() && seen.insert(c.url.clone()))
        .collect()
}

/// Trimmed text, `None` when empty or unreadable
async fn text_of<B: Browser>(
    browser: &mut B,
    element: &B::Element,
) -> Result<Option<String>, BrowserError> {
    Ok(browser
        .text(element)
        .await
        .or_skip()?
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty()))
}

async fn article_containers<B: Browser>(
    browser: &mut B,
) -> Result<Vec<ArticleCandidate>, BrowserError> {
    let containers = elements_or_empty(browser.find_all(Locator::Tag("article")).await)?;
    let mut candidates = Vec::new();

    for container in &containers {
        let link = match browser.find_in(container, Locator::Css("a[href]")).await {
            Lookup::Found(link) => link,
            Lookup::NotFound => continue,
            Lookup::Error(e) if e.is_session_lost() => return Err(e),
            Lookup::Error(e) => {
                ::log::debug!("Skipping article container: {}", e);
                continue;
            }
        };
        let Some(href) = browser.href(&link).await.or_skip()? else {
            continue;
        };

        let mut title = text_of(browser, &link).await?;
        if title.is_none() {
            if let Some(heading) = browser.find_in(container, HEADINGS).await.or_skip()? {
                title = text_of(browser, &heading).await?;
            }
        }
        candidates.push(ArticleCandidate::new(title, href));
    }

    Ok(candidates)
}

async fn heading_links<B: Browser>(browser: &mut B) -> Result<Vec<ArticleCandidate>, BrowserError> {
    let links = elements_or_empty(browser.find_all(Locator::Css("main a")).await)?;
    let mut candidates = Vec::new();

    for link in &links {
        if browser.find_in(link, HEADINGS).await.or_skip()?.is_none() {
            continue;
        }
        let Some(href) = browser.href(link).await.or_skip()? else {
            continue;
        };
        let title = text_of(browser, link).await?;
        candidates.push(ArticleCandidate::new(title, href));
    }

    Ok(candidates)
}

async fn long_text_links<B: Browser>(
    browser: &mut B,
    min_len: usize,
) -> Result<Vec<ArticleCandidate>, BrowserError> {
    let links = elements_or_empty(browser.find_all(Locator::Tag("a")).await)?;
    let mut candidates = Vec::new();

    for link in &links {
        let Some(title) = text_of(browser, link).await? else {
            continue;
        };
        if title.chars().count() <= min_len {
            continue;
        }
        if let Some(href) = browser.href(link).await.or_skip()? {
            candidates.push(ArticleCandidate::new(Some(title), href));
        }
    }

    Ok(candidates)
}
