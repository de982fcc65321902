use crate::browser::{Browser, BrowserError};
use crate::config::HarvestConfig;
use crate::results::OutputRecord;
use crate::scrapers::extractor::ArticleExtractor;
use crate::scrapers::resolver::CategoryResolver;
use crate::scrapers::summary::SummaryFetcher;

/// What happened to one requested category
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryOutcome {
    /// No category page could be found for the label
    Unresolved,
    /// The category page yielded this many articles
    Collected(usize),
}

/// Everything a run produced
#[derive(Debug)]
pub struct HarvestReport {
    /// Rows in category order, then page order
    pub records: Vec<OutputRecord>,

    /// Outcome per processed category, in request order
    pub outcomes: Vec<(String, CategoryOutcome)>,

    /// Set when the browser session died and the loop stopped early
    pub failure: Option<BrowserError>,
}

/// Drives resolve, extract and summarize over a list of categories
#[derive(Debug, Clone)]
pub struct Aggregator {
    resolver: CategoryResolver,
    extractor: ArticleExtractor,
    summaries: SummaryFetcher,
    limit: usize,
}

impl Aggregator {
    /// Builds the pipeline from configuration with the default limit of 5
    pub fn new(config: &HarvestConfig) -> Self {
        Self {
            resolver: CategoryResolver::new(&config.base_url, config.category_wait()),
            extractor: ArticleExtractor::new(config.category_wait(), config.min_link_text_len),
            summaries: SummaryFetcher::new(
                config.article_wait(),
                config.summary_selectors.clone(),
                config.max_summary_chars,
            ),
            limit: 5,
        }
    }

    /// Set the maximum number of articles per category
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Replace the article extractor
    pub fn with_extractor(mut self, extractor: ArticleExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Processes every category, then closes the session.
    ///
    /// The browser is consumed: it is closed exactly once on every path, and
    /// a close failure is ignored. Rows collected before a session failure
    /// are kept in the report.
    pub async fn run<B: Browser>(&self, mut browser: B, categories: &[String]) -> HarvestReport {
        let mut records = Vec::new();
        let mut outcomes = Vec::new();

        let result = self
            .collect(&mut browser, categories, &mut records, &mut outcomes)
            .await;

        if let Err(e) = browser.close().await {
            ::log::debug!("Ignoring error while closing browser session: {}", e);
        }

        if let Err(e) = &result {
            ::log::error!("Browser session failed, stopping early: {}", e);
        }

        HarvestReport {
            records,
            outcomes,
            failure: result.err(),
        }
    }

    async fn collect<B: Browser>(
        &self,
        browser: &mut B,
        categories: &[String],
        records: &mut Vec<OutputRecord>,
        outcomes: &mut Vec<(String, CategoryOutcome)>,
    ) -> Result<(), BrowserError> {
        for label in categories {
            ::log::info!("Processing category: {}", label);

            let resolved = self.resolver.resolve(browser, label).await?;
            let Some(url) = resolved.url else {
                ::log::warn!("Could not find URL for category '{}', skipping.", label);
                outcomes.push((label.clone(), CategoryOutcome::Unresolved));
                continue;
            };

            let articles = self
                .extractor
                .extract(browser, &self.summaries, &url, self.limit)
                .await?;
            ::log::info!("Collected {} articles for '{}' from {}", articles.len(), label, url);

            outcomes.push((label.clone(), CategoryOutcome::Collected(articles.len())));
            records.extend(
                articles
                    .into_iter()
                    .map(|article| OutputRecord::new(label, article)),
            );
        }
        Ok(())
    }
}
