use serde::{Deserialize, Serialize};

/// A category label together with the page it resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCategory {
    /// Label or URL exactly as requested
    pub label: String,

    /// Category page, `None` when no link on the home page matched
    pub url: Option<String>,
}

/// A link found on a category page that may point at an article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleCandidate {
    /// Headline text, if any was found near the link
    pub title: Option<String>,

    /// Absolute article URL
    pub url: String,
}

impl ArticleCandidate {
    pub fn new(title: Option<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.filter(|t| !t.trim().is_empty()),
            url: url.into(),
        }
    }

    /// Title to report, falling back to the URL itself
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.url)
    }
}

/// An article that went through summary fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub summary: Option<String>,
    pub url: String,
}

/// One row of the output file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub category: String,
    pub title: String,
    pub summary: String,
    pub url: String,
}

impl OutputRecord {
    /// Tags an article with the category label it was requested under.
    /// A missing summary becomes an empty string.
    pub fn new(category: &str, article: Article) -> Self {
        Self {
            category: category.to_string(),
            title: article.title,
            summary: article.summary.unwrap_or_default(),
            url: article.url,
        }
    }
}
