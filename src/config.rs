use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Settings for a harvest run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Home page scanned for category links
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Page-load timeout applied to the browser session
    #[serde(default = "default_page_load_timeout_secs")]
    pub page_load_timeout_secs: u64,

    /// Readiness wait for the home page and category pages
    #[serde(default = "default_category_wait_secs")]
    pub category_wait_secs: u64,

    /// Readiness wait for article pages
    #[serde(default = "default_article_wait_secs")]
    pub article_wait_secs: u64,

    /// Link text must be longer than this to count in the last-resort tier
    #[serde(default = "default_min_link_text_len")]
    pub min_link_text_len: usize,

    /// Summaries are cut to this many characters
    #[serde(default = "default_max_summary_chars")]
    pub max_summary_chars: usize,

    /// Summary selectors, most specific first
    #[serde(default = "default_summary_selectors")]
    pub summary_selectors: Vec<String>,

    /// Categories used when none are given on the command line
    #[serde(default = "default_categories")]
    pub default_categories: Vec<String>,

    /// Where the CSV is written
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

fn default_base_url() -> String {
    "https://www.metropoles.com/".to_string()
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_page_load_timeout_secs() -> u64 {
    30
}

fn default_category_wait_secs() -> u64 {
    10
}

fn default_article_wait_secs() -> u64 {
    8
}

fn default_min_link_text_len() -> usize {
    20
}

fn default_max_summary_chars() -> usize {
    1000
}

fn default_summary_selectors() -> Vec<String> {
    ["article p", ".entry-content p", ".post-content p", "main p", "p"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_categories() -> Vec<String> {
    [
        "Últimas notícias",
        "Colunistas",
        "Brasil",
        "DF",
        "SP",
        "Mundo",
        "Entretenimento",
        "Vida & Estilo",
        "Saúde",
        "Ciência",
        "Esportes",
        "Especiais",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_output_path() -> String {
    "output.csv".to_string()
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            webdriver_url: default_webdriver_url(),
            page_load_timeout_secs: default_page_load_timeout_secs(),
            category_wait_secs: default_category_wait_secs(),
            article_wait_secs: default_article_wait_secs(),
            min_link_text_len: default_min_link_text_len(),
            max_summary_chars: default_max_summary_chars(),
            summary_selectors: default_summary_selectors(),
            default_categories: default_categories(),
            output_path: default_output_path(),
        }
    }
}

impl HarvestConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, Box<dyn Error>> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the scrapers cannot work with
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        Url::parse(&self.base_url).map_err(|e| format!("invalid base_url {}: {}", self.base_url, e))?;
        if self.summary_selectors.is_empty() {
            return Err("summary_selectors must not be empty".into());
        }
        Ok(())
    }

    /// Override the WebDriver URL with an environment variable if provided
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
        self
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    pub fn category_wait(&self) -> Duration {
        Duration::from_secs(self.category_wait_secs)
    }

    pub fn article_wait(&self) -> Duration {
        Duration::from_secs(self.article_wait_secs)
    }
}
