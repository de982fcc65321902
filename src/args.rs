use clap::{Parser, ValueEnum};
use news_harvest::{BrowserKind, HarvestConfig, SessionOptions};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "news-harvest")]
#[command(about = "Collects top articles per news category into a CSV file")]
#[command(version)]
pub struct Args {
    /// Browser to drive through WebDriver
    #[arg(long, value_enum, default_value_t = BrowserArg::Chrome)]
    pub browser: BrowserArg,

    /// Max items per category
    #[arg(
        long,
        default_value_t = 5,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub limit: usize,

    /// Run browser in headless mode
    #[arg(long)]
    pub headless: bool,

    /// Comma-separated list of category names or URLs to scrape
    #[arg(long)]
    pub categories: Option<String>,

    /// Path to file with one category name or URL per line
    #[arg(long)]
    pub categories_file: Option<PathBuf>,

    /// Output CSV path (overrides the config file)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Path to a JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// WebDriver server URL (defaults to WEBDRIVER_URL or the config file)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Home page of the site to scrape
    #[arg(long)]
    pub base_url: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum BrowserArg {
    Chrome,
    Firefox,
}

/// Convert from CLI browser argument to the session browser kind
pub fn convert_browser(arg: BrowserArg) -> BrowserKind {
    match arg {
        BrowserArg::Chrome => BrowserKind::Chrome,
        BrowserArg::Firefox => BrowserKind::Firefox,
    }
}

impl Args {
    /// Layers command-line overrides on top of the loaded configuration
    pub fn apply_to(&self, mut config: HarvestConfig) -> HarvestConfig {
        if let Some(url) = &self.webdriver_url {
            config.webdriver_url = url.clone();
        }
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(path) = &self.output {
            config.output_path = path.display().to_string();
        }
        config
    }

    pub fn session_options(&self, config: &HarvestConfig) -> SessionOptions {
        SessionOptions {
            kind: convert_browser(self.browser),
            headless: self.headless,
            webdriver_url: config.webdriver_url.clone(),
            page_load_timeout: config.page_load_timeout(),
        }
    }
}
