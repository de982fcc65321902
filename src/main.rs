use clap::Parser;
use news_harvest::{HarvestConfig, categories, output};
use std::path::Path;
use std::process::ExitCode;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging, showing operator notices unless RUST_LOG says otherwise
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command-line arguments
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match HarvestConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                ::log::error!("Failed to load config {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => HarvestConfig::default(),
    };
    let config = args.apply_to(config.with_env_overrides());
    if let Err(e) = config.validate() {
        ::log::error!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    let items = categories::load_category_inputs(
        args.categories.as_deref(),
        args.categories_file.as_deref(),
        &config.default_categories,
    );

    println!("Note: scraping requires a WebDriver server (e.g., chromedriver or geckodriver).");
    println!(
        "Set WEBDRIVER_URL or --webdriver-url if not using {}",
        config.webdriver_url
    );

    let options = args.session_options(&config);
    let report = match news_harvest::harvest(&config, &options, args.limit, &items).await {
        Ok(report) => report,
        Err(e) => {
            ::log::error!("Failed to start browser: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let path = Path::new(&config.output_path);
    if let Err(e) = output::write_csv(path, &report.records) {
        ::log::error!("Failed to write {}: {}", path.display(), e);
        return ExitCode::FAILURE;
    }
    ::log::info!("Wrote {} rows to {}", report.records.len(), path.display());

    match report.failure {
        Some(e) => {
            ::log::error!("Run ended early: {}", e);
            ExitCode::FAILURE
        }
        None => ExitCode::SUCCESS,
    }
}
