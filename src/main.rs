use clap::Parser;
use driver_interceptor::{
    By, ChromeDriver, Config, EventFiringDriver, ThresholdLogger, WebDriver, WebElement,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Load a page through an intercepted Chrome driver and log slow calls
#[derive(Debug, Parser)]
#[command(name = "driver-interceptor", version)]
struct Cli {
    /// Page to load
    #[arg(long, default_value = "https://example.com")]
    url: String,

    /// Log successful calls slower than this many milliseconds
    #[arg(long)]
    threshold_ms: Option<u64>,

    /// Show the browser window
    #[arg(long)]
    headful: bool,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// CSS selector to count on the loaded page
    #[arg(long, default_value = "a")]
    selector: String,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match Config::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {e}");
                return std::process::ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };
    if let Some(threshold_ms) = cli.threshold_ms {
        config.interception.threshold_ms = threshold_ms;
    }
    if cli.headful {
        config.browser.headless = false;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.interception.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(&cli, &config) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, config: &Config) -> driver_interceptor::Result<()> {
    info!(threshold = ?config.interception.threshold(), "launching chrome");
    let chrome = ChromeDriver::launch(&config.browser)?;

    let mut logger = ThresholdLogger::with_tracing(config.interception.threshold());
    if let Some(max_items) = config.interception.max_rendered_items {
        logger = logger.with_max_rendered_items(max_items);
    }
    let driver = EventFiringDriver::wrap(chrome, Arc::new(logger));

    let outcome = browse(&driver, cli);
    driver.quit()?;
    outcome
}

fn browse(driver: &dyn WebDriver, cli: &Cli) -> driver_interceptor::Result<()> {
    driver.get(&cli.url)?;
    info!("title: {}", driver.title()?);

    let matches = driver.find_elements(&By::css(cli.selector.as_str()))?;
    info!("{} elements match {}", matches.len(), cli.selector);

    if let Some(first) = matches.first() {
        info!("first match: <{}> {:?}", first.tag_name()?, first.text()?);
    }

    Ok(())
}
