use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use wikigdp::utils::GdpSummary;
use wikigdp::{CrawlerConfig, WikipediaGdpCrawler, save_to_json};

#[derive(Parser, Debug)]
#[command(name = "wikigdp")]
#[command(about = "Wikipedia GDP data crawler", long_about = None)]
struct Cli {
    #[arg(
        short = 'o',
        long = "output",
        default_value = "gdp_data.json",
        help = "Output file path for the GDP data"
    )]
    output: PathBuf,

    #[arg(
        short = 'v',
        long,
        help = "Enable verbose logging (same as --log-level debug)"
    )]
    verbose: bool,

    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[arg(long, help = "Output pretty JSON (readable but larger)")]
    pretty: bool,

    #[arg(long, help = "Print a summary of the gathered data")]
    summary: bool,

    #[arg(
        long,
        default_value_t = 10,
        help = "Number of top countries to show in summary"
    )]
    top: usize,

    #[arg(
        long,
        value_name = "SECONDS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "HTTP request timeout"
    )]
    timeout: u64,

    #[arg(
        long,
        value_name = "URL",
        default_value = wikigdp::BASE_URL,
        help = "Wikipedia base URL"
    )]
    base_url: String,
}

impl Cli {
    fn level_filter(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            self.log_level.clone().into()
        }
    }

    fn crawler_config(&self) -> CrawlerConfig {
        CrawlerConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout),
            ..CrawlerConfig::default()
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.level_filter())
        .init();

    log::info!("Starting Wikipedia GDP crawler");

    let crawler = WikipediaGdpCrawler::with_config(cli.crawler_config()).unwrap_or_else(|e| {
        log::error!("Error creating crawler: {}", e);
        process::exit(1);
    });

    let data = crawler.crawl().await;
    log::info!("Crawl finished: {}", data);

    save_to_json(&data, &cli.output, cli.pretty).unwrap_or_else(|e| {
        log::error!("Error saving data to {}: {}", cli.output.display(), e);
        process::exit(1);
    });

    log::info!("Data saved to {}", cli.output.display());

    if cli.summary {
        print!(
            "{}",
            GdpSummary::from_combined_data(&data.combined_data, cli.top)
        );
    }
}
