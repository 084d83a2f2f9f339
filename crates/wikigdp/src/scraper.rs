use std::fs;
use std::path::Path;
use std::time::Duration;

use futures::future;
use reqwest::Client;

use crate::parser::WikipediaParser;
use crate::types::WikipediaGdpData;

pub const GDP_PER_CAPITA_PATH: &str = "/wiki/List_of_countries_by_GDP_(nominal)_per_capita";
pub const GDP_GROWTH_RATE_PATH: &str = "/wiki/List_of_countries_by_real_GDP_growth_rate";

#[derive(Debug, thiserror::Error)]
pub enum CrawlerError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Failed to write output: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to encode JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: crate::BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WikipediaGdpCrawler {
    client: Client,
    parser: WikipediaParser,
    gdp_per_capita_url: String,
    gdp_growth_rate_url: String,
}

impl WikipediaGdpCrawler {
    pub fn new() -> Result<Self, CrawlerError> {
        Self::with_config(CrawlerConfig::default())
    }

    pub fn with_config(config: CrawlerConfig) -> Result<Self, CrawlerError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()?;

        let base_url = config.base_url.trim_end_matches('/');

        Ok(Self {
            client,
            parser: WikipediaParser::default(),
            gdp_per_capita_url: format!("{}{}", base_url, GDP_PER_CAPITA_PATH),
            gdp_growth_rate_url: format!("{}{}", base_url, GDP_GROWTH_RATE_PATH),
        })
    }

    pub fn with_parser(mut self, parser: WikipediaParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn gdp_per_capita_url(&self) -> &str {
        &self.gdp_per_capita_url
    }

    pub fn gdp_growth_rate_url(&self) -> &str {
        &self.gdp_growth_rate_url
    }

    /// Returns the page body, or `None` after logging why it could not be
    /// fetched.
    pub async fn fetch_page(&self, url: &str) -> Option<String> {
        match self.get_html(url).await {
            Ok(html) => Some(html),
            Err(e) => {
                log::error!("Error fetching {}: {}", url, e);
                None
            }
        }
    }

    pub async fn crawl(&self) -> WikipediaGdpData {
        log::info!("Fetching GDP pages from Wikipedia...");

        let (per_capita_html, growth_rate_html) = future::join(
            self.fetch_page(&self.gdp_per_capita_url),
            self.fetch_page(&self.gdp_growth_rate_url),
        )
        .await;

        let per_capita = match per_capita_html {
            Some(html) => {
                let entries = self.parser.parse_gdp_per_capita(&html);
                log::info!("Extracted {} GDP per capita entries", entries.len());
                entries
            }
            None => {
                log::warn!("Failed to fetch GDP per capita data");
                Vec::new()
            }
        };

        let growth_rates = match growth_rate_html {
            Some(html) => {
                let entries = self.parser.parse_gdp_growth_rate(&html);
                log::info!("Extracted {} GDP growth rate entries", entries.len());
                entries
            }
            None => {
                log::warn!("Failed to fetch GDP growth rate data");
                Vec::new()
            }
        };

        let mut data = WikipediaGdpData::new(per_capita, growth_rates);
        data.combine_data();
        log::info!("Combined data for {} countries", data.combined_data.len());

        data
    }

    async fn get_html(&self, url: &str) -> Result<String, CrawlerError> {
        Ok(self
            .client
            .get(url)
            .send()
            .await
            .inspect_err(|e| log::debug!("HTTP error: {e:?}"))?
            .error_for_status()?
            .text()
            .await
            .inspect_err(|e| log::debug!("Decode error: {e:?}"))?)
    }
}

/// Writes `data` as JSON, creating the parent directory if needed.
pub fn save_to_json(
    data: &WikipediaGdpData,
    path: impl AsRef<Path>,
    pretty: bool,
) -> Result<(), CrawlerError> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let json = if pretty {
        serde_json::to_vec_pretty(data)?
    } else {
        serde_json::to_vec(data)?
    };
    fs::write(path, json)?;

    log::info!("Saved GDP data to {}", path.display());
    Ok(())
}
