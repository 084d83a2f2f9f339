mod parser;
pub mod scraper;
pub mod types;
pub mod utils;

pub use parser::{ParseError, WikipediaParser, clean_country_name, parse_float, parse_number};
pub use scraper::{CrawlerConfig, CrawlerError, WikipediaGdpCrawler, save_to_json};

pub const BASE_URL: &str = "https://en.wikipedia.org";
