use std::sync::LazyLock;

use chrono::{Datelike, Local};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::types::{GdpGrowthRate, GdpPerCapita};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to parse number from '{raw}' (cleaned to '{cleaned}')")]
    InvalidNumber { raw: String, cleaned: String },
}

static RE_FOOTNOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]").expect("invalid regex: footnote"));
static RE_HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("invalid regex: html tag"));
static RE_NON_NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9.\-+]").expect("invalid regex: non numeric"));
static RE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{4}").expect("invalid regex: year"));

static SEL_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("invalid selector: title"));
static SEL_HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3").expect("invalid selector: heading"));
static SEL_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("invalid selector: table"));
static SEL_WIKITABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.wikitable").expect("invalid selector: wikitable"));
static SEL_ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("invalid selector: row"));
static SEL_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th, td").expect("invalid selector: cell"));

fn elem_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}

/// Concatenates the trimmed text nodes of a cell, dropping whitespace between
/// inline elements (`Monaco<sup>[a]</sup>` becomes `Monaco[a]`).
fn cell_text(element: ElementRef) -> String {
    element.text().map(str::trim).collect::<String>()
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn find_year(text: &str) -> Option<i32> {
    RE_YEAR.find(text).and_then(|m| m.as_str().parse().ok())
}

fn parse_rank(text: &str) -> Option<u32> {
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        text.parse().ok()
    } else {
        None
    }
}

/// Strips footnote markers, stray tags and redundant whitespace from a
/// country cell.
pub fn clean_country_name(name: &str) -> String {
    let name = RE_FOOTNOTE.replace_all(name, "");
    let name = RE_HTML_TAG.replace_all(&name, "");
    normalize_whitespace(&name)
}

pub fn parse_number(value: &str) -> Result<f64, ParseError> {
    let value_ascii = value.replace('\u{2212}', "-");
    let cleaned = RE_NON_NUMERIC.replace_all(&value_ascii, "");
    cleaned
        .parse::<f64>()
        .map_err(|_| ParseError::InvalidNumber {
            raw: value.to_string(),
            cleaned: cleaned.to_string(),
        })
}

/// Like [`parse_number`], but falls back to `0.0`.
pub fn parse_float(value: &str) -> f64 {
    parse_number(value).unwrap_or_else(|e| {
        log::warn!("{}", e);
        0.0
    })
}

/// A table whose first row names a country column.
struct CountryTable<'a> {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    element: ElementRef<'a>,
}

impl<'a> CountryTable<'a> {
    fn from_element(table: ElementRef<'a>) -> Option<Self> {
        let header_row = table.select(&SEL_ROW).next()?;
        let headers: Vec<String> = header_row.select(&SEL_CELL).map(cell_text).collect();
        log::debug!("Table headers: {:?}", headers);

        if !headers.iter().any(|h| h.to_lowercase().contains("country")) {
            return None;
        }

        let rows = table
            .select(&SEL_ROW)
            .skip(1)
            .map(|row| row.select(&SEL_CELL).map(cell_text).collect::<Vec<_>>())
            .collect();

        Some(Self {
            headers,
            rows,
            element: table,
        })
    }

    fn country_index(&self) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.to_lowercase().contains("country"))
    }

    fn is_wikitable(&self) -> bool {
        self.element
            .value()
            .attr("class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == "wikitable"))
    }
}

fn log_table_counts(document: &Html, page: &str) {
    log::info!(
        "Found {} tables total ({} wikitables) in {} page",
        document.select(&SEL_TABLE).count(),
        document.select(&SEL_WIKITABLE).count(),
        page
    );
}

fn country_tables(document: &Html) -> impl Iterator<Item = CountryTable<'_>> {
    document
        .select(&SEL_TABLE)
        .filter_map(CountryTable::from_element)
}

#[derive(Debug, Clone)]
pub struct WikipediaParser {
    fallback_year: i32,
}

impl Default for WikipediaParser {
    fn default() -> Self {
        Self::with_fallback_year(Local::now().year())
    }
}

impl WikipediaParser {
    pub fn with_fallback_year(fallback_year: i32) -> Self {
        Self { fallback_year }
    }

    pub fn fallback_year(&self) -> i32 {
        self.fallback_year
    }

    /// Year taken from the page title, then from the first `h1`-`h3` heading
    /// carrying one.
    pub fn extract_year(&self, html: &str) -> i32 {
        let document = Html::parse_document(html);
        self.year_from_title_or_headings(&document)
    }

    fn year_from_title_or_headings(&self, document: &Html) -> i32 {
        if let Some(title) = document.select(&SEL_TITLE).next() {
            let text = elem_text(title);
            log::debug!("Title text: {}", text.trim());
            if let Some(year) = find_year(&text) {
                return year;
            }
        }

        document
            .select(&SEL_HEADING)
            .find_map(|heading| find_year(&elem_text(heading)))
            .unwrap_or(self.fallback_year)
    }

    /// Year taken from the first text node mentioning GDP or growth.
    pub fn extract_growth_year(&self, html: &str) -> i32 {
        let document = Html::parse_document(html);
        self.year_from_growth_text(&document)
    }

    fn year_from_growth_text(&self, document: &Html) -> i32 {
        document
            .root_element()
            .text()
            .filter(|t| t.contains("GDP") || t.to_lowercase().contains("growth"))
            .find_map(find_year)
            .unwrap_or(self.fallback_year)
    }

    pub fn parse_gdp_per_capita(&self, html: &str) -> Vec<GdpPerCapita> {
        let document = Html::parse_document(html);

        let year = self.year_from_title_or_headings(&document);
        log::info!("Using GDP per capita year: {}", year);
        log_table_counts(&document, "GDP per capita");

        let mut results = Vec::new();

        for table in country_tables(&document) {
            log::info!(
                "Found potential GDP table (wikitable: {}) with headers: {:?}",
                table.is_wikitable(),
                table.headers
            );
            log::debug!("Found {} data rows", table.rows.len());

            let country_index = table.country_index().unwrap_or(0);
            let value_index = if country_index == 0 { 1 } else { 2 };

            for cells in table.rows.iter().filter(|cells| cells.len() >= 2) {
                let Some(country_cell) = cells.get(country_index).or_else(|| cells.first())
                else {
                    continue;
                };
                let country = clean_country_name(country_cell);

                let rank = if country_index > 0 {
                    parse_rank(&cells[0]).unwrap_or(0)
                } else {
                    0
                };

                let Some(value_cell) = cells.get(value_index) else {
                    continue;
                };
                let entry = GdpPerCapita::new(country, rank, parse_float(value_cell), year);
                log::debug!("Found entry: {}", entry);

                if !entry.country.is_empty() && entry.gdp_per_capita > 0.0 {
                    results.push(entry);
                }
            }

            if !results.is_empty() {
                break;
            }
        }

        results
    }

    pub fn parse_gdp_growth_rate(&self, html: &str) -> Vec<GdpGrowthRate> {
        let document = Html::parse_document(html);

        if let Some(title) = document.select(&SEL_TITLE).next() {
            log::debug!("Growth rate page title: {}", elem_text(title).trim());
        }

        let year = self.year_from_growth_text(&document);
        log::info!("Using growth rate year: {}", year);
        log_table_counts(&document, "growth rate");

        let mut results = Vec::new();

        for table in country_tables(&document) {
            log::info!(
                "Found potential growth rate table (wikitable: {}) with headers: {:?}",
                table.is_wikitable(),
                table.headers
            );
            log::debug!("Found {} growth rate data rows", table.rows.len());

            let country_index = table.country_index().unwrap_or(1);
            let growth_index = country_index + 1;

            for cells in table.rows.iter().filter(|cells| cells.len() >= 2) {
                let Some(country_cell) = cells.get(country_index).or_else(|| cells.get(1)) else {
                    continue;
                };
                let country = clean_country_name(country_cell);
                let rank = parse_rank(&cells[0]).unwrap_or(0);

                let Some(growth_cell) = cells.get(growth_index) else {
                    continue;
                };
                let entry = GdpGrowthRate::new(country, rank, parse_float(growth_cell), year);
                log::debug!("Found growth entry: {}", entry);

                if !entry.country.is_empty() {
                    results.push(entry);
                }
            }

            if !results.is_empty() {
                break;
            }
        }

        results
    }
}
