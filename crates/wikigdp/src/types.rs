use std::collections::BTreeMap;
use std::fmt::Display;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SOURCE: &str = "IMF";

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GdpPerCapita {
    pub country: String,
    pub rank: u32,
    pub gdp_per_capita: f64,
    pub year: i32,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default)]
    pub note: Option<String>,
}

impl GdpPerCapita {
    pub fn new(country: impl Into<String>, rank: u32, gdp_per_capita: f64, year: i32) -> Self {
        Self {
            country: country.into(),
            rank,
            gdp_per_capita,
            year,
            source: default_source(),
            note: None,
        }
    }
}

impl Display for GdpPerCapita {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} {} {:.2} ({}, {})",
            self.rank, self.country, self.gdp_per_capita, self.source, self.year
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GdpGrowthRate {
    pub country: String,
    pub rank: u32,
    pub growth_rate_percent: f64,
    pub year: i32,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default)]
    pub note: Option<String>,
}

impl GdpGrowthRate {
    pub fn new(
        country: impl Into<String>,
        rank: u32,
        growth_rate_percent: f64,
        year: i32,
    ) -> Self {
        Self {
            country: country.into(),
            rank,
            growth_rate_percent,
            year,
            source: default_source(),
            note: None,
        }
    }
}

impl Display for GdpGrowthRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} {} {:.2}% ({}, {})",
            self.rank, self.country, self.growth_rate_percent, self.source, self.year
        )
    }
}

/// Per-country view merging both tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryStats {
    pub country: String,
    pub gdp_per_capita: Option<f64>,
    pub gdp_per_capita_rank: Option<u32>,
    pub gdp_growth_rate: Option<f64>,
    pub gdp_growth_rate_rank: Option<u32>,
    #[serde(default = "today")]
    pub last_updated: NaiveDate,
}

impl CountryStats {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            gdp_per_capita: None,
            gdp_per_capita_rank: None,
            gdp_growth_rate: None,
            gdp_growth_rate_rank: None,
            last_updated: today(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WikipediaGdpData {
    pub per_capita: Vec<GdpPerCapita>,
    pub growth_rates: Vec<GdpGrowthRate>,
    #[serde(default = "today")]
    pub extraction_date: NaiveDate,
    #[serde(default)]
    pub combined_data: BTreeMap<String, CountryStats>,
}

impl WikipediaGdpData {
    pub fn new(per_capita: Vec<GdpPerCapita>, growth_rates: Vec<GdpGrowthRate>) -> Self {
        Self {
            per_capita,
            growth_rates,
            extraction_date: today(),
            combined_data: BTreeMap::new(),
        }
    }

    /// Rebuilds `combined_data` from both record lists. Later entries for the
    /// same country overwrite earlier ones.
    pub fn combine_data(&mut self) {
        let mut countries: BTreeMap<String, CountryStats> = BTreeMap::new();

        for entry in &self.per_capita {
            let stats = countries
                .entry(entry.country.clone())
                .or_insert_with(|| CountryStats::new(&entry.country));
            stats.gdp_per_capita = Some(entry.gdp_per_capita);
            stats.gdp_per_capita_rank = Some(entry.rank);
        }

        for entry in &self.growth_rates {
            let stats = countries
                .entry(entry.country.clone())
                .or_insert_with(|| CountryStats::new(&entry.country));
            stats.gdp_growth_rate = Some(entry.growth_rate_percent);
            stats.gdp_growth_rate_rank = Some(entry.rank);
        }

        self.combined_data = countries;
    }
}

impl Display for WikipediaGdpData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} GDP per capita entries, {} growth rate entries, {} countries (extracted {})",
            self.per_capita.len(),
            self.growth_rates.len(),
            self.combined_data.len(),
            self.extraction_date
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_data() -> WikipediaGdpData {
        WikipediaGdpData::new(
            vec![
                GdpPerCapita::new("Country A", 1, 60000.0, 2023),
                GdpPerCapita::new("Country B", 2, 50000.0, 2023),
            ],
            vec![
                GdpGrowthRate::new("Country A", 2, 3.0, 2023),
                GdpGrowthRate::new("Country C", 1, 4.0, 2023),
            ],
        )
    }

    #[test]
    fn test_record_defaults() {
        let per_capita = GdpPerCapita::new("Test Country", 1, 50000.0, 2023);
        assert_eq!(per_capita.source, "IMF");
        assert!(per_capita.note.is_none());

        let growth = GdpGrowthRate {
            note: Some("Test note".to_string()),
            ..GdpGrowthRate::new("Test Country", 2, 3.5, 2023)
        };
        assert_eq!(growth.source, "IMF");
        assert_eq!(growth.note.as_deref(), Some("Test note"));

        let stats = CountryStats::new("Test Country");
        assert_eq!(stats.last_updated, today());
        assert!(stats.gdp_per_capita.is_none());
    }

    #[test]
    fn test_combined_data_empty_until_combined() {
        let data = sample_data();
        assert_eq!(data.per_capita.len(), 2);
        assert_eq!(data.growth_rates.len(), 2);
        assert!(data.combined_data.is_empty());
    }

    #[test]
    fn test_combine_data() {
        let mut data = sample_data();
        data.combine_data();

        assert_eq!(data.combined_data.len(), 3);

        let a = &data.combined_data["Country A"];
        assert_eq!(a.gdp_per_capita, Some(60000.0));
        assert_eq!(a.gdp_per_capita_rank, Some(1));
        assert_eq!(a.gdp_growth_rate, Some(3.0));
        assert_eq!(a.gdp_growth_rate_rank, Some(2));

        let b = &data.combined_data["Country B"];
        assert_eq!(b.gdp_per_capita, Some(50000.0));
        assert!(b.gdp_growth_rate.is_none());
        assert!(b.gdp_growth_rate_rank.is_none());

        let c = &data.combined_data["Country C"];
        assert!(c.gdp_per_capita.is_none());
        assert!(c.gdp_per_capita_rank.is_none());
        assert_eq!(c.gdp_growth_rate, Some(4.0));
        assert_eq!(c.gdp_growth_rate_rank, Some(1));
    }

    #[test]
    fn test_combine_data_later_duplicate_wins() {
        let mut data = WikipediaGdpData::new(
            vec![
                GdpPerCapita::new("Monaco", 1, 240000.0, 2022),
                GdpPerCapita::new("Monaco", 3, 230000.0, 2023),
            ],
            Vec::new(),
        );
        data.combine_data();

        assert_eq!(data.combined_data.len(), 1);
        assert_eq!(data.combined_data["Monaco"].gdp_per_capita_rank, Some(3));
    }

    #[test]
    fn test_display() {
        let mut data = sample_data();
        data.combine_data();

        assert_eq!(
            data.per_capita[0].to_string(),
            "#1 Country A 60000.00 (IMF, 2023)"
        );
        assert_eq!(
            data.growth_rates[1].to_string(),
            "#1 Country C 4.00% (IMF, 2023)"
        );
        assert!(
            data.to_string()
                .starts_with("2 GDP per capita entries, 2 growth rate entries, 3 countries")
        );
    }

    #[test]
    fn test_json_roundtrip() {
        let mut data = sample_data();
        data.combine_data();

        let json = serde_json::to_string(&data).expect("Failed to serialize");
        assert!(json.contains("\"extraction_date\""));

        let decoded: WikipediaGdpData = serde_json::from_str(&json).expect("Failed to decode");
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_json_missing_optional_fields() {
        let json = r#"{
            "per_capita": [{"country": "Ireland", "rank": 2, "gdp_per_capita": 94392.0, "year": 2023}],
            "growth_rates": []
        }"#;

        let decoded: WikipediaGdpData = serde_json::from_str(json).expect("Failed to decode");
        assert_eq!(decoded.per_capita[0].source, "IMF");
        assert!(decoded.combined_data.is_empty());
        assert_eq!(decoded.extraction_date, today());
    }
}
