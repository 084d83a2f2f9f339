use std::collections::BTreeMap;
use std::fmt::Display;

use crate::types::CountryStats;

fn top_by<F>(combined: &BTreeMap<String, CountryStats>, n: usize, value: F) -> Vec<(&str, f64)>
where
    F: Fn(&CountryStats) -> Option<f64>,
{
    let mut ranked: Vec<(&str, f64)> = combined
        .values()
        .filter_map(|stats| value(stats).map(|v| (stats.country.as_str(), v)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(n);
    ranked
}

pub fn top_by_gdp_per_capita(
    combined: &BTreeMap<String, CountryStats>,
    n: usize,
) -> Vec<(&str, f64)> {
    top_by(combined, n, |s| s.gdp_per_capita)
}

pub fn top_by_growth_rate(
    combined: &BTreeMap<String, CountryStats>,
    n: usize,
) -> Vec<(&str, f64)> {
    top_by(combined, n, |s| s.gdp_growth_rate)
}

/// `1234567.891` -> `1,234,567.89`
pub fn format_thousands(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

#[derive(Debug)]
pub struct GdpSummary<'a> {
    pub by_gdp_per_capita: Vec<(&'a str, f64)>,
    pub by_growth_rate: Vec<(&'a str, f64)>,
}

impl<'a> GdpSummary<'a> {
    pub fn from_combined_data(combined: &'a BTreeMap<String, CountryStats>, top_n: usize) -> Self {
        GdpSummary {
            by_gdp_per_capita: top_by_gdp_per_capita(combined, top_n),
            by_growth_rate: top_by_growth_rate(combined, top_n),
        }
    }
}

impl Display for GdpSummary<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Top Countries by GDP per Capita ===")?;
        for (i, (country, value)) in self.by_gdp_per_capita.iter().enumerate() {
            writeln!(f, "{}. {}: ${}", i + 1, country, format_thousands(*value))?;
        }

        writeln!(f, "\n=== Top Countries by GDP Growth Rate ===")?;
        for (i, (country, value)) in self.by_growth_rate.iter().enumerate() {
            writeln!(f, "{}. {}: {:.2}%", i + 1, country, value)?;
        }
        Ok(())
    }
}
