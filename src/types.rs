use crate::config::Category;
use serde::Serialize;
use std::collections::BTreeMap;
use tabled::Tabled;

/// Running totals for one department.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupTotals {
    pub population: f64,
    /// One entry per category, in configuration order.
    pub values: Vec<f64>,
    /// Number of input rows (communes) seen for the group.
    pub records: usize,
}

impl GroupTotals {
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

/// Result of the single fold over the input.
///
/// Population and per-category values live in the same `GroupTotals`, so a
/// group cannot have one without the other. Groups are kept in key order.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub categories: Vec<Category>,
    pub category_totals: Vec<f64>,
    pub groups: BTreeMap<String, GroupTotals>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedMetrics {
    /// Sum of all category totals, `1.0` when that sum is zero.
    pub grand_total: f64,
    pub total_population: f64,
    pub group_count: usize,
    pub mean_per_group: f64,
    pub global_rate_per_10k: f64,
    pub group_total: BTreeMap<String, f64>,
    pub group_rate_per_10k: BTreeMap<String, f64>,
}

/// One slice of the proportional breakdown, boundaries in percent.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareSlice {
    pub category: usize,
    pub share: f64,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CategoryTotalRow {
    #[serde(rename = "Specialite")]
    #[tabled(rename = "Spécialité")]
    pub category: String,
    #[serde(rename = "Total")]
    #[tabled(rename = "Total")]
    pub total: String,
    #[serde(rename = "Part")]
    #[tabled(rename = "Part (%)")]
    pub share: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct GroupRankingRow {
    #[serde(rename = "Rang")]
    #[tabled(rename = "Rang")]
    pub rank: usize,
    #[serde(rename = "Departement")]
    #[tabled(rename = "Département")]
    pub group: String,
    #[serde(rename = "Total")]
    #[tabled(rename = "Total")]
    pub total: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RateRankingRow {
    #[serde(rename = "Rang")]
    #[tabled(rename = "Rang")]
    pub rank: usize,
    #[serde(rename = "Departement")]
    #[tabled(rename = "Département")]
    pub group: String,
    #[serde(rename = "Taux10k")]
    #[tabled(rename = "Taux / 10 000")]
    pub rate: String,
    #[serde(rename = "Total")]
    #[tabled(rename = "Total")]
    pub total: String,
    #[serde(rename = "Population")]
    #[tabled(rename = "Population")]
    pub population: String,
}

#[derive(Debug, Serialize)]
pub struct CategorySummary {
    pub id: String,
    pub label: String,
    pub total: f64,
    pub share: f64,
    pub rate_per_10k: f64,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub input: String,
    pub total_records: usize,
    pub total_groups: usize,
    pub total_population: f64,
    pub grand_total: f64,
    pub mean_per_group: f64,
    pub global_rate_per_10k: f64,
    pub categories: Vec<CategorySummary>,
}
