// Single-pass fold of the survey records into department totals, and the
// metrics derived from it once the fold is done.
use crate::config::ReportConfig;
use crate::loader::Record;
use crate::types::{Aggregate, DerivedMetrics, GroupTotals};
use crate::util::{rate_per_10k, to_num};
use std::collections::BTreeMap;
use tracing::debug;

pub fn aggregate<'a, I>(records: I, cfg: &ReportConfig) -> Aggregate
where
    I: IntoIterator<Item = &'a Record>,
{
    let n = cfg.categories.len();
    let mut category_totals = vec![0.0; n];
    let mut groups: BTreeMap<String, GroupTotals> = BTreeMap::new();

    for r in records {
        let key = r.get(&cfg.group_field).unwrap_or("").to_string();
        let e = groups.entry(key).or_insert_with(|| GroupTotals {
            population: 0.0,
            values: vec![0.0; n],
            records: 0,
        });
        e.population += to_num(r.get(&cfg.population_field));
        e.records += 1;
        for (i, cat) in cfg.categories.iter().enumerate() {
            let v = to_num(r.get(&cat.id));
            category_totals[i] += v;
            e.values[i] += v;
        }
    }
    debug!(groups = groups.len(), "aggregation done");

    Aggregate {
        categories: cfg.categories.clone(),
        category_totals,
        groups,
    }
}

impl Aggregate {
    /// Sum of the category totals, without the zero guard.
    pub fn raw_total(&self) -> f64 {
        self.category_totals.iter().sum()
    }

    pub fn total_population(&self) -> f64 {
        self.groups.values().map(|g| g.population).sum()
    }

    pub fn total_records(&self) -> usize {
        self.groups.values().map(|g| g.records).sum()
    }

    /// Values of one category per group, in key order.
    pub fn category_column(&self, category: usize) -> Vec<(&str, f64)> {
        self.groups
            .iter()
            .map(|(k, g)| (k.as_str(), g.values.get(category).copied().unwrap_or(0.0)))
            .collect()
    }

    /// Rate per 10 000 inhabitants of one category, per group with a
    /// positive population.
    pub fn category_rates(&self, category: usize) -> Vec<(&str, f64)> {
        self.groups
            .iter()
            .filter(|(_, g)| g.population > 0.0)
            .map(|(k, g)| {
                let v = g.values.get(category).copied().unwrap_or(0.0);
                (k.as_str(), rate_per_10k(v, g.population))
            })
            .collect()
    }

    pub fn category_rate(&self, category: usize) -> f64 {
        let v = self.category_totals.get(category).copied().unwrap_or(0.0);
        rate_per_10k(v, self.total_population())
    }

    pub fn derive(&self) -> DerivedMetrics {
        let raw = self.raw_total();
        let grand_total = if raw == 0.0 { 1.0 } else { raw };
        let total_population = self.total_population();
        let group_count = self.groups.len();
        let mean_per_group = if group_count > 0 {
            grand_total / group_count as f64
        } else {
            0.0
        };

        let group_total: BTreeMap<String, f64> = self
            .groups
            .iter()
            .map(|(k, g)| (k.clone(), g.total()))
            .collect();
        let group_rate_per_10k = self
            .groups
            .iter()
            .map(|(k, g)| (k.clone(), rate_per_10k(g.total(), g.population)))
            .collect();

        DerivedMetrics {
            grand_total,
            total_population,
            group_count,
            mean_per_group,
            global_rate_per_10k: rate_per_10k(grand_total, total_population),
            group_total,
            group_rate_per_10k,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Category;

    fn cfg() -> ReportConfig {
        ReportConfig {
            categories: vec![
                Category::new("agents_police", "Agents", "agents", "#000"),
                Category::new("asvp", "ASVP", "asvp", "#111"),
            ],
            ..ReportConfig::default()
        }
    }

    fn rec(dep: &str, pop: &str, agents: &str, asvp: &str) -> Record {
        [
            ("departement", dep),
            ("habitants", pop),
            ("agents_police", agents),
            ("asvp", asvp),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn sums_per_group_and_category() {
        let rows = vec![
            rec("01", "1000", "5", "1"),
            rec("01", "500", "3", "0"),
            rec("02", "2000", "0", "2,5"),
        ];
        let agg = aggregate(&rows, &cfg());
        assert_eq!(agg.category_totals, vec![8.0, 3.5]);
        assert_eq!(agg.groups["01"].population, 1500.0);
        assert_eq!(agg.groups["01"].values, vec![8.0, 1.0]);
        assert_eq!(agg.groups["01"].records, 2);
        assert_eq!(agg.total_records(), 3);
    }

    #[test]
    fn blank_group_is_its_own_group() {
        let rows = vec![rec("", "100", "1", "0"), rec("01", "100", "1", "0")];
        let agg = aggregate(&rows, &cfg());
        assert_eq!(agg.groups.len(), 2);
        assert_eq!(agg.groups[""].values[0], 1.0);
    }

    #[test]
    fn missing_category_column_counts_as_zero() {
        let rows: Vec<Record> = vec![[("departement", "05"), ("habitants", "10")]
            .into_iter()
            .collect()];
        let agg = aggregate(&rows, &cfg());
        assert_eq!(agg.groups["05"].values, vec![0.0, 0.0]);
        assert_eq!(agg.groups["05"].population, 10.0);
    }

    #[test]
    fn rate_for_known_group() {
        let rows = vec![rec("13", "30000", "100", "20")];
        let d = aggregate(&rows, &cfg()).derive();
        assert_eq!(d.group_total["13"], 120.0);
        assert!((d.group_rate_per_10k["13"] - 40.0).abs() < 1e-9);
    }

    #[test]
    fn zero_total_is_guarded() {
        let rows = vec![rec("01", "0", "0", "0"), rec("02", "0", "x", "")];
        let d = aggregate(&rows, &cfg()).derive();
        assert_eq!(d.grand_total, 1.0);
        assert_eq!(d.mean_per_group, 0.5);
        assert_eq!(d.global_rate_per_10k, 0.0);
        assert_eq!(d.group_rate_per_10k["01"], 0.0);
    }

    #[test]
    fn no_groups_means_zero_mean() {
        let rows: Vec<Record> = Vec::new();
        let d = aggregate(&rows, &cfg()).derive();
        assert_eq!(d.group_count, 0);
        assert_eq!(d.mean_per_group, 0.0);
    }

    #[test]
    fn category_rates_skip_groups_without_population() {
        let rows = vec![rec("01", "10000", "4", "0"), rec("02", "0", "9", "0")];
        let agg = aggregate(&rows, &cfg());
        assert_eq!(agg.category_rates(0), vec![("01", 4.0)]);
        assert!((agg.category_rate(0) - 13.0).abs() < 1e-9);
    }
}
