use crate::config::ReportConfig;
use crate::types::{
    Aggregate, CategorySummary, CategoryTotalRow, DerivedMetrics, GroupRankingRow,
    RateRankingRow, ShareSlice, SummaryStats,
};
use crate::util::{format_decimal, format_int};
use std::cmp::Ordering;

/// Sort descending by value; equal values fall back to ascending key so the
/// ranking never depends on map iteration order.
pub fn rank_desc<'a, I>(items: I, limit: usize) -> Vec<(&'a str, f64)>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut v: Vec<(&str, f64)> = items.into_iter().collect();
    v.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    v.truncate(limit);
    v
}

/// Cumulative percent boundaries of each category's share of the grand
/// total, in configuration order.
///
/// Each slice starts where the previous one ended and the last one is
/// pinned to 100 so float drift cannot leave a gap. When every category is
/// zero all slices are empty.
pub fn share_slices(agg: &Aggregate, derived: &DerivedMetrics) -> Vec<ShareSlice> {
    let raw = agg.raw_total();
    let mut acc = 0.0;
    let mut out: Vec<ShareSlice> = agg
        .category_totals
        .iter()
        .enumerate()
        .map(|(i, total)| {
            let share = total / derived.grand_total;
            let start = acc;
            let end = acc + share * 100.0;
            acc = end;
            ShareSlice {
                category: i,
                share,
                start,
                end,
            }
        })
        .collect();
    if raw != 0.0 {
        if let Some(last) = out.last_mut() {
            last.end = 100.0;
        }
    }
    out
}

pub fn category_totals(agg: &Aggregate, derived: &DerivedMetrics) -> Vec<CategoryTotalRow> {
    agg.categories
        .iter()
        .zip(&agg.category_totals)
        .map(|(cat, total)| CategoryTotalRow {
            category: cat.label.clone(),
            total: format_int(*total),
            share: format_decimal(total / derived.grand_total * 100.0, 1),
        })
        .collect()
}

pub fn top_groups_by_total(
    derived: &DerivedMetrics,
    cfg: &ReportConfig,
) -> Vec<GroupRankingRow> {
    let totals = derived.group_total.iter().map(|(k, v)| (k.as_str(), *v));
    rank_desc(totals, cfg.top_n)
        .into_iter()
        .enumerate()
        .map(|(idx, (group, total))| GroupRankingRow {
            rank: idx + 1,
            group: cfg.group_label(group).to_string(),
            total: format_int(total),
        })
        .collect()
}

pub fn top_groups_by_rate(
    agg: &Aggregate,
    derived: &DerivedMetrics,
    cfg: &ReportConfig,
) -> Vec<RateRankingRow> {
    let rates = derived
        .group_rate_per_10k
        .iter()
        .map(|(k, v)| (k.as_str(), *v));
    rank_desc(rates, cfg.top_n)
        .into_iter()
        .enumerate()
        .map(|(idx, (group, rate))| {
            let (total, population) = agg
                .groups
                .get(group)
                .map(|g| (g.total(), g.population))
                .unwrap_or((0.0, 0.0));
            RateRankingRow {
                rank: idx + 1,
                group: cfg.group_label(group).to_string(),
                rate: format_decimal(rate, 2),
                total: format_int(total),
                population: format_int(population),
            }
        })
        .collect()
}

pub fn generate_summary(
    agg: &Aggregate,
    derived: &DerivedMetrics,
    cfg: &ReportConfig,
) -> SummaryStats {
    let slices = share_slices(agg, derived);
    let categories = agg
        .categories
        .iter()
        .zip(&agg.category_totals)
        .zip(&slices)
        .enumerate()
        .map(|(i, ((cat, total), slice))| CategorySummary {
            id: cat.id.clone(),
            label: cat.label.clone(),
            total: *total,
            share: slice.share,
            rate_per_10k: agg.category_rate(i),
        })
        .collect();
    SummaryStats {
        input: cfg.input_name(),
        total_records: agg.total_records(),
        total_groups: derived.group_count,
        total_population: derived.total_population,
        grand_total: derived.grand_total,
        mean_per_group: derived.mean_per_group,
        global_rate_per_10k: derived.global_rate_per_10k,
        categories,
    }
}
