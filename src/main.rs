// Entry point: generate the municipal police dashboard from the survey CSV
// in the current directory, then print a short preview of the rankings.
use anyhow::Context;
use pm_report::config::ReportConfig;
use pm_report::output::preview_table_rows;
use pm_report::reports;
use pm_report::util::format_int;
use tracing::Level;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let cfg = ReportConfig::default();
    let outcome = pm_report::run(&cfg)
        .with_context(|| format!("report generation failed for {}", cfg.input.display()))?;

    println!(
        "Processing dataset... ({} rows loaded, delimiter '{}')",
        format_int(outcome.load.total_rows as f64),
        outcome.load.delimiter
    );
    if outcome.load.skipped_rows > 0 {
        println!(
            "Note: {} rows skipped due to parse errors.",
            format_int(outcome.load.skipped_rows as f64)
        );
    }
    println!();

    let agg = &outcome.aggregate;
    let derived = &outcome.derived;
    preview_table_rows(
        "Totaux par spécialité",
        &reports::category_totals(agg, derived),
        cfg.categories.len(),
    );
    preview_table_rows(
        "Top départements (total)",
        &reports::top_groups_by_total(derived, &cfg),
        5,
    );
    preview_table_rows(
        "Top départements (taux / 10 000)",
        &reports::top_groups_by_rate(agg, derived, &cfg),
        5,
    );

    println!("{} fichiers générés :", outcome.written.len());
    for path in &outcome.written {
        println!("  {}", path.display());
    }
    Ok(())
}
