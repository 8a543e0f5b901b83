// Municipal police staffing reports.
//
// Reads the per-commune survey CSV, folds it into per-department totals
// for each staffing specialty and writes a small static HTML dashboard
// plus a JSON summary. The pipeline is `load` -> `aggregate` -> `render`
// -> `write_documents`, each stage a plain function of the previous one.

pub mod aggregate;
pub mod chart;
pub mod config;
pub mod error;
pub mod html;
pub mod loader;
pub mod output;
pub mod reports;
pub mod site;
pub mod types;
pub mod util;

use chart::{ChartRenderer, NoCharts, SvgBarChart};
use config::ReportConfig;
use error::ReportError;
use loader::LoadReport;
use output::{json_document, write_documents, Document};
use std::path::PathBuf;
use tracing::info;
use types::{Aggregate, DerivedMetrics};

pub use aggregate::aggregate;
pub use loader::load_records as load;

pub const SUMMARY_FILE: &str = "summary.json";

/// Everything a finished run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub load: LoadReport,
    pub aggregate: Aggregate,
    pub derived: DerivedMetrics,
    pub written: Vec<PathBuf>,
}

pub fn chart_renderer(cfg: &ReportConfig) -> Box<dyn ChartRenderer> {
    if cfg.charts_enabled {
        Box::new(SvgBarChart::default())
    } else {
        Box::new(NoCharts)
    }
}

/// Render every output document in memory.
pub fn render(
    agg: &Aggregate,
    derived: &DerivedMetrics,
    cfg: &ReportConfig,
    charts: &dyn ChartRenderer,
) -> Result<Vec<Document>, ReportError> {
    let nav = site::navigation(cfg);
    let mut docs: Vec<Document> = site::build_pages(agg, derived, cfg, charts)
        .iter()
        .map(|page| Document {
            file_name: page.file_name.clone(),
            contents: html::render_page(page, &nav, site::SITE_TITLE, &cfg.stylesheet),
        })
        .collect();
    let summary = reports::generate_summary(agg, derived, cfg);
    docs.push(json_document(SUMMARY_FILE, &summary)?);
    Ok(docs)
}

/// Full pipeline. Nothing is written unless loading and rendering both
/// succeeded.
pub fn run(cfg: &ReportConfig) -> Result<RunOutcome, ReportError> {
    let (records, load_report) = load(&cfg.input)?;
    let agg = aggregate(&records, cfg);
    drop(records);
    let derived = agg.derive();
    info!(
        groups = derived.group_count,
        grand_total = derived.grand_total,
        population = derived.total_population,
        "aggregation complete"
    );

    let charts = chart_renderer(cfg);
    let docs = render(&agg, &derived, cfg, charts.as_ref())?;
    let written = write_documents(&cfg.output_dir, &docs)?;
    Ok(RunOutcome {
        load: load_report,
        aggregate: agg,
        derived,
        written,
    })
}
