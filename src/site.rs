// Builds the page models of the dashboard: the index page (KPIs, donut and
// the four summary tables) and one page per category (table and charts).
use crate::chart::{ChartImage, ChartKind, ChartRenderer};
use crate::config::{Category, ReportConfig};
use crate::html::{Block, Cell, Donut, Kpi, LegendItem, Link, Page, Section, Table};
use crate::reports::{
    category_totals, rank_desc, share_slices, top_groups_by_rate, top_groups_by_total,
};
use crate::types::{Aggregate, DerivedMetrics};
use crate::util::{format_decimal, format_int};
use tracing::warn;

pub const SITE_TITLE: &str = "Police municipale";
pub const INDEX_KEY: &str = "index";

pub fn navigation(cfg: &ReportConfig) -> Vec<Link> {
    let mut links = vec![Link {
        href: "index.html".to_string(),
        label: "Accueil".to_string(),
        key: INDEX_KEY.to_string(),
    }];
    links.extend(cfg.categories.iter().map(|c| Link {
        href: format!("{}.html", c.slug),
        label: c.label.clone(),
        key: c.slug.clone(),
    }));
    links
}

pub fn build_pages(
    agg: &Aggregate,
    derived: &DerivedMetrics,
    cfg: &ReportConfig,
    charts: &dyn ChartRenderer,
) -> Vec<Page> {
    let mut pages = vec![index_page(agg, derived, cfg)];
    for (i, cat) in cfg.categories.iter().enumerate() {
        pages.push(category_page(agg, cfg, i, cat, charts));
    }
    pages
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn donut(agg: &Aggregate, derived: &DerivedMetrics) -> Donut {
    let slices = share_slices(agg, derived);
    let stops = slices
        .iter()
        .map(|s| {
            let color = &agg.categories[s.category].color;
            format!("{} {:.4}% {:.4}%", color, s.start, s.end)
        })
        .collect::<Vec<_>>()
        .join(", ");
    let legend = agg
        .categories
        .iter()
        .zip(&agg.category_totals)
        .map(|(cat, total)| LegendItem {
            color: cat.color.clone(),
            label: cat.label.clone(),
            value: format_int(*total),
        })
        .collect();
    Donut {
        stops,
        center: format_int(derived.grand_total),
        legend,
    }
}

fn index_page(agg: &Aggregate, derived: &DerivedMetrics, cfg: &ReportConfig) -> Page {
    let kpis = vec![
        Kpi {
            label: "Départements".to_string(),
            value: derived.group_count.to_string(),
        },
        Kpi {
            label: "Communes".to_string(),
            value: format_int(agg.total_records() as f64),
        },
        Kpi {
            label: "Population totale".to_string(),
            value: format_int(derived.total_population),
        },
        Kpi {
            label: "Total général".to_string(),
            value: format_int(derived.grand_total),
        },
        Kpi {
            label: "Moyenne / département".to_string(),
            value: format_int(derived.mean_per_group),
        },
        Kpi {
            label: "Taux global / 10 000".to_string(),
            value: format_decimal(derived.global_rate_per_10k, 2),
        },
    ];

    let totals = Table {
        headers: headers(&["Spécialité", "Total", "Part (%)"]),
        rows: category_totals(agg, derived)
            .into_iter()
            .map(|r| vec![Cell::text(r.category), Cell::num(r.total), Cell::num(format!("{}%", r.share))])
            .collect(),
    };

    let top_abs = Table {
        headers: headers(&["Département", "Total (toutes spécialités)"]),
        rows: top_groups_by_total(derived, cfg)
            .into_iter()
            .map(|r| vec![Cell::text(r.group), Cell::num(r.total)])
            .collect(),
    };

    let top_rate = Table {
        headers: headers(&["Département", "Taux / 10 000", "Total", "Population"]),
        rows: top_groups_by_rate(agg, derived, cfg)
            .into_iter()
            .map(|r| {
                vec![
                    Cell::text(r.group),
                    Cell::num(r.rate),
                    Cell::num(r.total),
                    Cell::num(r.population),
                ]
            })
            .collect(),
    };

    let mut matrix_headers = vec!["Département".to_string()];
    matrix_headers.extend(cfg.categories.iter().map(|c| c.label.clone()));
    matrix_headers.push("Communes".to_string());
    matrix_headers.push("Total".to_string());
    let matrix = Table {
        headers: matrix_headers,
        rows: agg
            .groups
            .iter()
            .map(|(key, g)| {
                let mut row = vec![Cell::text(cfg.group_label(key))];
                row.extend(g.values.iter().map(|v| Cell::num(format_int(*v))));
                row.push(Cell::num(format_int(g.records as f64)));
                row.push(Cell::num(format_int(g.total())));
                row
            })
            .collect(),
    };

    Page {
        file_name: "index.html".to_string(),
        title: "Police municipale : effectifs par département".to_string(),
        active: INDEX_KEY.to_string(),
        header: vec![
            Block::Figure {
                text: "Analyse du fichier".to_string(),
                value: cfg.input_name(),
            },
            Block::Kpis(kpis),
        ],
        sections: vec![
            Section {
                id: "donut".to_string(),
                heading: "Répartition des spécialités".to_string(),
                blocks: vec![Block::Donut(donut(agg, derived))],
            },
            Section {
                id: "totaux".to_string(),
                heading: "Tableau 1 : totaux par spécialité".to_string(),
                blocks: vec![Block::Table(totals)],
            },
            Section {
                id: "top".to_string(),
                heading: format!("Tableau 2 : top {} départements (total)", cfg.top_n),
                blocks: vec![Block::Table(top_abs)],
            },
            Section {
                id: "taux10k".to_string(),
                heading: "Tableau 3 : classement par taux / 10 000 habitants".to_string(),
                blocks: vec![Block::Table(top_rate)],
            },
            Section {
                id: "par-dep".to_string(),
                heading: "Tableau 4 : par département (spécialités en colonnes)".to_string(),
                blocks: vec![Block::Table(matrix)],
            },
        ],
    }
}

/// Ask the renderer for a chart; any failure degrades to the table fallback.
fn chart_block(
    charts: &dyn ChartRenderer,
    caption: &str,
    value_header: &str,
    ranked: &[(String, String, f64)],
) -> Block {
    let labels: Vec<String> = ranked.iter().map(|(l, _, _)| l.clone()).collect();
    let values: Vec<f64> = ranked.iter().map(|(_, _, v)| *v).collect();
    let image: Option<ChartImage> = match charts.render_chart(ChartKind::Bar, caption, &labels, &values) {
        Ok(img) => img,
        Err(e) => {
            warn!(error = %e, chart = caption, "chart unavailable, using table");
            None
        }
    };
    let fallback = Table {
        headers: vec!["Département".to_string(), value_header.to_string()],
        rows: ranked
            .iter()
            .map(|(label, shown, _)| vec![Cell::text(label.as_str()), Cell::num(shown.as_str())])
            .collect(),
    };
    Block::Chart {
        caption: caption.to_string(),
        image,
        fallback,
    }
}

fn category_page(
    agg: &Aggregate,
    cfg: &ReportConfig,
    index: usize,
    cat: &Category,
    charts: &dyn ChartRenderer,
) -> Page {
    let column = agg.category_column(index);
    let per_group = Table {
        headers: vec!["Département".to_string(), cat.label.clone()],
        rows: column
            .iter()
            .map(|(key, v)| vec![Cell::text(cfg.group_label(key)), Cell::num(format_int(*v))])
            .collect(),
    };

    let top_abs: Vec<(String, String, f64)> = rank_desc(column.iter().copied(), cfg.chart_top_n)
        .into_iter()
        .map(|(k, v)| (cfg.group_label(k).to_string(), format_int(v), v))
        .collect();
    let top_rate: Vec<(String, String, f64)> =
        rank_desc(agg.category_rates(index), cfg.chart_top_n)
            .into_iter()
            .map(|(k, v)| (cfg.group_label(k).to_string(), format_decimal(v, 2), v))
            .collect();

    let others: Vec<Link> = cfg
        .categories
        .iter()
        .filter(|c| c.slug != cat.slug)
        .map(|c| Link {
            href: format!("{}.html", c.slug),
            label: c.label.clone(),
            key: c.slug.clone(),
        })
        .collect();

    Page {
        file_name: format!("{}.html", cat.slug),
        title: format!("Police municipale : {}", cat.label),
        active: cat.slug.clone(),
        header: vec![],
        sections: vec![
            Section {
                id: "categorie".to_string(),
                heading: cat.label.clone(),
                blocks: vec![
                    Block::Figure {
                        text: "Total national :".to_string(),
                        value: format_int(agg.category_totals.get(index).copied().unwrap_or(0.0)),
                    },
                    Block::Links(others),
                ],
            },
            Section {
                id: "par-dep".to_string(),
                heading: "Nombre par département".to_string(),
                blocks: vec![
                    Block::Table(per_group),
                    chart_block(
                        charts,
                        &format!("Top {} {} (absolu)", cfg.chart_top_n, cat.label),
                        &cat.label,
                        &top_abs,
                    ),
                ],
            },
            Section {
                id: "taux10k".to_string(),
                heading: "Moyenne pour 10 000 habitants".to_string(),
                blocks: vec![
                    Block::Figure {
                        text: "Valeur globale (toutes communes) :".to_string(),
                        value: format_decimal(agg.category_rate(index), 2),
                    },
                    chart_block(
                        charts,
                        &format!("Taux par département (pour 10 000) : {}", cat.label),
                        "Taux / 10 000",
                        &top_rate,
                    ),
                ],
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::chart::NoCharts;
    use crate::error::ReportError;
    use crate::loader::Record;

    struct Broken;

    impl ChartRenderer for Broken {
        fn render_chart(
            &self,
            _kind: ChartKind,
            _title: &str,
            _labels: &[String],
            _values: &[f64],
        ) -> Result<Option<ChartImage>, ReportError> {
            Err(ReportError::Chart("no backend".to_string()))
        }
    }

    fn sample() -> (Aggregate, ReportConfig) {
        let cfg = ReportConfig::default();
        let rows: Vec<Record> = vec![
            [("departement", "01"), ("habitants", "1000"), ("agents_police", "5"), ("asvp", "1")]
                .into_iter()
                .collect(),
            [("departement", "02"), ("habitants", "2000"), ("agents_police", "2"), ("asvp", "2")]
                .into_iter()
                .collect(),
        ];
        (aggregate(&rows, &cfg), cfg)
    }

    #[test]
    fn one_page_per_category_plus_index() {
        let (agg, cfg) = sample();
        let pages = build_pages(&agg, &agg.derive(), &cfg, &NoCharts);
        let names: Vec<&str> = pages.iter().map(|p| p.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["index.html", "agents.html", "asvp.html", "gardes.html", "maitres.html", "chiens.html"]
        );
        assert_eq!(navigation(&cfg).len(), pages.len());
    }

    #[test]
    fn donut_stops_use_four_decimals() {
        let (agg, _) = sample();
        let d = donut(&agg, &agg.derive());
        assert!(d.stops.starts_with("#4BC0C0 0.0000% 70.0000%, #36A2EB 70.0000% 100.0000%"));
        assert_eq!(d.center, "10");
    }

    #[test]
    fn failing_renderer_degrades_to_table() {
        let (agg, cfg) = sample();
        let page = category_page(&agg, &cfg, 0, &cfg.categories[0], &Broken);
        let chart = page.sections[1].blocks[1].clone();
        match chart {
            Block::Chart { image, fallback, .. } => {
                assert!(image.is_none());
                assert_eq!(fallback.rows[0][0].text, "01");
                assert_eq!(fallback.rows[0][1].text, "5");
            }
            other => panic!("unexpected block {:?}", other),
        }
    }
}
