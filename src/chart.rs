// Chart rendering behind a narrow interface.
//
// Pages ask a `ChartRenderer` for an image of a labelled series and fall
// back to a plain table when it returns nothing. The default renderer draws
// an SVG bar chart with plotters and hands it back as a base64 `data:` URI,
// so the chart text never lands in the page markup itself.

use crate::error::ReportError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use plotters::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
}

/// An embeddable chart image.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartImage {
    /// `data:` URI usable as an `<img src>`.
    pub src: String,
    pub alt: String,
}

pub trait ChartRenderer {
    /// `Ok(None)` means charts are unavailable and the caller should show its
    /// table fallback.
    fn render_chart(
        &self,
        kind: ChartKind,
        title: &str,
        labels: &[String],
        values: &[f64],
    ) -> Result<Option<ChartImage>, ReportError>;
}

/// Renderer used when charts are disabled.
pub struct NoCharts;

impl ChartRenderer for NoCharts {
    fn render_chart(
        &self,
        _kind: ChartKind,
        _title: &str,
        _labels: &[String],
        _values: &[f64],
    ) -> Result<Option<ChartImage>, ReportError> {
        Ok(None)
    }
}

pub struct SvgBarChart {
    pub width: u32,
    pub height: u32,
    pub color: RGBColor,
}

impl Default for SvgBarChart {
    fn default() -> Self {
        SvgBarChart {
            width: 900,
            height: 450,
            color: RGBColor(54, 162, 235),
        }
    }
}

fn chart_err<E: std::fmt::Display>(e: E) -> ReportError {
    ReportError::Chart(e.to_string())
}

impl SvgBarChart {
    fn draw_bars(&self, title: &str, labels: &[String], values: &[f64]) -> Result<String, ReportError> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.width, self.height)).into_drawing_area();
            root.fill(&WHITE).map_err(chart_err)?;

            let max = values.iter().copied().fold(0.0_f64, f64::max);
            let y_max = if max > 0.0 { max * 1.1 } else { 1.0 };
            let mut chart = ChartBuilder::on(&root)
                .caption(title, ("sans-serif", 20))
                .margin(10)
                .x_label_area_size(70)
                .y_label_area_size(60)
                .build_cartesian_2d((0..labels.len()).into_segmented(), 0.0..y_max)
                .map_err(chart_err)?;

            let label_of = |x: &SegmentValue<usize>| match x {
                SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
                _ => String::new(),
            };
            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(labels.len())
                .x_label_formatter(&label_of)
                .draw()
                .map_err(chart_err)?;

            // One rectangle per value, emitted in input order.
            let style = self.color.filled();
            chart
                .draw_series(values.iter().enumerate().map(|(i, v)| {
                    let mut bar = Rectangle::new(
                        [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), *v)],
                        style,
                    );
                    bar.set_margin(0, 0, 4, 4);
                    bar
                }))
                .map_err(chart_err)?;
            root.present().map_err(chart_err)?;
        }
        Ok(svg)
    }
}

impl ChartRenderer for SvgBarChart {
    fn render_chart(
        &self,
        kind: ChartKind,
        title: &str,
        labels: &[String],
        values: &[f64],
    ) -> Result<Option<ChartImage>, ReportError> {
        if labels.is_empty() || labels.len() != values.len() {
            return Ok(None);
        }
        let svg = match kind {
            ChartKind::Bar => self.draw_bars(title, labels, values)?,
        };
        Ok(Some(ChartImage {
            src: format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg.as_bytes())),
            alt: title.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_renderer_returns_nothing() {
        let out = NoCharts
            .render_chart(ChartKind::Bar, "t", &["a".to_string()], &[1.0])
            .unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn empty_series_has_no_chart() {
        let out = SvgBarChart::default()
            .render_chart(ChartKind::Bar, "t", &[], &[])
            .unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn bar_chart_is_an_svg_data_uri() {
        let labels = vec!["01".to_string(), "<b>".to_string()];
        let img = SvgBarChart::default()
            .render_chart(ChartKind::Bar, "Top", &labels, &[3.0, 1.5])
            .unwrap()
            .unwrap();
        assert!(img.src.starts_with("data:image/svg+xml;base64,"));
        assert!(!img.src.contains('<'));
        let raw = STANDARD
            .decode(img.src.trim_start_matches("data:image/svg+xml;base64,"))
            .unwrap();
        assert!(String::from_utf8(raw).unwrap().contains("<svg"));
    }

    #[test]
    fn same_series_renders_identical_bytes() {
        let labels: Vec<String> = (1..=15).map(|i| format!("{:02}", i)).collect();
        let values: Vec<f64> = (1..=15).map(|i| (i * 7 % 11) as f64).collect();
        let chart = SvgBarChart::default();
        let first = chart
            .render_chart(ChartKind::Bar, "Top", &labels, &values)
            .unwrap()
            .unwrap();
        for _ in 0..5 {
            let again = chart
                .render_chart(ChartKind::Bar, "Top", &labels, &values)
                .unwrap()
                .unwrap();
            assert_eq!(again.src, first.src);
        }
    }
}
