// Run configuration, resolved once at startup and passed explicitly to
// every pipeline stage: input file, column names, specialty list with
// colours, ranking sizes.
use serde::Serialize;
use std::path::PathBuf;

/// One measured quantity: a staffing specialty column of the survey.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Category {
    /// CSV column holding the value.
    pub id: String,
    pub label: String,
    /// File stem of the category's own page.
    pub slug: String,
    pub color: String,
}

impl Category {
    pub fn new(id: &str, label: &str, slug: &str, color: &str) -> Self {
        Category {
            id: id.to_string(),
            label: label.to_string(),
            slug: slug.to_string(),
            color: color.to_string(),
        }
    }
}

/// The five specialties of the municipal police survey, in display order.
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new("agents_police", "Agents de police", "agents", "#4BC0C0"),
        Category::new("asvp", "ASVP", "asvp", "#36A2EB"),
        Category::new("gardes_champetres", "Gardes champêtres", "gardes", "#9966FF"),
        Category::new("maitre_chien", "Maîtres-chiens", "maitres", "#FF6384"),
        Category::new("chien_police", "Chiens de police", "chiens", "#FF9F40"),
    ]
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub group_field: String,
    pub population_field: String,
    /// Display label for records whose group field is blank.
    pub unknown_group_label: String,
    pub categories: Vec<Category>,
    /// Rows in the index page rankings.
    pub top_n: usize,
    /// Bars in the per-category charts.
    pub chart_top_n: usize,
    pub stylesheet: String,
    pub charts_enabled: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            input: PathBuf::from("enquete-police-municipal.csv"),
            output_dir: PathBuf::from("."),
            group_field: "departement".to_string(),
            population_field: "habitants".to_string(),
            unknown_group_label: "inconnu".to_string(),
            categories: default_categories(),
            top_n: 10,
            chart_top_n: 15,
            stylesheet: "style.css".to_string(),
            charts_enabled: true,
        }
    }
}

impl ReportConfig {
    /// Name shown in page headers for the input file.
    pub fn input_name(&self) -> String {
        self.input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.input.display().to_string())
    }

    pub fn group_label<'a>(&'a self, key: &'a str) -> &'a str {
        if key.is_empty() {
            &self.unknown_group_label
        } else {
            key
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_categories_have_unique_slugs() {
        let cats = default_categories();
        assert_eq!(cats.len(), 5);
        let mut slugs: Vec<&str> = cats.iter().map(|c| c.slug.as_str()).collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), 5);
    }

    #[test]
    fn blank_group_gets_unknown_label() {
        let cfg = ReportConfig::default();
        assert_eq!(cfg.group_label(""), "inconnu");
        assert_eq!(cfg.group_label("75"), "75");
    }
}
