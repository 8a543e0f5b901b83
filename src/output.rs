use crate::error::ReportError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

/// A fully rendered output file, kept in memory until every document of the
/// run is ready.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub file_name: String,
    pub contents: String,
}

pub fn json_document<T: Serialize>(file_name: &str, value: &T) -> Result<Document, ReportError> {
    let mut contents = serde_json::to_string_pretty(value)?;
    contents.push('\n');
    Ok(Document {
        file_name: file_name.to_string(),
        contents,
    })
}

/// Write every document into `dir`, creating it if needed.
pub fn write_documents(dir: &Path, docs: &[Document]) -> Result<Vec<PathBuf>, ReportError> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(docs.len());
    for doc in docs {
        let path = dir.join(&doc.file_name);
        std::fs::write(&path, &doc.contents)?;
        info!(path = %path.display(), bytes = doc.contents.len(), "document written");
        written.push(path);
    }
    Ok(written)
}

pub fn preview_table_rows<T>(title: &str, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}\n", title);
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(aucune ligne)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}
