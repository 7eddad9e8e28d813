//! Local CSV file standing in for the shared spreadsheet

use super::COLUMNS;
use crate::services::submission::SheetStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::fs::OpenOptions;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct CsvSheetStore {
    path: PathBuf,
}

impl CsvSheetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn append_sync(&self, row: &[Value]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open CSV file: {}", self.path.display()))?;
        let is_new = file.metadata()?.len() == 0;

        let mut writer = ::csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if is_new {
            writer.write_record(COLUMNS)?;
        }
        writer.write_record(row.iter().map(cell_text))?;
        writer
            .flush()
            .with_context(|| format!("Failed to write CSV file: {}", self.path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl SheetStore for CsvSheetStore {
    async fn append_row(&self, row: &[Value]) -> Result<()> {
        self.append_sync(row)
    }

    fn describe(&self) -> String {
        format!("CSV file {}", self.path.display())
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
