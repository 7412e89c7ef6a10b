//! Caller report output
//!
//! CSV is the default: one row per caller, two quoted fields (caller name,
//! count), comma plus space separated, CRLF terminated, no header row.

use crate::callers::CallerCounts;
use crate::error::{AnalysisError, Result};
use crate::interner::NameInterner;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Report file format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Quoted two-column CSV with CRLF line endings
    #[default]
    Csv,
    /// JSON array of {caller, count} objects
    Json,
}

/// One report row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallerRow {
    pub caller: String,
    pub count: u64,
}

/// Resolved, ordered caller report
#[derive(Debug, Clone, Default)]
pub struct CallerReport {
    rows: Vec<CallerRow>,
}

impl CallerReport {
    /// Resolve caller ids to names, ordered by descending count
    pub fn new(counts: &CallerCounts, names: &NameInterner) -> Self {
        let rows = counts
            .sorted()
            .into_iter()
            .map(|(id, count)| CallerRow {
                caller: names.resolve(id).unwrap_or_default().to_string(),
                count,
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[CallerRow] {
        &self.rows
    }

    /// Quote a field, doubling embedded quotes
    fn quote_field(field: &str) -> String {
        format!("\"{}\"", field.replace('"', "\"\""))
    }

    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        for row in &self.rows {
            output.push_str(&Self::quote_field(&row.caller));
            output.push_str(", ");
            output.push_str(&Self::quote_field(&row.count.to_string()));
            output.push_str("\r\n");
        }
        output
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.rows)?)
    }

    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Csv => Ok(self.to_csv()),
            ReportFormat::Json => self.to_json(),
        }
    }

    /// Write the report to `path`, replacing any existing file
    pub fn write_to(&self, path: &Path, format: ReportFormat) -> Result<()> {
        let content = self.render(format)?;
        fs::write(path, content).map_err(|source| AnalysisError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), callers = self.rows.len(), "Wrote caller report");
        Ok(())
    }
}
