//! Top-percent highlighting for tabular range data.
//!
//! Marks the largest values of selected columns the way a spreadsheet
//! "top N %" conditional format does: with `n` numeric cells in a column,
//! the top `max(1, floor(n * pct / 100))` values are selected, and every
//! cell tied with the smallest selected value is selected too.
//!
//! The CSV rendition copies the input and appends one flag column per
//! highlighted column (`PERIOD_M1_top10`), holding `1` on selected rows.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Columns highlighted when no rule is configured.
pub const DEFAULT_COLUMNS: [&str; 4] = ["PERIOD_M1", "PERIOD_M5", "PERIOD_M15", "PERIOD_M30"];

pub const DEFAULT_TOP_PERCENT: f64 = 10.0;

/// File name written next to the input when no output path is given.
pub const DEFAULT_OUTPUT_NAME: &str = "Range_highlighted.csv";

#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("top percent must be in (0, 100], got {0}")]
    InvalidPercent(f64),

    #[error("highlight rule names no columns")]
    NoColumns,

    #[error("highlight rule names column {0} more than once")]
    DuplicateColumn(String),

    #[error("flag column {0} already exists in the input")]
    FlagColumnExists(String),
}

/// Which columns to scan and how large the top slice is.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightRule {
    pub columns: Vec<String>,
    pub top_percent: f64,
}

impl Default for HighlightRule {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            top_percent: DEFAULT_TOP_PERCENT,
        }
    }
}

impl HighlightRule {
    pub fn validate(&self) -> Result<(), HighlightError> {
        if !(self.top_percent > 0.0 && self.top_percent <= 100.0) {
            return Err(HighlightError::InvalidPercent(self.top_percent));
        }
        if self.columns.is_empty() {
            return Err(HighlightError::NoColumns);
        }
        for (i, name) in self.columns.iter().enumerate() {
            if self.columns[..i].contains(name) {
                return Err(HighlightError::DuplicateColumn(name.clone()));
            }
        }
        Ok(())
    }

    /// Name of the flag column appended for `column`.
    pub fn flag_column_name(&self, column: &str) -> String {
        if self.top_percent.fract() == 0.0 {
            format!("{column}_top{:.0}", self.top_percent)
        } else {
            format!("{column}_top{}", self.top_percent)
        }
    }
}

/// Selection for one column.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ColumnHighlight {
    pub column: String,
    /// Position of the column in the header.
    pub index: usize,
    /// Cells that parsed as finite numbers.
    pub numeric_cells: usize,
    /// Smallest selected value; `None` when the column has no numbers.
    pub threshold: Option<f64>,
    /// Selected data rows, 0-based, ascending.
    pub rows: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HighlightReport {
    pub row_count: usize,
    pub columns: Vec<ColumnHighlight>,
    /// Rule columns absent from the header.
    pub missing_columns: Vec<String>,
}

fn parse_cell(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Number of values in the top slice of `n` numeric cells.
pub fn top_count(n: usize, top_percent: f64) -> usize {
    if n == 0 {
        return 0;
    }
    let k = (n as f64 * top_percent / 100.0).floor() as usize;
    k.clamp(1, n)
}

/// Select the top slice of each rule column.
pub fn highlight_table(
    headers: &[String],
    rows: &[Vec<String>],
    rule: &HighlightRule,
) -> Result<HighlightReport, HighlightError> {
    rule.validate()?;

    let mut columns = Vec::new();
    let mut missing_columns = Vec::new();

    for name in &rule.columns {
        let Some(index) = headers.iter().position(|h| h == name) else {
            warn!(column = %name, "highlight column not found, skipping");
            missing_columns.push(name.clone());
            continue;
        };
        let flag = rule.flag_column_name(name);
        if headers.contains(&flag) {
            return Err(HighlightError::FlagColumnExists(flag));
        }

        let values: Vec<(usize, f64)> = rows
            .iter()
            .enumerate()
            .filter_map(|(row, record)| record.get(index).and_then(|c| parse_cell(c)).map(|v| (row, v)))
            .collect();

        let mut sorted: Vec<f64> = values.iter().map(|(_, v)| *v).collect();
        sorted.sort_by(|a, b| b.total_cmp(a));

        let k = top_count(sorted.len(), rule.top_percent);
        let threshold = if k == 0 { None } else { Some(sorted[k - 1]) };
        let selected_rows = match threshold {
            Some(t) => values.iter().filter(|(_, v)| *v >= t).map(|(row, _)| *row).collect(),
            None => Vec::new(),
        };

        debug!(column = %name, numeric = sorted.len(), top = k, ?threshold, "column threshold");

        columns.push(ColumnHighlight {
            column: name.clone(),
            index,
            numeric_cells: sorted.len(),
            threshold,
            rows: selected_rows,
        });
    }

    Ok(HighlightReport { row_count: rows.len(), columns, missing_columns })
}

/// Read a headed CSV file into memory.
pub fn read_table(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>), HighlightError> {
    let file = std::fs::File::open(path).map_err(|source| HighlightError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut rdr = csv::Reader::from_reader(file);
    let headers = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    let mut rows = Vec::new();
    for record in rdr.records() {
        rows.push(record?.iter().map(|c| c.to_string()).collect());
    }
    Ok((headers, rows))
}

/// Render the table with one flag column appended per highlighted column.
pub fn export_highlighted_csv(
    headers: &[String],
    rows: &[Vec<String>],
    report: &HighlightReport,
    rule: &HighlightRule,
) -> Result<Vec<u8>, HighlightError> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header_out: Vec<String> = headers.to_vec();
    header_out.extend(report.columns.iter().map(|c| rule.flag_column_name(&c.column)));
    wtr.write_record(&header_out)?;

    for (row, record) in rows.iter().enumerate() {
        let mut out = record.clone();
        for col in &report.columns {
            let flag = if col.rows.binary_search(&row).is_ok() { "1" } else { "" };
            out.push(flag.to_string());
        }
        wtr.write_record(&out)?;
    }

    wtr.into_inner().map_err(|e| HighlightError::Io {
        path: "<buffer>".into(),
        source: e.into_error(),
    })
}

/// `Range_highlighted.csv` in the input file's directory.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_file_name(DEFAULT_OUTPUT_NAME)
}

/// Read `input`, highlight it, write the flagged copy to `output`.
pub fn highlight_csv(
    input: &Path,
    output: &Path,
    rule: &HighlightRule,
) -> Result<HighlightReport, HighlightError> {
    let (headers, rows) = read_table(input)?;
    let report = highlight_table(&headers, &rows, rule)?;
    let data = export_highlighted_csv(&headers, &rows, &report, rule)?;
    std::fs::write(output, data).map_err(|source| HighlightError::Io {
        path: output.display().to_string(),
        source,
    })?;
    Ok(report)
}
