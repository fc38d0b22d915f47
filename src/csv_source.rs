//! Delimited-text data source with automatic type inference.
//!
//! [`CsvParser`] turns RFC 4180 text into a [`Dataset`], inferring each
//! column's type from its non-null values in the order Numeric → Boolean →
//! Text. [`CsvSource`] is the file-facing [`DataSource`] on top of it.
//!
//! # Features
//!
//! - Quoted fields, escaped quotes, delimiters and newlines inside quotes
//! - `\n`, `\r\n` and bare `\r` line endings; UTF-8 BOM stripped
//! - Null markers: empty, `NA`, `N/A`, `null`, `NULL`, `None`, `.`, `NaN`, `#N/A`, ...
//! - Configurable delimiter, header handling and null markers
//!
//! # Example
//!
//! ```
//! use u_scatter::csv_source::CsvParser;
//! use u_scatter::dataset::DataType;
//!
//! let csv = "site,temp,ok\nA,25.3,true\nB,,false\n";
//! let ds = CsvParser::new().parse_str(csv).unwrap();
//! assert_eq!(ds.row_count(), 2);
//! assert_eq!(ds.column_by_name("site").unwrap().data_type(), DataType::Text);
//! assert_eq!(ds.column_by_name("temp").unwrap().null_count(), 1);
//! assert_eq!(ds.column_by_name("ok").unwrap().data_type(), DataType::Boolean);
//! ```

use std::path::Path;

use crate::dataset::{Column, DataType, Dataset, ValidityBitmap};
use crate::error::ScatterError;
use crate::interfaces::DataSource;

/// Null markers recognized by default.
const DEFAULT_NULL_MARKERS: &[&str] = &[
    "", "NA", "N/A", "na", "n/a", "null", "NULL", "None", "none", ".", "NaN", "nan", "NAN",
    "#N/A", "#NA",
];

/// Extensions handled by [`CsvSource`].
const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];

/// CSV parser configuration and entry point.
#[derive(Debug, Clone)]
pub struct CsvParser {
    delimiter: u8,
    has_header: bool,
    null_markers: Vec<String>,
}

impl CsvParser {
    /// Comma delimiter, header row, default null markers.
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
            null_markers: DEFAULT_NULL_MARKERS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }

    pub fn delimiter(mut self, delim: u8) -> Self {
        self.delimiter = delim;
        self
    }

    /// Without a header, columns are named `col_0`, `col_1`, ...
    pub fn has_header(mut self, header: bool) -> Self {
        self.has_header = header;
        self
    }

    /// Replaces the default null markers.
    pub fn null_markers(mut self, markers: Vec<String>) -> Self {
        self.null_markers = markers;
        self
    }

    /// Parses CSV text. Empty input or a header without rows yields an
    /// empty dataset.
    pub fn parse_str(&self, input: &str) -> Result<Dataset, ScatterError> {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);

        let raw_rows = self.parse_raw(input);
        let Some(first) = raw_rows.first() else {
            return Ok(Dataset::new());
        };

        let (headers, data_rows) = if self.has_header {
            let headers: Vec<String> = first.iter().map(|h| h.trim().to_string()).collect();
            (headers, &raw_rows[1..])
        } else {
            let headers = (0..first.len()).map(|i| format!("col_{i}")).collect();
            (headers, &raw_rows[..])
        };
        if data_rows.is_empty() {
            return Ok(Dataset::new());
        }

        let n_cols = headers.len();
        let mut raw_columns: Vec<Vec<&str>> = vec![Vec::with_capacity(data_rows.len()); n_cols];
        for (idx, row) in data_rows.iter().enumerate() {
            if row.len() != n_cols {
                return Err(ScatterError::CsvParse {
                    line: if self.has_header { idx + 2 } else { idx + 1 },
                    message: format!("expected {n_cols} fields, got {}", row.len()),
                });
            }
            for (col, field) in raw_columns.iter_mut().zip(row) {
                col.push(field.trim());
            }
        }

        let mut ds = Dataset::new();
        for (name, raw) in headers.into_iter().zip(&raw_columns) {
            ds.add_column(name, self.build_column(raw))?;
        }
        Ok(ds)
    }

    /// Reads and parses a file.
    pub fn parse_file(&self, path: &Path) -> Result<Dataset, ScatterError> {
        let content = std::fs::read_to_string(path)?;
        self.parse_str(&content)
    }

    // ── Internal parsing ─────────────────────────────────────────

    /// Splits text into rows of fields. Leading blank lines and trailing
    /// blank rows are skipped.
    fn parse_raw(&self, input: &str) -> Vec<Vec<String>> {
        let delim = self.delimiter as char;
        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut row: Vec<String> = Vec::new();
        let mut field = String::new();
        let mut in_quotes = false;
        let mut chars = input.chars().peekable();

        while let Some(c) = chars.next() {
            if in_quotes {
                if c == '"' {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    field.push(c);
                }
            } else if c == '"' && field.is_empty() {
                in_quotes = true;
            } else if c == delim {
                row.push(std::mem::take(&mut field));
            } else if c == '\n' {
                row.push(std::mem::take(&mut field));
                end_row(&mut row, &mut rows);
            } else if c == '\r' {
                // \r\n is handled by the \n branch
                if chars.peek() != Some(&'\n') {
                    row.push(std::mem::take(&mut field));
                    end_row(&mut row, &mut rows);
                }
            } else {
                field.push(c);
            }
        }

        if !field.is_empty() || !row.is_empty() {
            row.push(field);
            rows.push(row);
        }
        while rows.last().is_some_and(|r| r.iter().all(|f| f.is_empty())) {
            rows.pop();
        }
        rows
    }

    fn is_null(&self, value: &str) -> bool {
        self.null_markers.iter().any(|m| m == value)
    }

    /// Infers the column type and builds a typed column.
    fn build_column(&self, values: &[&str]) -> Column {
        let null_flags: Vec<bool> = values.iter().map(|v| self.is_null(v)).collect();
        let mut validity = ValidityBitmap::empty();
        for &is_null in &null_flags {
            validity.push(!is_null);
        }

        let present = || {
            values
                .iter()
                .zip(&null_flags)
                .filter(|(_, &is_null)| !is_null)
                .map(|(&v, _)| v)
        };

        // all-null columns stay numeric
        let data_type = if present().all(|s| s.parse::<f64>().is_ok()) {
            DataType::Numeric
        } else if present().all(is_boolean_str) {
            DataType::Boolean
        } else {
            DataType::Text
        };

        let cells = || values.iter().zip(&null_flags);
        match data_type {
            DataType::Numeric => Column::numeric(
                cells()
                    .map(|(v, &null)| if null { 0.0 } else { v.parse().unwrap_or(0.0) })
                    .collect(),
                validity,
            ),
            DataType::Boolean => Column::boolean(
                cells().map(|(v, &null)| !null && parse_boolean_str(v)).collect(),
                validity,
            ),
            DataType::Text => Column::text(
                cells()
                    .map(|(v, &null)| if null { String::new() } else { v.to_string() })
                    .collect(),
                validity,
            ),
        }
    }
}

impl Default for CsvParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Closes a row; blank lines before the first row are dropped.
fn end_row(row: &mut Vec<String>, rows: &mut Vec<Vec<String>>) {
    if rows.is_empty() && row.iter().all(|f| f.is_empty()) {
        row.clear();
    } else {
        rows.push(std::mem::take(row));
    }
}

fn is_boolean_str(s: &str) -> bool {
    matches!(
        s.to_lowercase().as_str(),
        "true" | "false" | "yes" | "no" | "t" | "f" | "y" | "n"
    )
}

fn parse_boolean_str(s: &str) -> bool {
    matches!(s.to_lowercase().as_str(), "true" | "yes" | "t" | "y")
}

// ── Data source ───────────────────────────────────────────────────────

/// File-backed [`DataSource`] for `.csv`, `.tsv` and `.txt`.
///
/// `.tsv` files are split on tabs; the others use the parser's delimiter.
///
/// ```no_run
/// use std::path::Path;
/// use u_scatter::csv_source::CsvSource;
/// use u_scatter::interfaces::DataSource;
///
/// let source = CsvSource::new();
/// assert!(source.can_load(Path::new("plant.TSV")));
/// let ds = source.load(Path::new("plant.tsv")).unwrap();
/// println!("{} rows", ds.row_count());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CsvSource {
    parser: CsvParser,
}

impl CsvSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parser(parser: CsvParser) -> Self {
        Self { parser }
    }
}

impl DataSource for CsvSource {
    #[tracing::instrument(level = "debug", skip(self))]
    fn load(&self, path: &Path) -> Result<Dataset, ScatterError> {
        if !self.can_load(path) {
            return Err(ScatterError::UnsupportedFormat {
                path: path.display().to_string(),
            });
        }
        let is_tsv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("tsv"));
        let parser = if is_tsv {
            self.parser.clone().delimiter(b'\t')
        } else {
            self.parser.clone()
        };

        let ds = parser.parse_file(path)?;
        if ds.is_empty() || ds.row_count() == 0 {
            return Err(ScatterError::InsufficientData {
                columns: ds.column_names().to_vec(),
                min_required: 1,
                actual: 0,
            });
        }
        tracing::debug!(
            rows = ds.row_count(),
            columns = ds.column_count(),
            "dataset loaded"
        );
        Ok(ds)
    }

    fn supported_extensions(&self) -> &[&'static str] {
        SUPPORTED_EXTENSIONS
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
