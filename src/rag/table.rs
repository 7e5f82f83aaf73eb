//! Raw tabular input as read from an uploaded or on-disk CSV file.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::error::RagError;

/// Header row plus data rows. Cells are kept verbatim; an empty cell means "absent".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RagError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::None)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| RagError::malformed(format!("failed to read CSV header: {}", e)))?
            .iter()
            .map(str::to_string)
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for (line, record) in csv_reader.records().enumerate() {
            let record = record.map_err(|e| {
                RagError::malformed(format!("failed to read CSV row {}: {}", line + 1, e))
            })?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }

    pub fn from_path(path: &Path) -> Result<Self, RagError> {
        let file = File::open(path).map_err(|e| {
            RagError::malformed(format!("CSV file not found: {} ({})", path.display(), e))
        })?;
        Self::from_reader(file)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first header that matches `name` exactly.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }
}

/// Cell lookup that treats short rows and empty strings as absent.
pub(crate) fn cell(row: &[String], column: Option<usize>) -> Option<&str> {
    column
        .and_then(|idx| row.get(idx))
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}
