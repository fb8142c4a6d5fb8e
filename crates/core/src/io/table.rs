//! Untyped tabular input (CSV with header)

use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};

/// A header plus string rows, exactly as read from the source.
///
/// Typing happens later, in the normalizer; a table only guarantees that every
/// row has one cell per header column (short rows are padded with empty cells).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self { headers, rows: Vec::new() }
    }

    /// Read a CSV file with a header row.
    pub fn read_csv(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    /// Read CSV from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let width = headers.len();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let mut row: Vec<String> = record.iter().take(width).map(str::to_string).collect();
            row.resize(width, String::new());
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    pub fn push_row<S: Into<String>>(&mut self, row: impl IntoIterator<Item = S>) {
        let mut row: Vec<String> = row.into_iter().map(Into::into).collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by exact name.
    ///
    /// Missing columns are an error listing the available names.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::MissingColumn {
                name: name.to_string(),
                available: self.headers.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "year,box,x,y,species\n\
                       2021,A1,100,500,great tit\n\
                       2021,B2, 900 ,500\n";

    #[test]
    fn test_read_csv_pads_short_rows() {
        let table = RawTable::from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["year", "box", "x", "y", "species"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1], vec!["2021", "B2", "900", "500", ""]);
    }

    #[test]
    fn test_missing_column_lists_available() {
        let table = RawTable::from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(table.column_index("x").unwrap(), 2);
        match table.column_index("Nestbox") {
            Err(Error::MissingColumn { name, available }) => {
                assert_eq!(name, "Nestbox");
                assert_eq!(available.len(), 5);
            }
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_push_row() {
        let mut table = RawTable::new(vec!["a".into(), "b".into()]);
        table.push_row(["1"]);
        assert_eq!(table.rows[0], vec!["1", ""]);
    }
}
