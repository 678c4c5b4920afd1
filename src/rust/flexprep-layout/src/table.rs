// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::io::Read;
use std::path::Path;

use crate::error::Result;

/// Cleans one raw cell: drops a stray byte-order mark and surrounding
/// whitespace, both of which spreadsheet exports like to leave behind.
fn clean_cell(cell: &str) -> String {
    cell.replace('\u{feff}', "").trim().to_string()
}

/// An ordered grid of text cells, the sole input to the layout parser.
///
/// Rows may have ragged lengths; a cell beyond the end of its row reads as
/// absent and is treated like a blank by the parser.
#[derive(Debug, Clone, Default)]
pub struct LayoutTable {
    rows: Vec<Vec<String>>,
}

impl LayoutTable {
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|cell| clean_cell(&cell)).collect())
            .collect();
        LayoutTable { rows }
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(clean_cell).collect());
        }
        Ok(LayoutTable { rows })
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(std::io::BufReader::new(file))
    }

    pub fn from_csv_str(text: &str) -> Result<Self> {
        Self::from_csv_reader(text.as_bytes())
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// The cell at `(row, col)`, if that position exists. The returned
    /// string may still be empty.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cells_are_cleaned() {
        let table = LayoutTable::from_csv_str("\u{feff}C1 , pUC19 \nx,y").unwrap();
        assert_eq!(table.cell(0, 0), Some("C1"));
        assert_eq!(table.cell(0, 1), Some("pUC19"));
        assert_eq!(table.num_rows(), 2);
    }

    #[test]
    fn test_ragged_rows() {
        let table = LayoutTable::from_csv_str("a,b,c\nd\n").unwrap();
        assert_eq!(table.cell(1, 0), Some("d"));
        assert_eq!(table.cell(1, 2), None);
        assert_eq!(table.cell(5, 0), None);
    }
}
