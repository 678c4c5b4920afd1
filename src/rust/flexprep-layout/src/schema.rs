// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! The fixed block layout of the plate-description table.
//!
//! Every mix occupies [`BLOCK_ROWS`] consecutive rows. Within its block the
//! rows below carry meaning; all other rows are operator scratch space and
//! are ignored.

use crate::error::{Error, Result};
use crate::table::LayoutTable;

/// Rows occupied by one mix block.
pub const BLOCK_ROWS: usize = 15;
/// Offset of the row holding the component names, and the destination well
/// in its first column.
pub const NAME_ROW: usize = 0;
/// Offset of the row holding per-component volumes in µL.
pub const VOLUME_ROW: usize = 12;
/// Offset of the row holding per-component source wells.
pub const SOURCE_ROW: usize = 13;

pub fn name_row(mix: usize) -> usize {
    mix * BLOCK_ROWS + NAME_ROW
}

pub fn volume_row(mix: usize) -> usize {
    mix * BLOCK_ROWS + VOLUME_ROW
}

pub fn source_row(mix: usize) -> usize {
    mix * BLOCK_ROWS + SOURCE_ROW
}

/// Check that every row the parser will touch exists, so a truncated table
/// surfaces as a clear error naming the offending mix instead of failing
/// halfway through parsing.
pub fn validate(table: &LayoutTable, mix_count: usize) -> Result<()> {
    for mix in 0..mix_count {
        for row in [name_row(mix), volume_row(mix), source_row(mix)] {
            if row >= table.num_rows() {
                return Err(Error::MissingRow { mix, row });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_offsets() {
        assert_eq!(name_row(0), 0);
        assert_eq!(volume_row(0), 12);
        assert_eq!(source_row(0), 13);
        assert_eq!(name_row(2), 30);
        assert_eq!(volume_row(2), 42);
    }

    #[test]
    fn test_validate_reports_first_missing_row() {
        let rows: Vec<Vec<String>> = (0..15).map(|_| vec![String::new()]).collect();
        let table = LayoutTable::from_rows(rows);
        assert!(validate(&table, 1).is_ok());
        match validate(&table, 2) {
            Err(Error::MissingRow { mix: 1, row: 15 }) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
