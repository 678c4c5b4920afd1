// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Error definitions for layout-table parsing and plate geometry.

use flexprep_common::types::WellIdError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("layout table ends before mix {mix}: row {row} is missing")]
    MissingRow { mix: usize, row: usize },
    #[error("mix {mix}: volume cell {text:?} in column {column} is not a number")]
    BadVolume {
        mix: usize,
        column: usize,
        text: String,
    },
    #[error(transparent)]
    InvalidWell(#[from] WellIdError),
    #[error("the {rows} mix rows starting at row {start} run past row H")]
    RowSpanOutOfRange { start: char, rows: u8 },
    #[error("the {columns} mix columns starting at column {start} run past column 12")]
    ColumnSpanOutOfRange { start: u8, columns: u8 },
    #[error("{needed} mixes requested but only {available} wells fit the selected mix region")]
    NotEnoughMixWells { needed: usize, available: usize },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
