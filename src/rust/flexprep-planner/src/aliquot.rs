// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Geometry planning for the aliquoting protocol: where the mixes live on
//! the mix plate, and which four cell-plate wells each mix feeds.

use flexprep_common::types::WellId;

use crate::error::Result;

const PLATE_ROWS: u8 = 8;
const PLATE_COLUMNS: u8 = 12;

/// Aliquots dispensed per mix well.
pub const ALIQUOTS_PER_MIX: usize = 4;

/// Mix wells on the mix plate: `rows` consecutive rows of `columns` wells
/// starting at `start`, truncated to `mix_count`.
///
/// Fails before any physical action when the requested region runs off the
/// plate or holds fewer wells than mixes.
pub fn mix_destination_wells(
    start: WellId,
    rows: u8,
    columns: u8,
    mix_count: usize,
) -> Result<Vec<WellId>> {
    if u16::from(start.row()) + u16::from(rows) > u16::from(PLATE_ROWS) {
        return Err(flexprep_layout::Error::RowSpanOutOfRange {
            start: start.row_letter(),
            rows,
        }
        .into());
    }
    if u16::from(start.col()) + u16::from(columns) - 1 > u16::from(PLATE_COLUMNS) {
        return Err(flexprep_layout::Error::ColumnSpanOutOfRange {
            start: start.col(),
            columns,
        }
        .into());
    }
    let mut wells = Vec::with_capacity(rows as usize * columns as usize);
    for row in start.row()..start.row() + rows {
        for col in start.col()..start.col() + columns {
            wells.push(WellId::new(row, col));
        }
    }
    if wells.len() < mix_count {
        return Err(flexprep_layout::Error::NotEnoughMixWells {
            needed: mix_count,
            available: wells.len(),
        }
        .into());
    }
    wells.truncate(mix_count);
    Ok(wells)
}

/// The four cell-plate wells receiving the aliquots of mix `index`.
///
/// Mixes fill the cell plate in four blocks of six columns: even blocks use
/// rows A-D, odd blocks rows E-H, and the third and fourth block shift six
/// columns right.
pub fn aliquot_targets(index: usize) -> [WellId; 4] {
    let block = (index / 6) % 4;
    let col = (index % 6) as u8 + 1 + if block >= 2 { 6 } else { 0 };
    let base_row = if block % 2 == 0 { 0 } else { 4 };
    std::array::from_fn(|i| WellId::new(base_row + i as u8, col))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn well(name: &str) -> WellId {
        name.parse().unwrap()
    }

    #[test]
    fn test_mix_wells_cover_requested_region() {
        let wells = mix_destination_wells(well("C1"), 2, 6, 12).unwrap();
        assert_eq!(wells.len(), 12);
        assert_eq!(wells[0], well("C1"));
        assert_eq!(wells[5], well("C6"));
        assert_eq!(wells[6], well("D1"));
        assert_eq!(wells[11], well("D6"));
    }

    #[test]
    fn test_mix_wells_truncate_to_mix_count() {
        let wells = mix_destination_wells(well("A1"), 1, 12, 5).unwrap();
        assert_eq!(wells.len(), 5);
    }

    #[test]
    fn test_row_overflow_is_rejected() {
        let err = mix_destination_wells(well("G1"), 3, 6, 6).unwrap_err();
        match err {
            Error::Layout(flexprep_layout::Error::RowSpanOutOfRange { start: 'G', rows: 3 }) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_too_many_mixes_for_region_is_rejected() {
        let err = mix_destination_wells(well("C1"), 2, 6, 13).unwrap_err();
        match err {
            Error::Layout(flexprep_layout::Error::NotEnoughMixWells {
                needed: 13,
                available: 12,
            }) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_column_overflow_is_rejected() {
        let err = mix_destination_wells(well("A8"), 1, 6, 6).unwrap_err();
        match err {
            Error::Layout(flexprep_layout::Error::ColumnSpanOutOfRange {
                start: 8,
                columns: 6,
            }) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_aliquot_blocks() {
        // First block: rows A-D, columns 1-6.
        assert_eq!(
            aliquot_targets(0),
            [well("A1"), well("B1"), well("C1"), well("D1")]
        );
        assert_eq!(aliquot_targets(5)[0], well("A6"));
        // Second block drops to rows E-H.
        assert_eq!(
            aliquot_targets(6),
            [well("E1"), well("F1"), well("G1"), well("H1")]
        );
        // Third block returns to rows A-D shifted six columns right.
        assert_eq!(aliquot_targets(12)[0], well("A7"));
        // Fourth block: rows E-H, columns 7-12.
        assert_eq!(aliquot_targets(23)[3], well("H12"));
    }
}
