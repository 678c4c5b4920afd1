// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use flexprep_common::liquids::{LiquidId, LiquidStore};
use flexprep_common::types::WellId;
use flexprep_units::volume::{Microliter, Volume, microliters};

use crate::error::{Error, Result};
use crate::registry::{LiquidRegistry, NACL_NAME, PLASMID_COLOR};
use crate::schema;
use crate::table::LayoutTable;

/// One reagent contribution to a mix.
#[derive(Debug, Clone)]
pub struct ComponentSource {
    /// Liquid known to sit in `source_well`, if the layout named one.
    pub liquid: Option<LiquidId>,
    pub volume: Volume<Microliter>,
    pub source_well: WellId,
}

/// One parsed mix block: destination well plus its components.
///
/// The last component is the NaCl contribution by table convention.
#[derive(Debug, Clone)]
pub struct MixRecord {
    pub dest_well: WellId,
    pub components: Vec<ComponentSource>,
}

pub struct ParsedLayout {
    pub mixes: Vec<MixRecord>,
    pub registry: LiquidRegistry,
    pub liquids: LiquidStore,
}

/// Parse `mix_count` blocks out of the layout table.
///
/// Fails without partial output: a missing row or malformed cell aborts the
/// whole parse, so no physical action is ever planned from half a table.
pub fn parse_layout(
    table: &LayoutTable,
    mix_count: usize,
    max_components: usize,
) -> Result<ParsedLayout> {
    schema::validate(table, mix_count)?;

    let mut liquids = LiquidStore::new();
    let mut registry = LiquidRegistry::new();

    // Component names and their source wells, across all blocks.
    for mix in 0..mix_count {
        let names = table.row(schema::name_row(mix)).unwrap_or(&[]);
        let source_row = schema::source_row(mix);
        for (col, name) in names.iter().enumerate().skip(1) {
            if name.is_empty() {
                continue;
            }
            let Some(well_text) = table.cell(source_row, col) else {
                continue;
            };
            if well_text.is_empty() {
                continue;
            }
            let well: WellId = well_text.parse()?;
            let id = liquids.get_or_insert(name);
            registry.register(id, well, PLASMID_COLOR);
        }
    }

    // The last populated cell of each source row is that mix's NaCl tube.
    let nacl = liquids.get_or_insert(NACL_NAME);
    for mix in 0..mix_count {
        let row = table.row(schema::source_row(mix)).unwrap_or(&[]);
        if let Some(well_text) = row.iter().rev().find(|cell| !cell.is_empty()) {
            let well: WellId = well_text.parse()?;
            registry.register_nacl(nacl, well);
        }
    }

    let mut mixes = Vec::with_capacity(mix_count);
    for mix in 0..mix_count {
        let volume_row = schema::volume_row(mix);
        let source_row = schema::source_row(mix);

        let dest_well = match table.cell(schema::name_row(mix), 0) {
            Some(text) if !text.is_empty() => text.parse()?,
            _ => WellId::new(0, 1),
        };

        let mut components = Vec::new();
        for col in 1..=max_components {
            let Some(text) = table.cell(volume_row, col) else {
                continue;
            };
            if text.is_empty() {
                continue;
            }
            let volume: f64 = text.parse().map_err(|_| Error::BadVolume {
                mix,
                column: col,
                text: text.to_string(),
            })?;
            if volume < 0.0 {
                continue;
            }
            let source_well = match table.cell(source_row, col) {
                Some(text) if !text.is_empty() => text.parse()?,
                _ => WellId::new(0, col as u8 + 1),
            };
            components.push(ComponentSource {
                liquid: registry.liquid_at(source_well),
                volume: microliters(volume),
                source_well,
            });
        }

        flexprep_log::diagnostic!(
            "mix {}: {} components, destination {}",
            mix + 1,
            components.len(),
            dest_well
        );
        mixes.push(MixRecord {
            dest_well,
            components,
        });
    }

    Ok(ParsedLayout {
        mixes,
        registry,
        liquids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BLOCK_ROWS, NAME_ROW, SOURCE_ROW, VOLUME_ROW};

    fn block(dest: &str, names: &[&str], vols: &[&str], wells: &[&str]) -> Vec<Vec<String>> {
        let mut rows = vec![Vec::new(); BLOCK_ROWS];
        let lead = |cells: &[&str]| {
            std::iter::once(String::new())
                .chain(cells.iter().map(|c| c.to_string()))
                .collect::<Vec<_>>()
        };
        rows[NAME_ROW] = lead(names);
        rows[NAME_ROW][0] = dest.to_string();
        rows[VOLUME_ROW] = lead(vols);
        rows[SOURCE_ROW] = lead(wells);
        rows
    }

    fn well(name: &str) -> WellId {
        name.parse().unwrap()
    }

    #[test]
    fn test_parse_two_mixes() {
        let mut rows = block(
            "C1",
            &["pUC19", "pBR322", "NaCl"],
            &["5", "1", "10"],
            &["A1", "A2", "B1"],
        );
        rows.extend(block(
            "C2",
            &["pUC19", "NaCl"],
            &["2.5", "10"],
            &["A1", "B1"],
        ));
        let table = LayoutTable::from_rows(rows);
        let parsed = parse_layout(&table, 2, 6).unwrap();

        assert_eq!(parsed.mixes.len(), 2);
        let first = &parsed.mixes[0];
        assert_eq!(first.dest_well, well("C1"));
        assert_eq!(first.components.len(), 3);
        assert_eq!(first.components[0].volume, microliters(5.0));
        assert_eq!(first.components[1].source_well, well("A2"));
        // NaCl is the last component by convention.
        let nacl = parsed.liquids.get(NACL_NAME).unwrap();
        assert_eq!(first.components[2].liquid, Some(nacl));
        assert_eq!(first.components[2].source_well, well("B1"));

        // Shared plasmid well is registered once.
        let puc19 = parsed.liquids.get("pUC19").unwrap();
        assert_eq!(parsed.registry.wells_of(puc19), Some(&[well("A1")][..]));
    }

    #[test]
    fn test_blank_and_negative_volumes_are_skipped() {
        let rows = block(
            "C1",
            &["a", "b", "c", "NaCl"],
            &["5", "", "-1", "10"],
            &["A1", "A2", "A3", "B1"],
        );
        let table = LayoutTable::from_rows(rows);
        let parsed = parse_layout(&table, 1, 6).unwrap();
        let mix = &parsed.mixes[0];
        assert_eq!(mix.components.len(), 2);
        assert_eq!(mix.components[0].source_well, well("A1"));
        assert_eq!(mix.components[1].source_well, well("B1"));
    }

    #[test]
    fn test_missing_source_well_is_synthesized() {
        let rows = block("C1", &["a", "NaCl"], &["5", "10"], &["", "B1"]);
        let table = LayoutTable::from_rows(rows);
        let parsed = parse_layout(&table, 1, 6).unwrap();
        // Column 1 falls back to the well two over from A1.
        assert_eq!(parsed.mixes[0].components[0].source_well, well("A2"));
    }

    #[test]
    fn test_unparseable_volume_is_an_error() {
        let rows = block("C1", &["a", "NaCl"], &["5µ", "10"], &["A1", "B1"]);
        let table = LayoutTable::from_rows(rows);
        match parse_layout(&table, 1, 6) {
            Err(Error::BadVolume { mix: 0, column: 1, text }) => assert_eq!(text, "5µ"),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_truncated_table_is_an_error() {
        let rows = block("C1", &["a", "NaCl"], &["5", "10"], &["A1", "B1"]);
        let table = LayoutTable::from_rows(rows);
        match parse_layout(&table, 2, 6) {
            Err(Error::MissingRow { mix: 1, .. }) => {}
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_component_capped_at_max() {
        let rows = block(
            "C1",
            &["a", "b", "c", "NaCl"],
            &["5", "6", "7", "10"],
            &["A1", "A2", "A3", "B1"],
        );
        let table = LayoutTable::from_rows(rows);
        let parsed = parse_layout(&table, 1, 2).unwrap();
        assert_eq!(parsed.mixes[0].components.len(), 2);
    }
}
