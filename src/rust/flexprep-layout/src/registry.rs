// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use indexmap::IndexMap;

use flexprep_common::liquids::LiquidId;
use flexprep_common::types::WellId;

pub const NACL_NAME: &str = "NaCl (150mM)";
pub const INTERMEDIATE_NAME: &str = "Intermediate Mix";

/// Display colors shown in the deck map of the operator app.
pub const PLASMID_COLOR: &str = "#3366FF";
pub const NACL_COLOR: &str = "#FF9933";
pub const INTERMEDIATE_COLOR: &str = "#99CC00";

#[derive(Debug, Clone)]
pub struct LiquidInfo {
    /// Source wells holding this liquid, de-duplicated, in first-seen order.
    pub wells: Vec<WellId>,
    pub color: &'static str,
}

/// Which liquid sits in which tube-rack well, built once from the layout
/// table and read-only afterwards.
#[derive(Debug, Default)]
pub struct LiquidRegistry {
    entries: IndexMap<LiquidId, LiquidInfo>,
    by_well: HashMap<WellId, LiquidId>,
    nacl: Option<LiquidId>,
}

impl LiquidRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&mut self, liquid: LiquidId, well: WellId, color: &'static str) {
        let info = self.entries.entry(liquid).or_insert_with(|| LiquidInfo {
            wells: Vec::new(),
            color,
        });
        if !info.wells.contains(&well) {
            info.wells.push(well);
        }
        self.by_well.insert(well, liquid);
    }

    /// NaCl registration overrides any plasmid previously recorded for the
    /// well, matching how the table is read: the last populated source cell
    /// of a block is NaCl no matter what the header row calls it.
    pub(crate) fn register_nacl(&mut self, liquid: LiquidId, well: WellId) {
        self.register(liquid, well, NACL_COLOR);
        self.nacl = Some(liquid);
    }

    pub fn liquid_at(&self, well: WellId) -> Option<LiquidId> {
        self.by_well.get(&well).copied()
    }

    pub fn nacl_id(&self) -> Option<LiquidId> {
        self.nacl
    }

    pub fn is_nacl_well(&self, well: WellId) -> bool {
        self.liquid_at(well).is_some() && self.liquid_at(well) == self.nacl
    }

    pub fn wells_of(&self, liquid: LiquidId) -> Option<&[WellId]> {
        self.entries.get(&liquid).map(|info| info.wells.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (LiquidId, &LiquidInfo)> {
        self.entries.iter().map(|(id, info)| (*id, info))
    }
}
