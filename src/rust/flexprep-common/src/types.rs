// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WellIdError {
    #[error("malformed well id {0:?}")]
    Invalid(String),
}

/// A single well position on a plate or rack, e.g. `A1` or `H12`.
///
/// The row is stored as a zero-based index (`A` = 0) and the column
/// one-based, matching the labware labels printed on the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WellId {
    row: u8,
    col: u8,
}

impl WellId {
    pub fn new(row: u8, col: u8) -> Self {
        WellId { row, col }
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    pub fn col(&self) -> u8 {
        self.col
    }

    pub fn row_letter(&self) -> char {
        (b'A' + self.row) as char
    }

    /// All wells of a `rows` x `columns` labware in row-major order
    /// (`A1, A2, .., A12, B1, ..`), the order tips are consumed in.
    pub fn row_major(rows: u8, columns: u8) -> impl Iterator<Item = WellId> {
        (0..rows).flat_map(move |row| (1..=columns).map(move |col| WellId::new(row, col)))
    }
}

impl fmt::Display for WellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row_letter(), self.col)
    }
}

impl FromStr for WellId {
    type Err = WellIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let row_letter = chars
            .next()
            .ok_or_else(|| WellIdError::Invalid(s.to_string()))?;
        if !row_letter.is_ascii_uppercase() {
            return Err(WellIdError::Invalid(s.to_string()));
        }
        let col: u8 = chars
            .as_str()
            .parse()
            .map_err(|_| WellIdError::Invalid(s.to_string()))?;
        if col == 0 {
            return Err(WellIdError::Invalid(s.to_string()));
        }
        Ok(WellId::new(row_letter as u8 - b'A', col))
    }
}

impl Serialize for WellId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for WellId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A deck slot of the Flex, including the staging column (`A4`..`D4`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeckSlot {
    A1,
    A2,
    A3,
    A4,
    B1,
    B2,
    B3,
    B4,
    C1,
    C2,
    C3,
    C4,
    D1,
    D2,
    D3,
    D4,
}

impl DeckSlot {
    pub fn label(&self) -> &'static str {
        match self {
            DeckSlot::A1 => "A1",
            DeckSlot::A2 => "A2",
            DeckSlot::A3 => "A3",
            DeckSlot::A4 => "A4",
            DeckSlot::B1 => "B1",
            DeckSlot::B2 => "B2",
            DeckSlot::B3 => "B3",
            DeckSlot::B4 => "B4",
            DeckSlot::C1 => "C1",
            DeckSlot::C2 => "C2",
            DeckSlot::C3 => "C3",
            DeckSlot::C4 => "C4",
            DeckSlot::D1 => "D1",
            DeckSlot::D2 => "D2",
            DeckSlot::D3 => "D3",
            DeckSlot::D4 => "D4",
        }
    }
}

impl fmt::Display for DeckSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The labware pieces the protocols address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Labware {
    /// Tube rack holding plasmid sources, NaCl and the intermediate tubes.
    TubeRack,
    /// PCR plate on the heater-shaker where mixes are assembled.
    MixPlate,
    /// Flat-bottom plate receiving the final aliquots.
    CellPlate,
    TipRack50,
    TipRack50Reserve,
    TipRack200,
    TipRack1000,
}

impl fmt::Display for Labware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Labware::TubeRack => "tube rack",
            Labware::MixPlate => "mix plate",
            Labware::CellPlate => "cell plate",
            Labware::TipRack50 => "50 µL tip rack",
            Labware::TipRack50Reserve => "50 µL reserve tip rack",
            Labware::TipRack200 => "200 µL tip rack",
            Labware::TipRack1000 => "1000 µL tip rack",
        };
        f.write_str(name)
    }
}

/// A well on a specific piece of labware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub labware: Labware,
    pub well: WellId,
}

impl Location {
    pub fn new(labware: Labware, well: WellId) -> Self {
        Location { labware, well }
    }

    /// Target this well `mm` above its bottom.
    pub fn bottom(self, mm: f64) -> Target {
        Target {
            location: self,
            height: Height::Bottom(mm),
        }
    }

    /// Target this well `mm` relative to its top (negative is inside).
    pub fn top(self, mm: f64) -> Target {
        Target {
            location: self,
            height: Height::Top(mm),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of the {}", self.well, self.labware)
    }
}

/// Vertical approach within a well, in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Height {
    Default,
    Bottom(f64),
    Top(f64),
}

/// A pipetting target: a well plus the height to address it at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub location: Location,
    pub height: Height,
}

impl From<Location> for Target {
    fn from(location: Location) -> Self {
        Target {
            location,
            height: Height::Default,
        }
    }
}
