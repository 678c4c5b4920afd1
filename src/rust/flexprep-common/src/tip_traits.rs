// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use serde::{Deserialize, Serialize};

use flexprep_units::volume::{Microliter, Volume, microliters};

/// Commonly used traits of a pipette-tip capacity class
pub struct TipTraits {
    /// Nominal tip capacity.
    pub capacity: Volume<Microliter>,
    /// Air drawn on top of a multi-dispense aspirate to avoid drips.
    pub air_buffer: Volume<Microliter>,
    /// Fraction of the capacity considered safe for a single aspirate.
    pub safe_fill_factor: f64,
    pub rack_rows: u8,
    pub rack_columns: u8,
}

impl TipTraits {
    pub fn from_tip_class(class: &TipClass) -> &'static Self {
        match class {
            TipClass::Ul50 => &TIP50_TRAITS,
            TipClass::Ul200 => &TIP200_TRAITS,
            TipClass::Ul1000 => &TIP1000_TRAITS,
        }
    }

    /// Capacity usable for grouped dispensing, i.e. capacity minus the
    /// air buffer.
    pub fn working_capacity(&self) -> Volume<Microliter> {
        self.capacity - self.air_buffer
    }

    /// Largest single aspirate considered safe for this class.
    pub fn safe_fill(&self) -> Volume<Microliter> {
        self.capacity * self.safe_fill_factor
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TipClass {
    Ul50,
    Ul200,
    Ul1000,
}

impl TipClass {
    pub fn traits(&self) -> &'static TipTraits {
        TipTraits::from_tip_class(self)
    }
}

impl fmt::Display for TipClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TipClass::Ul50 => "50 µL",
            TipClass::Ul200 => "200 µL",
            TipClass::Ul1000 => "1000 µL",
        };
        f.write_str(name)
    }
}

pub const TIP50_TRAITS: TipTraits = TipTraits {
    capacity: microliters(50.0),
    air_buffer: microliters(2.0),
    safe_fill_factor: 0.9,
    rack_rows: 8,
    rack_columns: 12,
};

pub const TIP200_TRAITS: TipTraits = TipTraits {
    capacity: microliters(200.0),
    air_buffer: microliters(2.0),
    safe_fill_factor: 0.9,
    rack_rows: 8,
    rack_columns: 12,
};

pub const TIP1000_TRAITS: TipTraits = TipTraits {
    capacity: microliters(1000.0),
    air_buffer: microliters(2.0),
    safe_fill_factor: 0.9,
    rack_rows: 8,
    rack_columns: 12,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_working_capacity() {
        assert_eq!(TipClass::Ul50.traits().working_capacity(), microliters(48.0));
        assert_eq!(
            TipClass::Ul200.traits().working_capacity(),
            microliters(198.0)
        );
    }

    #[test]
    fn test_safe_fill() {
        assert_eq!(TipClass::Ul1000.traits().safe_fill(), microliters(900.0));
    }
}
