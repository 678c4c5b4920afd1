// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Module for defining the operator-facing run parameters.

use flexprep_common::types::WellId;
use flexprep_units::duration::{Duration, Minute, minutes};
use flexprep_units::volume::{Microliter, Volume, microliters};

#[derive(Debug, Clone)]
pub struct SanitizationChange {
    pub field: &'static str,
    pub original: String,
    pub sanitized: String,
    pub reason: String,
}

/// The two tube-rack capacities the deck supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TubeRackKind {
    Snapcap2Ml,
    Snapcap1_5Ml,
}

impl TubeRackKind {
    /// Labware definition name understood by the robot.
    pub fn api_name(&self) -> &'static str {
        match self {
            TubeRackKind::Snapcap2Ml => "opentrons_24_tuberack_eppendorf_2ml_safelock_snapcap",
            TubeRackKind::Snapcap1_5Ml => "opentrons_24_tuberack_eppendorf_1.5ml_safelock_snapcap",
        }
    }
}

/// Parameters of the mix-construction protocol.
#[derive(Debug, Clone)]
pub struct MixSettings {
    pub mix_count: usize,
    /// Component slots read per mix block, NaCl included.
    pub max_components: usize,
    pub starting_tip_50: WellId,
    pub starting_tip_200: WellId,
    pub tube_rack: TubeRackKind,
    pub premix: bool,
    /// Mixes per progress batch; affects commentary and the once-per-batch
    /// premix memo only.
    pub batch_size: usize,
}

impl Default for MixSettings {
    fn default() -> Self {
        MixSettings {
            mix_count: 3,
            max_components: 6,
            starting_tip_50: WellId::new(0, 1),
            starting_tip_200: WellId::new(0, 1),
            tube_rack: TubeRackKind::Snapcap1_5Ml,
            premix: true,
            batch_size: 12,
        }
    }
}

impl MixSettings {
    pub fn sanitize(&mut self) -> Vec<SanitizationChange> {
        let mut changes = vec![];
        clamp_usize("mix_count", &mut self.mix_count, 1, 96, &mut changes);
        clamp_usize("max_components", &mut self.max_components, 1, 10, &mut changes);
        clamp_usize("batch_size", &mut self.batch_size, 1, 96, &mut changes);
        changes
    }
}

/// Parameters of the aliquoting protocol.
#[derive(Debug, Clone)]
pub struct AliquotSettings {
    pub mix_count: usize,
    /// Reagent dispensed into every mix well.
    pub reagent_volume: Volume<Microliter>,
    /// Volume each cell well receives.
    pub aliquot_volume: Volume<Microliter>,
    /// Tube holding the premixed transfection reagent.
    pub reagent_well: WellId,
    /// First mix well on the mix plate.
    pub mix_position: WellId,
    pub mix_rows: u8,
    pub mix_columns: u8,
    /// Incubation between reagent distribution and aliquoting.
    pub delay: Duration<Minute>,
    pub starting_tip_200: WellId,
    pub starting_tip_1000: WellId,
    pub tube_rack: TubeRackKind,
    pub premix: bool,
    pub premix_volume: Volume<Microliter>,
}

impl Default for AliquotSettings {
    fn default() -> Self {
        AliquotSettings {
            mix_count: 12,
            reagent_volume: microliters(88.0),
            aliquot_volume: microliters(20.0),
            reagent_well: "D6".parse().expect("static well id"),
            mix_position: "C1".parse().expect("static well id"),
            mix_rows: 2,
            mix_columns: 6,
            delay: minutes(15.0),
            starting_tip_200: WellId::new(0, 1),
            starting_tip_1000: WellId::new(0, 1),
            tube_rack: TubeRackKind::Snapcap2Ml,
            premix: false,
            premix_volume: microliters(2.0),
        }
    }
}

impl AliquotSettings {
    pub fn sanitize(&mut self) -> Vec<SanitizationChange> {
        let mut changes = vec![];
        clamp_usize("mix_count", &mut self.mix_count, 1, 96, &mut changes);
        clamp_volume(
            "reagent_volume",
            &mut self.reagent_volume,
            1.0,
            1000.0,
            &mut changes,
        );
        clamp_volume(
            "aliquot_volume",
            &mut self.aliquot_volume,
            1.0,
            1000.0,
            &mut changes,
        );
        clamp_volume(
            "premix_volume",
            &mut self.premix_volume,
            1.0,
            900.0,
            &mut changes,
        );
        clamp_u8("mix_rows", &mut self.mix_rows, 1, 8, &mut changes);
        clamp_u8("mix_columns", &mut self.mix_columns, 1, 12, &mut changes);
        if self.delay < minutes(1.0) || self.delay > minutes(100.0) {
            let clamped = self.delay.value().clamp(1.0, 100.0);
            changes.push(SanitizationChange {
                field: "delay",
                original: format!("{}", self.delay),
                sanitized: format!("{}", minutes(clamped)),
                reason: "Outside the 1-100 minute range.".to_string(),
            });
            self.delay = minutes(clamped);
        }
        changes
    }
}

fn clamp_usize(
    field: &'static str,
    value: &mut usize,
    min: usize,
    max: usize,
    changes: &mut Vec<SanitizationChange>,
) {
    let clamped = (*value).clamp(min, max);
    if clamped != *value {
        changes.push(SanitizationChange {
            field,
            original: value.to_string(),
            sanitized: clamped.to_string(),
            reason: format!("Outside the {min}-{max} range."),
        });
        *value = clamped;
    }
}

fn clamp_u8(
    field: &'static str,
    value: &mut u8,
    min: u8,
    max: u8,
    changes: &mut Vec<SanitizationChange>,
) {
    let clamped = (*value).clamp(min, max);
    if clamped != *value {
        changes.push(SanitizationChange {
            field,
            original: value.to_string(),
            sanitized: clamped.to_string(),
            reason: format!("Outside the {min}-{max} range."),
        });
        *value = clamped;
    }
}

fn clamp_volume(
    field: &'static str,
    value: &mut Volume<Microliter>,
    min: f64,
    max: f64,
    changes: &mut Vec<SanitizationChange>,
) {
    let clamped = value.value().clamp(min, max);
    if clamped != value.value() {
        changes.push(SanitizationChange {
            field,
            original: format!("{value}"),
            sanitized: format!("{}", microliters(clamped)),
            reason: format!("Outside the {min}-{max} µL range."),
        });
        *value = microliters(clamped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tube_rack_api_names() {
        assert!(TubeRackKind::Snapcap2Ml.api_name().contains("2ml"));
        assert!(TubeRackKind::Snapcap1_5Ml.api_name().contains("1.5ml"));
    }

    #[test]
    fn test_defaults_are_already_sane() {
        assert!(MixSettings::default().sanitize().is_empty());
        assert!(AliquotSettings::default().sanitize().is_empty());
    }

    #[test]
    fn test_mix_settings_clamping() {
        let mut settings = MixSettings {
            mix_count: 0,
            max_components: 20,
            ..MixSettings::default()
        };
        let changes = settings.sanitize();
        assert_eq!(settings.mix_count, 1);
        assert_eq!(settings.max_components, 10);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].field, "mix_count");
        assert_eq!(changes[0].sanitized, "1");
    }

    #[test]
    fn test_aliquot_settings_clamping() {
        let mut settings = AliquotSettings {
            reagent_volume: microliters(2000.0),
            delay: minutes(0.0),
            ..AliquotSettings::default()
        };
        let changes = settings.sanitize();
        assert_eq!(settings.reagent_volume, microliters(1000.0));
        assert_eq!(settings.delay, minutes(1.0));
        assert_eq!(changes.len(), 2);
    }
}
