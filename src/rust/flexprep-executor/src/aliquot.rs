// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Driver for the aliquoting protocol: distribute the premixed transfection
//! reagent across the mix wells, incubate, then feed each mix into four
//! cell-plate wells.

use flexprep_common::tip_traits::TipClass;
use flexprep_common::types::{Labware, Location};
use flexprep_planner::AliquotSettings;
use flexprep_planner::aliquot::{ALIQUOTS_PER_MIX, aliquot_targets, mix_destination_wells};
use flexprep_units::volume::{Microliter, Volume, microliters};

use crate::robot::Robot;
use crate::tips::TipTracker;
use crate::Result;

/// Gentle handling rates for the viscous reagent, in µL/s.
pub const GENTLE_ASPIRATE_RATE: f64 = 35.0;
pub const GENTLE_DISPENSE_RATE: f64 = 57.0;
/// Rate used for mixing steps.
pub const MIXING_RATE: f64 = 716.0;

const AIR_GAP: Volume<Microliter> = microliters(5.0);
const DISTRIBUTE_MIX_REPEATS: u32 = 3;
const ALIQUOT_MIX_REPEATS: u32 = 5;

/// Run the whole aliquoting protocol against `robot`.
///
/// Geometry is validated before the first hardware call, so an impossible
/// mix region never costs a tip.
pub fn run_aliquot_protocol(
    robot: &mut dyn Robot,
    tips: &mut TipTracker,
    settings: &AliquotSettings,
) -> Result<()> {
    let mix_wells = mix_destination_wells(
        settings.mix_position,
        settings.mix_rows,
        settings.mix_columns,
        settings.mix_count,
    )?;
    let source = Location::new(Labware::TubeRack, settings.reagent_well);

    robot.set_latch(true)?;
    robot.set_flow_rate(GENTLE_ASPIRATE_RATE, GENTLE_DISPENSE_RATE)?;

    // Distribute the reagent with one tip, re-aspirating only when the tip
    // cannot satisfy the next dispense.
    tips.acquire(robot, TipClass::Ul1000)?;
    let safe_fill = TipClass::Ul1000.traits().safe_fill();
    let mut in_tip = microliters(0.0);
    for (index, well) in mix_wells.iter().enumerate() {
        if in_tip < settings.reagent_volume {
            let remaining = mix_wells.len() - index;
            let to_aspirate = std::cmp::min(
                safe_fill,
                settings.reagent_volume * remaining as f64,
            );
            if settings.premix {
                robot.set_flow_rate(MIXING_RATE, MIXING_RATE)?;
                robot.mix(DISTRIBUTE_MIX_REPEATS, settings.premix_volume, source.into())?;
                robot.set_flow_rate(GENTLE_ASPIRATE_RATE, GENTLE_DISPENSE_RATE)?;
            }
            robot.aspirate(to_aspirate, source.into())?;
            in_tip = to_aspirate;
        }
        robot.dispense(
            settings.reagent_volume,
            Location::new(Labware::MixPlate, *well).top(0.0),
        )?;
        robot.air_gap(AIR_GAP)?;
        in_tip = in_tip - settings.reagent_volume;
    }
    tips.release(robot, TipClass::Ul1000)?;

    robot.delay(settings.delay)?;

    // Four aliquots per mix into the block layout of the cell plate.
    for (index, well) in mix_wells.iter().enumerate() {
        let mix_loc = Location::new(Labware::MixPlate, *well);
        let draw = settings.aliquot_volume * ALIQUOTS_PER_MIX as f64;
        let class = if draw <= TipClass::Ul200.traits().capacity {
            TipClass::Ul200
        } else {
            TipClass::Ul1000
        };
        tips.acquire(robot, class)?;
        robot.set_flow_rate(MIXING_RATE, MIXING_RATE)?;
        robot.mix(ALIQUOT_MIX_REPEATS, settings.reagent_volume, mix_loc.into())?;
        robot.set_flow_rate(GENTLE_ASPIRATE_RATE, GENTLE_DISPENSE_RATE)?;
        robot.aspirate(draw, mix_loc.into())?;
        for target in aliquot_targets(index) {
            robot.dispense(
                settings.aliquot_volume,
                Location::new(Labware::CellPlate, target).into(),
            )?;
        }
        tips.release(robot, class)?;
    }

    robot.set_latch(false)?;
    tips.report(robot)
}
