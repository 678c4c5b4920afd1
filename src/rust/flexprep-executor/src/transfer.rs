// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Walks the mix plans and issues the hardware calls: NaCl dispatch first,
//! then per-mix plasmid transfers with the intermediate-dilution staging.

use std::collections::HashSet;

use flexprep_common::tip_traits::TipClass;
use flexprep_common::types::{Labware, Location, Target, WellId};
use flexprep_layout::{NACL_NAME, ParsedLayout};
use flexprep_planner::reagent::ReagentDispatch;
use flexprep_planner::{MixPlan, MixRunPlan, MixSettings};
use flexprep_units::volume::{Microliter, Volume, microliters};

use crate::robot::Robot;
use crate::tips::TipTracker;
use crate::{Error, Result};

/// Sub-threshold aliquots are staged at ten times their rescaled volume for
/// pipetting precision, and the pooled result is divided back down.
pub const STAGING_SCALE: f64 = 10.0;

const PREMIX_CYCLES: u32 = 6;
const PREMIX_VOLUME: Volume<Microliter> = microliters(200.0);
const MIX_REPEATS: u32 = 3;

/// Smallest class whose tips can hold `volume`; volumes past the 200 µL
/// class are not transferable in one step and abort the run.
fn tip_class_for(volume: Volume<Microliter>) -> Result<TipClass> {
    if volume <= TipClass::Ul50.traits().capacity {
        Ok(TipClass::Ul50)
    } else if volume <= TipClass::Ul200.traits().capacity {
        Ok(TipClass::Ul200)
    } else {
        Err(Error::VolumeOutOfRange {
            volume: volume.value(),
            capacity: TipClass::Ul200.traits().capacity.value(),
            class: TipClass::Ul200,
        })
    }
}

/// One single-use-tip move: pick up, aspirate, dispense, blow out, drop.
fn single_transfer(
    robot: &mut dyn Robot,
    tips: &mut TipTracker,
    class: TipClass,
    volume: Volume<Microliter>,
    from: Target,
    to: Target,
    blow_out: Option<Target>,
) -> Result<()> {
    tips.acquire(robot, class)?;
    robot.aspirate(volume, from)?;
    robot.dispense(volume, to)?;
    robot.blow_out(blow_out)?;
    tips.release(robot, class)
}

fn tube(well: WellId) -> Location {
    Location::new(Labware::TubeRack, well)
}

fn announce_liquids(robot: &mut dyn Robot, layout: &ParsedLayout) -> Result<()> {
    for (id, info) in layout.registry.iter() {
        let name = layout.liquids.resolve(id).unwrap_or("Unknown");
        let wells: Vec<String> = info.wells.iter().map(WellId::to_string).collect();
        robot.comment(&format!("{} {}", name, wells.join(", ")))?;
    }
    Ok(())
}

/// Execute the NaCl dispatch: one tip per source, one aspirate per group,
/// one dispense per destination, blow-out back into the source.
fn dispatch_reagent(
    robot: &mut dyn Robot,
    tips: &mut TipTracker,
    dispatch: &ReagentDispatch,
) -> Result<()> {
    for source in &dispatch.sources {
        if source.groups.is_empty() {
            continue;
        }
        let class = source.tip_class;
        let buffer = class.traits().air_buffer;
        let source_loc = tube(source.source);
        tips.acquire(robot, class)?;
        for group in &source.groups {
            robot.aspirate(group.total + buffer, source_loc.into())?;
            for (dest, volume) in &group.dests {
                robot.dispense(*volume, (*dest).into())?;
            }
            robot.blow_out(Some(source_loc.top(0.0)))?;
        }
        tips.release(robot, class)?;

        let dests: Vec<String> = source
            .groups
            .iter()
            .flat_map(|g| g.dests.iter().map(|(d, _)| d.well.to_string()))
            .collect();
        robot.comment(&format!(
            "Distributed NaCl from {} to: {}",
            source.source,
            dests.join(", ")
        ))?;
    }
    Ok(())
}

/// Premix each distinct plasmid source once per batch by in-place
/// aspirate/dispense cycles.
fn premix_sources(
    robot: &mut dyn Robot,
    tips: &mut TipTracker,
    layout: &ParsedLayout,
    mix: &MixPlan,
    premixed: &mut HashSet<WellId>,
) -> Result<()> {
    for component in mix.plasmids() {
        let source = component.source_well;
        if !premixed.insert(source) {
            continue;
        }
        let name = component
            .liquid
            .and_then(|id| layout.liquids.resolve(id))
            .unwrap_or("Unknown");
        tips.acquire(robot, TipClass::Ul200)?;
        robot.comment(&format!(
            "Premix plasmid {} in {} ({}x{})",
            name, source, PREMIX_CYCLES, PREMIX_VOLUME
        ))?;
        for _ in 0..PREMIX_CYCLES {
            robot.aspirate(PREMIX_VOLUME, tube(source).bottom(1.0))?;
            robot.dispense(PREMIX_VOLUME, tube(source).bottom(10.0))?;
        }
        robot.blow_out(Some(tube(source).top(-2.0)))?;
        tips.release(robot, TipClass::Ul200)?;
    }
    Ok(())
}

/// Assemble one mix: stage sub-threshold volumes through the intermediate
/// tubes, move normal volumes directly, and finish with the back-calculated
/// transfer to the destination well.
fn build_mix(
    robot: &mut dyn Robot,
    tips: &mut TipTracker,
    plan: &MixRunPlan,
    mix: &MixPlan,
) -> Result<()> {
    let mut small: Vec<(Volume<Microliter>, WellId)> = Vec::new();
    let mut normal: Vec<(Volume<Microliter>, WellId)> = Vec::new();
    for component in mix.plasmids() {
        if mix.is_small(component) {
            small.push((component.volume * STAGING_SCALE, component.source_well));
        } else {
            normal.push((component.volume, component.source_well));
        }
    }
    let dest = Location::new(Labware::MixPlate, mix.dest_well);

    if small.is_empty() {
        for (volume, source) in &normal {
            if *volume <= microliters(0.0) {
                continue;
            }
            let class = tip_class_for(*volume)?;
            single_transfer(
                robot,
                tips,
                class,
                *volume,
                tube(*source).into(),
                dest.into(),
                Some(dest.top(-2.0)),
            )?;
        }
        return Ok(());
    }

    let final_vessel = plan
        .assignments
        .final_vessel_for(mix.dest_well)
        .ok_or(Error::MissingVessel(mix.dest_well))?;
    let final_loc = tube(final_vessel);

    if small.len() > 1 {
        let small_vessel = plan
            .assignments
            .small_vessel_for(mix.dest_well)
            .ok_or(Error::MissingVessel(mix.dest_well))?;
        let small_loc = tube(small_vessel);
        robot.comment(&format!(
            "Small volumes found, creating intermediate mix in {small_vessel}"
        ))?;

        for (volume, source) in &small {
            if *volume <= microliters(0.0) {
                continue;
            }
            let class = tip_class_for(*volume)?;
            single_transfer(
                robot,
                tips,
                class,
                *volume,
                tube(*source).into(),
                small_loc.into(),
                None,
            )?;
        }

        // Pool the staged volume back down to the rescaled total and move
        // it into the final tube.
        let staged: Volume<Microliter> = small.iter().map(|(v, _)| *v).sum();
        let pooled = staged / STAGING_SCALE;
        robot.comment(&format!(
            "Mix {}: final transfer to tube {}",
            mix.dest_well, final_vessel
        ))?;
        let class = tip_class_for(pooled)?;
        tips.acquire(robot, class)?;
        if class == TipClass::Ul50 {
            robot.mix(MIX_REPEATS, staged * 0.8, small_loc.bottom(0.1))?;
        }
        robot.aspirate(pooled, small_loc.bottom(0.1))?;
        robot.dispense(pooled, final_loc.into())?;
        robot.blow_out(None)?;
        tips.release(robot, class)?;
    } else {
        let (staged, source) = small[0];
        let volume = staged / STAGING_SCALE;
        robot.comment(&format!(
            "Only one small volume, transferring directly to final tube {final_vessel}"
        ))?;
        if volume > microliters(0.0) {
            let class = tip_class_for(volume)?;
            single_transfer(
                robot,
                tips,
                class,
                volume,
                tube(source).into(),
                final_loc.into(),
                None,
            )?;
        }
    }

    // Normal-volume components join the mix in the final tube.
    for (volume, source) in &normal {
        if *volume <= microliters(0.0) {
            continue;
        }
        let class = tip_class_for(*volume)?;
        single_transfer(
            robot,
            tips,
            class,
            *volume,
            tube(*source).into(),
            final_loc.into(),
            Some(final_loc.top(-2.0)),
        )?;
    }

    // The destination receives the operator-intended total, with the
    // rescale factor divided back out; the inflation stays in the tube.
    let total = mix.true_total();
    robot.comment(&format!(
        "Final transfer to mix well {} ({:.2} µL)",
        mix.dest_well,
        total.value()
    ))?;
    let class = tip_class_for(total)?;
    tips.acquire(robot, class)?;
    let mix_volume = std::cmp::min(total * 0.8, microliters(50.0));
    robot.mix(MIX_REPEATS, mix_volume, final_loc.bottom(1.0))?;
    robot.aspirate(total, final_loc.bottom(1.0))?;
    robot.dispense(total, dest.bottom(1.0))?;
    robot.blow_out(Some(dest.top(-2.0)))?;
    tips.release(robot, class)?;
    robot.comment(&format!("Final transfer for mix {} completed", mix.dest_well))?;
    Ok(())
}

/// Run the whole mix-construction protocol against `robot`.
pub fn run_mix_protocol(
    robot: &mut dyn Robot,
    tips: &mut TipTracker,
    layout: &ParsedLayout,
    plan: &MixRunPlan,
    settings: &MixSettings,
) -> Result<()> {
    flexprep_log::diagnostic!(
        "executing {} planned mixes in batches of {}",
        plan.mixes.len(),
        settings.batch_size
    );
    announce_liquids(robot, layout)?;
    for (dest, assignment) in plan.assignments.iter() {
        if let Some(vessel) = assignment.small_vessel {
            robot.comment(&format!("Intermediate small tube for {dest}: {vessel}"))?;
        }
        if let Some(vessel) = assignment.final_vessel {
            robot.comment(&format!("Intermediate final tube for {dest}: {vessel}"))?;
        }
    }
    robot.set_latch(true)?;
    dispatch_reagent(robot, tips, &plan.reagent)?;

    for (batch_index, batch) in plan.mixes.chunks(settings.batch_size).enumerate() {
        let start = batch_index * settings.batch_size;
        robot.comment(&format!(
            "Processing batch mixes {} to {}",
            start + 1,
            start + batch.len()
        ))?;
        let mut premixed: HashSet<WellId> = HashSet::new();
        for mix in batch {
            if settings.premix {
                premix_sources(robot, tips, layout, mix, &mut premixed)?;
            }
            robot.comment(&format!("Transferring to {}", mix.dest_well))?;
            build_mix(robot, tips, plan, mix)?;
        }
    }

    robot.comment(&format!(
        "Protocol complete. Created {} mixes including {}.",
        plan.mixes.len(),
        NACL_NAME
    ))?;
    robot.set_latch(false)?;
    tips.report(robot)
}
