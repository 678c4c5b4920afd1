// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Aggregates the NaCl draws of every mix into capacity-bounded dispense
//! groups, one aspirate per group, to keep source visits to a minimum.

use indexmap::IndexMap;

use flexprep_common::tip_traits::TipClass;
use flexprep_common::types::{Labware, Location, WellId};
use flexprep_units::volume::{Microliter, Volume, microliters};

use crate::error::{Error, Result};
use crate::plan::MixPlan;
use crate::vessels::VesselAssignments;

/// Destinations sharing one aspirate draw from a common source.
#[derive(Debug, Clone, PartialEq)]
pub struct DispenseGroup {
    pub dests: Vec<(Location, Volume<Microliter>)>,
    pub total: Volume<Microliter>,
}

/// All NaCl work for one source tube.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDispatch {
    pub source: WellId,
    pub tip_class: TipClass,
    pub total: Volume<Microliter>,
    pub groups: Vec<DispenseGroup>,
}

/// NaCl dispatch for the whole run, sources in first-appearance order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReagentDispatch {
    pub sources: Vec<SourceDispatch>,
}

/// Resolve where each mix's NaCl actually goes: into the final intermediate
/// tube when the mix stages sub-threshold volumes there, else straight to
/// the destination well.
fn nacl_destination(mix: &MixPlan, assignments: &VesselAssignments) -> Location {
    if mix.has_small() {
        match assignments.final_vessel_for(mix.dest_well) {
            Some(vessel) => Location::new(Labware::TubeRack, vessel),
            // Allocation never reached this mix; fall back to the plate.
            None => Location::new(Labware::MixPlate, mix.dest_well),
        }
    } else {
        Location::new(Labware::MixPlate, mix.dest_well)
    }
}

pub fn plan_reagent_dispatch(
    mixes: &[MixPlan],
    assignments: &VesselAssignments,
) -> Result<ReagentDispatch> {
    let mut requests: IndexMap<WellId, Vec<(Location, Volume<Microliter>)>> = IndexMap::new();
    for mix in mixes {
        let Some(nacl) = mix.nacl() else {
            continue;
        };
        if nacl.volume <= microliters(0.0) {
            continue;
        }
        requests
            .entry(nacl.source_well)
            .or_default()
            .push((nacl_destination(mix, assignments), nacl.volume));
    }

    let mut sources = Vec::with_capacity(requests.len());
    for (source, dests) in requests {
        let total: Volume<Microliter> = dests.iter().map(|(_, v)| *v).sum();
        let tip_class = if total + TipClass::Ul50.traits().air_buffer
            <= TipClass::Ul50.traits().capacity
        {
            TipClass::Ul50
        } else {
            TipClass::Ul200
        };
        let traits = tip_class.traits();
        let working = traits.working_capacity();

        let mut groups = Vec::new();
        let mut group: Vec<(Location, Volume<Microliter>)> = Vec::new();
        let mut running = microliters(0.0);
        for (dest, volume) in dests {
            if volume > working {
                return Err(Error::VolumeOutOfRange {
                    volume: volume.value(),
                    capacity: traits.capacity.value(),
                    class: tip_class,
                });
            }
            if running + volume <= working {
                group.push((dest, volume));
                running = running + volume;
            } else {
                groups.push(DispenseGroup {
                    dests: std::mem::take(&mut group),
                    total: running,
                });
                group.push((dest, volume));
                running = volume;
            }
        }
        if !group.is_empty() {
            groups.push(DispenseGroup {
                dests: group,
                total: running,
            });
        }

        flexprep_log::diagnostic!(
            "NaCl from {}: {} across {} groups",
            source,
            total,
            groups.len()
        );
        sources.push(SourceDispatch {
            source,
            tip_class,
            total,
            groups,
        });
    }
    Ok(ReagentDispatch { sources })
}
