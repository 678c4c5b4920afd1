// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

pub mod aliquot;
pub mod error;
pub mod plan;
pub mod reagent;
pub mod rescale;
pub mod settings;
pub mod vessels;

pub use crate::error::{Error, Result};
pub use crate::plan::{Component, MIN_RELIABLE_VOLUME, MixPlan};
pub use crate::reagent::{DispenseGroup, ReagentDispatch, SourceDispatch, plan_reagent_dispatch};
pub use crate::rescale::rescale_mix;
pub use crate::settings::{AliquotSettings, MixSettings, SanitizationChange, TubeRackKind};
pub use crate::vessels::{VesselAssignment, VesselAssignments, VesselPool, allocate_vessels};

use flexprep_layout::MixRecord;

/// Everything the execution driver needs to build the mixes: the rescaled
/// plans, the intermediate-tube assignments and the NaCl dispatch batches.
pub struct MixRunPlan {
    pub mixes: Vec<MixPlan>,
    pub assignments: VesselAssignments,
    pub reagent: ReagentDispatch,
}

/// Run all planning passes over the parsed layout, with the default
/// intermediate-tube pools.
pub fn plan_mix_run(records: &[MixRecord]) -> Result<MixRunPlan> {
    let mixes: Vec<MixPlan> = records.iter().cloned().map(rescale_mix).collect();
    let mut small_pool = VesselPool::small_default();
    let mut final_pool = VesselPool::final_default();
    let mut assignments = VesselAssignments::new();
    vessels::allocate_vessels(&mixes, &mut small_pool, &mut final_pool, &mut assignments)?;
    let reagent = reagent::plan_reagent_dispatch(&mixes, &assignments)?;
    Ok(MixRunPlan {
        mixes,
        assignments,
        reagent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flexprep_common::types::{Labware, WellId};
    use flexprep_layout::ComponentSource;
    use flexprep_units::volume::microliters;

    fn well(name: &str) -> WellId {
        name.parse().unwrap()
    }

    fn record(dest: &str, plasmid_volumes: &[f64], nacl_volume: f64) -> MixRecord {
        let mut components: Vec<ComponentSource> = plasmid_volumes
            .iter()
            .enumerate()
            .map(|(i, v)| ComponentSource {
                liquid: None,
                volume: microliters(*v),
                source_well: WellId::new(0, i as u8 + 1),
            })
            .collect();
        components.push(ComponentSource {
            liquid: None,
            volume: microliters(nacl_volume),
            source_well: well("B1"),
        });
        MixRecord {
            dest_well: dest.parse().unwrap(),
            components,
        }
    }

    #[test]
    fn test_three_plain_mixes_share_one_nacl_draw() {
        let records = vec![
            record("C1", &[5.0, 1.0], 10.0),
            record("C2", &[5.0, 1.0], 10.0),
            record("C3", &[5.0, 1.0], 10.0),
        ];
        let plan = plan_mix_run(&records).unwrap();
        assert!(plan.mixes.iter().all(|m| m.scale_factor == 1.0));
        assert!(plan.assignments.is_empty());

        // All three draws ride one aspirate of at most 32 µL.
        assert_eq!(plan.reagent.sources.len(), 1);
        let source = &plan.reagent.sources[0];
        assert_eq!(source.groups.len(), 1);
        assert!(source.groups[0].total + source.tip_class.traits().air_buffer <= microliters(32.0));
    }

    #[test]
    fn test_small_volume_mix_is_staged() {
        let records = vec![record("C1", &[5.0, 0.5], 10.0)];
        let plan = plan_mix_run(&records).unwrap();
        assert!((plan.mixes[0].scale_factor - 1.6).abs() < 1e-12);
        let assignment = plan.assignments.get(well("C1")).unwrap();
        assert_eq!(assignment.small_vessel, None);
        assert_eq!(assignment.final_vessel, Some(well("D1")));

        let (dest, _) = plan.reagent.sources[0].groups[0].dests[0];
        assert_eq!(dest.labware, Labware::TubeRack);
        assert_eq!(dest.well, well("D1"));
    }
}
