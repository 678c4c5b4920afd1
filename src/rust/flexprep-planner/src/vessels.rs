// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::collections::VecDeque;
use std::fmt;

use indexmap::IndexMap;

use flexprep_common::types::WellId;

use crate::error::{Error, Result};
use crate::plan::MixPlan;

/// Number of intermediate tubes reserved per pool on the tube rack.
pub const POOL_SIZE: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    /// Tubes where raw sub-threshold aliquots are pooled before a single
    /// accurate transfer.
    Small,
    /// Tubes where a mix is assembled before the final move to its
    /// destination well.
    Final,
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolKind::Small => f.write_str("small"),
            PoolKind::Final => f.write_str("final"),
        }
    }
}

/// A finite FIFO queue of intermediate tubes.
#[derive(Debug)]
pub struct VesselPool {
    kind: PoolKind,
    queue: VecDeque<WellId>,
}

impl VesselPool {
    pub fn new(kind: PoolKind, wells: impl IntoIterator<Item = WellId>) -> Self {
        VesselPool {
            kind,
            queue: wells.into_iter().collect(),
        }
    }

    /// The default small pool, tube-rack row C.
    pub fn small_default() -> Self {
        Self::new(PoolKind::Small, (1..=POOL_SIZE).map(|c| WellId::new(2, c)))
    }

    /// The default final pool, tube-rack row D.
    pub fn final_default() -> Self {
        Self::new(PoolKind::Final, (1..=POOL_SIZE).map(|c| WellId::new(3, c)))
    }

    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    fn pop(&mut self) -> Option<WellId> {
        self.queue.pop_front()
    }
}

/// Intermediate tubes assigned to one mix. At most one of each, fixed at
/// allocation time and never reassigned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VesselAssignment {
    pub small_vessel: Option<WellId>,
    pub final_vessel: Option<WellId>,
}

/// Vessel assignments keyed by mix destination well, in allocation order.
#[derive(Debug, Default)]
pub struct VesselAssignments {
    map: IndexMap<WellId, VesselAssignment>,
}

impl VesselAssignments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, dest: WellId) -> Option<VesselAssignment> {
        self.map.get(&dest).copied()
    }

    pub fn small_vessel_for(&self, dest: WellId) -> Option<WellId> {
        self.get(dest).and_then(|a| a.small_vessel)
    }

    pub fn final_vessel_for(&self, dest: WellId) -> Option<WellId> {
        self.get(dest).and_then(|a| a.final_vessel)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (WellId, VesselAssignment)> + '_ {
        self.map.iter().map(|(dest, a)| (*dest, *a))
    }

    fn insert(&mut self, dest: WellId, assignment: VesselAssignment) {
        self.map.insert(dest, assignment);
    }
}

/// Hand out intermediate tubes in mix order.
///
/// Mixes pooling two or more sub-threshold volumes take one tube from each
/// pool; a single sub-threshold volume skips the small stage and takes a
/// final tube only. Exhaustion is fatal, but assignments made before the
/// failing mix remain valid in `assignments` — liquid already moved on their
/// behalf cannot be unpoured.
pub fn allocate_vessels(
    mixes: &[MixPlan],
    small_pool: &mut VesselPool,
    final_pool: &mut VesselPool,
    assignments: &mut VesselAssignments,
) -> Result<()> {
    for mix in mixes {
        match mix.small_count() {
            0 => {}
            1 => {
                let Some(final_vessel) = final_pool.pop() else {
                    return Err(Error::PoolExhausted {
                        pool: PoolKind::Final,
                        dest: mix.dest_well,
                    });
                };
                assignments.insert(
                    mix.dest_well,
                    VesselAssignment {
                        small_vessel: None,
                        final_vessel: Some(final_vessel),
                    },
                );
                flexprep_log::diagnostic!(
                    "mix {}: final tube {}",
                    mix.dest_well,
                    final_vessel
                );
            }
            _ => {
                let (small_vessel, final_vessel) = match (small_pool.pop(), final_pool.pop()) {
                    (Some(s), Some(f)) => (s, f),
                    (None, _) => {
                        return Err(Error::PoolExhausted {
                            pool: PoolKind::Small,
                            dest: mix.dest_well,
                        });
                    }
                    (_, None) => {
                        return Err(Error::PoolExhausted {
                            pool: PoolKind::Final,
                            dest: mix.dest_well,
                        });
                    }
                };
                assignments.insert(
                    mix.dest_well,
                    VesselAssignment {
                        small_vessel: Some(small_vessel),
                        final_vessel: Some(final_vessel),
                    },
                );
                flexprep_log::diagnostic!(
                    "mix {}: small tube {}, final tube {}",
                    mix.dest_well,
                    small_vessel,
                    final_vessel
                );
            }
        }
    }
    Ok(())
}
