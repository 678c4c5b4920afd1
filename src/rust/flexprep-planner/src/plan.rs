// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use flexprep_common::liquids::LiquidId;
use flexprep_common::types::WellId;
use flexprep_units::volume::{Microliter, Volume, microliters};

/// Smallest volume the pipettes transfer reliably. Anything below gets the
/// mix rescaled and staged through an intermediate tube.
pub const MIN_RELIABLE_VOLUME: Volume<Microliter> = microliters(0.8);

/// One reagent contribution to a mix, volume already rescaled.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub liquid: Option<LiquidId>,
    pub volume: Volume<Microliter>,
    pub source_well: WellId,
}

/// A fully planned mix. Immutable once the rescale pass has fixed
/// `scale_factor`; volumes are stored rescaled and the original operator
/// intent is recovered by dividing the factor back out.
#[derive(Debug, Clone, PartialEq)]
pub struct MixPlan {
    pub dest_well: WellId,
    pub components: Vec<Component>,
    pub scale_factor: f64,
}

impl MixPlan {
    /// The NaCl contribution, the last component by table convention.
    pub fn nacl(&self) -> Option<&Component> {
        self.components.last()
    }

    /// All components except NaCl.
    pub fn plasmids(&self) -> &[Component] {
        match self.components.len() {
            0 => &[],
            n => &self.components[..n - 1],
        }
    }

    /// The volume the operator asked for, before rescaling.
    pub fn original_volume(&self, component: &Component) -> Volume<Microliter> {
        component.volume / self.scale_factor
    }

    /// Whether this component needs the intermediate-dilution path.
    pub fn is_small(&self, component: &Component) -> bool {
        let original = self.original_volume(component);
        microliters(0.0) < original && original < MIN_RELIABLE_VOLUME
    }

    pub fn small_count(&self) -> usize {
        self.plasmids().iter().filter(|c| self.is_small(c)).count()
    }

    pub fn has_small(&self) -> bool {
        self.plasmids().iter().any(|c| self.is_small(c))
    }

    /// Total volume the destination well should receive, in the operator's
    /// original units, NaCl included.
    pub fn true_total(&self) -> Volume<Microliter> {
        self.components
            .iter()
            .filter(|c| c.volume > microliters(0.0))
            .map(|c| self.original_volume(c))
            .sum()
    }
}
