// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use flexprep_layout::MixRecord;
use flexprep_units::volume::{Microliter, Volume, microliters};

use crate::plan::{Component, MIN_RELIABLE_VOLUME, MixPlan};

/// Scale factor that lifts the sub-threshold volumes of a mix to the
/// reliable minimum.
///
/// A single small volume is lifted to the threshold on its own. Two or more
/// are lifted so their *sum* reaches it, because they will be pooled in an
/// intermediate tube and transferred together.
fn scale_factor(small: &[Volume<Microliter>]) -> f64 {
    match small {
        [] => 1.0,
        [only] => MIN_RELIABLE_VOLUME.value() / only.value(),
        _ => {
            let sum: Volume<Microliter> = small.iter().copied().sum();
            MIN_RELIABLE_VOLUME.value() / sum.value()
        }
    }
}

/// Turn a parsed mix record into a plan, rescaling every component (NaCl
/// included) when any non-NaCl volume sits below the reliable minimum.
pub fn rescale_mix(record: MixRecord) -> MixPlan {
    let plasmid_count = record.components.len().saturating_sub(1);
    let small: Vec<Volume<Microliter>> = record.components[..plasmid_count]
        .iter()
        .map(|c| c.volume)
        .filter(|v| microliters(0.0) < *v && *v < MIN_RELIABLE_VOLUME)
        .collect();
    let scale_factor = scale_factor(&small);

    if scale_factor != 1.0 {
        flexprep_log::info!(
            "mix for {} has volumes below {}, rescaling by {:.3}",
            record.dest_well,
            MIN_RELIABLE_VOLUME,
            scale_factor
        );
    }

    let components = record
        .components
        .into_iter()
        .map(|c| Component {
            liquid: c.liquid,
            volume: c.volume * scale_factor,
            source_well: c.source_well,
        })
        .collect();

    MixPlan {
        dest_well: record.dest_well,
        components,
        scale_factor,
    }
}
