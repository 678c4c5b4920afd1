// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

pub mod aliquot;
pub mod robot;
pub mod tips;
pub mod transfer;

pub use crate::aliquot::run_aliquot_protocol;
pub use crate::robot::{CommandTrace, Robot, RobotCommand};
pub use crate::tips::{TipTracker, TipUsage};
pub use crate::transfer::run_mix_protocol;

use flexprep_common::tip_traits::TipClass;
use flexprep_common::types::WellId;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("no {class} tips remain and no reserve rack is available")]
    TipsExhausted { class: TipClass },
    #[error("starting tip {well} not found in the {class} rack")]
    StartingTipNotFound { class: TipClass, well: WellId },
    #[error("volume {volume} µL exceeds the {capacity} µL capacity of the {class} tips")]
    VolumeOutOfRange {
        volume: f64,
        capacity: f64,
        class: TipClass,
    },
    #[error("mix {0} has no assigned intermediate tube")]
    MissingVessel(WellId),
    #[error("hardware fault: {0}")]
    Hardware(String),
    #[error(transparent)]
    Plan(#[from] flexprep_planner::Error),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    pub fn new(msg: &str) -> Self {
        Error::Anyhow(anyhow::anyhow!(msg.to_string()))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
