// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Display;

use flexprep_common::tip_traits::TipClass;
use flexprep_common::types::WellId;

use crate::vessels::PoolKind;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("the {pool} tube pool is exhausted; no vessel left for mix {dest}")]
    PoolExhausted { pool: PoolKind, dest: WellId },
    #[error("volume {volume} µL exceeds the {capacity} µL working range of the {class} tips")]
    VolumeOutOfRange {
        volume: f64,
        capacity: f64,
        class: TipClass,
    },
    #[error(transparent)]
    Layout(#[from] flexprep_layout::Error),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    pub fn new<T>(msg: T) -> Self
    where
        T: Display,
    {
        Error::Anyhow(anyhow::anyhow!(msg.to_string()))
    }
}
