// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Result as FormatterResult;
use std::fmt::{Display, Formatter};

crate::quantity!(Volume);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Microliter;

impl Display for Microliter {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatterResult {
        write!(f, "µL")
    }
}

pub const fn microliters<T>(value: T) -> Volume<Microliter, T> {
    Volume {
        value,
        unit: Microliter,
    }
}
