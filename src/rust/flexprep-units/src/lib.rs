// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

pub mod duration;
pub mod unit;
pub mod volume;
