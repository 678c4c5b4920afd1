// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

pub mod liquids;
pub mod tip_traits;
pub mod types;
