// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

pub mod error;
pub mod parse;
pub mod registry;
pub mod schema;
pub mod table;

pub use crate::error::{Error, Result};
pub use crate::parse::{ComponentSource, MixRecord, ParsedLayout, parse_layout};
pub use crate::registry::{LiquidRegistry, NACL_NAME};
pub use crate::table::LayoutTable;
