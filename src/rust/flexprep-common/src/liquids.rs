// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use string_interner::symbol::SymbolU32;
use string_interner::{DefaultBackend, StringInterner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LiquidId {
    uid: SymbolU32,
}

/// A store for liquid names
#[derive(Default)]
pub struct LiquidStore {
    interner: StringInterner<DefaultBackend>,
}

impl LiquidStore {
    pub fn new() -> Self {
        LiquidStore {
            interner: StringInterner::new(),
        }
    }

    /// Return the ID for a given liquid name, otherwise None.
    pub fn get(&self, name: impl AsRef<str>) -> Option<LiquidId> {
        self.interner.get(name).map(|uid| LiquidId { uid })
    }

    /// Return the ID for a given liquid name, inserting it if necessary.
    pub fn get_or_insert(&mut self, name: impl AsRef<str>) -> LiquidId {
        let uid = self.interner.get_or_intern(name);
        LiquidId { uid }
    }

    /// Resolve an ID back to the liquid name.
    pub fn resolve(&self, id: LiquidId) -> Option<&str> {
        self.interner.resolve(id.uid)
    }
}
