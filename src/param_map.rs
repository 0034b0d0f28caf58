// Copyright (c) 2026 MCU-Debug Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::BTreeMap;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::dwarf::params::{ParameterRecord, SubprogramRecord};

/// Which subprogram keeps an entry address claimed more than once (e.g. several
/// concrete instances sharing one entry point).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// The first subprogram in walk order keeps the address.
    #[value(name = "first")]
    FirstWins,
    /// Each later subprogram replaces the previous one.
    #[default]
    #[value(name = "last")]
    LastWins,
}

/// Entry address -> ordered parameter list, for every subprogram with a
/// nonzero `DW_AT_low_pc`.
pub struct ParamMap {
    entries: BTreeMap<u64, Vec<ParameterRecord>>,
    policy: DuplicatePolicy,
    collisions: usize,
}

impl Default for ParamMap {
    fn default() -> Self {
        Self::new(DuplicatePolicy::default())
    }
}

impl ParamMap {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            entries: BTreeMap::new(),
            policy,
            collisions: 0,
        }
    }

    /// Store `record` under its address. Address 0 is never stored.
    /// Returns whether the map changed.
    pub fn commit(&mut self, record: SubprogramRecord) -> bool {
        if record.address == 0 {
            return false;
        }

        let policy = self.policy;
        let mut collided = false;
        let mut changed = true;
        self.entries
            .entry(record.address)
            .and_modify(|existing| {
                collided = true;
                match policy {
                    DuplicatePolicy::FirstWins => changed = false,
                    DuplicatePolicy::LastWins => *existing = record.parameters.clone(),
                }
            })
            .or_insert_with(|| record.parameters.clone());

        if collided {
            self.collisions += 1;
            trace!(
                "entry address 0x{:x} claimed again ({:?})",
                record.address,
                policy
            );
        }
        changed
    }

    pub fn get(&self, address: u64) -> Option<&[ParameterRecord]> {
        self.entries.get(&address).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &[ParameterRecord])> {
        self.entries.iter().map(|(&addr, params)| (addr, params.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How many commits hit an address that was already present.
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }
}
