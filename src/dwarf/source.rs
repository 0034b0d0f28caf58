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

use std::fmt;

use gimli::{DwAt, DwTag};

/// A global `.debug_info` offset. Resolvable to a DIE regardless of where the
/// reader currently is in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DieRef(pub u64);

impl fmt::Display for DieRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<0x{:08x}>", self.0)
    }
}

/// The parts of a compile-unit header worth reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitInfo {
    pub offset: DieRef,
    pub version: u16,
    pub address_size: u8,
}

/// Read access to a debug-info forest.
///
/// A `Die` is an owned handle: whoever holds it is responsible for it, and
/// dropping it releases whatever the backend attached to it. Handles are not
/// `Clone`, so each one is released exactly once.
///
/// Every query answers `None` when the datum is absent *or* unreadable. Callers
/// treat both the same way.
pub trait DieSource {
    type Die;

    /// Number of compile units, in container order.
    fn unit_count(&self) -> usize;
    fn unit_info(&self, index: usize) -> Option<UnitInfo>;
    fn unit_root(&self, index: usize) -> Option<Self::Die>;

    fn tag(&self, die: &Self::Die) -> Option<DwTag>;
    fn first_child(&self, die: &Self::Die) -> Option<Self::Die>;
    fn next_sibling(&self, die: &Self::Die) -> Option<Self::Die>;

    /// Random access by global offset.
    fn die_at(&self, offset: DieRef) -> Option<Self::Die>;
    fn offset(&self, die: &Self::Die) -> DieRef;

    fn attr_string(&self, die: &Self::Die, name: DwAt) -> Option<String>;
    fn attr_flag(&self, die: &Self::Die, name: DwAt) -> Option<bool>;
    fn attr_address(&self, die: &Self::Die, name: DwAt) -> Option<u64>;
    /// A reference attribute, normalised to a global offset whether it was
    /// encoded unit-relative or section-relative.
    fn attr_reference(&self, die: &Self::Die, name: DwAt) -> Option<DieRef>;
}
