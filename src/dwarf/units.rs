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

use log::debug;

use super::source::{DieSource, UnitInfo};

/// One compile unit, owning its root DIE. Dropping it releases the root.
pub struct CompileUnit<D> {
    pub index: usize,
    pub info: UnitInfo,
    pub root: D,
}

/// Compile units in container order.
///
/// Each unit is produced only when asked for, so a caller that walks one unit
/// and drops it before calling `next` holds a single root at a time.
pub struct CompileUnits<'a, S: DieSource> {
    source: &'a S,
    next: usize,
}

impl<'a, S: DieSource> CompileUnits<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source, next: 0 }
    }
}

impl<S: DieSource> Iterator for CompileUnits<'_, S> {
    type Item = CompileUnit<S::Die>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.source.unit_count() {
            let index = self.next;
            self.next += 1;

            let Some(info) = self.source.unit_info(index) else {
                continue;
            };
            let Some(root) = self.source.unit_root(index) else {
                debug!("compile unit {} at {} has no root DIE", index, info.offset);
                continue;
            };
            return Some(CompileUnit { index, info, root });
        }
        None
    }
}
