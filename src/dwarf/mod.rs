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

//! DWARF side of the pipeline: enumerate compile units, walk each DIE tree,
//! and pull parameter lists out of every subprogram.

pub mod gimli_source;
pub mod params;
pub mod source;
pub mod units;
pub mod walker;

#[cfg(test)]
pub(crate) mod testing;

use log::debug;

use crate::param_map::ParamMap;
pub use gimli_source::GimliSource;
pub use source::{DieRef, DieSource, UnitInfo};
use units::CompileUnits;
use walker::WalkStats;

/// Walk every compile unit of `source` and commit each subprogram's
/// parameters into `params`.
///
/// Units are handled one at a time; a unit's root is released before the next
/// one is requested.
pub fn collect_parameters<S: DieSource>(source: &S, params: &mut ParamMap) -> (usize, WalkStats) {
    let mut units = 0;
    let mut totals = WalkStats::default();

    for unit in CompileUnits::new(source) {
        let stats = walker::walk(source, &unit.root, |die| {
            params.commit(params::extract_subprogram(source, die));
        });
        debug!(
            "unit {} at {} (DWARF {}, {}-byte addresses): {} DIEs, {} subprograms",
            unit.index,
            unit.info.offset,
            unit.info.version,
            unit.info.address_size,
            stats.visited,
            stats.subprograms
        );
        units += 1;
        totals += stats;
    }

    (units, totals)
}
