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

//! Parameter lists of `DW_TAG_subprogram` DIEs.
//!
//! Out-of-line and inlined instances of a function usually omit the names of
//! their `DW_TAG_formal_parameter` children and point at the abstract instance
//! through `DW_AT_abstract_origin` instead. That reference is a global offset,
//! so it may land anywhere in the forest, including another compile unit.

use std::borrow::Cow;

use log::trace;

use super::source::{DieRef, DieSource};

/// How many `DW_AT_abstract_origin` hops are followed for a single parameter.
/// Real chains are one or two long; the limit only matters for cyclic input.
pub const MAX_ORIGIN_DEPTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterRecord {
    /// Empty when neither the DIE nor its origin carries a name.
    pub name: String,
    /// Compiler-synthesised (`this`, hidden return slot, ...).
    pub artificial: bool,
}

impl ParameterRecord {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            artificial: false,
        }
    }

    /// The name as it appears in reports. Artificial parameters keep their
    /// name but are wrapped in a comment marker.
    pub fn display_name(&self) -> Cow<'_, str> {
        if self.artificial {
            Cow::Owned(format!("/* {} */", self.name))
        } else {
            Cow::Borrowed(&self.name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubprogramRecord {
    /// `DW_AT_low_pc`, or 0 when absent or unreadable.
    pub address: u64,
    pub parameters: Vec<ParameterRecord>,
}

/// Read the entry address and the ordered parameter list of `subprogram`.
///
/// Only direct children are considered. A parameter that resolves to no name
/// is still recorded so later positions keep their index.
pub fn extract_subprogram<S: DieSource>(source: &S, subprogram: &S::Die) -> SubprogramRecord {
    let address = source
        .attr_address(subprogram, gimli::DW_AT_low_pc)
        .unwrap_or(0);

    let mut parameters = Vec::new();
    let mut next = source.first_child(subprogram);
    while let Some(child) = next {
        if source.tag(&child) == Some(gimli::DW_TAG_formal_parameter) {
            parameters.push(resolve_parameter(source, &child));
        }
        next = source.next_sibling(&child);
    }

    SubprogramRecord {
        address,
        parameters,
    }
}

/// Name and artificial flag of one `DW_TAG_formal_parameter`.
///
/// Each attribute is taken from the DIE itself when present, otherwise from
/// the nearest abstract origin that has it.
pub fn resolve_parameter<S: DieSource>(source: &S, param: &S::Die) -> ParameterRecord {
    let mut name = source.attr_string(param, gimli::DW_AT_name);
    let mut artificial = source.attr_flag(param, gimli::DW_AT_artificial);

    let mut seen: Vec<DieRef> = vec![source.offset(param)];
    let mut origin = source.attr_reference(param, gimli::DW_AT_abstract_origin);
    while let Some(offset) = origin.take() {
        if name.is_some() && artificial.is_some() {
            break;
        }
        if seen.len() > MAX_ORIGIN_DEPTH || seen.contains(&offset) {
            trace!(
                "abstract origin chain from {} stopped at {}",
                seen[0],
                offset
            );
            break;
        }
        seen.push(offset);

        let Some(target) = source.die_at(offset) else {
            trace!("abstract origin {} of {} does not resolve", offset, seen[0]);
            break;
        };
        if name.is_none() {
            name = source.attr_string(&target, gimli::DW_AT_name);
        }
        if artificial.is_none() {
            artificial = source.attr_flag(&target, gimli::DW_AT_artificial);
        }
        origin = source.attr_reference(&target, gimli::DW_AT_abstract_origin);
    }

    ParameterRecord {
        name: name.unwrap_or_default(),
        artificial: artificial.unwrap_or(false),
    }
}
