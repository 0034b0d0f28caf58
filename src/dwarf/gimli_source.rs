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

/// `DieSource` backed by gimli, reading sections out of an `object::File`.
use std::borrow::Cow;
use std::collections::HashMap;
use std::rc::Rc;

use gimli::{AttributeValue, DwAt, DwTag, Reader, UnitOffset};
use log::{debug, trace, warn};
use object::{Object, ObjectSection};

use super::source::{DieRef, DieSource, UnitInfo};
use crate::error::ExtractError;

pub type DwarfReader = gimli::EndianRcSlice<gimli::RunTimeEndian>;

/// Handle to one DIE: the unit it lives in plus its unit-relative offset.
#[derive(Debug, PartialEq, Eq)]
pub struct GimliDie {
    unit: usize,
    offset: UnitOffset,
    global: u64,
}

struct LoadedUnit {
    start: usize,
    unit: gimli::Unit<DwarfReader>,
    // Unit offset of a DIE -> unit offset of its next sibling.
    siblings: HashMap<usize, usize>,
}

pub struct GimliSource {
    dwarf: gimli::Dwarf<DwarfReader>,
    // Container order, so `start` is ascending.
    units: Vec<LoadedUnit>,
}

impl GimliSource {
    /// Load the DWARF sections of `obj`.
    ///
    /// Fails with `MissingDebugInfo` when there is no `.debug_info` at all or
    /// gimli refuses the section set.
    pub fn open(obj: &object::File) -> Result<Self, ExtractError> {
        if obj.section_by_name(gimli::SectionId::DebugInfo.name()).is_none() {
            return Err(ExtractError::MissingDebugInfo(
                "no .debug_info section".to_string(),
            ));
        }

        let endian = if obj.is_little_endian() {
            gimli::RunTimeEndian::Little
        } else {
            gimli::RunTimeEndian::Big
        };

        let load_section = |id: gimli::SectionId| -> Result<DwarfReader, gimli::Error> {
            let data = obj
                .section_by_name(id.name())
                .map(|s| s.uncompressed_data().unwrap_or_default())
                .unwrap_or_default();

            let data_rc: Rc<[u8]> = match data {
                Cow::Borrowed(b) => Rc::from(b),
                Cow::Owned(o) => Rc::from(o),
            };
            Ok(gimli::EndianRcSlice::new(data_rc, endian))
        };

        let dwarf = gimli::Dwarf::load(&load_section)
            .map_err(|e| ExtractError::MissingDebugInfo(e.to_string()))?;
        Ok(Self::from_dwarf(dwarf))
    }

    /// Enumerate unit headers in container order and parse each unit.
    ///
    /// Enumeration stops at the first header that cannot be read. A unit whose
    /// abbreviations fail to parse is skipped.
    pub fn from_dwarf(dwarf: gimli::Dwarf<DwarfReader>) -> Self {
        let mut units = Vec::new();
        let mut headers = dwarf.units();
        loop {
            let header = match headers.next() {
                Ok(Some(header)) => header,
                Ok(None) => break,
                Err(e) => {
                    warn!("stopping compile unit enumeration: {}", e);
                    break;
                }
            };
            let Some(start) = header.offset().as_debug_info_offset().map(|o| o.0) else {
                continue;
            };
            match dwarf.unit(header) {
                Ok(unit) => {
                    let siblings = sibling_links(&unit, start);
                    units.push(LoadedUnit {
                        start,
                        unit,
                        siblings,
                    });
                }
                Err(e) => warn!("skipping compile unit at 0x{:x}: {}", start, e),
            }
        }
        debug!("loaded {} compile units", units.len());
        Self { dwarf, units }
    }

    fn die(&self, unit: usize, offset: UnitOffset) -> GimliDie {
        GimliDie {
            unit,
            offset,
            global: (self.units[unit].start + offset.0) as u64,
        }
    }

    fn unit(&self, die: &GimliDie) -> &gimli::Unit<DwarfReader> {
        &self.units[die.unit].unit
    }

    fn attr_value(&self, die: &GimliDie, name: DwAt) -> Option<AttributeValue<DwarfReader>> {
        let entry = match self.unit(die).entry(die.offset) {
            Ok(entry) => entry,
            Err(e) => {
                trace!("cannot read DIE {}: {}", DieRef(die.global), e);
                return None;
            }
        };
        match entry.attr_value(name) {
            Ok(value) => value,
            Err(e) => {
                trace!("cannot read {} of DIE {}: {}", name, DieRef(die.global), e);
                None
            }
        }
    }

    /// Index of the unit whose range contains the section offset `offset`.
    fn unit_containing(&self, offset: usize) -> Option<usize> {
        match self.units.binary_search_by_key(&offset, |u| u.start) {
            Ok(index) => Some(index),
            Err(0) => None,
            Err(index) => Some(index - 1),
        }
    }
}

/// Next-sibling links for every DIE of `unit`, in one pass over its entries.
///
/// gimli can only find a sibling without `DW_AT_sibling` by parsing the whole
/// subtree in between, which makes a walk quadratic in the nesting depth.
/// Links past an unparseable entry are missing, so those DIEs have no sibling.
fn sibling_links(unit: &gimli::Unit<DwarfReader>, start: usize) -> HashMap<usize, usize> {
    let mut links = HashMap::new();
    // open[d]: last DIE seen at depth d whose sibling list has not ended.
    let mut open: Vec<usize> = Vec::new();
    let mut depth: isize = 0;
    let mut cursor = unit.entries();
    loop {
        let (delta, entry) = match cursor.next_dfs() {
            Ok(Some(next)) => next,
            Ok(None) => break,
            Err(e) => {
                warn!("unit at 0x{:x}: DIE list ends early: {}", start, e);
                break;
            }
        };
        depth += delta;
        let Ok(level) = usize::try_from(depth) else {
            break;
        };
        let offset = entry.offset().0;
        open.truncate(level + 1);
        match open.get_mut(level) {
            Some(prev) => {
                links.insert(*prev, offset);
                *prev = offset;
            }
            None => open.push(offset),
        }
    }
    links
}

impl DieSource for GimliSource {
    type Die = GimliDie;

    fn unit_count(&self) -> usize {
        self.units.len()
    }

    fn unit_info(&self, index: usize) -> Option<UnitInfo> {
        let loaded = self.units.get(index)?;
        Some(UnitInfo {
            offset: DieRef(loaded.start as u64),
            version: loaded.unit.header.version(),
            address_size: loaded.unit.header.address_size(),
        })
    }

    fn unit_root(&self, index: usize) -> Option<GimliDie> {
        let loaded = self.units.get(index)?;
        let mut cursor = loaded.unit.entries();
        let (_, root) = cursor.next_dfs().ok()??;
        Some(self.die(index, root.offset()))
    }

    fn tag(&self, die: &GimliDie) -> Option<DwTag> {
        self.unit(die).entry(die.offset).ok().map(|e| e.tag())
    }

    fn first_child(&self, die: &GimliDie) -> Option<GimliDie> {
        let mut cursor = self.unit(die).entries_at_offset(die.offset).ok()?;
        cursor.next_entry().ok()??;
        if !cursor.current()?.has_children() {
            return None;
        }
        // A null entry here means an empty child list.
        cursor.next_entry().ok()??;
        let child = cursor.current()?.offset();
        Some(self.die(die.unit, child))
    }

    fn next_sibling(&self, die: &GimliDie) -> Option<GimliDie> {
        let sibling = *self.units[die.unit].siblings.get(&die.offset.0)?;
        Some(self.die(die.unit, UnitOffset(sibling)))
    }

    fn die_at(&self, offset: DieRef) -> Option<GimliDie> {
        let target = gimli::DebugInfoOffset(usize::try_from(offset.0).ok()?);
        let index = self.unit_containing(target.0)?;
        let unit_offset = target.to_unit_offset(&self.units[index].unit.header)?;
        // Make sure something parseable actually starts there.
        self.units[index].unit.entry(unit_offset).ok()?;
        Some(self.die(index, unit_offset))
    }

    fn offset(&self, die: &GimliDie) -> DieRef {
        DieRef(die.global)
    }

    fn attr_string(&self, die: &GimliDie, name: DwAt) -> Option<String> {
        let value = self.attr_value(die, name)?;
        let raw = self.dwarf.attr_string(self.unit(die), value).ok()?;
        let s = raw.to_string_lossy().ok()?;
        Some(s.into_owned())
    }

    fn attr_flag(&self, die: &GimliDie, name: DwAt) -> Option<bool> {
        match self.attr_value(die, name)? {
            AttributeValue::Flag(flag) => Some(flag),
            other => {
                trace!("{} of DIE {} is not a flag: {:?}", name, DieRef(die.global), other);
                None
            }
        }
    }

    fn attr_address(&self, die: &GimliDie, name: DwAt) -> Option<u64> {
        let value = self.attr_value(die, name)?;
        self.dwarf
            .attr_address(self.unit(die), value)
            .ok()
            .flatten()
    }

    fn attr_reference(&self, die: &GimliDie, name: DwAt) -> Option<DieRef> {
        match self.attr_value(die, name)? {
            AttributeValue::UnitRef(offset) => {
                Some(DieRef((self.units[die.unit].start + offset.0) as u64))
            }
            AttributeValue::DebugInfoRef(offset) => Some(DieRef(offset.0 as u64)),
            other => {
                trace!(
                    "{} of DIE {} is not a .debug_info reference: {:?}",
                    name,
                    DieRef(die.global),
                    other
                );
                None
            }
        }
    }
}
