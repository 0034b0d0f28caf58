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

//! Test fixtures: an in-memory `DieSource` and a tiny DWARF 4 assembler.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use gimli::{DwAt, DwTag};

use super::gimli_source::{DwarfReader, GimliSource};
use super::source::{DieRef, DieSource, UnitInfo};

#[derive(Debug, Clone)]
pub enum FakeValue {
    Str(String),
    Flag(bool),
    Addr(u64),
    Ref(usize),
}

#[derive(Default)]
struct FakeNode {
    // None models a DIE whose tag cannot be read.
    tag: Option<DwTag>,
    attrs: Vec<(DwAt, FakeValue)>,
    first_child: Option<usize>,
    last_child: Option<usize>,
    next_sibling: Option<usize>,
}

/// Handle into a `FakeTree`. Tracks how many are alive so tests can check
/// every handle was dropped.
#[derive(Debug)]
pub struct FakeDie {
    index: usize,
    live: Rc<Cell<i64>>,
}

impl Drop for FakeDie {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
    }
}

#[derive(Default)]
pub struct FakeTree {
    nodes: Vec<FakeNode>,
    roots: Vec<usize>,
    live: Rc<Cell<i64>>,
    issued: Cell<usize>,
}

impl FakeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_unit(&mut self) -> usize {
        let root = self.push(Some(gimli::DW_TAG_compile_unit));
        self.roots.push(root);
        root
    }

    pub fn add(&mut self, parent: usize, tag: DwTag) -> usize {
        let node = self.push(Some(tag));
        match self.nodes[parent].last_child {
            Some(last) => self.nodes[last].next_sibling = Some(node),
            None => self.nodes[parent].first_child = Some(node),
        }
        self.nodes[parent].last_child = Some(node);
        node
    }

    pub fn set(&mut self, node: usize, name: DwAt, value: FakeValue) -> usize {
        self.nodes[node].attrs.push((name, value));
        node
    }

    pub fn break_tag(&mut self, node: usize) {
        self.nodes[node].tag = None;
    }

    pub fn subprogram(&mut self, parent: usize, low_pc: u64) -> usize {
        let node = self.add(parent, gimli::DW_TAG_subprogram);
        self.set(node, gimli::DW_AT_low_pc, FakeValue::Addr(low_pc))
    }

    pub fn param(&mut self, parent: usize, name: &str) -> usize {
        let node = self.add(parent, gimli::DW_TAG_formal_parameter);
        self.set(node, gimli::DW_AT_name, FakeValue::Str(name.to_string()))
    }

    /// Handles currently alive.
    pub fn live_handles(&self) -> i64 {
        self.live.get()
    }

    /// Handles created since construction.
    pub fn issued_handles(&self) -> usize {
        self.issued.get()
    }

    fn push(&mut self, tag: Option<DwTag>) -> usize {
        self.nodes.push(FakeNode {
            tag,
            ..FakeNode::default()
        });
        self.nodes.len() - 1
    }

    fn handle(&self, index: usize) -> FakeDie {
        self.live.set(self.live.get() + 1);
        self.issued.set(self.issued.get() + 1);
        FakeDie {
            index,
            live: self.live.clone(),
        }
    }

    fn attr(&self, die: &FakeDie, name: DwAt) -> Option<&FakeValue> {
        self.nodes[die.index]
            .attrs
            .iter()
            .find(|(at, _)| *at == name)
            .map(|(_, value)| value)
    }
}

impl DieSource for FakeTree {
    type Die = FakeDie;

    fn unit_count(&self) -> usize {
        self.roots.len()
    }

    fn unit_info(&self, index: usize) -> Option<UnitInfo> {
        self.roots.get(index).map(|&root| UnitInfo {
            offset: DieRef(root as u64),
            version: 5,
            address_size: 8,
        })
    }

    fn unit_root(&self, index: usize) -> Option<FakeDie> {
        self.roots.get(index).map(|&root| self.handle(root))
    }

    fn tag(&self, die: &FakeDie) -> Option<DwTag> {
        self.nodes[die.index].tag
    }

    fn first_child(&self, die: &FakeDie) -> Option<FakeDie> {
        self.nodes[die.index].first_child.map(|c| self.handle(c))
    }

    fn next_sibling(&self, die: &FakeDie) -> Option<FakeDie> {
        self.nodes[die.index].next_sibling.map(|s| self.handle(s))
    }

    fn die_at(&self, offset: DieRef) -> Option<FakeDie> {
        let index = usize::try_from(offset.0).ok()?;
        (index < self.nodes.len()).then(|| self.handle(index))
    }

    fn offset(&self, die: &FakeDie) -> DieRef {
        DieRef(die.index as u64)
    }

    fn attr_string(&self, die: &FakeDie, name: DwAt) -> Option<String> {
        match self.attr(die, name)? {
            FakeValue::Str(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn attr_flag(&self, die: &FakeDie, name: DwAt) -> Option<bool> {
        match self.attr(die, name)? {
            FakeValue::Flag(f) => Some(*f),
            _ => None,
        }
    }

    fn attr_address(&self, die: &FakeDie, name: DwAt) -> Option<u64> {
        match self.attr(die, name)? {
            FakeValue::Addr(a) => Some(*a),
            _ => None,
        }
    }

    fn attr_reference(&self, die: &FakeDie, name: DwAt) -> Option<DieRef> {
        match self.attr(die, name)? {
            FakeValue::Ref(r) => Some(DieRef(*r as u64)),
            _ => None,
        }
    }
}

/// Abbreviation codes understood by `DwarfBuilder`. All units share one table.
pub mod abbrev {
    pub const COMPILE_UNIT: u8 = 1;
    /// name, low_pc; has children
    pub const SUBPROGRAM: u8 = 2;
    /// name only; has children
    pub const SUBPROGRAM_ABSTRACT: u8 = 3;
    pub const PARAM_NAMED: u8 = 4;
    /// abstract_origin as ref4
    pub const PARAM_ORIGIN: u8 = 5;
    /// name + artificial (flag_present)
    pub const PARAM_ARTIFICIAL: u8 = 6;
    /// abstract_origin as ref_addr
    pub const PARAM_ORIGIN_ADDR: u8 = 7;
    pub const PARAM_ANON: u8 = 8;
    pub const VARIABLE: u8 = 9;
    /// abstract_origin (ref4), low_pc; has children
    pub const SUBPROGRAM_CONCRETE: u8 = 10;
    pub const LEXICAL_BLOCK: u8 = 11;
    /// abstract_origin (ref4) + artificial
    pub const PARAM_ORIGIN_ARTIFICIAL: u8 = 12;
    /// name + abstract_origin (ref4)
    pub const PARAM_NAMED_ORIGIN: u8 = 13;
}

const DW_CHILDREN_NO: u8 = 0;
const DW_CHILDREN_YES: u8 = 1;

// (code, tag, children, [(attribute, form)])
const ABBREVIATIONS: &[(u8, u16, u8, &[(u16, u16)])] = &[
    (abbrev::COMPILE_UNIT, 0x11, DW_CHILDREN_YES, &[(0x03, 0x08)]),
    (abbrev::SUBPROGRAM, 0x2e, DW_CHILDREN_YES, &[(0x03, 0x08), (0x11, 0x01)]),
    (abbrev::SUBPROGRAM_ABSTRACT, 0x2e, DW_CHILDREN_YES, &[(0x03, 0x08)]),
    (abbrev::PARAM_NAMED, 0x05, DW_CHILDREN_NO, &[(0x03, 0x08)]),
    (abbrev::PARAM_ORIGIN, 0x05, DW_CHILDREN_NO, &[(0x31, 0x13)]),
    (abbrev::PARAM_ARTIFICIAL, 0x05, DW_CHILDREN_NO, &[(0x03, 0x08), (0x34, 0x19)]),
    (abbrev::PARAM_ORIGIN_ADDR, 0x05, DW_CHILDREN_NO, &[(0x31, 0x10)]),
    (abbrev::PARAM_ANON, 0x05, DW_CHILDREN_NO, &[]),
    (abbrev::VARIABLE, 0x34, DW_CHILDREN_NO, &[(0x03, 0x08)]),
    (abbrev::SUBPROGRAM_CONCRETE, 0x2e, DW_CHILDREN_YES, &[(0x31, 0x13), (0x11, 0x01)]),
    (abbrev::LEXICAL_BLOCK, 0x0b, DW_CHILDREN_YES, &[]),
    (abbrev::PARAM_ORIGIN_ARTIFICIAL, 0x05, DW_CHILDREN_NO, &[(0x31, 0x13), (0x34, 0x19)]),
    (abbrev::PARAM_NAMED_ORIGIN, 0x05, DW_CHILDREN_NO, &[(0x03, 0x08), (0x31, 0x13)]),
];

fn uleb128(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

pub fn debug_abbrev() -> Vec<u8> {
    let mut out = Vec::new();
    for &(code, tag, children, attrs) in ABBREVIATIONS {
        uleb128(&mut out, code.into());
        uleb128(&mut out, tag.into());
        out.push(children);
        for &(attr, form) in attrs {
            uleb128(&mut out, attr.into());
            uleb128(&mut out, form.into());
        }
        out.extend_from_slice(&[0, 0]);
    }
    out.push(0);
    out
}

struct Fixup {
    at: usize,
    label: &'static str,
    base: usize,
}

/// Assembles a little-endian, 32-bit DWARF 4 `.debug_info` by hand. DIEs are
/// labelled so references can be written before their target exists.
#[derive(Default)]
pub struct DwarfBuilder {
    info: Vec<u8>,
    unit_starts: Vec<usize>,
    labels: HashMap<&'static str, usize>,
    fixups: Vec<Fixup>,
}

impl DwarfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_unit(&mut self) {
        self.unit_starts.push(self.info.len());
        self.info.extend_from_slice(&[0; 4]); // unit_length, patched in end_unit
        self.info.extend_from_slice(&4u16.to_le_bytes());
        self.info.extend_from_slice(&0u32.to_le_bytes()); // debug_abbrev_offset
        self.info.push(8); // address_size
    }

    pub fn end_unit(&mut self) {
        let start = *self.unit_starts.last().expect("end_unit without begin_unit");
        let length = (self.info.len() - start - 4) as u32;
        self.info[start..start + 4].copy_from_slice(&length.to_le_bytes());
    }

    pub fn die(&mut self, code: u8, label: &'static str) {
        self.labels.insert(label, self.info.len());
        uleb128(&mut self.info, code.into());
    }

    pub fn string(&mut self, s: &str) {
        self.info.extend_from_slice(s.as_bytes());
        self.info.push(0);
    }

    pub fn addr(&mut self, address: u64) {
        self.info.extend_from_slice(&address.to_le_bytes());
    }

    /// `DW_FORM_ref4`: relative to the current unit.
    pub fn unit_ref(&mut self, label: &'static str) {
        let base = *self.unit_starts.last().expect("reference outside a unit");
        self.reference(label, base);
    }

    /// `DW_FORM_ref_addr`: relative to the start of `.debug_info`.
    pub fn info_ref(&mut self, label: &'static str) {
        self.reference(label, 0);
    }

    pub fn end_children(&mut self) {
        self.info.push(0);
    }

    pub fn offset_of(&self, label: &str) -> DieRef {
        DieRef(self.labels[label] as u64)
    }

    pub fn unit_offset(&self, index: usize) -> DieRef {
        DieRef(self.unit_starts[index] as u64)
    }

    pub fn debug_info(&self) -> Vec<u8> {
        let mut info = self.info.clone();
        for fixup in &self.fixups {
            let target = self.labels[fixup.label] - fixup.base;
            info[fixup.at..fixup.at + 4].copy_from_slice(&(target as u32).to_le_bytes());
        }
        info
    }

    pub fn load(&self) -> GimliSource {
        let info: Rc<[u8]> = Rc::from(self.debug_info());
        let abbrev: Rc<[u8]> = Rc::from(debug_abbrev());
        let dwarf = gimli::Dwarf::load(|id| -> Result<DwarfReader, gimli::Error> {
            let data = match id {
                gimli::SectionId::DebugInfo => info.clone(),
                gimli::SectionId::DebugAbbrev => abbrev.clone(),
                _ => Rc::from(Vec::new()),
            };
            Ok(gimli::EndianRcSlice::new(data, gimli::RunTimeEndian::Little))
        })
        .expect("in-memory sections always load");
        GimliSource::from_dwarf(dwarf)
    }

    fn reference(&mut self, label: &'static str, base: usize) {
        self.fixups.push(Fixup {
            at: self.info.len(),
            label,
            base,
        });
        self.info.extend_from_slice(&[0; 4]);
    }
}
