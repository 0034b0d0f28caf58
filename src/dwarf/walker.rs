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

use std::ops::AddAssign;

use log::trace;

use super::source::DieSource;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WalkStats {
    pub visited: usize,
    pub subprograms: usize,
    /// Nodes whose tag could not be read; their subtrees were not entered.
    pub skipped: usize,
}

impl AddAssign for WalkStats {
    fn add_assign(&mut self, other: Self) {
        self.visited += other.visited;
        self.subprograms += other.subprograms;
        self.skipped += other.skipped;
    }
}

/// Visit every subprogram reachable from `root`.
///
/// Pre-order over an explicit stack, so depth is limited by the heap rather
/// than the call stack. For each node the first child is pushed and then the
/// next sibling, which means a node's siblings are popped before its children.
/// The order is deterministic but is not declaration order.
///
/// `root` is only borrowed. Every other handle is dropped once its child and
/// sibling have been queued.
pub fn walk<S, F>(source: &S, root: &S::Die, mut on_subprogram: F) -> WalkStats
where
    S: DieSource,
    F: FnMut(&S::Die),
{
    let mut stats = WalkStats::default();
    let mut stack: Vec<S::Die> = Vec::new();

    step(source, root, &mut stack, &mut stats, &mut on_subprogram);
    while let Some(die) = stack.pop() {
        step(source, &die, &mut stack, &mut stats, &mut on_subprogram);
    }

    stats
}

fn step<S, F>(
    source: &S,
    die: &S::Die,
    stack: &mut Vec<S::Die>,
    stats: &mut WalkStats,
    on_subprogram: &mut F,
) where
    S: DieSource,
    F: FnMut(&S::Die),
{
    stats.visited += 1;
    match source.tag(die) {
        Some(tag) => {
            if tag == gimli::DW_TAG_subprogram {
                stats.subprograms += 1;
                on_subprogram(die);
            }
            if let Some(child) = source.first_child(die) {
                stack.push(child);
            }
        }
        None => {
            trace!("unreadable tag at {}, skipping its subtree", source.offset(die));
            stats.skipped += 1;
        }
    }
    if let Some(sibling) = source.next_sibling(die) {
        stack.push(sibling);
    }
}
