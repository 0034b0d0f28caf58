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

/// Joining the symbol catalog against the parameter map, and rendering the
/// result.
use std::collections::HashMap;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::param_map::ParamMap;
use crate::symbols::SymbolCatalog;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `name: 0xADDR : [p0, p1]`, one function per line
    #[default]
    Text,
    /// A JSON object keyed by symbol name
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputEntry {
    /// Display name; demangled when requested.
    pub name: String,
    /// Raw symbol table name, unique within a catalog.
    pub symbol: String,
    pub address: u64,
    pub parameters: Vec<String>,
}

impl OutputEntry {
    pub fn format_line(&self) -> String {
        format!(
            "{}: 0x{:x} : [{}]",
            self.name,
            self.address,
            self.parameters.join(", ")
        )
    }
}

/// One entry per catalog symbol whose address has debug info, sorted by
/// address and then name. Symbols without a map entry are dropped; an empty
/// parameter list is kept.
pub fn join(catalog: &SymbolCatalog, params: &ParamMap, demangle: bool) -> Vec<OutputEntry> {
    let mut entries: Vec<OutputEntry> = params
        .iter()
        .flat_map(|(address, found)| {
            catalog.get_by_addr(address).map(move |sym| OutputEntry {
                name: if demangle {
                    demangle_name(&sym.name)
                } else {
                    sym.name.clone()
                },
                symbol: sym.name.clone(),
                address,
                parameters: found.iter().map(|p| p.display_name().into_owned()).collect(),
            })
        })
        .collect();
    // Already in address order; aliases at one address are ordered by name.
    entries.sort_by(|a, b| a.address.cmp(&b.address).then_with(|| a.name.cmp(&b.name)));
    entries
}

/// Rust (legacy and v0) and Itanium C++ names; anything else is returned
/// unchanged.
pub fn demangle_name(name: &str) -> String {
    if let Ok(sym) = rustc_demangle::try_demangle(name) {
        // {:#} drops the trailing hash.
        return format!("{:#}", sym);
    }
    if let Ok(sym) = cpp_demangle::Symbol::new(name) {
        if let Ok(demangled) = sym.demangle() {
            return demangled;
        }
    }
    name.to_string()
}

pub fn write_report<W: Write>(
    entries: &[OutputEntry],
    format: OutputFormat,
    mut out: W,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => {
            for entry in entries {
                writeln!(out, "{}", entry.format_line())?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &to_json(entries))?;
            writeln!(out)?;
        }
    }
    out.flush()
}

/// Keyed by display name. Entries whose display names clash (distinct
/// symbols that demangle alike) are keyed by their raw symbol names instead.
pub fn to_json(entries: &[OutputEntry]) -> Value {
    let mut uses: HashMap<&str, usize> = HashMap::new();
    for entry in entries {
        *uses.entry(entry.name.as_str()).or_default() += 1;
    }

    let mut doc = Map::new();
    for entry in entries {
        let key = if uses[entry.name.as_str()] > 1 {
            &entry.symbol
        } else {
            &entry.name
        };
        doc.insert(
            key.clone(),
            Value::Array(entry.parameters.iter().cloned().map(Value::String).collect()),
        );
    }
    Value::Object(doc)
}
