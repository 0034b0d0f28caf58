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

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use log::{debug, trace};
use object::{Object, ObjectSymbol};

use crate::error::ExtractError;

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolType {
    Function,
    Data,
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolScope {
    Global,
    Static,
    Unknown,
}

impl From<object::SymbolScope> for SymbolScope {
    fn from(scope: object::SymbolScope) -> Self {
        match scope {
            object::SymbolScope::Linkage | object::SymbolScope::Dynamic => SymbolScope::Global,
            object::SymbolScope::Compilation => SymbolScope::Static,
            _ => SymbolScope::Unknown,
        }
    }
}

impl From<object::SymbolKind> for SymbolType {
    fn from(kind: object::SymbolKind) -> Self {
        match kind {
            object::SymbolKind::Text => SymbolType::Function,
            object::SymbolKind::Data | object::SymbolKind::Tls => SymbolType::Data,
            _ => SymbolType::Unknown,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub address: u64,
    pub size: u64,
    pub kind: SymbolType,
    pub scope: SymbolScope,
}

/// Function symbols from the binary's static symbol table.
///
/// Built once, read-only afterwards. Names are unique (a later entry with the
/// same name replaces the earlier one); several names may share an address.
pub struct SymbolCatalog {
    // start_addr -> every name defined there, in insertion order
    symbols_by_addr: BTreeMap<u64, Vec<Arc<Symbol>>>,
    symbols_by_name: HashMap<String, Arc<Symbol>>,
}

impl Default for SymbolCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// `STT_FUNC` on ELF; object also reports `STT_GNU_IFUNC` resolvers as text,
/// but their address is the resolver's, not the function's. Other formats go
/// by the symbol kind alone.
fn is_function<'data, S: ObjectSymbol<'data>>(sym: &S) -> bool {
    if sym.kind() != object::SymbolKind::Text {
        return false;
    }
    match sym.flags() {
        object::SymbolFlags::Elf { st_info, .. } => (st_info & 0xf) == object::elf::STT_FUNC,
        _ => true,
    }
}

impl SymbolCatalog {
    pub fn new() -> Self {
        Self {
            symbols_by_addr: BTreeMap::new(),
            symbols_by_name: HashMap::new(),
        }
    }

    /// Collect every `FUNC` symbol with a nonzero address.
    pub fn from_object(obj: &object::File, path: &Path) -> Result<Self, ExtractError> {
        if obj.symbol_table().is_none() {
            return Err(ExtractError::NoSymbolTable {
                path: path.to_path_buf(),
            });
        }

        let mut catalog = Self::new();
        let mut skipped = 0usize;
        for sym in obj.symbols() {
            if !is_function(&sym) || sym.address() == 0 {
                skipped += 1;
                continue;
            }
            let name = match sym.name() {
                Ok(name) => name,
                Err(e) => {
                    trace!("symbol {} has an unreadable name: {}", sym.index().0, e);
                    skipped += 1;
                    continue;
                }
            };
            catalog.insert(Symbol {
                name: name.to_string(),
                address: sym.address(),
                size: sym.size(),
                kind: sym.kind().into(),
                scope: sym.scope().into(),
            });
        }

        debug!(
            "symbol table: {} function symbols kept, {} entries ignored",
            catalog.len(),
            skipped
        );
        Ok(catalog)
    }

    pub fn insert(&mut self, symbol: Symbol) {
        let symbol = Arc::new(symbol);

        // Last definition of a name wins; unlink the one it replaces.
        if let Some(old) = self
            .symbols_by_name
            .insert(symbol.name.clone(), symbol.clone())
        {
            if let Some(aliases) = self.symbols_by_addr.get_mut(&old.address) {
                aliases.retain(|s| !Arc::ptr_eq(s, &old));
                if aliases.is_empty() {
                    self.symbols_by_addr.remove(&old.address);
                }
            }
        }

        self.symbols_by_addr
            .entry(symbol.address)
            .or_default()
            .push(symbol);
    }

    /// All names defined at exactly `addr`.
    pub fn get_by_addr(&self, addr: u64) -> impl Iterator<Item = &Symbol> {
        self.symbols_by_addr
            .get(&addr)
            .into_iter()
            .flatten()
            .map(|s| s.as_ref())
    }

    /// Symbols in ascending address order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols_by_addr
            .values()
            .flatten()
            .map(|s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.symbols_by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols_by_name.is_empty()
    }
}
