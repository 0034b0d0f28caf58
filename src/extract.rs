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

//! The whole pipeline: symbol table, DWARF walk, join.
//!
//! The symbol catalog and the parameter map are built independently and only
//! meet in [`report::join`]. Everything runs on the calling thread.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Instant;

use log::{debug, info, warn};
use memmap2::Mmap;

use crate::config::Config;
use crate::dwarf::{self, GimliSource};
use crate::error::ExtractError;
use crate::param_map::ParamMap;
use crate::report::{self, OutputEntry, OutputFormat};
use crate::symbols::SymbolCatalog;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractStats {
    pub symbols: usize,
    pub units: usize,
    pub dies_visited: usize,
    pub subprograms: usize,
    pub addresses: usize,
    pub address_collisions: usize,
    pub matched: usize,
    /// False when the input had no usable debug info.
    pub has_debug_info: bool,
}

#[derive(Debug, Clone)]
pub struct Report {
    pub entries: Vec<OutputEntry>,
    pub stats: ExtractStats,
}

impl Report {
    /// Create `path` and write the entries to it.
    pub fn write_to(&self, path: &Path, format: OutputFormat) -> Result<(), ExtractError> {
        let file = File::create(path).map_err(|source| ExtractError::OutputWrite {
            path: path.to_path_buf(),
            source,
        })?;
        report::write_report(&self.entries, format, BufWriter::new(file)).map_err(|source| {
            ExtractError::OutputWrite {
                path: path.to_path_buf(),
                source,
            }
        })
    }
}

/// Map `config.input` and run the pipeline over it.
pub fn run(config: &Config) -> Result<Report, ExtractError> {
    let path = config.input.as_path();
    let file = File::open(path).map_err(|e| ExtractError::fatal_input(path, e))?;
    // SAFETY: the mapping is read-only and dropped before this function
    // returns; nothing in this process writes to the file.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|e| ExtractError::fatal_input(path, e))?;
    extract(&mmap, config)
}

/// Run the pipeline over an in-memory image.
pub fn extract(data: &[u8], config: &Config) -> Result<Report, ExtractError> {
    let path = config.input.as_path();
    let now = Instant::now();

    let obj = object::File::parse(data).map_err(|e| ExtractError::fatal_input(path, e))?;
    let catalog = SymbolCatalog::from_object(&obj, path)?;

    let mut stats = ExtractStats {
        symbols: catalog.len(),
        ..ExtractStats::default()
    };
    let mut params = ParamMap::new(config.duplicates);

    match GimliSource::open(&obj) {
        Ok(source) => {
            let (units, walk) = dwarf::collect_parameters(&source, &mut params);
            stats.has_debug_info = true;
            stats.units = units;
            stats.dies_visited = walk.visited;
            stats.subprograms = walk.subprograms;
            if walk.skipped > 0 {
                debug!("{} DIEs with unreadable tags were skipped", walk.skipped);
            }
        }
        Err(e) if !e.is_fatal() => {
            warn!("{}: {}; no parameters will be reported", path.display(), e);
        }
        Err(e) => return Err(e),
    }
    stats.addresses = params.len();
    stats.address_collisions = params.collisions();

    let entries = report::join(&catalog, &params, config.demangle);
    stats.matched = entries.len();

    info!(
        "{}: {} function symbols, {} compile units, {} subprogram addresses, {} matched in {:.2?}",
        path.display(),
        stats.symbols,
        stats.units,
        stats.addresses,
        stats.matched,
        now.elapsed()
    );
    if stats.address_collisions > 0 {
        debug!(
            "{} entry addresses were claimed more than once ({:?})",
            stats.address_collisions,
            params.policy()
        );
    }

    Ok(Report { entries, stats })
}
