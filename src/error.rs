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

//! Errors that can leave the extraction pipeline.
//!
//! Only conditions that make a result impossible (or a missing debug-info
//! context, which the driver downgrades to a warning) are represented here.
//! Failures reading a single DIE or attribute never become an `ExtractError`;
//! they are absorbed where they happen.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    /// The input could not be opened, mapped or recognised as an object file.
    #[error("cannot process {}: {reason}", path.display())]
    FatalInput { path: PathBuf, reason: String },

    /// The object file parsed but carries no static symbol table.
    #[error("{} has no symbol table", path.display())]
    NoSymbolTable { path: PathBuf },

    /// No usable DWARF context. Non-fatal: the parameter map stays empty.
    #[error("no usable debug info: {0}")]
    MissingDebugInfo(String),

    #[error("failed to write {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ExtractError {
    pub fn fatal_input(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::FatalInput {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the pipeline must stop. Everything except a missing debug-info
    /// context is fatal.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::MissingDebugInfo(_))
    }
}
