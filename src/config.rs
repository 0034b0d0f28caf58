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

use std::path::PathBuf;

use clap::Parser;

use crate::param_map::DuplicatePolicy;
use crate::report::OutputFormat;

/// Recover function entry addresses and parameter names from an executable's
/// symbol table and DWARF debug info.
#[derive(Parser, Debug)]
#[command(name = "signature-helper", version)]
pub struct Cli {
    /// ELF (or Mach-O/PE) image to read
    pub input: PathBuf,

    /// Where to write the signature listing
    pub output: PathBuf,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Which subprogram keeps an entry address that several DIEs claim
    #[arg(long = "duplicates", value_enum, default_value_t = DuplicatePolicy::LastWins)]
    pub duplicates: DuplicatePolicy,

    /// Demangle Rust and C++ symbol names in the output
    #[arg(long = "demangle", default_value_t = false)]
    pub demangle: bool,

    /// Enable debug output
    #[arg(short = 'd', long = "debug", default_value_t = false)]
    pub debug: bool,

    /// flexi_logger spec string, e.g. "info,signature_helper::dwarf=trace".
    /// Takes precedence over --debug and RUST_LOG.
    #[arg(long = "log-spec")]
    pub log_spec: Option<String>,
}

/// Settings for one extraction run.
#[derive(Debug, Clone)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: OutputFormat,
    pub duplicates: DuplicatePolicy,
    pub demangle: bool,
    pub debug: bool,
    pub log_spec: Option<String>,
}

impl Config {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            format: OutputFormat::default(),
            duplicates: DuplicatePolicy::default(),
            demangle: false,
            debug: false,
            log_spec: None,
        }
    }
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self {
            input: cli.input,
            output: cli.output,
            format: cli.format,
            duplicates: cli.duplicates,
            demangle: cli.demangle,
            debug: cli.debug,
            log_spec: cli.log_spec,
        }
    }
}
