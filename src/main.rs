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

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use signature_helper::{extract, logging, Cli, Config};

fn main() -> Result<()> {
    // Wrong arity exits here with usage and a nonzero status.
    let config = Config::from(Cli::parse());
    let _logger = logging::init(&config).context("failed to start logger")?;

    let report = extract::run(&config)?;
    report.write_to(&config.output, config.format)?;

    info!(
        "wrote {} signatures to {}",
        report.entries.len(),
        config.output.display()
    );
    Ok(())
}
