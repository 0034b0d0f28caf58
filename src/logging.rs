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

/// Logger setup. Everything goes to stderr; stdout is left alone.
use flexi_logger::{FlexiLoggerError, Logger, LoggerHandle};

use crate::config::Config;

/// Spec used when neither `--log-spec` nor `RUST_LOG` is given.
pub fn default_spec(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

/// Start the global logger. Keep the returned handle alive for the whole run.
pub fn init(config: &Config) -> Result<LoggerHandle, FlexiLoggerError> {
    let logger = match &config.log_spec {
        Some(spec) => Logger::try_with_str(spec)?,
        None => Logger::try_with_env_or_str(default_spec(config.debug))?,
    };
    logger
        .log_to_stderr()
        .format(flexi_logger::default_format)
        .start()
}
