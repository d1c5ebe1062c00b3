// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Command-line and environment configuration shared by the executables.

use crate::store::JsonFileStore;
use crate::TrackerService;
use clap::Args;
use std::path::PathBuf;

/// Default location of the tracker snapshot.
pub const DEFAULT_DATA_FILE: &str = "vendmachtrack.json";

#[derive(Args, Debug, Clone)]
pub struct TrackerConfig {
    /// Path to the JSON tracker snapshot
    #[arg(
        long,
        global = true,
        env = "VENDMACH_DATA_FILE",
        value_name = "FILE",
        default_value = DEFAULT_DATA_FILE
    )]
    pub data_file: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl TrackerConfig {
    pub fn store(&self) -> JsonFileStore {
        JsonFileStore::new(&self.data_file)
    }

    /// Builds a service over the configured snapshot file.
    pub fn service(&self) -> TrackerService<JsonFileStore> {
        TrackerService::new(self.store())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct Cli {
        #[command(flatten)]
        config: TrackerConfig,
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["vendmach"]).unwrap();
        if std::env::var_os("VENDMACH_DATA_FILE").is_none() {
            assert_eq!(cli.config.data_file, PathBuf::from(DEFAULT_DATA_FILE));
        }
        assert!(!cli.config.verbose);
    }

    #[test]
    fn explicit_data_file() {
        let cli =
            Cli::try_parse_from(["vendmach", "--data-file", "/tmp/fleet.json", "-v"]).unwrap();
        assert_eq!(cli.config.store().path(), std::path::Path::new("/tmp/fleet.json"));
        assert!(cli.config.verbose);
    }
}
