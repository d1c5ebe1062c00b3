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

use clap::{Parser, Subcommand};
use csv::Writer;
use serde::Serialize;
use std::io::Write;
use std::process;
use vendmach_tracker::config::TrackerConfig;
use vendmach_tracker::{ErrorKind, Inventory, MachineId, MachineList, TrackerError, logging};

/// Vending Machine Tracker - Manage a fleet of vending machines
///
/// Reads and updates the tracker snapshot file and writes results to stdout
/// as CSV.
#[derive(Parser, Debug)]
#[command(name = "vendmach")]
#[command(about = "Track vending machines, their locations and inventories", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: TrackerConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty tracker file if none exists
    Init,
    /// List all machines and their locations
    List,
    /// Show the location of a machine
    Location { id: i64 },
    /// Show the inventory of a machine
    Inventory { id: i64 },
    /// Stock items in a machine
    AddItem {
        id: i64,
        item: String,
        #[arg(allow_hyphen_values = true)]
        quantity: i64,
    },
    /// Take items out of a machine
    RemoveItem {
        id: i64,
        item: String,
        #[arg(allow_hyphen_values = true)]
        quantity: i64,
    },
    /// Register a new machine
    AddMachine {
        #[arg(allow_hyphen_values = true)]
        id: i64,
        location: String,
    },
    /// Remove a machine
    RemoveMachine { id: i64 },
    /// Move a machine to a new location
    ChangeLocation { id: i64, location: String },
}

/// Result of a command, ready to be written out.
enum Output {
    Message(String),
    Machines(MachineList),
    Location(MachineId, String),
    Inventory(Inventory),
}

#[derive(Serialize)]
struct MachineRow<'a> {
    id: i64,
    location: &'a str,
}

#[derive(Serialize)]
struct ItemRow<'a> {
    item: &'a str,
    quantity: u32,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Tracker(#[from] TrackerError),
    #[error(transparent)]
    Store(#[from] vendmach_tracker::StoreError),
    #[error("failed to write output: {0}")]
    Output(#[from] csv::Error),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Tracker(e) => match e.kind() {
                ErrorKind::InvalidInput => 2,
                ErrorKind::NotFound => 3,
            },
            CliError::Store(_) | CliError::Output(_) => 1,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.config.verbose);

    let result = run(&cli.config, cli.command)
        .and_then(|output| write_output(&output, std::io::stdout()).map_err(CliError::from));

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn run(config: &TrackerConfig, command: Command) -> Result<Output, CliError> {
    let service = config.service();
    let output = match command {
        Command::Init => {
            let message = if config.store().init_if_missing()? {
                format!("created {}", config.data_file.display())
            } else {
                format!("{} already exists", config.data_file.display())
            };
            Output::Message(message)
        }
        Command::List => Output::Machines(service.get_vend_mach_list()?),
        Command::Location { id } => {
            let id = MachineId(id);
            Output::Location(id, service.get_vend_mach_location(id)?)
        }
        Command::Inventory { id } => Output::Inventory(service.get_inventory(MachineId(id))?),
        Command::AddItem { id, item, quantity } => {
            Output::Inventory(service.add_item(MachineId(id), &item, quantity)?)
        }
        Command::RemoveItem { id, item, quantity } => {
            Output::Inventory(service.remove_item(MachineId(id), &item, quantity)?)
        }
        Command::AddMachine { id, location } => {
            Output::Machines(service.add_vend_mach(MachineId(id), &location)?)
        }
        Command::RemoveMachine { id } => Output::Machines(service.remove_vend_mach(MachineId(id))?),
        Command::ChangeLocation { id, location } => {
            Output::Machines(service.change_location(MachineId(id), &location)?)
        }
    };
    Ok(output)
}

/// Write a command result as CSV.
///
/// # CSV Format
///
/// Machine listings use `id,location`; inventories use `item,quantity`.
///
/// ```csv
/// id,location
/// 1,Oslo
/// 2,Bergen
/// ```
///
/// # Errors
///
/// Returns a CSV error if writing fails.
fn write_output<W: Write>(output: &Output, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    match output {
        Output::Message(message) => {
            wtr.write_record([message.as_str()])?;
        }
        Output::Machines(machines) => {
            if machines.is_empty() {
                wtr.write_record(["id", "location"])?;
            }
            for (id, location) in machines {
                wtr.serialize(MachineRow { id: id.0, location })?;
            }
        }
        Output::Location(id, location) => {
            wtr.serialize(MachineRow { id: id.0, location })?;
        }
        Output::Inventory(inventory) => {
            if inventory.is_empty() {
                wtr.write_record(["item", "quantity"])?;
            }
            for (item, quantity) in inventory {
                wtr.serialize(ItemRow { item, quantity: *quantity })?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> TrackerConfig {
        TrackerConfig {
            data_file: dir.path().join("tracker.json"),
            verbose: false,
        }
    }

    fn render(output: &Output) -> String {
        let mut buffer = Vec::new();
        write_output(output, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn parse_add_item() {
        let cli = Cli::try_parse_from(["vendmach", "add-item", "1", "Cola", "5"]).unwrap();
        match cli.command {
            Command::AddItem { id, item, quantity } => {
                assert_eq!((id, item.as_str(), quantity), (1, "Cola", 5));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parse_negative_machine_id() {
        let cli = Cli::try_parse_from(["vendmach", "add-machine", "-4", "Oslo"]).unwrap();
        assert!(matches!(cli.command, Command::AddMachine { id: -4, .. }));
    }

    #[test]
    fn list_before_init_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = run(&config_in(&dir), Command::List).err().unwrap();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn init_then_add_machine() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        run(&config, Command::Init).unwrap();

        let output = run(
            &config,
            Command::AddMachine {
                id: 1,
                location: "Oslo".to_string(),
            },
        )
        .unwrap();
        assert_eq!(render(&output), "id,location\n1,Oslo\n");
    }

    #[test]
    fn invalid_location_exit_code() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        run(&config, Command::Init).unwrap();

        let err = run(
            &config,
            Command::AddMachine {
                id: 2,
                location: "123invalid".to_string(),
            },
        )
        .err()
        .unwrap();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn inventory_output() {
        let mut inventory = Inventory::new();
        inventory.insert("Cola".to_string(), 5);
        inventory.insert("Fanta".to_string(), 2);
        assert_eq!(
            render(&Output::Inventory(inventory)),
            "item,quantity\nCola,5\nFanta,2\n"
        );
    }

    #[test]
    fn empty_inventory_prints_header() {
        assert_eq!(render(&Output::Inventory(Inventory::new())), "item,quantity\n");
    }
}
