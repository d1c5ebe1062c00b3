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

//! # Vending Machine Tracker
//!
//! This library tracks a fleet of vending machines (id, location and item
//! inventory) persisted as a single JSON snapshot, and exposes validated
//! create/read/update/delete operations on it.
//!
//! ## Core Components
//!
//! - [`TrackerService`]: Validates requests and serializes all access to a store
//! - [`MachineRepository`]: Load → mutate → save cycles against the snapshot
//! - [`MachineTracker`]: Aggregate of machines, unique by id
//! - [`VendingMachine`]: A machine with its location and inventory
//! - [`SnapshotStore`]: Persistence port, with [`JsonFileStore`] and [`MemoryStore`]
//! - [`TrackerError`]: Rule violations, classified by [`ErrorKind`]
//!
//! ## Example
//!
//! ```
//! use vendmach_tracker::{MachineId, MachineTracker, MemoryStore, TrackerService};
//!
//! let service = TrackerService::new(MemoryStore::with_tracker(MachineTracker::new()));
//!
//! service.add_vend_mach(MachineId(1), "Oslo").unwrap();
//! service.add_item(MachineId(1), "Cola", 5).unwrap();
//!
//! let inventory = service.get_inventory(MachineId(1)).unwrap();
//! assert_eq!(inventory.get("Cola"), Some(&5));
//! ```

mod base;
pub mod config;
pub mod error;
pub mod logging;
pub mod machine;
mod repository;
mod service;
pub mod store;
mod tracker;
pub mod validation;

pub use base::{Inventory, MachineId, Quantity};
pub use error::{ErrorKind, StoreError, TrackerError};
pub use machine::VendingMachine;
pub use repository::MachineRepository;
pub use service::{MachineList, TrackerService};
pub use store::{JsonFileStore, MemoryStore, SnapshotStore};
pub use tracker::MachineTracker;
