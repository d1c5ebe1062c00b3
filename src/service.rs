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

//! Tracker service.
//!
//! The [`TrackerService`] is the only entry point for reading and mutating the
//! tracker. It validates input, enforces existence rules and delegates to the
//! [`MachineRepository`]. Results are shaped as plain maps (`id → location`,
//! `item → quantity`) rather than entities.
//!
//! # Validation order
//!
//! The first failing rule wins. The order differs per operation:
//!
//! | Operation | Checks |
//! |-----------|--------|
//! | `add_item` | item name, quantity, machine exists |
//! | `remove_item` | item name, quantity, machine exists, item stocked, enough stock |
//! | `add_vend_mach` | id format, snapshot loads, id unused, location |
//! | `remove_vend_mach` | machine exists |
//! | `change_location` | location, machine exists |
//!
//! # Concurrency
//!
//! The repository sits behind a [`Mutex`]; each call holds it from the first
//! check to the final save, so a store has a single writer and concurrent
//! calls cannot lose each other's updates.

use crate::base::{Inventory, MachineId};
use crate::machine::VendingMachine;
use crate::repository::MachineRepository;
use crate::store::SnapshotStore;
use crate::tracker::MachineTracker;
use crate::validation::{
    validate_item_name, validate_location, validate_machine_id_format, validate_quantity,
};
use crate::TrackerError;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Machine id to location listing.
pub type MachineList = BTreeMap<MachineId, String>;

fn machine_list(tracker: &MachineTracker) -> MachineList {
    tracker
        .machines()
        .iter()
        .map(|machine| (machine.id(), machine.location().to_string()))
        .collect()
}

pub struct TrackerService<S> {
    repository: Mutex<MachineRepository<S>>,
}

impl<S: SnapshotStore> TrackerService<S> {
    pub fn new(store: S) -> Self {
        Self {
            repository: Mutex::new(MachineRepository::new(store)),
        }
    }

    /// Runs `op` with exclusive access to the repository, logging rejections.
    fn run<T, F>(&self, operation: &'static str, op: F) -> Result<T, TrackerError>
    where
        F: FnOnce(&MachineRepository<S>) -> Result<T, TrackerError>,
    {
        let repository = self.repository.lock();
        op(&*repository).inspect_err(|e| {
            warn!(operation, kind = ?e.kind(), error = %e, "request rejected");
        })
    }

    /// Loads the snapshot. A missing or unreadable snapshot is not found.
    fn load(repository: &MachineRepository<S>) -> Result<MachineTracker, TrackerError> {
        repository.snapshot().ok_or(TrackerError::TrackerNotFound)
    }

    fn list(repository: &MachineRepository<S>) -> Result<MachineList, TrackerError> {
        Self::load(repository).map(|tracker| machine_list(&tracker))
    }

    fn require_machine(
        tracker: &MachineTracker,
        id: MachineId,
    ) -> Result<&VendingMachine, TrackerError> {
        tracker.get(id).ok_or(TrackerError::MachineNotFound(id))
    }

    /// Checks that no machine in `tracker` already uses `id`.
    fn validate_new_machine_id(tracker: &MachineTracker, id: MachineId) -> Result<(), TrackerError> {
        if tracker.contains(id) {
            return Err(TrackerError::DuplicateMachine(id));
        }
        Ok(())
    }

    /// Lists every machine as `id → location`.
    ///
    /// # Errors
    ///
    /// [`TrackerError::TrackerNotFound`] if there is no snapshot at all. An
    /// existing but empty tracker yields an empty map.
    pub fn get_vend_mach_list(&self) -> Result<MachineList, TrackerError> {
        self.run("get_vend_mach_list", Self::list)
    }

    pub fn get_vend_mach_location(&self, id: MachineId) -> Result<String, TrackerError> {
        self.run("get_vend_mach_location", |repository| {
            Self::list(repository)?
                .remove(&id)
                .ok_or(TrackerError::MachineNotFound(id))
        })
    }

    pub fn get_inventory(&self, id: MachineId) -> Result<Inventory, TrackerError> {
        self.run("get_inventory", |repository| {
            repository
                .get_machine(id)
                .map(|machine| machine.inventory().clone())
                .ok_or(TrackerError::MachineNotFound(id))
        })
    }

    /// Adds `quantity` units of `item` and returns the updated inventory.
    ///
    /// The item name is stored trimmed.
    pub fn add_item(
        &self,
        id: MachineId,
        item: &str,
        quantity: i64,
    ) -> Result<Inventory, TrackerError> {
        self.run("add_item", |repository| {
            let item = validate_item_name(item)?;
            let quantity = validate_quantity(quantity)?;
            Self::require_machine(&Self::load(repository)?, id)?;

            let machine = repository
                .add_item(id, item, quantity)?
                .ok_or(TrackerError::MachineNotFound(id))?;
            info!(%id, item, quantity, "added item");
            Ok(machine.inventory().clone())
        })
    }

    /// Removes `quantity` units of `item` and returns the updated inventory.
    ///
    /// # Errors
    ///
    /// Besides the format and existence rules, fails with
    /// [`TrackerError::UnknownItem`] if the item is not stocked and
    /// [`TrackerError::InsufficientStock`] if `quantity` exceeds the stock.
    pub fn remove_item(
        &self,
        id: MachineId,
        item: &str,
        quantity: i64,
    ) -> Result<Inventory, TrackerError> {
        self.run("remove_item", |repository| {
            let item = validate_item_name(item)?;
            let quantity = validate_quantity(quantity)?;
            let tracker = Self::load(repository)?;
            let machine = Self::require_machine(&tracker, id)?;

            let available = machine
                .inventory()
                .get(item)
                .copied()
                .ok_or_else(|| TrackerError::UnknownItem {
                    id,
                    item: item.to_string(),
                })?;
            if quantity > available {
                return Err(TrackerError::InsufficientStock {
                    id,
                    item: item.to_string(),
                    requested: quantity,
                    available,
                });
            }

            let machine = repository
                .remove_item(id, item, quantity)?
                .ok_or(TrackerError::MachineNotFound(id))?;
            info!(%id, item, quantity, "removed item");
            Ok(machine.inventory().clone())
        })
    }

    /// Creates a machine with an empty inventory and returns the full listing.
    ///
    /// # Errors
    ///
    /// [`TrackerError::TrackerNotFound`] if no snapshot can be loaded; an
    /// unreadable snapshot is never replaced by a fresh tracker.
    pub fn add_vend_mach(&self, id: MachineId, location: &str) -> Result<MachineList, TrackerError> {
        self.run("add_vend_mach", |repository| {
            validate_machine_id_format(id)?;
            Self::validate_new_machine_id(&Self::load(repository)?, id)?;
            validate_location(location)?;

            let tracker = repository
                .add_machine(id, location)?
                .ok_or(TrackerError::TrackerNotFound)?;
            info!(%id, location, "added vending machine");
            Ok(machine_list(&tracker))
        })
    }

    pub fn remove_vend_mach(&self, id: MachineId) -> Result<MachineList, TrackerError> {
        self.run("remove_vend_mach", |repository| {
            Self::require_machine(&Self::load(repository)?, id)?;

            let tracker = repository
                .remove_machine(id)
                .ok_or(TrackerError::TrackerNotFound)?;
            info!(%id, "removed vending machine");
            Ok(machine_list(&tracker))
        })
    }

    /// Moves a machine and returns the full listing.
    pub fn change_location(
        &self,
        id: MachineId,
        location: &str,
    ) -> Result<MachineList, TrackerError> {
        self.run("change_location", |repository| {
            validate_location(location)?;
            let mut tracker = Self::load(repository)?;
            Self::require_machine(&tracker, id)?;

            let machine = repository
                .change_location(id, location)?
                .ok_or(TrackerError::MachineNotFound(id))?;
            if let Some(listed) = tracker.get_mut(id) {
                listed.set_location(machine.location());
            }
            info!(%id, location, "changed location");
            Ok(machine_list(&tracker))
        })
    }
}
