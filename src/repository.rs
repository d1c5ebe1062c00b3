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

//! Machine-level access to a persisted tracker snapshot.
//!
//! Every mutating call is a full load → mutate → save cycle against the
//! [`SnapshotStore`]. Nothing is cached between calls, so two repositories
//! over the same store must not mutate concurrently; the
//! [`TrackerService`](crate::TrackerService) serializes access for this
//! reason.
//!
//! The repository does not validate input. Callers check formats, existence
//! and stock levels first; a missing machine is reported as `None`.

use crate::TrackerError;
use crate::base::{MachineId, Quantity};
use crate::machine::VendingMachine;
use crate::store::SnapshotStore;
use crate::tracker::MachineTracker;
use tracing::{debug, warn};

pub struct MachineRepository<S> {
    store: S,
}

impl<S: SnapshotStore> MachineRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads the full tracker snapshot, if one exists.
    pub fn snapshot(&self) -> Option<MachineTracker> {
        self.store.load()
    }

    /// Save failures are already logged by the store and are not retried; the
    /// caller still receives the mutated state.
    fn persist(&self, tracker: &MachineTracker) {
        if self.store.save(tracker).is_err() {
            warn!(machines = tracker.len(), "snapshot not persisted");
        }
    }

    /// Loads the snapshot, applies `mutate` to the machine with `id` and saves.
    fn update_machine<F>(&self, id: MachineId, mutate: F) -> Result<Option<VendingMachine>, TrackerError>
    where
        F: FnOnce(&mut VendingMachine) -> Result<(), TrackerError>,
    {
        let Some(mut tracker) = self.snapshot() else {
            debug!(%id, "no snapshot to update");
            return Ok(None);
        };
        let Some(machine) = tracker.get_mut(id) else {
            debug!(%id, "machine not in snapshot");
            return Ok(None);
        };

        mutate(machine)?;
        let updated = machine.clone();
        self.persist(&tracker);
        Ok(Some(updated))
    }

    /// Returns the first machine with `id`.
    pub fn get_machine(&self, id: MachineId) -> Option<VendingMachine> {
        self.snapshot()?.get(id).cloned()
    }

    /// Appends a new machine with an empty inventory.
    ///
    /// Returns `None` when there is no snapshot; a tracker is never created
    /// here, so an unreadable snapshot is not overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::DuplicateMachine`] if the tracker already holds
    /// `id`; nothing is saved in that case.
    pub fn add_machine(
        &self,
        id: MachineId,
        location: &str,
    ) -> Result<Option<MachineTracker>, TrackerError> {
        let Some(mut tracker) = self.snapshot() else {
            debug!(%id, "no snapshot to add machine to");
            return Ok(None);
        };
        tracker.add_vending_machine(VendingMachine::new(id, location))?;
        self.persist(&tracker);
        Ok(Some(tracker))
    }

    /// Removes the machine with `id`; absent ids leave the tracker unchanged.
    ///
    /// Returns `None` only when there is no snapshot.
    pub fn remove_machine(&self, id: MachineId) -> Option<MachineTracker> {
        let mut tracker = self.snapshot()?;
        if tracker.remove_vending_machine(id).is_err() {
            debug!(%id, "machine not in snapshot, nothing removed");
        }
        self.persist(&tracker);
        Some(tracker)
    }

    /// Adds `quantity` units of `item`, inserting the item if needed.
    pub fn add_item(
        &self,
        id: MachineId,
        item: &str,
        quantity: Quantity,
    ) -> Result<Option<VendingMachine>, TrackerError> {
        self.update_machine(id, |machine| machine.add_item(item, quantity))
    }

    /// Removes `quantity` units of `item`, dropping the item at zero.
    pub fn remove_item(
        &self,
        id: MachineId,
        item: &str,
        quantity: Quantity,
    ) -> Result<Option<VendingMachine>, TrackerError> {
        self.update_machine(id, |machine| machine.remove_item(item, quantity))
    }

    pub fn change_location(
        &self,
        id: MachineId,
        location: &str,
    ) -> Result<Option<VendingMachine>, TrackerError> {
        self.update_machine(id, |machine| {
            machine.set_location(location);
            Ok(())
        })
    }
}
