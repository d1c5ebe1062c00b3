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

//! Machine tracker aggregate.
//!
//! The [`MachineTracker`] is the aggregate root persisted as one snapshot. It
//! keeps machines in insertion order and never holds two machines with the
//! same id.

use crate::TrackerError;
use crate::base::MachineId;
use crate::machine::VendingMachine;
use serde::{Deserialize, Serialize};

/// Ordered collection of vending machines, unique by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineTracker {
    #[serde(default)]
    machines: Vec<VendingMachine>,
}

impl MachineTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn machines(&self) -> &[VendingMachine] {
        &self.machines
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    pub fn contains(&self, id: MachineId) -> bool {
        self.get(id).is_some()
    }

    /// First machine with the given id.
    pub fn get(&self, id: MachineId) -> Option<&VendingMachine> {
        self.machines.iter().find(|machine| machine.id() == id)
    }

    pub fn get_mut(&mut self, id: MachineId) -> Option<&mut VendingMachine> {
        self.machines.iter_mut().find(|machine| machine.id() == id)
    }

    /// Appends a machine.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::DuplicateMachine`] if a machine with the same id
    /// is already tracked.
    pub fn add_vending_machine(&mut self, machine: VendingMachine) -> Result<(), TrackerError> {
        if self.contains(machine.id()) {
            return Err(TrackerError::DuplicateMachine(machine.id()));
        }
        self.machines.push(machine);
        Ok(())
    }

    /// Removes and returns the machine with the given id, preserving the order
    /// of the remaining machines.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::MachineNotFound`] if no such machine exists.
    pub fn remove_vending_machine(
        &mut self,
        id: MachineId,
    ) -> Result<VendingMachine, TrackerError> {
        let index = self
            .machines
            .iter()
            .position(|machine| machine.id() == id)
            .ok_or(TrackerError::MachineNotFound(id))?;
        Ok(self.machines.remove(index))
    }
}
