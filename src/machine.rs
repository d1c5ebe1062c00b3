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

//! Vending machine entity.
//!
//! A machine owns its inventory exclusively. An item is either absent from the
//! inventory or stocked with a strictly positive quantity: removing the last
//! unit of an item drops its entry.
//!
//! # Example
//!
//! ```
//! use vendmach_tracker::{MachineId, VendingMachine};
//!
//! let mut machine = VendingMachine::new(MachineId(1), "Oslo");
//! machine.add_item("Cola", 5).unwrap();
//! machine.remove_item("Cola", 5).unwrap();
//! assert!(machine.inventory().is_empty());
//! ```

use crate::TrackerError;
use crate::base::{Inventory, MachineId, Quantity};
use serde::{Deserialize, Serialize};

/// A tracked vending machine.
///
/// Field order matches the persisted snapshot: `status`, `id`, `location`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendingMachine {
    #[serde(default)]
    status: Inventory,
    id: MachineId,
    location: String,
}

impl VendingMachine {
    /// Creates a machine with an empty inventory.
    pub fn new(id: MachineId, location: impl Into<String>) -> Self {
        Self {
            status: Inventory::new(),
            id,
            location: location.into(),
        }
    }

    pub fn id(&self) -> MachineId {
        self.id
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn inventory(&self) -> &Inventory {
        &self.status
    }

    /// Current stock of `item`, zero when not stocked.
    pub fn stock(&self, item: &str) -> Quantity {
        self.status.get(item).copied().unwrap_or(0)
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    fn assert_invariants(&self, item: &str) {
        debug_assert!(
            self.status.get(item) != Some(&0),
            "Invariant violated: item '{}' stored with zero quantity",
            item
        );
    }

    /// Increases the stock of `item`, inserting it if absent.
    pub fn add_item(&mut self, item: &str, quantity: Quantity) -> Result<(), TrackerError> {
        if quantity == 0 {
            return Err(TrackerError::InvalidQuantity(0));
        }
        let current = self.stock(item);
        let updated = current
            .checked_add(quantity)
            .ok_or_else(|| TrackerError::QuantityOverflow {
                id: self.id,
                item: item.to_string(),
            })?;
        self.status.insert(item.to_string(), updated);
        self.assert_invariants(item);
        Ok(())
    }

    /// Decreases the stock of `item`, dropping the entry when it reaches zero.
    pub fn remove_item(&mut self, item: &str, quantity: Quantity) -> Result<(), TrackerError> {
        if quantity == 0 {
            return Err(TrackerError::InvalidQuantity(0));
        }
        let available = *self
            .status
            .get(item)
            .ok_or_else(|| TrackerError::UnknownItem {
                id: self.id,
                item: item.to_string(),
            })?;
        if available < quantity {
            return Err(TrackerError::InsufficientStock {
                id: self.id,
                item: item.to_string(),
                requested: quantity,
                available,
            });
        }

        let remaining = available - quantity;
        if remaining == 0 {
            self.status.remove(item);
        } else {
            self.status.insert(item.to_string(), remaining);
        }
        self.assert_invariants(item);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_machine_has_empty_inventory() {
        let machine = VendingMachine::new(MachineId(1), "Oslo");
        assert_eq!(machine.id(), MachineId(1));
        assert_eq!(machine.location(), "Oslo");
        assert!(machine.inventory().is_empty());
    }

    #[test]
    fn add_item_accumulates() {
        let mut machine = VendingMachine::new(MachineId(1), "Oslo");
        machine.add_item("Cola", 5).unwrap();
        machine.add_item("Cola", 3).unwrap();
        assert_eq!(machine.stock("Cola"), 8);
    }

    #[test]
    fn remove_item_partial() {
        let mut machine = VendingMachine::new(MachineId(1), "Oslo");
        machine.add_item("Cola", 5).unwrap();
        machine.remove_item("Cola", 2).unwrap();
        assert_eq!(machine.stock("Cola"), 3);
    }

    #[test]
    fn remove_last_unit_drops_entry() {
        let mut machine = VendingMachine::new(MachineId(1), "Oslo");
        machine.add_item("Cola", 5).unwrap();
        machine.remove_item("Cola", 5).unwrap();
        assert!(!machine.inventory().contains_key("Cola"));
    }

    #[test]
    fn remove_more_than_stocked_is_rejected() {
        let mut machine = VendingMachine::new(MachineId(1), "Oslo");
        machine.add_item("Cola", 2).unwrap();
        let result = machine.remove_item("Cola", 3);
        assert_eq!(
            result,
            Err(TrackerError::InsufficientStock {
                id: MachineId(1),
                item: "Cola".to_string(),
                requested: 3,
                available: 2,
            })
        );
        assert_eq!(machine.stock("Cola"), 2);
    }

    #[test]
    fn remove_unknown_item_is_rejected() {
        let mut machine = VendingMachine::new(MachineId(1), "Oslo");
        let result = machine.remove_item("Fanta", 1);
        assert!(matches!(result, Err(TrackerError::UnknownItem { .. })));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let mut machine = VendingMachine::new(MachineId(1), "Oslo");
        assert_eq!(machine.add_item("Cola", 0), Err(TrackerError::InvalidQuantity(0)));
        assert!(machine.inventory().is_empty());
    }

    #[test]
    fn add_item_overflow_is_rejected() {
        let mut machine = VendingMachine::new(MachineId(1), "Oslo");
        machine.add_item("Cola", Quantity::MAX).unwrap();
        let result = machine.add_item("Cola", 1);
        assert!(matches!(result, Err(TrackerError::QuantityOverflow { .. })));
        assert_eq!(machine.stock("Cola"), Quantity::MAX);
    }

    #[test]
    fn serializes_with_snapshot_key_order() {
        let mut machine = VendingMachine::new(MachineId(1), "Oslo");
        machine.add_item("Cola", 5).unwrap();
        let json = serde_json::to_string(&machine).unwrap();
        assert_eq!(json, r#"{"status":{"Cola":5},"id":1,"location":"Oslo"}"#);
    }

    #[test]
    fn deserializes_without_status() {
        let machine: VendingMachine =
            serde_json::from_str(r#"{"id":3,"location":"Bergen"}"#).unwrap();
        assert_eq!(machine.id(), MachineId(3));
        assert!(machine.inventory().is_empty());
    }
}
