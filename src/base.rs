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

//! Core identifier and quantity types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a vending machine within its tracker.
///
/// Wraps an `i64` so that malformed (negative) ids coming from callers can be
/// represented and rejected by validation rather than by parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct MachineId(pub i64);

impl MachineId {
    /// Returns `true` if the id is a valid identifier for a new machine.
    pub fn is_well_formed(&self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for MachineId {
    fn from(value: i64) -> Self {
        MachineId(value)
    }
}

/// Stock count of a single item in a machine's inventory.
pub type Quantity = u32;

/// Item name to stock count mapping owned by one machine.
///
/// Ordered so that the persisted snapshot and CLI output are deterministic.
pub type Inventory = std::collections::BTreeMap<String, Quantity>;
