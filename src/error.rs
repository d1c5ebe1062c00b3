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

//! Error types for tracker operations and snapshot persistence.

use crate::base::MachineId;
use thiserror::Error;

/// Coarse classification of a [`TrackerError`].
///
/// Transport layers map these directly onto status codes
/// (`NotFound` → 404, `InvalidInput` → 400).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
}

/// Tracker operation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    /// Item name is empty or whitespace-only
    #[error("invalid item name '{0}' (must not be empty)")]
    InvalidItemName(String),

    /// Quantity is zero, negative or out of range
    #[error("invalid quantity {0} (must be a positive integer)")]
    InvalidQuantity(i64),

    /// Machine id is not a non-negative integer
    #[error("invalid vending machine id {0} (must be a non-negative integer)")]
    InvalidMachineId(MachineId),

    /// A machine with this id is already tracked
    #[error("vending machine {0} already exists")]
    DuplicateMachine(MachineId),

    /// Location does not consist of capitalized words
    #[error("invalid location '{0}' (must be one or more capitalized words)")]
    InvalidLocation(String),

    /// Item is not stocked in the machine
    #[error("item '{item}' is not in the inventory of vending machine {id}")]
    UnknownItem { id: MachineId, item: String },

    /// Removal would take the stock below zero
    #[error("cannot remove {requested} of '{item}' from vending machine {id}: only {available} in stock")]
    InsufficientStock {
        id: MachineId,
        item: String,
        requested: u32,
        available: u32,
    },

    /// Adding would exceed the maximum stock count
    #[error("stock of '{item}' in vending machine {id} would overflow")]
    QuantityOverflow { id: MachineId, item: String },

    /// Referenced machine does not exist
    #[error("vending machine {0} not found")]
    MachineNotFound(MachineId),

    /// No tracker snapshot could be loaded
    #[error("no vending machine tracker found")]
    TrackerNotFound,
}

impl TrackerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MachineNotFound(_) | Self::TrackerNotFound => ErrorKind::NotFound,
            Self::InvalidItemName(_)
            | Self::InvalidQuantity(_)
            | Self::InvalidMachineId(_)
            | Self::DuplicateMachine(_)
            | Self::InvalidLocation(_)
            | Self::UnknownItem { .. }
            | Self::InsufficientStock { .. }
            | Self::QuantityOverflow { .. } => ErrorKind::InvalidInput,
        }
    }
}

/// Snapshot persistence errors.
///
/// These stay inside the persistence layer: a failed load is presented to the
/// core as an absent snapshot and a failed save is logged, never retried.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
