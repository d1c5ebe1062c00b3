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

//! Input format rules.
//!
//! Existence checks need a snapshot and live in the service; everything here
//! is a pure check on a single value.

use crate::TrackerError;
use crate::base::{MachineId, Quantity};
use regex::Regex;
use std::sync::LazyLock;

/// Space-separated words, each an uppercase letter followed by lowercase ones.
/// Norwegian Æ, Ø and Å count as letters.
static LOCATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-ZÆØÅ][a-zæøå]*( [A-ZÆØÅ][a-zæøå]*)*$")
        .unwrap_or_else(|e| panic!("location pattern does not compile: {e}"))
});

/// Returns the trimmed item name.
pub fn validate_item_name(item: &str) -> Result<&str, TrackerError> {
    let trimmed = item.trim();
    if trimmed.is_empty() {
        return Err(TrackerError::InvalidItemName(item.to_string()));
    }
    Ok(trimmed)
}

/// Accepts `1..=Quantity::MAX`.
pub fn validate_quantity(quantity: i64) -> Result<Quantity, TrackerError> {
    match Quantity::try_from(quantity) {
        Ok(q) if q >= 1 => Ok(q),
        _ => Err(TrackerError::InvalidQuantity(quantity)),
    }
}

pub fn validate_location(location: &str) -> Result<(), TrackerError> {
    if !LOCATION_PATTERN.is_match(location) {
        return Err(TrackerError::InvalidLocation(location.to_string()));
    }
    Ok(())
}

/// Format check for the id of a machine about to be created.
pub fn validate_machine_id_format(id: MachineId) -> Result<(), TrackerError> {
    if !id.is_well_formed() {
        return Err(TrackerError::InvalidMachineId(id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_name_is_trimmed() {
        assert_eq!(validate_item_name("  Cola ").unwrap(), "Cola");
        assert_eq!(validate_item_name("Coca Cola").unwrap(), "Coca Cola");
    }

    #[test]
    fn blank_item_names_are_rejected() {
        assert!(validate_item_name("").is_err());
        assert!(validate_item_name("   \t").is_err());
    }

    #[test]
    fn quantity_bounds() {
        assert_eq!(validate_quantity(1), Ok(1));
        assert_eq!(validate_quantity(250), Ok(250));
        assert_eq!(validate_quantity(0), Err(TrackerError::InvalidQuantity(0)));
        assert_eq!(validate_quantity(-5), Err(TrackerError::InvalidQuantity(-5)));
        assert!(validate_quantity(i64::from(u32::MAX) + 1).is_err());
    }

    #[test]
    fn valid_locations() {
        for location in ["Oslo", "Bergen", "Ås", "Tromsø", "Øvre Eiker", "Mo I Rana", "Å"] {
            assert!(validate_location(location).is_ok(), "{location}");
        }
    }

    #[test]
    fn invalid_locations() {
        for location in [
            "",
            "oslo",
            "123invalid",
            "Oslo ",
            " Oslo",
            "Oslo  Sentrum",
            "OSLO",
            "Oslo-Sentrum",
            "Oslo sentrum",
        ] {
            assert!(validate_location(location).is_err(), "{location:?}");
        }
    }

    #[test]
    fn machine_id_format() {
        assert!(validate_machine_id_format(MachineId(0)).is_ok());
        assert_eq!(
            validate_machine_id_format(MachineId(-1)),
            Err(TrackerError::InvalidMachineId(MachineId(-1)))
        );
    }
}
