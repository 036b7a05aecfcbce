//! Stock movements ("transactions").

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::code::Code;
use super::reference::ReferenceHolder;
use crate::error::{CatalogError, Result};

/// The earliest timestamp a movement may carry.
pub fn earliest_allowed() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1900, 1, 1, 0, 0, 0).unwrap()
}

/// A single signed stock movement against one item at one location.
///
/// Positive quantity is inflow, negative is outflow. `unit_label` is a
/// free-form, informational string describing the unit the caller recorded
/// the movement in; it is never checked against the item's declared unit
/// (movements are always canonicalized through the item's unit when
/// aggregated).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    /// Unique identity.
    pub code: Code,
    /// Instant the movement occurred.
    pub timestamp: DateTime<Utc>,
    /// The item moved.
    pub item: Code,
    /// The location the movement occurred at.
    pub location: Code,
    /// Signed quantity; positive = inflow, negative = outflow.
    pub quantity: f64,
    /// Free-form, informational unit label.
    pub unit_label: String,
}

impl Movement {
    /// Construct and validate a movement: quantity must be finite and
    /// non-zero, timestamp must be no earlier than 1900-01-01.
    pub fn new(
        code: Code,
        timestamp: DateTime<Utc>,
        item: Code,
        location: Code,
        quantity: f64,
        unit_label: impl Into<String>,
    ) -> Result<Self> {
        if !quantity.is_finite() || quantity == 0.0 {
            return Err(CatalogError::argument(format!(
                "movement quantity must be finite and non-zero, got {quantity}"
            )));
        }
        if timestamp < earliest_allowed() {
            return Err(CatalogError::argument(format!(
                "movement timestamp {timestamp} is before 1900-01-01"
            )));
        }
        Ok(Self {
            code,
            timestamp,
            item,
            location,
            quantity,
            unit_label: unit_label.into(),
        })
    }

    /// `true` if this is an inflow (positive quantity).
    pub fn is_inflow(&self) -> bool {
        self.quantity > 0.0
    }
}

impl ReferenceHolder for Movement {
    fn references(&self) -> Vec<Code> {
        vec![self.item, self.location]
    }

    fn rewrite_references(&mut self, old: Code, new: Code) -> bool {
        let mut changed = false;
        if self.item == old {
            self.item = new;
            changed = true;
        }
        if self.location == old {
            self.location = new;
            changed = true;
        }
        changed
    }
}
