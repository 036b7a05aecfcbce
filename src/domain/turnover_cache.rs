//! The turnover-cache record entity.
//!
//! A pre-aggregated, cutoff-dated sum of signed movements for one
//! (item, location) pair. See [`crate::services::turnover_cache_service`]
//! for how these records are computed, persisted, and looked up.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::code::Code;
use super::reference::ReferenceHolder;
use crate::error::{CatalogError, Result};

/// One cached turnover total for an (item, location) pair at a cutoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnoverCacheRecord {
    /// Unique identity.
    pub code: Code,
    /// The item this record aggregates.
    pub item: Code,
    /// The location this record aggregates.
    pub location: Code,
    /// The cutoff instant this record was computed for.
    pub cutoff: DateTime<Utc>,
    /// Sum of positive movement quantities in `[1900-01-01, cutoff]`.
    pub debit_total: f64,
    /// Sum of absolute negative movement quantities in the same window.
    pub credit_total: f64,
    /// Instant the record was computed.
    pub computed_at: DateTime<Utc>,
}

impl TurnoverCacheRecord {
    /// Construct and validate a cache record: both totals must be
    /// non-negative.
    pub fn new(
        code: Code,
        item: Code,
        location: Code,
        cutoff: DateTime<Utc>,
        debit_total: f64,
        credit_total: f64,
        computed_at: DateTime<Utc>,
    ) -> Result<Self> {
        if debit_total < 0.0 || credit_total < 0.0 {
            return Err(CatalogError::integrity(
                "turnover cache totals must be non-negative",
            ));
        }
        Ok(Self {
            code,
            item,
            location,
            cutoff,
            debit_total,
            credit_total,
            computed_at,
        })
    }

    /// `debit_total - credit_total`, the opening balance this record
    /// contributes at its cutoff.
    pub fn net(&self) -> f64 {
        self.debit_total - self.credit_total
    }
}

impl ReferenceHolder for TurnoverCacheRecord {
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
