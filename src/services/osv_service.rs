//! # Turnover-Balance Report (OSV)
//!
//! For a window `[S, E]` and one location, reports opening balance, inflow,
//! outflow, and closing balance per item, converted into each item's
//! declared display unit and rounded to three decimals.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{self, Code, EntityKind};
use crate::error::{CatalogError, Result};
use crate::filters::{self, Filter, FilterOp};
use crate::repository::Repository;

/// One row of an OSV report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OsvRow {
    /// The item this row reports on.
    pub item_code: Code,
    /// The item's display name.
    pub item_name: String,
    /// The item's declared unit name, used for display.
    pub unit_name: String,
    /// Balance before the window opened, in the item's declared unit.
    pub opening: f64,
    /// Sum of positive movements within the window.
    pub inflow: f64,
    /// Sum of absolute negative movements within the window.
    pub outflow: f64,
    /// `opening + inflow - outflow`.
    pub closing: f64,
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Generates turnover-balance reports.
pub struct OsvService {
    repo: Arc<Repository>,
}

impl OsvService {
    /// Build an OSV service over the given repository.
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    /// Generate a report directly from a start/end/location triple.
    pub fn generate(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        location: Code,
    ) -> Result<Vec<OsvRow>> {
        self.generate_filtered(start, end, location, &[])
    }

    /// Extract `S`, `E`, and `L` from a filter list's `period`/`storage`
    /// pseudo-fields, then generate a report over the remaining filters
    /// applied to the item sequence before rollup.
    pub fn generate_from_filters(&self, filters_in: &[Filter]) -> Result<Vec<OsvRow>> {
        let mut start: Option<DateTime<Utc>> = None;
        let mut end: Option<DateTime<Utc>> = None;
        let mut location: Option<Code> = None;
        let mut remaining = Vec::new();

        for filter in filters_in {
            if filter.field_name == "period" {
                let instant = parse_instant(&filter.value)?;
                match filter.op {
                    FilterOp::Greater | FilterOp::GreaterEqual | FilterOp::Equals if start.is_none() => {
                        start = Some(instant);
                    }
                    FilterOp::Less | FilterOp::LessEqual | FilterOp::Equals => {
                        end = Some(instant);
                    }
                    _ => remaining.push(filter.clone()),
                }
            } else if filter.field_name == "storage" && filter.op == FilterOp::Equals {
                location = Some(
                    filter
                        .value
                        .parse::<Code>()
                        .map_err(|_| CatalogError::argument("storage filter value is not a valid code"))?,
                );
            } else {
                remaining.push(filter.clone());
            }
        }

        let start = start.ok_or_else(|| CatalogError::argument("missing period start (S)"))?;
        let end = end.ok_or_else(|| CatalogError::argument("missing period end (E)"))?;
        let location = location.ok_or_else(|| CatalogError::argument("missing storage (L)"))?;

        self.generate_filtered(start, end, location, &remaining)
    }

    fn generate_filtered(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        location: Code,
        remaining: &[Filter],
    ) -> Result<Vec<OsvRow>> {
        if start > end {
            return Err(CatalogError::argument("period start is after period end"));
        }
        self.repo
            .find(EntityKind::Location, location)
            .ok_or_else(|| CatalogError::operation(format!("no location with code {location}")))?;

        let item_entities = self.repo.bucket(EntityKind::Item);
        let selected = filters::apply(&self.repo, &item_entities, remaining);

        let movements = self.repo.bucket(EntityKind::Movement);
        let mut rows = Vec::with_capacity(selected.len());

        for entity in selected {
            let Some(item) = entity.as_item() else { continue };
            let unit = self
                .repo
                .find(EntityKind::Unit, item.unit)
                .and_then(|e| e.as_unit().cloned())
                .ok_or_else(|| CatalogError::integrity(format!("unit {} not found", item.unit)))?;

            let relevant = movements
                .iter()
                .filter_map(|m| m.as_movement())
                .filter(|m| m.item == item.code && m.location == location);

            let mut opening_root = 0.0;
            let mut inflow_root = 0.0;
            let mut outflow_root = 0.0;
            for movement in relevant {
                if movement.timestamp < start {
                    opening_root += movement.quantity;
                } else if movement.timestamp <= end {
                    if movement.quantity > 0.0 {
                        inflow_root += movement.quantity;
                    } else {
                        outflow_root += movement.quantity.abs();
                    }
                }
            }

            let opening = domain::unit::from_root(&*self.repo, item.unit, opening_root)?;
            let inflow = domain::unit::from_root(&*self.repo, item.unit, inflow_root)?;
            let outflow = domain::unit::from_root(&*self.repo, item.unit, outflow_root)?;
            let closing = opening + inflow - outflow;

            rows.push(OsvRow {
                item_code: item.code,
                item_name: item.name.clone(),
                unit_name: unit.name.clone(),
                opening: round3(opening),
                inflow: round3(inflow),
                outflow: round3(outflow),
                closing: round3(closing),
            });
        }

        Ok(rows)
    }
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .map_err(|_| CatalogError::argument(format!("{raw:?} is not a valid ISO-8601 instant")))
}
