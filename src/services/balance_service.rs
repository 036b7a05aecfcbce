//! # Balance Service
//!
//! Combines the pre-cutoff turnover cache with on-the-fly post-cutoff
//! turnovers to compute per-(item, location) balances as of a target
//! instant.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::turnover_cache_service::TurnoverCacheService;
use crate::domain::{Code, EntityKind};
use crate::error::{CatalogError, Result};
use crate::events::{EventBus, EventKind, EventPayload};
use crate::repository::Repository;

/// One row of a balance report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceRow {
    /// The item this row reports on.
    pub item_code: Code,
    /// The item's display name.
    pub item_name: String,
    /// The location this row reports on.
    pub location_code: Code,
    /// The location's display name.
    pub location_name: String,
    /// The resulting balance (end balance, when a cutoff applies).
    pub balance: f64,
    /// The instant this row was computed for.
    pub computed_at: DateTime<Utc>,
    /// Present only when a cutoff is active: the cached opening balance.
    pub start_balance: Option<f64>,
    /// Present only when a cutoff is active: period inflow.
    pub period_debit: Option<f64>,
    /// Present only when a cutoff is active: period outflow.
    pub period_credit: Option<f64>,
}

/// Computes balances, optionally honoring a cutoff held by the settings
/// manager.
pub struct BalanceService {
    repo: Arc<Repository>,
    cache: Arc<TurnoverCacheService>,
    bus: Arc<EventBus>,
}

impl BalanceService {
    /// Build a balance service over the given repository, cache, and bus.
    pub fn new(repo: Arc<Repository>, cache: Arc<TurnoverCacheService>, bus: Arc<EventBus>) -> Self {
        Self { repo, cache, bus }
    }

    fn log_debug(&self, message: impl Into<String>) {
        tracing::debug!("{}", message.into());
    }

    fn log_info(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{}", &message);
        let _ = self
            .bus
            .fire(EventKind::Info, &EventPayload::Log(message));
    }

    /// Compute balances as of `target`, optionally filtered to one
    /// location, honoring `cutoff` if one is set.
    pub fn calculate(
        &self,
        target: DateTime<Utc>,
        location: Option<Code>,
        cutoff: Option<DateTime<Utc>>,
    ) -> Result<Vec<BalanceRow>> {
        self.log_debug(format!("calculating balance as of {target}"));
        match cutoff {
            None => Ok(self.calculate_simple(target, location)),
            Some(cutoff) => self.calculate_with_cutoff(target, location, cutoff),
        }
    }

    fn calculate_simple(&self, target: DateTime<Utc>, location: Option<Code>) -> Vec<BalanceRow> {
        let movements = self.repo.bucket(EntityKind::Movement);
        let mut rows = Vec::new();

        for item_entity in self.repo.bucket(EntityKind::Item) {
            let Some(item) = item_entity.as_item() else { continue };
            for location_entity in self.repo.bucket(EntityKind::Location) {
                let Some(loc) = location_entity.as_location() else { continue };
                if let Some(wanted) = location {
                    if loc.code != wanted {
                        continue;
                    }
                }
                let balance: f64 = movements
                    .iter()
                    .filter_map(|m| m.as_movement())
                    .filter(|m| m.item == item.code && m.location == loc.code && m.timestamp <= target)
                    .map(|m| m.quantity)
                    .sum();
                rows.push(BalanceRow {
                    item_code: item.code,
                    item_name: item.name.clone(),
                    location_code: loc.code,
                    location_name: loc.name.clone(),
                    balance,
                    computed_at: target,
                    start_balance: None,
                    period_debit: None,
                    period_credit: None,
                });
            }
        }
        rows
    }

    fn calculate_with_cutoff(
        &self,
        target: DateTime<Utc>,
        location: Option<Code>,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<BalanceRow>> {
        if target < cutoff {
            return Err(CatalogError::operation(format!(
                "target {target} is before the cutoff {cutoff}"
            )));
        }

        if self.cache.is_empty() {
            self.log_info(format!("turnover cache empty; computing for cutoff {cutoff}"));
            self.cache.recompute(cutoff);
        }

        let movements = self.repo.bucket(EntityKind::Movement);
        let mut rows = Vec::new();

        for item_entity in self.repo.bucket(EntityKind::Item) {
            let Some(item) = item_entity.as_item() else { continue };
            for location_entity in self.repo.bucket(EntityKind::Location) {
                let Some(loc) = location_entity.as_location() else { continue };
                if let Some(wanted) = location {
                    if loc.code != wanted {
                        continue;
                    }
                }

                let start_balance = self
                    .cache
                    .lookup(item.code, loc.code, cutoff)
                    .map(|r| r.net())
                    .unwrap_or(0.0);

                let (period_debit, period_credit) = movements
                    .iter()
                    .filter_map(|m| m.as_movement())
                    .filter(|m| {
                        m.item == item.code
                            && m.location == loc.code
                            && m.timestamp > cutoff
                            && m.timestamp <= target
                    })
                    .fold((0.0, 0.0), |(debit, credit), m| {
                        if m.quantity > 0.0 {
                            (debit + m.quantity, credit)
                        } else {
                            (debit, credit + m.quantity.abs())
                        }
                    });

                let end_balance = start_balance + period_debit - period_credit;

                rows.push(BalanceRow {
                    item_code: item.code,
                    item_name: item.name.clone(),
                    location_code: loc.code,
                    location_name: loc.name.clone(),
                    balance: end_balance,
                    computed_at: target,
                    start_balance: Some(start_balance),
                    period_debit: Some(period_debit),
                    period_credit: Some(period_credit),
                });
            }
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Entity, Group, Item, Location, Movement, Unit};
    use chrono::TimeZone;

    struct Fixture {
        repo: Arc<Repository>,
        cache: Arc<TurnoverCacheService>,
        service: BalanceService,
        item: Code,
        location: Code,
    }

    fn setup() -> Fixture {
        let repo = Arc::new(Repository::new());
        let bus = Arc::new(EventBus::new());
        let cache = Arc::new(TurnoverCacheService::new(repo.clone()));
        let unit = Code::new();
        let group = Code::new();
        let item = Code::new();
        let location = Code::new();
        repo.append(Entity::Unit(Unit::root(unit, "gram")));
        repo.append(Entity::Group(Group::new(group, "Ingredients")));
        repo.append(Entity::Item(Item::new(item, "flour", group, unit)));
        repo.append(Entity::Location(Location::new(location, "main", None)));
        let service = BalanceService::new(repo.clone(), cache.clone(), bus);
        Fixture {
            repo,
            cache,
            service,
            item,
            location,
        }
    }

    fn movement(item: Code, location: Code, ts: DateTime<Utc>, qty: f64) -> Entity {
        Entity::Movement(Movement::new(Code::new(), ts, item, location, qty, "g").unwrap())
    }

    #[test]
    fn scenario_s2_cutoff_then_requery_is_stable() {
        let fx = setup();
        fx.repo.append(movement(
            fx.item,
            fx.location,
            Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap(),
            100.0,
        ));
        fx.repo.append(movement(
            fx.item,
            fx.location,
            Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap(),
            -40.0,
        ));
        fx.repo.append(movement(
            fx.item,
            fx.location,
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            20.0,
        ));

        let cutoff = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let target = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let rows = fx
            .service
            .calculate(target, Some(fx.location), Some(cutoff))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert!((rows[0].balance - 80.0).abs() < 1e-9);

        let earlier_cutoff = Utc.with_ymd_and_hms(2023, 9, 1, 0, 0, 0).unwrap();
        fx.cache.recompute(earlier_cutoff);
        let rows_again = fx
            .service
            .calculate(target, Some(fx.location), Some(earlier_cutoff))
            .unwrap();
        assert!((rows_again[0].balance - 80.0).abs() < 1e-9);
    }

    #[test]
    fn target_before_cutoff_is_rejected() {
        let fx = setup();
        let cutoff = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let target = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        assert!(fx
            .service
            .calculate(target, None, Some(cutoff))
            .is_err());
    }

    #[test]
    fn no_cutoff_sums_all_history() {
        let fx = setup();
        fx.repo.append(movement(
            fx.item,
            fx.location,
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            10.0,
        ));
        fx.repo.append(movement(
            fx.item,
            fx.location,
            Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap(),
            -3.0,
        ));
        let target = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        let rows = fx.service.calculate(target, None, None).unwrap();
        assert_eq!(rows.len(), 1);
        assert!((rows[0].balance - 7.0).abs() < 1e-9);
        assert!(rows[0].start_balance.is_none());
    }
}
