//! # Turnover Cache
//!
//! Pre-aggregates, for every (item, location) pair, the summed positive
//! quantity (debit) and summed absolute negative quantity (credit) across
//! all movements with timestamp in `[1900-01-01, cutoff]`. Supports
//! recompute-on-cutoff-change, wholesale persistence, and lookup by cutoff.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::movement::earliest_allowed;
use crate::domain::{Code, Entity, EntityKind, TurnoverCacheRecord};
use crate::error::Result;
use crate::repository::Repository;

/// UTF-8 JSON snapshot of the cache, per the persisted-state contract:
/// `{ export_date, turnover_cache: [ { unique_code, nomenclature_id,
/// storage_id, period_end, debit_turnover, credit_turnover, calculated_at } ] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSnapshot {
    /// Instant the snapshot was exported.
    pub export_date: DateTime<Utc>,
    /// The cached records themselves.
    pub turnover_cache: Vec<CacheRecordDto>,
}

/// Wire form of one [`TurnoverCacheRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRecordDto {
    /// Record's own code.
    pub unique_code: Code,
    /// Item code.
    pub nomenclature_id: Code,
    /// Location code.
    pub storage_id: Code,
    /// Cutoff instant this record was computed for.
    pub period_end: DateTime<Utc>,
    /// Debit total.
    pub debit_turnover: f64,
    /// Credit total.
    pub credit_turnover: f64,
    /// Instant the record was computed.
    pub calculated_at: DateTime<Utc>,
}

impl From<&TurnoverCacheRecord> for CacheRecordDto {
    fn from(r: &TurnoverCacheRecord) -> Self {
        Self {
            unique_code: r.code,
            nomenclature_id: r.item,
            storage_id: r.location,
            period_end: r.cutoff,
            debit_turnover: r.debit_total,
            credit_turnover: r.credit_total,
            calculated_at: r.computed_at,
        }
    }
}

impl TryFrom<CacheRecordDto> for TurnoverCacheRecord {
    type Error = crate::error::CatalogError;

    fn try_from(dto: CacheRecordDto) -> Result<Self> {
        TurnoverCacheRecord::new(
            dto.unique_code,
            dto.nomenclature_id,
            dto.storage_id,
            dto.period_end,
            dto.debit_turnover,
            dto.credit_turnover,
            dto.calculated_at,
        )
    }
}

/// Outcome of loading a cache snapshot from disk.
pub enum LoadOutcome {
    /// Replaced the in-memory cache with `count` records.
    Loaded(usize),
    /// No file was present — not an error.
    Missing,
}

/// Computes, persists, and looks up the turnover cache.
pub struct TurnoverCacheService {
    repo: Arc<Repository>,
}

impl TurnoverCacheService {
    /// Build a cache service over the given repository.
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    /// Recompute the cache for `cutoff`: evict any existing records at this
    /// exact cutoff, scan every movement once, and install one record per
    /// (item, location) pair that saw at least one movement in the window.
    pub fn recompute(&self, cutoff: DateTime<Utc>) -> Vec<TurnoverCacheRecord> {
        self.evict(cutoff);

        let window_start = earliest_allowed();
        let mut totals: HashMap<(Code, Code), (f64, f64)> = HashMap::new();
        let mut order: Vec<(Code, Code)> = Vec::new();

        for movement_entity in self.repo.bucket(EntityKind::Movement) {
            let Some(movement) = movement_entity.as_movement() else {
                continue;
            };
            if movement.timestamp < window_start || movement.timestamp > cutoff {
                continue;
            }
            let key = (movement.item, movement.location);
            let entry = totals.entry(key).or_insert_with(|| {
                order.push(key);
                (0.0, 0.0)
            });
            if movement.quantity > 0.0 {
                entry.0 += movement.quantity;
            } else {
                entry.1 += movement.quantity.abs();
            }
        }

        let now = Utc::now();
        let mut records = Vec::with_capacity(order.len());
        for (item, location) in order {
            let (debit, credit) = totals[&(item, location)];
            let record =
                TurnoverCacheRecord::new(Code::new(), item, location, cutoff, debit, credit, now)
                    .expect("debit/credit accumulated from signed quantities are non-negative");
            self.repo.append(Entity::TurnoverCache(record.clone()));
            records.push(record);
        }
        records
    }

    /// Remove every cache record whose cutoff exactly equals `cutoff`.
    /// Records at other cutoffs are preserved.
    pub fn evict(&self, cutoff: DateTime<Utc>) {
        for entity in self.repo.bucket(EntityKind::TurnoverCache) {
            if let Some(record) = entity.as_turnover_cache() {
                if record.cutoff == cutoff {
                    self.repo.remove(EntityKind::TurnoverCache, record.code);
                }
            }
        }
    }

    /// All cache records at the given cutoff, for every (item, location)
    /// pair that has one.
    pub fn records_at(&self, cutoff: DateTime<Utc>) -> Vec<TurnoverCacheRecord> {
        self.repo
            .bucket(EntityKind::TurnoverCache)
            .into_iter()
            .filter_map(|e| e.as_turnover_cache().cloned())
            .filter(|r| r.cutoff == cutoff)
            .collect()
    }

    /// Lookup the cache record for one (item, location) pair at `cutoff`.
    pub fn lookup(&self, item: Code, location: Code, cutoff: DateTime<Utc>) -> Option<TurnoverCacheRecord> {
        self.records_at(cutoff)
            .into_iter()
            .find(|r| r.item == item && r.location == location)
    }

    /// `true` if the cache holds no records at all (used to decide whether
    /// the balance service needs to trigger a first compute).
    pub fn is_empty(&self) -> bool {
        self.repo.bucket(EntityKind::TurnoverCache).is_empty()
    }

    /// Build a snapshot of the entire in-memory cache (all cutoffs).
    pub fn snapshot(&self) -> CacheSnapshot {
        let records: Vec<CacheRecordDto> = self
            .repo
            .bucket(EntityKind::TurnoverCache)
            .iter()
            .filter_map(|e| e.as_turnover_cache())
            .map(CacheRecordDto::from)
            .collect();
        CacheSnapshot {
            export_date: Utc::now(),
            turnover_cache: records,
        }
    }

    /// Persist the entire cache to `path` as pretty-printed UTF-8 JSON.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let snapshot = self.snapshot();
        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Replace the in-memory cache wholesale with `snapshot`'s contents.
    pub fn load_snapshot(&self, snapshot: CacheSnapshot) -> Result<()> {
        for entity in self.repo.bucket(EntityKind::TurnoverCache) {
            self.repo.remove(EntityKind::TurnoverCache, entity.code());
        }
        for dto in snapshot.turnover_cache {
            let record = TurnoverCacheRecord::try_from(dto)?;
            self.repo.append(Entity::TurnoverCache(record));
        }
        Ok(())
    }

    /// Load a cache snapshot from `path`. A missing file is not an error —
    /// it is reported as [`LoadOutcome::Missing`].
    pub fn load_from_file(&self, path: impl AsRef<Path>) -> Result<LoadOutcome> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(LoadOutcome::Missing);
        }
        let json = std::fs::read_to_string(path)?;
        let snapshot: CacheSnapshot = serde_json::from_str(&json)?;
        let count = snapshot.turnover_cache.len();
        self.load_snapshot(snapshot)?;
        Ok(LoadOutcome::Loaded(count))
    }
}
