//! # Settings / Cutoff Manager
//!
//! Singleton-style holder for the company record, response-format tag,
//! first-start flag, and the nullable cutoff ("block period") instant.
//! Persisted as pretty-printed UTF-8 JSON; unknown fields round-trip
//! unchanged via `extra`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::turnover_cache_service::TurnoverCacheService;
use crate::domain::Company;
use crate::error::Result;
use crate::events::{EventBus, EventKind, EventPayload};

/// The persisted settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Response serialization tag (e.g. `"JSON"`).
    pub response_format: String,
    /// Whether this is the application's first run.
    pub is_first_start: bool,
    /// The operating company.
    pub company: Company,
    /// Cutoff instant, if one has been set.
    pub block_period: Option<DateTime<Utc>>,
    /// Fields this crate doesn't know about, preserved verbatim on
    /// save/load round-trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            response_format: "JSON".to_string(),
            is_first_start: true,
            company: Company::default(),
            block_period: None,
            extra: Map::new(),
        }
    }
}

/// Loads, persists, and mutates the singleton [`Settings`] document.
pub struct SettingsService {
    path: PathBuf,
    settings: RwLock<Settings>,
}

impl SettingsService {
    /// Load settings from `path` if it exists, otherwise start from
    /// defaults (this is what `is_first_start` tracks).
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let settings = if path.exists() {
            let json = std::fs::read_to_string(&path)?;
            serde_json::from_str(&json)?
        } else {
            Settings::default()
        };
        Ok(Self {
            path,
            settings: RwLock::new(settings),
        })
    }

    /// Current settings, cloned out from behind the lock.
    pub fn current(&self) -> Settings {
        self.settings.read().clone()
    }

    /// The active cutoff, if any.
    pub fn block_period(&self) -> Option<DateTime<Utc>> {
        self.settings.read().block_period
    }

    /// Persist the current settings to disk as pretty-printed UTF-8 JSON.
    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&*self.settings.read())?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    /// Merge `data`'s recognized company fields into the current company
    /// record (used by the bootstrap/first-start path).
    pub fn update_company(&self, data: &Company) {
        self.settings.write().company = data.clone();
    }

    /// Clear `is_first_start` and persist, once startup has run its
    /// first-boot path (bootstrap load attempt included). A no-op, without
    /// touching disk, if the flag is already clear.
    pub fn mark_started(&self) -> Result<()> {
        if !self.settings.read().is_first_start {
            return Ok(());
        }
        self.settings.write().is_first_start = false;
        self.save()
    }

    /// Set the cutoff to `cutoff`, running the five-step sequence: recompute
    /// the turnover cache, persist its snapshot, store and persist the new
    /// settings, then fire `change_block_period`. If any step fails the
    /// settings are rolled back to their pre-call value and the error is
    /// propagated; the cache recompute itself is not rolled back since it is
    /// idempotent and will simply be redone on the next successful call.
    pub fn set_cutoff(
        &self,
        cutoff: DateTime<Utc>,
        cache: &TurnoverCacheService,
        cache_snapshot_path: impl AsRef<Path>,
        bus: &Arc<EventBus>,
    ) -> Result<()> {
        let previous = self.settings.read().clone();

        let result = (|| {
            cache.recompute(cutoff);
            cache.save_to_file(cache_snapshot_path)?;

            self.settings.write().block_period = Some(cutoff);
            self.save()?;

            bus.fire(
                EventKind::ChangeBlockPeriod,
                &EventPayload::BlockPeriod(cutoff.to_rfc3339()),
            )?;
            Ok(())
        })();

        if result.is_err() {
            *self.settings.write() = previous;
        }
        result
    }
}
