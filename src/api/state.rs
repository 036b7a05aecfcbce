//! Shared application state injected into every handler.

use std::path::PathBuf;
use std::sync::Arc;

use crate::events::EventBus;
use crate::repository::Repository;
use crate::services::{BalanceService, OsvService, ReferenceService, SettingsService, TurnoverCacheService};

/// Everything a request handler needs, cheaply cloned (every field is an
/// `Arc` or a small value type).
#[derive(Clone)]
pub struct AppState {
    /// The in-memory entity store.
    pub repo: Arc<Repository>,
    /// The synchronous event bus.
    pub bus: Arc<EventBus>,
    /// Add/change/remove façade for the four reference kinds.
    pub reference_service: Arc<ReferenceService>,
    /// Turnover pre-aggregation.
    pub cache_service: Arc<TurnoverCacheService>,
    /// Balance computation.
    pub balance_service: Arc<BalanceService>,
    /// OSV report generation.
    pub osv_service: Arc<OsvService>,
    /// Settings / cutoff manager.
    pub settings_service: Arc<SettingsService>,
    /// Where the turnover cache snapshot is persisted.
    pub cache_snapshot_path: PathBuf,
}
