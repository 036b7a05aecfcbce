//! Application services: the operations external callers (the HTTP layer,
//! bootstrap, or tests) actually invoke. Each service is a thin façade over
//! the repository and event bus built in [`crate::repository`] and
//! [`crate::events`].

pub mod attrs;
pub mod balance_service;
pub mod bootstrap;
pub mod osv_service;
pub mod reference_service;
pub mod settings_service;
pub mod turnover_cache_service;

pub use balance_service::{BalanceRow, BalanceService};
pub use osv_service::{OsvRow, OsvService};
pub use reference_service::ReferenceService;
pub use settings_service::{Settings, SettingsService};
pub use turnover_cache_service::{CacheSnapshot, LoadOutcome, TurnoverCacheService};
