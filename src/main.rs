//! Catalog Engine — in-memory inventory and recipe catalog with a turnover
//! cache, a balance/OSV reporting engine, and an axum HTTP surface.
//!
//! Working directory must be writable: settings and the turnover cache
//! snapshot are read from and written to it as relative paths.

use std::path::PathBuf;
use std::sync::Arc;

use catalog_engine::events::integrity::IntegritySubscriber;
use catalog_engine::events::EventBus;
use catalog_engine::repository::Repository;
use catalog_engine::services::{
    BalanceService, OsvService, ReferenceService, SettingsService, TurnoverCacheService,
};
use catalog_engine::api::{build_router, AppState};

const SETTINGS_FILE: &str = "settings.json";
const CACHE_FILE: &str = "turnover_cache.json";
const BOOTSTRAP_ENV: &str = "CATALOG_ENGINE_BOOTSTRAP_FILE";
const BIND_ADDR_ENV: &str = "CATALOG_ENGINE_BIND_ADDR";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    tracing::info!(version = catalog_engine::VERSION, "catalog engine starting");

    if let Err(err) = run().await {
        eprintln!("{err}");
        tracing::error!(%err, "fatal error; shutting down");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let repo = Arc::new(Repository::new());
    let bus = Arc::new(EventBus::new());
    bus.subscribe(Arc::new(IntegritySubscriber::new(repo.clone())));

    let reference_service = Arc::new(ReferenceService::new(repo.clone(), bus.clone()));
    let cache_service = Arc::new(TurnoverCacheService::new(repo.clone()));
    let balance_service = Arc::new(BalanceService::new(
        repo.clone(),
        cache_service.clone(),
        bus.clone(),
    ));
    let osv_service = Arc::new(OsvService::new(repo.clone()));
    let settings_service = Arc::new(SettingsService::load(SETTINGS_FILE)?);

    let cache_snapshot_path = PathBuf::from(CACHE_FILE);
    match cache_service.load_from_file(&cache_snapshot_path)? {
        catalog_engine::services::LoadOutcome::Loaded(count) => {
            tracing::info!(count, "turnover cache snapshot loaded");
        }
        catalog_engine::services::LoadOutcome::Missing => {
            tracing::info!("no turnover cache snapshot on disk; starting empty");
        }
    }

    if settings_service.current().is_first_start {
        if let Ok(bootstrap_path) = std::env::var(BOOTSTRAP_ENV) {
            catalog_engine::services::bootstrap::load_from_file(
                bootstrap_path,
                &reference_service,
                &repo,
            )?;
            tracing::info!("bootstrap recipe document loaded");
        }
        settings_service.mark_started()?;
    }

    let state = AppState {
        repo,
        bus,
        reference_service,
        cache_service,
        balance_service,
        osv_service,
        settings_service,
        cache_snapshot_path,
    };

    let router = build_router(state);

    let bind_addr = std::env::var(BIND_ADDR_ENV).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "listening");
    axum::serve(listener, router).await?;

    Ok(())
}
