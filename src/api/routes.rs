//! Route table: wires the HTTP surface onto the handlers in
//! [`super::handlers`].

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

/// Build the full application router over `state`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/entities", get(handlers::list_entities))
        .route(
            "/api/data/:kind/:fmt",
            get(handlers::dump_bucket).post(handlers::dump_bucket_filtered),
        )
        .route("/api/filters/:kind", get(handlers::describe_filters))
        .route("/api/reports/osv", get(handlers::osv_report))
        .route("/api/reports/osv/filter", post(handlers::osv_report_filtered))
        .route("/api/balances", get(handlers::balances))
        .route(
            "/api/settings/block-period",
            get(handlers::get_block_period).post(handlers::set_block_period),
        )
        .route(
            "/api/reference/:kind",
            put(handlers::add_reference)
                .patch(handlers::change_reference)
                .delete(handlers::remove_reference),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
