//! # HTTP Surface
//!
//! A thin axum layer over the services in [`crate::services`]. Routing,
//! request parsing, and error-to-status-code mapping live here; all
//! business logic stays in the services themselves.

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
