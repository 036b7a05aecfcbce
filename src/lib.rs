//! # Catalog Engine
//!
//! An in-memory inventory and recipe catalog: entities (units, groups,
//! items, locations, movements, recipes) stored in a single [`Repository`],
//! mutated through a synchronous [`events::EventBus`] so that
//! referential-integrity checks run as ordinary subscribers rather than
//! ad-hoc validation scattered across call sites.
//!
//! ## Architecture
//!
//! - [`domain`]: entity types, identity, the unit-of-measure conversion
//!   tree, and the reference-holder contract.
//! - [`repository`]: the eight-bucket in-memory store.
//! - [`events`]: the event bus and the referential-integrity subscriber.
//! - [`filters`]: the generic field/operator/value predicate engine.
//! - [`services`]: reference CRUD, turnover cache, balance, OSV, settings,
//!   and the recipe bootstrap loader.
//! - [`api`]: the axum HTTP surface over the services above.
//! - [`error`]: the crate-wide error type.

#![warn(missing_docs)]

pub mod api;
pub mod domain;
pub mod error;
pub mod events;
pub mod filters;
pub mod repository;
pub mod services;

pub use error::{CatalogError, Result};
pub use repository::Repository;

/// Crate version, as declared in `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name, as declared in `Cargo.toml`.
pub const NAME: &str = env!("CARGO_PKG_NAME");
