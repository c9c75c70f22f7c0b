//! Storage subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     CatalogConfig.seed_path (optional JSON)
//!     → Database::open
//!     → Database handle (Arc'd, cheap to clone)
//!
//! Per request:
//!     Router::dispatch(.., &Database, ..)
//!     → Controller::from_context(&Database)
//!     → store calls
//! ```
//!
//! # Design Decisions
//! - One explicit handle passed as dispatch context, no process-wide singleton
//! - Opened once at startup and dropped at shutdown
//! - Concurrent map, so actions never hold a lock across calls

pub mod catalog;

pub use catalog::{Book, Database, DbError, NewBook};
