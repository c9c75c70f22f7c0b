//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware: request id, trace, timeout, body limit)
//!     → server.rs front controller (method, URI, body)
//!     → routing::Router::dispatch
//!     → response.rs (JSON envelope, error mapping)
//!     → Send to client
//! ```

pub mod response;
pub mod server;

pub use response::{ApiResponse, ROUTE_NOT_FOUND_MESSAGE};
pub use server::{AppState, BookstoreRouter, HttpServer};
