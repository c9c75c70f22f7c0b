//! Bookstore HTTP service library.

pub mod config;
pub mod controllers;
pub mod db;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::Router;
