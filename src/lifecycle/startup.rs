//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the database handle
//! - Build and freeze the route table
//! - Report what will be served before the listener binds

use std::path::Path;

use thiserror::Error;

use crate::config::AppConfig;
use crate::controllers;
use crate::db::{Database, DbError};
use crate::http::{BookstoreRouter, HttpServer};
use crate::routing::RouteError;

/// A fatal error during startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("database: {0}")]
    Database(#[from] DbError),

    #[error("routes: {0}")]
    Routes(#[from] RouteError),
}

/// Open storage and build the route table for `config`.
pub fn build_components(config: &AppConfig) -> Result<(BookstoreRouter, Database), StartupError> {
    let db = Database::open(config.catalog.seed_path.as_deref().map(Path::new))?;
    let routes = controllers::build_router(&config.routing)?;

    for route in routes.routes() {
        tracing::debug!(
            method = %route.method,
            template = route.template,
            controller = route.controller,
            action = route.action,
            "Route"
        );
    }
    tracing::info!(
        routes = routes.len(),
        base_paths = ?routes.base_paths(),
        books = db.len(),
        "Route table built"
    );

    Ok((routes, db))
}

/// Build everything the HTTP server needs.
pub fn prepare(config: AppConfig) -> Result<HttpServer, StartupError> {
    let (routes, db) = build_components(&config)?;
    Ok(HttpServer::new(config, routes, db))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_builds() {
        let (routes, db) = build_components(&AppConfig::default()).unwrap();
        assert!(!routes.is_empty());
        assert!(db.is_empty());
    }

    #[test]
    fn test_missing_seed_file_is_fatal() {
        let mut config = AppConfig::default();
        config.catalog.seed_path = Some("/definitely/not/here.json".into());

        assert!(matches!(
            build_components(&config),
            Err(StartupError::Database(DbError::SeedIo(_)))
        ));
    }
}
