//! Liveness endpoint.

use serde::Serialize;

use crate::db::Database;
use crate::http::ApiResponse;
use crate::routing::{ActionRequest, ActionResult, Controller, RouteDecl};

pub struct HealthController {
    db: Database,
}

#[derive(Serialize)]
struct Health {
    service: &'static str,
    version: &'static str,
    books: usize,
}

impl HealthController {
    fn check(&self, _: &ActionRequest) -> ActionResult {
        Ok(ApiResponse::success(&Health {
            service: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            books: self.db.len(),
        })?)
    }
}

impl Controller<Database> for HealthController {
    const NAME: &'static str = "HealthController";

    fn from_context(db: &Database) -> Self {
        Self { db: db.clone() }
    }

    fn routes() -> Vec<RouteDecl<Self>> {
        vec![RouteDecl::get("/health", "check", Self::check)]
    }
}
