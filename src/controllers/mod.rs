//! Controllers served by the bookstore.
//!
//! Each controller declares a static route table; [`build_router`] registers
//! them in a fixed order, which is also their match priority.

pub mod books;
pub mod health;

pub use books::BookController;
pub use health::HealthController;

use crate::config::RoutingConfig;
use crate::db::{Database, DbError};
use crate::routing::{ControllerError, RouteError, Router};

/// Build the service route table.
pub fn build_router(config: &RoutingConfig) -> Result<Router<Database>, RouteError> {
    let mut router = Router::from_config(config);
    router
        .register::<HealthController>()?
        .register::<BookController>()?;
    Ok(router)
}

impl From<DbError> for ControllerError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(_) => ControllerError::NotFound("Livro não encontrado.".into()),
            DbError::DuplicateId(_) => ControllerError::Conflict("Livro já cadastrado.".into()),
            other => ControllerError::Internal(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_order() {
        let router = build_router(&RoutingConfig::default()).unwrap();
        let listed: Vec<(String, &str)> = router
            .routes()
            .map(|r| (format!("{} {}", r.method, r.template), r.action))
            .collect();

        assert_eq!(
            listed,
            vec![
                ("GET /health".to_string(), "check"),
                ("GET /livros".to_string(), "index"),
                ("GET /livros/destaques".to_string(), "featured"),
                ("GET /livros/{id}".to_string(), "show"),
                ("POST /livros".to_string(), "store"),
                ("PUT /livros/{id}/estoque".to_string(), "update_stock"),
                ("DELETE /livros/{id}".to_string(), "destroy"),
            ]
        );
    }
}
