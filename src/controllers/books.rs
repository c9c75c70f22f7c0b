//! Catalog endpoints.

use serde::Deserialize;

use crate::db::{Database, NewBook};
use crate::http::ApiResponse;
use crate::routing::{ActionRequest, ActionResult, Controller, ControllerError, RouteDecl};

pub struct BookController {
    db: Database,
}

#[derive(Debug, Deserialize)]
struct StockUpdate {
    stock: u32,
}

impl BookController {
    fn index(&self, _: &ActionRequest) -> ActionResult {
        Ok(ApiResponse::success(&self.db.all())?)
    }

    fn featured(&self, _: &ActionRequest) -> ActionResult {
        Ok(ApiResponse::success(&self.db.featured())?)
    }

    fn show(&self, req: &ActionRequest) -> ActionResult {
        let id: u64 = req.param_as("id")?;
        Ok(ApiResponse::success(&self.db.get(id)?)?)
    }

    fn store(&self, req: &ActionRequest) -> ActionResult {
        let new: NewBook = req.json()?;
        if new.title.trim().is_empty() || new.author.trim().is_empty() {
            return Err(ControllerError::BadRequest(
                "Título e autor são obrigatórios.".into(),
            ));
        }

        let book = self.db.insert(new)?;
        tracing::info!(id = book.id, title = %book.title, "Book created");
        Ok(ApiResponse::created(&book)?)
    }

    fn update_stock(&self, req: &ActionRequest) -> ActionResult {
        let id: u64 = req.param_as("id")?;
        let update: StockUpdate = req.json()?;
        Ok(ApiResponse::success(&self.db.set_stock(id, update.stock)?)?)
    }

    fn destroy(&self, req: &ActionRequest) -> ActionResult {
        let id: u64 = req.param_as("id")?;
        let removed = self.db.remove(id)?;
        tracing::info!(id, "Book removed");
        Ok(ApiResponse::success(&removed)?)
    }
}

impl Controller<Database> for BookController {
    const NAME: &'static str = "BookController";

    fn from_context(db: &Database) -> Self {
        Self { db: db.clone() }
    }

    fn routes() -> Vec<RouteDecl<Self>> {
        vec![
            RouteDecl::get("/livros", "index", Self::index),
            // Before `{id}` so the literal segment wins.
            RouteDecl::get("/livros/destaques", "featured", Self::featured),
            RouteDecl::get("/livros/{id}", "show", Self::show),
            RouteDecl::post("/livros", "store", Self::store),
            RouteDecl::put("/livros/{id}/estoque", "update_stock", Self::update_stock),
            RouteDecl::delete("/livros/{id}", "destroy", Self::destroy),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::build_router;
    use crate::config::RoutingConfig;
    use crate::db::Book;
    use axum::http::StatusCode;
    use bytes::Bytes;
    use serde_json::json;

    fn seeded() -> Database {
        Database::with_books(vec![
            Book {
                id: 1,
                title: "Dom Casmurro".into(),
                author: "Machado de Assis".into(),
                price_cents: 3990,
                stock: 4,
                featured: true,
                synopsis: None,
            },
            Book {
                id: 2,
                title: "Vidas Secas".into(),
                author: "Graciliano Ramos".into(),
                price_cents: 2990,
                stock: 0,
                featured: false,
                synopsis: None,
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_featured_wins_over_id_placeholder() {
        let router = build_router(&RoutingConfig::default()).unwrap();
        let db = seeded();

        let response = router
            .dispatch("/livros/destaques", "GET", &db, Bytes::new())
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body()["data"].as_array().unwrap().len(), 1);
        assert_eq!(response.body()["data"][0]["id"], 1);
    }

    #[test]
    fn test_show_coerces_id() {
        let router = build_router(&RoutingConfig::default()).unwrap();
        let db = seeded();

        let response = router.dispatch("/livros/2", "GET", &db, Bytes::new()).unwrap();
        assert_eq!(response.body()["data"]["title"], "Vidas Secas");

        let err = router
            .dispatch("/livros/dois", "GET", &db, Bytes::new())
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = router.dispatch("/livros/99", "GET", &db, Bytes::new()).unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Livro não encontrado.");
    }

    #[test]
    fn test_store_validates_and_creates() {
        let router = build_router(&RoutingConfig::default()).unwrap();
        let db = seeded();

        let body = json!({"title": "Iracema", "author": "José de Alencar", "price_cents": 1990});
        let response = router
            .dispatch("/livros", "POST", &db, Bytes::from(body.to_string()))
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.body()["data"]["id"], 3);
        assert_eq!(db.len(), 3);

        let body = json!({"title": " ", "author": "Ninguém", "price_cents": 1});
        let err = router
            .dispatch("/livros", "POST", &db, Bytes::from(body.to_string()))
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(db.len(), 3);
    }

    #[test]
    fn test_update_stock_and_destroy() {
        let router = build_router(&RoutingConfig::default()).unwrap();
        let db = seeded();

        let response = router
            .dispatch("/livros/2/estoque", "PUT", &db, Bytes::from_static(br#"{"stock": 9}"#))
            .unwrap();
        assert_eq!(response.body()["data"]["stock"], 9);

        router.dispatch("/livros/2", "DELETE", &db, Bytes::new()).unwrap();
        assert!(db.get(2).is_err());

        let err = router.dispatch("/livros/2", "DELETE", &db, Bytes::new()).unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
