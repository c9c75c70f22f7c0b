//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use bookstore::config::AppConfig;
use bookstore::db::{Book, Database};
use bookstore::http::HttpServer;
use bookstore::lifecycle::{startup, Shutdown};
use tokio::net::TcpListener;

/// A running server plus the handles a test needs to poke at it.
pub struct TestApp {
    pub addr: SocketAddr,
    pub db: Database,
    pub shutdown: Shutdown,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the full service on an ephemeral port with `books` preloaded.
pub async fn spawn_app(config: AppConfig, books: Vec<Book>) -> TestApp {
    let (routes, _) = startup::build_components(&config).unwrap();
    let db = Database::with_books(books).unwrap();
    let server = HttpServer::new(config, routes, db.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestApp { addr, db, shutdown }
}

#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
}

#[allow(dead_code)]
pub fn sample_books() -> Vec<Book> {
    vec![
        Book {
            id: 7,
            title: "Memórias Póstumas de Brás Cubas".into(),
            author: "Machado de Assis".into(),
            price_cents: 4590,
            stock: 2,
            featured: true,
            synopsis: Some("Um defunto autor.".into()),
        },
        Book {
            id: 8,
            title: "O Guarani".into(),
            author: "José de Alencar".into(),
            price_cents: 3290,
            stock: 5,
            featured: false,
            synopsis: None,
        },
    ]
}
