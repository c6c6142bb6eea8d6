use std::sync::Arc;

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

mod config;
mod db;
mod error;
mod handlers;
mod models;
mod service;

use crate::config::Config;
use crate::db::{DocumentCollection, MemoryCollection, PgCollection};
use crate::service::ProductService;

/// Shared application state — cheap to clone (all heap behind Arc).
#[derive(Clone)]
pub struct AppState {
    pub products: ProductService,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (ignored in production where env vars are injected)
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new("info,inventory_service=debug"))?,
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    // The store must be ready before the listener accepts traffic.
    let collection: Arc<dyn DocumentCollection> = if config.uses_memory_store() {
        warn!("Using in-memory store; data is lost on exit.");
        Arc::new(MemoryCollection::new())
    } else {
        info!("Connecting to PostgreSQL...");
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;
        info!("Database connection pool established.");

        info!("Running migrations...");
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Migrations complete.");

        Arc::new(PgCollection::new(pool, config.collection.clone()))
    };

    if let Some(limit) = config.store_timeout {
        info!(timeout_ms = limit.as_millis(), "Store calls are time-bounded");
    }

    let state = AppState {
        products: ProductService::new(collection).with_timeout(config.store_timeout),
    };

    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!(collection = %config.collection, "Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped.");
    Ok(())
}

fn build_router(state: AppState) -> Router {
    Router::new()
        // ── Greeting & health ───────────────────────────────────────────────
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))

        // ── Products CRUD ───────────────────────────────────────────────────
        .route(
            "/productos",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/productos/:id",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        )

        // ── Middleware ──────────────────────────────────────────────────────
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        build_router(AppState {
            products: ProductService::new(Arc::new(MemoryCollection::new())),
        })
    }

    fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder().method(method).uri(uri);
        match body {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
        app.clone().oneshot(request(method, uri, body)).await.unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn root_returns_greeting() {
        let response = send(&app(), "GET", "/", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&bytes[..], handlers::GREETING.as_bytes());
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = send(&app(), "GET", "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], json!("ok"));
    }

    #[tokio::test]
    async fn product_lifecycle_over_http() {
        let app = app();

        let response = send(
            &app,
            "POST",
            "/productos",
            Some(json!({ "name": "widget", "stock": 5 })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let ack = body_json(response).await;
        assert_eq!(ack["acknowledged"], json!(true));
        let id = ack["insertedId"].as_str().unwrap().to_string();
        assert_eq!(id.len(), 24);

        let uri = format!("/productos/{id}");

        let response = send(&app, "GET", &uri, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "_id": id, "name": "widget", "stock": 5 })
        );

        let response = send(&app, "PUT", &uri, Some(json!({ "stock": 10 }))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "Producto actualizado exitosamente" })
        );

        let response = send(&app, "GET", &uri, None).await;
        let product = body_json(response).await;
        assert_eq!(product["stock"], json!(10));
        assert_eq!(product["name"], json!("widget"));

        let response = send(&app, "DELETE", &uri, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "Producto eliminado exitosamente" })
        );

        let response = send(&app, "GET", &uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "Producto no encontrado" })
        );

        let response = send(&app, "DELETE", &uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_returns_every_product() {
        let app = app();
        let response = send(&app, "GET", "/productos", None).await;
        assert_eq!(body_json(response).await, json!([]));

        for name in ["a", "b", "c"] {
            send(&app, "POST", "/productos", Some(json!({ "name": name }))).await;
        }

        let response = send(&app, "GET", "/productos", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let names: Vec<Value> = body_json(response)
            .await
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].clone())
            .collect();
        assert_eq!(names, vec![json!("a"), json!("b"), json!("c")]);
    }

    #[tokio::test]
    async fn update_of_absent_product_is_not_found() {
        let uri = format!("/productos/{}", models::ObjectId::generate());
        let response = send(&app(), "PUT", &uri, Some(json!({ "stock": 1 }))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "Producto no encontrado" })
        );
    }

    #[tokio::test]
    async fn malformed_identifier_is_bad_request_on_every_route() {
        let app = app();
        for (method, body) in [
            ("GET", None),
            ("PUT", Some(json!({ "stock": 1 }))),
            ("DELETE", None),
        ] {
            let response = send(&app, method, "/productos/not-a-valid-id", body).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{method}");
            let body = body_json(response).await;
            assert_eq!(body["message"], json!(error::INVALID_ID_MESSAGE));
            assert!(body["error"].as_str().unwrap().contains("24 hex"));
        }
    }

    #[tokio::test]
    async fn writing_identifier_field_is_a_store_fault() {
        let response = send(
            &app(),
            "POST",
            "/productos",
            Some(json!({ "_id": "64b7f0c2a1b2c3d4e5f60718", "name": "x" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_json(response).await["error"].as_str().unwrap().contains("_id"));
    }

    #[tokio::test]
    async fn non_object_body_is_rejected() {
        let response = send(&app(), "POST", "/productos", Some(json!([1, 2, 3]))).await;
        assert!(response.status().is_client_error());
    }
}
