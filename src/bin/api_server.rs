// src/bin/api_server.rs

use catalog_service::infra::config;
use catalog_service::transport;
use catalog_service::CatalogService;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // --- Service Initialization ---
    println!("> Initializing CatalogService...");
    let catalog = CatalogService::new().await?;
    println!("> CatalogService initialized successfully (schema ensured).");

    let defaults = config::listing_defaults();
    println!(
        "> Listing defaults: page={} limit={} max_limit={}",
        defaults.page, defaults.limit, defaults.max_limit
    );

    let app_state = transport::http::AppState {
        catalog: Arc::new(catalog),
        defaults,
    };

    // --- API Server Initialization ---
    println!("> Starting API server...");
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url(
            "/api-docs/openapi.json",
            transport::http::ApiDoc::openapi(),
        ))
        .layer(cors);

    let bind_addr = config::bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    println!("> API server listening on http://{}", bind_addr);
    println!("> Swagger UI available at http://{}/swagger-ui", bind_addr);
    println!("> Press Ctrl+C to shut down");

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\n> Shutdown signal received (Ctrl+C)...");
            println!("> Graceful shutdown complete.");
        }
    }

    Ok(())
}
