use crate::domain::product::{Category, Dimensions, Discount, Product, Rating, Review};
use crate::transport::http::handlers::{health, products};
use crate::transport::http::types::{ErrorResponse, HealthResponse, ProductListResponse};
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        products::list_products_handler,
        products::create_product_handler,
        products::get_product_handler,
        products::add_review_handler
    ),
    components(schemas(
        Product,
        Review,
        Rating,
        Category,
        Dimensions,
        Discount,
        ProductListResponse,
        HealthResponse,
        ErrorResponse
    ))
)]
#[allow(dead_code)]
pub struct ApiDoc;

pub fn create_router(app_state: crate::transport::http::types::AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route(
            "/products",
            get(products::list_products_handler).post(products::create_product_handler),
        )
        .route("/products/:id", get(products::get_product_handler))
        .route("/products/:id/reviews", post(products::add_review_handler))
        .with_state(app_state)
}
