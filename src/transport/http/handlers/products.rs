use crate::app::catalog_service::CatalogError;
use crate::domain::pagination::PageWindow;
use crate::domain::query::ListingParams;
use crate::transport::http::auth::Principal;
use crate::transport::http::types::{
    AppState, ErrorResponse, ListProductsParams, ProductListResponse,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value as JsonValue;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/products",
    params(ListProductsParams),
    responses(
        (status = 200, description = "One page of matching products", body = ProductListResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_products_handler(
    State(state): State<AppState>,
    Query(params): Query<ListProductsParams>,
) -> impl IntoResponse {
    let listing = ListingParams {
        search: params.search.unwrap_or_default(),
        category: params.category.unwrap_or_default(),
        sort: params.sort.unwrap_or_default(),
    };
    let window = PageWindow::from_params(
        params.page.as_deref(),
        params.limit.as_deref(),
        state.defaults,
    );

    match state.catalog.list(&listing, window).await {
        Ok(page) => (StatusCode::OK, Json(ProductListResponse::from(page))).into_response(),
        Err(e) => {
            eprintln!("> Catalog (API): list failed: {}", source_chain(&e));
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to fetch products")),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/products",
    request_body = Object,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Validation failure or duplicate field", body = ErrorResponse),
        (status = 401, description = "No session principal", body = ErrorResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn create_product_handler(
    State(state): State<AppState>,
    principal: Principal,
    payload: Result<Json<JsonValue>, JsonRejection>,
) -> impl IntoResponse {
    let Json(payload) = match payload {
        Ok(v) => v,
        Err(e) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse::new(format!("Invalid JSON body: {}", e))),
            )
                .into_response();
        }
    };

    match state.catalog.create(&payload).await {
        Ok(product) => {
            println!(
                "> Catalog (API): product {} created by {}",
                product.id, principal.subject
            );
            (StatusCode::CREATED, Json(product)).into_response()
        }
        Err(CatalogError::Validation(details)) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::with_details(
                "Missing or invalid required fields",
                details,
            )),
        )
            .into_response(),
        Err(CatalogError::Duplicate { field }) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(format!(
                "Duplicate field value: {} already exists",
                field
            ))),
        )
            .into_response(),
        Err(e) => {
            eprintln!("> Catalog (API): create failed: {}", source_chain(&e));
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to create product")),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "The product", body = Product),
        (status = 404, description = "No such product", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_product_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.catalog.get(id).await {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(CatalogError::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Product not found")),
        )
            .into_response(),
        Err(e) => {
            eprintln!("> Catalog (API): get failed: {}", source_chain(&e));
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to fetch product")),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/products/{id}/reviews",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = Object,
    responses(
        (status = 201, description = "Review added; returns the updated product", body = Product),
        (status = 400, description = "Validation failure", body = ErrorResponse),
        (status = 401, description = "No session principal", body = ErrorResponse),
        (status = 404, description = "No such product", body = ErrorResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn add_review_handler(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    payload: Result<Json<JsonValue>, JsonRejection>,
) -> impl IntoResponse {
    let Json(payload) = match payload {
        Ok(v) => v,
        Err(e) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse::new(format!("Invalid JSON body: {}", e))),
            )
                .into_response();
        }
    };

    match state.catalog.add_review(id, &payload).await {
        Ok(product) => {
            println!(
                "> Catalog (API): review on {} by {} (avg now {:.2}, count {})",
                product.id, principal.subject, product.rating.average, product.rating.count
            );
            (StatusCode::CREATED, Json(product)).into_response()
        }
        Err(CatalogError::Validation(details)) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::with_details(
                "Missing or invalid required fields",
                details,
            )),
        )
            .into_response(),
        Err(CatalogError::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Product not found")),
        )
            .into_response(),
        Err(e) => {
            eprintln!("> Catalog (API): add_review failed: {}", source_chain(&e));
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to add review")),
            )
                .into_response()
        }
    }
}

/// Renders an error with its source chain for the server-side log.
fn source_chain(e: &CatalogError) -> String {
    use std::error::Error;
    let mut out = e.to_string();
    let mut source = e.source();
    while let Some(s) = source {
        out.push_str(": ");
        out.push_str(&s.to_string());
        source = s.source();
    }
    out
}
