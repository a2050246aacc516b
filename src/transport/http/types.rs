use crate::app::catalog_service::{CatalogService, ProductPage};
use crate::domain::product::Product;
use crate::domain::query::ListingDefaults;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    pub defaults: ListingDefaults,
}

/// Query parameters for the product listing. Everything is optional; absent
/// or malformed values fall back to the configured defaults.
#[derive(Deserialize, Debug, Default, IntoParams)]
pub struct ListProductsParams {
    /// 1-based page number.
    pub page: Option<String>,
    /// Page size (capped server-side).
    pub limit: Option<String>,
    /// Case-insensitive search over name, description and tags.
    pub search: Option<String>,
    /// Category name, or "all" for no restriction.
    pub category: Option<String>,
    /// Sort key: price-low | price-high | newest | rating | featured.
    pub sort: Option<String>,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    pub products: Vec<Product>,
    pub has_more: bool,
    pub total_count: u64,
    pub current_page: u32,
    pub total_pages: u64,
}

impl From<ProductPage> for ProductListResponse {
    fn from(page: ProductPage) -> Self {
        ProductListResponse {
            products: page.items,
            has_more: page.has_more,
            total_count: page.total_count,
            current_page: page.current_page,
            total_pages: page.total_pages,
        }
    }
}

/// Error envelope. `details` carries the per-field messages of a validation
/// failure; it is omitted for every other error class.
#[derive(Serialize, Debug, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, String>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        ErrorResponse { error: error.into(), details: None }
    }

    pub fn with_details(error: impl Into<String>, details: BTreeMap<String, String>) -> Self {
        ErrorResponse { error: error.into(), details: Some(details) }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}
