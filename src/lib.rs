pub mod app;
pub mod domain;
pub mod infra;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::catalog_service::{CatalogError, CatalogService, ProductPage};
pub use domain::{Category, NewProduct, Product, Rating, Review};
