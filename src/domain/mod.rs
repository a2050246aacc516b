//! Catalog domain: product types and the pure listing/validation components.

pub mod pagination;
pub mod product;
pub mod query;
pub mod rating;
pub mod validate;

pub use product::{Category, Dimensions, Discount, NewProduct, NewReview, Product, Rating, Review};
pub use validate::FieldErrors;
