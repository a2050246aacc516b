//! Catalog domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Closed set of product categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Electronics,
    Clothing,
    Home,
    Beauty,
    Sports,
    Books,
}

impl Category {
    pub const ALL: &'static [Category] = &[
        Category::Electronics,
        Category::Clothing,
        Category::Home,
        Category::Beauty,
        Category::Sports,
        Category::Books,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Electronics => "electronics",
            Category::Clothing => "clothing",
            Category::Home => "home",
            Category::Beauty => "beauty",
            Category::Sports => "sports",
            Category::Books => "books",
        }
    }

    /// Parses a category name. Returns None for anything outside the closed set.
    pub fn parse(s: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.as_str() == s)
    }
}

/// Physical dimensions, all non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

/// A percentage discount with an expiry. Expired discounts are retained on the
/// record but ignored by price computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub percentage: f64,
    pub valid_until: DateTime<Utc>,
}

impl Discount {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.valid_until > now
    }
}

/// Derived rating summary. Never writable by clients; maintained by the
/// rating aggregator whenever the review list changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Rating {
    pub average: f64,
    pub count: i32,
}

impl Rating {
    pub fn zero() -> Self {
        Rating { average: 0.0, count: 0 }
    }
}

/// A single customer review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub name: String,
    pub rating: i32,
    pub date: DateTime<Utc>,
    pub comment: String,
    #[serde(default)]
    pub verified: bool,
}

/// A validated review payload, before the server assigns id and date.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub name: String,
    pub rating: i32,
    pub comment: String,
    pub verified: bool,
}

/// A full catalog product as stored and served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: Category,
    pub stock: i32,
    pub featured: bool,
    pub thumbnail_image: String,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub sku: String,
    pub brand: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<Discount>,
    pub rating: Rating,
    pub reviews: Vec<Review>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Price with an active discount applied. An expired discount is retained
    /// on the record but contributes nothing here.
    pub fn effective_price(&self, now: DateTime<Utc>) -> f64 {
        match &self.discount {
            Some(d) if d.is_active(now) => self.price * (1.0 - d.percentage / 100.0),
            _ => self.price,
        }
    }
}

/// A normalized, validated product record ready for insertion. The server
/// assigns id and timestamps and initializes rating/reviews itself.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: Category,
    pub stock: i32,
    pub featured: bool,
    pub thumbnail_image: String,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub sku: String,
    pub brand: String,
    pub weight: Option<f64>,
    pub dimensions: Option<Dimensions>,
    pub discount: Option<Discount>,
}
