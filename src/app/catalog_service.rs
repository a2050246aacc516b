//! The catalog service facade.
//!
//! This module is the intermediary between the HTTP transport and PostgreSQL.
//! It is responsible for:
//! 1.  Executing listing queries (filter + sort + windowed fetch + count).
//! 2.  Persisting validated product records with server-assigned identity.
//! 3.  Appending reviews and recomputing the derived rating in the same
//!     transaction as the review mutation.

use crate::domain::pagination::{PageInfo, PageWindow};
use crate::domain::product::{Category, Product, Rating, Review};
use crate::domain::query::{Filter, ListingParams, ListingQuery};
use crate::domain::rating::recompute_rating;
use crate::domain::validate::{validate_create_payload, validate_review_payload, FieldErrors};
use crate::infra::config;
use chrono::Utc;
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, QueryBuilder, Row};
use thiserror::Error;
use uuid::Uuid;

/// Failure taxonomy for catalog operations. Storage detail never reaches the
/// client; the transport layer maps each variant to its status code.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("validation failed")]
    Validation(FieldErrors),
    #[error("duplicate field value: {field} already exists")]
    Duplicate { field: String },
    #[error("product not found")]
    NotFound,
    #[error("storage failure")]
    Storage(#[source] anyhow::Error),
}

/// One page of listing results plus the derived paging facts.
#[derive(Debug)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total_count: u64,
    pub current_page: u32,
    pub total_pages: u64,
    pub has_more: bool,
}

/// The main service that manages catalog persistence.
pub struct CatalogService {
    pool: PgPool,
}

impl CatalogService {
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Connects to the database and ensures the catalog schema exists.
    pub async fn new() -> Result<Self, anyhow::Error> {
        dotenv::dotenv().ok();
        let database_url = config::database_url();

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await?;

        Self::with_pool(pool).await
    }

    /// Builds the service around an existing pool and ensures the schema.
    pub async fn with_pool(pool: PgPool) -> Result<Self, anyhow::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS products (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                price DOUBLE PRECISION NOT NULL,
                category TEXT NOT NULL,
                stock INTEGER NOT NULL DEFAULT 0,
                featured BOOLEAN NOT NULL DEFAULT FALSE,
                thumbnail_image TEXT NOT NULL,
                images JSONB NOT NULL,
                tags JSONB NOT NULL DEFAULT '[]',
                sku TEXT NOT NULL DEFAULT '',
                brand TEXT NOT NULL DEFAULT '',
                weight DOUBLE PRECISION,
                dimensions JSONB,
                discount JSONB,
                rating_average DOUBLE PRECISION NOT NULL DEFAULT 0,
                rating_count INTEGER NOT NULL DEFAULT 0,
                reviews JSONB NOT NULL DEFAULT '[]',
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .execute(&pool)
        .await?;

        // Sparse uniqueness: sku is only unique when present (non-empty).
        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS products_sku_key ON products (sku) WHERE sku <> ''",
        )
        .execute(&pool)
        .await?;

        for index_sql in [
            "CREATE INDEX IF NOT EXISTS products_category_featured_idx ON products (category, featured DESC)",
            "CREATE INDEX IF NOT EXISTS products_price_idx ON products (price)",
            "CREATE INDEX IF NOT EXISTS products_created_at_idx ON products (created_at DESC)",
            "CREATE INDEX IF NOT EXISTS products_rating_average_idx ON products (rating_average DESC)",
        ] {
            sqlx::query(index_sql).execute(&pool).await?;
        }

        Ok(Self { pool })
    }

    /// Runs a listing query: count the matching set, fetch one window, and
    /// derive the paging facts.
    pub async fn list(
        &self,
        params: &ListingParams,
        window: PageWindow,
    ) -> Result<ProductPage, CatalogError> {
        let query = ListingQuery::build(params);

        let mut count_qb: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("SELECT COUNT(*) AS total FROM products");
        push_filter(&mut count_qb, &query.filter);
        let total_count: i64 = count_qb
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?
            .try_get("total")
            .map_err(storage_error)?;
        let total_count = total_count.max(0) as u64;

        let mut fetch_qb: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("SELECT * FROM products");
        push_filter(&mut fetch_qb, &query.filter);
        fetch_qb
            .push(" ORDER BY ")
            .push(query.order.sql())
            .push(" OFFSET ")
            .push_bind(window.skip() as i64)
            .push(" LIMIT ")
            .push_bind(window.limit as i64);

        let rows = fetch_qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(product_from_row(&row).map_err(CatalogError::Storage)?);
        }

        let info = PageInfo::compute(window, total_count);
        Ok(ProductPage {
            items,
            total_count,
            current_page: window.page,
            total_pages: info.total_pages,
            has_more: info.has_more,
        })
    }

    /// Validates and persists a new product. The server assigns the id and
    /// timestamps and initializes rating/reviews; client-supplied values for
    /// those fields never survive normalization.
    pub async fn create(&self, payload: &JsonValue) -> Result<Product, CatalogError> {
        let new_product = validate_create_payload(payload).map_err(CatalogError::Validation)?;

        let id = Uuid::new_v4();
        let rating = Rating::zero();
        let reviews: Vec<Review> = Vec::new();

        let row = sqlx::query(
            "INSERT INTO products (
                id, name, description, price, category, stock, featured,
                thumbnail_image, images, tags, sku, brand, weight, dimensions,
                discount, rating_average, rating_count, reviews
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18
            ) RETURNING *",
        )
        .bind(id)
        .bind(&new_product.name)
        .bind(&new_product.description)
        .bind(new_product.price)
        .bind(new_product.category.as_str())
        .bind(new_product.stock)
        .bind(new_product.featured)
        .bind(&new_product.thumbnail_image)
        .bind(serde_json::json!(new_product.images))
        .bind(serde_json::json!(new_product.tags))
        .bind(&new_product.sku)
        .bind(&new_product.brand)
        .bind(new_product.weight)
        .bind(
            new_product
                .dimensions
                .as_ref()
                .map(|d| serde_json::json!(d)),
        )
        .bind(new_product.discount.as_ref().map(|d| serde_json::json!(d)))
        .bind(rating.average)
        .bind(rating.count)
        .bind(serde_json::json!(reviews))
        .fetch_one(&self.pool)
        .await
        .map_err(classify_db_error)?;

        product_from_row(&row).map_err(CatalogError::Storage)
    }

    /// Fetches a single product by id.
    pub async fn get(&self, id: Uuid) -> Result<Product, CatalogError> {
        let row = sqlx::query("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        match row {
            Some(row) => product_from_row(&row).map_err(CatalogError::Storage),
            None => Err(CatalogError::NotFound),
        }
    }

    /// Appends a validated review and recomputes the derived rating inside the
    /// same transaction as the review write. The row lock makes concurrent
    /// reviewers serialize instead of losing updates, and a reader can never
    /// observe a review list whose rating summary is stale.
    pub async fn add_review(
        &self,
        id: Uuid,
        payload: &JsonValue,
    ) -> Result<Product, CatalogError> {
        let new_review = validate_review_payload(payload).map_err(CatalogError::Validation)?;

        let mut transaction = self.pool.begin().await.map_err(storage_error)?;

        let row = sqlx::query("SELECT reviews FROM products WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *transaction)
            .await
            .map_err(storage_error)?;

        let reviews_json: JsonValue = match row {
            Some(row) => row.try_get("reviews").map_err(storage_error)?,
            None => return Err(CatalogError::NotFound),
        };
        let mut reviews: Vec<Review> =
            serde_json::from_value(reviews_json).map_err(|e| CatalogError::Storage(e.into()))?;

        reviews.push(Review {
            id: Uuid::new_v4(),
            name: new_review.name,
            rating: new_review.rating,
            date: Utc::now(),
            comment: new_review.comment,
            verified: new_review.verified,
        });
        let rating = recompute_rating(&reviews);

        let row = sqlx::query(
            "UPDATE products
             SET reviews = $1, rating_average = $2, rating_count = $3, updated_at = now()
             WHERE id = $4
             RETURNING *",
        )
        .bind(serde_json::json!(reviews))
        .bind(rating.average)
        .bind(rating.count)
        .bind(id)
        .fetch_one(&mut *transaction)
        .await
        .map_err(storage_error)?;

        transaction.commit().await.map_err(storage_error)?;

        product_from_row(&row).map_err(CatalogError::Storage)
    }
}

/// Appends the WHERE clause for a listing filter. The search term matches
/// name OR description OR any tag, all case-insensitively.
fn push_filter(qb: &mut QueryBuilder<'_, sqlx::Postgres>, filter: &Filter) {
    let mut first = true;
    if let Some(term) = &filter.search {
        let pattern = format!("%{}%", term);
        qb.push(" WHERE (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR EXISTS (SELECT 1 FROM jsonb_array_elements_text(tags) AS tag WHERE tag ILIKE ")
            .push_bind(pattern)
            .push("))");
        first = false;
    }
    if let Some(category) = &filter.category {
        qb.push(if first { " WHERE " } else { " AND " })
            .push("category = ")
            .push_bind(category.clone());
    }
}

fn storage_error(e: sqlx::Error) -> CatalogError {
    CatalogError::Storage(e.into())
}

/// Classifies an insert failure: unique violations become duplicate-field
/// errors naming the offending field; NOT NULL / CHECK violations surface as
/// structured messages; everything else is a generic storage failure.
fn classify_db_error(e: sqlx::Error) -> CatalogError {
    if let sqlx::Error::Database(db_err) = &e {
        let code = db_err.code();
        match code.as_deref() {
            // unique_violation
            Some("23505") => {
                let field = db_err
                    .constraint()
                    .map(constraint_to_field)
                    .unwrap_or_else(|| "unknown".to_string());
                return CatalogError::Duplicate { field };
            }
            // not_null_violation / check_violation
            Some("23502") | Some("23514") => {
                let mut errors = FieldErrors::new();
                let field = db_err
                    .constraint()
                    .map(constraint_to_field)
                    .unwrap_or_else(|| "payload".to_string());
                errors.insert(field, db_err.message().to_string());
                return CatalogError::Validation(errors);
            }
            _ => {}
        }
    }
    CatalogError::Storage(e.into())
}

/// Extracts a field name from a Postgres constraint name, e.g.
/// `products_sku_key` -> `sku`.
fn constraint_to_field(constraint: &str) -> String {
    let s = constraint.strip_prefix("products_").unwrap_or(constraint);
    let s = s
        .strip_suffix("_key")
        .or_else(|| s.strip_suffix("_idx"))
        .unwrap_or(s);
    s.to_string()
}

/// Maps a `products` row onto the domain type. JSONB columns decode through
/// serde; the category column was validated at insert time.
fn product_from_row(row: &PgRow) -> Result<Product, anyhow::Error> {
    let category_str: String = row.try_get("category")?;
    let category = Category::parse(&category_str)
        .ok_or_else(|| anyhow::anyhow!("unknown category in storage: {}", category_str))?;

    let images: Vec<String> = serde_json::from_value(row.try_get::<JsonValue, _>("images")?)?;
    let tags: Vec<String> = serde_json::from_value(row.try_get::<JsonValue, _>("tags")?)?;
    let dimensions = match row.try_get::<Option<JsonValue>, _>("dimensions")? {
        Some(v) => Some(serde_json::from_value(v)?),
        None => None,
    };
    let discount = match row.try_get::<Option<JsonValue>, _>("discount")? {
        Some(v) => Some(serde_json::from_value(v)?),
        None => None,
    };
    let reviews: Vec<Review> = serde_json::from_value(row.try_get::<JsonValue, _>("reviews")?)?;

    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price: row.try_get("price")?,
        category,
        stock: row.try_get("stock")?,
        featured: row.try_get("featured")?,
        thumbnail_image: row.try_get("thumbnail_image")?,
        images,
        tags,
        sku: row.try_get("sku")?,
        brand: row.try_get("brand")?,
        weight: row.try_get("weight")?,
        dimensions,
        discount,
        rating: Rating {
            average: row.try_get("rating_average")?,
            count: row.try_get("rating_count")?,
        },
        reviews,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_names_map_to_fields() {
        assert_eq!(constraint_to_field("products_sku_key"), "sku");
        assert_eq!(constraint_to_field("products_name_idx"), "name");
        assert_eq!(constraint_to_field("something_else"), "something_else");
    }
}
