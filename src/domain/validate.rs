//! Product and review payload validation.
//!
//! Validation is an explicit function over the incoming JSON payload, decoupled
//! from the storage schema, so it can be unit-tested without a database. All
//! field problems are collected into a single map keyed by field name; the
//! caller never sees a partial acceptance.

use crate::domain::product::{Category, Dimensions, Discount, NewProduct, NewReview};
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Field name -> human-readable message, one entry per offending field.
pub type FieldErrors = BTreeMap<String, String>;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 1000;
pub const MAX_PRICE: f64 = 10_000.0;
pub const MAX_COMMENT_LEN: usize = 500;

/// Coerces a number or numeric-looking string to f64. NaN never passes.
fn coerce_f64(v: &JsonValue) -> Option<f64> {
    if let Some(n) = v.as_f64() {
        return (!n.is_nan()).then_some(n);
    }
    if let Some(s) = v.as_str() {
        if let Ok(n) = s.trim().parse::<f64>() {
            return (!n.is_nan()).then_some(n);
        }
    }
    None
}

/// Coerces a number or numeric-looking string to a whole i64.
fn coerce_i64(v: &JsonValue) -> Option<i64> {
    if let Some(n) = v.as_i64() {
        return Some(n);
    }
    if let Some(s) = v.as_str() {
        if let Ok(n) = s.trim().parse::<i64>() {
            return Some(n);
        }
    }
    None
}

fn nonempty_str(v: &JsonValue) -> Option<&str> {
    v.as_str().map(str::trim).filter(|s| !s.is_empty())
}

/// Loose URL shape check: an http(s) URL or a bare `host.tld/...` path.
/// Returned asset-host URLs are treated as opaque beyond this shape.
pub fn looks_like_url(s: &str) -> bool {
    if s.is_empty() || s.chars().any(char::is_whitespace) {
        return false;
    }
    let rest = s
        .strip_prefix("https://")
        .or_else(|| s.strip_prefix("http://"))
        .unwrap_or(s);
    let host = rest.split('/').next().unwrap_or("");
    host.contains('.')
        && !host.starts_with('.')
        && !host.ends_with('.')
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
}

/// Validates a product-create payload and returns the normalized record, or
/// the full set of field errors. Client-supplied `rating`/`reviews` values are
/// ignored entirely; the server initializes both.
pub fn validate_create_payload(payload: &JsonValue) -> Result<NewProduct, FieldErrors> {
    let mut errors = FieldErrors::new();
    let obj = match payload.as_object() {
        Some(o) => o,
        None => {
            errors.insert("payload".to_string(), "Payload must be a JSON object".to_string());
            return Err(errors);
        }
    };

    let name = match obj.get("name").and_then(nonempty_str) {
        Some(s) if s.chars().count() <= MAX_NAME_LEN => Some(s.to_string()),
        Some(_) => {
            errors.insert(
                "name".to_string(),
                format!("Product name cannot exceed {} characters", MAX_NAME_LEN),
            );
            None
        }
        None => {
            errors.insert("name".to_string(), "Product name is required".to_string());
            None
        }
    };

    let description = match obj.get("description").and_then(nonempty_str) {
        Some(s) if s.chars().count() <= MAX_DESCRIPTION_LEN => Some(s.to_string()),
        Some(_) => {
            errors.insert(
                "description".to_string(),
                format!("Description cannot exceed {} characters", MAX_DESCRIPTION_LEN),
            );
            None
        }
        None => {
            errors.insert("description".to_string(), "Description is required".to_string());
            None
        }
    };

    let price = match obj.get("price").and_then(coerce_f64) {
        Some(p) if (0.0..=MAX_PRICE).contains(&p) => Some(p),
        Some(_) => {
            errors.insert(
                "price".to_string(),
                format!("Price must be between 0 and {}", MAX_PRICE),
            );
            None
        }
        None => {
            errors.insert("price".to_string(), "Price must be a valid number".to_string());
            None
        }
    };

    let category = match obj.get("category").and_then(|v| v.as_str()) {
        Some(s) => match Category::parse(s) {
            Some(c) => Some(c),
            None => {
                errors.insert("category".to_string(), "Please select a valid category".to_string());
                None
            }
        },
        None => {
            errors.insert("category".to_string(), "Category is required".to_string());
            None
        }
    };

    let stock = match obj.get("stock").and_then(coerce_i64) {
        Some(n) if (0..=i32::MAX as i64).contains(&n) => Some(n as i32),
        Some(_) => {
            errors.insert("stock".to_string(), "Stock cannot be negative".to_string());
            None
        }
        None => {
            errors.insert("stock".to_string(), "Stock must be a valid number".to_string());
            None
        }
    };

    let thumbnail_image = match obj.get("thumbnailImage").and_then(nonempty_str) {
        Some(s) if looks_like_url(s) => Some(s.to_string()),
        Some(_) => {
            errors.insert(
                "thumbnailImage".to_string(),
                "Please enter a valid URL for thumbnail image".to_string(),
            );
            None
        }
        None => {
            errors.insert(
                "thumbnailImage".to_string(),
                "Thumbnail image is required".to_string(),
            );
            None
        }
    };

    let images = match obj.get("images").and_then(|v| v.as_array()) {
        Some(arr) if !arr.is_empty() => {
            let urls: Vec<String> = arr
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::trim)
                .filter(|s| looks_like_url(s))
                .map(str::to_string)
                .collect();
            if urls.len() == arr.len() {
                Some(urls)
            } else {
                errors.insert("images".to_string(), "Please enter a valid URL".to_string());
                None
            }
        }
        _ => {
            errors.insert(
                "images".to_string(),
                "At least one product image is required".to_string(),
            );
            None
        }
    };

    let featured = obj.get("featured").and_then(|v| v.as_bool()).unwrap_or(false);

    let tags: Vec<String> = obj
        .get("tags")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let sku = obj
        .get("sku")
        .and_then(nonempty_str)
        .unwrap_or("")
        .to_string();
    let brand = obj
        .get("brand")
        .and_then(nonempty_str)
        .unwrap_or("")
        .to_string();

    let weight = match obj.get("weight") {
        None | Some(JsonValue::Null) => None,
        Some(v) => match coerce_f64(v) {
            Some(w) if w >= 0.0 => Some(w),
            _ => {
                errors.insert(
                    "weight".to_string(),
                    "Weight must be a positive number".to_string(),
                );
                None
            }
        },
    };

    let dimensions = match obj.get("dimensions") {
        None | Some(JsonValue::Null) => None,
        Some(v) => match parse_dimensions(v) {
            Ok(d) => Some(d),
            Err(msg) => {
                errors.insert("dimensions".to_string(), msg);
                None
            }
        },
    };

    let discount = match obj.get("discount") {
        None | Some(JsonValue::Null) => None,
        Some(v) => match parse_discount(v) {
            Ok(d) => Some(d),
            Err(msg) => {
                errors.insert("discount".to_string(), msg);
                None
            }
        },
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    // All required fields validated above; unwraps cannot fire past this point.
    Ok(NewProduct {
        name: name.unwrap(),
        description: description.unwrap(),
        price: price.unwrap(),
        category: category.unwrap(),
        stock: stock.unwrap(),
        featured,
        thumbnail_image: thumbnail_image.unwrap(),
        images: images.unwrap(),
        tags,
        sku,
        brand,
        weight,
        dimensions,
        discount,
    })
}

fn parse_dimensions(v: &JsonValue) -> Result<Dimensions, String> {
    let obj = v
        .as_object()
        .ok_or_else(|| "Dimensions must be an object".to_string())?;
    let mut out = [0.0f64; 3];
    for (i, field) in ["length", "width", "height"].iter().enumerate() {
        match obj.get(*field).and_then(coerce_f64) {
            Some(n) if n >= 0.0 => out[i] = n,
            _ => return Err(format!("{} must be a positive number", capitalize(field))),
        }
    }
    Ok(Dimensions { length: out[0], width: out[1], height: out[2] })
}

fn parse_discount(v: &JsonValue) -> Result<Discount, String> {
    let obj = v
        .as_object()
        .ok_or_else(|| "Discount must be an object".to_string())?;
    let percentage = match obj.get("percentage").and_then(coerce_f64) {
        Some(p) if (1.0..=90.0).contains(&p) => p,
        _ => return Err("Discount must be between 1% and 90%".to_string()),
    };
    let valid_until = obj
        .get("validUntil")
        .and_then(|v| v.as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| "Discount expiry must be an RFC3339 timestamp".to_string())?;
    Ok(Discount { percentage, valid_until })
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Validates a review payload for the add-review path.
pub fn validate_review_payload(payload: &JsonValue) -> Result<NewReview, FieldErrors> {
    let mut errors = FieldErrors::new();
    let obj = match payload.as_object() {
        Some(o) => o,
        None => {
            errors.insert("payload".to_string(), "Payload must be a JSON object".to_string());
            return Err(errors);
        }
    };

    let name = match obj.get("name").and_then(nonempty_str) {
        Some(s) => Some(s.to_string()),
        None => {
            errors.insert("name".to_string(), "Reviewer name is required".to_string());
            None
        }
    };

    let rating = match obj.get("rating").and_then(coerce_i64) {
        Some(r) if (1..=5).contains(&r) => Some(r as i32),
        Some(_) => {
            errors.insert("rating".to_string(), "Rating must be between 1 and 5".to_string());
            None
        }
        None => {
            errors.insert("rating".to_string(), "Rating is required".to_string());
            None
        }
    };

    let comment = match obj.get("comment").and_then(nonempty_str) {
        Some(s) if s.chars().count() <= MAX_COMMENT_LEN => Some(s.to_string()),
        Some(_) => {
            errors.insert(
                "comment".to_string(),
                format!("Review comment cannot exceed {} characters", MAX_COMMENT_LEN),
            );
            None
        }
        None => {
            errors.insert("comment".to_string(), "Review comment is required".to_string());
            None
        }
    };

    let verified = obj.get("verified").and_then(|v| v.as_bool()).unwrap_or(false);

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NewReview {
        name: name.unwrap(),
        rating: rating.unwrap(),
        comment: comment.unwrap(),
        verified,
    })
}
