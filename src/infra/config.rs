//! Centralized configuration (environment variables + defaults).

use crate::domain::query::ListingDefaults;

/// Database URL must be provided (no default) for safety.
pub fn database_url() -> String {
    std::env::var("DATABASE_URL").expect("DATABASE_URL must be set")
}

/// Address the API server binds to.
pub fn bind_addr() -> String {
    std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string())
}

/// Listing defaults handed to the query builder and pagination engine.
/// These are explicit configuration, not literals buried in handlers.
pub fn listing_defaults() -> ListingDefaults {
    let base = ListingDefaults::default();
    let limit = std::env::var("DEFAULT_PAGE_SIZE")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|l| *l >= 1)
        .unwrap_or(base.limit);
    let max_limit = std::env::var("MAX_PAGE_SIZE")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|l| *l >= 1)
        .unwrap_or(base.max_limit);
    ListingDefaults { page: base.page, limit, max_limit }
}
