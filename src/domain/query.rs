//! Listing query construction.
//!
//! Translates raw listing parameters into a filter + ordering specification.
//! Defaults are explicit configuration handed in by the caller, never literals
//! buried in handler code.

/// Sentinel category meaning "no category restriction".
pub const CATEGORY_ALL: &str = "all";

/// Default listing configuration, sourced from `infra::config`.
#[derive(Debug, Clone, Copy)]
pub struct ListingDefaults {
    pub page: u32,
    pub limit: u32,
    /// Hard cap applied to client-supplied limits.
    pub max_limit: u32,
}

impl Default for ListingDefaults {
    fn default() -> Self {
        ListingDefaults { page: 1, limit: 6, max_limit: 100 }
    }
}

/// Raw listing parameters as received from the client.
#[derive(Debug, Clone, Default)]
pub struct ListingParams {
    pub search: String,
    pub category: String,
    pub sort: String,
}

/// Restriction applied to the catalog before windowing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Filter {
    /// Case-insensitive pattern matched against name OR description OR tags.
    pub search: Option<String>,
    /// Exact category match; None when the sentinel "all" was given.
    pub category: Option<String>,
}

/// Ordering specification. Each variant maps to a fixed SQL ORDER BY clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    PriceAsc,
    PriceDesc,
    NewestFirst,
    RatingDesc,
    /// Default: featured first, then newest as the tie-break.
    FeaturedFirst,
}

impl SortOrder {
    /// Maps a sort key to its ordering. Unrecognized keys fall back to the
    /// default ordering rather than erroring.
    pub fn from_key(key: &str) -> SortOrder {
        match key {
            "price-low" => SortOrder::PriceAsc,
            "price-high" => SortOrder::PriceDesc,
            "newest" => SortOrder::NewestFirst,
            "rating" => SortOrder::RatingDesc,
            _ => SortOrder::FeaturedFirst,
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            SortOrder::PriceAsc => "price ASC",
            SortOrder::PriceDesc => "price DESC",
            SortOrder::NewestFirst => "created_at DESC",
            SortOrder::RatingDesc => "rating_average DESC",
            SortOrder::FeaturedFirst => "featured DESC, created_at DESC",
        }
    }
}

/// A fully constructed listing query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    pub filter: Filter,
    pub order: SortOrder,
}

impl ListingQuery {
    pub fn build(params: &ListingParams) -> ListingQuery {
        let search = {
            let term = params.search.trim();
            (!term.is_empty()).then(|| term.to_string())
        };
        let category = {
            let c = params.category.trim();
            (!c.is_empty() && c != CATEGORY_ALL).then(|| c.to_string())
        };
        ListingQuery {
            filter: Filter { search, category },
            order: SortOrder::from_key(params.sort.trim()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_and_category_all() {
        let q = ListingQuery::build(&ListingParams {
            search: "phone".to_string(),
            category: "all".to_string(),
            sort: String::new(),
        });
        assert_eq!(q.filter.search.as_deref(), Some("phone"));
        assert_eq!(q.filter.category, None);
        assert_eq!(q.order, SortOrder::FeaturedFirst);
    }

    #[test]
    fn specific_category_restricts() {
        let q = ListingQuery::build(&ListingParams {
            search: String::new(),
            category: "electronics".to_string(),
            sort: "price-low".to_string(),
        });
        assert_eq!(q.filter.search, None);
        assert_eq!(q.filter.category.as_deref(), Some("electronics"));
        assert_eq!(q.order, SortOrder::PriceAsc);
    }

    #[test]
    fn sort_key_table() {
        assert_eq!(SortOrder::from_key("price-low"), SortOrder::PriceAsc);
        assert_eq!(SortOrder::from_key("price-high"), SortOrder::PriceDesc);
        assert_eq!(SortOrder::from_key("newest"), SortOrder::NewestFirst);
        assert_eq!(SortOrder::from_key("rating"), SortOrder::RatingDesc);
        assert_eq!(SortOrder::from_key("featured"), SortOrder::FeaturedFirst);
    }

    #[test]
    fn unrecognized_sort_key_falls_back_to_default() {
        assert_eq!(SortOrder::from_key("alphabetical"), SortOrder::FeaturedFirst);
        assert_eq!(SortOrder::from_key(""), SortOrder::FeaturedFirst);
        assert_eq!(SortOrder::FeaturedFirst.sql(), "featured DESC, created_at DESC");
    }
}
