//! Page windowing over a counted result set.

use crate::domain::query::ListingDefaults;

/// A skip/limit window derived from client paging parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub limit: u32,
}

impl PageWindow {
    /// Builds a window from raw query-string values. Absent or non-numeric
    /// values fall back to the configured defaults; page is clamped to >= 1
    /// and limit to 1..=max_limit.
    pub fn from_params(
        page: Option<&str>,
        limit: Option<&str>,
        defaults: ListingDefaults,
    ) -> PageWindow {
        let page = page
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(defaults.page);
        let limit = limit
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|l| *l >= 1)
            .unwrap_or(defaults.limit)
            .min(defaults.max_limit);
        PageWindow { page, limit }
    }

    /// Rows to skip before this window: (page - 1) * limit.
    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1) as u64 * self.limit as u64
    }
}

/// Derived paging facts for a window over `total_count` matching rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub has_more: bool,
    pub total_pages: u64,
}

impl PageInfo {
    pub fn compute(window: PageWindow, total_count: u64) -> PageInfo {
        let skip = window.skip();
        PageInfo {
            has_more: skip + (window.limit as u64) < total_count,
            total_pages: total_count.div_ceil(window.limit as u64),
        }
    }
}
