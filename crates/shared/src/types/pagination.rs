//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Number of items per page.
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PageRequest {
    /// Creates a page request.
    #[must_use]
    pub const fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// Builds a request from optional query values, clamping to `1..=max_limit`.
    #[must_use]
    pub fn from_query(page: Option<u32>, limit: Option<u32>, default_limit: u32, max_limit: u32) -> Self {
        let max_limit = max_limit.max(1);
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(default_limit).clamp(1, max_limit),
        }
    }

    /// Calculates the offset for database queries.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// Returns the limit for database queries.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.limit)
    }
}

/// Response wrapper for paginated data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items in the current page.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub pagination: PageMeta,
}

/// Pagination metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub limit: u32,
    /// Total number of items across all pages.
    pub total: u64,
    /// Total number of pages.
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

impl PageMeta {
    /// Computes metadata for `total` items; zero items means zero pages.
    #[must_use]
    pub fn new(request: PageRequest, total: u64) -> Self {
        let limit = u64::from(request.limit.max(1));
        Self {
            page: request.page,
            limit: request.limit,
            total,
            total_pages: total.div_ceil(limit),
        }
    }
}

impl<T> PageResponse<T> {
    /// Creates a new paginated response.
    #[must_use]
    pub fn new(data: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            data,
            pagination: PageMeta::new(request, total),
        }
    }

    /// Converts the items while keeping the metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }

    /// Slices an already filtered, already sorted set into the requested page.
    #[must_use]
    pub fn from_full_set(items: Vec<T>, request: PageRequest) -> Self {
        let total = items.len() as u64;
        let skip = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let take = request.limit as usize;
        let data = items.into_iter().skip(skip).take(take).collect();
        Self::new(data, request, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 20, 0)]
    #[case(1, 20, 1)]
    #[case(20, 20, 1)]
    #[case(21, 20, 2)]
    #[case(100, 7, 15)]
    fn test_total_pages(#[case] total: u64, #[case] limit: u32, #[case] expected: u64) {
        let meta = PageMeta::new(PageRequest::new(1, limit), total);
        assert_eq!(meta.total_pages, expected);
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(1, 20).offset(), 0);
        assert_eq!(PageRequest::new(3, 20).offset(), 40);
        assert_eq!(PageRequest::new(0, 20).offset(), 0);
    }

    #[test]
    fn test_from_query_clamps() {
        let req = PageRequest::from_query(None, None, 20, 100);
        assert_eq!(req, PageRequest::new(1, 20));

        let req = PageRequest::from_query(Some(0), Some(1000), 20, 100);
        assert_eq!(req, PageRequest::new(1, 100));

        let req = PageRequest::from_query(Some(2), Some(0), 20, 100);
        assert_eq!(req, PageRequest::new(2, 1));
    }

    #[test]
    fn test_from_full_set() {
        let items: Vec<u32> = (1..=25).collect();
        let page = PageResponse::from_full_set(items.clone(), PageRequest::new(2, 10));
        assert_eq!(page.data, (11..=20).collect::<Vec<_>>());
        assert_eq!(page.pagination.total, 25);
        assert_eq!(page.pagination.total_pages, 3);

        let past_end = PageResponse::from_full_set(items, PageRequest::new(9, 10));
        assert!(past_end.data.is_empty());
        assert_eq!(past_end.pagination.total, 25);
    }

    #[test]
    fn test_envelope_shape() {
        let page = PageResponse::new(vec!["a"], PageRequest::new(1, 10), 1);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "data": ["a"],
                "pagination": { "page": 1, "limit": 10, "total": 1, "totalPages": 1 }
            })
        );
    }
}
