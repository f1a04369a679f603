//! API Response types
//!
//! Standardized response envelopes for every service in the platform.

use serde::{Deserialize, Serialize};

/// Status value for successful responses
pub const STATUS_SUCCESS: &str = "success";

/// Unified API response structure
///
/// All API responses follow this format:
/// ```json
/// {
///     "status": "success",
///     "message": "Success",
///     "data": { ... }
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Response status ("success" or an error code string)
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Response data (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn ok(data: T) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            message: "Success".to_string(),
            data: Some(data),
        }
    }

    /// Create a successful response with custom message
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            message: message.into(),
            data: Some(data),
        }
    }

    /// Create an error response
    pub fn error(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            message: message.into(),
            data: None,
        }
    }
}

/// Paginated list payload
///
/// Every list endpoint returns its rows wrapped in this structure:
/// ```json
/// {
///     "total_items": 42,
///     "total_pages": 5,
///     "data": [ ... ]
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub total_items: i64,
    pub total_pages: i64,
    pub data: Vec<T>,
}

impl<T> PageResponse<T> {
    /// Build a page from a total row count and the fetched slice.
    ///
    /// `page_size` of zero is treated as one to keep the page count sane.
    pub fn new(total_items: i64, page_size: i64, data: Vec<T>) -> Self {
        let size = page_size.max(1);
        Self {
            total_items,
            total_pages: (total_items + size - 1) / size,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        let page = PageResponse::new(41, 10, vec![1, 2, 3]);
        assert_eq!(page.total_pages, 5);
        assert_eq!(page.total_items, 41);
    }

    #[test]
    fn page_count_exact_fit() {
        let page: PageResponse<i32> = PageResponse::new(40, 10, vec![]);
        assert_eq!(page.total_pages, 4);
    }

    #[test]
    fn zero_page_size_does_not_divide_by_zero() {
        let page: PageResponse<i32> = PageResponse::new(3, 0, vec![]);
        assert_eq!(page.total_pages, 3);
    }
}
