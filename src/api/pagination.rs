use serde::{Deserialize, Serialize};

pub const MAX_PAGE_SIZE: i64 = 100;

/// A resolved page window. Always `page >= 1` and `1 <= page_size <= 100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub page_size: i64,
}

impl Page {
    /// Clamp raw values: `page < 1` becomes 1, `page_size < 1` becomes `default_size`,
    /// and anything above the maximum is capped.
    pub fn new(page: i64, page_size: i64, default_size: i64) -> Self {
        let page = page.max(1);
        let page_size = if page_size < 1 {
            default_size
        } else {
            page_size.min(MAX_PAGE_SIZE)
        };
        Self { page, page_size }
    }

    /// Like [`Page::new`], but an out-of-range size falls back to the default instead of the cap.
    pub fn with_reset(page: i64, page_size: i64, default_size: i64) -> Self {
        let page = page.max(1);
        let page_size = if (1..=MAX_PAGE_SIZE).contains(&page_size) {
            page_size
        } else {
            default_size
        };
        Self { page, page_size }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    /// Saturates for absurd page numbers, which then simply read past the end.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Slice an in-memory collection the same way `LIMIT/OFFSET` would.
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        items
            .iter()
            .skip(self.offset() as usize)
            .take(self.limit() as usize)
            .cloned()
            .collect()
    }
}

/// Raw `?page=&page_size=` query parameters.
///
/// Values are kept as strings so that garbage like `?page=abc` falls back to defaults
/// instead of rejecting the whole request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl PageParams {
    pub fn resolve(&self, default_size: i64) -> Page {
        Page::new(
            parse_or(self.page.as_deref(), 1),
            parse_or(self.page_size.as_deref(), default_size),
            default_size,
        )
    }

    pub fn resolve_with_reset(&self, default_size: i64) -> Page {
        Page::with_reset(
            parse_or(self.page.as_deref(), 1),
            parse_or(self.page_size.as_deref(), default_size),
            default_size,
        )
    }
}

/// Lenient numeric query parsing: absent or unparsable values use `default`.
pub fn parse_or<T: std::str::FromStr>(raw: Option<&str>, default: T) -> T {
    raw.and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

/// `meta` block of list responses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListMeta {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl ListMeta {
    pub fn new(page: Page, total: i64) -> Self {
        Self {
            page: page.page,
            page_size: page.page_size,
            total,
            query: None,
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }
}
