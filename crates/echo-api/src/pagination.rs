use serde::Deserialize;

use echo_types::api::Paginated;

/// Page-size limits, injected from server configuration. No ambient
/// settings object: whoever needs the limits is handed them.
#[derive(Debug, Clone, Copy)]
pub struct PageLimits {
    pub default_size: u32,
    pub max_size: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_size: 20,
            max_size: 100,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    pub page_size: Option<u32>,
}

fn default_page() -> u32 {
    1
}

/// A validated, clamped page request.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Page {
    pub fn offset(&self) -> u32 {
        (self.number - 1) * self.size
    }
}

impl PageQuery {
    /// `page` is 1-based and clamped up to 1; `page_size` is clamped into
    /// `[1, max_size]` rather than rejected.
    pub fn clamp(&self, limits: &PageLimits) -> Page {
        Page {
            number: self.page.max(1),
            size: self
                .page_size
                .unwrap_or(limits.default_size)
                .clamp(1, limits.max_size),
        }
    }
}

pub fn paginate<T>(items: Vec<T>, total: i64, page: Page) -> Paginated<T> {
    let size = i64::from(page.size);
    Paginated {
        items,
        total,
        page: page.number,
        page_size: page.size,
        total_pages: (total + size - 1) / size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_clamps_to_the_configured_maximum() {
        let limits = PageLimits::default();
        let query = PageQuery {
            page: 0,
            page_size: Some(10_000),
        };
        let page = query.clamp(&limits);
        assert_eq!(page.number, 1);
        assert_eq!(page.size, 100);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn missing_page_size_uses_the_default() {
        let limits = PageLimits::default();
        let query = PageQuery {
            page: 3,
            page_size: None,
        };
        let page = query.clamp(&limits);
        assert_eq!(page.size, 20);
        assert_eq!(page.offset(), 40);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = Page {
            number: 2,
            size: 10,
        };
        let envelope = paginate(vec![0u8; 10], 25, page);
        assert_eq!(envelope.total, 25);
        assert_eq!(envelope.total_pages, 3);
        assert_eq!(envelope.page, 2);
        assert_eq!(envelope.page_size, 10);
    }

    #[test]
    fn empty_result_has_zero_pages() {
        let page = Page { number: 1, size: 10 };
        let envelope = paginate(Vec::<u8>::new(), 0, page);
        assert_eq!(envelope.total_pages, 0);
    }
}
