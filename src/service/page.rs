use imgshelf_schema::ImageRecord;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 8;

/// Normalized offset pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Missing or non-positive values fall back to page 1, 8 per page.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE),
            limit: limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// `ceil(total / limit)`.
    pub fn total_pages(&self, total: i64) -> i64 {
        total / self.limit + i64::from(total % self.limit != 0)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of the gallery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePage {
    pub items: Vec<ImageRecord>,
    pub current_page: i64,
    pub total_pages: i64,
}
