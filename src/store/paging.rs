//! Page-number pagination

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

fn default_page() -> i64 {
    1
}

fn default_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// Query parameters for paged listings (`?page=&size=`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_size")]
    pub size: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            size: default_size(),
        }
    }
}

impl PageRequest {
    pub fn new(page: i64, size: i64) -> Self {
        Self { page, size }
    }

    /// Page below 1 becomes 1; size outside 1..=100 falls back to the default.
    pub fn normalized(self) -> Self {
        let page = self.page.max(1);
        let size = if (1..=MAX_PAGE_SIZE).contains(&self.size) {
            self.size
        } else {
            DEFAULT_PAGE_SIZE
        };
        Self { page, size }
    }

    fn offset(&self) -> usize {
        ((self.page - 1) as usize).saturating_mul(self.size as usize)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Slice an already-ordered sequence into the requested page.
    pub fn from_ordered<I>(items: I, request: PageRequest) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let request = request.normalized();
        let all: Vec<T> = items.into_iter().collect();
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(request.offset())
            .take(request.size as usize)
            .collect();

        Self {
            items,
            page: request.page,
            size: request.size,
            total,
            total_pages: total.div_ceil(request.size as u64),
        }
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}
