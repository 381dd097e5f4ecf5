use std::ops::Range;

use serde::Deserialize;

use super::deserializers::deserialize_lenient_page;

pub const QUESTIONS_PER_PAGE: i64 = 10;

/// 1-based page taken from the `page` query parameter.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    #[serde(default = "first_page", deserialize_with = "deserialize_lenient_page")]
    pub page: i64,
}

fn first_page() -> i64 {
    1
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: first_page() }
    }
}

impl Pagination {
    pub fn new(page: i64) -> Self {
        Self { page }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).max(0).saturating_mul(QUESTIONS_PER_PAGE)
    }

    /// Pages below 1 select nothing.
    pub fn limit(&self) -> i64 {
        if self.page < 1 {
            0
        } else {
            QUESTIONS_PER_PAGE
        }
    }

    /// Index window of this page inside a result set of `len` items, empty when out of range.
    pub fn range(&self, len: usize) -> Range<usize> {
        let start = usize::try_from(self.offset()).unwrap_or(usize::MAX).min(len);
        let end = start.saturating_add(self.limit() as usize).min(len);
        start..end
    }

    pub fn slice<T>(&self, mut items: Vec<T>) -> Vec<T> {
        let range = self.range(items.len());
        items.truncate(range.end);
        items.drain(..range.start);
        items
    }
}
