//! Page windows, pagination summaries and the page selector.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// How many page links are offered on each side of the current page.
pub const SELECTOR_SPAN: usize = 3;

/// The requested slice of a result set. `limit > 0`, `page >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: usize,
    pub page: usize,
}

impl PageWindow {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            page: 1,
        }
    }

    pub fn at(self, page: usize) -> Self {
        Self {
            page: page.max(1),
            ..self
        }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1) * self.limit
    }

    /// Index range of this window within `total` items, clamped to bounds.
    pub fn range(&self, total: usize) -> Range<usize> {
        let start = self.offset().min(total);
        let end = (self.offset() + self.limit).min(total);
        start..end
    }
}

/// `ceil(total / per_page)`; zero when `per_page` is zero.
pub fn total_pages(total: usize, per_page: usize) -> usize {
    if per_page == 0 {
        0
    } else {
        total.div_ceil(per_page)
    }
}

/// Pagination summary as sent by the backends (`prev`/`next` are ignored).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub total: usize,
    #[serde(default = "first_page")]
    pub page: usize,
    #[serde(default)]
    pub per_page: usize,
    #[serde(default)]
    pub total_page: usize,
}

fn first_page() -> usize {
    1
}

impl Pagination {
    /// Summary for a client-side paged collection of `total` items.
    pub fn derive(total: usize, window: PageWindow) -> Self {
        Self {
            total,
            page: window.page,
            per_page: window.limit,
            total_page: total_pages(total, window.limit),
        }
    }
}

/// Navigation links around the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelector {
    pub previous: Option<usize>,
    pub before: Vec<usize>,
    pub current: usize,
    pub after: Vec<usize>,
    pub next: Option<usize>,
}

impl PageSelector {
    /// `None` when there is nothing to page through.
    pub fn for_pagination(pagination: &Pagination) -> Option<Self> {
        if pagination.total_page == 0 {
            return None;
        }
        let current = pagination.page.max(1);
        let last = pagination.total_page;

        let before = (current.saturating_sub(SELECTOR_SPAN).max(1)..current).collect();
        let after = (current + 1..=(current + SELECTOR_SPAN).min(last)).collect();

        Some(Self {
            previous: (current > 1).then(|| current - 1),
            before,
            current,
            after,
            next: (current < last).then(|| current + 1),
        })
    }
}
