//! Pagination primitives shared by the alumnet API and client.
//!
//! Every list endpoint speaks the same envelope: `{page, perPage, total,
//! data}`, with `page` zero-based and `total` counting the full filtered set,
//! never the current slice. Keeping the envelope and the page math in one
//! crate is what lets the server, the client wrappers, and the pager all
//! agree on `page_count = ceil(total / perPage)`.

use serde::{Deserialize, Serialize};

/// Page size applied when the caller does not supply `perPage`.
pub const DEFAULT_PER_PAGE: u32 = 20;
/// Upper bound on `perPage`; larger requests are clamped, not rejected.
pub const MAX_PER_PAGE: u32 = 100;

/// A page window: zero-based page index plus page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page: u32,
    pub per_page: u32,
}

impl PageParams {
    /// Builds a window, clamping `per_page` into `1..=MAX_PER_PAGE`.
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page,
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// Index of the first item in this window.
    pub fn offset(&self) -> usize {
        self.page as usize * self.per_page as usize
    }

    /// Half-open `[start, end)` item range covered by this window.
    pub fn window(&self) -> (usize, usize) {
        let start = self.offset();
        (start, start + self.per_page as usize)
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self::new(0, DEFAULT_PER_PAGE)
    }
}

/// Transport envelope for one page of a list response.
///
/// Invariants: `data.len() <= per_page`, and whenever `data` is non-empty,
/// `page * per_page < total`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub data: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(params: PageParams, total: u64, data: Vec<T>) -> Self {
        Self {
            page: params.page,
            per_page: params.per_page,
            total,
            data,
        }
    }

    /// An empty page carrying the requested window and a zero total.
    pub fn empty(params: PageParams) -> Self {
        Self::new(params, 0, Vec::new())
    }

    pub fn params(&self) -> PageParams {
        PageParams::new(self.page, self.per_page)
    }

    /// Number of pages needed to show `total` items at this page size.
    pub fn page_count(&self) -> u32 {
        page_count(self.total, self.per_page)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Maps the items while keeping the window and total intact.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            data: self.data.into_iter().map(f).collect(),
        }
    }
}

/// `ceil(total / per_page)`; zero items means zero pages.
pub fn page_count(total: u64, per_page: u32) -> u32 {
    let per_page = per_page.max(1) as u64;
    total.div_ceil(per_page) as u32
}

/// Slices an in-memory collection into the requested window.
///
/// A window past the end yields an empty `data` with `total` still covering
/// the whole collection, matching what a server-side page query returns.
pub fn slice_page<T: Clone>(items: &[T], params: PageParams) -> Page<T> {
    let total = items.len() as u64;
    let (start, end) = params.window();
    let data = if start >= items.len() {
        Vec::new()
    } else {
        items[start..end.min(items.len())].to_vec()
    };
    Page::new(params, total, data)
}
