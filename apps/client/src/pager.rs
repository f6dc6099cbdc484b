//! The one paginated-list contract every list view drives.
//!
//! A `Pager` owns exactly one data source: an unpaginated capped list, a
//! client-side slice of an already-fetched Vec, or a server-side fetch per
//! page change. The source is an enum, so a view cannot accidentally combine
//! strategies. `total` always counts the full candidate set, which keeps
//! `page_count` stable while pages load.

use async_trait::async_trait;
use pagination::{Page, PageParams};
use std::future::Future;
use thiserror::Error;

use crate::error::ClientError;

#[derive(Debug, Error)]
pub enum PagerError {
    /// The page fetch failed; the previously displayed items are retained,
    /// so a failed load is never mistaken for an empty result.
    #[error("page fetch failed: {0}")]
    Fetch(#[from] ClientError),
}

/// Server-side page source: called on every page or page-size change.
#[async_trait]
pub trait PageFetcher<T>: Send + Sync {
    async fn fetch(&self, page: u32, per_page: u32) -> Result<Page<T>, ClientError>;
}

#[async_trait]
impl<T, F, Fut> PageFetcher<T> for F
where
    T: Send + 'static,
    F: Fn(u32, u32) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Page<T>, ClientError>> + Send,
{
    async fn fetch(&self, page: u32, per_page: u32) -> Result<Page<T>, ClientError> {
        (self)(page, per_page).await
    }
}

enum Source<T> {
    /// No pagination: show the first `capacity` items, or all of them.
    Unpaginated {
        items: Vec<T>,
        capacity: Option<usize>,
    },
    /// Client-side: the full candidate set is already in memory.
    Sliced { items: Vec<T> },
    /// Server-side: ask the API for each window.
    Remote { fetcher: Box<dyn PageFetcher<T>> },
}

pub struct Pager<T> {
    source: Source<T>,
    params: PageParams,
    total: u64,
    current: Vec<T>,
}

impl<T: Clone + Send> Pager<T> {
    /// A list without page controls. `capacity` caps the display (a grid's
    /// `rows * cols`); `None` shows everything.
    pub fn unpaginated(items: Vec<T>, capacity: Option<usize>) -> Self {
        let mut pager = Self {
            source: Source::Unpaginated {
                items,
                capacity,
            },
            params: PageParams::new(0, pagination::DEFAULT_PER_PAGE),
            total: 0,
            current: Vec::new(),
        };
        pager.refresh_local();
        pager
    }

    /// Client-side pagination over an owned, already-complete Vec.
    pub fn sliced(items: Vec<T>, per_page: u32) -> Self {
        let mut pager = Self {
            source: Source::Sliced { items },
            params: PageParams::new(0, per_page),
            total: 0,
            current: Vec::new(),
        };
        pager.refresh_local();
        pager
    }

    /// Server-side pagination. Nothing is fetched until the first `load`.
    pub fn remote(fetcher: impl PageFetcher<T> + 'static, per_page: u32) -> Self {
        Self {
            source: Source::Remote {
                fetcher: Box::new(fetcher),
            },
            params: PageParams::new(0, per_page),
            total: 0,
            current: Vec::new(),
        }
    }

    /// Moves to `page` and refreshes the displayed slice.
    pub async fn load(&mut self, page: u32) -> Result<(), PagerError> {
        self.params = PageParams::new(page, self.params.per_page);
        self.refresh().await
    }

    /// Changes the page size and starts over from page zero.
    pub async fn set_per_page(&mut self, per_page: u32) -> Result<(), PagerError> {
        self.params = PageParams::new(0, per_page);
        self.refresh().await
    }

    pub fn items(&self) -> &[T] {
        &self.current
    }

    /// Size of the full candidate set, not of the displayed slice.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn page(&self) -> u32 {
        self.params.page
    }

    pub fn per_page(&self) -> u32 {
        self.params.per_page
    }

    pub fn page_count(&self) -> u32 {
        pagination::page_count(self.total, self.params.per_page)
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    async fn refresh(&mut self) -> Result<(), PagerError> {
        if let Source::Remote { fetcher } = &self.source {
            let fetched = fetcher.fetch(self.params.page, self.params.per_page).await?;
            self.total = fetched.total;
            self.current = fetched.data;
        } else {
            self.refresh_local();
        }
        Ok(())
    }

    fn refresh_local(&mut self) {
        match &self.source {
            Source::Unpaginated { items, capacity } => {
                // Page controls are meaningless here; pin the page to zero.
                self.params = PageParams::new(0, self.params.per_page);
                self.total = items.len() as u64;
                self.current = match capacity {
                    Some(cap) => items.iter().take(*cap).cloned().collect(),
                    None => items.clone(),
                };
            }
            Source::Sliced { items } => {
                let page = pagination::slice_page(items, self.params);
                self.total = page.total;
                self.current = page.data;
            }
            Source::Remote { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn numbers(n: u32) -> Vec<u32> {
        (0..n).collect()
    }

    #[test]
    fn test_unpaginated_caps_display_but_counts_everything() {
        let pager = Pager::unpaginated(numbers(10), Some(6));
        assert_eq!(pager.items(), &[0, 1, 2, 3, 4, 5]);
        assert_eq!(pager.total(), 10);
    }

    #[test]
    fn test_unpaginated_without_capacity_shows_all() {
        let pager = Pager::unpaginated(numbers(4), None);
        assert_eq!(pager.items().len(), 4);
    }

    #[tokio::test]
    async fn test_unpaginated_ignores_page_changes() {
        let mut pager = Pager::unpaginated(numbers(10), Some(3));
        pager.load(2).await.unwrap();
        assert_eq!(pager.page(), 0);
        assert_eq!(pager.items(), &[0, 1, 2]);
    }

    #[tokio::test]
    async fn test_sliced_windows_with_stable_total() {
        let mut pager = Pager::sliced(numbers(7), 3);
        assert_eq!(pager.items(), &[0, 1, 2]);
        assert_eq!(pager.total(), 7);
        assert_eq!(pager.page_count(), 3);

        pager.load(2).await.unwrap();
        assert_eq!(pager.items(), &[6]);
        assert_eq!(pager.total(), 7);

        pager.load(5).await.unwrap();
        assert!(pager.is_empty());
        assert_eq!(pager.total(), 7);
    }

    #[tokio::test]
    async fn test_set_per_page_restarts_from_page_zero() {
        let mut pager = Pager::sliced(numbers(10), 3);
        pager.load(2).await.unwrap();
        pager.set_per_page(5).await.unwrap();
        assert_eq!(pager.page(), 0);
        assert_eq!(pager.items(), &[0, 1, 2, 3, 4]);
        assert_eq!(pager.page_count(), 2);
    }

    #[tokio::test]
    async fn test_remote_fetches_on_each_load() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let fetcher = move |page: u32, per_page: u32| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                let items = numbers(5);
                Ok::<_, ClientError>(pagination::slice_page(
                    &items,
                    PageParams::new(page, per_page),
                ))
            }
        };

        let mut pager = Pager::remote(fetcher, 2);
        assert!(pager.is_empty());

        pager.load(0).await.unwrap();
        assert_eq!(pager.items(), &[0, 1]);
        assert_eq!(pager.total(), 5);
        assert_eq!(pager.page_count(), 3);

        pager.load(2).await.unwrap();
        assert_eq!(pager.items(), &[4]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_remote_failure_is_an_error_not_an_empty_page() {
        let fetcher = |_page: u32, _per_page: u32| async {
            Err::<Page<u32>, _>(ClientError::from_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "",
            ))
        };

        let mut pager = Pager::remote(fetcher, 2);
        let first = pager.load(0).await;
        assert!(matches!(first, Err(PagerError::Fetch(_))));
        assert!(pager.is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure_keeps_previous_items() {
        let healthy = Arc::new(AtomicU32::new(1));
        let flag = healthy.clone();
        let fetcher = move |page: u32, per_page: u32| {
            let flag = flag.clone();
            async move {
                if flag.load(Ordering::SeqCst) == 1 {
                    let items = numbers(6);
                    Ok(pagination::slice_page(&items, PageParams::new(page, per_page)))
                } else {
                    Err(ClientError::from_response(StatusCode::BAD_GATEWAY, ""))
                }
            }
        };

        let mut pager = Pager::remote(fetcher, 3);
        pager.load(0).await.unwrap();
        assert_eq!(pager.items(), &[0, 1, 2]);

        healthy.store(0, Ordering::SeqCst);
        assert!(pager.load(1).await.is_err());
        assert_eq!(pager.items(), &[0, 1, 2]);
        assert_eq!(pager.total(), 6);
    }
}
