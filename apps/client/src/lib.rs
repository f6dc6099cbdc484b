//! Typed client for the Alumnet API: one thin wrapper per endpoint plus the
//! shared paginated-list contract (`Pager`) that every list view drives.

pub mod api;
pub mod error;
pub mod pager;
pub mod types;

pub use api::{ApiClient, ListQuery};
pub use error::ClientError;
pub use pager::{PageFetcher, Pager, PagerError};
