//! Cached, de-duplicated access to backend reads.

mod cache;
mod queries;
mod refresh;
mod state;

pub use cache::{Query, QueryCache, QueryKey, Subscription, DEDUP_WINDOW};
pub use queries::Queries;
pub use refresh::RefreshTable;
pub use state::{Displayed, QueryState, QueryStatus};
