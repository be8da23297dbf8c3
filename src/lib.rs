//! ETL Monitoring Dashboard client
//!
//! Typed access to the ETL backend, a keyed query cache with polling and
//! request de-duplication, and the mutations that keep that cache fresh.

pub mod actions;
pub mod api;
pub mod query;
pub mod settings;
pub mod summary;

#[cfg(test)]
pub(crate) mod test_support;

pub use actions::{ActionError, Actions, Notice};
pub use api::{ApiClient, ApiResponse, Endpoint, Paginated, Resource};
pub use query::{Queries, QueryCache, QueryState, QueryStatus, RefreshTable};
pub use settings::Settings;
