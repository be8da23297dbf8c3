//! API client module for communicating with the ETL backend.

mod client;
mod endpoint;
mod envelope;
mod error;
mod resources;
pub mod types;

pub use client::{ApiClient, RequestBody, RequestOptions, DEFAULT_API_URL};
pub use endpoint::{
    Endpoint, Resource, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, DEFAULT_RECENT_JOBS_LIMIT,
    DEFAULT_TIME_RANGE,
};
pub use envelope::{ApiResponse, Paginated};
pub use error::ApiError;
