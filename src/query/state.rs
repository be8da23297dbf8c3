//! What a consumer sees for one cache key.

use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Lifecycle of a cache key: `Idle → Loading → Success | Error`, and back to
/// `Loading` on every revalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

impl QueryStatus {
    pub fn is_settled(&self) -> bool {
        matches!(self, QueryStatus::Success | QueryStatus::Error)
    }
}

/// Snapshot of a cache entry.
///
/// `data` keeps the last successful result through later loads and errors,
/// so a failed refresh does not blank out what is already shown.
#[derive(Debug)]
pub struct QueryState<T> {
    pub status: QueryStatus,
    pub data: Option<Arc<T>>,
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
            updated_at: self.updated_at,
        }
    }
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            updated_at: None,
        }
    }
}

impl<T> QueryState<T> {
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    /// Live data when there is any, otherwise `placeholder`, tagged so the
    /// two can never be confused.
    pub fn or_placeholder(&self, placeholder: T) -> Displayed<T> {
        match &self.data {
            Some(data) => Displayed::Live(Arc::clone(data)),
            None => Displayed::Placeholder(placeholder),
        }
    }
}

/// A value to render: live backend data or a stand-in placeholder.
#[derive(Debug, Clone)]
pub enum Displayed<T> {
    Live(Arc<T>),
    Placeholder(T),
}

impl<T> Displayed<T> {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Displayed::Placeholder(_))
    }

    pub fn value(&self) -> &T {
        match self {
            Displayed::Live(data) => data,
            Displayed::Placeholder(data) => data,
        }
    }
}
