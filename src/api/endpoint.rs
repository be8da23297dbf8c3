//! Backend resources and the endpoint paths that read them.
//!
//! An [`Endpoint`] doubles as the cache key for its result: its string form
//! is the request path including every query parameter that affects the
//! response, e.g. `/api/errors?page=2&limit=10`.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_RECENT_JOBS_LIMIT: u32 = 10;
pub const DEFAULT_TIME_RANGE: &str = "24h";

/// A cacheable backend collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    DashboardStats,
    RecentJobs,
    ScheduledPipelines,
    SystemHealth,
    DataSources,
    ProcessingJobs,
    DataErrors,
    CorrectionRules,
    Anomalies,
    AnomalyRules,
    PerformanceMetrics,
    JobPerformance,
    ScheduledJobsPerformance,
    ResourceUsage,
}

impl Resource {
    /// Base path of the read endpoint, without query parameters.
    pub fn path(&self) -> &'static str {
        match self {
            Resource::DashboardStats => "/api/dashboard/stats",
            Resource::RecentJobs => "/api/jobs/recent",
            Resource::ScheduledPipelines => "/api/pipelines/scheduled",
            Resource::SystemHealth => "/api/system/health",
            Resource::DataSources => "/api/data-sources",
            Resource::ProcessingJobs => "/api/processing/jobs",
            Resource::DataErrors => "/api/errors",
            Resource::CorrectionRules => "/api/errors/rules",
            Resource::Anomalies => "/api/anomalies",
            Resource::AnomalyRules => "/api/anomalies/rules",
            Resource::PerformanceMetrics => "/api/performance/metrics",
            Resource::JobPerformance => "/api/performance/jobs",
            Resource::ScheduledJobsPerformance => "/api/performance/scheduled-jobs",
            Resource::ResourceUsage => "/api/performance/resources",
        }
    }

    pub fn all() -> &'static [Resource] {
        &[
            Resource::DashboardStats,
            Resource::RecentJobs,
            Resource::ScheduledPipelines,
            Resource::SystemHealth,
            Resource::DataSources,
            Resource::ProcessingJobs,
            Resource::DataErrors,
            Resource::CorrectionRules,
            Resource::Anomalies,
            Resource::AnomalyRules,
            Resource::PerformanceMetrics,
            Resource::JobPerformance,
            Resource::ScheduledJobsPerformance,
            Resource::ResourceUsage,
        ]
    }
}

/// A read endpoint: a resource plus the ordered query parameters applied to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    resource: Resource,
    params: Vec<(&'static str, String)>,
}

impl Endpoint {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn param(mut self, name: &'static str, value: impl ToString) -> Self {
        self.params.push((name, value.to_string()));
        self
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn recent_jobs(limit: u32) -> Self {
        Self::new(Resource::RecentJobs).param("limit", limit)
    }

    pub fn data_errors(page: u32, limit: u32) -> Self {
        Self::new(Resource::DataErrors)
            .param("page", page)
            .param("limit", limit)
    }

    pub fn performance_metrics(range: &str) -> Self {
        Self::new(Resource::PerformanceMetrics).param("range", range)
    }
}

impl From<Resource> for Endpoint {
    fn from(resource: Resource) -> Self {
        Endpoint::new(resource)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource.path())?;
        for (i, (name, value)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{name}={}", urlencoding::encode(value))?;
        }
        Ok(())
    }
}

/// Path of a single item below a resource, e.g. `/api/data-sources/ds-1/test`.
pub(crate) fn item_path(resource: Resource, id: &str, action: Option<&str>) -> String {
    let mut path = format!("{}/{}", resource.path(), urlencoding::encode(id));
    if let Some(action) = action {
        path.push('/');
        path.push_str(action);
    }
    path
}
