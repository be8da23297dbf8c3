//! Cached reads: one [`Query`] per backend read, keyed by its endpoint.

use super::cache::Query;
use crate::api::types::*;
use crate::api::{ApiClient, Endpoint, Paginated, Resource, DEFAULT_PAGE};
use crate::settings::Settings;

/// Builds the cacheable reads of the dashboard.
///
/// Two calls with the same arguments always produce the same cache key, so
/// consumers asking for the same data share one entry.
#[derive(Clone)]
pub struct Queries {
    client: ApiClient,
    page_size: u32,
    time_range: String,
    recent_jobs_limit: u32,
}

impl Queries {
    pub fn new(client: ApiClient) -> Self {
        Self::with_settings(client, &Settings::default())
    }

    /// Use the paging and time range defaults from `settings`.
    pub fn with_settings(client: ApiClient, settings: &Settings) -> Self {
        Self {
            client,
            page_size: settings.default_page_size,
            time_range: settings.default_time_range.clone(),
            recent_jobs_limit: settings.recent_jobs_limit,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn dashboard_stats(&self) -> Query<DashboardStats> {
        let client = self.client.clone();
        Query::new(Resource::DashboardStats.into(), move || {
            let client = client.clone();
            async move { client.dashboard_stats().await }
        })
    }

    pub fn recent_jobs(&self) -> Query<Vec<RecentJob>> {
        self.recent_jobs_with_limit(self.recent_jobs_limit)
    }

    pub fn recent_jobs_with_limit(&self, limit: u32) -> Query<Vec<RecentJob>> {
        let client = self.client.clone();
        Query::new(Endpoint::recent_jobs(limit), move || {
            let client = client.clone();
            async move { client.recent_jobs(limit).await }
        })
    }

    pub fn scheduled_pipelines(&self) -> Query<Vec<ScheduledPipeline>> {
        let client = self.client.clone();
        Query::new(Resource::ScheduledPipelines.into(), move || {
            let client = client.clone();
            async move { client.scheduled_pipelines().await }
        })
    }

    /// Polled every 30 seconds by default.
    pub fn system_health(&self) -> Query<SystemHealth> {
        let client = self.client.clone();
        Query::new(Resource::SystemHealth.into(), move || {
            let client = client.clone();
            async move { client.system_health().await }
        })
    }

    pub fn data_sources(&self) -> Query<Vec<DataSource>> {
        let client = self.client.clone();
        Query::new(Resource::DataSources.into(), move || {
            let client = client.clone();
            async move { client.data_sources().await }
        })
    }

    /// Polled every 5 seconds by default.
    pub fn processing_jobs(&self) -> Query<Vec<ProcessingJob>> {
        let client = self.client.clone();
        Query::new(Resource::ProcessingJobs.into(), move || {
            let client = client.clone();
            async move { client.processing_jobs().await }
        })
    }

    /// First page of the error log.
    pub fn data_errors(&self) -> Query<Paginated<DataError>> {
        self.data_errors_page(DEFAULT_PAGE, self.page_size)
    }

    pub fn data_errors_page(&self, page: u32, limit: u32) -> Query<Paginated<DataError>> {
        let client = self.client.clone();
        Query::new(Endpoint::data_errors(page, limit), move || {
            let client = client.clone();
            async move { client.data_errors(page, limit).await }
        })
    }

    pub fn correction_rules(&self) -> Query<Vec<CorrectionRule>> {
        let client = self.client.clone();
        Query::new(Resource::CorrectionRules.into(), move || {
            let client = client.clone();
            async move { client.correction_rules().await }
        })
    }

    pub fn anomalies(&self) -> Query<Vec<Anomaly>> {
        let client = self.client.clone();
        Query::new(Resource::Anomalies.into(), move || {
            let client = client.clone();
            async move { client.anomalies().await }
        })
    }

    pub fn anomaly_rules(&self) -> Query<Vec<AlertRule>> {
        let client = self.client.clone();
        Query::new(Resource::AnomalyRules.into(), move || {
            let client = client.clone();
            async move { client.anomaly_rules().await }
        })
    }

    pub fn performance_metrics(&self) -> Query<Vec<PerformanceMetric>> {
        self.performance_metrics_for(&self.time_range)
    }

    pub fn performance_metrics_for(&self, range: &str) -> Query<Vec<PerformanceMetric>> {
        let client = self.client.clone();
        let range = range.to_string();
        Query::new(Endpoint::performance_metrics(&range), move || {
            let client = client.clone();
            let range = range.clone();
            async move { client.performance_metrics(&range).await }
        })
    }

    pub fn job_performance(&self) -> Query<Vec<JobPerformance>> {
        let client = self.client.clone();
        Query::new(Resource::JobPerformance.into(), move || {
            let client = client.clone();
            async move { client.job_performance().await }
        })
    }

    pub fn scheduled_jobs_performance(&self) -> Query<Vec<ScheduledPipeline>> {
        let client = self.client.clone();
        Query::new(Resource::ScheduledJobsPerformance.into(), move || {
            let client = client.clone();
            async move { client.scheduled_jobs_performance().await }
        })
    }

    /// Polled every 10 seconds by default.
    pub fn resource_usage(&self) -> Query<Vec<SystemResource>> {
        let client = self.client.clone();
        Query::new(Resource::ResourceUsage.into(), move || {
            let client = client.clone();
            async move { client.resource_usage().await }
        })
    }
}
