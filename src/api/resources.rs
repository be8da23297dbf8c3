//! One method per backend operation.
//!
//! These return whatever [`ApiClient::request`] returns; failures are
//! already folded into the envelope.

use super::client::{ApiClient, RequestOptions};
use super::endpoint::{item_path, Endpoint, Resource};
use super::envelope::{ApiResponse, Paginated};
use super::types::*;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

impl ApiClient {
    // =========================================================================
    // Dashboard
    // =========================================================================

    pub async fn dashboard_stats(&self) -> ApiResponse<DashboardStats> {
        self.get(Resource::DashboardStats.path()).await
    }

    pub async fn recent_jobs(&self, limit: u32) -> ApiResponse<Vec<RecentJob>> {
        self.get(&Endpoint::recent_jobs(limit).to_string()).await
    }

    pub async fn scheduled_pipelines(&self) -> ApiResponse<Vec<ScheduledPipeline>> {
        self.get(Resource::ScheduledPipelines.path()).await
    }

    pub async fn system_health(&self) -> ApiResponse<SystemHealth> {
        self.get(Resource::SystemHealth.path()).await
    }

    // =========================================================================
    // Data sources
    // =========================================================================

    pub async fn data_sources(&self) -> ApiResponse<Vec<DataSource>> {
        self.get(Resource::DataSources.path()).await
    }

    pub async fn create_data_source(&self, source: &NewDataSource) -> ApiResponse<Value> {
        self.request(
            Resource::DataSources.path(),
            RequestOptions::post().json(source),
        )
        .await
    }

    pub async fn update_data_source(
        &self,
        id: &str,
        source: &DataSourceUpdate,
    ) -> ApiResponse<Value> {
        self.request(
            &item_path(Resource::DataSources, id, None),
            RequestOptions::put().json(source),
        )
        .await
    }

    pub async fn delete_data_source(&self, id: &str) -> ApiResponse<Value> {
        self.request(
            &item_path(Resource::DataSources, id, None),
            RequestOptions::delete(),
        )
        .await
    }

    pub async fn test_data_source(&self, id: &str) -> ApiResponse<ConnectionTest> {
        self.request(
            &item_path(Resource::DataSources, id, Some("test")),
            RequestOptions::post(),
        )
        .await
    }

    pub async fn update_schedule(&self, id: &str, schedule: &ScheduleUpdate) -> ApiResponse<Value> {
        self.request(
            &item_path(Resource::DataSources, id, Some("schedule")),
            RequestOptions::put().json(schedule),
        )
        .await
    }

    pub async fn toggle_schedule(&self, id: &str) -> ApiResponse<Value> {
        self.request(
            &item_path(Resource::DataSources, id, Some("schedule/toggle")),
            RequestOptions::post(),
        )
        .await
    }

    // =========================================================================
    // File processing
    // =========================================================================

    pub async fn processing_jobs(&self) -> ApiResponse<Vec<ProcessingJob>> {
        self.get(Resource::ProcessingJobs.path()).await
    }

    /// Upload files to `target_sink` and start a processing job.
    pub async fn upload_files(&self, upload: &UploadRequest) -> ApiResponse<UploadReceipt> {
        self.request(
            "/api/processing/upload",
            RequestOptions::post().multipart(upload_form(upload)),
        )
        .await
    }

    pub async fn pause_job(&self, job_id: &str) -> ApiResponse<Value> {
        self.job_control(job_id, "pause").await
    }

    pub async fn resume_job(&self, job_id: &str) -> ApiResponse<Value> {
        self.job_control(job_id, "resume").await
    }

    pub async fn retry_job(&self, job_id: &str) -> ApiResponse<Value> {
        self.job_control(job_id, "retry").await
    }

    async fn job_control(&self, job_id: &str, action: &str) -> ApiResponse<Value> {
        self.request(
            &item_path(Resource::ProcessingJobs, job_id, Some(action)),
            RequestOptions::post(),
        )
        .await
    }

    // =========================================================================
    // Error detection
    // =========================================================================

    pub async fn data_errors(&self, page: u32, limit: u32) -> ApiResponse<Paginated<DataError>> {
        self.request_page(
            &Endpoint::data_errors(page, limit).to_string(),
            RequestOptions::get(),
        )
        .await
    }

    pub async fn correction_rules(&self) -> ApiResponse<Vec<CorrectionRule>> {
        self.get(Resource::CorrectionRules.path()).await
    }

    pub async fn create_correction_rule(&self, rule: &NewCorrectionRule) -> ApiResponse<Created> {
        self.request(
            Resource::CorrectionRules.path(),
            RequestOptions::post().json(rule),
        )
        .await
    }

    pub async fn update_correction_rule(
        &self,
        rule_id: &str,
        rule: &CorrectionRuleUpdate,
    ) -> ApiResponse<Value> {
        self.request(
            &item_path(Resource::CorrectionRules, rule_id, None),
            RequestOptions::put().json(rule),
        )
        .await
    }

    pub async fn apply_correction_rule(
        &self,
        rule_id: &str,
        error_ids: &[String],
    ) -> ApiResponse<Value> {
        let body = ApplyRule {
            error_ids: error_ids.to_vec(),
        };
        self.request(
            &item_path(Resource::CorrectionRules, rule_id, Some("apply")),
            RequestOptions::post().json(&body),
        )
        .await
    }

    pub async fn ignore_error(&self, error_id: &str) -> ApiResponse<Value> {
        self.request(
            &item_path(Resource::DataErrors, error_id, Some("ignore")),
            RequestOptions::post(),
        )
        .await
    }

    // =========================================================================
    // Anomaly detection
    // =========================================================================

    pub async fn anomalies(&self) -> ApiResponse<Vec<Anomaly>> {
        self.get(Resource::Anomalies.path()).await
    }

    pub async fn anomaly_rules(&self) -> ApiResponse<Vec<AlertRule>> {
        self.get(Resource::AnomalyRules.path()).await
    }

    pub async fn create_anomaly_rule(&self, rule: &NewAnomalyRule) -> ApiResponse<Created> {
        self.request(
            Resource::AnomalyRules.path(),
            RequestOptions::post().json(rule),
        )
        .await
    }

    pub async fn update_anomaly_rule(
        &self,
        rule_id: &str,
        rule: &AnomalyRuleUpdate,
    ) -> ApiResponse<Value> {
        self.request(
            &item_path(Resource::AnomalyRules, rule_id, None),
            RequestOptions::put().json(rule),
        )
        .await
    }

    pub async fn acknowledge_anomaly(&self, anomaly_id: &str) -> ApiResponse<Value> {
        self.request(
            &item_path(Resource::Anomalies, anomaly_id, Some("acknowledge")),
            RequestOptions::post(),
        )
        .await
    }

    // =========================================================================
    // Performance monitoring
    // =========================================================================

    pub async fn performance_metrics(&self, range: &str) -> ApiResponse<Vec<PerformanceMetric>> {
        self.get(&Endpoint::performance_metrics(range).to_string())
            .await
    }

    pub async fn job_performance(&self) -> ApiResponse<Vec<JobPerformance>> {
        self.get(Resource::JobPerformance.path()).await
    }

    pub async fn scheduled_jobs_performance(&self) -> ApiResponse<Vec<ScheduledPipeline>> {
        self.get(Resource::ScheduledJobsPerformance.path()).await
    }

    pub async fn resource_usage(&self) -> ApiResponse<Vec<SystemResource>> {
        self.get(Resource::ResourceUsage.path()).await
    }
}

/// Multipart body of an upload: one `files` part per file, the target sink,
/// then the processing switches when given.
fn upload_form(upload: &UploadRequest) -> Form {
    let mut form = Form::new();
    for file in &upload.files {
        let part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        form = form.part("files", part);
    }
    form = form.text("target_sink", upload.target_sink.clone());
    if let Some(options) = upload.options {
        for (name, value) in options.fields() {
            form = form.text(name, value.to_string());
        }
    }
    form
}
