//! Writes against the backend.
//!
//! Each action validates its input, performs the request and, when the
//! backend accepts it, invalidates every cached read the write affects.

mod notice;
mod validation;

pub use notice::{Mutation, Notice, NoticeKind};
pub use validation::{DataSourceForm, Validate, ValidationError};

use crate::api::types::*;
use crate::api::{ApiClient, ApiResponse};
use crate::query::QueryCache;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{mutation:?} rejected: {message}")]
    Rejected { mutation: Mutation, message: String },
}

impl ActionError {
    /// What to tell the user.
    pub fn notice(&self) -> Notice {
        match self {
            ActionError::Validation(err) => Notice::missing_information(err),
            ActionError::Rejected { mutation, .. } => mutation.failure_notice(),
        }
    }
}

pub type ActionResult<T> = Result<T, ActionError>;

/// The notice to show once `mutation` has finished with `result`.
pub fn outcome_notice<T>(mutation: Mutation, result: &ActionResult<T>) -> Notice {
    match result {
        Ok(_) => mutation.success_notice(),
        Err(err) => err.notice(),
    }
}

/// Performs mutations and keeps the cache consistent with them.
#[derive(Clone)]
pub struct Actions {
    client: ApiClient,
    cache: QueryCache,
}

impl Actions {
    pub fn new(client: ApiClient, cache: QueryCache) -> Self {
        Self { client, cache }
    }

    /// Settle a mutation: invalidate on success, log and reject on failure.
    fn complete<T>(
        &self,
        mutation: Mutation,
        response: ApiResponse<T>,
    ) -> ActionResult<Option<T>> {
        match response.into_data() {
            Ok(data) => {
                let refetched: usize = mutation
                    .invalidates()
                    .iter()
                    .map(|resource| self.cache.invalidate(*resource))
                    .sum();
                info!(?mutation, refetched, "mutation succeeded");
                Ok(data)
            }
            Err(message) => {
                warn!(?mutation, %message, "mutation failed");
                Err(ActionError::Rejected { mutation, message })
            }
        }
    }

    /// Like [`Self::complete`] but the response must carry data.
    fn complete_with<T>(&self, mutation: Mutation, response: ApiResponse<T>) -> ActionResult<T> {
        self.complete(mutation, response)?
            .ok_or_else(|| ActionError::Rejected {
                mutation,
                message: "response contained no data".to_string(),
            })
    }

    // =========================================================================
    // Data sources
    // =========================================================================

    pub async fn create_data_source(&self, form: DataSourceForm) -> ActionResult<()> {
        let source = form.into_payload()?;
        let response = self.client.create_data_source(&source).await;
        self.complete(Mutation::CreateDataSource, response).map(drop)
    }

    pub async fn update_data_source(
        &self,
        id: &str,
        update: &DataSourceUpdate,
    ) -> ActionResult<()> {
        let response = self.client.update_data_source(id, update).await;
        self.complete(Mutation::UpdateDataSource, response).map(drop)
    }

    pub async fn delete_data_source(&self, id: &str) -> ActionResult<()> {
        let response = self.client.delete_data_source(id).await;
        self.complete(Mutation::DeleteDataSource, response).map(drop)
    }

    /// Test a source's connection. A reachable backend reporting a failed
    /// connection is still `Ok`; see [`Notice::connection_test`].
    pub async fn test_data_source(&self, id: &str) -> ActionResult<ConnectionTest> {
        let response = self.client.test_data_source(id).await;
        self.complete_with(Mutation::TestDataSource, response)
    }

    pub async fn update_schedule(&self, id: &str, schedule: &ScheduleUpdate) -> ActionResult<()> {
        let response = self.client.update_schedule(id, schedule).await;
        self.complete(Mutation::UpdateSchedule, response).map(drop)
    }

    pub async fn toggle_schedule(&self, id: &str) -> ActionResult<()> {
        let response = self.client.toggle_schedule(id).await;
        self.complete(Mutation::ToggleSchedule, response).map(drop)
    }

    // =========================================================================
    // File processing
    // =========================================================================

    pub async fn upload_files(&self, upload: &UploadRequest) -> ActionResult<UploadReceipt> {
        upload.validate()?;
        let response = self.client.upload_files(upload).await;
        self.complete_with(Mutation::UploadFiles, response)
    }

    pub async fn pause_job(&self, job_id: &str) -> ActionResult<()> {
        let response = self.client.pause_job(job_id).await;
        self.complete(Mutation::PauseJob, response).map(drop)
    }

    pub async fn resume_job(&self, job_id: &str) -> ActionResult<()> {
        let response = self.client.resume_job(job_id).await;
        self.complete(Mutation::ResumeJob, response).map(drop)
    }

    pub async fn retry_job(&self, job_id: &str) -> ActionResult<()> {
        let response = self.client.retry_job(job_id).await;
        self.complete(Mutation::RetryJob, response).map(drop)
    }

    // =========================================================================
    // Error detection
    // =========================================================================

    pub async fn ignore_error(&self, error_id: &str) -> ActionResult<()> {
        let response = self.client.ignore_error(error_id).await;
        self.complete(Mutation::IgnoreError, response).map(drop)
    }

    pub async fn apply_correction_rule(
        &self,
        rule_id: &str,
        error_ids: &[String],
    ) -> ActionResult<()> {
        let response = self.client.apply_correction_rule(rule_id, error_ids).await;
        self.complete(Mutation::ApplyCorrectionRule, response).map(drop)
    }

    pub async fn create_correction_rule(&self, rule: &NewCorrectionRule) -> ActionResult<Created> {
        rule.validate()?;
        let response = self.client.create_correction_rule(rule).await;
        self.complete_with(Mutation::CreateCorrectionRule, response)
    }

    pub async fn update_correction_rule(
        &self,
        id: &str,
        update: &CorrectionRuleUpdate,
    ) -> ActionResult<()> {
        let response = self.client.update_correction_rule(id, update).await;
        self.complete(Mutation::UpdateCorrectionRule, response).map(drop)
    }

    // =========================================================================
    // Anomaly detection
    // =========================================================================

    pub async fn acknowledge_anomaly(&self, anomaly_id: &str) -> ActionResult<()> {
        let response = self.client.acknowledge_anomaly(anomaly_id).await;
        self.complete(Mutation::AcknowledgeAnomaly, response).map(drop)
    }

    pub async fn create_anomaly_rule(&self, rule: &NewAnomalyRule) -> ActionResult<Created> {
        rule.validate()?;
        let response = self.client.create_anomaly_rule(rule).await;
        self.complete_with(Mutation::CreateAnomalyRule, response)
    }

    pub async fn update_anomaly_rule(
        &self,
        id: &str,
        update: &AnomalyRuleUpdate,
    ) -> ActionResult<()> {
        let response = self.client.update_anomaly_rule(id, update).await;
        self.complete(Mutation::UpdateAnomalyRule, response).map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Endpoint;
    use crate::query::{Queries, QueryStatus};
    use crate::test_support::{unreachable_url, MockBackend};

    fn sources_body(enabled: bool) -> String {
        format!(
            concat!(
                r#"{{"success":true,"data":[{{"id":"ds-1","name":"Orders API","#,
                r#""type":"api","status":"active","#,
                r#""schedule":{{"enabled":{},"frequency":"daily","time":"09:00"}}}}]}}"#,
            ),
            enabled
        )
    }

    #[tokio::test]
    async fn toggle_schedule_refetches_sources() {
        let backend = MockBackend::start().await;
        let client = ApiClient::new(backend.base_url.clone());
        let cache = QueryCache::new();
        let queries = Queries::new(client.clone());
        let actions = Actions::new(client, cache.clone());

        let server = tokio::spawn(async move {
            let first = backend.respond_once(200, &sources_body(false)).await;
            let toggle = backend.respond_once(200, r#"{"success":true,"data":{}}"#).await;
            let refetch = backend.respond_once(200, &sources_body(true)).await;
            (first, toggle, refetch)
        });

        let mut sources = cache.subscribe(&queries.data_sources());
        let state = sources.settled().await;
        let enabled = |s: &crate::query::QueryState<Vec<DataSource>>| {
            s.data.as_ref().unwrap()[0]
                .schedule
                .as_ref()
                .map(|sch| sch.enabled)
        };
        assert_eq!(enabled(&state), Some(false));

        actions.toggle_schedule("ds-1").await.unwrap();
        assert!(sources.state().is_loading());
        let state = sources.settled().await;
        assert_eq!(state.status, QueryStatus::Success);
        assert_eq!(enabled(&state), Some(true));

        let (first, toggle, refetch) = server.await.unwrap();
        assert!(first.starts_with("GET /api/data-sources "));
        assert!(toggle.starts_with("POST /api/data-sources/ds-1/schedule/toggle "));
        assert!(refetch.starts_with("GET /api/data-sources "));
    }

    #[tokio::test]
    async fn rejected_mutation_keeps_cache() {
        let backend = MockBackend::start().await;
        let client = ApiClient::new(backend.base_url.clone());
        let cache = QueryCache::new();
        let actions = Actions::new(client.clone(), cache.clone());
        let queries = Queries::new(client);

        let server = tokio::spawn(async move {
            backend
                .respond_once(200, r#"{"success":true,"data":[]}"#)
                .await;
            backend
                .respond_once(200, r#"{"success":false,"message":"anomaly already resolved"}"#)
                .await;
        });

        let mut anomalies = cache.subscribe(&queries.anomalies());
        anomalies.settled().await;

        let err = actions.acknowledge_anomaly("a-1").await.unwrap_err();
        server.await.unwrap();

        assert!(matches!(
            &err,
            ActionError::Rejected { mutation: Mutation::AcknowledgeAnomaly, message }
                if message == "anomaly already resolved"
        ));
        assert_eq!(err.notice().title, "Action Failed");
        assert_eq!(anomalies.state().status, QueryStatus::Success);
    }

    #[tokio::test]
    async fn accepted_action_reports_its_success_notice() {
        let backend = MockBackend::start().await;
        let actions = Actions::new(ApiClient::new(backend.base_url.clone()), QueryCache::new());

        let (result, request) = tokio::join!(
            actions.acknowledge_anomaly("a-1"),
            backend.respond_once(200, r#"{"success":true,"data":{}}"#),
        );

        assert!(request.starts_with("POST /api/anomalies/a-1/acknowledge "));
        let notice = outcome_notice(Mutation::AcknowledgeAnomaly, &result);
        assert_eq!(
            notice.to_string(),
            "Anomaly Acknowledged: The anomaly has been acknowledged."
        );
        assert!(!notice.is_failure());

        let rejected: ActionResult<()> = Err(ActionError::Rejected {
            mutation: Mutation::ToggleSchedule,
            message: "not found".to_string(),
        });
        let notice = outcome_notice(Mutation::ToggleSchedule, &rejected);
        assert_eq!(notice.title, "Error");
        assert!(notice.is_failure());
    }

    #[tokio::test]
    async fn invalid_form_sends_nothing() {
        let actions = Actions::new(ApiClient::new(unreachable_url().await), QueryCache::new());

        let err = actions
            .create_data_source(DataSourceForm::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Validation(ValidationError::MissingSourceType)));
        assert_eq!(err.notice().description, "Please select a source type.");

        let upload = UploadRequest {
            files: Vec::new(),
            target_sink: "warehouse".to_string(),
            options: None,
        };
        let err = actions.upload_files(&upload).await.unwrap_err();
        assert!(matches!(err, ActionError::Validation(ValidationError::NoFiles)));
    }

    #[tokio::test]
    async fn unreachable_backend_is_rejected() {
        let actions = Actions::new(ApiClient::new(unreachable_url().await), QueryCache::new());

        let err = actions.delete_data_source("ds-1").await.unwrap_err();
        let ActionError::Rejected { mutation, message } = &err else {
            panic!("expected rejection, got {err:?}");
        };
        assert_eq!(*mutation, Mutation::DeleteDataSource);
        assert!(message.starts_with("Failed to fetch /api/data-sources/ds-1"), "{message}");
        assert_eq!(err.notice().title, "Error");
    }

    #[tokio::test]
    async fn ignoring_an_error_refetches_every_page() {
        let cache = QueryCache::new();
        let calls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let make = |page: u32| {
            let calls = calls.clone();
            crate::query::Query::new(Endpoint::data_errors(page, 10), move || {
                calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                async { ApiResponse::ok(0u32) }
            })
        };
        let mut page1 = cache.subscribe(&make(1));
        let mut page2 = cache.subscribe(&make(2));
        page1.settled().await;
        page2.settled().await;

        let actions = Actions::new(ApiClient::new("http://unused"), cache.clone());
        actions
            .complete(Mutation::IgnoreError, ApiResponse::ok(serde_json::json!({})))
            .unwrap();

        page1.settled().await;
        page2.settled().await;
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 4);
    }
}
