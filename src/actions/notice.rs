//! User-facing outcome messages for actions.

use super::validation::ValidationError;
use crate::api::types::ConnectionTest;
use crate::api::Resource;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Failure,
}

/// A short message telling the user how an action went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            kind: NoticeKind::Success,
        }
    }

    pub fn failure(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            kind: NoticeKind::Failure,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.kind == NoticeKind::Failure
    }

    /// Notice for a validation failure.
    pub fn missing_information(err: &ValidationError) -> Self {
        let description = match err {
            ValidationError::MissingSourceType => "Please select a source type.".to_string(),
            ValidationError::MissingField(_) => "Please fill in all required fields.".to_string(),
            ValidationError::NoFiles => "Please select at least one file.".to_string(),
            ValidationError::UnreadableFile { .. } => err.to_string(),
        };
        Self::failure("Missing Information", description)
    }

    /// Notice for the outcome of a connection test.
    pub fn connection_test(result: &ConnectionTest) -> Self {
        if result.success {
            Self::success("Connection Successful", result.message.clone())
        } else {
            Self::failure("Connection Failed", result.message.clone())
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            write!(f, "{}", self.title)
        } else {
            write!(f, "{}: {}", self.title, self.description)
        }
    }
}

/// Every write the dashboard can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    CreateDataSource,
    UpdateDataSource,
    DeleteDataSource,
    TestDataSource,
    UpdateSchedule,
    ToggleSchedule,
    UploadFiles,
    PauseJob,
    ResumeJob,
    RetryJob,
    IgnoreError,
    ApplyCorrectionRule,
    CreateCorrectionRule,
    UpdateCorrectionRule,
    AcknowledgeAnomaly,
    CreateAnomalyRule,
    UpdateAnomalyRule,
}

impl Mutation {
    /// Cached resources that are stale once this mutation succeeds.
    pub fn invalidates(&self) -> &'static [Resource] {
        use Mutation::*;
        match self {
            CreateDataSource | UpdateDataSource | DeleteDataSource => &[Resource::DataSources],
            UpdateSchedule | ToggleSchedule => {
                &[Resource::DataSources, Resource::ScheduledPipelines]
            }
            UploadFiles | PauseJob | ResumeJob | RetryJob => {
                &[Resource::ProcessingJobs, Resource::RecentJobs]
            }
            IgnoreError | ApplyCorrectionRule => &[Resource::DataErrors],
            CreateCorrectionRule | UpdateCorrectionRule => &[Resource::CorrectionRules],
            AcknowledgeAnomaly => &[Resource::Anomalies],
            CreateAnomalyRule | UpdateAnomalyRule => &[Resource::AnomalyRules],
            TestDataSource => &[],
        }
    }

    pub fn success_notice(&self) -> Notice {
        use Mutation::*;
        let (title, description) = match self {
            CreateDataSource => (
                "Data Source Created",
                "Your data source has been created successfully.",
            ),
            UpdateDataSource => (
                "Data Source Updated",
                "Data source has been updated successfully.",
            ),
            DeleteDataSource => ("Source Deleted", "Data source has been deleted successfully."),
            TestDataSource => ("Connection Successful", ""),
            UpdateSchedule => (
                "Schedule Updated",
                "Data source schedule has been updated successfully.",
            ),
            ToggleSchedule => (
                "Schedule Updated",
                "Data source schedule has been toggled successfully.",
            ),
            UploadFiles => ("Upload Started", "Files have been queued for processing."),
            PauseJob => ("Job Paused", "The job has been paused."),
            ResumeJob => ("Job Resumed", "The job has been resumed."),
            RetryJob => ("Job Restarted", "The job has been queued again."),
            IgnoreError => ("Error Ignored", "The error has been marked as ignored."),
            ApplyCorrectionRule => (
                "Rule Applied",
                "Correction rule has been applied successfully.",
            ),
            CreateCorrectionRule => (
                "Rule Created",
                "Correction rule has been created successfully.",
            ),
            UpdateCorrectionRule => (
                "Rule Updated",
                "Correction rule has been updated successfully.",
            ),
            AcknowledgeAnomaly => ("Anomaly Acknowledged", "The anomaly has been acknowledged."),
            CreateAnomalyRule => ("Rule Created", "Alert rule has been created successfully."),
            UpdateAnomalyRule => ("Rule Updated", "Alert rule has been updated successfully."),
        };
        Notice::success(title, description)
    }

    pub fn failure_notice(&self) -> Notice {
        use Mutation::*;
        let (title, description) = match self {
            CreateDataSource => (
                "Creation Failed",
                "Failed to create data source. Please try again.",
            ),
            UpdateDataSource => (
                "Update Failed",
                "Failed to update data source. Please try again.",
            ),
            DeleteDataSource => ("Error", "Failed to delete data source. Please try again."),
            TestDataSource => ("Test Failed", "Unable to test connection. Please try again."),
            UpdateSchedule | ToggleSchedule => {
                ("Error", "Failed to update schedule. Please try again.")
            }
            UploadFiles => ("Upload Failed", "Failed to upload files. Please try again."),
            PauseJob => ("Action Failed", "Failed to pause job. Please try again."),
            ResumeJob => ("Action Failed", "Failed to resume job. Please try again."),
            RetryJob => ("Action Failed", "Failed to retry job. Please try again."),
            IgnoreError => ("Action Failed", "Failed to ignore error. Please try again."),
            ApplyCorrectionRule => (
                "Application Failed",
                "Failed to apply correction rule. Please try again.",
            ),
            CreateCorrectionRule => (
                "Creation Failed",
                "Failed to create correction rule. Please try again.",
            ),
            UpdateCorrectionRule => (
                "Update Failed",
                "Failed to update correction rule. Please try again.",
            ),
            AcknowledgeAnomaly => (
                "Action Failed",
                "Failed to acknowledge anomaly. Please try again.",
            ),
            CreateAnomalyRule => (
                "Creation Failed",
                "Failed to create alert rule. Please try again.",
            ),
            UpdateAnomalyRule => (
                "Update Failed",
                "Failed to update alert rule. Please try again.",
            ),
        };
        Notice::failure(title, description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_changes_touch_sources_and_pipelines() {
        assert_eq!(
            Mutation::ToggleSchedule.invalidates(),
            &[Resource::DataSources, Resource::ScheduledPipelines]
        );
        assert_eq!(Mutation::ApplyCorrectionRule.invalidates(), &[Resource::DataErrors]);
        assert!(Mutation::TestDataSource.invalidates().is_empty());
    }

    #[test]
    fn toast_wording() {
        let notice = Mutation::AcknowledgeAnomaly.success_notice();
        assert_eq!(notice.title, "Anomaly Acknowledged");
        assert!(!notice.is_failure());

        let notice = Mutation::DeleteDataSource.failure_notice();
        assert_eq!(notice.to_string(), "Error: Failed to delete data source. Please try again.");
        assert!(notice.is_failure());
    }

    #[test]
    fn validation_notices() {
        let notice = Notice::missing_information(&ValidationError::MissingSourceType);
        assert_eq!(notice.title, "Missing Information");
        assert_eq!(notice.description, "Please select a source type.");

        let notice = Notice::missing_information(&ValidationError::MissingField("name"));
        assert_eq!(notice.description, "Please fill in all required fields.");
    }

    #[test]
    fn connection_test_notice_follows_result() {
        let ok = ConnectionTest {
            success: true,
            message: "Connected in 120ms".to_string(),
        };
        assert_eq!(Notice::connection_test(&ok).title, "Connection Successful");

        let failed = ConnectionTest {
            success: false,
            message: "timeout".to_string(),
        };
        let notice = Notice::connection_test(&failed);
        assert_eq!(notice.title, "Connection Failed");
        assert!(notice.is_failure());
    }
}
