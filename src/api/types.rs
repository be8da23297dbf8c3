//! Typed payloads exchanged with the backend.
//!
//! Field names are camelCase on the wire. Enumerations fall back to an
//! `Unknown` variant for values this client does not recognise, so one odd
//! row does not reject a whole list.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Shared enumerations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Api,
    Folder,
    Sharepoint,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    Active,
    Inactive,
    Error,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Hourly,
    #[default]
    Daily,
    Weekly,
    Monthly,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Error,
    Paused,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Active,
    Paused,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Csv,
    Json,
    Excel,
    Parquet,
    Zip,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Validation,
    Format,
    Missing,
    Duplicate,
    Constraint,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorStatus {
    Open,
    Resolved,
    Ignored,
    Corrected,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Replace,
    Transform,
    Validate,
    Skip,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyKind {
    Volume,
    Pattern,
    Outlier,
    Trend,
    Threshold,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyStatus {
    Active,
    Acknowledged,
    Resolved,
    FalsePositive,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Good,
    Warning,
    Critical,
    #[default]
    #[serde(other)]
    Unknown,
}

// ============================================================================
// Dashboard
// ============================================================================

/// Summary counters for the overview page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_sources: u64,
    pub files_processed_today: u64,
    pub active_errors: u64,
    pub success_rate: f64,
}

impl DashboardStats {
    /// Values shown while live stats are unavailable.
    pub fn placeholder() -> Self {
        Self {
            total_sources: 12,
            files_processed_today: 1247,
            active_errors: 3,
            success_rate: 98.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentJob {
    pub id: String,
    pub source: String,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub files: u64,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub scheduled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledPipeline {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub source_type: SourceType,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub next_run: Option<String>,
    #[serde(default)]
    pub status: PipelineStatus,
    #[serde(default)]
    pub last_run: Option<String>,
    #[serde(default)]
    pub success: bool,
}

/// Live resource gauges, each a percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemHealth {
    pub cpu: f64,
    pub memory: f64,
    pub storage: f64,
    pub network: f64,
}

impl SystemHealth {
    pub fn placeholder() -> Self {
        Self {
            cpu: 45.0,
            memory: 67.0,
            storage: 23.0,
            network: 12.0,
        }
    }
}

// ============================================================================
// Data sources
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub source_type: SourceType,
    #[serde(default)]
    pub status: SourceStatus,
    #[serde(default)]
    pub last_sync: Option<String>,
    #[serde(default)]
    pub records_count: u64,
    #[serde(default)]
    pub config: Map<String, Value>,
    #[serde(default)]
    pub schedule: Option<Schedule>,
}

/// Sync schedule of a data source. Also the body of a schedule update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub enabled: bool,
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run: Option<String>,
}

pub type ScheduleUpdate = Schedule;

impl Schedule {
    /// Build a schedule from the schedule form.
    ///
    /// `time` only applies to non-hourly schedules and `days` only to weekly
    /// ones; `next_run` is filled in when the schedule is enabled.
    pub fn from_form(enabled: bool, frequency: Frequency, time: &str, days: &[String]) -> Self {
        Self {
            enabled,
            frequency,
            time: (frequency != Frequency::Hourly).then(|| time.to_string()),
            days: (frequency == Frequency::Weekly).then(|| days.to_vec()),
            next_run: enabled.then(|| next_run_label(frequency, time, days)),
        }
    }
}

/// Human readable description of the next run of a schedule.
pub fn next_run_label(frequency: Frequency, time: &str, days: &[String]) -> String {
    match frequency {
        Frequency::Hourly => "In 1 hour".to_string(),
        Frequency::Daily => format!("Tomorrow at {time}"),
        Frequency::Weekly => match days.first() {
            Some(day) => format!("Next {day} at {time}"),
            None => "Not scheduled".to_string(),
        },
        Frequency::Monthly => format!("Next month at {time}"),
        Frequency::Unknown => "Not scheduled".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDataSource {
    pub name: String,
    #[serde(rename = "type")]
    pub source_type: SourceType,
    pub config: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSourceUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<SourceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,
}

/// Result of a connection test against a data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionTest {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

// ============================================================================
// File processing
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingJob {
    pub id: String,
    pub file_name: String,
    #[serde(default)]
    pub file_type: FileType,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub records_processed: u64,
    #[serde(default)]
    pub total_records: u64,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub errors: u64,
    #[serde(default)]
    pub source: Option<String>,
}

/// One file of a multipart upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Processing switches sent along with an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadOptions {
    pub validate_schema: bool,
    pub error_correction: bool,
    pub anomaly_detection: bool,
}

impl UploadOptions {
    /// Multipart field names and values, in the order they are sent.
    pub fn fields(&self) -> [(&'static str, bool); 3] {
        [
            ("validateSchema", self.validate_schema),
            ("errorCorrection", self.error_correction),
            ("anomalyDetection", self.anomaly_detection),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    pub files: Vec<UploadFile>,
    pub target_sink: String,
    pub options: Option<UploadOptions>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub job_id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub files_processed: u64,
}

// ============================================================================
// Error detection
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataError {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: ErrorKind,
    #[serde(default)]
    pub severity: Severity,
    pub message: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub row_number: Option<u64>,
    #[serde(default)]
    pub column_name: Option<String>,
    #[serde(default)]
    pub detected_at: Option<String>,
    #[serde(default)]
    pub status: ErrorStatus,
    #[serde(default)]
    pub suggested_fix: Option<String>,
    #[serde(default)]
    pub affected_records: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionRule {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: RuleKind,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub applied_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrectionAction {
    #[default]
    Replace,
    Remove,
    Flag,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCorrectionRule {
    pub name: String,
    pub description: String,
    pub condition: String,
    pub action: CorrectionAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
    pub severity: Severity,
    pub auto_apply: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionRuleUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<CorrectionAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_apply: Option<bool>,
}

/// Body of an apply-rule request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyRule {
    pub error_ids: Vec<String>,
}

/// Acknowledgement returned when a rule is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Created {
    pub id: String,
    #[serde(default)]
    pub message: String,
}

// ============================================================================
// Anomaly detection
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: AnomalyKind,
    #[serde(default)]
    pub severity: Severity,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub detected_at: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub expected_range: Option<String>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub status: AnomalyStatus,
    #[serde(default)]
    pub alerts_sent: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRule {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: AnomalyKind,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub threshold: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub triggered_count: u64,
    #[serde(default)]
    pub last_triggered: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ComparisonOperator {
    #[default]
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnomalyRule {
    pub name: String,
    pub description: String,
    pub metric: String,
    pub threshold: f64,
    pub operator: ComparisonOperator,
    pub severity: Severity,
    pub alert_channels: Vec<String>,
    pub auto_resolve: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyRuleUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<ComparisonOperator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_channels: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_resolve: Option<bool>,
}

// ============================================================================
// Performance monitoring
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetric {
    pub name: String,
    pub value: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub trend: Trend,
    #[serde(default)]
    pub trend_value: f64,
    #[serde(default)]
    pub status: HealthStatus,
}

/// Throughput and latency of one pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPerformance {
    pub name: String,
    #[serde(default)]
    pub throughput: Option<String>,
    #[serde(default)]
    pub latency: Option<String>,
    #[serde(default)]
    pub status: HealthStatus,
    #[serde(default)]
    pub bottleneck: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemResource {
    pub name: String,
    pub usage: f64,
    pub total: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub status: HealthStatus,
}

impl SystemResource {
    /// Fraction of the resource in use, in `0.0..=1.0`.
    pub fn utilization(&self) -> f64 {
        if self.total <= 0.0 {
            return 0.0;
        }
        (self.usage / self.total).clamp(0.0, 1.0)
    }
}
