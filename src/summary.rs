//! Counters derived from fetched lists for the overview cards.

use crate::api::types::{Anomaly, AnomalyStatus, DataError, ErrorKind, ErrorStatus, Severity};
use std::collections::BTreeMap;

/// Anomaly counts shown above the anomaly list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnomalySummary {
    pub total: usize,
    pub active: usize,
    pub critical: usize,
    pub resolved: usize,
}

impl AnomalySummary {
    pub fn from_anomalies<'a>(anomalies: impl IntoIterator<Item = &'a Anomaly>) -> Self {
        let mut summary = Self::default();
        for anomaly in anomalies {
            summary.add(anomaly);
        }
        summary
    }

    fn add(&mut self, anomaly: &Anomaly) {
        self.total += 1;
        match anomaly.status {
            AnomalyStatus::Active => self.active += 1,
            AnomalyStatus::Resolved => self.resolved += 1,
            _ => {}
        }
        if anomaly.severity == Severity::Critical {
            self.critical += 1;
        }
    }

    /// Per-source summaries. Anomalies without a source are grouped under
    /// `"Unknown"`.
    pub fn by_source(anomalies: &[Anomaly]) -> BTreeMap<String, AnomalySummary> {
        let mut groups: BTreeMap<String, AnomalySummary> = BTreeMap::new();
        for anomaly in anomalies {
            let source = anomaly.source.as_deref().unwrap_or("Unknown");
            groups.entry(source.to_string()).or_default().add(anomaly);
        }
        groups
    }

    /// Whether the source needs attention: anything active or critical.
    pub fn needs_attention(&self) -> bool {
        self.active > 0 || self.critical > 0
    }
}

/// Error-log counts by status, severity and kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorSummary {
    pub total: usize,
    pub affected_records: u64,
    pub by_status: BTreeMap<ErrorStatus, usize>,
    pub by_severity: BTreeMap<Severity, usize>,
    pub by_kind: BTreeMap<ErrorKind, usize>,
}

impl ErrorSummary {
    pub fn from_errors<'a>(errors: impl IntoIterator<Item = &'a DataError>) -> Self {
        let mut summary = Self::default();
        for error in errors {
            summary.total += 1;
            summary.affected_records += error.affected_records;
            *summary.by_status.entry(error.status).or_default() += 1;
            *summary.by_severity.entry(error.severity).or_default() += 1;
            *summary.by_kind.entry(error.kind).or_default() += 1;
        }
        summary
    }

    pub fn status(&self, status: ErrorStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    pub fn severity(&self, severity: Severity) -> usize {
        self.by_severity.get(&severity).copied().unwrap_or(0)
    }

    /// Errors still waiting for a decision.
    pub fn open(&self) -> usize {
        self.status(ErrorStatus::Open)
    }
}
