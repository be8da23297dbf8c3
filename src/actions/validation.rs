//! Checks run on form input before any request is sent.

use crate::api::types::{
    NewAnomalyRule, NewCorrectionRule, NewDataSource, SourceType, UploadFile, UploadRequest,
};
use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("no source type selected")]
    MissingSourceType,

    #[error("required field `{0}` is empty")]
    MissingField(&'static str),

    #[error("no files selected")]
    NoFiles,

    #[error("could not read {path}: {reason}")]
    UnreadableFile { path: String, reason: String },
}

/// Input of the "add data source" form.
///
/// Every field the user filled in lands in `fields`; the whole map is sent as
/// the source's `config`, with `name` also lifted to the top level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSourceForm {
    pub source_type: Option<SourceType>,
    pub fields: Map<String, Value>,
}

impl DataSourceForm {
    pub fn new(source_type: SourceType) -> Self {
        Self {
            source_type: Some(source_type),
            fields: Map::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn into_payload(self) -> Result<NewDataSource, ValidationError> {
        let source_type = self.source_type.ok_or(ValidationError::MissingSourceType)?;
        let name = self
            .fields
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Ok(NewDataSource {
            name,
            source_type,
            config: self.fields,
        })
    }
}

/// Implemented by payloads that have required fields.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

fn require(name: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(name));
    }
    Ok(())
}

impl Validate for NewCorrectionRule {
    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("condition", &self.condition)
    }
}

impl Validate for NewAnomalyRule {
    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("metric", &self.metric)?;
        if !self.threshold.is_finite() {
            return Err(ValidationError::MissingField("threshold"));
        }
        Ok(())
    }
}

impl Validate for UploadRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.files.is_empty() {
            return Err(ValidationError::NoFiles);
        }
        require("target_sink", &self.target_sink)
    }
}

impl UploadFile {
    /// Read a file from disk for upload, named after its last path component.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ValidationError> {
        let path = path.as_ref();
        let unreadable = |reason: String| ValidationError::UnreadableFile {
            path: path.display().to_string(),
            reason,
        };

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| unreadable("not a file".to_string()))?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| unreadable(e.to_string()))?;

        Ok(Self { file_name, bytes })
    }
}
