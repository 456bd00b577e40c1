use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::types::ErrorKind;

pub type AdCopyResult<T> = Result<T, AdCopyError>;

#[derive(Error, Debug)]
pub enum AdCopyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration load error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Dependency error: {0}")]
    Dependency(#[from] DependencyError),

    #[error("Aggregation error: {0}")]
    Aggregation(#[from] AggregationError),

    #[error("Pipeline failure: {0}")]
    Pipeline(#[from] PipelineFailure),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Missing or malformed input fields, reported before any tool is scheduled.
///
/// `fields` names exactly the offending fields, in input order.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{scope}: missing or invalid fields [{}]{}", .fields.join(", "), .detail.as_deref().map(|d| format!(" ({d})")).unwrap_or_default())]
pub struct ValidationError {
    pub scope: String,
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ValidationError {
    pub fn new(scope: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            scope: scope.into(),
            fields,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// A resource a tool needs at construction time is unavailable. The tool is
/// left out of the registry instead of taking the process down.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{component}: required resource '{resource}' unavailable: {reason}")]
pub struct DependencyError {
    pub component: String,
    pub resource: String,
    pub reason: String,
}

impl DependencyError {
    pub fn new(
        component: impl Into<String>,
        resource: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            component: component.into(),
            resource: resource.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("tool '{0}' is already registered")]
    Duplicate(String),

    #[error("tool '{0}' is not registered")]
    NotFound(String),

    #[error("tool could not be constructed: {0}")]
    Dependency(#[from] DependencyError),
}

/// Faults raised while a tool runs. These never cross the tool boundary:
/// the pipeline turns every one of them into a failed `ToolOutput`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("execution failed: {0}")]
    Execution(String),

    #[error("timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("cancelled before completion")]
    Cancelled,
}

impl ToolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolError::Execution(_) => ErrorKind::Execution,
            ToolError::Timeout { .. } => ErrorKind::Timeout,
            ToolError::Cancelled => ErrorKind::Cancelled,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregationError {
    #[error("insufficient data: none of {attempted} tool outputs produced a usable score")]
    InsufficientData { attempted: usize },

    #[error("dimension weights must sum to 1.0, got {0:.4}")]
    InvalidWeights(f64),
}

/// Machine-readable kind of a pipeline-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    InsufficientData,
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Validation => "validation",
            FailureKind::InsufficientData => "insufficient_data",
            FailureKind::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// The only error that surfaces from an analysis run. It is safe to hand to
/// external callers as-is.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct PipelineFailure {
    pub kind: FailureKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

impl PipelineFailure {
    pub fn insufficient_data(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::InsufficientData,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn cancelled() -> Self {
        Self {
            kind: FailureKind::Cancelled,
            message: "analysis was cancelled before all tools finished".to_string(),
            fields: Vec::new(),
        }
    }
}

impl From<ValidationError> for PipelineFailure {
    fn from(err: ValidationError) -> Self {
        Self {
            kind: FailureKind::Validation,
            message: err.to_string(),
            fields: err.fields,
        }
    }
}

impl From<AggregationError> for PipelineFailure {
    fn from(err: AggregationError) -> Self {
        Self::insufficient_data(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display_lists_fields() {
        let err = ValidationError::new("ad_copy", vec!["headline".into(), "cta".into()]);
        assert_eq!(
            err.to_string(),
            "ad_copy: missing or invalid fields [headline, cta]"
        );

        let err = err.with_detail("blank");
        assert!(err.to_string().ends_with("(blank)"));
    }

    #[test]
    fn test_validation_converts_to_pipeline_failure() {
        let err = ValidationError::new("ad_copy", vec!["body_text".into()]);
        let failure = PipelineFailure::from(err);
        assert_eq!(failure.kind, FailureKind::Validation);
        assert_eq!(failure.fields, vec!["body_text".to_string()]);

        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["kind"], "validation");
    }

    #[test]
    fn test_tool_error_kinds() {
        assert_eq!(ToolError::Cancelled.kind(), ErrorKind::Cancelled);
        assert_eq!(
            ToolError::Timeout { timeout_ms: 5 }.kind(),
            ErrorKind::Timeout
        );
        assert_eq!(
            ToolError::Execution("boom".into()).kind(),
            ErrorKind::Execution
        );
    }

    #[test]
    fn test_insufficient_data_failure_kind() {
        let failure: PipelineFailure = AggregationError::InsufficientData { attempted: 3 }.into();
        assert_eq!(failure.kind, FailureKind::InsufficientData);
        assert!(failure.message.contains("3 tool outputs"));
    }
}
