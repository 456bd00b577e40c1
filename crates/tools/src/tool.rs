//! The tool contract every analyzer and generator implements.

use adcopy_core::error::{DependencyError, ToolError, ValidationError};
use adcopy_core::types::{
    ErrorKind, ToolCategory, ToolConfig, ToolInput, ToolOutput, ToolVariation,
};
use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;
use uuid::Uuid;

/// What a tool's analysis produced, before it is stamped into a `ToolOutput`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolReport {
    pub scores: BTreeMap<String, f64>,
    pub insights: BTreeMap<String, Value>,
    pub recommendations: Vec<String>,
    pub variations: Vec<ToolVariation>,
    pub confidence: f64,
}

impl ToolReport {
    pub fn new(confidence: f64) -> Self {
        Self {
            confidence,
            ..Default::default()
        }
    }

    pub fn score(mut self, name: &str, value: f64) -> Self {
        self.scores.insert(name.to_string(), value);
        self
    }

    pub fn insight(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insights.insert(name.to_string(), value.into());
        self
    }

    pub fn recommendations(mut self, recommendations: Vec<String>) -> Self {
        self.recommendations = recommendations;
        self
    }

    pub fn variations(mut self, variations: Vec<ToolVariation>) -> Self {
        self.variations = variations;
        self
    }

    /// Stamp the report into an output. Scores are clamped to [0, 100]; a
    /// non-finite score turns the whole output into an execution failure.
    pub fn into_output(
        self,
        tool_name: &str,
        category: ToolCategory,
        request_id: Uuid,
        elapsed: Duration,
    ) -> ToolOutput {
        if let Some((name, _)) = self.scores.iter().find(|(_, v)| !v.is_finite()) {
            return ToolOutput::failed(
                tool_name,
                category,
                request_id,
                ErrorKind::Execution,
                format!("score '{name}' is not a finite number"),
                elapsed,
            );
        }
        if self.scores.is_empty() {
            return ToolOutput::failed(
                tool_name,
                category,
                request_id,
                ErrorKind::Execution,
                "tool produced no scores",
                elapsed,
            );
        }

        let scores = self
            .scores
            .into_iter()
            .map(|(k, v)| (k, v.clamp(0.0, 100.0)))
            .collect();
        let confidence = if self.confidence.is_finite() {
            self.confidence.clamp(0.0, 100.0)
        } else {
            0.0
        };

        ToolOutput {
            tool_name: tool_name.to_string(),
            category,
            success: true,
            scores,
            insights: self.insights,
            recommendations: self.recommendations,
            variations: self.variations,
            execution_time_ms: elapsed.as_secs_f64() * 1000.0,
            request_id,
            confidence_score: confidence,
            error_kind: None,
            error_message: None,
        }
    }
}

/// An independently pluggable analyzer, generator or optimizer.
///
/// Implementations must be stateless across calls: identical input yields
/// identical output.
#[async_trait]
pub trait Tool: Send + Sync {
    fn config(&self) -> &ToolConfig;

    fn name(&self) -> &str {
        &self.config().name
    }

    fn category(&self) -> ToolCategory {
        self.config().category
    }

    /// Score keys a successful run reports.
    fn output_score_names(&self) -> &'static [&'static str];

    /// Reject unusable input before any execution is scheduled.
    fn validate_input(&self, input: &ToolInput) -> Result<(), ValidationError>;

    async fn analyze(&self, input: &ToolInput) -> Result<ToolReport, ToolError>;

    /// Execute the tool. Never fails: errors and panics come back as a failed
    /// output carrying the elapsed time.
    async fn run(&self, input: &ToolInput) -> ToolOutput {
        let start = Instant::now();
        let outcome = AssertUnwindSafe(self.analyze(input)).catch_unwind().await;
        let elapsed = start.elapsed();

        match outcome {
            Ok(Ok(report)) => {
                report.into_output(self.name(), self.category(), input.request_id, elapsed)
            }
            Ok(Err(err)) => ToolOutput::failed(
                self.name(),
                self.category(),
                input.request_id,
                err.kind(),
                err.to_string(),
                elapsed,
            ),
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                warn!(tool = %self.name(), error = %message, "Tool panicked");
                ToolOutput::failed(
                    self.name(),
                    self.category(),
                    input.request_id,
                    ErrorKind::Execution,
                    format!("tool panicked: {message}"),
                    elapsed,
                )
            }
        }
    }
}

/// Instantiates a tool from its configuration.
pub trait ToolFactory: Send + Sync {
    /// Baseline name, category, timeout and parameters.
    fn default_config(&self) -> ToolConfig;

    fn build(&self, config: ToolConfig) -> Result<Arc<dyn Tool>, DependencyError>;
}

pub fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adcopy_core::types::AdCopy;

    struct Fixed {
        config: ToolConfig,
        score: f64,
    }

    #[async_trait]
    impl Tool for Fixed {
        fn config(&self) -> &ToolConfig {
            &self.config
        }

        fn output_score_names(&self) -> &'static [&'static str] {
            &["fixed_score"]
        }

        fn validate_input(&self, _input: &ToolInput) -> Result<(), ValidationError> {
            Ok(())
        }

        async fn analyze(&self, _input: &ToolInput) -> Result<ToolReport, ToolError> {
            if self.score < 0.0 {
                panic!("negative fixture");
            }
            Ok(ToolReport::new(150.0)
                .score("fixed_score", self.score)
                .recommendations(vec!["Do the thing".into()]))
        }
    }

    fn fixed(score: f64) -> Fixed {
        Fixed {
            config: ToolConfig::new("fixed", ToolCategory::Analyzer, 1_000),
            score,
        }
    }

    fn input() -> ToolInput {
        ToolInput::new(&AdCopy::new("Headline", "Body", "Go", "facebook"))
    }

    #[tokio::test]
    async fn test_run_clamps_scores_and_confidence() {
        let input = input();
        let out = fixed(140.0).run(&input).await;
        assert!(out.success);
        assert_eq!(out.score("fixed_score"), Some(100.0));
        assert_eq!(out.confidence_score, 100.0);
        assert_eq!(out.request_id, input.request_id);
        assert!(out.execution_time_ms >= 0.0);
    }

    #[tokio::test]
    async fn test_non_finite_score_becomes_failure() {
        let out = fixed(f64::NAN).run(&input()).await;
        assert!(!out.success);
        assert!(out.scores.is_empty());
        assert_eq!(out.error_kind, Some(ErrorKind::Execution));
    }

    #[tokio::test]
    async fn test_panic_is_caught() {
        let out = fixed(-1.0).run(&input()).await;
        assert!(!out.success);
        assert_eq!(out.error_kind, Some(ErrorKind::Execution));
        assert!(out
            .error_message
            .as_deref()
            .unwrap_or_default()
            .contains("negative fixture"));
    }
}
