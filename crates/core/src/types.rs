use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

use crate::error::ValidationError;

// ─── Input ──────────────────────────────────────────────────────────────────

/// Ad platforms the tools know how to score against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Google,
    Linkedin,
    Tiktok,
    Instagram,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Facebook,
        Platform::Google,
        Platform::Linkedin,
        Platform::Tiktok,
        Platform::Instagram,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Facebook => "facebook",
            Platform::Google => "google",
            Platform::Linkedin => "linkedin",
            Platform::Tiktok => "tiktok",
            Platform::Instagram => "instagram",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Platform::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == needle)
            .ok_or_else(|| format!("unsupported platform '{}'", s.trim()))
    }
}

/// Fields of an ad-copy record that validation can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Headline,
    BodyText,
    Cta,
    Platform,
}

impl InputField {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputField::Headline => "headline",
            InputField::BodyText => "body_text",
            InputField::Cta => "cta",
            InputField::Platform => "platform",
        }
    }
}

fn default_platform() -> String {
    Platform::Facebook.as_str().to_string()
}

/// Ad copy as it arrives from the API/persistence collaborators.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdCopy {
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub body_text: String,
    #[serde(default)]
    pub cta: String,
    #[serde(default = "default_platform")]
    pub platform: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_data: Option<Value>,
}

impl AdCopy {
    pub fn new(
        headline: impl Into<String>,
        body_text: impl Into<String>,
        cta: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            headline: headline.into(),
            body_text: body_text.into(),
            cta: cta.into(),
            platform: platform.into(),
            ..Default::default()
        }
    }

    /// Reject copy whose required text fields are blank. The error names every
    /// blank field and nothing else.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let missing: Vec<String> = [
            (InputField::Headline, &self.headline),
            (InputField::BodyText, &self.body_text),
            (InputField::Cta, &self.cta),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field.as_str().to_string())
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new("ad_copy", missing))
        }
    }
}

/// A competitor's ad, scored alongside the analyzed copy for benchmarking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompetitorAd {
    #[serde(flatten)]
    pub ad: AdCopy,
    /// Where the competitor copy was found (URL, library id, ...).
    pub source: String,
}

/// Immutable per-request input shared by every tool of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolInput {
    pub headline: String,
    pub body_text: String,
    pub cta: String,
    pub platform: String,
    pub target_audience: Option<String>,
    pub industry: Option<String>,
    #[serde(default)]
    pub additional_data: Value,
    pub request_id: Uuid,
}

impl ToolInput {
    /// Build a fresh input with a new request identifier.
    pub fn new(ad: &AdCopy) -> Self {
        Self::with_request_id(ad, Uuid::new_v4())
    }

    pub fn with_request_id(ad: &AdCopy, request_id: Uuid) -> Self {
        Self {
            headline: ad.headline.clone(),
            body_text: ad.body_text.clone(),
            cta: ad.cta.clone(),
            platform: ad.platform.clone(),
            target_audience: ad.target_audience.clone(),
            industry: ad.industry.clone(),
            additional_data: ad.additional_data.clone().unwrap_or(Value::Null),
            request_id,
        }
    }

    pub fn field(&self, field: InputField) -> &str {
        match field {
            InputField::Headline => &self.headline,
            InputField::BodyText => &self.body_text,
            InputField::Cta => &self.cta,
            InputField::Platform => &self.platform,
        }
    }

    /// Headline, body and CTA joined with single spaces.
    pub fn full_text(&self) -> String {
        format!("{} {} {}", self.headline, self.body_text, self.cta)
    }

    pub fn platform(&self) -> Option<Platform> {
        self.platform.parse().ok()
    }

    /// Check that the given fields are non-blank. Used by tools to declare
    /// what they need from the input.
    pub fn require(&self, scope: &str, fields: &[InputField]) -> Result<(), ValidationError> {
        let missing: Vec<String> = fields
            .iter()
            .filter(|f| self.field(**f).trim().is_empty())
            .map(|f| f.as_str().to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(scope, missing))
        }
    }
}

// ─── Tools ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    Analyzer,
    Generator,
    Optimizer,
}

impl fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ToolCategory::Analyzer => "analyzer",
            ToolCategory::Generator => "generator",
            ToolCategory::Optimizer => "optimizer",
        };
        f.write_str(s)
    }
}

impl FromStr for ToolCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "analyzer" => Ok(ToolCategory::Analyzer),
            "generator" => Ok(ToolCategory::Generator),
            "optimizer" => Ok(ToolCategory::Optimizer),
            other => Err(format!("unknown tool category '{other}'")),
        }
    }
}

/// Name, category, time budget and tuning parameters of one tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolConfig {
    pub name: String,
    pub category: ToolCategory,
    pub timeout_ms: u64,
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
}

impl ToolConfig {
    pub fn new(name: impl Into<String>, category: ToolCategory, timeout_ms: u64) -> Self {
        Self {
            name: name.into(),
            category,
            timeout_ms,
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn param_f64(&self, key: &str, default: f64) -> f64 {
        self.parameters
            .get(key)
            .and_then(Value::as_f64)
            .unwrap_or(default)
    }

    pub fn param_bool(&self, key: &str, default: bool) -> bool {
        self.parameters
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(default)
    }
}

/// Why a tool produced no trusted scores.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Execution,
    Timeout,
    Cancelled,
    NotRegistered,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Execution => "execution",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::NotRegistered => "not_registered",
        };
        f.write_str(s)
    }
}

/// A copy variation proposed by a tool itself (e.g. brand-aligned rewrites).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolVariation {
    pub id: String,
    pub variation_type: String,
    pub headline: String,
    pub body_text: String,
    pub cta: String,
    pub focus: String,
    pub alignment_score: f64,
}

/// Result of a single tool execution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolOutput {
    pub tool_name: String,
    pub category: ToolCategory,
    pub success: bool,
    /// Score name → value in [0, 100]. Always empty when `success` is false.
    pub scores: BTreeMap<String, f64>,
    pub insights: BTreeMap<String, Value>,
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variations: Vec<ToolVariation>,
    pub execution_time_ms: f64,
    pub request_id: Uuid,
    pub confidence_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ToolOutput {
    pub fn failed(
        tool_name: impl Into<String>,
        category: ToolCategory,
        request_id: Uuid,
        kind: ErrorKind,
        message: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            category,
            success: false,
            scores: BTreeMap::new(),
            insights: BTreeMap::new(),
            recommendations: Vec::new(),
            variations: Vec::new(),
            execution_time_ms: elapsed.as_secs_f64() * 1000.0,
            request_id,
            confidence_score: 0.0,
            error_kind: Some(kind),
            error_message: Some(message.into()),
        }
    }

    /// A successful output that carries at least one score.
    pub fn is_usable(&self) -> bool {
        self.success && !self.scores.is_empty()
    }

    pub fn score(&self, key: &str) -> Option<f64> {
        if !self.success {
            return None;
        }
        self.scores.get(key).copied()
    }

    /// Unweighted mean of every score the tool reported.
    pub fn score_average(&self) -> Option<f64> {
        if !self.is_usable() {
            return None;
        }
        Some(self.scores.values().sum::<f64>() / self.scores.len() as f64)
    }

    pub fn insight(&self, key: &str) -> Option<&Value> {
        self.insights.get(key)
    }
}

// ─── Analysis result ────────────────────────────────────────────────────────

/// The five canonical dimensions of the composite score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Clarity,
    Persuasion,
    Emotion,
    CtaStrength,
    PlatformFit,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Clarity,
        Dimension::Persuasion,
        Dimension::Emotion,
        Dimension::CtaStrength,
        Dimension::PlatformFit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Clarity => "clarity",
            Dimension::Persuasion => "persuasion",
            Dimension::Emotion => "emotion",
            Dimension::CtaStrength => "cta_strength",
            Dimension::PlatformFit => "platform_fit",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite rating. A dimension is `None` when no tool feeding it succeeded.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompositeScores {
    pub overall: f64,
    pub clarity: Option<f64>,
    pub persuasion: Option<f64>,
    pub emotion: Option<f64>,
    pub cta_strength: Option<f64>,
    pub platform_fit: Option<f64>,
}

impl CompositeScores {
    pub fn get(&self, dimension: Dimension) -> Option<f64> {
        match dimension {
            Dimension::Clarity => self.clarity,
            Dimension::Persuasion => self.persuasion,
            Dimension::Emotion => self.emotion,
            Dimension::CtaStrength => self.cta_strength,
            Dimension::PlatformFit => self.platform_fit,
        }
    }

    pub fn set(&mut self, dimension: Dimension, value: Option<f64>) {
        let slot = match dimension {
            Dimension::Clarity => &mut self.clarity,
            Dimension::Persuasion => &mut self.persuasion,
            Dimension::Emotion => &mut self.emotion,
            Dimension::CtaStrength => &mut self.cta_strength,
            Dimension::PlatformFit => &mut self.platform_fit,
        };
        *slot = value;
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VariantType {
    Persuasive,
    Emotional,
    Urgency,
    PlatformOptimized,
}

/// A generated alternative to the analyzed copy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variant {
    pub variant_type: VariantType,
    pub headline: String,
    pub body_text: String,
    pub cta: String,
    pub improvement_reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompetitorScore {
    pub source: String,
    pub scores: CompositeScores,
}

/// How the analyzed copy stacks up against the supplied competitor ads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompetitorComparison {
    pub competitors: Vec<CompetitorScore>,
    pub own_overall: f64,
    pub average_competitor_overall: f64,
    /// 1-based position of the analyzed copy among itself and all competitors.
    pub rank: usize,
    pub total_ranked: usize,
    /// Own score minus the competitor average, per dimension both sides have.
    pub dimension_gaps: BTreeMap<Dimension, f64>,
    pub strongest_competitor: Option<String>,
}

/// Everything one analysis run produces. Ownership passes to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    pub id: Uuid,
    pub request_id: Uuid,
    pub scores: CompositeScores,
    pub effective_weights: BTreeMap<Dimension, f64>,
    pub missing_dimensions: Vec<Dimension>,
    pub feedback: String,
    pub alternatives: Vec<Variant>,
    pub quick_wins: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitor_comparison: Option<CompetitorComparison>,
    pub tool_outputs: Vec<ToolOutput>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_parse_is_case_insensitive() {
        assert_eq!("Facebook".parse::<Platform>(), Ok(Platform::Facebook));
        assert_eq!(" tiktok ".parse::<Platform>(), Ok(Platform::Tiktok));
        assert!("myspace".parse::<Platform>().is_err());
    }

    #[test]
    fn test_ad_copy_validation_names_exactly_missing_fields() {
        let ad = AdCopy::new("", "Body is here.", "   ", "facebook");
        let err = ad.validate().unwrap_err();
        assert_eq!(err.fields, vec!["headline".to_string(), "cta".to_string()]);

        let ok = AdCopy::new("Headline", "Body", "Buy now", "google");
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_ad_copy_defaults_platform_when_deserialized() {
        let ad: AdCopy =
            serde_json::from_str(r#"{"headline":"H","body_text":"B","cta":"C"}"#).unwrap();
        assert_eq!(ad.platform, "facebook");
        assert!(ad.target_audience.is_none());
    }

    #[test]
    fn test_competitor_ad_flattens_copy_fields() {
        let comp: CompetitorAd = serde_json::from_str(
            r#"{"headline":"H","body_text":"B","cta":"C","platform":"google","source":"https://example.com/ad"}"#,
        )
        .unwrap();
        assert_eq!(comp.ad.platform, "google");
        assert_eq!(comp.source, "https://example.com/ad");
    }

    #[test]
    fn test_tool_input_require() {
        let input = ToolInput::new(&AdCopy::new("Headline", "", "Go", "facebook"));
        assert!(input
            .require("x", &[InputField::Headline, InputField::Cta])
            .is_ok());

        let err = input
            .require("x", &[InputField::Headline, InputField::BodyText])
            .unwrap_err();
        assert_eq!(err.fields, vec!["body_text".to_string()]);
        assert_eq!(input.full_text(), "Headline  Go");
    }

    #[test]
    fn test_failed_output_has_no_scores() {
        let out = ToolOutput::failed(
            "cta_analyzer",
            ToolCategory::Analyzer,
            Uuid::new_v4(),
            ErrorKind::Timeout,
            "timed out",
            Duration::from_millis(3),
        );
        assert!(!out.success);
        assert!(!out.is_usable());
        assert!(out.score_average().is_none());
        assert!((out.execution_time_ms - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_tool_config_params() {
        let cfg = ToolConfig::new("readability_analyzer", ToolCategory::Analyzer, 10_000)
            .with_param("target_grade_level", 8)
            .with_param("strict", true);
        assert_eq!(cfg.param_f64("target_grade_level", 0.0), 8.0);
        assert!(cfg.param_bool("strict", false));
        assert_eq!(cfg.param_f64("missing", 1.5), 1.5);
        assert_eq!(cfg.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_dimension_map_keys_serialize_as_strings() {
        let mut gaps = BTreeMap::new();
        gaps.insert(Dimension::CtaStrength, 4.5);
        let json = serde_json::to_string(&gaps).unwrap();
        assert_eq!(json, r#"{"cta_strength":4.5}"#);
    }
}
