use serde::Deserialize;
use std::collections::HashMap;

use crate::error::{AdCopyError, AdCopyResult};
use crate::types::Dimension;

/// Root application configuration. Loaded from an optional TOML file and
/// environment variables with the prefix `ADCOPY_SURGE__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub alternatives: AlternativesConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

// ─── Tools ──────────────────────────────────────────────────────────────────

/// Which emotion classifier backs the emotion analyzer.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmotionStrategy {
    #[default]
    Lexicon,
    External,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolsConfig {
    /// Tools to register, in registration order.
    #[serde(default = "default_enabled_tools")]
    pub enabled: Vec<String>,
    #[serde(default)]
    pub timeout_overrides_ms: HashMap<String, u64>,
    /// Replacement for the bundled keyword tables.
    #[serde(default)]
    pub lexicon_path: Option<String>,
    #[serde(default)]
    pub brand_voice_path: Option<String>,
    #[serde(default)]
    pub emotion_strategy: EmotionStrategy,
    #[serde(default)]
    pub brand_voice: BrandVoiceDefaults,
}

/// Brand profile used when the ad copy carries none.
#[derive(Debug, Clone, Deserialize)]
pub struct BrandVoiceDefaults {
    #[serde(default = "default_primary_tone")]
    pub primary_tone: String,
    #[serde(default = "default_personality_traits")]
    pub personality_traits: Vec<String>,
}

// ─── Scoring ────────────────────────────────────────────────────────────────

/// Upper bound on quick wins surfaced per analysis.
pub const MAX_QUICK_WINS: usize = 3;

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: DimensionWeights,
    #[serde(default = "default_quick_win_limit")]
    pub quick_win_limit: usize,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct DimensionWeights {
    #[serde(default = "default_clarity_weight")]
    pub clarity: f64,
    #[serde(default = "default_persuasion_weight")]
    pub persuasion: f64,
    #[serde(default = "default_emotion_weight")]
    pub emotion: f64,
    #[serde(default = "default_cta_strength_weight")]
    pub cta_strength: f64,
    #[serde(default = "default_platform_fit_weight")]
    pub platform_fit: f64,
}

impl DimensionWeights {
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Clarity => self.clarity,
            Dimension::Persuasion => self.persuasion,
            Dimension::Emotion => self.emotion,
            Dimension::CtaStrength => self.cta_strength,
            Dimension::PlatformFit => self.platform_fit,
        }
    }

    pub fn sum(&self) -> f64 {
        Dimension::ALL.iter().map(|d| self.get(*d)).sum()
    }
}

// ─── Alternatives / pipeline ────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct AlternativesConfig {
    #[serde(default = "default_include_emojis")]
    pub include_emojis: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_max_competitors")]
    pub max_competitors: usize,
}

// Default functions
fn default_enabled_tools() -> Vec<String> {
    [
        "readability_analyzer",
        "persuasion_analyzer",
        "emotion_analyzer",
        "cta_analyzer",
        "platform_fit_analyzer",
        "brand_voice_engine",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
fn default_primary_tone() -> String {
    "professional".to_string()
}
fn default_personality_traits() -> Vec<String> {
    vec![
        "confident".to_string(),
        "trustworthy".to_string(),
        "ambitious".to_string(),
    ]
}
fn default_quick_win_limit() -> usize {
    MAX_QUICK_WINS
}
fn default_clarity_weight() -> f64 {
    0.20
}
fn default_persuasion_weight() -> f64 {
    0.25
}
fn default_emotion_weight() -> f64 {
    0.20
}
fn default_cta_strength_weight() -> f64 {
    0.25
}
fn default_platform_fit_weight() -> f64 {
    0.10
}
fn default_include_emojis() -> bool {
    true
}
fn default_max_competitors() -> usize {
    5
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled_tools(),
            timeout_overrides_ms: HashMap::new(),
            lexicon_path: None,
            brand_voice_path: None,
            emotion_strategy: EmotionStrategy::default(),
            brand_voice: BrandVoiceDefaults::default(),
        }
    }
}

impl Default for BrandVoiceDefaults {
    fn default() -> Self {
        Self {
            primary_tone: default_primary_tone(),
            personality_traits: default_personality_traits(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: DimensionWeights::default(),
            quick_win_limit: default_quick_win_limit(),
        }
    }
}

impl Default for DimensionWeights {
    fn default() -> Self {
        Self {
            clarity: default_clarity_weight(),
            persuasion: default_persuasion_weight(),
            emotion: default_emotion_weight(),
            cta_strength: default_cta_strength_weight(),
            platform_fit: default_platform_fit_weight(),
        }
    }
}

impl Default for AlternativesConfig {
    fn default() -> Self {
        Self {
            include_emojis: default_include_emojis(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_competitors: default_max_competitors(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional config file and environment
    /// variables. An explicit `path` must exist; otherwise `adcopy-surge.toml`
    /// in the working directory is read if present.
    pub fn load(path: Option<&str>) -> AdCopyResult<Self> {
        let file = match path {
            Some(p) => config::File::with_name(p).required(true),
            None => config::File::with_name("adcopy-surge").required(false),
        };

        let builder = config::Config::builder().add_source(file).add_source(
            config::Environment::with_prefix("ADCOPY_SURGE")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("tools.enabled")
                .with_list_parse_key("tools.brand_voice.personality_traits"),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AdCopyResult<()> {
        let sum = self.scoring.weights.sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(AdCopyError::Config(format!(
                "scoring.weights must sum to 1.0, got {sum:.6}"
            )));
        }
        if Dimension::ALL
            .iter()
            .any(|d| self.scoring.weights.get(*d) < 0.0)
        {
            return Err(AdCopyError::Config(
                "scoring.weights must not be negative".to_string(),
            ));
        }
        if !(1..=MAX_QUICK_WINS).contains(&self.scoring.quick_win_limit) {
            return Err(AdCopyError::Config(format!(
                "scoring.quick_win_limit must be between 1 and {MAX_QUICK_WINS}, got {}",
                self.scoring.quick_win_limit
            )));
        }
        if self.tools.enabled.is_empty() {
            return Err(AdCopyError::Config(
                "tools.enabled must name at least one tool".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tools.enabled.len(), 6);
        assert_eq!(config.tools.emotion_strategy, EmotionStrategy::Lexicon);
        assert!((config.scoring.weights.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let mut config = AppConfig::default();
        config.scoring.weights.platform_fit = 0.3;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sum to 1.0"));
    }

    #[test]
    fn test_zero_quick_win_limit_rejected() {
        let mut config = AppConfig::default();
        config.scoring.quick_win_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_quick_win_limit_above_max_rejected() {
        let mut config = AppConfig::default();
        config.scoring.quick_win_limit = 10;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("quick_win_limit"));

        config.scoring.quick_win_limit = MAX_QUICK_WINS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{"scoring":{"weights":{"clarity":0.3,"persuasion":0.15}},"tools":{"emotion_strategy":"external"}}"#,
        )
        .unwrap();
        assert_eq!(config.scoring.weights.clarity, 0.3);
        assert_eq!(config.scoring.weights.emotion, 0.20);
        assert_eq!(config.scoring.quick_win_limit, 3);
        assert_eq!(config.tools.emotion_strategy, EmotionStrategy::External);
        assert_eq!(config.tools.brand_voice.primary_tone, "professional");
        assert_eq!(config.pipeline.max_competitors, 5);
    }
}
