//! Emotional tone, backed by an interchangeable classifier strategy.
//!
//! The built-in [`LexiconEmotionClassifier`] needs no external resources. A
//! deployment can inject any other [`EmotionClassifier`] (e.g. a model
//! server client); when it errors the tool falls back to the lexicon unless
//! `fallback_on_classifier_error` is off.

use adcopy_core::error::{ToolError, ValidationError};
use adcopy_core::types::{InputField, ToolCategory, ToolConfig, ToolInput};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::warn;

use crate::lexicon::Lexicon;
use crate::text::{self, Normalized};
use crate::tool::{Tool, ToolReport};

pub const NAME: &str = "emotion_analyzer";
const SCORES: &[&str] = &["emotion_score"];

pub fn default_config() -> ToolConfig {
    ToolConfig::new(NAME, ToolCategory::Analyzer, 15_000)
        .with_param("fallback_on_classifier_error", true)
}

/// Top label of a classifier with its confidence in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionPrediction {
    pub label: String,
    pub score: f64,
}

#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    /// Classifier name for logs and insights.
    fn name(&self) -> &str;

    async fn classify(&self, text: &str) -> Result<EmotionPrediction, ToolError>;
}

/// Picks the emotion category with the most keyword hits.
pub struct LexiconEmotionClassifier {
    lexicon: Arc<Lexicon>,
}

impl LexiconEmotionClassifier {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    fn predict(&self, text: &str) -> EmotionPrediction {
        let normalized = Normalized::new(text);
        let mut best: Option<(&str, usize)> = None;
        for category in &self.lexicon.emotion_categories {
            let hits = normalized.find(&category.words).len();
            if hits > 0 && best.map_or(true, |(_, n)| hits > n) {
                best = Some((&category.name, hits));
            }
        }

        match best {
            Some((label, hits)) => EmotionPrediction {
                label: label.to_string(),
                score: 0.6 + 0.1 * hits.min(3) as f64,
            },
            None => EmotionPrediction {
                label: "neutral".to_string(),
                score: 0.5,
            },
        }
    }
}

#[async_trait]
impl EmotionClassifier for LexiconEmotionClassifier {
    fn name(&self) -> &str {
        "lexicon"
    }

    async fn classify(&self, text: &str) -> Result<EmotionPrediction, ToolError> {
        Ok(self.predict(text))
    }
}

pub struct EmotionAnalyzer {
    config: ToolConfig,
    lexicon: Arc<Lexicon>,
    classifier: Arc<dyn EmotionClassifier>,
    fallback: LexiconEmotionClassifier,
}

impl EmotionAnalyzer {
    pub fn new(
        config: ToolConfig,
        lexicon: Arc<Lexicon>,
        classifier: Arc<dyn EmotionClassifier>,
    ) -> Self {
        Self {
            config,
            fallback: LexiconEmotionClassifier::new(lexicon.clone()),
            lexicon,
            classifier,
        }
    }

    /// Analyzer backed by the built-in lexicon classifier.
    pub fn with_lexicon(config: ToolConfig, lexicon: Arc<Lexicon>) -> Self {
        let classifier = Arc::new(LexiconEmotionClassifier::new(lexicon.clone()));
        Self::new(config, lexicon, classifier)
    }
}

/// min(100, 25 × (exclamation marks + all-caps words))
pub fn emotional_intensity(text: &str) -> f64 {
    let indicators = text.matches('!').count() + text::caps_words(text);
    (25.0 * indicators as f64).min(100.0)
}

#[async_trait]
impl Tool for EmotionAnalyzer {
    fn config(&self) -> &ToolConfig {
        &self.config
    }

    fn output_score_names(&self) -> &'static [&'static str] {
        SCORES
    }

    fn validate_input(&self, input: &ToolInput) -> Result<(), ValidationError> {
        input.require(
            NAME,
            &[InputField::Headline, InputField::BodyText, InputField::Cta],
        )
    }

    async fn analyze(&self, input: &ToolInput) -> Result<ToolReport, ToolError> {
        let full_text = input.full_text();

        let (prediction, classifier_name, fell_back) =
            match self.classifier.classify(&full_text).await {
                Ok(p) => (p, self.classifier.name().to_string(), false),
                Err(e) if self.config.param_bool("fallback_on_classifier_error", true) => {
                    warn!(
                        classifier = %self.classifier.name(),
                        error = %e,
                        "Emotion classifier failed, using lexicon fallback"
                    );
                    (self.fallback.predict(&full_text), "lexicon".to_string(), true)
                }
                Err(e) => return Err(e),
            };
        let confidence = if prediction.score.is_finite() {
            prediction.score.clamp(0.0, 1.0)
        } else {
            0.0
        };

        let normalized = Normalized::new(&full_text);
        let mut breakdown = Map::new();
        let mut total_hits = 0;
        let mut urgency_hits = 0;
        let mut trust_hits = 0;
        for category in &self.lexicon.emotion_categories {
            let found = normalized.find(&category.words);
            total_hits += found.len();
            match category.name.as_str() {
                "urgency" => urgency_hits = found.len(),
                "trust" => trust_hits = found.len(),
                _ => {}
            }
            breakdown.insert(
                category.name.clone(),
                json!({
                    "count": found.len(),
                    "words": found,
                    "score": (20 * found.len()).min(100),
                }),
            );
        }

        let intensity = emotional_intensity(&full_text);
        let mut score = 50.0;
        if !self.lexicon.is_negative_emotion(&prediction.label) {
            score += confidence * 30.0;
        }
        score += (5.0 * total_hits as f64).min(30.0);
        score += (0.2 * intensity).min(20.0);

        let mut recommendations = Vec::new();
        if total_hits == 0 {
            recommendations.push(
                "Add emotional trigger words to create connection with your audience".to_string(),
            );
        }
        if urgency_hits == 0 {
            recommendations.push(
                "Add urgency words like 'now', 'limited time', or 'today' to drive action"
                    .to_string(),
            );
        }
        if trust_hits == 0 {
            recommendations.push(
                "Include trust indicators like 'proven', 'guaranteed', or 'trusted'".to_string(),
            );
        }
        recommendations.push("Consider A/B testing emotional vs. rational approaches".to_string());

        Ok(ToolReport::new(60.0 + 35.0 * confidence)
            .score("emotion_score", text::round1(text::clamp_score(score)))
            .insight("primary_emotion", prediction.label.clone())
            .insight("emotion_confidence", text::round1(confidence * 100.0) / 100.0)
            .insight("emotion_breakdown", Value::Object(breakdown))
            .insight("emotional_intensity", intensity)
            .insight("has_urgency", urgency_hits > 0)
            .insight("has_trust", trust_hits > 0)
            .insight("classifier", classifier_name)
            .insight("classifier_fallback", fell_back)
            .recommendations(recommendations))
    }
}
