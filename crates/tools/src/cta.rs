//! Call-to-action strength and per-platform fit.

use adcopy_core::error::{ToolError, ValidationError};
use adcopy_core::types::{InputField, Platform, ToolCategory, ToolConfig, ToolInput};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use crate::lexicon::{Lexicon, PlatformProfile};
use crate::text::{self, Normalized};
use crate::tool::{Tool, ToolReport};

pub const NAME: &str = "cta_analyzer";
const SCORES: &[&str] = &["cta_strength", "platform_fit"];

pub fn default_config() -> ToolConfig {
    ToolConfig::new(NAME, ToolCategory::Analyzer, 5_000).with_param("min_strength_threshold", 70)
}

pub struct CtaAnalyzer {
    config: ToolConfig,
    lexicon: Arc<Lexicon>,
}

impl CtaAnalyzer {
    pub fn new(config: ToolConfig, lexicon: Arc<Lexicon>) -> Self {
        Self { config, lexicon }
    }

    fn profile(&self, input: &ToolInput) -> Option<&PlatformProfile> {
        input.platform().and_then(|p| self.lexicon.platform(p))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VerbPosition {
    Leading,
    Embedded,
    Missing,
}

impl VerbPosition {
    fn as_str(&self) -> &'static str {
        match self {
            VerbPosition::Leading => "leading",
            VerbPosition::Embedded => "embedded",
            VerbPosition::Missing => "none",
        }
    }
}

/// excellent / strong / good / fair / weak at 90 / 80 / 70 / 60.
pub fn strength_category(score: f64) -> &'static str {
    if score >= 90.0 {
        "excellent"
    } else if score >= 80.0 {
        "strong"
    } else if score >= 70.0 {
        "good"
    } else if score >= 60.0 {
        "fair"
    } else {
        "weak"
    }
}

fn length_adjustment(words: usize) -> f64 {
    match words {
        2..=5 => 10.0,
        0 | 1 => 0.0,
        6 | 7 => -5.0,
        _ => -15.0,
    }
}

#[async_trait]
impl Tool for CtaAnalyzer {
    fn config(&self) -> &ToolConfig {
        &self.config
    }

    fn output_score_names(&self) -> &'static [&'static str] {
        SCORES
    }

    fn validate_input(&self, input: &ToolInput) -> Result<(), ValidationError> {
        input.require(NAME, &[InputField::Cta, InputField::Platform])?;
        if self.profile(input).is_none() {
            let supported: Vec<&str> = Platform::ALL.iter().map(|p| p.as_str()).collect();
            return Err(ValidationError::new(NAME, vec!["platform".to_string()]).with_detail(
                format!(
                    "unsupported platform '{}', expected one of {}",
                    input.platform,
                    supported.join(", ")
                ),
            ));
        }
        Ok(())
    }

    async fn analyze(&self, input: &ToolInput) -> Result<ToolReport, ToolError> {
        let profile = self.profile(input).ok_or_else(|| {
            ToolError::Execution(format!("no platform profile for '{}'", input.platform))
        })?;
        let table = &self.lexicon.cta;
        let cta = Normalized::new(&input.cta);
        let word_count = cta.word_count();
        if word_count == 0 {
            return Err(ToolError::Execution("CTA contains no words".to_string()));
        }

        let leading = cta
            .first_word()
            .map_or(false, |w| table.action_verbs.iter().any(|v| v == w));
        let verb_position = if leading {
            VerbPosition::Leading
        } else if !cta.find(&table.action_verbs).is_empty() {
            VerbPosition::Embedded
        } else {
            VerbPosition::Missing
        };
        let has_urgency = !cta.find(&table.urgency_words).is_empty();
        let has_value = !cta.find(&table.value_words).is_empty();

        let verb_points = match verb_position {
            VerbPosition::Leading => 30.0,
            VerbPosition::Embedded => 20.0,
            VerbPosition::Missing => 0.0,
        };
        let urgency_points = if has_urgency { 15.0 } else { 0.0 };
        let value_points = if has_value { 10.0 } else { 0.0 };
        let strength = text::clamp_score(
            40.0 + verb_points + urgency_points + value_points + length_adjustment(word_count),
        );

        let over_budget = word_count.saturating_sub(profile.cta_max_words);
        let mut fit = 100.0 - 15.0 * over_budget as f64;
        if profile.cta_prefers_urgency && !has_urgency {
            fit -= 10.0;
        }
        let fit = text::clamp_score(fit);

        let threshold = self.config.param_f64("min_strength_threshold", 70.0);
        let mut recommendations = Vec::new();
        match verb_position {
            VerbPosition::Missing => recommendations.push(
                "Start the CTA with a strong action verb like 'Get', 'Start', or 'Try'".to_string(),
            ),
            VerbPosition::Embedded => recommendations
                .push("Move the action verb to the start of the CTA".to_string()),
            VerbPosition::Leading => {}
        }
        if !has_urgency {
            recommendations
                .push("Add urgency ('now', 'today') to prompt immediate action".to_string());
        }
        if word_count > 5 {
            recommendations.push("Shorten the CTA to five words or fewer".to_string());
        }
        if !has_value {
            recommendations
                .push("Reinforce value with words like 'free' or 'exclusive'".to_string());
        }
        if strength < threshold {
            recommendations.push(
                "CTA strength is below optimal - consider stronger action words".to_string(),
            );
        }
        if fit < 80.0 {
            recommendations.push(format!(
                "CTA could be better optimized for {} platform",
                profile.platform
            ));
        }

        let has_verb = verb_position != VerbPosition::Missing;
        let confidence = if has_verb && strength > 70.0 {
            95.0
        } else if has_verb || strength > 50.0 {
            85.0
        } else {
            75.0
        };

        Ok(ToolReport::new(confidence)
            .score("cta_strength", strength)
            .score("platform_fit", fit)
            .insight("word_count", word_count)
            .insight("has_action_verb", has_verb)
            .insight("action_verb_position", verb_position.as_str())
            .insight("has_urgency", has_urgency)
            .insight("has_value_word", has_value)
            .insight("cta_category", strength_category(strength))
            .insight(
                "platform_analysis",
                json!({
                    "platform": profile.platform,
                    "fit_score": fit,
                    "max_words": profile.cta_max_words,
                    "platform_specific_tips": profile.tips,
                }),
            )
            .recommendations(recommendations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adcopy_core::types::AdCopy;

    fn analyzer() -> CtaAnalyzer {
        CtaAnalyzer::new(default_config(), Lexicon::bundled().unwrap())
    }

    fn input(cta: &str, platform: &str) -> ToolInput {
        ToolInput::new(&AdCopy::new("Headline", "Body copy.", cta, platform))
    }

    #[tokio::test]
    async fn test_leading_verb_with_urgency() {
        let out = analyzer().run(&input("Try now", "facebook")).await;
        // 40 + 30 leading + 15 urgency + 10 length
        assert_eq!(out.score("cta_strength"), Some(95.0));
        assert_eq!(out.score("platform_fit"), Some(100.0));
        assert_eq!(out.insight("cta_category"), Some(&json!("excellent")));
        assert_eq!(out.confidence_score, 95.0);
    }

    #[tokio::test]
    async fn test_weak_long_cta_on_tiktok() {
        let out = analyzer()
            .run(&input(
                "Our company would like you to consider us for your needs",
                "tiktok",
            ))
            .await;
        let strength = out.score("cta_strength").unwrap();
        assert_eq!(strength, 25.0);
        assert_eq!(strength_category(strength), "weak");
        // 11 words against a 3-word budget, no urgency
        assert_eq!(out.score("platform_fit"), Some(0.0));
        assert!(out
            .recommendations
            .iter()
            .any(|r| r == "CTA could be better optimized for tiktok platform"));
        assert_eq!(out.confidence_score, 75.0);
    }

    #[tokio::test]
    async fn test_embedded_verb() {
        let out = analyzer()
            .run(&input("Free trial: start today", "google"))
            .await;
        assert_eq!(out.insight("action_verb_position"), Some(&json!("embedded")));
        // 40 + 20 + 15 + 10 value + 10 length
        assert_eq!(out.score("cta_strength"), Some(95.0));
    }

    #[test]
    fn test_only_cta_and_platform_required() {
        let tool = analyzer();
        let ok = ToolInput::new(&AdCopy::new("", "", "Shop now", "instagram"));
        assert!(tool.validate_input(&ok).is_ok());

        let err = tool.validate_input(&input("Shop now", "myspace")).unwrap_err();
        assert_eq!(err.fields, vec!["platform".to_string()]);
        assert!(err.to_string().contains("unsupported platform"));

        let err = tool.validate_input(&input(" ", "")).unwrap_err();
        assert_eq!(err.fields, vec!["cta".to_string(), "platform".to_string()]);
    }
}
