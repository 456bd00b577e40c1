use adcopy_core::error::{ToolError, ValidationError};
use adcopy_core::types::{InputField, Platform, ToolCategory, ToolConfig, ToolInput};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use crate::lexicon::{Lexicon, PlatformProfile};
use crate::text::{self, Normalized};
use crate::tool::{Tool, ToolReport};

pub const NAME: &str = "platform_fit_analyzer";
const SCORES: &[&str] = &["platform_fit_score"];

pub fn default_config() -> ToolConfig {
    ToolConfig::new(NAME, ToolCategory::Analyzer, 5_000)
}

/// Checks headline/body length and vocabulary against the platform profile.
///
/// Base 60, +10 for each passed check (headline length, headline word range,
/// body length, preferred vocabulary), −10 for each field over its character
/// limit.
pub struct PlatformFitAnalyzer {
    config: ToolConfig,
    lexicon: Arc<Lexicon>,
}

impl PlatformFitAnalyzer {
    pub fn new(config: ToolConfig, lexicon: Arc<Lexicon>) -> Self {
        Self { config, lexicon }
    }

    fn profile(&self, input: &ToolInput) -> Option<&PlatformProfile> {
        input.platform().and_then(|p| self.lexicon.platform(p))
    }
}

#[async_trait]
impl Tool for PlatformFitAnalyzer {
    fn config(&self) -> &ToolConfig {
        &self.config
    }

    fn output_score_names(&self) -> &'static [&'static str] {
        SCORES
    }

    fn validate_input(&self, input: &ToolInput) -> Result<(), ValidationError> {
        input.require(
            NAME,
            &[InputField::Headline, InputField::BodyText, InputField::Platform],
        )?;
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
        let platform = profile.platform;

        let headline_chars = input.headline.trim().chars().count();
        let headline_words = text::words(&input.headline).len();
        let body_chars = input.body_text.trim().chars().count();
        let preferred_found =
            Normalized::new(&input.full_text()).find(&profile.preferred_words);

        let headline_over = headline_chars > profile.headline_max_chars;
        let body_over = body_chars > profile.body_max_chars;
        let words_in_range = (profile.headline_words_min..=profile.headline_words_max)
            .contains(&headline_words);

        let passed = [!headline_over, words_in_range, !body_over, !preferred_found.is_empty()]
            .iter()
            .filter(|ok| **ok)
            .count();
        let overages = [headline_over, body_over].iter().filter(|o| **o).count();
        let score = text::clamp_score(60.0 + 10.0 * passed as f64 - 10.0 * overages as f64);

        let mut recommendations = Vec::new();
        if headline_over {
            recommendations.push(format!(
                "Shorten the headline to {} characters or fewer for {} (currently {})",
                profile.headline_max_chars, platform, headline_chars
            ));
        }
        if !words_in_range {
            recommendations.push(format!(
                "Aim for {}-{} words in the headline on {}",
                profile.headline_words_min, profile.headline_words_max, platform
            ));
        }
        if body_over {
            recommendations.push(format!(
                "Trim the body text to {} characters for {} (currently {})",
                profile.body_max_chars, platform, body_chars
            ));
        }
        if preferred_found.is_empty() {
            let examples: Vec<String> = profile
                .preferred_words
                .iter()
                .take(2)
                .map(|w| format!("'{w}'"))
                .collect();
            recommendations.push(format!(
                "Work in vocabulary that performs well on {}, such as {}",
                platform,
                examples.join(" or ")
            ));
        }

        let confidence = if body_chars >= 20 { 90.0 } else { 80.0 };

        Ok(ToolReport::new(confidence)
            .score("platform_fit_score", score)
            .insight("platform", platform.as_str())
            .insight("headline_chars", headline_chars)
            .insight("headline_max_chars", profile.headline_max_chars)
            .insight("headline_over_limit", headline_over)
            .insight("headline_words", headline_words)
            .insight(
                "headline_word_range",
                json!([profile.headline_words_min, profile.headline_words_max]),
            )
            .insight("body_chars", body_chars)
            .insight("body_max_chars", profile.body_max_chars)
            .insight("body_over_limit", body_over)
            .insight("preferred_words_found", json!(preferred_found))
            .insight("emoji_friendly", profile.emoji_friendly)
            .recommendations(recommendations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adcopy_core::types::AdCopy;

    fn run(headline: &str, body: &str, platform: &str) -> adcopy_core::types::ToolOutput {
        let tool = PlatformFitAnalyzer::new(default_config(), Lexicon::bundled().unwrap());
        let input = ToolInput::new(&AdCopy::new(headline, body, "Try now", platform));
        futures::executor::block_on(tool.run(&input))
    }

    #[test]
    fn test_facebook_fit() {
        let out = run("Fast and Easy", "Our tool saves you time.", "facebook");
        assert_eq!(out.score("platform_fit_score"), Some(100.0));
        assert!(out.recommendations.is_empty());
        assert_eq!(out.insight("emoji_friendly"), Some(&json!(true)));
    }

    #[test]
    fn test_google_overlong_headline() {
        let out = run(
            "The Most Complete Accounting Suite For Growing Businesses",
            "Save hours every week.",
            "google",
        );
        // headline over 30 chars and over 6 words; body fits; "save" preferred
        assert_eq!(out.score("platform_fit_score"), Some(70.0));
        assert_eq!(out.insight("headline_over_limit"), Some(&json!(true)));
        assert_eq!(out.recommendations.len(), 2);
    }

    #[test]
    fn test_unsupported_platform_rejected() {
        let tool = PlatformFitAnalyzer::new(default_config(), Lexicon::bundled().unwrap());
        let input = ToolInput::new(&AdCopy::new("H", "B", "C", "friendster"));
        let err = tool.validate_input(&input).unwrap_err();
        assert_eq!(err.fields, vec!["platform".to_string()]);
    }
}
