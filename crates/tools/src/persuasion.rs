use adcopy_core::error::{ToolError, ValidationError};
use adcopy_core::types::{InputField, ToolCategory, ToolConfig, ToolInput};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use crate::lexicon::Lexicon;
use crate::text::{self, Normalized};
use crate::tool::{Tool, ToolReport};

pub const NAME: &str = "persuasion_analyzer";
const SCORES: &[&str] = &["persuasion_score"];

pub fn default_config() -> ToolConfig {
    ToolConfig::new(NAME, ToolCategory::Analyzer, 5_000).with_param("reader_focus_ratio", 0.05)
}

/// Benefits, social proof, specificity and reader focus.
pub struct PersuasionAnalyzer {
    config: ToolConfig,
    lexicon: Arc<Lexicon>,
}

impl PersuasionAnalyzer {
    pub fn new(config: ToolConfig, lexicon: Arc<Lexicon>) -> Self {
        Self { config, lexicon }
    }
}

#[async_trait]
impl Tool for PersuasionAnalyzer {
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
        let normalized = Normalized::new(&full_text);
        if normalized.word_count() == 0 {
            return Err(ToolError::Execution("copy contains no words".to_string()));
        }
        let table = &self.lexicon.persuasion;

        let benefits = normalized.find(&table.benefit_words);
        let social_proof = normalized.find(&table.social_proof_phrases);
        let specific = text::has_digits(&full_text);
        let reader_mentions: usize = table.reader_words.iter().map(|w| normalized.count(w)).sum();
        let reader_ratio = reader_mentions as f64 / normalized.word_count() as f64;
        let focus_threshold = self.config.param_f64("reader_focus_ratio", 0.05);

        let reader_bonus = if reader_mentions > 0 && reader_ratio >= focus_threshold {
            10.0
        } else if reader_mentions > 0 {
            5.0
        } else {
            0.0
        };
        let specificity_bonus = if specific { 15.0 } else { 0.0 };
        let score = 25.0
            + (10.0 * benefits.len() as f64).min(30.0)
            + (12.5 * social_proof.len() as f64).min(25.0)
            + specificity_bonus
            + reader_bonus;

        let mut recommendations = Vec::new();
        if benefits.is_empty() {
            recommendations.push("Spell out a concrete benefit the reader gets".to_string());
        }
        if social_proof.is_empty() {
            recommendations.push(
                "Add social proof such as customer counts, ratings, or testimonials".to_string(),
            );
        }
        if !specific {
            recommendations
                .push("Use specific numbers or percentages to make claims credible".to_string());
        }
        if reader_mentions == 0 {
            recommendations.push("Address the reader directly with 'you' and 'your'".to_string());
        }

        let confidence = match normalized.word_count() {
            n if n >= 15 => 90.0,
            n if n >= 8 => 80.0,
            _ => 70.0,
        };

        Ok(ToolReport::new(confidence)
            .score("persuasion_score", text::round1(text::clamp_score(score)))
            .insight("benefit_words_found", json!(benefits))
            .insight("social_proof_found", json!(social_proof))
            .insight("has_specifics", specific)
            .insight("reader_focus_ratio", text::round1(reader_ratio * 100.0) / 100.0)
            .insight("has_social_proof", !social_proof.is_empty())
            .recommendations(recommendations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adcopy_core::types::AdCopy;

    fn analyze(headline: &str, body: &str, cta: &str) -> adcopy_core::types::ToolOutput {
        let tool = PersuasionAnalyzer::new(default_config(), Lexicon::bundled().unwrap());
        let input = ToolInput::new(&AdCopy::new(headline, body, cta, "facebook"));
        futures::executor::block_on(tool.run(&input))
    }

    #[test]
    fn test_benefits_with_reader_focus() {
        let out = analyze("Fast and Easy", "Our tool saves you time.", "Try now");
        // 25 base + 20 benefits ("easy", "saves") + 10 reader focus
        assert_eq!(out.score("persuasion_score"), Some(55.0));
        assert_eq!(out.insight("has_specifics"), Some(&json!(false)));
        assert_eq!(out.recommendations.len(), 2);
    }

    #[test]
    fn test_rich_copy_scores_high_and_is_capped() {
        let out = analyze(
            "Join thousands of happy customers",
            "Trusted by 10,000 teams: save time, boost results, grow faster. Rated 4.9 in reviews.",
            "Start your free trial",
        );
        let score = out.score("persuasion_score").unwrap();
        assert!(score >= 90.0, "score {score}");
        assert!(score <= 100.0);
        assert!(out.recommendations.is_empty());
        assert_eq!(out.confidence_score, 90.0);
    }

    #[test]
    fn test_flat_copy_gets_every_recommendation() {
        let out = analyze("Widgets", "We sell widgets.", "Shop");
        assert_eq!(out.score("persuasion_score"), Some(25.0));
        assert_eq!(out.recommendations.len(), 4);
        assert_eq!(out.confidence_score, 70.0);
    }
}
