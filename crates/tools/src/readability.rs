//! Readability: Flesch reading ease, Flesch–Kincaid grade, and power words.

use adcopy_core::error::{ToolError, ValidationError};
use adcopy_core::types::{InputField, ToolCategory, ToolConfig, ToolInput};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use crate::lexicon::Lexicon;
use crate::text::{self, Normalized};
use crate::tool::{Tool, ToolReport};

pub const NAME: &str = "readability_analyzer";
const SCORES: &[&str] = &["clarity_score", "flesch_reading_ease", "power_score"];

/// Sentences longer than this many words count against clarity.
const LONG_SENTENCE_WORDS: usize = 20;

pub fn default_config() -> ToolConfig {
    ToolConfig::new(NAME, ToolCategory::Analyzer, 10_000)
        .with_param("target_grade_level", 8)
        .with_param("min_text_length", 5)
}

pub struct ReadabilityAnalyzer {
    config: ToolConfig,
    lexicon: Arc<Lexicon>,
}

impl ReadabilityAnalyzer {
    pub fn new(config: ToolConfig, lexicon: Arc<Lexicon>) -> Self {
        Self { config, lexicon }
    }
}

/// Raw text statistics behind the readability formulas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStats {
    pub words: usize,
    pub sentences: usize,
    pub syllables: usize,
    pub long_sentences: usize,
}

impl TextStats {
    /// Sentences are counted per copy section: a headline or CTA without
    /// terminal punctuation is still its own sentence.
    pub fn from_sections(sections: &[&str]) -> Self {
        let mut stats = TextStats {
            words: 0,
            sentences: 0,
            syllables: 0,
            long_sentences: 0,
        };
        for section in sections {
            for sentence in text::sentences(section) {
                let words = text::words(sentence);
                stats.sentences += 1;
                stats.words += words.len();
                stats.syllables += words.iter().map(|w| text::syllables(w)).sum::<usize>();
                if words.len() > LONG_SENTENCE_WORDS {
                    stats.long_sentences += 1;
                }
            }
        }
        stats
    }

    pub fn words_per_sentence(&self) -> f64 {
        self.words as f64 / self.sentences.max(1) as f64
    }

    pub fn syllables_per_word(&self) -> f64 {
        self.syllables as f64 / self.words.max(1) as f64
    }

    pub fn flesch_reading_ease(&self) -> f64 {
        let raw = 206.835 - 1.015 * self.words_per_sentence() - 84.6 * self.syllables_per_word();
        text::clamp_score(raw)
    }

    pub fn grade_level(&self) -> f64 {
        (0.39 * self.words_per_sentence() + 11.8 * self.syllables_per_word() - 15.59).max(0.0)
    }
}

fn power_score(count: usize) -> f64 {
    match count {
        0 => 30.0,
        1 => 50.0,
        2 => 70.0,
        3 => 85.0,
        4 => 95.0,
        n => (95.0 - 5.0 * (n as f64 - 4.0)).max(60.0),
    }
}

fn confidence(word_count: usize) -> f64 {
    match word_count {
        n if n >= 20 => 95.0,
        n if n >= 10 => 85.0,
        n if n >= 5 => 75.0,
        _ => 65.0,
    }
}

#[async_trait]
impl Tool for ReadabilityAnalyzer {
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
        let stats = TextStats::from_sections(&[&input.headline, &input.body_text, &input.cta]);
        if stats.words == 0 {
            return Err(ToolError::Execution("copy contains no words".to_string()));
        }

        let target_grade = self.config.param_f64("target_grade_level", 8.0);
        let flesch = stats.flesch_reading_ease();
        let grade = stats.grade_level();
        let grade_fit = text::clamp_score(100.0 - 12.0 * (grade - target_grade).max(0.0));
        let long_penalty = (5.0 * stats.long_sentences as f64).min(20.0);
        let clarity = text::clamp_score(0.6 * flesch + 0.4 * grade_fit - long_penalty);

        let normalized = Normalized::new(&input.full_text());
        let power_found = normalized.find(&self.lexicon.power_words);
        let power_count = power_found.len();
        let density = power_count as f64 / stats.words as f64 * 100.0;

        let mut recommendations = Vec::new();
        if grade > target_grade + 2.0 {
            recommendations.push(format!(
                "Simplify wording: reading grade {:.1} is above the target of {}",
                grade, target_grade
            ));
        }
        if stats.long_sentences > 0 {
            recommendations.push(format!(
                "Break up sentences longer than {LONG_SENTENCE_WORDS} words"
            ));
        }
        if flesch < 60.0 {
            recommendations.push(
                "Use shorter words and sentences to improve readability".to_string(),
            );
        }
        if power_count < 2 {
            recommendations
                .push("Consider adding more power words to increase impact".to_string());
        } else if power_count > 4 {
            recommendations.push(
                "Too many power words may reduce credibility - consider reducing".to_string(),
            );
        }

        Ok(ToolReport::new(confidence(stats.words))
            .score("clarity_score", text::round1(clarity))
            .score("flesch_reading_ease", text::round1(flesch))
            .score("power_score", power_score(power_count))
            .insight("grade_level", text::round1(grade))
            .insight("word_count", stats.words)
            .insight("sentence_count", stats.sentences)
            .insight(
                "avg_words_per_sentence",
                text::round1(stats.words_per_sentence()),
            )
            .insight("long_sentence_count", stats.long_sentences)
            .insight("power_words_found", json!(power_found))
            .insight("power_word_density", text::round1(density))
            .recommendations(recommendations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adcopy_core::types::AdCopy;

    fn analyzer() -> ReadabilityAnalyzer {
        ReadabilityAnalyzer::new(default_config(), Lexicon::bundled().unwrap())
    }

    fn input(headline: &str, body: &str, cta: &str) -> ToolInput {
        ToolInput::new(&AdCopy::new(headline, body, cta, "facebook"))
    }

    #[test]
    fn test_text_stats_count_sections_as_sentences() {
        let stats = TextStats::from_sections(&["Fast and Easy", "Our tool saves you time.", "Try now"]);
        assert_eq!(stats.words, 10);
        assert_eq!(stats.sentences, 3);
        assert_eq!(stats.long_sentences, 0);
    }

    #[test]
    fn test_power_score_table() {
        assert_eq!(power_score(0), 30.0);
        assert_eq!(power_score(2), 70.0);
        assert_eq!(power_score(4), 95.0);
        assert_eq!(power_score(6), 85.0);
        assert_eq!(power_score(20), 60.0);
    }

    #[tokio::test]
    async fn test_simple_copy_reads_clearly() {
        let out = analyzer()
            .run(&input("Fast and Easy", "Our tool saves you time.", "Try now"))
            .await;
        assert!(out.success, "{:?}", out.error_message);
        let clarity = out.score("clarity_score").unwrap();
        assert!(clarity > 70.0, "clarity {clarity}");
        assert_eq!(out.score("power_score"), Some(70.0));
        assert_eq!(out.confidence_score, 85.0);
        assert_eq!(out.insight("word_count"), Some(&json!(10)));
    }

    #[tokio::test]
    async fn test_dense_copy_gets_recommendations() {
        let body = "Our comprehensive organizational transformation methodology \
                    systematically operationalizes interdepartmental communication \
                    infrastructure improvements across multinational enterprises \
                    facilitating unprecedented institutional accountability and \
                    measurable organizational effectiveness initiatives everywhere";
        let out = analyzer()
            .run(&input("Enterprise Transformation", body, "Learn more"))
            .await;
        assert!(out.success);
        assert!(out.score("clarity_score").unwrap() < 50.0);
        assert!(out
            .recommendations
            .iter()
            .any(|r| r.starts_with("Break up sentences")));
        assert!(out
            .recommendations
            .iter()
            .any(|r| r.starts_with("Simplify wording")));
    }

    #[tokio::test]
    async fn test_punctuation_only_copy_fails_execution() {
        let out = analyzer().run(&input("!!!", "...", "?")).await;
        assert!(!out.success);
        assert!(out.scores.is_empty());
    }

    #[test]
    fn test_validation_names_blank_fields() {
        let err = analyzer()
            .validate_input(&input(" ", "Body", ""))
            .unwrap_err();
        assert_eq!(err.fields, vec!["headline".to_string(), "cta".to_string()]);
    }

    #[tokio::test]
    async fn test_identical_input_identical_output() {
        let tool = analyzer();
        let input = input("Save Big Today", "Proven results for busy teams.", "Start free");
        let a = tool.run(&input).await;
        let b = tool.run(&input).await;
        assert_eq!(a.scores, b.scores);
        assert_eq!(a.insights, b.insights);
    }
}
