//! Brand voice engine: scores copy against a target tone and personality and
//! proposes brand-aligned rewrites.
//!
//! The target profile comes from `additional_data.brand_voice`:
//!
//! ```json
//! { "brand_voice": { "primary_tone": "friendly", "personality_traits": ["empathetic"] } }
//! ```
//!
//! Without one, the configured default profile is used and confidence drops.

use adcopy_core::config::BrandVoiceDefaults;
use adcopy_core::error::{ToolError, ValidationError};
use adcopy_core::types::{InputField, ToolCategory, ToolConfig, ToolInput, ToolVariation};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::lexicon::{BrandVoiceLexicon, ToneProfile};
use crate::text::{self, Normalized};
use crate::tool::{Tool, ToolReport};

pub const NAME: &str = "brand_voice_engine";
const SCORES: &[&str] = &[
    "tone_consistency_score",
    "vocabulary_alignment_score",
    "personality_consistency_score",
    "hierarchy_alignment_score",
    "phrase_integration_score",
];
const TONE_FIELD: &str = "additional_data.brand_voice.primary_tone";
const TRAITS_FIELD: &str = "additional_data.brand_voice.personality_traits";

pub fn default_config() -> ToolConfig {
    ToolConfig::new(NAME, ToolCategory::Optimizer, 25_000)
        .with_param("max_recommendations", 6)
        .with_param("generate_variations", true)
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrandProfile {
    pub primary_tone: String,
    pub personality_traits: Vec<String>,
    /// Whether the profile came with the request rather than from defaults.
    pub from_request: bool,
}

pub struct BrandVoiceEngine {
    config: ToolConfig,
    lexicon: Arc<BrandVoiceLexicon>,
    defaults: BrandVoiceDefaults,
}

/// The copy split into its three sections, in hierarchy order.
struct Sections<'a> {
    items: [(&'static str, &'a str); 3],
}

impl<'a> Sections<'a> {
    fn new(input: &'a ToolInput) -> Self {
        Self {
            items: [
                ("headline", input.headline.as_str()),
                ("body_text", input.body_text.as_str()),
                ("cta", input.cta.as_str()),
            ],
        }
    }
}

#[derive(Debug)]
struct ToneAnalysis {
    score: f64,
    section_scores: BTreeMap<&'static str, f64>,
    positive: Vec<String>,
    negative: Vec<String>,
    deviation: f64,
}

impl ToneAnalysis {
    fn consistency(&self) -> &'static str {
        match self.deviation {
            d if d <= 10.0 => "very_consistent",
            d if d <= 20.0 => "consistent",
            d if d <= 30.0 => "moderately_consistent",
            _ => "inconsistent",
        }
    }
}

#[derive(Debug)]
struct VocabularyAnalysis {
    score: f64,
    match_percentage: f64,
    avoid_found: Vec<String>,
    gaps: Vec<String>,
    /// (avoid word, replacement)
    suggestions: Vec<(String, String)>,
}

#[derive(Debug)]
struct PersonalityAnalysis {
    score: f64,
    traits_found: Vec<String>,
    traits_missing: Vec<String>,
    strength: &'static str,
}

#[derive(Debug)]
struct HierarchyAnalysis {
    score: f64,
    section_scores: BTreeMap<&'static str, f64>,
}

#[derive(Debug)]
struct PhraseAnalysis {
    score: f64,
    signature_found: Vec<String>,
    brand_term_usage: usize,
}

impl PhraseAnalysis {
    fn usage_count(&self) -> usize {
        self.signature_found.len() + self.brand_term_usage
    }
}

impl BrandVoiceEngine {
    pub fn new(
        config: ToolConfig,
        lexicon: Arc<BrandVoiceLexicon>,
        defaults: BrandVoiceDefaults,
    ) -> Self {
        Self {
            config,
            lexicon,
            defaults,
        }
    }

    /// Resolve the target profile from the request, falling back to defaults.
    pub fn profile(&self, input: &ToolInput) -> Result<BrandProfile, ValidationError> {
        let supplied = input.additional_data.get("brand_voice");
        let tone_value = supplied.and_then(|v| v.get("primary_tone"));
        let traits_value = supplied.and_then(|v| v.get("personality_traits"));

        let mut invalid = Vec::new();
        let primary_tone = match tone_value {
            None | Some(Value::Null) => Some(self.defaults.primary_tone.to_lowercase()),
            Some(Value::String(s)) => Some(s.trim().to_lowercase()),
            Some(_) => None,
        };
        let primary_tone = match primary_tone {
            Some(tone) if self.lexicon.tone(&tone).is_some() => tone,
            _ => {
                invalid.push(TONE_FIELD.to_string());
                String::new()
            }
        };

        let personality_traits = match traits_value {
            None | Some(Value::Null) => self.default_traits(),
            Some(Value::Array(items)) => {
                let parsed: Option<Vec<String>> = items
                    .iter()
                    .map(|v| v.as_str().map(|s| s.trim().to_lowercase()))
                    .collect();
                match parsed {
                    Some(traits) if traits.is_empty() => self.default_traits(),
                    Some(traits) => traits,
                    None => {
                        invalid.push(TRAITS_FIELD.to_string());
                        Vec::new()
                    }
                }
            }
            Some(_) => {
                invalid.push(TRAITS_FIELD.to_string());
                Vec::new()
            }
        };
        if personality_traits
            .iter()
            .any(|t| self.lexicon.personality(t).is_none())
            && !invalid.iter().any(|f| f == TRAITS_FIELD)
        {
            invalid.push(TRAITS_FIELD.to_string());
        }

        if !invalid.is_empty() {
            invalid.dedup();
            return Err(ValidationError::new(NAME, invalid)
                .with_detail("unknown brand tone or personality trait"));
        }

        Ok(BrandProfile {
            primary_tone,
            personality_traits,
            from_request: tone_value.is_some() || traits_value.is_some(),
        })
    }

    fn default_traits(&self) -> Vec<String> {
        self.defaults
            .personality_traits
            .iter()
            .map(|t| t.to_lowercase())
            .collect()
    }

    fn analyze_tone(&self, sections: &Sections<'_>, tone: &ToneProfile) -> ToneAnalysis {
        let full = Normalized::new(&sections.items.map(|(_, t)| t).join(" "));
        let positive: Vec<String> = full.find(&tone.indicators).iter().map(|s| s.to_string()).collect();
        let negative: Vec<String> = full.find(&tone.avoid).iter().map(|s| s.to_string()).collect();
        let tone_score =
            |pos: usize, neg: usize| text::clamp_score(70.0 + 10.0 * pos as f64 - 15.0 * neg as f64);

        let mut section_scores = BTreeMap::new();
        for (name, section) in sections.items {
            let normalized = Normalized::new(section);
            section_scores.insert(
                name,
                tone_score(
                    normalized.find(&tone.indicators).len(),
                    normalized.find(&tone.avoid).len(),
                ),
            );
        }
        let max = section_scores.values().cloned().fold(f64::MIN, f64::max);
        let min = section_scores.values().cloned().fold(f64::MAX, f64::min);

        ToneAnalysis {
            score: tone_score(positive.len(), negative.len()),
            section_scores,
            positive,
            negative,
            deviation: max - min,
        }
    }

    fn analyze_vocabulary(
        &self,
        full: &Normalized,
        profile: &BrandProfile,
        tone: &ToneProfile,
    ) -> VocabularyAnalysis {
        let vocabulary = self
            .lexicon
            .vocabulary
            .get(&profile.primary_tone)
            .cloned()
            .unwrap_or_default();

        let matches = full.find(&vocabulary.action_words).len()
            + full.find(&vocabulary.descriptive_words).len()
            + full.find(&self.lexicon.brand_terms).len();
        let total = vocabulary.action_words.len()
            + vocabulary.descriptive_words.len()
            + self.lexicon.brand_terms.len();
        let match_percentage = if total > 0 {
            matches as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        let avoid_found: Vec<String> = full.find(&tone.avoid).iter().map(|s| s.to_string()).collect();
        let score =
            text::clamp_score(match_percentage * 0.7 + 30.0 - 10.0 * avoid_found.len() as f64);

        let gaps = vocabulary
            .action_words
            .iter()
            .chain(vocabulary.descriptive_words.iter())
            .take(5)
            .filter(|w| !full.contains(w))
            .cloned()
            .collect();

        let suggestions = match vocabulary.action_words.first() {
            Some(preferred) => avoid_found
                .iter()
                .take(3)
                .map(|w| (w.clone(), preferred.clone()))
                .collect(),
            None => Vec::new(),
        };

        VocabularyAnalysis {
            score,
            match_percentage,
            avoid_found,
            gaps,
            suggestions,
        }
    }

    fn analyze_personality(&self, full: &Normalized, profile: &BrandProfile) -> PersonalityAnalysis {
        let mut scores = Vec::new();
        let mut traits_found = Vec::new();
        let mut traits_missing = Vec::new();
        for name in &profile.personality_traits {
            let Some(personality) = self.lexicon.personality(name) else {
                continue;
            };
            let positive = full.find(&personality.expressions).len();
            let negative = full.find(&personality.avoid_expressions).len();
            scores.push(text::clamp_score(
                50.0 + 20.0 * positive as f64 - 25.0 * negative as f64,
            ));
            if positive > 0 {
                traits_found.push(name.clone());
            } else {
                traits_missing.push(name.clone());
            }
        }

        let score = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        };
        let expected = profile.personality_traits.len() as f64;
        let found = traits_found.len() as f64;
        let strength = if found >= expected * 0.7 {
            "strong"
        } else if found >= expected * 0.4 {
            "moderate"
        } else {
            "weak"
        };

        PersonalityAnalysis {
            score,
            traits_found,
            traits_missing,
            strength,
        }
    }

    fn analyze_hierarchy(&self, sections: &Sections<'_>) -> HierarchyAnalysis {
        let mut section_scores = BTreeMap::new();
        for (name, section) in sections.items {
            let normalized = Normalized::new(section);
            let expected = self
                .lexicon
                .hierarchy
                .get(name)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let score = if expected.is_empty() {
                100.0
            } else {
                let matched = expected
                    .iter()
                    .filter(|c| {
                        self.lexicon
                            .characteristics
                            .get(*c)
                            .map_or(false, |terms| !normalized.find(terms).is_empty())
                    })
                    .count();
                matched as f64 / expected.len() as f64 * 100.0
            };
            section_scores.insert(name, score);
        }
        let score = section_scores.values().sum::<f64>() / section_scores.len() as f64;
        HierarchyAnalysis {
            score,
            section_scores,
        }
    }

    fn analyze_phrases(&self, full: &Normalized) -> PhraseAnalysis {
        let signature_found: Vec<String> = full
            .find(&self.lexicon.signature_phrases)
            .iter()
            .map(|s| s.to_string())
            .collect();
        let brand_term_usage = full.find(&self.lexicon.brand_terms).len();
        let score = (25.0 * (signature_found.len() + brand_term_usage) as f64).min(100.0);
        PhraseAnalysis {
            score,
            signature_found,
            brand_term_usage,
        }
    }

    fn alignment_estimate(&self, tone: &ToneProfile, headline: &str, body: &str, cta: &str) -> f64 {
        let full = Normalized::new(&format!("{headline} {body} {cta}"));
        (60.0 + 10.0 * full.find(&tone.indicators).len() as f64).min(100.0)
    }

    fn variation(
        &self,
        tone: &ToneProfile,
        id: &str,
        variation_type: &str,
        focus: String,
        [headline, body_text, cta]: [String; 3],
    ) -> ToolVariation {
        let alignment_score = self.alignment_estimate(tone, &headline, &body_text, &cta);
        ToolVariation {
            id: id.to_string(),
            variation_type: variation_type.to_string(),
            headline,
            body_text,
            cta,
            focus,
            alignment_score,
        }
    }

    fn variations(
        &self,
        input: &ToolInput,
        profile: &BrandProfile,
        tone: &ToneProfile,
        tone_analysis: &ToneAnalysis,
        vocabulary: &VocabularyAnalysis,
    ) -> Vec<ToolVariation> {
        let original = [
            input.headline.trim().to_string(),
            input.body_text.trim().to_string(),
            input.cta.trim().to_string(),
        ];

        // Tone optimized: swap off-tone words, then add the tone's framing.
        let mut toned = original.clone();
        if let Some(replacement) = tone.indicators.first() {
            for section in toned.iter_mut() {
                for word in &tone_analysis.negative {
                    *section = text::replace_term(section, word, replacement);
                }
            }
        }
        if let Some(prefix) = &tone.headline_prefix {
            toned[0] = text::prefixed(prefix, &toned[0]);
        }
        if let Some(prefix) = &tone.body_prefix {
            toned[1] = text::prefixed(prefix, &text::lowercase_first(&toned[1]));
        }

        // Vocabulary enhanced: apply the top two substitutions, then make sure
        // the body mentions the brand.
        let mut enhanced = original.clone();
        for section in enhanced.iter_mut() {
            for (from, to) in vocabulary.suggestions.iter().take(2) {
                *section = text::replace_term(section, from, to);
            }
        }
        if !self
            .lexicon
            .brand_terms
            .iter()
            .any(|t| text::contains_term(&enhanced[1], t))
        {
            enhanced[1] = format!("{} {}", enhanced[1], self.lexicon.brand_statement);
        }

        // Personality infused: each trait contributes its framing in order.
        let mut infused = original;
        for name in &profile.personality_traits {
            let Some(personality) = self.lexicon.personality(name) else {
                continue;
            };
            if let Some(prefix) = &personality.headline_prefix {
                infused[0] = text::prefixed(prefix, &infused[0]);
            }
            if let Some(prefix) = &personality.body_prefix {
                infused[1] = text::prefixed(prefix, &text::lowercase_first(&infused[1]));
            }
            if let Some(prefix) = &personality.cta_prefix {
                infused[2] = text::prefixed(prefix, &infused[2]);
            }
        }

        vec![
            self.variation(
                tone,
                "tone_optimized",
                "brand_tone_alignment",
                format!("Optimized for {} tone", profile.primary_tone),
                toned,
            ),
            self.variation(
                tone,
                "vocabulary_enhanced",
                "brand_vocabulary_alignment",
                "Enhanced with brand lexicon".to_string(),
                enhanced,
            ),
            self.variation(
                tone,
                "personality_infused",
                "brand_personality_alignment",
                "Infused with brand personality traits".to_string(),
                infused,
            ),
        ]
    }
}

#[async_trait]
impl Tool for BrandVoiceEngine {
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
        )?;
        self.profile(input).map(|_| ())
    }

    async fn analyze(&self, input: &ToolInput) -> Result<ToolReport, ToolError> {
        let profile = self
            .profile(input)
            .map_err(|e| ToolError::Execution(e.to_string()))?;
        let tone = self.lexicon.tone(&profile.primary_tone).ok_or_else(|| {
            ToolError::Execution(format!("no tone profile for '{}'", profile.primary_tone))
        })?;

        let sections = Sections::new(input);
        let full = Normalized::new(&input.full_text());

        let tone_analysis = self.analyze_tone(&sections, tone);
        let vocabulary = self.analyze_vocabulary(&full, &profile, tone);
        let personality = self.analyze_personality(&full, &profile);
        let hierarchy = self.analyze_hierarchy(&sections);
        let phrases = self.analyze_phrases(&full);

        let sub_scores = [
            tone_analysis.score,
            vocabulary.score,
            personality.score,
            hierarchy.score,
            phrases.score,
        ];
        let overall = sub_scores.iter().sum::<f64>() / sub_scores.len() as f64;

        let mut recommendations = Vec::new();
        if tone_analysis.score < 70.0 {
            recommendations.push(format!(
                "Align copy more closely with {} brand tone",
                profile.primary_tone
            ));
        }
        if vocabulary.score < 60.0 {
            recommendations
                .push("Incorporate more brand-preferred vocabulary and terminology".to_string());
        }
        if personality.strength != "strong" {
            if let Some(first) = personality
                .traits_missing
                .first()
                .or(profile.personality_traits.first())
            {
                recommendations.push(format!("Strengthen {first} personality trait expression"));
            }
        }
        if hierarchy.score < 70.0 {
            recommendations
                .push("Improve messaging hierarchy alignment across copy sections".to_string());
        }
        if phrases.usage_count() < 2 {
            recommendations.push(
                "Integrate signature brand phrases for stronger brand recognition".to_string(),
            );
        }
        if tone_analysis.consistency() == "inconsistent" {
            recommendations
                .push("Maintain consistent brand voice across all copy sections".to_string());
        }
        let limit = self.config.param_f64("max_recommendations", 6.0).max(0.0) as usize;
        recommendations.truncate(limit);

        let variations = if self.config.param_bool("generate_variations", true) {
            self.variations(input, &profile, tone, &tone_analysis, &vocabulary)
        } else {
            Vec::new()
        };

        let mut off_brand: Vec<String> = tone_analysis
            .negative
            .iter()
            .chain(vocabulary.avoid_found.iter())
            .cloned()
            .collect();
        off_brand.sort();
        off_brand.dedup();

        let profile_factor = if profile.from_request { 90.0 } else { 70.0 };
        let confidence = (profile_factor + 85.0 + 90.0) / 3.0;

        Ok(ToolReport::new(text::round1(confidence))
            .score("tone_consistency_score", text::round1(tone_analysis.score))
            .score("vocabulary_alignment_score", text::round1(vocabulary.score))
            .score("personality_consistency_score", text::round1(personality.score))
            .score("hierarchy_alignment_score", text::round1(hierarchy.score))
            .score("phrase_integration_score", text::round1(phrases.score))
            .insight("overall_brand_voice_score", text::round1(overall))
            .insight(
                "brand_profile",
                json!({
                    "primary_tone": profile.primary_tone,
                    "personality_traits": profile.personality_traits,
                    "source": if profile.from_request { "request" } else { "default" },
                }),
            )
            .insight(
                "tone_alignment",
                json!({
                    "section_scores": tone_analysis.section_scores,
                    "positive_indicators_found": tone_analysis.positive,
                    "negative_indicators_found": tone_analysis.negative,
                    "tone_consistency": tone_analysis.consistency(),
                    "deviation_score": tone_analysis.deviation,
                }),
            )
            .insight(
                "vocabulary",
                json!({
                    "match_percentage": text::round1(vocabulary.match_percentage),
                    "gaps": vocabulary.gaps,
                    "suggestions": vocabulary
                        .suggestions
                        .iter()
                        .map(|(from, to)| json!({ "replace": from, "with": to }))
                        .collect::<Vec<_>>(),
                }),
            )
            .insight(
                "personality",
                json!({
                    "traits_found": personality.traits_found,
                    "traits_missing": personality.traits_missing,
                    "personality_strength": personality.strength,
                }),
            )
            .insight(
                "messaging_hierarchy",
                json!({
                    "section_scores": hierarchy.section_scores,
                    "alignment_quality": match hierarchy.score {
                        s if s >= 80.0 => "excellent",
                        s if s >= 60.0 => "good",
                        _ => "needs_improvement",
                    },
                }),
            )
            .insight(
                "brand_phrases",
                json!({
                    "signature_phrases_found": phrases.signature_found,
                    "brand_term_usage": phrases.brand_term_usage,
                    "usage_count": phrases.usage_count(),
                }),
            )
            .insight("off_brand_elements", json!(off_brand))
            .recommendations(recommendations)
            .variations(variations))
    }
}
