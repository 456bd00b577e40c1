//! Versioned keyword and profile tables consumed by the analyzers.
//!
//! The bundled tables are compiled into the binary from `data/`. A deployment
//! can point `tools.lexicon_path` / `tools.brand_voice_path` at replacement
//! files with the same shape.

use adcopy_core::error::DependencyError;
use adcopy_core::types::Platform;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

const BUNDLED_LEXICON: &str = include_str!("../data/lexicon.json");
const BUNDLED_BRAND_VOICE: &str = include_str!("../data/brand_voice.json");

static BUNDLED_LEXICON_TABLE: Lazy<Result<Arc<Lexicon>, DependencyError>> =
    Lazy::new(|| Lexicon::from_json(BUNDLED_LEXICON, "bundled lexicon.json").map(Arc::new));

static BUNDLED_BRAND_VOICE_TABLE: Lazy<Result<Arc<BrandVoiceLexicon>, DependencyError>> =
    Lazy::new(|| {
        BrandVoiceLexicon::from_json(BUNDLED_BRAND_VOICE, "bundled brand_voice.json").map(Arc::new)
    });

// ─── General lexicon ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lexicon {
    pub version: String,
    pub power_words: Vec<String>,
    /// Emotion categories in tie-break order.
    pub emotion_categories: Vec<WordCategory>,
    /// Category labels that do not lift the emotion score.
    pub negative_emotions: Vec<String>,
    pub cta: CtaLexicon,
    pub persuasion: PersuasionLexicon,
    pub platforms: Vec<PlatformProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordCategory {
    pub name: String,
    pub words: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CtaLexicon {
    pub action_verbs: Vec<String>,
    pub urgency_words: Vec<String>,
    pub value_words: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersuasionLexicon {
    pub benefit_words: Vec<String>,
    pub social_proof_phrases: Vec<String>,
    pub reader_words: Vec<String>,
}

/// Length limits and vocabulary that perform well on one platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformProfile {
    pub platform: Platform,
    pub headline_max_chars: usize,
    pub body_max_chars: usize,
    pub headline_words_min: usize,
    pub headline_words_max: usize,
    pub cta_max_words: usize,
    pub cta_prefers_urgency: bool,
    pub preferred_words: Vec<String>,
    pub emoji_friendly: bool,
    pub tips: Vec<String>,
}

impl Lexicon {
    /// The tables shipped with the crate.
    pub fn bundled() -> Result<Arc<Lexicon>, DependencyError> {
        BUNDLED_LEXICON_TABLE.clone()
    }

    pub fn from_json(json: &str, origin: &str) -> Result<Self, DependencyError> {
        let lexicon: Lexicon = serde_json::from_str(json)
            .map_err(|e| DependencyError::new("lexicon", origin, e.to_string()))?;
        lexicon.check(origin)?;
        Ok(lexicon)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DependencyError> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let json = std::fs::read_to_string(path)
            .map_err(|e| DependencyError::new("lexicon", &origin, e.to_string()))?;
        Self::from_json(&json, &origin)
    }

    pub fn platform(&self, platform: Platform) -> Option<&PlatformProfile> {
        self.platforms.iter().find(|p| p.platform == platform)
    }

    pub fn emotion_category(&self, name: &str) -> Option<&WordCategory> {
        self.emotion_categories.iter().find(|c| c.name == name)
    }

    pub fn is_negative_emotion(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        label == "neutral"
            || label == "negative"
            || self.negative_emotions.iter().any(|n| *n == label)
    }

    fn check(&self, origin: &str) -> Result<(), DependencyError> {
        let missing: Vec<&str> = Platform::ALL
            .iter()
            .filter(|p| self.platform(**p).is_none())
            .map(|p| p.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(DependencyError::new(
                "lexicon",
                origin,
                format!("no platform profile for {}", missing.join(", ")),
            ));
        }
        if self.emotion_categories.is_empty() || self.cta.action_verbs.is_empty() {
            return Err(DependencyError::new(
                "lexicon",
                origin,
                "emotion categories and CTA action verbs must not be empty",
            ));
        }
        Ok(())
    }
}

// ─── Brand voice lexicon ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandVoiceLexicon {
    pub version: String,
    pub tones: BTreeMap<String, ToneProfile>,
    pub traits: BTreeMap<String, TraitProfile>,
    pub vocabulary: BTreeMap<String, ToneVocabulary>,
    pub brand_terms: Vec<String>,
    /// Sentence appended to body copy that mentions none of the brand terms.
    pub brand_statement: String,
    /// Copy section → messaging characteristics expected in it.
    pub hierarchy: BTreeMap<String, Vec<String>>,
    /// Characteristic → indicator terms.
    pub characteristics: BTreeMap<String, Vec<String>>,
    pub signature_phrases: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToneProfile {
    pub indicators: Vec<String>,
    pub avoid: Vec<String>,
    #[serde(default)]
    pub headline_prefix: Option<String>,
    #[serde(default)]
    pub body_prefix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraitProfile {
    pub expressions: Vec<String>,
    pub avoid_expressions: Vec<String>,
    #[serde(default)]
    pub headline_prefix: Option<String>,
    #[serde(default)]
    pub body_prefix: Option<String>,
    #[serde(default)]
    pub cta_prefix: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToneVocabulary {
    pub action_words: Vec<String>,
    pub descriptive_words: Vec<String>,
}

impl BrandVoiceLexicon {
    pub fn bundled() -> Result<Arc<BrandVoiceLexicon>, DependencyError> {
        BUNDLED_BRAND_VOICE_TABLE.clone()
    }

    pub fn from_json(json: &str, origin: &str) -> Result<Self, DependencyError> {
        let lexicon: BrandVoiceLexicon = serde_json::from_str(json)
            .map_err(|e| DependencyError::new("brand_voice_lexicon", origin, e.to_string()))?;
        if lexicon.tones.is_empty() {
            return Err(DependencyError::new(
                "brand_voice_lexicon",
                origin,
                "at least one tone profile is required",
            ));
        }
        Ok(lexicon)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DependencyError> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let json = std::fs::read_to_string(path)
            .map_err(|e| DependencyError::new("brand_voice_lexicon", &origin, e.to_string()))?;
        Self::from_json(&json, &origin)
    }

    pub fn tone(&self, name: &str) -> Option<&ToneProfile> {
        self.tones.get(name)
    }

    pub fn personality(&self, name: &str) -> Option<&TraitProfile> {
        self.traits.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_lexicon_covers_every_platform() {
        let lexicon = Lexicon::bundled().unwrap();
        for platform in Platform::ALL {
            assert!(lexicon.platform(platform).is_some(), "{platform}");
        }
        assert!(lexicon.emotion_category("urgency").is_some());
        assert!(lexicon.is_negative_emotion("fear"));
        assert!(lexicon.is_negative_emotion("Neutral"));
        assert!(!lexicon.is_negative_emotion("joy"));
    }

    #[test]
    fn test_bundled_brand_voice_tables() {
        let lexicon = BrandVoiceLexicon::bundled().unwrap();
        assert!(lexicon.tone("professional").is_some());
        assert!(lexicon.personality("confident").is_some());
        assert_eq!(lexicon.hierarchy.len(), 3);
    }

    #[test]
    fn test_malformed_lexicon_is_dependency_error() {
        let err = Lexicon::from_json("{not json", "inline").unwrap_err();
        assert_eq!(err.component, "lexicon");
        assert_eq!(err.resource, "inline");
    }

    #[test]
    fn test_missing_lexicon_file_is_dependency_error() {
        let err = Lexicon::from_path("/nonexistent/lexicon.json").unwrap_err();
        assert_eq!(err.resource, "/nonexistent/lexicon.json");
    }

    #[test]
    fn test_lexicon_without_platforms_rejected() {
        let json = r#"{
            "version": "t",
            "power_words": [],
            "emotion_categories": [{"name": "joy", "words": ["happy"]}],
            "negative_emotions": [],
            "cta": {"action_verbs": ["get"], "urgency_words": [], "value_words": []},
            "persuasion": {"benefit_words": [], "social_proof_phrases": [], "reader_words": []},
            "platforms": []
        }"#;
        let err = Lexicon::from_json(json, "inline").unwrap_err();
        assert!(err.reason.contains("facebook"));
    }
}
