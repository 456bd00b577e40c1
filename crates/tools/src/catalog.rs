//! Built-in tool kinds and the shared resources needed to construct them.

use adcopy_core::config::{BrandVoiceDefaults, EmotionStrategy, ToolsConfig};
use adcopy_core::error::DependencyError;
use adcopy_core::types::ToolConfig;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::brand_voice::{self, BrandVoiceEngine};
use crate::cta::{self, CtaAnalyzer};
use crate::emotion::{self, EmotionAnalyzer, EmotionClassifier};
use crate::lexicon::{BrandVoiceLexicon, Lexicon};
use crate::persuasion::{self, PersuasionAnalyzer};
use crate::platform_fit::{self, PlatformFitAnalyzer};
use crate::readability::{self, ReadabilityAnalyzer};
use crate::tool::{Tool, ToolFactory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Readability,
    Persuasion,
    Cta,
    Emotion,
    PlatformFit,
    BrandVoice,
}

impl ToolKind {
    /// Default registration order.
    pub const ALL: [ToolKind; 6] = [
        ToolKind::Readability,
        ToolKind::Persuasion,
        ToolKind::Emotion,
        ToolKind::Cta,
        ToolKind::PlatformFit,
        ToolKind::BrandVoice,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Readability => readability::NAME,
            ToolKind::Persuasion => persuasion::NAME,
            ToolKind::Cta => cta::NAME,
            ToolKind::Emotion => emotion::NAME,
            ToolKind::PlatformFit => platform_fit::NAME,
            ToolKind::BrandVoice => brand_voice::NAME,
        }
    }

    pub fn default_config(&self) -> ToolConfig {
        match self {
            ToolKind::Readability => readability::default_config(),
            ToolKind::Persuasion => persuasion::default_config(),
            ToolKind::Cta => cta::default_config(),
            ToolKind::Emotion => emotion::default_config(),
            ToolKind::PlatformFit => platform_fit::default_config(),
            ToolKind::BrandVoice => brand_voice::default_config(),
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ToolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolKind::ALL
            .iter()
            .copied()
            .find(|k| k.name() == s.trim())
            .ok_or_else(|| format!("unknown tool '{}'", s.trim()))
    }
}

/// Resources shared by the built-in tools. A resource that failed to load is
/// kept as its error so only the tools that need it are excluded.
#[derive(Clone)]
pub struct ToolContext {
    lexicon: Result<Arc<Lexicon>, DependencyError>,
    brand_voice: Result<Arc<BrandVoiceLexicon>, DependencyError>,
    emotion_strategy: EmotionStrategy,
    classifier: Option<Arc<dyn EmotionClassifier>>,
    brand_defaults: BrandVoiceDefaults,
}

impl ToolContext {
    /// Bundled tables, lexicon emotion classifier, default brand profile.
    pub fn bundled() -> Self {
        Self {
            lexicon: Lexicon::bundled(),
            brand_voice: BrandVoiceLexicon::bundled(),
            emotion_strategy: EmotionStrategy::Lexicon,
            classifier: None,
            brand_defaults: BrandVoiceDefaults::default(),
        }
    }

    pub fn from_config(config: &ToolsConfig) -> Self {
        let lexicon = match &config.lexicon_path {
            Some(path) => Lexicon::from_path(path).map(Arc::new),
            None => Lexicon::bundled(),
        };
        let brand_voice = match &config.brand_voice_path {
            Some(path) => BrandVoiceLexicon::from_path(path).map(Arc::new),
            None => BrandVoiceLexicon::bundled(),
        };
        Self {
            lexicon,
            brand_voice,
            emotion_strategy: config.emotion_strategy,
            classifier: None,
            brand_defaults: config.brand_voice.clone(),
        }
    }

    /// Inject the classifier used by the `external` emotion strategy.
    pub fn with_classifier(mut self, classifier: Arc<dyn EmotionClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn with_emotion_strategy(mut self, strategy: EmotionStrategy) -> Self {
        self.emotion_strategy = strategy;
        self
    }

    pub fn lexicon(&self) -> Result<Arc<Lexicon>, DependencyError> {
        self.lexicon.clone()
    }

    pub fn factory(&self, kind: ToolKind) -> BuiltinFactory<'_> {
        BuiltinFactory {
            kind,
            context: self,
        }
    }
}

/// Factory for one built-in tool kind.
pub struct BuiltinFactory<'a> {
    kind: ToolKind,
    context: &'a ToolContext,
}

impl ToolFactory for BuiltinFactory<'_> {
    fn default_config(&self) -> ToolConfig {
        self.kind.default_config()
    }

    fn build(&self, config: ToolConfig) -> Result<Arc<dyn Tool>, DependencyError> {
        let ctx = self.context;
        let tool: Arc<dyn Tool> = match self.kind {
            ToolKind::Readability => Arc::new(ReadabilityAnalyzer::new(config, ctx.lexicon()?)),
            ToolKind::Persuasion => Arc::new(PersuasionAnalyzer::new(config, ctx.lexicon()?)),
            ToolKind::Cta => Arc::new(CtaAnalyzer::new(config, ctx.lexicon()?)),
            ToolKind::PlatformFit => Arc::new(PlatformFitAnalyzer::new(config, ctx.lexicon()?)),
            ToolKind::Emotion => {
                let lexicon = ctx.lexicon()?;
                match (ctx.emotion_strategy, &ctx.classifier) {
                    (EmotionStrategy::External, Some(classifier)) => {
                        Arc::new(EmotionAnalyzer::new(config, lexicon, classifier.clone()))
                    }
                    (EmotionStrategy::External, None) => {
                        return Err(DependencyError::new(
                            &config.name,
                            "emotion classifier",
                            "external strategy selected but no classifier was provided",
                        ))
                    }
                    (EmotionStrategy::Lexicon, _) => {
                        Arc::new(EmotionAnalyzer::with_lexicon(config, lexicon))
                    }
                }
            }
            ToolKind::BrandVoice => Arc::new(BrandVoiceEngine::new(
                config,
                ctx.brand_voice.clone()?,
                ctx.brand_defaults.clone(),
            )),
        };
        Ok(tool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ToolRegistry;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in ToolKind::ALL {
            assert_eq!(kind.name().parse::<ToolKind>(), Ok(kind));
            assert_eq!(kind.default_config().name, kind.name());
        }
        assert!("spell_checker".parse::<ToolKind>().is_err());
    }

    #[test]
    fn test_bundled_context_builds_every_tool() {
        let ctx = ToolContext::bundled();
        let mut registry = ToolRegistry::new();
        for kind in ToolKind::ALL {
            registry.register_default(&ctx.factory(kind), false).unwrap();
        }
        assert_eq!(
            registry.names(),
            vec![
                "readability_analyzer",
                "persuasion_analyzer",
                "emotion_analyzer",
                "cta_analyzer",
                "platform_fit_analyzer",
                "brand_voice_engine",
            ]
        );
        let brand = registry.get("brand_voice_engine").unwrap();
        assert_eq!(brand.output_score_names().len(), 5);
    }

    #[test]
    fn test_external_strategy_without_classifier_is_dependency_error() {
        let ctx = ToolContext::bundled().with_emotion_strategy(EmotionStrategy::External);
        let err = ctx
            .factory(ToolKind::Emotion)
            .build(ToolKind::Emotion.default_config())
            .err()
            .unwrap();
        assert_eq!(err.resource, "emotion classifier");
    }

    #[test]
    fn test_missing_lexicon_file_excludes_only_lexicon_tools() {
        let config = ToolsConfig {
            lexicon_path: Some("/nonexistent/lexicon.json".into()),
            ..ToolsConfig::default()
        };
        let ctx = ToolContext::from_config(&config);
        assert!(ctx
            .factory(ToolKind::Cta)
            .build(ToolKind::Cta.default_config())
            .is_err());
        assert!(ctx
            .factory(ToolKind::BrandVoice)
            .build(ToolKind::BrandVoice.default_config())
            .is_ok());
    }
}
