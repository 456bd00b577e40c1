//! Analysis engine, exposing the two caller operations: full analysis
//! (with optional competitor benchmarking) and alternative generation.

use adcopy_core::config::AppConfig;
use adcopy_core::error::{AdCopyError, AdCopyResult, PipelineFailure, RegistryError};
use adcopy_core::types::{
    AdCopy, AnalysisResult, CompetitorAd, CompetitorComparison, CompetitorScore,
    CompositeScores, Dimension, ToolInput, ToolOutput, Variant,
};
use adcopy_tools::catalog::{ToolContext, ToolKind};
use adcopy_tools::emotion::EmotionClassifier;
use adcopy_tools::lexicon::Lexicon;
use adcopy_tools::registry::ToolRegistry;
use adcopy_tools::text::round1;
use chrono::Utc;
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::aggregator::{Aggregate, Aggregator};
use crate::alternatives::AlternativeGenerator;
use crate::insights::CopyInsights;
use crate::pipeline::Pipeline;

pub struct AnalysisEngine {
    pipeline: Pipeline,
    aggregator: Aggregator,
    generator: AlternativeGenerator,
    max_competitors: usize,
}

impl AnalysisEngine {
    /// Build the registry from `tools.enabled` using the configured lexicon
    /// files and emotion strategy.
    pub fn from_config(config: &AppConfig) -> AdCopyResult<Self> {
        Self::from_context(config, ToolContext::from_config(&config.tools))
    }

    /// As [`from_config`](Self::from_config) with an injected emotion
    /// classifier for the `external` strategy.
    pub fn from_config_with_classifier(
        config: &AppConfig,
        classifier: Arc<dyn EmotionClassifier>,
    ) -> AdCopyResult<Self> {
        let context = ToolContext::from_config(&config.tools).with_classifier(classifier);
        Self::from_context(config, context)
    }

    /// Tools whose resources cannot be loaded are left out with a warning;
    /// an empty registry is a configuration error.
    pub fn from_context(config: &AppConfig, context: ToolContext) -> AdCopyResult<Self> {
        config.validate()?;

        let mut registry = ToolRegistry::new();
        for name in &config.tools.enabled {
            let kind: ToolKind = name.parse().map_err(AdCopyError::Config)?;
            let mut tool_config = kind.default_config();
            if let Some(ms) = config.tools.timeout_overrides_ms.get(kind.name()) {
                tool_config = tool_config.with_timeout_ms(*ms);
            }

            match registry.register(&context.factory(kind), tool_config, false) {
                Ok(()) => {}
                Err(RegistryError::Dependency(e)) => {
                    warn!(tool = %kind, error = %e, "Tool excluded from registry");
                }
                Err(e) => return Err(e.into()),
            }
        }
        if registry.is_empty() {
            return Err(AdCopyError::Config(
                "no tools could be registered from tools.enabled".to_string(),
            ));
        }

        let lexicon = match context.lexicon() {
            Ok(lexicon) => lexicon,
            Err(e) => {
                warn!(error = %e, "Configured lexicon unavailable, alternatives use the bundled tables");
                Lexicon::bundled()?
            }
        };

        info!(tools = registry.len(), "Analysis engine ready");
        Ok(Self::with_registry(registry, config, lexicon))
    }

    /// Engine over a caller-assembled registry.
    pub fn with_registry(registry: ToolRegistry, config: &AppConfig, lexicon: Arc<Lexicon>) -> Self {
        Self {
            pipeline: Pipeline::new(Arc::new(registry)),
            aggregator: Aggregator::new(config.scoring.weights, config.scoring.quick_win_limit),
            generator: AlternativeGenerator::new(lexicon, config.alternatives.include_emojis),
            max_competitors: config.pipeline.max_competitors,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        self.pipeline.registry()
    }

    pub async fn run_analysis(
        &self,
        ad: &AdCopy,
        competitors: &[CompetitorAd],
    ) -> Result<AnalysisResult, PipelineFailure> {
        self.run_analysis_with_cancel(ad, competitors, None, &CancellationToken::new())
            .await
    }

    /// Full analysis restricted to `tools` (all registered when `None`).
    /// Cancelling `cancel` aborts every in-flight tool, competitors included.
    pub async fn run_analysis_with_cancel(
        &self,
        ad: &AdCopy,
        competitors: &[CompetitorAd],
        tools: Option<&[String]>,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, PipelineFailure> {
        ad.validate()?;

        let request_id = Uuid::new_v4();
        let input = Arc::new(ToolInput::with_request_id(ad, request_id));
        info!(
            request_id = %request_id,
            platform = %ad.platform,
            competitors = competitors.len(),
            "Analysis started"
        );

        let (own, rivals) = tokio::join!(
            self.score(input.clone(), tools, cancel),
            self.score_competitors(competitors, tools, cancel),
        );
        if cancel.is_cancelled() {
            return Err(PipelineFailure::cancelled());
        }
        let (outputs, aggregate) = own?;

        let insights = CopyInsights::from_outputs(&outputs);
        let alternatives = self.generator.generate(&input, &insights);
        let competitor_comparison = compare(&aggregate.scores, rivals);

        info!(
            request_id = %request_id,
            overall = aggregate.scores.overall,
            missing = aggregate.missing.len(),
            "Analysis finished"
        );

        Ok(AnalysisResult {
            id: Uuid::new_v4(),
            request_id,
            feedback: compose_feedback(&aggregate.scores),
            scores: aggregate.scores,
            effective_weights: aggregate.effective_weights,
            missing_dimensions: aggregate.missing,
            alternatives,
            quick_wins: aggregate.quick_wins,
            competitor_comparison,
            tool_outputs: outputs,
            created_at: Utc::now(),
        })
    }

    /// Run the tools and derive variants from their insights, without
    /// aggregating. Tool failures only make the variants less specific.
    pub async fn generate_alternatives(&self, ad: &AdCopy) -> Result<Vec<Variant>, PipelineFailure> {
        ad.validate()?;
        let input = Arc::new(ToolInput::new(ad));
        let outputs = self
            .pipeline
            .execute(input.clone(), None, &CancellationToken::new())
            .await;
        let insights = CopyInsights::from_outputs(&outputs);
        Ok(self.generator.generate(&input, &insights))
    }

    async fn score(
        &self,
        input: Arc<ToolInput>,
        tools: Option<&[String]>,
        cancel: &CancellationToken,
    ) -> Result<(Vec<ToolOutput>, Aggregate), PipelineFailure> {
        let request_id = input.request_id;
        let outputs = self.pipeline.run(input, tools, cancel).await?;
        let aggregate = self.aggregator.aggregate(request_id, &outputs)?;
        Ok((outputs, aggregate))
    }

    async fn score_competitors(
        &self,
        competitors: &[CompetitorAd],
        tools: Option<&[String]>,
        cancel: &CancellationToken,
    ) -> Vec<CompetitorScore> {
        if competitors.len() > self.max_competitors {
            warn!(
                supplied = competitors.len(),
                limit = self.max_competitors,
                "Competitor list truncated"
            );
        }

        let runs = competitors
            .iter()
            .take(self.max_competitors)
            .map(|competitor| async move {
                competitor.ad.validate()?;
                let input = Arc::new(ToolInput::new(&competitor.ad));
                let (_, aggregate) = self.score(input, tools, cancel).await?;
                Ok::<_, PipelineFailure>(CompetitorScore {
                    source: competitor.source.clone(),
                    scores: aggregate.scores,
                })
            });

        join_all(runs)
            .await
            .into_iter()
            .zip(competitors)
            .filter_map(|(result, competitor)| match result {
                Ok(score) => Some(score),
                Err(e) => {
                    warn!(source = %competitor.source, error = %e, "Competitor left out of comparison");
                    None
                }
            })
            .collect()
    }
}

/// Overall band plus a note for each weak dimension.
pub fn compose_feedback(scores: &CompositeScores) -> String {
    let mut parts = vec![if scores.overall >= 80.0 {
        "Excellent ad copy! Your content is well-optimized."
    } else if scores.overall >= 60.0 {
        "Good ad copy with room for improvement."
    } else {
        "Your ad copy needs optimization to improve performance."
    }];

    if scores.clarity.is_some_and(|v| v < 70.0) {
        parts.push("Consider simplifying your language for better readability.");
    }
    if scores.cta_strength.is_some_and(|v| v < 70.0) {
        parts.push("Your call-to-action could be stronger and more compelling.");
    }
    if scores.emotion.is_some_and(|v| v < 60.0) {
        parts.push("Add more emotional triggers to connect with your audience.");
    }
    parts.join(" ")
}

/// `None` when no competitor could be scored.
pub fn compare(own: &CompositeScores, competitors: Vec<CompetitorScore>) -> Option<CompetitorComparison> {
    if competitors.is_empty() {
        return None;
    }

    let count = competitors.len() as f64;
    let average = competitors.iter().map(|c| c.scores.overall).sum::<f64>() / count;
    let rank = 1 + competitors
        .iter()
        .filter(|c| c.scores.overall > own.overall)
        .count();

    let mut dimension_gaps = BTreeMap::new();
    for dimension in Dimension::ALL {
        let Some(own_value) = own.get(dimension) else {
            continue;
        };
        let theirs: Vec<f64> = competitors
            .iter()
            .filter_map(|c| c.scores.get(dimension))
            .collect();
        if !theirs.is_empty() {
            let mean = theirs.iter().sum::<f64>() / theirs.len() as f64;
            dimension_gaps.insert(dimension, round1(own_value - mean));
        }
    }

    let strongest_competitor = competitors
        .iter()
        .fold(None::<&CompetitorScore>, |best, c| match best {
            Some(b) if b.scores.overall >= c.scores.overall => Some(b),
            _ => Some(c),
        })
        .map(|c| c.source.clone());

    Some(CompetitorComparison {
        own_overall: own.overall,
        average_competitor_overall: round1(average),
        rank,
        total_ranked: competitors.len() + 1,
        dimension_gaps,
        strongest_competitor,
        competitors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(overall: f64, clarity: Option<f64>, cta: Option<f64>, emotion: Option<f64>) -> CompositeScores {
        CompositeScores {
            overall,
            clarity,
            cta_strength: cta,
            emotion,
            ..Default::default()
        }
    }

    #[test]
    fn test_feedback_bands_and_notes() {
        assert_eq!(
            compose_feedback(&scores(85.0, Some(90.0), Some(90.0), Some(90.0))),
            "Excellent ad copy! Your content is well-optimized."
        );
        assert_eq!(
            compose_feedback(&scores(65.0, Some(60.0), Some(80.0), Some(50.0))),
            "Good ad copy with room for improvement. \
             Consider simplifying your language for better readability. \
             Add more emotional triggers to connect with your audience."
        );
        // absent dimensions add no notes
        assert_eq!(
            compose_feedback(&scores(40.0, None, Some(50.0), None)),
            "Your ad copy needs optimization to improve performance. \
             Your call-to-action could be stronger and more compelling."
        );
    }

    #[test]
    fn test_competitor_comparison() {
        let own = scores(70.0, Some(80.0), Some(60.0), None);
        let rivals = vec![
            CompetitorScore {
                source: "rival-a".into(),
                scores: scores(75.0, Some(70.0), Some(90.0), Some(50.0)),
            },
            CompetitorScore {
                source: "rival-b".into(),
                scores: scores(60.0, None, Some(70.0), None),
            },
        ];
        let cmp = compare(&own, rivals).unwrap();
        assert_eq!(cmp.rank, 2);
        assert_eq!(cmp.total_ranked, 3);
        assert_eq!(cmp.average_competitor_overall, 67.5);
        assert_eq!(cmp.strongest_competitor.as_deref(), Some("rival-a"));
        assert_eq!(cmp.dimension_gaps[&Dimension::Clarity], 10.0);
        assert_eq!(cmp.dimension_gaps[&Dimension::CtaStrength], -20.0);
        assert!(!cmp.dimension_gaps.contains_key(&Dimension::Emotion));

        assert!(compare(&own, Vec::new()).is_none());
    }
}
