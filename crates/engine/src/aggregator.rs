//! Aggregator: folds tool outputs into the five-dimension composite score
//! and picks the quick wins.

use adcopy_core::config::{DimensionWeights, MAX_QUICK_WINS};
use adcopy_core::error::AggregationError;
use adcopy_core::types::{CompositeScores, Dimension, ToolOutput};
use adcopy_tools::text::{clamp_score, round1};
use adcopy_tools::{brand_voice, cta, emotion, persuasion, platform_fit, readability};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

/// Where a dimension reads its value from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreSource {
    /// One named score of one tool.
    Key { tool: String, key: String },
    /// Unweighted mean of every score a multi-score tool reports.
    SubScoreAverage { tool: String },
}

impl ScoreSource {
    pub fn key(tool: &str, key: &str) -> Self {
        ScoreSource::Key {
            tool: tool.to_string(),
            key: key.to_string(),
        }
    }

    pub fn sub_score_average(tool: &str) -> Self {
        ScoreSource::SubScoreAverage {
            tool: tool.to_string(),
        }
    }

    fn read(&self, outputs: &[&ToolOutput]) -> Option<f64> {
        match self {
            ScoreSource::Key { tool, key } => outputs
                .iter()
                .find(|o| &o.tool_name == tool)
                .and_then(|o| o.score(key)),
            ScoreSource::SubScoreAverage { tool } => outputs
                .iter()
                .find(|o| &o.tool_name == tool)
                .and_then(|o| o.score_average()),
        }
    }
}

/// Built-in dimension → source mapping.
pub fn default_sources() -> BTreeMap<Dimension, Vec<ScoreSource>> {
    BTreeMap::from([
        (
            Dimension::Clarity,
            vec![ScoreSource::key(readability::NAME, "clarity_score")],
        ),
        (
            Dimension::Persuasion,
            vec![
                ScoreSource::key(readability::NAME, "power_score"),
                ScoreSource::key(persuasion::NAME, "persuasion_score"),
                ScoreSource::sub_score_average(brand_voice::NAME),
            ],
        ),
        (
            Dimension::Emotion,
            vec![ScoreSource::key(emotion::NAME, "emotion_score")],
        ),
        (
            Dimension::CtaStrength,
            vec![ScoreSource::key(cta::NAME, "cta_strength")],
        ),
        (
            Dimension::PlatformFit,
            vec![ScoreSource::key(platform_fit::NAME, "platform_fit_score")],
        ),
    ])
}

/// Aggregated view of one request's tool outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub scores: CompositeScores,
    /// Weights actually applied; present dimensions only, summing to 1.0.
    pub effective_weights: BTreeMap<Dimension, f64>,
    pub missing: Vec<Dimension>,
    pub quick_wins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Aggregator {
    weights: DimensionWeights,
    quick_win_limit: usize,
    sources: BTreeMap<Dimension, Vec<ScoreSource>>,
}

impl Aggregator {
    /// `quick_win_limit` is capped at [`MAX_QUICK_WINS`].
    pub fn new(weights: DimensionWeights, quick_win_limit: usize) -> Self {
        Self {
            weights,
            quick_win_limit: quick_win_limit.min(MAX_QUICK_WINS),
            sources: default_sources(),
        }
    }

    pub fn with_sources(mut self, sources: BTreeMap<Dimension, Vec<ScoreSource>>) -> Self {
        self.sources = sources;
        self
    }

    pub fn weights(&self) -> &DimensionWeights {
        &self.weights
    }

    /// Outputs carrying a different request id are ignored.
    pub fn aggregate(
        &self,
        request_id: Uuid,
        outputs: &[ToolOutput],
    ) -> Result<Aggregate, AggregationError> {
        let relevant: Vec<&ToolOutput> = outputs
            .iter()
            .filter(|o| o.request_id == request_id)
            .collect();
        if !relevant.iter().any(|o| o.is_usable()) {
            return Err(AggregationError::InsufficientData {
                attempted: relevant.len(),
            });
        }

        let mut present = BTreeMap::new();
        for dimension in Dimension::ALL {
            let values: Vec<f64> = self
                .sources
                .get(&dimension)
                .map(|sources| sources.iter().filter_map(|s| s.read(&relevant)).collect())
                .unwrap_or_default();
            if !values.is_empty() {
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                present.insert(dimension, round1(clamp_score(mean)));
            }
        }
        if present.is_empty() {
            return Err(AggregationError::InsufficientData {
                attempted: relevant.len(),
            });
        }

        let present_dims: Vec<Dimension> = present.keys().copied().collect();
        let effective_weights = redistribute(&self.weights, &present_dims)?;

        let weighted: f64 = present
            .iter()
            .map(|(d, v)| effective_weights.get(d).copied().unwrap_or(0.0) * v)
            .sum();

        let mut scores = CompositeScores {
            overall: round1(clamp_score(weighted)),
            ..Default::default()
        };
        for (dimension, value) in &present {
            scores.set(*dimension, Some(*value));
        }

        let missing = Dimension::ALL
            .iter()
            .copied()
            .filter(|d| !present.contains_key(d))
            .collect();

        Ok(Aggregate {
            scores,
            effective_weights,
            missing,
            quick_wins: quick_wins(&relevant, self.quick_win_limit),
        })
    }
}

/// Spread the weight of absent dimensions over the present ones in
/// proportion to their declared weights.
pub fn redistribute(
    weights: &DimensionWeights,
    present: &[Dimension],
) -> Result<BTreeMap<Dimension, f64>, AggregationError> {
    let total: f64 = present.iter().map(|d| weights.get(*d)).sum();
    if total <= 0.0 || !total.is_finite() {
        return Err(AggregationError::InvalidWeights(total));
    }
    Ok(present
        .iter()
        .map(|d| (*d, weights.get(*d) / total))
        .collect())
}

/// Highest-confidence recommendations first; ties go to the earlier
/// recommendation, then the earlier tool. Duplicates compare case-insensitively.
pub fn quick_wins(outputs: &[&ToolOutput], limit: usize) -> Vec<String> {
    let mut candidates: Vec<(f64, usize, usize, &str)> = outputs
        .iter()
        .enumerate()
        .filter(|(_, o)| o.is_usable())
        .flat_map(|(tool_pos, o)| {
            o.recommendations
                .iter()
                .enumerate()
                .map(move |(rec_pos, r)| (o.confidence_score, rec_pos, tool_pos, r.as_str()))
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.0.total_cmp(&a.0)
            .then(a.1.cmp(&b.1))
            .then(a.2.cmp(&b.2))
    });

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .map(|(_, _, _, text)| text.trim())
        .filter(|text| !text.is_empty() && seen.insert(text.to_lowercase()))
        .take(limit)
        .map(str::to_string)
        .collect()
}
