//! Typed summary of what the tools observed, consumed by the alternative
//! generator.

use adcopy_core::types::ToolOutput;
use adcopy_tools::{cta, emotion, persuasion, platform_fit, readability};
use serde::Serialize;
use serde_json::Value;

/// A `None` flag means the tool that assesses it did not succeed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CopyInsights {
    pub has_urgency: Option<bool>,
    pub has_trust: Option<bool>,
    pub has_social_proof: Option<bool>,
    pub has_power_words: Option<bool>,
    pub cta_has_action_verb: Option<bool>,
    pub primary_emotion: Option<String>,
    pub reading_grade: Option<f64>,
    pub headline_over_limit: Option<bool>,
    pub body_over_limit: Option<bool>,
}

fn find<'a>(outputs: &'a [ToolOutput], tool: &str) -> Option<&'a ToolOutput> {
    outputs.iter().find(|o| o.tool_name == tool && o.is_usable())
}

fn flag(outputs: &[ToolOutput], tool: &str, key: &str) -> Option<bool> {
    find(outputs, tool)
        .and_then(|o| o.insight(key))
        .and_then(Value::as_bool)
}

impl CopyInsights {
    pub fn from_outputs(outputs: &[ToolOutput]) -> Self {
        let has_power_words = find(outputs, readability::NAME)
            .and_then(|o| o.insight("power_words_found"))
            .and_then(Value::as_array)
            .map(|found| !found.is_empty());

        Self {
            // The CTA tool only reads the CTA, so it can confirm urgency but not rule it out.
            has_urgency: flag(outputs, emotion::NAME, "has_urgency")
                .or_else(|| flag(outputs, cta::NAME, "has_urgency").filter(|found| *found)),
            has_trust: flag(outputs, emotion::NAME, "has_trust"),
            has_social_proof: flag(outputs, persuasion::NAME, "has_social_proof"),
            has_power_words,
            cta_has_action_verb: flag(outputs, cta::NAME, "has_action_verb"),
            primary_emotion: find(outputs, emotion::NAME)
                .and_then(|o| o.insight("primary_emotion"))
                .and_then(Value::as_str)
                .map(str::to_string),
            reading_grade: find(outputs, readability::NAME)
                .and_then(|o| o.insight("grade_level"))
                .and_then(Value::as_f64),
            headline_over_limit: flag(outputs, platform_fit::NAME, "headline_over_limit"),
            body_over_limit: flag(outputs, platform_fit::NAME, "body_over_limit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adcopy_core::types::{ErrorKind, ToolCategory};
    use serde_json::json;
    use std::time::Duration;
    use uuid::Uuid;

    fn output(tool: &str, success: bool, insights: Value) -> ToolOutput {
        let mut out = ToolOutput::failed(
            tool,
            ToolCategory::Analyzer,
            Uuid::nil(),
            ErrorKind::Execution,
            "",
            Duration::ZERO,
        );
        if success {
            out.success = true;
            out.scores.insert("s".into(), 50.0);
            if let Value::Object(map) = insights {
                out.insights = map.into_iter().collect();
            }
        }
        out
    }

    #[test]
    fn test_flags_from_successful_tools() {
        let outputs = vec![
            output(
                emotion::NAME,
                true,
                json!({"has_urgency": false, "has_trust": true, "primary_emotion": "joy"}),
            ),
            output(readability::NAME, true, json!({"power_words_found": ["proven"], "grade_level": 6.2})),
            output(persuasion::NAME, false, json!({"has_social_proof": true})),
        ];
        let insights = CopyInsights::from_outputs(&outputs);
        assert_eq!(insights.has_urgency, Some(false));
        assert_eq!(insights.has_trust, Some(true));
        assert_eq!(insights.has_power_words, Some(true));
        assert_eq!(insights.primary_emotion.as_deref(), Some("joy"));
        assert_eq!(insights.reading_grade, Some(6.2));
        // persuasion failed, cta absent
        assert_eq!(insights.has_social_proof, None);
        assert_eq!(insights.cta_has_action_verb, None);
    }

    #[test]
    fn test_urgency_falls_back_to_cta() {
        let outputs = vec![output(cta::NAME, true, json!({"has_urgency": true}))];
        assert_eq!(CopyInsights::from_outputs(&outputs).has_urgency, Some(true));
    }

    #[test]
    fn test_cta_without_urgency_leaves_urgency_unknown() {
        let outputs = vec![
            output(emotion::NAME, false, Value::Null),
            output(cta::NAME, true, json!({"has_urgency": false})),
        ];
        assert_eq!(CopyInsights::from_outputs(&outputs).has_urgency, None);
    }
}
