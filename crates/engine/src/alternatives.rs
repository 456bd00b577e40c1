//! Deterministic alternative copy generation.

use adcopy_core::types::{ToolInput, Variant, VariantType};
use adcopy_tools::lexicon::{Lexicon, PlatformProfile};
use adcopy_tools::text::{lowercase_first, prefixed, truncate_words};
use std::sync::Arc;

use crate::insights::CopyInsights;

const EMOJI_PALETTE: [&str; 6] = ["🚀", "✨", "💡", "🎯", "🔥", "⭐"];

/// Emoji chosen from the headline itself so identical input always yields the
/// same variant.
pub fn emoji_for(headline: &str) -> &'static str {
    let sum: u64 = headline.chars().map(|c| c as u64).sum();
    EMOJI_PALETTE[(sum % EMOJI_PALETTE.len() as u64) as usize]
}

#[derive(Debug, Clone)]
pub struct AlternativeGenerator {
    lexicon: Arc<Lexicon>,
    include_emojis: bool,
}

impl AlternativeGenerator {
    pub fn new(lexicon: Arc<Lexicon>, include_emojis: bool) -> Self {
        Self {
            lexicon,
            include_emojis,
        }
    }

    /// Persuasive, emotional and urgency variants, plus a platform-optimized
    /// one when the platform has a known profile.
    pub fn generate(&self, input: &ToolInput, insights: &CopyInsights) -> Vec<Variant> {
        let mut variants = vec![
            persuasive(input, insights),
            emotional(input, insights, &self.lexicon),
            urgency(input, insights),
        ];
        if let Some(profile) = input.platform().and_then(|p| self.lexicon.platform(p)) {
            variants.push(self.platform_optimized(input, insights, profile));
        }
        variants
    }

    fn platform_optimized(
        &self,
        input: &ToolInput,
        insights: &CopyInsights,
        profile: &PlatformProfile,
    ) -> Variant {
        let platform = profile.platform;
        let mut reasons = Vec::new();

        match insights.headline_over_limit {
            Some(true) => reasons.push(format!(
                "shortened the headline to the {}-character {} limit because it ran over",
                profile.headline_max_chars, platform
            )),
            Some(false) => {}
            None => reasons.push(format!(
                "applied the {} length limits directly because platform fit could not be assessed",
                platform
            )),
        }
        if insights.body_over_limit == Some(true) {
            reasons.push(format!(
                "trimmed the body to {} characters because it exceeded the {} limit",
                profile.body_max_chars, platform
            ));
        }

        let use_emoji = self.include_emojis && profile.emoji_friendly;
        let headline = if use_emoji {
            let emoji = emoji_for(&input.headline);
            let budget = profile.headline_max_chars.saturating_sub(2);
            reasons.push(format!("added a {emoji} lead because {platform} audiences respond to emoji"));
            prefixed(emoji, &truncate_words(&input.headline, budget))
        } else {
            truncate_words(&input.headline, profile.headline_max_chars)
        };
        let body_text = truncate_words(&input.body_text, profile.body_max_chars);

        let mut cta_words: Vec<&str> = if insights.cta_has_action_verb == Some(false) {
            reasons.push("led the CTA with an action verb because none was detected".to_string());
            vec!["Get", "Started"]
        } else {
            input.cta.split_whitespace().collect()
        };
        if cta_words.len() > profile.cta_max_words {
            cta_words.truncate(profile.cta_max_words);
            reasons.push(format!(
                "cut the CTA to {} words for {}",
                profile.cta_max_words, platform
            ));
        }
        if profile.cta_prefers_urgency
            && insights.has_urgency != Some(true)
            && cta_words.len() < profile.cta_max_words
        {
            cta_words.push("Now");
            reasons.push(format!("added 'Now' to the CTA because {platform} rewards urgency"));
        }

        if reasons.is_empty() {
            reasons.push(format!("kept the copy within {platform} limits"));
        }

        Variant {
            variant_type: VariantType::PlatformOptimized,
            headline,
            body_text,
            cta: cta_words.join(" "),
            improvement_reason: capitalize(&reasons.join("; ")),
        }
    }
}

fn persuasive(input: &ToolInput, insights: &CopyInsights) -> Variant {
    let reason = match insights.has_social_proof {
        Some(false) => "Added social proof because none was detected".to_string(),
        Some(true) => "Led with a credibility claim to reinforce the existing social proof".to_string(),
        None => "Added social proof; its presence could not be assessed because the persuasion analysis did not succeed".to_string(),
    };
    let reason = match insights.has_power_words {
        Some(false) => format!("{reason}; opened with the power word 'Proven' because none were found"),
        _ => reason,
    };

    Variant {
        variant_type: VariantType::Persuasive,
        headline: prefixed("Proven:", &input.headline),
        body_text: prefixed(
            "Join thousands who already discovered",
            &lowercase_first(&input.body_text),
        ),
        cta: "Get Started Now".to_string(),
        improvement_reason: reason,
    }
}

fn emotional(input: &ToolInput, insights: &CopyInsights, lexicon: &Lexicon) -> Variant {
    let reason = match insights.primary_emotion.as_deref() {
        None => "Added aspirational framing; the dominant emotion could not be assessed because the emotion analysis did not succeed".to_string(),
        Some(e) if lexicon.is_negative_emotion(e) => format!(
            "Added aspirational language because the dominant emotion was '{e}'"
        ),
        Some(e) => format!("Amplified the existing '{e}' tone with transformation framing"),
    };
    Variant {
        variant_type: VariantType::Emotional,
        headline: prefixed("Transform Your Business with", &input.headline),
        body_text: prefixed("Imagine the results:", &input.body_text),
        cta: "Claim Your Success".to_string(),
        improvement_reason: reason,
    }
}

fn urgency(input: &ToolInput, insights: &CopyInsights) -> Variant {
    let reason = match insights.has_urgency {
        Some(false) => "Added urgency words because none were detected".to_string(),
        Some(true) => "Intensified the urgency already present with a deadline".to_string(),
        None => "Added urgency words; urgency could not be assessed because the emotion and CTA analyses did not succeed".to_string(),
    };
    Variant {
        variant_type: VariantType::Urgency,
        headline: format!("{} - Limited Time", input.headline.trim()),
        body_text: format!(
            "Don't wait! {} Act fast - offer expires soon.",
            input.body_text.trim()
        ),
        cta: "Act Now".to_string(),
        improvement_reason: reason,
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adcopy_core::types::AdCopy;

    fn generator(include_emojis: bool) -> AlternativeGenerator {
        AlternativeGenerator::new(Lexicon::bundled().unwrap(), include_emojis)
    }

    fn input(headline: &str, body: &str, cta: &str, platform: &str) -> ToolInput {
        ToolInput::new(&AdCopy::new(headline, body, cta, platform))
    }

    #[test]
    fn test_templates() {
        let ad = input("Fast and Easy", "Our tool saves you time.", "Try now", "google");
        let insights = CopyInsights {
            has_urgency: Some(false),
            has_social_proof: Some(false),
            has_power_words: Some(true),
            primary_emotion: Some("urgency".into()),
            ..Default::default()
        };
        let variants = generator(true).generate(&ad, &insights);
        assert_eq!(variants.len(), 4);

        assert_eq!(variants[0].headline, "Proven: Fast and Easy");
        assert_eq!(
            variants[0].body_text,
            "Join thousands who already discovered our tool saves you time."
        );
        assert_eq!(variants[0].improvement_reason, "Added social proof because none was detected");

        assert_eq!(variants[1].headline, "Transform Your Business with Fast and Easy");
        assert!(variants[1].improvement_reason.contains("'urgency'"));

        assert_eq!(variants[2].headline, "Fast and Easy - Limited Time");
        assert_eq!(
            variants[2].body_text,
            "Don't wait! Our tool saves you time. Act fast - offer expires soon."
        );
        assert_eq!(variants[2].cta, "Act Now");
        assert_eq!(
            variants[2].improvement_reason,
            "Added urgency words because none were detected"
        );
    }

    #[test]
    fn test_unknown_flags_are_reported() {
        let ad = input("Fast and Easy", "Body.", "Try now", "google");
        let variants = generator(true).generate(&ad, &CopyInsights::default());
        assert!(variants[2].improvement_reason.contains("could not be assessed"));
        assert!(variants[3].improvement_reason.contains("could not be assessed"));
    }

    #[test]
    fn test_platform_variant_respects_limits() {
        let ad = input(
            "The Most Complete Accounting Suite For Growing Businesses",
            "Save hours every week.",
            "Start your free trial of the suite today",
            "google",
        );
        let insights = CopyInsights {
            headline_over_limit: Some(true),
            body_over_limit: Some(false),
            cta_has_action_verb: Some(true),
            ..Default::default()
        };
        let variant = generator(true).generate(&ad, &insights).pop().unwrap();
        assert_eq!(variant.variant_type, VariantType::PlatformOptimized);
        assert!(variant.headline.chars().count() <= 30);
        assert_eq!(variant.headline, "The Most Complete Accounting");
        assert_eq!(variant.cta, "Start your free trial");
        assert!(variant.improvement_reason.starts_with("Shortened the headline"));
    }

    #[test]
    fn test_emoji_is_deterministic_and_platform_gated() {
        assert_eq!(emoji_for("Fast and Easy"), emoji_for("Fast and Easy"));

        let insights = CopyInsights::default();
        let fb = input("Fast and Easy", "Body.", "Try now", "facebook");
        let a = generator(true).generate(&fb, &insights);
        let b = generator(true).generate(&fb, &insights);
        assert_eq!(a, b);
        assert!(a[3].headline.starts_with(emoji_for("Fast and Easy")));

        let off = generator(false).generate(&fb, &insights);
        assert_eq!(off[3].headline, "Fast and Easy");

        let linkedin = input("Fast and Easy", "Body.", "Try now", "linkedin");
        let li = generator(true).generate(&linkedin, &insights);
        assert_eq!(li[3].headline, "Fast and Easy");
    }

    #[test]
    fn test_tiktok_cta_gets_urgency_within_budget() {
        let ad = input("Glow Up", "New serum.", "Shop", "tiktok");
        let insights = CopyInsights {
            has_urgency: Some(false),
            cta_has_action_verb: Some(true),
            headline_over_limit: Some(false),
            ..Default::default()
        };
        let variant = generator(false).generate(&ad, &insights).pop().unwrap();
        assert_eq!(variant.cta, "Shop Now");
    }

    #[test]
    fn test_unsupported_platform_has_no_platform_variant() {
        let ad = input("H", "B", "C", "myspace");
        assert_eq!(generator(true).generate(&ad, &CopyInsights::default()).len(), 3);
    }
}
