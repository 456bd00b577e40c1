//! Ad-copy analysis tools and the registry that holds them.
//!
//! # Modules
//! - `tool` — The `Tool` contract, `ToolReport` and `ToolFactory`
//! - `registry` — Name-indexed tool registry in registration order
//! - `catalog` — Built-in tool kinds and their factories
//! - `lexicon` — Keyword tables, platform profiles and brand voice data
//! - `readability`, `persuasion`, `emotion`, `cta`, `platform_fit` — Analyzers
//! - `brand_voice` — Brand voice alignment optimizer

pub mod brand_voice;
pub mod catalog;
pub mod cta;
pub mod emotion;
pub mod lexicon;
pub mod persuasion;
pub mod platform_fit;
pub mod readability;
pub mod registry;
pub mod text;
pub mod tool;

pub use catalog::{BuiltinFactory, ToolContext, ToolKind};
pub use emotion::{EmotionClassifier, EmotionPrediction, LexiconEmotionClassifier};
pub use lexicon::{BrandVoiceLexicon, Lexicon};
pub use registry::{RegistryEntry, ToolRegistry};
pub use tool::{Tool, ToolFactory, ToolReport};
