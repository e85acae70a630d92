//! Engine configuration: matching thresholds and verification bands.
//!
//! Every field has a default, so an empty JSON object is a valid config.

use crate::error::{Error, Result};
use crate::matcher::Strategy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub matcher: MatcherConfig,
    pub verifier: VerifierConfig,
}

impl EngineConfig {
    /// Parse a configuration from JSON text and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject values that would break the confidence contract.
    pub fn validate(&self) -> Result<()> {
        let m = &self.matcher;
        if !(m.position_tolerance > 0.0) {
            return Err(Error::Config(format!(
                "position_tolerance must be positive, got {}",
                m.position_tolerance
            )));
        }
        if !(0.0..=1.0).contains(&m.similarity_min) {
            return Err(Error::Config(format!(
                "similarity_min must be within [0, 1], got {}",
                m.similarity_min
            )));
        }
        let similarity_min_confidence = Strategy::ContentSimilarity.min_confidence();
        if !(similarity_min_confidence <= m.similarity_confidence_floor
            && m.similarity_confidence_floor <= m.similarity_confidence_ceiling
            && m.similarity_confidence_ceiling <= 1.0)
        {
            return Err(Error::Config(format!(
                "similarity confidence band [{}, {}] is not inside [{}, 1]",
                m.similarity_confidence_floor,
                m.similarity_confidence_ceiling,
                similarity_min_confidence
            )));
        }

        let v = &self.verifier;
        if !(0.0 <= v.critical_below && v.critical_below <= v.pass_at && v.pass_at <= 1.0) {
            return Err(Error::Config(format!(
                "verification bands must satisfy 0 <= critical_below ({}) <= pass_at ({}) <= 1",
                v.critical_below, v.pass_at
            )));
        }
        Ok(())
    }
}

/// A layout archetype the layout-pattern strategy recognizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPattern {
    /// Matched case-insensitively as a substring of the slide's layout name.
    pub archetype: String,
    /// Confidence reported for matches on this archetype.
    pub confidence: f64,
}

impl LayoutPattern {
    /// Lowest confidence a layout-pattern match may report.
    pub const MIN_CONFIDENCE: f64 = 0.7;
    /// Highest confidence a layout-pattern match may report.
    pub const MAX_CONFIDENCE: f64 = 0.85;

    pub fn new(archetype: impl Into<String>, confidence: f64) -> Self {
        Self {
            archetype: archetype.into(),
            confidence,
        }
    }

    /// Whether this pattern applies to a slide layout name.
    pub fn recognizes(&self, layout: &str) -> bool {
        !self.archetype.is_empty()
            && layout
                .to_lowercase()
                .contains(&self.archetype.to_lowercase())
    }

    /// Configured confidence, held inside the layout-pattern band.
    pub fn effective_confidence(&self) -> f64 {
        if self.confidence.is_nan() {
            return Self::MIN_CONFIDENCE;
        }
        self.confidence
            .clamp(Self::MIN_CONFIDENCE, Self::MAX_CONFIDENCE)
    }
}

/// Thresholds for the matching strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Distance between normalized centers at which position confidence hits 0.
    pub position_tolerance: f64,

    /// Minimum Dice coefficient for a content-similarity candidate.
    pub similarity_min: f64,

    /// Lower bound of content-similarity confidence.
    pub similarity_confidence_floor: f64,

    /// Upper bound of content-similarity confidence.
    pub similarity_confidence_ceiling: f64,

    /// Archetypes handled by the layout-pattern strategy, first match wins.
    pub layout_patterns: Vec<LayoutPattern>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            position_tolerance: 0.5,
            similarity_min: 0.3,
            similarity_confidence_floor: 0.3,
            similarity_confidence_ceiling: 0.6,
            layout_patterns: vec![
                LayoutPattern::new("Two Content", 0.85),
                LayoutPattern::new("Comparison", 0.8),
            ],
        }
    }
}

impl MatcherConfig {
    /// The first layout pattern recognizing `layout`.
    pub fn layout_pattern(&self, layout: &str) -> Option<&LayoutPattern> {
        self.layout_patterns.iter().find(|p| p.recognizes(layout))
    }
}

/// Known default prompts, compared after normalization.
const DEFAULT_PLACEHOLDER_TEXTS: &[&str] = &[
    "Click to add text",
    "Click to add title",
    "Click to add subtitle",
    "Click to add notes",
    "Click to edit Master title style",
    "Click to edit Master subtitle style",
    "Click to edit Master text styles",
    "Click icon to add picture",
    "Click icon to add table",
    "Add your text here",
    "Type your text here",
    "Enter your content here",
    "Lorem ipsum",
    // fr
    "Cliquez pour ajouter du texte",
    "Cliquez pour ajouter un titre",
    "Cliquez pour ajouter un sous-titre",
    // de
    "Text durch Klicken hinzufügen",
    "Titel durch Klicken hinzufügen",
    "Untertitel durch Klicken hinzufügen",
    // es
    "Haga clic para agregar texto",
    "Haga clic para agregar título",
    "Haga clic para agregar subtítulo",
    // it
    "Fare clic per aggiungere testo",
    "Fare clic per aggiungere un titolo",
    // pt
    "Clique para adicionar texto",
    "Clique para adicionar um título",
    // nl
    "Klik om tekst toe te voegen",
    "Klik om titel toe te voegen",
];

/// Classification bands for the verifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Vendor prompt strings that mean a placeholder was never filled.
    pub default_texts: Vec<String>,

    /// Similarity below this is a Critical mismatch.
    pub critical_below: f64,

    /// Similarity at or above this is a pass.
    pub pass_at: f64,

    /// Number of Warnings a report may carry and still be `Warning` rather than `Fail`.
    pub warning_budget: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            default_texts: DEFAULT_PLACEHOLDER_TEXTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            critical_below: 0.4,
            pass_at: 0.8,
            warning_budget: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.matcher.position_tolerance, 0.5);
        assert_eq!(config.matcher.similarity_min, 0.3);
        assert_eq!(config.verifier.critical_below, 0.4);
        assert_eq!(config.verifier.pass_at, 0.8);
        assert!(config
            .verifier
            .default_texts
            .iter()
            .any(|t| t == "Click to add text"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_is_default() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_json_overrides() {
        let config = EngineConfig::from_json_str(
            r#"{
                "matcher": { "position_tolerance": 0.25 },
                "verifier": { "default_texts": ["Tippen Sie hier"] }
            }"#,
        )
        .unwrap();
        assert_eq!(config.matcher.position_tolerance, 0.25);
        assert_eq!(config.matcher.similarity_min, 0.3);
        assert_eq!(config.verifier.default_texts, vec!["Tippen Sie hier"]);
    }

    #[test]
    fn test_invalid_bands_rejected() {
        let err = EngineConfig::from_json_str(r#"{"verifier": {"critical_below": 0.9, "pass_at": 0.5}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = EngineConfig::from_json_str(r#"{"matcher": {"position_tolerance": 0}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_similarity_band_must_clear_strategy_threshold() {
        let err = EngineConfig::from_json_str(
            r#"{"matcher": {"similarity_confidence_floor": 0.1}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let config = EngineConfig::from_json_str(
            r#"{"matcher": {"similarity_confidence_floor": 0.3, "similarity_confidence_ceiling": 0.3}}"#,
        )
        .unwrap();
        assert_eq!(config.matcher.similarity_confidence_floor, 0.3);
    }

    #[test]
    fn test_malformed_json_is_json_error() {
        assert!(matches!(
            EngineConfig::from_json_str("{ not json"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_layout_pattern_recognition() {
        let config = MatcherConfig::default();
        assert_eq!(
            config.layout_pattern("Two Content").map(|p| p.confidence),
            Some(0.85)
        );
        assert_eq!(
            config.layout_pattern("comparison").map(|p| p.confidence),
            Some(0.8)
        );
        assert!(config.layout_pattern("Title and Content").is_none());
    }

    #[test]
    fn test_layout_confidence_clamped() {
        assert_eq!(LayoutPattern::new("X", 0.99).effective_confidence(), 0.85);
        assert_eq!(LayoutPattern::new("X", 0.1).effective_confidence(), 0.7);
        assert_eq!(LayoutPattern::new("X", 0.75).effective_confidence(), 0.75);
    }
}
