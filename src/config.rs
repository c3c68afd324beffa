use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

/// Weights for each signal that contributes to a candidate's score.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Multiplier for the edit-distance title similarity (0..=1)
    pub title: f64,
    /// Added when the whole source title appears in the candidate title
    pub title_substring: f64,
    /// Added per source title word (longer than 2 chars) found in the candidate title
    pub title_word: f64,
    /// Added when the primary artist appears in the candidate's contributors
    pub artist: f64,
    pub artist_word: f64,
    pub song_kind: f64,
    pub official: f64,
    pub positive_signal: f64,
    /// Subtracted when the candidate title carries a negative signal term
    pub negative_signal: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            title: 1.0,
            title_substring: 0.3,
            title_word: 0.05,
            artist: 0.4,
            artist_word: 0.05,
            song_kind: 0.15,
            official: 0.05,
            positive_signal: 0.05,
            negative_signal: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub weights: ScoringWeights,
    /// Terms in a candidate title that suggest a canonical upload
    pub positive_terms: Vec<String>,
    /// Terms in a candidate title that suggest a derivative recording
    pub negative_terms: Vec<String>,
    /// Best candidates scoring below this are rejected
    pub acceptance_threshold: f64,
    /// Stop issuing queries once the best score exceeds this
    pub strong_match_cutoff: Option<f64>,
    /// Queries tried after `{title} {artist}`, in priority order
    pub query_templates: Vec<String>,
    pub query_timeout_secs: u64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            positive_terms: ["official", "audio", "soundtrack", "ost"]
                .map(String::from)
                .to_vec(),
            negative_terms: ["slowed", "reverb", "sped up", "remix", "live", "trap", "mix"]
                .map(String::from)
                .to_vec(),
            acceptance_threshold: 0.55,
            strong_match_cutoff: Some(1.6),
            query_templates: [
                "{title} {artist} official audio",
                "{title} {artist} lyrics",
                "{title}",
            ]
            .map(String::from)
            .to_vec(),
            query_timeout_secs: 10,
        }
    }
}

impl MatchConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let w = &self.weights;
        for (name, value) in [
            ("weights.title", w.title),
            ("weights.title_substring", w.title_substring),
            ("weights.title_word", w.title_word),
            ("weights.artist", w.artist),
            ("weights.artist_word", w.artist_word),
            ("weights.song_kind", w.song_kind),
            ("weights.official", w.official),
            ("weights.positive_signal", w.positive_signal),
            ("weights.negative_signal", w.negative_signal),
            ("acceptance_threshold", self.acceptance_threshold),
        ] {
            ensure!(value.is_finite(), "{name} must be a finite number");
        }
        if let Some(cutoff) = self.strong_match_cutoff {
            ensure!(cutoff.is_finite(), "strong_match_cutoff must be a finite number");
        }
        for template in &self.query_templates {
            ensure!(
                !template.trim().is_empty(),
                "query templates must not be empty",
            );
        }
        ensure!(self.query_timeout_secs > 0, "query_timeout_secs must be positive");
        Ok(())
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}
