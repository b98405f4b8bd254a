//! Distraction scoring policies.
//!
//! Policy A (`subjectivity`):
//!   score = 0.6 * subjectivity + 0.4 * |polarity|
//!
//! Policy B (`spike_divergence`):
//!   spike      = |polarity(text)|, or |polarity(text) - polarity(baseline)| with a baseline
//!   divergence = 0.7 * hyperbole_ratio + 0.3 * (1 - entity_ratio)
//!   score      = 0.4 * spike + 0.6 * divergence
//!
//! Every value leaving this module is clamped into its range and rounded to 3 decimals.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::oracle::Doc;
use crate::sentiment::Sentiment;

const W_SUBJECTIVITY: f32 = 0.6;
const W_EXTREMITY: f32 = 0.4;

const W_SPIKE: f32 = 0.4;
const W_DIVERGENCE: f32 = 0.6;

const W_HYPERBOLE: f32 = 0.7;
const W_ENTITY_GAP: f32 = 0.3;

/// Tokens per expected entity when computing entity density.
const TOKENS_PER_ENTITY: f32 = 10.0;

pub const HIGH_THRESHOLD: f32 = 0.7;
pub const MODERATE_THRESHOLD: f32 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPolicy {
    /// Policy A: sentiment extremity + subjectivity.
    #[serde(alias = "a")]
    Subjectivity,
    /// Policy B: sentiment spike + topical divergence.
    #[default]
    #[serde(alias = "b")]
    SpikeDivergence,
}

impl ScoringPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            ScoringPolicy::Subjectivity => "subjectivity",
            ScoringPolicy::SpikeDivergence => "spike_divergence",
        }
    }

    /// Whether the policy needs tagged documents to be meaningful.
    pub fn needs_tagger(self) -> bool {
        matches!(self, ScoringPolicy::SpikeDivergence)
    }
}

impl fmt::Display for ScoringPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoringPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "subjectivity" => Ok(ScoringPolicy::Subjectivity),
            "b" | "spike_divergence" | "spike-divergence" => Ok(ScoringPolicy::SpikeDivergence),
            other => Err(format!("unknown scoring policy `{other}`")),
        }
    }
}

/// Human-readable tier of a distraction score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    High,
    Moderate,
    Low,
}

impl Tier {
    pub fn from_score(score: f32) -> Self {
        if score >= HIGH_THRESHOLD {
            Tier::High
        } else if score >= MODERATE_THRESHOLD {
            Tier::Moderate
        } else {
            Tier::Low
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Tier::High => "High distraction content detected. Consider skipping.",
            Tier::Moderate => "Moderate distraction level. Read critically.",
            Tier::Low => "Low distraction content. Appears informative.",
        }
    }
}

/// Round to 3 decimal places (half away from zero).
pub fn round3(x: f32) -> f32 {
    (x * 1000.0).round() / 1000.0
}

fn unit(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// Policy A output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubjectivityScore {
    pub distraction_score: f32,
    pub sentiment: f32,
    pub subjectivity: f32,
}

pub fn score_subjectivity(s: Sentiment) -> SubjectivityScore {
    let polarity = s.polarity.clamp(-1.0, 1.0);
    let subjectivity = unit(s.subjectivity);
    let raw = W_SUBJECTIVITY * subjectivity + W_EXTREMITY * polarity.abs();
    SubjectivityScore {
        distraction_score: round3(unit(raw)),
        sentiment: round3(polarity),
        subjectivity: round3(subjectivity),
    }
}

/// Sentiment spike in [0,1]; `baseline_polarity` is `None` when no baseline was given.
pub fn sentiment_spike(polarity: f32, baseline_polarity: Option<f32>) -> f32 {
    let spike = match baseline_polarity {
        Some(base) => (polarity - base).abs(),
        None => polarity.abs(),
    };
    unit(spike)
}

/// Topical divergence in [0,1]. `None` (tagger not loaded) and empty documents yield 0.
pub fn topical_divergence(doc: Option<&Doc>) -> f32 {
    let Some(doc) = doc else {
        return 0.0;
    };
    let total = doc.content_token_count();
    if total == 0 {
        return 0.0;
    }
    let total = total as f32;
    let hyperbole_ratio = doc.hyperbolic_token_count() as f32 / total;
    let entity_ratio = (doc.entity_count() as f32 / (total / TOKENS_PER_ENTITY).max(1.0)).min(1.0);
    unit(W_HYPERBOLE * hyperbole_ratio + W_ENTITY_GAP * (1.0 - entity_ratio))
}

/// Policy B output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpikeDivergenceScore {
    pub distraction_score: f32,
    pub sentiment_spike: f32,
    pub topical_divergence: f32,
}

pub fn score_spike_divergence(spike: f32, divergence: f32) -> SpikeDivergenceScore {
    let spike = unit(spike);
    let divergence = unit(divergence);
    SpikeDivergenceScore {
        distraction_score: round3(unit(W_SPIKE * spike + W_DIVERGENCE * divergence)),
        sentiment_spike: round3(spike),
        topical_divergence: round3(divergence),
    }
}
