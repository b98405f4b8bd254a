// src/analyze/mod.rs
//! Analysis pipeline: validation → oracle → scoring policy → tier → de-painting.

pub mod depaint;
pub mod scoring;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::oracle::{Doc, TextOracle};
pub use depaint::{de_paint, de_paint_or_passthrough, normalize_whitespace, DePainted};
pub use scoring::{
    round3, score_spike_divergence, score_subjectivity, sentiment_spike, topical_divergence,
    ScoringPolicy, SpikeDivergenceScore, SubjectivityScore, Tier,
};

/// Body of `POST /analyze` and `POST /api/analyze`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisRequest {
    pub text: String,
    #[serde(default)]
    pub baseline_text: Option<String>,
    /// Page URL the text came from (echoed back, never fetched).
    #[serde(default)]
    pub url: Option<String>,
}

impl AnalysisRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_baseline(mut self, baseline: impl Into<String>) -> Self {
        self.baseline_text = Some(baseline.into());
        self
    }

    /// Baseline text, if present and not blank.
    fn baseline(&self) -> Option<&str> {
        self.baseline_text
            .as_deref()
            .filter(|b| !b.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub distraction_score: f32,
    pub sentiment: f32,
    pub subjectivity: f32,
    pub analysis: String,
    pub policy: ScoringPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment_spike: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topical_divergence: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjective_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub de_painted_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DePaintResult {
    pub original_text: String,
    pub de_painted_text: String,
    pub removed_adjectives: Vec<String>,
    /// True when the tagger is not loaded and the text passed through unchanged.
    #[serde(skip)]
    pub degraded: bool,
}

/// Request-level failures.
#[derive(Debug)]
pub enum AnalyzeError {
    /// Empty or whitespace-only text.
    EmptyText,
    TextTooLong { chars: usize, max: usize },
    /// Tagger model not provisioned.
    OracleUnavailable,
    Internal(anyhow::Error),
}

impl fmt::Display for AnalyzeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyzeError::EmptyText => f.write_str("Text cannot be empty"),
            AnalyzeError::TextTooLong { chars, max } => {
                write!(f, "Text is too long: {chars} characters (max {max})")
            }
            AnalyzeError::OracleUnavailable => f.write_str("NLP tagger model not loaded"),
            AnalyzeError::Internal(e) => write!(f, "Analysis failed: {e:#}"),
        }
    }
}

impl std::error::Error for AnalyzeError {}

impl From<anyhow::Error> for AnalyzeError {
    fn from(e: anyhow::Error) -> Self {
        AnalyzeError::Internal(e)
    }
}

/// Reject blank text and text above `max_chars`.
pub fn validate_text(text: &str, max_chars: usize) -> Result<(), AnalyzeError> {
    if text.trim().is_empty() {
        return Err(AnalyzeError::EmptyText);
    }
    let chars = text.chars().count();
    if chars > max_chars {
        return Err(AnalyzeError::TextTooLong {
            chars,
            max: max_chars,
        });
    }
    Ok(())
}

/// Scorer + transform over a shared oracle.
#[derive(Debug, Clone)]
pub struct Analyzer {
    oracle: Arc<TextOracle>,
    policy: ScoringPolicy,
    max_text_chars: usize,
}

impl Analyzer {
    pub fn new(oracle: Arc<TextOracle>, policy: ScoringPolicy, max_text_chars: usize) -> Self {
        Self {
            oracle,
            policy,
            max_text_chars,
        }
    }

    pub fn oracle(&self) -> &TextOracle {
        &self.oracle
    }

    pub fn policy(&self) -> ScoringPolicy {
        self.policy
    }

    pub fn max_text_chars(&self) -> usize {
        self.max_text_chars
    }

    /// Score `req.text` under the configured policy.
    ///
    /// Policy B requires the tagger; policy A only needs sentiment. When the tagger is
    /// loaded the result also carries the de-painted text and the removed-token count.
    pub fn analyze(&self, req: &AnalysisRequest) -> Result<AnalysisResult, AnalyzeError> {
        validate_text(&req.text, self.max_text_chars)?;
        if self.policy.needs_tagger() && !self.oracle.tagger_loaded() {
            return Err(AnalyzeError::OracleUnavailable);
        }

        let sentiment = self.oracle.sentiment(&req.text);
        let doc: Option<Doc> = match self.policy {
            ScoringPolicy::SpikeDivergence => self.oracle.annotate(&req.text)?,
            // the score only needs sentiment; de-painting fields are dropped instead
            ScoringPolicy::Subjectivity => self.oracle.annotate(&req.text).unwrap_or_else(|e| {
                warn!(error = %format!("{e:#}"), "tagger failed; omitting de-painted fields");
                None
            }),
        };
        let base = score_subjectivity(sentiment);

        let (distraction_score, spike, divergence) = match self.policy {
            ScoringPolicy::Subjectivity => (base.distraction_score, None, None),
            ScoringPolicy::SpikeDivergence => {
                let baseline = req
                    .baseline()
                    .map(|b| self.oracle.sentiment(b).polarity);
                let s = score_spike_divergence(
                    sentiment_spike(sentiment.polarity, baseline),
                    topical_divergence(doc.as_ref()),
                );
                (
                    s.distraction_score,
                    Some(s.sentiment_spike),
                    Some(s.topical_divergence),
                )
            }
        };

        let painted = doc.as_ref().map(de_paint);
        Ok(AnalysisResult {
            distraction_score,
            sentiment: base.sentiment,
            subjectivity: base.subjectivity,
            analysis: Tier::from_score(distraction_score).message().to_string(),
            policy: self.policy,
            sentiment_spike: spike,
            topical_divergence: divergence,
            adjective_count: painted.as_ref().map(|p| p.removed.len()),
            original_text: painted.as_ref().map(|_| req.text.clone()),
            de_painted_text: painted.map(|p| p.text),
            url: req.url.clone(),
        })
    }

    /// Strip adjectives/adverbs. Without a tagger the text passes through unchanged.
    pub fn depaint(&self, text: &str) -> Result<DePaintResult, AnalyzeError> {
        validate_text(text, self.max_text_chars)?;
        let doc = self.oracle.annotate(text)?;
        let out = de_paint_or_passthrough(text, doc.as_ref());
        Ok(DePaintResult {
            original_text: text.to_string(),
            de_painted_text: out.text,
            removed_adjectives: out.removed,
            degraded: doc.is_none(),
        })
    }
}
