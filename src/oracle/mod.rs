// src/oracle/mod.rs
//! Text oracle: sentiment engine + optional part-of-speech/entity tagger.
//!
//! Built once at startup and shared read-only across requests. The sentiment lexicon is
//! compiled into the binary; the tagger model is provisioned by the operator, so it may be
//! missing, in which case callers see `None` from `annotate` and degrade.

pub mod tagger;
pub mod tokenize;

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::sentiment::{Sentiment, SentimentAnalyzer};
pub use tagger::{Doc, Entity, LexiconTagger, Pos, PosTagger, TaggedToken};

/// Shared handle to a tagger implementation.
pub type DynTagger = Arc<dyn PosTagger>;

pub struct TextOracle {
    sentiment: SentimentAnalyzer,
    tagger: Option<DynTagger>,
}

impl TextOracle {
    pub fn new(tagger: Option<DynTagger>) -> Self {
        Self {
            sentiment: SentimentAnalyzer::new(),
            tagger,
        }
    }

    /// Oracle without a tagger (degraded mode).
    pub fn sentiment_only() -> Self {
        Self::new(None)
    }

    /// Try to load the lexicon tagger from `model_path`. A missing or broken model is
    /// not fatal: it is logged and the oracle starts in degraded mode.
    pub fn load(model_path: &Path) -> Self {
        match LexiconTagger::load(model_path) {
            Ok(t) => {
                info!(
                    model = t.model_name(),
                    version = t.version().unwrap_or("unknown"),
                    path = %model_path.display(),
                    "tagger model loaded"
                );
                Self::new(Some(Arc::new(t)))
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "tagger model not loaded; running degraded");
                Self::sentiment_only()
            }
        }
    }

    pub fn sentiment(&self, text: &str) -> Sentiment {
        self.sentiment.analyze(text)
    }

    /// Tag `text`; `Ok(None)` when no tagger is loaded.
    pub fn annotate(&self, text: &str) -> anyhow::Result<Option<Doc>> {
        match &self.tagger {
            Some(t) => t.annotate(text).map(Some),
            None => Ok(None),
        }
    }

    pub fn tagger_loaded(&self) -> bool {
        self.tagger.is_some()
    }

    pub fn model_name(&self) -> Option<&str> {
        self.tagger.as_deref().map(|t| t.model_name())
    }

    pub fn lexicon_size(&self) -> usize {
        self.sentiment.lexicon_size()
    }
}

impl std::fmt::Debug for TextOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextOracle")
            .field("tagger", &self.model_name())
            .finish()
    }
}
