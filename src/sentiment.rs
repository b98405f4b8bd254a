use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::oracle::tokenize::words;

/// One lexicon row: polarity in [-1,1], subjectivity in [0,1], optional intensity
/// for modifiers such as "very" or "extremely".
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LexiconEntry {
    pub polarity: f32,
    pub subjectivity: f32,
    #[serde(default)]
    pub intensity: Option<f32>,
}

static LEXICON: Lazy<HashMap<String, LexiconEntry>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, LexiconEntry>>(raw).expect("valid sentiment lexicon")
});

/// Polarity and subjectivity of a text, both already clamped into range.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Sentiment {
    pub polarity: f32,
    pub subjectivity: f32,
}

#[derive(Debug, Clone, Default)]
pub struct SentimentAnalyzer;

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn entry(&self, w: &str) -> Option<LexiconEntry> {
        LEXICON.get(w).copied()
    }

    /// Averages the lexicon assessments found in `text`.
    ///
    /// Modifiers: a word with `intensity` directly followed by another lexicon word scales
    /// that word's polarity and subjectivity and is not assessed on its own.
    /// Negation: a negator in the 1..=3 preceding tokens multiplies polarity by -0.5.
    pub fn analyze(&self, text: &str) -> Sentiment {
        let tokens = words(text);
        let mut assessments: Vec<(f32, f32)> = Vec::new();
        let mut pending_intensity: Option<f32> = None;

        for i in 0..tokens.len() {
            let Some(entry) = self.entry(tokens[i].as_str()) else {
                pending_intensity = None;
                continue;
            };

            let next_is_lexical = tokens
                .get(i + 1)
                .is_some_and(|n| self.entry(n.as_str()).is_some());
            if let (Some(k), true) = (entry.intensity, next_is_lexical) {
                // stacked modifiers ("very very") multiply
                pending_intensity = Some(pending_intensity.unwrap_or(1.0) * k);
                continue;
            }

            let scale = pending_intensity.take().unwrap_or(1.0);
            let mut polarity = entry.polarity * scale;
            let subjectivity = entry.subjectivity * scale;

            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            if negated {
                polarity *= -0.5;
            }
            assessments.push((polarity, subjectivity));
        }

        if assessments.is_empty() {
            return Sentiment::default();
        }
        let n = assessments.len() as f32;
        let polarity = assessments.iter().map(|a| a.0).sum::<f32>() / n;
        let subjectivity = assessments.iter().map(|a| a.1).sum::<f32>() / n;
        Sentiment {
            polarity: polarity.clamp(-1.0, 1.0),
            subjectivity: subjectivity.clamp(0.0, 1.0),
        }
    }

    /// Number of lexicon entries (diagnostics for `/`).
    pub fn lexicon_size(&self) -> usize {
        LEXICON.len()
    }
}

/// Single-token negators ("no longer" is covered by "no").
fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "weren't"
            | "won't"
            | "can't"
            | "cannot"
            | "don't"
            | "doesn't"
            | "didn't"
            | "hardly"
            | "without"
    )
}
