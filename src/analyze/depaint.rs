//! De-painting: drop adjectives and adverbs, keep everything else with its spacing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::oracle::Doc;

static WS_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DePainted {
    pub text: String,
    /// Removed tokens in original order.
    pub removed: Vec<String>,
    /// Tokens that survived (same order as in the input).
    pub kept_count: usize,
}

/// Collapse whitespace runs to one space and trim.
pub fn normalize_whitespace(s: &str) -> String {
    WS_RUN.replace_all(s, " ").trim().to_string()
}

/// Strip ADJ/ADV tokens from a tagged document.
pub fn de_paint(doc: &Doc) -> DePainted {
    let mut kept = String::new();
    let mut kept_count = 0;
    let mut removed = Vec::new();
    for t in &doc.tokens {
        if t.pos.is_hyperbolic() {
            removed.push(t.token.text.clone());
        } else {
            kept.push_str(&t.token.text_with_ws());
            kept_count += 1;
        }
    }
    DePainted {
        text: normalize_whitespace(&kept),
        removed,
        kept_count,
    }
}

/// De-paint with an optional document: without a tagger the text passes through unchanged.
pub fn de_paint_or_passthrough(text: &str, doc: Option<&Doc>) -> DePainted {
    match doc {
        Some(d) => de_paint(d),
        None => DePainted {
            text: text.to_string(),
            removed: Vec::new(),
            kept_count: 0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{LexiconTagger, PosTagger};

    fn tagger() -> LexiconTagger {
        LexiconTagger::from_json_str(include_str!("../../models/en_tagger.json")).unwrap()
    }

    #[test]
    fn strips_adjectives_from_the_fox() {
        let doc = tagger().annotate("The quick brown fox jumps.").unwrap();
        let out = de_paint(&doc);
        assert_eq!(out.removed, vec!["quick", "brown"]);
        assert_eq!(out.text, "The fox jumps.");
    }

    #[test]
    fn removes_adverbs_and_keeps_order() {
        let doc = tagger()
            .annotate("The very big dog is extremely happy.")
            .unwrap();
        let out = de_paint(&doc);
        assert_eq!(out.removed, vec!["very", "big", "extremely", "happy"]);
        assert_eq!(out.text, "The dog is .");
    }

    #[test]
    fn token_count_law_holds() {
        let doc = tagger()
            .annotate("Officials said the incredibly fast , shocking collapse was  unprecedented!")
            .unwrap();
        let out = de_paint(&doc);
        assert_eq!(doc.tokens.len(), out.kept_count + out.removed.len());
    }

    #[test]
    fn whitespace_is_normalized() {
        assert_eq!(normalize_whitespace("  a \n\t b   c "), "a b c");
        let doc = tagger().annotate("The   cat\n\nsat.").unwrap();
        assert_eq!(de_paint(&doc).text, "The cat sat.");
    }

    #[test]
    fn passthrough_without_tagger() {
        let out = de_paint_or_passthrough("The quick brown fox.", None);
        assert_eq!(out.text, "The quick brown fox.");
        assert!(out.removed.is_empty());
    }
}
