// src/oracle/tagger.rs
//! Part-of-speech and entity tagging.
//!
//! `PosTagger` is the seam the rest of the service depends on; `LexiconTagger` is the
//! implementation backed by a JSON model file (`models/en_tagger.json` by default).
//!
//! Model shape:
//! {
//!   "name": "en_lexicon_sm",
//!   "version": "1.0.0",
//!   "default_pos": "NOUN",
//!   "lexicon": { "the": "DET", "quick": "ADJ", ... },
//!   "suffix_rules": [ { "suffix": "ly", "pos": "ADV", "min_len": 5 }, ... ],
//!   "entity_labels": { "reuters": "ORG", ... }
//! }

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::tokenize::{tokenize, Token};

/// Universal part-of-speech tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Pos {
    Adj,
    Adv,
    Noun,
    Propn,
    Verb,
    Aux,
    Det,
    Pron,
    Adp,
    Cconj,
    Sconj,
    Num,
    Part,
    Intj,
    Punct,
    Space,
    X,
}

impl Pos {
    /// Adjectives and adverbs: the "paint" that de-painting strips.
    pub fn is_hyperbolic(self) -> bool {
        matches!(self, Pos::Adj | Pos::Adv)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaggedToken {
    pub token: Token,
    pub pos: Pos,
}

impl TaggedToken {
    pub fn is_punct(&self) -> bool {
        self.pos == Pos::Punct
    }

    pub fn is_space(&self) -> bool {
        self.pos == Pos::Space
    }
}

/// A named-entity span over token indices `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub text: String,
    pub label: String,
    pub start: usize,
    pub end: usize,
}

/// Tagged document returned by a `PosTagger`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Doc {
    pub tokens: Vec<TaggedToken>,
    pub entities: Vec<Entity>,
}

impl Doc {
    /// Tokens that are neither punctuation nor whitespace.
    pub fn content_token_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| !t.is_punct() && !t.is_space())
            .count()
    }

    /// Adjective + adverb tokens.
    pub fn hyperbolic_token_count(&self) -> usize {
        self.tokens.iter().filter(|t| t.pos.is_hyperbolic()).count()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

/// Read-only tagger shared across requests.
pub trait PosTagger: Send + Sync {
    /// Tag every token of `text` and collect entities.
    fn annotate(&self, text: &str) -> anyhow::Result<Doc>;
    /// Model name for diagnostics (`/health`, `/`).
    fn model_name(&self) -> &str;
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuffixRule {
    pub suffix: String,
    pub pos: Pos,
    #[serde(default)]
    pub min_len: usize,
}

fn default_pos() -> Pos {
    Pos::Noun
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaggerModel {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default = "default_pos")]
    pub default_pos: Pos,
    pub lexicon: HashMap<String, Pos>,
    #[serde(default)]
    pub suffix_rules: Vec<SuffixRule>,
    #[serde(default)]
    pub entity_labels: HashMap<String, String>,
}

/// Lexicon + suffix-rule tagger.
#[derive(Debug, Clone)]
pub struct LexiconTagger {
    model: TaggerModel,
}

impl LexiconTagger {
    pub fn new(mut model: TaggerModel) -> Self {
        // longest suffix wins
        model
            .suffix_rules
            .sort_by(|a, b| b.suffix.len().cmp(&a.suffix.len()));
        model.lexicon = model
            .lexicon
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        model.entity_labels = model
            .entity_labels
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        Self { model }
    }

    pub fn from_json_str(raw: &str) -> anyhow::Result<Self> {
        let model: TaggerModel =
            serde_json::from_str(raw).context("parsing tagger model JSON")?;
        Ok(Self::new(model))
    }

    /// Load a model file from disk.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading tagger model from {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("loading {}", path.display()))
    }

    pub fn version(&self) -> Option<&str> {
        self.model.version.as_deref()
    }

    fn tag_token(&self, tok: &Token, sentence_start: bool) -> Pos {
        if tok.is_punct() {
            return Pos::Punct;
        }
        if tok.text.chars().all(|c| c.is_ascii_digit() || c == '-' || c == '\'') {
            return Pos::Num;
        }

        let lower = tok.lower();
        if let Some(pos) = self.model.lexicon.get(&lower) {
            return *pos;
        }

        let capitalized = tok.text.chars().next().is_some_and(char::is_uppercase);
        if capitalized && (!sentence_start || self.model.entity_labels.contains_key(&lower)) {
            return Pos::Propn;
        }

        let char_len = lower.chars().count();
        self.model
            .suffix_rules
            .iter()
            .find(|r| char_len >= r.min_len.max(r.suffix.len() + 1) && lower.ends_with(&r.suffix))
            .map(|r| r.pos)
            .unwrap_or(self.model.default_pos)
    }

    fn collect_entities(&self, tokens: &[TaggedToken]) -> Vec<Entity> {
        let mut out = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            match tokens[i].pos {
                Pos::Propn => {
                    let start = i;
                    while i < tokens.len() && tokens[i].pos == Pos::Propn {
                        i += 1;
                    }
                    let span = &tokens[start..i];
                    let text = span_text(span);
                    let label = self
                        .model
                        .entity_labels
                        .get(&text.to_lowercase())
                        .or_else(|| {
                            span.iter()
                                .find_map(|t| self.model.entity_labels.get(&t.token.lower()))
                        })
                        .cloned()
                        .unwrap_or_else(|| "MISC".to_string());
                    out.push(Entity {
                        text,
                        label,
                        start,
                        end: i,
                    });
                }
                Pos::Num => {
                    out.push(Entity {
                        text: tokens[i].token.text.clone(),
                        label: "CARDINAL".to_string(),
                        start: i,
                        end: i + 1,
                    });
                    i += 1;
                }
                _ => i += 1,
            }
        }
        out
    }
}

fn span_text(span: &[TaggedToken]) -> String {
    let mut s: String = span.iter().map(|t| t.token.text_with_ws()).collect();
    s.truncate(s.trim_end().len());
    s
}

fn ends_sentence(tok: &Token) -> bool {
    matches!(tok.text.as_str(), "." | "!" | "?" | "…")
}

fn is_opening_quote(tok: &Token) -> bool {
    matches!(tok.text.as_str(), "\"" | "“" | "'" | "‘" | "(" | "[")
}

impl PosTagger for LexiconTagger {
    fn annotate(&self, text: &str) -> anyhow::Result<Doc> {
        let mut tagged: Vec<TaggedToken> = Vec::new();
        let mut sentence_start = true;
        for tok in tokenize(text) {
            let pos = self.tag_token(&tok, sentence_start);
            if ends_sentence(&tok) {
                sentence_start = true;
            } else if !is_opening_quote(&tok) {
                sentence_start = false;
            }
            tagged.push(TaggedToken { token: tok, pos });
        }
        let entities = self.collect_entities(&tagged);
        Ok(Doc {
            tokens: tagged,
            entities,
        })
    }

    fn model_name(&self) -> &str {
        &self.model.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> LexiconTagger {
        LexiconTagger::from_json_str(
            r#"{
                "name": "tiny",
                "lexicon": { "the": "DET", "quick": "ADJ", "brown": "ADJ", "jumps": "VERB",
                             "is": "AUX", "only": "ADV" },
                "suffix_rules": [ { "suffix": "ly", "pos": "ADV", "min_len": 4 },
                                  { "suffix": "ous", "pos": "ADJ" } ],
                "entity_labels": { "reuters": "ORG", "new york": "GPE" }
            }"#,
        )
        .unwrap()
    }

    fn tags(doc: &Doc) -> Vec<Pos> {
        doc.tokens.iter().map(|t| t.pos).collect()
    }

    #[test]
    fn lexicon_and_punctuation() {
        let doc = tiny().annotate("The quick brown fox jumps.").unwrap();
        assert_eq!(
            tags(&doc),
            vec![Pos::Det, Pos::Adj, Pos::Adj, Pos::Noun, Pos::Verb, Pos::Punct]
        );
        assert_eq!(doc.content_token_count(), 5);
        assert_eq!(doc.hyperbolic_token_count(), 2);
    }

    #[test]
    fn suffix_rules_apply_to_unknown_words() {
        let doc = tiny().annotate("it moved quickly and looked famous").unwrap();
        assert_eq!(doc.tokens[2].pos, Pos::Adv);
        assert_eq!(doc.tokens[5].pos, Pos::Adj);
    }

    #[test]
    fn capitalized_words_mid_sentence_are_proper_nouns() {
        let doc = tiny().annotate("Analysts in New York cited Reuters.").unwrap();
        // "Analysts" opens the sentence and is not a known entity
        assert_eq!(doc.tokens[0].pos, Pos::Noun);
        assert_eq!(doc.tokens[2].pos, Pos::Propn);
        assert_eq!(doc.tokens[3].pos, Pos::Propn);
        assert_eq!(doc.entity_count(), 2);
        assert_eq!(doc.entities[0].text, "New York");
        assert_eq!(doc.entities[0].label, "GPE");
        assert_eq!(doc.entities[1].label, "ORG");
    }

    #[test]
    fn known_entity_at_sentence_start_is_tagged() {
        let doc = tiny().annotate("Reuters reported 3 cases.").unwrap();
        assert_eq!(doc.tokens[0].pos, Pos::Propn);
        assert_eq!(doc.tokens[2].pos, Pos::Num);
        assert_eq!(doc.entity_count(), 2);
        assert_eq!(doc.entities[1].label, "CARDINAL");
    }

    #[test]
    fn empty_text_yields_empty_doc() {
        let doc = tiny().annotate("   ").unwrap();
        assert_eq!(doc, Doc::default());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = LexiconTagger::load(Path::new("__missing_tagger_model__.json")).unwrap_err();
        assert!(format!("{err:#}").contains("__missing_tagger_model__.json"));
    }
}
