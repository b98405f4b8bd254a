// src/oracle/tokenize.rs
//! Whitespace-preserving tokenizer shared by the sentiment engine and the tagger.
//!
//! Every non-whitespace character of the input belongs to exactly one token:
//! - word tokens: `\w+` with inner joins (`isn't`, `well-known`, `Reuters’`)
//! - punctuation tokens: any other single character
//!
//! Each token remembers the whitespace that follows it, so the input (minus leading
//! whitespace) is rebuilt by concatenating `text_with_ws()` of all tokens.

use once_cell::sync::Lazy;
use regex::Regex;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    // (?u) keeps \w Unicode-aware; punctuation falls through to the second branch.
    Regex::new(r"(?u)\w+(?:['’\-]\w+)*|[^\w\s]").expect("tokenizer regex")
});

/// A single token with byte span, sequential index and trailing whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub index: usize,
    pub whitespace_after: String,
}

impl Token {
    /// Token text followed by the whitespace that separated it from the next token.
    pub fn text_with_ws(&self) -> String {
        let mut s = String::with_capacity(self.text.len() + self.whitespace_after.len());
        s.push_str(&self.text);
        s.push_str(&self.whitespace_after);
        s
    }

    pub fn is_word(&self) -> bool {
        self.text.chars().next().is_some_and(|c| c.is_alphanumeric() || c == '_')
    }

    pub fn is_punct(&self) -> bool {
        !self.is_word()
    }

    /// Lower-cased text with typographic apostrophes folded to `'` (`isn’t` → `isn't`).
    pub fn lower(&self) -> String {
        self.text.to_lowercase().replace('’', "'")
    }
}

/// Split `input` into tokens (see module docs).
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::new();
    for (i, m) in TOKEN_RE.find_iter(input).enumerate() {
        if let Some(prev) = out.last_mut() {
            prev.whitespace_after = input[prev.end..m.start()].to_string();
        }
        out.push(Token {
            text: m.as_str().to_string(),
            start: m.start(),
            end: m.end(),
            index: i,
            whitespace_after: String::new(),
        });
    }
    if let Some(last) = out.last_mut() {
        last.whitespace_after = input[last.end..].to_string();
    }
    out
}

/// Lower-cased word tokens only (punctuation dropped). Used by the sentiment engine.
pub fn words(input: &str) -> Vec<String> {
    tokenize(input)
        .into_iter()
        .filter(Token::is_word)
        .map(|t| t.lower())
        .collect()
}
