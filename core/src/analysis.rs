use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization;

use crate::Position;

lazy_static! {
    static ref WORD_RE: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*").expect("valid regex");
}

/// Stemmer language for the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Russian,
}

impl Language {
    fn algorithm(self) -> Algorithm {
        match self {
            Language::English => Algorithm::English,
            Language::Russian => Algorithm::Russian,
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "english" | "en" => Ok(Language::English),
            "russian" | "ru" => Ok(Language::Russian),
            other => Err(format!("unknown language '{other}' (expected english or russian)")),
        }
    }
}

/// Normalizes raw text into `(stem, position)` pairs.
///
/// NFKC normalization and lowercasing, then a word scan, a minimum-length
/// filter, and stemming. A token whose stem comes back empty is discarded.
/// Positions are 1-based indices over the kept tokens, so downstream
/// ingestion (which rejects position 0) loses nothing.
pub struct Analyzer {
    stemmer: Stemmer,
    min_token_len: usize,
}

impl Analyzer {
    pub fn new(language: Language) -> Self {
        Self {
            stemmer: Stemmer::create(language.algorithm()),
            min_token_len: 2,
        }
    }

    /// Drop tokens shorter than `len` characters before stemming.
    pub fn with_min_token_len(mut self, len: usize) -> Self {
        self.min_token_len = len;
        self
    }

    pub fn tokenize(&self, text: &str) -> Vec<(String, Position)> {
        let normalized = text.nfkc().collect::<String>().to_lowercase();
        let mut tokens = Vec::new();
        let mut position: Position = 0;
        for mat in WORD_RE.find_iter(&normalized) {
            let token = mat.as_str();
            if token.chars().count() < self.min_token_len {
                continue;
            }
            let stem = self.stemmer.stem(token).to_string();
            if stem.is_empty() {
                continue;
            }
            position += 1;
            tokens.push((stem, position));
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stems_english() {
        let analyzer = Analyzer::new(Language::English);
        let tokens = analyzer.tokenize("Running, runner's run!");
        assert!(tokens.iter().any(|(w, _)| w == "run"));
    }

    #[test]
    fn positions_are_one_based_over_kept_tokens() {
        let analyzer = Analyzer::new(Language::English).with_min_token_len(3);
        let tokens = analyzer.tokenize("at cats at dogs");
        let positions: Vec<_> = tokens.iter().map(|(_, p)| *p).collect();
        // "at" filtered out twice, kept tokens renumbered from 1
        assert_eq!(positions, vec![1, 2]);
        assert!(tokens.iter().all(|(_, p)| *p >= 1));
    }

    #[test]
    fn lowercases_before_stemming() {
        let analyzer = Analyzer::new(Language::Russian);
        let upper = analyzer.tokenize("СОБАКА");
        let lower = analyzer.tokenize("собака");
        assert_eq!(upper, lower);
    }

    #[test]
    fn language_parsing() {
        assert_eq!("russian".parse::<Language>(), Ok(Language::Russian));
        assert_eq!("EN".parse::<Language>(), Ok(Language::English));
        assert!("klingon".parse::<Language>().is_err());
    }
}
