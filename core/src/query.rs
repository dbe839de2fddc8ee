//! Boolean query parsing and evaluation.
//!
//! Grammar, one token of lookahead, no backtracking:
//!
//! ```text
//! expr   := term (("&&" | "||") term)*    left-to-right, no precedence
//! term   := "!" factor | factor
//! factor := "(" expr ")" | WORD
//! ```
//!
//! A WORD is a maximal run of characters that stops only at whitespace,
//! `(`, `)`, `!`, or a full `&&`/`||` pair; a lone `&` or `|` is part of
//! the word. Words are lowercased on read to match the case folding
//! applied at build time.

use crate::setops::{complement, intersect, union};
use crate::{DocId, Result};

/// Source of postings for query evaluation.
pub trait TermSource {
    /// Sorted ids of documents containing `term`; empty when unknown.
    fn postings_for(&self, term: &str) -> Result<Vec<DocId>>;

    /// Size of the document universe, for negation.
    fn total_docs(&self) -> u32;
}

/// Result of evaluating one query.
///
/// Parsing is lenient: a malformed query yields diagnostics here alongside
/// whatever result the evaluable part produced, never a crash.
#[derive(Debug)]
pub struct QueryOutcome {
    pub docs: Vec<DocId>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    And,
    Or,
    Not,
    LParen,
    RParen,
    End,
}

struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn next_token(&mut self) -> Token {
        while self.position < self.input.len() && self.input[self.position].is_whitespace() {
            self.position += 1;
        }
        let Some(&ch) = self.input.get(self.position) else {
            return Token::End;
        };
        match ch {
            '(' => {
                self.position += 1;
                Token::LParen
            }
            ')' => {
                self.position += 1;
                Token::RParen
            }
            '!' => {
                self.position += 1;
                Token::Not
            }
            '&' if self.peek_next() == Some('&') => {
                self.position += 2;
                Token::And
            }
            '|' if self.peek_next() == Some('|') => {
                self.position += 2;
                Token::Or
            }
            _ => self.scan_word(),
        }
    }

    fn peek_next(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn scan_word(&mut self) -> Token {
        let mut word = String::new();
        while let Some(&ch) = self.input.get(self.position) {
            if ch.is_whitespace() || matches!(ch, '(' | ')' | '!') {
                break;
            }
            if (ch == '&' || ch == '|') && self.peek_next() == Some(ch) {
                break;
            }
            word.push(ch);
            self.position += 1;
        }
        Token::Word(word.to_lowercase())
    }
}

/// Recursive-descent evaluator over a [`TermSource`].
pub struct QueryParser<'a, S: TermSource> {
    lexer: Lexer,
    current: Token,
    source: &'a S,
    errors: Vec<String>,
}

impl<'a, S: TermSource> QueryParser<'a, S> {
    pub fn new(input: &str, source: &'a S) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            source,
            errors: Vec::new(),
        }
    }

    /// Parses and evaluates the whole input.
    pub fn run(mut self) -> QueryOutcome {
        let docs = self.expr();
        if self.current != Token::End {
            self.errors
                .push(format!("unexpected trailing input near {}", describe(&self.current)));
        }
        QueryOutcome {
            docs,
            errors: self.errors,
        }
    }

    fn advance(&mut self) {
        self.current = self.lexer.next_token();
    }

    fn expr(&mut self) -> Vec<DocId> {
        let mut result = self.term();
        loop {
            match self.current {
                Token::And => {
                    self.advance();
                    let rhs = self.term();
                    result = intersect(result, rhs);
                }
                Token::Or => {
                    self.advance();
                    let rhs = self.term();
                    result = union(result, rhs);
                }
                _ => break,
            }
        }
        result
    }

    fn term(&mut self) -> Vec<DocId> {
        if self.current == Token::Not {
            self.advance();
            let inner = self.factor();
            return complement(inner, self.source.total_docs());
        }
        self.factor()
    }

    fn factor(&mut self) -> Vec<DocId> {
        match self.current.clone() {
            Token::LParen => {
                self.advance();
                let result = self.expr();
                if self.current == Token::RParen {
                    self.advance();
                } else {
                    self.errors.push("expected ')'".to_string());
                }
                result
            }
            Token::Word(word) => {
                self.advance();
                self.lookup(&word)
            }
            Token::End => Vec::new(),
            other => {
                // not consumed here; the caller decides what to do with it
                self.errors
                    .push(format!("expected a term, found {}", describe(&other)));
                Vec::new()
            }
        }
    }

    fn lookup(&mut self, word: &str) -> Vec<DocId> {
        match self.source.postings_for(word) {
            Ok(docs) => docs,
            Err(err) => {
                tracing::warn!(term = word, error = %err, "posting read failed, term treated as empty");
                self.errors.push(format!("could not read postings for '{word}'"));
                Vec::new()
            }
        }
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Word(w) => format!("'{w}'"),
        Token::And => "'&&'".to_string(),
        Token::Or => "'||'".to_string(),
        Token::Not => "'!'".to_string(),
        Token::LParen => "'('".to_string(),
        Token::RParen => "')'".to_string(),
        Token::End => "end of query".to_string(),
    }
}

/// Parses and evaluates one boolean query against `source`.
pub fn run_query<S: TermSource>(input: &str, source: &S) -> QueryOutcome {
    QueryParser::new(input, source).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapSource {
        postings: HashMap<&'static str, Vec<DocId>>,
        total: u32,
    }

    impl TermSource for MapSource {
        fn postings_for(&self, term: &str) -> Result<Vec<DocId>> {
            Ok(self.postings.get(term).cloned().unwrap_or_default())
        }

        fn total_docs(&self) -> u32 {
            self.total
        }
    }

    /// doc0 = "кот собака", doc1 = "кот", doc2 = "собака"
    fn corpus() -> MapSource {
        let mut postings = HashMap::new();
        postings.insert("кот", vec![0, 1]);
        postings.insert("собака", vec![0, 2]);
        MapSource { postings, total: 3 }
    }

    fn docs(input: &str) -> Vec<DocId> {
        let outcome = run_query(input, &corpus());
        assert!(outcome.errors.is_empty(), "unexpected errors: {:?}", outcome.errors);
        outcome.docs
    }

    #[test]
    fn single_term() {
        assert_eq!(docs("кот"), vec![0, 1]);
    }

    #[test]
    fn and_or_not() {
        assert_eq!(docs("кот && собака"), vec![0]);
        assert_eq!(docs("кот || собака"), vec![0, 1, 2]);
        assert_eq!(docs("!кот"), vec![2]);
    }

    #[test]
    fn query_terms_are_lowercased() {
        assert_eq!(docs("КОТ"), vec![0, 1]);
    }

    #[test]
    fn unknown_term_is_empty_not_an_error() {
        assert_eq!(docs("слон"), Vec::<DocId>::new());
        assert_eq!(docs("кот && слон"), Vec::<DocId>::new());
    }

    #[test]
    fn empty_query_is_empty_result() {
        let outcome = run_query("", &corpus());
        assert!(outcome.docs.is_empty());
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn operators_fold_left_to_right_without_precedence() {
        // (кот && собака) || кот = {0} ∪ {0,1} = {0,1}
        assert_eq!(docs("кот && собака || кот"), vec![0, 1]);
        // (собака || кот) && кот = {0,1,2} ∩ {0,1} = {0,1}
        assert_eq!(docs("собака || кот && кот"), vec![0, 1]);
        // conventional precedence would give {0,2} here instead
        assert_eq!(docs("собака || кот && собака"), vec![0]);
    }

    #[test]
    fn negation_binds_to_the_next_factor_only() {
        // (!собака) && кот = {1} ∩ {0,1}
        assert_eq!(docs("!собака && кот"), vec![1]);
        // but a parenthesized group negates as a whole
        assert_eq!(docs("!(собака && кот)"), vec![1, 2]);
        assert_eq!(docs("!(кот || собака)"), Vec::<DocId>::new());
    }

    #[test]
    fn lone_ampersand_and_pipe_are_word_characters() {
        let mut source = corpus();
        source.postings.insert("r&d", vec![1]);
        source.postings.insert("a|b", vec![2]);
        let outcome = run_query("r&d", &source);
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.docs, vec![1]);
        let outcome = run_query("a|b", &source);
        assert_eq!(outcome.docs, vec![2]);
    }

    #[test]
    fn unmatched_paren_reports_and_returns_partial_result() {
        let outcome = run_query("(кот && собака", &corpus());
        assert_eq!(outcome.docs, vec![0]);
        assert_eq!(outcome.errors, vec!["expected ')'".to_string()]);
    }

    #[test]
    fn stray_tokens_are_reported_without_crashing() {
        let outcome = run_query("кот) собака", &corpus());
        assert_eq!(outcome.docs, vec![0, 1]);
        assert!(!outcome.errors.is_empty());

        let outcome = run_query("&& кот", &corpus());
        assert!(!outcome.errors.is_empty());
    }

    #[test]
    fn trailing_operator_degrades_to_empty_rhs() {
        let outcome = run_query("кот &&", &corpus());
        assert!(outcome.docs.is_empty());
    }

    #[test]
    fn nested_groups() {
        assert_eq!(docs("(кот || собака) && !кот"), vec![2]);
        assert_eq!(docs("((кот))"), vec![0, 1]);
    }

    #[test]
    fn failing_source_degrades_to_empty_with_diagnostic() {
        struct Failing;
        impl TermSource for Failing {
            fn postings_for(&self, _term: &str) -> Result<Vec<DocId>> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "boom").into())
            }
            fn total_docs(&self) -> u32 {
                0
            }
        }
        let outcome = run_query("кот", &Failing);
        assert!(outcome.docs.is_empty());
        assert_eq!(outcome.errors.len(), 1);
    }
}
