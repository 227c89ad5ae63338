pub mod action;
pub mod diagnostic;
pub mod extract;
pub mod parser;
pub mod token;

use std::ops::Range;

use crate::action::Action;
use crate::token::Token;

/// A tokenized Markdown document.
#[derive(Debug, Clone)]
pub struct Document {
    /// Block tokens in source order.
    pub tokens: Vec<Token>,
    /// Byte span of each token; same length as `tokens`.
    pub spans: Vec<Range<usize>>,
    /// The source file ID (for error reporting with codespan-reporting).
    pub source_id: usize,
}

impl Document {
    pub fn actions(&self) -> Vec<Action> {
        extract::extract(&self.tokens)
    }

    /// Markdown that tokenizes back into an equivalent token sequence.
    pub fn to_markdown(&self) -> String {
        token::to_markdown(&self.tokens)
    }
}

/// Tokenize `source` and extract its actions.
pub fn actions_from_markdown(source: &str) -> Vec<Action> {
    parser::Parser::new(source.to_string(), 0).parse().actions()
}
