mod tokenizer;

pub use tokenizer::tokenize;

use crate::Document;

/// Parser entry point.
pub struct Parser {
    source: String,
    file_id: usize,
}

impl Parser {
    pub fn new(source: String, file_id: usize) -> Self {
        Parser { source, file_id }
    }

    /// Tokenize the source Markdown. Never fails: anything the tokenizer does
    /// not recognize becomes an inert token.
    pub fn parse(&self) -> Document {
        let (tokens, spans) = tokenize(&self.source).into_iter().unzip();
        Document {
            tokens,
            spans,
            source_id: self.file_id,
        }
    }
}
