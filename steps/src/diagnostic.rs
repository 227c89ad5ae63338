use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};

use crate::Document;
use crate::extract::{Extractor, Pattern};
use crate::token::Token;

/// A place where the extractor silently dropped content, with its source location.
#[derive(Debug, Clone)]
pub struct Warning {
    pub message: String,
    pub span: Range<usize>,
    pub file_id: usize,
    pub notes: Vec<String>,
}

impl Warning {
    pub fn new(message: impl Into<String>, span: Range<usize>, file_id: usize) -> Self {
        Warning {
            message: message.into(),
            span,
            file_id,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::new(Severity::Warning)
            .with_message(&self.message)
            .with_labels(vec![Label::primary(self.file_id, self.span.clone())])
            .with_notes(self.notes.clone())
    }
}

/// Report code blocks that will be skipped when the document is run.
pub fn check(document: &Document) -> Vec<Warning> {
    let tokens = &document.tokens;
    let mut warnings = Vec::new();

    for group in Extractor::new(tokens) {
        if group.pattern != Pattern::EmbeddedFiles || !group.actions.is_empty() {
            continue;
        }
        let index = group.tokens.start;
        let span = document.spans[index].clone();

        let after_multi_item_list = index >= 2
            && tokens[index - 1].is_space()
            && matches!(&tokens[index - 2], Token::List { items, .. } if items.len() > 1);

        let warning = if after_multi_item_list {
            Warning::new(
                "code block after a multi-item list is not run as commands",
                span,
                document.source_id,
            )
            .with_note(
                "only a single-item list followed by a blank line pairs with a code block",
            )
        } else {
            Warning::new(
                "code block has no `// <path>` marker and will be skipped",
                span,
                document.source_id,
            )
            .with_note("start each file with a line like `// src/main.rs`")
        };
        warnings.push(warning);
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn warnings(source: &str) -> Vec<Warning> {
        check(&Parser::new(source.to_string(), 0).parse())
    }

    #[test]
    fn unmarked_code_block_is_reported() {
        let source = "Some text.\n\n```\nfn main() {}\n```\n";
        let found = warnings(source);
        assert_eq!(found.len(), 1);
        assert!(found[0].message.contains("no `// <path>` marker"));
        assert!(source[found[0].span.clone()].contains("fn main() {}"));
    }

    #[test]
    fn code_block_after_multi_item_list_is_reported() {
        let source = "1. Install\n2. Test\n\n```\nnpm i\n```\n";
        let found = warnings(source);
        assert_eq!(found.len(), 1);
        assert!(found[0].message.contains("multi-item list"));
    }

    #[test]
    fn consumed_and_marked_blocks_are_fine() {
        let source = "1. Install\n\n```\nnpm i\n```\n\n```\n// a.txt\nhi\n```\n";
        assert!(warnings(source).is_empty());
    }
}
