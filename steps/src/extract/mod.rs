pub mod files;
pub mod list;

use std::ops::Range;

use crate::action::Action;
use crate::token::Token;

/// Turn a token sequence into the ordered list of actions it describes.
///
/// Never fails: tokens that match no pattern simply produce no action.
pub fn extract(tokens: &[Token]) -> Vec<Action> {
    Extractor::new(tokens)
        .flat_map(|group| group.actions)
        .collect()
}

/// Which dispatch rule produced an [`ActionGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Level-2 heading.
    Heading,
    Paragraph,
    /// Single-item list, blank line, code block: one command action.
    CommandBlock,
    /// List whose items were classified one by one.
    List,
    /// Standalone code block scanned for `// <path>` markers.
    EmbeddedFiles,
    /// Token kind that produces nothing.
    Skipped,
}

/// The actions produced by a single dispatch step, with the tokens it consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionGroup {
    pub pattern: Pattern,
    /// Indices of the consumed tokens.
    pub tokens: Range<usize>,
    pub actions: Vec<Action>,
}

/// Forward cursor over a token sequence. Each step may consume more than one
/// token when a multi-token pattern matches.
pub struct Extractor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Extractor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Extractor { tokens, pos: 0 }
    }
}

impl Iterator for Extractor<'_> {
    type Item = ActionGroup;

    fn next(&mut self) -> Option<ActionGroup> {
        let start = self.pos;
        let token = self.tokens.get(start)?;

        let (pattern, consumed, actions) = match token {
            Token::Heading { depth: 2, text } => (
                Pattern::Heading,
                1,
                vec![Action::Instruction { text: text.clone() }],
            ),
            Token::Paragraph { text } => (
                Pattern::Paragraph,
                1,
                vec![Action::Information { text: text.clone() }],
            ),
            Token::Code { text } => (Pattern::EmbeddedFiles, 1, files::extract_files(text)),
            Token::List { items, .. } => {
                let lookahead = (self.tokens.get(start + 1), self.tokens.get(start + 2));
                match list::command_block(items, lookahead) {
                    Some(action) => (Pattern::CommandBlock, 3, vec![action]),
                    None => (Pattern::List, 1, list::classify_items(items)),
                }
            }
            _ => (Pattern::Skipped, 1, Vec::new()),
        };

        self.pos += consumed;
        Some(ActionGroup {
            pattern,
            tokens: start..self.pos,
            actions,
        })
    }
}
