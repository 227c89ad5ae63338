use std::fmt;

/// A block-level Markdown token, as produced by the tokenizer.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Heading {
        depth: u8,
        text: String,
    },
    Paragraph {
        text: String,
    },
    List {
        items: Vec<ListItem>,
        ordered: bool,
    },
    Code {
        text: String,
    },
    /// Blank-line separator between two blocks.
    Space,
    /// Any other block (block quote, table, rule, HTML). Carries its source text.
    Other {
        raw: String,
    },
}

/// One item of a list token.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    /// Source text of the item, list marker included, trailing whitespace removed.
    pub raw: String,
    /// First-level inline tokens of the item's first text block.
    pub sub_tokens: Vec<InlineToken>,
}

impl ListItem {
    pub fn new(raw: impl Into<String>, sub_tokens: Vec<InlineToken>) -> Self {
        ListItem {
            raw: raw.into(),
            sub_tokens,
        }
    }
}

/// Inline tokens inside a list item. Only text and code spans are distinguished.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineToken {
    Text(String),
    CodeSpan(String),
    /// Emphasis, links, images, inline HTML and the like.
    Other,
}

impl Token {
    pub fn kind(&self) -> &'static str {
        match self {
            Token::Heading { .. } => "heading",
            Token::Paragraph { .. } => "paragraph",
            Token::List { .. } => "list",
            Token::Code { .. } => "code",
            Token::Space => "space",
            Token::Other { .. } => "other",
        }
    }

    pub fn is_space(&self) -> bool {
        matches!(self, Token::Space)
    }
}

/// Render a token sequence back into Markdown.
pub fn to_markdown(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.to_string()).collect()
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // ATX headings are single-line; multi-line text needs a setext underline.
            Token::Heading { depth, text } if text.contains('\n') && *depth <= 2 => {
                let underline = if *depth == 1 { "===" } else { "---" };
                writeln!(f, "{}\n{}", text, underline)
            }
            Token::Heading { depth, text } => {
                for _ in 0..*depth {
                    write!(f, "#")?;
                }
                writeln!(f, " {}", text)
            }
            Token::Paragraph { text } => writeln!(f, "{}", text),
            Token::List { items, .. } => {
                for item in items {
                    writeln!(f, "{}", item.raw)?;
                }
                Ok(())
            }
            Token::Code { text } => {
                let fence = "`".repeat(longest_backtick_run(text).max(2) + 1);
                writeln!(f, "{}", fence)?;
                if !text.is_empty() {
                    writeln!(f, "{}", text)?;
                }
                writeln!(f, "{}", fence)
            }
            Token::Space => writeln!(f),
            Token::Other { raw } => writeln!(f, "{}", raw),
        }
    }
}

impl fmt::Display for InlineToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InlineToken::Text(s) => write!(f, "{}", s),
            InlineToken::CodeSpan(code) => write!(f, "`{}`", code),
            InlineToken::Other => Ok(()),
        }
    }
}

fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}
