use std::ops::Range;

use pulldown_cmark::{Event, HeadingLevel, Options, Parser as CmarkParser, Tag};

use crate::token::{InlineToken, ListItem, Token};

type Events<'a> = [(Event<'a>, Range<usize>)];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Split Markdown source into block tokens, each paired with its byte span.
pub fn tokenize(source: &str) -> Vec<(Token, Range<usize>)> {
    let options =
        Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES | Options::ENABLE_TASKLISTS;
    let parser = CmarkParser::new_ext(source, options);
    let events: Vec<(Event<'_>, Range<usize>)> = parser.into_offset_iter().collect();

    let mut tokens: Vec<(Token, Range<usize>)> = Vec::new();
    let mut i = 0;

    while i < events.len() {
        let (ref ev, ref range) = events[i];
        let end = block_end(&events, i);

        let token = match ev {
            Event::Start(Tag::Heading { level, .. }) => Some(Token::Heading {
                depth: heading_depth(level),
                text: heading_text(&source[range.clone()]),
            }),
            Event::Start(Tag::Paragraph) => Some(Token::Paragraph {
                text: source[range.clone()].trim_end().to_string(),
            }),
            Event::Start(Tag::CodeBlock(_)) => Some(Token::Code {
                text: code_text(&events[i + 1..end]),
            }),
            Event::Start(Tag::List(start)) => Some(Token::List {
                items: collect_items(source, &events[i + 1..end]),
                ordered: start.is_some(),
            }),
            Event::Start(_) | Event::Rule | Event::Html(_) => Some(Token::Other {
                raw: source[range.clone()].trim_end().to_string(),
            }),
            _ => None,
        };

        if let Some(token) = token {
            if let Some((_, previous)) = tokens.last() {
                if separated_by_blank_line(source, previous, range.start) {
                    let gap = previous.end.min(range.start)..range.start;
                    tokens.push((Token::Space, gap));
                }
            }
            tokens.push((token, range.clone()));
        }

        i = end + 1;
    }

    tokens
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

/// Index of the event closing the element opened at `start`. Events that open
/// nothing close themselves.
fn block_end(events: &Events<'_>, start: usize) -> usize {
    if !matches!(events[start].0, Event::Start(_)) {
        return start;
    }
    let mut depth = 0usize;
    for (offset, (ev, _)) in events[start..].iter().enumerate() {
        match ev {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return start + offset;
                }
            }
            _ => {}
        }
    }
    events.len() - 1
}

fn heading_depth(level: &HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Heading text without ATX markers or the setext underline.
fn heading_text(raw: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with('#') {
        let first_line = raw.lines().next().unwrap_or_default();
        let content = first_line.trim_start_matches('#').trim();
        let unclosed = content.trim_end_matches('#');
        if unclosed.is_empty() {
            String::new()
        } else if unclosed.ends_with([' ', '\t']) {
            unclosed.trim_end().to_string()
        } else {
            content.to_string()
        }
    } else {
        let lines: Vec<&str> = raw.lines().collect();
        let text_lines = &lines[..lines.len().saturating_sub(1)];
        text_lines
            .iter()
            .map(|line| line.trim())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Code block content, minus the line break before the closing fence.
fn code_text(events: &Events<'_>) -> String {
    let mut text = String::new();
    for (ev, _) in events {
        if let Event::Text(s) = ev {
            text.push_str(s);
        }
    }
    if text.ends_with('\n') {
        text.pop();
    }
    text
}

fn separated_by_blank_line(source: &str, previous: &Range<usize>, next_start: usize) -> bool {
    let content_end = previous.start + source[previous.clone()].trim_end().len();
    content_end < next_start && source[content_end..next_start].matches('\n').count() >= 2
}

// ---------------------------------------------------------------------------
// Lists
// ---------------------------------------------------------------------------

/// Collect the items of a list. `events` excludes the list's own start/end.
fn collect_items(source: &str, events: &Events<'_>) -> Vec<ListItem> {
    let mut items = Vec::new();
    let mut i = 0;

    while i < events.len() {
        let end = block_end(events, i);
        if let (Event::Start(Tag::Item), range) = &events[i] {
            items.push(ListItem {
                raw: item_raw(source, range),
                sub_tokens: inline_tokens(&events[i + 1..end]),
            });
        }
        i = end + 1;
    }

    items
}

/// Source text of an item starting at its list marker.
///
/// Depending on the item, pulldown-cmark's range starts at the marker or at
/// the content after it, so look back along the line for the marker.
fn item_raw(source: &str, range: &Range<usize>) -> String {
    let line_start = source[..range.start].rfind('\n').map_or(0, |p| p + 1);
    let prefix = &source[line_start..range.start];
    let start = if is_list_marker(prefix.trim()) {
        range.start - prefix.trim_start().len()
    } else {
        range.start
    };
    source[start..range.end].trim_end().to_string()
}

fn is_list_marker(text: &str) -> bool {
    match text {
        "-" | "*" | "+" => true,
        _ => {
            let Some(number) = text.strip_suffix(['.', ')']) else {
                return false;
            };
            !number.is_empty() && number.len() <= 9 && number.bytes().all(|b| b.is_ascii_digit())
        }
    }
}

/// First-level inline tokens of an item's first text block.
fn inline_tokens(events: &Events<'_>) -> Vec<InlineToken> {
    // Loose items wrap their text in a paragraph.
    let body = match events.first() {
        Some((Event::Start(Tag::Paragraph), _)) => &events[1..block_end(events, 0)],
        _ => events,
    };

    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut i = 0;

    while i < body.len() {
        match &body[i].0 {
            Event::Text(s) => text.push_str(s),
            Event::SoftBreak | Event::HardBreak => text.push('\n'),
            Event::Code(s) => {
                flush_text(&mut text, &mut tokens);
                tokens.push(InlineToken::CodeSpan(s.to_string()));
            }
            Event::TaskListMarker(_) => {}
            Event::Start(tag) if is_inline(tag) => {
                flush_text(&mut text, &mut tokens);
                tokens.push(InlineToken::Other);
                i = block_end(body, i);
            }
            // A nested block ends the first text block.
            Event::Start(_) | Event::End(_) => break,
            _ => {
                flush_text(&mut text, &mut tokens);
                tokens.push(InlineToken::Other);
            }
        }
        i += 1;
    }

    flush_text(&mut text, &mut tokens);
    tokens
}

fn is_inline(tag: &Tag<'_>) -> bool {
    matches!(
        tag,
        Tag::Emphasis
            | Tag::Strong
            | Tag::Strikethrough
            | Tag::Link { .. }
            | Tag::Image { .. }
    )
}

fn flush_text(text: &mut String, tokens: &mut Vec<InlineToken>) {
    if !text.is_empty() {
        tokens.push(InlineToken::Text(std::mem::take(text)));
    }
}
