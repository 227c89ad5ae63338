use crate::action::Action;

/// Prefix of a marker line naming the file whose content follows.
const MARKER_PREFIX: &str = "// ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind<'a> {
    /// `// <path>`. The path may be empty, in which case the line can only
    /// terminate the previous file.
    Marker(&'a str),
    Blank,
    Content,
    /// Implicit marker after the last line of the block.
    End,
}

#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    kind: LineKind<'a>,
    /// Byte range in the block text, line break excluded.
    start: usize,
    end: usize,
}

/// Split a multi-file code block into one `WriteCode` action per marked file.
///
/// A file starts at a `// <path>` line. Its code runs up to the first blank
/// line that is directly followed by another marker line or by the end of the
/// block. The marker that ends one file is the header of the next.
pub fn extract_files(text: &str) -> Vec<Action> {
    let lines = scan_lines(text);
    let mut actions = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let LineKind::Marker(path) = lines[i].kind else {
            i += 1;
            continue;
        };
        if path.is_empty() {
            i += 1;
            continue;
        }

        match find_file_end(&lines, i) {
            Some(blank) => {
                let code = &text[lines[i + 1].start..lines[blank - 1].end];
                actions.push(Action::WriteCode {
                    file_path: path.to_string(),
                    code: format!("{}\n", code),
                });
                i = blank + 1;
            }
            None => i += 1,
        }
    }

    actions
}

fn scan_lines(text: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut start = 0;
    for raw in text.split('\n') {
        let end = start + raw.len();
        lines.push(Line {
            kind: classify(raw),
            start,
            end,
        });
        start = end + 1;
    }

    // The block behaves as if it were followed by "\n\n// ".
    let len = text.len();
    for kind in [LineKind::Blank, LineKind::End] {
        lines.push(Line {
            kind,
            start: len,
            end: len,
        });
    }
    lines
}

fn classify(raw: &str) -> LineKind<'_> {
    let line = raw.strip_suffix('\r').unwrap_or(raw);
    if let Some(path) = line.strip_prefix(MARKER_PREFIX) {
        LineKind::Marker(path)
    } else if line.is_empty() {
        LineKind::Blank
    } else {
        LineKind::Content
    }
}

/// Index of the blank line that closes the file whose marker is at `marker`.
fn find_file_end(lines: &[Line<'_>], marker: usize) -> Option<usize> {
    (marker + 1..lines.len() - 1).find(|&j| {
        lines[j].kind == LineKind::Blank
            && matches!(lines[j + 1].kind, LineKind::Marker(_) | LineKind::End)
            && has_code(lines, marker, j)
    })
}

/// The code between a marker and its closing blank line needs at least one
/// character besides the final line break.
fn has_code(lines: &[Line<'_>], marker: usize, blank: usize) -> bool {
    match blank - marker - 1 {
        0 => false,
        1 => lines[marker + 1].start < lines[marker + 1].end,
        _ => true,
    }
}
