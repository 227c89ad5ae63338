use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use codespan_reporting::term::termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use serde::Deserialize;

use steps::Document;
use steps::action::Action;
use steps::diagnostic::Warning;
use steps::parser::Parser;

const FIXTURE_SUFFIX: &str = ".test.md";

#[derive(Debug, Deserialize)]
pub struct ExpectedWarning {
    /// Substring that must appear in the warning message.
    pub contains: String,

    /// If set, the warning's span must start on this 1-based line of the Markdown body.
    #[serde(default)]
    pub line: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct FixtureConfig {
    #[serde(default)]
    pub description: Option<String>,

    /// The exact action list the body must produce. Omitted means none.
    #[serde(default)]
    pub expect: Vec<Action>,

    /// If present (even empty), warning count and content are checked.
    #[serde(default)]
    pub expect_warnings: Option<Vec<ExpectedWarning>>,

    /// Re-tokenize the rendered token stream and require the same actions.
    #[serde(default = "default_roundtrip")]
    pub roundtrip: bool,
}

fn default_roundtrip() -> bool {
    true
}

/// Split a fixture into its TOML front matter and Markdown body.
fn split_fixture(content: &str) -> Result<(FixtureConfig, &str), String> {
    let content = content.trim_start_matches('\u{feff}');
    let after_open = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
        .ok_or("missing opening --- front matter delimiter")?;

    let close = after_open
        .find("\n---")
        .ok_or("missing closing --- front matter delimiter")?;
    let toml_src = after_open[..close].trim_end_matches('\r');
    let rest = &after_open[close + "\n---".len()..];
    let body = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    let config = toml::from_str(toml_src).map_err(|e| format!("TOML parse error: {}", e))?;
    Ok((config, body))
}

pub struct FixtureResult {
    pub path: PathBuf,
    pub description: Option<String>,
    /// `None` on success, otherwise why the fixture failed.
    pub failure: Option<String>,
}

impl FixtureResult {
    fn label(&self) -> &str {
        self.description.as_deref().unwrap_or_else(|| {
            self.path
                .file_name()
                .and_then(|s| s.to_str())
                .map(|s| s.trim_end_matches(FIXTURE_SUFFIX))
                .unwrap_or("?")
        })
    }
}

pub fn run_fixture(path: &Path) -> FixtureResult {
    let (description, failure) = match std::fs::read_to_string(path) {
        Err(e) => (None, Some(format!("cannot read file: {}", e))),
        Ok(content) => match split_fixture(&content) {
            Err(e) => (None, Some(format!("front matter error: {}", e))),
            Ok((config, body)) => (config.description.clone(), check_fixture(&config, body)),
        },
    };
    FixtureResult {
        path: path.to_path_buf(),
        description,
        failure,
    }
}

/// Returns `Some(reason)` on the first expectation that does not hold.
fn check_fixture(config: &FixtureConfig, body: &str) -> Option<String> {
    let document = Parser::new(body.to_string(), 0).parse();
    let actions = document.actions();

    if let Some(reason) = compare_actions(&config.expect, &actions) {
        return Some(reason);
    }

    if let Some(expected) = &config.expect_warnings {
        let warnings = steps::diagnostic::check(&document);
        if let Some(reason) = compare_warnings(body, &warnings, expected) {
            return Some(reason);
        }
    }

    if config.roundtrip {
        return check_roundtrip(&document, &actions);
    }
    None
}

fn compare_actions(expected: &[Action], actual: &[Action]) -> Option<String> {
    if let Some(index) = expected.iter().zip(actual).position(|(e, a)| e != a) {
        return Some(format!(
            "action[{}] mismatch\n  expected: {:?}\n  actual:   {:?}",
            index, expected[index], actual[index]
        ));
    }
    if expected.len() != actual.len() {
        let extra = if actual.len() > expected.len() {
            format!("first unexpected: {:?}", actual[expected.len()])
        } else {
            format!("first missing: {:?}", expected[actual.len()])
        };
        return Some(format!(
            "expected {} action(s), got {}\n  {}",
            expected.len(),
            actual.len(),
            extra
        ));
    }
    None
}

/// Convert a byte offset in `source` to a 1-based line number.
fn line_of(source: &str, offset: usize) -> usize {
    source[..offset.min(source.len())].matches('\n').count() + 1
}

fn compare_warnings(
    source: &str,
    warnings: &[Warning],
    expected: &[ExpectedWarning],
) -> Option<String> {
    if warnings.len() != expected.len() {
        let listed: Vec<String> = warnings
            .iter()
            .map(|w| format!("    - line {}: {}", line_of(source, w.span.start), w.message))
            .collect();
        return Some(format!(
            "expected {} warning(s), got {}\n  actual warnings:\n{}",
            expected.len(),
            warnings.len(),
            if listed.is_empty() {
                "    (none)".to_string()
            } else {
                listed.join("\n")
            }
        ));
    }

    for (i, (warning, expected)) in warnings.iter().zip(expected).enumerate() {
        if !warning.message.contains(&expected.contains) {
            return Some(format!(
                "warning[{}]: expected message containing \"{}\", got: {}",
                i, expected.contains, warning.message
            ));
        }
        let line = line_of(source, warning.span.start);
        if expected.line.is_some_and(|want| want != line) {
            return Some(format!(
                "warning[{}]: expected on line {}, but span is on line {}",
                i,
                expected.line.unwrap_or_default(),
                line
            ));
        }
    }
    None
}

fn check_roundtrip(document: &Document, actions: &[Action]) -> Option<String> {
    let rendered = document.to_markdown();
    let again = Parser::new(rendered.clone(), 0).parse().actions();
    compare_actions(actions, &again).map(|reason| {
        format!(
            "rendered Markdown yields different actions\n  {}\n  rendered:\n{}",
            reason,
            rendered
                .lines()
                .map(|l| format!("    | {}", l))
                .collect::<Vec<_>>()
                .join("\n")
        )
    })
}

/// Fixture files grouped by category (directory relative to `root`, "" for the root itself).
fn discover(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut found: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect(root, root, &mut found);
    for files in found.values_mut() {
        files.sort();
    }
    found
}

fn collect(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for path in entries.flatten().map(|e| e.path()) {
        if path.is_dir() {
            collect(&path, root, out);
            continue;
        }
        let is_fixture = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(FIXTURE_SUFFIX));
        if is_fixture {
            let category = path
                .parent()
                .and_then(|p| p.strip_prefix(root).ok())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            out.entry(category).or_default().push(path);
        }
    }
}

fn category_label(category: &str) -> &str {
    if category.is_empty() { "(root)" } else { category }
}

pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }
    let categories = discover(path);
    if categories.is_empty() {
        eprintln!("no {} files found in {}", FIXTURE_SUFFIX, path.display());
        return;
    }
    eprintln!("available categories:");
    for (category, files) in &categories {
        eprintln!("  {} ({} tests)", category_label(category), files.len());
    }
}

/// Pick the fixtures to run: a single file, or every category matching `requested`.
fn select(path: &Path, requested: &[String]) -> Result<BTreeMap<String, Vec<PathBuf>>, String> {
    if path.is_file() {
        return Ok(BTreeMap::from([(String::new(), vec![path.to_path_buf()])]));
    }

    let all = discover(path);
    if all.is_empty() {
        return Err(format!("no {} files found in {}", FIXTURE_SUFFIX, path.display()));
    }
    if requested.is_empty() {
        return Ok(all);
    }

    let mut selected = BTreeMap::new();
    for wanted in requested {
        let wanted = wanted.trim_matches('/');
        let prefix = format!("{}/", wanted);
        let matching: Vec<_> = all
            .iter()
            .filter(|(category, _)| *category == wanted || category.starts_with(&prefix))
            .collect();
        if matching.is_empty() {
            let available: Vec<&str> = all.keys().map(|k| category_label(k)).collect();
            eprintln!(
                "warning: category '{}' not found (available: {})",
                wanted,
                available.join(", ")
            );
        }
        for (category, files) in matching {
            selected.insert(category.clone(), files.clone());
        }
    }

    if selected.is_empty() {
        return Err("no matching categories found".into());
    }
    Ok(selected)
}

fn write_colored(out: &mut StandardStream, text: &str, spec: &ColorSpec) -> io::Result<()> {
    out.set_color(spec)?;
    write!(out, "{}", text)?;
    out.reset()
}

fn status_spec(ok: bool) -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(if ok { Color::Green } else { Color::Red }));
    spec
}

/// Run fixtures under `path` and print a report to stderr.
/// Returns the process exit code: 0 when everything passed.
pub fn run_fixtures(path: &Path, color_choice: ColorChoice, categories: &[String]) -> i32 {
    let selected = match select(path, categories) {
        Ok(selected) => selected,
        Err(message) => {
            eprintln!("{}", message);
            return 1;
        }
    };

    let mut out = StandardStream::stderr(color_choice);
    match report(&mut out, &selected) {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            eprintln!("error: cannot write report: {}", e);
            1
        }
    }
}

fn report(out: &mut StandardStream, selected: &BTreeMap<String, Vec<PathBuf>>) -> io::Result<bool> {
    let single = selected.values().map(Vec::len).sum::<usize>() == 1;
    let mut bold = ColorSpec::new();
    bold.set_bold(true);

    let mut passed = 0usize;
    let mut failures = Vec::new();
    for (category, files) in selected {
        if !single {
            writeln!(out)?;
            write_colored(out, category_label(category), &bold)?;
            writeln!(out)?;
        }
        for file in files {
            let result = run_fixture(file);
            let ok = result.failure.is_none();
            write!(out, "  ")?;
            write_colored(out, if ok { "PASS" } else { "FAIL" }, &status_spec(ok))?;
            writeln!(out, "  {}", result.label())?;
            if ok {
                passed += 1;
            } else {
                failures.push(result);
            }
        }
    }

    if !failures.is_empty() {
        writeln!(out)?;
        writeln!(out, "failures:")?;
        for failure in &failures {
            writeln!(out)?;
            writeln!(out, "  --- {} ---", failure.path.display())?;
            for line in failure.failure.iter().flat_map(|reason| reason.lines()) {
                writeln!(out, "  {}", line)?;
            }
        }
    }

    writeln!(out)?;
    write!(out, "test result: ")?;
    let ok = failures.is_empty();
    write_colored(out, if ok { "ok" } else { "FAILED" }, &status_spec(ok))?;
    writeln!(
        out,
        ". {} passed, {} failed (of {})",
        passed,
        failures.len(),
        passed + failures.len()
    )?;
    Ok(ok)
}
