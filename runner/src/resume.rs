use std::fs;
use std::io::{BufRead, Write};
use std::path::{Component, Path, PathBuf};

use steps::action::Action;
use tracing::{debug, warn};

use crate::error::RunnerError;
use crate::prompt::Prompter;
use crate::session::{Session, SessionStatus, SessionStore};

/// Decide which session to run: the stored one, if the operator wants to
/// continue it, or a new one for `file`.
///
/// Without a `file` the stored session is the only option. `fresh` skips the
/// offer to continue.
pub fn start_session<R: BufRead, W: Write>(
    store: &SessionStore,
    file: Option<&Path>,
    fresh: bool,
    prompter: &mut Prompter<R, W>,
) -> Result<Session, RunnerError> {
    let previous = match store.load() {
        Ok(previous) => previous.filter(|_| !fresh),
        Err(e) => {
            warn!(error = %e, "ignoring unreadable session file");
            None
        }
    };

    let Some(file) = file else {
        return match previous {
            Some(previous) if offer_to_continue(&previous, prompter)? => Ok(previous),
            _ => Err(RunnerError::NoInputFile),
        };
    };

    let path = std::path::absolute(file)
        .map(|p| normalize(&p))
        .map_err(|e| RunnerError::io("resolving", file, e))?;
    if let Some(previous) = previous.filter(|s| s.file_path == path) {
        if offer_to_continue(&previous, prompter)? {
            return Ok(previous);
        }
    }

    let contents = fs::read_to_string(&path).map_err(|e| RunnerError::io("reading", &path, e))?;
    prompter.say("Starting with a new session.")?;
    Ok(Session::start(path, &contents))
}

fn offer_to_continue<R: BufRead, W: Write>(
    session: &Session,
    prompter: &mut Prompter<R, W>,
) -> Result<bool, RunnerError> {
    match session.status()? {
        SessionStatus::Resumable => prompter.confirm(&format!(
            "Would you like to continue the last session (file: \"{}\", action: {})?",
            session.file_path.display(),
            session.next_action_index + 1
        )),
        status => {
            debug!(?status, file = %session.file_path.display(), "stored session cannot be resumed");
            Ok(false)
        }
    }
}

/// Resolve `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last = normalized.components().next_back();
                // `/..` is `/`.
                let at_root = matches!(last, Some(Component::RootDir | Component::Prefix(_)));
                let has_parent = matches!(last, Some(Component::Normal(_)));
                if has_parent {
                    normalized.pop();
                } else if !at_root {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Read the session's Markdown file and extract its actions.
pub fn load_actions(session: &Session) -> Result<Vec<Action>, RunnerError> {
    let source = fs::read_to_string(&session.file_path)
        .map_err(|e| RunnerError::io("reading", &session.file_path, e))?;
    Ok(steps::actions_from_markdown(&source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_drops_dot_components() {
        assert_eq!(
            normalize(Path::new("/work/docs/../steps.md")),
            PathBuf::from("/work/steps.md")
        );
        assert_eq!(
            normalize(Path::new("/work/./a/b/../../steps.md")),
            PathBuf::from("/work/steps.md")
        );
        assert_eq!(normalize(Path::new("/../steps.md")), PathBuf::from("/steps.md"));
        assert_eq!(normalize(Path::new("../../steps.md")), PathBuf::from("../../steps.md"));
    }
}
