use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::RunnerError;

/// Overrides the directory the session file lives in.
pub const SESSION_DIR_ENV: &str = "DO_STEPS_SESSION_DIR";
pub const SESSION_FILE_NAME: &str = "session.json";
const APP_DIR: &str = "do-steps";

/// Progress through one Markdown file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Absolute path of the Markdown file.
    pub file_path: PathBuf,
    /// Hash of the file contents when the session started.
    pub content_hash: String,
    /// Index of the first action not yet performed.
    pub next_action_index: usize,
}

/// Whether a stored session can still be resumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Resumable,
    FileMissing,
    /// The file changed since the session started; action indices no longer line up.
    Changed,
}

impl Session {
    pub fn start(file_path: PathBuf, contents: &str) -> Self {
        Session {
            file_path,
            content_hash: content_hash(contents.as_bytes()),
            next_action_index: 0,
        }
    }

    pub fn status(&self) -> Result<SessionStatus, RunnerError> {
        match fs::read(&self.file_path) {
            Ok(bytes) if content_hash(&bytes) == self.content_hash => Ok(SessionStatus::Resumable),
            Ok(_) => Ok(SessionStatus::Changed),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(SessionStatus::FileMissing),
            Err(e) => Err(RunnerError::io("reading", &self.file_path, e)),
        }
    }
}

/// Hex-encoded SHA-256 of the file contents.
pub fn content_hash(contents: &[u8]) -> String {
    format!("{:x}", Sha256::digest(contents))
}

/// `$DO_STEPS_SESSION_DIR`, falling back to the platform data directory.
pub fn default_session_dir() -> Result<PathBuf, RunnerError> {
    if let Some(dir) = env::var_os(SESSION_DIR_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or(RunnerError::NoSessionDir)
}

/// The single persisted session, stored as JSON.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        SessionStore {
            path: dir.as_ref().join(SESSION_FILE_NAME),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored session, if there is one.
    pub fn load(&self) -> Result<Option<Session>, RunnerError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RunnerError::io("reading", &self.path, e)),
        };
        let session = serde_json::from_str(&json).map_err(|source| RunnerError::SessionParse {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(session))
    }

    pub fn save(&self, session: &Session) -> Result<(), RunnerError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| RunnerError::io("creating", dir, e))?;
        }
        let json =
            serde_json::to_string_pretty(session).map_err(|source| RunnerError::SessionSerialize {
                path: self.path.clone(),
                source,
            })?;
        fs::write(&self.path, json).map_err(|e| RunnerError::io("writing", &self.path, e))?;
        debug!(
            path = %self.path.display(),
            next_action = session.next_action_index,
            "saved session"
        );
        Ok(())
    }

    /// Remove the stored session. A missing file is not an error.
    pub fn delete(&self) -> Result<(), RunnerError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "deleted session");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RunnerError::io("removing", &self.path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_load_delete_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::in_dir(dir.path().join("nested"));
        assert_eq!(store.load().unwrap(), None);

        let mut session = Session::start(PathBuf::from("/tmp/steps.md"), "# Steps");
        session.next_action_index = 3;
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));

        store.delete().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.delete().unwrap();
    }

    #[test]
    fn session_file_uses_camel_case_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::in_dir(dir.path());
        store
            .save(&Session::start(PathBuf::from("/a.md"), "x"))
            .unwrap();
        let json = fs::read_to_string(store.path()).unwrap();
        assert!(json.contains("\"filePath\""));
        assert!(json.contains("\"contentHash\""));
        assert!(json.contains("\"nextActionIndex\": 0"));
    }

    #[test]
    fn corrupt_session_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::in_dir(dir.path());
        fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(store.load(), Err(RunnerError::SessionParse { .. })));
    }

    #[test]
    fn status_tracks_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("steps.md");
        fs::write(&file, "1. Do it").unwrap();

        let session = Session::start(file.clone(), "1. Do it");
        assert_eq!(session.status().unwrap(), SessionStatus::Resumable);

        fs::write(&file, "1. Do something else").unwrap();
        assert_eq!(session.status().unwrap(), SessionStatus::Changed);

        fs::remove_file(&file).unwrap();
        assert_eq!(session.status().unwrap(), SessionStatus::FileMissing);
    }

    #[test]
    fn hash_is_hex_sha256() {
        assert_eq!(
            content_hash(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
