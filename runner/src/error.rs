use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O error while {operation} {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error on the terminal: {0}")]
    Terminal(#[source] std::io::Error),

    #[error("failed to parse session file {path}: {source}")]
    SessionParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize session for {path}: {source}")]
    SessionSerialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no data directory for this platform; pass --session-dir or set DO_STEPS_SESSION_DIR")]
    NoSessionDir,

    #[error("input closed while waiting for an answer")]
    InputClosed,

    #[error("please provide a path to a Markdown file")]
    NoInputFile,
}

impl RunnerError {
    #[must_use]
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}
