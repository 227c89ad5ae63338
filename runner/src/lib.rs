pub mod error;
pub mod executor;
pub mod prompt;
pub mod resume;
pub mod session;
pub mod shell;

pub use error::RunnerError;
pub use executor::Runner;
pub use prompt::Prompter;
pub use resume::{load_actions, start_session};
pub use session::{Session, SessionStatus, SessionStore, default_session_dir};
pub use shell::{CommandExecutor, ShellExecutor};
