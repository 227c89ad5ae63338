use std::fs;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use steps::action::Action;
use tracing::{debug, info, warn};

use crate::error::RunnerError;
use crate::prompt::Prompter;
use crate::session::{Session, SessionStore};
use crate::shell::CommandExecutor;

/// Walks the operator through a list of actions.
pub struct Runner<R, W, E> {
    prompter: Prompter<R, W>,
    executor: E,
    /// Relative file paths in actions resolve against this directory.
    workdir: PathBuf,
}

impl<R: BufRead, W: Write, E: CommandExecutor> Runner<R, W, E> {
    pub fn new(prompter: Prompter<R, W>, executor: E, workdir: impl Into<PathBuf>) -> Self {
        Runner {
            prompter,
            executor,
            workdir: workdir.into(),
        }
    }

    /// Perform actions starting at `session.next_action_index`.
    ///
    /// The session is saved after every action, so an interrupted run resumes
    /// at the first unfinished one. Once the last action is done the stored
    /// session is deleted.
    pub fn run(
        &mut self,
        actions: &[Action],
        session: &mut Session,
        store: &SessionStore,
    ) -> Result<(), RunnerError> {
        info!(
            file = %session.file_path.display(),
            from = session.next_action_index,
            total = actions.len(),
            "running actions"
        );
        store.save(session)?;

        while let Some(action) = actions.get(session.next_action_index) {
            self.perform(action)?;
            session.next_action_index += 1;
            store.save(session)?;
        }

        store.delete()
    }

    pub fn perform(&mut self, action: &Action) -> Result<(), RunnerError> {
        debug!(kind = action.kind(), "performing action");
        match action {
            Action::Instruction { text } => {
                self.prompter.say(text)?;
                self.prompter.press_enter()
            }
            Action::Information { text } => self.prompter.say(text),
            Action::WriteCodeInstruction { text, file_path } => {
                self.prompter.say(text)?;
                self.create_file(file_path, None)?;
                self.prompter.press_enter()
            }
            Action::RunCommand { text, command } => self.run_command(text, command),
            Action::RunCommands { text, commands } => {
                for command in commands {
                    self.run_command(text, command)?;
                }
                Ok(())
            }
            Action::WriteCode { file_path, code } => self.create_file(file_path, Some(code)),
        }
    }

    /// Offer to run `command`, an alternative the operator types in, or nothing.
    /// A failing command is offered again.
    fn run_command(&mut self, text: &str, command: &str) -> Result<(), RunnerError> {
        let question = format!("Run `{}` ([y]/n/alternative command): ", command);
        loop {
            self.prompter.say(text)?;
            let answer = self.prompter.ask(&question)?;
            let to_run = match answer.trim().to_lowercase().as_str() {
                "" | "y" => command.to_string(),
                "n" => return Ok(()),
                _ => answer.trim().to_string(),
            };

            match self.executor.run(&to_run) {
                Ok(true) => return Ok(()),
                Ok(false) => warn!(command = %to_run, "command failed"),
                Err(e) => warn!(command = %to_run, error = %e, "command could not be started"),
            }
            self.prompter.say("The command failed.")?;
        }
    }

    /// Create `file_path`, or overwrite it when `content` is given. Asks first.
    /// An existing file is left alone when there is nothing to write.
    fn create_file(&mut self, file_path: &str, content: Option<&str>) -> Result<(), RunnerError> {
        let target = self.workdir.join(file_path);
        let question = if target.exists() {
            match content {
                Some(code) if !code.is_empty() => Some(format!(
                    "Would you like me to overwrite the file \"{}\" with the new code?",
                    file_path
                )),
                _ => None,
            }
        } else {
            Some(format!("Would you like me to create the file \"{}\"?", file_path))
        };

        let Some(question) = question else {
            return Ok(());
        };
        if !self.prompter.confirm(&question)? {
            return Ok(());
        }

        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir).map_err(|e| RunnerError::io("creating", dir, e))?;
        }
        fs::write(&target, content.unwrap_or_default())
            .map_err(|e| RunnerError::io("writing", &target, e))?;
        info!(path = %target.display(), "wrote file");
        Ok(())
    }

    pub fn into_parts(self) -> (Prompter<R, W>, E) {
        (self.prompter, self.executor)
    }
}
