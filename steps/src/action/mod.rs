use std::fmt;

use serde::{Deserialize, Serialize};

/// One unit of work the runner presents to, or performs for, the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// A plain directive to display and acknowledge.
    Instruction { text: String },
    /// Display-only text.
    Information { text: String },
    /// A directive that names a file to create if it is missing.
    WriteCodeInstruction { text: String, file_path: String },
    /// A directive naming exactly one shell command.
    RunCommand { text: String, command: String },
    /// A directive naming two or more shell commands, run in sequence.
    RunCommands { text: String, commands: Vec<String> },
    /// Literal source text to write verbatim into `file_path`.
    WriteCode { file_path: String, code: String },
}

impl Action {
    /// The snake_case tag this variant carries in JSON and fixture files.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Instruction { .. } => "instruction",
            Action::Information { .. } => "information",
            Action::WriteCodeInstruction { .. } => "write_code_instruction",
            Action::RunCommand { .. } => "run_command",
            Action::RunCommands { .. } => "run_commands",
            Action::WriteCode { .. } => "write_code",
        }
    }
}

/// One-line summary, used by `do-steps actions`.
impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.kind())?;
        match self {
            Action::Instruction { text } | Action::Information { text } => write!(f, "{}", text),
            Action::WriteCodeInstruction { file_path, .. } => write!(f, "{}", file_path),
            Action::RunCommand { command, .. } => write!(f, "{}", command),
            Action::RunCommands { commands, .. } => write!(f, "{}", commands.join(" && ")),
            Action::WriteCode { file_path, code } => {
                write!(f, "{} ({} lines)", file_path, code.lines().count())
            }
        }
    }
}
