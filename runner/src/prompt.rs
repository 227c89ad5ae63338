use std::io::{BufRead, Write};

use crate::error::RunnerError;

/// Line-oriented questions and answers with the operator.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Prompter { input, output }
    }

    pub fn say(&mut self, text: &str) -> Result<(), RunnerError> {
        writeln!(self.output, "{}", text).map_err(RunnerError::Terminal)
    }

    /// Print `question` and read one line. The line break is not part of the answer.
    pub fn ask(&mut self, question: &str) -> Result<String, RunnerError> {
        write!(self.output, "{}", question).map_err(RunnerError::Terminal)?;
        self.output.flush().map_err(RunnerError::Terminal)?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(RunnerError::Terminal)?;
        if read == 0 {
            return Err(RunnerError::InputClosed);
        }
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }

    pub fn press_enter(&mut self) -> Result<(), RunnerError> {
        self.ask("Press enter to continue. ").map(drop)
    }

    /// Yes/no question defaulting to yes. Asks again until the answer is `y`, `n` or empty.
    pub fn confirm(&mut self, question: &str) -> Result<bool, RunnerError> {
        let question = format!("{} ([y]/n): ", question);
        loop {
            match self.ask(&question)?.trim().to_lowercase().as_str() {
                "" | "y" => return Ok(true),
                "n" => return Ok(false),
                _ => {}
            }
        }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }
}
