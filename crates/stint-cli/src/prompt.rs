//! Confirmation prompts for destructive edits.

use std::io::{self, Write};

/// Asks the user to confirm an action. Injected into `app::run` so
/// tests can script the answers.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool>;
}

/// Reads a y/n answer from stdin. Anything but `y`/`yes` declines.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        let mut stderr = io::stderr();
        write!(stderr, "{prompt} [y/N] ")?;
        stderr.flush()?;

        let mut answer = String::new();
        io::stdin().read_line(&mut answer)?;
        let answer = answer.trim();
        Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
    }
}

/// Accepts everything, for `--yes`.
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _prompt: &str) -> io::Result<bool> {
        Ok(true)
    }
}

#[cfg(test)]
pub(crate) struct Scripted {
    answers: Vec<bool>,
}

#[cfg(test)]
impl Scripted {
    pub fn new(answers: &[bool]) -> Self {
        let mut answers = answers.to_vec();
        answers.reverse();
        Self { answers }
    }
}

#[cfg(test)]
impl Confirm for Scripted {
    fn confirm(&mut self, _prompt: &str) -> io::Result<bool> {
        Ok(self.answers.pop().unwrap_or(false))
    }
}
