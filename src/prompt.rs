//! Operator confirmations.

use std::io::{self, BufRead, Write};

/// The only answer treated as "yes". Matched case-sensitively.
pub const AFFIRMATIVE: &str = "y";

pub trait Confirm {
    /// Show `question` and return the operator's raw answer.
    fn ask(&mut self, question: &str) -> io::Result<String>;

    /// `true` only when the trimmed answer is exactly [`AFFIRMATIVE`].
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        Ok(self.ask(question)?.trim() == AFFIRMATIVE)
    }
}

/// Line-based prompter over any reader/writer pair.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl LinePrompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Confirm for LinePrompter<R, W> {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{} ", question)?;
        self.output.flush()?;
        let mut answer = String::new();
        // EOF reads as an empty answer, i.e. "no".
        self.input.read_line(&mut answer)?;
        Ok(answer)
    }
}

/// Answers every question with [`AFFIRMATIVE`] without prompting.
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn ask(&mut self, _question: &str) -> io::Result<String> {
        Ok(AFFIRMATIVE.to_string())
    }
}
