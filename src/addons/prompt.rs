//! Provides the [`Prompter`] trait used to ask the operator questions, along with
//! [`LinePrompter`], which asks them over a line-based reader and writer such as a terminal.
use snafu::{ensure, ResultExt};
use std::io::{BufRead, Stdin, StdinLock, Stdout, Write};

pub use error::PromptError;

type Result<T> = std::result::Result<T, PromptError>;

/// Asks the operator questions.
pub trait Prompter {
    /// Asks a yes/no question. Answers are matched case-insensitively against `positive` and
    /// `negative`.
    fn confirm(&mut self, question: &str, positive: &[&str], negative: &[&str]) -> Result<bool>;

    /// Asks for a free-text value.
    fn ask(&mut self, prompt: &str) -> Result<String>;
}

/// A [`Prompter`] reading answers line by line.
///
/// Unrecognized confirmations and empty values are asked again.
#[derive(Debug)]
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl LinePrompter<StdinLock<'static>, Stdout> {
    /// Prompts on the process's terminal.
    pub fn stdio() -> Self {
        let stdin: Stdin = std::io::stdin();
        Self::new(stdin.lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consumes the prompter, returning what was written to the operator.
    pub fn into_output(self) -> W {
        self.output
    }

    fn write_prompt(&mut self, prompt: &str) -> Result<()> {
        write!(self.output, "{}", prompt).context(error::WriteSnafu)?;
        self.output.flush().context(error::WriteSnafu)
    }

    fn read_answer(&mut self) -> Result<String> {
        let mut line = String::new();
        let read = self.input.read_line(&mut line).context(error::ReadSnafu)?;
        ensure!(read > 0, error::EndOfInputSnafu);
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn confirm(&mut self, question: &str, positive: &[&str], negative: &[&str]) -> Result<bool> {
        self.write_prompt(&format!("{} [y/n]: ", question))?;
        loop {
            let answer = self.read_answer()?.to_lowercase();
            if positive.contains(&answer.as_str()) {
                return Ok(true);
            }
            if negative.contains(&answer.as_str()) {
                return Ok(false);
            }
            self.write_prompt("Please type yes or no: ")?;
        }
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        self.write_prompt(prompt)?;
        loop {
            let answer = self.read_answer()?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            self.write_prompt("Please enter a value: ")?;
        }
    }
}

mod error {
    #![allow(missing_docs)]
    use snafu::Snafu;

    /// The error type returned when the operator cannot be asked a question.
    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub))]
    pub enum PromptError {
        #[snafu(display("Input ended before a question was answered"))]
        EndOfInput,

        #[snafu(display("Failed to read answer: {}", source))]
        Read { source: std::io::Error },

        #[snafu(display("Failed to write prompt: {}", source))]
        Write { source: std::io::Error },
    }
}
