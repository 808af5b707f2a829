use anyhow::{bail, Context, Result};
use std::io::{self, BufRead, Write};

pub const SOURCE_QUESTION: &str = "Please enter the path of the file to process: ";
pub const TARGET_QUESTION: &str = "Please enter the path to write the processed file: ";
pub const COLUMNS_QUESTION: &str =
    "Please enter the names of columns with phone numbers to be formatted: ";

/// Line-oriented questions over a reader/writer pair (stdin/stdout in the CLI).
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Prints `question` and returns the answer without its line ending.
    pub fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{question}").context("Failed to write prompt")?;
        self.output.flush().context("Failed to flush prompt")?;

        let mut line = String::new();
        let n = self
            .input
            .read_line(&mut line)
            .context("Failed to read answer")?;
        if n == 0 {
            bail!("Input closed before an answer to: {}", question.trim_end());
        }
        Ok(trim_line_ending(&line).to_string())
    }

    /// Source and target paths, in that order.
    pub fn ask_paths(&mut self) -> Result<(String, String)> {
        let source = self.ask(SOURCE_QUESTION)?;
        let target = self.ask(TARGET_QUESTION)?;
        Ok((source, target))
    }

    pub fn ask_columns(&mut self) -> Result<Vec<String>> {
        let answer = self.ask(COLUMNS_QUESTION)?;
        Ok(parse_columns(&answer))
    }

    /// Fills in whichever of the source and target paths was not given.
    pub fn resolve_paths(
        &mut self,
        source: Option<String>,
        target: Option<String>,
    ) -> Result<(String, String)> {
        match (source, target) {
            (Some(s), Some(t)) => Ok((s, t)),
            (Some(s), None) => Ok((s, self.ask(TARGET_QUESTION)?)),
            (None, Some(t)) => Ok((self.ask(SOURCE_QUESTION)?, t)),
            (None, None) => self.ask_paths(),
        }
    }

    /// Column names from the command line, or asked for when absent.
    ///
    /// Given values are split on whitespace like a typed answer, so
    /// `-c "phone mobile"` and `-c phone -c mobile` agree.
    pub fn resolve_columns(&mut self, given: Option<Vec<String>>) -> Result<Vec<String>> {
        match given {
            Some(values) => Ok(values.iter().flat_map(|v| parse_columns(v)).collect()),
            None => self.ask_columns(),
        }
    }
}

/// Strips one trailing `\n` (and a `\r` before it); other whitespace is kept.
pub fn trim_line_ending(line: &str) -> &str {
    match line.strip_suffix('\n') {
        Some(rest) => rest.strip_suffix('\r').unwrap_or(rest),
        None => line,
    }
}

/// Splits a free-text answer into column names on whitespace.
pub fn parse_columns(answer: &str) -> Vec<String> {
    answer.split_whitespace().map(str::to_string).collect()
}
