//! Console abstraction shared by providers, sessions and the score store.

use std::collections::VecDeque;

use anyhow::{anyhow, Result};

/// Result of waiting for one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A complete line, without its terminator.
    Line(String),
    /// The deadline passed before Enter was pressed; partial input is discarded.
    TimedOut,
}

impl ReadOutcome {
    /// Return the submitted line, if any.
    pub fn into_line(self) -> Option<String> {
        match self {
            ReadOutcome::Line(line) => Some(line),
            ReadOutcome::TimedOut => None,
        }
    }
}

/// Line-oriented console the game talks to.
///
/// A `timeout_secs` of `0` blocks until a line is submitted.
pub trait Console {
    /// Write text without appending a newline.
    fn write(&mut self, text: &str) -> Result<()>;

    /// Print `prompt` and wait at most `timeout_secs` for a line.
    fn read_line(&mut self, prompt: &str, timeout_secs: u64) -> Result<ReadOutcome>;

    /// Clear the screen. Implementations without a screen may do nothing.
    fn clear(&mut self) -> Result<()>;

    /// Write text followed by a newline.
    fn writeln(&mut self, text: &str) -> Result<()> {
        self.write(text)?;
        self.write("\n")
    }

    /// Block until the user presses Enter; the line content is ignored.
    fn pause(&mut self, prompt: &str) -> Result<()> {
        self.read_line(prompt, 0).map(|_| ())
    }
}

/// Headless console fed with canned replies, capturing everything written.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    replies: VecDeque<ReadOutcome>,
    output: String,
    timeouts: Vec<u64>,
    clears: usize,
}

impl ScriptedConsole {
    /// Console with no replies queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a console that answers each read with the given lines in order.
    pub fn with_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut console = Self::new();
        for line in lines {
            console.push_line(line);
        }
        console
    }

    /// Queue a submitted line.
    pub fn push_line(&mut self, line: impl Into<String>) -> &mut Self {
        self.replies.push_back(ReadOutcome::Line(line.into()));
        self
    }

    /// Queue a read that times out.
    pub fn push_timeout(&mut self) -> &mut Self {
        self.replies.push_back(ReadOutcome::TimedOut);
        self
    }

    /// Everything written so far, prompts included.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Timeouts requested by each read, in call order.
    pub fn timeouts(&self) -> &[u64] {
        &self.timeouts
    }

    /// Number of screen clears requested.
    pub fn clears(&self) -> usize {
        self.clears
    }

    /// Replies not consumed yet.
    pub fn remaining(&self) -> usize {
        self.replies.len()
    }
}

impl Console for ScriptedConsole {
    fn write(&mut self, text: &str) -> Result<()> {
        self.output.push_str(text);
        Ok(())
    }

    fn read_line(&mut self, prompt: &str, timeout_secs: u64) -> Result<ReadOutcome> {
        self.output.push_str(prompt);
        self.timeouts.push(timeout_secs);
        let reply = self
            .replies
            .pop_front()
            .ok_or_else(|| anyhow!("scripted console has no reply for prompt {prompt:?}"))?;
        if let ReadOutcome::Line(line) = &reply {
            self.output.push_str(line);
            self.output.push('\n');
        }
        Ok(reply)
    }

    fn clear(&mut self) -> Result<()> {
        self.clears += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_console_replays_in_order() -> Result<()> {
        let mut console = ScriptedConsole::with_lines(["first"]);
        console.push_timeout();

        assert_eq!(
            console.read_line("a? ", 3)?,
            ReadOutcome::Line("first".to_string())
        );
        assert_eq!(console.read_line("b? ", 0)?, ReadOutcome::TimedOut);
        assert!(console.read_line("c? ", 0).is_err());
        assert_eq!(console.timeouts(), &[3, 0, 0]);
        assert!(console.output().starts_with("a? first\nb? "));
        Ok(())
    }

    #[test]
    fn pause_ignores_content() -> Result<()> {
        let mut console = ScriptedConsole::with_lines(["whatever"]);
        console.pause("Press enter")?;
        assert_eq!(console.remaining(), 0);
        Ok(())
    }
}
