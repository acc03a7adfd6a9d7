//! Terminal console with a per-read deadline.
//!
//! Interactive stdin is read key by key in raw mode, polling crossterm events
//! in short slices and checking the deadline between them. Piped stdin is read
//! line by line on a helper thread and waited on with `recv_timeout`.

use std::{
    io::{self, BufRead, Stdout, Write},
    sync::mpsc::{self, Receiver, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};

use anyhow::{anyhow, bail, Context, Result};
use crossterm::{
    cursor::{MoveLeft, MoveTo},
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers,
    },
    execute,
    style::Print,
    terminal::{self, Clear, ClearType},
    tty::IsTty,
};
use numconv_core::{Console, ReadOutcome};
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// What a key press does to the line being typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EditAction {
    Insert(char),
    Erase,
    Submit(String),
    Interrupt,
    Ignore,
}

/// Buffer for the line being typed.
#[derive(Debug, Default)]
pub(crate) struct LineEditor {
    buffer: String,
}

impl LineEditor {
    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> EditAction {
        if key.kind != KeyEventKind::Press {
            return EditAction::Ignore;
        }
        match key.code {
            KeyCode::Enter => EditAction::Submit(std::mem::take(&mut self.buffer)),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                EditAction::Interrupt
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                self.buffer.push(ch);
                EditAction::Insert(ch)
            }
            KeyCode::Backspace => match self.buffer.pop() {
                Some(_) => EditAction::Erase,
                None => EditAction::Ignore,
            },
            _ => EditAction::Ignore,
        }
    }

    pub(crate) fn push_str(&mut self, text: &str) -> String {
        let accepted: String = text.chars().filter(|ch| !ch.is_control()).collect();
        self.buffer.push_str(&accepted);
        accepted
    }

    pub(crate) fn buffer(&self) -> &str {
        &self.buffer
    }
}

/// Keeps raw mode and bracketed paste on for the lifetime of one read.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode().context("failed to enable raw mode")?;
        if let Err(err) = execute!(io::stdout(), EnableBracketedPaste) {
            debug!("bracketed paste unavailable: {err}");
        }
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), DisableBracketedPaste);
        let _ = terminal::disable_raw_mode();
    }
}

/// Console bound to the process's stdin and stdout.
pub struct TerminalConsole {
    stdout: Stdout,
    interactive: bool,
    piped: Option<Receiver<io::Result<String>>>,
}

impl TerminalConsole {
    /// Console over the process's stdin and stdout.
    pub fn new() -> Self {
        let interactive = io::stdin().is_tty();
        debug!(interactive, "terminal console ready");
        Self {
            stdout: io::stdout(),
            interactive,
            piped: None,
        }
    }

    fn read_interactive(&mut self, deadline: Option<Instant>) -> Result<ReadOutcome> {
        let guard = RawModeGuard::enable()?;
        let mut editor = LineEditor::default();

        let outcome = loop {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                debug!(discarded = editor.buffer(), "input deadline passed");
                break ReadOutcome::TimedOut;
            }
            if !event::poll(POLL_INTERVAL).context("failed to poll terminal events")? {
                continue;
            }
            match event::read().context("failed to read terminal event")? {
                Event::Key(key) => match editor.handle_key(key) {
                    EditAction::Insert(ch) => execute!(self.stdout, Print(ch))?,
                    EditAction::Erase => {
                        execute!(self.stdout, MoveLeft(1), Print(' '), MoveLeft(1))?
                    }
                    EditAction::Submit(line) => break ReadOutcome::Line(line),
                    EditAction::Interrupt => {
                        drop(guard);
                        self.write("\r\n")?;
                        bail!("interrupted by Ctrl+C");
                    }
                    EditAction::Ignore => {}
                },
                Event::Paste(text) => {
                    let accepted = editor.push_str(&text);
                    execute!(self.stdout, Print(accepted))?;
                }
                _ => {}
            }
        };

        drop(guard);
        self.write("\r\n")?;
        Ok(outcome)
    }

    fn read_piped(&mut self, deadline: Option<Instant>) -> Result<ReadOutcome> {
        let lines = self.piped.get_or_insert_with(spawn_line_reader);
        let outcome = wait_line(lines, deadline)?;
        if outcome == ReadOutcome::TimedOut {
            self.write("\n")?;
        }
        Ok(outcome)
    }
}

/// Wait for the next line from a reader thread, giving up at `deadline`.
fn wait_line(
    lines: &Receiver<io::Result<String>>,
    deadline: Option<Instant>,
) -> Result<ReadOutcome> {
    let line = match deadline {
        Some(deadline) => {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match lines.recv_timeout(remaining) {
                Ok(line) => line,
                Err(RecvTimeoutError::Timeout) => return Ok(ReadOutcome::TimedOut),
                Err(RecvTimeoutError::Disconnected) => bail!("standard input closed"),
            }
        }
        None => lines.recv().map_err(|_| anyhow!("standard input closed"))?,
    };
    let line = line.context("failed to read standard input")?;
    Ok(ReadOutcome::Line(line.trim_end_matches('\r').to_string()))
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

fn spawn_line_reader() -> Receiver<io::Result<String>> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            if sender.send(line).is_err() {
                break;
            }
        }
        debug!("standard input reader stopped");
    });
    receiver
}

impl Console for TerminalConsole {
    fn write(&mut self, text: &str) -> Result<()> {
        self.stdout
            .write_all(text.as_bytes())
            .and_then(|_| self.stdout.flush())
            .context("failed to write to terminal")
    }

    fn read_line(&mut self, prompt: &str, timeout_secs: u64) -> Result<ReadOutcome> {
        self.write(prompt)?;
        let deadline =
            (timeout_secs > 0).then(|| Instant::now() + Duration::from_secs(timeout_secs));
        if self.interactive {
            self.read_interactive(deadline)
        } else {
            self.read_piped(deadline)
        }
    }

    fn clear(&mut self) -> Result<()> {
        if let Err(err) = execute!(self.stdout, Clear(ClearType::All), MoveTo(0, 0)) {
            debug!("screen clear failed: {err}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typed_characters_are_submitted_on_enter() {
        let mut editor = LineEditor::default();
        assert_eq!(editor.handle_key(press(KeyCode::Char('0'))), EditAction::Insert('0'));
        assert_eq!(editor.handle_key(press(KeyCode::Char('x'))), EditAction::Insert('x'));
        assert_eq!(
            editor.handle_key(press(KeyCode::Enter)),
            EditAction::Submit("0x".to_string())
        );
        assert_eq!(editor.buffer(), "");
    }

    #[test]
    fn backspace_removes_last_character() {
        let mut editor = LineEditor::default();
        assert_eq!(editor.handle_key(press(KeyCode::Backspace)), EditAction::Ignore);
        editor.handle_key(press(KeyCode::Char('a')));
        editor.handle_key(press(KeyCode::Char('b')));
        assert_eq!(editor.handle_key(press(KeyCode::Backspace)), EditAction::Erase);
        assert_eq!(
            editor.handle_key(press(KeyCode::Enter)),
            EditAction::Submit("a".to_string())
        );
    }

    #[test]
    fn empty_line_is_a_valid_submission() {
        let mut editor = LineEditor::default();
        assert_eq!(
            editor.handle_key(press(KeyCode::Enter)),
            EditAction::Submit(String::new())
        );
    }

    #[test]
    fn ctrl_c_interrupts() {
        let mut editor = LineEditor::default();
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(editor.handle_key(key), EditAction::Interrupt);
    }

    #[test]
    fn shifted_letters_are_inserted() {
        let mut editor = LineEditor::default();
        let key = KeyEvent::new(KeyCode::Char('F'), KeyModifiers::SHIFT);
        assert_eq!(editor.handle_key(key), EditAction::Insert('F'));
        assert_eq!(editor.handle_key(press(KeyCode::Tab)), EditAction::Ignore);
        assert_eq!(editor.buffer(), "F");
    }

    #[test]
    fn paste_drops_control_characters() {
        let mut editor = LineEditor::default();
        assert_eq!(editor.push_str("ab\r\n"), "ab");
        assert_eq!(editor.buffer(), "ab");
    }

    #[test]
    fn silent_input_times_out_at_the_deadline() -> Result<()> {
        let (_sender, receiver) = mpsc::channel::<io::Result<String>>();
        let started = Instant::now();
        let deadline = started + Duration::from_millis(30);
        assert_eq!(wait_line(&receiver, Some(deadline))?, ReadOutcome::TimedOut);
        assert!(started.elapsed() >= Duration::from_millis(30));
        Ok(())
    }

    #[test]
    fn queued_line_arrives_before_the_deadline() -> Result<()> {
        let (sender, receiver) = mpsc::channel();
        sender.send(Ok("0x1f\r".to_string()))?;
        let deadline = Instant::now() + Duration::from_secs(5);
        assert_eq!(
            wait_line(&receiver, Some(deadline))?,
            ReadOutcome::Line("0x1f".to_string())
        );
        Ok(())
    }

    #[test]
    fn untimed_read_waits_for_the_reader_thread() -> Result<()> {
        let (sender, receiver) = mpsc::channel();
        let writer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            let _ = sender.send(Ok("Tester".to_string()));
        });
        assert_eq!(wait_line(&receiver, None)?, ReadOutcome::Line("Tester".to_string()));
        writer.join().map_err(|_| anyhow!("writer thread panicked"))?;
        Ok(())
    }

    #[test]
    fn closed_input_is_an_error() {
        let (sender, receiver) = mpsc::channel::<io::Result<String>>();
        drop(sender);
        assert!(wait_line(&receiver, None).is_err());
        let deadline = Instant::now() + Duration::from_millis(10);
        assert!(wait_line(&receiver, Some(deadline)).is_err());
    }
}
