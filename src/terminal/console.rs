//! Console terminal over stdin/stdout

use std::io::{self, BufRead, IsTerminal, Write};

use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;

use super::{end_of_input, Terminal};

/// Line-oriented console
///
/// Clearing and hidden input only happen when attached to a real terminal;
/// with redirected streams both degrade to plain line IO.
pub struct ConsoleTerminal {
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
    interactive: bool,
    clear_enabled: bool,
}

impl ConsoleTerminal {
    /// Console on the process's stdin/stdout
    pub fn stdio() -> Self {
        let interactive = io::stdin().is_terminal() && io::stdout().is_terminal();
        Self {
            input: Box::new(io::stdin().lock()),
            output: Box::new(io::stdout()),
            interactive,
            clear_enabled: true,
        }
    }

    /// Non-interactive console over arbitrary streams
    pub fn from_io(input: impl BufRead + 'static, output: impl Write + 'static) -> Self {
        Self {
            input: Box::new(input),
            output: Box::new(output),
            interactive: false,
            clear_enabled: true,
        }
    }

    /// Enable or disable screen clearing
    pub fn with_clear(mut self, enabled: bool) -> Self {
        self.clear_enabled = enabled;
        self
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(end_of_input());
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(line)
    }

    /// Read a line in raw mode without echoing it
    fn read_hidden(&mut self) -> io::Result<String> {
        let _raw = RawModeGuard::enable()?;
        let mut input = String::new();

        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Enter => break,
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Err(io::Error::new(io::ErrorKind::Interrupted, "input interrupted"));
                }
                KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Err(end_of_input());
                }
                KeyCode::Char(c) => input.push(c),
                _ => {}
            }
        }

        Ok(input)
    }
}

impl Terminal for ConsoleTerminal {
    fn write(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes())?;
        self.output.flush()
    }

    fn write_line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{}", text)?;
        self.output.flush()
    }

    fn new_line(&mut self) -> io::Result<()> {
        self.write_line("")
    }

    fn clear(&mut self) -> io::Result<()> {
        if !self.interactive || !self.clear_enabled {
            return Ok(());
        }
        self.output.queue(Clear(ClearType::All))?.queue(MoveTo(0, 0))?;
        self.output.flush()
    }

    fn prompt(&mut self, message: &str) -> io::Result<String> {
        self.write(message)?;
        self.read_line()
    }

    fn prompt_obscured(&mut self, message: &str) -> io::Result<String> {
        self.write(message)?;
        if !self.interactive {
            return self.read_line();
        }
        let input = self.read_hidden();
        // raw mode swallowed the user's Enter
        self.write("\r\n")?;
        input
    }
}

/// Leaves raw mode when dropped, including on error paths
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    /// Write sink shared with the test
    #[derive(Clone, Default)]
    struct Sink(Arc<Mutex<Vec<u8>>>);

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Sink {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn prompt_reads_line_without_break() {
        let sink = Sink::default();
        let mut term = ConsoleTerminal::from_io(Cursor::new("Ada\r\nsecret\n"), sink.clone());

        assert_eq!(term.prompt("Name: ").unwrap(), "Ada");
        assert_eq!(term.prompt_obscured("Password: ").unwrap(), "secret");
        assert_eq!(sink.text(), "Name: Password: ");
    }

    #[test]
    fn exhausted_input_is_eof() {
        let mut term = ConsoleTerminal::from_io(Cursor::new(""), Sink::default());
        let err = term.prompt("> ").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn clear_is_skipped_when_not_interactive() {
        let sink = Sink::default();
        let mut term = ConsoleTerminal::from_io(Cursor::new(""), sink.clone());
        term.clear().unwrap();
        term.write_line("title").unwrap();
        term.new_line().unwrap();
        assert_eq!(sink.text(), "title\n\n");
    }
}
