//! Terminal capability
//!
//! Everything the engine and handlers do to the screen goes through
//! [`Terminal`]:
//!
//! - [`ConsoleTerminal`] - stdin/stdout, crossterm for clearing and hidden input
//! - [`MockTerminal`] - scripted input, records every operation (tests)

mod console;
mod mock;

pub use console::ConsoleTerminal;
pub use mock::{MockTerminal, TerminalOp};

use std::io;

/// Display surface plus line input
pub trait Terminal {
    /// Write text without a line break
    fn write(&mut self, text: &str) -> io::Result<()>;

    /// Write text followed by a line break
    fn write_line(&mut self, text: &str) -> io::Result<()>;

    fn new_line(&mut self) -> io::Result<()>;

    /// Clear the display surface
    fn clear(&mut self) -> io::Result<()>;

    /// Show `message` and read one line of input (without the line break)
    ///
    /// Returns `UnexpectedEof` once input is exhausted.
    fn prompt(&mut self, message: &str) -> io::Result<String>;

    /// Like [`Terminal::prompt`] but the typed input is not echoed where possible
    fn prompt_obscured(&mut self, message: &str) -> io::Result<String>;
}

pub(crate) fn end_of_input() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "input closed while waiting for a prompt")
}
