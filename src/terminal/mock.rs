//! Mock terminal for testing
//!
//! Returns queued inputs and records every operation, so tests can assert on
//! exactly what a form rendered.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{end_of_input, Terminal};

/// One recorded terminal operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalOp {
    Write(String),
    WriteLine(String),
    NewLine,
    Clear,
    Prompt(String),
    PromptObscured(String),
}

#[derive(Debug, Default)]
struct MockState {
    inputs: VecDeque<String>,
    ops: Vec<TerminalOp>,
}

/// Scripted terminal; clones share the same state
#[derive(Debug, Clone, Default)]
pub struct MockTerminal {
    state: Arc<Mutex<MockState>>,
}

impl MockTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a queue of inputs (FIFO)
    pub fn with_inputs<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let terminal = Self::new();
        for input in inputs {
            terminal.push_input(input);
        }
        terminal
    }

    /// Add an input to the queue
    pub fn push_input(&self, input: impl Into<String>) {
        self.state().inputs.push_back(input.into());
    }

    /// Inputs not consumed yet
    pub fn remaining_inputs(&self) -> usize {
        self.state().inputs.len()
    }

    /// Every operation so far, in order
    pub fn ops(&self) -> Vec<TerminalOp> {
        self.state().ops.clone()
    }

    /// Everything written to the screen, prompts included
    pub fn output(&self) -> String {
        let mut out = String::new();
        for op in &self.state().ops {
            match op {
                TerminalOp::Write(text) | TerminalOp::Prompt(text) | TerminalOp::PromptObscured(text) => {
                    out.push_str(text)
                }
                TerminalOp::WriteLine(text) => {
                    out.push_str(text);
                    out.push('\n');
                }
                TerminalOp::NewLine => out.push('\n'),
                TerminalOp::Clear => {}
            }
        }
        out
    }

    /// Lines written with `write_line`
    pub fn lines(&self) -> Vec<String> {
        self.state()
            .ops
            .iter()
            .filter_map(|op| match op {
                TerminalOp::WriteLine(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Prompt messages shown, obscured or not
    pub fn prompts(&self) -> Vec<String> {
        self.state()
            .ops
            .iter()
            .filter_map(|op| match op {
                TerminalOp::Prompt(msg) | TerminalOp::PromptObscured(msg) => Some(msg.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear_count(&self) -> usize {
        self.state()
            .ops
            .iter()
            .filter(|op| matches!(op, TerminalOp::Clear))
            .count()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        // a panicking test must not poison the others' view
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, op: TerminalOp) {
        self.state().ops.push(op);
    }

    fn next_input(&self) -> io::Result<String> {
        self.state().inputs.pop_front().ok_or_else(end_of_input)
    }
}

impl Terminal for MockTerminal {
    fn write(&mut self, text: &str) -> io::Result<()> {
        self.record(TerminalOp::Write(text.to_string()));
        Ok(())
    }

    fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.record(TerminalOp::WriteLine(text.to_string()));
        Ok(())
    }

    fn new_line(&mut self) -> io::Result<()> {
        self.record(TerminalOp::NewLine);
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        self.record(TerminalOp::Clear);
        Ok(())
    }

    fn prompt(&mut self, message: &str) -> io::Result<String> {
        self.record(TerminalOp::Prompt(message.to_string()));
        self.next_input()
    }

    fn prompt_obscured(&mut self, message: &str) -> io::Result<String> {
        self.record(TerminalOp::PromptObscured(message.to_string()));
        self.next_input()
    }
}
