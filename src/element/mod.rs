//! Render-ready form elements
//!
//! - [`TextElement`] - prints a line
//! - [`InputElement`] - prompts, then hands the input to its handler
//! - [`ElementGenerator`] - turns a parsed [`ElementSpec`](crate::template::ElementSpec)
//!   into a fresh element against the current context

mod generator;

pub use generator::ElementGenerator;

use tracing::debug;

use crate::action::FormAction;
use crate::context::Context;
use crate::error::{FormError, Result};
use crate::handler::Handler;
use crate::terminal::Terminal;

/// One renderable piece of a form
///
/// The engine always calls [`Element::render`] first. Elements that report
/// [`Element::is_actionable`] are then asked for an action with
/// [`Element::act`], possibly several times when the answer is `Reprompt`.
pub trait Element {
    fn render(&mut self, context: &Context, terminal: &mut dyn Terminal) -> Result<()>;

    fn is_actionable(&self) -> bool {
        false
    }

    fn act(&mut self, _context: &Context, _terminal: &mut dyn Terminal) -> Result<FormAction> {
        Ok(FormAction::Noop)
    }
}

/// Static line of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextElement {
    text: String,
}

impl TextElement {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Element for TextElement {
    fn render(&mut self, _context: &Context, terminal: &mut dyn Terminal) -> Result<()> {
        terminal.write_line(&self.text)?;
        Ok(())
    }
}

/// Prompt bound to an optional handler
#[derive(Debug, Clone)]
pub struct InputElement {
    prompt: String,
    obscured: bool,
    handler_name: Option<String>,
    handler: Option<Handler>,
}

impl InputElement {
    pub fn new(prompt: impl Into<String>, obscured: bool) -> Self {
        Self {
            prompt: prompt.into(),
            obscured,
            handler_name: None,
            handler: None,
        }
    }

    /// Attach a resolved handler
    pub fn with_handler(mut self, name: impl Into<String>, handler: Handler) -> Self {
        self.handler_name = Some(name.into());
        self.handler = Some(handler);
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn is_obscured(&self) -> bool {
        self.obscured
    }

    pub fn handler_name(&self) -> Option<&str> {
        self.handler_name.as_deref()
    }
}

impl Element for InputElement {
    /// Nothing to show until asked for input
    fn render(&mut self, _context: &Context, _terminal: &mut dyn Terminal) -> Result<()> {
        Ok(())
    }

    fn is_actionable(&self) -> bool {
        true
    }

    fn act(&mut self, context: &Context, terminal: &mut dyn Terminal) -> Result<FormAction> {
        let input = if self.obscured {
            terminal.prompt_obscured(&self.prompt)?
        } else {
            terminal.prompt(&self.prompt)?
        };

        let (Some(name), Some(handler)) = (&self.handler_name, &self.handler) else {
            return Ok(FormAction::Noop);
        };

        let action = handler
            .invoke(&input, context, terminal)
            .map_err(|source| FormError::HandlerFailed {
                handler: name.clone(),
                source,
            })?;
        debug!(handler = %name, ?action, "handler returned");
        Ok(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::IntoHandler;
    use crate::terminal::{MockTerminal, TerminalOp};

    #[test]
    fn text_element_writes_line() {
        let mut term = MockTerminal::new();
        let mut el = TextElement::new("Hello");
        el.render(&Context::new(), &mut term).unwrap();
        assert!(!el.is_actionable());
        assert_eq!(term.lines(), vec!["Hello"]);
    }

    #[test]
    fn input_without_handler_is_noop() {
        let mut term = MockTerminal::with_inputs(["whatever"]);
        let mut el = InputElement::new("> ", false);
        assert_eq!(el.act(&Context::new(), &mut term).unwrap(), FormAction::Noop);
        assert_eq!(term.prompts(), vec!["> "]);
    }

    #[test]
    fn input_passes_text_to_handler() {
        let handler = (|input: &str, ctx: &Context| {
            ctx.insert("answer", input);
            FormAction::Exit
        })
        .into_handler();
        let mut el = InputElement::new("Answer: ", false).with_handler("save", handler);
        let mut term = MockTerminal::with_inputs(["42"]);
        let ctx = Context::new();

        assert_eq!(el.act(&ctx, &mut term).unwrap(), FormAction::Exit);
        assert_eq!(ctx.get_str("answer").as_deref(), Some("42"));
    }

    #[test]
    fn obscured_input_uses_obscured_prompt() {
        let mut el = InputElement::new("Password: ", true);
        let mut term = MockTerminal::with_inputs(["hunter2"]);
        el.act(&Context::new(), &mut term).unwrap();
        assert_eq!(term.ops(), vec![TerminalOp::PromptObscured("Password: ".into())]);
    }

    #[test]
    fn handler_failure_names_handler() {
        let handler = (|_: &str| -> anyhow::Result<FormAction> { anyhow::bail!("nope") }).into_handler();
        let mut el = InputElement::new("> ", false).with_handler("check", handler);
        let mut term = MockTerminal::with_inputs(["x"]);
        let err = el.act(&Context::new(), &mut term).unwrap_err();
        assert!(matches!(err, FormError::HandlerFailed { ref handler, .. } if handler == "check"));
    }
}
