//! # Form Engine
//!
//! Drives a wizard: runs one form at a time and follows `FlowTo` actions until
//! a form exits or completes without one.
//!
//! ## Per-form state machine
//!
//! ```text
//!             Noop (next element)
//!            ┌────────┐
//!            ▼        │
//!  ──▶ Rendering ─────┘──Reprompt──▶ Reprompting ◀─┐ Reprompt
//!        │   ▲                         │  │        │
//!        │   └──────Noop───────────────┘  └────────┘
//!        │                                 │
//!   Exit/FlowTo                       Exit/FlowTo
//!        ▼                                 ▼
//!    Unwinding ──on_destroy──▶ Done (action)
//!
//!  elements exhausted ──on_destroy──▶ Done (no action)
//! ```
//!
//! The context lives on the engine and is shared by every form of a run; it is
//! never reset between forms.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;
use tracing::{debug, info};

use crate::action::FormAction;
use crate::context::Context;
use crate::element::Element;
use crate::error::{FormError, Result};
use crate::form::Form;
use crate::terminal::{ConsoleTerminal, Terminal};

pub struct FormEngine {
    title: String,
    forms: HashMap<String, Box<dyn Form>>,
    context: Context,
    terminal: Box<dyn Terminal>,
    clear_screen: bool,
}

impl FormEngine {
    pub fn builder() -> FormEngineBuilder {
        FormEngineBuilder::new()
    }

    /// The run context
    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn has_form(&self, form_id: &str) -> bool {
        self.forms.contains_key(form_id)
    }

    /// Run from `initial_form_id` until no form asks to flow elsewhere
    ///
    /// A blank `FlowTo` target ends the run like `Exit`.
    pub fn start(&mut self, initial_form_id: &str) -> Result<()> {
        info!(form = %initial_form_id, "starting wizard");
        let mut next = Some(initial_form_id.to_string());
        let mut forms_run = 0usize;

        while let Some(form_id) = next.take().filter(|id| !id.trim().is_empty()) {
            forms_run += 1;
            next = match self.run(&form_id)? {
                Some(FormAction::FlowTo(target)) => {
                    debug!(from = %form_id, to = %target, "flowing to next form");
                    Some(target)
                }
                Some(action) => {
                    debug!(form = %form_id, ?action, "run ended by form");
                    None
                }
                None => None,
            };
        }

        info!(forms_run, "wizard finished");
        Ok(())
    }

    /// Run a single form
    ///
    /// Returns the disruptive action (`Exit` or `FlowTo`) that ended it, or
    /// `None` when every element was rendered.
    pub fn run(&mut self, form_id: &str) -> Result<Option<FormAction>> {
        let form = self
            .forms
            .get(form_id)
            .ok_or_else(|| FormError::FormNotFound {
                form_id: form_id.to_string(),
            })?;

        if self.clear_screen {
            self.terminal.clear()?;
        }
        if !self.title.is_empty() {
            self.terminal.write_line(&self.title)?;
            self.terminal.new_line()?;
        }

        debug!(form = %form_id, "init");
        form.on_init(&self.context);
        let mut elements = form.create_elements(&self.context);
        let outcome = render_elements(&mut elements, &self.context, self.terminal.as_mut())?;
        debug!(form = %form_id, ?outcome, "destroy");
        form.on_destroy(&self.context);

        Ok(outcome)
    }
}

/// Render elements in order until one produces a disruptive action
fn render_elements(
    elements: &mut [Box<dyn Element>],
    context: &Context,
    terminal: &mut dyn Terminal,
) -> Result<Option<FormAction>> {
    for (index, element) in elements.iter_mut().enumerate() {
        element.render(context, terminal)?;
        if !element.is_actionable() {
            continue;
        }

        let mut action = element.act(context, terminal)?;
        let mut attempts = 1usize;
        while action.is_reprompt() {
            attempts += 1;
            debug!(element = index, attempts, "reprompting");
            action = element.act(context, terminal)?;
        }

        if action.is_disruptive() {
            debug!(element = index, ?action, "unwinding form");
            return Ok(Some(action));
        }
    }
    Ok(None)
}

impl fmt::Debug for FormEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&String> = self.forms.keys().collect();
        ids.sort();
        f.debug_struct("FormEngine")
            .field("title", &self.title)
            .field("forms", &ids)
            .field("context", &self.context)
            .finish()
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Fluent builder for [`FormEngine`]
pub struct FormEngineBuilder {
    application_name: Option<String>,
    application_version: Option<String>,
    forms: Vec<Box<dyn Form>>,
    context: Vec<(String, Value)>,
    terminal: Option<Box<dyn Terminal>>,
    clear_screen: bool,
}

impl Default for FormEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FormEngineBuilder {
    pub fn new() -> Self {
        Self {
            application_name: None,
            application_version: None,
            forms: Vec::new(),
            context: Vec::new(),
            terminal: None,
            clear_screen: true,
        }
    }

    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    pub fn application_version(mut self, version: impl Into<String>) -> Self {
        self.application_version = Some(version.into());
        self
    }

    /// Add a form
    pub fn form(mut self, form: impl Form + 'static) -> Self {
        self.forms.push(Box::new(form));
        self
    }

    /// Add already-boxed forms
    pub fn forms(mut self, forms: impl IntoIterator<Item = Box<dyn Form>>) -> Self {
        self.forms.extend(forms);
        self
    }

    /// Seed one context value
    pub fn context_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.push((key.into(), value.into()));
        self
    }

    /// Seed many context values
    pub fn context_values<K, V>(mut self, values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.context
            .extend(values.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Terminal to render into (defaults to stdin/stdout)
    pub fn terminal(mut self, terminal: impl Terminal + 'static) -> Self {
        self.terminal = Some(Box::new(terminal));
        self
    }

    /// Whether each form clears the screen first (default: true)
    pub fn clear_screen(mut self, enabled: bool) -> Self {
        self.clear_screen = enabled;
        self
    }

    pub fn build(self) -> Result<FormEngine> {
        let mut forms: HashMap<String, Box<dyn Form>> = HashMap::with_capacity(self.forms.len());
        for form in self.forms {
            let id = form.id().to_string();
            if forms.contains_key(&id) {
                return Err(FormError::DuplicateForm { form_id: id });
            }
            forms.insert(id, form);
        }

        let context: Context = self.context.into_iter().collect();
        let clear_screen = self.clear_screen;
        let terminal = self
            .terminal
            .unwrap_or_else(|| Box::new(ConsoleTerminal::stdio().with_clear(clear_screen)) as Box<dyn Terminal>);

        Ok(FormEngine {
            title: create_title(
                self.application_name.as_deref(),
                self.application_version.as_deref(),
            ),
            forms,
            context,
            terminal,
            clear_screen,
        })
    }
}

/// "name - version", either part alone, or empty
fn create_title(name: Option<&str>, version: Option<&str>) -> String {
    let name = name.map(str::trim).filter(|s| !s.is_empty());
    let version = version.map(str::trim).filter(|s| !s.is_empty());
    match (name, version) {
        (Some(n), Some(v)) => format!("{} - {}", n, v),
        (Some(n), None) => n.to_string(),
        (None, Some(v)) => v.to_string(),
        (None, None) => String::new(),
    }
}
