//! cliform - template-driven console forms and wizards
//!
//! A wizard is a set of [`Form`]s. Each form is built from a line-oriented
//! template where `$name` / `${name}` substitute context values and a trailing
//! `[handler]` turns a line into an input prompt:
//!
//! ```text
//! Welcome, ${user}!
//! Password: [!checkPassword]
//! ```
//!
//! The [`FormEngine`] renders forms through a [`Terminal`] and follows the
//! [`FormAction`]s returned by handlers from one form to the next.

pub mod action;
pub mod context;
pub mod element;
pub mod engine;
pub mod error;
pub mod form;
pub mod handler;
pub mod template;
pub mod terminal;
pub mod wizard;

pub use action::FormAction;
pub use context::Context;
pub use element::{Element, ElementGenerator, InputElement, TextElement};
pub use engine::{FormEngine, FormEngineBuilder};
pub use error::{FixSuggestion, FormError, Result};
pub use form::{Form, TemplateForm};
pub use handler::{Handler, HandlerRegistry, IntoHandler, InvokeError};
pub use template::{ElementSpec, Template, TemplateSource};
pub use terminal::{ConsoleTerminal, MockTerminal, Terminal, TerminalOp};
pub use wizard::{ValidationReport, WizardFile};
