//! # Input handlers
//!
//! Input lines name a handler: `Name: [readName]`. A [`HandlerRegistry`] maps
//! those names to [`Handler`]s, resolved once when a template is bound.
//!
//! ## Accepted shapes
//!
//! | Closure | Receives |
//! |---------|----------|
//! | `Fn()` | nothing |
//! | `Fn(&str)` | input |
//! | `Fn(&str, &Context)` | input, run context |
//! | `Fn(&str, &Context, &mut dyn Terminal)` | input, context, terminal |
//!
//! A handler may return [`FormAction`], `()` (same as `Noop`), or a `Result`
//! of either whose error converts into `anyhow::Error`. Anything else does not
//! compile, so a wrongly shaped handler can never reach a running wizard.
//!
//! ```rust
//! use cliform::{Context, FormAction, HandlerRegistry};
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register("readName", |input: &str, ctx: &Context| {
//!     ctx.insert("name", input);
//! });
//! registry.register("quit", || FormAction::Exit);
//! assert!(registry.contains("readName"));
//! ```

mod registry;

pub use registry::{HandlerRegistry, InvokeError};

use std::fmt;
use std::sync::Arc;

use crate::action::FormAction;
use crate::context::Context;
use crate::terminal::Terminal;

type HandlerFn = dyn Fn(&str, &Context, &mut dyn Terminal) -> anyhow::Result<FormAction> + Send + Sync;

/// Which parameters a handler was registered with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerArity {
    None,
    Input,
    InputContext,
    InputContextTerminal,
}

/// Callable bound to an input element
#[derive(Clone)]
pub struct Handler {
    arity: HandlerArity,
    call: Arc<HandlerFn>,
}

impl Handler {
    pub fn arity(&self) -> HandlerArity {
        self.arity
    }

    pub fn invoke(
        &self,
        input: &str,
        context: &Context,
        terminal: &mut dyn Terminal,
    ) -> anyhow::Result<FormAction> {
        (self.call)(input, context, terminal)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").field("arity", &self.arity).finish()
    }
}

/// Return values a handler may produce
pub trait IntoFormAction {
    fn into_form_action(self) -> anyhow::Result<FormAction>;
}

impl IntoFormAction for FormAction {
    fn into_form_action(self) -> anyhow::Result<FormAction> {
        Ok(self)
    }
}

impl IntoFormAction for () {
    fn into_form_action(self) -> anyhow::Result<FormAction> {
        Ok(FormAction::Noop)
    }
}

impl<T, E> IntoFormAction for Result<T, E>
where
    T: IntoFormAction,
    E: Into<anyhow::Error>,
{
    fn into_form_action(self) -> anyhow::Result<FormAction> {
        self.map_err(Into::into)?.into_form_action()
    }
}

/// Marker types selecting an [`IntoHandler`] impl
pub mod shape {
    pub struct NoArgs;
    pub struct InputOnly;
    pub struct WithContext;
    pub struct WithTerminal;
}

/// Closures convertible into a [`Handler`]
///
/// `Shape` is inferred; callers never name it.
pub trait IntoHandler<Shape>: Send + Sync + 'static {
    fn into_handler(self) -> Handler;
}

impl<F, R> IntoHandler<(shape::NoArgs, R)> for F
where
    F: Fn() -> R + Send + Sync + 'static,
    R: IntoFormAction,
{
    fn into_handler(self) -> Handler {
        Handler {
            arity: HandlerArity::None,
            call: Arc::new(move |_: &str, _: &Context, _: &mut dyn Terminal| {
                self().into_form_action()
            }),
        }
    }
}

impl<F, R> IntoHandler<(shape::InputOnly, R)> for F
where
    F: Fn(&str) -> R + Send + Sync + 'static,
    R: IntoFormAction,
{
    fn into_handler(self) -> Handler {
        Handler {
            arity: HandlerArity::Input,
            call: Arc::new(move |input: &str, _: &Context, _: &mut dyn Terminal| {
                self(input).into_form_action()
            }),
        }
    }
}

impl<F, R> IntoHandler<(shape::WithContext, R)> for F
where
    F: Fn(&str, &Context) -> R + Send + Sync + 'static,
    R: IntoFormAction,
{
    fn into_handler(self) -> Handler {
        Handler {
            arity: HandlerArity::InputContext,
            call: Arc::new(move |input: &str, ctx: &Context, _: &mut dyn Terminal| {
                self(input, ctx).into_form_action()
            }),
        }
    }
}

impl<F, R> IntoHandler<(shape::WithTerminal, R)> for F
where
    F: Fn(&str, &Context, &mut dyn Terminal) -> R + Send + Sync + 'static,
    R: IntoFormAction,
{
    fn into_handler(self) -> Handler {
        Handler {
            arity: HandlerArity::InputContextTerminal,
            call: Arc::new(move |input: &str, ctx: &Context, term: &mut dyn Terminal| {
                self(input, ctx, term).into_form_action()
            }),
        }
    }
}
