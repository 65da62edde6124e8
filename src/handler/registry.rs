//! Handler registry

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use super::{Handler, IntoHandler};
use crate::action::FormAction;
use crate::context::Context;
use crate::terminal::Terminal;

/// Failure of [`HandlerRegistry::invoke`]
///
/// Only produced by direct calls; bound elements report handler failures as
/// [`FormError::HandlerFailed`](crate::error::FormError::HandlerFailed).
#[derive(Error, Debug)]
pub enum InvokeError {
    #[error("no handler named '{0}'")]
    NotFound(String),

    #[error("handler '{handler}' failed: {source}")]
    Failed {
        handler: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Name → handler table
#[derive(Clone, Default, Debug)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Handler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `name`, replacing any previous one
    pub fn register<S, H>(&mut self, name: impl Into<String>, handler: H) -> &mut Self
    where
        H: IntoHandler<S>,
    {
        let name = name.into();
        let handler = handler.into_handler();
        debug!(handler = %name, arity = ?handler.arity(), "registered handler");
        self.handlers.insert(name, handler);
        self
    }

    /// Builder-style [`HandlerRegistry::register`]
    pub fn with<S, H>(mut self, name: impl Into<String>, handler: H) -> Self
    where
        H: IntoHandler<S>,
    {
        self.register(name, handler);
        self
    }

    /// Register an already-built handler
    pub fn insert(&mut self, name: impl Into<String>, handler: Handler) {
        self.handlers.insert(name.into(), handler);
    }

    /// Look a handler up once, at bind time
    pub fn resolve(&self, name: &str) -> Option<Handler> {
        self.handlers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Resolve `name` and call it in one step
    ///
    /// Convenience for calling a handler outside a form, e.g. to exercise
    /// wizard handlers directly. Forms never go through here: elements hold
    /// the [`Handler`] resolved when their template was bound, so a missing
    /// name is reported (and degraded to `Noop`) at bind time rather than as
    /// [`InvokeError::NotFound`].
    pub fn invoke(
        &self,
        name: &str,
        input: &str,
        context: &Context,
        terminal: &mut dyn Terminal,
    ) -> Result<FormAction, InvokeError> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| InvokeError::NotFound(name.to_string()))?;
        handler
            .invoke(input, context, terminal)
            .map_err(|source| InvokeError::Failed {
                handler: name.to_string(),
                source,
            })
    }
}
