//! Element generation
//!
//! A generator is one parsed template line with its handler already resolved.
//! Every form run calls [`ElementGenerator::generate`] again, so substituted
//! text always reflects the context as it is now.

use tracing::warn;

use super::{Element, InputElement, TextElement};
use crate::context::Context;
use crate::handler::{Handler, HandlerRegistry};
use crate::template::format;
use crate::template::ElementSpec;

#[derive(Debug, Clone)]
pub struct ElementGenerator {
    spec: ElementSpec,
    handler: Option<Handler>,
}

impl ElementGenerator {
    /// Bind a spec to `registry`
    ///
    /// A handler reference that is not registered is logged and degrades to
    /// an input whose action is always `Noop`.
    pub fn bind(source_id: &str, spec: ElementSpec, registry: &HandlerRegistry) -> Self {
        let handler = match spec.handler_ref() {
            Some(name) => {
                let handler = registry.resolve(name);
                if handler.is_none() {
                    warn!(form = %source_id, handler = %name, "handler not registered, input will be ignored");
                }
                handler
            }
            None => None,
        };
        Self { spec, handler }
    }

    /// Bind every spec of a template, preserving order
    pub fn bind_all(source_id: &str, specs: Vec<ElementSpec>, registry: &HandlerRegistry) -> Vec<Self> {
        specs
            .into_iter()
            .map(|spec| Self::bind(source_id, spec, registry))
            .collect()
    }

    pub fn spec(&self) -> &ElementSpec {
        &self.spec
    }

    /// True when the spec names a handler that resolved
    pub fn is_bound(&self) -> bool {
        self.handler.is_some()
    }

    /// Substituted text for the current context
    ///
    /// Absent keys render as their own name.
    pub fn render_text(&self, context: &Context) -> String {
        let args: Vec<String> = self
            .spec
            .arg_refs()
            .iter()
            .map(|name| context.resolve_arg(name))
            .collect();
        format::apply(self.spec.format(), &args)
    }

    /// Build a fresh element against `context`
    pub fn generate(&self, context: &Context) -> Box<dyn Element> {
        let text = self.render_text(context);
        match &self.spec {
            ElementSpec::Text(_) => Box::new(TextElement::new(text)),
            ElementSpec::Input(input) => {
                let element = InputElement::new(text, input.obscured);
                match (&input.handler_ref, &self.handler) {
                    (Some(name), Some(handler)) => Box::new(element.with_handler(name, handler.clone())),
                    _ => Box::new(element),
                }
            }
        }
    }
}
