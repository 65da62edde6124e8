//! Forms
//!
//! A [`Form`] is one screen of a wizard: lifecycle hooks around a list of
//! elements created fresh every time the form runs. [`TemplateForm`] builds
//! its elements from a parsed template bound to a [`HandlerRegistry`].

use std::fmt;

use crate::context::Context;
use crate::element::{Element, ElementGenerator};
use crate::error::Result;
use crate::handler::HandlerRegistry;
use crate::template::{Template, TemplateSource};

/// One screen of a wizard
pub trait Form {
    /// Unique id, the target of `FlowTo`
    fn id(&self) -> &str;

    /// Runs before the elements are created
    fn on_init(&self, _context: &Context) {}

    /// Runs once the form is left, whether it completed or was disrupted
    fn on_destroy(&self, _context: &Context) {}

    /// Elements for this run, in render order
    fn create_elements(&self, context: &Context) -> Vec<Box<dyn Element>>;
}

type Hook = Box<dyn Fn(&Context) + Send + Sync>;

/// Form backed by a template
pub struct TemplateForm {
    id: String,
    generators: Vec<ElementGenerator>,
    on_init: Option<Hook>,
    on_destroy: Option<Hook>,
}

impl TemplateForm {
    /// Parse `template` and bind its handler references to `registry`
    pub fn from_template(template: &Template, registry: &HandlerRegistry) -> Result<Self> {
        let specs = template.parse()?;
        Ok(Self {
            id: template.source_id().to_string(),
            generators: ElementGenerator::bind_all(template.source_id(), specs, registry),
            on_init: None,
            on_destroy: None,
        })
    }

    /// Load, parse and bind in one step
    pub fn load(id: impl Into<String>, source: &TemplateSource, registry: &HandlerRegistry) -> Result<Self> {
        Self::from_template(&Template::load(id, source)?, registry)
    }

    /// Form from literal lines
    pub fn from_lines<I, S>(id: impl Into<String>, lines: I, registry: &HandlerRegistry) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::load(id, &TemplateSource::lines(lines), registry)
    }

    pub fn with_on_init(mut self, hook: impl Fn(&Context) + Send + Sync + 'static) -> Self {
        self.on_init = Some(Box::new(hook));
        self
    }

    pub fn with_on_destroy(mut self, hook: impl Fn(&Context) + Send + Sync + 'static) -> Self {
        self.on_destroy = Some(Box::new(hook));
        self
    }

    pub fn generators(&self) -> &[ElementGenerator] {
        &self.generators
    }
}

impl Form for TemplateForm {
    fn id(&self) -> &str {
        &self.id
    }

    fn on_init(&self, context: &Context) {
        if let Some(hook) = &self.on_init {
            hook(context);
        }
    }

    fn on_destroy(&self, context: &Context) {
        if let Some(hook) = &self.on_destroy {
            hook(context);
        }
    }

    fn create_elements(&self, context: &Context) -> Vec<Box<dyn Element>> {
        self.generators.iter().map(|g| g.generate(context)).collect()
    }
}

impl fmt::Debug for TemplateForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateForm")
            .field("id", &self.id)
            .field("elements", &self.generators.len())
            .finish()
    }
}
