//! Wizard definition files
//!
//! A wizard YAML file declares forms, their templates, the initial context
//! and declarative handlers:
//!
//! ```yaml
//! title: Setup
//! version: "1.0"
//! start: welcome
//! context:
//!   name: guest
//! handlers:
//!   askName: { store: name, required: true }
//!   confirm:
//!     choices: { y: { flow_to: done }, n: exit }
//! forms:
//!   - id: welcome
//!     template: |
//!       Hello $name
//!       Your name: [askName]
//!       Continue? (y/n) [confirm]
//!   - id: done
//!     template: { file: done.tpl }
//! ```

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::action::FormAction;
use crate::context::Context;
use crate::engine::FormEngineBuilder;
use crate::error::{FormError, Result};
use crate::form::{Form, TemplateForm};
use crate::handler::HandlerRegistry;
use crate::template::{Template, TemplateSource};
use crate::terminal::Terminal;

/// Form ids: start with a letter, then alphanumerics, `_` or `-`
static FORM_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").unwrap());

// ============================================================================
// FILE MODEL
// ============================================================================

/// Parsed wizard file
#[derive(Debug, Clone, Deserialize)]
pub struct WizardFile {
    #[serde(default, deserialize_with = "scalar_string")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub version: Option<String>,

    /// Initial form id
    pub start: String,

    #[serde(default)]
    pub context: BTreeMap<String, serde_json::Value>,

    #[serde(default)]
    pub handlers: BTreeMap<String, HandlerDef>,

    pub forms: Vec<FormDef>,

    /// Directory relative template files are resolved against
    #[serde(skip)]
    base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormDef {
    pub id: String,
    pub template: TemplateDef,
}

/// Template as written in the file: a block string, a list, or a path
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TemplateDef {
    Text(String),
    Lines { lines: Vec<String> },
    File { file: PathBuf },
}

impl TemplateDef {
    pub fn to_source(&self, base_dir: &Path) -> TemplateSource {
        match self {
            TemplateDef::Text(text) => TemplateSource::text(text.as_str()),
            TemplateDef::Lines { lines } => TemplateSource::Lines(lines.clone()),
            TemplateDef::File { file } => TemplateSource::file(file.as_path()).relative_to(base_dir),
        }
    }
}

/// Action as written in the file: `noop`, `reprompt`, `exit` or `{ flow_to: id }`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ActionDef {
    Keyword(ActionKeyword),
    FlowTo { flow_to: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKeyword {
    Noop,
    Reprompt,
    Exit,
}

impl ActionDef {
    fn flow_target(&self) -> Option<&str> {
        match self {
            ActionDef::FlowTo { flow_to } => Some(flow_to.as_str()),
            ActionDef::Keyword(_) => None,
        }
    }
}

impl From<&ActionDef> for FormAction {
    fn from(def: &ActionDef) -> Self {
        match def {
            ActionDef::Keyword(ActionKeyword::Noop) => FormAction::Noop,
            ActionDef::Keyword(ActionKeyword::Reprompt) => FormAction::Reprompt,
            ActionDef::Keyword(ActionKeyword::Exit) => FormAction::Exit,
            ActionDef::FlowTo { flow_to } => FormAction::flow_to(flow_to.as_str()),
        }
    }
}

/// Declarative handler
///
/// Variant order matters: `choices` maps may also carry `store`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HandlerDef {
    /// Match the input against fixed answers
    Choices {
        choices: BTreeMap<String, ActionDef>,
        #[serde(default)]
        store: Option<String>,
        #[serde(default)]
        otherwise: Option<ActionDef>,
    },
    /// Save the input into the context
    Store {
        store: String,
        #[serde(default)]
        required: bool,
        #[serde(default)]
        then: Option<ActionDef>,
    },
    /// Ignore the input and return a fixed action
    Action { action: ActionDef },
}

impl HandlerDef {
    /// Every `flow_to` target this handler can produce
    pub fn flow_targets(&self) -> Vec<&str> {
        match self {
            HandlerDef::Choices { choices, otherwise, .. } => choices
                .values()
                .chain(otherwise.iter())
                .filter_map(ActionDef::flow_target)
                .collect(),
            HandlerDef::Store { then, .. } => then.iter().filter_map(ActionDef::flow_target).collect(),
            HandlerDef::Action { action } => action.flow_target().into_iter().collect(),
        }
    }

    /// Register this definition under `name`
    pub fn register(&self, name: &str, registry: &mut HandlerRegistry) {
        match self.clone() {
            HandlerDef::Choices {
                choices,
                store,
                otherwise,
            } => {
                let accepted = choices.keys().cloned().collect::<Vec<_>>().join(", ");
                let choices: Vec<(String, FormAction)> = choices
                    .iter()
                    .map(|(answer, def)| (answer.trim().to_lowercase(), def.into()))
                    .collect();
                let otherwise: Option<FormAction> = otherwise.as_ref().map(Into::into);

                registry.register(
                    name,
                    move |input: &str, ctx: &Context, term: &mut dyn Terminal| -> io::Result<FormAction> {
                        let answer = input.trim().to_lowercase();
                        if let Some((matched, action)) = choices.iter().find(|(key, _)| *key == answer) {
                            if let Some(key) = &store {
                                ctx.insert(key.as_str(), matched.as_str());
                            }
                            return Ok(action.clone());
                        }
                        match &otherwise {
                            Some(action) => Ok(action.clone()),
                            None => {
                                term.write_line(&format!("Please choose one of: {}", accepted))?;
                                Ok(FormAction::Reprompt)
                            }
                        }
                    },
                );
            }
            HandlerDef::Store {
                store,
                required,
                then,
            } => {
                let then: FormAction = then.as_ref().map(Into::into).unwrap_or_default();
                registry.register(
                    name,
                    move |input: &str, ctx: &Context, term: &mut dyn Terminal| -> io::Result<FormAction> {
                        if required && input.trim().is_empty() {
                            term.write_line("A value is required.")?;
                            return Ok(FormAction::Reprompt);
                        }
                        ctx.insert(store.as_str(), input);
                        Ok(then.clone())
                    },
                );
            }
            HandlerDef::Action { action } => {
                let action: FormAction = (&action).into();
                registry.register(name, move || action.clone());
            }
        }
    }
}

/// Accept a YAML string, number or bool as text
fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_yaml::Value::Null) => None,
        Some(serde_yaml::Value::String(s)) => Some(s),
        Some(serde_yaml::Value::Number(n)) => Some(n.to_string()),
        Some(serde_yaml::Value::Bool(b)) => Some(b.to_string()),
        Some(_) => {
            return Err(serde::de::Error::custom(
                "expected a string, number or bool",
            ))
        }
    })
}

// ============================================================================
// LOADING
// ============================================================================

/// Outcome of [`WizardFile::validate`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub forms: usize,
    pub handlers: usize,
    pub warnings: Vec<String>,
}

impl WizardFile {
    /// Parse a wizard from YAML; relative template files resolve against `base_dir`
    pub fn from_yaml(yaml: &str, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let mut file: WizardFile = serde_yaml::from_str(yaml)?;
        file.base_dir = base_dir.into();
        Ok(file)
    }

    /// Read and parse a wizard file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path).map_err(|e| FormError::InvalidConfig {
            reason: format!("cannot read '{}': {}", path.display(), e),
        })?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        debug!(path = %path.display(), "loaded wizard file");
        Self::from_yaml(&yaml, base_dir)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Registry holding every declared handler
    pub fn registry(&self) -> HandlerRegistry {
        let mut registry = HandlerRegistry::new();
        for (name, def) in &self.handlers {
            def.register(name, &mut registry);
        }
        registry
    }

    /// Load and parse every form's template
    pub fn templates(&self) -> Result<Vec<Template>> {
        self.forms
            .iter()
            .map(|form| Template::load(form.id.as_str(), &form.template.to_source(&self.base_dir)))
            .collect()
    }

    /// Build bound forms against `registry`
    pub fn build_forms(&self, registry: &HandlerRegistry) -> Result<Vec<Box<dyn Form>>> {
        self.templates()?
            .iter()
            .map(|template| {
                TemplateForm::from_template(template, registry).map(|f| Box::new(f) as Box<dyn Form>)
            })
            .collect()
    }

    /// Engine builder with title, context and forms from this file
    ///
    /// Callers add the terminal and any overrides.
    pub fn engine_builder(&self) -> Result<FormEngineBuilder> {
        let registry = self.registry();
        let mut builder = FormEngineBuilder::new()
            .forms(self.build_forms(&registry)?)
            .context_values(self.context.clone());
        if let Some(title) = &self.title {
            builder = builder.application_name(title.as_str());
        }
        if let Some(version) = &self.version {
            builder = builder.application_version(version.as_str());
        }
        Ok(builder)
    }

    /// Check ids, flow targets and templates
    ///
    /// Undeclared handler references are warnings: they run as `Noop`.
    pub fn validate(&self) -> Result<ValidationReport> {
        let mut errors: Vec<String> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();

        if self.forms.is_empty() {
            errors.push("no forms declared".to_string());
        }

        let mut ids = HashSet::new();
        for form in &self.forms {
            if !FORM_ID.is_match(&form.id) {
                errors.push(format!(
                    "form id '{}' must start with a letter and contain only letters, digits, '_' or '-'",
                    form.id
                ));
            }
            if !ids.insert(form.id.as_str()) {
                errors.push(format!("form id '{}' is declared more than once", form.id));
            }
        }

        if !ids.contains(self.start.as_str()) {
            errors.push(format!("start form '{}' is not declared", self.start));
        }

        for (name, def) in &self.handlers {
            for target in def.flow_targets() {
                if !ids.contains(target) {
                    errors.push(format!("handler '{}' flows to unknown form '{}'", name, target));
                }
            }
        }

        let mut referenced = BTreeSet::new();
        for form in &self.forms {
            let specs = Template::load(form.id.as_str(), &form.template.to_source(&self.base_dir))
                .and_then(|t| t.parse());
            match specs {
                Ok(specs) => {
                    for name in specs.iter().filter_map(|s| s.handler_ref()) {
                        if !self.handlers.contains_key(name) {
                            warnings.push(format!(
                                "form '{}' references undeclared handler '{}' (input will be ignored)",
                                form.id, name
                            ));
                        }
                        referenced.insert(name.to_string());
                    }
                }
                Err(e) => errors.push(e.to_string()),
            }
        }

        for name in self.handlers.keys() {
            if !referenced.contains(name) {
                warnings.push(format!("handler '{}' is never referenced", name));
            }
        }

        if !errors.is_empty() {
            return Err(FormError::InvalidConfig {
                reason: errors.join("; "),
            });
        }

        Ok(ValidationReport {
            forms: self.forms.len(),
            handlers: self.handlers.len(),
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::MockTerminal;

    const WIZARD: &str = r#"
title: Setup
version: "1.0"
start: welcome
context:
  name: guest
handlers:
  askName: { store: name, required: true }
  confirm:
    choices:
      y: { flow_to: done }
      n: exit
  quit: { action: exit }
forms:
  - id: welcome
    template: |
      Hello $name
      Your name: [askName]
      Continue, ${name}? [confirm]
  - id: done
    template:
      lines: ["Bye $name", "[quit]"]
"#;

    fn wizard() -> WizardFile {
        WizardFile::from_yaml(WIZARD, ".").unwrap()
    }

    #[test]
    fn parses_file() {
        let file = wizard();
        assert_eq!(file.title.as_deref(), Some("Setup"));
        assert_eq!(file.version.as_deref(), Some("1.0"));
        assert_eq!(file.forms.len(), 2);
        assert!(matches!(file.handlers["askName"], HandlerDef::Store { required: true, .. }));
        assert!(matches!(file.handlers["confirm"], HandlerDef::Choices { .. }));
        assert!(matches!(file.handlers["quit"], HandlerDef::Action { .. }));
    }

    #[test]
    fn valid_file_has_no_warnings() {
        let report = wizard().validate().unwrap();
        assert_eq!(report.forms, 2);
        assert_eq!(report.handlers, 3);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[test]
    fn runs_end_to_end() {
        let term = MockTerminal::with_inputs(["", "Ada", "maybe", "Y", ""]);
        let mut engine = wizard()
            .engine_builder()
            .unwrap()
            .terminal(term.clone())
            .build()
            .unwrap();
        engine.start("welcome").unwrap();

        assert_eq!(engine.context().get_str("name").as_deref(), Some("Ada"));
        let lines = term.lines();
        assert!(lines.contains(&"Setup - 1.0".to_string()));
        assert!(lines.contains(&"Hello guest".to_string()));
        assert!(lines.contains(&"A value is required.".to_string()));
        assert!(lines.contains(&"Please choose one of: n, y".to_string()));
        assert!(lines.contains(&"Bye Ada".to_string()));
        assert_eq!(term.remaining_inputs(), 0);
    }

    #[test]
    fn choices_can_store_and_fall_back() {
        let yaml = r#"
start: a
handlers:
  pick:
    choices: { red: noop, blue: noop }
    store: colour
    otherwise: exit
forms:
  - id: a
    template: "Colour? [pick]"
"#;
        let file = WizardFile::from_yaml(yaml, ".").unwrap();
        let registry = file.registry();
        let ctx = Context::new();
        let mut term = MockTerminal::new();

        let action = registry.invoke("pick", " Blue ", &ctx, &mut term).unwrap();
        assert_eq!(action, FormAction::Noop);
        assert_eq!(ctx.get_str("colour").as_deref(), Some("blue"));

        let action = registry.invoke("pick", "green", &ctx, &mut term).unwrap();
        assert_eq!(action, FormAction::Exit);
    }

    #[test]
    fn store_then_action() {
        let yaml = r#"
start: a
handlers:
  save: { store: answer, then: { flow_to: b } }
forms:
  - id: a
    template: "[save]"
  - id: b
    template: "done"
"#;
        let file = WizardFile::from_yaml(yaml, ".").unwrap();
        let ctx = Context::new();
        let mut term = MockTerminal::new();
        let action = file.registry().invoke("save", "", &ctx, &mut term).unwrap();
        assert_eq!(action, FormAction::flow_to("b"));
        assert_eq!(ctx.get_str("answer").as_deref(), Some(""));
    }

    #[test]
    fn unknown_flow_target_is_an_error() {
        let yaml = r#"
start: a
handlers:
  go: { action: { flow_to: nowhere } }
forms:
  - id: a
    template: "[go]"
"#;
        let err = WizardFile::from_yaml(yaml, ".").unwrap().validate().unwrap_err();
        assert!(err.to_string().contains("unknown form 'nowhere'"));
    }

    #[test]
    fn bad_ids_and_missing_start() {
        let yaml = r#"
start: missing
forms:
  - id: 1st
    template: "x"
  - id: 1st
    template: "y"
"#;
        let err = WizardFile::from_yaml(yaml, ".").unwrap().validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("must start with a letter"));
        assert!(msg.contains("more than once"));
        assert!(msg.contains("start form 'missing'"));
    }

    #[test]
    fn template_syntax_errors_are_reported() {
        let yaml = r#"
start: a
forms:
  - id: a
    template: "Hello ${name"
"#;
        let err = WizardFile::from_yaml(yaml, ".").unwrap().validate().unwrap_err();
        assert!(err.to_string().contains("Incomplete variable block"));
    }

    #[test]
    fn undeclared_handlers_are_warnings() {
        let yaml = r#"
start: a
handlers:
  unused: { action: exit }
forms:
  - id: a
    template: "Name: [ghost]"
"#;
        let report = WizardFile::from_yaml(yaml, ".").unwrap().validate().unwrap();
        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings[0].contains("'ghost'"));
        assert!(report.warnings[1].contains("'unused'"));
    }

    #[test]
    fn file_templates_resolve_against_wizard_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.tpl"), "From file $who\n").unwrap();
        fs::write(
            dir.path().join("wizard.yaml"),
            "start: a\ncontext: { who: disk }\nforms:\n  - id: a\n    template: { file: a.tpl }\n",
        )
        .unwrap();

        let file = WizardFile::load(dir.path().join("wizard.yaml")).unwrap();
        let term = MockTerminal::new();
        let mut engine = file.engine_builder().unwrap().terminal(term.clone()).build().unwrap();
        engine.start(&file.start).unwrap();
        assert_eq!(term.lines(), vec!["From file disk"]);
    }
}
