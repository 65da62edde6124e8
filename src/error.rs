//! Error types with fix suggestions
//!
//! Error code ranges:
//! - FORM-001-009: Template syntax/loading errors
//! - FORM-010-019: Form/engine errors
//! - FORM-020-029: Handler errors
//! - FORM-030-039: Wizard configuration errors
//! - FORM-090-099: IO and output errors

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FormError>;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug)]
pub enum FormError {
    // ─────────────────────────────────────────────────────────────
    // Template errors (FORM-001 to FORM-009)
    // ─────────────────────────────────────────────────────────────
    #[error("[FORM-001] Template syntax error on line {line} in template for '{source_id}': {reason}")]
    TemplateSyntax {
        source_id: String,
        line: usize,
        reason: String,
    },

    #[error("[FORM-002] Failed to read template '{}': {source}", .path.display())]
    TemplateLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // Engine errors (FORM-010 to FORM-019)
    // ─────────────────────────────────────────────────────────────
    #[error("[FORM-010] No form of ID [{form_id}] exists")]
    FormNotFound { form_id: String },

    #[error("[FORM-011] Form ID [{form_id}] is registered more than once")]
    DuplicateForm { form_id: String },

    // ─────────────────────────────────────────────────────────────
    // Handler errors (FORM-020 to FORM-029)
    // ─────────────────────────────────────────────────────────────
    #[error("[FORM-020] Failed to invoke handler '{handler}': {source}")]
    HandlerFailed {
        handler: String,
        #[source]
        source: anyhow::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // Wizard configuration errors (FORM-030 to FORM-039)
    // ─────────────────────────────────────────────────────────────
    #[error("[FORM-030] Invalid wizard configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("[FORM-031] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // ─────────────────────────────────────────────────────────────
    // IO errors (FORM-090 to FORM-099)
    // ─────────────────────────────────────────────────────────────
    #[error("[FORM-090] Terminal IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("[FORM-091] JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FormError {
    /// Build a syntax error for a template line
    pub(crate) fn syntax(source_id: &str, line: usize, reason: impl Into<String>) -> Self {
        FormError::TemplateSyntax {
            source_id: source_id.to_string(),
            line,
            reason: reason.into(),
        }
    }

    /// True when the error came from the input stream closing mid-prompt
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, FormError::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
    }
}

impl FixSuggestion for FormError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            FormError::TemplateSyntax { .. } => {
                Some("Close every ${...} and [...] on the same line; only whitespace may follow ]")
            }
            FormError::TemplateLoad { .. } => Some("Check the template path (relative to the wizard file)"),
            FormError::FormNotFound { .. } => Some("Register the form or fix the flow_to target"),
            FormError::DuplicateForm { .. } => Some("Give every form a unique id"),
            FormError::HandlerFailed { .. } => Some("Check the handler logic; handler errors abort the run"),
            FormError::InvalidConfig { .. } => Some("Run `cliform check <file>` for details"),
            FormError::YamlParse(_) => Some("Check YAML syntax: indentation and quoting"),
            FormError::Io(_) => Some("Check that stdin/stdout are available"),
            FormError::Json(_) => Some("Use `--format text` to print the parse result without JSON"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_names_line_and_source() {
        let err = FormError::syntax("greeting", 3, "Incomplete variable block");
        let msg = err.to_string();
        assert!(msg.contains("FORM-001"));
        assert!(msg.contains("line 3"));
        assert!(msg.contains("'greeting'"));
        assert!(msg.contains("Incomplete variable block"));
    }

    #[test]
    fn handler_failure_keeps_source() {
        let err = FormError::HandlerFailed {
            handler: "readName".into(),
            source: anyhow::anyhow!("boom"),
        };
        assert!(err.to_string().contains("readName"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn end_of_input_detection() {
        let eof = FormError::Io(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "closed"));
        assert!(eof.is_end_of_input());
        assert!(!FormError::FormNotFound { form_id: "x".into() }.is_end_of_input());
    }

    #[test]
    fn json_errors_are_not_reported_as_io() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: FormError = json_err.into();
        assert!(matches!(err, FormError::Json(_)));
        assert!(err.to_string().starts_with("[FORM-091] JSON serialization error"));
        assert!(!err.is_end_of_input());
        assert!(err.fix_suggestion().is_some());
    }

    #[test]
    fn every_variant_has_a_suggestion() {
        let err = FormError::DuplicateForm { form_id: "a".into() };
        assert!(err.fix_suggestion().is_some());
    }
}
