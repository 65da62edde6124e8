//! Form actions
//!
//! Control signals returned by an input element after handling its input.

use serde::{Deserialize, Serialize};

/// What the engine should do after an input element is handled
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormAction {
    /// Carry on with the next element
    #[default]
    Noop,
    /// Ask the same element again
    Reprompt,
    /// Stop the whole run
    Exit,
    /// Leave this form and run the named one
    FlowTo(String),
}

impl FormAction {
    pub fn flow_to(form_id: impl Into<String>) -> Self {
        FormAction::FlowTo(form_id.into())
    }

    /// Exit and FlowTo halt rendering of the current form
    pub fn is_disruptive(&self) -> bool {
        matches!(self, FormAction::Exit | FormAction::FlowTo(_))
    }

    pub fn is_reprompt(&self) -> bool {
        matches!(self, FormAction::Reprompt)
    }

    /// Target form of a FlowTo
    pub fn next_form(&self) -> Option<&str> {
        match self {
            FormAction::FlowTo(id) => Some(id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disruptive_actions() {
        assert!(FormAction::Exit.is_disruptive());
        assert!(FormAction::flow_to("B").is_disruptive());
        assert!(!FormAction::Noop.is_disruptive());
        assert!(!FormAction::Reprompt.is_disruptive());
    }

    #[test]
    fn next_form_only_for_flow() {
        assert_eq!(FormAction::flow_to("B").next_form(), Some("B"));
        assert_eq!(FormAction::Exit.next_form(), None);
    }

    #[test]
    fn default_is_noop() {
        assert_eq!(FormAction::default(), FormAction::Noop);
    }
}
