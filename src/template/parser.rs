//! Template line parser
//!
//! Single-pass character state machine turning one raw template line into an
//! [`ElementSpec`]:
//!
//! ```text
//! Literal ──$──▶ VariableInit ──{──▶ VariableBlock ──}──▶ Literal
//!    │               │  └──other──▶ Variable ──ws/EOL──▶ Literal
//!    │               └──$ / ws──▶ Literal (literal "$")
//!    └──[──▶ HandlerRef ──]──▶ PostHandlerRef (whitespace only)
//! ```
//!
//! Syntax:
//! - `$name` (ends at whitespace or end of line) and `${name}` become a `%s`
//!   placeholder plus an entry in `arg_refs`
//! - `$$` is a literal `$`; `$` followed by whitespace or end of line is literal
//! - `%` is always written as `%%`
//! - `[handler]` / `[!handler]` turn the line into an (obscured) input prompt

use serde::Serialize;

use super::format::{ESCAPED_PERCENT, PLACEHOLDER};
use crate::error::{FormError, Result};

/// Display-only line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextSpec {
    pub format: String,
    pub arg_refs: Vec<String>,
}

/// Input prompt line bound to a handler reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputSpec {
    /// Prompt format (everything outside the `[...]` binding)
    pub format: String,
    pub arg_refs: Vec<String>,
    /// `None` for `[]` / `[!]`
    pub handler_ref: Option<String>,
    pub obscured: bool,
}

/// Parsed, context-free description of one template line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ElementSpec {
    Text(TextSpec),
    Input(InputSpec),
}

impl ElementSpec {
    pub fn format(&self) -> &str {
        match self {
            ElementSpec::Text(t) => &t.format,
            ElementSpec::Input(i) => &i.format,
        }
    }

    pub fn arg_refs(&self) -> &[String] {
        match self {
            ElementSpec::Text(t) => &t.arg_refs,
            ElementSpec::Input(i) => &i.arg_refs,
        }
    }

    pub fn is_input(&self) -> bool {
        matches!(self, ElementSpec::Input(_))
    }

    /// Handler reference of an input line, if any
    pub fn handler_ref(&self) -> Option<&str> {
        match self {
            ElementSpec::Input(i) => i.handler_ref.as_deref(),
            ElementSpec::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Any non-special character
    Literal,
    /// Just read `$`
    VariableInit,
    /// Reading a bare name, e.g. the `name` of `$name`
    Variable,
    /// Between `${` and `}`
    VariableBlock,
    /// Between `[` and `]`
    HandlerRef,
    /// After `]`: only whitespace allowed
    PostHandlerRef,
}

/// Per-line parse state
struct LineParser<'a> {
    source_id: &'a str,
    line_number: usize,
    state: ParseState,
    format: String,
    arg_refs: Vec<String>,
    current_arg: String,
    input: bool,
    handler: String,
}

impl<'a> LineParser<'a> {
    fn new(source_id: &'a str, line_number: usize, capacity: usize) -> Self {
        Self {
            source_id,
            line_number,
            state: ParseState::Literal,
            format: String::with_capacity(capacity + 8),
            arg_refs: Vec::new(),
            current_arg: String::new(),
            input: false,
            handler: String::new(),
        }
    }

    fn next_char(&mut self, ch: char) -> Result<()> {
        match self.state {
            ParseState::Literal => self.literal(ch),
            ParseState::VariableInit => self.variable_init(ch),
            ParseState::Variable => self.variable(ch),
            ParseState::VariableBlock => self.variable_block(ch),
            ParseState::HandlerRef => self.handler_ref(ch),
            ParseState::PostHandlerRef => return self.post_handler_ref(ch),
        }
        Ok(())
    }

    fn literal(&mut self, ch: char) {
        match ch {
            '$' => self.state = ParseState::VariableInit,
            '[' => {
                self.state = ParseState::HandlerRef;
                self.input = true;
            }
            '%' => self.format.push_str(ESCAPED_PERCENT),
            _ => self.format.push(ch),
        }
    }

    fn variable_init(&mut self, ch: char) {
        match ch {
            // `$$` is an escaped dollar
            '$' => {
                self.format.push('$');
                self.state = ParseState::Literal;
            }
            c if c.is_whitespace() => {
                self.format.push('$');
                self.format.push(c);
                self.state = ParseState::Literal;
            }
            '{' => {
                self.format.push_str(PLACEHOLDER);
                self.state = ParseState::VariableBlock;
            }
            c => {
                self.format.push_str(PLACEHOLDER);
                self.current_arg.push(c);
                self.state = ParseState::Variable;
            }
        }
    }

    fn variable(&mut self, ch: char) {
        if ch.is_whitespace() {
            self.close_variable();
            self.format.push(ch);
            self.state = ParseState::Literal;
        } else {
            self.current_arg.push(ch);
        }
    }

    fn variable_block(&mut self, ch: char) {
        if ch == '}' {
            self.close_variable();
            self.state = ParseState::Literal;
        } else {
            self.current_arg.push(ch);
        }
    }

    fn handler_ref(&mut self, ch: char) {
        if ch == ']' {
            self.state = ParseState::PostHandlerRef;
        } else {
            self.handler.push(ch);
        }
    }

    fn post_handler_ref(&mut self, ch: char) -> Result<()> {
        if ch.is_whitespace() {
            return Ok(());
        }
        Err(FormError::syntax(
            self.source_id,
            self.line_number,
            format!("Unexpected token '{}' after input binding", ch),
        ))
    }

    fn close_variable(&mut self) {
        self.arg_refs.push(std::mem::take(&mut self.current_arg));
    }

    /// Resolve whatever state the line ended in
    fn finish(mut self) -> Result<ElementSpec> {
        match self.state {
            // trailing lone `$`
            ParseState::VariableInit => self.format.push('$'),
            ParseState::Variable => self.close_variable(),
            ParseState::VariableBlock => {
                return Err(FormError::syntax(
                    self.source_id,
                    self.line_number,
                    "Incomplete variable block",
                ))
            }
            ParseState::HandlerRef => {
                return Err(FormError::syntax(
                    self.source_id,
                    self.line_number,
                    "Incomplete input block",
                ))
            }
            ParseState::Literal | ParseState::PostHandlerRef => {}
        }

        if !self.input {
            return Ok(ElementSpec::Text(TextSpec {
                format: self.format,
                arg_refs: self.arg_refs,
            }));
        }

        let (obscured, name) = match self.handler.strip_prefix('!') {
            Some(rest) => (true, rest.to_string()),
            None => (false, self.handler),
        };

        Ok(ElementSpec::Input(InputSpec {
            format: self.format,
            arg_refs: self.arg_refs,
            handler_ref: (!name.is_empty()).then_some(name),
            obscured,
        }))
    }
}

/// Parse a single template line
///
/// `source_id` and the 1-based `line_number` are only used for diagnostics.
pub fn parse_line(source_id: &str, line_number: usize, line: &str) -> Result<ElementSpec> {
    let mut parser = LineParser::new(source_id, line_number, line.len());
    for ch in line.chars() {
        parser.next_char(ch)?;
    }
    parser.finish()
}

/// Parse every line of a template, preserving order
pub fn parse<I, S>(source_id: &str, lines: I) -> Result<Vec<ElementSpec>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .enumerate()
        .map(|(idx, line)| parse_line(source_id, idx + 1, line.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::format::count_placeholders;

    fn text(line: &str) -> TextSpec {
        match parse_line("test", 1, line).unwrap() {
            ElementSpec::Text(t) => t,
            other => panic!("expected text spec, got {:?}", other),
        }
    }

    fn input(line: &str) -> InputSpec {
        match parse_line("test", 1, line).unwrap() {
            ElementSpec::Input(i) => i,
            other => panic!("expected input spec, got {:?}", other),
        }
    }

    #[test]
    fn plain_literal() {
        let spec = text("Hello world");
        assert_eq!(spec.format, "Hello world");
        assert!(spec.arg_refs.is_empty());
    }

    #[test]
    fn block_variable() {
        let spec = text("My name is ${name}.");
        assert_eq!(spec.format, "My name is %s.");
        assert_eq!(spec.arg_refs, vec!["name"]);
    }

    #[test]
    fn bare_variable_ends_at_whitespace() {
        let spec = text("Hi $first and $last");
        assert_eq!(spec.format, "Hi %s and %s");
        assert_eq!(spec.arg_refs, vec!["first", "last"]);
    }

    #[test]
    fn bare_variable_keeps_punctuation() {
        // Only whitespace ends a bare variable
        let spec = text("Hi $name.");
        assert_eq!(spec.format, "Hi %s");
        assert_eq!(spec.arg_refs, vec!["name."]);
    }

    #[test]
    fn bare_variable_whitespace_is_kept() {
        let spec = text("$a\t$b");
        assert_eq!(spec.format, "%s\t%s");
        assert_eq!(spec.arg_refs, vec!["a", "b"]);
    }

    #[test]
    fn double_dollar_is_literal() {
        let spec = text("Cost: $$5");
        assert_eq!(spec.format, "Cost: $5");
        assert!(spec.arg_refs.is_empty());
    }

    #[test]
    fn double_dollar_everywhere() {
        for line in ["$$", "$$ start", "mid $$ dle", "end $$"] {
            let spec = text(line);
            assert_eq!(spec.format.matches('$').count(), 1, "line: {line}");
            assert!(spec.arg_refs.is_empty(), "line: {line}");
        }
    }

    #[test]
    fn dollar_before_whitespace_is_literal() {
        let spec = text("Pay $ 5");
        assert_eq!(spec.format, "Pay $ 5");
        assert!(spec.arg_refs.is_empty());
    }

    #[test]
    fn trailing_dollar_is_literal() {
        let spec = text("Price in $");
        assert_eq!(spec.format, "Price in $");
        assert!(spec.arg_refs.is_empty());
    }

    #[test]
    fn percent_is_always_doubled() {
        assert_eq!(text("100%").format, "100%%");
        assert_eq!(text("%s %d").format, "%%s %%d");
        assert_eq!(input("50% off? [buy]").format, "50%% off? ");
    }

    #[test]
    fn arg_refs_follow_placeholder_order() {
        let spec = text("${c} $b ${a}");
        assert_eq!(spec.arg_refs, vec!["c", "b", "a"]);
        assert_eq!(count_placeholders(&spec.format), spec.arg_refs.len());
    }

    #[test]
    fn placeholder_count_matches_refs() {
        for line in ["", "x", "$a", "${a}${b}", "$$ $a 100% ${b}", "$ $a $"] {
            let spec = text(line);
            assert_eq!(count_placeholders(&spec.format), spec.arg_refs.len(), "line: {line}");
        }
    }

    #[test]
    fn input_line() {
        let spec = input("Name: [readName]");
        assert_eq!(spec.format, "Name: ");
        assert_eq!(spec.handler_ref.as_deref(), Some("readName"));
        assert!(!spec.obscured);
    }

    #[test]
    fn obscured_input_line() {
        let spec = input("Password: [!readInput]");
        assert_eq!(spec.format, "Password: ");
        assert_eq!(spec.handler_ref.as_deref(), Some("readInput"));
        assert!(spec.obscured);
    }

    #[test]
    fn input_with_variables_and_trailing_whitespace() {
        let spec = input("Hello ${user}, continue? [confirm]   ");
        assert_eq!(spec.format, "Hello %s, continue? ");
        assert_eq!(spec.arg_refs, vec!["user"]);
        assert_eq!(spec.handler_ref.as_deref(), Some("confirm"));
    }

    #[test]
    fn empty_binding_has_no_handler() {
        let spec = input("Press enter []");
        assert_eq!(spec.handler_ref, None);
        assert!(!spec.obscured);

        let spec = input("Secret [!]");
        assert_eq!(spec.handler_ref, None);
        assert!(spec.obscured);
    }

    #[test]
    fn text_after_binding_is_an_error() {
        let err = parse_line("login", 4, "Name: [read] extra").unwrap_err();
        match err {
            FormError::TemplateSyntax { source_id, line, reason } => {
                assert_eq!(source_id, "login");
                assert_eq!(line, 4);
                assert!(reason.contains("after input binding"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unterminated_variable_block() {
        let err = parse_line("f", 2, "Hello ${name").unwrap_err();
        assert!(err.to_string().contains("Incomplete variable block"));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn unterminated_handler_ref() {
        let err = parse_line("f", 7, "Name: [read").unwrap_err();
        assert!(err.to_string().contains("Incomplete input block"));
        assert!(err.to_string().contains("line 7"));
    }

    #[test]
    fn variable_at_end_of_line_is_closed() {
        let spec = text("bye $name");
        assert_eq!(spec.arg_refs, vec!["name"]);
    }

    #[test]
    fn parse_counts_lines_from_one() {
        let err = parse("form", ["ok", "fine", "bad ${"]).unwrap_err();
        assert!(matches!(err, FormError::TemplateSyntax { line: 3, .. }));
    }

    #[test]
    fn parse_preserves_order() {
        let specs = parse("form", ["Title", "Name: [read]", "Bye"]).unwrap();
        assert_eq!(specs.len(), 3);
        assert!(!specs[0].is_input());
        assert!(specs[1].is_input());
        assert_eq!(specs[2].format(), "Bye");
    }
}
