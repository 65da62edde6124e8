//! Template sources
//!
//! Where a form's template lines come from. The parser never sees a source,
//! only the plain ordered lines [`TemplateSource::load`] hands it.

use std::fs;
use std::path::{Path, PathBuf};

use super::parser::{self, ElementSpec};
use crate::error::{FormError, Result};

/// Where template lines are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Literal lines
    Lines(Vec<String>),
    /// A block of text split on line breaks (e.g. from `include_str!`)
    Text(String),
    /// A UTF-8 file on disk
    File(PathBuf),
}

impl TemplateSource {
    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TemplateSource::Lines(lines.into_iter().map(Into::into).collect())
    }

    pub fn text(text: impl Into<String>) -> Self {
        TemplateSource::Text(text.into())
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        TemplateSource::File(path.into())
    }

    /// Resolve a relative file path against `base`
    pub fn relative_to(self, base: &Path) -> Self {
        match self {
            TemplateSource::File(path) if path.is_relative() => TemplateSource::File(base.join(path)),
            other => other,
        }
    }

    /// Read the source into ordered lines
    pub fn load(&self) -> Result<Vec<String>> {
        match self {
            TemplateSource::Lines(lines) => Ok(lines.clone()),
            TemplateSource::Text(text) => Ok(split_lines(text)),
            TemplateSource::File(path) => {
                let content = fs::read_to_string(path).map_err(|source| FormError::TemplateLoad {
                    path: path.clone(),
                    source,
                })?;
                Ok(split_lines(&content))
            }
        }
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

/// An ordered set of raw lines owned by one form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source_id: String,
    lines: Vec<String>,
}

impl Template {
    pub fn new(source_id: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            source_id: source_id.into(),
            lines,
        }
    }

    /// Load a template for `source_id` from `source`
    pub fn load(source_id: impl Into<String>, source: &TemplateSource) -> Result<Self> {
        Ok(Self::new(source_id, source.load()?))
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Parse every line into an [`ElementSpec`]
    pub fn parse(&self) -> Result<Vec<ElementSpec>> {
        parser::parse(&self.source_id, &self.lines)
    }
}
