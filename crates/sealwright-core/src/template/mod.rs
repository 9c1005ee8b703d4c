//! `{{variable}}` templates for computed keys
//!
//! A [`Template`] is parsed once and executed against a map of resolved
//! values. Substitution is a single left-to-right pass over the raw text:
//! substituted values are never scanned again, so a value that itself
//! contains `{{...}}` is emitted verbatim.

mod syntax;

pub use syntax::validate_syntax;

use crate::error::{Result, TemplateError};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

static VARIABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{([a-zA-Z_][a-zA-Z0-9_]*)\}\}").expect("variable pattern is valid")
});

/// A parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    raw: String,
    variables: Vec<String>,
}

impl Template {
    /// Parse a template, collecting the variables it references
    ///
    /// Variables are listed once each, in order of first appearance.
    pub fn parse(text: &str) -> Result<Self> {
        if text.is_empty() {
            return Err(TemplateError::Empty.into());
        }

        let mut seen = HashSet::new();
        let variables = VARIABLE_RE
            .captures_iter(text)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .filter(|v| seen.insert(v.clone()))
            .collect();

        Ok(Self {
            raw: text.to_string(),
            variables,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Substitute every variable with its bound value
    ///
    /// Fails with [`TemplateError::MissingVariables`] naming every unbound
    /// variable. Extra entries in `values` are ignored.
    pub fn execute<V: AsRef<str>>(&self, values: &HashMap<String, V>) -> Result<String> {
        let missing: Vec<String> = self
            .variables
            .iter()
            .filter(|v| !values.contains_key(*v))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(TemplateError::MissingVariables(missing).into());
        }

        let mut out = String::with_capacity(self.raw.len());
        let mut rest = self.raw.as_str();

        while let Some(start) = rest.find("{{") {
            let after_open = &rest[start + 2..];
            let ident_len = identifier_len(after_open);
            let closes = ident_len > 0 && after_open[ident_len..].starts_with("}}");

            match closes.then(|| values.get(&after_open[..ident_len])).flatten() {
                Some(value) => {
                    out.push_str(&rest[..start]);
                    out.push_str(value.as_ref());
                    rest = &after_open[ident_len + 2..];
                }
                None => {
                    // Not a placeholder here; emit one brace and rescan from the next
                    out.push_str(&rest[..start + 1]);
                    rest = &rest[start + 1..];
                }
            }
        }
        out.push_str(rest);

        Ok(out)
    }
}

/// Length in bytes of the identifier at the start of `s`, or 0
fn identifier_len(s: &str) -> usize {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return 0,
    }
    chars
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}
