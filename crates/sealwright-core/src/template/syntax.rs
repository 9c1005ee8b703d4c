//! Template syntax checks independent of parsing

use crate::error::{Result, TemplateError};
use regex::Regex;
use std::sync::LazyLock;

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("identifier pattern is valid"));

/// Reject nested braces, empty placeholders, unbalanced `{{`/`}}` pairs, and
/// placeholders whose body is not an identifier
///
/// Each problem is reported as its own [`TemplateError`] variant. Checks run
/// in that order and the first failure wins.
pub fn validate_syntax(text: &str) -> Result<()> {
    if let Some(position) = text.find("{{{").or_else(|| text.find("}}}")) {
        return Err(TemplateError::NestedBraces { position }.into());
    }

    if let Some(position) = text.find("{{}}") {
        return Err(TemplateError::EmptyPlaceholder { position }.into());
    }

    let open = text.matches("{{").count();
    let close = text.matches("}}").count();
    if open != close {
        return Err(TemplateError::UnmatchedBraces { open, close }.into());
    }

    let mut offset = 0;
    while let Some(start) = text[offset..].find("{{") {
        let position = offset + start;
        let body_start = position + 2;
        let Some(len) = text[body_start..].find("}}") else {
            return Err(TemplateError::InvalidPlaceholder { position }.into());
        };
        if !IDENTIFIER_RE.is_match(&text[body_start..body_start + len]) {
            return Err(TemplateError::InvalidPlaceholder { position }.into());
        }
        offset = body_start + len + 2;
    }

    Ok(())
}
