//! Error types for sealwright-core

use std::fmt;
use thiserror::Error;

/// Result type alias using sealwright-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Category of an [`Error`], for callers that branch on failure kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    PermissionDenied,
    Validation,
    Cycle,
    AlreadyExists,
    Retired,
    Unauthenticated,
    Crypto,
    Io,
    Cancelled,
    External,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::NotFound => "not-found",
            ErrorKind::PermissionDenied => "permission-denied",
            ErrorKind::Validation => "validation",
            ErrorKind::Cycle => "cycle",
            ErrorKind::AlreadyExists => "already-exists",
            ErrorKind::Retired => "retired",
            ErrorKind::Unauthenticated => "unauthenticated",
            ErrorKind::Crypto => "crypto",
            ErrorKind::Io => "io",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::External => "external",
        };
        f.write_str(s)
    }
}

/// Template parsing and execution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template is empty")]
    Empty,

    #[error("missing values for template variables: {}", .0.join(", "))]
    MissingVariables(Vec<String>),

    #[error("unmatched braces: {open} opening '{{{{' vs {close} closing '}}}}'")]
    UnmatchedBraces { open: usize, close: usize },

    #[error("empty placeholder '{{{{}}}}' at byte {position}")]
    EmptyPlaceholder { position: usize },

    #[error("nested braces at byte {position}")]
    NestedBraces { position: usize },

    #[error("placeholder at byte {position} is not a '{{{{identifier}}}}'")]
    InvalidPlaceholder { position: usize },
}

/// Core error types for Sealwright
#[derive(Error, Debug)]
pub enum Error {
    /// Resource, version, or metadata file absent
    #[error("Not found: {what}")]
    NotFound { what: String },

    /// Store access refused
    #[error("Permission denied on {resource}: {message}")]
    PermissionDenied { resource: String, message: String },

    /// Malformed metadata, config, or template
    #[error("Validation failed at {field}: {message}")]
    Validation { field: String, message: String },

    /// Template syntax or execution error
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// Dependency graph contains a loop
    #[error("Circular dependency detected: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },

    /// Store-side idempotency conflict
    #[error("Already exists: {resource}")]
    AlreadyExists { resource: String },

    /// Operation attempted on a retired secret
    #[error("Secret '{secret}' is retired{}", .reason.as_deref().map(|r| format!(": {r}")).unwrap_or_default())]
    Retired {
        secret: String,
        reason: Option<String>,
    },

    /// Credentials missing or expired
    #[error("Unauthenticated: {message}")]
    Unauthenticated { message: String },

    /// Encryption or certificate failure
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// External tool or service failure that fits no other category
    #[error("External failure: {0}")]
    External(String),

    /// Operation was cancelled before completion
    #[error("Operation cancelled")]
    Cancelled,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl Error {
    /// The category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Error::Validation { .. }
            | Error::Template(_)
            | Error::YamlParse(_)
            | Error::JsonParse(_) => ErrorKind::Validation,
            Error::Cycle { .. } => ErrorKind::Cycle,
            Error::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Error::Retired { .. } => ErrorKind::Retired,
            Error::Unauthenticated { .. } => ErrorKind::Unauthenticated,
            Error::Crypto(_) => ErrorKind::Crypto,
            Error::External(_) => ErrorKind::External,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            Error::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                ErrorKind::PermissionDenied
            }
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// Create a not found error
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create a validation error for a field path
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a permission denied error
    pub fn permission_denied(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// Create an already exists error
    pub fn already_exists(resource: impl Into<String>) -> Self {
        Self::AlreadyExists {
            resource: resource.into(),
        }
    }

    /// Create a retired error
    pub fn retired(secret: impl Into<String>, reason: Option<String>) -> Self {
        Self::Retired {
            secret: secret.into(),
            reason,
        }
    }

    /// Create an unauthenticated error
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    /// Create a crypto error
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto(message.into())
    }

    /// Create an external failure error
    pub fn external(message: impl Into<String>) -> Self {
        Self::External(message.into())
    }

    /// Prefix the field path of a validation error, leaving other errors untouched
    pub fn at(self, prefix: &str) -> Self {
        match self {
            Error::Validation { field, message } => Error::Validation {
                field: format!("{prefix}.{field}"),
                message,
            },
            Error::Template(e) => Error::Validation {
                field: prefix.to_string(),
                message: e.to_string(),
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_distinct() {
        assert_eq!(Error::not_found("x").kind(), ErrorKind::NotFound);
        assert_eq!(
            Error::validation("keys[0]", "bad").kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            Error::Template(TemplateError::Empty).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            Error::Cycle {
                path: vec!["a".into(), "a".into()]
            }
            .kind(),
            ErrorKind::Cycle
        );
        assert_eq!(Error::retired("db", None).kind(), ErrorKind::Retired);
        assert_eq!(Error::Cancelled.kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn test_io_not_found_maps_to_not_found() {
        let err = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_cycle_display() {
        let err = Error::Cycle {
            path: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "Circular dependency detected: a -> b -> a");
    }

    #[test]
    fn test_retired_display() {
        let err = Error::retired("db", Some("moved to vault".into()));
        assert_eq!(err.to_string(), "Secret 'db' is retired: moved to vault");
        assert_eq!(
            Error::retired("db", None).to_string(),
            "Secret 'db' is retired"
        );
    }

    #[test]
    fn test_at_prefixes_field_path() {
        let err = Error::validation("version", "must be numeric").at("keys[1].gsm");
        match err {
            Error::Validation { field, .. } => assert_eq!(field, "keys[1].gsm.version"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
