//! # sealwright-core
//!
//! Core library for Sealwright providing:
//! - Secret metadata model with strict, path-reporting validation
//! - `{{variable}}` templates for computed keys
//! - Key dependency graphs with cycle detection and topological ordering
//! - Input resolution for computed keys
//! - Configuration file parsing (sealwright.yaml)

pub mod config;
pub mod error;
pub mod graph;
pub mod resolver;
pub mod template;
pub mod types;

pub use config::{ConfigFile, SealerBackend, SealwrightConfig};
pub use error::{Error, ErrorKind, Result, TemplateError};
pub use graph::DependencyGraph;
pub use resolver::Resolver;
pub use template::{validate_syntax, Template};
pub use types::{KeyMetadata, MetadataFormat, Scope, SecretMetadata, SourceKind};
