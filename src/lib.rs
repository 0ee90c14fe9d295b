//! TypeScript language plugin for resource provider projects.
//!
//! This library provides:
//! - project scaffolding and model generation ([`codegen`])
//! - packaging of the built handler and sources into a deployable zip ([`package`])
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod cli;
pub mod codegen;
pub mod error;
pub mod package;
pub mod project;
pub mod reporter;

// Re-export commonly used types
pub use error::{PluginError, Result};
