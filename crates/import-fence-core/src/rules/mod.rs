//! Directory import rules driven by TOML declaration files.
//!
//! # Architecture
//!
//! ```text
//! .import-rules.toml text
//!   ↓ serde (DTO layer)
//! config_dto::RuleFileDto
//!   ↓ validate + convert (loader)
//! model::Rule (pure domain model)
//!   ↓ collected per directory
//! RuleStore
//! ```

pub mod config_dto;
pub mod loader;
pub mod model;

pub use loader::parse_rule_file;
pub use model::{ModelError, Prefix, Rule};

/// Default name of the per-directory rule declaration file.
pub const DEFAULT_RULE_FILE: &str = ".import-rules.toml";
