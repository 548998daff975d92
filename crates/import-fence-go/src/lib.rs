//! # import-fence-go
//!
//! Tree-sitter based import lister for Go source trees.
//!
//! This crate feeds `import-fence-core` with the direct imports of Go
//! packages. It provides:
//!
//! - [`LanguageExtractor`] trait for pluggable Tree-sitter extraction
//! - [`GoExtractor`] for Go import and package clause extraction
//! - [`GoImportLister`], an [`ImportLister`](import_fence_core::ImportLister)
//!   mapping module imports onto repository-relative packages
//! - [`GoConfig`] for the `[go]` section of the tool configuration

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod extractor;
pub mod go;
pub mod lister;

pub use config::GoConfig;
pub use extractor::{ExtractError, FileAnalysis, LanguageExtractor};
pub use go::GoExtractor;
pub use lister::GoImportLister;
