//! Configuration errors.
//!
//! A [`ConfigError`] is fatal for the whole run: rules that fail to load
//! would leave every downstream resolution incomplete.

use miette::{Diagnostic, NamedSource, SourceSpan};
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::rules::model::ModelError;

/// Malformed or invalid configuration.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum ConfigError {
    /// A rule or config file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    #[diagnostic(code(import_fence::config::io))]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the expected shape
    /// (unknown field, non-string prefix, wrong type).
    #[error("{}:{line}: {message}", .path.display())]
    #[diagnostic(code(import_fence::config::syntax))]
    Syntax {
        /// Offending file.
        path: PathBuf,
        /// 1-indexed line of the error.
        line: usize,
        /// Parser message.
        message: String,
        /// File content for diagnostics.
        #[source_code]
        src: NamedSource<String>,
        /// Location of the error, when the parser reports one.
        #[label("here")]
        span: Option<SourceSpan>,
    },

    /// The file parsed but declares an invalid prefix.
    #[error("{}:{line}: {source}", .path.display())]
    #[diagnostic(code(import_fence::config::invalid))]
    Invalid {
        /// Offending file.
        path: PathBuf,
        /// 1-indexed line of the offending entry.
        line: usize,
        /// What is wrong with it.
        #[source]
        source: ModelError,
        /// File content for diagnostics.
        #[source_code]
        src: NamedSource<String>,
        /// Location of the offending entry.
        #[label("here")]
        span: SourceSpan,
    },

    /// An exclude glob could not be compiled.
    #[error("invalid exclude pattern `{pattern}`: {reason}")]
    #[diagnostic(code(import_fence::config::exclude))]
    Exclude {
        /// The invalid pattern.
        pattern: String,
        /// Why it's invalid.
        reason: String,
    },

    /// A lister-specific section of the tool configuration has the wrong
    /// shape.
    #[error("invalid [{section}] section: {message}")]
    #[diagnostic(code(import_fence::config::section))]
    Section {
        /// Section name.
        section: String,
        /// Deserializer message.
        message: String,
    },

    /// Directory traversal failed while discovering rule files.
    #[error("failed to walk {}: {message}", .path.display())]
    #[diagnostic(code(import_fence::config::walk))]
    Walk {
        /// Directory being walked.
        path: PathBuf,
        /// Walker error detail.
        message: String,
    },
}

impl ConfigError {
    /// Builds a [`ConfigError::Syntax`] from a TOML deserialization error.
    pub(crate) fn syntax(path: &Path, content: &str, err: &toml::de::Error) -> Self {
        let span = err.span();
        Self::Syntax {
            path: path.to_path_buf(),
            line: span.as_ref().map_or(1, |s| line_of(content, s.start)),
            message: err.message().to_string(),
            src: named_source(path, content),
            span: span.map(SourceSpan::from),
        }
    }

    /// Builds a [`ConfigError::Invalid`] pointing at `span` in `content`.
    pub(crate) fn invalid(
        path: &Path,
        content: &str,
        span: Range<usize>,
        source: ModelError,
    ) -> Self {
        Self::Invalid {
            path: path.to_path_buf(),
            line: line_of(content, span.start),
            source,
            src: named_source(path, content),
            span: SourceSpan::from(span),
        }
    }

    /// Returns the offending file, if the error is tied to one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Io { path, .. }
            | Self::Syntax { path, .. }
            | Self::Invalid { path, .. } => Some(path),
            Self::Exclude { .. } | Self::Section { .. } | Self::Walk { .. } => None,
        }
    }

    /// Returns the 1-indexed line of the error, if known.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Syntax { line, .. } | Self::Invalid { line, .. } => Some(*line),
            _ => None,
        }
    }
}

fn named_source(path: &Path, content: &str) -> NamedSource<String> {
    NamedSource::new(path.display().to_string(), content.to_string())
}

/// Converts a byte offset into a 1-indexed line number.
fn line_of(content: &str, offset: usize) -> usize {
    let end = offset.min(content.len());
    content.as_bytes()[..end]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}
