//! Language-agnostic extraction types and trait.
//!
//! `LanguageExtractor` is the extension point for listing imports of another
//! language via Tree-sitter.

/// Package declaration extracted from source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    /// Line number (1-indexed).
    pub line: usize,
    /// Declared package name (e.g., `foo` in `package foo`).
    pub name: String,
}

/// A single import extracted from source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportInfo {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column (0-indexed byte offset within line).
    pub column: usize,
    /// Import path as written, without quotes (e.g., `net/http`).
    pub path: String,
    /// Local name, if the import is renamed (`.`, `_` or an identifier).
    pub alias: Option<String>,
}

/// Result of analyzing a single source file with Tree-sitter.
#[derive(Debug, Clone, Default)]
pub struct FileAnalysis {
    /// Package declaration, if present.
    pub package: Option<PackageInfo>,
    /// All imports found, in source order.
    pub imports: Vec<ImportInfo>,
    /// True if the parser had to recover from syntax errors.
    pub has_errors: bool,
}

/// Errors when a source file cannot be analyzed at all.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The grammar is incompatible with the linked Tree-sitter runtime.
    #[error("failed to load {language} grammar: {source}")]
    Language {
        /// Language identifier.
        language: &'static str,
        /// Runtime error.
        #[source]
        source: tree_sitter::LanguageError,
    },

    /// The parser produced no tree.
    #[error("{language} parser produced no syntax tree")]
    Parse {
        /// Language identifier.
        language: &'static str,
    },
}

/// Trait for language-specific Tree-sitter extraction.
///
/// The extractor receives raw source text and returns a [`FileAnalysis`]
/// with the package declaration and imports.
pub trait LanguageExtractor: Send + Sync {
    /// Language identifier (e.g., `"go"`).
    fn language_id(&self) -> &'static str;

    /// File extensions this extractor handles (e.g., `&[".go"]`).
    fn extensions(&self) -> &'static [&'static str];

    /// Extract the package declaration and imports from source code.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError`] if no syntax tree can be produced.
    fn analyze(&self, source: &str) -> Result<FileAnalysis, ExtractError>;

    /// Returns true if `file_name` has one of [`Self::extensions`].
    fn handles(&self, file_name: &str) -> bool {
        self.extensions().iter().any(|ext| file_name.ends_with(ext))
    }
}
