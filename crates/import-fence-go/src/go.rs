//! Go language extractor using Tree-sitter.

use tree_sitter::{Language, Node, Parser};

use crate::extractor::{ExtractError, FileAnalysis, ImportInfo, LanguageExtractor, PackageInfo};

/// Extracts imports and the package clause from Go source.
pub struct GoExtractor {
    language: Language,
}

impl GoExtractor {
    /// Creates a new Go extractor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: tree_sitter_go::LANGUAGE.into(),
        }
    }

    fn text<'a>(node: &Node<'_>, src: &'a [u8]) -> &'a str {
        node.utf8_text(src).unwrap_or("")
    }

    fn extract_package(node: &Node<'_>, src: &[u8]) -> Option<PackageInfo> {
        let mut cursor = node.walk();
        let name = node
            .named_children(&mut cursor)
            .find(|child| child.kind() == "package_identifier")?;
        Some(PackageInfo {
            line: node.start_position().row + 1,
            name: Self::text(&name, src).to_owned(),
        })
    }

    fn extract_spec(node: &Node<'_>, src: &[u8]) -> Option<ImportInfo> {
        let path = node.child_by_field_name("path")?;
        let raw = Self::text(&path, src);
        let unquoted = raw.trim_matches(|c| c == '"' || c == '`');
        if unquoted.is_empty() {
            return None;
        }
        Some(ImportInfo {
            line: node.start_position().row + 1,
            column: node.start_position().column,
            path: unquoted.to_owned(),
            alias: node
                .child_by_field_name("name")
                .map(|name| Self::text(&name, src).to_owned()),
        })
    }

    /// Collects `import_spec` nodes of one `import_declaration`, grouped or not.
    fn extract_declaration(node: &Node<'_>, src: &[u8], out: &mut Vec<ImportInfo>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "import_spec" => out.extend(Self::extract_spec(&child, src)),
                "import_spec_list" => {
                    let mut list_cursor = child.walk();
                    for spec in child.named_children(&mut list_cursor) {
                        if spec.kind() == "import_spec" {
                            out.extend(Self::extract_spec(&spec, src));
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

impl Default for GoExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageExtractor for GoExtractor {
    fn language_id(&self) -> &'static str {
        "go"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".go"]
    }

    fn analyze(&self, source: &str) -> Result<FileAnalysis, ExtractError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|source| ExtractError::Language {
                language: "go",
                source,
            })?;

        let src = source.as_bytes();
        let tree = parser
            .parse(src, None)
            .ok_or(ExtractError::Parse { language: "go" })?;
        let root = tree.root_node();

        let mut result = FileAnalysis {
            has_errors: root.has_error(),
            ..FileAnalysis::default()
        };

        // Imports must precede all other top-level declarations in Go.
        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            match node.kind() {
                "package_clause" => {
                    result.package = Self::extract_package(&node, src);
                }
                "import_declaration" => {
                    Self::extract_declaration(&node, src, &mut result.imports);
                }
                _ => {}
            }
        }

        Ok(result)
    }
}
