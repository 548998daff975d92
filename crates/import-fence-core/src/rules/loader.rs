//! DTO → Domain model conversion with validation.

use std::path::Path;

use toml::Spanned;

use super::config_dto::RuleFileDto;
use super::model::{Prefix, Rule};
use crate::error::ConfigError;

/// Parses the content of one rule declaration file.
///
/// `directory` is the repository-relative directory the file lives in;
/// `path` is only used for error reporting.
///
/// # Errors
///
/// Returns [`ConfigError::Syntax`] for TOML or shape errors and
/// [`ConfigError::Invalid`] for malformed prefixes. Both carry
/// the file path and line.
pub fn parse_rule_file(directory: &str, path: &Path, content: &str) -> Result<Rule, ConfigError> {
    let dto: RuleFileDto =
        toml::from_str(content).map_err(|e| ConfigError::syntax(path, content, &e))?;
    load(directory, path, content, dto)
}

/// Converts a `RuleFileDto` to a validated `Rule`.
///
/// # Errors
///
/// Returns the first invalid prefix.
pub fn load(
    directory: &str,
    path: &Path,
    content: &str,
    dto: RuleFileDto,
) -> Result<Rule, ConfigError> {
    let allowed = convert_prefixes(&dto.allowed, path, content)?;
    let forbidden = convert_prefixes(&dto.forbidden, path, content)?;

    Ok(Rule::new(directory, allowed, forbidden, dto.inherit_from_ancestors).with_source(path))
}

fn convert_prefixes(
    raw: &[Spanned<String>],
    path: &Path,
    content: &str,
) -> Result<Vec<Prefix>, ConfigError> {
    raw.iter()
        .map(|p| {
            Prefix::new(p.get_ref()).map_err(|e| ConfigError::invalid(path, content, p.span(), e))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::model::ModelError;

    fn parse(content: &str) -> Result<Rule, ConfigError> {
        parse_rule_file("pkg/apis/foo", Path::new("pkg/apis/foo/.import-rules.toml"), content)
    }

    // -- Happy path --

    #[test]
    fn load_empty_rule() {
        let rule = parse("").unwrap();
        assert_eq!(rule.directory(), "pkg/apis/foo");
        assert!(rule.allowed().is_empty());
        assert!(rule.forbidden().is_empty());
        assert!(!rule.inherits_from_ancestors());
    }

    #[test]
    fn load_full_rule() {
        let rule = parse(
            r#"
# exported API package
allowed = ["pkg/apis", "k8s.io/apimachinery"]
forbidden = ["pkg/apis/internal"]
inherit_from_ancestors = true
"#,
        )
        .unwrap();

        assert_eq!(rule.allowed().len(), 2);
        assert_eq!(rule.forbidden()[0].as_str(), "pkg/apis/internal");
        assert!(rule.inherits_from_ancestors());
        assert_eq!(
            rule.source(),
            Some(Path::new("pkg/apis/foo/.import-rules.toml"))
        );
    }

    // -- Error cases --

    #[test]
    fn load_rejects_unknown_field_with_line() {
        let err = parse("allowed = [\"pkg\"]\nforbiden = [\"x\"]\n").unwrap_err();
        match err {
            ConfigError::Syntax { line, ref path, .. } => {
                assert_eq!(line, 2);
                assert_eq!(path, Path::new("pkg/apis/foo/.import-rules.toml"));
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn load_rejects_non_string_prefix() {
        let err = parse("allowed = [\"pkg\", 7]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Syntax { line: 1, .. }));
    }

    #[test]
    fn load_rejects_invalid_prefix_with_line() {
        let err = parse("allowed = [\"pkg\"]\n\nforbidden = [\"third_party/\"]\n").unwrap_err();
        match err {
            ConfigError::Invalid { line, source, .. } => {
                assert_eq!(line, 3);
                assert!(matches!(source, ModelError::TrailingSlash { .. }));
            }
            other => panic!("expected invalid error, got {other:?}"),
        }
    }

    #[test]
    fn load_rejects_invalid_segment_with_line() {
        let err = parse("allowed = [\"pkg\"]\nforbidden = [\"pkg/../internal\"]\n").unwrap_err();
        match err {
            ConfigError::Invalid { line, source, .. } => {
                assert_eq!(line, 2);
                assert!(matches!(source, ModelError::InvalidSegment { .. }));
            }
            other => panic!("expected invalid error, got {other:?}"),
        }
    }

    #[test]
    fn load_accepts_prefix_in_both_lists() {
        let rule = parse("allowed = [\"\"]\nforbidden = [\"\"]\n").unwrap();
        assert!(rule.allowed()[0].is_everything());
        assert!(rule.forbidden()[0].is_everything());
    }

    #[test]
    fn load_rejects_wrong_flag_type() {
        let err = parse("inherit_from_ancestors = \"yes\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Syntax { .. }));
    }
}
