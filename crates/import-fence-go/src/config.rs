//! `[go]` section of the tool configuration.
//!
//! ```toml
//! [go]
//! module = "example.com/repo"   # default: read from go.mod
//! include_tests = false
//! vendor_dir = "vendor"
//! ```

use serde::Deserialize;
use std::path::Path;

use import_fence_core::{Config, ConfigError};

/// Settings of the Go import lister.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GoConfig {
    /// Module path; imports below it map to repository-relative packages.
    #[serde(default)]
    pub module: Option<String>,

    /// Whether `_test.go` files contribute imports.
    #[serde(default)]
    pub include_tests: bool,

    /// Vendor directory relative to the repository root.
    #[serde(default = "default_vendor_dir")]
    pub vendor_dir: String,
}

impl Default for GoConfig {
    fn default() -> Self {
        Self {
            module: None,
            include_tests: false,
            vendor_dir: default_vendor_dir(),
        }
    }
}

fn default_vendor_dir() -> String {
    "vendor".to_string()
}

impl GoConfig {
    /// Reads the `[go]` section of `config`, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Section`] if the section has the wrong shape.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(config.section("go")?.unwrap_or_default())
    }

    /// Returns the configured module path, or the one declared in
    /// `<root>/go.mod`.
    #[must_use]
    pub fn module_or_detect(&self, root: &Path) -> Option<String> {
        self.module.clone().or_else(|| read_module_path(root))
    }
}

/// Reads the `module` directive of `<root>/go.mod`.
#[must_use]
pub fn read_module_path(root: &Path) -> Option<String> {
    let content = std::fs::read_to_string(root.join("go.mod")).ok()?;
    parse_module_directive(&content)
}

fn parse_module_directive(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let line = line.split("//").next().unwrap_or("").trim();
        let rest = line.strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let module = rest.trim().trim_matches(|c| c == '"' || c == '`');
        (!module.is_empty()).then(|| module.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_section() {
        let config = Config::parse("").unwrap();
        assert_eq!(GoConfig::from_config(&config).unwrap(), GoConfig::default());
    }

    #[test]
    fn parses_section() {
        let config = Config::parse(
            "[go]\nmodule = \"example.com/repo\"\ninclude_tests = true\nvendor_dir = \"third_party/vendor\"\n",
        )
        .unwrap();
        let go = GoConfig::from_config(&config).unwrap();
        assert_eq!(go.module.as_deref(), Some("example.com/repo"));
        assert!(go.include_tests);
        assert_eq!(go.vendor_dir, "third_party/vendor");
    }

    #[test]
    fn rejects_unknown_key() {
        let config = Config::parse("[go]\nmodul = \"x\"\n").unwrap();
        assert!(matches!(
            GoConfig::from_config(&config),
            Err(ConfigError::Section { .. })
        ));
    }

    #[test]
    fn parses_go_mod() {
        let gomod = "// comment\nmodule example.com/repo // trailing\n\ngo 1.22\n";
        assert_eq!(
            parse_module_directive(gomod).as_deref(),
            Some("example.com/repo")
        );
        assert_eq!(
            parse_module_directive("module \"quoted/mod\"\n").as_deref(),
            Some("quoted/mod")
        );
        assert!(parse_module_directive("modules x\n").is_none());
        assert!(parse_module_directive("go 1.22\n").is_none());
    }

    #[test]
    fn detects_module_from_go_mod() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("go.mod"), "module example.com/m\n").unwrap();
        let go = GoConfig::default();
        assert_eq!(go.module_or_detect(tmp.path()).as_deref(), Some("example.com/m"));
        let pinned = GoConfig {
            module: Some("other/mod".to_string()),
            ..GoConfig::default()
        };
        assert_eq!(pinned.module_or_detect(tmp.path()).as_deref(), Some("other/mod"));
    }
}
