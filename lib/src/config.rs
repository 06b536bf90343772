use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Chainable, Result};

/// What to do with a code block whose directives fail to decode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DirectivePolicy {
    /// Warn, then leave this block and every later block in the document
    /// untransformed.
    #[default]
    Abort,
    /// Warn, then leave only this block untransformed.
    Skip,
    /// Fail the document's build; other blocks are still transformed.
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct HighlightConfig {
    /// Tag keyword spans with declaration/self/keyword categories.
    pub reclassify: bool,
    /// Highlight the blocks of a document on the rayon pool.
    pub parallel: bool,
    pub on_bad_directive: DirectivePolicy,
    pub analyzer: AnalyzerConfig,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AnalyzerConfig {
    /// Route `rust` blocks through the external analyzer. Setting
    /// `PLUME_ANALYZER` also enables it.
    pub enabled: bool,
    /// The analyzer program. `PLUME_ANALYZER` takes precedence; if neither is
    /// set the program is looked up on `PATH`.
    pub program: Option<PathBuf>,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        HighlightConfig {
            reclassify: true,
            parallel: true,
            on_bad_directive: DirectivePolicy::default(),
            analyzer: AnalyzerConfig::default(),
        }
    }
}

impl HighlightConfig {
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).chain(error!("invalid highlight configuration"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_default() {
        assert_eq!(HighlightConfig::from_toml("").unwrap(), HighlightConfig::default());
    }

    #[test]
    fn reads_every_field() {
        let config = HighlightConfig::from_toml(r#"
            reclassify = false
            parallel = false
            on-bad-directive = "skip"

            [analyzer]
            enabled = true
            program = "/usr/local/bin/rust-highlight"
        "#).unwrap();

        assert!(!config.reclassify);
        assert!(!config.parallel);
        assert_eq!(config.on_bad_directive, DirectivePolicy::Skip);
        assert!(config.analyzer.enabled);
        assert_eq!(config.analyzer.program, Some("/usr/local/bin/rust-highlight".into()));
    }

    #[test]
    fn rejects_unknown_policy() {
        let error = HighlightConfig::from_toml(r#"on-bad-directive = "ignore""#).unwrap_err();
        assert!(error.to_string().contains("invalid highlight configuration"));
    }
}
