use std::path::Path;

use serde::{Deserialize, Serialize};

use plume::config::HighlightConfig;
use plume::error::{Result, Chainable};
use plume::error;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Settings {
    pub highlight: HighlightConfig,
    /// Extensions of the files rendered as markdown.
    pub extensions: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            highlight: HighlightConfig::default(),
            extensions: vec!["md".into(), "markdown".into(), "mdown".into()],
        }
    }
}

impl Settings {
    /// Reads settings from `explicit` if given, else from `<input>/config.toml`
    /// if it exists, else uses the defaults.
    pub fn discover(input: &Path, explicit: Option<&Path>) -> Result<Self> {
        let default = input.join(crate::CONFIG_FILE);
        let path = match explicit {
            Some(path) => path,
            None if default.is_file() => &default,
            None => return Ok(Settings::default()),
        };

        log::debug!("reading settings from {}", path.display());
        let source = std::fs::read_to_string(path)
            .chain_with(|| error!("failed to read settings", "path" => path.display()))?;

        toml::from_str(&source)
            .chain_with(|| error!("invalid settings", "path" => path.display()))
    }

    pub fn is_markdown(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}
