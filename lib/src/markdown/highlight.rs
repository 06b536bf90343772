use std::sync::Arc;

use syntect::html::{ClassedHTMLGenerator, ClassStyle};
use syntect::parsing::{SyntaxSet, SyntaxReference};
use syntect::util::LinesWithEndings;
use once_cell::sync::Lazy;

use crate::config::HighlightConfig;
use crate::error::{Chainable, Result};
use crate::markdown::{Analyzer, Language};

/// Language routed through the external [`Analyzer`] when one is configured.
pub const ANALYZED_LANGUAGE: &str = "rust";

/// Turns code into HTML annotated with `<span class="...">` runs.
///
/// Construct one per build and share it by reference; the syntax set is
/// loaded on first use.
pub struct Highlighter {
    syntaxes: Lazy<SyntaxSet>,
    analyzer: Option<Analyzer>,
}

impl std::fmt::Debug for Highlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Highlighter")
            .field("syntaxes_loaded", &Lazy::get(&self.syntaxes).is_some())
            .field("analyzer", &self.analyzer)
            .finish()
    }
}

impl Highlighter {
    /// A highlighter using only the bundled syntaxes.
    pub fn new() -> Self {
        Highlighter::with_analyzer(None)
    }

    pub fn with_analyzer(analyzer: Option<Analyzer>) -> Self {
        Highlighter {
            syntaxes: Lazy::new(SyntaxSet::load_defaults_newlines),
            analyzer,
        }
    }

    /// Builds the highlighter described by `config`, failing if the analyzer
    /// is enabled but cannot be found.
    pub fn from_config(config: &HighlightConfig) -> Result<Self> {
        let analyzer = Analyzer::discover(&config.analyzer)
            .chain(error!("failed to configure the highlighter"))?;

        Ok(Highlighter::with_analyzer(analyzer))
    }

    /// Loads the syntax set on the rayon pool so the first document doesn't
    /// pay for it.
    #[inline]
    pub fn warm_up(self: &Arc<Self>) {
        let this = self.clone();
        rayon::spawn(move || { Lazy::force(&this.syntaxes); });
    }

    pub fn analyzer(&self) -> Option<&Analyzer> {
        self.analyzer.as_ref()
    }

    /// Highlights `code` written in `lang`.
    ///
    /// `top_level` only matters to the analyzer; the bundled syntaxes
    /// highlight fragments and items alike.
    pub fn highlight(&self, lang: &Language, code: &str, top_level: bool) -> Result<String> {
        match &self.analyzer {
            Some(analyzer) if lang.canonical() == ANALYZED_LANGUAGE => {
                Ok(analyzer.highlight(code, top_level)?)
            }
            _ => self.highlight_bundled(lang, code),
        }
    }

    fn highlight_bundled(&self, lang: &Language, code: &str) -> Result<String> {
        let syntax = self.find_syntax(lang).ok_or_else(|| error! {
            "unsupported language",
            "language" => lang.canonical(),
        })?;

        let mut generator = ClassedHTMLGenerator::new_with_class_style(
            syntax,
            &self.syntaxes,
            ClassStyle::Spaced
        );

        for line in LinesWithEndings::from(code) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }

        Ok(generator.finalize())
    }

    fn find_syntax(&self, lang: &Language) -> Option<&SyntaxReference> {
        if lang.is_plaintext() {
            return Some(self.syntaxes.find_syntax_plain_text());
        }

        // The bundled set has no TypeScript grammar; JavaScript's is a
        // superset of what a `ts` fence usually contains.
        let token = match lang.canonical() {
            "ts" | "tsx" | "mts" | "cts" => "js",
            token => token,
        };

        self.syntaxes.find_syntax_by_token(token)
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Highlighter::new()
    }
}
