use std::fmt;

/// Tag used for fences that name no language.
pub const PLAINTEXT: &str = "plaintext";

/// `(alias, canonical)` pairs. Anything else is already canonical.
const ALIASES: &[(&str, &str)] = &[
    ("typescript", "ts"),
    ("javascript", "js"),
    ("rs", "rust"),
    ("cplusplus", "cpp"),
];

/// A fence language, normalized to the tag the highlighting backend expects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Language {
    canonical: String,
}

impl Language {
    /// Resolves a user-written fence tag. Matching is ASCII case-insensitive;
    /// an empty tag is [`PLAINTEXT`].
    pub fn normalize(raw: &str) -> Language {
        let raw = raw.trim();
        if raw.is_empty() {
            return Language { canonical: PLAINTEXT.into() };
        }

        let canonical = ALIASES.iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(raw))
            .map(|(_, canonical)| canonical.to_string())
            .unwrap_or_else(|| raw.to_ascii_lowercase());

        Language { canonical }
    }

    /// The tag handed to the highlighting backend.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// The short form shown to readers. Differs from [`Language::canonical()`]
    /// only when the canonical tag is the long name of a short alias.
    pub fn display(&self) -> &str {
        let short = ALIASES.iter()
            .find(|(alias, canonical)| *canonical == self.canonical && alias.len() < canonical.len());

        match short {
            Some((alias, _)) => alias,
            None => &self.canonical,
        }
    }

    pub fn is_plaintext(&self) -> bool {
        matches!(&*self.canonical, PLAINTEXT | "text" | "txt" | "plain")
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.canonical.fmt(f)
    }
}
