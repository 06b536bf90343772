use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches `key=value` tokens. The value may be empty so that a bare `file=`
/// can be reported instead of skipped.
static DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\s)(?P<key>[A-Za-z_][A-Za-z0-9_-]*)=(?P<value>\S*)")
        .expect("directive pattern is valid")
});

/// Per-fence options read from the info string after the language tag, as in
/// ```` ```ts file=example.ts noBadge=true ````.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BlockDirectives {
    /// File name shown above the code.
    pub file: Option<String>,
    /// Hides the language badge.
    pub no_badge: bool,
    /// The code is a complete item rather than a fragment of a function body.
    pub top_level: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectiveError {
    #[error("directive `{0}` is missing a value")]
    MissingValue(&'static str),
    #[error("directive `{0}` is given more than once")]
    Duplicate(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    File,
    NoBadge,
    TopLevel,
}

impl Key {
    fn from_name(name: &str) -> Option<Key> {
        match name {
            "file" => Some(Key::File),
            "noBadge" => Some(Key::NoBadge),
            "topLevel" => Some(Key::TopLevel),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Key::File => "file",
            Key::NoBadge => "noBadge",
            Key::TopLevel => "topLevel",
        }
    }
}

impl BlockDirectives {
    /// Decodes the directives in `meta`. Unrecognized `key=value` tokens and
    /// bare words are ignored.
    pub fn parse(meta: &str) -> Result<BlockDirectives, DirectiveError> {
        let mut directives = BlockDirectives::default();
        let mut seen: Vec<Key> = Vec::with_capacity(3);

        for captures in DIRECTIVE.captures_iter(meta) {
            let (name, value) = (&captures["key"], &captures["value"]);
            let Some(key) = Key::from_name(name) else {
                log::debug!("ignoring unknown code block directive `{name}={value}`");
                continue;
            };

            if seen.contains(&key) {
                return Err(DirectiveError::Duplicate(key.name()));
            }

            seen.push(key);
            if value.is_empty() {
                return Err(DirectiveError::MissingValue(key.name()));
            }

            match key {
                Key::File => directives.file = Some(value.to_string()),
                Key::NoBadge => directives.no_badge = parse_bool(key, value),
                Key::TopLevel => directives.top_level = parse_bool(key, value),
            }
        }

        Ok(directives)
    }
}

/// Anything but `true` or `false` falls back to `false`.
fn parse_bool(key: Key, value: &str) -> bool {
    match value {
        "true" => true,
        "false" => false,
        _ => {
            log::warn!("directive `{}` expects `true` or `false`, found `{value}`; using `false`",
                key.name());
            false
        }
    }
}

impl FromStr for BlockDirectives {
    type Err = DirectiveError;

    fn from_str(meta: &str) -> Result<Self, Self::Err> {
        BlockDirectives::parse(meta)
    }
}
