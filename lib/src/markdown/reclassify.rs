use kuchiki::traits::TendrilSink;

use crate::error::{Chainable, Result};

pub const DECLARATION_CLASS: &str = "hl-declaration";
pub const SELF_CLASS: &str = "hl-self";
pub const KEYWORD_CLASS: &str = "hl-keyword";

const CATEGORY_CLASSES: &[&str] = &[DECLARATION_CLASS, SELF_CLASS, KEYWORD_CLASS];

/// Keywords that introduce a declaration or definition in one of the
/// languages we highlight.
const DECLARATION_KEYWORDS: &[&str] = &[
    "fn", "let", "const", "var", "function", "class", "struct", "enum", "trait",
    "impl", "type", "interface", "mod", "use", "import", "export", "static",
    "pub", "def", "async", "extends", "implements",
];

const SELF_KEYWORDS: &[&str] = &["self", "Self"];

/// Class tokens that mark a span as a candidate for reclassification, in
/// addition to any class containing `keyword`.
const ROLE_CLASSES: &[&str] = &["storage", "name", "punctuation"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Name,
    Other,
}

fn role(class: &str) -> Option<Role> {
    let tokens = || class.split_ascii_whitespace();
    if tokens().any(|t| t == "name") {
        Some(Role::Name)
    } else if class.contains("keyword") || tokens().any(|t| ROLE_CLASSES.contains(&t)) {
        Some(Role::Other)
    } else {
        None
    }
}

fn category(role: Role, text: &str) -> &'static str {
    if role != Role::Name && DECLARATION_KEYWORDS.contains(&text) {
        DECLARATION_CLASS
    } else {
        KEYWORD_CLASS
    }
}

/// Adds one category class to `<span>`s in `html`: [`SELF_CLASS`] to any
/// span reading `self`/`Self`, then, for keyword-, name-, or
/// punctuation-like spans, [`DECLARATION_CLASS`] for declaration keywords
/// and [`KEYWORD_CLASS`] for the rest. Existing classes are kept.
pub fn reclassify(html: &str) -> Result<String> {
    // Parsed inside a `div` so leading whitespace survives tree construction.
    let document = kuchiki::parse_html().one(format!("<div>{html}</div>"));
    let Ok(root) = document.select_first("div") else {
        log::debug!("highlighted code has no root element; leaving it unclassified");
        return Ok(html.to_string());
    };

    let spans = match root.as_node().select("span") {
        Ok(spans) => spans.collect::<Vec<_>>(),
        Err(()) => {
            log::debug!("failed to select spans in highlighted code; leaving it unclassified");
            return Ok(html.to_string());
        }
    };

    for span in spans {
        let mut attributes = span.attributes.borrow_mut();
        let Some(class) = attributes.get("class") else { continue };
        if class.split_ascii_whitespace().any(|t| CATEGORY_CLASSES.contains(&t)) {
            continue;
        }

        let text = span.as_node().text_contents();
        let text = text.trim();
        let added = match role(class) {
            _ if SELF_KEYWORDS.contains(&text) => SELF_CLASS,
            Some(role) => category(role, text),
            None => continue,
        };

        let class = format!("{class} {added}");
        attributes.insert("class", class);
    }

    let mut output = Vec::with_capacity(html.len() + html.len() / 4);
    for child in root.as_node().children() {
        child.serialize(&mut output)
            .chain(error!("failed to serialize highlighted code"))?;
    }

    String::from_utf8(output).chain(error!("highlighted code is not valid UTF-8"))
}
