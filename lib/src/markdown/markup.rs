use std::fmt::Write;

use crate::markdown::{BlockDirectives, Language};

/// Badge colors for one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeColors {
    pub background: &'static str,
    pub foreground: &'static str,
}

impl BadgeColors {
    pub const NEUTRAL: BadgeColors = BadgeColors::new("#888", "#fff");

    const fn new(background: &'static str, foreground: &'static str) -> Self {
        BadgeColors { background, foreground }
    }

    /// Colors for the canonical tag `lang`, or [`BadgeColors::NEUTRAL`].
    pub fn of(lang: &str) -> BadgeColors {
        match lang {
            "css" => BadgeColors::new("#264de4", "#fff"),
            "ts" | "tsx" => BadgeColors::new("#007acc", "#fff"),
            "java" => BadgeColors::new("#ed8b00", "#fff"),
            "rust" => BadgeColors::new("#dea584", "#fff"),
            "astro" => BadgeColors::new("#ff5a03", "#fff"),
            "toml" => BadgeColors::new("#9c4221", "#fff"),
            _ => BadgeColors::NEUTRAL,
        }
    }
}

/// Wraps highlighted `code` (spanning `lines` lines) in the code block
/// chrome: an optional file name, an optional language badge, and line
/// numbers.
#[allow(unused_must_use)]
pub fn assemble(code: &str, directives: &BlockDirectives, lang: &Language, lines: usize) -> String {
    let mut div = String::with_capacity(code.len() + 512);
    div.push_str("<div class=\"code-wrapper\">");

    if let Some(file) = &directives.file {
        write!(&mut div, "<div class=\"code-file-name\">{}</div>", html_escape::encode_text(file));
    }

    div.push_str("<div style=\"position:relative\">");
    if !directives.no_badge {
        let colors = BadgeColors::of(lang.canonical());
        write!(&mut div,
            "<div class=\"language-badge\" style=\"background-color:{};color:{}\">{}</div>",
            colors.background, colors.foreground,
            html_escape::encode_text(&lang.display().to_uppercase()));
    }

    match directives.file {
        Some(_) => div.push_str("<div class=\"code with-file-name\" style=\"display: flex;\">"),
        None => div.push_str("<div class=\"code\" style=\"display: flex;\">"),
    }

    div.push_str("<pre class=\"line-nums\">");
    for i in 1..=lines {
        if i < lines { write!(&mut div, "{}\n", i); }
        else { write!(&mut div, "{}", i); }
    }

    div.push_str("</pre>");
    write!(&mut div, "<pre class=\"code\"><code class=\"language-{}\">{}</code></pre>",
        html_escape::encode_double_quoted_attribute(lang.canonical()),
        code.trim_end_matches('\n'));

    div.push_str("</div></div></div>");
    div
}
