use std::collections::VecDeque;
use std::fmt::Write;

use pulldown_cmark::{Event, Tag, TagEnd};

use crate::markdown::Plugin;
use crate::util::url_scheme;

/// Makes links to other sites open in a new tab.
///
/// Only links to an absolute `scheme://` URL whose content is plain text are
/// rewritten; every other link passes through untouched.
#[derive(Default, Clone)]
pub struct ExternalLinks;

struct Iter<'a, I> {
    inner: I,
    pending: VecDeque<Event<'a>>,
}

impl Plugin for ExternalLinks {
    fn remap<'a, I>(&'a mut self, events: I) -> impl Iterator<Item = Event<'a>> + 'a
        where I: Iterator<Item = Event<'a>> + 'a
    {
        Iter { inner: events, pending: VecDeque::new() }
    }
}

fn anchor(href: &str, title: &str, text: &str) -> String {
    let mut html = String::with_capacity(href.len() + text.len() + 64);
    let _ = write!(html, "<a href=\"{}\"", html_escape::encode_double_quoted_attribute(href));
    if !title.is_empty() {
        let _ = write!(html, " title=\"{}\"", html_escape::encode_double_quoted_attribute(title));
    }

    let _ = write!(html, " target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
        html_escape::encode_text(text));

    html
}

impl<'a, I: Iterator<Item = Event<'a>>> Iterator for Iter<'a, I> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }

        let link = match self.inner.next()? {
            Event::Start(link @ Tag::Link { .. }) if is_external(&link) => link,
            event => return Some(event),
        };

        // Look ahead for exactly `Text, End(Link)`.
        let text = match self.inner.next() {
            Some(Event::Text(text)) => text,
            next => {
                self.pending.extend(next);
                return Some(Event::Start(link));
            }
        };

        match (self.inner.next(), &link) {
            (Some(Event::End(TagEnd::Link)), Tag::Link { dest_url, title, .. }) => {
                Some(Event::InlineHtml(anchor(dest_url, title, &text).into()))
            }
            (next, _) => {
                self.pending.push_back(Event::Text(text));
                self.pending.extend(next);
                Some(Event::Start(link))
            }
        }
    }
}

fn is_external(link: &Tag<'_>) -> bool {
    matches!(link, Tag::Link { dest_url, .. } if url_scheme(dest_url).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::{Markdown, Renderer};

    fn render(markdown: &str) -> String {
        let mut html = String::new();
        Markdown::from(markdown)
            .plugin(ExternalLinks)
            .plugin(Renderer::new(&mut html))
            .run()
            .unwrap();

        html
    }

    #[test]
    fn external_links_open_in_a_new_tab() {
        let html = render("see [my blog](https://blog.igamble.dev \"Blog\") now");
        assert_eq!(html, "<p>see <a href=\"https://blog.igamble.dev\" title=\"Blog\" \
            target=\"_blank\" rel=\"noopener noreferrer\">my blog</a> now</p>\n");
    }

    #[test]
    fn attributes_are_escaped() {
        let html = render("[query](http://example.com/?a=1&b=2 'say \"hi\"')");
        assert!(html.contains("href=\"http://example.com/?a=1&amp;b=2\""), "{html}");
        assert!(html.contains("title=\"say &quot;hi&quot;\""), "{html}");
        assert!(html.contains(">query</a>"), "{html}");
    }

    #[test]
    fn local_links_pass_through() {
        let html = render("[home](/) and [top](#top) and [mail](mailto:me@example.com)");
        assert!(!html.contains("_blank"), "{html}");
        assert!(html.contains("<a href=\"/\">home</a>"));
        assert!(html.contains("<a href=\"#top\">top</a>"));
    }

    #[test]
    fn rich_links_pass_through() {
        let html = render("[**bold** link](https://example.com) and [](https://example.com)");
        assert!(!html.contains("_blank"), "{html}");
        assert!(html.contains("<a href=\"https://example.com\"><strong>bold</strong> link</a>"));
        assert!(html.contains("<a href=\"https://example.com\"></a>"));
    }
}
