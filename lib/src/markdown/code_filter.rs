use pulldown_cmark::{Event, Tag, TagEnd, CowStr};

use super::Plugin;

/// Drops blank lines at the start of every code block, so a fence opened
/// with an empty line doesn't render an empty first line.
#[derive(Default, Clone)]
pub struct CodeTrim;

struct Iter<I> {
    inner: I,
    /// `Some(true)` inside a code block before its first non-blank line.
    leading: Option<bool>,
}

fn trim_blank_lines(text: &str) -> usize {
    let mut i = 0;
    while let Some(k) = memchr::memchr(b'\n', text[i..].as_bytes()) {
        let line = &text[i..(i + k)];
        if !line.bytes().all(|c| c.is_ascii_whitespace()) {
            break;
        }

        i += k + 1;
    }

    i
}

impl Plugin for CodeTrim {
    fn remap<'a, I>(&'a mut self, events: I) -> impl Iterator<Item = Event<'a>> + 'a
        where I: Iterator<Item = Event<'a>> + 'a
    {
        Iter { inner: events, leading: None }
    }
}

impl<'a, I: Iterator<Item = Event<'a>>> Iterator for Iter<I> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let event = self.inner.next()?;
            match event {
                Event::Start(Tag::CodeBlock(_)) => self.leading = Some(true),
                Event::End(TagEnd::CodeBlock) => self.leading = None,
                Event::Text(text) if self.leading == Some(true) => {
                    let skip = trim_blank_lines(&text);
                    if skip == text.len() {
                        // Entirely blank so far: swallow and keep looking.
                        continue;
                    }

                    self.leading = Some(false);
                    let text = match text {
                        CowStr::Borrowed(s) => CowStr::Borrowed(&s[skip..]),
                        text if skip == 0 => text,
                        text => CowStr::from(text[skip..].to_string()),
                    };

                    return Some(Event::Text(text));
                }
                _ => {}
            }

            return Some(event);
        }
    }
}
