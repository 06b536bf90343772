use std::time::Instant;

use pulldown_cmark::{Event, Tag, CodeBlockKind, TagEnd};
use rayon::prelude::*;

use crate::config::{DirectivePolicy, HighlightConfig};
use crate::error::{Error, Result};
use crate::markdown::{Plugin, Highlighter, BlockDirectives, Language, PLAINTEXT, markup, reclassify};
use crate::util::line_count;

/// A fenced or indented code block, captured before any block is rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeFence {
    /// 1-based position among the document's code blocks.
    pub ordinal: usize,
    /// The full info string, as written.
    pub info: String,
    pub language: String,
    pub meta: String,
    pub code: String,
    /// Index of the `Start(CodeBlock)` event.
    start: usize,
    /// Index of the `End(CodeBlock)` event.
    end: usize,
}

impl CodeFence {
    fn new(ordinal: usize, start: usize, kind: &CodeBlockKind<'_>) -> Self {
        let info = match kind {
            CodeBlockKind::Fenced(info) => info.trim().to_string(),
            CodeBlockKind::Indented => String::new(),
        };

        let (lang, meta) = info.split_once(char::is_whitespace)
            .map(|(lang, meta)| (lang, meta.trim()))
            .unwrap_or((info.as_str(), ""));

        let lang = lang.split_once(',').map_or(lang, |(prefix, _)| prefix);
        let language = match lang.is_empty() {
            true => PLAINTEXT.to_string(),
            false => lang.to_string(),
        };

        let meta = meta.to_string();
        CodeFence { ordinal, info, language, meta, code: String::new(), start, end: start }
    }
}

/// Finds every complete code block in `events`.
pub fn collect_fences(events: &[Event<'_>]) -> Vec<CodeFence> {
    let mut fences = vec![];
    let mut current: Option<CodeFence> = None;
    for (i, event) in events.iter().enumerate() {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                current = Some(CodeFence::new(fences.len() + 1, i, kind));
            }
            Event::Text(text) if current.is_some() => {
                if let Some(fence) = current.as_mut() {
                    fence.code.push_str(text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some(mut fence) = current.take() {
                    fence.end = i;
                    fences.push(fence);
                }
            }
            _ => {}
        }
    }

    fences
}

/// Replaces code blocks with highlighted, badged HTML.
///
/// The whole document is buffered: every block is captured first, then
/// rendered, then spliced back in place of its events. A block that fails to
/// render is left as-is and the failure is reported by
/// [`Plugin::finalize()`].
pub struct CodeBlocks<'h> {
    highlighter: &'h Highlighter,
    config: HighlightConfig,
    document: Option<String>,
    errors: Vec<Error>,
}

impl<'h> CodeBlocks<'h> {
    pub fn new(highlighter: &'h Highlighter) -> Self {
        CodeBlocks::with_config(highlighter, HighlightConfig::default())
    }

    pub fn with_config(highlighter: &'h Highlighter, config: HighlightConfig) -> Self {
        CodeBlocks { highlighter, config, document: None, errors: vec![] }
    }

    /// Names the document in warnings and errors.
    pub fn document<S: Into<String>>(mut self, name: S) -> Self {
        self.document = Some(name.into());
        self
    }

    fn document_name(&self) -> &str {
        self.document.as_deref().unwrap_or("<input>")
    }

    /// Decodes directives in document order, applying the configured policy
    /// to blocks that fail. Returns the blocks to render.
    fn accept(&mut self, fences: Vec<CodeFence>) -> Vec<(CodeFence, BlockDirectives)> {
        let mut accepted = Vec::with_capacity(fences.len());
        for fence in fences {
            let directives = match BlockDirectives::parse(&fence.meta) {
                Ok(directives) => directives,
                Err(e) => {
                    log::warn!("{}: code block #{} (`{}`): {e}; expected \
                        `file=<name> noBadge=<true|false> topLevel=<true|false>`",
                        self.document_name(), fence.ordinal, fence.info);

                    match self.config.on_bad_directive {
                        DirectivePolicy::Abort => break,
                        DirectivePolicy::Skip => continue,
                        DirectivePolicy::Fail => {
                            let error = fence_error(e.into(), self.document_name(), &fence);
                            self.errors.push(error);
                            continue;
                        }
                    }
                }
            };

            accepted.push((fence, directives));
        }

        accepted
    }

    fn render_all(&self, fences: &[(CodeFence, BlockDirectives)]) -> Vec<Result<String>> {
        let (highlighter, reclassify_spans) = (self.highlighter, self.config.reclassify);
        let document = self.document_name();
        let render_one = |(fence, directives): &(CodeFence, BlockDirectives)| {
            render(highlighter, reclassify_spans, fence, directives)
                .map_err(|e| fence_error(e, document, fence))
        };

        match self.config.parallel {
            true => fences.par_iter().map(render_one).collect(),
            false => fences.iter().map(render_one).collect(),
        }
    }
}

/// Renders one block: highlight, reclassify, wrap.
pub fn render(
    highlighter: &Highlighter,
    reclassify_spans: bool,
    fence: &CodeFence,
    directives: &BlockDirectives,
) -> Result<String> {
    let start = Instant::now();
    let lang = Language::normalize(&fence.language);
    let mut html = highlighter.highlight(&lang, &fence.code, directives.top_level)?;
    if reclassify_spans {
        html = reclassify::reclassify(&html)?;
    }

    let html = markup::assemble(&html, directives, &lang, line_count(&fence.code));
    log::trace!("rendered {lang} code block #{} in {:?}", fence.ordinal, start.elapsed());
    Ok(html)
}

fn fence_error(error: Error, document: &str, fence: &CodeFence) -> Error {
    error.chain(error! {
        "failed to render code block",
        "document" => document,
        "code block" => format!("#{}", fence.ordinal),
        "info string" => format!("`{}`", fence.info),
    })
}

impl Plugin for CodeBlocks<'_> {
    fn remap<'a, I>(&'a mut self, events: I) -> impl Iterator<Item = Event<'a>> + 'a
        where I: Iterator<Item = Event<'a>> + 'a
    {
        let mut events: Vec<Event<'a>> = events.collect();
        let fences = self.accept(collect_fences(&events));
        let rendered = self.render_all(&fences);

        let mut replacements = Vec::with_capacity(fences.len());
        for ((fence, _), html) in fences.iter().zip(rendered) {
            match html {
                Ok(html) => replacements.push((fence.start..=fence.end, html)),
                Err(e) => self.errors.push(e),
            }
        }

        // Splice back to front so earlier indices stay valid.
        for (range, html) in replacements.into_iter().rev() {
            events.splice(range, [Event::Html(html.into())]);
        }

        events.into_iter()
    }

    fn finalize(&mut self) -> Result<()> {
        let mut errors = std::mem::take(&mut self.errors);
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            n => Err(Error::collect(format!("{n} code blocks failed to render"), errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    use pulldown_cmark::Parser;

    use super::*;

    fn fences(markdown: &str) -> Vec<CodeFence> {
        let events: Vec<_> = Parser::new(markdown).collect();
        collect_fences(&events)
    }

    #[test]
    fn captures_language_meta_and_code() {
        let found = fences("intro\n\n```typescript file=a.ts noBadge=true\nconst x = 1;\n```\n\n    indented\n");
        assert_eq!(found.len(), 2);

        assert_eq!(found[0].ordinal, 1);
        assert_eq!(found[0].language, "typescript");
        assert_eq!(found[0].meta, "file=a.ts noBadge=true");
        assert_eq!(found[0].code, "const x = 1;\n");

        assert_eq!(found[1].ordinal, 2);
        assert_eq!(found[1].language, PLAINTEXT);
        assert_eq!(found[1].code, "indented\n");
    }

    #[test]
    fn comma_separated_attributes_are_not_the_language() {
        let found = fences("```rust,ignore topLevel=true\nfn main() {}\n```\n");
        assert_eq!(found[0].language, "rust");
        assert_eq!(found[0].meta, "topLevel=true");
    }
}
