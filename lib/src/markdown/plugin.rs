use std::borrow::Cow;

use pulldown_cmark::Event;

use crate::error::Result;

/// A stage of the [`Markdown`](crate::markdown::Markdown) pipeline.
pub trait Plugin {
    /// Rewrites the raw markdown source before it is parsed.
    #[inline(always)]
    fn preprocess<'a>(&self, input: &'a str) -> Result<Cow<'a, str>> {
        Ok(Cow::Borrowed(input))
    }

    /// Wraps the event stream produced by the previous plugin.
    #[inline(always)]
    fn remap<'a, I>(&'a mut self, events: I) -> impl Iterator<Item = Event<'a>> + 'a
        where I: Iterator<Item = Event<'a>> + 'a
    {
        events
    }

    /// Runs once the whole stream has been consumed. Failures recorded while
    /// remapping are reported here.
    #[inline(always)]
    fn finalize(&mut self) -> Result<()> {
        Ok(())
    }
}
