use pulldown_cmark::{html, Event};

use crate::markdown::Plugin;
use crate::error::Result;

/// The last plugin in a chain: renders the stream to HTML and appends it to
/// `output` once the document is finished.
pub struct Renderer<'o> {
    output: &'o mut String,
    rendered: String,
}

impl<'o> Renderer<'o> {
    pub fn new(output: &'o mut String) -> Self {
        Renderer { output, rendered: String::new() }
    }
}

impl Plugin for Renderer<'_> {
    fn remap<'a, I>(&'a mut self, events: I) -> impl Iterator<Item = Event<'a>> + 'a
        where I: Iterator<Item = Event<'a>> + 'a
    {
        html::push_html(&mut self.rendered, events);
        std::iter::empty()
    }

    fn finalize(&mut self) -> Result<()> {
        self.output.push_str(&std::mem::take(&mut self.rendered));
        Ok(())
    }
}
