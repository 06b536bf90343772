use std::borrow::Cow;

use pulldown_cmark::{Parser, Options};

use crate::markdown::Plugin;
use crate::util::hlist::*;
use crate::error::Result;

/// A markdown document and the chain of plugins it will be run through.
///
/// Plugins run in the order they are added: `preprocess` over the source
/// text, then `remap` over the event stream, then `finalize`.
#[derive(Debug, Clone)]
pub struct Markdown<'i, P = Nil> {
    input: Cow<'i, str>,
    options: Options,
    plugins: P,
}

impl<'i> Markdown<'i, Nil> {
    pub fn from<S: Into<Cow<'i, str>>>(input: S) -> Self {
        Self {
            input: input.into(),
            options: Options::all().difference(Options::ENABLE_SMART_PUNCTUATION),
            plugins: Nil,
        }
    }
}

impl<'i, P: HList> Markdown<'i, P> {
    pub fn plugin<T: Plugin>(self, plugin: T) -> Markdown<'i, HList![T, ..P]> {
        Markdown {
            input: self.input,
            options: self.options,
            plugins: self.plugins.insert(plugin)
        }
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }
}

macro_rules! impl_generic {
    (@[$($T:ident)*]) => (
        impl<'i, $($T: Plugin),*> Markdown<'i, HList![$($T),*]> {
            #[allow(unused_mut)]
            pub fn run(mut self) -> Result<()> {
                let input = rfold!([$($T)*] self.plugins.to_ref(), self.input,
                    |p, input| {
                        match input {
                            Cow::Borrowed(input) => p.preprocess(input)?,
                            Cow::Owned(input) => Cow::Owned(p.preprocess(&input)?.into_owned()),
                        }
                    }
                );

                let parser = Parser::new_ext(&input, self.options);
                let events = rfold!([$($T)*] self.plugins.to_mut(), parser,
                    |p, events| p.remap(events)
                );

                // Drive the chain; the last plugin is expected to consume it.
                events.for_each(|_| {});

                let mut result = Ok(());
                for_each_mut!(
                    [$($T)*] self.plugins.to_mut(),
                    |p| if let Err(e) = p.finalize() {
                        if result.is_ok() {
                            result = Err(e.chain(error!("markdown plugin failed")));
                        }
                    }
                );

                result
            }
        }
    );

    ([]) => (impl_generic!(@[]););
    ([$T:ident $($R:ident)*]) => (
        impl_generic!(@[$T $($R)*]);
        impl_generic!([$($R)*]);
    );
}

impl_generic!([A B C D E F G H I J K L M N O P Q R S T U V W X Y Z]);
