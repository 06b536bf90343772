mod markdown;
mod plugin;
mod render;
mod code_filter;
mod code_block;
mod directives;
mod language;
mod highlight;
mod analyzer;
mod external_link;

pub mod reclassify;
pub mod markup;

pub use markdown::*;
pub use plugin::*;
pub use render::*;
pub use code_filter::*;
pub use code_block::*;
pub use directives::*;
pub use language::*;
pub use highlight::*;
pub use analyzer::*;
pub use external_link::*;
