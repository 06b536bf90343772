#![doc = svgbobdoc::transform!(
//! Code blocks worth reading: highlighting, badges, and line numbers for
//! markdown fences.
//!
//! # Overview
//!
//! Plume rewrites the fenced code blocks of a markdown document into
//! self-contained HTML. Each block passes through the same stages:
//!
//! ```svgbob
//!  +-------+      +------------+     +----------+
//!  | fence |----->| directives |---->| language |
//!  +-------+      +-----+------+     +----+-----+
//!                       |                 |
//!                       v                 v
//!               +-------------+    +------------+    +--------+
//!               | highlighter |--->| reclassify |--->| markup |---> HTML
//!               +------+------+    +------------+    +--------+
//!                      |
//!             syntect or analyzer
//! ```
//!
//!   * **Directives** are read from the info string after the language tag:
//!     `file=<name>`, `noBadge=<bool>`, and `topLevel=<bool>`.
//!   * The **language** tag is normalized (`typescript` is `ts`, `rs` is
//!     `rust`) and an empty tag means plain text.
//!   * The **highlighter** turns code into `<span class="...">` runs using
//!     syntect's bundled grammars, or an external analyzer for Rust.
//!   * **Reclassification** tags keyword-like spans as declarations, `self`,
//!     or plain keywords so themes can color them consistently.
//!   * **Markup** wraps the result with a file name, a language badge, and
//!     line numbers.
//!
//! ## Rendering
//!
//! Documents are rendered with [`Markdown`](markdown::Markdown) and a chain
//! of [`Plugin`](markdown::Plugin)s:
//!
//! ```rust,no_run
//! use plume::markdown::{Markdown, Highlighter, CodeTrim, CodeBlocks, ExternalLinks, Renderer};
//!
//! let highlighter = Highlighter::new();
//! let mut html = String::new();
//! Markdown::from("```ts file=a.ts\nconst x = 1;\n```\n")
//!     .plugin(CodeTrim)
//!     .plugin(CodeBlocks::new(&highlighter).document("a.md"))
//!     .plugin(ExternalLinks)
//!     .plugin(Renderer::new(&mut html))
//!     .run()?;
//! # Ok::<(), plume::error::Error>(())
//! ```
)]

#[macro_use]
pub mod error;
pub mod util;
pub mod config;
pub mod markdown;

pub use rayon;
