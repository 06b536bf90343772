use std::path::{Path, PathBuf};

use plume::config::HighlightConfig;
use plume::error::{Result, Chainable};
use plume::markdown::{Markdown, Highlighter, CodeTrim, CodeBlocks, ExternalLinks, Renderer};
use plume::rayon::prelude::*;
use plume::{err, error};

use crate::config::Settings;

/// A markdown document found under the input directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Path relative to the input directory.
    pub relative: PathBuf,
}

impl Document {
    /// Where the rendered fragment is written: the same relative path under
    /// `output`, with an `html` extension.
    pub fn output_path(&self, output: &Path) -> PathBuf {
        output.join(&self.relative).with_extension("html")
    }
}

/// Finds every markdown document under `input`, sorted by path.
pub fn discover(input: &Path, settings: &Settings) -> Result<Vec<Document>> {
    if !input.is_dir() {
        return err! {
            "input is not a directory",
            "path" => input.display(),
        };
    }

    let mut documents: Vec<_> = jwalk::WalkDir::new(input)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path())
        .filter(|path| settings.is_markdown(path))
        .filter_map(|path| path.strip_prefix(input).ok().map(Path::to_path_buf))
        .map(|relative| Document { relative })
        .collect();

    documents.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(documents)
}

/// Renders one markdown source to an HTML fragment.
pub fn render_markdown(
    highlighter: &Highlighter,
    config: &HighlightConfig,
    name: &str,
    source: &str,
) -> Result<String> {
    let mut html = String::new();
    Markdown::from(source)
        .plugin(CodeTrim)
        .plugin(CodeBlocks::with_config(highlighter, config.clone()).document(name))
        .plugin(ExternalLinks)
        .plugin(Renderer::new(&mut html))
        .run()?;

    Ok(html)
}

fn render_document(
    highlighter: &Highlighter,
    settings: &Settings,
    input: &Path,
    output: &Path,
    document: &Document,
) -> Result<()> {
    let source_path = input.join(&document.relative);
    let source = std::fs::read_to_string(&source_path)
        .chain_with(|| error!("failed to read document", "path" => source_path.display()))?;

    let name = document.relative.display().to_string();
    let html = render_markdown(highlighter, &settings.highlight, &name, &source)?;

    let output_path = document.output_path(output);
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)
            .chain_with(|| error!("failed to create output directory", "path" => parent.display()))?;
    }

    std::fs::write(&output_path, html)
        .chain_with(|| error!("failed to write output", "path" => output_path.display()))?;

    log::info!("rendered {} -> {}", name, output_path.display());
    Ok(())
}

/// Renders every document in parallel. Returns the failures, in document
/// order, paired with the document that failed.
pub fn render_all<'d>(
    highlighter: &Highlighter,
    settings: &Settings,
    input: &Path,
    output: &Path,
    documents: &'d [Document],
) -> Vec<(&'d Document, plume::error::Error)> {
    documents.par_iter()
        .filter_map(|document| {
            render_document(highlighter, settings, input, output, document)
                .err()
                .map(|e| (document, e))
        })
        .collect()
}
