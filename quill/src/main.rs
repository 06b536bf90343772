use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use plume::error::Result;
use plume::markdown::Highlighter;

use crate::config::Settings;

mod config;
mod render;

pub const CONFIG_FILE: &str = "config.toml";

mod flags {
    use std::path::PathBuf;

    xflags::xflags! {
        /// Renders every markdown document in a directory to an HTML fragment.
        cmd quill {
            /// Directory of markdown documents.
            required input: PathBuf
            /// Directory the HTML fragments are written to.
            required output: PathBuf
            /// Settings file. Defaults to `<input>/config.toml`.
            optional -c, --config path: PathBuf
        }
    }
}

fn run(input: PathBuf, output: PathBuf, config: Option<PathBuf>) -> Result<usize> {
    let start = Instant::now();
    let settings = Settings::discover(&input, config.as_deref())?;
    let highlighter = Arc::new(Highlighter::from_config(&settings.highlight)?);
    highlighter.warm_up();

    let documents = render::discover(&input, &settings)?;
    log::info!("discovered {} documents in {}ms", documents.len(), start.elapsed().as_millis());

    let failures = render::render_all(&highlighter, &settings, &input, &output, &documents);
    for (document, error) in &failures {
        eprintln!("error: {}\n{error}", document.relative.display());
    }

    log::info!("rendered {} documents in {}ms",
        documents.len() - failures.len(), start.elapsed().as_millis());

    Ok(failures.len())
}

pub fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let flags = flags::Quill::from_env_or_exit();

    match run(flags.input, flags.output, flags.config) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(n) => {
            eprintln!("{n} documents failed to render");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
