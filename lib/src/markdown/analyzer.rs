use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::AnalyzerConfig;
use crate::error::Result;

/// Environment variable that overrides the analyzer program.
pub const ANALYZER_ENV: &str = "PLUME_ANALYZER";

/// Program looked up on `PATH` when neither the environment nor the
/// configuration names one.
pub const DEFAULT_PROGRAM: &str = "rust-highlight";

/// Flags requesting bare `<span>` output without a surrounding document or
/// inline styles.
pub const ANALYZER_ARGS: &[&str] = &["--unwrapped", "--unstyled"];

static LEADING_BRACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*<span[^>]*>\{</span>\n?").expect("brace pattern is valid")
});

static TRAILING_BRACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n?<span[^>]*>\}</span>\s*$").expect("brace pattern is valid")
});

#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("failed to start analyzer `{}`", .program.display())]
    Spawn { program: PathBuf, #[source] source: io::Error },
    #[error("failed to send code to analyzer `{}`", .program.display())]
    Write { program: PathBuf, #[source] source: io::Error },
    #[error("failed waiting on analyzer `{}`", .program.display())]
    Wait { program: PathBuf, #[source] source: io::Error },
    #[error("analyzer `{}` exited with {status}: {stderr}", .program.display())]
    Status { program: PathBuf, status: ExitStatus, stderr: String },
    #[error("analyzer `{}` produced non-UTF-8 output", .program.display())]
    Utf8 { program: PathBuf, #[source] source: std::string::FromUtf8Error },
}

/// An external highlighter for Rust that understands code in context.
///
/// Each call runs the program once: the code goes in on stdin, highlighted
/// HTML comes back on stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analyzer {
    program: PathBuf,
}

impl Analyzer {
    /// An analyzer running `program` as-is, without checking that it exists.
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Analyzer { program: program.into() }
    }

    /// Resolves the analyzer from the environment and `config`.
    ///
    /// A non-empty [`ANALYZER_ENV`] enables the analyzer even when `config`
    /// doesn't. Returns `Ok(None)` when the analyzer is disabled and an error
    /// when it is enabled but no program can be found.
    pub fn discover(config: &AnalyzerConfig) -> Result<Option<Analyzer>> {
        discover_in(config, std::env::var_os(ANALYZER_ENV), std::env::var_os("PATH"))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Highlights `code`. Fragments (`top_level == false`) are wrapped in a
    /// block so the analyzer sees statements in context; the wrapping braces
    /// are removed from the output again.
    pub fn highlight(&self, code: &str, top_level: bool) -> Result<String, AnalyzerError> {
        let input = match top_level {
            true => code.to_string(),
            false => format!("{{\n{}\n}}", code.trim_end_matches('\n')),
        };

        log::debug!("running analyzer {} ({} bytes)", self.program.display(), input.len());
        let html = self.run(&input)?;
        match top_level {
            true => Ok(html),
            false => Ok(strip_block(&html).to_string()),
        }
    }

    fn run(&self, input: &str) -> Result<String, AnalyzerError> {
        let program = || self.program.clone();
        let mut child = Command::new(&self.program)
            .args(ANALYZER_ARGS)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| AnalyzerError::Spawn { program: program(), source })?;

        // Feed stdin from a separate thread so a chatty child can't fill its
        // stdout pipe while we're still writing. Dropping the handle closes
        // the pipe, signaling end of input.
        let stdin = child.stdin.take();
        let bytes = input.as_bytes().to_vec();
        let writer = std::thread::spawn(move || match stdin {
            Some(mut stdin) => stdin.write_all(&bytes),
            None => Ok(()),
        });

        // Always reap the child, even if writing failed.
        let output = child.wait_with_output();
        let written = writer.join()
            .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other, "stdin writer panicked")));

        let output = output.map_err(|source| AnalyzerError::Wait { program: program(), source })?;
        if !output.status.success() {
            return Err(AnalyzerError::Status {
                program: program(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        written.map_err(|source| AnalyzerError::Write { program: program(), source })?;
        String::from_utf8(output.stdout)
            .map_err(|source| AnalyzerError::Utf8 { program: program(), source })
    }
}

/// Removes the rendered `{` at the start and `}` at the end of `html`.
fn strip_block(html: &str) -> &str {
    let start = LEADING_BRACE.find(html).map_or(0, |m| m.end());
    let end = TRAILING_BRACE.find(&html[start..]).map_or(html.len(), |m| start + m.start());
    &html[start..end]
}

fn discover_in(
    config: &AnalyzerConfig,
    env: Option<OsString>,
    path: Option<OsString>,
) -> Result<Option<Analyzer>> {
    let env = env.filter(|p| !p.is_empty());
    if !config.enabled && env.is_none() {
        return Ok(None);
    }

    resolve(env, config.program.as_deref(), path).map(|p| Some(Analyzer::new(p)))
}

fn resolve(
    env: Option<OsString>,
    configured: Option<&Path>,
    path: Option<OsString>,
) -> Result<PathBuf> {
    if let Some(program) = env.filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(program));
    }

    if let Some(program) = configured {
        if program.is_file() {
            return Ok(program.to_path_buf());
        }

        return err! {
            "configured analyzer does not exist",
            "program" => program.display(),
        };
    }

    path.iter()
        .flat_map(|p| std::env::split_paths(p))
        .map(|dir| dir.join(DEFAULT_PROGRAM))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| error! {
            "the Rust analyzer is enabled but no program was found",
            format!("set `{ANALYZER_ENV}`, set `analyzer.program`, or install `{DEFAULT_PROGRAM}` on PATH"),
        })
}
