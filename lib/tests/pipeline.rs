use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use plume::config::{DirectivePolicy, HighlightConfig};
use plume::error::Result;
use plume::markdown::*;

fn render_with(highlighter: &Highlighter, config: HighlightConfig, markdown: &str) -> (String, Result<()>) {
    let mut html = String::new();
    let result = Markdown::from(markdown)
        .plugin(CodeTrim)
        .plugin(CodeBlocks::with_config(highlighter, config).document("post.md"))
        .plugin(ExternalLinks)
        .plugin(Renderer::new(&mut html))
        .run();

    (html, result)
}

fn render(markdown: &str) -> String {
    let (html, result) = render_with(&Highlighter::new(), HighlightConfig::default(), markdown);
    if let Err(e) = result {
        panic!("render failed:\n{e}");
    }

    html
}

fn executable(dir: &Path, name: &str, script: &str) -> PathBuf {
    let program = dir.join(name);
    std::fs::write(&program, script).unwrap();

    let mut permissions = std::fs::metadata(&program).unwrap().permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(&program, permissions).unwrap();
    program
}

/// Writes an analyzer that wraps `{`/`}` lines and `let` in spans and
/// records the arguments it was called with.
fn fake_analyzer(dir: &Path) -> PathBuf {
    executable(dir, "rust-highlight", concat!(
        "#!/bin/sh\n",
        "printf '%s\\n' \"$@\" > \"$(dirname \"$0\")/args\"\n",
        "sed -e 's|^{$|<span class=\"punctuation brace\">{</span>|' \\\n",
        "    -e 's|^}$|<span class=\"punctuation brace\">}</span>|' \\\n",
        "    -e 's|let |<span class=\"keyword\">let</span> |'\n",
    ))
}

#[test]
fn typescript_block_is_labeled_badged_and_classified() {
    let html = render("```typescript file=example.ts noBadge=false\nconst x = 1;\n```\n");

    assert!(html.starts_with("<div class=\"code-wrapper\">"), "{html}");
    assert!(html.contains("<div class=\"code-file-name\">example.ts</div>"));
    assert!(html.contains(">TS</div>"));
    assert!(html.contains("hl-declaration\">const</span>"), "{html}");
    assert!(html.contains("<pre class=\"line-nums\">1</pre>"));
    assert!(html.contains("<code class=\"language-ts\">"));
}

#[test]
fn plain_blocks_and_prose_render() {
    let html = render("Some *prose*.\n\n```\n\nplain < text\n```\n\n[out](https://example.com)\n");

    assert!(html.contains("<p>Some <em>prose</em>.</p>"));
    assert!(html.contains(">PLAINTEXT</div>"), "{html}");
    assert!(html.contains("plain &lt; text"));
    assert!(html.contains("<pre class=\"line-nums\">1</pre>"), "{html}");
    assert!(html.contains("target=\"_blank\" rel=\"noopener noreferrer\">out</a>"));
}

#[test]
fn blocks_render_the_same_in_parallel_and_in_sequence() {
    let markdown = "```ts\nlet a = 1;\n```\n\n```rs noBadge=true\nfn main() {}\n```\n\n```js\nclass A {}\n```\n";
    let highlighter = Highlighter::new();
    let sequential = HighlightConfig { parallel: false, ..HighlightConfig::default() };

    let (parallel, result) = render_with(&highlighter, HighlightConfig::default(), markdown);
    result.unwrap();

    let (sequential, result) = render_with(&highlighter, sequential, markdown);
    result.unwrap();

    assert_eq!(parallel, sequential);
    assert_eq!(parallel.matches("code-wrapper").count(), 3);
}

#[test]
fn without_reclassification_spans_keep_their_scopes() {
    let config = HighlightConfig { reclassify: false, ..HighlightConfig::default() };
    let (html, result) = render_with(&Highlighter::new(), config, "```ts\nconst x = 1;\n```\n");
    result.unwrap();

    assert!(html.contains(">const</span>"));
    assert!(!html.contains("hl-"), "{html}");
}

#[test]
fn analyzer_fragments_lose_their_wrapping_braces() {
    let dir = tempfile::tempdir().unwrap();
    let analyzer = Analyzer::new(fake_analyzer(dir.path()));
    let highlighter = Highlighter::with_analyzer(Some(analyzer));

    let (html, result) = render_with(&highlighter, HighlightConfig::default(),
        "```rust topLevel=false\nlet y = 5;\n```\n");
    result.unwrap();

    assert!(!html.contains(">{</span>"), "{html}");
    assert!(!html.contains(">}</span>"), "{html}");
    assert!(html.contains("hl-declaration\">let</span> y = 5;</code>"), "{html}");
    assert!(html.contains(">RS</div>"));

    let args = std::fs::read_to_string(dir.path().join("args")).unwrap();
    assert_eq!(args.lines().collect::<Vec<_>>(), ANALYZER_ARGS);
}

#[test]
fn analyzer_items_are_passed_through() {
    let dir = tempfile::tempdir().unwrap();
    let analyzer = Analyzer::new(fake_analyzer(dir.path()));

    let html = analyzer.highlight("{\nlet y = 5;\n}\n", true).unwrap();
    assert!(html.starts_with("<span class=\"punctuation brace\">{</span>\n"), "{html}");

    let html = analyzer.highlight("let y = 5;\n", false).unwrap();
    assert_eq!(html, "<span class=\"keyword\">let</span> y = 5;");
}

#[test]
fn analyzer_is_only_used_for_rust() {
    let dir = tempfile::tempdir().unwrap();
    let highlighter = Highlighter::with_analyzer(Some(Analyzer::new(fake_analyzer(dir.path()))));

    let (html, result) = render_with(&highlighter, HighlightConfig::default(), "```ts\nlet y = 5;\n```\n");
    result.unwrap();

    assert!(html.contains(">let</span>"));
    assert!(!dir.path().join("args").exists());
}

#[test]
fn analyzer_failure_fails_the_document_but_not_its_siblings() {
    let highlighter = Highlighter::with_analyzer(Some(Analyzer::new("/definitely/not/here")));
    let markdown = "```rust\nlet y = 5;\n```\n\n```ts file=b.ts\nconst x = 1;\n```\n";
    let (html, result) = render_with(&highlighter, HighlightConfig::default(), markdown);

    let error = result.unwrap_err().to_string();
    assert!(error.contains("failed to render code block"), "{error}");
    assert!(error.contains("post.md"), "{error}");
    assert!(error.contains("#1"), "{error}");
    assert!(error.contains("/definitely/not/here"), "{error}");

    assert!(html.contains("<div class=\"code-file-name\">b.ts</div>"), "{html}");
    assert_eq!(html.matches("code-wrapper").count(), 1);
}

#[test]
fn analyzer_exit_status_fails_only_its_block() {
    let dir = tempfile::tempdir().unwrap();
    let program = executable(dir.path(), "failing-highlight",
        "#!/bin/sh\ncat > /dev/null\necho boom >&2\nexit 3\n");

    let highlighter = Highlighter::with_analyzer(Some(Analyzer::new(program)));
    let markdown = "```rust\nlet y = 5;\n```\n\n```ts file=b.ts\nconst x = 1;\n```\n";
    let (html, result) = render_with(&highlighter, HighlightConfig::default(), markdown);

    let error = result.unwrap_err().to_string();
    assert!(error.contains("failing-highlight"), "{error}");
    assert!(error.contains("exit status: 3"), "{error}");
    assert!(error.contains("boom"), "{error}");

    assert_eq!(html.matches("code-wrapper").count(), 1, "{html}");
    assert!(html.contains("<div class=\"code-file-name\">b.ts</div>"));
    assert!(html.contains("<pre><code class=\"language-rust\">let y = 5;"));
}

#[test]
fn analyzer_closing_its_input_fails_only_its_block() {
    let dir = tempfile::tempdir().unwrap();
    let program = executable(dir.path(), "deaf-highlight", "#!/bin/sh\nexec 0<&-\nexit 0\n");

    // Larger than any pipe buffer, so the write can't complete before the
    // analyzer exits.
    let code = "let y = 5;\n".repeat(200_000);
    let markdown = format!("```rust\n{code}```\n\n```ts file=b.ts\nconst x = 1;\n```\n");

    let highlighter = Highlighter::with_analyzer(Some(Analyzer::new(program)));
    let (html, result) = render_with(&highlighter, HighlightConfig::default(), &markdown);

    let error = result.unwrap_err().to_string();
    assert!(error.contains("failed to send code to analyzer"), "{error}");
    assert!(error.contains("deaf-highlight"), "{error}");

    assert_eq!(html.matches("code-wrapper").count(), 1);
    assert!(html.contains("<div class=\"code-file-name\">b.ts</div>"));
}

#[test]
fn failures_are_all_reported() {
    let markdown = "```brainfunk\n+\n```\n\n```ts\nconst x = 1;\n```\n\n```cobolt\nx\n```\n";
    let (html, result) = render_with(&Highlighter::new(), HighlightConfig::default(), markdown);

    let error = result.unwrap_err().to_string();
    assert!(error.contains("2 code blocks failed to render"), "{error}");
    assert!(error.contains("brainfunk") && error.contains("cobolt"), "{error}");
    assert_eq!(html.matches("code-wrapper").count(), 1);
}

const BAD_DIRECTIVE: &str = "```ts\nconst a = 1;\n```\n\n\
    ```ts noBadge=true noBadge=false\nconst b = 2;\n```\n\n\
    ```ts file=c.ts\nconst c = 3;\n```\n";

#[test]
fn unrecognized_boolean_directive_is_false() {
    let markdown = "```ts noBadge=yes\nconst a = 1;\n```\n\n```ts file=b.ts\nconst b = 2;\n```\n";
    let html = render(markdown);

    assert_eq!(html.matches("code-wrapper").count(), 2, "{html}");
    assert_eq!(html.matches("class=\"language-badge\"").count(), 2, "{html}");
    assert!(html.contains("<div class=\"code-file-name\">b.ts</div>"));
}

fn render_bad_directive(policy: DirectivePolicy) -> (String, Result<()>) {
    let config = HighlightConfig { on_bad_directive: policy, ..HighlightConfig::default() };
    render_with(&Highlighter::new(), config, BAD_DIRECTIVE)
}

#[test]
fn bad_directive_aborts_the_rest_of_the_document() {
    let (html, result) = render_bad_directive(DirectivePolicy::Abort);
    result.unwrap();

    assert_eq!(html.matches("code-wrapper").count(), 1, "{html}");
    assert!(html.contains("<pre><code class=\"language-ts\">const b = 2;"));
    assert!(html.contains("<pre><code class=\"language-ts\">const c = 3;"));
}

#[test]
fn bad_directive_skips_only_its_block() {
    let (html, result) = render_bad_directive(DirectivePolicy::Skip);
    result.unwrap();

    assert_eq!(html.matches("code-wrapper").count(), 2, "{html}");
    assert!(html.contains("<pre><code class=\"language-ts\">const b = 2;"));
    assert!(html.contains("<div class=\"code-file-name\">c.ts</div>"));
}

#[test]
fn bad_directive_fails_the_document() {
    let (html, result) = render_bad_directive(DirectivePolicy::Fail);

    let error = result.unwrap_err().to_string();
    assert!(error.contains("`noBadge` is given more than once"), "{error}");
    assert!(error.contains("#2"), "{error}");
    assert_eq!(html.matches("code-wrapper").count(), 2, "{html}");
}
