pub mod hlist;

/// Number of lines in `code`, counting a final line without a trailing
/// newline.
pub fn line_count(code: &str) -> usize {
    let newlines = memchr::memchr_iter(b'\n', code.as_bytes()).count();
    match code.as_bytes().last() {
        Some(b'\n') | None => newlines,
        Some(_) => newlines + 1,
    }
}

/// Returns the scheme of `url` if it is an absolute `scheme://` URL.
pub fn url_scheme(url: &str) -> Option<&str> {
    let (scheme, rest) = url.split_once(':')?;
    let mut chars = scheme.chars();
    let valid = chars.next().map_or(false, |c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));

    (valid && rest.starts_with("//")).then_some(scheme)
}
