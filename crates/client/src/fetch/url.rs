//! URL canonicalization and domain key extraction.

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("URL has no host")]
    MissingHost,
}

/// Whether `input` already starts with `http://` or `https://`, ignoring case.
fn has_http_scheme(input: &str) -> bool {
    let lower = input.get(..8).unwrap_or(input).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Prepend `https://` unless the input already carries an http(s) scheme.
fn with_default_scheme(input: &str) -> String {
    if has_http_scheme(input) { input.to_string() } else { format!("https://{input}") }
}

/// The scheme of an input that opens with `<scheme>://`, if any.
///
/// Only a leading scheme counts; a `://` inside the path or query (as in
/// `example.com/login?next=https://...`) does not.
fn leading_scheme(input: &str) -> Option<&str> {
    let (scheme, _) = input.split_once("://")?;
    let mut chars = scheme.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());

    if starts_alpha && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        Some(scheme)
    } else {
        None
    }
}

/// Canonicalize a URL string before fetching it.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Prepend https:// unless the input starts with http:// or https://
///    (an explicit non-http scheme is rejected instead)
/// 3. Lowercase the host
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn canonicalize(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    if let Some(scheme) = leading_scheme(trimmed)
        && !has_http_scheme(trimmed)
    {
        return Err(UrlError::UnsupportedScheme(scheme.to_ascii_lowercase()));
    }

    let url_str = with_default_scheme(trimmed);

    let mut parsed = url::Url::parse(&url_str).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    let host = parsed.host_str().ok_or(UrlError::MissingHost)?.to_lowercase();
    parsed
        .set_host(Some(&host))
        .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    parsed.set_fragment(None);

    Ok(parsed)
}

/// Derive the cache key for a URL: its lowercase hostname.
///
/// Input without an `http://`/`https://` prefix is treated as if it had
/// `https://`. Returns `None` for anything that does not parse to a host.
pub fn extract_domain(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed = url::Url::parse(&with_default_scheme(trimmed)).ok()?;
    let host = parsed.host_str()?.trim_end_matches('.').to_lowercase();

    if host.is_empty() { None } else { Some(host) }
}
