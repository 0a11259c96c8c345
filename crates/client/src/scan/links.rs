//! Declared icon discovery from `<link>` tags.

use scraper::{Html, Selector};
use url::Url;

use super::{CandidateKind, IconCandidate, UNKNOWN_SIZE};

/// Icons and the manifest reference declared in a page's markup.
#[derive(Debug, Clone, Default)]
pub struct DeclaredIcons {
    /// Icon links in document order. A URL declared twice appears twice.
    pub icons: Vec<IconCandidate>,
    /// First `rel="manifest"` link, resolved.
    pub manifest: Option<Url>,
}

/// Map a `rel` attribute to a candidate kind.
///
/// `rel` is a space-separated token list matched case-insensitively, so
/// `"shortcut icon"` and `"ICON"` are both plain icons.
fn classify(rel: &str) -> Option<CandidateKind> {
    let tokens: Vec<String> = rel.split_ascii_whitespace().map(str::to_ascii_lowercase).collect();

    if tokens
        .iter()
        .any(|t| t == "apple-touch-icon" || t == "apple-touch-icon-precomposed")
    {
        Some(CandidateKind::AppleTouchIcon)
    } else if tokens.iter().any(|t| t == "icon") {
        Some(CandidateKind::Icon)
    } else {
        None
    }
}

fn is_manifest(rel: &str) -> bool {
    rel.split_ascii_whitespace().any(|t| t.eq_ignore_ascii_case("manifest"))
}

/// Resolve `href` against `origin`; only http(s) results are usable.
fn resolve_href(origin: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let mut resolved = origin.join(href).ok()?;
    match resolved.scheme() {
        "http" | "https" => {
            resolved.set_fragment(None);
            Some(resolved)
        }
        _ => None,
    }
}

/// Extract icon and manifest links from an HTML document.
///
/// `origin` is the root of the page's final URL; every `href` is resolved
/// against it, which covers protocol-relative, root-relative and bare paths.
pub fn declared_icons(html: &str, origin: &Url) -> DeclaredIcons {
    let Ok(selector) = Selector::parse("link[rel][href]") else {
        return DeclaredIcons::default();
    };
    let document = Html::parse_document(html);

    let mut declared = DeclaredIcons::default();

    for element in document.select(&selector) {
        let el = element.value();
        let (Some(rel), Some(href)) = (el.attr("rel"), el.attr("href")) else {
            continue;
        };

        if is_manifest(rel) {
            if declared.manifest.is_none() {
                declared.manifest = resolve_href(origin, href);
            }
            continue;
        }

        let Some(kind) = classify(rel) else {
            continue;
        };
        let Some(url) = resolve_href(origin, href) else {
            continue;
        };

        let url = url.to_string();
        let size = el
            .attr("sizes")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_SIZE)
            .to_string();

        declared.icons.push(IconCandidate { url, size, kind });
    }

    declared
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    #[test]
    fn test_classify_rel_tokens() {
        assert_eq!(classify("icon"), Some(CandidateKind::Icon));
        assert_eq!(classify("Shortcut Icon"), Some(CandidateKind::Icon));
        assert_eq!(classify("apple-touch-icon"), Some(CandidateKind::AppleTouchIcon));
        assert_eq!(classify("apple-touch-icon-precomposed"), Some(CandidateKind::AppleTouchIcon));
        assert_eq!(classify("stylesheet"), None);
        assert_eq!(classify("mask-icon"), None);
    }

    #[test]
    fn test_declared_icons_resolution_forms() {
        let html = r#"
            <html><head>
                <link rel="icon" href="//cdn.example.net/a.png">
                <link rel="shortcut icon" href="/favicon.ico">
                <link rel="icon" href="img/b.svg" sizes="any">
                <link rel="icon" href="https://other.test/c.png" sizes="48x48">
            </head></html>
        "#;

        let declared = declared_icons(html, &origin());
        let urls: Vec<&str> = declared.icons.iter().map(|c| c.url.as_str()).collect();

        assert_eq!(
            urls,
            vec![
                "https://cdn.example.net/a.png",
                "https://example.com/favicon.ico",
                "https://example.com/img/b.svg",
                "https://other.test/c.png",
            ]
        );
        assert_eq!(declared.icons[0].size, "unknown");
        assert_eq!(declared.icons[2].size, "any");
        assert_eq!(declared.icons[3].size, "48x48");
        assert!(declared.manifest.is_none());
    }

    #[test]
    fn test_declared_icons_kinds_and_manifest() {
        let html = r#"
            <link rel="apple-touch-icon" sizes="180x180" href="/apple-touch-icon.png">
            <link rel="manifest" href="/site.webmanifest">
            <link rel="icon" type="image/png" href="/favicon-32x32.png" sizes="32x32">
        "#;

        let declared = declared_icons(html, &origin());

        assert_eq!(declared.icons.len(), 2);
        assert_eq!(declared.icons[0].kind, CandidateKind::AppleTouchIcon);
        assert_eq!(declared.icons[0].size, "180x180");
        assert_eq!(declared.icons[1].kind, CandidateKind::Icon);
        assert_eq!(declared.manifest.unwrap().as_str(), "https://example.com/site.webmanifest");
    }

    #[test]
    fn test_declared_icons_skips_unusable() {
        let html = r#"
            <link rel="icon" href="/favicon.ico">
            <link rel="icon" href="data:image/png;base64,AAAA">
            <link rel="icon" href="   ">
            <link rel="stylesheet" href="/style.css">
        "#;

        let declared = declared_icons(html, &origin());
        assert_eq!(declared.icons.len(), 1);
        assert_eq!(declared.icons[0].url, "https://example.com/favicon.ico");
    }

    #[test]
    fn test_declared_icons_keeps_repeated_href() {
        let html = r#"
            <link rel="icon" href="/a.png" sizes="16x16">
            <link rel="apple-touch-icon" href="/a.png" sizes="180x180">
        "#;

        let declared = declared_icons(html, &origin());
        assert_eq!(declared.icons.len(), 2);
        assert_eq!(declared.icons[0].kind, CandidateKind::Icon);
        assert_eq!(declared.icons[0].size, "16x16");
        assert_eq!(declared.icons[1].kind, CandidateKind::AppleTouchIcon);
        assert_eq!(declared.icons[1].size, "180x180");
        assert_eq!(declared.icons[0].url, declared.icons[1].url);
    }

    #[test]
    fn test_declared_icons_resolve_against_origin() {
        let page_origin = Url::parse("https://example.com/deep/page.html").unwrap().join("/").unwrap();
        let declared = declared_icons(r#"<link rel="icon" href="icon.png">"#, &page_origin);
        assert_eq!(declared.icons[0].url, "https://example.com/icon.png");
    }

    #[test]
    fn test_declared_icons_empty_document() {
        let declared = declared_icons("", &origin());
        assert!(declared.icons.is_empty());
        assert!(declared.manifest.is_none());
    }
}
