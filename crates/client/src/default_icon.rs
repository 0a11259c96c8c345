//! Built-in fallback icon.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::sync::LazyLock;

/// Size label stored for cached fallback icons.
pub const DEFAULT_ICON_SIZE: &str = "default";

/// Format label stored for cached fallback icons.
pub const DEFAULT_ICON_FORMAT: &str = "svg";

/// Bookmark glyph on a neutral tile.
pub const DEFAULT_ICON_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="64" height="64" viewBox="0 0 64 64"><rect width="64" height="64" rx="12" fill="#e2e8f0"/><path d="M20 14h24a2 2 0 0 1 2 2v34l-14-9-14 9V16a2 2 0 0 1 2-2z" fill="#64748b"/></svg>"##;

static DEFAULT_ICON: LazyLock<String> =
    LazyLock::new(|| format!("data:image/svg+xml;base64,{}", STANDARD.encode(DEFAULT_ICON_SVG)));

/// The fallback icon as a self-contained data URI.
pub fn default_icon() -> &'static str {
    DEFAULT_ICON.as_str()
}
