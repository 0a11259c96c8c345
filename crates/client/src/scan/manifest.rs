//! Web app manifest icon entries.

use serde::Deserialize;
use url::Url;

use icondex_core::Error;

use super::{CandidateKind, IconCandidate, UNKNOWN_SIZE};

/// The subset of a web app manifest that carries icons.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebManifest {
    #[serde(default)]
    pub icons: Vec<ManifestIcon>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManifestIcon {
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default)]
    pub sizes: Option<String>,
    #[serde(default, rename = "type")]
    pub mime_type: Option<String>,
}

/// Parse a manifest document.
pub fn parse_manifest(body: &str) -> Result<WebManifest, Error> {
    serde_json::from_str(body).map_err(|e| Error::ManifestInvalid(e.to_string()))
}

impl WebManifest {
    /// Icon candidates with `src` resolved against the manifest's own URL.
    ///
    /// Entries without a usable `src` are skipped.
    pub fn candidates(&self, manifest_url: &Url) -> Vec<IconCandidate> {
        self.icons
            .iter()
            .filter_map(|icon| {
                let src = icon.src.as_deref()?.trim();
                if src.is_empty() {
                    return None;
                }
                let url = manifest_url.join(src).ok()?;
                if !matches!(url.scheme(), "http" | "https") {
                    return None;
                }

                let size = icon
                    .sizes
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .unwrap_or(UNKNOWN_SIZE);

                Some(IconCandidate { url: url.to_string(), size: size.to_string(), kind: CandidateKind::Manifest })
            })
            .collect()
    }
}
