//! Icon provider descriptors.
//!
//! The provider list is ordered: the resolver walks it front to back and the
//! first provider that serves a fetchable resource wins.

use serde::{Deserialize, Serialize};

/// Placeholder substituted with the domain key in provider templates.
pub const DOMAIN_PLACEHOLDER: &str = "{domain}";

/// An external icon source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Provider {
    /// Short identifier used in logs and tool output.
    pub name: String,
    /// URL template containing `{domain}`.
    pub template: String,
    /// Nominal icon size this provider serves.
    pub size: String,
    /// Nominal image format this provider serves.
    pub format: String,
}

/// Built-in providers, highest visual quality first: (name, template, size, format).
const DEFAULT_PROVIDERS: &[(&str, &str, &str, &str)] = &[
    ("google", "https://www.google.com/s2/favicons?domain={domain}&sz=256", "256", "png"),
    ("icon-horse", "https://icon.horse/icon/{domain}", "128", "png"),
    ("apple-touch-icon", "https://{domain}/apple-touch-icon.png", "180", "png"),
    ("duckduckgo", "https://icons.duckduckgo.com/ip3/{domain}.ico", "64", "ico"),
    ("favicon-ico", "https://{domain}/favicon.ico", "32", "ico"),
];

impl Provider {
    pub fn new(
        name: impl Into<String>, template: impl Into<String>, size: impl Into<String>, format: impl Into<String>,
    ) -> Self {
        Self { name: name.into(), template: template.into(), size: size.into(), format: format.into() }
    }

    /// The built-in provider list in priority order.
    pub fn defaults() -> Vec<Provider> {
        DEFAULT_PROVIDERS
            .iter()
            .map(|(name, template, size, format)| Provider::new(*name, *template, *size, *format))
            .collect()
    }

    /// Expand the template for a domain key.
    pub fn url_for(&self, domain: &str) -> String {
        self.template.replace(DOMAIN_PLACEHOLDER, domain)
    }
}
