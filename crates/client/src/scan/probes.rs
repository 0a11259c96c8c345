//! Conventional icon path probing.

use std::collections::HashSet;
use std::time::Duration;

use tokio::task::JoinSet;
use url::Url;

use super::{CandidateKind, IconCandidate};
use crate::fetch::{FetchOptions, TimedFetcher};

/// Well-known icon locations with their nominal sizes, in probe order.
pub const CONVENTIONAL_PATHS: [(&str, &str); 15] = [
    ("/favicon.ico", "32x32"),
    ("/favicon.png", "32x32"),
    ("/favicon.svg", "any"),
    ("/favicon-16x16.png", "16x16"),
    ("/favicon-32x32.png", "32x32"),
    ("/favicon-96x96.png", "96x96"),
    ("/apple-touch-icon.png", "180x180"),
    ("/apple-touch-icon-precomposed.png", "180x180"),
    ("/apple-touch-icon-180x180.png", "180x180"),
    ("/apple-touch-icon-152x152.png", "152x152"),
    ("/android-chrome-192x192.png", "192x192"),
    ("/android-chrome-512x512.png", "512x512"),
    ("/mstile-150x150.png", "150x150"),
    ("/icon.png", "unknown"),
    ("/logo.png", "unknown"),
];

/// A conventional path that still needs probing.
#[derive(Debug, Clone)]
pub struct Probe {
    pub url: Url,
    pub size: &'static str,
}

/// Conventional paths under `origin` whose URL is not already in `known`.
pub fn pending_probes(origin: &Url, known: &[IconCandidate]) -> Vec<Probe> {
    let known: HashSet<&str> = known.iter().map(|c| c.url.as_str()).collect();

    CONVENTIONAL_PATHS
        .iter()
        .filter_map(|&(path, size)| {
            let url = origin.join(path).ok()?;
            if known.contains(url.as_str()) { None } else { Some(Probe { url, size }) }
        })
        .collect()
}

/// Probe every path at once and keep those answering `200`, in list order.
///
/// Total time is bounded by the slowest single probe, not the sum.
pub async fn probe_all(fetcher: &TimedFetcher, probes: Vec<Probe>, timeout: Duration) -> Vec<IconCandidate> {
    let options = FetchOptions::exists(timeout);
    let mut join_set = JoinSet::new();

    for (index, probe) in probes.into_iter().enumerate() {
        let fetcher = fetcher.clone();
        let options = options.clone();

        join_set.spawn(async move {
            match fetcher.fetch(&probe.url, &options).await {
                Ok(_) => Some((index, probe)),
                Err(failure) => {
                    tracing::debug!(url = %probe.url, reason = %failure, "probe missed");
                    None
                }
            }
        });
    }

    let mut confirmed = Vec::new();
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok(Some(hit)) => confirmed.push(hit),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "probe task failed"),
        }
    }

    confirmed.sort_by_key(|(index, _)| *index);
    confirmed
        .into_iter()
        .map(|(_, probe)| IconCandidate {
            url: probe.url.to_string(),
            size: probe.size.to_string(),
            kind: CandidateKind::Probed,
        })
        .collect()
}
