//! Timed HTTP fetcher with manual redirect handling and SSRF protection.
//!
//! ### Outcome classification
//! - `200 OK` is the only success. Existence checks drop the response without
//!   reading the body; content fetches read it up to `max_bytes`.
//! - `3xx` with `Location` is followed by hand. Every hop gets a fresh timer,
//!   so total latency is bounded by `timeout * (max_redirects + 1)`.
//! - Anything else (status, transport error, expired timer) is a
//!   [`FetchFailure`]. Callers never see a panic or a raw transport error.
//!
//! ### Safety gates
//! - Only `http`/`https`.
//! - Unless `allow_private_hosts` is set, hosts that are or resolve to
//!   private/reserved addresses are refused before connecting.
//! - Max redirects: 5 (configurable).

pub mod ssrf;
pub mod url;

use bytes::Bytes;
use reqwest::Url;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};

pub use self::url::{UrlError, canonicalize, extract_domain};
pub use ssrf::{SsrfError, check_url, validate_ip};

use icondex_core::{AppConfig, Error};

/// Configuration for the timed fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Default user agent string (default: "icondex/0.1")
    pub user_agent: String,

    /// Maximum body size read in content mode (default: 5MB)
    pub max_bytes: usize,

    /// Maximum number of redirect hops to follow (default: 5)
    pub max_redirects: usize,

    /// TCP connect timeout, independent of the per-call timer (default: 5s)
    pub connect_timeout: Duration,

    /// Skip the private-address check (default: false)
    pub allow_private_hosts: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "icondex/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            max_redirects: 5,
            connect_timeout: Duration::from_secs(5),
            allow_private_hosts: false,
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            max_redirects: config.max_redirects,
            allow_private_hosts: config.allow_private_hosts,
            ..Default::default()
        }
    }
}

/// Whether the caller needs the body or only proof that the resource exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    Exists,
    Content,
}

/// Per-call options.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Timer applied to each hop separately.
    pub timeout: Duration,
    pub mode: FetchMode,
    /// Extra request headers; these win over client defaults.
    pub headers: HeaderMap,
}

impl FetchOptions {
    pub fn exists(timeout: Duration) -> Self {
        Self { timeout, mode: FetchMode::Exists, headers: HeaderMap::new() }
    }

    pub fn content(timeout: Duration) -> Self {
        Self { timeout, mode: FetchMode::Content, headers: HeaderMap::new() }
    }

    /// Override the User-Agent for this call. Invalid header values are ignored.
    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(user_agent) {
            self.headers.insert(header::USER_AGENT, value);
        }
        self
    }

    pub fn with_accept(mut self, accept: &'static str) -> Self {
        self.headers.insert(header::ACCEPT, HeaderValue::from_static(accept));
        self
    }
}

/// A successful fetch.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// The URL originally requested
    pub url: Url,
    /// The URL that answered 200 after redirects
    pub final_url: Url,
    pub status: StatusCode,
    pub content_type: Option<String>,
    /// Body bytes, only in content mode
    pub body: Option<Bytes>,
    /// Number of redirect hops followed
    pub redirects: usize,
    /// Wall time across all hops in milliseconds
    pub fetch_ms: u64,
}

impl FetchOutcome {
    /// Body decoded as UTF-8, lossily. Empty in existence mode.
    pub fn text(&self) -> String {
        self.body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .unwrap_or_default()
    }
}

/// Why a fetch did not succeed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchFailure {
    /// The per-hop timer expired.
    #[error("Timeout")]
    Timeout,

    /// The transport reported a timeout (e.g. connect timeout).
    #[error("Socket timeout")]
    SocketTimeout,

    #[error("HTTP {0}")]
    Status(u16),

    #[error("HTTP {0} without Location header")]
    MissingLocation(u16),

    #[error("invalid redirect target: {0}")]
    InvalidRedirect(String),

    #[error("too many redirects (limit {0})")]
    TooManyRedirects(usize),

    #[error("{0} bytes exceeds {1}")]
    TooLarge(usize, usize),

    #[error(transparent)]
    Blocked(#[from] SsrfError),

    #[error("{0}")]
    Transport(String),
}

impl From<reqwest::Error> for FetchFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { FetchFailure::SocketTimeout } else { FetchFailure::Transport(err.to_string()) }
    }
}

impl From<FetchFailure> for Error {
    fn from(err: FetchFailure) -> Self {
        match err {
            FetchFailure::Blocked(e) => Error::SsrfBlocked(e.to_string()),
            other => Error::FetchFailed(other.to_string()),
        }
    }
}

/// Result of a single request, before redirect handling.
enum Hop {
    Done { status: StatusCode, content_type: Option<String>, body: Option<Bytes> },
    Redirect(Url),
}

/// HTTP GET with a hard per-hop timeout.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct TimedFetcher {
    http: Client,
    config: FetchConfig,
}

impl TimedFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(config.connect_timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::ClientBuild(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Fetch `url`, following redirects.
    ///
    /// A timed-out hop is dropped mid-flight, which closes its connection.
    pub async fn fetch(&self, url: &Url, options: &FetchOptions) -> Result<FetchOutcome, FetchFailure> {
        let start = Instant::now();
        let mut current = url.clone();
        let mut redirects = 0;

        loop {
            let hop = tokio::time::timeout(options.timeout, self.fetch_hop(&current, options))
                .await
                .map_err(|_| FetchFailure::Timeout)??;

            match hop {
                Hop::Done { status, content_type, body } => {
                    let fetch_ms = start.elapsed().as_millis() as u64;
                    tracing::debug!(
                        "fetched {} -> {} in {}ms ({} redirects, {} bytes)",
                        url,
                        current,
                        fetch_ms,
                        redirects,
                        body.as_ref().map(Bytes::len).unwrap_or(0)
                    );
                    return Ok(FetchOutcome {
                        url: url.clone(),
                        final_url: current,
                        status,
                        content_type,
                        body,
                        redirects,
                        fetch_ms,
                    });
                }
                Hop::Redirect(next) => {
                    if redirects >= self.config.max_redirects {
                        return Err(FetchFailure::TooManyRedirects(self.config.max_redirects));
                    }
                    redirects += 1;
                    tracing::debug!("redirect {} -> {}", current, next);
                    current = next;
                }
            }
        }
    }

    async fn fetch_hop(&self, url: &Url, options: &FetchOptions) -> Result<Hop, FetchFailure> {
        if !self.config.allow_private_hosts {
            check_url(url).await?;
        }

        let response = self
            .http
            .get(url.clone())
            .headers(options.headers.clone())
            .send()
            .await?;

        let status = response.status();

        if status.is_redirection() {
            let location = response
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            drop(response);

            let location = location.ok_or(FetchFailure::MissingLocation(status.as_u16()))?;
            let next = url
                .join(&location)
                .map_err(|e| FetchFailure::InvalidRedirect(format!("{location}: {e}")))?;
            return Ok(Hop::Redirect(next));
        }

        if status != StatusCode::OK {
            return Err(FetchFailure::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        if options.mode == FetchMode::Exists {
            drop(response);
            return Ok(Hop::Done { status, content_type, body: None });
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(FetchFailure::TooLarge(len as usize, self.config.max_bytes));
        }

        let bytes = response.bytes().await?;
        if bytes.len() > self.config.max_bytes {
            return Err(FetchFailure::TooLarge(bytes.len(), self.config.max_bytes));
        }

        Ok(Hop::Done { status, content_type, body: Some(bytes) })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}
