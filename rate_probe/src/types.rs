use color_eyre::{Result, eyre::eyre};
use http::{HeaderMap, HeaderValue, StatusCode, header::AUTHORIZATION};
use reqwest::Url;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::TransportError;

/// Opaque credential sent as `Authorization: Bearer <token>`.
/// Redacted in `Debug` and `Display` so it never reaches the logs.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(eyre!("Bearer token must not be empty"));
        }
        // reject anything that cannot travel in a header before the first request
        HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| eyre!("Bearer token contains characters not allowed in a header"))?;
        Ok(Self(token))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

impl fmt::Display for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Endpoint under test together with the credential used against it.
#[derive(Debug, Clone)]
pub struct Target {
    url: Url,
    token: BearerToken,
}

impl Target {
    pub fn new(url: &str, token: BearerToken) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() {
            return Err(eyre!("Target URL must not be empty"));
        }
        let url = Url::parse(url).map_err(|e| eyre!("Invalid target URL {url}: {e}"))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(eyre!("Unsupported URL scheme: {}", url.scheme()));
        }
        Ok(Self { url, token })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn token(&self) -> &BearerToken {
        &self.token
    }

    /// The fixed header set sent with every probe.
    pub fn headers(&self) -> Result<HeaderMap> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.token.expose()))?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }
}

/// What to do when a request cannot complete at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum TransportErrorPolicy {
    /// Stop the probe at the first transport failure.
    #[default]
    Abort,
    /// Report the failure, wait the usual delay and carry on.
    Skip,
}

/// Rate limit hints advertised by the server, both the legacy `X-RateLimit-*`
/// headers and the draft standard `RateLimit-*` ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitHeaders {
    pub limit: Option<u64>,
    pub remaining: Option<u64>,
    pub reset_secs: Option<u64>,
    pub retry_after_secs: Option<u64>,
}

impl RateLimitHeaders {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            limit: first_numeric(headers, &["ratelimit-limit", "x-ratelimit-limit"]),
            remaining: first_numeric(headers, &["ratelimit-remaining", "x-ratelimit-remaining"]),
            reset_secs: first_numeric(headers, &["ratelimit-reset", "x-ratelimit-reset"]),
            retry_after_secs: first_numeric(headers, &["retry-after"]),
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn first_numeric(headers: &HeaderMap, names: &[&str]) -> Option<u64> {
    names.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    })
}

/// A completed request: any status code, body fully read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: StatusCode,
    pub body: String,
    pub rate_limit: RateLimitHeaders,
}

impl ProbeResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            rate_limit: RateLimitHeaders::default(),
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == StatusCode::TOO_MANY_REQUESTS
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Every request was sent and none came back 429.
    Exhausted,
    RateLimited { request: u32, body: String },
    TransportFailed { request: u32, error: TransportError },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub requests_sent: u32,
    pub status_counts: BTreeMap<u16, u32>,
    pub skipped_failures: u32,
    pub outcome: ProbeOutcome,
}

impl ProbeReport {
    pub const EXIT_COMPLETED: u8 = 0;
    pub const EXIT_RATE_LIMITED: u8 = 1;
    pub const EXIT_TRANSPORT_FAILURE: u8 = 2;

    pub fn rate_limit_detected(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::RateLimited { .. })
    }

    pub fn exit_status(&self) -> u8 {
        match self.outcome {
            ProbeOutcome::Exhausted => Self::EXIT_COMPLETED,
            ProbeOutcome::RateLimited { .. } => Self::EXIT_RATE_LIMITED,
            ProbeOutcome::TransportFailed { .. } => Self::EXIT_TRANSPORT_FAILURE,
        }
    }
}
