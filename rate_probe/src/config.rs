use std::fmt;
use std::time::Duration;

use clap::Parser;
use color_eyre::{Result, eyre::eyre};

use crate::types::{BearerToken, Target, TransportErrorPolicy};

pub const DEFAULT_TOTAL_REQUESTS: u32 = 150;
pub const DEFAULT_DELAY_MS: u64 = 100;
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Send a burst of sequential GET requests and report when the server starts answering 429.
#[derive(Debug, Clone, Parser)]
#[command(version, about, long_about = None)]
pub struct ProbeArgs {
    /// Endpoint to probe.
    #[arg(long = "url", env = "PROBE_TARGET_URL")]
    pub target_url: String,

    /// Sent as `Authorization: Bearer <token>`.
    #[arg(long = "token", env = "PROBE_BEARER_TOKEN", hide_env_values = true)]
    pub bearer_token: String,

    /// Upper bound on the number of requests.
    #[arg(long = "requests", env = "PROBE_TOTAL_REQUESTS", default_value_t = DEFAULT_TOTAL_REQUESTS)]
    pub total_requests: u32,

    /// Pause between two requests, in milliseconds.
    #[arg(long, env = "PROBE_DELAY_MS", default_value_t = DEFAULT_DELAY_MS)]
    pub delay_ms: u64,

    /// Per-request timeout, in seconds.
    #[arg(long, env = "PROBE_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    #[arg(long, env = "PROBE_ON_TRANSPORT_ERROR", value_enum, default_value_t = TransportErrorPolicy::Abort)]
    pub on_transport_error: TransportErrorPolicy,

    #[arg(long, env = "PROBE_PROXY_URL")]
    pub proxy_url: Option<String>,

    #[arg(long, env = "PROBE_PROXY_USER")]
    pub proxy_user: Option<String>,

    #[arg(long, env = "PROBE_PROXY_PASSWORD", hide_env_values = true)]
    pub proxy_password: Option<String>,

    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

#[derive(Clone)]
pub struct ProxyConfig {
    pub url: String,
    pub user: String,
    pub password: String,
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub target: Target,
    pub total_requests: u32,
    pub delay: Duration,
    pub request_timeout: Duration,
    pub on_transport_error: TransportErrorPolicy,
    pub proxy: Option<ProxyConfig>,
    pub log_level: String,
}

impl Config {
    /// Config with defaults for everything but the target.
    pub fn new(target: Target) -> Self {
        Self {
            target,
            total_requests: DEFAULT_TOTAL_REQUESTS,
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            on_transport_error: TransportErrorPolicy::default(),
            proxy: None,
            log_level: "info".to_string(),
        }
    }
}

impl TryFrom<ProbeArgs> for Config {
    type Error = color_eyre::Report;

    fn try_from(args: ProbeArgs) -> Result<Self> {
        if args.total_requests == 0 {
            return Err(eyre!("Number of requests must be at least 1"));
        }
        if args.timeout_secs == 0 {
            return Err(eyre!("Request timeout must be at least 1 second"));
        }

        let token = BearerToken::new(args.bearer_token)?;
        let target = Target::new(&args.target_url, token)?;

        let proxy = match (args.proxy_url, args.proxy_user, args.proxy_password) {
            (Some(url), Some(user), Some(password)) => {
                reqwest::Proxy::all(&url).map_err(|e| eyre!("Invalid proxy URL {url}: {e}"))?;
                Some(ProxyConfig {
                    url,
                    user,
                    password,
                })
            }
            (None, None, None) => None,
            _ => {
                return Err(eyre!(
                    "Proxy requires url, user and password to be set together"
                ));
            }
        };

        Ok(Self {
            target,
            total_requests: args.total_requests,
            delay: Duration::from_millis(args.delay_ms),
            request_timeout: Duration::from_secs(args.timeout_secs),
            on_transport_error: args.on_transport_error,
            proxy,
            log_level: args.log_level,
        })
    }
}
