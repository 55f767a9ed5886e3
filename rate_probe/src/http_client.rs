use async_trait::async_trait;
use color_eyre::Result;
use http::HeaderMap;
use reqwest::{Client, Proxy, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use tracing::debug;

use crate::config::Config;
use crate::error::TransportError;
use crate::types::{ProbeResponse, RateLimitHeaders};
use crate::utils::ProbeRequestLogger;

/// The one network capability the probe needs.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Send a GET and read the whole body. Any status code is a successful call.
    async fn get(&self, url: &Url, headers: &HeaderMap) -> Result<ProbeResponse, TransportError>;
}

pub fn build_client(config: &Config) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder().timeout(config.request_timeout);

    if let Some(proxy) = &config.proxy {
        let proxy = (Proxy::all(&proxy.url))?.basic_auth(&proxy.user, &proxy.password);
        builder = builder.proxy(proxy);
    }

    builder.build()
}

#[derive(Clone)]
pub struct ReqwestHttpClient {
    client: ClientWithMiddleware,
}

impl ReqwestHttpClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = ClientBuilder::new(build_client(config)?)
            .with(ProbeRequestLogger)
            .build();

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &Url, headers: &HeaderMap) -> Result<ProbeResponse, TransportError> {
        let response = self
            .client
            .get(url.clone())
            .headers(headers.clone())
            .send()
            .await?;

        let status = response.status();
        let rate_limit = RateLimitHeaders::from_headers(response.headers());
        let body = response.text().await?;

        debug!("GET {url} -> {} ({} bytes)", status.as_u16(), body.len());

        Ok(ProbeResponse {
            status,
            body,
            rate_limit,
        })
    }
}
