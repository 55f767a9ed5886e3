#![allow(dead_code)]

use std::time::Duration;

use rate_probe::types::{BearerToken, Target};
use rate_probe::{Config, ProbeReport, ProbeRunner, ReqwestHttpClient};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::test_constants::*;

/// URL on a local port nothing listens on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}{TEST_PATH}")
}

/// A mocked rate limited REST endpoint.
pub struct MockTarget {
    pub server: MockServer,
}

impl MockTarget {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn url(&self) -> String {
        format!("{}{TEST_PATH}", self.server.uri())
    }

    pub fn config(&self, total_requests: u32) -> Config {
        let token = BearerToken::new(TEST_TOKEN).unwrap();
        let target = Target::new(&self.url(), token).unwrap();
        Config {
            total_requests,
            delay: Duration::from_millis(1),
            ..Config::new(target)
        }
    }

    fn authorized_get() -> wiremock::MockBuilder {
        Mock::given(method("GET"))
            .and(path(TEST_PATH))
            .and(header("Authorization", format!("Bearer {TEST_TOKEN}").as_str()))
    }

    /// Answer `status` to the next `times` requests. Mounted mocks are matched
    /// in order, so calls stack up into a response sequence.
    pub async fn respond_times(&self, status: u16, times: u64) {
        Self::authorized_get()
            .respond_with(ResponseTemplate::new(status).set_body_string("ok"))
            .up_to_n_times(times)
            .mount(&self.server)
            .await;
    }

    pub async fn respond_always(&self, status: u16) {
        Self::authorized_get()
            .respond_with(ResponseTemplate::new(status).set_body_string("ok"))
            .mount(&self.server)
            .await;
    }

    /// Express-rate-limit style rejection.
    pub async fn rate_limit_always(&self) {
        Self::authorized_get()
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("Retry-After", "900")
                    .insert_header("X-RateLimit-Limit", "100")
                    .insert_header("X-RateLimit-Remaining", "0")
                    .set_body_string(RATE_LIMIT_MESSAGE),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or_default()
    }

    /// Probe this target with the real HTTP client and collect stdout lines.
    pub async fn probe(&self, config: &Config) -> (ProbeReport, Vec<String>) {
        let client = ReqwestHttpClient::new(config).unwrap();
        let mut out = Vec::new();
        let report = ProbeRunner::new(client, config)
            .run(&mut out)
            .await
            .unwrap();
        let lines = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        (report, lines)
    }
}
