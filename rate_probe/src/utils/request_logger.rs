use std::time::Instant;

use http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};
use tracing::{Instrument, field};

/// Wraps every probe request in a span carrying the target and, once known,
/// the status code and round trip time.
pub struct ProbeRequestLogger;

#[async_trait::async_trait]
impl Middleware for ProbeRequestLogger {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let span = tracing::debug_span!(
            "probe_request",
            method = %req.method(),
            url = %req.url(),
            host = req.url().host_str().unwrap_or("unknown"),
            status = field::Empty,
            elapsed_ms = field::Empty,
        );

        let started = Instant::now();
        let result = next.run(req, extensions).instrument(span.clone()).await;

        span.record("elapsed_ms", started.elapsed().as_millis() as u64);
        match &result {
            Ok(response) => {
                span.record("status", response.status().as_u16());
                span.in_scope(|| tracing::debug!("response received"));
            }
            Err(err) => span.in_scope(|| tracing::debug!("request failed: {err}")),
        }

        result
    }
}
