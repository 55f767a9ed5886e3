use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;

use color_eyre::Result;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::http_client::HttpClient;
use crate::report::{write_rate_limited, write_status_line, write_transport_error};
use crate::types::{ProbeOutcome, ProbeReport, Target, TransportErrorPolicy};

/// Sends up to `total_requests` sequential GETs to one target and stops at the
/// first 429.
pub struct ProbeRunner<C> {
    client: C,
    target: Target,
    total_requests: u32,
    delay: Duration,
    on_transport_error: TransportErrorPolicy,
}

impl<C: HttpClient> ProbeRunner<C> {
    pub fn new(client: C, config: &Config) -> Self {
        Self {
            client,
            target: config.target.clone(),
            total_requests: config.total_requests,
            delay: config.delay,
            on_transport_error: config.on_transport_error,
        }
    }

    /// Run the probe, printing one observation per request to `out`.
    ///
    /// Only failures to write to `out` (or to build the header set) are
    /// returned as errors. A 429 or a transport failure ends the run with the
    /// matching [`ProbeOutcome`].
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<ProbeReport> {
        let headers = self.target.headers()?;
        let url = self.target.url();

        let mut status_counts: BTreeMap<u16, u32> = BTreeMap::new();
        let mut skipped_failures = 0;

        info!(
            "Probing {url} with up to {} requests, {:?} apart",
            self.total_requests, self.delay
        );

        for request in 1..=self.total_requests {
            match self.client.get(url, &headers).await {
                Ok(response) => {
                    let status = response.status.as_u16();
                    write_status_line(out, request, status)?;
                    *status_counts.entry(status).or_default() += 1;

                    if !response.rate_limit.is_empty() {
                        debug!(request, rate_limit = ?response.rate_limit, "rate limit headers");
                    }

                    if response.is_rate_limited() {
                        write_rate_limited(out, &response.body)?;
                        info!(
                            request,
                            retry_after_secs = ?response.rate_limit.retry_after_secs,
                            limit = ?response.rate_limit.limit,
                            "Rate limiter triggered"
                        );

                        return Ok(ProbeReport {
                            requests_sent: request,
                            status_counts,
                            skipped_failures,
                            outcome: ProbeOutcome::RateLimited {
                                request,
                                body: response.body,
                            },
                        });
                    }
                }
                Err(err) => {
                    write_transport_error(out, request, &err)?;

                    match self.on_transport_error {
                        TransportErrorPolicy::Abort => {
                            error!(request, "Aborting probe: {err}");
                            return Ok(ProbeReport {
                                requests_sent: request,
                                status_counts,
                                skipped_failures,
                                outcome: ProbeOutcome::TransportFailed {
                                    request,
                                    error: err,
                                },
                            });
                        }
                        TransportErrorPolicy::Skip => {
                            warn!(request, "Skipping failed request: {err}");
                            skipped_failures += 1;
                        }
                    }
                }
            }

            if request < self.total_requests && !self.delay.is_zero() {
                sleep(self.delay).await;
            }
        }

        info!(
            "No rate limiting observed after {} requests",
            self.total_requests
        );

        Ok(ProbeReport {
            requests_sent: self.total_requests,
            status_counts,
            skipped_failures,
            outcome: ProbeOutcome::Exhausted,
        })
    }
}
