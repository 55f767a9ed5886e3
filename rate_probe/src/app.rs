use std::io::Write;

use tracing::{error, info};

use crate::config::{Config, ProbeArgs};
use crate::http_client::ReqwestHttpClient;
use crate::probe_runner::ProbeRunner;

pub const EXIT_INVALID_CONFIG: u8 = 3;
/// Client construction or writing the observations failed.
pub const EXIT_RUNTIME_FAILURE: u8 = 4;

/// Validate `args`, run the probe against stdout-like `out` and return the
/// process exit status.
///
/// 0 and 1 are reserved for "no 429" and "rate limiter detected", 2 for an
/// aborted probe, so every other failure maps to its own code here.
pub async fn run_app<W: Write>(args: ProbeArgs, out: &mut W) -> u8 {
    let config = match Config::try_from(args) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {e}");
            return EXIT_INVALID_CONFIG;
        }
    };

    let client = match ReqwestHttpClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build HTTP client: {e:#}");
            return EXIT_RUNTIME_FAILURE;
        }
    };

    let report = match ProbeRunner::new(client, &config).run(out).await {
        Ok(report) => report,
        Err(e) => {
            error!("Probe interrupted: {e:#}");
            return EXIT_RUNTIME_FAILURE;
        }
    };

    info!(
        "Probe finished: {} requests sent, status counts {:?}, {} skipped failures",
        report.requests_sent, report.status_counts, report.skipped_failures
    );

    report.exit_status()
}
