use std::process::ExitCode;

use clap::Parser;
use color_eyre::Result;
use rate_probe::ProbeArgs;
use rate_probe::app::{EXIT_INVALID_CONFIG, run_app};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    color_eyre::install()?;

    let args = match ProbeArgs::try_parse() {
        Ok(args) => args,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            e.print().ok();
            return Ok(ExitCode::from(EXIT_INVALID_CONFIG));
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new(args.log_level.clone())),
        )
        .with_writer(std::io::stderr)
        .init();

    let status = run_app(args, &mut std::io::stdout()).await;

    Ok(ExitCode::from(status))
}
