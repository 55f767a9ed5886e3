// lib exports for integration testing
// the binary only wires config, logging and stdout around these
pub mod app;
pub mod config;
pub mod error;
pub mod http_client;
pub mod probe_runner;
pub mod report;
pub mod types;
pub mod utils;

pub use config::{Config, ProbeArgs};
pub use error::TransportError;
pub use http_client::{HttpClient, ReqwestHttpClient};
pub use probe_runner::ProbeRunner;
pub use types::{ProbeOutcome, ProbeReport, TransportErrorPolicy};
