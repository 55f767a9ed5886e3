use std::error::Error as StdError;

use thiserror::Error;

/// Failure to complete a single probe request at the transport level.
///
/// HTTP status codes never end up here, a 500 or a 429 is a completed
/// request as far as the probe is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let msg = error_chain(&err);
        if err.is_timeout() {
            TransportError::Timeout(msg)
        } else if err.is_connect() {
            TransportError::Connect(msg)
        } else if err.is_body() || err.is_decode() {
            TransportError::Body(msg)
        } else {
            TransportError::Request(msg)
        }
    }
}

impl From<reqwest_middleware::Error> for TransportError {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(err) => err.into(),
            reqwest_middleware::Error::Middleware(err) => {
                TransportError::Request(error_chain(err.as_ref()))
            }
        }
    }
}

/// Top-level message followed by every distinct cause, `: ` separated.
/// reqwest keeps the interesting part (refused, DNS, TLS) in the sources.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut msg = err.to_string();
    let mut last = msg.clone();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_msg = cause.to_string();
        if cause_msg != last && !msg.ends_with(&cause_msg) {
            msg.push_str(": ");
            msg.push_str(&cause_msg);
        }
        last = cause_msg;
        source = cause.source();
    }
    msg
}
