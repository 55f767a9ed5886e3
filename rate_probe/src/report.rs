//! Console lines printed while probing. Kept on their own so the exact wording
//! lives in one place.

use std::io::Write;

use crate::error::TransportError;

pub fn write_status_line<W: Write>(out: &mut W, request: u32, status: u16) -> std::io::Result<()> {
    writeln!(out, "Request {request}: Status Code = {status}")
}

pub fn write_rate_limited<W: Write>(out: &mut W, body: &str) -> std::io::Result<()> {
    writeln!(out, "Rate limiter triggered!")?;
    writeln!(out, "Response: {body}")
}

pub fn write_transport_error<W: Write>(
    out: &mut W,
    request: u32,
    error: &TransportError,
) -> std::io::Result<()> {
    writeln!(out, "Request {request}: Transport error = {error}")
}
