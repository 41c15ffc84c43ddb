// SPDX-License-Identifier: GPL-2.0-only
use std::net::TcpStream;
use tracing::info;

/// Errors from the server reachability check.
#[derive(Debug)]
pub enum ReachabilityError {
    Unreachable {
        host: String,
        port: u16,
        source: std::io::Error,
    },
}

impl std::fmt::Display for ReachabilityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReachabilityError::Unreachable { host, port, source } => {
                write!(f, "server {host}:{port} is unreachable: {source}")
            }
        }
    }
}

impl std::error::Error for ReachabilityError {}

/// Verify that the controlling server accepts TCP connections.
///
/// Blocking connect with the OS-default timeout; name resolution failures
/// count as unreachable. No retry — the caller treats any error as fatal.
pub fn check_server_reachability(host: &str, port: u16) -> Result<(), ReachabilityError> {
    let stream = TcpStream::connect((host, port)).map_err(|e| ReachabilityError::Unreachable {
        host: host.to_string(),
        port,
        source: e,
    })?;
    drop(stream);
    info!(host, port, "server is reachable");
    Ok(())
}
