use log::debug;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::errors::CoreError;
use super::traits::ConnectivityProbe;

/// Probes reachability by opening (and immediately dropping) a TCP
/// connection to the holdings host.
///
/// Blocking: DNS resolution plus at most `timeout` per resolved address.
/// Callers on an async runtime should run it on a blocking worker.
#[derive(Debug, Clone)]
pub struct TcpConnectivityProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpConnectivityProbe {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    /// Target the host and port of an http(s) endpoint URL.
    pub fn for_endpoint(endpoint_url: &str, timeout: Duration) -> Result<Self, CoreError> {
        let url = reqwest::Url::parse(endpoint_url).map_err(|e| {
            CoreError::ValidationError(format!("Invalid endpoint URL '{endpoint_url}': {e}"))
        })?;
        let host = url
            .host_str()
            .ok_or_else(|| CoreError::ValidationError(format!("Endpoint URL '{endpoint_url}' has no host")))?
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string();
        let port = url.port_or_known_default().ok_or_else(|| {
            CoreError::ValidationError(format!("Endpoint URL '{endpoint_url}' has no port"))
        })?;
        Ok(Self::new(host, port, timeout))
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl ConnectivityProbe for TcpConnectivityProbe {
    fn is_available(&self) -> bool {
        let addrs = match (self.host.as_str(), self.port).to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(e) => {
                debug!("Connectivity probe could not resolve {}: {e}", self.host);
                return false;
            }
        };

        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(_) => return true,
                Err(e) => debug!("Connectivity probe to {addr} failed: {e}"),
            }
        }
        false
    }
}

/// Connectivity flag driven by the host platform.
///
/// Mobile shells already receive network callbacks from the OS; they flip
/// this flag instead of letting the core open sockets.
#[derive(Debug)]
pub struct ManualConnectivity {
    available: AtomicBool,
}

impl ManualConnectivity {
    pub fn new(available: bool) -> Self {
        Self {
            available: AtomicBool::new(available),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

impl Default for ManualConnectivity {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConnectivityProbe for ManualConnectivity {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}
