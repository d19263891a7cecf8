//! HTTP Client
//!
//! Opens a fresh connection for every request against a fixed base URL.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::Config;
use crate::error::{ProbeError, Result};
use super::connection::Connection;
use super::message::{HttpRequest, HttpResponse};
use super::url::BaseUrl;

/// Blocking HTTP/1.1 client bound to one base URL
#[derive(Debug, Clone)]
pub struct HttpClient {
    base: BaseUrl,

    /// Connect timeout (milliseconds, 0 = OS default)
    connect_timeout_ms: u64,

    /// Read timeout (milliseconds, 0 = none)
    read_timeout_ms: u64,

    /// Write timeout (milliseconds, 0 = none)
    write_timeout_ms: u64,
}

impl HttpClient {
    /// Client for `base` without explicit timeouts
    pub fn new(base: BaseUrl) -> Self {
        Self {
            base,
            connect_timeout_ms: 0,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
        }
    }

    /// Client for the base URL and timeouts in `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let base = BaseUrl::parse(&config.base_url)?;
        Ok(Self {
            base,
            connect_timeout_ms: config.connect_timeout_ms,
            read_timeout_ms: config.read_timeout_ms,
            write_timeout_ms: config.write_timeout_ms,
        })
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.base
    }

    /// `GET path?query`
    pub fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<HttpResponse> {
        let request = HttpRequest::get(self.base.target(path, query));
        self.execute(&request)
    }

    /// `POST path` with a body of the given content type
    pub fn post(&self, path: &str, content_type: &str, body: Vec<u8>) -> Result<HttpResponse> {
        let request = HttpRequest::post(self.base.target(path, &[]), content_type, body);
        self.execute(&request)
    }

    /// Send a prepared request on a new connection
    pub fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let stream = self.connect()?;
        let mut connection = Connection::new(stream, self.base.host_header())?;
        connection.set_timeouts(self.read_timeout_ms, self.write_timeout_ms)?;
        connection.round_trip(request)
    }

    fn connect(&self) -> Result<TcpStream> {
        let addrs: Vec<SocketAddr> = (self.base.host(), self.base.port())
            .to_socket_addrs()
            .map_err(|e| {
                ProbeError::Network(format!(
                    "failed to resolve {}:{}: {}",
                    self.base.host(),
                    self.base.port(),
                    e
                ))
            })?
            .collect();

        if addrs.is_empty() {
            return Err(ProbeError::Network(format!(
                "no addresses found for {}",
                self.base.host()
            )));
        }

        if self.connect_timeout_ms == 0 {
            return Ok(TcpStream::connect(&addrs[..])?);
        }

        let timeout = Duration::from_millis(self.connect_timeout_ms);
        let mut last_err = None;
        for addr in &addrs {
            match TcpStream::connect_timeout(addr, timeout) {
                Ok(stream) => return Ok(stream),
                Err(e) => {
                    tracing::debug!("Connect to {} failed: {}", addr, e);
                    last_err = Some(e);
                }
            }
        }

        Err(match last_err {
            Some(e) => ProbeError::Io(e),
            None => ProbeError::Network(format!("could not connect to {}", self.base)),
        })
    }
}
