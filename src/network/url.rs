//! Base URL parsing and query encoding

use std::fmt;

use crate::error::{ProbeError, Result};

/// Parsed `http://host[:port][/prefix]` base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl {
    host: String,
    port: u16,
    prefix: String,
}

impl BaseUrl {
    const DEFAULT_PORT: u16 = 80;

    /// Parse a base URL. A missing scheme is treated as `http`.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let rest = match input.split_once("://") {
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case("http") => rest,
            Some((scheme, _)) => {
                return Err(ProbeError::Config(format!(
                    "unsupported URL scheme '{}' in '{}' (only http is supported)",
                    scheme, input
                )))
            }
            None => input,
        };

        let (authority, path) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };

        let (host, port) = Self::split_authority(authority)
            .ok_or_else(|| ProbeError::Config(format!("invalid URL authority in '{}'", input)))?;

        if host.is_empty() {
            return Err(ProbeError::Config(format!("missing host in '{}'", input)));
        }

        Ok(Self {
            host: host.to_string(),
            port,
            prefix: path.trim_end_matches('/').to_string(),
        })
    }

    fn split_authority(authority: &str) -> Option<(&str, u16)> {
        // IPv6 literal: [::1]:8080
        if let Some(rest) = authority.strip_prefix('[') {
            let (host, after) = rest.split_once(']')?;
            return match after.strip_prefix(':') {
                Some(port) => Some((host, port.parse().ok()?)),
                None if after.is_empty() => Some((host, Self::DEFAULT_PORT)),
                None => None,
            };
        }

        match authority.rsplit_once(':') {
            // Unbracketed IPv6 literal
            Some((host, _)) if host.contains(':') => None,
            Some((host, port)) => Some((host, port.parse().ok()?)),
            None => Some((authority, Self::DEFAULT_PORT)),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Value of the `Host` request header
    pub fn host_header(&self) -> String {
        let host = if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        if self.port == Self::DEFAULT_PORT {
            host
        } else {
            format!("{}:{}", host, self.port)
        }
    }

    /// Request target for `path` under this base, with an encoded query
    pub fn target(&self, path: &str, query: &[(&str, &str)]) -> String {
        let mut target = self.prefix.clone();
        if !path.starts_with('/') {
            target.push('/');
        }
        target.push_str(path);

        if !query.is_empty() {
            let pairs: Vec<String> = query
                .iter()
                .map(|(k, v)| {
                    format!("{}={}", encode_query_component(k), encode_query_component(v))
                })
                .collect();
            target.push('?');
            target.push_str(&pairs.join("&"));
        }

        target
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "http://{}{}", self.host_header(), self.prefix)
    }
}

/// Form-encode a query component: unreserved bytes pass through, space
/// becomes `+`, everything else is percent-encoded byte by byte.
pub fn encode_query_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for &b in input.as_bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}
