//! Connection Handler
//!
//! Writes one request and reads one response over a TCP stream.

use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use crate::error::{ProbeError, Result};
use super::message::{HttpRequest, HttpResponse};

/// Maximum size of the status line plus headers (64 KB)
pub const MAX_HEADER_BYTES: usize = 64 * 1024;

/// Maximum number of response header lines
pub const MAX_HEADER_LINES: usize = 100;

/// Maximum response body size (16 MB)
pub const MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

/// A single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Value sent in the `Host` header
    host_header: String,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Wrap an established stream
    pub fn new(stream: TcpStream, host_header: impl Into<String>) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            host_header: host_header.into(),
            peer_addr,
        })
    }

    /// Configure socket timeouts; 0 leaves the OS default in place
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let read_stream = self.reader.get_ref();
        let write_stream = self.writer.get_ref();

        if read_ms > 0 {
            read_stream.set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            write_stream.set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Send `request` and wait for the complete response
    pub fn round_trip(&mut self, request: &HttpRequest) -> Result<HttpResponse> {
        self.send_request(request)?;
        let response = self.read_response()?;
        tracing::debug!(
            "{} {} -> {} {} ({} bytes) from {}",
            request.method,
            request.target,
            response.status,
            response.reason,
            response.body.len(),
            self.peer_addr
        );
        Ok(response)
    }

    /// Write the request head and body
    pub fn send_request(&mut self, request: &HttpRequest) -> Result<()> {
        let w = &mut self.writer;

        write!(w, "{} {} HTTP/1.1\r\n", request.method, request.target)?;
        write!(w, "Host: {}\r\n", self.host_header)?;
        write!(w, "User-Agent: raftkv-probe/{}\r\n", crate::VERSION)?;
        write!(w, "Accept: */*\r\n")?;
        write!(w, "Connection: close\r\n")?;

        let mut has_length = false;
        for (name, value) in &request.headers {
            if name.eq_ignore_ascii_case("content-length") {
                has_length = true;
            }
            write!(w, "{}: {}\r\n", name, value)?;
        }
        if !has_length && (!request.body.is_empty() || request.method == super::Method::Post) {
            write!(w, "Content-Length: {}\r\n", request.body.len())?;
        }

        w.write_all(b"\r\n")?;
        w.write_all(&request.body)?;
        w.flush()?;

        tracing::trace!(
            "Sent {} {} ({} body bytes) to {}",
            request.method,
            request.target,
            request.body.len(),
            self.peer_addr
        );
        Ok(())
    }

    /// Read one response, skipping interim 1xx responses
    ///
    /// The head limits cover the interim heads too.
    pub fn read_response(&mut self) -> Result<HttpResponse> {
        let mut head_bytes = 0usize;
        let mut header_lines = 0usize;
        loop {
            let (status, reason) = self.read_status_line(&mut head_bytes)?;
            let headers = self.read_headers(&mut head_bytes, &mut header_lines)?;

            if (100..200).contains(&status) {
                tracing::trace!("Skipping interim response {} from {}", status, self.peer_addr);
                continue;
            }

            let mut response = HttpResponse {
                status,
                reason,
                headers,
                body: Vec::new(),
            };
            response.body = self.read_body(&response)?;
            return Ok(response);
        }
    }

    /// Read a CRLF (or bare LF) terminated line, without the terminator
    fn read_line(&mut self, head_bytes: &mut usize) -> Result<String> {
        let mut buf = Vec::new();
        let n = (&mut self.reader)
            .take((MAX_HEADER_BYTES - *head_bytes + 1) as u64)
            .read_until(b'\n', &mut buf)?;

        if n == 0 {
            return Err(ProbeError::Http(format!(
                "connection closed by {} before response was complete",
                self.peer_addr
            )));
        }

        *head_bytes += n;
        if *head_bytes > MAX_HEADER_BYTES {
            return Err(ProbeError::Http(format!(
                "response head exceeds {} bytes",
                MAX_HEADER_BYTES
            )));
        }
        if buf.last() != Some(&b'\n') {
            return Err(ProbeError::Http("truncated response line".to_string()));
        }

        while matches!(buf.last(), Some(b'\n') | Some(b'\r')) {
            buf.pop();
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn read_status_line(&mut self, head_bytes: &mut usize) -> Result<(u16, String)> {
        let line = self.read_line(head_bytes)?;
        let mut parts = line.splitn(3, ' ');

        let version = parts.next().unwrap_or_default();
        if !version.starts_with("HTTP/") {
            return Err(ProbeError::Http(format!("malformed status line: {:?}", line)));
        }

        let status = parts
            .next()
            .and_then(|code| code.parse::<u16>().ok())
            .filter(|code| (100..1000).contains(code))
            .ok_or_else(|| ProbeError::Http(format!("malformed status code: {:?}", line)))?;

        let reason = parts.next().unwrap_or_default().trim().to_string();
        Ok((status, reason))
    }

    fn read_headers(
        &mut self,
        head_bytes: &mut usize,
        header_lines: &mut usize,
    ) -> Result<Vec<(String, String)>> {
        let mut headers = Vec::new();
        loop {
            let line = self.read_line(head_bytes)?;
            if line.is_empty() {
                return Ok(headers);
            }
            *header_lines += 1;
            if *header_lines > MAX_HEADER_LINES {
                return Err(ProbeError::Http(format!(
                    "more than {} response headers",
                    MAX_HEADER_LINES
                )));
            }
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| ProbeError::Http(format!("malformed header: {:?}", line)))?;
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }

    fn read_body(&mut self, response: &HttpResponse) -> Result<Vec<u8>> {
        if response.status == 204 || response.status == 304 {
            return Ok(Vec::new());
        }

        let chunked = response
            .header("transfer-encoding")
            .map(|te| te.to_ascii_lowercase().contains("chunked"))
            .unwrap_or(false);
        if chunked {
            return self.read_chunked_body();
        }

        if let Some(length) = response.header("content-length") {
            let length: usize = length
                .parse()
                .map_err(|_| ProbeError::Http(format!("invalid Content-Length: {:?}", length)))?;
            if length > MAX_BODY_SIZE {
                return Err(ProbeError::Http(format!(
                    "response body too large: {} bytes (max {})",
                    length, MAX_BODY_SIZE
                )));
            }
            let mut body = vec![0u8; length];
            self.reader.read_exact(&mut body)?;
            return Ok(body);
        }

        // No framing: body runs until the server closes the connection
        let mut body = Vec::new();
        (&mut self.reader)
            .take(MAX_BODY_SIZE as u64 + 1)
            .read_to_end(&mut body)?;
        if body.len() > MAX_BODY_SIZE {
            return Err(ProbeError::Http(format!(
                "response body exceeds {} bytes",
                MAX_BODY_SIZE
            )));
        }
        Ok(body)
    }

    fn read_chunked_body(&mut self) -> Result<Vec<u8>> {
        let mut body = Vec::new();
        loop {
            let mut line_bytes = 0usize;
            let line = self.read_line(&mut line_bytes)?;
            let size_str = line.split(';').next().unwrap_or_default().trim();
            let size = usize::from_str_radix(size_str, 16)
                .map_err(|_| ProbeError::Http(format!("invalid chunk size: {:?}", line)))?;

            if size == 0 {
                // Trailers, terminated by an empty line
                let mut trailer_bytes = 0usize;
                while !self.read_line(&mut trailer_bytes)?.is_empty() {}
                return Ok(body);
            }

            // body.len() never exceeds MAX_BODY_SIZE here
            if size > MAX_BODY_SIZE - body.len() {
                return Err(ProbeError::Http(format!(
                    "response body exceeds {} bytes",
                    MAX_BODY_SIZE
                )));
            }

            let start = body.len();
            body.resize(start + size, 0);
            self.reader.read_exact(&mut body[start..])?;

            let mut crlf_bytes = 0usize;
            if !self.read_line(&mut crlf_bytes)?.is_empty() {
                return Err(ProbeError::Http("missing CRLF after chunk".to_string()));
            }
        }
    }
}
