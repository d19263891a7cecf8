//! Loopback HTTP stub shared by the integration tests.
//!
//! Accepts connections on 127.0.0.1, records each request, and answers with
//! whatever bytes the handler returns. Stops after `max_requests` requests or
//! when the accept deadline passes.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How long the stub waits for the next connection
const ACCEPT_DEADLINE: Duration = Duration::from_secs(5);

/// A request as seen by the stub
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub received_at: Instant,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or_default()
    }

    pub fn query(&self) -> Option<&str> {
        self.target.split_once('?').map(|(_, q)| q)
    }
}

pub struct StubServer {
    addr: SocketAddr,
    handle: JoinHandle<Vec<CapturedRequest>>,
}

impl StubServer {
    /// Serve up to `max_requests` requests with `handler`
    pub fn spawn<F>(max_requests: usize, mut handler: F) -> Self
    where
        F: FnMut(&CapturedRequest) -> Vec<u8> + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        listener.set_nonblocking(true).unwrap();

        let handle = thread::spawn(move || {
            let mut captured = Vec::new();
            let mut deadline = Instant::now() + ACCEPT_DEADLINE;

            while captured.len() < max_requests && Instant::now() < deadline {
                match listener.accept() {
                    Ok((stream, _)) => {
                        stream.set_nonblocking(false).unwrap();
                        if let Some(request) = serve_one(stream, &mut handler) {
                            captured.push(request);
                        }
                        deadline = Instant::now() + ACCEPT_DEADLINE;
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(2));
                    }
                    Err(e) => panic!("stub accept failed: {}", e),
                }
            }
            captured
        });

        Self { addr, handle }
    }

    /// Always answer with the same response
    pub fn respond_with(max_requests: usize, response: Vec<u8>) -> Self {
        Self::spawn(max_requests, move |_| response.clone())
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Wait for the stub to finish and return what it received
    pub fn finish(self) -> Vec<CapturedRequest> {
        self.handle.join().unwrap()
    }
}

fn serve_one<F>(stream: TcpStream, handler: &mut F) -> Option<CapturedRequest>
where
    F: FnMut(&CapturedRequest) -> Vec<u8>,
{
    stream.set_read_timeout(Some(Duration::from_secs(5))).ok()?;
    let mut reader = BufReader::new(stream.try_clone().ok()?);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let mut parts = request_line.trim_end().splitn(3, ' ');
    let method = parts.next()?.to_string();
    let target = parts.next()?.to_string();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).ok()?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        let (name, value) = line.split_once(':')?;
        headers.push((name.trim().to_string(), value.trim().to_string()));
    }

    let length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).ok()?;

    let request = CapturedRequest {
        method,
        target,
        headers,
        body,
        received_at: Instant::now(),
    };

    let response = handler(&request);
    let mut stream = stream;
    let _ = stream.write_all(&response);
    let _ = stream.flush();
    Some(request)
}

/// A complete response with a `Content-Length` body
pub fn http_response(status: u16, reason: &str, body: &[u8]) -> Vec<u8> {
    let mut out = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\n\r\n",
        status,
        reason,
        body.len()
    )
    .into_bytes();
    out.extend_from_slice(body);
    out
}

/// A URL nothing is listening on
pub fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
