//! Harness Module
//!
//! Drives one write and one read-back against the store and reports both
//! to the operator.
//!
//! ## Sequence
//! 1. Encode the write command as a MsgPack envelope
//! 2. POST it to the write endpoint
//! 3. On HTTP 200, wait for the write to become visible
//! 4. GET the key from the read endpoint
//!
//! No step raises past the harness: transport and protocol errors become
//! [`WriteOutcome`] / [`ReadOutcome`] values and a line of operator output.

use std::fmt;
use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::{Config, ConsistencyStrategy};
use crate::error::Result;
use crate::network::{HttpClient, HttpRequest};
use crate::protocol::{
    encode_command, Operation, ReadOutcome, WriteCommand, WriteOutcome, MSGPACK_CONTENT_TYPE,
};

/// Outcome of a full write-then-read run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// The command that was submitted
    pub command: WriteCommand,

    pub write: WriteOutcome,

    /// `None` when the write failed and the read was skipped
    pub read: Option<ReadOutcome>,
}

impl RunReport {
    /// True if the write was accepted and the read showed its effect
    pub fn passed(&self) -> bool {
        self.write.is_success() && self.read.as_ref() == Some(&expected_read(&self.command))
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}': write {}", self.command.op.as_str(), self.command.key, self.write)?;
        match &self.read {
            Some(read) => write!(f, ", read {}", read),
            None => write!(f, ", read skipped"),
        }
    }
}

/// What a read should return once `command` is visible
pub fn expected_read(command: &WriteCommand) -> ReadOutcome {
    match command.op {
        Operation::Set => ReadOutcome::Value(command.value.clone()),
        Operation::Delete => ReadOutcome::NotFound,
    }
}

/// Write-then-verify driver
///
/// Operator output goes to `out` (stdout for the binary).
pub struct Harness<W: Write = io::Stdout> {
    config: Config,
    client: HttpClient,
    out: W,
}

impl Harness<io::Stdout> {
    /// Harness reporting to stdout
    pub fn new(config: Config) -> Result<Self> {
        Self::with_output(config, io::stdout())
    }
}

impl<W: Write> Harness<W> {
    /// Harness reporting to `out`
    pub fn with_output(config: Config, out: W) -> Result<Self> {
        let client = HttpClient::from_config(&config)?;
        Ok(Self { config, client, out })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the harness and return its output sink
    pub fn into_output(self) -> W {
        self.out
    }

    // =========================================================================
    // Write Path
    // =========================================================================

    /// Submit `SET key=value`; true iff the store answered HTTP 200
    pub fn submit_write(&mut self, key: &str, value: &str) -> bool {
        self.submit(&WriteCommand::set(key, value)).is_success()
    }

    /// Submit a write command and classify the answer
    pub fn submit(&mut self, command: &WriteCommand) -> WriteOutcome {
        let envelope = match encode_command(command) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!("Could not encode {} for '{}': {}", command.op.as_str(), command.key, e);
                self.say(format_args!("Error sending request: {}", e));
                return WriteOutcome::Invalid {
                    reason: e.to_string(),
                };
            }
        };

        self.say(format_args!("Sending MsgPack payload ({} bytes)...", envelope.len()));

        let target = self.client.base_url().target(&self.config.write_path, &[]);
        let content_length = envelope.len().to_string();
        let request = HttpRequest::post(target, MSGPACK_CONTENT_TYPE, envelope.into_bytes())
            .header("Content-Length", content_length);

        match self.client.execute(&request) {
            Ok(response) => {
                let body = response.text();
                self.say(format_args!("Response Status: {}", response.status));
                self.say(format_args!("Response Body: {}", body));

                let outcome = WriteOutcome::from_status(response.status, body);
                if outcome.is_success() {
                    tracing::info!("{} '{}' accepted", command.op.as_str(), command.key);
                } else {
                    tracing::warn!("{} '{}' {}", command.op.as_str(), command.key, outcome);
                }
                outcome
            }
            Err(e) => {
                tracing::warn!("Write to {} failed: {}", self.client.base_url(), e);
                self.say(format_args!("Error sending request: {}", e));
                WriteOutcome::Unreachable {
                    reason: e.to_string(),
                }
            }
        }
    }

    // =========================================================================
    // Read Path
    // =========================================================================

    /// Read `key` back and report what the store returned
    pub fn verify_read(&mut self, key: &str) -> ReadOutcome {
        let read_path = self.config.read_path.clone();

        match self.client.get(&read_path, &[("key", key)]) {
            Ok(response) => {
                let body = response.text();
                self.say(format_args!("GET Verification for '{}': {}", key, body));
                let outcome = ReadOutcome::from_status(response.status, body);
                tracing::debug!("Read '{}': {}", key, outcome);
                outcome
            }
            Err(e) => {
                tracing::warn!("Read from {} failed: {}", self.client.base_url(), e);
                self.say(format_args!("Verification failed: {}", e));
                ReadOutcome::Unreachable {
                    reason: e.to_string(),
                }
            }
        }
    }

    // =========================================================================
    // Orchestration
    // =========================================================================

    /// Submit `command`, wait for it to become visible, then read it back.
    /// The read is skipped if the write did not succeed.
    pub fn run(&mut self, command: &WriteCommand) -> RunReport {
        let write = self.submit(command);

        if !write.is_success() {
            self.say(format_args!("MsgPack request failed."));
            return RunReport {
                command: command.clone(),
                write,
                read: None,
            };
        }

        self.say(format_args!("\nWaiting for replication..."));

        let consistency = self.config.consistency;
        let read = match consistency {
            ConsistencyStrategy::FixedDelay { ms } => {
                thread::sleep(Duration::from_millis(ms));
                self.verify_read(&command.key)
            }
            ConsistencyStrategy::PollWithBackoff {
                initial_delay_ms,
                max_delay_ms,
                timeout_ms,
            } => self.poll_until_visible(command, initial_delay_ms, max_delay_ms, timeout_ms),
        };

        let report = RunReport {
            command: command.clone(),
            write,
            read: Some(read),
        };
        tracing::info!("{}", report);
        report
    }

    /// Read until the expected outcome shows up or `timeout_ms` runs out
    fn poll_until_visible(
        &mut self,
        command: &WriteCommand,
        initial_delay_ms: u64,
        max_delay_ms: u64,
        timeout_ms: u64,
    ) -> ReadOutcome {
        let expected = expected_read(command);
        let timeout = Duration::from_millis(timeout_ms);
        let max_delay = Duration::from_millis(max_delay_ms.max(1));
        let mut delay = Duration::from_millis(initial_delay_ms.max(1)).min(max_delay);
        let start = Instant::now();
        let mut attempt = 1u32;

        loop {
            thread::sleep(delay);
            let outcome = self.verify_read(&command.key);
            if outcome == expected {
                tracing::debug!("'{}' visible after {} attempt(s)", command.key, attempt);
                return outcome;
            }

            let next = (delay * 2).min(max_delay);
            if start.elapsed() + next > timeout {
                tracing::warn!(
                    "'{}' not visible after {} attempt(s) in {:?}: {}",
                    command.key,
                    attempt,
                    start.elapsed(),
                    outcome
                );
                return outcome;
            }

            delay = next;
            attempt += 1;
        }
    }

    /// Write a line of operator output
    fn say(&mut self, line: fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "{}", line) {
            tracing::warn!("Failed to write report output: {}", e);
        }
    }
}
