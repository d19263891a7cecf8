//! raftkv-probe Binary
//!
//! Writes one key through the MsgPack endpoint and reads it back.

use clap::Parser;
use raftkv_probe::{Config, ConsistencyStrategy, Harness, WriteCommand};
use tracing_subscriber::{fmt, EnvFilter};

/// raftkv-probe
#[derive(Parser, Debug)]
#[command(name = "raftkv-probe")]
#[command(about = "Write a key over MsgPack/HTTP and verify it becomes readable")]
#[command(version)]
struct Args {
    /// Base URL of the store's HTTP front end
    #[arg(short, long, env = "RAFTKV_PROBE_URL", default_value = "http://localhost:8080")]
    url: String,

    /// Key to write
    #[arg(short, long, default_value = "user_123")]
    key: String,

    /// Value to write
    #[arg(short, long, default_value = "msgpack_optimization_active")]
    value: String,

    /// Send DELETE instead of SET
    #[arg(long)]
    delete: bool,

    /// Wait before the read-back (fixed delay mode)
    #[arg(long, default_value_t = ConsistencyStrategy::DEFAULT_DELAY_MS)]
    delay_ms: u64,

    /// Poll the read endpoint with backoff instead of a single fixed wait
    #[arg(long)]
    poll: bool,

    /// Give up polling after this many milliseconds
    #[arg(long, default_value = "3000")]
    poll_timeout_ms: u64,

    /// Connect/read/write timeout in milliseconds (0 = transport default)
    #[arg(long, default_value = "0")]
    timeout_ms: u64,

    /// Exit with status 1 unless the write was accepted and read back
    #[arg(long)]
    strict: bool,
}

fn main() {
    // Operator report goes to stdout, diagnostics to stderr
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,raftkv_probe=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!("raftkv-probe v{}", raftkv_probe::VERSION);
    tracing::info!("Target: {}", args.url);

    let consistency = if args.poll {
        ConsistencyStrategy::PollWithBackoff {
            initial_delay_ms: args.delay_ms.clamp(1, 100),
            max_delay_ms: args.delay_ms.max(1),
            timeout_ms: args.poll_timeout_ms,
        }
    } else {
        ConsistencyStrategy::FixedDelay { ms: args.delay_ms }
    };

    let config = Config::builder()
        .base_url(&args.url)
        .consistency(consistency)
        .connect_timeout_ms(args.timeout_ms)
        .read_timeout_ms(args.timeout_ms)
        .write_timeout_ms(args.timeout_ms)
        .build();

    let mut harness = match Harness::new(config) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    let command = if args.delete {
        WriteCommand::delete(&args.key)
    } else {
        WriteCommand::set(&args.key, &args.value)
    };

    let report = harness.run(&command);

    if args.strict && !report.passed() {
        tracing::error!("Probe failed: {}", report);
        std::process::exit(1);
    }
}
