//! uevent_monitor - print kernel device events until a timeout
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin uevent_monitor -- --timeout 60
//! ```
//!
//! Exit 0 kalau selesai bersih (`--count` tercapai), 1 untuk error apa pun
//! termasuk timeout.

use std::io;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::{error, info, warn};

use uevent_monitor::config::DEFAULT_TIMEOUT_SECS;
use uevent_monitor::{poll, trace, Channel, MonitorConfig, MulticastGroup};

#[derive(Parser, Debug)]
#[command(version, about = "Listen for kernel uevents and print them decoded")]
struct Opts {
    /// Timeout for reading uevents, in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,
    /// Multicast group: kernel, udev or a numeric mask
    #[arg(long, default_value_t = MulticastGroup::Kernel)]
    group: MulticastGroup,
    /// Exit successfully after this many events
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    count: Option<u64>,
    /// Also print each raw datagram
    #[arg(long, default_value_t = false)]
    raw: bool,
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl From<&Opts> for MonitorConfig {
    fn from(opts: &Opts) -> Self {
        Self {
            timeout: Duration::from_secs(opts.timeout),
            group: opts.group,
            max_events: opts.count,
            raw: opts.raw,
        }
    }
}

fn run(config: &MonitorConfig) -> Result<()> {
    let mut channel = Channel::open(config.group).context("failed to open uevent channel")?;
    info!(
        group = %config.group,
        timeout_secs = config.timeout.as_secs(),
        "connected to uevent socket"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = poll::run(&mut channel, config, &mut out);

    if let Err(e) = channel.close() {
        warn!(error = %e, "failed to release uevent channel");
    }

    let summary = result.context("error in poll uevent")?;
    info!(events = summary.events, "done");
    Ok(())
}

fn main() -> ExitCode {
    let opts = Opts::parse();
    trace::init_tracing(opts.verbose);

    match run(&MonitorConfig::from(&opts)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
