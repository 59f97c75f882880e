//! Tracing setup untuk binary dan demo.
//!
//! Library hanya emit event lewat `tracing`; subscriber dipasang oleh
//! caller. Output ke stderr supaya stdout bersih untuk event.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set. Otherwise `verbosity` picks the level for
/// this crate: 0 info, 1 debug, 2+ trace. Calling twice is a no-op.
pub fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "uevent_monitor=info",
        1 => "uevent_monitor=debug",
        _ => "uevent_monitor=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_timer(fmt::time::uptime()),
        )
        .with(filter)
        .try_init();
}
