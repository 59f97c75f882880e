//! Poll loop: receive + decode dengan deadline
//!
//! Deadline hanya dicek di antara iterasi. Receive yang sedang block tidak
//! diinterupsi, jadi receive yang menggantung bisa menunda terminasi.
//! Error apa pun dari receive atau decode langsung menghentikan loop.

use std::io::{self, Write};
use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::channel::{Channel, DatagramSource};
use crate::config::MonitorConfig;
use crate::error::{Error, Result};
use crate::protocol::{decode, Message};

/// Anything that yields one raw datagram per call.
pub trait Receiver {
    fn receive(&mut self) -> Result<&[u8]>;
}

impl<S: DatagramSource> Receiver for Channel<S> {
    #[inline]
    fn receive(&mut self) -> Result<&[u8]> {
        Channel::receive(self)
    }
}

/// Satu uevent: datagram mentah dan hasil decode-nya
#[derive(Debug)]
pub struct Event<'a> {
    pub raw: &'a [u8],
    pub message: Message<'a>,
}

/// Result of a loop that ended cleanly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Jumlah event yang diserahkan ke handler
    pub events: u64,
}

/// Receive and decode until the handler breaks or something fails.
///
/// Sebelum setiap receive: kalau deadline sudah lewat, return
/// [`Error::DeadlineExceeded`]. Dengan `timeout` nol, receive tidak
/// pernah dipanggil.
pub fn poll_events<R, F>(rx: &mut R, timeout: Duration, mut handler: F) -> Result<PollSummary>
where
    R: Receiver + ?Sized,
    F: FnMut(&Event<'_>) -> ControlFlow<()>,
{
    let started = Instant::now();
    // Timeout yang overflow Instant dianggap tanpa batas
    let deadline = started.checked_add(timeout);
    let mut summary = PollSummary::default();

    loop {
        if deadline.map_or(false, |d| Instant::now() >= d) {
            debug!(events = summary.events, "uevent poll deadline reached");
            return Err(Error::DeadlineExceeded { timeout });
        }

        trace!("waiting for uevent");
        let raw = rx.receive()?;
        let message = decode(raw)?;
        summary.events += 1;

        let event = Event { raw, message };
        if handler(&event).is_break() {
            debug!(
                events = summary.events,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "uevent poll finished"
            );
            return Ok(summary);
        }
    }
}

/// Datagram mentah dengan NUL ditampilkan sebagai newline
pub fn render_raw(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).replace('\0', "\n")
}

fn write_event<W: Write + ?Sized>(out: &mut W, event: &Event<'_>, raw: bool) -> io::Result<()> {
    if raw {
        writeln!(out, "{}", render_raw(event.raw))?;
    }
    writeln!(out, "{}", event.message)?;
    out.flush()
}

/// Print decoded events to `out` according to `config`.
///
/// Stops cleanly after `config.max_events` events; otherwise runs until
/// the deadline or the first error.
pub fn run<R, W>(rx: &mut R, config: &MonitorConfig, out: &mut W) -> Result<PollSummary>
where
    R: Receiver + ?Sized,
    W: Write + ?Sized,
{
    let mut write_error = None;
    let mut seen = 0u64;

    let result = poll_events(rx, config.timeout, |event| {
        if let Err(e) = write_event(out, event, config.raw) {
            write_error = Some(e);
            return ControlFlow::Break(());
        }

        seen += 1;
        match config.max_events {
            Some(max) if seen >= max => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        }
    });

    match write_error {
        Some(e) => Err(Error::Io(e)),
        None => result,
    }
}
