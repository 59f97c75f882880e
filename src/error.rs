//! Error types untuk channel, decoder, dan poll loop.
//!
//! Semua error dikembalikan ke caller langsung. Tidak ada retry,
//! backoff, atau suppression di dalam library.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::protocol::DecodeError;

/// Result alias untuk seluruh crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the channel, the decoder and the poll loop.
#[derive(Debug, Error)]
pub enum Error {
    /// Creating or binding the endpoint failed.
    #[error("failed to {op} uevent socket: {source}")]
    Resource {
        op: &'static str,
        #[source]
        source: io::Error,
    },
    /// Peek or consuming receive failed.
    #[error("uevent receive failed: {0}")]
    Io(#[source] io::Error),
    /// Receive was attempted on a released channel.
    #[error("uevent channel is closed")]
    Closed,
    /// The datagram could not be decoded.
    #[error("malformed uevent: {0}")]
    Format(#[from] DecodeError),
    /// The caller's timeout elapsed before another receive was issued.
    #[error("timed out after {timeout:?}")]
    DeadlineExceeded { timeout: Duration },
}

impl Error {
    /// True untuk terminasi terkontrol (timeout), bukan kegagalan I/O atau format
    #[inline]
    pub fn is_deadline(&self) -> bool {
        matches!(self, Error::DeadlineExceeded { .. })
    }

    pub(crate) fn resource(op: &'static str, source: io::Error) -> Self {
        Error::Resource { op, source }
    }
}
