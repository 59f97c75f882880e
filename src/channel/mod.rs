//! Channel Layer: Kernel Uevent Socket
//!
//! Satu endpoint `NETLINK_KOBJECT_UEVENT` yang di-bind ke satu multicast
//! group, plus receive buffer yang tumbuh sesuai ukuran datagram.
//!
//! Fitur:
//! - Satu receive = satu datagram utuh, tidak pernah partial
//! - Close eksplisit dan idempotent; drop juga melepas fd
//! - Single owner: `receive` butuh `&mut self`, tidak ada lock internal.
//!   Datagram yang sudah dibaca satu reader tidak bisa dibaca reader lain.

mod buffer;
mod socket;

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::{Error, Result};

pub use buffer::{page_size, RecvBuffer};
pub use socket::{DatagramSource, NetlinkSocket};

/// Multicast group of the kernel uevent family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MulticastGroup {
    /// Raw kernel uevents (group 1)
    #[default]
    Kernel,
    /// Events re-broadcast by the udev daemon (group 2). These carry a
    /// libudev header and do not use the `ACTION@DEVPATH` layout.
    Udev,
    /// Group bitmask apa adanya
    Other(u32),
}

impl MulticastGroup {
    /// Bitmask untuk `sockaddr_nl.nl_groups`
    #[inline]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Kernel => 1,
            Self::Udev => 2,
            Self::Other(bits) => bits,
        }
    }
}

impl fmt::Display for MulticastGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kernel => f.write_str("kernel"),
            Self::Udev => f.write_str("udev"),
            Self::Other(bits) => write!(f, "{bits}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown multicast group {0:?}, expected `kernel`, `udev` or a group mask")]
pub struct ParseGroupError(String);

impl FromStr for MulticastGroup {
    type Err = ParseGroupError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kernel" => Ok(Self::Kernel),
            "udev" => Ok(Self::Udev),
            other => match other.parse::<u32>() {
                Ok(1) => Ok(Self::Kernel),
                Ok(2) => Ok(Self::Udev),
                Ok(bits) => Ok(Self::Other(bits)),
                Err(_) => Err(ParseGroupError(s.to_string())),
            },
        }
    }
}

/// Exclusive handle to a datagram endpoint and its receive buffer.
///
/// Created once, used for repeated receives, released with [`close`].
/// Not meant to be shared between threads; wrap it yourself if you must,
/// a datagram consumed by one reader is gone for every other reader.
///
/// [`close`]: Channel::close
#[derive(Debug)]
pub struct Channel<S: DatagramSource = NetlinkSocket> {
    source: Option<S>,
    buffer: RecvBuffer,
}

impl Channel<NetlinkSocket> {
    /// Buka dan bind socket uevent ke `group`
    pub fn open(group: MulticastGroup) -> Result<Self> {
        Ok(Self::with_source(NetlinkSocket::open(group)?))
    }

    /// Group yang di-bind, None setelah close
    pub fn group(&self) -> Option<MulticastGroup> {
        self.source.as_ref().map(NetlinkSocket::group)
    }
}

impl<S: DatagramSource> Channel<S> {
    /// Wrap source apa pun, buffer mulai dari page size
    pub fn with_source(source: S) -> Self {
        Self::with_buffer(source, RecvBuffer::new())
    }

    pub fn with_buffer(source: S, buffer: RecvBuffer) -> Self {
        Self {
            source: Some(source),
            buffer,
        }
    }

    /// Block sampai satu datagram utuh tersedia.
    ///
    /// Slice yang dikembalikan valid sampai receive berikutnya.
    pub fn receive(&mut self) -> Result<&[u8]> {
        let source = self.source.as_ref().ok_or(Error::Closed)?;
        let len = self.buffer.fill(source).map_err(Error::Io)?.len();
        debug!(
            len,
            growth = self.buffer.last_growth(),
            "received uevent datagram"
        );
        Ok(self.buffer.filled())
    }

    /// Release the endpoint.
    ///
    /// Idempotent: only the first call touches the underlying resource.
    pub fn close(&mut self) -> Result<()> {
        match self.source.take() {
            Some(source) => source.release().map_err(|e| Error::resource("close", e)),
            None => Ok(()),
        }
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.source.is_none()
    }

    #[inline]
    pub fn buffer(&self) -> &RecvBuffer {
        &self.buffer
    }
}
