//! uevent-monitor - Kernel Device Event Listener
//!
//! Arsitektur:
//! - Channel: socket `NETLINK_KOBJECT_UEVENT` dengan receive buffer yang
//!   tumbuh (peek, double, lalu recv) sehingga datagram tidak pernah terpotong
//! - Protocol: decoder zero-copy `ACTION@DEVPATH\0KEY=VALUE\0...`
//! - Poll: loop receive + decode dengan deadline yang dicek per iterasi
//!
//! ```no_run
//! use std::ops::ControlFlow;
//! use std::time::Duration;
//! use uevent_monitor::{poll_events, Channel, MulticastGroup};
//!
//! let mut channel = Channel::open(MulticastGroup::Kernel)?;
//! poll_events(&mut channel, Duration::from_secs(30), |event| {
//!     println!("{}", event.message);
//!     ControlFlow::Continue(())
//! })?;
//! channel.close()?;
//! # Ok::<(), uevent_monitor::Error>(())
//! ```

#[cfg(not(target_os = "linux"))]
compile_error!("uevent-monitor requires Linux (NETLINK_KOBJECT_UEVENT)");

pub mod channel;
pub mod config;
pub mod error;
pub mod poll;
pub mod protocol;
pub mod trace;

pub use channel::{Channel, DatagramSource, MulticastGroup, NetlinkSocket, RecvBuffer};
pub use config::MonitorConfig;
pub use error::{Error, Result};
pub use poll::{poll_events, Event, PollSummary, Receiver};
pub use protocol::{decode, ActionKind, DecodeError, DeviceKind, Message, OwnedMessage};
