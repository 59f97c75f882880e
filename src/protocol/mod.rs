//! Protocol Layer: Zero-Copy Uevent Decoding
//!
//! Prinsip desain:
//! - Zero-Copy: `Message` meminjam slice dari receive buffer
//! - Opaque bytes: tidak ada validasi encoding atau type coercion
//! - Strict: datagram rusak langsung jadi error, tidak ada partial decode

mod decoder;
mod message;

pub use decoder::{decode, DecodeError};
pub use message::{
    ActionKind, DeviceKind, Message, OwnedMessage, KEY_DEVNAME, KEY_SEQNUM, KEY_SUBSYSTEM,
};
