//! Zero-Copy Uevent Message
//!
//! Layout datagram dari kernel:
//! ```text
//! ACTION@DEVPATH\0KEY1=VALUE1\0KEY2=VALUE2\0...
//! ```
//!
//! `Message` hanya meminjam slice dari receive buffer, tidak ada copy.
//! Bytes disimpan apa adanya (opaque); konversi UTF-8 hanya untuk display.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

/// Attribute key yang sering dipakai
pub const KEY_SUBSYSTEM: &[u8] = b"SUBSYSTEM";
pub const KEY_DEVNAME: &[u8] = b"DEVNAME";
pub const KEY_SEQNUM: &[u8] = b"SEQNUM";

const BLOCK_SUBSYSTEM: &[u8] = b"block";

/// Known kernel actions.
///
/// Classification only. The decoder never rejects an action that is not
/// listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Add,
    Remove,
    Change,
    Move,
    Online,
    Offline,
    Bind,
    Unbind,
}

impl ActionKind {
    #[inline]
    pub fn from_bytes(action: &[u8]) -> Option<Self> {
        match action {
            b"add" => Some(Self::Add),
            b"remove" => Some(Self::Remove),
            b"change" => Some(Self::Change),
            b"move" => Some(Self::Move),
            b"online" => Some(Self::Online),
            b"offline" => Some(Self::Offline),
            b"bind" => Some(Self::Bind),
            b"unbind" => Some(Self::Unbind),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Change => "change",
            Self::Move => "move",
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Bind => "bind",
            Self::Unbind => "unbind",
        }
    }
}

/// Jenis device node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Block,
    Char,
}

/// Decoded uevent, borrowing from the datagram it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message<'a> {
    /// Action verbatim, e.g. `add`
    pub action: &'a [u8],
    /// Bytes sebelum NUL pertama setelah '@'
    pub device_path: &'a [u8],
    /// Environment attributes, last write wins
    pub attributes: HashMap<&'a [u8], &'a [u8]>,
}

impl<'a> Message<'a> {
    #[inline]
    pub fn kind(&self) -> Option<ActionKind> {
        ActionKind::from_bytes(self.action)
    }

    pub fn action_str(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.action)
    }

    pub fn device_path_str(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.device_path)
    }

    #[inline]
    pub fn attribute(&self, key: &[u8]) -> Option<&'a [u8]> {
        self.attributes.get(key).copied()
    }

    /// Attribute value as text, lossy.
    pub fn attribute_str(&self, key: &[u8]) -> Option<Cow<'a, str>> {
        self.attribute(key).map(String::from_utf8_lossy)
    }

    pub fn subsystem(&self) -> Option<&'a [u8]> {
        self.attribute(KEY_SUBSYSTEM)
    }

    pub fn device_name(&self) -> Option<&'a [u8]> {
        self.attribute(KEY_DEVNAME)
    }

    /// Kernel sequence number, jika ada dan numerik
    pub fn seqnum(&self) -> Option<u64> {
        std::str::from_utf8(self.attribute(KEY_SEQNUM)?)
            .ok()?
            .parse()
            .ok()
    }

    /// Block device kalau SUBSYSTEM=block, selain itu char device kalau
    /// ada DEVNAME. Tanpa device node hasilnya None.
    pub fn device_kind(&self) -> Option<DeviceKind> {
        if self.subsystem() == Some(BLOCK_SUBSYSTEM) {
            Some(DeviceKind::Block)
        } else if self.device_name().is_some() {
            Some(DeviceKind::Char)
        } else {
            None
        }
    }

    /// Copy keluar dari receive buffer
    pub fn to_owned_message(&self) -> OwnedMessage {
        OwnedMessage {
            action: self.action.to_vec(),
            device_path: self.device_path.to_vec(),
            attributes: self
                .attributes
                .iter()
                .map(|(k, v)| (k.to_vec(), v.to_vec()))
                .collect(),
        }
    }

    fn sorted_attributes(&self) -> Vec<(&'a [u8], &'a [u8])> {
        let mut attrs: Vec<_> = self.attributes.iter().map(|(k, v)| (*k, *v)).collect();
        attrs.sort_unstable();
        attrs
    }
}

impl fmt::Display for Message<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.action_str(), self.device_path_str())?;
        for (key, value) in self.sorted_attributes() {
            write!(
                f,
                "\n    {}={}",
                String::from_utf8_lossy(key),
                String::from_utf8_lossy(value)
            )?;
        }
        Ok(())
    }
}

/// Owned copy of a [`Message`] that can outlive the receive buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnedMessage {
    pub action: Vec<u8>,
    pub device_path: Vec<u8>,
    pub attributes: HashMap<Vec<u8>, Vec<u8>>,
}

impl OwnedMessage {
    pub fn as_message(&self) -> Message<'_> {
        Message {
            action: &self.action,
            device_path: &self.device_path,
            attributes: self
                .attributes
                .iter()
                .map(|(k, v)| (k.as_slice(), v.as_slice()))
                .collect(),
        }
    }
}
