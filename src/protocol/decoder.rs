//! Zero-Copy Uevent Decoder
//!
//! Decode satu datagram menjadi [`Message`] tanpa alokasi untuk field;
//! hanya map attribute yang dialokasikan.

use std::collections::HashMap;

use thiserror::Error;

use super::message::Message;

const ACTION_SEPARATOR: u8 = b'@';
const FIELD_SEPARATOR: u8 = 0;
const KV_SEPARATOR: u8 = b'=';

/// Datagram tidak bisa di-decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// No '@' between action and device path.
    #[error("uevent message has no action separator")]
    MissingSeparator,
    /// Nothing after the action.
    #[error("uevent message has no data")]
    NoFields,
}

/// Decode raw datagram `ACTION@DEVPATH\0KEY=VALUE\0...`.
///
/// Fields setelah device path yang tidak punya '=' di-skip. Hanya '='
/// pertama yang memisahkan key dan value. Duplicate key: last write wins.
pub fn decode(raw: &[u8]) -> Result<Message<'_>, DecodeError> {
    let at = raw
        .iter()
        .position(|&b| b == ACTION_SEPARATOR)
        .ok_or(DecodeError::MissingSeparator)?;
    let action = &raw[..at];

    let mut fields = raw[at + 1..].split(|&b| b == FIELD_SEPARATOR);

    // Split selalu menghasilkan minimal satu field, walaupun kosong
    let device_path = fields.next().ok_or(DecodeError::NoFields)?;

    let mut attributes = HashMap::new();
    for field in fields {
        let Some(eq) = field.iter().position(|&b| b == KV_SEPARATOR) else {
            continue;
        };
        attributes.insert(&field[..eq], &field[eq + 1..]);
    }

    Ok(Message {
        action,
        device_path,
        attributes,
    })
}
