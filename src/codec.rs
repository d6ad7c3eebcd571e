//! Fixed-width byte encoders for the News Channel record format.
//!
//! Everything here is pure. Integers are big-endian unless the name says
//! otherwise; text uses the console's two-byte display encoding (UTF-16BE)
//! and is never length-prefixed by this module.

use chrono::{DateTime, TimeZone, Utc};

/// Seconds between the Unix epoch and 2000-01-01 00:00 UTC.
pub const EPOCH_2000: i64 = 946_684_800;

pub fn u8(value: u8) -> [u8; 1] {
    [value]
}

pub fn u16(value: u16) -> [u8; 2] {
    value.to_be_bytes()
}

pub fn u32(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

/// Little-endian variant, only used by the zoom factor of a coordinate block.
pub fn u32_le(value: u32) -> [u8; 4] {
    value.to_le_bytes()
}

/// Encode display text. Absent or empty text becomes the empty marker.
pub fn enc(text: Option<&str>) -> Vec<u8> {
    match text {
        Some(t) if !t.is_empty() => t.encode_utf16().flat_map(u16::to_be_bytes).collect(),
        _ => Vec::new(),
    }
}

/// Inverse of [`enc`]. A trailing odd byte is ignored.
pub fn decode_text(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// Whole minutes elapsed since 2000-01-01 00:00 UTC, clamped to zero for
/// earlier instants.
pub fn minutes_since_2000(at: DateTime<Utc>) -> u32 {
    let minutes = (at.timestamp() - EPOCH_2000).div_euclid(60);
    minutes.clamp(0, u32::MAX as i64) as u32
}

pub fn from_minutes_since_2000(minutes: u32) -> DateTime<Utc> {
    Utc.timestamp_opt(EPOCH_2000 + minutes as i64 * 60, 0)
        .single()
        .unwrap_or_default()
}
