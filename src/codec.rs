//! Wire codec for the board link.
//!
//! The device speaks fixed 2-byte little-endian frames: a signed 16-bit value
//! is biased into unsigned range (two's complement) before transmission and
//! the bias is reversed on receipt. One frame per sample out, one frame per
//! magnitude back.

/// Encodes one sample as its 2-byte little-endian wire frame.
pub fn encode(sample: i16) -> [u8; 2] {
    (sample as u16).to_le_bytes()
}

/// Decodes a 2-byte little-endian wire frame back into a signed value.
/// Exact inverse of [`encode`].
pub fn decode(low: u8, high: u8) -> i16 {
    u16::from_le_bytes([low, high]) as i16
}
