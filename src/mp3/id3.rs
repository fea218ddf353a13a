//! ID3v2 tag skipping
//!
//! ID3v2 header: "ID3" (3) + version (2) + flags (1) + size (4) = 10 bytes.
//! The size field is a syncsafe integer: 7 bits per byte, most significant
//! byte first, so it can never contain a frame sync pattern. It counts the
//! tag body only, not the 10 header bytes.

pub const HEADER_LEN: usize = 10;

const MAGIC: &[u8; 3] = b"ID3";

/// Decode a 28-bit syncsafe integer; the top bit of each byte is ignored.
pub fn syncsafe(bytes: [u8; 4]) -> u32 {
    ((bytes[0] as u32 & 0x7F) << 21)
        | ((bytes[1] as u32 & 0x7F) << 14)
        | ((bytes[2] as u32 & 0x7F) << 7)
        | (bytes[3] as u32 & 0x7F)
}

/// Declared body size of a leading ID3v2 tag, if there is one.
pub fn tag_size(data: &[u8]) -> Option<u32> {
    if data.len() < HEADER_LEN || &data[..3] != MAGIC {
        return None;
    }
    Some(syncsafe([data[6], data[7], data[8], data[9]]))
}

/// Offset where audio frames may begin.
///
/// The tag body is skipped unconditionally; the result can point past the
/// end of `data` when the declared size is larger than the buffer.
pub fn audio_start(data: &[u8]) -> usize {
    match tag_size(data) {
        Some(size) => HEADER_LEN + size as usize,
        None => 0,
    }
}
