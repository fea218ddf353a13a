//! Playable duration of an MP3 clip, computed from frame headers alone
//!
//! The scan walks the bitstream frame by frame. A position that does not
//! hold a valid Layer III header (or whose frame would run past the end of
//! the buffer) is skipped one byte at a time; an accepted frame moves the
//! cursor straight to where the next header should be.
//!
//! Nothing here fails: garbage, truncated and empty input all degrade to
//! the trailing pad alone.

use super::frame::{is_sync, FrameHeader};
use super::id3;
use tracing::{debug, trace};

/// Added once per measurement so scene timing never clips the tail of a clip.
pub const TRAILING_PAD_SECS: f64 = 0.1;

/// Smallest frame the scan will accept.
const MIN_FRAME_SIZE: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    /// At least one frame was counted
    Measured,
    /// No valid frame anywhere; the duration is only the pad
    NoFrames,
}

/// Outcome of one pass over a clip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationScan {
    /// Total seconds, trailing pad included
    pub seconds: f64,
    pub frame_count: usize,
    /// Cursor position after the ID3v2 tag
    pub audio_start: usize,
    /// Bytes stepped over while resynchronizing
    pub resync_bytes: usize,
}

impl DurationScan {
    pub fn status(&self) -> ScanStatus {
        if self.frame_count > 0 {
            ScanStatus::Measured
        } else {
            ScanStatus::NoFrames
        }
    }
}

/// Total playback duration of `data` in seconds, pad included.
pub fn measure_duration(data: &[u8]) -> f64 {
    scan(data).seconds
}

/// Walk every frame in `data` and sum their durations.
pub fn scan(data: &[u8]) -> DurationScan {
    let len = data.len();
    let audio_start = id3::audio_start(data);

    let mut cursor = audio_start;
    let mut total = 0.0;
    let mut frame_count = 0;
    let mut resync_bytes = 0;

    while cursor.saturating_add(4) <= len {
        match accept_frame(data, cursor) {
            Some(frame) => {
                trace!(
                    offset = cursor,
                    bitrate = frame.bitrate,
                    sample_rate = frame.sample_rate,
                    frame_size = frame.frame_size,
                    "frame"
                );
                total += frame.duration_secs();
                frame_count += 1;
                cursor += frame.frame_size as usize;
            }
            None => {
                cursor += 1;
                resync_bytes += 1;
            }
        }
    }

    let result = DurationScan {
        seconds: total + TRAILING_PAD_SECS,
        frame_count,
        audio_start,
        resync_bytes,
    };

    debug!(
        bytes = len,
        frames = result.frame_count,
        resync_bytes = result.resync_bytes,
        seconds = result.seconds,
        "scanned clip"
    );

    result
}

/// A frame that starts at `cursor` and fits entirely inside `data`.
fn accept_frame(data: &[u8], cursor: usize) -> Option<FrameHeader> {
    if !is_sync(&data[cursor..]) {
        return None;
    }
    let frame = FrameHeader::at(data, cursor)?;
    let size = frame.frame_size as usize;
    if frame.frame_size < MIN_FRAME_SIZE || cursor + size > data.len() {
        return None;
    }
    Some(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MPEG1_128: [u8; 4] = [0xFF, 0xFB, 0x90, 0x00];
    const MPEG1_128_PADDED: [u8; 4] = [0xFF, 0xFB, 0x92, 0x00];
    const MPEG2_64: [u8; 4] = [0xFF, 0xF3, 0x80, 0x00];

    const MPEG1_FRAME_SECS: f64 = 1152.0 / 44100.0;
    const MPEG2_FRAME_SECS: f64 = 576.0 / 22050.0;

    /// A complete frame: the header followed by zeroed payload up to frame_size
    fn frame(header: [u8; 4]) -> Vec<u8> {
        let parsed = FrameHeader::parse(header).expect("test header must be valid");
        let mut data = header.to_vec();
        data.resize(parsed.frame_size as usize, 0);
        data
    }

    fn frames(header: [u8; 4], count: usize) -> Vec<u8> {
        (0..count).flat_map(|_| frame(header)).collect()
    }

    fn id3_tag(body_len: u32) -> Vec<u8> {
        let mut data = vec![b'I', b'D', b'3', 0x04, 0x00, 0x00];
        data.extend([
            ((body_len >> 21) & 0x7F) as u8,
            ((body_len >> 14) & 0x7F) as u8,
            ((body_len >> 7) & 0x7F) as u8,
            (body_len & 0x7F) as u8,
        ]);
        data.resize(id3::HEADER_LEN + body_len as usize, 0);
        data
    }

    fn assert_secs(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    // ==========================================================================
    // Degenerate input
    // ==========================================================================

    #[test]
    fn test_empty_buffer_is_pad_only() {
        let result = scan(&[]);
        assert_eq!(result.seconds, TRAILING_PAD_SECS);
        assert_eq!(result.frame_count, 0);
        assert_eq!(result.status(), ScanStatus::NoFrames);
    }

    #[test]
    fn test_no_valid_frames() {
        assert_eq!(measure_duration(&[0x00, 0x01, 0x02, 0x03, 0x04]), TRAILING_PAD_SECS);
        assert_eq!(measure_duration(&[0xFF, 0x00, 0xFF, 0x10]), TRAILING_PAD_SECS);
        assert_eq!(measure_duration(&[0u8; 4096]), TRAILING_PAD_SECS);
    }

    #[test]
    fn test_sync_with_invalid_header_counts_nothing() {
        let invalid = [
            [0xFF, 0xFE, 0x90, 0x00], // Layer I
            [0xFF, 0xFC, 0x90, 0x00], // Layer II
            [0xFF, 0xEA, 0x90, 0x00], // reserved version
            [0xFF, 0xFB, 0x9C, 0x00], // reserved sample rate
            [0xFF, 0xFB, 0x00, 0x00], // free format
            [0xFF, 0xFB, 0xF0, 0x00], // bad bitrate
        ];
        for header in invalid {
            let mut data = header.to_vec();
            data.resize(1000, 0);
            let result = scan(&data);
            assert_eq!(result.frame_count, 0, "header {:02X?} must be rejected", header);
            assert_eq!(result.seconds, TRAILING_PAD_SECS);
        }
    }

    #[test]
    fn test_header_without_body_is_not_counted() {
        // A valid 417-byte frame header with only its 4 header bytes present
        assert_eq!(measure_duration(&MPEG1_128), TRAILING_PAD_SECS);

        let mut truncated = frame(MPEG1_128);
        truncated.pop();
        assert_eq!(scan(&truncated).frame_count, 0);
    }

    // ==========================================================================
    // Single frames
    // ==========================================================================

    #[test]
    fn test_single_mpeg1_frame() {
        let data = frame(MPEG1_128);
        assert_eq!(data.len(), 417);

        let result = scan(&data);
        assert_eq!(result.frame_count, 1);
        assert_eq!(result.status(), ScanStatus::Measured);
        assert_secs(result.seconds, MPEG1_FRAME_SECS + TRAILING_PAD_SECS);
    }

    #[test]
    fn test_single_mpeg2_frame() {
        let result = scan(&frame(MPEG2_64));
        assert_eq!(result.frame_count, 1);
        assert_secs(result.seconds, MPEG2_FRAME_SECS + TRAILING_PAD_SECS);
    }

    #[test]
    fn test_padded_frame_is_one_byte_longer() {
        let mut data = frame(MPEG1_128_PADDED);
        assert_eq!(data.len(), 418);
        // The following frame must still be found exactly at byte 418
        data.extend(frame(MPEG1_128));

        let result = scan(&data);
        assert_eq!(result.frame_count, 2);
        assert_eq!(result.resync_bytes, 0);
        assert_secs(result.seconds, 2.0 * MPEG1_FRAME_SECS + TRAILING_PAD_SECS);
    }

    // ==========================================================================
    // Streams
    // ==========================================================================

    #[test]
    fn test_ten_frames_back_to_back() {
        let data = frames(MPEG1_128, 10);
        let result = scan(&data);
        assert_eq!(result.frame_count, 10);
        assert_secs(result.seconds, 10.0 * 1152.0 / 44100.0 + 0.1);
        assert!((result.seconds - 0.3612).abs() < 1e-4);
    }

    #[test]
    fn test_concatenation_pads_once() {
        let a = frame(MPEG1_128);
        let b = frame(MPEG2_64);
        let mut both = a.clone();
        both.extend(&b);

        let expected = (measure_duration(&a) - TRAILING_PAD_SECS)
            + (measure_duration(&b) - TRAILING_PAD_SECS)
            + TRAILING_PAD_SECS;
        assert_secs(measure_duration(&both), expected);
    }

    #[test]
    fn test_garbage_between_frames_is_skipped() {
        let mut data = vec![0x00, 0x01, 0xFF, 0x00, 0x7A];
        data.extend(frame(MPEG1_128));
        data.extend([0xFF, 0xE0, 0x12]);
        data.extend(frame(MPEG1_128));

        let result = scan(&data);
        assert_eq!(result.frame_count, 2);
        assert_eq!(result.resync_bytes, 8);
        assert_secs(result.seconds, 2.0 * MPEG1_FRAME_SECS + TRAILING_PAD_SECS);
    }

    #[test]
    fn test_payload_is_not_rescanned() {
        // A sync pattern inside an accepted frame's payload must not be counted
        let mut data = frame(MPEG1_128);
        data[100..104].copy_from_slice(&MPEG2_64);
        assert_eq!(scan(&data).frame_count, 1);
    }

    // ==========================================================================
    // ID3v2
    // ==========================================================================

    #[test]
    fn test_id3_tag_is_skipped() {
        let mut data = id3_tag(16);
        data.extend(frame(MPEG1_128));

        let result = scan(&data);
        assert_eq!(result.audio_start, 26);
        assert_eq!(result.frame_count, 1);
        assert_eq!(result.resync_bytes, 0);
    }

    #[test]
    fn test_id3_tag_with_header_only_frame() {
        let mut data = id3_tag(16);
        data.extend(MPEG1_128);
        assert_eq!(measure_duration(&data), TRAILING_PAD_SECS);
    }

    #[test]
    fn test_frames_hidden_in_tag_body_are_ignored() {
        let body = frame(MPEG1_128);
        let mut data = id3_tag(body.len() as u32);
        data[id3::HEADER_LEN..].copy_from_slice(&body);

        let result = scan(&data);
        assert_eq!(result.frame_count, 0);
        assert_eq!(result.seconds, TRAILING_PAD_SECS);
    }

    #[test]
    fn test_oversized_id3_tag() {
        let mut data = vec![b'I', b'D', b'3', 0x04, 0x00, 0x00, 0x7F, 0x7F, 0x7F, 0x7F];
        data.extend(frame(MPEG1_128));
        let result = scan(&data);
        assert_eq!(result.frame_count, 0);
        assert_eq!(result.seconds, TRAILING_PAD_SECS);
    }

    // ==========================================================================
    // Properties
    // ==========================================================================

    proptest! {
        #[test]
        fn prop_scan_is_idempotent(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
            prop_assert_eq!(scan(&data), scan(&data));
        }

        #[test]
        fn prop_never_below_pad(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
            prop_assert!(measure_duration(&data) >= TRAILING_PAD_SECS);
        }

        #[test]
        fn prop_scan_starts_after_id3_body(
            size in 0u32..2048,
            junk in proptest::collection::vec(0u8..0xFF, 0..64),
        ) {
            let mut data = id3_tag(size);
            // Headers inside the tag body must never be seen; the junk after
            // it has no 0xFF, so it cannot sync either
            for chunk in data[id3::HEADER_LEN..].chunks_mut(4) {
                let n = chunk.len();
                chunk.copy_from_slice(&MPEG2_64[..n]);
            }
            data.extend(&junk);
            let result = scan(&data);
            prop_assert_eq!(result.audio_start, id3::HEADER_LEN + size as usize);
            prop_assert_eq!(result.frame_count, 0);
        }

        #[test]
        fn prop_frame_count_is_additive(a in 0usize..20, b in 0usize..20) {
            let mut data = frames(MPEG1_128, a);
            data.extend(frames(MPEG2_64, b));
            let result = scan(&data);
            prop_assert_eq!(result.frame_count, a + b);
            let expected = a as f64 * MPEG1_FRAME_SECS + b as f64 * MPEG2_FRAME_SECS + TRAILING_PAD_SECS;
            prop_assert!((result.seconds - expected).abs() < 1e-9);
        }
    }
}
