//! MPEG Layer III frame header decoding
//!
//! MP3 frames start with a sync word (11 bits of 1s) followed by header info.
//! Read as one big-endian `u32`, the header is laid out as:
//! AAAAAAAA AAABBCCD EEEEFFGH IIJJKLMM
//!
//! A = sync (11 bits)
//! B = MPEG version (2 bits, bits 19-20): 00=2.5, 01=reserved, 10=2, 11=1
//! C = Layer (2 bits, bits 17-18): 00=reserved, 01=III, 10=II, 11=I
//! D = Protection bit (CRC)
//! E = Bitrate index (4 bits, bits 12-15)
//! F = Sample rate index (2 bits, bits 10-11)
//! G = Padding bit (bit 9)
//! H..M = private, channel mode, mode extension, copyright, original, emphasis
//!
//! Only Layer III is accepted; the other layers never come out of a TTS
//! provider and would need their own size formulas.

/// Bit value of the layer field that means Layer III.
const LAYER_III: u32 = 1;

// Bitrate lookup tables (kbps)
// Index 0 = free, 15 = bad
const BITRATES_V1_L3: [u32; 16] = [0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 0];
const BITRATES_V2_L3: [u32; 16] = [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160, 0];

// Sample rate lookup tables (Hz), index 3 is reserved
const SAMPLE_RATES_V1: [u32; 3] = [44100, 48000, 32000];
const SAMPLE_RATES_V2: [u32; 3] = [22050, 24000, 16000];
const SAMPLE_RATES_V25: [u32; 3] = [11025, 12000, 8000];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpegVersion {
    Mpeg1,
    Mpeg2,
    Mpeg25,
}

impl MpegVersion {
    /// Map the 2-bit version id; `1` is reserved.
    fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            0 => Some(MpegVersion::Mpeg25),
            2 => Some(MpegVersion::Mpeg2),
            3 => Some(MpegVersion::Mpeg1),
            _ => None,
        }
    }

    fn bitrates(self) -> &'static [u32; 16] {
        match self {
            MpegVersion::Mpeg1 => &BITRATES_V1_L3,
            MpegVersion::Mpeg2 | MpegVersion::Mpeg25 => &BITRATES_V2_L3,
        }
    }

    fn sample_rates(self) -> &'static [u32; 3] {
        match self {
            MpegVersion::Mpeg1 => &SAMPLE_RATES_V1,
            MpegVersion::Mpeg2 => &SAMPLE_RATES_V2,
            MpegVersion::Mpeg25 => &SAMPLE_RATES_V25,
        }
    }

    /// Layer III samples per frame
    pub fn samples_per_frame(self) -> u32 {
        match self {
            MpegVersion::Mpeg1 => 1152,
            MpegVersion::Mpeg2 | MpegVersion::Mpeg25 => 576,
        }
    }
}

/// True when `bytes` starts with the 11-bit frame sync pattern.
pub fn is_sync(bytes: &[u8]) -> bool {
    matches!(bytes, [0xFF, second, ..] if second & 0xE0 == 0xE0)
}

fn version_bits(word: u32) -> u32 {
    (word >> 19) & 0x03
}

fn layer_bits(word: u32) -> u32 {
    (word >> 17) & 0x03
}

fn bitrate_index(word: u32) -> usize {
    ((word >> 12) & 0x0F) as usize
}

fn sample_rate_index(word: u32) -> usize {
    ((word >> 10) & 0x03) as usize
}

fn padding_bit(word: u32) -> u32 {
    (word >> 9) & 0x01
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub version: MpegVersion,
    /// kbps
    pub bitrate: u32,
    /// Hz
    pub sample_rate: u32,
    pub padding: bool,
    /// Whole frame length in bytes, header included
    pub frame_size: u32,
    pub samples_per_frame: u32,
}

impl FrameHeader {
    /// Parse a 4-byte Layer III frame header.
    ///
    /// Returns `None` for a missing sync word, a layer other than III, the
    /// reserved version id, the reserved sample rate index, and the free (0)
    /// or bad (15) bitrate indices.
    pub fn parse(header: [u8; 4]) -> Option<Self> {
        if !is_sync(&header) {
            return None;
        }

        let word = u32::from_be_bytes(header);

        if layer_bits(word) != LAYER_III {
            return None;
        }
        let version = MpegVersion::from_bits(version_bits(word))?;

        let bitrate_idx = bitrate_index(word);
        if bitrate_idx == 0 || bitrate_idx == 15 {
            return None;
        }
        let bitrate = version.bitrates()[bitrate_idx];

        let sample_rate = *version.sample_rates().get(sample_rate_index(word))?;
        let samples_per_frame = version.samples_per_frame();
        let padding = padding_bit(word);

        // floor((spf / 8) * bps / rate) + padding; spf / 8 is exact (144 or 72)
        let frame_size = (samples_per_frame / 8) * bitrate * 1000 / sample_rate + padding;

        Some(FrameHeader {
            version,
            bitrate,
            sample_rate,
            padding: padding == 1,
            frame_size,
            samples_per_frame,
        })
    }

    /// Read a header at `offset`, if four bytes are available there.
    pub fn at(bytes: &[u8], offset: usize) -> Option<Self> {
        let end = offset.checked_add(4)?;
        let header: [u8; 4] = bytes.get(offset..end)?.try_into().ok()?;
        Self::parse(header)
    }

    /// Playback time of this frame in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples_per_frame as f64 / self.sample_rate as f64
    }
}
