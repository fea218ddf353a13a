pub mod duration;
pub mod frame;
pub mod id3;

pub use duration::{measure_duration, scan, DurationScan, ScanStatus, TRAILING_PAD_SECS};
pub use frame::{FrameHeader, MpegVersion};
