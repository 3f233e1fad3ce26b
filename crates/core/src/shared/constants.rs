use crate::shared::time_base::TimeBase;

/// Short name of the only container format the recorder writes.
pub const OUTPUT_FORMAT_NAME: &str = "mp4";

/// Time base of every timestamp handed to the recorder (1 tick = 1 µs).
pub const SOURCE_TIME_BASE: TimeBase = TimeBase::new(1, 1_000_000);

/// Largest width or height the muxer's signed codec parameters can hold.
pub const MAX_FRAME_DIMENSION: u32 = i32::MAX as u32;

pub const MICROS_PER_SECOND: i64 = 1_000_000;

pub const STREAM_EXTENSIONS: &[&str] = &["h264", "264", "h265", "265", "hevc"];
