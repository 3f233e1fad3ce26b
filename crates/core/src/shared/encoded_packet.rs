use crate::shared::time_base::{rescale, TimeBase};

/// One encoded access unit, borrowed from the caller for a single write.
///
/// Timestamps are in whatever time base the holder is working in; the
/// recorder receives them in microseconds and rescales a copy before muxing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodedPacket<'a> {
    pub data: &'a [u8],
    pub pts: i64,
    pub dts: Option<i64>,
    pub duration: Option<i64>,
    pub is_keyframe: bool,
}

impl<'a> EncodedPacket<'a> {
    pub fn new(data: &'a [u8], pts: i64) -> Self {
        Self {
            data,
            pts,
            dts: None,
            duration: None,
            is_keyframe: false,
        }
    }

    pub fn with_dts(mut self, dts: i64) -> Self {
        self.dts = Some(dts);
        self
    }

    pub fn with_duration(mut self, duration: i64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn keyframe(mut self, is_keyframe: bool) -> Self {
        self.is_keyframe = is_keyframe;
        self
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Same payload with pts, dts and duration each converted from `from`
    /// to `to`. A zero or negative duration means "unknown" and is kept
    /// as is.
    pub fn rescaled(&self, from: TimeBase, to: TimeBase) -> EncodedPacket<'a> {
        EncodedPacket {
            data: self.data,
            pts: rescale(self.pts, from, to),
            dts: self.dts.map(|dts| rescale(dts, from, to)),
            duration: self
                .duration
                .map(|d| if d > 0 { rescale(d, from, to) } else { d }),
            is_keyframe: self.is_keyframe,
        }
    }
}
