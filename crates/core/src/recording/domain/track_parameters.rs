use crate::shared::frame_size::FrameSize;
use crate::shared::video_codec::VideoCodec;

/// Pixel layout declared for the recorded track.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    /// Planar YUV 4:2:0.
    Yuv420p,
}

impl From<PixelFormat> for ffmpeg_next::format::Pixel {
    fn from(format: PixelFormat) -> Self {
        match format {
            PixelFormat::Yuv420p => ffmpeg_next::format::Pixel::YUV420P,
        }
    }
}

/// Codec parameters of the single video track, fixed at open time.
///
/// Extradata is not part of this: it only exists once the first packet has
/// been seen and is handed to the output when the header is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackParameters {
    pub codec: VideoCodec,
    pub pixel_format: PixelFormat,
    pub frame_size: FrameSize,
}

impl TrackParameters {
    pub fn video(codec: VideoCodec, frame_size: FrameSize) -> Self {
        Self {
            codec,
            pixel_format: PixelFormat::Yuv420p,
            frame_size,
        }
    }
}
