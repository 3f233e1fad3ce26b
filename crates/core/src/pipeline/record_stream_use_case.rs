use crate::recording::domain::muxer_backend::MuxerBackend;
use crate::recording::domain::recorder::Recorder;
use crate::recording::domain::recorder_error::RecorderError;
use crate::shared::constants::MICROS_PER_SECOND;
use crate::shared::encoded_packet::EncodedPacket;
use crate::shared::video_codec::VideoCodec;
use crate::stream::annexb_reader::AccessUnit;

/// Progress callback: `(packets_written, total_packets)`. Return `false`
/// to stop recording early; the file is still finalized.
pub type ProgressFn = Box<dyn Fn(usize, usize) -> bool + Send>;

/// Records a sequence of access units at a constant frame rate.
///
/// Stands in for a live capture pipeline: opens the recorder, writes one
/// packet per unit with a synthesized microsecond timestamp, and always
/// closes the recorder, including when a write fails.
pub struct RecordStreamUseCase<B: MuxerBackend> {
    recorder: Recorder<B>,
    codec: VideoCodec,
    fps: u32,
    progress: Option<ProgressFn>,
}

impl<B: MuxerBackend> RecordStreamUseCase<B> {
    pub fn new(
        recorder: Recorder<B>,
        codec: VideoCodec,
        fps: u32,
        progress: Option<ProgressFn>,
    ) -> Self {
        Self {
            recorder,
            codec,
            fps: fps.max(1),
            progress,
        }
    }

    pub fn recorder(&self) -> &Recorder<B> {
        &self.recorder
    }

    /// Returns how many packets were written.
    pub fn execute(&mut self, units: &[AccessUnit]) -> Result<usize, RecorderError> {
        self.recorder.open(self.codec)?;
        let result = self.write_all(units);
        self.recorder.close();
        result
    }

    fn write_all(&mut self, units: &[AccessUnit]) -> Result<usize, RecorderError> {
        let total = units.len();
        for (index, unit) in units.iter().enumerate() {
            let packet = EncodedPacket::new(&unit.data, self.pts_for(index))
                .with_duration(self.frame_duration())
                .keyframe(unit.is_keyframe);
            self.recorder.write(&packet)?;

            if let Some(ref progress) = self.progress {
                if !progress(index + 1, total) {
                    log::info!("Recording stopped after {} of {total} packets", index + 1);
                    return Ok(index + 1);
                }
            }
        }
        Ok(total)
    }

    /// Timestamp of frame `index` in microseconds, derived from the index
    /// each time so rounding never accumulates.
    fn pts_for(&self, index: usize) -> i64 {
        index as i64 * MICROS_PER_SECOND / self.fps as i64
    }

    fn frame_duration(&self) -> i64 {
        MICROS_PER_SECOND / self.fps as i64
    }
}
