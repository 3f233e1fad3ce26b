use std::path::{Path, PathBuf};

use crate::recording::domain::muxer_backend::{MuxerBackend, MuxerOutput, OutputFormat};
use crate::recording::domain::recorder_error::RecorderError;
use crate::recording::domain::session_state::SessionState;
use crate::recording::domain::track_parameters::TrackParameters;
use crate::shared::constants::{OUTPUT_FORMAT_NAME, SOURCE_TIME_BASE};
use crate::shared::encoded_packet::EncodedPacket;
use crate::shared::frame_size::FrameSize;
use crate::shared::video_codec::VideoCodec;

enum State<O> {
    Unopened,
    Opened { output: O, header_written: bool },
    Faulted,
    Closed,
}

impl<O> State<O> {
    fn observe(&self) -> SessionState {
        match self {
            State::Unopened => SessionState::Unopened,
            State::Opened {
                header_written: false,
                ..
            } => SessionState::HeaderPending,
            State::Opened {
                header_written: true,
                ..
            } => SessionState::HeaderWritten,
            State::Faulted => SessionState::Faulted,
            State::Closed => SessionState::Closed,
        }
    }
}

/// Writes one stream of encoded video packets into a single-track MP4 file.
///
/// The container header needs the codec's out-of-band configuration, which
/// only arrives with the first packet, so `open` prepares the file and the
/// first `write` copies that packet's payload into the track extradata
/// before serializing the header. Packet timestamps are expected in
/// microseconds.
///
/// Calls must be serialized by the caller. Dropping an open recorder runs
/// [`close`](Self::close).
pub struct Recorder<B: MuxerBackend> {
    path: PathBuf,
    frame_size: Option<FrameSize>,
    backend: B,
    state: State<B::Output>,
}

impl<B: MuxerBackend> Recorder<B> {
    pub fn with_backend(path: impl Into<PathBuf>, backend: B) -> Self {
        Self {
            path: path.into(),
            frame_size: None,
            backend,
            state: State::Unopened,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn frame_size(&self) -> Option<FrameSize> {
        self.frame_size
    }

    pub fn state(&self) -> SessionState {
        self.state.observe()
    }

    /// Declares the picture dimensions. Only allowed before `open`.
    pub fn set_frame_size(&mut self, frame_size: FrameSize) -> Result<(), RecorderError> {
        if !matches!(self.state, State::Unopened) {
            return Err(RecorderError::InvalidState {
                operation: "set frame size",
                state: self.state(),
            });
        }
        if !frame_size.is_valid() {
            return Err(RecorderError::InvalidFrameSize {
                width: frame_size.width,
                height: frame_size.height,
            });
        }
        self.frame_size = Some(frame_size);
        Ok(())
    }

    /// Creates the output file and its single video track.
    ///
    /// Nothing is left allocated when this fails; the recorder stays
    /// `Unopened`.
    pub fn open(&mut self, codec: VideoCodec) -> Result<(), RecorderError> {
        if !matches!(self.state, State::Unopened) {
            return Err(RecorderError::InvalidState {
                operation: "open",
                state: self.state(),
            });
        }
        let frame_size = self.frame_size.ok_or(RecorderError::FrameSizeNotSet)?;

        let format = self
            .backend
            .find_output_format(OUTPUT_FORMAT_NAME)
            .ok_or_else(|| {
                log::error!("Could not find {OUTPUT_FORMAT_NAME} muxer");
                RecorderError::FormatNotFound(OUTPUT_FORMAT_NAME.to_string())
            })?;

        let track = TrackParameters::video(codec, frame_size);
        let output = self
            .backend
            .create_output(&format, &track, &self.path)
            .map_err(|e| {
                log::error!("{e}");
                e
            })?;

        log::debug!(
            "Opened {} for {} {} recording ({} muxer)",
            self.path.display(),
            frame_size,
            codec,
            format.name()
        );
        self.state = State::Opened {
            output,
            header_written: false,
        };
        Ok(())
    }

    /// Muxes one packet whose timestamps are in microseconds.
    ///
    /// The first call also writes the container header, using the packet
    /// payload as track extradata. If that fails the output is released
    /// immediately and the recorder becomes `Faulted`.
    pub fn write(&mut self, packet: &EncodedPacket<'_>) -> Result<(), RecorderError> {
        let (output, header_written) = match &mut self.state {
            State::Opened {
                output,
                header_written,
            } => (output, header_written),
            other => {
                return Err(RecorderError::InvalidState {
                    operation: "write",
                    state: other.observe(),
                })
            }
        };

        if !*header_written {
            if let Err(e) = output.write_header(packet.data) {
                log::error!("Failed to write header to recorder file: {e}");
                self.state = State::Faulted;
                return Err(e);
            }
            *header_written = true;
            log::debug!(
                "Header written with {} bytes of extradata, stream time base {}",
                packet.size(),
                output.time_base()
            );
        }

        let rescaled = packet.rescaled(SOURCE_TIME_BASE, output.time_base());
        output.write_packet(&rescaled)
    }

    /// Finalizes the file and releases the output. Never fails.
    ///
    /// A trailer failure is logged and the output is released regardless.
    /// Calling this again, or on a recorder that never opened, does nothing.
    pub fn close(&mut self) {
        match std::mem::replace(&mut self.state, State::Closed) {
            State::Opened {
                output,
                header_written,
            } => self.finish(output, header_written),
            other => self.state = other,
        }
    }

    fn finish(&self, mut output: B::Output, header_written: bool) {
        if header_written {
            match output.write_trailer() {
                Ok(()) => log::info!("Recording complete: {}", self.path.display()),
                Err(e) => log::error!("{e}"),
            }
        } else {
            log::warn!(
                "No packet was recorded, discarding trailer for {}",
                self.path.display()
            );
        }

        drop(output);
    }
}

impl<B: MuxerBackend> Drop for Recorder<B> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<B: MuxerBackend> std::fmt::Debug for Recorder<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("path", &self.path)
            .field("frame_size", &self.frame_size)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
