use std::path::Path;

use crate::recording::domain::recorder_error::RecorderError;
use crate::recording::domain::track_parameters::TrackParameters;
use crate::shared::encoded_packet::EncodedPacket;
use crate::shared::time_base::TimeBase;

/// A container format registered with the muxing library.
pub trait OutputFormat {
    fn name(&self) -> &str;
}

/// The muxing library as seen by the recorder: a registry of output formats
/// and a factory for output contexts.
///
/// Abstracting it lets the session logic run against a recording test
/// double as well as against FFmpeg.
pub trait MuxerBackend {
    type Format: OutputFormat;
    type Output: MuxerOutput;

    /// Returns the first registered output format whose short name is
    /// `name`, or `None` if the library build has no such format.
    fn find_output_format(&self, name: &str) -> Option<Self::Format>;

    /// Allocates an output context bound to `format`, creates its single
    /// track from `track`, and opens the byte sink at `path` for writing.
    ///
    /// On error everything allocated so far has already been released.
    fn create_output(
        &self,
        format: &Self::Format,
        track: &TrackParameters,
        path: &Path,
    ) -> Result<Self::Output, RecorderError>;
}

/// An open output context: one track plus the byte sink it writes to.
///
/// Dropping the value closes the sink and frees the context, whatever state
/// the container is in.
pub trait MuxerOutput {
    /// Time base the track's packets must be expressed in. Only final once
    /// the header has been written.
    fn time_base(&self) -> TimeBase;

    /// Installs a copy of `extradata` on the track and serializes the
    /// container header. On failure the copy has been freed again.
    fn write_header(&mut self, extradata: &[u8]) -> Result<(), RecorderError>;

    /// Submits a packet, already in [`time_base`](Self::time_base) units,
    /// for interleaved writing.
    fn write_packet(&mut self, packet: &EncodedPacket<'_>) -> Result<(), RecorderError>;

    /// Finalizes index and metadata structures.
    fn write_trailer(&mut self) -> Result<(), RecorderError>;
}
