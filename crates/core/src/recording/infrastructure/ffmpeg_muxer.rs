use std::ffi::{c_int, CString};
use std::path::{Path, PathBuf};
use std::ptr;

use ffmpeg_next::ffi;

use crate::recording::domain::muxer_backend::{MuxerBackend, MuxerOutput};
use crate::recording::domain::recorder::Recorder;
use crate::recording::domain::recorder_error::RecorderError;
use crate::recording::domain::track_parameters::TrackParameters;
use crate::recording::infrastructure::ffmpeg_format_resolver::{
    find_output_format, FfmpegOutputFormat,
};
use crate::shared::encoded_packet::EncodedPacket;
use crate::shared::time_base::TimeBase;

pub type FfmpegRecorder = Recorder<FfmpegBackend>;

impl Recorder<FfmpegBackend> {
    /// Recorder writing through the linked FFmpeg libraries.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Recorder::with_backend(path, FfmpegBackend)
    }
}

/// Muxes through libavformat via the raw `ffmpeg-next` bindings.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegBackend;

impl MuxerBackend for FfmpegBackend {
    type Format = FfmpegOutputFormat;
    type Output = FfmpegOutput;

    fn find_output_format(&self, name: &str) -> Option<FfmpegOutputFormat> {
        if let Err(e) = ffmpeg_next::init() {
            log::error!("Failed to initialize FFmpeg: {e}");
            return None;
        }
        find_output_format(name)
    }

    fn create_output(
        &self,
        format: &FfmpegOutputFormat,
        track: &TrackParameters,
        path: &Path,
    ) -> Result<FfmpegOutput, RecorderError> {
        ffmpeg_next::init().map_err(|e| RecorderError::Initialize(Box::new(e)))?;

        let c_path = path
            .to_str()
            .and_then(|p| CString::new(p).ok())
            .ok_or_else(|| RecorderError::InvalidPath(path.to_path_buf()))?;

        let context = unsafe { ffi::avformat_alloc_context() };
        if context.is_null() {
            return Err(RecorderError::Allocation("output context"));
        }

        // From here on, dropping `output` frees the context (and the sink
        // once it is open).
        let mut output = FfmpegOutput {
            context,
            stream: ptr::null_mut(),
            path: path.to_path_buf(),
        };

        unsafe {
            (*context).oformat = format.as_context_format();
        }

        let stream = unsafe { ffi::avformat_new_stream(context, ptr::null()) };
        if stream.is_null() {
            return Err(RecorderError::Allocation("output stream"));
        }
        output.stream = stream;
        output.set_track_parameters(track)?;

        let ret = unsafe {
            ffi::avio_open(&mut (*context).pb, c_path.as_ptr(), ffi::AVIO_FLAG_WRITE)
        };
        if ret < 0 {
            return Err(RecorderError::OpenOutput {
                path: path.to_path_buf(),
                source: Box::new(ffmpeg_next::Error::from(ret)),
            });
        }

        Ok(output)
    }
}

/// An `AVFormatContext` with exactly one video stream and an open
/// `AVIOContext`.
pub struct FfmpegOutput {
    context: *mut ffi::AVFormatContext,
    stream: *mut ffi::AVStream,
    path: PathBuf,
}

// Safety: FfmpegOutput is only used from a single thread at a time.
// The raw pointers inside are owned exclusively and never shared.
unsafe impl Send for FfmpegOutput {}

impl FfmpegOutput {
    /// Fills the stream's codec parameters.
    ///
    /// Only the `codecpar` layout exists in the FFmpeg versions ffmpeg-next
    /// binds, so this is the single place the track is described.
    fn set_track_parameters(&mut self, track: &TrackParameters) -> Result<(), RecorderError> {
        let invalid_size = || RecorderError::InvalidFrameSize {
            width: track.frame_size.width,
            height: track.frame_size.height,
        };
        let width = c_int::try_from(track.frame_size.width).map_err(|_| invalid_size())?;
        let height = c_int::try_from(track.frame_size.height).map_err(|_| invalid_size())?;
        let codec_id: ffmpeg_next::codec::Id = track.codec.into();
        let pixel_format: ffmpeg_next::format::Pixel = track.pixel_format.into();
        unsafe {
            let par = (*self.stream).codecpar;
            (*par).codec_type = ffi::AVMediaType::AVMEDIA_TYPE_VIDEO;
            (*par).codec_id = codec_id.into();
            (*par).format = ffi::AVPixelFormat::from(pixel_format) as c_int;
            (*par).width = width;
            (*par).height = height;
        }
        Ok(())
    }

    fn codec_parameters(&self) -> &ffi::AVCodecParameters {
        unsafe { &*(*self.stream).codecpar }
    }
}

impl MuxerOutput for FfmpegOutput {
    fn time_base(&self) -> TimeBase {
        ffmpeg_next::Rational::from(unsafe { (*self.stream).time_base }).into()
    }

    fn write_header(&mut self, extradata: &[u8]) -> Result<(), RecorderError> {
        let mut buffer =
            ExtradataBuffer::copy_from(extradata).ok_or(RecorderError::Allocation("extradata"))?;
        let size = c_int::try_from(buffer.len).map_err(|_| RecorderError::Allocation("extradata"))?;

        let ret = unsafe {
            let par = (*self.stream).codecpar;
            (*par).extradata = buffer.as_mut_ptr();
            (*par).extradata_size = size;
            ffi::avformat_write_header(self.context, ptr::null_mut())
        };

        if ret < 0 {
            // Detach before `buffer` frees it.
            unsafe {
                let par = (*self.stream).codecpar;
                (*par).extradata = ptr::null_mut();
                (*par).extradata_size = 0;
            }
            return Err(RecorderError::WriteHeader {
                path: self.path.clone(),
                source: Box::new(ffmpeg_next::Error::from(ret)),
            });
        }

        // The codec parameters own it now; avformat_free_context frees it.
        buffer.hand_over();
        Ok(())
    }

    fn write_packet(&mut self, packet: &EncodedPacket<'_>) -> Result<(), RecorderError> {
        let mut av_packet = ffmpeg_next::Packet::copy(packet.data);
        av_packet.set_stream(unsafe { (*self.stream).index } as usize);
        av_packet.set_pts(Some(packet.pts));
        av_packet.set_dts(Some(packet.dts.unwrap_or(packet.pts)));
        if let Some(duration) = packet.duration {
            av_packet.set_duration(duration);
        }
        if packet.is_keyframe {
            av_packet.set_flags(ffmpeg_next::packet::Flags::KEY);
        }

        let ret = unsafe { ffi::av_interleaved_write_frame(self.context, av_packet.as_mut_ptr()) };
        if ret < 0 {
            return Err(RecorderError::WritePacket {
                pts: packet.pts,
                source: Box::new(ffmpeg_next::Error::from(ret)),
            });
        }
        Ok(())
    }

    fn write_trailer(&mut self) -> Result<(), RecorderError> {
        let ret = unsafe { ffi::av_write_trailer(self.context) };
        if ret < 0 {
            return Err(RecorderError::WriteTrailer {
                path: self.path.clone(),
                source: Box::new(ffmpeg_next::Error::from(ret)),
            });
        }
        Ok(())
    }
}

impl Drop for FfmpegOutput {
    fn drop(&mut self) {
        unsafe {
            if !(*self.context).pb.is_null() {
                ffi::avio_closep(&mut (*self.context).pb);
            }
            ffi::avformat_free_context(self.context);
        }
    }
}

impl std::fmt::Debug for FfmpegOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let par = self.codec_parameters();
        f.debug_struct("FfmpegOutput")
            .field("path", &self.path)
            .field("width", &par.width)
            .field("height", &par.height)
            .field("extradata_size", &par.extradata_size)
            .finish_non_exhaustive()
    }
}

/// Extradata allocated with `av_mallocz` so libavformat can free it.
///
/// Carries the zeroed input padding FFmpeg's parsers read past the end;
/// `len` is the payload size only. Freed with `av_free` unless ownership
/// is handed over through [`hand_over`](Self::hand_over).
struct ExtradataBuffer {
    ptr: *mut u8,
    len: usize,
}

impl ExtradataBuffer {
    fn copy_from(data: &[u8]) -> Option<Self> {
        let padded = data.len() + ffi::AV_INPUT_BUFFER_PADDING_SIZE as usize;
        let ptr = unsafe { ffi::av_mallocz(padded) } as *mut u8;
        if ptr.is_null() {
            return None;
        }
        unsafe { ptr::copy_nonoverlapping(data.as_ptr(), ptr, data.len()) };
        Some(Self {
            ptr,
            len: data.len(),
        })
    }

    fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr
    }

    /// Gives up ownership once the buffer has been installed elsewhere.
    fn hand_over(self) {
        std::mem::forget(self);
    }
}

impl Drop for ExtradataBuffer {
    fn drop(&mut self) {
        unsafe { ffi::av_free(self.ptr as *mut _) };
    }
}
