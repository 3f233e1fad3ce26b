use std::ffi::{c_void, CStr};
use std::ptr;

use ffmpeg_next::ffi;

use crate::recording::domain::muxer_backend::OutputFormat;

/// A muxer registered in the linked libavformat.
///
/// Registered formats are static tables inside the library, so the pointer
/// stays valid for the life of the process.
#[derive(Clone, Copy, Debug)]
pub struct FfmpegOutputFormat {
    ptr: *const ffi::AVOutputFormat,
}

// Safety: the descriptor points at immutable, process-lifetime library data.
unsafe impl Send for FfmpegOutputFormat {}

impl FfmpegOutputFormat {
    pub fn as_ptr(&self) -> *const ffi::AVOutputFormat {
        self.ptr
    }

    /// The descriptor in the form `AVFormatContext::oformat` accepts.
    ///
    /// `av_muxer_iterate` hands out pointer-to-const, while libavformat
    /// releases before 5.0 still declare the context field as
    /// pointer-to-mutable. The muxer never writes through it.
    pub(crate) fn as_context_format(&self) -> *mut ffi::AVOutputFormat {
        self.ptr as *mut ffi::AVOutputFormat
    }

    pub fn long_name(&self) -> Option<&str> {
        unsafe {
            let long_name = (*self.ptr).long_name;
            if long_name.is_null() {
                None
            } else {
                CStr::from_ptr(long_name).to_str().ok()
            }
        }
    }
}

impl OutputFormat for FfmpegOutputFormat {
    fn name(&self) -> &str {
        unsafe { CStr::from_ptr((*self.ptr).name) }
            .to_str()
            .unwrap_or_default()
    }
}

/// Walks libavformat's muxer registry and returns the first format whose
/// short name is exactly `name`.
pub fn find_output_format(name: &str) -> Option<FfmpegOutputFormat> {
    let mut opaque: *mut c_void = ptr::null_mut();
    loop {
        let format = unsafe { ffi::av_muxer_iterate(&mut opaque) };
        if format.is_null() {
            return None;
        }
        let short_name = unsafe { (*format).name };
        if short_name.is_null() {
            continue;
        }
        if unsafe { CStr::from_ptr(short_name) }.to_bytes() == name.as_bytes() {
            return Some(FfmpegOutputFormat { ptr: format });
        }
    }
}
