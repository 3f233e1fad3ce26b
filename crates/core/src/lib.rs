//! Incremental single-track MP4 recording of already-encoded video packets.
//!
//! [`Recorder`](recording::domain::recorder::Recorder) owns one output file:
//! `open` prepares the container, the first `write` supplies the codec
//! configuration that goes into the header, and `close` writes the index so
//! the file is seekable.

pub mod shared {
    pub mod constants;
    pub mod encoded_packet;
    pub mod frame_size;
    pub mod time_base;
    pub mod video_codec;
}

pub mod recording {
    pub mod domain {
        pub mod muxer_backend;
        pub mod recorder;
        pub mod recorder_error;
        pub mod session_state;
        pub mod track_parameters;
    }

    pub mod infrastructure {
        pub mod ffmpeg_format_resolver;
        pub mod ffmpeg_muxer;
    }

    #[cfg(test)]
    pub(crate) mod fake_backend;
}

pub mod stream {
    pub mod annexb_reader;
}

pub mod pipeline {
    pub mod record_stream_use_case;
}
