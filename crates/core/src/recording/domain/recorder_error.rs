use std::path::PathBuf;

use thiserror::Error;

use crate::recording::domain::session_state::SessionState;

/// Error reported by the muxing library, already rendered with its
/// human-readable description.
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("failed to initialize muxing library: {0}")]
    Initialize(#[source] BackendError),
    #[error("could not find {0} muxer")]
    FormatNotFound(String),
    #[error("frame size must be set before open")]
    FrameSizeNotSet,
    #[error("invalid frame size {width}x{height}")]
    InvalidFrameSize { width: u32, height: u32 },
    #[error("cannot {operation} while recorder is {state:?}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },
    #[error("could not allocate {0}")]
    Allocation(&'static str),
    #[error("output path is not representable: {0}")]
    InvalidPath(PathBuf),
    #[error("failed to open output file {path}: {source}")]
    OpenOutput {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error("failed to write header to {path}: {source}")]
    WriteHeader {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error("failed to write packet (pts {pts}): {source}")]
    WritePacket {
        pts: i64,
        #[source]
        source: BackendError,
    },
    #[error("failed to write trailer to {path}: {source}")]
    WriteTrailer {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_output_message_includes_description() {
        let err = RecorderError::OpenOutput {
            path: PathBuf::from("/nope/out.mp4"),
            source: "No such file or directory".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to open output file /nope/out.mp4: No such file or directory"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_invalid_state_message() {
        let err = RecorderError::InvalidState {
            operation: "write",
            state: SessionState::Closed,
        };
        assert_eq!(err.to_string(), "cannot write while recorder is Closed");
    }

    #[test]
    fn test_format_not_found_message() {
        let err = RecorderError::FormatNotFound("mp4".into());
        assert_eq!(err.to_string(), "could not find mp4 muxer");
    }

    #[test]
    fn test_initialize_message() {
        let err = RecorderError::Initialize("library mismatch".into());
        assert_eq!(
            err.to_string(),
            "failed to initialize muxing library: library mismatch"
        );
    }
}
