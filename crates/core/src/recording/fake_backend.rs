//! Recording test double for the muxing library.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::recording::domain::muxer_backend::{MuxerBackend, MuxerOutput, OutputFormat};
use crate::recording::domain::recorder_error::RecorderError;
use crate::recording::domain::track_parameters::TrackParameters;
use crate::shared::encoded_packet::EncodedPacket;
use crate::shared::time_base::TimeBase;

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    FindFormat(String),
    CreateOutput {
        format: String,
        track: TrackParameters,
        path: PathBuf,
    },
    WriteHeader(Vec<u8>),
    WritePacket(WrittenPacket),
    WriteTrailer,
    Release,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrittenPacket {
    pub size: usize,
    pub pts: i64,
    pub dts: Option<i64>,
    pub duration: Option<i64>,
    pub is_keyframe: bool,
}

#[derive(Clone, Copy, Default)]
struct Failures {
    create_output: bool,
    header: bool,
    packets: bool,
    trailer: bool,
}

#[derive(Default)]
struct Shared {
    events: Vec<Event>,
    extradata: Option<Vec<u8>>,
}

/// Backend that logs every call instead of touching the filesystem.
///
/// Clones share the same log, so a test keeps one handle and gives the
/// other to the recorder.
#[derive(Clone)]
pub struct FakeBackend {
    shared: Arc<Mutex<Shared>>,
    has_format: bool,
    time_base: TimeBase,
    failures: Failures,
}

pub struct FakeFormat(String);

impl OutputFormat for FakeFormat {
    fn name(&self) -> &str {
        &self.0
    }
}

pub struct FakeOutput {
    shared: Arc<Mutex<Shared>>,
    time_base: TimeBase,
    failures: Failures,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared::default())),
            has_format: true,
            time_base: TimeBase::new(1, 90_000),
            failures: Failures::default(),
        }
    }

    pub fn without_format() -> Self {
        Self {
            has_format: false,
            ..Self::new()
        }
    }

    pub fn with_time_base(mut self, time_base: TimeBase) -> Self {
        self.time_base = time_base;
        self
    }

    pub fn failing_create_output(mut self) -> Self {
        self.failures.create_output = true;
        self
    }

    pub fn failing_header(mut self) -> Self {
        self.failures.header = true;
        self
    }

    pub fn failing_packets(mut self) -> Self {
        self.failures.packets = true;
        self
    }

    pub fn failing_trailer(mut self) -> Self {
        self.failures.trailer = true;
        self
    }

    pub fn events(&self) -> Vec<Event> {
        self.shared.lock().unwrap().events.clone()
    }

    pub fn count(&self, event: &Event) -> usize {
        self.events().iter().filter(|e| *e == event).count()
    }

    pub fn header_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::WriteHeader(_)))
            .count()
    }

    /// Extradata currently installed on the live track.
    pub fn extradata(&self) -> Option<Vec<u8>> {
        self.shared.lock().unwrap().extradata.clone()
    }

    pub fn packets(&self) -> Vec<WrittenPacket> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::WritePacket(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: Event) {
        self.shared.lock().unwrap().events.push(event);
    }
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MuxerBackend for FakeBackend {
    type Format = FakeFormat;
    type Output = FakeOutput;

    fn find_output_format(&self, name: &str) -> Option<FakeFormat> {
        self.record(Event::FindFormat(name.to_string()));
        self.has_format.then(|| FakeFormat(name.to_string()))
    }

    fn create_output(
        &self,
        format: &FakeFormat,
        track: &TrackParameters,
        path: &Path,
    ) -> Result<FakeOutput, RecorderError> {
        self.record(Event::CreateOutput {
            format: format.name().to_string(),
            track: *track,
            path: path.to_path_buf(),
        });
        if self.failures.create_output {
            return Err(RecorderError::OpenOutput {
                path: path.to_path_buf(),
                source: "Permission denied".into(),
            });
        }
        Ok(FakeOutput {
            shared: Arc::clone(&self.shared),
            time_base: self.time_base,
            failures: self.failures,
        })
    }
}

impl FakeOutput {
    fn record(&self, event: Event) {
        self.shared.lock().unwrap().events.push(event);
    }
}

impl MuxerOutput for FakeOutput {
    fn time_base(&self) -> TimeBase {
        self.time_base
    }

    fn write_header(&mut self, extradata: &[u8]) -> Result<(), RecorderError> {
        self.record(Event::WriteHeader(extradata.to_vec()));
        if self.failures.header {
            return Err(RecorderError::WriteHeader {
                path: PathBuf::from("fake"),
                source: "Invalid data found when processing input".into(),
            });
        }
        self.shared.lock().unwrap().extradata = Some(extradata.to_vec());
        Ok(())
    }

    fn write_packet(&mut self, packet: &EncodedPacket<'_>) -> Result<(), RecorderError> {
        if self.failures.packets {
            return Err(RecorderError::WritePacket {
                pts: packet.pts,
                source: "No space left on device".into(),
            });
        }
        self.record(Event::WritePacket(WrittenPacket {
            size: packet.size(),
            pts: packet.pts,
            dts: packet.dts,
            duration: packet.duration,
            is_keyframe: packet.is_keyframe,
        }));
        Ok(())
    }

    fn write_trailer(&mut self) -> Result<(), RecorderError> {
        self.record(Event::WriteTrailer);
        if self.failures.trailer {
            return Err(RecorderError::WriteTrailer {
                path: PathBuf::from("fake"),
                source: "I/O error".into(),
            });
        }
        Ok(())
    }
}

impl Drop for FakeOutput {
    fn drop(&mut self) {
        let mut shared = self.shared.lock().unwrap();
        shared.extradata = None;
        shared.events.push(Event::Release);
    }
}
