use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use mp4_recorder_core::pipeline::record_stream_use_case::{ProgressFn, RecordStreamUseCase};
use mp4_recorder_core::recording::infrastructure::ffmpeg_muxer::FfmpegRecorder;
use mp4_recorder_core::shared::constants::STREAM_EXTENSIONS;
use mp4_recorder_core::shared::frame_size::FrameSize;
use mp4_recorder_core::shared::video_codec::VideoCodec;
use mp4_recorder_core::stream::annexb_reader::split_access_units;

/// Record a raw H.264/H.265 Annex-B stream into an MP4 file.
#[derive(Parser)]
#[command(name = "mp4-record")]
struct Cli {
    /// Input elementary stream (.h264 / .h265).
    input: PathBuf,

    /// Output MP4 file.
    output: PathBuf,

    /// Declared frame width in pixels.
    #[arg(long)]
    width: u32,

    /// Declared frame height in pixels.
    #[arg(long)]
    height: u32,

    /// Frame rate used to timestamp the packets.
    #[arg(long, default_value = "30")]
    fps: u32,

    /// Stream codec: h264 or h265. Guessed from the input extension when
    /// omitted.
    #[arg(long)]
    codec: Option<String>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let codec = resolve_codec(cli.codec.as_deref(), &cli.input)?;
    let data = std::fs::read(&cli.input)?;
    let units = split_access_units(&data, codec);
    if units.is_empty() {
        return Err(format!("no {codec} access units found in {}", cli.input.display()).into());
    }
    log::info!(
        "Read {} access units ({} bytes) from {}",
        units.len(),
        data.len(),
        cli.input.display()
    );

    let mut recorder = FfmpegRecorder::new(&cli.output);
    recorder.set_frame_size(FrameSize::new(cli.width, cli.height))?;

    let progress: ProgressFn = Box::new(|current, total| {
        eprint!("\rRecording packet {current}/{total}");
        true
    });

    let mut use_case = RecordStreamUseCase::new(recorder, codec, cli.fps, Some(progress));
    let written = use_case.execute(&units)?;
    eprintln!();
    log::info!("Wrote {written} packets to {}", cli.output.display());
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), String> {
    if cli.width == 0 || cli.height == 0 {
        return Err("--width and --height must be greater than zero".into());
    }
    if cli.fps == 0 {
        return Err("--fps must be greater than zero".into());
    }
    if !cli.input.is_file() {
        return Err(format!("input file not found: {}", cli.input.display()));
    }
    if cli.input == cli.output {
        return Err("input and output must be different files".into());
    }
    Ok(())
}

fn resolve_codec(explicit: Option<&str>, input: &Path) -> Result<VideoCodec, String> {
    if let Some(name) = explicit {
        return name.parse();
    }
    let ext = input
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if !STREAM_EXTENSIONS.contains(&ext.as_str()) {
        return Err(format!(
            "cannot infer codec from '{}', pass --codec h264 or --codec h265",
            input.display()
        ));
    }
    Ok(match ext.as_str() {
        "h265" | "265" | "hevc" => VideoCodec::H265,
        _ => VideoCodec::H264,
    })
}
