//! Streaming video element backed by ffmpeg subprocesses.
//!
//! - `ffprobe` probes metadata (dimensions, fps, duration) on the worker thread
//! - `ffmpeg -f rawvideo -pix_fmt rgba` streams frames into a bounded queue
//! - ready state climbs HaveMetadata → HaveCurrentData → HaveEnoughData as
//!   the queue fills, and never goes back down
//! - looping restarts ffmpeg at EOF; dropping the element stops the worker

use std::io::{ErrorKind, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded};

use super::types::{DecodedFrame, ReadyState, VideoConfig, VideoMeta};
use super::{PlaybackStartError, VideoBackend, VideoElement};

/// Frames buffered ahead of playback. A full queue counts as enough data.
const BUFFER_FRAMES: usize = 12;

/// Maximum frame backlog consumed in one `advance` call after a stall.
const MAX_CATCHUP_FRAMES: f64 = 4.0;

/// Check if ffmpeg/ffprobe are available on the system. Cached per process.
pub fn ffmpeg_available() -> bool {
    static AVAILABLE: OnceLock<bool> = OnceLock::new();
    *AVAILABLE.get_or_init(|| {
        ["ffprobe", "ffmpeg"].iter().all(|tool| {
            Command::new(tool)
                .arg("-version")
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .map(|s| s.success())
                .unwrap_or(false)
        })
    })
}

/// Probe video metadata using ffprobe.
pub fn probe_video(path: &Path) -> Result<VideoMeta, String> {
    let output = Command::new("ffprobe")
        .args([
            "-v", "quiet",
            "-print_format", "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| format!("ffprobe failed to execute: {e}"))?;

    if !output.status.success() {
        return Err("ffprobe returned non-zero exit code".to_string());
    }

    parse_probe_output(&output.stdout)
}

fn parse_probe_output(stdout: &[u8]) -> Result<VideoMeta, String> {
    let json: serde_json::Value = serde_json::from_slice(stdout)
        .map_err(|e| format!("Failed to parse ffprobe JSON: {e}"))?;

    let streams = json["streams"]
        .as_array()
        .ok_or("No streams in ffprobe output")?;

    let video_stream = streams
        .iter()
        .find(|s| s["codec_type"].as_str() == Some("video"))
        .ok_or("No video stream found")?;

    let width = dimension(video_stream, "width")?;
    let height = dimension(video_stream, "height")?;
    if width == 0 || height == 0 {
        return Err(format!("Invalid video dimensions {width}x{height}"));
    }

    let fps = parse_frame_rate(
        video_stream["avg_frame_rate"]
            .as_str()
            .filter(|r| *r != "0/0")
            .or_else(|| video_stream["r_frame_rate"].as_str())
            .unwrap_or("30/1"),
    );

    let duration_secs = json["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .or_else(|| {
            video_stream["duration"]
                .as_str()
                .and_then(|s| s.parse::<f64>().ok())
        })
        .unwrap_or(0.0);

    Ok(VideoMeta {
        width,
        height,
        fps,
        duration_secs,
    })
}

fn dimension(stream: &serde_json::Value, key: &str) -> Result<u32, String> {
    let value = stream[key]
        .as_u64()
        .ok_or_else(|| format!("Missing {key}"))?;
    u32::try_from(value).map_err(|_| format!("Video {key} {value} out of range"))
}

fn parse_frame_rate(rate: &str) -> f64 {
    if let Some((num, den)) = rate.split_once('/') {
        let n: f64 = num.parse().unwrap_or(30.0);
        let d: f64 = den.parse().unwrap_or(1.0);
        if d > 0.0 && n > 0.0 { n / d } else { 30.0 }
    } else {
        rate.parse().ok().filter(|r: &f64| *r > 0.0).unwrap_or(30.0)
    }
}

/// State shared between the element and its decode worker.
#[derive(Default)]
struct Shared {
    ready_state: AtomicU8,
    stop: AtomicBool,
    meta: OnceLock<VideoMeta>,
}

impl Shared {
    /// Raise the ready state to at least `state`.
    fn advance(&self, state: ReadyState) {
        let previous = self.ready_state.fetch_max(state as u8, Ordering::AcqRel);
        if previous < state as u8 {
            log::debug!("Video ready state: {:?}", state);
        }
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}

/// Creates [`FfmpegVideo`] elements, starting them right away when the
/// config asks for autoplay.
#[derive(Default)]
pub struct FfmpegBackend;

impl VideoBackend for FfmpegBackend {
    type Video = FfmpegVideo;

    fn create_video(&mut self, config: &VideoConfig) -> FfmpegVideo {
        let mut video = FfmpegVideo::new(config.clone());
        if config.autoplay {
            if let Err(e) = video.play() {
                log::debug!("Autoplay did not start: {e}");
            }
        }
        video
    }
}

pub struct FfmpegVideo {
    config: VideoConfig,
    shared: Arc<Shared>,
    frame_rx: Option<Receiver<DecodedFrame>>,
    worker: Option<JoinHandle<()>>,
    frame_elapsed: f64,
    shown_first_frame: bool,
}

impl FfmpegVideo {
    pub fn new(config: VideoConfig) -> Self {
        if !config.muted {
            log::warn!("Audio output is not supported; video will play muted");
        }
        Self {
            config,
            shared: Arc::new(Shared::default()),
            frame_rx: None,
            worker: None,
            frame_elapsed: 0.0,
            shown_first_frame: false,
        }
    }

    pub fn meta(&self) -> Option<&VideoMeta> {
        self.shared.meta.get()
    }

    /// Advance playback by `dt_secs` and return the newest frame that became
    /// due, if any. The first buffered frame is returned immediately.
    pub fn advance(&mut self, dt_secs: f32) -> Option<DecodedFrame> {
        let rx = self.frame_rx.as_ref()?;

        if !self.shown_first_frame {
            let frame = rx.try_recv().ok()?;
            self.shown_first_frame = true;
            self.frame_elapsed = 0.0;
            return Some(frame);
        }

        let fps = self.shared.meta.get().map_or(30.0, |m| m.fps);
        let frame_secs = 1.0 / fps.max(1.0);
        self.frame_elapsed = (self.frame_elapsed + dt_secs as f64).min(frame_secs * MAX_CATCHUP_FRAMES);

        let mut latest = None;
        while self.frame_elapsed >= frame_secs {
            match rx.try_recv() {
                Ok(frame) => {
                    self.frame_elapsed -= frame_secs;
                    latest = Some(frame);
                }
                Err(TryRecvError::Empty) => {
                    // Decoder is behind; hold the current frame.
                    self.frame_elapsed = 0.0;
                    break;
                }
                Err(TryRecvError::Disconnected) => {
                    self.frame_elapsed = 0.0;
                    break;
                }
            }
        }
        latest
    }
}

impl VideoElement for FfmpegVideo {
    fn ready_state(&self) -> ReadyState {
        ReadyState::from_u8(self.shared.ready_state.load(Ordering::Acquire))
    }

    fn play(&mut self) -> Result<(), PlaybackStartError> {
        if self.worker.is_some() {
            return Ok(());
        }
        if !ffmpeg_available() {
            return Err(PlaybackStartError::BackendUnavailable);
        }
        if !self.config.src.exists() {
            return Err(PlaybackStartError::SourceNotFound(self.config.src.clone()));
        }

        let (frame_tx, frame_rx) = bounded::<DecodedFrame>(BUFFER_FRAMES);
        let shared = Arc::clone(&self.shared);
        let config = self.config.clone();
        let handle = thread::Builder::new()
            .name("pano-video-decoder".into())
            .spawn(move || decode_worker(&config, &shared, &frame_tx))?;

        self.frame_rx = Some(frame_rx);
        self.worker = Some(handle);
        Ok(())
    }
}

impl Drop for FfmpegVideo {
    fn drop(&mut self) {
        self.shared.stop.store(true, Ordering::Release);
        // Dropping the receiver unblocks a worker waiting on a full queue
        self.frame_rx.take();
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

enum StreamEnd {
    Eof,
    Stopped,
}

fn decode_worker(config: &VideoConfig, shared: &Shared, frame_tx: &Sender<DecodedFrame>) {
    let meta = match probe_video(&config.src) {
        Ok(meta) => meta,
        Err(e) => {
            log::error!("Failed to probe video '{}': {e}", config.src.display());
            return;
        }
    };
    log::info!(
        "Video metadata: {}x{} @ {:.2} fps, {:.1}s",
        meta.width,
        meta.height,
        meta.fps,
        meta.duration_secs
    );
    let _ = shared.meta.set(meta.clone());
    shared.advance(ReadyState::HaveMetadata);

    loop {
        match stream_frames(config, &meta, shared, frame_tx) {
            Ok(StreamEnd::Eof) if config.looping && !shared.stopped() => {
                log::debug!("Video reached end, looping");
            }
            Ok(StreamEnd::Eof) => {
                // Everything has been decoded; nothing left to wait for
                shared.advance(ReadyState::HaveEnoughData);
                log::info!("Video playback finished");
                return;
            }
            Ok(StreamEnd::Stopped) => {
                log::debug!("Video decode worker stopped");
                return;
            }
            Err(e) => {
                log::error!("Video decode failed: {e}");
                return;
            }
        }
    }
}

fn spawn_ffmpeg(config: &VideoConfig, meta: &VideoMeta) -> Result<Child, String> {
    let mut command = Command::new("ffmpeg");
    command.args(["-v", "quiet", "-i"]).arg(&config.src);
    if config.muted {
        command.arg("-an");
    }
    command
        .args([
            "-f", "rawvideo",
            "-pix_fmt", "rgba",
            "-s", &format!("{}x{}", meta.width, meta.height),
            "pipe:1",
        ])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| format!("Failed to spawn ffmpeg: {e}"))
}

/// Run one ffmpeg pass over the source, pushing frames until EOF.
fn stream_frames(
    config: &VideoConfig,
    meta: &VideoMeta,
    shared: &Shared,
    frame_tx: &Sender<DecodedFrame>,
) -> Result<StreamEnd, String> {
    let frame_size = (meta.width as usize) * (meta.height as usize) * 4;
    let mut child = spawn_ffmpeg(config, meta)?;
    let mut stdout = child.stdout.take().ok_or("ffmpeg: no stdout pipe")?;

    let mut decoded = 0usize;
    let end = loop {
        if shared.stopped() {
            break Ok(StreamEnd::Stopped);
        }

        let mut buf = vec![0u8; frame_size];
        match stdout.read_exact(&mut buf) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                break if decoded == 0 {
                    Err("ffmpeg decoded zero frames".to_string())
                } else {
                    Ok(StreamEnd::Eof)
                };
            }
            Err(e) => break Err(format!("Failed to read ffmpeg output: {e}")),
        }

        let frame = DecodedFrame {
            data: buf,
            width: meta.width,
            height: meta.height,
        };
        // Blocks while the queue is full; errors once the element is dropped
        if frame_tx.send(frame).is_err() {
            break Ok(StreamEnd::Stopped);
        }
        decoded += 1;

        shared.advance(ReadyState::HaveCurrentData);
        if frame_tx.len() >= BUFFER_FRAMES / 2 {
            shared.advance(ReadyState::HaveFutureData);
        }
        if frame_tx.is_full() {
            shared.advance(ReadyState::HaveEnoughData);
        }
    };

    let _ = child.kill();
    let _ = child.wait();
    end
}
