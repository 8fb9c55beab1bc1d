pub mod readiness;
pub mod types;
pub mod video;

use std::path::PathBuf;

use thiserror::Error;

use types::{ReadyState, VideoConfig};

/// Why a video element refused to begin playback.
#[derive(Debug, Error)]
pub enum PlaybackStartError {
    #[error("ffmpeg/ffprobe not found on PATH")]
    BackendUnavailable,
    #[error("video source not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("failed to spawn decode worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// A playable video whose buffering progress can be sampled.
pub trait VideoElement {
    fn ready_state(&self) -> ReadyState;
    /// Request playback. Calling again once playing is a no-op.
    fn play(&mut self) -> Result<(), PlaybackStartError>;
}

/// Creates video elements.
pub trait VideoBackend {
    type Video: VideoElement;

    fn create_video(&mut self, config: &VideoConfig) -> Self::Video;
}

/// Texture source that accepts a fully buffered video.
pub trait VideoSink<V> {
    fn set_video(&mut self, video: V);
}
