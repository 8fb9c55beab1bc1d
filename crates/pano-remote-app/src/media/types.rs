use std::path::PathBuf;

/// A decoded frame ready for GPU upload.
pub struct DecodedFrame {
    pub data: Vec<u8>, // RGBA8
    pub width: u32,
    pub height: u32,
}

/// Buffering milestones of a video element, in increasing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ReadyState {
    HaveNothing = 0,
    /// Dimensions and duration are known.
    HaveMetadata = 1,
    /// At least the current frame is available.
    HaveCurrentData = 2,
    HaveFutureData = 3,
    /// Enough is buffered to play without stalling.
    HaveEnoughData = 4,
}

impl ReadyState {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => ReadyState::HaveNothing,
            1 => ReadyState::HaveMetadata,
            2 => ReadyState::HaveCurrentData,
            3 => ReadyState::HaveFutureData,
            _ => ReadyState::HaveEnoughData,
        }
    }
}

/// How a video element should be created.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoConfig {
    pub src: PathBuf,
    /// Begin decoding as soon as the element exists, before `play()`.
    pub autoplay: bool,
    pub muted: bool,
    pub looping: bool,
}

impl VideoConfig {
    /// Autoplaying, muted, looping playback of `src`.
    pub fn panorama(src: impl Into<PathBuf>) -> Self {
        Self {
            src: src.into(),
            autoplay: true,
            muted: true,
            looping: true,
        }
    }
}

/// Video metadata from ffprobe.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMeta {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub duration_secs: f64,
}
