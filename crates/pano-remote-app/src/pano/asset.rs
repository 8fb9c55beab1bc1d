use crate::media::VideoSink;
use crate::media::types::DecodedFrame;
use crate::media::video::FfmpegVideo;

/// Texture source backed by a single video element. Shows nothing until a
/// video is attached.
#[derive(Default)]
pub struct VideoAsset {
    video: Option<FfmpegVideo>,
    frames_delivered: u64,
}

impl VideoAsset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_video(&self) -> bool {
        self.video.is_some()
    }

    pub fn frames_delivered(&self) -> u64 {
        self.frames_delivered
    }

    /// Advance the attached video and return a frame if the texture needs
    /// updating.
    pub fn advance(&mut self, dt_secs: f32) -> Option<DecodedFrame> {
        let frame = self.video.as_mut()?.advance(dt_secs)?;
        self.frames_delivered += 1;
        Some(frame)
    }
}

impl VideoSink<FfmpegVideo> for VideoAsset {
    fn set_video(&mut self, video: FfmpegVideo) {
        if self.video.is_some() {
            log::warn!("Replacing video already attached to asset");
        }
        if let Some(meta) = video.meta() {
            log::info!(
                "Video attached as texture source ({}x{})",
                meta.width,
                meta.height
            );
        }
        self.video = Some(video);
        self.frames_delivered = 0;
    }
}
