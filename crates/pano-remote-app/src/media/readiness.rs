//! One-shot gate that brings a video from "not requested" to "safe to sample
//! frames from" before handing it to the texture source.
//!
//! - `try_start` creates and plays the video element exactly once
//! - `HaveMetadata` is awaited first, then `HaveEnoughData`; the second poll
//!   only exists once the first has completed
//! - polling is cooperative: the render loop calls `poll` every frame and the
//!   element is sampled once per elapsed interval
//! - a milestone that never arrives leaves the gate waiting forever

use std::time::{Duration, Instant};

use super::types::{ReadyState, VideoConfig};
use super::{VideoBackend, VideoElement, VideoSink};

/// Outcome of a single poll tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Pending,
    Reached,
}

/// Waits for an element to reach a ready state by sampling it on a fixed
/// interval. The first sample happens one interval after `start`.
#[derive(Debug, Clone)]
pub struct ReadinessPoll {
    target: ReadyState,
    interval: Duration,
    next_sample: Instant,
    samples: u32,
}

impl ReadinessPoll {
    pub fn start(target: ReadyState, interval: Duration, now: Instant) -> Self {
        Self {
            target,
            interval,
            next_sample: now + interval,
            samples: 0,
        }
    }

    /// Number of times the element has been sampled.
    pub fn samples(&self) -> u32 {
        self.samples
    }

    pub fn tick(&mut self, now: Instant, element: &impl VideoElement) -> PollStatus {
        if now < self.next_sample {
            return PollStatus::Pending;
        }
        self.samples += 1;
        if element.ready_state() >= self.target {
            return PollStatus::Reached;
        }
        self.next_sample = now + self.interval;
        PollStatus::Pending
    }
}

/// Observable phase of the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessState {
    NotStarted,
    Starting,
    AwaitingMetadata,
    AwaitingData,
    Ready,
    Failed,
}

enum Readiness<V> {
    NotStarted,
    Starting,
    AwaitingMetadata { video: V, poll: ReadinessPoll },
    AwaitingData { video: V, poll: ReadinessPoll },
    Ready,
    Failed,
}

impl<V> Readiness<V> {
    fn state(&self) -> ReadinessState {
        match self {
            Readiness::NotStarted => ReadinessState::NotStarted,
            Readiness::Starting => ReadinessState::Starting,
            Readiness::AwaitingMetadata { .. } => ReadinessState::AwaitingMetadata,
            Readiness::AwaitingData { .. } => ReadinessState::AwaitingData,
            Readiness::Ready => ReadinessState::Ready,
            Readiness::Failed => ReadinessState::Failed,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GateOptions {
    pub poll_interval: Duration,
    /// Keep waiting for readiness when `play()` is rejected instead of
    /// failing; autoplay may still bring the element up.
    pub continue_after_play_failure: bool,
}

impl Default for GateOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            continue_after_play_failure: false,
        }
    }
}

pub struct MediaReadinessGate<B: VideoBackend> {
    backend: B,
    config: VideoConfig,
    options: GateOptions,
    readiness: Readiness<B::Video>,
}

impl<B: VideoBackend> MediaReadinessGate<B> {
    pub fn new(backend: B, config: VideoConfig, options: GateOptions) -> Self {
        Self {
            backend,
            config,
            options,
            readiness: Readiness::NotStarted,
        }
    }

    pub fn state(&self) -> ReadinessState {
        self.readiness.state()
    }

    /// Create the video element and request playback. Only the first call
    /// has any effect; returns whether this call started the media.
    pub fn try_start(&mut self, now: Instant) -> bool {
        if !matches!(self.readiness, Readiness::NotStarted) {
            log::debug!("Media already started ({:?})", self.state());
            return false;
        }
        self.readiness = Readiness::Starting;

        log::info!("Starting video: {}", self.config.src.display());
        let mut video = self.backend.create_video(&self.config);
        if let Err(e) = video.play() {
            if self.options.continue_after_play_failure {
                log::error!("Video playback failed to start: {e} (still waiting for readiness)");
            } else {
                log::error!("Video playback failed to start: {e}");
                self.readiness = Readiness::Failed;
                return true;
            }
        }

        self.readiness = Readiness::AwaitingMetadata {
            poll: ReadinessPoll::start(ReadyState::HaveMetadata, self.options.poll_interval, now),
            video,
        };
        true
    }

    /// Advance whichever readiness poll is active. Once the element has
    /// enough data it is handed to `sink`, exactly once.
    pub fn poll(&mut self, now: Instant, sink: &mut impl VideoSink<B::Video>) -> ReadinessState {
        let interval = self.options.poll_interval;
        self.readiness = match std::mem::replace(&mut self.readiness, Readiness::Starting) {
            Readiness::AwaitingMetadata { video, mut poll } => match poll.tick(now, &video) {
                PollStatus::Pending => Readiness::AwaitingMetadata { video, poll },
                PollStatus::Reached => {
                    log::info!("Video metadata available after {} polls", poll.samples());
                    Readiness::AwaitingData {
                        poll: ReadinessPoll::start(ReadyState::HaveEnoughData, interval, now),
                        video,
                    }
                }
            },
            Readiness::AwaitingData { video, mut poll } => match poll.tick(now, &video) {
                PollStatus::Pending => Readiness::AwaitingData { video, poll },
                PollStatus::Reached => {
                    log::info!("Video buffered, attaching texture source");
                    sink.set_video(video);
                    Readiness::Ready
                }
            },
            other => other,
        };
        self.state()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::media::PlaybackStartError;

    #[derive(Default)]
    struct FakeShared {
        ready: Cell<u8>,
        created: Cell<u32>,
        plays: Cell<u32>,
        /// State seen by each sample, in order.
        samples: RefCell<Vec<ReadyState>>,
    }

    struct FakeVideo {
        id: u32,
        shared: Rc<FakeShared>,
        fail_play: bool,
    }

    impl VideoElement for FakeVideo {
        fn ready_state(&self) -> ReadyState {
            let state = ReadyState::from_u8(self.shared.ready.get());
            self.shared.samples.borrow_mut().push(state);
            state
        }

        fn play(&mut self) -> Result<(), PlaybackStartError> {
            self.shared.plays.set(self.shared.plays.get() + 1);
            if self.fail_play {
                Err(PlaybackStartError::BackendUnavailable)
            } else {
                Ok(())
            }
        }
    }

    struct FakeBackend {
        shared: Rc<FakeShared>,
        fail_play: bool,
    }

    impl VideoBackend for FakeBackend {
        type Video = FakeVideo;

        fn create_video(&mut self, _config: &VideoConfig) -> FakeVideo {
            let id = self.shared.created.get() + 1;
            self.shared.created.set(id);
            FakeVideo {
                id,
                shared: Rc::clone(&self.shared),
                fail_play: self.fail_play,
            }
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        attached: Vec<u32>,
    }

    impl VideoSink<FakeVideo> for RecordingSink {
        fn set_video(&mut self, video: FakeVideo) {
            self.attached.push(video.id);
        }
    }

    const INTERVAL: Duration = Duration::from_millis(100);

    fn gate(fail_play: bool, continue_after: bool) -> (MediaReadinessGate<FakeBackend>, Rc<FakeShared>) {
        let shared = Rc::new(FakeShared::default());
        let backend = FakeBackend {
            shared: Rc::clone(&shared),
            fail_play,
        };
        let options = GateOptions {
            poll_interval: INTERVAL,
            continue_after_play_failure: continue_after,
        };
        (
            MediaReadinessGate::new(backend, VideoConfig::panorama("pano.mp4"), options),
            shared,
        )
    }

    fn set_ready(shared: &FakeShared, state: ReadyState) {
        shared.ready.set(state as u8);
    }

    #[test]
    fn starts_not_started() {
        let (gate, shared) = gate(false, false);
        assert_eq!(gate.state(), ReadinessState::NotStarted);
        assert_eq!(shared.created.get(), 0);
    }

    #[test]
    fn try_start_is_idempotent() {
        let (mut gate, shared) = gate(false, false);
        let t0 = Instant::now();
        assert!(gate.try_start(t0));
        for _ in 0..5 {
            assert!(!gate.try_start(t0));
        }
        assert_eq!(shared.created.get(), 1);
        assert_eq!(shared.plays.get(), 1);
        assert_eq!(gate.state(), ReadinessState::AwaitingMetadata);
    }

    #[test]
    fn play_failure_is_terminal() {
        let (mut gate, shared) = gate(true, false);
        let t0 = Instant::now();
        assert!(gate.try_start(t0));
        assert_eq!(gate.state(), ReadinessState::Failed);

        set_ready(&shared, ReadyState::HaveEnoughData);
        let mut sink = RecordingSink::default();
        for i in 1..10 {
            gate.poll(t0 + INTERVAL * i, &mut sink);
        }
        assert_eq!(gate.state(), ReadinessState::Failed);
        assert!(sink.attached.is_empty());
        assert!(!gate.try_start(t0));
        assert_eq!(shared.created.get(), 1);
    }

    #[test]
    fn play_failure_can_keep_polling() {
        let (mut gate, shared) = gate(true, true);
        let t0 = Instant::now();
        gate.try_start(t0);
        assert_eq!(gate.state(), ReadinessState::AwaitingMetadata);

        set_ready(&shared, ReadyState::HaveEnoughData);
        let mut sink = RecordingSink::default();
        gate.poll(t0 + INTERVAL, &mut sink);
        gate.poll(t0 + INTERVAL * 2, &mut sink);
        assert_eq!(gate.state(), ReadinessState::Ready);
        assert_eq!(sink.attached, vec![1]);
    }

    #[test]
    fn samples_only_on_interval_boundaries() {
        let (mut gate, shared) = gate(false, false);
        let t0 = Instant::now();
        gate.try_start(t0);
        let mut sink = RecordingSink::default();

        gate.poll(t0, &mut sink);
        gate.poll(t0 + Duration::from_millis(50), &mut sink);
        assert!(shared.samples.borrow().is_empty());

        gate.poll(t0 + INTERVAL, &mut sink);
        assert_eq!(shared.samples.borrow().len(), 1);
        gate.poll(t0 + Duration::from_millis(150), &mut sink);
        assert_eq!(shared.samples.borrow().len(), 1);
        gate.poll(t0 + INTERVAL * 2, &mut sink);
        assert_eq!(shared.samples.borrow().len(), 2);
    }

    #[test]
    fn milestones_are_awaited_in_order() {
        let (mut gate, shared) = gate(false, false);
        let t0 = Instant::now();
        gate.try_start(t0);
        let mut sink = RecordingSink::default();

        gate.poll(t0 + INTERVAL, &mut sink);
        assert_eq!(gate.state(), ReadinessState::AwaitingMetadata);

        set_ready(&shared, ReadyState::HaveMetadata);
        gate.poll(t0 + INTERVAL * 2, &mut sink);
        assert_eq!(gate.state(), ReadinessState::AwaitingData);

        gate.poll(t0 + INTERVAL * 3, &mut sink);
        assert_eq!(gate.state(), ReadinessState::AwaitingData);
        set_ready(&shared, ReadyState::HaveCurrentData);
        gate.poll(t0 + INTERVAL * 4, &mut sink);
        assert_eq!(gate.state(), ReadinessState::AwaitingData);
        assert!(sink.attached.is_empty());

        set_ready(&shared, ReadyState::HaveEnoughData);
        gate.poll(t0 + INTERVAL * 5, &mut sink);
        assert_eq!(gate.state(), ReadinessState::Ready);
        assert_eq!(sink.attached, vec![1]);
    }

    #[test]
    fn data_poll_starts_only_after_metadata_completes() {
        // Even with everything buffered up front, metadata completes on one
        // tick and the data poll samples on a later one.
        let (mut gate, shared) = gate(false, false);
        set_ready(&shared, ReadyState::HaveEnoughData);
        let t0 = Instant::now();
        gate.try_start(t0);
        let mut sink = RecordingSink::default();

        assert_eq!(gate.poll(t0 + INTERVAL, &mut sink), ReadinessState::AwaitingData);
        assert_eq!(shared.samples.borrow().len(), 1);
        assert!(sink.attached.is_empty());

        assert_eq!(gate.poll(t0 + INTERVAL * 2, &mut sink), ReadinessState::Ready);
        assert_eq!(shared.samples.borrow().len(), 2);
    }

    #[test]
    fn attaches_exactly_once_and_stops_polling() {
        let (mut gate, shared) = gate(false, false);
        set_ready(&shared, ReadyState::HaveEnoughData);
        let t0 = Instant::now();
        gate.try_start(t0);
        let mut sink = RecordingSink::default();
        for i in 1..20 {
            gate.poll(t0 + INTERVAL * i, &mut sink);
        }
        assert_eq!(sink.attached, vec![1]);
        assert_eq!(shared.samples.borrow().len(), 2);
        assert_eq!(gate.state(), ReadinessState::Ready);
    }

    #[test]
    fn poll_before_start_does_nothing() {
        let (mut gate, shared) = gate(false, false);
        set_ready(&shared, ReadyState::HaveEnoughData);
        let mut sink = RecordingSink::default();
        assert_eq!(
            gate.poll(Instant::now() + INTERVAL * 10, &mut sink),
            ReadinessState::NotStarted
        );
        assert!(sink.attached.is_empty());
    }

    #[test]
    fn readiness_poll_counts_samples() {
        let shared = Rc::new(FakeShared::default());
        let video = FakeVideo {
            id: 1,
            shared: Rc::clone(&shared),
            fail_play: false,
        };
        let t0 = Instant::now();
        let mut poll = ReadinessPoll::start(ReadyState::HaveMetadata, INTERVAL, t0);
        assert_eq!(poll.tick(t0 + INTERVAL, &video), PollStatus::Pending);
        set_ready(&shared, ReadyState::HaveFutureData);
        assert_eq!(poll.tick(t0 + INTERVAL * 2, &video), PollStatus::Reached);
        assert_eq!(poll.samples(), 2);
    }
}
