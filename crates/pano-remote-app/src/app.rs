use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use winit::window::Window;

use crate::control::Controls;
use crate::control::bindings::ControlBindings;
use crate::control::press::PressButton;
use crate::gpu::GpuContext;
use crate::gpu::panorama::PanoramaRenderer;
use crate::input::{Dispatched, InputHost, RemoteInputController};
use crate::media::readiness::{MediaReadinessGate, ReadinessState};
use crate::media::video::{FfmpegBackend, ffmpeg_available};
use crate::pano::Scene;
use crate::pano::asset::VideoAsset;
use crate::pano::geometry::EquirectGeometry;
use crate::pano::view::RectilinearView;
use crate::settings::ViewerSettings;

/// Host-side effects requested by the remote controller during one key.
struct AppHost<'a> {
    gate: &'a mut MediaReadinessGate<FfmpegBackend>,
    exit_requested: &'a mut bool,
    now: Instant,
}

impl InputHost for AppHost<'_> {
    fn start_media(&mut self) {
        self.gate.try_start(self.now);
    }

    fn exit_application(&mut self) {
        *self.exit_requested = true;
    }
}

pub struct App {
    pub window: Arc<Window>,
    pub gpu: GpuContext,
    renderer: PanoramaRenderer,
    scene: Scene,
    controls: Controls,
    input: RemoteInputController<PressButton>,
    gate: MediaReadinessGate<FfmpegBackend>,
    gate_state: ReadinessState,
    pub last_frame: Instant,
    pub exit_requested: bool,
}

impl App {
    pub fn new(window: Arc<Window>, settings: &ViewerSettings) -> Result<Self> {
        let gpu = GpuContext::new(window.clone())?;
        let renderer = PanoramaRenderer::new(&gpu.device, &gpu.queue, gpu.format);

        // Video sources have a single resolution level
        let view = RectilinearView::new(settings.initial_fov(), settings.vfov_limit());
        let mut scene = Scene::new(EquirectGeometry::single_level(1), view, VideoAsset::new());

        let mut controls = Controls::new();
        let bindings =
            ControlBindings::register(&mut controls, settings.velocity(), settings.friction())?;
        let input = RemoteInputController::new(bindings);

        if !ffmpeg_available() {
            log::warn!("ffmpeg/ffprobe not found on PATH; video will not start");
        }
        let gate = MediaReadinessGate::new(
            FfmpegBackend,
            settings.video_config(),
            settings.gate_options(),
        );

        scene.switch_to();
        log::info!("Press Enter to start video and toggle zoom mode");

        Ok(Self {
            window,
            gpu,
            renderer,
            scene,
            controls,
            input,
            gate_state: gate.state(),
            gate,
            last_frame: Instant::now(),
            exit_requested: false,
        })
    }

    /// Feed one remote key code to the controller.
    pub fn handle_key(&mut self, code: u32) -> Dispatched {
        let mut host = AppHost {
            gate: &mut self.gate,
            exit_requested: &mut self.exit_requested,
            now: Instant::now(),
        };
        self.input.dispatch(code, &mut host)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
    }

    pub fn update(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        let state = self.gate.poll(now, &mut self.scene.asset);
        if state != self.gate_state {
            log::info!("Media state: {:?} -> {:?}", self.gate_state, state);
            if state == ReadinessState::Ready && !self.scene.asset.has_video() {
                log::warn!("Media ready but no video attached to the scene");
            }
            self.gate_state = state;
        }

        let delta = self.controls.step(f64::from(dt));
        self.scene.view.apply(delta);

        if let Some(frame) = self.scene.asset.advance(dt) {
            let first = !self.renderer.has_frame();
            self.renderer
                .upload_frame(&self.gpu.device, &self.gpu.queue, &frame);
            if first && self.renderer.has_frame() {
                log::info!(
                    "First video frame on screen (frame {})",
                    self.scene.asset.frames_delivered()
                );
            }
        }
        self.renderer
            .update_view(&self.gpu.queue, &self.scene.view, self.gpu.aspect());
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.gpu.surface.get_current_texture()?;
        let surface_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            self.gpu
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("pano-remote-encoder"),
                });

        self.renderer.render(&mut encoder, &surface_view);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
