mod app;
mod control;
mod gpu;
mod input;
mod media;
mod pano;
mod settings;

use std::sync::Arc;

use anyhow::Result;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use app::App;
use input::keys::remote_code_for;
use settings::ViewerSettings;

struct PanoRemoteApp {
    app: Option<App>,
    window: Option<Arc<Window>>,
    settings: ViewerSettings,
}

impl PanoRemoteApp {
    fn new(settings: ViewerSettings) -> Self {
        Self {
            app: None,
            window: None,
            settings,
        }
    }
}

impl ApplicationHandler for PanoRemoteApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let mut attrs = WindowAttributes::default()
            .with_title("pano-remote")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
        if self.settings.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        match App::new(window, &self.settings) {
            Ok(app) => {
                app.window.request_redraw();
                self.app = Some(app);
                log::info!("pano-remote initialized");
            }
            Err(e) => {
                log::error!("Failed to initialize app: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(app) = self.app.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                app.exit_requested = true;
            }
            WindowEvent::Resized(size) => {
                app.resize(size.width, size.height);
            }
            // Remotes auto-repeat held keys, so repeats are dispatched too
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => match remote_code_for(key) {
                Some(code) => {
                    let outcome = app.handle_key(code);
                    log::trace!("Key {key:?} ({code}) -> {outcome:?}");
                }
                None => log::debug!("No remote mapping for {key:?}"),
            },
            WindowEvent::RedrawRequested => {
                app.update();

                match app.render() {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let w = app.gpu.surface_config.width;
                        let h = app.gpu.surface_config.height;
                        app.resize(w, h);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of GPU memory");
                        event_loop.exit();
                    }
                    Err(e) => {
                        log::warn!("Surface error: {e}");
                    }
                }

                app.window.request_redraw();
            }
            _ => {}
        }

        if app.exit_requested {
            log::info!("Shutting down");
            event_loop.exit();
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let settings = ViewerSettings::load();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(winit::event_loop::ControlFlow::Poll);

    let mut app = PanoRemoteApp::new(settings);
    event_loop.run_app(&mut app)?;

    Ok(())
}
