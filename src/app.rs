//! The windowed application loop.
//!
//! [`run`] opens a window, builds the GPU context, renderer and demo scene,
//! then redraws continuously until the window is closed. Setup failures end
//! the event loop and are returned from `run`.

use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, DeviceId, ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowAttributes, WindowId};

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::gpu::GpuContext;
use crate::input::Input;
use crate::renderer::Renderer;
use crate::scene::Scene;

/// Open a window and run the demo until it is closed.
///
/// ```no_run
/// use lightbox::AppConfig;
///
/// fn main() -> lightbox::Result<()> {
///     lightbox::run(AppConfig::new().title("Lights").point_lights(4))
/// }
/// ```
pub fn run(config: AppConfig) -> Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = LightboxApp::Pending { config };
    event_loop.run_app(&mut app)?;

    match app {
        LightboxApp::Failed(err) => Err(err),
        _ => Ok(()),
    }
}

enum LightboxApp {
    Pending {
        config: AppConfig,
    },
    Running {
        window: Arc<Window>,
        gpu: GpuContext,
        renderer: Renderer,
        scene: Scene,
        input: Input,
        cursor_captured: bool,
        start_time: Instant,
        last_frame: Instant,
    },
    Failed(Error),
}

impl LightboxApp {
    fn start(config: &AppConfig, event_loop: &ActiveEventLoop) -> Result<Self> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu = GpuContext::new(window.clone())?;
        let renderer = Renderer::new(&gpu, config)?;
        let scene = Scene::demo(config.point_lights);

        log::info!(
            "started {}x{} with {} point lights",
            gpu.width(),
            gpu.height(),
            scene.lights.point_count()
        );
        window.request_redraw();

        Ok(LightboxApp::Running {
            window,
            gpu,
            renderer,
            scene,
            input: Input::new(),
            cursor_captured: false,
            start_time: Instant::now(),
            last_frame: Instant::now(),
        })
    }
}

/// Lock (or at least confine) and hide the cursor for mouse look, or release it.
fn capture_cursor(window: &Window, capture: bool) -> bool {
    if !capture {
        if let Err(err) = window.set_cursor_grab(CursorGrabMode::None) {
            log::warn!("failed to release cursor: {err}");
        }
        window.set_cursor_visible(true);
        return false;
    }

    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    match grabbed {
        Ok(()) => {
            window.set_cursor_visible(false);
            true
        }
        Err(err) => {
            log::warn!("failed to capture cursor: {err}");
            false
        }
    }
}

impl ApplicationHandler for LightboxApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let LightboxApp::Pending { config } = self else {
            return;
        };
        *self = match Self::start(config, event_loop) {
            Ok(app) => app,
            Err(err) => {
                log::error!("startup failed: {err}");
                event_loop.exit();
                LightboxApp::Failed(err)
            }
        };
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _id: DeviceId, event: DeviceEvent) {
        if let LightboxApp::Running { input, .. } = self {
            input.handle_device_event(&event);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let LightboxApp::Running {
            window,
            gpu,
            renderer,
            scene,
            input,
            cursor_captured,
            start_time,
            last_frame,
        } = self
        else {
            return;
        };

        input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("window closed");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                gpu.resize(size.width, size.height);
            }
            WindowEvent::KeyboardInput { event: key, .. }
                if key.state == ElementState::Pressed
                    && key.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                *cursor_captured = capture_cursor(window, false);
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } if !*cursor_captured => {
                *cursor_captured = capture_cursor(window, true);
            }
            WindowEvent::Focused(false) => {
                *cursor_captured = capture_cursor(window, false);
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let time = start_time.elapsed().as_secs_f32();
                let dt = now.duration_since(*last_frame).as_secs_f32();
                *last_frame = now;

                let frame_input = input.frame_input(*cursor_captured);
                scene.update(&frame_input, dt, time);
                renderer.render(gpu, scene, time);

                input.begin_frame();
                window.request_redraw();
            }
            _ => {}
        }
    }
}
