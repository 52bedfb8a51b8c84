use std::sync::Arc;

use instant::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::render::instance::SpriteInstance;
use crate::render::GpuState;
use crate::scene;
use crate::scene::animation::AnimationState;

/// Fixed window size in logical pixels, 4:3 to match the camera extents.
const WINDOW_WIDTH: u32 = 640;
const WINDOW_HEIGHT: u32 = 480;
/// How often to log FPS (seconds).
const FPS_LOG_INTERVAL: f64 = 5.0;

// ---------------------------------------------------------------------------
// Frame timing
// ---------------------------------------------------------------------------

struct FrameStats {
    frame_count: u64,
    last_log_time: Instant,
    frame_time_sum: f64,
    frames_since_log: u32,
}

impl FrameStats {
    fn new() -> Self {
        Self {
            frame_count: 0,
            last_log_time: Instant::now(),
            frame_time_sum: 0.0,
            frames_since_log: 0,
        }
    }

    fn record_frame(&mut self, dt: f64) {
        self.frame_count += 1;
        self.frames_since_log += 1;
        self.frame_time_sum += dt;

        let elapsed = self.last_log_time.elapsed().as_secs_f64();
        if elapsed >= FPS_LOG_INTERVAL {
            let avg_ms = (self.frame_time_sum / self.frames_since_log as f64) * 1000.0;
            let fps = self.frames_since_log as f64 / elapsed;
            log::info!(
                "FPS: {:.0} | avg: {:.2}ms | total frames: {}",
                fps,
                avg_ms,
                self.frame_count,
            );
            self.last_log_time = Instant::now();
            self.frame_time_sum = 0.0;
            self.frames_since_log = 0;
        }
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Top-level application state.
struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,

    /// All persistent animation scalars. Single owner, advanced once per
    /// frame before the draw pass reads the resulting matrices.
    anim: AnimationState,

    // Frame timing
    last_frame_time: Option<Instant>,
    frame_stats: FrameStats,

    // Reusable instance buffer (avoid per-frame allocation)
    instance_buf: Vec<SpriteInstance>,
}

impl App {
    fn new() -> Self {
        Self {
            window: None,
            gpu: None,
            anim: AnimationState::default(),
            last_frame_time: None,
            frame_stats: FrameStats::new(),
            instance_buf: Vec::with_capacity(scene::SPRITE_COUNT),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title("Seraph")
            .with_inner_size(LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT))
            .with_resizable(false);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .expect("failed to create window"),
        );

        let size = window.inner_size();
        log::info!("Window created: {}x{}", size.width, size.height);

        // Initialize wgpu + pipeline
        let mut gpu = GpuState::new(window.clone());
        log::info!("wgpu + sprite pipeline initialized");

        // Decode and upload the five sprites. A missing or corrupt image
        // is fatal; there is no scene without it.
        if let Err(e) = gpu.load_sprites(&scene::SPRITE_PATHS) {
            log::error!("Failed to load sprite textures: {e}");
            event_loop.exit();
            return;
        }
        self.gpu = Some(gpu);

        // Continuous render loop
        event_loop.set_control_flow(ControlFlow::Poll);

        self.window = Some(window);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                log::info!("ESC pressed, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                // --- Timing ---
                let now = Instant::now();
                let dt = match self.last_frame_time {
                    Some(last) => now.duration_since(last).as_secs_f64(),
                    None => 0.0,
                };
                self.last_frame_time = Some(now);

                if dt > 0.0 {
                    self.frame_stats.record_frame(dt);
                }

                // --- Advance the animation, publish fresh matrices ---
                let transforms = self.anim.tick(dt as f32);
                scene::build_instances(&transforms, &mut self.instance_buf);

                // --- Render ---
                if let Some(gpu) = &mut self.gpu {
                    gpu.update_instances(&self.instance_buf);
                    gpu.render_frame();
                }
            }
            _ => {}
        }
    }
}

/// Entry point — create event loop and run.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new();
    event_loop.run_app(&mut app)?;
    Ok(())
}
