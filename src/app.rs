use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::animation::AnimationTask;
use crate::canvas::{Canvas, PixelCanvas};
use crate::config::{PANEL_MARGIN, WINDOW_HEIGHT, WINDOW_TITLE, WINDOW_WIDTH};
use crate::gpu::{CompositePipeline, GpuContext, Layer, LayerParams};
use crate::hud::{CompromisedPanel, HudOverlay};
use crate::simulation::FieldSimulator;

/// Application state
pub struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    composite: Option<CompositePipeline>,
    field_layer: Option<Layer>,
    panel_layer: Option<Layer>,
    overlay_layer: Option<Layer>,
    field: AnimationTask<FieldSimulator>,
    field_canvas: PixelCanvas,
    panel: CompromisedPanel,
    /// Unscaled panel placement in surface pixels
    panel_rect: [f32; 4],
    overlay: HudOverlay,
    overlay_canvas: PixelCanvas,
    last_frame: Instant,
    fps_counter: FpsCounter,
    log_fps: bool,
}

impl App {
    pub fn new() -> Self {
        Self {
            window: None,
            gpu: None,
            composite: None,
            field_layer: None,
            panel_layer: None,
            overlay_layer: None,
            field: AnimationTask::new(FieldSimulator::new()),
            field_canvas: PixelCanvas::new(0, 0),
            panel: CompromisedPanel::new(),
            panel_rect: [0.0; 4],
            overlay: HudOverlay::new(),
            overlay_canvas: PixelCanvas::new(0, 0),
            last_frame: Instant::now(),
            fps_counter: FpsCounter::new(),
            log_fps: false,
        }
    }

    /// Fan a new surface size out to every canvas and model
    fn layout(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.field_canvas.resize(width, height);
        self.field.resize(width, height);
        self.overlay_canvas.resize(width, height);

        self.panel.resize(width / 4);
        let (pw, ph) = self.panel.size();
        let x = width.saturating_sub(pw + PANEL_MARGIN);
        let y = height.saturating_sub(ph) / 2;
        self.panel_rect = [x as f32, y as f32, pw as f32, ph as f32];
        log::debug!("Layout {}x{}, panel at ({}, {}) {}x{}", width, height, x, y, pw, ph);
    }

    /// Tick every task once. Returns whether anything wants another frame.
    fn tick(&mut self) -> bool {
        let now = Instant::now();
        let dt = now - self.last_frame;
        self.last_frame = now;

        let canvas: Option<&mut dyn Canvas> = if self.field_canvas.is_empty() {
            None
        } else {
            Some(&mut self.field_canvas)
        };
        let field_running = self.field.tick(canvas);

        self.panel.advance(dt);
        let panel_running = self.panel.tick();

        self.overlay.advance(dt);
        if !self.overlay_canvas.is_empty() {
            self.overlay.draw(&mut self.overlay_canvas);
        }

        field_running || panel_running
    }

    fn render(&mut self) {
        let (Some(gpu), Some(composite)) = (&self.gpu, &self.composite) else {
            return;
        };

        sync_layer(&mut self.field_layer, gpu, composite, &self.field_canvas, "field-layer");
        sync_layer(&mut self.panel_layer, gpu, composite, self.panel.canvas(), "panel-layer");
        sync_layer(&mut self.overlay_layer, gpu, composite, &self.overlay_canvas, "overlay-layer");

        let viewport = gpu.viewport();
        let full = [0.0, 0.0, viewport.0 as f32, viewport.1 as f32];
        let mut layers = Vec::with_capacity(3);
        if let Some(layer) = &self.field_layer {
            layer.upload(&gpu.queue, &self.field_canvas);
            layer.update_params(&gpu.queue, &LayerParams::scaled(full, 1.0, viewport, 1.0));
            layers.push(layer);
        }
        if let Some(layer) = &self.panel_layer {
            if self.panel.is_visible() {
                layer.upload(&gpu.queue, self.panel.canvas());
                let params =
                    LayerParams::scaled(self.panel_rect, self.panel.scale(), viewport, self.panel.opacity());
                layer.update_params(&gpu.queue, &params);
                layers.push(layer);
            }
        }
        // Overlay goes last so glitches cover the panel
        if let Some(layer) = &self.overlay_layer {
            layer.upload(&gpu.queue, &self.overlay_canvas);
            layer.update_params(&gpu.queue, &LayerParams::scaled(full, 1.0, viewport, 1.0));
            layers.push(layer);
        }

        // Get surface texture
        let output = match gpu.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring");
                gpu.reconfigure();
                return;
            }
            Err(e) => {
                log::error!("Surface error: {:?}", e);
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });
        composite.draw(&mut encoder, &view, &layers);

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if let Some(fps) = self.fps_counter.tick() {
            if self.log_fps {
                log::info!("{:.1} FPS, field frame {}", fps, self.field.frames());
            }
            if let Some(window) = &self.window {
                window.set_title(&format!("{} - {:.0} FPS", WINDOW_TITLE, fps));
            }
        }
    }

    fn regenerate(&mut self) {
        let (width, height) = self.field.size();
        self.field.resize(width, height);
        self.panel.regenerate();
        log::info!("Regenerated field and schematic");
    }

    fn handle_key(&mut self, key_code: KeyCode) {
        match key_code {
            KeyCode::KeyR => self.regenerate(),
            KeyCode::KeyF => {
                self.log_fps = !self.log_fps;
                log::info!("FPS logging: {}", if self.log_fps { "ON" } else { "OFF" });
            }
            _ => {}
        }
    }

    /// Stop every task; no frame runs afterwards
    fn teardown(&mut self) {
        self.field.stop();
        self.panel.shutdown();
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        if let Some(gpu) = &mut self.gpu {
            log::info!("Window resized to {}x{}", new_size.width, new_size.height);
            gpu.resize(new_size);
        }
        self.layout(new_size.width, new_size.height);
    }
}

/// Recreate `slot` when the canvas it mirrors changed size
fn sync_layer(
    slot: &mut Option<Layer>,
    gpu: &GpuContext,
    composite: &CompositePipeline,
    canvas: &PixelCanvas,
    label: &str,
) {
    if canvas.is_empty() || slot.as_ref().is_some_and(|layer| layer.matches(canvas)) {
        return;
    }
    log::debug!("Allocating {} at {}x{}", label, canvas.width(), canvas.height());
    *slot = Some(composite.create_layer(&gpu.device, canvas.width(), canvas.height(), label));
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        log::info!("Initializing HUD backdrop...");

        let window_attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        log::info!("Creating GPU context...");
        let gpu = match pollster::block_on(GpuContext::new(window.clone())) {
            Ok(gpu) => gpu,
            Err(e) => {
                log::error!("GPU initialization failed: {}", e);
                event_loop.exit();
                return;
            }
        };

        log::info!("Creating composite pipeline...");
        let composite = CompositePipeline::new(&gpu.device, gpu.format());

        let size = window.inner_size();
        self.window = Some(window.clone());
        self.gpu = Some(gpu);
        self.composite = Some(composite);
        self.layout(size.width, size.height);

        if self.field.start().is_some() {
            log::info!("Field online at {}x{}", size.width, size.height);
        }
        self.last_frame = Instant::now();

        log::info!("Initialization complete!");
        log::info!("Controls:");
        log::info!("  R: Regenerate field and schematic");
        log::info!("  F: Toggle FPS logging");
        log::info!("  Escape: Quit");

        window.request_redraw();
    }

    fn suspended(&mut self, event_loop: &ActiveEventLoop) {
        log::info!("Suspended, stopping animations and exiting");
        self.teardown();
        event_loop.exit();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting...");
                self.teardown();
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() {
                    if let PhysicalKey::Code(key_code) = event.physical_key {
                        if key_code == KeyCode::Escape {
                            log::info!("Escape pressed, exiting...");
                            self.teardown();
                            event_loop.exit();
                        } else {
                            self.handle_key(key_code);
                        }
                    }
                }
            }
            WindowEvent::Resized(new_size) => self.handle_resize(new_size),
            WindowEvent::RedrawRequested => {
                let wants_more = self.tick();
                self.render();
                if wants_more {
                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.teardown();
        log::info!("Field ran {} frames, schematic {}", self.field.frames(), self.panel.schematic_frames());
    }
}

/// Simple FPS counter
struct FpsCounter {
    last_update: Instant,
    frame_count: u32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last_update: Instant::now(),
            frame_count: 0,
        }
    }

    /// Tick the counter, returns Some(fps) every second
    fn tick(&mut self) -> Option<f64> {
        self.frame_count += 1;
        let elapsed = self.last_update.elapsed();

        if elapsed.as_secs_f64() >= 1.0 {
            let fps = self.frame_count as f64 / elapsed.as_secs_f64();
            self.frame_count = 0;
            self.last_update = Instant::now();
            Some(fps)
        } else {
            None
        }
    }
}
