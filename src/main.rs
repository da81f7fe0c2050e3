use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use glam::Vec2;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use torus3d::config::ViewerConfig;
use torus3d::geometry::{MeshEngine, MeshResult};
use torus3d::interaction::{DragButton, DragRotation};
use torus3d::logging::{LoggingConfig, init_logging};
use torus3d::renderer::{Camera, GpuState, Shading, TorusUniform};
use torus3d::ui::{UiActions, UiState, ViewerStats, apply_theme, draw_help_overlay, draw_side_panel};

struct App {
    config: ViewerConfig,

    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    egui_state: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    egui_ctx: egui::Context,

    camera: Camera,
    shading: Shading,
    drag: DragRotation,
    cursor: Vec2,

    mesh_engine: MeshEngine,
    mesh_error: Option<String>,
    ui_state: UiState,
    stats: ViewerStats,

    frame_count: u32,
    fps_timer: Instant,
    last_vsync_state: bool,
}

impl App {
    fn new(config: ViewerConfig) -> Self {
        let ui_state = UiState::from_config(&config);
        let last_vsync_state = ui_state.vsync_enabled;

        Self {
            window: None,
            gpu: None,
            egui_state: None,
            egui_renderer: None,
            egui_ctx: egui::Context::default(),

            camera: Camera::from_config(&config.camera, &config.window),
            shading: Shading::from_config(&config.view),
            drag: DragRotation::new(config.view.drag_sensitivity),
            cursor: Vec2::ZERO,

            mesh_engine: MeshEngine::new(),
            mesh_error: None,
            ui_state,
            stats: ViewerStats::default(),

            frame_count: 0,
            fps_timer: Instant::now(),
            last_vsync_state,

            config,
        }
    }

    fn init_gpu(&mut self, window: Arc<Window>) -> Result<()> {
        let gpu = pollster::block_on(GpuState::new(window.clone(), self.ui_state.vsync_enabled))?;

        let egui_state = egui_winit::State::new(
            self.egui_ctx.clone(),
            self.egui_ctx.viewport_id(),
            &window,
            Some(window.scale_factor() as f32),
            None,
            Some(2048),
        );

        let egui_renderer =
            egui_wgpu::Renderer::new(&gpu.device, gpu.config.format, None, 1, false);

        apply_theme(&self.egui_ctx);

        self.camera
            .set_aspect(gpu.config.width as f32, gpu.config.height as f32);

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.egui_state = Some(egui_state);
        self.egui_renderer = Some(egui_renderer);

        if self.ui_state.mesh_needs_regenerate {
            self.request_mesh();
        }
        Ok(())
    }

    fn request_mesh(&mut self) {
        self.ui_state.mesh_needs_regenerate = false;
        self.mesh_engine.generate(self.ui_state.params);
    }

    fn update(&mut self) {
        self.frame_count += 1;
        let elapsed = self.fps_timer.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            self.stats.fps = self.frame_count as f32 / elapsed;
            self.frame_count = 0;
            self.fps_timer = Instant::now();
        }

        while let Some(result) = self.mesh_engine.try_recv_result() {
            match result {
                MeshResult::Mesh {
                    mesh,
                    params,
                    elapsed,
                } => {
                    let Some(gpu) = &mut self.gpu else { continue };
                    if let Err(e) = gpu.upload_mesh(&mesh) {
                        log::warn!("keeping previous mesh: {}", e);
                        self.mesh_error = Some(e.to_string());
                        continue;
                    }
                    self.stats.vertices = mesh.vertex_count();
                    self.stats.triangles = mesh.triangle_count();
                    self.stats.generation_time = elapsed;
                    self.mesh_error = None;
                    log::debug!("uploaded mesh for {:?}", params);
                }
                MeshResult::Error(e) => {
                    self.mesh_error = Some(e);
                }
            }
        }

        self.stats.rotation = self.drag.rotation;
        self.shading.opacity = self.ui_state.opacity;
    }

    fn render(&mut self) {
        let (Some(window), Some(egui_state)) = (&self.window, &mut self.egui_state) else {
            return;
        };

        let raw_input = egui_state.take_egui_input(window);

        let last_error = self
            .mesh_error
            .clone()
            .or_else(|| self.mesh_engine.last_error());
        let stats = self.stats;

        let mut ui_actions = UiActions::default();

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            ui_actions = draw_side_panel(ctx, &mut self.ui_state, &stats, &last_error);
            draw_help_overlay(ctx, stats.rotation);
        });

        self.handle_ui_actions(ui_actions);

        let Some(gpu) = &mut self.gpu else { return };
        let Some(window) = &self.window else { return };
        let Some(egui_state) = &mut self.egui_state else {
            return;
        };
        let Some(egui_renderer) = &mut self.egui_renderer else {
            return;
        };

        egui_state.handle_platform_output(window, full_output.platform_output);

        if self.ui_state.vsync_enabled != self.last_vsync_state {
            gpu.set_vsync(self.ui_state.vsync_enabled);
            self.last_vsync_state = self.ui_state.vsync_enabled;
        }

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost, reconfiguring");
                gpu.resize(gpu.size);
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("out of GPU memory, skipping frame");
                return;
            }
            Err(e) => {
                log::debug!("skipping frame: {}", e);
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.update_uniform(&TorusUniform::new(
            &self.camera,
            self.drag.model_matrix(),
            &self.shading,
        ));

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, delta) in full_output.textures_delta.set {
            egui_renderer.update_texture(&gpu.device, &gpu.queue, id, &delta);
        }

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Main Encoder"),
            });

        egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        gpu.render_torus(&view, &mut encoder);

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let mut render_pass = render_pass.forget_lifetime();
            egui_renderer.render(&mut render_pass, &paint_jobs, &screen_descriptor);
        }

        for id in full_output.textures_delta.free {
            egui_renderer.free_texture(&id);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        window.request_redraw();
    }

    fn handle_ui_actions(&mut self, actions: UiActions) {
        if actions.regenerate {
            self.request_mesh();
        }

        if actions.reset_rotation {
            self.drag.reset();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));

        let window = match event_loop.create_window(window_attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        if let Err(e) = self.init_gpu(window) {
            log::error!("GPU initialisation failed: {:#}", e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let mut consumed = false;
        if let (Some(egui_state), Some(window)) = (&mut self.egui_state, &self.window) {
            consumed = egui_state.on_window_event(window, &event).consumed;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.mesh_engine.stop();
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size);
                    self.camera
                        .set_aspect(size.width as f32, size.height as f32);
                }
            }

            // Tracked even over the panel so a drag that leaves the
            // viewport keeps rotating and still sees its release.
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
                self.drag.cursor_moved(self.cursor);
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    MouseButton::Left => DragButton::Primary,
                    _ => DragButton::Other,
                };
                match state {
                    ElementState::Pressed if !consumed => self.drag.press(button, self.cursor),
                    ElementState::Released => self.drag.release(button),
                    _ => {}
                }
            }

            WindowEvent::RedrawRequested => {
                self.update();
                self.render();
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let config_path = ViewerConfig::default_path();
    let config = ViewerConfig::load_or_default(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    init_logging(LoggingConfig {
        env_filter: config.log_filter.clone(),
        ..Default::default()
    });

    if config_path.exists() {
        log::info!("loaded config from {}", config_path.display());
    } else {
        log::info!("no config at {}, using defaults", config_path.display());
    }

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop
        .run_app(&mut app)
        .context("event loop exited with an error")?;

    Ok(())
}
