use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use glam::{Vec2, Vec3};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

mod config;
mod error;
mod geometry;
mod loader;
mod renderer;
mod scene;
mod ui;
mod view;

use config::Config;
use geometry::{Lattice, TriangleMesh, uv_sphere};
use loader::{LoadOutcome, MeshLoader};
use renderer::GpuState;
use renderer::camera::OrbitCamera;
use scene::{Demo, SURFACE_COLOR, SceneGeometry, lattice_scene, layer_scene, model_scene, sphere_scene};
use ui::{
    FrameStats, ModelStatus, UiActions, UiState, apply_theme, draw_help_overlay, draw_layer_frame,
    draw_side_panel,
};
use view::{HANDLE_SIZE, PointerButton, ViewController};

/// Layer camera half-extent relative to half the lattice size.
const LAYER_VIEW_PADDING: f32 = 1.15;
/// Orbit distance in multiples of the loaded mesh's bounding radius.
const MODEL_FRAMING: f32 = 3.0;

#[derive(Parser, Debug)]
#[command(name = "surfview", version, about = "Lattice layers and tangent frames on surfaces")]
struct Cli {
    /// Demo to open at startup
    #[arg(long, value_enum)]
    demo: Option<Demo>,

    /// Configuration file (defaults to ./surfview.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// OBJ file for the model demo
    #[arg(long)]
    model: Option<PathBuf>,

    /// Initial lattice layer
    #[arg(long)]
    layer: Option<usize>,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(demo) = self.demo {
            config.demo = demo;
        }
        if let Some(model) = &self.model {
            config.model.path = model.clone();
        }
        if let Some(layer) = self.layer {
            config.lattice.initial_layer = layer;
        }
    }
}

fn demo_eye(demo: Demo) -> Vec3 {
    match demo {
        Demo::Lattice => Vec3::new(6.0, 6.0, 6.0),
        Demo::Sphere | Demo::Model => Vec3::new(3.5, 2.5, 3.5),
    }
}

struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    egui_state: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    egui_ctx: egui::Context,

    config: Config,
    lattice: Lattice,
    view: ViewController,
    ui_state: UiState,
    loader: MeshLoader,
    model_mesh: Option<TriangleMesh>,

    scene_dirty: bool,
    stats: FrameStats,
    frame_count: u32,
    fps_timer: Instant,
    last_vsync_state: bool,
    exit_requested: bool,
}

impl App {
    fn new(config: Config) -> anyhow::Result<Self> {
        let lattice = Lattice::generate(config.lattice.spec()).context("invalid lattice configuration")?;
        let spec = lattice.spec();
        log::info!(
            "lattice {}x{}x{} ({} points), size {}, step ({:.3}, {:.3}, {:.3})",
            spec.nx,
            spec.ny,
            spec.nz,
            lattice.points().len(),
            spec.size,
            lattice.axis_x().step,
            lattice.axis_y().step,
            lattice.axis_z().step
        );

        let ortho_size = config.lattice.size * 0.5 * LAYER_VIEW_PADDING;
        let view = ViewController::new(&config.layer_view, ortho_size);

        let mut ui_state = UiState::from_config(&config);
        ui_state.layer_count = lattice.layer_count();

        let mut app = Self {
            window: None,
            gpu: None,
            egui_state: None,
            egui_renderer: None,
            egui_ctx: egui::Context::default(),

            last_vsync_state: config.window.vsync,
            config,
            lattice,
            view,
            ui_state,
            loader: MeshLoader::new(),
            model_mesh: None,

            scene_dirty: true,
            stats: FrameStats::default(),
            frame_count: 0,
            fps_timer: Instant::now(),
            exit_requested: false,
        };

        app.switch_demo(app.ui_state.demo);
        Ok(app)
    }

    fn init_gpu(&mut self, window: Arc<Window>) -> anyhow::Result<()> {
        let gpu = pollster::block_on(GpuState::new(window.clone(), self.config.window.vsync))?;

        let egui_state = egui_winit::State::new(
            self.egui_ctx.clone(),
            self.egui_ctx.viewport_id(),
            &window,
            Some(window.scale_factor() as f32),
            None,
            Some(2048),
        );

        let egui_renderer = egui_wgpu::Renderer::new(&gpu.device, gpu.config.format, None, 1, false);

        apply_theme(&self.egui_ctx);

        self.view.on_resize(gpu.size.width, gpu.size.height);
        self.window = Some(window);
        self.gpu = Some(gpu);
        self.egui_state = Some(egui_state);
        self.egui_renderer = Some(egui_renderer);
        self.scene_dirty = true;
        Ok(())
    }

    fn switch_demo(&mut self, demo: Demo) {
        log::info!("switching to {} demo", demo.label());

        self.ui_state.demo = demo;
        self.ui_state.overlay_error = None;
        self.view.layer_active = demo == Demo::Lattice;

        let aspect = self.view.orbit.aspect;
        self.view.orbit = OrbitCamera::looking_at(demo_eye(demo), Vec3::ZERO);
        self.view.orbit.aspect = aspect;

        if demo == Demo::Model && self.model_mesh.is_none() && !self.loader.is_loading() {
            self.request_model_load();
        }
        self.scene_dirty = true;
    }

    fn request_model_load(&mut self) {
        let path = PathBuf::from(self.ui_state.model_path.trim());
        log::info!("loading model {}", path.display());
        self.ui_state.model_status = ModelStatus::Loading;
        self.loader.load(path);
    }

    /// Pulls the orbit camera back far enough to see the whole mesh.
    fn frame_model(&mut self, mesh: &TriangleMesh) {
        let radius = mesh.bounding_radius();
        if radius > 0.0 {
            self.view.orbit.distance = self.view.orbit.distance.max(radius * MODEL_FRAMING);
        }
    }

    fn poll_loader(&mut self) {
        while let Some(outcome) = self.loader.try_recv_result() {
            match outcome {
                LoadOutcome::Loaded { path, mesh } => {
                    log::info!(
                        "loaded {} ({} vertices, {} triangles)",
                        path.display(),
                        mesh.positions.len(),
                        mesh.triangle_count()
                    );
                    self.ui_state.model_status = ModelStatus::Loaded {
                        triangles: mesh.triangle_count(),
                    };
                    if self.ui_state.demo == Demo::Model {
                        self.frame_model(&mesh);
                    }
                    self.model_mesh = Some(mesh);
                }
                LoadOutcome::Failed { path, error } => {
                    log::error!("failed to load model {}: {error}", path.display());
                    self.ui_state.model_status = ModelStatus::Failed(error);
                    self.model_mesh = None;
                }
            }
            if self.ui_state.demo == Demo::Model {
                self.scene_dirty = true;
            }
        }
    }

    fn build_scene(&mut self) -> SceneGeometry {
        self.ui_state.overlay_error = None;

        let built = match self.ui_state.demo {
            Demo::Lattice => return lattice_scene(&self.lattice),
            Demo::Sphere => {
                let mut style = self.config.sphere.style();
                style.tangent_length = self.ui_state.sphere_tangent_length;
                sphere_scene(self.config.sphere.radius, Vec3::from(self.ui_state.sphere_point), &style)
            }
            Demo::Model => {
                let Some(mesh) = &self.model_mesh else {
                    return SceneGeometry::default();
                };
                model_scene(mesh, Vec3::from(self.ui_state.model_point), &self.config.model.style())
            }
        };

        match built {
            Ok((scene, frame)) => {
                log::debug!(
                    "tangent frame at {:?}: normal {:?}, tangent {:?}",
                    frame.point,
                    frame.normal,
                    frame.tangent
                );
                scene
            }
            Err(e) => {
                log::warn!("tangent overlay not built: {e}");
                self.ui_state.overlay_error = Some(e.to_string());

                let mut scene = SceneGeometry::default();
                match (self.ui_state.demo, &self.model_mesh) {
                    (Demo::Model, Some(mesh)) => scene.push_mesh(mesh, SURFACE_COLOR),
                    _ => scene.push_mesh(
                        &uv_sphere(Vec3::ZERO, self.config.sphere.radius, 48, 24),
                        SURFACE_COLOR,
                    ),
                }
                scene
            }
        }
    }

    fn update(&mut self) {
        self.frame_count += 1;
        let elapsed = self.fps_timer.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            self.stats.fps = self.frame_count as f32 / elapsed;
            self.frame_count = 0;
            self.fps_timer = Instant::now();
        }

        self.poll_loader();
        self.view.orbit.update();

        if self.scene_dirty && self.gpu.is_some() {
            let scene = self.build_scene();
            self.stats.points_rendered = scene.points.len();
            self.stats.triangles = scene.mesh_indices.len() / 3;
            if let Some(gpu) = &mut self.gpu {
                gpu.upload_scene(&scene);
            }
            self.scene_dirty = false;
        }

        // the layer slice is rebuilt on every frame
        let layer_points = if self.ui_state.demo == Demo::Lattice {
            layer_scene(&self.lattice, self.ui_state.current_layer)
        } else {
            Vec::new()
        };
        self.stats.layer_points = layer_points.len();
        self.stats.layer_zoom = self.view.layer_camera.zoom;
        self.stats.layer_size = (self.view.layer_viewport.width, self.view.layer_viewport.height);

        if let Some(gpu) = &mut self.gpu {
            gpu.upload_layer(&layer_points);
            gpu.update_cameras(&self.view.orbit, &self.view.layer_camera);
        }
    }

    fn render(&mut self) {
        let (Some(window), Some(egui_state)) = (&self.window, &mut self.egui_state) else {
            return;
        };

        let raw_input = egui_state.take_egui_input(window);

        let demo = self.ui_state.demo;
        let layer_frame = self.view.layer_active.then(|| {
            let vp = &self.view.layer_viewport;
            egui::Rect::from_min_size(
                egui::pos2(vp.origin.x, vp.origin.y),
                egui::vec2(vp.width, vp.height),
            )
        });

        let mut ui_actions = UiActions::default();

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            ui_actions = draw_side_panel(ctx, &mut self.ui_state, &self.stats);
            draw_help_overlay(ctx, demo);

            if let Some(rect) = layer_frame {
                let ppp = ctx.pixels_per_point();
                let rect = egui::Rect::from_min_max(
                    (rect.min.to_vec2() / ppp).to_pos2(),
                    (rect.max.to_vec2() / ppp).to_pos2(),
                );
                draw_layer_frame(ctx, rect, HANDLE_SIZE / ppp);
            }
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
            log::info!("vsync {}", if self.last_vsync_state { "on" } else { "off" });
        }

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.resize(gpu.size);
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("out of GPU memory, shutting down");
                self.exit_requested = true;
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("surface timeout, skipping frame");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

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

        gpu.render_main(&view, &mut encoder);

        if self.view.layer_active {
            if let Some(rect) = self
                .view
                .layer_viewport
                .clipped_rect(gpu.config.width, gpu.config.height)
            {
                gpu.render_layer(&view, &mut encoder, rect);
            }
        }

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
        if let Some(demo) = actions.switch_demo {
            self.switch_demo(demo);
        }

        if actions.reload_model {
            self.request_model_load();
        }

        if actions.rebuild_overlay {
            self.scene_dirty = true;
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::ArrowUp if self.ui_state.demo == Demo::Lattice => self.ui_state.step_layer(1),
            KeyCode::ArrowDown if self.ui_state.demo == Demo::Lattice => self.ui_state.step_layer(-1),
            KeyCode::Digit1 => self.switch_demo(Demo::Lattice),
            KeyCode::Digit2 => self.switch_demo(Demo::Sphere),
            KeyCode::Digit3 => self.switch_demo(Demo::Model),
            _ => {}
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
            .with_inner_size(PhysicalSize::new(self.config.window.width, self.config.window.height));

        let result = event_loop
            .create_window(window_attrs)
            .context("failed to create window")
            .and_then(|window| self.init_gpu(Arc::new(window)));

        if let Err(e) = result {
            log::error!("{e:#}");
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let (Some(egui_state), Some(window)) = (&mut self.egui_state, &self.window) {
            let response = egui_state.on_window_event(window, &event);
            // releases always reach the views so a drag can't get stuck
            let released = matches!(
                event,
                WindowEvent::MouseInput {
                    state: ElementState::Released,
                    ..
                }
            );
            if response.consumed && !released {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.loader.stop();
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size);
                }
                self.view.on_resize(size.width, size.height);
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    if event.state == ElementState::Pressed {
                        self.handle_key(key);
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                let cursor = Vec2::new(position.x as f32, position.y as f32);
                if let Some(size) = self.view.on_cursor_moved(cursor) {
                    self.stats.layer_size = size;
                }
            }

            WindowEvent::MouseInput { button, state, .. } => {
                let button = match button {
                    MouseButton::Left => PointerButton::Primary,
                    MouseButton::Right => PointerButton::Secondary,
                    _ => return,
                };
                self.view.on_button(button, state == ElementState::Pressed);
            }

            WindowEvent::MouseWheel { delta, .. } => {
                // winit reports scrolling up as positive
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y,
                    MouseScrollDelta::PixelDelta(pos) => -(pos.y as f32) / 50.0,
                };
                self.view.on_wheel(delta_y);
            }

            WindowEvent::RedrawRequested => {
                self.update();
                self.render();
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    cli.apply(&mut config);

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config)?;
    event_loop.run_app(&mut app).context("event loop terminated with an error")?;
    Ok(())
}
