use std::sync::Arc;

use anyhow::Context;

use crate::renderer::buffers::{
    ColorVertex, LayerBuffers, SceneBuffers, color_vertex_layout, mesh_vertex_layout,
};
use crate::renderer::camera::{CameraUniform, LayerCamera, OrbitCamera};
use crate::scene::SceneGeometry;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

struct PipelineDesc<'a> {
    label: &'a str,
    vs: &'a str,
    fs: &'a str,
    buffers: &'a [wgpu::VertexBufferLayout<'static>],
    topology: wgpu::PrimitiveTopology,
    depth_write: bool,
    depth_compare: wgpu::CompareFunction,
}

pub struct GpuState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,

    pub pipeline_points: wgpu::RenderPipeline,
    pub pipeline_lines: wgpu::RenderPipeline,
    pub pipeline_mesh: wgpu::RenderPipeline,
    pub pipeline_overlay: wgpu::RenderPipeline,
    pub pipeline_backdrop: wgpu::RenderPipeline,

    pub camera_buffer: wgpu::Buffer,
    pub camera_bind_group: wgpu::BindGroup,
    pub layer_camera_buffer: wgpu::Buffer,
    pub layer_camera_bind_group: wgpu::BindGroup,

    pub scene_buffers: SceneBuffers,
    pub layer_buffers: LayerBuffers,

    pub depth_texture: wgpu::TextureView,
}

impl GpuState {
    pub async fn new(window: Arc<winit::window::Window>, vsync: bool) -> anyhow::Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create window surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no compatible GPU adapter found")?;

        log::info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await
            .context("failed to open GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no supported formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: present_mode(vsync),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders.wgsl").into()),
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Camera Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let camera_buffer = create_camera_buffer(&device, "Camera Buffer");
        let camera_bind_group =
            create_camera_bind_group(&device, &camera_bind_group_layout, &camera_buffer, "Camera Bind Group");

        let layer_camera_buffer = create_camera_buffer(&device, "Layer Camera Buffer");
        let layer_camera_bind_group = create_camera_bind_group(
            &device,
            &camera_bind_group_layout,
            &layer_camera_buffer,
            "Layer Camera Bind Group",
        );

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            push_constant_ranges: &[],
        });

        let targets = PipelineTargets {
            device: &device,
            layout: &pipeline_layout,
            shader: &shader,
            format: config.format,
        };

        let pipeline_points = targets.build(PipelineDesc {
            label: "Points Pipeline",
            vs: "vs_color",
            fs: "fs_color",
            buffers: &[color_vertex_layout()],
            topology: wgpu::PrimitiveTopology::PointList,
            depth_write: true,
            depth_compare: wgpu::CompareFunction::Less,
        });

        let pipeline_lines = targets.build(PipelineDesc {
            label: "Lines Pipeline",
            vs: "vs_color",
            fs: "fs_color",
            buffers: &[color_vertex_layout()],
            topology: wgpu::PrimitiveTopology::LineList,
            depth_write: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
        });

        let pipeline_mesh = targets.build(PipelineDesc {
            label: "Mesh Pipeline",
            vs: "vs_mesh",
            fs: "fs_mesh",
            buffers: &[mesh_vertex_layout()],
            topology: wgpu::PrimitiveTopology::TriangleList,
            depth_write: true,
            depth_compare: wgpu::CompareFunction::Less,
        });

        // translucent plane and marker, drawn after opaque geometry
        let pipeline_overlay = targets.build(PipelineDesc {
            label: "Overlay Pipeline",
            vs: "vs_mesh",
            fs: "fs_mesh",
            buffers: &[mesh_vertex_layout()],
            topology: wgpu::PrimitiveTopology::TriangleList,
            depth_write: false,
            depth_compare: wgpu::CompareFunction::Less,
        });

        let pipeline_backdrop = targets.build(PipelineDesc {
            label: "Layer Backdrop Pipeline",
            vs: "vs_backdrop",
            fs: "fs_backdrop",
            buffers: &[],
            topology: wgpu::PrimitiveTopology::TriangleList,
            depth_write: false,
            depth_compare: wgpu::CompareFunction::Always,
        });

        let scene_buffers = SceneBuffers::new(&device);
        let layer_buffers = LayerBuffers::new(&device);

        let depth_texture = Self::create_depth_texture(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            pipeline_points,
            pipeline_lines,
            pipeline_mesh,
            pipeline_overlay,
            pipeline_backdrop,
            camera_buffer,
            camera_bind_group,
            layer_camera_buffer,
            layer_camera_bind_group,
            scene_buffers,
            layer_buffers,
            depth_texture,
        })
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
    ) -> wgpu::TextureView {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = Self::create_depth_texture(&self.device, &self.config);
        }
    }

    pub fn set_vsync(&mut self, enabled: bool) {
        self.config.present_mode = present_mode(enabled);
        self.surface.configure(&self.device, &self.config);
    }

    pub fn update_cameras(&self, orbit: &OrbitCamera, layer: &LayerCamera) {
        let main = CameraUniform::from_orbit(orbit);
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[main]));

        let layer = CameraUniform::from_layer(layer);
        self.queue
            .write_buffer(&self.layer_camera_buffer, 0, bytemuck::cast_slice(&[layer]));
    }

    pub fn upload_scene(&mut self, scene: &SceneGeometry) {
        self.scene_buffers.upload(&self.queue, scene);
    }

    pub fn upload_layer(&mut self, points: &[ColorVertex]) {
        self.layer_buffers.upload(&self.queue, points);
    }

    /// Full-window pass: mesh, overlay, lines and points under the orbit camera.
    pub fn render_main(&self, view: &wgpu::TextureView, encoder: &mut wgpu::CommandEncoder) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Main Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let buffers = &self.scene_buffers;
        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);

        if buffers.mesh_index_count > 0 {
            render_pass.set_pipeline(&self.pipeline_mesh);
            render_pass.set_vertex_buffer(0, buffers.mesh_vertex_buffer.slice(..));
            render_pass.set_index_buffer(buffers.mesh_index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..buffers.mesh_index_count, 0, 0..1);
        }

        if buffers.line_vertex_count > 0 {
            render_pass.set_pipeline(&self.pipeline_lines);
            render_pass.set_vertex_buffer(0, buffers.line_buffer.slice(..));
            render_pass.draw(0..buffers.line_vertex_count, 0..1);
        }

        if buffers.point_count > 0 {
            render_pass.set_pipeline(&self.pipeline_points);
            render_pass.set_vertex_buffer(0, buffers.point_buffer.slice(..));
            render_pass.draw(0..buffers.point_count, 0..1);
        }

        if buffers.overlay_index_count > 0 {
            render_pass.set_pipeline(&self.pipeline_overlay);
            render_pass.set_vertex_buffer(0, buffers.overlay_vertex_buffer.slice(..));
            render_pass.set_index_buffer(buffers.overlay_index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..buffers.overlay_index_count, 0, 0..1);
        }
    }

    /// Layer pass over the main image, limited to `rect` = `(x, y, w, h)`
    /// in physical pixels.
    pub fn render_layer(
        &self,
        view: &wgpu::TextureView,
        encoder: &mut wgpu::CommandEncoder,
        rect: (u32, u32, u32, u32),
    ) {
        let (x, y, w, h) = rect;

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Layer Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_viewport(x as f32, y as f32, w as f32, h as f32, 0.0, 1.0);
        render_pass.set_scissor_rect(x, y, w, h);

        render_pass.set_pipeline(&self.pipeline_backdrop);
        render_pass.draw(0..3, 0..1);

        if self.layer_buffers.points_count() > 0 {
            render_pass.set_pipeline(&self.pipeline_points);
            render_pass.set_bind_group(0, &self.layer_camera_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.layer_buffers.current_buffer().slice(..));
            render_pass.draw(0..self.layer_buffers.points_count(), 0..1);
        }
    }
}

fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::AutoVsync
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

fn create_camera_buffer(device: &wgpu::Device, label: &str) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: std::mem::size_of::<CameraUniform>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_camera_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    })
}

struct PipelineTargets<'a> {
    device: &'a wgpu::Device,
    layout: &'a wgpu::PipelineLayout,
    shader: &'a wgpu::ShaderModule,
    format: wgpu::TextureFormat,
}

impl PipelineTargets<'_> {
    fn build(&self, desc: PipelineDesc<'_>) -> wgpu::RenderPipeline {
        let (layout, shader, format) = (self.layout, self.shader, self.format);
        self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(desc.label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some(desc.vs),
                buffers: desc.buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some(desc.fs),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: desc.topology,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: desc.depth_write,
                depth_compare: desc.depth_compare,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }
}
