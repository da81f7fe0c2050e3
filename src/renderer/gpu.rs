use std::sync::Arc;

use anyhow::{Context, Result};
use winit::window::Window;

use crate::geometry::TriangleMesh;
use crate::renderer::camera::TorusUniform;

const INITIAL_VERTEX_CAPACITY: usize = 64 * 64;
const INITIAL_INDEX_CAPACITY: usize = INITIAL_VERTEX_CAPACITY * 6;
const FLOATS_PER_VERTEX: usize = 3;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.02,
    b: 0.03,
    a: 1.0,
};

const VERTEX_STRIDE: u64 = (FLOATS_PER_VERTEX * std::mem::size_of::<f32>()) as u64;
const INDEX_STRIDE: u64 = std::mem::size_of::<u32>() as u64;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("{buffer} buffer needs {bytes} bytes, device allows {limit}")]
    TooLarge {
        buffer: &'static str,
        bytes: u64,
        limit: u64,
    },
}

/// Rejects a mesh whose vertex or index data would not fit in one buffer.
pub fn check_buffer_sizes(
    vertices: usize,
    indices: usize,
    max_buffer_size: u64,
) -> Result<(), UploadError> {
    for (buffer, bytes) in [
        ("vertex", vertices as u64 * VERTEX_STRIDE),
        ("index", indices as u64 * INDEX_STRIDE),
    ] {
        if bytes > max_buffer_size {
            return Err(UploadError::TooLarge {
                buffer,
                bytes,
                limit: max_buffer_size,
            });
        }
    }
    Ok(())
}

fn grown_capacity(needed: usize, current: usize, max_elements: usize) -> usize {
    needed.next_power_of_two().max(current).min(max_elements)
}

/// Position, normal and index buffers for the current mesh.
///
/// Capacities only grow; a smaller mesh reuses the existing allocation.
pub struct MeshBuffers {
    pub position_buffer: wgpu::Buffer,
    pub normal_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,

    vertex_capacity: usize,
    index_capacity: usize,
}

impl MeshBuffers {
    pub fn new(device: &wgpu::Device) -> Self {
        Self::with_capacity(device, INITIAL_VERTEX_CAPACITY, INITIAL_INDEX_CAPACITY)
    }

    fn with_capacity(device: &wgpu::Device, vertex_capacity: usize, index_capacity: usize) -> Self {
        let vertex_bytes = vertex_capacity as u64 * VERTEX_STRIDE;

        let position_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Torus Position Buffer"),
            size: vertex_bytes,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let normal_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Torus Normal Buffer"),
            size: vertex_bytes,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let index_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Torus Index Buffer"),
            size: index_capacity as u64 * INDEX_STRIDE,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            position_buffer,
            normal_buffer,
            index_buffer,
            index_count: 0,
            vertex_capacity,
            index_capacity,
        }
    }

    /// Leaves the previous mesh in place when the new one is too large.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        mesh: &TriangleMesh,
    ) -> Result<(), UploadError> {
        let vertices = mesh.vertex_count();
        let indices = mesh.index_count() as usize;
        let max_buffer_size = device.limits().max_buffer_size;

        check_buffer_sizes(vertices, indices, max_buffer_size)?;

        if vertices > self.vertex_capacity || indices > self.index_capacity {
            let vertex_capacity = grown_capacity(
                vertices,
                self.vertex_capacity,
                (max_buffer_size / VERTEX_STRIDE) as usize,
            );
            let index_capacity = grown_capacity(
                indices,
                self.index_capacity,
                (max_buffer_size / INDEX_STRIDE) as usize,
            );
            log::debug!(
                "growing mesh buffers to {} vertices / {} indices",
                vertex_capacity,
                index_capacity
            );
            *self = Self::with_capacity(device, vertex_capacity, index_capacity);
        }

        queue.write_buffer(
            &self.position_buffer,
            0,
            bytemuck::cast_slice(mesh.positions_flat()),
        );
        queue.write_buffer(
            &self.normal_buffer,
            0,
            bytemuck::cast_slice(mesh.normals_flat()),
        );
        queue.write_buffer(
            &self.index_buffer,
            0,
            bytemuck::cast_slice(mesh.indices_flat()),
        );

        self.index_count = mesh.index_count();
        Ok(())
    }
}

fn position_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: VERTEX_STRIDE,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        }],
    }
}

fn normal_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: VERTEX_STRIDE,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x3,
        }],
    }
}

fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::AutoVsync
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

pub struct GpuState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,

    pub pipeline: wgpu::RenderPipeline,

    pub uniform_buffer: wgpu::Buffer,
    pub uniform_bind_group: wgpu::BindGroup,

    pub mesh_buffers: MeshBuffers,

    pub depth_texture: wgpu::TextureView,
}

impl GpuState {
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<Self> {
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
            .context("no GPU adapter can present to this window")?;

        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Torus Device"),
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
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no supported formats")?;
        log::info!("surface format {:?}", surface_format);

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
            label: Some("Torus Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders.wgsl").into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Torus Uniform Buffer"),
            size: std::mem::size_of::<TorusUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Torus Bind Group Layout"),
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

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Torus Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Torus Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Torus Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[position_layout(), normal_layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let mesh_buffers = MeshBuffers::new(&device);
        let depth_texture = Self::create_depth_texture(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            mesh_buffers,
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

    pub fn upload_mesh(&mut self, mesh: &TriangleMesh) -> Result<(), UploadError> {
        self.mesh_buffers.upload(&self.device, &self.queue, mesh)
    }

    pub fn update_uniform(&self, uniform: &TorusUniform) {
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[*uniform]));
    }

    pub fn render_torus(&self, view: &wgpu::TextureView, encoder: &mut wgpu::CommandEncoder) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Torus Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
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

        if self.mesh_buffers.index_count == 0 {
            return;
        }

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.mesh_buffers.position_buffer.slice(..));
        render_pass.set_vertex_buffer(1, self.mesh_buffers.normal_buffer.slice(..));
        render_pass.set_index_buffer(
            self.mesh_buffers.index_buffer.slice(..),
            wgpu::IndexFormat::Uint32,
        );
        render_pass.draw_indexed(0..self.mesh_buffers.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::TorusParams;

    fn mesh_sizes(params: &TorusParams) -> (usize, usize) {
        (params.vertex_count(), params.triangle_count() * 3)
    }

    #[test]
    fn default_torus_fits_default_limits() {
        let (vertices, indices) = mesh_sizes(&TorusParams::default());
        let limit = wgpu::Limits::default().max_buffer_size;

        assert_eq!(check_buffer_sizes(vertices, indices, limit), Ok(()));
    }

    #[test]
    fn huge_grid_is_rejected_before_buffer_creation() {
        let params = TorusParams {
            major_segments: 4000,
            minor_segments: 4000,
            ..TorusParams::default()
        };
        assert!(params.validate().is_ok());

        let (vertices, indices) = mesh_sizes(&params);
        let limit = wgpu::Limits::default().max_buffer_size;

        let err = check_buffer_sizes(vertices, indices, limit).unwrap_err();
        assert_eq!(
            err,
            UploadError::TooLarge {
                buffer: "index",
                bytes: 96_000_000 * 4,
                limit,
            }
        );
    }

    #[test]
    fn vertex_buffer_is_checked_too() {
        let err = check_buffer_sizes(100, 3, 100 * VERTEX_STRIDE - 1).unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { buffer: "vertex", .. }));
    }

    #[test]
    fn growth_never_exceeds_the_limit() {
        assert_eq!(grown_capacity(5000, 4096, 1 << 20), 8192);
        assert_eq!(grown_capacity(5000, 16384, 1 << 20), 16384);
        assert_eq!(grown_capacity(600_000, 4096, 700_000), 700_000);
    }
}
