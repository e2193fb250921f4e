use bytemuck::{Pod, Zeroable};

use crate::scene::SceneGeometry;

const NUM_LAYER_BUFFERS: usize = 3;
const MAX_LAYER_POINTS: usize = 100_000;

const MAX_SCENE_POINTS: usize = 1_000_000;
const MAX_LINE_VERTICES: usize = 10_000;
const MAX_MESH_VERTICES: usize = 500_000;
const MAX_MESH_INDICES: usize = 1_000_000;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

fn vertex_buffer(device: &wgpu::Device, label: &str, bytes: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: bytes as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Rotating vertex buffers for the layer view, rewritten every frame.
pub struct LayerBuffers {
    buffers: [wgpu::Buffer; NUM_LAYER_BUFFERS],
    current_buffer: usize,
    points_count: usize,
    truncated: bool,
}

impl LayerBuffers {
    pub fn new(device: &wgpu::Device) -> Self {
        let buffers = std::array::from_fn(|_| {
            vertex_buffer(
                device,
                "Layer Point Buffer",
                MAX_LAYER_POINTS * std::mem::size_of::<ColorVertex>(),
            )
        });

        Self {
            buffers,
            current_buffer: 0,
            points_count: 0,
            truncated: false,
        }
    }

    pub fn upload(&mut self, queue: &wgpu::Queue, points: &[ColorVertex]) {
        // an empty slice still has to replace the previous frame's points
        if points.is_empty() {
            self.points_count = 0;
            return;
        }

        let next_buffer = (self.current_buffer + 1) % NUM_LAYER_BUFFERS;
        let point_count = capped_len("layer points", points.len(), MAX_LAYER_POINTS, &mut self.truncated);

        queue.write_buffer(
            &self.buffers[next_buffer],
            0,
            bytemuck::cast_slice(&points[..point_count]),
        );

        self.current_buffer = next_buffer;
        self.points_count = point_count;
    }

    pub fn current_buffer(&self) -> &wgpu::Buffer {
        &self.buffers[self.current_buffer]
    }

    pub fn points_count(&self) -> u32 {
        self.points_count as u32
    }
}

pub struct SceneBuffers {
    pub point_buffer: wgpu::Buffer,
    pub point_count: u32,

    pub line_buffer: wgpu::Buffer,
    pub line_vertex_count: u32,

    pub mesh_vertex_buffer: wgpu::Buffer,
    pub mesh_index_buffer: wgpu::Buffer,
    pub mesh_index_count: u32,

    pub overlay_vertex_buffer: wgpu::Buffer,
    pub overlay_index_buffer: wgpu::Buffer,
    pub overlay_index_count: u32,

    points_truncated: bool,
    lines_truncated: bool,
}

impl SceneBuffers {
    pub fn new(device: &wgpu::Device) -> Self {
        let index_buffer = |label: &str, count: usize| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: (count * 4) as u64,
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };

        Self {
            point_buffer: vertex_buffer(
                device,
                "Scene Point Buffer",
                MAX_SCENE_POINTS * std::mem::size_of::<ColorVertex>(),
            ),
            point_count: 0,
            line_buffer: vertex_buffer(
                device,
                "Scene Line Buffer",
                MAX_LINE_VERTICES * std::mem::size_of::<ColorVertex>(),
            ),
            line_vertex_count: 0,
            mesh_vertex_buffer: vertex_buffer(
                device,
                "Scene Mesh Vertex Buffer",
                MAX_MESH_VERTICES * std::mem::size_of::<MeshVertex>(),
            ),
            mesh_index_buffer: index_buffer("Scene Mesh Index Buffer", MAX_MESH_INDICES),
            mesh_index_count: 0,
            overlay_vertex_buffer: vertex_buffer(
                device,
                "Overlay Vertex Buffer",
                MAX_LINE_VERTICES * std::mem::size_of::<MeshVertex>(),
            ),
            overlay_index_buffer: index_buffer("Overlay Index Buffer", MAX_LINE_VERTICES * 3),
            overlay_index_count: 0,
            points_truncated: false,
            lines_truncated: false,
        }
    }

    pub fn upload(&mut self, queue: &wgpu::Queue, scene: &SceneGeometry) {
        let point_count = capped_len(
            "scene points",
            scene.points.len(),
            MAX_SCENE_POINTS,
            &mut self.points_truncated,
        );
        let points = &scene.points[..point_count];
        if !points.is_empty() {
            queue.write_buffer(&self.point_buffer, 0, bytemuck::cast_slice(points));
        }
        self.point_count = points.len() as u32;

        let line_count = capped_len(
            "scene lines",
            scene.lines.len(),
            MAX_LINE_VERTICES,
            &mut self.lines_truncated,
        );
        let lines = &scene.lines[..line_count & !1];
        if !lines.is_empty() {
            queue.write_buffer(&self.line_buffer, 0, bytemuck::cast_slice(lines));
        }
        self.line_vertex_count = lines.len() as u32;

        self.mesh_index_count = upload_indexed(
            queue,
            &self.mesh_vertex_buffer,
            &self.mesh_index_buffer,
            &scene.mesh_vertices,
            &scene.mesh_indices,
            MAX_MESH_VERTICES,
            MAX_MESH_INDICES,
        );

        self.overlay_index_count = upload_indexed(
            queue,
            &self.overlay_vertex_buffer,
            &self.overlay_index_buffer,
            &scene.overlay_vertices,
            &scene.overlay_indices,
            MAX_LINE_VERTICES,
            MAX_LINE_VERTICES * 3,
        );
    }
}

/// Clamps `len` to `max`. Warns once each time uploads start exceeding
/// capacity; `warned` resets when an upload fits again.
fn capped_len(what: &str, len: usize, max: usize, warned: &mut bool) -> usize {
    if len <= max {
        *warned = false;
        return len;
    }
    if !*warned {
        log::warn!("{what}: {len} vertices exceed buffer capacity of {max}, drawing the first {max}");
        *warned = true;
    }
    max
}

fn upload_indexed(
    queue: &wgpu::Queue,
    vertex_buffer: &wgpu::Buffer,
    index_buffer: &wgpu::Buffer,
    vertices: &[MeshVertex],
    indices: &[u32],
    max_vertices: usize,
    max_indices: usize,
) -> u32 {
    if vertices.len() > max_vertices || indices.len() > max_indices {
        log::warn!(
            "mesh with {} vertices / {} indices exceeds buffer capacity, not uploaded",
            vertices.len(),
            indices.len()
        );
        return 0;
    }
    if vertices.is_empty() || indices.is_empty() {
        return 0;
    }

    queue.write_buffer(vertex_buffer, 0, bytemuck::cast_slice(vertices));
    queue.write_buffer(index_buffer, 0, bytemuck::cast_slice(indices));
    indices.len() as u32
}

pub fn color_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<ColorVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x4,
            },
        ],
    }
}

pub fn mesh_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: 24,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x4,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capped_len_truncates_and_rearms_warning() {
        let mut warned = false;
        assert_eq!(capped_len("layer points", 225, MAX_LAYER_POINTS, &mut warned), 225);
        assert!(!warned);

        assert_eq!(capped_len("layer points", 160_000, MAX_LAYER_POINTS, &mut warned), MAX_LAYER_POINTS);
        assert!(warned);
        assert_eq!(capped_len("layer points", 160_000, MAX_LAYER_POINTS, &mut warned), MAX_LAYER_POINTS);
        assert!(warned);

        assert_eq!(capped_len("layer points", MAX_LAYER_POINTS, MAX_LAYER_POINTS, &mut warned), MAX_LAYER_POINTS);
        assert!(!warned);
    }

    #[test]
    fn test_line_count_stays_even_after_capping() {
        let mut warned = false;
        let count = capped_len("scene lines", MAX_LINE_VERTICES + 3, MAX_LINE_VERTICES, &mut warned) & !1;
        assert_eq!(count % 2, 0);
        assert!(count <= MAX_LINE_VERTICES);
    }
}
