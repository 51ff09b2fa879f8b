//! Vertex format, CPU-side geometry, and GPU meshes.
//!
//! - [`Vertex`]: position, texture coordinates and normal, 32 bytes.
//! - [`MeshData`]: vertices plus optional indices, built on the CPU.
//! - [`Mesh`]: the uploaded form, owning its [`VertexBuffer`], optional
//!   [`IndexBuffer`] and [`VertexArray`].
//!
//! # Vertex Layout
//!
//! | Attribute  | Format    | Offset | Shader Location |
//! |------------|-----------|--------|-----------------|
//! | position   | Float32x3 | 0      | 0               |
//! | tex_coords | Float32x2 | 12     | 1               |
//! | normal     | Float32x3 | 20     | 2               |

use glam::Vec3;

use crate::buffers::{IndexBuffer, VertexArray, VertexBuffer};

/// A vertex with position, texture coordinates and normal.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

impl Vertex {
    /// The wgpu layout for [`Vertex`], for pipelines built without a [`VertexArray`].
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
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
                format: wgpu::VertexFormat::Float32x2,
            },
            wgpu::VertexAttribute {
                offset: 20,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x3,
            },
        ],
    };

    pub fn new(position: [f32; 3], tex_coords: [f32; 2], normal: [f32; 3]) -> Self {
        Self {
            position,
            tex_coords,
            normal,
        }
    }

    /// Attribute layout matching [`Vertex::LAYOUT`].
    pub fn vertex_array() -> VertexArray {
        VertexArray::new()
            .attribute(0, wgpu::VertexFormat::Float32x3)
            .attribute(1, wgpu::VertexFormat::Float32x2)
            .attribute(2, wgpu::VertexFormat::Float32x3)
    }
}

/// Geometry on the CPU, ready to upload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    /// Triangle indices; `None` draws `vertices` as a plain triangle list.
    pub indices: Option<Vec<u32>>,
}

impl MeshData {
    pub fn new(vertices: Vec<Vertex>, indices: Option<Vec<u32>>) -> Self {
        Self { vertices, indices }
    }

    /// Axis-aligned cube of edge length `size`, centred on the origin.
    ///
    /// Each face has its own six vertices so normals stay flat, giving 36
    /// vertices and no indices. Triangles wind counter-clockwise seen from
    /// outside. Each face maps the whole texture, upright.
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        // (normal, u axis, v axis) with u × v = normal.
        let faces = [
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        ];
        // Quad corners as (u sign, v sign, tex coords).
        let corners = [
            (-1.0, -1.0, [0.0, 1.0]),
            (1.0, -1.0, [1.0, 1.0]),
            (1.0, 1.0, [1.0, 0.0]),
            (-1.0, 1.0, [0.0, 0.0]),
        ];

        let mut vertices = Vec::with_capacity(36);
        for (normal, u, v) in faces {
            for corner in [0, 1, 2, 2, 3, 0] {
                let (su, sv, tex_coords) = corners[corner];
                let position = (normal + u * su + v * sv) * h;
                vertices.push(Vertex::new(position.to_array(), tex_coords, normal.to_array()));
            }
        }

        Self::new(vertices, None)
    }

    pub fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }
}

/// GPU-resident geometry.
///
/// Dropping a `Mesh` drops its buffers, which releases the GPU memory.
#[derive(Debug)]
pub struct Mesh {
    vertices: VertexBuffer,
    indices: Option<IndexBuffer>,
    layout: VertexArray,
}

impl Mesh {
    /// Upload `data`. Indexed drawing is used when `data` has indices.
    pub fn new(device: &wgpu::Device, label: &str, data: &MeshData) -> Self {
        let vertices = VertexBuffer::new(device, &format!("{label} vertices"), &data.vertices);
        let indices = data
            .indices
            .as_deref()
            .map(|indices| IndexBuffer::new(device, &format!("{label} indices"), indices));
        Self {
            vertices,
            indices,
            layout: Vertex::vertex_array(),
        }
    }

    /// Upload a [`MeshData::cube`].
    pub fn cube(device: &wgpu::Device, size: f32) -> Self {
        Self::new(device, "cube", &MeshData::cube(size))
    }

    pub fn vertex_array(&self) -> &VertexArray {
        &self.layout
    }

    pub fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }

    /// Bind the buffers and issue one draw call.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        self.vertices.bind(pass, 0);
        match &self.indices {
            Some(indices) => {
                indices.bind(pass);
                pass.draw_indexed(0..indices.count(), 0, 0..1);
            }
            None => pass.draw(0..self.vertices.count(), 0..1),
        }
    }
}
