//! Owned GPU buffer objects.
//!
//! [`VertexBuffer`] and [`IndexBuffer`] each own one `wgpu::Buffer` and
//! destroy it when dropped, so a mesh's GPU memory is released exactly when
//! the mesh goes out of scope. [`VertexArray`] describes how a vertex buffer
//! is read: stride and attribute formats per shader location. wgpu has no
//! vertex array object, so it is plain data turned into a
//! `wgpu::VertexBufferLayout` when a pipeline is built.

use wgpu::util::DeviceExt;

/// Vertex data uploaded to the GPU.
#[derive(Debug)]
pub struct VertexBuffer {
    buffer: wgpu::Buffer,
    count: u32,
}

impl VertexBuffer {
    /// Upload `vertices`.
    pub fn new<V: bytemuck::Pod>(device: &wgpu::Device, label: &str, vertices: &[V]) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        log::debug!("created vertex buffer '{label}' ({} vertices)", vertices.len());
        Self {
            buffer,
            count: vertices.len() as u32,
        }
    }

    /// Number of vertices stored.
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Bind to vertex buffer `slot` of `pass`.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>, slot: u32) {
        pass.set_vertex_buffer(slot, self.buffer.slice(..));
    }
}

impl Drop for VertexBuffer {
    fn drop(&mut self) {
        log::debug!("releasing vertex buffer ({} vertices)", self.count);
        self.buffer.destroy();
    }
}

/// 32-bit triangle indices uploaded to the GPU.
#[derive(Debug)]
pub struct IndexBuffer {
    buffer: wgpu::Buffer,
    count: u32,
}

impl IndexBuffer {
    pub fn new(device: &wgpu::Device, label: &str, indices: &[u32]) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        log::debug!("created index buffer '{label}' ({} indices)", indices.len());
        Self {
            buffer,
            count: indices.len() as u32,
        }
    }

    /// Number of indices stored.
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_index_buffer(self.buffer.slice(..), wgpu::IndexFormat::Uint32);
    }
}

impl Drop for IndexBuffer {
    fn drop(&mut self) {
        log::debug!("releasing index buffer ({} indices)", self.count);
        self.buffer.destroy();
    }
}

/// Attribute layout of an interleaved vertex buffer.
///
/// Attributes are packed tightly in the order they are added.
///
/// ```
/// use lightbox::VertexArray;
///
/// let layout = VertexArray::new()
///     .attribute(0, wgpu::VertexFormat::Float32x3)
///     .attribute(1, wgpu::VertexFormat::Float32x2);
/// assert_eq!(layout.stride(), 20);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VertexArray {
    attributes: Vec<wgpu::VertexAttribute>,
    stride: u64,
}

impl VertexArray {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute read at `location` in the vertex shader.
    pub fn attribute(mut self, location: u32, format: wgpu::VertexFormat) -> Self {
        self.attributes.push(wgpu::VertexAttribute {
            format,
            offset: self.stride,
            shader_location: location,
        });
        self.stride += format.size();
        self
    }

    /// Bytes per vertex.
    pub fn stride(&self) -> u64 {
        self.stride
    }

    pub fn attributes(&self) -> &[wgpu::VertexAttribute] {
        &self.attributes
    }

    /// The layout to put in a pipeline's `VertexState::buffers`.
    pub fn layout(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &self.attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_are_packed_in_order() {
        let layout = VertexArray::new()
            .attribute(0, wgpu::VertexFormat::Float32x3)
            .attribute(1, wgpu::VertexFormat::Float32x2)
            .attribute(2, wgpu::VertexFormat::Float32x3);

        let offsets: Vec<_> = layout
            .attributes()
            .iter()
            .map(|a| (a.shader_location, a.offset))
            .collect();
        assert_eq!(offsets, [(0, 0), (1, 12), (2, 20)]);
        assert_eq!(layout.stride(), 32);
        assert_eq!(layout.layout().array_stride, 32);
    }

    #[test]
    fn empty_layout_has_no_stride() {
        let layout = VertexArray::new();
        assert_eq!(layout.stride(), 0);
        assert!(layout.attributes().is_empty());
    }
}
