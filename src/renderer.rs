//! Draws a [`Scene`] with the Phong pipeline.
//!
//! Bind groups:
//! - **Group 0**: the shader program's frame block (camera, lights, shininess)
//! - **Group 1**: per-draw [`DrawUniforms`], one slot per cube at a dynamic offset
//! - **Group 2**: texture unit 0 (`tex0`)

use std::num::NonZeroU64;

use glam::Mat4;

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::gpu::{DEPTH_FORMAT, GpuContext};
use crate::mesh::Mesh;
use crate::scene::Scene;
use crate::shader::ShaderProgram;
use crate::texture::Texture;

/// Per-draw uniforms: the model matrix and its inverse transpose for normals.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniforms {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
}

impl DrawUniforms {
    pub fn new(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal: model.inverse().transpose().to_cols_array_2d(),
        }
    }
}

const DRAW_UNIFORMS_SIZE: u64 = std::mem::size_of::<DrawUniforms>() as u64;

/// Round `size` up to a multiple of `alignment`.
fn aligned_stride(size: u64, alignment: u64) -> u64 {
    size.div_ceil(alignment) * alignment
}

/// Dynamic-offset uniform buffer holding one [`DrawUniforms`] per draw.
struct DrawBuffer {
    layout: wgpu::BindGroupLayout,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: u64,
    capacity: usize,
}

impl DrawBuffer {
    fn new(device: &wgpu::Device, alignment: u64, capacity: usize) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(DRAW_UNIFORMS_SIZE),
                },
                count: None,
            }],
        });
        let stride = aligned_stride(DRAW_UNIFORMS_SIZE, alignment);
        let (buffer, bind_group) = Self::allocate(device, &layout, stride, capacity);
        Self {
            layout,
            buffer,
            bind_group,
            stride,
            capacity,
        }
    }

    fn allocate(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("draw uniforms"),
            size: stride * capacity.max(1) as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("draw uniforms"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(DRAW_UNIFORMS_SIZE),
                }),
            }],
        });
        (buffer, bind_group)
    }

    /// Upload one slot per model matrix, growing the buffer if needed.
    fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, models: &[Mat4]) {
        if models.is_empty() {
            return;
        }
        if models.len() > self.capacity {
            let capacity = models.len().next_power_of_two();
            log::debug!("growing draw buffer to {capacity} slots");
            self.buffer.destroy();
            (self.buffer, self.bind_group) =
                Self::allocate(device, &self.layout, self.stride, capacity);
            self.capacity = capacity;
        }

        let mut bytes = vec![0u8; self.stride as usize * models.len()];
        for (slot, model) in bytes.chunks_exact_mut(self.stride as usize).zip(models) {
            slot[..DRAW_UNIFORMS_SIZE as usize]
                .copy_from_slice(bytemuck::bytes_of(&DrawUniforms::new(*model)));
        }
        queue.write_buffer(&self.buffer, 0, &bytes);
    }

    fn offset(&self, index: usize) -> u32 {
        (self.stride * index as u64) as u32
    }
}

/// Owns the pipeline and every GPU resource needed to draw the cube scene.
pub struct Renderer {
    pipeline: wgpu::RenderPipeline,
    shader: ShaderProgram,
    draws: DrawBuffer,
    // Kept alive for the bind group.
    _texture: Texture,
    texture_bind_group: wgpu::BindGroup,
    cube: Mesh,
    depth_view: wgpu::TextureView,
    depth_texture: wgpu::Texture,
    depth_size: (u32, u32),
    clear_color: wgpu::Color,
    clip: (f32, f32),
}

impl Renderer {
    /// Build the pipeline from `config`'s shader and texture (or the bundled
    /// shader and a white texture).
    pub fn new(gpu: &GpuContext, config: &AppConfig) -> Result<Self> {
        let device = &gpu.device;

        let shader = match &config.shader {
            Some(path) => ShaderProgram::from_file(device, path)?,
            None => ShaderProgram::phong(device)?,
        };

        let texture = match &config.texture {
            Some(path) => Texture::from_file(device, &gpu.queue, path)?,
            None => Texture::white(device, &gpu.queue),
        };
        let texture_layout = Texture::bind_group_layout(device);
        let texture_bind_group = texture.bind_group(device, &texture_layout);

        let cube = Mesh::cube(device, 1.0);
        let draws = DrawBuffer::new(device, gpu.uniform_alignment(), 16);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("phong pipeline layout"),
            bind_group_layouts: &[shader.bind_group_layout(), &draws.layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let pipeline = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("phong pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: shader.module(),
                    entry_point: Some("vs"),
                    buffers: &[cube.vertex_array().layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: shader.module(),
                    entry_point: Some("fs"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: gpu.config.format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: Some(wgpu::Face::Back),
                    front_face: wgpu::FrontFace::Ccw,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        }))
        .map_err(|_| Error::ShaderCompile {
            label: shader.label().to_string(),
        })?;

        let (depth_texture, depth_view) = Self::create_depth_texture(gpu);
        let [r, g, b, a] = config.clear_color;

        Ok(Self {
            pipeline,
            shader,
            draws,
            _texture: texture,
            texture_bind_group,
            cube,
            depth_view,
            depth_texture,
            depth_size: (gpu.width(), gpu.height()),
            clear_color: wgpu::Color { r, g, b, a },
            clip: config.clip,
        })
    }

    fn create_depth_texture(gpu: &GpuContext) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth texture"),
            size: wgpu::Extent3d {
                width: gpu.width(),
                height: gpu.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    /// Recreate the depth buffer if the surface size changed.
    fn ensure_depth_size(&mut self, gpu: &GpuContext) {
        if self.depth_size != (gpu.width(), gpu.height()) {
            self.depth_texture.destroy();
            let (texture, view) = Self::create_depth_texture(gpu);
            self.depth_texture = texture;
            self.depth_view = view;
            self.depth_size = (gpu.width(), gpu.height());
        }
    }

    /// Upload `scene` and draw one frame at `time` seconds.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped.
    pub fn render(&mut self, gpu: &GpuContext, scene: &Scene, time: f32) {
        let output = match gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost or outdated, reconfiguring");
                gpu.reconfigure();
                return;
            }
            Err(err) => {
                log::warn!("skipping frame: {err}");
                return;
            }
        };

        self.ensure_depth_size(gpu);

        let (near, far) = self.clip;
        scene.apply(&mut self.shader, gpu.aspect(), near, far);
        self.shader.flush(&gpu.queue);

        let models = scene.model_matrices(time);
        self.draws.write(&gpu.device, &gpu.queue, &models);

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("phong pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, self.shader.bind_group(), &[]);
            pass.set_bind_group(2, &self.texture_bind_group, &[]);
            for index in 0..models.len() {
                pass.set_bind_group(1, &self.draws.bind_group, &[self.draws.offset(index)]);
                self.cube.draw(&mut pass);
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        log::trace!("frame at {time:.3}s: {} draws", models.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn draw_slots_respect_offset_alignment() {
        assert_eq!(DRAW_UNIFORMS_SIZE, 128);
        assert_eq!(aligned_stride(DRAW_UNIFORMS_SIZE, 256), 256);
        assert_eq!(aligned_stride(DRAW_UNIFORMS_SIZE, 64), 128);
        assert_eq!(aligned_stride(200, 64), 256);
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let model = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let draw = DrawUniforms::new(model);
        let normal = Mat4::from_cols_array_2d(&draw.normal);
        // A normal on a surface stretched along x shrinks along x.
        let n = normal.transform_vector3(Vec3::new(1.0, 1.0, 0.0));
        assert!(n.abs_diff_eq(Vec3::new(0.5, 1.0, 0.0), 1e-6));
    }
}
