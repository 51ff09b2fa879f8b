//! WGSL shader programs with named uniforms.
//!
//! A [`ShaderProgram`] is a compiled shader module plus the per-frame uniform
//! block it reads at `@group(0) @binding(0)`. Uniforms are written by name
//! through [`UniformSink`] and uploaded once per frame with
//! [`flush`](ShaderProgram::flush).
//!
//! The bundled Phong shader ([`DEFAULT_SHADER`]) declares its frame block in
//! the order [`frame_layout`] lists it. A custom shader loaded from disk must
//! declare the same `Frame` struct.

use std::num::NonZeroU64;
use std::path::Path;

use crate::error::{Error, Result};
use crate::light_manager::MAX_POINT_LIGHTS;
use crate::uniform::{UniformBlock, UniformKind, UniformLayout, UniformSink, UniformValue};

/// Source of the bundled Phong shader.
pub const DEFAULT_SHADER: &str = include_str!("shaders/phong.wgsl");

const DIR_LIGHT: &[(&str, UniformKind)] = &[
    ("direction", UniformKind::Vec3),
    ("ambient", UniformKind::Vec3),
    ("diffuse", UniformKind::Vec3),
    ("specular", UniformKind::Vec3),
];

const POINT_LIGHT: &[(&str, UniformKind)] = &[
    ("position", UniformKind::Vec3),
    ("ambient", UniformKind::Vec3),
    ("diffuse", UniformKind::Vec3),
    ("specular", UniformKind::Vec3),
    ("constant", UniformKind::Float),
    ("linear", UniformKind::Float),
    ("quadratic", UniformKind::Float),
];

const FLASH_LIGHT: &[(&str, UniformKind)] = &[
    ("position", UniformKind::Vec3),
    ("ambient", UniformKind::Vec3),
    ("diffuse", UniformKind::Vec3),
    ("specular", UniformKind::Vec3),
    ("constant", UniformKind::Float),
    ("linear", UniformKind::Float),
    ("quadratic", UniformKind::Float),
    ("direction", UniformKind::Vec3),
    ("cutOff", UniformKind::Float),
    ("outerCutOff", UniformKind::Float),
];

/// Layout of the `Frame` uniform struct in the bundled shader.
pub fn frame_layout() -> UniformLayout {
    UniformLayout::builder()
        .field("view", UniformKind::Mat4)
        .field("proj", UniformKind::Mat4)
        .field("viewPos", UniformKind::Vec3)
        .field("useDirLight", UniformKind::Bool)
        .structure("dirlight", DIR_LIGHT)
        .field("useFlashLight", UniformKind::Bool)
        .structure("flashLight", FLASH_LIGHT)
        .struct_array("pointLights", MAX_POINT_LIGHTS, POINT_LIGHT)
        .scalar_array("usePointLight", MAX_POINT_LIGHTS, UniformKind::Bool)
        .field("shininess", UniformKind::Float)
        .build()
}

/// Read WGSL source from `path`.
pub fn read_source(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|source| Error::ShaderRead {
        path: path.to_path_buf(),
        source,
    })
}

/// A compiled shader module and its named uniform block.
pub struct ShaderProgram {
    label: String,
    module: wgpu::ShaderModule,
    block: UniformBlock,
    buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl ShaderProgram {
    /// Compile `source` and allocate a uniform buffer for `layout`.
    ///
    /// wgpu reports invalid WGSL by panicking inside its default error
    /// handler; that panic is caught and returned as [`Error::ShaderCompile`].
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        source: &str,
        layout: UniformLayout,
    ) -> Result<Self> {
        let module = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        }))
        .map_err(|_| Error::ShaderCompile {
            label: label.to_string(),
        })?;

        let size = layout.size();
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} uniforms")),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{label} uniform layout")),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(size),
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} uniforms")),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        log::info!(
            "compiled shader '{label}' ({} uniforms, {size} byte block)",
            layout.len()
        );

        Ok(Self {
            label: label.to_string(),
            module,
            block: UniformBlock::new(layout),
            buffer,
            bind_group_layout,
            bind_group,
        })
    }

    /// The bundled Phong shader with [`frame_layout`].
    pub fn phong(device: &wgpu::Device) -> Result<Self> {
        Self::new(device, "phong", DEFAULT_SHADER, frame_layout())
    }

    /// A shader read from `path` that declares the [`frame_layout`] block.
    pub fn from_file(device: &wgpu::Device, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = read_source(path)?;
        Self::new(device, &path.display().to_string(), &source, frame_layout())
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn module(&self) -> &wgpu::ShaderModule {
        &self.module
    }

    /// CPU copy of the uniform block.
    pub fn block(&self) -> &UniformBlock {
        &self.block
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    /// Upload the uniform block if anything was written since the last flush.
    pub fn flush(&mut self, queue: &wgpu::Queue) {
        if self.block.is_dirty() {
            queue.write_buffer(&self.buffer, 0, self.block.bytes());
            self.block.mark_clean();
        }
    }
}

impl UniformSink for ShaderProgram {
    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.block.set_uniform(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offset(layout: &UniformLayout, name: &str) -> u64 {
        layout.slot(name).unwrap().offset
    }

    #[test]
    fn frame_layout_matches_the_wgsl_struct() {
        let layout = frame_layout();
        assert_eq!(offset(&layout, "view"), 0);
        assert_eq!(offset(&layout, "proj"), 64);
        assert_eq!(offset(&layout, "viewPos"), 128);
        assert_eq!(offset(&layout, "useDirLight"), 140);
        assert_eq!(offset(&layout, "dirlight.direction"), 144);
        assert_eq!(offset(&layout, "dirlight.specular"), 192);
        assert_eq!(offset(&layout, "useFlashLight"), 208);
        assert_eq!(offset(&layout, "flashLight.position"), 224);
        assert_eq!(offset(&layout, "flashLight.constant"), 284);
        assert_eq!(offset(&layout, "flashLight.direction"), 304);
        assert_eq!(offset(&layout, "flashLight.cutOff"), 316);
        assert_eq!(offset(&layout, "flashLight.outerCutOff"), 320);
        assert_eq!(offset(&layout, "pointLights[0].position"), 336);
        assert_eq!(offset(&layout, "pointLights[3].quadratic"), 336 + 3 * 80 + 68);
        assert_eq!(offset(&layout, "usePointLight[0]"), 656);
        assert_eq!(offset(&layout, "usePointLight[3]"), 704);
        assert_eq!(offset(&layout, "shininess"), 720);
        assert_eq!(layout.size(), 736);
    }

    #[test]
    fn bundled_shader_declares_every_block_member() {
        for member in [
            "viewPos:",
            "useDirLight:",
            "dirlight:",
            "useFlashLight:",
            "flashLight:",
            "pointLights:",
            "usePointLight:",
            "shininess:",
            "cutOff:",
            "outerCutOff:",
        ] {
            assert!(DEFAULT_SHADER.contains(member), "missing {member}");
        }
    }

    #[test]
    fn read_source_reports_missing_files() {
        let err = read_source("no/such/shader.wgsl").unwrap_err();
        assert!(matches!(err, Error::ShaderRead { .. }));
        assert!(err.to_string().contains("no/such/shader.wgsl"));
    }

    #[test]
    fn light_manager_fills_the_frame_block() {
        use crate::light::{DirectionalLight, FlashLight, PointLight};
        use crate::light_manager::LightManager;
        use glam::Vec3;

        let mut lights = LightManager::new();
        lights.set_directional(DirectionalLight::default());
        lights.add_point(PointLight::at(Vec3::new(1.0, 2.0, 3.0)));
        lights.set_flash(FlashLight::default());

        let mut block = UniformBlock::new(frame_layout());
        lights.apply_all(&mut block);

        let position: Vec<f32> =
            bytemuck::pod_collect_to_vec(block.read("pointLights[0].position").unwrap());
        assert_eq!(position, [1.0, 2.0, 3.0]);
        assert_eq!(block.read("usePointLight[0]").unwrap(), &1u32.to_ne_bytes());
        assert_eq!(block.read("usePointLight[1]").unwrap(), &0u32.to_ne_bytes());
        assert_eq!(block.read("useDirLight").unwrap(), &1u32.to_ne_bytes());
    }
}
