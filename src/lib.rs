//! # lightbox
//!
//! **A Phong-lit cube field on wgpu.**
//!
//! A first-person [`Camera`], three kinds of light ([`DirectionalLight`],
//! [`PointLight`], [`FlashLight`]) gathered in a [`LightManager`], and the
//! glue that turns named uniform writes into a WGSL uniform buffer.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> lightbox::Result<()> {
//!     lightbox::run(lightbox::AppConfig::new().texture("cat.png"))
//! }
//! ```
//!
//! ## Lights without a GPU
//!
//! Lights only know how to write themselves into a [`UniformSink`], so they
//! can be inspected with a [`UniformRecorder`]:
//!
//! ```
//! use lightbox::{LightManager, PointLight, UniformRecorder, Vec3};
//!
//! let mut lights = LightManager::new();
//! lights.add_point(PointLight::at(Vec3::new(0.7, 0.2, 2.0)));
//!
//! let mut recorder = UniformRecorder::new();
//! lights.apply_all(&mut recorder);
//! assert_eq!(recorder.names().next(), Some("pointLights[0].position"));
//! ```

mod app;
mod buffers;
mod camera;
mod config;
mod error;
mod gpu;
mod input;
mod light;
mod light_manager;
mod mesh;
mod renderer;
mod scene;
mod shader;
pub mod summary;
mod texture;
mod uniform;

pub use app::run;
pub use buffers::{IndexBuffer, VertexArray, VertexBuffer};
pub use camera::{Camera, CameraMovement, PITCH_LIMIT, ZOOM_RANGE};
pub use config::{AppConfig, Cli};
pub use error::{Error, Result};
pub use gpu::GpuContext;
pub use input::Input;
pub use light::{Attenuation, DirectionalLight, FlashLight, Light, LightColor, PointLight};
pub use light_manager::{LightManager, MAX_POINT_LIGHTS, Switchable};
pub use mesh::{Mesh, MeshData, Vertex};
pub use renderer::{DrawUniforms, Renderer};
pub use scene::{CUBE_POSITIONS, FrameInput, Scene};
pub use shader::{DEFAULT_SHADER, ShaderProgram, frame_layout};
pub use texture::{Texture, load_image};
pub use uniform::{
    UniformBlock, UniformKind, UniformLayout, UniformLayoutBuilder, UniformRecorder, UniformSink,
    UniformSlot, UniformValue,
};

// Re-export glam math types for convenience
pub use glam::{Mat4, Vec2, Vec3, Vec4};
