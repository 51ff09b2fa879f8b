//! Error type shared by the whole crate.
//!
//! Only [`Error::IndexOutOfRange`] can happen on the per-frame lighting path;
//! every other variant comes from window, GPU, or asset setup.

use std::path::PathBuf;

/// Errors produced by lightbox.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A point light index was outside `0..count`.
    #[error("point light index {index} is out of range (count is {count})")]
    IndexOutOfRange { index: usize, count: usize },

    /// An image file could not be opened or decoded.
    #[error("failed to load texture '{}'", path.display())]
    Texture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A shader source file could not be read.
    #[error("failed to read shader '{}'", path.display())]
    ShaderRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// wgpu rejected a shader module or pipeline built from it.
    #[error("shader '{label}' failed to compile")]
    ShaderCompile { label: String },

    #[error("failed to create a rendering surface")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter was found")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create the GPU device")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("event loop error")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window")]
    Window(#[from] winit::error::OsError),
}

/// Convenience alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
