//! Application settings and the command line that fills them in.

use std::path::PathBuf;

use clap::Parser;
use clap::builder::RangedU64ValueParser;

use crate::light_manager::MAX_POINT_LIGHTS;

/// Window, asset and scene settings for [`run`](crate::run).
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// WGSL file to use instead of the bundled Phong shader.
    pub shader: Option<PathBuf>,
    /// Image mapped onto every cube face; plain white when `None`.
    pub texture: Option<PathBuf>,
    /// RGBA clear colour.
    pub clear_color: [f64; 4],
    /// Near and far clip planes.
    pub clip: (f32, f32),
    /// Number of point lights in the demo scene, capped at [`MAX_POINT_LIGHTS`].
    pub point_lights: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "lightbox".to_string(),
            width: 800,
            height: 800,
            shader: None,
            texture: None,
            clear_color: [1.0, 1.0, 1.0, 1.0],
            clip: (0.1, 100.0),
            point_lights: 2,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn shader(mut self, path: impl Into<PathBuf>) -> Self {
        self.shader = Some(path.into());
        self
    }

    pub fn texture(mut self, path: impl Into<PathBuf>) -> Self {
        self.texture = Some(path.into());
        self
    }

    pub fn clear_color(mut self, r: f64, g: f64, b: f64, a: f64) -> Self {
        self.clear_color = [r, g, b, a];
        self
    }

    pub fn clip(mut self, near: f32, far: f32) -> Self {
        self.clip = (near, far);
        self
    }

    pub fn point_lights(mut self, count: usize) -> Self {
        self.point_lights = count;
        self
    }
}

/// Phong-lit cube demo.
///
/// WASD moves, the mouse looks around once the window is clicked, the scroll
/// wheel zooms, 1/2/3 toggle the directional, point and flash lights, and
/// Escape releases the cursor.
#[derive(Debug, Parser)]
#[command(name = "lightbox", version)]
pub struct Cli {
    /// Image to map onto the cubes.
    #[arg(long, value_name = "PATH")]
    pub texture: Option<PathBuf>,

    /// WGSL shader to use instead of the bundled one.
    #[arg(long, value_name = "PATH")]
    pub shader: Option<PathBuf>,

    /// Window width in logical pixels.
    #[arg(long, default_value_t = 800, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: u32,

    /// Window height in logical pixels.
    #[arg(long, default_value_t = 800, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: u32,

    /// Number of point lights in the scene (at most 4).
    #[arg(
        long,
        default_value_t = 2,
        value_parser = RangedU64ValueParser::<usize>::new().range(0..=MAX_POINT_LIGHTS as u64)
    )]
    pub point_lights: usize,

    /// Print the scene's lights and uniforms, then exit without opening a window.
    #[arg(long)]
    pub summary_only: bool,
}

impl Cli {
    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::new()
            .size(self.width, self.height)
            .point_lights(self.point_lights);
        config.texture = self.texture.clone();
        config.shader = self.shader.clone();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_demo_window() {
        let config = AppConfig::default();
        assert_eq!((config.width, config.height), (800, 800));
        assert_eq!(config.clip, (0.1, 100.0));
        assert!(config.shader.is_none() && config.texture.is_none());
    }

    #[test]
    fn builder_sets_every_field() {
        let config = AppConfig::new()
            .title("t")
            .size(640, 480)
            .shader("a.wgsl")
            .texture("b.png")
            .clear_color(0.0, 0.1, 0.2, 1.0)
            .clip(0.5, 50.0)
            .point_lights(4);
        assert_eq!(config.title, "t");
        assert_eq!((config.width, config.height), (640, 480));
        assert_eq!(config.shader, Some(PathBuf::from("a.wgsl")));
        assert_eq!(config.texture, Some(PathBuf::from("b.png")));
        assert_eq!(config.clear_color, [0.0, 0.1, 0.2, 1.0]);
        assert_eq!(config.clip, (0.5, 50.0));
        assert_eq!(config.point_lights, 4);
    }

    #[test]
    fn cli_maps_onto_config() {
        let cli = Cli::try_parse_from([
            "lightbox",
            "--texture",
            "cat.png",
            "--width",
            "1024",
            "--point-lights",
            "3",
            "--summary-only",
        ])
        .unwrap();
        assert!(cli.summary_only);

        let config = cli.config();
        assert_eq!(config.texture, Some(PathBuf::from("cat.png")));
        assert_eq!((config.width, config.height), (1024, 800));
        assert_eq!(config.point_lights, 3);
        assert!(config.shader.is_none());
    }

    #[test]
    fn cli_rejects_more_point_lights_than_the_shader_holds() {
        let cli = Cli::try_parse_from(["lightbox", "--point-lights", "4"]).unwrap();
        assert_eq!(cli.config().point_lights, MAX_POINT_LIGHTS);

        let err = Cli::try_parse_from(["lightbox", "--point-lights", "5"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn cli_rejects_zero_sized_windows() {
        assert!(Cli::try_parse_from(["lightbox", "--width", "0"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
