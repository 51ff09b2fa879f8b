//! Plain-text description of a scene, for running without a window.

use glam::Vec3;

use crate::config::AppConfig;
use crate::error::Result;
use crate::light::Light;
use crate::scene::Scene;
use crate::texture::load_image;
use crate::uniform::{UniformRecorder, UniformValue};

fn vec3(v: Vec3) -> String {
    format!("({:.3}, {:.3}, {:.3})", v.x, v.y, v.z)
}

fn value(v: &UniformValue) -> String {
    match v {
        UniformValue::Bool(b) => b.to_string(),
        UniformValue::Int(i) => i.to_string(),
        UniformValue::Float(f) => format!("{f:.4}"),
        UniformValue::Vec2(v) => format!("({:.3}, {:.3})", v.x, v.y),
        UniformValue::Vec3(v) => vec3(*v),
        UniformValue::Vec4(v) => format!("({:.3}, {:.3}, {:.3}, {:.3})", v.x, v.y, v.z, v.w),
        UniformValue::Mat4(m) => format!("mat4 {:?}", m.to_cols_array()),
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

/// One line for `light`, ending with how many uniforms it writes.
fn light_line(label: &str, enabled: bool, light: Light) -> String {
    let detail = match light {
        Light::Directional(light) => format!("direction {}", vec3(light.direction())),
        Light::Point(light) => {
            let attenuation = light.attenuation();
            format!(
                "position {} attenuation {}/{}/{}",
                vec3(light.position()),
                attenuation.constant,
                attenuation.linear,
                attenuation.quadratic
            )
        }
        Light::Flash(light) => {
            let (cut_off, outer_cut_off) = light.cut_off();
            format!(
                "position {} direction {} cutoff {cut_off:.4}/{outer_cut_off:.4}",
                vec3(light.position()),
                vec3(light.direction())
            )
        }
    };

    let mut writes = UniformRecorder::new();
    light.apply(&mut writes, label);
    format!("{label}: {} {detail}, {} uniforms", on_off(enabled), writes.len())
}

/// Describe the demo scene `config` would show.
///
/// The texture, if any, is decoded so a bad path fails here the same way it
/// would when opening a window. The shader is not compiled.
pub fn describe(config: &AppConfig) -> Result<String> {
    let scene = Scene::demo(config.point_lights);
    let camera = &scene.camera;
    let mut lines = vec![format!(
        "scene: {} cubes, camera at {}, fov {:.1}",
        scene.cubes.len(),
        vec3(camera.position),
        camera.vertical_fov()
    )];

    lines.push(match &config.texture {
        Some(path) => {
            let image = load_image(path)?;
            format!(
                "texture: {} ({}x{})",
                path.display(),
                image.width(),
                image.height()
            )
        }
        None => "texture: none".to_string(),
    });

    let lights = &scene.lights;
    if let Some(directional) = lights.directional() {
        lines.push(light_line(
            "directional",
            lights.directional_enabled(),
            Light::from(*directional),
        ));
    }
    for (i, point) in lights.points().enumerate() {
        lines.push(light_line(
            &format!("point[{i}]"),
            lights.point_enabled(i)?,
            Light::from(*point),
        ));
    }
    lines.push(light_line("flash", lights.flash_enabled(), Light::from(*lights.flash())));

    let mut recorder = UniformRecorder::new();
    lights.apply_all(&mut recorder);
    lines.push(format!("uniforms: {} writes", recorder.len()));
    lines.extend(
        recorder
            .writes()
            .iter()
            .map(|(name, v)| format!("  {name} = {}", value(v))),
    );

    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}
