//! Frame state: the camera, the lights, and the cube placements.
//!
//! A [`Scene`] is owned by the application and advanced once per frame by
//! [`Scene::update`] with the commands in a [`FrameInput`]. Rendering reads
//! it back through [`Scene::apply`] and [`Scene::model_matrices`].

use glam::{Mat4, Quat, Vec2, Vec3};

use crate::camera::{Camera, CameraMovement};
use crate::light::{DirectionalLight, FlashLight, LightColor, PointLight};
use crate::light_manager::{LightManager, MAX_POINT_LIGHTS};
use crate::uniform::UniformSink;

/// Where the ten demo cubes sit, before scaling.
pub const CUBE_POSITIONS: [Vec3; 10] = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(2.0, 5.0, -15.0),
    Vec3::new(-1.5, -2.2, -2.5),
    Vec3::new(-3.8, -2.0, -12.3),
    Vec3::new(2.4, -0.4, -3.5),
    Vec3::new(-1.7, 3.0, -7.5),
    Vec3::new(1.3, -2.0, -2.5),
    Vec3::new(1.5, 2.0, -2.5),
    Vec3::new(1.5, 0.2, -1.5),
    Vec3::new(-1.3, 1.0, -1.5),
];

/// Uniform scale applied to the whole cube field.
pub const CUBE_SCALE: f32 = 0.3;

/// Cubes spin around this axis (normalized before use).
const SPIN_AXIS: Vec3 = Vec3::new(1.0, 0.3, 0.5);

/// Angular speed of orbiting point lights, radians per second.
pub const ORBIT_SPEED: f32 = 0.5;

/// Starting positions and tints for demo point lights.
const POINT_SEEDS: [(Vec3, Vec3); MAX_POINT_LIGHTS] = [
    (Vec3::new(0.7, 0.2, 2.0), Vec3::new(1.0, 0.6, 0.6)),
    (Vec3::new(2.3, -3.3, -4.0), Vec3::new(0.6, 1.0, 0.6)),
    (Vec3::new(-4.0, 2.0, -12.0), Vec3::new(0.6, 0.6, 1.0)),
    (Vec3::new(0.0, 0.0, -3.0), Vec3::new(1.0, 1.0, 0.8)),
];

/// What the player asked for this frame, independent of the windowing system.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Movement keys currently held.
    pub movement: Vec<CameraMovement>,
    /// Mouse look offset; positive y looks up.
    pub look: Vec2,
    /// Scroll offset; positive zooms in.
    pub zoom: f32,
    pub toggle_directional: bool,
    pub toggle_points: bool,
    pub toggle_flash: bool,
}

#[derive(Clone, Debug)]
pub struct Scene {
    pub camera: Camera,
    pub lights: LightManager,
    /// Cube positions, drawn in order.
    pub cubes: Vec<Vec3>,
    /// Specular exponent for every surface.
    pub shininess: f32,
    /// Whether point lights circle the Y axis.
    pub animate_lights: bool,
    /// Time of the last orbit step; `None` until lights start moving.
    orbit_clock: Option<f32>,
}

impl Scene {
    /// A scene with the demo cubes and the given camera and lights.
    pub fn new(camera: Camera, lights: LightManager) -> Self {
        Self {
            camera,
            lights,
            cubes: CUBE_POSITIONS.to_vec(),
            shininess: 32.0,
            animate_lights: true,
            orbit_clock: None,
        }
    }

    /// The demo: camera at (0, 0, 3), a dim directional light, `point_lights`
    /// tinted point lights, and a flashlight held by the camera.
    ///
    /// The bundled shader holds [`MAX_POINT_LIGHTS`]; larger counts are capped.
    pub fn demo(point_lights: usize) -> Self {
        if point_lights > MAX_POINT_LIGHTS {
            log::warn!(
                "{point_lights} point lights requested, the shader holds {MAX_POINT_LIGHTS}"
            );
        }
        let camera = Camera::new(Vec3::new(0.0, 0.0, 3.0));

        let mut lights = LightManager::new();
        lights.set_directional(DirectionalLight::new(
            Vec3::new(-0.2, -1.0, -0.3),
            LightColor::new(Vec3::splat(0.05), Vec3::splat(0.4), Vec3::splat(0.5)),
        ));
        for (position, tint) in POINT_SEEDS.iter().take(point_lights) {
            let mut light = PointLight::at(*position);
            light.set_ambient(*tint * 0.05);
            light.set_diffuse(*tint * 0.8);
            light.set_specular(*tint);
            lights.add_point(light);
        }
        let mut flash = FlashLight::aimed(camera.position, camera.front());
        flash.set_ambient(Vec3::ZERO);
        lights.set_flash(flash);

        Self::new(camera, lights)
    }

    /// Advance one frame.
    ///
    /// Applies movement, look and zoom to the camera, handles light toggles,
    /// turns point lights about the Y axis by the time elapsed since the last
    /// call, and puts the
    /// flashlight at the camera.
    pub fn update(&mut self, input: &FrameInput, dt: f32, time: f32) {
        for movement in &input.movement {
            self.camera.move_in(*movement, dt);
        }
        if input.look != Vec2::ZERO {
            self.camera.rotate(input.look.x, input.look.y, true);
        }
        if input.zoom != 0.0 {
            self.camera.zoom_by(input.zoom);
        }

        if input.toggle_directional {
            let enabled = self.lights.directional_enabled();
            self.lights.set_directional_enabled(!enabled);
            log::info!("directional light {}", on_off(!enabled));
        }
        if input.toggle_points {
            // Any light on turns them all off; otherwise all on.
            let any_on = (0..self.lights.point_count())
                .any(|i| self.lights.point_enabled(i).unwrap_or(false));
            self.lights.set_all_points_enabled(!any_on);
            log::info!("point lights {}", on_off(!any_on));
        }
        if input.toggle_flash {
            let enabled = self.lights.flash_enabled();
            self.lights.set_flash_enabled(!enabled);
            log::info!("flashlight {}", on_off(!enabled));
        }

        if self.animate_lights {
            self.move_point_lights(time);
        } else {
            self.orbit_clock = None;
        }

        let flash = self.lights.flash_mut();
        flash.set_position(self.camera.position);
        flash.set_direction(self.camera.front());
    }

    /// Turn every point light about the Y axis by the angle covered since the
    /// previous step. Radius and height come from each light's own position.
    fn move_point_lights(&mut self, time: f32) {
        let last = self.orbit_clock.replace(time);
        let Some(last) = last else {
            return;
        };
        let turn = Quat::from_rotation_y(-ORBIT_SPEED * (time - last));
        for index in 0..self.lights.point_count() {
            if let Ok(light) = self.lights.point_mut(index) {
                light.set_position(turn * light.position());
            }
        }
    }

    /// Model matrix for every cube at `time` seconds.
    ///
    /// Cube `i` (counting from 1) spins at `20·i` degrees per second, after
    /// the whole field is scaled by [`CUBE_SCALE`].
    pub fn model_matrices(&self, time: f32) -> Vec<Mat4> {
        let axis = SPIN_AXIS.normalize();
        self.cubes
            .iter()
            .enumerate()
            .map(|(i, position)| {
                let angle = (20.0 * (i + 1) as f32).to_radians() * time;
                Mat4::from_scale(Vec3::splat(CUBE_SCALE))
                    * Mat4::from_translation(*position)
                    * Mat4::from_axis_angle(axis, angle)
            })
            .collect()
    }

    /// Write the camera matrices, `viewPos`, `shininess` and every light into `sink`.
    pub fn apply<S: UniformSink + ?Sized>(&self, sink: &mut S, aspect: f32, near: f32, far: f32) {
        sink.set_mat4("view", self.camera.view_matrix());
        sink.set_mat4("proj", self.camera.projection_matrix(aspect, near, far));
        sink.set_vec3("viewPos", self.camera.position);
        sink.set_float("shininess", self.shininess);
        self.lights.apply_all(sink);
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uniform::{UniformRecorder, UniformValue};

    const EPS: f32 = 1e-5;

    #[test]
    fn demo_builds_the_requested_lights() {
        let scene = Scene::demo(3);
        assert_eq!(scene.lights.point_count(), 3);
        assert!(scene.lights.directional_enabled());
        assert!(scene.lights.flash_enabled());
        assert_eq!(scene.cubes.len(), 10);
    }

    #[test]
    fn demo_caps_point_lights_at_what_the_shader_holds() {
        let scene = Scene::demo(6);
        assert_eq!(scene.lights.point_count(), MAX_POINT_LIGHTS);

        let mut block = crate::uniform::UniformBlock::new(crate::shader::frame_layout());
        scene.apply(&mut block, 1.0, 0.1, 100.0);
        let last = MAX_POINT_LIGHTS - 1;
        assert!(block.read(&format!("pointLights[{last}].position")).is_some());
    }

    #[test]
    fn update_moves_and_turns_the_camera() {
        let mut scene = Scene::demo(0);
        let input = FrameInput {
            movement: vec![CameraMovement::Forward],
            look: Vec2::new(100.0, 0.0),
            ..Default::default()
        };
        scene.update(&input, 1.0, 0.0);

        assert!(scene.camera.position.abs_diff_eq(Vec3::new(0.0, 0.0, 0.5), EPS));
        assert_eq!(scene.camera.yaw(), -80.0);
    }

    #[test]
    fn toggles_flip_light_flags() {
        let mut scene = Scene::demo(2);
        let input = FrameInput {
            toggle_directional: true,
            toggle_points: true,
            toggle_flash: true,
            ..Default::default()
        };

        scene.update(&input, 0.0, 0.0);
        assert!(!scene.lights.directional_enabled());
        assert!(!scene.lights.point_enabled(0).unwrap());
        assert!(!scene.lights.point_enabled(1).unwrap());
        assert!(!scene.lights.flash_enabled());

        scene.update(&input, 0.0, 0.0);
        assert!(scene.lights.directional_enabled());
        assert!(scene.lights.point_enabled(1).unwrap());
        assert!(scene.lights.flash_enabled());
    }

    #[test]
    fn point_lights_orbit_at_constant_radius_and_height() {
        let mut scene = Scene::demo(2);
        let start = scene.lights.point(1).unwrap().position();

        scene.update(&FrameInput::default(), 0.0, 0.0);
        let at_zero = scene.lights.point(1).unwrap().position();
        assert!(at_zero.abs_diff_eq(start, 1e-4));

        scene.update(&FrameInput::default(), 0.0, 3.0);
        let later = scene.lights.point(1).unwrap().position();
        assert!(!later.abs_diff_eq(start, 1e-2));
        assert!((later.y - start.y).abs() < EPS);
        let radius = |p: Vec3| Vec2::new(p.x, p.z).length();
        assert!((radius(later) - radius(start)).abs() < 1e-4);
    }

    #[test]
    fn orbit_quarter_turn_keeps_radius_and_height() {
        let mut lights = LightManager::new();
        lights.add_point(PointLight::at(Vec3::new(2.0, 1.0, 0.0)));
        let mut scene = Scene::new(Camera::default(), lights);

        scene.update(&FrameInput::default(), 0.0, 0.0);
        // Half a radian per second: pi seconds is a quarter turn.
        scene.update(&FrameInput::default(), 0.0, std::f32::consts::PI);
        let position = scene.lights.point(0).unwrap().position();
        assert!(position.abs_diff_eq(Vec3::new(0.0, 1.0, 2.0), 1e-4));
    }

    #[test]
    fn removing_a_light_leaves_the_others_on_their_own_orbits() {
        let mut scene = Scene::demo(3);
        scene.update(&FrameInput::default(), 0.0, 0.0);
        let second = scene.lights.point(1).unwrap().position();
        let third = scene.lights.point(2).unwrap().position();

        scene.lights.remove_point(0).unwrap();
        scene.update(&FrameInput::default(), 0.0, 0.0);
        assert!(scene.lights.point(0).unwrap().position().abs_diff_eq(second, 1e-5));
        assert!(scene.lights.point(1).unwrap().position().abs_diff_eq(third, 1e-5));

        scene.update(&FrameInput::default(), 0.0, 2.0);
        let moved = scene.lights.point(0).unwrap().position();
        let radius = |p: Vec3| Vec2::new(p.x, p.z).length();
        assert!((radius(moved) - radius(second)).abs() < 1e-4);
        assert!((moved.y - second.y).abs() < EPS);
    }

    #[test]
    fn lights_added_later_orbit_from_where_they_are() {
        let mut scene = Scene::demo(1);
        scene.update(&FrameInput::default(), 0.0, 1.0);
        let index = scene.lights.add_point(PointLight::at(Vec3::new(0.0, -1.0, -3.0)));

        scene.update(&FrameInput::default(), 0.0, 1.0);
        let position = scene.lights.point(index).unwrap().position();
        assert!(position.abs_diff_eq(Vec3::new(0.0, -1.0, -3.0), EPS));
    }

    #[test]
    fn flashlight_follows_the_camera() {
        let mut scene = Scene::demo(0);
        let input = FrameInput {
            movement: vec![CameraMovement::Left],
            look: Vec2::new(0.0, 50.0),
            ..Default::default()
        };
        scene.update(&input, 0.5, 0.0);

        assert_eq!(scene.lights.flash().position(), scene.camera.position);
        assert_eq!(scene.lights.flash().direction(), scene.camera.front());
    }

    #[test]
    fn first_cube_spins_twenty_degrees_per_second() {
        let scene = Scene::demo(0);
        let models = scene.model_matrices(1.0);
        assert_eq!(models.len(), 10);

        let expected = Mat4::from_scale(Vec3::splat(CUBE_SCALE))
            * Mat4::from_axis_angle(SPIN_AXIS.normalize(), 20.0_f32.to_radians());
        assert!(models[0].abs_diff_eq(expected, EPS));

        // At t = 0 nothing has rotated yet; only scale and translation remain.
        let still = scene.model_matrices(0.0);
        let origin = still[1].transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(CUBE_POSITIONS[1] * CUBE_SCALE, EPS));
    }

    #[test]
    fn apply_writes_camera_and_lights() {
        let scene = Scene::demo(1);
        let mut sink = UniformRecorder::new();
        scene.apply(&mut sink, 1.0, 0.1, 100.0);

        let names: Vec<_> = sink.names().collect();
        assert_eq!(&names[..4], ["view", "proj", "viewPos", "shininess"]);
        assert_eq!(sink.get("view"), Some(UniformValue::Mat4(scene.camera.view_matrix())));
        assert_eq!(sink.get("shininess"), Some(UniformValue::Float(32.0)));
        // Directional 5, one point light 8, flashlight 11.
        assert_eq!(sink.len(), 4 + 5 + 8 + 11);
    }
}
