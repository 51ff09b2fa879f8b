//! Phong light sources.
//!
//! Three light types exist and no more are expected, because the shader's
//! uniform layout is fixed:
//!
//! - [`DirectionalLight`]: parallel rays from a direction, no falloff.
//! - [`PointLight`]: a position with inverse-distance [`Attenuation`].
//! - [`FlashLight`]: a point light that also has a direction and a soft cone
//!   between two cutoff cosines.
//!
//! Each one writes itself into a [`UniformSink`] under a name prefix, e.g.
//! `pointLights[0].position`. [`Light`] wraps the three in a closed enum for
//! code that needs to treat them uniformly.

use glam::Vec3;

use crate::uniform::UniformSink;

/// Ambient, diffuse and specular colours shared by every light type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightColor {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl Default for LightColor {
    fn default() -> Self {
        Self::uniform(Vec3::ONE)
    }
}

impl LightColor {
    pub fn new(ambient: Vec3, diffuse: Vec3, specular: Vec3) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
        }
    }

    /// The same colour for all three components.
    pub fn uniform(color: Vec3) -> Self {
        Self::new(color, color, color)
    }

    fn apply<S: UniformSink + ?Sized>(&self, sink: &mut S, prefix: &str) {
        sink.set_vec3(&format!("{prefix}.ambient"), self.ambient);
        sink.set_vec3(&format!("{prefix}.diffuse"), self.diffuse);
        sink.set_vec3(&format!("{prefix}.specular"), self.specular);
    }
}

/// Colour getters and setters, identical for every light type.
macro_rules! color_accessors {
    ($ty:ty, $($path:ident).+) => {
        impl $ty {
            pub fn color(&self) -> LightColor {
                self.$($path).+
            }

            pub fn ambient(&self) -> Vec3 {
                self.$($path).+.ambient
            }

            pub fn diffuse(&self) -> Vec3 {
                self.$($path).+.diffuse
            }

            pub fn specular(&self) -> Vec3 {
                self.$($path).+.specular
            }

            pub fn set_ambient(&mut self, ambient: Vec3) {
                self.$($path).+.ambient = ambient;
            }

            pub fn set_diffuse(&mut self, diffuse: Vec3) {
                self.$($path).+.diffuse = diffuse;
            }

            pub fn set_specular(&mut self, specular: Vec3) {
                self.$($path).+.specular = specular;
            }

            /// Set ambient, diffuse and specular to the same colour.
            pub fn set_color(&mut self, color: Vec3) {
                self.$($path).+ = LightColor::uniform(color);
            }
        }
    };
}

/// A light infinitely far away; every ray shares `direction`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    direction: Vec3,
    color: LightColor,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::new(Vec3::new(-0.2, -1.0, -0.3), LightColor::default())
    }
}

impl DirectionalLight {
    pub fn new(direction: Vec3, color: LightColor) -> Self {
        Self { direction, color }
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Vec3) {
        self.direction = direction;
    }

    /// Writes `direction`, `ambient`, `diffuse`, `specular` under `prefix`.
    pub fn apply<S: UniformSink + ?Sized>(&self, sink: &mut S, prefix: &str) {
        sink.set_vec3(&format!("{prefix}.direction"), self.direction);
        self.color.apply(sink, prefix);
    }
}

color_accessors!(DirectionalLight, color);

/// Inverse-distance falloff coefficients.
///
/// `factor(d) = 1 / (constant + linear·d + quadratic·d²)`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for Attenuation {
    /// Covers roughly 50 units.
    fn default() -> Self {
        Self::new(1.0, 0.09, 0.032)
    }
}

impl Attenuation {
    pub fn new(constant: f32, linear: f32, quadratic: f32) -> Self {
        Self {
            constant,
            linear,
            quadratic,
        }
    }

    /// Light intensity multiplier at `distance`.
    pub fn factor(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }
}

/// A light radiating in all directions from a position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    position: Vec3,
    attenuation: Attenuation,
    color: LightColor,
}

impl Default for PointLight {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Attenuation::default(), LightColor::default())
    }
}

impl PointLight {
    pub fn new(position: Vec3, attenuation: Attenuation, color: LightColor) -> Self {
        Self {
            position,
            attenuation,
            color,
        }
    }

    /// Default colour and attenuation at `position`.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn attenuation(&self) -> Attenuation {
        self.attenuation
    }

    pub fn set_attenuation(&mut self, constant: f32, linear: f32, quadratic: f32) {
        self.attenuation = Attenuation::new(constant, linear, quadratic);
    }

    /// Intensity multiplier for a surface at `point`.
    pub fn attenuation_at(&self, point: Vec3) -> f32 {
        self.attenuation.factor(self.position.distance(point))
    }

    /// Writes `position`, the colours, then `constant`, `linear`, `quadratic`.
    pub fn apply<S: UniformSink + ?Sized>(&self, sink: &mut S, prefix: &str) {
        sink.set_vec3(&format!("{prefix}.position"), self.position);
        self.color.apply(sink, prefix);
        sink.set_float(&format!("{prefix}.constant"), self.attenuation.constant);
        sink.set_float(&format!("{prefix}.linear"), self.attenuation.linear);
        sink.set_float(&format!("{prefix}.quadratic"), self.attenuation.quadratic);
    }
}

color_accessors!(PointLight, color);

/// A spotlight: a [`PointLight`] restricted to a cone.
///
/// Fragments inside the `cut_off` cosine are fully lit; between `cut_off`
/// and `outer_cut_off` the intensity fades to zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlashLight {
    point: PointLight,
    direction: Vec3,
    cut_off: f32,
    outer_cut_off: f32,
}

impl Default for FlashLight {
    fn default() -> Self {
        Self {
            point: PointLight::default(),
            direction: Vec3::new(2.0, -2.0, -5.0),
            cut_off: 12.5_f32.to_radians().cos(),
            outer_cut_off: 15.0_f32.to_radians().cos(),
        }
    }
}

impl FlashLight {
    pub fn new(point: PointLight, direction: Vec3, cut_off: f32, outer_cut_off: f32) -> Self {
        Self {
            point,
            direction,
            cut_off,
            outer_cut_off,
        }
    }

    /// Default cone, colour and attenuation at `position` pointing along `direction`.
    pub fn aimed(position: Vec3, direction: Vec3) -> Self {
        Self {
            point: PointLight::at(position),
            direction,
            ..Self::default()
        }
    }

    pub fn position(&self) -> Vec3 {
        self.point.position()
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.point.set_position(position);
    }

    pub fn attenuation(&self) -> Attenuation {
        self.point.attenuation()
    }

    pub fn set_attenuation(&mut self, constant: f32, linear: f32, quadratic: f32) {
        self.point.set_attenuation(constant, linear, quadratic);
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Vec3) {
        self.direction = direction;
    }

    /// Inner and outer cutoff cosines.
    pub fn cut_off(&self) -> (f32, f32) {
        (self.cut_off, self.outer_cut_off)
    }

    /// Set the inner and outer cutoff cosines. `outer_cut_off` should not exceed `cut_off`.
    pub fn set_cut_off(&mut self, cut_off: f32, outer_cut_off: f32) {
        self.cut_off = cut_off;
        self.outer_cut_off = outer_cut_off;
    }

    /// The point-light part of this flashlight.
    pub fn as_point(&self) -> &PointLight {
        &self.point
    }

    /// Writes every point-light field, then `direction`, `cutOff`, `outerCutOff`.
    pub fn apply<S: UniformSink + ?Sized>(&self, sink: &mut S, prefix: &str) {
        self.point.apply(sink, prefix);
        sink.set_vec3(&format!("{prefix}.direction"), self.direction);
        sink.set_float(&format!("{prefix}.cutOff"), self.cut_off);
        sink.set_float(&format!("{prefix}.outerCutOff"), self.outer_cut_off);
    }
}

color_accessors!(FlashLight, point.color);

/// Any of the three light types.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    Directional(DirectionalLight),
    Point(PointLight),
    Flash(FlashLight),
}

impl Light {
    /// Write this light's uniforms under `prefix`.
    pub fn apply<S: UniformSink + ?Sized>(&self, sink: &mut S, prefix: &str) {
        match self {
            Light::Directional(light) => light.apply(sink, prefix),
            Light::Point(light) => light.apply(sink, prefix),
            Light::Flash(light) => light.apply(sink, prefix),
        }
    }

    pub fn color(&self) -> LightColor {
        match self {
            Light::Directional(light) => light.color(),
            Light::Point(light) => light.color(),
            Light::Flash(light) => light.color(),
        }
    }

    /// Number of uniforms [`apply`](Self::apply) writes.
    pub fn uniform_count(&self) -> usize {
        match self {
            Light::Directional(_) => 4,
            Light::Point(_) => 7,
            Light::Flash(_) => 10,
        }
    }
}

impl From<DirectionalLight> for Light {
    fn from(light: DirectionalLight) -> Self {
        Light::Directional(light)
    }
}

impl From<PointLight> for Light {
    fn from(light: PointLight) -> Self {
        Light::Point(light)
    }
}

impl From<FlashLight> for Light {
    fn from(light: FlashLight) -> Self {
        Light::Flash(light)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uniform::{UniformRecorder, UniformValue};

    #[test]
    fn point_light_fields_round_trip_exactly() {
        let color = LightColor::new(
            Vec3::new(0.05, 0.1, 0.15),
            Vec3::new(0.8, 0.7, 0.6),
            Vec3::new(1.0, 0.9, 0.3),
        );
        let position = Vec3::new(0.7, 0.2, 2.0);
        // Deliberately not normalized in any sense.
        let attenuation = Attenuation::new(1.000_000_1, 0.09, 0.032);
        let light = PointLight::new(position, attenuation, color);

        assert_eq!(light.position().to_array().map(f32::to_bits), position.to_array().map(f32::to_bits));
        assert_eq!(light.attenuation().constant.to_bits(), 1.000_000_1_f32.to_bits());
        assert_eq!(light.attenuation().linear.to_bits(), 0.09_f32.to_bits());
        assert_eq!(light.attenuation().quadratic.to_bits(), 0.032_f32.to_bits());
        assert_eq!(light.ambient(), color.ambient);
        assert_eq!(light.diffuse(), color.diffuse);
        assert_eq!(light.specular(), color.specular);
    }

    #[test]
    fn attenuation_is_one_over_constant_at_zero_and_fades_to_zero() {
        let attenuation = Attenuation::new(2.0, 0.09, 0.032);
        assert_eq!(attenuation.factor(0.0), 0.5);

        let mut previous = attenuation.factor(0.0);
        for distance in [1.0, 10.0, 100.0, 1_000.0, 100_000.0] {
            let factor = attenuation.factor(distance);
            assert!(factor < previous);
            previous = factor;
        }
        assert!(previous < 1e-8);
    }

    #[test]
    fn attenuation_at_uses_distance_from_the_light() {
        let light = PointLight::at(Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(light.attenuation_at(Vec3::new(3.0, 0.0, 0.0)), 1.0);
        let expected = Attenuation::default().factor(5.0);
        assert_eq!(light.attenuation_at(Vec3::new(3.0, 5.0, 0.0)), expected);
    }

    #[test]
    fn set_color_overwrites_all_components() {
        let mut light = DirectionalLight::default();
        light.set_ambient(Vec3::splat(0.1));
        light.set_color(Vec3::new(0.2, 0.4, 0.6));
        assert_eq!(light.color(), LightColor::uniform(Vec3::new(0.2, 0.4, 0.6)));
    }

    #[test]
    fn directional_light_writes_four_uniforms() {
        let mut sink = UniformRecorder::new();
        DirectionalLight::default().apply(&mut sink, "dirlight");
        assert_eq!(
            sink.names().collect::<Vec<_>>(),
            ["dirlight.direction", "dirlight.ambient", "dirlight.diffuse", "dirlight.specular"]
        );
        assert_eq!(
            sink.get("dirlight.direction"),
            Some(UniformValue::Vec3(Vec3::new(-0.2, -1.0, -0.3)))
        );
    }

    #[test]
    fn flash_light_extends_point_light_uniforms() {
        let mut light = FlashLight::aimed(Vec3::new(1.0, 2.0, 3.0), Vec3::NEG_Z);
        light.set_cut_off(0.9, 0.8);
        light.set_attenuation(1.0, 0.5, 0.25);

        let mut sink = UniformRecorder::new();
        light.apply(&mut sink, "flashLight");

        assert_eq!(
            sink.names().collect::<Vec<_>>(),
            [
                "flashLight.position",
                "flashLight.ambient",
                "flashLight.diffuse",
                "flashLight.specular",
                "flashLight.constant",
                "flashLight.linear",
                "flashLight.quadratic",
                "flashLight.direction",
                "flashLight.cutOff",
                "flashLight.outerCutOff",
            ]
        );
        assert_eq!(sink.get("flashLight.linear"), Some(UniformValue::Float(0.5)));
        assert_eq!(sink.get("flashLight.outerCutOff"), Some(UniformValue::Float(0.8)));
    }

    #[test]
    fn default_flash_cone_is_between_twelve_and_fifteen_degrees() {
        let (inner, outer) = FlashLight::default().cut_off();
        assert!((inner - 12.5_f32.to_radians().cos()).abs() < 1e-6);
        assert!((outer - 15.0_f32.to_radians().cos()).abs() < 1e-6);
        assert!(outer < inner);
    }

    #[test]
    fn light_enum_dispatches_to_each_variant() {
        let lights: [Light; 3] = [
            DirectionalLight::default().into(),
            PointLight::default().into(),
            FlashLight::default().into(),
        ];
        for light in lights {
            let mut sink = UniformRecorder::new();
            light.apply(&mut sink, "l");
            assert_eq!(sink.len(), light.uniform_count());
            assert!(sink.names().all(|name| name.starts_with("l.")));
        }
    }
}
