//! Owns every light in the scene and writes them to a shader in one call.
//!
//! The manager holds at most one directional light, an ordered list of point
//! lights, and exactly one flashlight. Each light carries its own enabled
//! flag in the same record, so the flags can never fall out of step with the
//! lights they switch.

use crate::error::{Error, Result};
use crate::light::{DirectionalLight, FlashLight, PointLight};
use crate::uniform::UniformSink;

/// Number of point lights the bundled shader declares.
///
/// The manager itself is unbounded; lights past this index are written but
/// land on names the shader does not have.
pub const MAX_POINT_LIGHTS: usize = 4;

/// A light together with its on/off switch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Switchable<L> {
    pub light: L,
    pub enabled: bool,
}

impl<L> Switchable<L> {
    pub fn on(light: L) -> Self {
        Self {
            light,
            enabled: true,
        }
    }

    pub fn off(light: L) -> Self {
        Self {
            light,
            enabled: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LightManager {
    directional: Option<Switchable<DirectionalLight>>,
    points: Vec<Switchable<PointLight>>,
    flash: Switchable<FlashLight>,
}

impl Default for LightManager {
    /// No directional light, no point lights, a default flashlight switched off.
    fn default() -> Self {
        Self {
            directional: None,
            points: Vec::new(),
            flash: Switchable::off(FlashLight::default()),
        }
    }
}

impl LightManager {
    pub fn new() -> Self {
        Self::default()
    }

    // Directional light

    /// Replace the directional light and switch it on.
    pub fn set_directional(&mut self, light: DirectionalLight) {
        self.directional = Some(Switchable::on(light));
    }

    pub fn directional(&self) -> Option<&DirectionalLight> {
        self.directional.as_ref().map(|d| &d.light)
    }

    pub fn directional_mut(&mut self) -> Option<&mut DirectionalLight> {
        self.directional.as_mut().map(|d| &mut d.light)
    }

    /// `false` when no directional light is set.
    pub fn directional_enabled(&self) -> bool {
        self.directional.is_some_and(|d| d.enabled)
    }

    /// No-op when no directional light is set.
    pub fn set_directional_enabled(&mut self, enabled: bool) {
        if let Some(directional) = &mut self.directional {
            directional.enabled = enabled;
        }
    }

    // Point lights

    /// Append a point light, switched on. Returns its index.
    pub fn add_point(&mut self, light: PointLight) -> usize {
        self.points.push(Switchable::on(light));
        self.points.len() - 1
    }

    pub fn clear_points(&mut self) {
        self.points.clear();
    }

    /// Replace the point light at `index`, keeping its enabled flag.
    pub fn update_point(&mut self, index: usize, light: PointLight) -> Result<()> {
        self.point_entry_mut(index)?.light = light;
        Ok(())
    }

    /// Remove and return the point light at `index`. Later lights shift down.
    pub fn remove_point(&mut self, index: usize) -> Result<PointLight> {
        self.check_point(index)?;
        Ok(self.points.remove(index).light)
    }

    pub fn point(&self, index: usize) -> Result<&PointLight> {
        self.check_point(index)?;
        Ok(&self.points[index].light)
    }

    pub fn point_mut(&mut self, index: usize) -> Result<&mut PointLight> {
        Ok(&mut self.point_entry_mut(index)?.light)
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Point lights in index order.
    pub fn points(&self) -> impl Iterator<Item = &PointLight> {
        self.points.iter().map(|p| &p.light)
    }

    pub fn point_enabled(&self, index: usize) -> Result<bool> {
        self.check_point(index)?;
        Ok(self.points[index].enabled)
    }

    pub fn set_point_enabled(&mut self, index: usize, enabled: bool) -> Result<()> {
        self.point_entry_mut(index)?.enabled = enabled;
        Ok(())
    }

    /// Switch every point light on or off.
    pub fn set_all_points_enabled(&mut self, enabled: bool) {
        for point in &mut self.points {
            point.enabled = enabled;
        }
    }

    fn check_point(&self, index: usize) -> Result<()> {
        let count = self.points.len();
        if index < count {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange { index, count })
        }
    }

    fn point_entry_mut(&mut self, index: usize) -> Result<&mut Switchable<PointLight>> {
        let count = self.points.len();
        self.points
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, count })
    }

    // Flashlight

    /// Replace the flashlight and switch it on.
    pub fn set_flash(&mut self, light: FlashLight) {
        self.flash = Switchable::on(light);
    }

    pub fn flash(&self) -> &FlashLight {
        &self.flash.light
    }

    pub fn flash_mut(&mut self) -> &mut FlashLight {
        &mut self.flash.light
    }

    pub fn flash_enabled(&self) -> bool {
        self.flash.enabled
    }

    pub fn set_flash_enabled(&mut self, enabled: bool) {
        self.flash.enabled = enabled;
    }

    /// Write every light and its enabled flag into `sink`.
    ///
    /// Order: `dirlight` and `useDirLight` (only when a directional light is
    /// set), then `pointLights[i]` and `usePointLight[i]` for each point light
    /// in index order, then `flashLight` and `useFlashLight`.
    pub fn apply_all<S: UniformSink + ?Sized>(&self, sink: &mut S) {
        if let Some(directional) = &self.directional {
            directional.light.apply(sink, "dirlight");
            sink.set_bool("useDirLight", directional.enabled);
        }

        for (i, point) in self.points.iter().enumerate() {
            point.light.apply(sink, &format!("pointLights[{i}]"));
            sink.set_bool(&format!("usePointLight[{i}]"), point.enabled);
        }

        self.flash.light.apply(sink, "flashLight");
        sink.set_bool("useFlashLight", self.flash.enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uniform::{UniformRecorder, UniformValue};
    use glam::Vec3;

    fn scene_lights() -> LightManager {
        let mut lights = LightManager::new();
        lights.set_directional(DirectionalLight::default());
        lights.add_point(PointLight::at(Vec3::new(0.7, 0.2, 2.0)));
        lights.add_point(PointLight::at(Vec3::new(2.3, -3.3, -4.0)));
        lights.set_flash(FlashLight::default());
        lights
    }

    #[test]
    fn apply_all_writes_every_light_in_order() {
        let mut sink = UniformRecorder::new();
        scene_lights().apply_all(&mut sink);

        let mut expected: Vec<String> = ["direction", "ambient", "diffuse", "specular"]
            .iter()
            .map(|f| format!("dirlight.{f}"))
            .collect();
        expected.push("useDirLight".into());
        for i in 0..2 {
            for field in [
                "position",
                "ambient",
                "diffuse",
                "specular",
                "constant",
                "linear",
                "quadratic",
            ] {
                expected.push(format!("pointLights[{i}].{field}"));
            }
            expected.push(format!("usePointLight[{i}]"));
        }
        for field in [
            "position",
            "ambient",
            "diffuse",
            "specular",
            "constant",
            "linear",
            "quadratic",
            "direction",
            "cutOff",
            "outerCutOff",
        ] {
            expected.push(format!("flashLight.{field}"));
        }
        expected.push("useFlashLight".into());

        assert_eq!(sink.len(), 32);
        assert_eq!(sink.names().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn apply_all_without_directional_skips_it() {
        let mut lights = LightManager::new();
        lights.add_point(PointLight::default());

        let mut sink = UniformRecorder::new();
        lights.apply_all(&mut sink);

        assert!(sink.names().all(|n| !n.starts_with("dirlight") && n != "useDirLight"));
        // One point light (7 + 1) and the flashlight (10 + 1).
        assert_eq!(sink.len(), 19);
        assert_eq!(sink.get("useFlashLight"), Some(UniformValue::Bool(false)));
    }

    #[test]
    fn apply_all_reports_flags() {
        let mut lights = scene_lights();
        lights.set_directional_enabled(false);
        lights.set_point_enabled(1, false).unwrap();

        let mut sink = UniformRecorder::new();
        lights.apply_all(&mut sink);

        assert_eq!(sink.get("useDirLight"), Some(UniformValue::Bool(false)));
        assert_eq!(sink.get("usePointLight[0]"), Some(UniformValue::Bool(true)));
        assert_eq!(sink.get("usePointLight[1]"), Some(UniformValue::Bool(false)));
        assert_eq!(sink.get("useFlashLight"), Some(UniformValue::Bool(true)));
    }

    #[test]
    fn update_point_out_of_range_leaves_lights_untouched() {
        let mut lights = scene_lights();
        let before = lights.clone();

        let err = lights
            .update_point(2, PointLight::at(Vec3::ONE))
            .unwrap_err();

        assert!(matches!(err, Error::IndexOutOfRange { index: 2, count: 2 }));
        assert_eq!(lights, before);
    }

    #[test]
    fn update_point_keeps_the_enabled_flag() {
        let mut lights = scene_lights();
        lights.set_point_enabled(0, false).unwrap();
        lights.update_point(0, PointLight::at(Vec3::Y)).unwrap();

        assert_eq!(lights.point(0).unwrap().position(), Vec3::Y);
        assert!(!lights.point_enabled(0).unwrap());
    }

    #[test]
    fn index_accessors_reject_out_of_range() {
        let mut lights = LightManager::new();
        assert!(lights.point(0).is_err());
        assert!(lights.point_mut(0).is_err());
        assert!(lights.point_enabled(0).is_err());
        assert!(lights.set_point_enabled(0, true).is_err());
        assert!(lights.remove_point(0).is_err());
    }

    #[test]
    fn remove_and_clear_keep_flags_with_their_lights() {
        let mut lights = LightManager::new();
        lights.add_point(PointLight::at(Vec3::X));
        lights.add_point(PointLight::at(Vec3::Y));
        lights.add_point(PointLight::at(Vec3::Z));
        lights.set_point_enabled(2, false).unwrap();

        let removed = lights.remove_point(0).unwrap();
        assert_eq!(removed.position(), Vec3::X);
        assert_eq!(lights.point_count(), 2);
        assert_eq!(lights.point(1).unwrap().position(), Vec3::Z);
        assert!(!lights.point_enabled(1).unwrap());

        lights.clear_points();
        assert_eq!(lights.point_count(), 0);
        let mut sink = UniformRecorder::new();
        lights.apply_all(&mut sink);
        assert!(
            sink.names()
                .all(|n| !n.starts_with("pointLights") && !n.starts_with("usePointLight"))
        );
    }

    #[test]
    fn point_mut_edits_in_place() {
        let mut lights = scene_lights();
        lights.point_mut(1).unwrap().set_attenuation(1.0, 0.0, 0.0);
        assert_eq!(lights.point(1).unwrap().attenuation_at(Vec3::splat(100.0)), 1.0);
    }

    #[test]
    fn flash_is_off_until_set() {
        let mut lights = LightManager::new();
        assert!(!lights.flash_enabled());
        lights.flash_mut().set_position(Vec3::ONE);
        assert!(!lights.flash_enabled());
        lights.set_flash(FlashLight::aimed(Vec3::ZERO, Vec3::NEG_Z));
        assert!(lights.flash_enabled());
        assert_eq!(lights.flash().direction(), Vec3::NEG_Z);
    }

    #[test]
    fn directional_flag_without_light_is_false() {
        let mut lights = LightManager::new();
        lights.set_directional_enabled(true);
        assert!(!lights.directional_enabled());
        assert!(lights.directional().is_none());
    }
}
