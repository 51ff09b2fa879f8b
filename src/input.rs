use std::collections::HashSet;

use glam::Vec2;
use winit::event::{DeviceEvent, ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::camera::CameraMovement;
use crate::scene::FrameInput;

/// Keys held for continuous camera movement.
const MOVEMENT_KEYS: [(KeyCode, CameraMovement); 4] = [
    (KeyCode::KeyW, CameraMovement::Forward),
    (KeyCode::KeyS, CameraMovement::Backward),
    (KeyCode::KeyA, CameraMovement::Left),
    (KeyCode::KeyD, CameraMovement::Right),
];

pub const TOGGLE_DIRECTIONAL: KeyCode = KeyCode::Digit1;
pub const TOGGLE_POINTS: KeyCode = KeyCode::Digit2;
pub const TOGGLE_FLASH: KeyCode = KeyCode::Digit3;

/// Tracks keyboard and mouse state between frames.
#[derive(Debug, Default)]
pub struct Input {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,
    mouse_buttons_down: HashSet<MouseButton>,
    mouse_buttons_pressed: HashSet<MouseButton>,
    mouse_motion: Vec2,
    scroll_delta: Vec2,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset per-frame state. Call after the frame has consumed it.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.mouse_buttons_pressed.clear();
        self.mouse_motion = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
    }

    /// Process a window event.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.key_changed(key, event.state);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => {
                    if self.mouse_buttons_down.insert(*button) {
                        self.mouse_buttons_pressed.insert(*button);
                    }
                }
                ElementState::Released => {
                    self.mouse_buttons_down.remove(button);
                }
            },
            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll_delta += match delta {
                    MouseScrollDelta::LineDelta(x, y) => Vec2::new(*x, *y),
                    MouseScrollDelta::PixelDelta(pos) => {
                        Vec2::new(pos.x as f32, pos.y as f32) / 120.0
                    }
                };
            }
            WindowEvent::Focused(false) => {
                // Key releases are not delivered to an unfocused window.
                self.keys_down.clear();
                self.mouse_buttons_down.clear();
            }
            _ => {}
        }
    }

    /// Process a raw device event. Mouse look uses unaccelerated motion so it
    /// keeps working while the cursor is locked.
    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.mouse_motion += Vec2::new(*dx as f32, *dy as f32);
        }
    }

    fn key_changed(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if self.keys_down.insert(key) {
                    self.keys_pressed.insert(key);
                }
            }
            ElementState::Released => {
                self.keys_down.remove(&key);
                self.keys_released.insert(key);
            }
        }
    }

    /// True while the key is held.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// True only on the frame the key went down (auto-repeat ignored).
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    pub fn mouse_pressed(&self, button: MouseButton) -> bool {
        self.mouse_buttons_pressed.contains(&button)
    }

    /// Raw mouse motion this frame, in device units (y grows downward).
    pub fn mouse_motion(&self) -> Vec2 {
        self.mouse_motion
    }

    /// Scroll wheel delta this frame, in lines.
    pub fn scroll_delta(&self) -> Vec2 {
        self.scroll_delta
    }

    /// Translate this frame's raw state into scene commands.
    ///
    /// Mouse look is only reported while `looking` (the cursor is captured).
    pub fn frame_input(&self, looking: bool) -> FrameInput {
        let movement = MOVEMENT_KEYS
            .iter()
            .filter(|(key, _)| self.key_down(*key))
            .map(|(_, movement)| *movement)
            .collect();
        // Screen y grows downward; camera pitch grows upward.
        let look = if looking {
            Vec2::new(self.mouse_motion.x, -self.mouse_motion.y)
        } else {
            Vec2::ZERO
        };
        FrameInput {
            movement,
            look,
            zoom: self.scroll_delta.y,
            toggle_directional: self.key_pressed(TOGGLE_DIRECTIONAL),
            toggle_points: self.key_pressed(TOGGLE_POINTS),
            toggle_flash: self.key_pressed(TOGGLE_FLASH),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_keys_become_movement() {
        let mut input = Input::new();
        input.key_changed(KeyCode::KeyW, ElementState::Pressed);
        input.key_changed(KeyCode::KeyD, ElementState::Pressed);

        let frame = input.frame_input(true);
        assert_eq!(frame.movement, [CameraMovement::Forward, CameraMovement::Right]);

        input.begin_frame();
        input.key_changed(KeyCode::KeyW, ElementState::Released);
        assert_eq!(input.frame_input(true).movement, [CameraMovement::Right]);
    }

    #[test]
    fn toggles_fire_once_per_press() {
        let mut input = Input::new();
        input.key_changed(TOGGLE_FLASH, ElementState::Pressed);
        assert!(input.frame_input(false).toggle_flash);

        input.begin_frame();
        // Auto-repeat sends another press while the key is still down.
        input.key_changed(TOGGLE_FLASH, ElementState::Pressed);
        assert!(!input.frame_input(false).toggle_flash);
        assert!(input.key_down(TOGGLE_FLASH));
    }

    #[test]
    fn mouse_look_needs_capture_and_flips_y() {
        let mut input = Input::new();
        input.handle_device_event(&DeviceEvent::MouseMotion { delta: (4.0, 3.0) });
        input.handle_device_event(&DeviceEvent::MouseMotion { delta: (1.0, -1.0) });

        assert_eq!(input.mouse_motion(), Vec2::new(5.0, 2.0));
        assert_eq!(input.frame_input(true).look, Vec2::new(5.0, -2.0));
        assert_eq!(input.frame_input(false).look, Vec2::ZERO);

        input.begin_frame();
        assert_eq!(input.mouse_motion(), Vec2::ZERO);
    }
}
