//! A first-person yaw/pitch camera.
//!
//! The camera stores Euler angles in degrees and derives an orthonormal
//! basis (`front`, `right`, `up`) from them every time they change. Yaw is
//! measured so that `-90°` looks down `-Z`, which is also the default.
//!
//! ```
//! use lightbox::{Camera, CameraMovement, Vec3};
//!
//! let mut camera = Camera::new(Vec3::new(0.0, 0.0, 3.0));
//! camera.move_in(CameraMovement::Forward, 0.5);
//! camera.rotate(40.0, -10.0, true);
//!
//! let view = camera.view_matrix();
//! let fov = camera.vertical_fov();
//! # let _ = (view, fov);
//! ```

use glam::{Mat4, Vec3};

/// Pitch limit in degrees; going past it would flip the view at the poles.
pub const PITCH_LIMIT: f32 = 89.0;

/// Smallest and largest zoom (vertical field of view) in degrees.
pub const ZOOM_RANGE: (f32, f32) = (1.0, 45.0);

/// Directions the camera can be moved in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

/// First-person camera driven by keyboard movement and mouse offsets.
#[derive(Clone, Debug)]
pub struct Camera {
    /// World-space position.
    pub position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    /// Movement speed in units per second.
    pub speed: f32,
    /// Degrees of rotation per pixel of mouse movement.
    pub sensitivity: f32,
    zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl Camera {
    /// Camera at `position` with +Y up, looking down -Z.
    pub fn new(position: Vec3) -> Self {
        Self::with_orientation(position, Vec3::Y, -90.0, 0.0)
    }

    /// Camera with an explicit world-up vector and initial angles (degrees).
    pub fn with_orientation(position: Vec3, world_up: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: world_up,
            right: Vec3::X,
            world_up,
            yaw,
            pitch,
            speed: 2.5,
            sensitivity: 0.1,
            zoom: ZOOM_RANGE.1,
        };
        camera.update_vectors();
        camera
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_sensitivity(mut self, sensitivity: f32) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    /// Move along `front` or `right` by `speed * dt`.
    pub fn move_in(&mut self, direction: CameraMovement, dt: f32) {
        let velocity = self.speed * dt;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    /// Turn by a mouse offset in pixels. Positive `dy` looks up.
    ///
    /// With `constrain_pitch` the pitch is kept within ±[`PITCH_LIMIT`].
    pub fn rotate(&mut self, dx: f32, dy: f32, constrain_pitch: bool) {
        self.yaw += dx * self.sensitivity;
        self.pitch += dy * self.sensitivity;

        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }

        self.update_vectors();
    }

    /// Scroll-wheel zoom: narrows the field of view for positive offsets.
    pub fn zoom_by(&mut self, offset: f32) {
        self.zoom = (self.zoom - offset).clamp(ZOOM_RANGE.0, ZOOM_RANGE.1);
    }

    /// Right-handed look-at matrix for the current state.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Right-handed perspective projection using [`vertical_fov`](Self::vertical_fov).
    ///
    /// Depth maps to `[0, 1]` as wgpu expects.
    pub fn projection_matrix(&self, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::perspective_rh(self.zoom.to_radians(), aspect, near, far)
    }

    /// Vertical field of view in degrees.
    pub fn vertical_fov(&self) -> f32 {
        self.zoom
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn world_up(&self) -> Vec3 {
        self.world_up
    }

    /// Yaw in degrees.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Pitch in degrees.
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        // Normalize because the cross product shrinks as pitch nears the poles.
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}
