//! Damped orbit camera.
//!
//! Input moves the *goal* angles and distance; [`OrbitCamera::update`] eases
//! the visible camera toward them once per frame.

use glam::{Mat4, Vec3};

/// Vertical field of view in degrees.
pub const FOV_Y_DEGREES: f32 = 35.0;
pub const Z_NEAR: f32 = 0.01;
pub const Z_FAR: f32 = 600.0;

/// Fraction of the remaining distance to the goal covered each update.
pub const DAMPING: f32 = 0.05;

pub const MIN_DISTANCE: f32 = 5.0;
pub const MAX_DISTANCE: f32 = 50.0;

/// Keeps the camera above the ground plane and off the pole.
const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;
const MIN_PITCH: f32 = 0.0;

const ORBIT_SPEED: f32 = 0.005;
const ZOOM_SPEED: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Orbit {
    yaw: f32,
    pitch: f32,
    distance: f32,
}

impl Orbit {
    fn clamped(self) -> Self {
        Self {
            yaw: self.yaw,
            pitch: self.pitch.clamp(MIN_PITCH, MAX_PITCH),
            distance: self.distance.clamp(MIN_DISTANCE, MAX_DISTANCE),
        }
    }
}

/// Orbit camera around a fixed target.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    current: Orbit,
    goal: Orbit,
    pub target: Vec3,
    aspect: f32,
}

impl OrbitCamera {
    /// Camera at `position`, looking at the origin.
    pub fn new(position: Vec3, aspect: f32) -> Self {
        let mut camera = Self {
            current: Orbit { yaw: 0.0, pitch: 0.3, distance: 10.0 },
            goal: Orbit { yaw: 0.0, pitch: 0.3, distance: 10.0 },
            target: Vec3::ZERO,
            aspect,
        };
        camera.place_at(position);
        camera
    }

    /// Jump to `position` without easing.
    pub fn place_at(&mut self, position: Vec3) {
        let offset = position - self.target;
        let distance = offset.length().max(f32::EPSILON);
        let orbit = Orbit {
            yaw: offset.x.atan2(offset.z),
            pitch: (offset.y / distance).clamp(-1.0, 1.0).asin(),
            distance,
        }
        .clamped();
        self.current = orbit;
        self.goal = orbit;
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Drag by a pointer delta in pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.goal.yaw -= dx * ORBIT_SPEED;
        self.goal.pitch += dy * ORBIT_SPEED;
        self.goal = self.goal.clamped();
    }

    /// Positive `scroll` moves closer.
    pub fn zoom(&mut self, scroll: f32) {
        self.goal.distance -= scroll * ZOOM_SPEED;
        self.goal = self.goal.clamped();
    }

    /// Ease toward the goal. Call once per frame.
    pub fn update(&mut self) {
        let c = &mut self.current;
        let g = self.goal;
        c.yaw += (g.yaw - c.yaw) * DAMPING;
        c.pitch += (g.pitch - c.pitch) * DAMPING;
        c.distance += (g.distance - c.distance) * DAMPING;
    }

    pub fn position(&self) -> Vec3 {
        let Orbit { yaw, pitch, distance } = self.current;
        let x = distance * pitch.cos() * yaw.sin();
        let y = distance * pitch.sin();
        let z = distance * pitch.cos() * yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    #[inline]
    pub fn distance(&self) -> f32 {
        self.current.distance
    }

    #[inline]
    pub fn pitch(&self) -> f32 {
        self.current.pitch
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), self.aspect, Z_NEAR, Z_FAR)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
