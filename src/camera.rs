//! Perspective camera, projection and orbit controls.
//!
//! The camera looks at a target point. [`OrbitController`] moves it on a sphere
//! around that target: left drag orbits, right drag pans, the wheel dollies.
//! Input only accumulates pending deltas; [`OrbitController::update`] applies a
//! damped share of them once per frame.

use std::f32::consts::{PI, TAU};

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector2, Vector3, perspective};
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const EPS: f32 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>, T: Into<Point3<f32>>>(position: P, target: T) -> Self {
        Self {
            position: position.into(),
            target: target.into(),
            up: Vector3::unit_y(),
        }
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, self.up)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Projection {
    aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    /// World to view space, the fog depth is measured in view space.
    view: [[f32; 4]; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view: Matrix4::identity().into(),
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        let view = camera.calc_matrix();
        self.view_position = camera.position.to_homogeneous().into();
        self.view = view.into();
        self.view_proj = (projection.calc_matrix() * view).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controller: OrbitController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

/// Radius, polar angle from +Y and azimuth around +Y starting at +Z.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Spherical {
    radius: f32,
    phi: f32,
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: Vector3<f32>) -> Self {
        let radius = offset.magnitude();
        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            theta: offset.x.atan2(offset.z),
        }
    }

    fn to_offset(self) -> Vector3<f32> {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        Vector3::new(
            self.radius * sin_phi * sin_theta,
            self.radius * cos_phi,
            self.radius * sin_phi * cos_theta,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Drag {
    None,
    Rotate,
    Pan,
}

#[derive(Debug)]
pub struct OrbitController {
    /// Share of the pending motion applied per update.
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    viewport_height: f32,
    drag: Drag,
    cursor: Option<PhysicalPosition<f64>>,
    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
    pending_pan: Vector2<f32>,
    pan_offset: Vector3<f32>,
}

impl OrbitController {
    pub fn new(viewport_height: u32) -> Self {
        Self {
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            viewport_height: viewport_height.max(1) as f32,
            drag: Drag::None,
            cursor: None,
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
            pending_pan: Vector2::new(0.0, 0.0),
            pan_offset: Vector3::new(0.0, 0.0, 0.0),
        }
    }

    pub fn resize(&mut self, viewport_height: u32) {
        self.viewport_height = viewport_height.max(1) as f32;
    }

    /// Orbit by a cursor motion of `dx`/`dy` pixels. A full viewport height
    /// is one full turn.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.theta_delta -= TAU * dx / self.viewport_height * self.rotate_speed;
        self.phi_delta -= TAU * dy / self.viewport_height * self.rotate_speed;
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.pending_pan += Vector2::new(dx, dy) * self.pan_speed;
    }

    /// Positive steps move towards the target.
    pub fn dolly(&mut self, steps: f32) {
        self.scale *= 0.95f32.powf(self.zoom_speed * steps);
    }

    /// Pointer input only; viewport changes arrive through [`Self::resize`].
    pub fn handle_window_events(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                self.drag = match (state, button) {
                    (ElementState::Pressed, MouseButton::Left) => Drag::Rotate,
                    (ElementState::Pressed, MouseButton::Right) => Drag::Pan,
                    (ElementState::Released, _) => Drag::None,
                    _ => self.drag,
                };
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                let last = self.cursor.replace(*position);
                let Some(last) = last else {
                    return false;
                };
                let dx = (position.x - last.x) as f32;
                let dy = (position.y - last.y) as f32;
                match self.drag {
                    Drag::Rotate => self.rotate(dx, dy),
                    Drag::Pan => self.pan(dx, dy),
                    Drag::None => return false,
                }
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => {
                        (*y as f32).signum()
                    }
                };
                self.dolly(steps);
                true
            }
            _ => false,
        }
    }

    /// Apply the damped share of all pending input to `camera`.
    pub fn update(&mut self, camera: &mut Camera, fovy: Rad<f32>) {
        let offset = camera.position - camera.target;

        if self.pending_pan != Vector2::new(0.0, 0.0) {
            let forward = (-offset).normalize();
            let right = forward.cross(camera.up).normalize();
            let up = right.cross(forward);
            // pixels at the target distance
            let distance = offset.magnitude() * (fovy.0 / 2.0).tan();
            let per_pixel = 2.0 * distance / self.viewport_height;
            self.pan_offset += right * (-self.pending_pan.x * per_pixel)
                + up * (self.pending_pan.y * per_pixel);
            self.pending_pan = Vector2::new(0.0, 0.0);
        }

        let mut spherical = Spherical::from_offset(offset);
        spherical.theta += self.theta_delta * self.damping_factor;
        spherical.phi = (spherical.phi + self.phi_delta * self.damping_factor).clamp(EPS, PI - EPS);
        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        camera.target += self.pan_offset * self.damping_factor;
        camera.position = camera.target + spherical.to_offset();

        let keep = 1.0 - self.damping_factor;
        self.theta_delta *= keep;
        self.phi_delta *= keep;
        self.pan_offset *= keep;
        self.scale = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Deg, MetricSpace};

    use super::*;

    fn camera() -> Camera {
        Camera::new((0.0, 2.0, 10.0), (0.0, 0.0, 0.0))
    }

    #[test]
    fn spherical_round_trip_keeps_the_offset() {
        let offset = Vector3::new(3.0, 2.0, -4.0);
        let back = Spherical::from_offset(offset).to_offset();
        assert!((back - offset).magnitude() < 1e-5);
    }

    #[test]
    fn idle_update_does_not_move_the_camera() {
        let mut camera = camera();
        let before = camera;
        let mut controller = OrbitController::new(600);
        controller.update(&mut camera, Deg(65.0).into());
        assert!(camera.position.distance(before.position) < 1e-5);
        assert_eq!(camera.target, before.target);
    }

    #[test]
    fn damping_spreads_rotation_over_frames() {
        let mut controller = OrbitController::new(600);
        controller.rotate(60.0, 0.0);
        let pending = controller.theta_delta;
        let mut camera = camera();
        controller.update(&mut camera, Deg(65.0).into());
        assert!((controller.theta_delta - pending * 0.95).abs() < 1e-6);
        // distance to the target is untouched by orbiting
        assert!((camera.position.distance(camera.target) - 104f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn polar_angle_never_flips_over_the_pole() {
        let mut controller = OrbitController::new(100);
        controller.damping_factor = 1.0;
        controller.rotate(0.0, 10_000.0);
        let mut camera = camera();
        controller.update(&mut camera, Deg(65.0).into());
        let offset = camera.position - camera.target;
        assert!(offset.x.abs() < 1e-3 && offset.z.abs() < 1e-3);
        assert!(offset.y > 0.0);
    }

    #[test]
    fn dolly_respects_distance_limits() {
        let mut controller = OrbitController::new(600);
        controller.min_distance = 9.0;
        controller.dolly(50.0);
        let mut camera = camera();
        controller.update(&mut camera, Deg(65.0).into());
        assert!((camera.position.distance(camera.target) - 9.0).abs() < 1e-4);
    }

    #[test]
    fn pan_moves_target_and_camera_together() {
        let mut controller = OrbitController::new(600);
        controller.damping_factor = 1.0;
        controller.pan(-30.0, 0.0);
        let mut camera = camera();
        let offset = camera.position - camera.target;
        controller.update(&mut camera, Deg(65.0).into());
        assert!(camera.target.x > 0.0);
        assert!(((camera.position - camera.target) - offset).magnitude() < 1e-4);
    }

    #[test]
    fn resize_events_are_left_to_the_engine() {
        let mut controller = OrbitController::new(600);
        let event = WindowEvent::Resized(winit::dpi::PhysicalSize::new(800, 300));
        assert!(!controller.handle_window_events(&event));
        assert_eq!(controller.viewport_height, 600.0);
        controller.resize(300);
        assert_eq!(controller.viewport_height, 300.0);
        controller.resize(0);
        assert_eq!(controller.viewport_height, 1.0);
    }

    #[test]
    fn projection_tracks_aspect_ratio() {
        let mut projection = Projection::new(800, 600, Deg(65.0), 0.1, 300.0);
        projection.resize(1000, 500);
        assert_eq!(projection.aspect(), 2.0);
        projection.resize(10, 0);
        assert!(projection.aspect().is_finite());
    }
}
