use glam::{Mat4, Vec2, Vec3};

/// Perspective camera orbiting a target, with damped rotation and dolly.
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,

    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    pub rotate_speed: f32,
    pub zoom_speed: f32,
    /// Fraction of the pending motion applied per update.
    pub damping: f32,

    pending_yaw: f32,
    pending_pitch: f32,
    pending_dolly: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::looking_at(Vec3::new(6.0, 6.0, 6.0), Vec3::ZERO)
    }
}

impl OrbitCamera {
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let distance = offset.length().max(1e-3);
        let dir = offset / distance;

        Self {
            target,
            distance,
            yaw: dir.z.atan2(dir.x),
            pitch: dir.y.clamp(-1.0, 1.0).asin(),

            fov: 45.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,

            rotate_speed: 0.005,
            zoom_speed: 0.1,
            damping: 0.05,

            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_dolly: 0.0,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.target
            + Vec3::new(
                self.distance * self.yaw.cos() * self.pitch.cos(),
                self.distance * self.pitch.sin(),
                self.distance * self.yaw.sin() * self.pitch.cos(),
            )
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn process_drag(&mut self, delta: Vec2) {
        self.pending_yaw += delta.x * self.rotate_speed;
        self.pending_pitch += delta.y * self.rotate_speed;
    }

    /// Positive `delta` moves toward the target.
    pub fn process_scroll(&mut self, delta: f32) {
        self.pending_dolly += delta * self.zoom_speed;
    }

    /// Applies a damped share of the pending motion. Called once per frame.
    pub fn update(&mut self) {
        self.yaw += self.pending_yaw * self.damping;
        self.pitch += self.pending_pitch * self.damping;

        let max_pitch = 89.0_f32.to_radians();
        self.pitch = self.pitch.clamp(-max_pitch, max_pitch);

        let scale = (1.0 - self.pending_dolly * self.damping).clamp(0.5, 1.5);
        self.distance = (self.distance * scale).clamp(self.near * 10.0, self.far * 0.5);

        let decay = 1.0 - self.damping;
        self.pending_yaw *= decay;
        self.pending_pitch *= decay;
        self.pending_dolly *= decay;
    }

    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }
}

/// Orthographic camera looking down -z at the layer plane.
pub struct LayerCamera {
    pub ortho_size: f32,
    pub zoom: f32,
    pub zoom_min: f32,
    pub zoom_max: f32,
    pub position: Vec3,
    pub near: f32,
    pub far: f32,
}

impl LayerCamera {
    pub fn new(ortho_size: f32, zoom_min: f32, zoom_max: f32) -> Self {
        Self {
            ortho_size,
            zoom: 1.0,
            zoom_min,
            zoom_max,
            position: Vec3::new(0.0, 0.0, 10.0),
            near: 0.1,
            far: 100.0,
        }
    }

    /// `delta_y > 0` (scrolling down) widens the view, anything else
    /// narrows it. A non-finite delta is ignored.
    pub fn on_wheel(&mut self, delta_y: f32) {
        if !delta_y.is_finite() {
            return;
        }
        self.zoom *= if delta_y > 0.0 { 1.1 } else { 0.9 };
        self.zoom = self.zoom.max(self.zoom_min).min(self.zoom_max);
    }

    /// `(left, right, bottom, top)`, symmetric about the origin.
    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        let half = self.ortho_size * self.zoom;
        (-half, half, -half, half)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        let (left, right, bottom, top) = self.bounds();
        Mat4::orthographic_rh(left, right, bottom, top, self.near, self.far)
            * Mat4::look_at_rh(self.position, Vec3::ZERO, Vec3::Y)
    }
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub _padding: f32,
}

impl CameraUniform {
    pub fn from_orbit(camera: &OrbitCamera) -> Self {
        Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            camera_pos: camera.position().to_array(),
            _padding: 0.0,
        }
    }

    pub fn from_layer(camera: &LayerCamera) -> Self {
        Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            camera_pos: camera.position.to_array(),
            _padding: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orbit_starts_at_eye() {
        let camera = OrbitCamera::default();
        assert!((camera.position() - Vec3::new(6.0, 6.0, 6.0)).length() < 1e-4);
    }

    #[test]
    fn test_damping_settles_motion() {
        let mut camera = OrbitCamera::default();
        let start_yaw = camera.yaw;
        camera.process_drag(Vec2::new(100.0, 0.0));

        camera.update();
        let first_step = camera.yaw - start_yaw;
        assert!(first_step > 0.0);

        for _ in 0..500 {
            camera.update();
        }
        let settled = camera.yaw;
        camera.update();
        assert!((camera.yaw - settled).abs() < 1e-6);
        // total rotation converges to drag * rotate_speed
        assert!(((settled - start_yaw) - 100.0 * camera.rotate_speed).abs() < 1e-3);
    }

    #[test]
    fn test_pitch_never_flips() {
        let mut camera = OrbitCamera::default();
        for _ in 0..200 {
            camera.process_drag(Vec2::new(0.0, 10_000.0));
            camera.update();
        }
        assert!(camera.pitch <= 89.0_f32.to_radians() + 1e-6);
    }

    #[test]
    fn test_zoom_stays_clamped() {
        let mut camera = LayerCamera::new(2.0, 0.3, 3.0);
        for _ in 0..100 {
            camera.on_wheel(1.0);
            assert!(camera.zoom <= 3.0 && camera.zoom >= 0.3);
        }
        assert!((camera.zoom - 3.0).abs() < 1e-6);

        for _ in 0..100 {
            camera.on_wheel(-120.0);
            assert!(camera.zoom <= 3.0 && camera.zoom >= 0.3);
        }
        assert!((camera.zoom - 0.3).abs() < 1e-6);

        for i in 0..1000 {
            camera.on_wheel(if i % 3 == 0 { -1.0 } else { 4.0 });
            assert!(camera.zoom <= 3.0 && camera.zoom >= 0.3);
        }
    }

    #[test]
    fn test_layer_bounds_follow_zoom() {
        let mut camera = LayerCamera::new(2.0, 0.3, 3.0);
        assert_eq!(camera.bounds(), (-2.0, 2.0, -2.0, 2.0));

        camera.on_wheel(1.0);
        let (l, r, b, t) = camera.bounds();
        assert!((r - 2.2).abs() < 1e-5);
        assert_eq!(l, -r);
        assert_eq!(b, -t);
        assert_eq!(r, t);

        camera.on_wheel(f32::NAN);
        assert!((camera.zoom - 1.1).abs() < 1e-6);

        camera.on_wheel(0.0);
        assert!((camera.zoom - 0.99).abs() < 1e-6);
    }

    #[test]
    fn test_inverted_zoom_limits_do_not_panic() {
        let mut camera = LayerCamera::new(2.0, 3.0, 0.3);
        camera.on_wheel(1.0);
        assert!(camera.zoom.is_finite());
        camera.on_wheel(-1.0);
        assert!(camera.zoom.is_finite());
    }

    #[test]
    fn test_layer_projection_keeps_origin_centred() {
        let camera = LayerCamera::new(2.0, 0.3, 3.0);
        let clip = camera.view_projection_matrix().project_point3(Vec3::ZERO);
        assert!(clip.x.abs() < 1e-6 && clip.y.abs() < 1e-6);

        let edge = camera.view_projection_matrix().project_point3(Vec3::new(2.0, 2.0, 0.0));
        assert!((edge.x - 1.0).abs() < 1e-5 && (edge.y - 1.0).abs() < 1e-5);
    }
}
