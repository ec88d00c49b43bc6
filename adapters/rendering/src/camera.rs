//! Perspective camera and orbit-style manual controls.

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec2, Vec3};

use crate::RenderingError;

const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;
const ROTATE_RADIANS_PER_PIXEL: f32 = 0.005;
const ZOOM_FACTOR_PER_STEP: f32 = 0.9;
const PAN_UNITS_PER_PIXEL: f32 = 0.0015;

/// Perspective projection parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerspectiveCamera {
    fov_y: f32,
    aspect: f32,
    near: f32,
    far: f32,
}

impl PerspectiveCamera {
    /// Creates a projection from a vertical field of view in degrees.
    ///
    /// Returns an error when the field of view is not strictly between 0 and
    /// 180 degrees, or when the clip planes are not `0 < near < far`.
    pub fn new(
        fov_y_degrees: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Result<Self, RenderingError> {
        if !(fov_y_degrees > 0.0 && fov_y_degrees < 180.0) {
            return Err(RenderingError::InvalidFieldOfView {
                degrees: fov_y_degrees,
            });
        }
        if !(near > 0.0 && far > near) {
            return Err(RenderingError::InvalidClipPlanes { near, far });
        }
        if !(aspect > 0.0 && aspect.is_finite()) {
            return Err(RenderingError::InvalidAspect { aspect });
        }

        Ok(Self {
            fov_y: fov_y_degrees.to_radians(),
            aspect,
            near,
            far,
        })
    }

    /// Vertical field of view in radians.
    #[must_use]
    pub const fn fov_y(&self) -> f32 {
        self.fov_y
    }

    /// Width divided by height of the render target.
    #[must_use]
    pub const fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Distance to the near clip plane.
    #[must_use]
    pub const fn near(&self) -> f32 {
        self.near
    }

    /// Distance to the far clip plane.
    #[must_use]
    pub const fn far(&self) -> f32 {
        self.far
    }

    /// Updates the aspect ratio from a render target size in pixels.
    pub fn set_surface_size(&mut self, width: f32, height: f32) -> Result<(), RenderingError> {
        if !(width > 0.0 && height > 0.0) {
            return Err(RenderingError::DegenerateSurface { width, height });
        }
        self.aspect = width / height;
        Ok(())
    }

    /// OpenGL-style projection matrix.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y, self.aspect, self.near, self.far)
    }
}

/// Orbit controls rotating, zooming and panning around a target point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitControls {
    target: Vec3,
    yaw: f32,
    pitch: f32,
    distance: f32,
    min_distance: f32,
    max_distance: f32,
}

impl OrbitControls {
    /// Creates controls whose eye sits at `eye` looking at `target`.
    #[must_use]
    pub fn looking_at(eye: Vec3, target: Vec3, max_distance: f32) -> Self {
        let offset = eye - target;
        let distance = offset.length().max(f32::EPSILON);
        let horizontal = Vec2::new(offset.x, offset.z).length();
        Self {
            target,
            yaw: offset.x.atan2(offset.z),
            pitch: offset.y.atan2(horizontal).clamp(-PITCH_LIMIT, PITCH_LIMIT),
            distance,
            min_distance: 1.0,
            max_distance: max_distance.max(distance),
        }
    }

    /// Point the camera orbits around.
    #[must_use]
    pub const fn target(&self) -> Vec3 {
        self.target
    }

    /// Distance between the eye and the target.
    #[must_use]
    pub const fn distance(&self) -> f32 {
        self.distance
    }

    /// Elevation angle of the eye above the target in radians.
    #[must_use]
    pub const fn pitch(&self) -> f32 {
        self.pitch
    }

    /// World-space eye position.
    #[must_use]
    pub fn eye(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target
            + Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw) * self.distance
    }

    /// View matrix looking from the eye at the target.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    /// Rotates the eye around the target by a pointer drag measured in pixels.
    pub fn rotate(&mut self, drag: Vec2) {
        self.yaw -= drag.x * ROTATE_RADIANS_PER_PIXEL;
        self.pitch = (self.pitch + drag.y * ROTATE_RADIANS_PER_PIXEL)
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Moves the eye toward (positive steps) or away from the target.
    pub fn zoom(&mut self, steps: f32) {
        self.distance = (self.distance * ZOOM_FACTOR_PER_STEP.powf(steps))
            .clamp(self.min_distance, self.max_distance);
    }

    /// Slides the target within the view plane by a pointer drag in pixels.
    pub fn pan(&mut self, drag: Vec2) {
        let forward = (self.target - self.eye()).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);
        let scale = self.distance * PAN_UNITS_PER_PIXEL;
        self.target += (-right * drag.x + up * drag.y) * scale;
    }
}

/// Camera combining a perspective projection with orbit controls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraRig {
    /// Projection applied to the view.
    pub projection: PerspectiveCamera,
    /// Orbit state placing the eye.
    pub orbit: OrbitControls,
}

impl CameraRig {
    /// Vertical field of view in degrees used by the game.
    pub const FOV_Y_DEGREES: f32 = 70.0;
    /// Aspect ratio assumed until the first surface size is known.
    pub const DEFAULT_ASPECT: f32 = 2.0;
    /// Near clip plane distance.
    pub const NEAR: f32 = 0.1;
    /// Far clip plane distance.
    pub const FAR: f32 = 1_000.0;
    /// Initial eye position.
    pub const EYE: Vec3 = Vec3::new(0.0, 60.0, 250.0);

    /// Camera looking at the origin from [`CameraRig::EYE`].
    pub fn standard() -> Result<Self, RenderingError> {
        let projection =
            PerspectiveCamera::new(Self::FOV_Y_DEGREES, Self::DEFAULT_ASPECT, Self::NEAR, Self::FAR)?;
        Ok(Self {
            projection,
            orbit: OrbitControls::looking_at(Self::EYE, Vec3::ZERO, Self::FAR * 0.9),
        })
    }

    /// Combined projection and view matrix.
    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.projection.projection_matrix() * self.orbit.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_rig_reproduces_initial_eye() {
        let rig = CameraRig::standard().expect("standard rig is valid");
        let eye = rig.orbit.eye();
        assert!((eye - CameraRig::EYE).length() < 1e-3, "eye drifted: {eye:?}");
        assert_eq!(rig.orbit.target(), Vec3::ZERO);
    }

    #[test]
    fn rejects_invalid_projection_parameters() {
        assert!(matches!(
            PerspectiveCamera::new(0.0, 1.0, 0.1, 10.0),
            Err(RenderingError::InvalidFieldOfView { .. })
        ));
        assert!(matches!(
            PerspectiveCamera::new(70.0, 1.0, 10.0, 1.0),
            Err(RenderingError::InvalidClipPlanes { .. })
        ));
        assert!(matches!(
            PerspectiveCamera::new(70.0, 0.0, 0.1, 10.0),
            Err(RenderingError::InvalidAspect { .. })
        ));
    }

    #[test]
    fn surface_resize_updates_aspect() {
        let mut camera = PerspectiveCamera::new(70.0, 2.0, 0.1, 100.0).expect("valid camera");
        camera.set_surface_size(800.0, 600.0).expect("valid surface");
        assert!((camera.aspect() - 800.0 / 600.0).abs() < f32::EPSILON);

        assert!(matches!(
            camera.set_surface_size(800.0, 0.0),
            Err(RenderingError::DegenerateSurface { .. })
        ));
        assert!((camera.aspect() - 800.0 / 600.0).abs() < f32::EPSILON);
    }

    #[test]
    fn rotation_keeps_pitch_clamped() {
        let mut orbit = OrbitControls::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, 100.0);
        orbit.rotate(Vec2::new(0.0, 10_000.0));
        assert!(orbit.pitch() <= PITCH_LIMIT);
        orbit.rotate(Vec2::new(0.0, -20_000.0));
        assert!(orbit.pitch() >= -PITCH_LIMIT);
        assert!((orbit.eye().length() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn zoom_keeps_distance_within_bounds() {
        let mut orbit = OrbitControls::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, 50.0);
        orbit.zoom(200.0);
        assert!((orbit.distance() - 1.0).abs() < f32::EPSILON);
        orbit.zoom(-200.0);
        assert!((orbit.distance() - 50.0).abs() < f32::EPSILON);
    }

    #[test]
    fn pan_moves_target_without_changing_distance() {
        let mut orbit = OrbitControls::looking_at(Vec3::new(0.0, 0.0, 100.0), Vec3::ZERO, 500.0);
        orbit.pan(Vec2::new(100.0, 0.0));
        assert!(orbit.target().x < 0.0, "dragging right slides the scene right");
        assert!((orbit.distance() - 100.0).abs() < f32::EPSILON);
    }
}
