//! Converts device-agnostic gestures into pending camera motion.
//!
//! Every input device ends up here as a [`Gesture`]. The functions in this module turn screen
//! space deltas into a [`PendingDelta`], which the controller consumes on its next update.

use std::f64::consts::{PI, TAU};

use bevy_math::{DVec2, DVec3};

use super::{
    camera::{CameraProjection, OrbitCamera},
    limits::OrbitLimits,
};

/// The per-step wheel dolly factor before `zoom_speed` is applied.
const WHEEL_ZOOM_BASE: f64 = 0.95;

/// How far one wheel tick tilts the camera when the wheel is bound to rotation.
pub const WHEEL_TILT_STEP: f64 = PI / 180.0;

/// Motion accumulated since the last update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingDelta {
    /// Azimuthal rotation in radians.
    pub theta: f64,
    /// Polar rotation in radians.
    pub phi: f64,
    /// World-space translation of the target.
    pub pan: DVec3,
    /// Multiplier applied to the orbit radius.
    pub scale: f64,
}

impl Default for PendingDelta {
    fn default() -> Self {
        Self {
            theta: 0.0,
            phi: 0.0,
            pan: DVec3::ZERO,
            scale: 1.0,
        }
    }
}

impl PendingDelta {
    /// Discard all pending motion.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Is there any motion left to apply?
    pub fn is_idle(&self) -> bool {
        self.theta == 0.0 && self.phi == 0.0 && self.pan == DVec3::ZERO && self.scale == 1.0
    }

    /// Orbit around the up axis. Positive angles move the camera to the left.
    pub fn rotate_left(&mut self, angle: f64) {
        self.theta -= angle;
    }

    /// Tilt toward the top pole. Positive angles move the camera up.
    pub fn rotate_up(&mut self, angle: f64) {
        self.phi -= angle;
    }

    /// Move the target along the camera's local -X axis.
    pub fn pan_left(&mut self, distance: f64, camera: &OrbitCamera) {
        self.pan += camera.x_axis() * -distance;
    }

    /// Move the target up. In screen-space mode "up" is the camera's local Y axis, otherwise it
    /// is the direction on the ground plane perpendicular to the camera's X axis.
    pub fn pan_up(&mut self, distance: f64, camera: &OrbitCamera, screen_space: bool) {
        let direction = if screen_space {
            camera.y_axis()
        } else {
            camera.up.normalize_or(DVec3::Y).cross(camera.x_axis())
        };
        self.pan += direction * distance;
    }
}

/// A single unit of user intent, independent of the device that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Orbit by a screen-space drag in pixels.
    Rotate(DVec2),
    /// Pan by a screen-space drag in pixels, right and down positive.
    Pan(DVec2),
    /// Dolly by a vertical drag; positive is down the screen.
    DragDolly(f64),
    /// Dolly by the ratio between the new and old distance of two touch points.
    Pinch(f64),
    /// Dolly by one step of the mouse wheel. Negative is away from the user.
    WheelDolly(f64),
    /// Tilt the polar angle by a fixed step. Negative is away from the user.
    WheelTilt(f64),
    /// One tick of automatic rotation.
    AutoRotate,
}

/// Viewport extents used to normalize pixel deltas. Degenerate sizes are treated as one pixel.
fn viewport_size(viewport: DVec2) -> DVec2 {
    viewport.max(DVec2::ONE)
}

/// The angle a horizontal or vertical drag of `pixels` rotates by.
///
/// Normalized by the viewport height in both directions, so rotation speed doesn't depend on the
/// aspect ratio.
pub fn rotation_angle(pixels: f64, viewport: DVec2) -> f64 {
    TAU * pixels / viewport_size(viewport).y
}

/// The per-tick azimuth step of auto-rotation. At 60 ticks a second, a speed of `1.0` makes one
/// revolution per minute.
pub fn auto_rotation_angle(auto_rotate_speed: f64) -> f64 {
    TAU / 60.0 / 60.0 * auto_rotate_speed
}

/// The dolly factor of a single wheel step or drag step.
pub fn zoom_scale(zoom_speed: f64) -> f64 {
    WHEEL_ZOOM_BASE.powf(zoom_speed)
}

/// The dolly factor of a pinch, given the ratio of the new to the old finger distance.
pub fn pinch_scale(ratio: f64, zoom_speed: f64) -> f64 {
    ratio.powf(zoom_speed)
}

/// Accumulate a pan of `pixels` (right and down positive).
///
/// A perspective pan covers the same fraction of the visible scene regardless of distance by
/// scaling with the frustum height at the target. An orthographic pan scales with the frustum
/// size divided by the zoom.
pub fn pan(
    delta: &mut PendingDelta,
    camera: &OrbitCamera,
    projection: &CameraProjection,
    target: DVec3,
    viewport: DVec2,
    screen_space: bool,
    pixels: DVec2,
) {
    let viewport = viewport_size(viewport);
    match *projection {
        CameraProjection::Perspective { fov } => {
            // Half of the fov is center to top of screen.
            let target_distance = (camera.position - target).length() * (fov / 2.0).tan();
            // Only the height is used, so aspect ratio does not distort speed.
            delta.pan_left(2.0 * pixels.x * target_distance / viewport.y, camera);
            delta.pan_up(
                2.0 * pixels.y * target_distance / viewport.y,
                camera,
                screen_space,
            );
        }
        CameraProjection::Orthographic {
            zoom,
            left,
            right,
            top,
            bottom,
        } => {
            delta.pan_left(pixels.x * (right - left) / zoom / viewport.x, camera);
            delta.pan_up(
                pixels.y * (top - bottom) / zoom / viewport.y,
                camera,
                screen_space,
            );
        }
    }
}

/// Divide the orbit radius by `factor` (perspective), or multiply the zoom by it
/// (orthographic). With a factor above one this moves toward the target.
///
/// Returns `true` when an orthographic zoom was changed, in which case the projection needs to
/// be recomputed.
///
/// Factors that are not positive and finite, or that would push the radius scale or zoom to zero
/// or infinity, are ignored.
pub fn dolly_in(
    delta: &mut PendingDelta,
    projection: &mut CameraProjection,
    limits: &OrbitLimits,
    factor: f64,
) -> bool {
    scale_by(delta, projection, limits, factor.recip())
}

/// The inverse of [`dolly_in`]: multiplies the radius by `factor`, or divides the zoom by it.
pub fn dolly_out(
    delta: &mut PendingDelta,
    projection: &mut CameraProjection,
    limits: &OrbitLimits,
    factor: f64,
) -> bool {
    scale_by(delta, projection, limits, factor)
}

/// Multiply the radius scale by `radius_factor`, or divide the zoom by it.
fn scale_by(
    delta: &mut PendingDelta,
    projection: &mut CameraProjection,
    limits: &OrbitLimits,
    radius_factor: f64,
) -> bool {
    let usable = |value: f64| value > 0.0 && value.is_finite();
    if !usable(radius_factor) {
        return false;
    }
    match projection {
        CameraProjection::Perspective { .. } => {
            let scale = delta.scale * radius_factor;
            if usable(scale) {
                delta.scale = scale;
            }
            false
        }
        CameraProjection::Orthographic { zoom, .. } => {
            let zoomed = limits.clamp_zoom(*zoom / radius_factor);
            if !usable(zoomed) {
                return false;
            }
            *zoom = zoomed;
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facing_origin(position: DVec3) -> OrbitCamera {
        let mut camera = OrbitCamera::perspective(position, PI / 2.0);
        camera.look_at(DVec3::ZERO);
        camera
    }

    #[test]
    fn rotation_uses_height_only() {
        let narrow = rotation_angle(100.0, DVec2::new(200.0, 400.0));
        let wide = rotation_angle(100.0, DVec2::new(1600.0, 400.0));
        assert_eq!(narrow, wide);
        assert!((rotation_angle(100.0, DVec2::new(1.0, 400.0)) - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn auto_rotation_takes_an_hour_of_ticks_at_unit_speed() {
        assert!((auto_rotation_angle(1.0) * 3600.0 - TAU).abs() < 1e-12);
        assert!((auto_rotation_angle(2.0) * 1800.0 - TAU).abs() < 1e-12);
    }

    #[test]
    fn zoom_factors() {
        assert!((zoom_scale(1.0) - 0.95).abs() < 1e-15);
        assert!((zoom_scale(2.0) - 0.9025).abs() < 1e-15);
        assert!((pinch_scale(2.0, 1.0) - 2.0).abs() < 1e-15);
        assert!((pinch_scale(2.0, 0.5) - 2f64.sqrt()).abs() < 1e-15);
    }

    #[test]
    fn perspective_pan_scales_with_distance() {
        let viewport = DVec2::new(800.0, 600.0);
        let projection = CameraProjection::Perspective { fov: PI / 2.0 };

        let near = facing_origin(DVec3::new(0.0, 0.0, 10.0));
        let mut delta = PendingDelta::default();
        pan(&mut delta, &near, &projection, DVec3::ZERO, viewport, true, DVec2::new(300.0, 0.0));
        // tan(45°) = 1, so the full viewport height spans 2 * 10 world units.
        assert!(delta.pan.abs_diff_eq(DVec3::new(-10.0, 0.0, 0.0), 1e-9));

        let far = facing_origin(DVec3::new(0.0, 0.0, 20.0));
        let mut delta = PendingDelta::default();
        pan(&mut delta, &far, &projection, DVec3::ZERO, viewport, true, DVec2::new(300.0, 0.0));
        assert!(delta.pan.abs_diff_eq(DVec3::new(-20.0, 0.0, 0.0), 1e-9));
    }

    #[test]
    fn orthographic_pan_uses_frustum_and_zoom() {
        let camera = OrbitCamera::orthographic(DVec3::new(0.0, 0.0, 10.0), 4.0, 3.0, 2.0);
        let projection = camera.projection.unwrap();
        let mut delta = PendingDelta::default();
        pan(
            &mut delta,
            &camera,
            &projection,
            DVec3::ZERO,
            DVec2::new(800.0, 600.0),
            true,
            DVec2::new(400.0, 300.0),
        );
        // x: 400 * 8 / 2 / 800 = 2 to the left, y: 300 * 6 / 2 / 600 = 1.5 up.
        assert!(delta.pan.abs_diff_eq(DVec3::new(-2.0, 1.5, 0.0), 1e-12));
    }

    #[test]
    fn world_space_pan_stays_on_ground_plane() {
        let camera = facing_origin(DVec3::new(0.0, 10.0, 10.0));
        let mut screen = PendingDelta::default();
        screen.pan_up(1.0, &camera, true);
        let mut world = PendingDelta::default();
        world.pan_up(1.0, &camera, false);

        assert!(world.pan.y.abs() < 1e-12);
        assert!(world.pan.abs_diff_eq(DVec3::new(0.0, 0.0, -1.0), 1e-12));
        assert!(screen.pan.y > 0.5);
    }

    #[test]
    fn world_space_pan_ignores_up_length() {
        let unit = facing_origin(DVec3::new(0.0, 10.0, 10.0));
        let mut long = unit.clone().with_up(DVec3::new(0.0, 5.0, 0.0));
        long.look_at(DVec3::ZERO);

        let mut expected = PendingDelta::default();
        expected.pan_up(1.0, &unit, false);
        let mut scaled = PendingDelta::default();
        scaled.pan_up(1.0, &long, false);

        assert!(scaled.pan.abs_diff_eq(expected.pan, 1e-12));
        assert!((scaled.pan.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn perspective_dolly_accumulates_scale() {
        let mut projection = CameraProjection::Perspective { fov: 1.0 };
        let limits = OrbitLimits::default();
        let mut delta = PendingDelta::default();
        assert!(!dolly_out(&mut delta, &mut projection, &limits, 0.5));
        assert_eq!(delta.scale, 0.5);
        assert!(!dolly_in(&mut delta, &mut projection, &limits, 0.25));
        assert_eq!(delta.scale, 2.0);
    }

    #[test]
    fn orthographic_dolly_clamps_zoom() {
        let mut projection = CameraProjection::Orthographic {
            zoom: 1.0,
            left: -1.0,
            right: 1.0,
            top: 1.0,
            bottom: -1.0,
        };
        let limits = OrbitLimits {
            min_zoom: 0.5,
            max_zoom: 2.0,
            ..Default::default()
        };
        let mut delta = PendingDelta::default();
        for _ in 0..100 {
            assert!(dolly_out(&mut delta, &mut projection, &limits, 0.95));
            assert!(projection.zoom().unwrap() <= 2.0);
        }
        assert_eq!(projection.zoom(), Some(2.0));
        for _ in 0..100 {
            dolly_in(&mut delta, &mut projection, &limits, 0.95);
        }
        assert_eq!(projection.zoom(), Some(0.5));
        assert_eq!(delta.scale, 1.0);
    }

    #[test]
    fn degenerate_factors_are_ignored() {
        let limits = OrbitLimits::default();
        let mut perspective = CameraProjection::Perspective { fov: 1.0 };
        let mut delta = PendingDelta::default();
        for factor in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(!dolly_in(&mut delta, &mut perspective, &limits, factor));
            assert!(!dolly_out(&mut delta, &mut perspective, &limits, factor));
        }
        assert_eq!(delta.scale, 1.0);

        let mut ortho = CameraProjection::Orthographic {
            zoom: 1.0,
            left: -1.0,
            right: 1.0,
            top: 1.0,
            bottom: -1.0,
        };
        for factor in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e-320] {
            assert!(!dolly_in(&mut delta, &mut ortho, &limits, factor));
        }
        assert_eq!(ortho.zoom(), Some(1.0));
    }
}
