//! The controller's view of the camera it drives.

use bevy_math::{DMat3, DQuat, DVec3, Vec3};
use bevy_render::camera::Projection;
use bevy_transform::components::Transform;

/// The projection kinds the controller knows how to pan and dolly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraProjection {
    /// A perspective camera. Dolly moves the camera toward or away from the target.
    Perspective {
        /// Vertical field of view in radians.
        fov: f64,
    },
    /// An orthographic camera. Dolly changes `zoom`.
    Orthographic {
        /// Magnification factor; the visible area is the frustum divided by this.
        zoom: f64,
        /// Left edge of the unzoomed frustum.
        left: f64,
        /// Right edge of the unzoomed frustum.
        right: f64,
        /// Top edge of the unzoomed frustum.
        top: f64,
        /// Bottom edge of the unzoomed frustum.
        bottom: f64,
    },
}

impl CameraProjection {
    /// The orthographic zoom factor, if this is an orthographic projection.
    pub fn zoom(&self) -> Option<f64> {
        match self {
            CameraProjection::Perspective { .. } => None,
            CameraProjection::Orthographic { zoom, .. } => Some(*zoom),
        }
    }

    /// Build from a bevy [`Projection`]. Custom projections have no counterpart.
    pub fn from_projection(projection: &Projection) -> Option<Self> {
        match projection {
            Projection::Perspective(perspective) => Some(CameraProjection::Perspective {
                fov: perspective.fov as f64,
            }),
            Projection::Orthographic(ortho) => {
                let scale = ortho.scale as f64;
                if scale == 0.0 || !scale.is_finite() {
                    return None;
                }
                // `area` already includes `scale`, the controller wants the unzoomed frustum.
                let area = ortho.area;
                Some(CameraProjection::Orthographic {
                    zoom: scale.recip(),
                    left: area.min.x as f64 / scale,
                    right: area.max.x as f64 / scale,
                    top: area.max.y as f64 / scale,
                    bottom: area.min.y as f64 / scale,
                })
            }
            Projection::Custom(_) => None,
        }
    }

    /// Copy the controller-owned parts of this projection back into a bevy [`Projection`].
    pub fn write_to(&self, projection: &mut Projection) {
        if let (CameraProjection::Orthographic { zoom, .. }, Projection::Orthographic(ortho)) =
            (self, projection)
        {
            if *zoom > 0.0 && zoom.is_finite() {
                ortho.scale = zoom.recip() as f32;
            }
        }
    }
}

/// The parts of a camera the controller reads and writes each tick.
///
/// The controller never owns the camera; it is handed a `&mut OrbitCamera` for the duration of
/// each call.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    /// World-space position.
    pub position: DVec3,
    /// World-space orientation. The camera looks down its local -Z.
    pub rotation: DQuat,
    /// The axis the camera orbits around.
    pub up: DVec3,
    /// `None` when the host camera uses a projection the controller can't reason about, in
    /// which case pan and dolly get disabled the first time they are used.
    pub projection: Option<CameraProjection>,
    /// Set when the controller changed the projection. The host should recompute its
    /// projection matrix and clear the flag.
    pub projection_changed: bool,
}

impl OrbitCamera {
    /// A Y-up camera at `position` with no rotation.
    pub fn new(position: DVec3, projection: CameraProjection) -> Self {
        Self {
            position,
            rotation: DQuat::IDENTITY,
            up: DVec3::Y,
            projection: Some(projection),
            projection_changed: false,
        }
    }

    /// A perspective camera with the given vertical field of view in radians.
    pub fn perspective(position: DVec3, fov: f64) -> Self {
        Self::new(position, CameraProjection::Perspective { fov })
    }

    /// An orthographic camera with a symmetric frustum of the given half extents.
    pub fn orthographic(position: DVec3, half_width: f64, half_height: f64, zoom: f64) -> Self {
        Self::new(
            position,
            CameraProjection::Orthographic {
                zoom,
                left: -half_width,
                right: half_width,
                top: half_height,
                bottom: -half_height,
            },
        )
    }

    /// Use a different orbit axis.
    pub fn with_up(mut self, up: DVec3) -> Self {
        self.up = up;
        self
    }

    /// Read the camera state out of bevy components.
    pub fn from_transform(transform: &Transform, projection: &Projection, up: Vec3) -> Self {
        Self {
            position: transform.translation.as_dvec3(),
            rotation: transform.rotation.as_dquat(),
            up: up.as_dvec3(),
            projection: CameraProjection::from_projection(projection),
            projection_changed: false,
        }
    }

    /// Write position, orientation, and any projection change back into bevy components.
    pub fn write_to(&mut self, transform: &mut Transform, projection: &mut Projection) {
        transform.translation = self.position.as_vec3();
        transform.rotation = self.rotation.as_quat().normalize();
        if self.projection_changed {
            if let Some(ours) = &self.projection {
                ours.write_to(projection);
            }
            self.projection_changed = false;
        }
    }

    /// The camera's local +X axis in world space.
    pub fn x_axis(&self) -> DVec3 {
        self.rotation * DVec3::X
    }

    /// The camera's local +Y axis in world space.
    pub fn y_axis(&self) -> DVec3 {
        self.rotation * DVec3::Y
    }

    /// The orthographic zoom factor, if any.
    pub fn zoom(&self) -> Option<f64> {
        self.projection.as_ref().and_then(CameraProjection::zoom)
    }

    /// Rotate so the camera's -Z points at `target`, keeping local +Y as close to `up` as
    /// possible. 64-bit version of [`Transform::look_at`].
    pub fn look_at(&mut self, target: DVec3) {
        let Some(back) = (self.position - target).try_normalize() else {
            return;
        };
        let up = self.up.try_normalize().unwrap_or(DVec3::Y);
        let right = up
            .cross(back)
            .try_normalize()
            .unwrap_or_else(|| back.any_orthonormal_vector());
        let up = back.cross(right);
        self.rotation = DQuat::from_mat3(&DMat3::from_cols(right, up, back)).normalize();
    }
}
