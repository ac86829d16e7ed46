//! Spherical coordinates of the camera relative to its orbit target.

use std::f64::consts::PI;

use bevy_math::{DQuat, DVec3};

/// How far the polar angle is kept away from the poles. At exactly `0` or `PI` the azimuth is
/// undefined and the camera's look-at basis degenerates.
pub const POLE_EPSILON: f64 = 1e-6;

/// A camera offset expressed as a distance and two angles in a Y-up frame.
///
/// `phi` is the polar angle measured from +Y, `theta` is the azimuth measured from +Z around +Y.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spherical {
    /// Distance from the origin.
    pub radius: f64,
    /// Polar angle in radians, `[0, PI]`.
    pub phi: f64,
    /// Azimuthal angle in radians, unbounded.
    pub theta: f64,
}

impl Spherical {
    /// Construct from components.
    pub fn new(radius: f64, phi: f64, theta: f64) -> Self {
        Self { radius, phi, theta }
    }

    /// Convert a Y-up offset into spherical form. A zero offset has both angles set to zero.
    pub fn from_offset(offset: DVec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self::new(0.0, 0.0, 0.0);
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    /// Convert back into a Y-up cartesian offset.
    pub fn to_offset(&self) -> DVec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        DVec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }

    /// Keep the polar angle strictly inside the poles.
    pub fn make_safe(&mut self) {
        self.phi = self.phi.max(POLE_EPSILON).min(PI - POLE_EPSILON);
    }
}

/// The fixed rotation between the camera's own up axis and the canonical Y-up frame used by
/// [`Spherical`].
///
/// Computed once when a controller is attached, so orbiting follows whichever world axis the
/// camera treats as "up".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpFrame {
    to_y_up: DQuat,
    from_y_up: DQuat,
}

impl Default for UpFrame {
    fn default() -> Self {
        Self {
            to_y_up: DQuat::IDENTITY,
            from_y_up: DQuat::IDENTITY,
        }
    }
}

impl UpFrame {
    /// Build the frame for the given up vector. Zero or non-finite vectors fall back to +Y.
    pub fn new(up: DVec3) -> Self {
        let Some(up) = up.try_normalize() else {
            return Self::default();
        };
        let to_y_up = DQuat::from_rotation_arc(up, DVec3::Y);
        Self {
            to_y_up,
            from_y_up: to_y_up.inverse(),
        }
    }

    /// Rotate an offset from the camera's up frame into the Y-up frame.
    pub fn to_canonical(&self, offset: DVec3) -> DVec3 {
        self.to_y_up * offset
    }

    /// Rotate an offset from the Y-up frame back into the camera's up frame.
    pub fn from_canonical(&self, offset: DVec3) -> DVec3 {
        self.from_y_up * offset
    }

    /// Convert a camera-frame offset straight to spherical coordinates.
    pub fn spherical(&self, offset: DVec3) -> Spherical {
        Spherical::from_offset(self.to_canonical(offset))
    }

    /// Convert spherical coordinates straight to a camera-frame offset.
    pub fn offset(&self, spherical: &Spherical) -> DVec3 {
        self.from_canonical(spherical.to_offset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn random_vec(rng: &mut StdRng, extent: f64) -> DVec3 {
        DVec3::new(
            rng.gen_range(-extent..extent),
            rng.gen_range(-extent..extent),
            rng.gen_range(-extent..extent),
        )
    }

    #[test]
    fn round_trip_reproduces_offset() {
        let mut rng = StdRng::seed_from_u64(7);
        let frame = UpFrame::new(DVec3::Y);
        for _ in 0..1000 {
            let v = random_vec(&mut rng, 100.0);
            if v.length() == 0.0 {
                continue;
            }
            let back = frame.offset(&frame.spherical(v));
            assert!(back.abs_diff_eq(v, 1e-9), "{v:?} became {back:?}");
        }
    }

    #[test]
    fn round_trip_with_tilted_up_axis() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let frame = UpFrame::new(random_vec(&mut rng, 1.0));
            let v = random_vec(&mut rng, 10.0);
            let back = frame.offset(&frame.spherical(v));
            assert!(back.abs_diff_eq(v, 1e-9), "{v:?} became {back:?}");
        }
    }

    #[test]
    fn z_up_frame_maps_z_to_pole() {
        let frame = UpFrame::new(DVec3::Z);
        let s = frame.spherical(DVec3::new(0.0, 0.0, 5.0));
        assert!((s.radius - 5.0).abs() < 1e-9);
        assert!(s.phi.abs() < 1e-6);
    }

    #[test]
    fn zero_offset_has_zero_angles() {
        let s = Spherical::from_offset(DVec3::ZERO);
        assert_eq!(s, Spherical::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn degenerate_up_falls_back_to_y() {
        assert_eq!(UpFrame::new(DVec3::ZERO), UpFrame::default());
        assert_eq!(UpFrame::new(DVec3::NAN), UpFrame::default());
    }

    #[test]
    fn make_safe_moves_off_the_poles() {
        let mut top = Spherical::new(1.0, 0.0, 0.0);
        top.make_safe();
        assert_eq!(top.phi, POLE_EPSILON);

        let mut bottom = Spherical::new(1.0, PI + 1.0, 0.0);
        bottom.make_safe();
        assert_eq!(bottom.phi, PI - POLE_EPSILON);

        let mut middle = Spherical::new(1.0, 1.0, 0.0);
        middle.make_safe();
        assert_eq!(middle.phi, 1.0);
    }

    #[test]
    fn azimuth_measured_from_z() {
        let s = Spherical::from_offset(DVec3::new(1.0, 0.0, 0.0));
        assert!((s.theta - PI / 2.0).abs() < 1e-12);
        assert!((s.phi - PI / 2.0).abs() < 1e-12);
    }
}
