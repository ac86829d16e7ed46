//! Provides [`OrbitLimits`] settings.

use std::f64::consts::PI;

use bevy_reflect::Reflect;

use super::spherical::Spherical;

/// Bounds on how far the camera may orbit, dolly, and zoom.
///
/// Limits are applied every tick, in a fixed order: azimuth, polar angle, pole safety, then
/// radius. Orthographic zoom is bounded as soon as it changes.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct OrbitLimits {
    /// How close a perspective camera may dolly toward the target.
    pub min_distance: f64,
    /// How far a perspective camera may dolly away from the target.
    pub max_distance: f64,
    /// The smallest zoom factor of an orthographic camera.
    pub min_zoom: f64,
    /// The largest zoom factor of an orthographic camera.
    pub max_zoom: f64,
    /// Lower bound of the polar angle in radians, within `[0, PI]`.
    pub min_polar_angle: f64,
    /// Upper bound of the polar angle in radians, within `[0, PI]`.
    pub max_polar_angle: f64,
    /// Lower bound of the azimuthal angle in radians. When finite, the azimuth bounds must form
    /// a sub-interval of `[-PI, PI]`.
    pub min_azimuth_angle: f64,
    /// Upper bound of the azimuthal angle in radians.
    pub max_azimuth_angle: f64,
}

impl Default for OrbitLimits {
    fn default() -> Self {
        Self {
            min_distance: 0.0,
            max_distance: f64::INFINITY,
            min_zoom: 0.0,
            max_zoom: f64::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            min_azimuth_angle: f64::NEG_INFINITY,
            max_azimuth_angle: f64::INFINITY,
        }
    }
}

/// A problem found by [`OrbitLimits::validate`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LimitsError {
    /// A lower bound exceeds its upper bound.
    #[error("{name} range is inverted: min {min} > max {max}")]
    Inverted {
        /// Which pair of limits.
        name: &'static str,
        /// The lower bound.
        min: f64,
        /// The upper bound.
        max: f64,
    },
    /// A bound is NaN.
    #[error("{name} limit is NaN")]
    NotANumber {
        /// Which pair of limits.
        name: &'static str,
    },
    /// A bound lies outside the range its angle can take.
    #[error("{name} limit {value} lies outside [{lower}, {upper}]")]
    OutOfRange {
        /// Which pair of limits.
        name: &'static str,
        /// The offending bound.
        value: f64,
        /// Smallest meaningful value.
        lower: f64,
        /// Largest meaningful value.
        upper: f64,
    },
}

/// `max(min, min(max, value))`. Unlike [`f64::clamp`] this never panics on inverted bounds; the
/// lower bound wins.
fn clamp(value: f64, min: f64, max: f64) -> f64 {
    min.max(max.min(value))
}

impl OrbitLimits {
    /// Clamp the angles of `spherical`: azimuth, then polar angle, then the pole-safety clamp.
    ///
    /// The pole-safety clamp has to come last so that a polar limit of exactly `0` or `PI` can't
    /// put the camera on a pole.
    pub fn constrain(&self, spherical: &mut Spherical) {
        spherical.theta = clamp(
            spherical.theta,
            self.min_azimuth_angle,
            self.max_azimuth_angle,
        );
        spherical.phi = clamp(spherical.phi, self.min_polar_angle, self.max_polar_angle);
        spherical.make_safe();
    }

    /// Bound the distance between camera and target.
    pub fn clamp_radius(&self, radius: f64) -> f64 {
        clamp(radius, self.min_distance, self.max_distance)
    }

    /// Bound the zoom factor of an orthographic camera.
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        clamp(zoom, self.min_zoom, self.max_zoom)
    }

    /// Check the limits for ranges that can't be satisfied. Limits are never validated
    /// implicitly; misconfigured limits resolve toward their lower bound when clamping.
    pub fn validate(&self) -> Result<(), Vec<LimitsError>> {
        let pairs = [
            ("distance", self.min_distance, self.max_distance),
            ("zoom", self.min_zoom, self.max_zoom),
            ("polar angle", self.min_polar_angle, self.max_polar_angle),
            ("azimuth angle", self.min_azimuth_angle, self.max_azimuth_angle),
        ];

        let mut errors = Vec::new();
        for (name, min, max) in pairs {
            if min.is_nan() || max.is_nan() {
                errors.push(LimitsError::NotANumber { name });
            } else if min > max {
                errors.push(LimitsError::Inverted { name, min, max });
            }
        }

        for value in [self.min_polar_angle, self.max_polar_angle] {
            if !(0.0..=PI).contains(&value) && !value.is_nan() {
                errors.push(LimitsError::OutOfRange {
                    name: "polar angle",
                    value,
                    lower: 0.0,
                    upper: PI,
                });
            }
        }

        for value in [self.min_azimuth_angle, self.max_azimuth_angle] {
            if value.is_finite() && !(-PI..=PI).contains(&value) {
                errors.push(LimitsError::OutOfRange {
                    name: "azimuth angle",
                    value,
                    lower: -PI,
                    upper: PI,
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::spherical::POLE_EPSILON;

    #[test]
    fn defaults_only_apply_pole_safety() {
        let limits = OrbitLimits::default();
        let mut s = Spherical::new(3.0, 0.0, 42.0);
        limits.constrain(&mut s);
        assert_eq!(s.theta, 42.0);
        assert_eq!(s.phi, POLE_EPSILON);
        assert_eq!(limits.clamp_radius(1e9), 1e9);
        assert!(limits.validate().is_ok());
    }

    #[test]
    fn angles_are_clamped() {
        let limits = OrbitLimits {
            min_polar_angle: 0.5,
            max_polar_angle: 1.0,
            min_azimuth_angle: -PI / 4.0,
            max_azimuth_angle: PI / 4.0,
            ..Default::default()
        };
        let mut s = Spherical::new(1.0, 2.0, 3.0);
        limits.constrain(&mut s);
        assert_eq!(s.phi, 1.0);
        assert_eq!(s.theta, PI / 4.0);

        let mut s = Spherical::new(1.0, 0.1, -3.0);
        limits.constrain(&mut s);
        assert_eq!(s.phi, 0.5);
        assert_eq!(s.theta, -PI / 4.0);
    }

    #[test]
    fn polar_limit_at_pole_still_made_safe() {
        let limits = OrbitLimits {
            min_polar_angle: PI,
            max_polar_angle: PI,
            ..Default::default()
        };
        let mut s = Spherical::new(1.0, 0.3, 0.0);
        limits.constrain(&mut s);
        assert_eq!(s.phi, PI - POLE_EPSILON);
    }

    #[test]
    fn radius_and_zoom_bounds() {
        let limits = OrbitLimits {
            min_distance: 2.0,
            max_distance: 5.0,
            min_zoom: 0.5,
            max_zoom: 2.0,
            ..Default::default()
        };
        assert_eq!(limits.clamp_radius(1.0), 2.0);
        assert_eq!(limits.clamp_radius(3.0), 3.0);
        assert_eq!(limits.clamp_radius(9.0), 5.0);
        assert_eq!(limits.clamp_zoom(0.1), 0.5);
        assert_eq!(limits.clamp_zoom(4.0), 2.0);
    }

    #[test]
    fn inverted_limits_resolve_to_lower_bound() {
        let limits = OrbitLimits {
            min_distance: 5.0,
            max_distance: 2.0,
            ..Default::default()
        };
        assert_eq!(limits.clamp_radius(3.0), 5.0);
        assert_eq!(
            limits.validate(),
            Err(vec![LimitsError::Inverted {
                name: "distance",
                min: 5.0,
                max: 2.0
            }])
        );
    }

    #[test]
    fn validate_reports_out_of_range_angles() {
        let limits = OrbitLimits {
            max_polar_angle: 4.0,
            min_azimuth_angle: -4.0,
            max_zoom: f64::NAN,
            ..Default::default()
        };
        let errors = limits.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&LimitsError::NotANumber { name: "zoom" }));
        assert!(errors
            .iter()
            .all(|e| !matches!(e, LimitsError::Inverted { .. })));
    }
}
