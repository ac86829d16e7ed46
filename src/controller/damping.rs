//! Provides [`Damping`], the inertia applied to rotation and pan after an update.

use bevy_reflect::Reflect;

use super::gestures::PendingDelta;

/// Exponential decay of unconsumed motion between updates.
///
/// When enabled, rotation and pan keep a fraction of their pending motion after every update,
/// so the camera coasts to a stop once input ends. The host must keep calling `update` every
/// frame for the camera to coast. Dolly never coasts.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Damping {
    /// Should motion coast after input stops?
    pub enabled: bool,
    /// Fraction of the pending motion removed each update, in `(0, 1]`.
    pub factor: f64,
}

impl Default for Damping {
    fn default() -> Self {
        Self {
            enabled: false,
            factor: 0.25,
        }
    }
}

impl Damping {
    /// Decay (or clear) pending motion once the update has applied it.
    pub fn settle(&self, delta: &mut PendingDelta) {
        if self.enabled {
            let keep = 1.0 - self.factor;
            delta.theta *= keep;
            delta.phi *= keep;
            delta.pan *= keep;
        } else {
            delta.theta = 0.0;
            delta.phi = 0.0;
            delta.pan = Default::default();
        }
        delta.scale = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_math::DVec3;

    #[test]
    fn disabled_clears_everything() {
        let mut delta = PendingDelta {
            theta: 1.0,
            phi: -1.0,
            pan: DVec3::ONE,
            scale: 3.0,
        };
        Damping::default().settle(&mut delta);
        assert!(delta.is_idle());
    }

    #[test]
    fn enabled_decays_geometrically() {
        let damping = Damping {
            enabled: true,
            factor: 0.1,
        };
        let theta0 = 0.8;
        let mut delta = PendingDelta {
            theta: theta0,
            pan: DVec3::X,
            scale: 0.5,
            ..Default::default()
        };
        let mut last = delta.theta;
        for n in 1..=50 {
            damping.settle(&mut delta);
            let expected = theta0 * 0.9f64.powi(n);
            assert!((delta.theta - expected).abs() < 1e-12);
            assert!(delta.theta < last);
            assert_eq!(delta.scale, 1.0);
            last = delta.theta;
        }
        assert!((delta.pan.x - 0.9f64.powi(50)).abs() < 1e-12);
    }
}
