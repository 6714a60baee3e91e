//! Spark-tape measurements
//!
//! Converts simulator velocities (px/frame) and masses (g) into the numbers a
//! student reads off the tape: dot spacing in cm over a 0.1 s interval,
//! direction from horizontal, and momentum in kg·cm/s.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

#[inline]
pub fn speed(vel: DVec2) -> f64 {
    (vel.x * vel.x + vel.y * vel.y).sqrt()
}

/// Angle from horizontal in degrees, as a magnitude (quadrant is dropped)
#[inline]
pub fn angle_deg(vel: DVec2) -> f64 {
    vel.y.atan2(vel.x).to_degrees().abs()
}

/// Distance between consecutive spark dots (cm)
#[inline]
pub fn spacing_cm(vel: DVec2) -> f64 {
    speed(vel) * SPARK_INTERVAL_FRAMES as f64 / PIXELS_PER_CM
}

/// px/frame -> cm/s
#[inline]
pub fn cm_per_second(px_per_frame: f64) -> f64 {
    px_per_frame * FRAMES_PER_SECOND / PIXELS_PER_CM
}

/// g -> kg
#[inline]
pub fn kilograms(grams: f64) -> f64 {
    grams / 1000.0
}

/// Momentum magnitude (kg·cm/s)
#[inline]
pub fn momentum(vel: DVec2, mass_g: f64) -> f64 {
    kilograms(mass_g) * cm_per_second(speed(vel))
}

/// Signed momentum components (kg·cm/s)
#[inline]
pub fn momentum_components(vel: DVec2, mass_g: f64) -> DVec2 {
    DVec2::new(
        kilograms(mass_g) * cm_per_second(vel.x),
        kilograms(mass_g) * cm_per_second(vel.y),
    )
}

/// Percent difference of `after` relative to `before`
pub fn percent_difference(before: f64, after: f64) -> Option<f64> {
    if before == 0.0 || !before.is_finite() || !after.is_finite() {
        return None;
    }
    Some((after - before).abs() / before.abs() * 100.0)
}

/// One puck's tape reading for a head-on trial
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearMeasurement {
    pub spacing_cm: f64,
    pub interval_s: f64,
    pub momentum: f64,
}

impl LinearMeasurement {
    pub fn from_velocity(vel: DVec2, mass_g: f64) -> Self {
        Self {
            spacing_cm: spacing_cm(vel),
            interval_s: SPARK_INTERVAL_SECONDS,
            momentum: momentum(vel, mass_g),
        }
    }
}

/// One puck's tape reading for a glancing trial
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanarMeasurement {
    pub spacing_cm: f64,
    pub interval_s: f64,
    pub angle_deg: f64,
    pub momentum_x: f64,
    pub momentum_y: f64,
}

impl PlanarMeasurement {
    pub fn from_velocity(vel: DVec2, mass_g: f64) -> Self {
        let p = momentum_components(vel, mass_g);
        Self {
            spacing_cm: spacing_cm(vel),
            interval_s: SPARK_INTERVAL_SECONDS,
            angle_deg: angle_deg(vel),
            momentum_x: p.x,
            momentum_y: p.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lab_reference_values() {
        let vel = DVec2::new(10.0, 0.0);
        assert!((momentum(vel, 505.0) - 30.3).abs() < 1e-9);
        assert!((spacing_cm(vel) - 6.0).abs() < 1e-12);
        assert_eq!(angle_deg(vel), 0.0);
    }

    #[test]
    fn test_angle_is_magnitude() {
        assert!((angle_deg(DVec2::new(1.0, 1.0)) - 45.0).abs() < 1e-9);
        assert!((angle_deg(DVec2::new(1.0, -1.0)) - 45.0).abs() < 1e-9);
        assert!((angle_deg(DVec2::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_components_keep_sign() {
        let p = momentum_components(DVec2::new(3.0, -4.0), 500.0);
        assert!((p.x - 9.0).abs() < 1e-9);
        assert!((p.y + 12.0).abs() < 1e-9);
        assert!((p.length() - momentum(DVec2::new(3.0, -4.0), 500.0)).abs() < 1e-9);
    }

    #[test]
    fn test_percent_difference() {
        assert_eq!(percent_difference(0.0, 1.0), None);
        let diff = percent_difference(30.0, 28.5).unwrap();
        assert!((diff - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_planar_measurement() {
        let m = PlanarMeasurement::from_velocity(DVec2::new(0.0, 5.0), 505.0);
        assert!((m.angle_deg - 90.0).abs() < 1e-9);
        assert!((m.spacing_cm - 3.0).abs() < 1e-12);
        assert!(m.momentum_x.abs() < 1e-12);
        assert!((m.momentum_y - 15.15).abs() < 1e-9);
        assert_eq!(m.interval_s, 0.1);
    }
}
