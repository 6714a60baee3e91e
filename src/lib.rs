//! Collision Lab - two-puck air-table simulator for the momentum lab
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (integration, collisions, run state)
//! - `measure`: Spark-tape measurements derived from captured velocities
//! - `worksheet`: Trial records and answer checking
//! - `controller`: Control surface driven by the worksheet UI
//! - `settings`: Persisted lab configuration

pub mod controller;
pub mod error;
pub mod measure;
pub mod settings;
pub mod sim;
pub mod worksheet;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use controller::{FrameSnapshot, FrameTicket, LabController};
pub use error::LabError;
pub use settings::LabSettings;
pub use sim::{CollisionMode, Simulation};
pub use worksheet::{TrialRecord, Worksheet, validate};

use glam::DVec2;

/// Lab configuration constants
pub mod consts {
    /// Table dimensions (simulation pixels)
    pub const TABLE_WIDTH: f64 = 500.0;
    pub const TABLE_HEIGHT: f64 = 400.0;

    /// Spark-tape scale
    pub const PIXELS_PER_CM: f64 = 10.0;
    /// Assumed animation frame rate
    pub const FRAMES_PER_SECOND: f64 = 60.0;
    /// A spark dot is burned every 6th frame (0.1 s at 60 fps)
    pub const SPARK_INTERVAL_FRAMES: u64 = 6;
    pub const SPARK_INTERVAL_SECONDS: f64 = 0.1;
    /// Maximum spark dots kept in the trail
    pub const TRAIL_CAPACITY: usize = 200;

    /// Puck defaults
    pub const PUCK_DIAMETER_CM: f64 = 6.0;
    pub const PUCK_RADIUS: f64 = PUCK_DIAMETER_CM * PIXELS_PER_CM / 2.0;
    pub const PUCK_MASS_G: f64 = 505.0;
    /// Manufacturing variation applied at launch (grams, +/-)
    pub const MASS_VARIATION_G: f64 = 5.0;

    /// Starting positions (launched puck A, target puck B)
    pub const PUCK_A_START: (f64, f64) = (100.0, 200.0);
    pub const PUCK_B_START: (f64, f64) = (300.0, 200.0);

    /// Wall bounce keeps 80% of the normal velocity
    pub const WALL_DAMPING: f64 = 0.8;
    /// Air-table drag, applied to every velocity each frame
    pub const FRICTION: f64 = 0.995;
    /// Total kinetic energy (g px²/frame²) below which a collided run halts
    pub const REST_ENERGY: f64 = 0.1;

    /// Restitution drawn per collision as center ± spread
    pub const RESTITUTION_CENTER: f64 = 0.9;
    pub const RESTITUTION_SPREAD: f64 = 0.05;

    /// Launch controls
    pub const LAUNCH_ANGLE_LIMIT_DEG: f64 = 15.0;
    pub const LAUNCH_SPEED_MIN: f64 = 1.0;
    pub const LAUNCH_SPEED_MAX: f64 = 15.0;
    pub const LAUNCH_SPEED_DEFAULT: f64 = 5.0;

    /// Worksheet answers within 5% of the computed value are accepted
    pub const VALIDATION_TOLERANCE: f64 = 0.05;
    /// Worksheet slots per collision mode
    pub const TRIALS_PER_MODE: usize = 3;
}

/// Unit direction for a launch angle in degrees (0 = +x)
#[inline]
pub fn launch_direction(angle_deg: f64) -> DVec2 {
    let theta = angle_deg.to_radians();
    DVec2::new(theta.cos(), theta.sin())
}

/// Clamp a launch speed to the slider range
#[inline]
pub fn clamp_speed(speed: f64) -> f64 {
    if speed.is_nan() {
        return consts::LAUNCH_SPEED_DEFAULT;
    }
    speed.clamp(consts::LAUNCH_SPEED_MIN, consts::LAUNCH_SPEED_MAX)
}

/// Clamp a launch angle for the given mode (1-D shots are always head-on)
#[inline]
pub fn clamp_angle(angle_deg: f64, mode: sim::CollisionMode) -> f64 {
    match mode {
        sim::CollisionMode::OneD => 0.0,
        sim::CollisionMode::TwoD if angle_deg.is_nan() => 0.0,
        sim::CollisionMode::TwoD => angle_deg.clamp(
            -consts::LAUNCH_ANGLE_LIMIT_DEG,
            consts::LAUNCH_ANGLE_LIMIT_DEG,
        ),
    }
}
