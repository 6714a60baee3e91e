//! Simulation state and core types
//!
//! Everything a run mutates lives here. Given the same seed and inputs, two
//! simulations produce identical runs.

use std::collections::VecDeque;

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::{clamp_angle, clamp_speed, launch_direction};

/// Which worksheet table a run feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CollisionMode {
    /// Head-on collision along the x axis
    #[default]
    #[serde(rename = "1D")]
    OneD,
    /// Glancing collision at an adjustable launch angle
    #[serde(rename = "2D")]
    TwoD,
}

impl CollisionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollisionMode::OneD => "1D",
            CollisionMode::TwoD => "2D",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "1d" | "1-d" => Some(CollisionMode::OneD),
            "2d" | "2-d" => Some(CollisionMode::TwoD),
            _ => None,
        }
    }
}

impl std::fmt::Display for CollisionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One air-table puck
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Centre position (px)
    pub pos: DVec2,
    /// Velocity (px/frame)
    pub vel: DVec2,
    /// Radius (px)
    pub radius: f64,
    /// Mass (g)
    pub mass_g: f64,
}

impl Body {
    /// A nominal puck at rest
    pub fn puck(pos: DVec2) -> Self {
        Self {
            pos,
            vel: DVec2::ZERO,
            radius: PUCK_RADIUS,
            mass_g: PUCK_MASS_G,
        }
    }

    /// Kinetic energy in g px²/frame²
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass_g * self.vel.length_squared()
    }
}

/// Velocities and masses of both pucks at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Capture {
    pub vel: [DVec2; 2],
    pub mass_g: [f64; 2],
}

impl Capture {
    pub fn of(a: &Body, b: &Body) -> Self {
        Self {
            vel: [a.vel, b.vel],
            mass_g: [a.mass_g, b.mass_g],
        }
    }
}

/// A spark-tape sample of both puck positions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SparkDot {
    pub frame: u64,
    pub pos: [DVec2; 2],
}

/// How the coefficient of restitution is chosen for each collision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Restitution {
    /// Uniform draw in `center ± spread` (emulates measurement variance)
    Random { center: f64, spread: f64 },
    /// Always the same value
    Fixed(f64),
}

impl Default for Restitution {
    fn default() -> Self {
        Restitution::Random {
            center: RESTITUTION_CENTER,
            spread: RESTITUTION_SPREAD,
        }
    }
}

impl Restitution {
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        match *self {
            Restitution::Fixed(e) => e,
            Restitution::Random { center, spread } if spread > 0.0 => {
                center + rng.random_range(-spread..=spread)
            }
            Restitution::Random { center, .. } => center,
        }
    }
}

/// The two-puck simulation
#[derive(Debug, Clone)]
pub struct Simulation {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Launched puck A and target puck B
    pub bodies: [Body; 2],
    /// Advancing each frame
    pub running: bool,
    /// Latched on the first resolved pairwise collision
    pub has_collided: bool,
    /// Captured when contact is first detected
    pub before: Option<Capture>,
    /// Captured right after the first impulse
    pub after: Option<Capture>,
    /// Restitution used by the first collision
    pub first_restitution: Option<f64>,
    /// Resolved pairwise collisions this run
    pub collision_count: u32,
    /// Spark dots, oldest first
    pub trail: VecDeque<SparkDot>,
    /// Frames stepped this run
    pub frame: u64,
    /// Current collision mode
    pub mode: CollisionMode,
    /// Launch angle (degrees from +x)
    pub angle_deg: f64,
    /// Launch speed (px/frame)
    pub speed: f64,
    /// Restitution model
    pub restitution: Restitution,
    /// Launch mass jitter (g, +/-)
    pub mass_variation_g: f64,
    rng: Pcg32,
}

impl Simulation {
    /// Create a stopped simulation with both pucks at their start positions
    pub fn new(seed: u64, mode: CollisionMode) -> Self {
        Self {
            seed,
            bodies: Self::initial_bodies(),
            running: false,
            has_collided: false,
            before: None,
            after: None,
            first_restitution: None,
            collision_count: 0,
            trail: VecDeque::with_capacity(TRAIL_CAPACITY),
            frame: 0,
            mode,
            angle_deg: 0.0,
            speed: LAUNCH_SPEED_DEFAULT,
            restitution: Restitution::default(),
            mass_variation_g: MASS_VARIATION_G,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn with_restitution(mut self, restitution: Restitution) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_mass_variation(mut self, grams: f64) -> Self {
        self.mass_variation_g = grams.max(0.0);
        self
    }

    fn initial_bodies() -> [Body; 2] {
        [
            Body::puck(DVec2::new(PUCK_A_START.0, PUCK_A_START.1)),
            Body::puck(DVec2::new(PUCK_B_START.0, PUCK_B_START.1)),
        ]
    }

    /// Put both pucks back and forget the previous run (the RNG keeps going)
    pub fn reset(&mut self) {
        self.bodies = Self::initial_bodies();
        self.running = false;
        self.has_collided = false;
        self.before = None;
        self.after = None;
        self.first_restitution = None;
        self.collision_count = 0;
        self.trail.clear();
        self.frame = 0;
    }

    pub fn set_mode(&mut self, mode: CollisionMode) {
        self.mode = mode;
        self.angle_deg = clamp_angle(self.angle_deg, mode);
    }

    pub fn set_angle(&mut self, angle_deg: f64) {
        self.angle_deg = clamp_angle(angle_deg, self.mode);
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = clamp_speed(speed);
    }

    /// Weigh the pucks and send A toward B
    pub fn launch(&mut self) {
        let offsets = [self.sample_mass_offset(), self.sample_mass_offset()];
        for (body, offset) in self.bodies.iter_mut().zip(offsets) {
            body.mass_g = PUCK_MASS_G + offset;
        }
        self.bodies[0].vel = launch_direction(self.angle_deg) * self.speed;
        self.running = true;
        log::info!(
            "Launch: {} mode, angle {:.1}°, speed {:.2} px/frame, masses {:.1} g / {:.1} g",
            self.mode,
            self.angle_deg,
            self.speed,
            self.bodies[0].mass_g,
            self.bodies[1].mass_g
        );
    }

    fn sample_mass_offset(&mut self) -> f64 {
        if self.mass_variation_g > 0.0 {
            self.rng
                .random_range(-self.mass_variation_g..=self.mass_variation_g)
        } else {
            0.0
        }
    }

    /// Draw the restitution for the next collision
    pub fn draw_restitution(&mut self) -> f64 {
        self.restitution.sample(&mut self.rng)
    }

    /// Total kinetic energy of both pucks
    pub fn kinetic_energy(&self) -> f64 {
        self.bodies.iter().map(Body::kinetic_energy).sum()
    }

    /// Append a spark dot, evicting the oldest past capacity
    pub fn record_spark(&mut self) {
        self.trail.push_back(SparkDot {
            frame: self.frame,
            pos: [self.bodies[0].pos, self.bodies[1].pos],
        });
        while self.trail.len() > TRAIL_CAPACITY {
            self.trail.pop_front();
        }
    }
}
